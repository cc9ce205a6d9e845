/*!
 * Host Properties
 * Platform identification read from uname(2) and getcwd(3)
 */

use crate::config::BridgeConfig;
use crate::core::{NativeError, NativeResult};
use nix::sys::utsname::uname;
use nix::unistd::getcwd;
use serde::{Deserialize, Serialize};
use tracing::trace;

pub const OS_ARCH: &str = "os.arch";
pub const OS_NAME: &str = "os.name";
pub const OS_VERSION: &str = "os.version";
pub const USER_DIR: &str = "user.dir";

/// Number of entries produced by [`property_list`]
pub const SPECIAL_PROPERTY_COUNT: usize = 6;

/// Host identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Machine hardware name (`x86_64`, `aarch64`)
    pub arch: String,
    /// Kernel name (`Linux`, `Darwin`)
    pub os_name: String,
    /// Kernel release
    pub os_version: String,
    /// Current working directory
    pub user_dir: String,
}

impl HostInfo {
    /// Query the running host
    ///
    /// Both OS calls are fallible; a failure is reported with its errno
    /// rather than producing a partial result.
    pub fn query() -> NativeResult<Self> {
        let uts = uname().map_err(|e| NativeError::os_query("uname", e))?;
        let cwd = getcwd().map_err(|e| NativeError::os_query("getcwd", e))?;

        let info = Self {
            arch: uts.machine().to_string_lossy().into_owned(),
            os_name: uts.sysname().to_string_lossy().into_owned(),
            os_version: uts.release().to_string_lossy().into_owned(),
            user_dir: cwd.to_string_lossy().into_owned(),
        };
        trace!(arch = %info.arch, os = %info.os_name, release = %info.os_version, "host queried");
        Ok(info)
    }
}

/// Ordered `(key, value)` pairs: arch, OS name, OS version, working
/// directory, compression library, crypto library
pub fn property_list(host: &HostInfo, config: &BridgeConfig) -> Vec<(String, String)> {
    vec![
        (OS_ARCH.to_string(), host.arch.clone()),
        (OS_NAME.to_string(), host.os_name.clone()),
        (OS_VERSION.to_string(), host.os_version.clone()),
        (USER_DIR.to_string(), host.user_dir.clone()),
        (config.version_key("zlib"), config.zlib_version.clone()),
        (config.version_key("openssl"), config.openssl_version.clone()),
    ]
}

/// `key=value` rendering of [`property_list`]
pub fn property_strings(host: &HostInfo, config: &BridgeConfig) -> Vec<String> {
    property_list(host, config)
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_host() -> HostInfo {
        HostInfo {
            arch: "x86_64".into(),
            os_name: "Linux".into(),
            os_version: "6.1.0".into(),
            user_dir: "/home/app".into(),
        }
    }

    #[test]
    fn test_property_order() {
        let props = property_strings(&sample_host(), &BridgeConfig::default());
        assert_eq!(props.len(), SPECIAL_PROPERTY_COUNT);
        assert_eq!(props[0], "os.arch=x86_64");
        assert_eq!(props[1], "os.name=Linux");
        assert_eq!(props[2], "os.version=6.1.0");
        assert_eq!(props[3], "user.dir=/home/app");
        assert!(props[4].starts_with("android.zlib.version="));
        assert!(props[5].starts_with("android.openssl.version="));
    }

    #[test]
    fn test_keys_unique() {
        let list = property_list(&sample_host(), &BridgeConfig::default());
        let keys: HashSet<_> = list.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys.len(), list.len());
    }

    #[test]
    fn test_query_host() {
        let info = HostInfo::query().unwrap();
        assert!(!info.arch.is_empty());
        assert!(!info.os_name.is_empty());
        assert_eq!(
            std::path::Path::new(&info.user_dir),
            std::env::current_dir().unwrap()
        );
    }
}
