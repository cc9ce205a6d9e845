/*!
 * Bridge Configuration
 * Property naming and third-party library version tags
 *
 * Version strings are fixed when the crate is compiled:
 * - SYSTEM_NATIVES_ZLIB_VERSION: compression library version
 * - SYSTEM_NATIVES_OPENSSL_VERSION: crypto library version text
 *
 * Runtime overrides:
 * - SYSTEM_NATIVES_PROPERTY_PREFIX: vendor prefix for the version keys
 */

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_PROPERTY_PREFIX: &str = "android";

/// Compression library version baked in at build time
pub const ZLIB_VERSION: &str = match option_env!("SYSTEM_NATIVES_ZLIB_VERSION") {
    Some(v) => v,
    None => "1.2.13",
};

/// Crypto library version text baked in at build time
pub const OPENSSL_VERSION_TEXT: &str = match option_env!("SYSTEM_NATIVES_OPENSSL_VERSION") {
    Some(v) => v,
    None => "OpenSSL 1.1.1t  7 Feb 2023",
};

const PREFIX_ENV: &str = "SYSTEM_NATIVES_PROPERTY_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Vendor prefix for the library version keys (`<prefix>.zlib.version`)
    pub property_prefix: String,
    pub zlib_version: String,
    pub openssl_version: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            property_prefix: DEFAULT_PROPERTY_PREFIX.to_string(),
            zlib_version: ZLIB_VERSION.to_string(),
            openssl_version: OPENSSL_VERSION_TEXT.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(prefix) = std::env::var_os(PREFIX_ENV) {
            config.property_prefix = prefix.to_string_lossy().into_owned();
            debug!(prefix = %config.property_prefix, "property prefix overridden");
        }
        config
    }

    /// Load from a JSON document; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_property_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.property_prefix = prefix.into();
        self
    }

    /// Full key for a library version property
    pub fn version_key(&self, library: &str) -> String {
        if self.property_prefix.is_empty() {
            format!("{}.version", library)
        } else {
            format!("{}.{}.version", self.property_prefix, library)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let config = BridgeConfig::default();
        assert_eq!(config.version_key("zlib"), "android.zlib.version");
        assert_eq!(config.version_key("openssl"), "android.openssl.version");
    }

    #[test]
    fn test_empty_prefix() {
        let config = BridgeConfig::default().with_property_prefix("");
        assert_eq!(config.version_key("zlib"), "zlib.version");
    }

    #[test]
    fn test_from_json_partial() {
        let config = BridgeConfig::from_json(r#"{"property_prefix":"acme"}"#).unwrap();
        assert_eq!(config.property_prefix, "acme");
        assert_eq!(config.zlib_version, ZLIB_VERSION);
        assert!(BridgeConfig::from_json("{").is_err());
    }
}
