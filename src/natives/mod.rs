/*!
 * Natives
 * Native half of the managed `System` facility and the method table that
 * binds it
 */

pub mod environment;
pub mod marshal;
pub mod properties;
pub mod registry;
pub mod system;

pub use environment::EnvironmentTable;
pub use marshal::{read_string_array, to_string_array};
pub use properties::{property_list, property_strings, HostInfo, SPECIAL_PROPERTY_COUNT};
pub use registry::{NativeHandler, NativeMethod, NativeRegistry};
pub use system::{FieldAssignment, SystemNatives, SYSTEM_METHODS};

use crate::config::BridgeConfig;
use crate::core::NativeResult;
use crate::runtime::ManagedEnv;

/// Register the `java/lang/System` natives with `config`
pub fn register_system_natives(
    env: &dyn ManagedEnv,
    registry: &mut NativeRegistry,
    config: BridgeConfig,
) -> NativeResult<usize> {
    SystemNatives::new(config).register(env, registry)
}
