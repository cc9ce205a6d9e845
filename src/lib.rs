/*!
 * System Natives Library
 * Native half of a managed runtime's `System` facility: environment access,
 * host identification and forced static field assignment
 */

pub mod config;
pub mod core;
pub mod monitoring;
pub mod natives;
pub mod runtime;

// Re-exports
pub use config::BridgeConfig;
pub use core::{
    ClassRef, FieldId, InlineString, NativeError, NativeResult, ObjectRef, RuntimeError,
    RuntimeResult, Value,
};
pub use monitoring::init_tracing;
pub use natives::{
    register_system_natives, EnvironmentTable, FieldAssignment, HostInfo, NativeHandler,
    NativeMethod, NativeRegistry, SystemNatives, SYSTEM_METHODS,
};
pub use runtime::{ClassBuilder, Heap, ManagedEnv, Modifiers};
