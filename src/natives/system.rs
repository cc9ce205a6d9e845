/*!
 * System Natives
 * Environment lookups, forced static field assignment and host properties
 */

use super::environment::{lookup, native_text, EnvironmentTable};
use super::marshal::to_string_array;
use super::properties::{property_strings, HostInfo};
use super::registry::{NativeHandler, NativeMethod, NativeRegistry};
use crate::config::BridgeConfig;
use crate::core::{ClassRef, NativeError, NativeResult, ObjectRef, Value};
use crate::monitoring::span_operation;
use crate::runtime::{FieldType, ManagedEnv, SYSTEM_CLASS};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Natives bound on `java/lang/System`
pub const SYSTEM_METHODS: &[NativeMethod] = &[
    NativeMethod::new("getEnvByIndex", "(I)Ljava/lang/String;"),
    NativeMethod::new("getEnvByName", "(Ljava/lang/String;)Ljava/lang/String;"),
    NativeMethod::new(
        "setFieldImpl",
        "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/Object;)V",
    ),
    NativeMethod::new("specialProperties", "()[Ljava/lang/String;"),
];

/// Outcome of a forced static field assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAssignment {
    /// The field now holds the given value
    Assigned,
    /// Name or signature could not be decoded; nothing was written
    Skipped,
}

/// Native half of the managed `System` facility
#[derive(Debug, Clone, Default)]
pub struct SystemNatives {
    config: BridgeConfig,
}

impl SystemNatives {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Value of the named variable, or `None` if it is unset
    ///
    /// An undecodable name is a `Decoding` error, distinct from an unset
    /// variable.
    pub fn get_env_by_name(
        &self,
        env: &dyn ManagedEnv,
        name: Option<ObjectRef>,
    ) -> NativeResult<Option<ObjectRef>> {
        let span = span_operation("env_get");
        let _guard = span.enter();

        let name = decode(env, name).inspect_err(|e| span.record_error(&e.to_string()))?;
        span.record("key", &name);

        match lookup(&name) {
            Some(value) => {
                trace!(key = %name, "environment variable found");
                span.record_result(true);
                Ok(Some(env.new_string(&native_text(&value))))
            }
            None => {
                trace!(key = %name, "environment variable unset");
                span.record_result(true);
                Ok(None)
            }
        }
    }

    /// Raw `NAME=VALUE` entry at `index` of the live environment table
    pub fn get_env_by_index(&self, env: &dyn ManagedEnv, index: i32) -> NativeResult<ObjectRef> {
        let span = span_operation("env_get_by_index");
        let _guard = span.enter();
        span.record_debug("index", index);

        let table = EnvironmentTable::capture();
        match table.entry(index) {
            Ok(entry) => {
                span.record_result(true);
                Ok(env.new_string(&native_text(entry)))
            }
            Err(e) => {
                debug!(index, len = table.len(), "environment index out of range");
                span.record_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Assign a static reference field on `class`, ignoring `final`
    ///
    /// Decoding failures skip the assignment silently. Resolution failures
    /// (unknown name, mismatched or malformed signature) are returned.
    pub fn set_field_impl(
        &self,
        env: &dyn ManagedEnv,
        class: ClassRef,
        name: Option<ObjectRef>,
        signature: Option<ObjectRef>,
        value: Option<ObjectRef>,
    ) -> NativeResult<FieldAssignment> {
        let span = span_operation("set_static_field");
        let _guard = span.enter();

        let (name, signature) = match (decode(env, name), decode(env, signature)) {
            (Ok(name), Ok(signature)) => (name, signature),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "field assignment skipped");
                span.record_error(&e.to_string());
                return Ok(FieldAssignment::Skipped);
            }
        };
        span.record("key", &name);

        let outcome = assign_static(env, class, &name, &signature, value);
        match &outcome {
            Ok(_) => {
                info!(field = %name, signature = %signature, "static field assigned");
                span.record_result(true);
            }
            Err(e) => {
                error!(field = %name, signature = %signature, error = %e, "static field assignment failed");
                span.record_error(&e.to_string());
            }
        }
        outcome
    }

    /// Managed `String[]` of the six host/platform `key=value` properties
    pub fn special_properties(&self, env: &dyn ManagedEnv) -> NativeResult<ObjectRef> {
        let span = span_operation("special_properties");
        let _guard = span.enter();

        let host = HostInfo::query().inspect_err(|e| {
            error!(error = %e, "host query failed");
            span.record_error(&e.to_string());
        })?;
        let properties = property_strings(&host, &self.config);
        span.record_items_processed(properties.len());

        let array = to_string_array(env, &properties)?;
        span.record_result(true);
        Ok(array)
    }

    /// Bind [`SYSTEM_METHODS`] on `java/lang/System` to this instance
    pub fn register(self, env: &dyn ManagedEnv, registry: &mut NativeRegistry) -> NativeResult<usize> {
        registry.register_natives(env, SYSTEM_CLASS, SYSTEM_METHODS, Arc::new(self))
    }
}

fn decode(env: &dyn ManagedEnv, string: Option<ObjectRef>) -> NativeResult<String> {
    env.string_chars(string)
        .map_err(|e| NativeError::decoding(e.to_string()))
}

fn assign_static(
    env: &dyn ManagedEnv,
    class: ClassRef,
    name: &str,
    signature: &str,
    value: Option<ObjectRef>,
) -> NativeResult<FieldAssignment> {
    if !FieldType::parse(signature)?.is_reference() {
        return Err(NativeError::NotAReferenceField {
            name: name.into(),
            signature: signature.into(),
        });
    }
    let field = env.static_field_id(class, name, signature)?;
    env.set_static_object_field(class, field, value)?;
    Ok(FieldAssignment::Assigned)
}

/// Absent-on-decode-failure policy of the managed boundary
fn null_on_decode_failure(result: NativeResult<Value>, fallback: Value) -> NativeResult<Value> {
    match result {
        Err(e) if e.is_decoding() => {
            debug!(error = %e, "decode failure reported as absent result");
            Ok(fallback)
        }
        other => other,
    }
}

fn object_arg(args: &[Value], position: usize) -> NativeResult<Option<ObjectRef>> {
    args.get(position)
        .and_then(Value::as_object)
        .ok_or_else(|| NativeError::argument_mismatch(format!("argument {} is not an object", position)))
}

impl SystemNatives {
    fn set_field_call(&self, env: &dyn ManagedEnv, class: ClassRef, args: &[Value]) -> NativeResult<Value> {
        let name = object_arg(args, 0)?;
        let signature = object_arg(args, 1)?;
        let value = object_arg(args, 2)?;
        self.set_field_impl(env, class, name, signature, value)?;
        Ok(Value::Void)
    }
}

impl NativeHandler for SystemNatives {
    fn handle(
        &self,
        env: &dyn ManagedEnv,
        class: ClassRef,
        method: &str,
        args: &[Value],
    ) -> Option<NativeResult<Value>> {
        let result = match method {
            "getEnvByIndex" => {
                let index = match args.first().and_then(Value::as_int) {
                    Some(index) => index,
                    None => return Some(Err(NativeError::argument_mismatch("index must be an int"))),
                };
                self.get_env_by_index(env, index).map(Value::object)
            }
            "getEnvByName" => null_on_decode_failure(
                object_arg(args, 0)
                    .and_then(|name| self.get_env_by_name(env, name))
                    .map(Value::Object),
                Value::NULL,
            ),
            "setFieldImpl" => self.set_field_call(env, class, args),
            "specialProperties" => self.special_properties(env).map(Value::object),
            _ => return None,
        };
        Some(result)
    }

    fn name(&self) -> &'static str {
        "system_natives"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Heap;

    #[test]
    fn test_system_method_signatures_parse() {
        for method in SYSTEM_METHODS {
            assert!(
                crate::runtime::MethodDescriptor::parse(method.signature).is_ok(),
                "{} has a malformed signature",
                method.name
            );
        }
    }

    #[test]
    fn test_decode_failure_distinct_from_absent() {
        let heap = Heap::new();
        let natives = SystemNatives::default();
        let bad = heap.new_string_utf16(&[0xDC00]);
        assert!(matches!(
            natives.get_env_by_name(&heap, Some(bad)),
            Err(NativeError::Decoding(_))
        ));
        assert!(matches!(
            natives.get_env_by_name(&heap, None),
            Err(NativeError::Decoding(_))
        ));
    }

    #[test]
    fn test_null_on_decode_failure() {
        let decoded = null_on_decode_failure(Err(NativeError::decoding("x")), Value::NULL);
        assert_eq!(decoded, Ok(Value::NULL));

        let range = null_on_decode_failure(Err(NativeError::Range { index: 1, len: 0 }), Value::NULL);
        assert!(range.is_err());
    }

    #[test]
    fn test_set_field_skips_on_undecodable_name() {
        let heap = Heap::with_system_class();
        let system = heap.find_class(SYSTEM_CLASS).unwrap();
        let signature = heap.new_string("Ljava/io/PrintStream;");
        let outcome = SystemNatives::default()
            .set_field_impl(&heap, system, None, Some(signature), None)
            .unwrap();
        assert_eq!(outcome, FieldAssignment::Skipped);
    }

    #[test]
    fn test_set_field_rejects_primitive_signature() {
        let heap = Heap::with_system_class();
        let system = heap.find_class(SYSTEM_CLASS).unwrap();
        let name = heap.new_string("out");
        let signature = heap.new_string("I");
        assert!(matches!(
            SystemNatives::default().set_field_impl(&heap, system, Some(name), Some(signature), None),
            Err(NativeError::NotAReferenceField { .. })
        ));
    }
}
