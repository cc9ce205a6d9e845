/*!
 * Native Method Registry
 * Binds (class, name, signature) triples to handlers and dispatches calls
 */

use crate::core::{ClassRef, InlineString, NativeError, NativeResult, Value};
use crate::monitoring::span_native;
use crate::runtime::{FieldType, ManagedEnv, MethodDescriptor};
use ahash::RandomState;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Name and descriptor of one native method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeMethod {
    pub name: &'static str,
    pub signature: &'static str,
}

impl NativeMethod {
    pub const fn new(name: &'static str, signature: &'static str) -> Self {
        Self { name, signature }
    }
}

/// Implementation side of a set of native methods
pub trait NativeHandler: Send + Sync {
    /// Run `method` with already type-checked arguments
    ///
    /// Returns `None` if this handler does not implement `method`.
    fn handle(
        &self,
        env: &dyn ManagedEnv,
        class: ClassRef,
        method: &str,
        args: &[Value],
    ) -> Option<NativeResult<Value>>;

    /// Handler name (for logging)
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MethodKey {
    class: InlineString,
    name: InlineString,
    signature: InlineString,
}

impl MethodKey {
    fn new(class: &str, name: &str, signature: &str) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            signature: signature.into(),
        }
    }
}

#[derive(Clone)]
struct Binding {
    class: ClassRef,
    descriptor: MethodDescriptor,
    handler: Arc<dyn NativeHandler>,
}

/// Registry of bound native methods
#[derive(Clone, Default)]
pub struct NativeRegistry {
    bindings: HashMap<MethodKey, Binding, RandomState>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every method in `methods` on `class_name` to `handler`
    ///
    /// All signatures are validated before any binding is added, so a failed
    /// registration leaves the registry unchanged.
    pub fn register_natives(
        &mut self,
        env: &dyn ManagedEnv,
        class_name: &str,
        methods: &[NativeMethod],
        handler: Arc<dyn NativeHandler>,
    ) -> NativeResult<usize> {
        let class = env.find_class(class_name)?;

        let mut pending: Vec<(MethodKey, MethodDescriptor)> = Vec::with_capacity(methods.len());
        for method in methods {
            let descriptor = MethodDescriptor::parse(method.signature)?;
            let key = MethodKey::new(class_name, method.name, method.signature);
            if self.bindings.contains_key(&key) || pending.iter().any(|(k, _)| *k == key) {
                return Err(NativeError::DuplicateMethod {
                    class: key.class,
                    name: key.name,
                    signature: key.signature,
                });
            }
            pending.push((key, descriptor));
        }

        let count = pending.len();
        for (key, descriptor) in pending {
            debug!(class = %key.class, method = %key.name, signature = %key.signature, "native bound");
            self.bindings.insert(
                key,
                Binding {
                    class,
                    descriptor,
                    handler: Arc::clone(&handler),
                },
            );
        }
        info!(class = class_name, handler = handler.name(), count, "registered natives");
        Ok(count)
    }

    /// Call a bound native method
    pub fn invoke(
        &self,
        env: &dyn ManagedEnv,
        class_name: &str,
        name: &str,
        signature: &str,
        args: &[Value],
    ) -> NativeResult<Value> {
        let span = span_native(class_name, name);
        let _guard = span.enter();
        span.record_args_count(args.len());

        let unsatisfied = || NativeError::UnsatisfiedLink {
            class: class_name.into(),
            name: name.into(),
            signature: signature.into(),
        };

        let binding = self
            .bindings
            .get(&MethodKey::new(class_name, name, signature))
            .ok_or_else(unsatisfied)?;

        let result = check_arguments(&binding.descriptor, args).and_then(|()| {
            binding
                .handler
                .handle(env, binding.class, name, args)
                .unwrap_or_else(|| Err(unsatisfied()))
        });

        match &result {
            Ok(_) => span.record_result(true),
            Err(e) => span.record_error(&e.to_string()),
        }
        result
    }

    pub fn is_bound(&self, class_name: &str, name: &str, signature: &str) -> bool {
        self.bindings
            .contains_key(&MethodKey::new(class_name, name, signature))
    }

    /// Number of bound methods
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn check_arguments(descriptor: &MethodDescriptor, args: &[Value]) -> NativeResult<()> {
    let params = descriptor.params();
    if params.len() != args.len() {
        return Err(NativeError::argument_mismatch(format!(
            "{} expects {} arguments, got {}",
            descriptor,
            params.len(),
            args.len()
        )));
    }

    for (position, (param, arg)) in params.iter().zip(args).enumerate() {
        let matches = match (param, arg) {
            (FieldType::Int, Value::Int(_)) => true,
            (ty, Value::Object(_)) => ty.is_reference(),
            _ => false,
        };
        if !matches {
            return Err(NativeError::argument_mismatch(format!(
                "argument {} of {}: expected {}, got {}",
                position,
                descriptor,
                param,
                arg.kind()
            )));
        }
    }
    Ok(())
}
