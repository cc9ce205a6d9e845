/*!
 * Managed Runtime Interface
 * The slice of a managed runtime's object model that natives operate on
 */

mod descriptor;
mod heap;

pub use descriptor::{FieldType, MethodDescriptor, MAX_ARRAY_DIMENSIONS};
pub use heap::{ClassBuilder, Heap, Modifiers, STRING_CLASS, SYSTEM_CLASS};

use crate::core::{ClassRef, FieldId, ObjectRef, RuntimeResult};

/// Object model operations available to native code
///
/// Every string handed out by `new_string` is a fresh heap object owned by
/// the managed side. Implementations never retain the `&str` passed in.
pub trait ManagedEnv: Send + Sync {
    /// Look up a loaded class by binary name
    fn find_class(&self, name: &str) -> RuntimeResult<ClassRef>;

    /// Binary name of a loaded class
    fn class_name(&self, class: ClassRef) -> RuntimeResult<String>;

    /// Allocate a new managed string holding a copy of `text`
    fn new_string(&self, text: &str) -> ObjectRef;

    /// Decode a managed string into native text
    ///
    /// Fails on a null reference, a non-string object, or an unpaired
    /// surrogate.
    fn string_chars(&self, string: Option<ObjectRef>) -> RuntimeResult<String>;

    /// Allocate a `java/lang/String[]` with every slot null
    fn new_string_array(&self, len: usize) -> ObjectRef;

    fn array_length(&self, array: ObjectRef) -> RuntimeResult<usize>;

    fn array_element(&self, array: ObjectRef, index: usize) -> RuntimeResult<Option<ObjectRef>>;

    fn set_array_element(
        &self,
        array: ObjectRef,
        index: usize,
        value: Option<ObjectRef>,
    ) -> RuntimeResult<()>;

    /// Resolve a static field by name and exact type descriptor
    fn static_field_id(&self, class: ClassRef, name: &str, signature: &str)
        -> RuntimeResult<FieldId>;

    /// Store into a static reference field without access checks
    fn set_static_object_field(
        &self,
        class: ClassRef,
        field: FieldId,
        value: Option<ObjectRef>,
    ) -> RuntimeResult<()>;

    fn get_static_object_field(&self, class: ClassRef, field: FieldId)
        -> RuntimeResult<Option<ObjectRef>>;
}
