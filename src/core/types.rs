/*!
 * Core Types
 * Handles and values crossing the native/managed boundary
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an object on the managed heap
///
/// Handle equality is object identity: two handles compare equal only if
/// they name the same heap slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ObjectRef(u32);

impl ObjectRef {
    #[inline]
    pub(crate) const fn from_slot(slot: u32) -> Self {
        Self(slot)
    }

    #[inline]
    pub const fn slot(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{:#x}", self.0)
    }
}

/// Opaque handle to a loaded class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ClassRef(u32);

impl ClassRef {
    #[inline]
    pub(crate) const fn from_slot(slot: u32) -> Self {
        Self(slot)
    }

    #[inline]
    pub const fn slot(self) -> u32 {
        self.0
    }
}

/// Resolved static field, valid for the class it was resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId {
    pub(crate) class: ClassRef,
    pub(crate) index: u32,
}

impl FieldId {
    #[inline]
    pub const fn class(self) -> ClassRef {
        self.class
    }
}

/// Argument or return value of a native method call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Value {
    /// No value (`V` return type)
    Void,
    /// 32-bit signed integer (`I`)
    Int(i32),
    /// Nullable object reference (`L...;` or `[...`)
    Object(Option<ObjectRef>),
}

impl Value {
    /// Null object reference
    pub const NULL: Value = Value::Object(None);

    #[inline]
    #[must_use]
    pub const fn object(obj: ObjectRef) -> Self {
        Self::Object(Some(obj))
    }

    /// Extract the reference if this is an object value
    #[inline]
    #[must_use]
    pub const fn as_object(&self) -> Option<Option<ObjectRef>> {
        match self {
            Self::Object(obj) => Some(*obj),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Object(None))
    }

    /// Short kind name used in mismatch diagnostics
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Int(_) => "int",
            Self::Object(_) => "object",
        }
    }
}
