/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::data_structures::InlineString;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Managed object model errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RuntimeError {
    #[error("Null reference: {0}")]
    #[diagnostic(code(runtime::null_reference))]
    NullReference(InlineString),

    #[error("Invalid handle {0:#x}")]
    #[diagnostic(
        code(runtime::invalid_handle),
        help("The handle does not name a live object on this heap.")
    )]
    InvalidHandle(u32),

    #[error("Expected {expected}, found {found}")]
    #[diagnostic(code(runtime::wrong_kind))]
    WrongKind {
        expected: InlineString,
        found: InlineString,
    },

    #[error("Unpaired surrogate at UTF-16 index {index}")]
    #[diagnostic(
        code(runtime::malformed_utf16),
        help("The managed string cannot be represented as native text.")
    )]
    MalformedUtf16 { index: usize },

    #[error("Array index {index} out of bounds for length {len}")]
    #[diagnostic(code(runtime::array_index_out_of_bounds))]
    ArrayIndexOutOfBounds { index: usize, len: usize },

    #[error("Cannot store {found} in array of {element}")]
    #[diagnostic(code(runtime::array_store))]
    ArrayStore {
        element: InlineString,
        found: InlineString,
    },

    #[error("Class not found: {0}")]
    #[diagnostic(code(runtime::class_not_found))]
    ClassNotFound(InlineString),

    #[error("Class already defined: {0}")]
    #[diagnostic(code(runtime::duplicate_class))]
    DuplicateClass(InlineString),

    #[error("No static field {class}.{name} with signature {signature}")]
    #[diagnostic(
        code(runtime::no_such_field),
        help("Field lookup matches both name and type descriptor.")
    )]
    NoSuchField {
        class: InlineString,
        name: InlineString,
        signature: InlineString,
    },

    #[error("Invalid descriptor: {0}")]
    #[diagnostic(code(runtime::invalid_descriptor))]
    InvalidDescriptor(InlineString),

    #[error("Cannot assign final field {class}.{name}")]
    #[diagnostic(
        code(runtime::illegal_access),
        help("Final static fields are only writable through the native field setter.")
    )]
    IllegalAccess {
        class: InlineString,
        name: InlineString,
    },
}

impl RuntimeError {
    #[inline]
    pub fn null_reference(context: impl Into<InlineString>) -> Self {
        Self::NullReference(context.into())
    }

    #[inline]
    pub fn wrong_kind(expected: impl Into<InlineString>, found: impl Into<InlineString>) -> Self {
        Self::WrongKind {
            expected: expected.into(),
            found: found.into(),
        }
    }

    #[inline]
    pub fn invalid_descriptor(descriptor: impl Into<InlineString>) -> Self {
        Self::InvalidDescriptor(descriptor.into())
    }
}

/// Native bridge errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
#[non_exhaustive]
pub enum NativeError {
    #[error("Decoding failed: {0}")]
    #[diagnostic(
        code(native::decoding),
        help("Managed strings passed to natives must be non-null and well-formed UTF-16.")
    )]
    Decoding(InlineString),

    #[error("Index {index} out of range for environment of {len} entries")]
    #[diagnostic(code(native::range))]
    Range { index: i64, len: usize },

    #[error("{query} failed (errno {errno}): {message}")]
    #[diagnostic(code(native::os_query))]
    OsQuery {
        query: InlineString,
        errno: i32,
        message: InlineString,
    },

    #[error("No static field {class}.{name} with signature {signature}")]
    #[diagnostic(code(native::no_such_field))]
    NoSuchField {
        class: InlineString,
        name: InlineString,
        signature: InlineString,
    },

    #[error("Invalid descriptor: {0}")]
    #[diagnostic(code(native::invalid_descriptor))]
    InvalidDescriptor(InlineString),

    #[error("Field {name} has non-reference signature {signature}")]
    #[diagnostic(
        code(native::not_a_reference_field),
        help("Only object and array typed static fields can be force-assigned.")
    )]
    NotAReferenceField {
        name: InlineString,
        signature: InlineString,
    },

    #[error("No native bound for {class}.{name}{signature}")]
    #[diagnostic(code(native::unsatisfied_link))]
    UnsatisfiedLink {
        class: InlineString,
        name: InlineString,
        signature: InlineString,
    },

    #[error("Native {class}.{name}{signature} already registered")]
    #[diagnostic(code(native::duplicate_method))]
    DuplicateMethod {
        class: InlineString,
        name: InlineString,
        signature: InlineString,
    },

    #[error("Argument mismatch: {0}")]
    #[diagnostic(code(native::argument_mismatch))]
    ArgumentMismatch(InlineString),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(RuntimeError),
}

impl NativeError {
    #[inline]
    pub fn decoding(msg: impl Into<InlineString>) -> Self {
        Self::Decoding(msg.into())
    }

    #[inline]
    pub fn os_query(query: &str, errno: nix::errno::Errno) -> Self {
        Self::OsQuery {
            query: query.into(),
            errno: errno as i32,
            message: errno.desc().into(),
        }
    }

    #[inline]
    pub fn argument_mismatch(msg: impl Into<InlineString>) -> Self {
        Self::ArgumentMismatch(msg.into())
    }

    /// Whether this is a decoding failure, which the managed boundary
    /// reports as an absent result
    #[inline]
    pub const fn is_decoding(&self) -> bool {
        matches!(self, Self::Decoding(_))
    }
}

impl From<RuntimeError> for NativeError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::NoSuchField {
                class,
                name,
                signature,
            } => Self::NoSuchField {
                class,
                name,
                signature,
            },
            RuntimeError::InvalidDescriptor(desc) => Self::InvalidDescriptor(desc),
            RuntimeError::MalformedUtf16 { .. } => Self::Decoding(err.to_string().into()),
            other => Self::Runtime(other),
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

pub type NativeResult<T> = Result<T, NativeError>;
