/*!
 * Type Descriptors
 * Parsing of field (`Ljava/io/PrintStream;`) and method (`(I)V`) descriptors
 */

use crate::core::{InlineString, RuntimeError, RuntimeResult};
use std::fmt;

/// Array types deeper than this are rejected, matching the class-file limit
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Parsed field type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    /// Class or interface type, by binary name (`java/lang/String`)
    Object(InlineString),
    /// Array of the component type
    Array(Box<FieldType>),
}

impl FieldType {
    /// Parse a complete field descriptor
    pub fn parse(descriptor: &str) -> RuntimeResult<Self> {
        match parse_field(descriptor)? {
            (ty, "") => Ok(ty),
            _ => Err(RuntimeError::invalid_descriptor(descriptor)),
        }
    }

    /// Whether values of this type are object references
    #[inline]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }

    /// Binary class name for object types
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Object(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte => f.write_str("B"),
            Self::Char => f.write_str("C"),
            Self::Double => f.write_str("D"),
            Self::Float => f.write_str("F"),
            Self::Int => f.write_str("I"),
            Self::Long => f.write_str("J"),
            Self::Short => f.write_str("S"),
            Self::Boolean => f.write_str("Z"),
            Self::Object(name) => write!(f, "L{};", name),
            Self::Array(component) => write!(f, "[{}", component),
        }
    }
}

/// Parsed method descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    params: Vec<FieldType>,
    /// `None` for `V`
    ret: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> RuntimeResult<Self> {
        let invalid = || RuntimeError::invalid_descriptor(descriptor);

        let mut rest = descriptor.strip_prefix('(').ok_or_else(invalid)?;
        let mut params = Vec::new();
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            if rest.is_empty() {
                return Err(invalid());
            }
            let (ty, after) = parse_field(rest).map_err(|_| invalid())?;
            params.push(ty);
            rest = after;
        }

        let ret = if rest == "V" {
            None
        } else {
            Some(FieldType::parse(rest).map_err(|_| invalid())?)
        };

        Ok(Self { params, ret })
    }

    #[inline]
    pub fn params(&self) -> &[FieldType] {
        &self.params
    }

    #[inline]
    pub fn return_type(&self) -> Option<&FieldType> {
        self.ret.as_ref()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{}", param)?;
        }
        f.write_str(")")?;
        match &self.ret {
            Some(ret) => write!(f, "{}", ret),
            None => f.write_str("V"),
        }
    }
}

/// Parse one field type off the front of `input`, returning the remainder
fn parse_field(input: &str) -> RuntimeResult<(FieldType, &str)> {
    let invalid = || RuntimeError::invalid_descriptor(input);

    let dims = input.bytes().take_while(|&b| b == b'[').count();
    if dims > MAX_ARRAY_DIMENSIONS {
        return Err(invalid());
    }
    let body = &input[dims..];

    let mut chars = body.chars();
    let (base, rest) = match chars.next().ok_or_else(invalid)? {
        'B' => (FieldType::Byte, chars.as_str()),
        'C' => (FieldType::Char, chars.as_str()),
        'D' => (FieldType::Double, chars.as_str()),
        'F' => (FieldType::Float, chars.as_str()),
        'I' => (FieldType::Int, chars.as_str()),
        'J' => (FieldType::Long, chars.as_str()),
        'S' => (FieldType::Short, chars.as_str()),
        'Z' => (FieldType::Boolean, chars.as_str()),
        'L' => {
            let tail = chars.as_str();
            let end = tail.find(';').ok_or_else(invalid)?;
            let name = &tail[..end];
            if !is_valid_binary_name(name) {
                return Err(invalid());
            }
            (FieldType::Object(name.into()), &tail[end + 1..])
        }
        _ => return Err(invalid()),
    };

    let ty = (0..dims).fold(base, |ty, _| FieldType::Array(Box::new(ty)));
    Ok((ty, rest))
}

fn is_valid_binary_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('/')
            .all(|part| !part.is_empty() && !part.contains(['.', '[', ';', '<', '>']))
}
