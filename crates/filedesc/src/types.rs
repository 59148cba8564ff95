//! Scalar vocabulary shared by every descriptor: syntax modes, field kinds,
//! cardinalities, numbers and qualified names.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Field number as declared in the schema.
pub type FieldNumber = i32;

/// Enum value number as declared in the schema.
pub type EnumNumber = i32;

// ============================================================================
// Syntax
// ============================================================================

/// The two schema dialects. They differ in default-value and packing rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Syntax {
    /// Files that declare no syntax are proto2.
    #[default]
    Proto2,
    Proto3,
}

impl Syntax {
    pub fn as_str(self) -> &'static str {
        match self {
            Syntax::Proto2 => "proto2",
            Syntax::Proto3 => "proto3",
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Cardinality
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    #[default]
    Optional = 1,
    Required = 2,
    Repeated = 3,
}

impl Cardinality {
    /// Map a `FieldDescriptorProto.Label` number.
    pub fn from_label(label: i32) -> Option<Self> {
        match label {
            1 => Some(Cardinality::Optional),
            2 => Some(Cardinality::Required),
            3 => Some(Cardinality::Repeated),
            _ => None,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cardinality::Optional => "optional",
            Cardinality::Required => "required",
            Cardinality::Repeated => "repeated",
        })
    }
}

// ============================================================================
// Kind
// ============================================================================

/// Field kinds, numbered as `FieldDescriptorProto.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl Kind {
    /// Map a `FieldDescriptorProto.Type` number.
    pub fn from_type(ty: i32) -> Option<Self> {
        Some(match ty {
            1 => Kind::Double,
            2 => Kind::Float,
            3 => Kind::Int64,
            4 => Kind::Uint64,
            5 => Kind::Int32,
            6 => Kind::Fixed64,
            7 => Kind::Fixed32,
            8 => Kind::Bool,
            9 => Kind::String,
            10 => Kind::Group,
            11 => Kind::Message,
            12 => Kind::Bytes,
            13 => Kind::Uint32,
            14 => Kind::Enum,
            15 => Kind::Sfixed32,
            16 => Kind::Sfixed64,
            17 => Kind::Sint32,
            18 => Kind::Sint64,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Double => "double",
            Kind::Float => "float",
            Kind::Int64 => "int64",
            Kind::Uint64 => "uint64",
            Kind::Int32 => "int32",
            Kind::Fixed64 => "fixed64",
            Kind::Fixed32 => "fixed32",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Group => "group",
            Kind::Message => "message",
            Kind::Bytes => "bytes",
            Kind::Uint32 => "uint32",
            Kind::Enum => "enum",
            Kind::Sfixed32 => "sfixed32",
            Kind::Sfixed64 => "sfixed64",
            Kind::Sint32 => "sint32",
            Kind::Sint64 => "sint64",
        }
    }

    /// Kinds whose values are themselves messages.
    pub fn is_message_like(self) -> bool {
        matches!(self, Kind::Message | Kind::Group)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FullName
// ============================================================================

/// A dot-separated qualified name such as `pkg.Outer.Inner`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FullName(String);

impl FullName {
    pub fn new(name: impl Into<String>) -> Self {
        FullName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last component (the short name).
    pub fn name(&self) -> &str {
        match self.0.rfind('.') {
            Some(i) => &self.0[i + 1..],
            None => &self.0,
        }
    }

    /// Everything before the last component, or `None` for a single component.
    pub fn parent(&self) -> Option<FullName> {
        self.0.rfind('.').map(|i| FullName(self.0[..i].to_string()))
    }

    /// `self.name`, or just `name` when `self` is empty (root package).
    pub fn append(&self, name: &str) -> FullName {
        if self.0.is_empty() {
            FullName(name.to_string())
        } else {
            FullName(format!("{}.{}", self.0, name))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FullName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FullName {
    fn from(s: &str) -> Self {
        FullName(s.to_string())
    }
}

impl From<String> for FullName {
    fn from(s: String) -> Self {
        FullName(s)
    }
}

impl PartialEq<str> for FullName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FullName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
