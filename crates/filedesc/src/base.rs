//! Identity shared by every descriptor, and the surrogate files.

use crate::enums::{EnumDescriptor, EnumId, EnumValueDescriptor};
use crate::extension::ExtensionDescriptor;
use crate::field::FieldDescriptor;
use crate::file::{File, FileDescriptor};
use crate::message::{MessageDescriptor, MessageId, OneofDescriptor};
use crate::service::{MethodDescriptor, ServiceDescriptor, ServiceId};
use crate::types::{FullName, Syntax};
use std::sync::LazyLock;

/// Identity and location of a non-file descriptor inside its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base {
    pub full_name: FullName,
    pub parent: ParentRef,
    /// Position among the siblings of the same kind under `parent`.
    pub index: usize,
}

impl Base {
    pub fn new(full_name: impl Into<FullName>, parent: ParentRef, index: usize) -> Self {
        Base {
            full_name: full_name.into(),
            parent,
            index,
        }
    }
}

/// The syntactic parent of a descriptor, by position in the owning file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// Standalone descriptors have no parent.
    None,
    File,
    Message(MessageId),
    Enum(EnumId),
    Service(ServiceId),
}

impl ParentRef {
    pub(crate) fn resolve(self, file: &FileDescriptor) -> Option<AnyDescriptor> {
        Some(match self {
            ParentRef::None => return None,
            ParentRef::File => AnyDescriptor::File(file.clone()),
            ParentRef::Message(id) => AnyDescriptor::Message(MessageDescriptor::new(file.clone(), id)),
            ParentRef::Enum(id) => AnyDescriptor::Enum(EnumDescriptor::new(file.clone(), id)),
            ParentRef::Service(id) => AnyDescriptor::Service(ServiceDescriptor::new(file.clone(), id)),
        })
    }
}

// ============================================================================
// Descriptor trait
// ============================================================================

/// Queries common to every descriptor kind.
pub trait Descriptor {
    fn full_name(&self) -> &FullName;

    fn name(&self) -> &str {
        self.full_name().name()
    }

    /// The declaring file. `None` for standalone descriptors that only borrow a
    /// surrogate file for their syntax.
    fn parent_file(&self) -> Option<FileDescriptor>;

    fn parent(&self) -> Option<AnyDescriptor>;

    fn index(&self) -> usize;

    fn syntax(&self) -> Syntax;

    fn is_placeholder(&self) -> bool {
        false
    }
}

/// Implements [`Descriptor`] for a handle with a `file` field and a `base()`
/// accessor returning its [`Base`].
macro_rules! impl_descriptor {
    ($ty:ty) => {
        impl $crate::base::Descriptor for $ty {
            fn full_name(&self) -> &$crate::types::FullName {
                &self.base().full_name
            }

            fn parent_file(&self) -> Option<$crate::file::FileDescriptor> {
                self.file.real_file()
            }

            fn parent(&self) -> Option<$crate::base::AnyDescriptor> {
                self.base().parent.resolve(&self.file)
            }

            fn index(&self) -> usize {
                self.base().index
            }

            fn syntax(&self) -> $crate::types::Syntax {
                self.file.syntax()
            }
        }
    };
}
pub(crate) use impl_descriptor;

/// Any descriptor, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyDescriptor {
    File(FileDescriptor),
    Message(MessageDescriptor),
    Field(FieldDescriptor),
    Oneof(OneofDescriptor),
    Enum(EnumDescriptor),
    EnumValue(EnumValueDescriptor),
    Extension(ExtensionDescriptor),
    Service(ServiceDescriptor),
    Method(MethodDescriptor),
}

impl AnyDescriptor {
    pub fn as_dyn(&self) -> &dyn Descriptor {
        match self {
            AnyDescriptor::File(d) => d,
            AnyDescriptor::Message(d) => d,
            AnyDescriptor::Field(d) => d,
            AnyDescriptor::Oneof(d) => d,
            AnyDescriptor::Enum(d) => d,
            AnyDescriptor::EnumValue(d) => d,
            AnyDescriptor::Extension(d) => d,
            AnyDescriptor::Service(d) => d,
            AnyDescriptor::Method(d) => d,
        }
    }

    pub fn full_name(&self) -> &FullName {
        self.as_dyn().full_name()
    }
}

// ============================================================================
// Surrogate files
// ============================================================================

static SURROGATE_PROTO2: LazyLock<FileDescriptor> =
    LazyLock::new(|| File::surrogate(Syntax::Proto2));
static SURROGATE_PROTO3: LazyLock<FileDescriptor> =
    LazyLock::new(|| File::surrogate(Syntax::Proto3));

/// The process-wide placeholder file carrying only `syntax`.
///
/// Standalone descriptors link to one of these to answer syntax queries; they
/// never report it as their parent file.
pub fn surrogate(syntax: Syntax) -> &'static FileDescriptor {
    match syntax {
        Syntax::Proto2 => &SURROGATE_PROTO2,
        Syntax::Proto3 => &SURROGATE_PROTO3,
    }
}

pub(crate) fn is_surrogate(file: &File) -> bool {
    [&*SURROGATE_PROTO2, &*SURROGATE_PROTO3]
        .iter()
        .any(|s| std::ptr::eq(s.file(), file))
}
