//! Extension descriptors.

use crate::base::{impl_descriptor, Base};
use crate::default::DefaultValue;
use crate::descopts::{self, OptionsFn};
use crate::enums::{EnumDescriptor, EnumRef, EnumValueDescriptor};
use crate::field::{FieldDesc, FieldDescriptor};
use crate::file::FileDescriptor;
use crate::json_name::JsonName;
use crate::message::{MessageDescriptor, MessageRef, OneofDescriptor};
use crate::types::{Cardinality, FieldNumber, Kind};
use crate::value::Value;
use prost_types::FieldOptions;
use std::fmt;
use std::sync::Arc;

/// Position of an extension in its file's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionId(pub usize);

/// Eager part of an extension.
pub struct ExtensionNode {
    pub base: Base,
    pub number: FieldNumber,
    pub extendee: MessageRef,
    pub kind: Kind,
}

#[derive(Default)]
pub struct ExtensionL2 {
    pub options: Option<OptionsFn<FieldOptions>>,
    pub cardinality: Cardinality,
    pub json_name: JsonName,
    /// Promoted from `FieldOptions.packed`.
    pub is_packed: bool,
    pub default: DefaultValue,
    pub enum_type: Option<EnumRef>,
    pub message_type: Option<MessageRef>,
}

#[derive(Clone)]
pub struct ExtensionDescriptor {
    pub(crate) file: FileDescriptor,
    pub(crate) id: ExtensionId,
}

impl ExtensionDescriptor {
    pub(crate) fn new(file: FileDescriptor, id: ExtensionId) -> Self {
        ExtensionDescriptor { file, id }
    }

    pub fn id(&self) -> ExtensionId {
        self.id
    }

    fn node(&self) -> &ExtensionNode {
        &self.file.arena().extensions[self.id.0]
    }

    fn base(&self) -> &Base {
        &self.node().base
    }

    fn lazy(&self) -> &ExtensionL2 {
        &self.file.lazy_init().extensions[self.id.0]
    }
}

impl_descriptor!(ExtensionDescriptor);

impl FieldDesc for ExtensionDescriptor {
    fn number(&self) -> FieldNumber {
        self.node().number
    }

    fn cardinality(&self) -> Cardinality {
        self.lazy().cardinality
    }

    fn kind(&self) -> Kind {
        self.node().kind
    }

    fn has_json_name(&self) -> bool {
        self.lazy().json_name.has()
    }

    fn json_name(&self) -> &str {
        self.lazy().json_name.get(self.node().base.full_name.name())
    }

    fn is_packed(&self) -> bool {
        self.lazy().is_packed
    }

    fn is_extension(&self) -> bool {
        true
    }

    /// Weak extensions are not supported.
    fn is_weak(&self) -> bool {
        false
    }

    fn is_list(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
    }

    fn is_map(&self) -> bool {
        false
    }

    fn map_key(&self) -> Option<FieldDescriptor> {
        None
    }

    fn map_value(&self) -> Option<FieldDescriptor> {
        None
    }

    fn has_default(&self) -> bool {
        self.lazy().default.has()
    }

    fn default_value(&self) -> Option<Value> {
        let l2 = self.lazy();
        l2.default
            .get(l2.cardinality, self.node().kind, || self.enum_type())
    }

    fn default_enum_value(&self) -> Option<EnumValueDescriptor> {
        let l2 = self.lazy();
        l2.default
            .enum_value(&self.file, l2.cardinality, self.node().kind, || self.enum_type())
    }

    fn containing_oneof(&self) -> Option<OneofDescriptor> {
        None
    }

    /// The extended message.
    fn containing_message(&self) -> MessageDescriptor {
        self.node().extendee.resolve(&self.file)
    }

    fn enum_type(&self) -> Option<EnumDescriptor> {
        Some(self.lazy().enum_type.as_ref()?.resolve(&self.file))
    }

    fn message_type(&self) -> Option<MessageDescriptor> {
        Some(self.lazy().message_type.as_ref()?.resolve(&self.file))
    }

    fn options(&self) -> Arc<FieldOptions> {
        descopts::resolve(self.lazy().options.as_ref(), &descopts::FIELD)
    }
}

impl PartialEq for ExtensionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.file.ptr_eq(&other.file) && self.id == other.id
    }
}

impl Eq for ExtensionDescriptor {}

impl fmt::Debug for ExtensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("name", &self.base().full_name.as_str())
            .field("number", &self.node().number)
            .finish()
    }
}
