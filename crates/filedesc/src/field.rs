//! Field descriptors and the query surface fields share with extensions.

use crate::base::{impl_descriptor, Base, Descriptor};
use crate::default::DefaultValue;
use crate::descopts::{self, OptionsFn};
use crate::enums::{EnumDescriptor, EnumRef, EnumValueDescriptor};
use crate::file::FileDescriptor;
use crate::json_name::JsonName;
use crate::message::{MessageDescriptor, MessageId, MessageRef, OneofDescriptor};
use crate::types::{Cardinality, FieldNumber, Kind, Syntax};
use crate::value::Value;
use prost_types::FieldOptions;
use std::fmt;
use std::sync::Arc;

/// Queries shared by message fields and extensions.
pub trait FieldDesc: Descriptor {
    fn number(&self) -> FieldNumber;
    fn cardinality(&self) -> Cardinality;
    fn kind(&self) -> Kind;

    /// Whether the schema declared a JSON name.
    fn has_json_name(&self) -> bool;
    fn json_name(&self) -> &str;

    fn is_packed(&self) -> bool;
    fn is_extension(&self) -> bool;
    fn is_weak(&self) -> bool;
    fn is_list(&self) -> bool;
    fn is_map(&self) -> bool;
    fn map_key(&self) -> Option<FieldDescriptor>;
    fn map_value(&self) -> Option<FieldDescriptor>;

    fn has_default(&self) -> bool;
    /// The default, or `None` for repeated, message and group fields.
    fn default_value(&self) -> Option<Value>;
    fn default_enum_value(&self) -> Option<EnumValueDescriptor>;

    fn containing_oneof(&self) -> Option<OneofDescriptor>;
    fn containing_message(&self) -> MessageDescriptor;
    fn enum_type(&self) -> Option<EnumDescriptor>;
    fn message_type(&self) -> Option<MessageDescriptor>;

    fn options(&self) -> Arc<FieldOptions>;
}

pub struct FieldNode {
    pub base: Base,
    pub options: Option<OptionsFn<FieldOptions>>,
    pub number: FieldNumber,
    /// Consistent with the message's `required_numbers`.
    pub cardinality: Cardinality,
    pub kind: Kind,
    pub json_name: JsonName,
    /// Promoted from `FieldOptions.weak`.
    pub is_weak: bool,
    /// Whether `FieldOptions.packed` was set at all.
    pub has_packed: bool,
    /// Promoted from `FieldOptions.packed`.
    pub is_packed: bool,
    pub default: DefaultValue,
    /// Position in the message's `oneofs`; consistent with that oneof's members.
    pub containing_oneof: Option<usize>,
    pub enum_type: Option<EnumRef>,
    pub message_type: Option<MessageRef>,
}

impl FieldNode {
    /// A singular field with no options, default, or type reference.
    pub fn new(base: Base, number: FieldNumber, cardinality: Cardinality, kind: Kind) -> Self {
        FieldNode {
            base,
            options: None,
            number,
            cardinality,
            kind,
            json_name: JsonName::derived(),
            is_weak: false,
            has_packed: false,
            is_packed: false,
            default: DefaultValue::none(),
            containing_oneof: None,
            enum_type: None,
            message_type: None,
        }
    }
}

/// Whether repeated fields of `kind` are packed when the schema is silent.
///
/// Newer-syntax files pack every repeated scalar, enums included; strings,
/// bytes and message-like kinds are never packed.
pub(crate) fn packed_by_default(syntax: Syntax, cardinality: Cardinality, kind: Kind) -> bool {
    syntax != Syntax::Proto2
        && cardinality == Cardinality::Repeated
        && !kind.is_message_like()
        && !matches!(kind, Kind::String | Kind::Bytes)
}

// ============================================================================
// FieldDescriptor
// ============================================================================

#[derive(Clone)]
pub struct FieldDescriptor {
    pub(crate) file: FileDescriptor,
    pub(crate) message: MessageId,
    pub(crate) index: usize,
}

impl FieldDescriptor {
    pub(crate) fn new(file: FileDescriptor, message: MessageId, index: usize) -> Self {
        FieldDescriptor {
            file,
            message,
            index,
        }
    }

    fn node(&self) -> &FieldNode {
        &self.file.lazy_init().messages[self.message.0].fields[self.index]
    }

    fn base(&self) -> &Base {
        &self.node().base
    }
}

impl_descriptor!(FieldDescriptor);

impl FieldDesc for FieldDescriptor {
    fn number(&self) -> FieldNumber {
        self.node().number
    }

    fn cardinality(&self) -> Cardinality {
        self.node().cardinality
    }

    fn kind(&self) -> Kind {
        self.node().kind
    }

    fn has_json_name(&self) -> bool {
        self.node().json_name.has()
    }

    fn json_name(&self) -> &str {
        let node = self.node();
        node.json_name.get(node.base.full_name.name())
    }

    fn is_packed(&self) -> bool {
        let node = self.node();
        if !node.has_packed && packed_by_default(self.file.syntax(), node.cardinality, node.kind) {
            return true;
        }
        node.is_packed
    }

    fn is_extension(&self) -> bool {
        false
    }

    fn is_weak(&self) -> bool {
        self.node().is_weak
    }

    fn is_list(&self) -> bool {
        self.cardinality() == Cardinality::Repeated && !self.is_map()
    }

    fn is_map(&self) -> bool {
        self.message_type()
            .is_some_and(|md| md.is_well_formed_map_entry())
    }

    fn map_key(&self) -> Option<FieldDescriptor> {
        if !self.is_map() {
            return None;
        }
        self.message_type()?.fields().by_number(1)
    }

    fn map_value(&self) -> Option<FieldDescriptor> {
        if !self.is_map() {
            return None;
        }
        self.message_type()?.fields().by_number(2)
    }

    fn has_default(&self) -> bool {
        self.node().default.has()
    }

    fn default_value(&self) -> Option<Value> {
        let node = self.node();
        node.default
            .get(node.cardinality, node.kind, || self.enum_type())
    }

    fn default_enum_value(&self) -> Option<EnumValueDescriptor> {
        let node = self.node();
        node.default
            .enum_value(&self.file, node.cardinality, node.kind, || self.enum_type())
    }

    fn containing_oneof(&self) -> Option<OneofDescriptor> {
        let index = self.node().containing_oneof?;
        Some(OneofDescriptor::new(self.file.clone(), self.message, index))
    }

    fn containing_message(&self) -> MessageDescriptor {
        MessageDescriptor::new(self.file.clone(), self.message)
    }

    fn enum_type(&self) -> Option<EnumDescriptor> {
        Some(self.node().enum_type.as_ref()?.resolve(&self.file))
    }

    fn message_type(&self) -> Option<MessageDescriptor> {
        Some(self.node().message_type.as_ref()?.resolve(&self.file))
    }

    fn options(&self) -> Arc<FieldOptions> {
        descopts::resolve(self.node().options.as_ref(), &descopts::FIELD)
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.file.ptr_eq(&other.file) && self.message == other.message && self.index == other.index
    }
}

impl Eq for FieldDescriptor {}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.base().full_name.as_str())
            .field("number", &self.number())
            .finish()
    }
}
