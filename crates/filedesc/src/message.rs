//! Message and oneof descriptors.

use crate::base::{impl_descriptor, Base};
use crate::descopts::{self, OptionsFn};
use crate::enums::EnumId;
use crate::extension::ExtensionId;
use crate::field::FieldNode;
use crate::file::FileDescriptor;
use crate::list::{
    Enums, Extensions, FieldNumbers, FieldRanges, Fields, Messages, Names, OneofFields, Oneofs,
};
use prost_types::{ExtensionRangeOptions, MessageOptions, OneofOptions};
use std::fmt;
use std::sync::Arc;

/// Position of a message in its file's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub usize);

/// Eager part of a message: identity and nested declarations.
pub struct MessageNode {
    pub base: Base,
    pub enums: Vec<EnumId>,
    pub messages: Vec<MessageId>,
    pub extensions: Vec<ExtensionId>,
}

impl MessageNode {
    pub fn new(base: Base) -> Self {
        MessageNode {
            base,
            enums: Vec::new(),
            messages: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct MessageL2 {
    pub options: Option<OptionsFn<MessageOptions>>,
    /// Promoted from `MessageOptions.map_entry`.
    pub is_map_entry: bool,
    /// Promoted from `MessageOptions.message_set_wire_format`.
    pub is_message_set: bool,
    pub fields: Vec<FieldNode>,
    pub oneofs: Vec<OneofNode>,
    pub reserved_names: Names,
    pub reserved_ranges: FieldRanges,
    /// Exactly the numbers of the required fields.
    pub required_numbers: FieldNumbers,
    pub extension_ranges: FieldRanges,
    /// One entry per extension range, position-aligned.
    pub extension_range_options: Vec<Option<OptionsFn<ExtensionRangeOptions>>>,
}

pub struct OneofNode {
    pub base: Base,
    pub options: Option<OptionsFn<OneofOptions>>,
    /// Positions in the message's `fields` of the members, in declaration
    /// order. Exactly the fields whose `containing_oneof` names this oneof.
    pub fields: Vec<usize>,
}

/// Reference to a message type: by id inside the same file, or by handle
/// into another file.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageRef {
    Local(MessageId),
    Foreign(MessageDescriptor),
}

impl MessageRef {
    pub fn resolve(&self, file: &FileDescriptor) -> MessageDescriptor {
        match self {
            MessageRef::Local(id) => MessageDescriptor::new(file.clone(), *id),
            MessageRef::Foreign(md) => md.clone(),
        }
    }
}

// ============================================================================
// MessageDescriptor
// ============================================================================

#[derive(Clone)]
pub struct MessageDescriptor {
    pub(crate) file: FileDescriptor,
    pub(crate) id: MessageId,
}

impl MessageDescriptor {
    pub(crate) fn new(file: FileDescriptor, id: MessageId) -> Self {
        MessageDescriptor { file, id }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    fn node(&self) -> &MessageNode {
        &self.file.arena().messages[self.id.0]
    }

    fn base(&self) -> &Base {
        &self.node().base
    }

    pub(crate) fn lazy(&self) -> &MessageL2 {
        &self.file.lazy_init().messages[self.id.0]
    }

    pub fn options(&self) -> Arc<MessageOptions> {
        descopts::resolve(self.lazy().options.as_ref(), &descopts::MESSAGE)
    }

    pub fn is_map_entry(&self) -> bool {
        self.lazy().is_map_entry
    }

    /// Whether the message uses the legacy message-set wire format.
    pub fn is_message_set(&self) -> bool {
        self.lazy().is_message_set
    }

    /// A map entry with exactly a key field 1 and a value field 2.
    pub(crate) fn is_well_formed_map_entry(&self) -> bool {
        let fields = self.fields();
        self.is_map_entry()
            && fields.len() == 2
            && fields.by_number(1).is_some()
            && fields.by_number(2).is_some()
    }

    pub fn fields(&self) -> Fields<'_> {
        Fields::new(&self.file, self.id, &self.lazy().fields)
    }

    pub fn oneofs(&self) -> Oneofs<'_> {
        Oneofs::new(&self.file, self.id, &self.lazy().oneofs)
    }

    pub fn reserved_names(&self) -> &Names {
        &self.lazy().reserved_names
    }

    pub fn reserved_ranges(&self) -> &FieldRanges {
        &self.lazy().reserved_ranges
    }

    pub fn required_numbers(&self) -> &FieldNumbers {
        &self.lazy().required_numbers
    }

    pub fn extension_ranges(&self) -> &FieldRanges {
        &self.lazy().extension_ranges
    }

    /// Options of the `i`th extension range.
    ///
    /// # Panics
    ///
    /// If `i` is not below `extension_ranges().len()`.
    pub fn extension_range_options(&self, i: usize) -> Arc<ExtensionRangeOptions> {
        descopts::resolve(
            self.lazy().extension_range_options[i].as_ref(),
            &descopts::EXTENSION_RANGE,
        )
    }

    pub fn enums(&self) -> Enums<'_> {
        Enums::new(&self.file, &self.node().enums)
    }

    pub fn messages(&self) -> Messages<'_> {
        Messages::new(&self.file, &self.node().messages)
    }

    pub fn extensions(&self) -> Extensions<'_> {
        Extensions::new(&self.file, &self.node().extensions)
    }
}

impl_descriptor!(MessageDescriptor);

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.file.ptr_eq(&other.file) && self.id == other.id
    }
}

impl Eq for MessageDescriptor {}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor")
            .field(&self.base().full_name.as_str())
            .finish()
    }
}

// ============================================================================
// OneofDescriptor
// ============================================================================

#[derive(Clone)]
pub struct OneofDescriptor {
    pub(crate) file: FileDescriptor,
    pub(crate) message: MessageId,
    pub(crate) index: usize,
}

impl OneofDescriptor {
    pub(crate) fn new(file: FileDescriptor, message: MessageId, index: usize) -> Self {
        OneofDescriptor {
            file,
            message,
            index,
        }
    }

    fn node(&self) -> &OneofNode {
        &self.file.lazy_init().messages[self.message.0].oneofs[self.index]
    }

    fn base(&self) -> &Base {
        &self.node().base
    }

    pub fn options(&self) -> Arc<OneofOptions> {
        descopts::resolve(self.node().options.as_ref(), &descopts::ONEOF)
    }

    pub fn fields(&self) -> OneofFields<'_> {
        let fields = &self.file.lazy_init().messages[self.message.0].fields;
        OneofFields::new(&self.file, self.message, fields, &self.node().fields)
    }

    pub fn containing_message(&self) -> MessageDescriptor {
        MessageDescriptor::new(self.file.clone(), self.message)
    }
}

impl_descriptor!(OneofDescriptor);

impl PartialEq for OneofDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.file.ptr_eq(&other.file) && self.message == other.message && self.index == other.index
    }
}

impl Eq for OneofDescriptor {}

impl fmt::Debug for OneofDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OneofDescriptor")
            .field(&self.base().full_name.as_str())
            .finish()
    }
}
