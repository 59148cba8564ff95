//! Ordered, indexable views over a descriptor's children, and the small
//! set types used for reserved names and number ranges.
//!
//! Lists borrow the owning handle's storage and hand out fresh handles by
//! value; they never allocate per access.

use crate::enums::{EnumDescriptor, EnumId, EnumValueDescriptor, EnumValueNode};
use crate::extension::{ExtensionDescriptor, ExtensionId};
use crate::field::{FieldDescriptor, FieldNode};
use crate::file::FileDescriptor;
use crate::message::{MessageDescriptor, MessageId, OneofDescriptor, OneofNode};
use crate::service::{MethodDescriptor, MethodNode, ServiceDescriptor, ServiceId};
use crate::types::{EnumNumber, FieldNumber};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Declaration lists (eager, by arena id)
// ============================================================================

macro_rules! id_list {
    ($(#[$doc:meta])* $list:ident, $handle:ident, $id:ident, $arena:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy)]
        pub struct $list<'a> {
            file: &'a FileDescriptor,
            ids: &'a [$id],
        }

        impl<'a> $list<'a> {
            pub(crate) fn new(file: &'a FileDescriptor, ids: &'a [$id]) -> Self {
                $list { file, ids }
            }

            pub fn len(&self) -> usize {
                self.ids.len()
            }

            pub fn is_empty(&self) -> bool {
                self.ids.is_empty()
            }

            /// # Panics
            ///
            /// If `i` is out of range.
            pub fn get(&self, i: usize) -> $handle {
                $handle::new(self.file.clone(), self.ids[i])
            }

            pub fn iter(&self) -> impl Iterator<Item = $handle> + 'a {
                let file = self.file;
                self.ids.iter().map(move |&id| $handle::new(file.clone(), id))
            }

            /// Find a direct child by its short name.
            pub fn by_name(&self, name: &str) -> Option<$handle> {
                let arena = &self.file.arena().$arena;
                self.ids
                    .iter()
                    .find(|id| arena[id.0].base.full_name.name() == name)
                    .map(|&id| $handle::new(self.file.clone(), id))
            }
        }

        impl fmt::Debug for $list<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list().entries(self.iter()).finish()
            }
        }
    };
}

id_list!(
    /// Enums declared directly under a file or message.
    Enums, EnumDescriptor, EnumId, enums
);
id_list!(
    /// Messages declared directly under a file or message.
    Messages, MessageDescriptor, MessageId, messages
);
id_list!(
    /// Extensions declared directly under a file or message.
    Extensions, ExtensionDescriptor, ExtensionId, extensions
);
id_list!(Services, ServiceDescriptor, ServiceId, services);

impl Extensions<'_> {
    pub fn by_number(&self, number: FieldNumber) -> Option<ExtensionDescriptor> {
        use crate::field::FieldDesc;
        self.iter().find(|xd| xd.number() == number)
    }
}

// ============================================================================
// Child lists (deferred, by position)
// ============================================================================

#[derive(Clone, Copy)]
pub struct EnumValues<'a> {
    parent: &'a EnumDescriptor,
    nodes: &'a [EnumValueNode],
}

impl<'a> EnumValues<'a> {
    pub(crate) fn new(parent: &'a EnumDescriptor, nodes: &'a [EnumValueNode]) -> Self {
        EnumValues { parent, nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, i: usize) -> EnumValueDescriptor {
        assert!(i < self.nodes.len(), "enum value index {i} out of range");
        self.handle(i)
    }

    fn handle(&self, i: usize) -> EnumValueDescriptor {
        EnumValueDescriptor::new(self.parent.file.clone(), self.parent.id, i)
    }

    pub fn iter(&self) -> impl Iterator<Item = EnumValueDescriptor> + 'a {
        let parent = self.parent;
        (0..self.nodes.len())
            .map(move |i| EnumValueDescriptor::new(parent.file.clone(), parent.id, i))
    }

    pub fn by_name(&self, name: &str) -> Option<EnumValueDescriptor> {
        let i = self
            .nodes
            .iter()
            .position(|n| n.base.full_name.name() == name)?;
        Some(self.handle(i))
    }

    /// The first declared value with `number`; later aliases are skipped.
    pub fn by_number(&self, number: EnumNumber) -> Option<EnumValueDescriptor> {
        let i = self.nodes.iter().position(|n| n.number == number)?;
        Some(self.handle(i))
    }
}

impl fmt::Debug for EnumValues<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[derive(Clone, Copy)]
pub struct Fields<'a> {
    file: &'a FileDescriptor,
    message: MessageId,
    nodes: &'a [FieldNode],
}

impl<'a> Fields<'a> {
    pub(crate) fn new(file: &'a FileDescriptor, message: MessageId, nodes: &'a [FieldNode]) -> Self {
        Fields {
            file,
            message,
            nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, i: usize) -> FieldDescriptor {
        assert!(i < self.nodes.len(), "field index {i} out of range");
        self.handle(i)
    }

    fn handle(&self, i: usize) -> FieldDescriptor {
        FieldDescriptor::new(self.file.clone(), self.message, i)
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldDescriptor> + 'a {
        let (file, message) = (self.file, self.message);
        (0..self.nodes.len()).map(move |i| FieldDescriptor::new(file.clone(), message, i))
    }

    pub fn by_name(&self, name: &str) -> Option<FieldDescriptor> {
        let i = self
            .nodes
            .iter()
            .position(|n| n.base.full_name.name() == name)?;
        Some(self.handle(i))
    }

    pub fn by_json_name(&self, json_name: &str) -> Option<FieldDescriptor> {
        let i = self
            .nodes
            .iter()
            .position(|n| n.json_name.get(n.base.full_name.name()) == json_name)?;
        Some(self.handle(i))
    }

    pub fn by_number(&self, number: FieldNumber) -> Option<FieldDescriptor> {
        let i = self.nodes.iter().position(|n| n.number == number)?;
        Some(self.handle(i))
    }
}

impl fmt::Debug for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[derive(Clone, Copy)]
pub struct Oneofs<'a> {
    file: &'a FileDescriptor,
    message: MessageId,
    nodes: &'a [OneofNode],
}

impl<'a> Oneofs<'a> {
    pub(crate) fn new(file: &'a FileDescriptor, message: MessageId, nodes: &'a [OneofNode]) -> Self {
        Oneofs {
            file,
            message,
            nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, i: usize) -> OneofDescriptor {
        assert!(i < self.nodes.len(), "oneof index {i} out of range");
        OneofDescriptor::new(self.file.clone(), self.message, i)
    }

    pub fn iter(&self) -> impl Iterator<Item = OneofDescriptor> + 'a {
        let (file, message) = (self.file, self.message);
        (0..self.nodes.len()).map(move |i| OneofDescriptor::new(file.clone(), message, i))
    }

    pub fn by_name(&self, name: &str) -> Option<OneofDescriptor> {
        let i = self
            .nodes
            .iter()
            .position(|n| n.base.full_name.name() == name)?;
        Some(OneofDescriptor::new(self.file.clone(), self.message, i))
    }
}

impl fmt::Debug for Oneofs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// The member fields of a oneof, in declaration order.
#[derive(Clone, Copy)]
pub struct OneofFields<'a> {
    file: &'a FileDescriptor,
    message: MessageId,
    fields: &'a [FieldNode],
    members: &'a [usize],
}

impl<'a> OneofFields<'a> {
    pub(crate) fn new(
        file: &'a FileDescriptor,
        message: MessageId,
        fields: &'a [FieldNode],
        members: &'a [usize],
    ) -> Self {
        OneofFields {
            file,
            message,
            fields,
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, i: usize) -> FieldDescriptor {
        FieldDescriptor::new(self.file.clone(), self.message, self.members[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldDescriptor> + 'a {
        let (file, message) = (self.file, self.message);
        self.members
            .iter()
            .map(move |&i| FieldDescriptor::new(file.clone(), message, i))
    }

    pub fn by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.find(|n| n.base.full_name.name() == name)
    }

    pub fn by_number(&self, number: FieldNumber) -> Option<FieldDescriptor> {
        self.find(|n| n.number == number)
    }

    fn find(&self, pred: impl Fn(&FieldNode) -> bool) -> Option<FieldDescriptor> {
        let &i = self.members.iter().find(|&&i| pred(&self.fields[i]))?;
        Some(FieldDescriptor::new(self.file.clone(), self.message, i))
    }
}

impl fmt::Debug for OneofFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[derive(Clone, Copy)]
pub struct Methods<'a> {
    file: &'a FileDescriptor,
    service: ServiceId,
    nodes: &'a [MethodNode],
}

impl<'a> Methods<'a> {
    pub(crate) fn new(file: &'a FileDescriptor, service: ServiceId, nodes: &'a [MethodNode]) -> Self {
        Methods {
            file,
            service,
            nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, i: usize) -> MethodDescriptor {
        assert!(i < self.nodes.len(), "method index {i} out of range");
        MethodDescriptor::new(self.file.clone(), self.service, i)
    }

    pub fn iter(&self) -> impl Iterator<Item = MethodDescriptor> + 'a {
        let (file, service) = (self.file, self.service);
        (0..self.nodes.len()).map(move |i| MethodDescriptor::new(file.clone(), service, i))
    }

    pub fn by_name(&self, name: &str) -> Option<MethodDescriptor> {
        let i = self
            .nodes
            .iter()
            .position(|n| n.base.full_name.name() == name)?;
        Some(MethodDescriptor::new(self.file.clone(), self.service, i))
    }
}

impl fmt::Debug for Methods<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// ============================================================================
// Imports
// ============================================================================

/// A dependency of a file.
#[derive(Debug, Clone)]
pub struct FileImport {
    pub path: String,
    /// `None` when the dependency was not available at build time.
    pub file: Option<FileDescriptor>,
    pub is_public: bool,
    pub is_weak: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FileImports<'a>(&'a [FileImport]);

impl<'a> FileImports<'a> {
    pub(crate) fn new(imports: &'a [FileImport]) -> Self {
        FileImports(imports)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> &'a FileImport {
        &self.0[i]
    }

    pub fn iter(&self) -> std::slice::Iter<'a, FileImport> {
        self.0.iter()
    }
}

// ============================================================================
// Sets
// ============================================================================

/// Reserved names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Names(Vec<String>);

impl Names {
    pub fn new(names: Vec<String>) -> Self {
        Names(names)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> &str {
        &self.0[i]
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Field number ranges, each `[start, end)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldRanges(Vec<(FieldNumber, FieldNumber)>);

impl FieldRanges {
    pub fn new(ranges: Vec<(FieldNumber, FieldNumber)>) -> Self {
        FieldRanges(ranges)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> (FieldNumber, FieldNumber) {
        self.0[i]
    }

    pub fn has(&self, n: FieldNumber) -> bool {
        self.0.iter().any(|&(start, end)| start <= n && n < end)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldNumber, FieldNumber)> + '_ {
        self.0.iter().copied()
    }
}

/// Enum number ranges, each `[start, end]` inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumRanges(Vec<(EnumNumber, EnumNumber)>);

impl EnumRanges {
    pub fn new(ranges: Vec<(EnumNumber, EnumNumber)>) -> Self {
        EnumRanges(ranges)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> (EnumNumber, EnumNumber) {
        self.0[i]
    }

    pub fn has(&self, n: EnumNumber) -> bool {
        self.0.iter().any(|&(start, end)| start <= n && n <= end)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnumNumber, EnumNumber)> + '_ {
        self.0.iter().copied()
    }
}

/// A list of field numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldNumbers(Vec<FieldNumber>);

impl FieldNumbers {
    pub fn new(numbers: Vec<FieldNumber>) -> Self {
        FieldNumbers(numbers)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> FieldNumber {
        self.0[i]
    }

    pub fn has(&self, n: FieldNumber) -> bool {
        self.0.contains(&n)
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldNumber> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_ranges_are_half_open() {
        let r = FieldRanges::new(vec![(1, 5), (100, 101)]);
        assert!(r.has(1));
        assert!(r.has(4));
        assert!(!r.has(5));
        assert!(r.has(100));
        assert!(!r.has(101));
        assert!(!r.has(0));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn enum_ranges_are_inclusive() {
        let r = EnumRanges::new(vec![(-3, -1), (7, 7)]);
        assert!(r.has(-3));
        assert!(r.has(-1));
        assert!(!r.has(0));
        assert!(r.has(7));
        assert!(!r.has(8));
    }

    #[test]
    fn names_and_numbers() {
        let names = Names::new(vec!["foo".into(), "bar".into()]);
        assert!(names.has("bar"));
        assert!(!names.has("baz"));
        assert_eq!(names.iter().collect::<Vec<_>>(), ["foo", "bar"]);

        let numbers = FieldNumbers::new(vec![3, 1]);
        assert!(numbers.has(1));
        assert!(!numbers.has(2));
        assert_eq!(numbers.get(0), 3);
    }

    #[test]
    fn sets_serialize_as_plain_sequences() {
        let r = FieldRanges::new(vec![(1, 5)]);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "[[1,5]]");
        let back: FieldRanges = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
