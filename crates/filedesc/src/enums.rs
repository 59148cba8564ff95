//! Enum and enum value descriptors.

use crate::base::{impl_descriptor, Base};
use crate::descopts::{self, OptionsFn};
use crate::file::{File, FileDescriptor};
use crate::list::{EnumRanges, EnumValues, Names};
use crate::types::EnumNumber;
use prost_types::{EnumOptions, EnumValueOptions};
use std::fmt;
use std::sync::Arc;

/// Position of an enum in its file's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(pub usize);

pub struct EnumNode {
    pub base: Base,
    /// Deferred data supplied at construction, for enums materialized without
    /// a serialized descriptor. When set, `values()` never touches the file's
    /// deferred pass and the file's own `EnumL2` slot is unused.
    pub eager: Option<EnumL2>,
}

#[derive(Default)]
pub struct EnumL2 {
    pub options: Option<OptionsFn<EnumOptions>>,
    /// Numbers may repeat (aliases); each value is still its own descriptor.
    pub values: Vec<EnumValueNode>,
    pub reserved_names: Names,
    pub reserved_ranges: EnumRanges,
}

pub struct EnumValueNode {
    pub base: Base,
    pub options: Option<OptionsFn<EnumValueOptions>>,
    pub number: EnumNumber,
}

/// Reference from a field to its enum type: by id inside the same file, or by
/// handle into another file.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumRef {
    Local(EnumId),
    Foreign(EnumDescriptor),
}

impl EnumRef {
    pub fn resolve(&self, file: &FileDescriptor) -> EnumDescriptor {
        match self {
            EnumRef::Local(id) => EnumDescriptor::new(file.clone(), *id),
            EnumRef::Foreign(ed) => ed.clone(),
        }
    }

    /// The value list of the referenced enum while `building` runs its
    /// deferred pass.
    ///
    /// An enum owned by `building` has no published deferred data yet, and
    /// asking for it through `values()` would wait on the lock the caller
    /// already holds. Such enums are read from `in_progress`, the enum slots
    /// the deferred routine has filled so far; enums of other files go
    /// through their own file's lazy pass.
    pub fn values_during_init<'a>(
        &'a self,
        building: &'a File,
        in_progress: &'a [EnumL2],
    ) -> &'a [EnumValueNode] {
        let (owner, id): (&File, EnumId) = match self {
            EnumRef::Local(id) => (building, *id),
            EnumRef::Foreign(ed) => (ed.file.file(), ed.id),
        };
        if !std::ptr::eq(owner, building) {
            if let EnumRef::Foreign(ed) = self {
                return &ed.l2().values;
            }
        }
        if let Some(eager) = &building.l1().arena.enums[id.0].eager {
            return &eager.values;
        }
        match in_progress.get(id.0) {
            Some(l2) => &l2.values,
            None => panic!(
                "enum {} is referenced before its deferred data was built",
                building.l1().arena.enums[id.0].base.full_name
            ),
        }
    }
}

// ============================================================================
// EnumDescriptor
// ============================================================================

#[derive(Clone)]
pub struct EnumDescriptor {
    pub(crate) file: FileDescriptor,
    pub(crate) id: EnumId,
}

impl EnumDescriptor {
    pub(crate) fn new(file: FileDescriptor, id: EnumId) -> Self {
        EnumDescriptor { file, id }
    }

    pub fn id(&self) -> EnumId {
        self.id
    }

    fn node(&self) -> &EnumNode {
        &self.file.arena().enums[self.id.0]
    }

    fn base(&self) -> &Base {
        &self.node().base
    }

    /// Deferred data, from the node when eager and from the file otherwise.
    fn l2(&self) -> &EnumL2 {
        match &self.node().eager {
            Some(l2) => l2,
            None => &self.file.lazy_init().enums[self.id.0],
        }
    }

    /// Like `l2`, but always runs the file's deferred pass first.
    fn lazy(&self) -> &EnumL2 {
        self.file.lazy_init();
        self.l2()
    }

    pub fn options(&self) -> Arc<EnumOptions> {
        descopts::resolve(self.lazy().options.as_ref(), &descopts::ENUM)
    }

    pub fn values(&self) -> EnumValues<'_> {
        EnumValues::new(self, &self.l2().values)
    }

    pub fn reserved_names(&self) -> &Names {
        &self.lazy().reserved_names
    }

    pub fn reserved_ranges(&self) -> &EnumRanges {
        &self.lazy().reserved_ranges
    }
}

impl_descriptor!(EnumDescriptor);

impl PartialEq for EnumDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.file.ptr_eq(&other.file) && self.id == other.id
    }
}

impl Eq for EnumDescriptor {}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumDescriptor")
            .field(&self.base().full_name.as_str())
            .finish()
    }
}

// ============================================================================
// EnumValueDescriptor
// ============================================================================

#[derive(Clone)]
pub struct EnumValueDescriptor {
    pub(crate) file: FileDescriptor,
    pub(crate) enum_id: EnumId,
    pub(crate) index: usize,
}

impl EnumValueDescriptor {
    pub(crate) fn new(file: FileDescriptor, enum_id: EnumId, index: usize) -> Self {
        EnumValueDescriptor {
            file,
            enum_id,
            index,
        }
    }

    fn node(&self) -> &EnumValueNode {
        let ed = &self.file.arena().enums[self.enum_id.0];
        match &ed.eager {
            Some(l2) => &l2.values[self.index],
            None => &self.file.lazy_init().enums[self.enum_id.0].values[self.index],
        }
    }

    fn base(&self) -> &Base {
        &self.node().base
    }

    pub fn number(&self) -> EnumNumber {
        self.node().number
    }

    pub fn options(&self) -> Arc<EnumValueOptions> {
        descopts::resolve(self.node().options.as_ref(), &descopts::ENUM_VALUE)
    }

    /// The enum declaring this value.
    pub fn parent_enum(&self) -> EnumDescriptor {
        EnumDescriptor::new(self.file.clone(), self.enum_id)
    }
}

impl_descriptor!(EnumValueDescriptor);

impl PartialEq for EnumValueDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.file.ptr_eq(&other.file) && self.enum_id == other.enum_id && self.index == other.index
    }
}

impl Eq for EnumValueDescriptor {}

impl fmt::Debug for EnumValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumValueDescriptor")
            .field("name", &self.base().full_name.as_str())
            .field("number", &self.number())
            .finish()
    }
}
