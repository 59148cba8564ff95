//! Descriptors that exist without a real file.
//!
//! Legacy generated code describes some enums only by name and value list.
//! Such an enum gets a private arena linked to the surrogate file of its
//! syntax: it answers `syntax()` but reports no parent file and no parent.

use crate::base::{Base, ParentRef};
use crate::descopts::OptionsFn;
use crate::enums::{EnumDescriptor, EnumId, EnumL2, EnumNode, EnumValueNode};
use crate::file::{File, FileL1, FileL2};
use crate::types::{EnumNumber, FullName, Syntax};
use prost_types::EnumOptions;

/// An enum with eagerly supplied values. Value full names are siblings of
/// the enum, as in generated code.
pub fn standalone_enum<'a>(
    syntax: Syntax,
    full_name: impl Into<FullName>,
    values: impl IntoIterator<Item = (&'a str, EnumNumber)>,
    options: Option<OptionsFn<EnumOptions>>,
) -> EnumDescriptor {
    let full_name = full_name.into();
    let scope = full_name.parent().unwrap_or_default();
    let values = values
        .into_iter()
        .enumerate()
        .map(|(i, (name, number))| EnumValueNode {
            base: Base::new(scope.append(name), ParentRef::Enum(EnumId(0)), i),
            options: None,
            number,
        })
        .collect();

    let mut l1 = FileL1::default();
    let id = l1.arena.push_enum(EnumNode {
        base: Base::new(full_name, ParentRef::None, 0),
        eager: Some(EnumL2 {
            options,
            values,
            ..EnumL2::default()
        }),
    });
    let l2 = FileL2 {
        // Slot kept for alignment; the eager data above is authoritative.
        enums: vec![EnumL2::default()],
        ..FileL2::default()
    };
    let file = File::new_standalone(syntax, l1, l2);
    EnumDescriptor::new(file, id)
}
