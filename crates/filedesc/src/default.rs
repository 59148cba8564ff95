//! Default values of fields and extensions.

use crate::defval;
use crate::enums::{EnumDescriptor, EnumL2, EnumRef, EnumValueDescriptor, EnumValueNode};
use crate::file::{File, FileDescriptor};
use crate::types::{Cardinality, Kind};
use crate::value::{SharedBytes, Value};

/// A declared enum default: the enum and the position of the value in it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueRef {
    pub enum_ref: EnumRef,
    pub index: usize,
}

/// The default of a field or extension.
///
/// Without a declared default the kind's zero value is synthesized on every
/// read. A declared bytes default keeps a private copy of its bytes: the live
/// buffer is shared with every message that leaves the field unset, and a
/// mismatch on read means someone wrote through it.
#[derive(Debug, Default)]
pub struct DefaultValue {
    has: bool,
    val: Option<Value>,
    enum_value: Option<EnumValueRef>,
    bytes: Option<Vec<u8>>,
}

impl DefaultValue {
    /// No declared default.
    pub fn none() -> Self {
        DefaultValue::default()
    }

    pub fn new(val: Value, enum_value: Option<EnumValueRef>) -> Self {
        let bytes = match &val {
            Value::Bytes(b) => Some(b.to_vec()),
            _ => None,
        };
        DefaultValue {
            has: true,
            val: Some(val),
            enum_value,
            bytes,
        }
    }

    /// Decode the schema text form of a default during `building`'s deferred
    /// pass.
    ///
    /// `in_progress` holds the enum slots the pass has filled so far; enum
    /// types declared in `building` are resolved against it rather than
    /// through `values()`.
    ///
    /// # Panics
    ///
    /// If the text does not decode for `kind`. Schemas reaching this layer
    /// are already validated, so that is corruption rather than input error.
    pub fn unmarshal(
        raw: &str,
        kind: Kind,
        building: &File,
        in_progress: &[EnumL2],
        enum_type: Option<&EnumRef>,
    ) -> Self {
        let values: &[EnumValueNode] = match (kind, enum_type) {
            (Kind::Enum, Some(er)) => er.values_during_init(building, in_progress),
            (Kind::Enum, None) => panic!("enum default {raw:?} has no enum type"),
            _ => &[],
        };
        let names = values.iter().map(|v| (v.base.full_name.name(), v.number));
        match defval::decode(raw, kind, names) {
            Ok((val, index)) => {
                let enum_value = index.zip(enum_type).map(|(index, er)| EnumValueRef {
                    enum_ref: er.clone(),
                    index,
                });
                DefaultValue::new(val, enum_value)
            }
            Err(err) => panic!("{} in {:?}", err, building.l1().path),
        }
    }

    pub fn has(&self) -> bool {
        self.has
    }

    /// The default, or `None` for repeated, message and group fields.
    ///
    /// # Panics
    ///
    /// If a declared bytes default was mutated after construction.
    pub(crate) fn get(
        &self,
        cardinality: Cardinality,
        kind: Kind,
        enum_type: impl FnOnce() -> Option<EnumDescriptor>,
    ) -> Option<Value> {
        if !self.has {
            if cardinality == Cardinality::Repeated {
                return None;
            }
            return Some(match kind {
                Kind::Bool => Value::Bool(false),
                Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(0),
                Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(0),
                Kind::Uint32 | Kind::Fixed32 => Value::U32(0),
                Kind::Uint64 | Kind::Fixed64 => Value::U64(0),
                Kind::Float => Value::F32(0.0),
                Kind::Double => Value::F64(0.0),
                Kind::String => Value::String(String::new()),
                Kind::Bytes => Value::Bytes(SharedBytes::default()),
                // The first declared value, whatever its number.
                Kind::Enum => {
                    let ed = enum_type()?;
                    let first = ed.values().iter().next()?;
                    Value::Enum(first.number())
                }
                Kind::Message | Kind::Group => return None,
            });
        }

        if let (Some(saved), Some(Value::Bytes(live))) = (&self.bytes, &self.val) {
            if !saved.is_empty() && *live.read() != *saved {
                panic!("detected mutation on the default bytes");
            }
        }
        self.val.clone()
    }

    /// The enum value selected by the default: the declared one, or the first
    /// declared value for a singular enum field with no declared default.
    pub(crate) fn enum_value(
        &self,
        file: &FileDescriptor,
        cardinality: Cardinality,
        kind: Kind,
        enum_type: impl FnOnce() -> Option<EnumDescriptor>,
    ) -> Option<EnumValueDescriptor> {
        if let Some(ev) = &self.enum_value {
            let ed = ev.enum_ref.resolve(file);
            return Some(EnumValueDescriptor::new(ed.file, ed.id, ev.index));
        }
        if self.has || kind != Kind::Enum || cardinality == Cardinality::Repeated {
            return None;
        }
        enum_type()?.values().iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_zero_values() {
        let dv = DefaultValue::none();
        let get = |card, kind| dv.get(card, kind, || None);
        assert_eq!(get(Cardinality::Optional, Kind::Bool), Some(Value::Bool(false)));
        assert_eq!(get(Cardinality::Optional, Kind::Sfixed32), Some(Value::I32(0)));
        assert_eq!(get(Cardinality::Required, Kind::Sint64), Some(Value::I64(0)));
        assert_eq!(get(Cardinality::Optional, Kind::Fixed32), Some(Value::U32(0)));
        assert_eq!(get(Cardinality::Optional, Kind::Uint64), Some(Value::U64(0)));
        assert_eq!(get(Cardinality::Optional, Kind::Float), Some(Value::F32(0.0)));
        assert_eq!(get(Cardinality::Optional, Kind::Double), Some(Value::F64(0.0)));
        assert_eq!(get(Cardinality::Optional, Kind::String), Some(Value::String(String::new())));
        assert_eq!(
            get(Cardinality::Optional, Kind::Bytes),
            Some(Value::Bytes(SharedBytes::default()))
        );
        assert_eq!(get(Cardinality::Optional, Kind::Message), None);
        assert_eq!(get(Cardinality::Repeated, Kind::Int32), None);
        assert_eq!(get(Cardinality::Repeated, Kind::String), None);
        assert!(!dv.has());
    }

    #[test]
    fn explicit_value_is_returned() {
        let dv = DefaultValue::new(Value::I64(-3), None);
        assert!(dv.has());
        assert_eq!(dv.get(Cardinality::Optional, Kind::Int64, || None), Some(Value::I64(-3)));
    }

    #[test]
    fn bytes_default_is_copied_defensively() {
        let dv = DefaultValue::new(Value::Bytes(SharedBytes::new(b"abc".to_vec())), None);
        let first = dv.get(Cardinality::Optional, Kind::Bytes, || None).unwrap();
        assert_eq!(first.as_bytes().unwrap().to_vec(), b"abc".to_vec());
        // Reads share the buffer rather than copying it.
        let again = dv.get(Cardinality::Optional, Kind::Bytes, || None).unwrap();
        assert!(first.as_bytes().unwrap().ptr_eq(again.as_bytes().unwrap()));
    }

    #[test]
    #[should_panic(expected = "detected mutation on the default bytes")]
    fn mutated_bytes_default_panics() {
        let dv = DefaultValue::new(Value::Bytes(SharedBytes::new(b"abc".to_vec())), None);
        let live = dv.get(Cardinality::Optional, Kind::Bytes, || None).unwrap();
        live.as_bytes().unwrap().write()[0] = b'z';
        dv.get(Cardinality::Optional, Kind::Bytes, || None);
    }
}
