//! Schema text form of default values.
//!
//! `FieldDescriptorProto.default_value` stores defaults as text: decimal
//! numbers, `inf`/`-inf`/`nan` for floating point, `true`/`false`, strings
//! verbatim, bytes C-escaped, and enum defaults by value name.

use crate::error::DefvalError;
use crate::types::{EnumNumber, Kind};
use crate::value::{SharedBytes, Value};

/// Decode `text` as a default for a field of `kind`.
///
/// For enum kinds `enum_values` lists the enum's `(name, number)` pairs in
/// declaration order; the matched position is returned alongside the value.
pub fn decode<'a>(
    text: &str,
    kind: Kind,
    enum_values: impl IntoIterator<Item = (&'a str, EnumNumber)>,
) -> Result<(Value, Option<usize>), DefvalError> {
    let invalid = || DefvalError::Invalid {
        kind,
        text: text.to_string(),
    };

    let value = match kind {
        Kind::Bool => match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(invalid()),
        },
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => {
            Value::I32(text.parse().map_err(|_| invalid())?)
        }
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => {
            Value::I64(text.parse().map_err(|_| invalid())?)
        }
        Kind::Uint32 | Kind::Fixed32 => Value::U32(text.parse().map_err(|_| invalid())?),
        Kind::Uint64 | Kind::Fixed64 => Value::U64(text.parse().map_err(|_| invalid())?),
        Kind::Float => Value::F32(parse_float(text).ok_or_else(invalid)? as f32),
        Kind::Double => Value::F64(parse_float(text).ok_or_else(invalid)?),
        Kind::String => Value::String(text.to_string()),
        Kind::Bytes => Value::Bytes(SharedBytes::new(unescape_bytes(text)?)),
        Kind::Enum => {
            let found = enum_values
                .into_iter()
                .enumerate()
                .find(|(_, (name, _))| *name == text);
            return match found {
                Some((index, (_, number))) => Ok((Value::Enum(number), Some(index))),
                None => Err(DefvalError::UnknownEnumValue {
                    text: text.to_string(),
                }),
            };
        }
        Kind::Message | Kind::Group => return Err(DefvalError::UnsupportedKind(kind)),
    };
    Ok((value, None))
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => {
            // Reject the spellings Rust accepts but the schema text form does not.
            let lower = text.trim_start_matches(['-', '+']).to_ascii_lowercase();
            if lower.starts_with("inf") || lower.starts_with("nan") {
                return None;
            }
            text.parse().ok()
        }
    }
}

fn unescape_bytes(text: &str) -> Result<Vec<u8>, DefvalError> {
    let bad = || DefvalError::InvalidEscape {
        text: text.to_string(),
    };

    let src = text.as_bytes();
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        let b = src[i];
        i += 1;
        if b != b'\\' {
            out.push(b);
            continue;
        }
        let Some(&c) = src.get(i) else {
            return Err(bad());
        };
        i += 1;
        match c {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'v' => out.push(0x0b),
            b'"' | b'\'' | b'\\' | b'?' => out.push(c),
            b'0'..=b'7' => {
                let mut n = u32::from(c - b'0');
                for _ in 0..2 {
                    match src.get(i) {
                        Some(&d @ b'0'..=b'7') => {
                            n = n * 8 + u32::from(d - b'0');
                            i += 1;
                        }
                        _ => break,
                    }
                }
                out.push(u8::try_from(n).map_err(|_| bad())?);
            }
            b'x' | b'X' => {
                let mut n = 0u32;
                let mut digits = 0;
                while digits < 2 {
                    match src.get(i).and_then(|d| (*d as char).to_digit(16)) {
                        Some(d) => {
                            n = n * 16 + d;
                            i += 1;
                            digits += 1;
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    return Err(bad());
                }
                out.push(n as u8);
            }
            _ => return Err(bad()),
        }
    }
    Ok(out)
}
