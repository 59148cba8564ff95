use crate::types::Kind;
use thiserror::Error;

/// Failure to decode the schema text form of a default value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefvalError {
    #[error("invalid {kind} default value {text:?}")]
    Invalid { kind: Kind, text: String },

    #[error("enum default {text:?} does not name a value of the enum")]
    UnknownEnumValue { text: String },

    #[error("invalid escape sequence in bytes default {text:?}")]
    InvalidEscape { text: String },

    #[error("{0} fields cannot declare a default value")]
    UnsupportedKind(Kind),
}
