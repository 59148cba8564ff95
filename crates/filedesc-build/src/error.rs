use thiserror::Error;

/// Reasons a serialized file descriptor cannot be turned into a graph.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to decode FileDescriptorProto: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("{path}: unsupported syntax {syntax:?}")]
    UnsupportedSyntax { path: String, syntax: String },

    #[error("extension {extension}: extendee {extendee:?} not found")]
    UnresolvedExtendee { extension: String, extendee: String },

    #[error("{path}: import {import:?} not among the supplied dependencies")]
    UnresolvedImport { path: String, import: String },

    #[error("{user}: type {type_name:?} not found")]
    UnresolvedType { user: String, type_name: String },

    #[error("{field}: oneof index {index} out of range for {count} oneofs")]
    OneofOutOfRange { field: String, index: i32, count: usize },

    #[error("{field}: unknown field type {value}")]
    UnknownKind { field: String, value: i32 },

    #[error("{field}: unknown field label {value}")]
    UnknownCardinality { field: String, value: i32 },

    #[error("{what} without a name in {scope:?}")]
    MissingName { what: &'static str, scope: String },
}
