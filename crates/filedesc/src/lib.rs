//! Protobuf descriptor object model with per-file deferred initialization.
//!
//! A schema is a graph of descriptors rooted at files. Each file is built in
//! two layers: an eager layer holding names, parents and nesting, and a
//! deferred layer holding everything else (fields, options, defaults,
//! imports), produced once by a builder-supplied routine on first use.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       FILE DESCRIPTOR                               │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  ┌──────────────┐    first deferred access    ┌──────────────────┐  │
//! │  │   FileL1     │ ──────────────────────────► │  FileL2          │  │
//! │  │  (eager)     │     one lock, one pass      │  (deferred)      │  │
//! │  │ names, nest  │                             │ fields, options, │  │
//! │  └──────────────┘                             │ defaults, imports│  │
//! │         ▲                                     └──────────────────┘  │
//! │         │ (FileDescriptor, id)                         ▲            │
//! │  ┌──────┴───────────────────────────────────────────────┴────────┐  │
//! │  │  Enum / EnumValue / Message / Field / Oneof / Extension /      │  │
//! │  │  Service / Method handles                                      │  │
//! │  └────────────────────────────────────────────────────────────────┘  │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Features
//!
//! - **At-most-once**: the deferred routine runs once per file, however many
//!   threads race on first access
//! - **Lock-free reads**: after publication no access takes a lock
//! - **Surrogates**: standalone descriptors answer syntax queries through a
//!   shared placeholder file without claiming it as their parent
//!
//! Building a graph from serialized `FileDescriptorProto` bytes lives in the
//! `filedesc-build` crate.

pub mod base;
pub mod default;
pub mod defval;
pub mod descopts;
pub mod enums;
pub mod error;
pub mod extension;
pub mod field;
pub mod file;
pub mod json_name;
pub mod lazy;
pub mod list;
pub mod message;
pub mod service;
pub mod standalone;
pub mod types;
pub mod value;

pub use base::{surrogate, AnyDescriptor, Base, Descriptor, ParentRef};
pub use default::{DefaultValue, EnumValueRef};
pub use enums::{
    EnumDescriptor, EnumId, EnumL2, EnumNode, EnumRef, EnumValueDescriptor, EnumValueNode,
};
pub use error::DefvalError;
pub use extension::{ExtensionDescriptor, ExtensionId, ExtensionL2, ExtensionNode};
pub use field::{FieldDesc, FieldDescriptor, FieldNode};
pub use file::{Arena, DeferredInit, File, FileDescriptor, FileL1, FileL2};
pub use json_name::{json_camel_case, JsonName};
pub use lazy::{Lazy, LazyCell};
pub use list::{
    EnumRanges, EnumValues, Enums, Extensions, FieldNumbers, FieldRanges, Fields, FileImport,
    FileImports, Messages, Methods, Names, OneofFields, Oneofs, Services,
};
pub use message::{
    MessageDescriptor, MessageId, MessageL2, MessageNode, MessageRef, OneofDescriptor, OneofNode,
};
pub use service::{MethodDescriptor, MethodNode, ServiceDescriptor, ServiceId, ServiceL2, ServiceNode};
pub use standalone::standalone_enum;
pub use types::{Cardinality, EnumNumber, FieldNumber, FullName, Kind, Syntax};
pub use value::{SharedBytes, Value};
