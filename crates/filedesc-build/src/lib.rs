//! Builds `filedesc` graphs from serialized `FileDescriptorProto` bytes.
//!
//! ```text
//!   bytes ──decode──► FileDescriptorProto
//!                          │
//!                          ├── eager pass ──► FileL1 (names, nesting,
//!                          │                  extendees, validation)
//!                          │
//!                          └── moved into the deferred routine ──► FileL2
//!                                 (fields, defaults, options, methods)
//!                                 on first deferred access
//! ```
//!
//! Structural problems in the input (names, kinds, labels, oneof indices and
//! every type reference) are rejected by the eager pass. Default value text
//! is only decoded by the deferred routine, which panics if it is malformed.

mod deferred;
mod error;
mod flatten;
mod resolve;

pub use error::BuildError;

use filedesc::{
    Base, Cardinality, EnumNode, ExtensionNode, File, FileDescriptor, FileImport, FileL1,
    FullName, Kind, MessageNode, ParentRef, ServiceNode, Syntax,
};
use flatten::Flat;
use prost::Message;
use prost_types::FileDescriptorProto;
use resolve::Resolver;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Run the deferred pass before returning
    pub eager_init: bool,
    /// Keep imports missing from `deps` as unresolved entries instead of failing
    pub allow_unresolved_imports: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            eager_init: false,
            allow_unresolved_imports: false,
        }
    }
}

/// Build the descriptor graph of one file.
///
/// `deps` are the already-built files this one may import or reference;
/// imports are matched to them by path, and type names not declared in this
/// file are looked up in each of them in order.
pub fn build_file(
    raw: &[u8],
    deps: &[FileDescriptor],
    config: &BuildConfig,
) -> Result<FileDescriptor, BuildError> {
    let started = Instant::now();
    let fdp = FileDescriptorProto::decode(raw)?;
    let syntax = parse_syntax(&fdp)?;
    let imports = resolve_imports(&fdp, deps, config)?;

    let l1 = {
        let flat = Flat::new(&fdp);
        let resolver = Resolver { local: &flat, deps };
        validate(&flat, &resolver)?;
        build_l1(&fdp, &flat, &resolver, syntax)?
    };

    let counts = (
        l1.arena.enums.len(),
        l1.arena.messages.len(),
        l1.arena.extensions.len(),
        l1.arena.services.len(),
    );
    let deps = deps.to_vec();
    let fd = File::new(l1, raw.to_vec(), move |file| {
        deferred::build_l2(file, &fdp, &deps, imports)
    });

    tracing::debug!(
        path = fd.path(),
        syntax = %fd.syntax(),
        enums = counts.0,
        messages = counts.1,
        extensions = counts.2,
        services = counts.3,
        elapsed_us = started.elapsed().as_micros() as u64,
        "built file descriptor"
    );

    if config.eager_init {
        fd.file().lazy_init();
    }
    Ok(fd)
}

fn parse_syntax(fdp: &FileDescriptorProto) -> Result<Syntax, BuildError> {
    match fdp.syntax() {
        "" | "proto2" => Ok(Syntax::Proto2),
        "proto3" => Ok(Syntax::Proto3),
        other => Err(BuildError::UnsupportedSyntax {
            path: fdp.name().to_string(),
            syntax: other.to_string(),
        }),
    }
}

fn resolve_imports(
    fdp: &FileDescriptorProto,
    deps: &[FileDescriptor],
    config: &BuildConfig,
) -> Result<Vec<FileImport>, BuildError> {
    let mut imports = Vec::with_capacity(fdp.dependency.len());
    for (i, path) in fdp.dependency.iter().enumerate() {
        let file = deps.iter().find(|d| d.path() == path).cloned();
        if file.is_none() {
            if !config.allow_unresolved_imports {
                return Err(BuildError::UnresolvedImport {
                    path: fdp.name().to_string(),
                    import: path.clone(),
                });
            }
            tracing::warn!(file = fdp.name(), import = %path, "import left unresolved");
        }
        let i = i as i32;
        imports.push(FileImport {
            path: path.clone(),
            file,
            is_public: fdp.public_dependency.contains(&i),
            is_weak: fdp.weak_dependency.contains(&i),
        });
    }
    Ok(imports)
}

/// Reject input the deferred pass would otherwise have to panic on.
fn validate(flat: &Flat<'_>, resolver: &Resolver<'_, Flat<'_>>) -> Result<(), BuildError> {
    let missing = |what, scope: &FullName| BuildError::MissingName {
        what,
        scope: scope.to_string(),
    };

    for d in &flat.enums {
        if d.proto.name().is_empty() {
            return Err(missing("enum", &d.scope));
        }
        if d.proto.value.iter().any(|v| v.name().is_empty()) {
            return Err(missing("enum value", &d.full_name));
        }
    }
    for d in &flat.messages {
        if d.proto.name().is_empty() {
            return Err(missing("message", &d.scope));
        }
        if d.proto.oneof_decl.iter().any(|o| o.name().is_empty()) {
            return Err(missing("oneof", &d.full_name));
        }
        for f in &d.proto.field {
            if f.name().is_empty() {
                return Err(missing("field", &d.full_name));
            }
            let full_name = d.full_name.append(f.name());
            check_field(f, &full_name, &d.full_name, resolver)?;
            if let Some(index) = f.oneof_index {
                let count = d.proto.oneof_decl.len();
                if usize::try_from(index).map_or(true, |i| i >= count) {
                    return Err(BuildError::OneofOutOfRange {
                        field: full_name.to_string(),
                        index,
                        count,
                    });
                }
            }
        }
    }
    for d in &flat.extensions {
        if d.proto.name().is_empty() {
            return Err(missing("extension", &d.scope));
        }
        check_field(d.proto, &d.full_name, &d.scope, resolver)?;
    }
    for d in &flat.services {
        if d.proto.name().is_empty() {
            return Err(missing("service", &d.scope));
        }
        for m in &d.proto.method {
            if m.name().is_empty() {
                return Err(missing("method", &d.full_name));
            }
            let full_name = d.full_name.append(m.name());
            for type_name in [m.input_type(), m.output_type()] {
                if resolver.message(&d.full_name, type_name).is_none() {
                    return Err(unresolved(&full_name, type_name));
                }
            }
        }
    }
    Ok(())
}

fn check_field(
    proto: &prost_types::FieldDescriptorProto,
    full_name: &FullName,
    scope: &FullName,
    resolver: &Resolver<'_, Flat<'_>>,
) -> Result<(), BuildError> {
    let type_name = proto.type_name();
    let found = match resolver.field_kind(proto, full_name, scope)? {
        Kind::Enum => resolver.enum_type(scope, type_name).is_some(),
        kind if kind.is_message_like() => resolver.message(scope, type_name).is_some(),
        _ => true,
    };
    if !found {
        return Err(unresolved(full_name, type_name));
    }
    if let Some(label) = proto.label {
        if Cardinality::from_label(label).is_none() {
            return Err(BuildError::UnknownCardinality {
                field: full_name.to_string(),
                value: label,
            });
        }
    }
    Ok(())
}

fn unresolved(user: &FullName, type_name: &str) -> BuildError {
    BuildError::UnresolvedType {
        user: user.to_string(),
        type_name: type_name.to_string(),
    }
}

fn build_l1(
    fdp: &FileDescriptorProto,
    flat: &Flat<'_>,
    resolver: &Resolver<'_, Flat<'_>>,
    syntax: Syntax,
) -> Result<FileL1, BuildError> {
    let mut l1 = FileL1 {
        syntax,
        path: fdp.name().to_string(),
        package: FullName::new(fdp.package()),
        ..FileL1::default()
    };

    // Messages first: nested declarations attach to already allocated parents.
    for d in &flat.messages {
        let id = l1.arena.push_message(MessageNode::new(base(d)));
        match d.parent {
            ParentRef::Message(parent) => l1.arena.messages[parent.0].messages.push(id),
            _ => l1.messages.push(id),
        }
    }
    for d in &flat.enums {
        let id = l1.arena.push_enum(EnumNode {
            base: base(d),
            eager: None,
        });
        match d.parent {
            ParentRef::Message(parent) => l1.arena.messages[parent.0].enums.push(id),
            _ => l1.enums.push(id),
        }
    }
    for d in &flat.extensions {
        let extendee = d.proto.extendee();
        let Some(extendee_ref) = resolver.message(&d.scope, extendee) else {
            return Err(BuildError::UnresolvedExtendee {
                extension: d.full_name.to_string(),
                extendee: extendee.to_string(),
            });
        };
        let id = l1.arena.push_extension(ExtensionNode {
            base: base(d),
            number: d.proto.number(),
            extendee: extendee_ref,
            kind: resolver.field_kind(d.proto, &d.full_name, &d.scope)?,
        });
        match d.parent {
            ParentRef::Message(parent) => l1.arena.messages[parent.0].extensions.push(id),
            _ => l1.extensions.push(id),
        }
    }
    for d in &flat.services {
        let id = l1.arena.push_service(ServiceNode { base: base(d) });
        l1.services.push(id);
    }
    Ok(l1)
}

fn base<T>(d: &flatten::Decl<'_, T>) -> Base {
    Base::new(d.full_name.clone(), d.parent, d.index)
}
