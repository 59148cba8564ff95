//! Type name resolution against the file being built and its dependencies.

use crate::error::BuildError;
use crate::flatten::Flat;
use filedesc::{
    EnumId, EnumRef, File, FileDescriptor, FullName, Kind, MessageId, MessageRef,
};
use prost_types::FieldDescriptorProto;

/// Declarations of the file being built, by full name.
pub(crate) trait LocalScope {
    fn message_id(&self, name: &str) -> Option<MessageId>;
    fn enum_id(&self, name: &str) -> Option<EnumId>;
}

impl LocalScope for Flat<'_> {
    fn message_id(&self, name: &str) -> Option<MessageId> {
        Flat::message_id(self, name)
    }

    fn enum_id(&self, name: &str) -> Option<EnumId> {
        Flat::enum_id(self, name)
    }
}

impl LocalScope for File {
    fn message_id(&self, name: &str) -> Option<MessageId> {
        self.find_message_id(name)
    }

    fn enum_id(&self, name: &str) -> Option<EnumId> {
        self.find_enum_id(name)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum TypeRef {
    Enum(EnumRef),
    Message(MessageRef),
}

pub(crate) struct Resolver<'a, L: ?Sized> {
    pub local: &'a L,
    pub deps: &'a [FileDescriptor],
}

impl<L: LocalScope + ?Sized> Resolver<'_, L> {
    /// Resolve `type_name` as written inside `scope`.
    ///
    /// A leading dot marks a fully qualified name. Otherwise the name is
    /// tried in `scope`, then in each enclosing scope out to the root.
    pub fn resolve(&self, scope: &FullName, type_name: &str) -> Option<TypeRef> {
        candidates(scope, type_name)
            .iter()
            .find_map(|name| self.lookup(name.as_str()))
    }

    pub fn message(&self, scope: &FullName, type_name: &str) -> Option<MessageRef> {
        match self.resolve(scope, type_name)? {
            TypeRef::Message(m) => Some(m),
            TypeRef::Enum(_) => None,
        }
    }

    pub fn enum_type(&self, scope: &FullName, type_name: &str) -> Option<EnumRef> {
        match self.resolve(scope, type_name)? {
            TypeRef::Enum(e) => Some(e),
            TypeRef::Message(_) => None,
        }
    }

    fn lookup(&self, name: &str) -> Option<TypeRef> {
        if let Some(id) = self.local.message_id(name) {
            return Some(TypeRef::Message(MessageRef::Local(id)));
        }
        if let Some(id) = self.local.enum_id(name) {
            return Some(TypeRef::Enum(EnumRef::Local(id)));
        }
        self.deps.iter().find_map(|dep| lookup_in(dep, name))
    }

    /// The field's kind. A missing type number is inferred from what the
    /// type name resolves to.
    pub fn field_kind(
        &self,
        proto: &FieldDescriptorProto,
        field: &FullName,
        scope: &FullName,
    ) -> Result<Kind, BuildError> {
        let unknown = |value| BuildError::UnknownKind {
            field: field.to_string(),
            value,
        };
        match proto.r#type {
            Some(t) => Kind::from_type(t).ok_or_else(|| unknown(t)),
            None => match self.resolve(scope, proto.type_name()) {
                Some(TypeRef::Enum(_)) => Ok(Kind::Enum),
                Some(TypeRef::Message(_)) => Ok(Kind::Message),
                None => Err(unknown(0)),
            },
        }
    }
}

/// Search `dep` and, through public imports, whatever it re-exports.
fn lookup_in(dep: &FileDescriptor, name: &str) -> Option<TypeRef> {
    if let Some(md) = dep.find_message(name) {
        tracing::trace!(name, dep = dep.path(), "resolved message in dependency");
        return Some(TypeRef::Message(MessageRef::Foreign(md)));
    }
    if let Some(ed) = dep.find_enum(name) {
        tracing::trace!(name, dep = dep.path(), "resolved enum in dependency");
        return Some(TypeRef::Enum(EnumRef::Foreign(ed)));
    }
    dep.imports()
        .iter()
        .filter(|imp| imp.is_public)
        .filter_map(|imp| imp.file.as_ref())
        .find_map(|f| lookup_in(f, name))
}

fn candidates(scope: &FullName, name: &str) -> Vec<FullName> {
    if let Some(abs) = name.strip_prefix('.') {
        return vec![FullName::new(abs)];
    }
    let mut out = Vec::new();
    let mut scope = Some(scope.clone());
    while let Some(s) = scope {
        out.push(s.append(name));
        scope = if s.is_empty() {
            None
        } else {
            Some(s.parent().unwrap_or_default())
        };
    }
    out
}
