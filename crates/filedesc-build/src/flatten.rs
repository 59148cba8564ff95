//! Flattening of a file's declaration tree into arena order.
//!
//! Both the eager and the deferred pass walk the same proto through
//! [`Flat::new`], so position `i` of each vector here is arena id `i` in
//! both passes.

use filedesc::{EnumId, FullName, MessageId, ParentRef};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    ServiceDescriptorProto,
};
use std::collections::HashMap;

/// One declaration with its position in the tree.
pub(crate) struct Decl<'a, T> {
    pub proto: &'a T,
    pub full_name: FullName,
    /// Enclosing scope for relative type names.
    pub scope: FullName,
    pub parent: ParentRef,
    pub index: usize,
}

pub(crate) struct Flat<'a> {
    pub enums: Vec<Decl<'a, EnumDescriptorProto>>,
    pub messages: Vec<Decl<'a, DescriptorProto>>,
    pub extensions: Vec<Decl<'a, FieldDescriptorProto>>,
    pub services: Vec<Decl<'a, ServiceDescriptorProto>>,
    message_ids: HashMap<String, MessageId>,
    enum_ids: HashMap<String, EnumId>,
}

impl<'a> Flat<'a> {
    pub fn new(fdp: &'a FileDescriptorProto) -> Self {
        let package = FullName::new(fdp.package());
        let mut flat = Flat {
            enums: Vec::new(),
            messages: Vec::new(),
            extensions: Vec::new(),
            services: Vec::new(),
            message_ids: HashMap::new(),
            enum_ids: HashMap::new(),
        };

        for (i, e) in fdp.enum_type.iter().enumerate() {
            flat.push_enum(e, &package, ParentRef::File, i);
        }
        for (i, m) in fdp.message_type.iter().enumerate() {
            flat.push_message(m, &package, ParentRef::File, i);
        }
        for (i, x) in fdp.extension.iter().enumerate() {
            flat.push_extension(x, &package, ParentRef::File, i);
        }
        for (i, s) in fdp.service.iter().enumerate() {
            flat.services.push(Decl {
                proto: s,
                full_name: package.append(s.name()),
                scope: package.clone(),
                parent: ParentRef::File,
                index: i,
            });
        }
        flat
    }

    fn push_enum(
        &mut self,
        proto: &'a EnumDescriptorProto,
        scope: &FullName,
        parent: ParentRef,
        index: usize,
    ) {
        let full_name = scope.append(proto.name());
        self.enum_ids
            .insert(full_name.as_str().to_string(), EnumId(self.enums.len()));
        self.enums.push(Decl {
            proto,
            full_name,
            scope: scope.clone(),
            parent,
            index,
        });
    }

    fn push_extension(
        &mut self,
        proto: &'a FieldDescriptorProto,
        scope: &FullName,
        parent: ParentRef,
        index: usize,
    ) {
        self.extensions.push(Decl {
            proto,
            full_name: scope.append(proto.name()),
            scope: scope.clone(),
            parent,
            index,
        });
    }

    fn push_message(
        &mut self,
        proto: &'a DescriptorProto,
        scope: &FullName,
        parent: ParentRef,
        index: usize,
    ) {
        let full_name = scope.append(proto.name());
        let id = MessageId(self.messages.len());
        self.message_ids.insert(full_name.as_str().to_string(), id);
        self.messages.push(Decl {
            proto,
            full_name: full_name.clone(),
            scope: scope.clone(),
            parent,
            index,
        });

        let nested = ParentRef::Message(id);
        for (i, e) in proto.enum_type.iter().enumerate() {
            self.push_enum(e, &full_name, nested, i);
        }
        for (i, m) in proto.nested_type.iter().enumerate() {
            self.push_message(m, &full_name, nested, i);
        }
        for (i, x) in proto.extension.iter().enumerate() {
            self.push_extension(x, &full_name, nested, i);
        }
    }

    pub fn message_id(&self, name: &str) -> Option<MessageId> {
        self.message_ids.get(name).copied()
    }

    pub fn enum_id(&self, name: &str) -> Option<EnumId> {
        self.enum_ids.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_precede_children() {
        let fdp = FileDescriptorProto {
            package: Some("pkg".into()),
            message_type: vec![DescriptorProto {
                name: Some("Outer".into()),
                nested_type: vec![DescriptorProto {
                    name: Some("Inner".into()),
                    ..Default::default()
                }],
                enum_type: vec![EnumDescriptorProto {
                    name: Some("Kind".into()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let flat = Flat::new(&fdp);
        assert_eq!(flat.messages.len(), 2);
        assert_eq!(flat.messages[1].full_name, "pkg.Outer.Inner");
        assert_eq!(flat.messages[1].parent, ParentRef::Message(MessageId(0)));
        assert_eq!(flat.messages[1].scope, "pkg.Outer");
        assert_eq!(flat.enum_id("pkg.Outer.Kind"), Some(EnumId(0)));
        assert_eq!(flat.message_id("pkg.Outer.Inner"), Some(MessageId(1)));
        assert_eq!(flat.message_id("Outer"), None);
    }
}
