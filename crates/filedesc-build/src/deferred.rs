//! The deferred pass: everything a file needs beyond names and nesting.
//!
//! Runs at most once per file, under the file's lock. Enums go first so
//! that enum defaults of fields and extensions can read the in-progress
//! value lists of enums declared in the same file.

use crate::flatten::{Decl, Flat};
use crate::resolve::Resolver;
use filedesc::descopts::constant;
use filedesc::{
    Base, Cardinality, DefaultValue, EnumId, EnumL2, EnumRanges, EnumRef, EnumValueNode,
    ExtensionL2, FieldNode, FieldNumbers, FieldRanges, File, FileDescriptor, FileImport, FileL2,
    FullName, JsonName, Kind, MessageId, MessageL2, MessageRef, MethodNode, Names, OneofNode,
    ParentRef, ServiceId, ServiceL2,
};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    ServiceDescriptorProto,
};

pub(crate) fn build_l2(
    file: &File,
    fdp: &FileDescriptorProto,
    deps: &[FileDescriptor],
    imports: Vec<FileImport>,
) -> FileL2 {
    let flat = Flat::new(fdp);
    let resolver = Resolver { local: file, deps };

    let enums: Vec<EnumL2> = flat
        .enums
        .iter()
        .enumerate()
        .map(|(i, d)| build_enum(EnumId(i), d))
        .collect();

    let pass = Pass {
        file,
        resolver,
        enums: &enums,
    };
    let messages = flat
        .messages
        .iter()
        .enumerate()
        .map(|(i, d)| pass.message(MessageId(i), d))
        .collect();
    let extensions = flat.extensions.iter().map(|d| pass.extension(d)).collect();
    let services = flat
        .services
        .iter()
        .enumerate()
        .map(|(i, d)| pass.service(ServiceId(i), d))
        .collect();

    FileL2 {
        options: fdp.options.clone().map(constant),
        imports,
        enums,
        messages,
        extensions,
        services,
    }
}

fn build_enum(id: EnumId, d: &Decl<'_, EnumDescriptorProto>) -> EnumL2 {
    let proto = d.proto;
    let values = proto
        .value
        .iter()
        .enumerate()
        .map(|(i, v)| EnumValueNode {
            // Enum values are scoped like their enum, not inside it.
            base: Base::new(d.scope.append(v.name()), ParentRef::Enum(id), i),
            options: v.options.clone().map(constant),
            number: v.number(),
        })
        .collect();
    EnumL2 {
        options: proto.options.clone().map(constant),
        values,
        reserved_names: Names::new(proto.reserved_name.clone()),
        reserved_ranges: EnumRanges::new(
            proto
                .reserved_range
                .iter()
                .map(|r| (r.start(), r.end()))
                .collect(),
        ),
    }
}

struct Pass<'a> {
    file: &'a File,
    resolver: Resolver<'a, File>,
    enums: &'a [EnumL2],
}

impl Pass<'_> {
    fn message(&self, id: MessageId, d: &Decl<'_, DescriptorProto>) -> MessageL2 {
        let proto = d.proto;
        let options = proto.options.as_ref();

        let fields: Vec<FieldNode> = proto
            .field
            .iter()
            .enumerate()
            .map(|(i, f)| self.field(id, &d.full_name, i, f))
            .collect();

        let oneofs = proto
            .oneof_decl
            .iter()
            .enumerate()
            .map(|(i, o)| OneofNode {
                base: Base::new(d.full_name.append(o.name()), ParentRef::Message(id), i),
                options: o.options.clone().map(constant),
                fields: fields
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.containing_oneof == Some(i))
                    .map(|(j, _)| j)
                    .collect(),
            })
            .collect();

        let required_numbers = fields
            .iter()
            .filter(|f| f.cardinality == Cardinality::Required)
            .map(|f| f.number)
            .collect();

        MessageL2 {
            options: proto.options.clone().map(constant),
            is_map_entry: options.is_some_and(|o| o.map_entry()),
            is_message_set: options.is_some_and(|o| o.message_set_wire_format()),
            fields,
            oneofs,
            reserved_names: Names::new(proto.reserved_name.clone()),
            reserved_ranges: FieldRanges::new(
                proto
                    .reserved_range
                    .iter()
                    .map(|r| (r.start(), r.end()))
                    .collect(),
            ),
            required_numbers: FieldNumbers::new(required_numbers),
            extension_ranges: FieldRanges::new(
                proto
                    .extension_range
                    .iter()
                    .map(|r| (r.start(), r.end()))
                    .collect(),
            ),
            extension_range_options: proto
                .extension_range
                .iter()
                .map(|r| r.options.clone().map(constant))
                .collect(),
        }
    }

    fn field(
        &self,
        message: MessageId,
        scope: &FullName,
        index: usize,
        proto: &FieldDescriptorProto,
    ) -> FieldNode {
        let full_name = scope.append(proto.name());
        let (kind, cardinality) = self.kind_and_cardinality(proto, &full_name, scope);
        let options = proto.options.as_ref();
        let (enum_type, message_type) = self.target(proto, kind, &full_name, scope);
        let default = self.default(proto, kind, enum_type.as_ref());

        FieldNode {
            base: Base::new(full_name, ParentRef::Message(message), index),
            options: proto.options.clone().map(constant),
            number: proto.number(),
            cardinality,
            kind,
            json_name: json_name(proto),
            is_weak: options.is_some_and(|o| o.weak()),
            has_packed: options.is_some_and(|o| o.packed.is_some()),
            is_packed: options.is_some_and(|o| o.packed()),
            default,
            containing_oneof: proto.oneof_index.map(|i| i as usize),
            enum_type,
            message_type,
        }
    }

    fn extension(&self, d: &Decl<'_, FieldDescriptorProto>) -> ExtensionL2 {
        let proto = d.proto;
        let (kind, cardinality) = self.kind_and_cardinality(proto, &d.full_name, &d.scope);
        let (enum_type, message_type) = self.target(proto, kind, &d.full_name, &d.scope);
        ExtensionL2 {
            options: proto.options.clone().map(constant),
            cardinality,
            json_name: json_name(proto),
            is_packed: proto.options.as_ref().is_some_and(|o| o.packed()),
            default: self.default(proto, kind, enum_type.as_ref()),
            enum_type,
            message_type,
        }
    }

    fn service(&self, service: ServiceId, d: &Decl<'_, ServiceDescriptorProto>) -> ServiceL2 {
        let methods = d
            .proto
            .method
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let full_name = d.full_name.append(m.name());
                let input = self.message_ref(&d.full_name, m.input_type(), &full_name);
                let output = self.message_ref(&d.full_name, m.output_type(), &full_name);
                MethodNode {
                    base: Base::new(full_name, ParentRef::Service(service), i),
                    options: m.options.clone().map(constant),
                    input,
                    output,
                    is_streaming_client: m.client_streaming(),
                    is_streaming_server: m.server_streaming(),
                }
            })
            .collect();
        ServiceL2 {
            options: d.proto.options.clone().map(constant),
            methods,
        }
    }

    /// Kind and cardinality, already validated by the eager pass.
    fn kind_and_cardinality(
        &self,
        proto: &FieldDescriptorProto,
        full_name: &FullName,
        scope: &FullName,
    ) -> (Kind, Cardinality) {
        let kind = self
            .resolver
            .field_kind(proto, full_name, scope)
            .unwrap_or_else(|err| panic!("{err}"));
        let label = proto.label.unwrap_or(Cardinality::Optional as i32);
        let cardinality = Cardinality::from_label(label)
            .unwrap_or_else(|| panic!("{full_name}: unknown field label {label}"));
        (kind, cardinality)
    }

    fn target(
        &self,
        proto: &FieldDescriptorProto,
        kind: Kind,
        full_name: &FullName,
        scope: &FullName,
    ) -> (Option<EnumRef>, Option<MessageRef>) {
        let type_name = proto.type_name();
        match kind {
            Kind::Enum => {
                let er = self.resolver.enum_type(scope, type_name).unwrap_or_else(|| {
                    panic!("{full_name}: enum type {type_name:?} not found")
                });
                (Some(er), None)
            }
            Kind::Message | Kind::Group => (None, Some(self.message_ref(scope, type_name, full_name))),
            _ => (None, None),
        }
    }

    fn message_ref(&self, scope: &FullName, type_name: &str, user: &FullName) -> MessageRef {
        self.resolver
            .message(scope, type_name)
            .unwrap_or_else(|| panic!("{user}: message type {type_name:?} not found"))
    }

    fn default(
        &self,
        proto: &FieldDescriptorProto,
        kind: Kind,
        enum_type: Option<&EnumRef>,
    ) -> DefaultValue {
        match &proto.default_value {
            Some(text) => DefaultValue::unmarshal(text, kind, self.file, self.enums, enum_type),
            None => DefaultValue::none(),
        }
    }
}

fn json_name(proto: &FieldDescriptorProto) -> JsonName {
    match &proto.json_name {
        Some(name) => JsonName::explicit(name.clone()),
        None => JsonName::derived(),
    }
}
