use filedesc::{Cardinality, Descriptor, FieldDesc, FileDescriptor, Kind, Syntax, Value};
use filedesc_build::{build_file, BuildConfig, BuildError};
use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, MessageOptions, MethodDescriptorProto, OneofDescriptorProto,
    ServiceDescriptorProto,
};

// ============================================================================
// Proto literals
// ============================================================================

fn field(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn typed(name: &str, number: i32, label: Label, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.into()),
        ..field(name, number, label, ty)
    }
}

fn with_default(mut f: FieldDescriptorProto, text: &str) -> FieldDescriptorProto {
    f.default_value = Some(text.into());
    f
}

fn enum_proto(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.into()),
        value: values
            .iter()
            .map(|&(n, v)| EnumValueDescriptorProto {
                name: Some(n.into()),
                number: Some(v),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn build(fdp: &FileDescriptorProto, deps: &[FileDescriptor]) -> Result<FileDescriptor, BuildError> {
    build_file(&fdp.encode_to_vec(), deps, &BuildConfig::default())
}

/// base.proto: `package base; message Base { extensions 100 to 199; } enum Level { LOW = 0; HIGH = 2; }`
fn base_proto() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("base.proto".into()),
        package: Some("base".into()),
        message_type: vec![DescriptorProto {
            name: Some("Base".into()),
            extension_range: vec![prost_types::descriptor_proto::ExtensionRange {
                start: Some(100),
                end: Some(200),
                options: None,
            }],
            ..Default::default()
        }],
        enum_type: vec![enum_proto("Level", &[("LOW", 0), ("HIGH", 2)])],
        ..Default::default()
    }
}

/// app.proto (proto2), importing base.proto publicly.
fn app_proto() -> FileDescriptorProto {
    let entry = DescriptorProto {
        name: Some("TagsEntry".into()),
        field: vec![
            field("key", 1, Label::Optional, Type::String),
            field("value", 2, Label::Optional, Type::Int32),
        ],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };
    let mut in_oneof = field("label", 9, Label::Optional, Type::String);
    in_oneof.oneof_index = Some(0);
    let mut json = field("user_id", 10, Label::Required, Type::Int64);
    json.json_name = Some("userId".into());

    FileDescriptorProto {
        name: Some("app.proto".into()),
        package: Some("app".into()),
        syntax: Some("proto2".into()),
        dependency: vec!["base.proto".into()],
        public_dependency: vec![0],
        enum_type: vec![enum_proto("Color", &[("RED", 1), ("GREEN", 2), ("VERDE", 2)])],
        message_type: vec![DescriptorProto {
            name: Some("Item".into()),
            field: vec![
                with_default(typed("color", 1, Label::Optional, Type::Enum, ".app.Color"), "GREEN"),
                with_default(typed("level", 2, Label::Optional, Type::Enum, ".base.Level"), "HIGH"),
                with_default(field("title", 3, Label::Optional, Type::String), "untitled"),
                with_default(field("blob", 4, Label::Optional, Type::Bytes), r"\001x\n"),
                with_default(field("ratio", 5, Label::Optional, Type::Float), "-inf"),
                typed("tags", 6, Label::Repeated, Type::Message, ".app.Item.TagsEntry"),
                typed("parent", 7, Label::Optional, Type::Message, "Item"),
                typed("base", 8, Label::Optional, Type::Message, ".base.Base"),
                in_oneof,
                json,
            ],
            nested_type: vec![entry],
            oneof_decl: vec![OneofDescriptorProto {
                name: Some("kind".into()),
                options: None,
            }],
            ..Default::default()
        }],
        extension: vec![FieldDescriptorProto {
            extendee: Some(".base.Base".into()),
            ..with_default(field("weight", 100, Label::Optional, Type::Double), "1.5")
        }],
        service: vec![ServiceDescriptorProto {
            name: Some("Items".into()),
            method: vec![MethodDescriptorProto {
                name: Some("Watch".into()),
                input_type: Some(".app.Item".into()),
                output_type: Some(".base.Base".into()),
                client_streaming: Some(true),
                server_streaming: Some(true),
                options: None,
            }],
            options: None,
        }],
        ..Default::default()
    }
}

fn build_app() -> (FileDescriptor, FileDescriptor) {
    let base = build(&base_proto(), &[]).unwrap();
    let app = build(&app_proto(), &[base.clone()]).unwrap();
    (base, app)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn eager_layer_is_built_without_the_deferred_pass() {
    let (_, app) = build_app();
    assert!(!app.is_initialized());
    assert_eq!(app.path(), "app.proto");
    assert_eq!(app.package(), "app");
    assert_eq!(app.syntax(), Syntax::Proto2);
    assert_eq!(app.legacy_raw_descriptor(), app_proto().encode_to_vec().as_slice());

    let item = app.find_message("app.Item").unwrap();
    assert_eq!(item.messages().get(0).full_name(), "app.Item.TagsEntry");
    assert_eq!(app.enums().by_name("Color").unwrap().index(), 0);
    assert_eq!(app.services().get(0).full_name(), "app.Items");
    assert!(!app.is_initialized());
}

#[test]
fn same_file_enum_default_resolves_during_the_deferred_pass() {
    let (_, app) = build_app();
    let item = app.find_message("app.Item").unwrap();
    let color = item.fields().by_name("color").unwrap();

    assert!(color.has_default());
    assert_eq!(color.default_value(), Some(Value::Enum(2)));
    let ev = color.default_enum_value().unwrap();
    assert_eq!(ev.name(), "GREEN");
    assert_eq!(ev.index(), 1);
    assert_eq!(ev.full_name(), "app.GREEN");
}

#[test]
fn foreign_enum_default_and_types() {
    let (base, app) = build_app();
    let item = app.find_message("app.Item").unwrap();
    let fields = item.fields();

    let level = fields.by_name("level").unwrap();
    assert_eq!(level.default_value(), Some(Value::Enum(2)));
    let ed = level.enum_type().unwrap();
    assert_eq!(ed.parent_file(), Some(base.clone()));
    assert_eq!(level.default_enum_value().unwrap().name(), "HIGH");

    let b = fields.by_name("base").unwrap();
    assert_eq!(b.message_type().unwrap(), base.find_message("base.Base").unwrap());

    // Relative name resolved from inside `app.Item`.
    let parent = fields.by_name("parent").unwrap();
    assert_eq!(parent.message_type().unwrap(), item);
}

#[test]
fn scalar_defaults_decode_from_text() {
    let (_, app) = build_app();
    let item = app.find_message("app.Item").unwrap();
    let fields = item.fields();

    assert_eq!(
        fields.by_name("title").unwrap().default_value(),
        Some(Value::String("untitled".into()))
    );
    let blob = fields.by_name("blob").unwrap().default_value().unwrap();
    assert_eq!(blob.as_bytes().unwrap().to_vec(), vec![1, b'x', b'\n']);
    assert_eq!(
        fields.by_name("ratio").unwrap().default_value(),
        Some(Value::F32(f32::NEG_INFINITY))
    );
    // No declared default: the kind's zero value.
    assert_eq!(fields.by_name("label").unwrap().default_value(), Some(Value::String(String::new())));
    assert_eq!(fields.by_name("user_id").unwrap().default_value(), Some(Value::I64(0)));
}

#[test]
fn map_oneof_json_and_required() {
    let (_, app) = build_app();
    let item = app.find_message("app.Item").unwrap();
    let fields = item.fields();

    let tags = fields.by_name("tags").unwrap();
    assert!(tags.is_map());
    assert_eq!(tags.map_key().unwrap().kind(), Kind::String);
    assert_eq!(tags.map_value().unwrap().kind(), Kind::Int32);
    assert!(!tags.is_packed());

    let kind = item.oneofs().get(0);
    assert_eq!(kind.full_name(), "app.Item.kind");
    assert_eq!(kind.fields().len(), 1);
    assert_eq!(kind.fields().get(0).containing_oneof(), Some(kind.clone()));

    let user_id = fields.by_json_name("userId").unwrap();
    assert!(user_id.has_json_name());
    assert_eq!(user_id.cardinality(), Cardinality::Required);
    assert_eq!(item.required_numbers().iter().collect::<Vec<_>>(), vec![10]);
    assert_eq!(fields.by_name("title").unwrap().json_name(), "title");
}

#[test]
fn extensions_and_services() {
    let (base, app) = build_app();
    let weight = app.extensions().by_number(100).unwrap();
    assert_eq!(weight.full_name(), "app.weight");
    assert!(weight.is_extension());
    assert_eq!(weight.containing_message(), base.find_message("base.Base").unwrap());
    assert_eq!(weight.default_value(), Some(Value::F64(1.5)));
    assert!(base.find_message("base.Base").unwrap().extension_ranges().has(150));

    let watch = app.services().get(0).methods().get(0);
    assert_eq!(watch.full_name(), "app.Items.Watch");
    assert_eq!(watch.input(), app.find_message("app.Item").unwrap());
    assert_eq!(watch.output().parent_file(), Some(base));
    assert!(watch.is_streaming_client());
    assert!(watch.is_streaming_server());
}

#[test]
fn imports_are_matched_by_path() {
    let (base, app) = build_app();
    let imports = app.imports();
    assert_eq!(imports.len(), 1);
    let import = imports.get(0);
    assert_eq!(import.path, "base.proto");
    assert_eq!(import.file.as_ref(), Some(&base));
    assert!(import.is_public);
    assert!(!import.is_weak);
}

#[test]
fn eager_init_runs_the_deferred_pass_before_returning() {
    let base = build(&base_proto(), &[]).unwrap();
    let config = BuildConfig {
        eager_init: true,
        ..BuildConfig::default()
    };
    let app = build_file(&app_proto().encode_to_vec(), &[base], &config).unwrap();
    assert!(app.is_initialized());
}

#[test]
fn proto3_repeated_scalars_pack_implicitly() {
    let fdp = FileDescriptorProto {
        name: Some("p3.proto".into()),
        syntax: Some("proto3".into()),
        message_type: vec![DescriptorProto {
            name: Some("P".into()),
            field: vec![
                field("nums", 1, Label::Repeated, Type::Sint32),
                field("names", 2, Label::Repeated, Type::String),
            ],
            ..Default::default()
        }],
        ..Default::default()
    };
    let fd = build(&fdp, &[]).unwrap();
    let p = fd.messages().get(0);
    assert_eq!(p.syntax(), Syntax::Proto3);
    assert!(p.fields().get(0).is_packed());
    assert!(!p.fields().get(1).is_packed());
}

#[test]
fn unsupported_syntax_is_rejected() {
    let fdp = FileDescriptorProto {
        name: Some("e.proto".into()),
        syntax: Some("editions".into()),
        ..Default::default()
    };
    let err = build(&fdp, &[]).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedSyntax { ref syntax, .. } if syntax == "editions"));
}

#[test]
fn unresolved_extendee_is_rejected() {
    let fdp = FileDescriptorProto {
        name: Some("x.proto".into()),
        extension: vec![FieldDescriptorProto {
            extendee: Some(".nowhere.Msg".into()),
            ..field("x", 1, Label::Optional, Type::Int32)
        }],
        ..Default::default()
    };
    let err = build(&fdp, &[]).unwrap_err();
    assert!(matches!(err, BuildError::UnresolvedExtendee { .. }));
    assert!(err.to_string().contains("nowhere.Msg"));
}

#[test]
fn unresolved_import_is_rejected_unless_allowed() {
    let err = build(&app_proto(), &[]).unwrap_err();
    assert!(matches!(err, BuildError::UnresolvedImport { ref import, .. } if import == "base.proto"));

    let fdp = FileDescriptorProto {
        name: Some("lonely.proto".into()),
        dependency: vec!["missing.proto".into()],
        ..Default::default()
    };
    let config = BuildConfig {
        allow_unresolved_imports: true,
        ..BuildConfig::default()
    };
    let fd = build_file(&fdp.encode_to_vec(), &[], &config).unwrap();
    assert!(fd.imports().get(0).file.is_none());
}

#[test]
fn malformed_declarations_are_rejected() {
    let unnamed = FileDescriptorProto {
        name: Some("n.proto".into()),
        message_type: vec![DescriptorProto::default()],
        ..Default::default()
    };
    assert!(matches!(
        build(&unnamed, &[]).unwrap_err(),
        BuildError::MissingName { what: "message", .. }
    ));

    let bad_kind = FileDescriptorProto {
        name: Some("k.proto".into()),
        message_type: vec![DescriptorProto {
            name: Some("M".into()),
            field: vec![FieldDescriptorProto {
                r#type: Some(99),
                ..field("f", 1, Label::Optional, Type::Int32)
            }],
            ..Default::default()
        }],
        ..Default::default()
    };
    assert!(matches!(
        build(&bad_kind, &[]).unwrap_err(),
        BuildError::UnknownKind { value: 99, .. }
    ));

    let bad_label = FileDescriptorProto {
        name: Some("l.proto".into()),
        message_type: vec![DescriptorProto {
            name: Some("M".into()),
            field: vec![FieldDescriptorProto {
                label: Some(7),
                ..field("f", 1, Label::Optional, Type::Int32)
            }],
            ..Default::default()
        }],
        ..Default::default()
    };
    assert!(matches!(
        build(&bad_label, &[]).unwrap_err(),
        BuildError::UnknownCardinality { value: 7, .. }
    ));
}

fn one_message(path: &str, message: DescriptorProto) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(path.into()),
        package: Some("p".into()),
        message_type: vec![message],
        ..Default::default()
    }
}

#[test]
fn unresolved_type_names_are_rejected() {
    let missing_field_type = one_message(
        "t.proto",
        DescriptorProto {
            name: Some("M".into()),
            field: vec![typed("x", 1, Label::Optional, Type::Message, ".missing.T")],
            ..Default::default()
        },
    );
    let err = build(&missing_field_type, &[]).unwrap_err();
    assert!(matches!(
        err,
        BuildError::UnresolvedType { ref user, ref type_name } if user == "p.M.x" && type_name == ".missing.T"
    ));

    // An enum name where a message is expected does not count.
    let wrong_kind = one_message(
        "w.proto",
        DescriptorProto {
            name: Some("M".into()),
            field: vec![typed("x", 1, Label::Optional, Type::Message, "E")],
            enum_type: vec![enum_proto("E", &[("A", 0)])],
            ..Default::default()
        },
    );
    assert!(matches!(
        build(&wrong_kind, &[]).unwrap_err(),
        BuildError::UnresolvedType { .. }
    ));

    let mut missing_method_type = one_message(
        "s.proto",
        DescriptorProto {
            name: Some("M".into()),
            ..Default::default()
        },
    );
    missing_method_type.service.push(ServiceDescriptorProto {
        name: Some("Svc".into()),
        method: vec![MethodDescriptorProto {
            name: Some("Call".into()),
            input_type: Some(".p.M".into()),
            output_type: Some(".p.Nope".into()),
            ..Default::default()
        }],
        options: None,
    });
    let err = build(&missing_method_type, &[]).unwrap_err();
    assert!(matches!(
        err,
        BuildError::UnresolvedType { ref user, ref type_name } if user == "p.Svc.Call" && type_name == ".p.Nope"
    ));
}

#[test]
fn out_of_range_oneof_index_is_rejected() {
    for index in [3, -1] {
        let mut f = field("x", 1, Label::Optional, Type::Int32);
        f.oneof_index = Some(index);
        let fdp = one_message(
            "o.proto",
            DescriptorProto {
                name: Some("M".into()),
                field: vec![f],
                ..Default::default()
            },
        );
        let err = build(&fdp, &[]).unwrap_err();
        assert!(matches!(
            err,
            BuildError::OneofOutOfRange { index: i, count: 0, .. } if i == index
        ));
    }
}

#[test]
#[should_panic(expected = "default value \"abc\"")]
fn undecodable_default_text_fails_the_deferred_pass() {
    let fdp = one_message(
        "d.proto",
        DescriptorProto {
            name: Some("M".into()),
            field: vec![with_default(field("n", 1, Label::Optional, Type::Int32), "abc")],
            ..Default::default()
        },
    );
    let fd = build(&fdp, &[]).unwrap();
    let md = fd.messages().get(0);
    md.fields();
}

#[test]
#[should_panic(expected = "does not name a value of the enum")]
fn unknown_enum_default_fails_the_deferred_pass() {
    let fdp = one_message(
        "e.proto",
        DescriptorProto {
            name: Some("M".into()),
            field: vec![with_default(
                typed("e", 1, Label::Optional, Type::Enum, "E"),
                "PURPLE",
            )],
            enum_type: vec![enum_proto("E", &[("RED", 0)])],
            ..Default::default()
        },
    );
    let fd = build(&fdp, &[]).unwrap();
    let md = fd.messages().get(0);
    md.fields();
}
