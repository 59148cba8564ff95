use filedesc::{json_camel_case, FieldDesc, Value};
use filedesc_build::{build_file, BuildConfig};
use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};
use proptest::prelude::*;

fn single_field_file(name: &str, ty: Type, default: Option<String>) -> Vec<u8> {
    FileDescriptorProto {
        name: Some("prop.proto".into()),
        package: Some("prop".into()),
        message_type: vec![DescriptorProto {
            name: Some("M".into()),
            field: vec![FieldDescriptorProto {
                name: Some(name.into()),
                number: Some(1),
                label: Some(Label::Optional as i32),
                r#type: Some(ty as i32),
                default_value: default,
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    }
    .encode_to_vec()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn integer_defaults_survive_the_deferred_pass(v in any::<i64>()) {
        let raw = single_field_file("n", Type::Sfixed64, Some(v.to_string()));
        let fd = build_file(&raw, &[], &BuildConfig::default()).unwrap();
        let f = fd.messages().get(0).fields().get(0);
        prop_assert_eq!(f.default_value(), Some(Value::I64(v)));
    }

    #[test]
    fn unsigned_defaults_survive_the_deferred_pass(v in any::<u32>()) {
        let raw = single_field_file("n", Type::Fixed32, Some(v.to_string()));
        let fd = build_file(&raw, &[], &BuildConfig::default()).unwrap();
        let f = fd.messages().get(0).fields().get(0);
        prop_assert_eq!(f.default_value(), Some(Value::U32(v)));
    }

    #[test]
    fn derived_json_name_matches_camel_case(name in "[a-z][a-z0-9_]{0,12}") {
        let raw = single_field_file(&name, Type::Int32, None);
        let fd = build_file(&raw, &[], &BuildConfig::default()).unwrap();
        let md = fd.messages().get(0);
        let f = md.fields().get(0);
        prop_assert!(!f.has_json_name());
        let expected = json_camel_case(&name);
        prop_assert_eq!(f.json_name(), expected.as_str());
        prop_assert_eq!(md.fields().by_json_name(&expected), Some(f.clone()));
    }
}
