use keyvalues::{
    from_str, parse, parse_with_options, to_string, Error, KeyValues, NodeExt, ParseOptions,
    Value,
};
use serde::{Deserialize, Serialize};

const MATERIAL: &str = r#"LightmappedGeneric{$basetexture"nature/dirtfloor001a""$surfaceprop"dirt}"#;

#[test]
fn test_parse_material() {
    let mut kv = KeyValues::new();
    let consumed = kv.read_from(MATERIAL.as_bytes()).unwrap();
    assert_eq!(consumed, MATERIAL.len());

    let mut out = Vec::new();
    kv.write_to(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\"LightmappedGeneric\" {\n\t\"$basetexture\" \"nature/dirtfloor001a\"\n\t\"$surfaceprop\" \"dirt\"\n}\n"
    );
}

#[test]
fn test_parse_comments() {
    let input = "// Comment
//* comment
Key {
//*/
\tsubkey // comment
\tvalue /*comment*/
\t// comment
}
";
    let kv = parse(input).unwrap();
    assert_eq!(kv.to_string(), "\"Key\" {\n\t\"subkey\" \"value\"\n}\n");
}

#[test]
fn test_simple_values() {
    let mut kv = KeyValues::new();
    assert_eq!(kv.as_int(57), 57);

    kv.set_string("10");
    assert_eq!(kv.as_uint64(57), 10);
    assert_eq!(kv.as_int(57), 10);
    assert_eq!(kv.as_str("Bacon"), "10");
    assert_eq!(kv.as_float(57.0), 10.0);
    assert!(kv.as_bool(false));
}

#[test]
fn test_complex_serialize() {
    let mut kv = KeyValues::new();

    let material = kv.new_sub_key("LightmappedGeneric");
    material
        .new_sub_key("$basetexture")
        .set_string("nature/dirtfloor001a");
    material.new_sub_key("$surfaceprop").set_string("dirt");
    material
        .new_sub_key("Proxy")
        .new_sub_key("Test")
        .new_sub_key("$key")
        .set_string("Value");

    assert_eq!(
        kv.to_string(),
        "\"LightmappedGeneric\" {
\t\"$basetexture\" \"nature/dirtfloor001a\"
\t\"$surfaceprop\" \"dirt\"
\t\"Proxy\" {
\t\t\"Test\" {
\t\t\t\"$key\" \"Value\"
\t\t}
\t}
}
"
    );
}

#[test]
fn test_write_parse_write_is_stable() {
    let input = "\"a\" \"1\"\nb { c \"line\\nbreak\" d { } e \"quote \\\"here\\\"\" }\nempty \"\"\n";
    let first = parse(input).unwrap();
    let text = first.to_string();
    let second = parse(&text).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.to_string(), text);
}

#[test]
fn test_lookup_on_absent_nodes_chains() {
    let kv = parse("world { solid { id 1 } }").unwrap();
    let missing = kv.sub_key("world").sub_key("entity").sub_key("origin");
    assert!(missing.is_none());
    assert_eq!(missing.as_str("0 0 0"), "0 0 0");
    assert_eq!(missing.children().count(), 0);
    assert_eq!(kv.sub_key("WORLD").sub_key("Solid").sub_key("ID").as_int(0), 1);
}

#[test]
fn test_sub_keys_iterates_duplicates() {
    let kv = parse("world { solid { id 1 } entity { id 9 } solid { id 2 } }").unwrap();
    let world = kv.sub_key("world").unwrap();
    let ids: Vec<i64> = world
        .sub_keys("SOLID")
        .map(|s| s.sub_key("id").as_int(0))
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_edit_parsed_tree() {
    let mut kv = parse("settings { volume 3 }").unwrap();
    let settings = kv.sub_key_mut("settings").unwrap();
    settings.sub_key_mut("volume").unwrap().set_int(7);
    settings.new_sub_key("muted").set_bool(true);
    assert_eq!(
        kv.to_string(),
        "\"settings\" {\n\t\"volume\" \"7\"\n\t\"muted\" \"1\"\n}\n"
    );
}

#[test]
fn test_empty_node_written_as_empty_string() {
    let mut kv = KeyValues::new();
    kv.new_sub_key("pending");
    assert_eq!(kv.to_string(), "\"pending\" \"\"\n");

    // An empty string reads back as a leaf, which is equivalent
    let back = parse(&kv.to_string()).unwrap();
    assert_eq!(back.sub_key("pending").unwrap().value(), &Value::Leaf(String::new()));
}

#[test]
fn test_comments_can_be_disabled() {
    let input = "Key // comment\n{\n}\n";

    let with_comments = parse(input).unwrap();
    assert!(with_comments.sub_key("Key").unwrap().is_container());

    let options = ParseOptions::new().with_comments(false);
    let without = parse_with_options(input, options).unwrap();
    assert_eq!(without.sub_key("Key").as_str(""), "//");
    assert!(without.sub_key("comment").unwrap().is_container());
}

#[test]
fn test_error_positions() {
    let input = "a {\n\tb c\n\t}\n}\n}";
    let err = parse(input).unwrap_err();
    match err {
        Error::Syntax { line, col, offset, ref msg } => {
            assert_eq!((line, col, offset), (4, 1, 12));
            assert!(msg.contains("unbalanced"));
        }
        ref other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.offset(), Some(12));
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Material {
    #[serde(rename = "$basetexture")]
    base_texture: String,
    #[serde(rename = "$surfaceprop")]
    surface_prop: String,
    #[serde(rename = "$alpha", default)]
    alpha: Option<f32>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct MaterialFile {
    #[serde(rename = "LightmappedGeneric")]
    shader: Material,
}

#[test]
fn test_serde_material() {
    let file: MaterialFile = from_str(MATERIAL).unwrap();
    assert_eq!(file.shader.base_texture, "nature/dirtfloor001a");
    assert_eq!(file.shader.alpha, None);

    let text = to_string(&file).unwrap();
    assert_eq!(
        text,
        "\"LightmappedGeneric\" {\n\t\"$basetexture\" \"nature/dirtfloor001a\"\n\t\"$surfaceprop\" \"dirt\"\n}\n"
    );
}

#[test]
fn test_json_to_keyvalues() {
    let json = r#"{"versioninfo": {"editorversion": 400, "prefab": false}, "cameras": {"activecamera": -1}}"#;
    let tree: KeyValues = serde_json::from_str(json).unwrap();
    assert_eq!(
        tree.to_string(),
        "\"versioninfo\" {\n\t\"editorversion\" \"400\"\n\t\"prefab\" \"0\"\n}\n\"cameras\" {\n\t\"activecamera\" \"-1\"\n}\n"
    );

    let back = serde_json::to_value(&tree).unwrap();
    assert_eq!(back["versioninfo"]["editorversion"], "400");
}
