use keyvalues::{keyvalues, parse, KeyValues, NodeExt, Value};

#[test]
fn test_keyvalues_macro_matches_parsed_text() {
    let built = keyvalues!({
        "LightmappedGeneric": {
            "$basetexture": "nature/dirtfloor001a",
            "$surfaceprop": "dirt",
            "Proxy": {
                "Test": {
                    "$key": "Value"
                }
            }
        }
    });

    let parsed = parse(
        r#"
        LightmappedGeneric
        {
            $basetexture nature/dirtfloor001a
            $surfaceprop dirt
            Proxy { Test { $key Value } }
        }
        "#,
    )
    .unwrap();

    assert_eq!(built, parsed);
}

#[test]
fn test_keyvalues_macro_values() {
    let spacing = 16;
    let kv = keyvalues!({
        "nGridSpacing": spacing,
        "bShowGrid": true,
        "bShow3DGrid": false,
        "scale": 0.5,
        "offset": (-8),
        "pending": null,
    });

    assert_eq!(kv.sub_key("ngridspacing").as_int(0), 16);
    assert!(kv.sub_key("bShowGrid").as_bool(false));
    assert!(!kv.sub_key("bShow3DGrid").as_bool(true));
    assert_eq!(kv.sub_key("scale").as_float(0.0), 0.5);
    assert_eq!(kv.sub_key("offset").as_int(0), -8);
    assert_eq!(
        kv.sub_key("pending").map(KeyValues::value),
        Some(&Value::Empty)
    );
}

#[test]
fn test_keyvalues_macro_keeps_duplicate_keys() {
    let kv = keyvalues!({
        "solid": { "id": 1 },
        "solid": { "id": 2 }
    });

    assert_eq!(kv.len(), 2);
    let ids: Vec<i64> = kv
        .sub_keys("solid")
        .map(|s| s.sub_key("id").as_int(0))
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_keyvalues_macro_output() {
    let kv = keyvalues!({
        "versioninfo": {
            "editorversion": 400,
            "prefab": false
        }
    });

    assert_eq!(
        kv.to_string(),
        "\"versioninfo\" {\n\t\"editorversion\" \"400\"\n\t\"prefab\" \"0\"\n}\n"
    );
}
