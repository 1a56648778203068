//! Parse a material, read a few values, edit it and write it back.
//!
//! Run with: cargo run --example simple

use keyvalues::{parse, NodeExt};
use std::error::Error;

const MATERIAL: &str = r#"
// Dirt floor
LightmappedGeneric
{
    $basetexture "nature/dirtfloor001a"
    $surfaceprop dirt
    $detailscale 4
}
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let mut root = parse(MATERIAL)?;

    let shader = root.sub_key("lightmappedgeneric");
    println!("shader:       {}", shader.name());
    println!("base texture: {}", shader.sub_key("$basetexture").as_str(""));
    println!("detail scale: {}", shader.sub_key("$detailscale").as_float(1.0));
    println!("alpha:        {} (absent, so the default)", shader.sub_key("$alpha").as_float(1.0));

    if let Some(shader) = root.sub_key_mut("LightmappedGeneric") {
        shader.new_sub_key("$translucent").set_bool(true);
        shader.new_sub_key("Proxies").make_container();
    }

    println!("\nCanonical output:\n{root}");
    Ok(())
}
