//! Read typed records from a `.vmf` header and write a modified copy.
//!
//! Run with: cargo run --example vmf_records

use keyvalues::vmf::{Rgb, VersionInfo, ViewSettings, VisGroup, VisGroups};
use keyvalues::{parse, KeyValues, Marshaler};
use std::error::Error;

const HEADER: &str = r#"
versioninfo
{
	"editorversion" "400"
	"editorbuild" "6157"
	"mapversion" "3"
	"formatversion" "100"
	"prefab" "0"
}
visgroups
{
	visgroup
	{
		"name" "Lights"
		"visgroupid" "1"
		"color" "255 220 0"
	}
}
viewsettings
{
	"nGridSpacing" "16"
}
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let root = parse(HEADER)?;
    let missing = KeyValues::new();
    let section = |name: &str| root.sub_key(name).unwrap_or(&missing);

    let mut info = VersionInfo::unmarshal(section("versioninfo"))?;
    let mut groups = VisGroups::unmarshal(section("visgroups"))?;
    let settings = ViewSettings::unmarshal(section("viewsettings"))?;

    println!("{info:?}");
    println!("{settings:?}");
    for group in groups.iter() {
        println!("visgroup {} #{}: {:?}", group.name, group.id, group.color);
    }

    info.map_version += 1;
    groups.push(VisGroup {
        name: "Detail".to_string(),
        id: 2,
        color: Rgb::new(0, 128, 255),
    });

    let mut out = KeyValues::new();
    out.append(info.to_key_values());
    out.append(groups.to_key_values());
    out.append(settings.to_key_values());
    println!("\n{out}");

    // Records validate what they read
    let broken = parse("visgroup { name Broken visgroupid 0 }")?;
    if let Err(err) = VisGroup::unmarshal(broken.sub_key("visgroup").unwrap_or(&missing)) {
        println!("rejected: {err}");
    }

    Ok(())
}
