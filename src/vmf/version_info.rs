use crate::marshal::expect_name;
use crate::{KeyValues, Marshaler, NodeExt, Result};

/// The `versioninfo` block at the top of every map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionInfo {
    pub editor_version: i64,
    pub editor_build: i64,
    pub map_version: i64,
    pub format_version: i64,
    pub prefab: bool,
}

impl Marshaler for VersionInfo {
    fn to_key_values(&self) -> KeyValues {
        let mut kv = KeyValues::container("versioninfo");
        kv.new_sub_key("editorversion").set_int(self.editor_version);
        kv.new_sub_key("editorbuild").set_int(self.editor_build);
        kv.new_sub_key("mapversion").set_int(self.map_version);
        kv.new_sub_key("formatversion").set_int(self.format_version);
        kv.new_sub_key("prefab").set_bool(self.prefab);
        kv
    }

    fn from_key_values(&mut self, kv: &KeyValues) -> Result<()> {
        expect_name(kv, "VersionInfo", "versioninfo")?;

        self.editor_version = kv.sub_key("editorversion").as_int(0);
        self.editor_build = kv.sub_key("editorbuild").as_int(0);
        self.map_version = kv.sub_key("mapversion").as_int(0);
        self.format_version = kv.sub_key("formatversion").as_int(0);
        self.prefab = kv.sub_key("prefab").as_bool(false);

        Ok(())
    }
}
