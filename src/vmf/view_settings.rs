use crate::marshal::expect_name;
use crate::{KeyValues, Marshaler, NodeExt, Result};

/// Hammer's grid and snapping state, stored in the `viewsettings` block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSettings {
    pub snap_to_grid: bool,
    pub show_grid: bool,
    pub show_logical_grid: bool,
    pub grid_spacing: i64,
    pub show_3d_grid: bool,
}

impl Default for ViewSettings {
    /// Hammer's defaults for a new map.
    fn default() -> Self {
        ViewSettings {
            snap_to_grid: true,
            show_grid: true,
            show_logical_grid: false,
            grid_spacing: 64,
            show_3d_grid: false,
        }
    }
}

impl Marshaler for ViewSettings {
    fn to_key_values(&self) -> KeyValues {
        let mut kv = KeyValues::container("viewsettings");
        kv.new_sub_key("bSnapToGrid").set_bool(self.snap_to_grid);
        kv.new_sub_key("bShowGrid").set_bool(self.show_grid);
        kv.new_sub_key("bShowLogicalGrid")
            .set_bool(self.show_logical_grid);
        kv.new_sub_key("nGridSpacing").set_int(self.grid_spacing);
        kv.new_sub_key("bShow3DGrid").set_bool(self.show_3d_grid);
        kv
    }

    fn from_key_values(&mut self, kv: &KeyValues) -> Result<()> {
        expect_name(kv, "ViewSettings", "viewsettings")?;

        let defaults = ViewSettings::default();
        self.snap_to_grid = kv.sub_key("bSnapToGrid").as_bool(defaults.snap_to_grid);
        self.show_grid = kv.sub_key("bShowGrid").as_bool(defaults.show_grid);
        self.show_logical_grid = kv
            .sub_key("bShowLogicalGrid")
            .as_bool(defaults.show_logical_grid);
        self.grid_spacing = kv.sub_key("nGridSpacing").as_int(defaults.grid_spacing);
        self.show_3d_grid = kv.sub_key("bShow3DGrid").as_bool(defaults.show_3d_grid);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_block_gives_defaults() {
        let root = crate::parse("viewsettings {}").unwrap();
        let settings = ViewSettings::unmarshal(root.sub_key("viewsettings").unwrap()).unwrap();
        assert_eq!(settings, ViewSettings::default());
        assert_eq!(settings.grid_spacing, 64);
        assert!(settings.snap_to_grid);
    }

    #[test]
    fn test_reads_hammer_output() {
        let root = crate::parse(
            "viewsettings\n{\n\t\"bSnapToGrid\" \"0\"\n\t\"bShowGrid\" \"1\"\n\t\"bShowLogicalGrid\" \"0\"\n\t\"nGridSpacing\" \"16\"\n\t\"bShow3DGrid\" \"1\"\n}\n",
        )
        .unwrap();
        let settings = ViewSettings::unmarshal(root.sub_key("viewsettings").unwrap()).unwrap();
        assert!(!settings.snap_to_grid);
        assert_eq!(settings.grid_spacing, 16);
        assert!(settings.show_3d_grid);
    }

    #[test]
    fn test_tree_round_trip() {
        let settings = ViewSettings {
            show_logical_grid: true,
            grid_spacing: 8,
            ..ViewSettings::default()
        };
        let back = ViewSettings::unmarshal(&settings.to_key_values()).unwrap();
        assert_eq!(back, settings);
    }
}
