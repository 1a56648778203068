use super::Rgb;
use crate::marshal::expect_name;
use crate::{Error, KeyValues, Marshaler, NodeExt, Result};
use std::ops::{Deref, DerefMut};

/// A named visibility group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisGroup {
    pub name: String,
    pub id: i64,
    pub color: Rgb,
}

impl Marshaler for VisGroup {
    fn to_key_values(&self) -> KeyValues {
        let mut kv = KeyValues::container("visgroup");
        kv.new_sub_key("name").set_string(self.name.as_str());
        kv.new_sub_key("visgroupid").set_int(self.id);
        kv.append(self.color.to_key_values());
        kv
    }

    fn from_key_values(&mut self, kv: &KeyValues) -> Result<()> {
        expect_name(kv, "VisGroup", "visgroup")?;

        let name = kv.sub_key("name").as_str("");
        if name.is_empty() {
            return Err(Error::invalid_record("VisGroup", "no name"));
        }

        let id = kv.sub_key("visgroupid").as_int(0);
        if id <= 0 {
            return Err(Error::invalid_record(
                "VisGroup",
                format!("{name}: ID = {id} or no ID"),
            ));
        }

        let missing = KeyValues::named("color");
        let color = Rgb::unmarshal(kv.sub_key("color").unwrap_or(&missing))
            .map_err(|err| Error::invalid_record("VisGroup", format!("{name}: {err}")))?;

        self.name = name.to_string();
        self.id = id;
        self.color = color;
        Ok(())
    }
}

/// The `visgroups` block: every visibility group in the map, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisGroups(pub Vec<VisGroup>);

impl Deref for VisGroups {
    type Target = Vec<VisGroup>;

    fn deref(&self) -> &Vec<VisGroup> {
        &self.0
    }
}

impl DerefMut for VisGroups {
    fn deref_mut(&mut self) -> &mut Vec<VisGroup> {
        &mut self.0
    }
}

impl Marshaler for VisGroups {
    fn to_key_values(&self) -> KeyValues {
        let mut kv = KeyValues::container("visgroups");
        for group in &self.0 {
            kv.append(group.to_key_values());
        }
        kv
    }

    fn from_key_values(&mut self, kv: &KeyValues) -> Result<()> {
        expect_name(kv, "VisGroups", "visgroups")?;

        self.0 = kv
            .children()
            .map(VisGroup::unmarshal)
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(text: &str) -> Result<VisGroup> {
        let root = crate::parse(text).unwrap();
        VisGroup::unmarshal(root.sub_key("visgroup").unwrap())
    }

    #[test]
    fn test_reads_group() {
        let g = group("visgroup { name Walls visgroupid 0x10 color \"10 20 30\" }").unwrap();
        assert_eq!(
            g,
            VisGroup {
                name: "Walls".to_string(),
                id: 16,
                color: Rgb::new(10, 20, 30),
            }
        );
    }

    #[test]
    fn test_validation_errors() {
        let err = group("visgroup { visgroupid 1 color \"1 2 3\" }").unwrap_err();
        assert_eq!(err.to_string(), "VisGroup: no name");

        let err = group("visgroup { name Walls color \"1 2 3\" }").unwrap_err();
        assert_eq!(err.to_string(), "VisGroup: Walls: ID = 0 or no ID");

        let err = group("visgroup { name Walls visgroupid -4 color \"1 2 3\" }").unwrap_err();
        assert_eq!(err.to_string(), "VisGroup: Walls: ID = -4 or no ID");

        let err = group("visgroup { name Walls visgroupid 2 }").unwrap_err();
        assert_eq!(
            err.to_string(),
            "VisGroup: Walls: RGB: color has 0 components, but expected 3"
        );
    }

    #[test]
    fn test_group_list_is_replaced_only_on_success() {
        let mut groups = VisGroups(vec![VisGroup::default()]);

        let bad = crate::parse(
            "visgroups { visgroup { name A visgroupid 1 color \"0 0 0\" } visgroup { name B } }",
        )
        .unwrap();
        assert!(groups
            .from_key_values(bad.sub_key("visgroups").unwrap())
            .is_err());
        assert_eq!(groups.len(), 1);

        let good = crate::parse(
            "visgroups { visgroup { name A visgroupid 1 color \"0 0 0\" } visgroup { name B visgroupid 2 color \"1 1 1\" } }",
        )
        .unwrap();
        groups
            .from_key_values(good.sub_key("visgroups").unwrap())
            .unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_to_key_values_nests_groups() {
        let groups = VisGroups(vec![VisGroup {
            name: "Lights".to_string(),
            id: 3,
            color: Rgb::new(255, 220, 0),
        }]);
        assert_eq!(
            groups.to_key_values().to_string(),
            "\"visgroup\" {\n\t\"name\" \"Lights\"\n\t\"visgroupid\" \"3\"\n\t\"color\" \"255 220 0\"\n}\n"
        );
    }
}
