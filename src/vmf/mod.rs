//! Typed records for sections of Hammer `.vmf` map files.
//!
//! Each record implements [`Marshaler`](crate::Marshaler): it checks the node
//! name (case-insensitively), reads its fields with defaults, and writes itself
//! back as a fresh node.
//!
//! ```rust
//! use keyvalues::vmf::{VersionInfo, VisGroups};
//! use keyvalues::Marshaler;
//!
//! let root = keyvalues::parse(
//!     r#"
//!     versioninfo
//!     {
//!         "editorversion" "400"
//!         "editorbuild" "6157"
//!         "mapversion" "12"
//!         "formatversion" "100"
//!         "prefab" "0"
//!     }
//!     visgroups
//!     {
//!         visgroup
//!         {
//!             "name" "Lights"
//!             "visgroupid" "3"
//!             "color" "255 220 0"
//!         }
//!     }
//!     "#,
//! )
//! .unwrap();
//!
//! let info = VersionInfo::unmarshal(root.sub_key("versioninfo").unwrap()).unwrap();
//! assert_eq!(info.editor_build, 6157);
//!
//! let groups = VisGroups::unmarshal(root.sub_key("visgroups").unwrap()).unwrap();
//! assert_eq!(groups[0].name, "Lights");
//! assert_eq!(groups[0].color.green, 220);
//! ```

mod color;
mod version_info;
mod view_settings;
mod visgroup;

pub use color::Rgb;
pub use version_info::VersionInfo;
pub use view_settings::ViewSettings;
pub use visgroup::{VisGroup, VisGroups};
