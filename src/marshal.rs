//! Conversion between typed records and KeyValues nodes.
//!
//! A record implements [`Marshaler`] by hand when its layout doesn't fit the
//! serde mapping: names that must be checked, fields with non-zero defaults, or
//! values that need validation. See the [`vmf`](crate::vmf) module for examples.

use crate::node::names_match;
use crate::{Error, KeyValues, Result};

/// A record that can be built from, and turned back into, a named node.
///
/// # Examples
///
/// ```rust
/// use keyvalues::marshal::expect_name;
/// use keyvalues::{KeyValues, Marshaler, NodeExt, Result};
///
/// #[derive(Default)]
/// struct Camera {
///     fov: i64,
/// }
///
/// impl Marshaler for Camera {
///     fn to_key_values(&self) -> KeyValues {
///         let mut kv = KeyValues::container("camera");
///         kv.new_sub_key("fov").set_int(self.fov);
///         kv
///     }
///
///     fn from_key_values(&mut self, kv: &KeyValues) -> Result<()> {
///         expect_name(kv, "Camera", "camera")?;
///         self.fov = kv.sub_key("fov").as_int(90);
///         Ok(())
///     }
/// }
///
/// let root = keyvalues::parse("Camera { fov 75 }").unwrap();
/// let camera = Camera::unmarshal(root.sub_key("camera").unwrap()).unwrap();
/// assert_eq!(camera.fov, 75);
/// assert_eq!(camera.to_key_values().to_string(), "\"fov\" \"75\"\n");
/// ```
pub trait Marshaler {
    /// Builds a fresh node named after the record.
    fn to_key_values(&self) -> KeyValues;

    /// Fills `self` from `kv`, returning the first validation error.
    ///
    /// # Errors
    ///
    /// Returns an error if the node has the wrong name or a field is invalid.
    fn from_key_values(&mut self, kv: &KeyValues) -> Result<()>;

    /// Builds a default record and fills it from `kv`.
    ///
    /// # Errors
    ///
    /// Same as [`from_key_values`](Self::from_key_values).
    fn unmarshal(kv: &KeyValues) -> Result<Self>
    where
        Self: Default + Sized,
    {
        let mut record = Self::default();
        record.from_key_values(kv)?;
        Ok(record)
    }
}

/// Checks that `kv` is named `expected`, ignoring case.
///
/// # Errors
///
/// Returns [`Error::KeyMismatch`] naming `record` when the names differ.
pub fn expect_name(kv: &KeyValues, record: &'static str, expected: &'static str) -> Result<()> {
    if names_match(kv.name(), expected) {
        Ok(())
    } else {
        Err(Error::key_mismatch(record, expected, kv.name()))
    }
}
