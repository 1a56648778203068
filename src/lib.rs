//! # keyvalues
//!
//! A reader and writer for Valve's KeyValues text format, the nested
//! `"key" "value"` / `"key" { ... }` syntax used by Source engine materials
//! (`.vmt`), maps (`.vmf`), and many configuration files.
//!
//! ## What is KeyValues?
//!
//! A KeyValues file is a forest of named nodes. Each node holds either a string
//! value or an ordered list of child nodes. Names are not unique and compare
//! case-insensitively:
//!
//! ```text
//! "LightmappedGeneric"
//! {
//!     "$basetexture" "nature/dirtfloor001a"
//!     "$surfaceprop" "dirt"
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Forgiving parser**: bare or quoted tokens, `//` and `/* */` comments,
//!   errors with line, column and byte offset
//! - **Canonical writer**: quoted, tab-indented output that parses back to an equal tree
//! - **Typed reads with defaults**: `as_int`, `as_float`, `as_bool` never fail, and
//!   absent keys read as the default through [`NodeExt`]
//! - **Serde compatible**: `#[derive(Serialize, Deserialize)]` types map onto trees
//! - **Typed records**: the [`Marshaler`] trait and the [`vmf`] records built on it
//!
//! ## Quick Start
//!
//! ### Reading and writing trees
//!
//! ```rust
//! use keyvalues::{parse, NodeExt};
//!
//! let root = parse(r#"LightmappedGeneric{$basetexture"nature/dirtfloor001a""$surfaceprop"dirt}"#).unwrap();
//!
//! let material = root.sub_key("lightmappedgeneric");
//! assert_eq!(material.sub_key("$SurfaceProp").as_str(""), "dirt");
//! assert_eq!(material.sub_key("$alpha").as_float(1.0), 1.0);
//!
//! assert_eq!(
//!     root.to_string(),
//!     "\"LightmappedGeneric\" {\n\t\"$basetexture\" \"nature/dirtfloor001a\"\n\t\"$surfaceprop\" \"dirt\"\n}\n"
//! );
//! ```
//!
//! ### Building trees
//!
//! ```rust
//! use keyvalues::KeyValues;
//!
//! let mut root = KeyValues::new();
//! let entity = root.new_sub_key("entity");
//! entity.new_sub_key("classname").set_string("light");
//! entity.new_sub_key("spawnflags").set_int(1);
//!
//! assert_eq!(
//!     root.to_string(),
//!     "\"entity\" {\n\t\"classname\" \"light\"\n\t\"spawnflags\" \"1\"\n}\n"
//! );
//! ```
//!
//! ### Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Light {
//!     classname: String,
//!     brightness: (u8, u8, u8, u16),
//!     spawnflags: u32,
//! }
//!
//! let light = Light {
//!     classname: "light".to_string(),
//!     brightness: (255, 255, 255, 200),
//!     spawnflags: 0,
//! };
//!
//! let text = keyvalues::to_string(&light).unwrap();
//! let back: Light = keyvalues::from_str(&text).unwrap();
//! assert_eq!(back, light);
//!
//! // Tuples also read from a single space-separated value
//! let hammer: Light = keyvalues::from_str(
//!     "classname light\n_light \"255 255 255 200\"\nbrightness \"255 200 100 50\"\nspawnflags 1\n",
//! )
//! .unwrap();
//! assert_eq!(hammer.brightness, (255, 200, 100, 50));
//! ```
//!
//! ## Errors and panics
//!
//! Malformed input and failing I/O are reported through [`Error`]. Misusing the
//! tree (setting a value on a node that holds children, or adding children to a
//! node that holds a value) is a programming error and panics.
//!
//! ## Logging
//!
//! Parsing and writing emit `tracing` events at `debug` (one per document) and
//! `trace` (one per key). The library never installs a subscriber.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - parse, query and write a material
//! - **`canonicalize.rs`** - reformat a file, with logging enabled
//! - **`vmf_records.rs`** - read and write typed `.vmf` records
//!
//! Run any example with: `cargo run --example <name>`

pub mod de;
pub mod error;
mod macros;
pub mod marshal;
pub mod node;
pub mod options;
pub mod parse;
pub mod ser;
pub mod vmf;
pub mod write;

pub use de::Deserializer;
pub use error::{Error, Result};
pub use marshal::Marshaler;
pub use node::{Children, ChildrenMut, KeyValues, NodeExt, Value};
pub use options::ParseOptions;
pub use parse::{parse, parse_with_options, Parser};
pub use ser::NodeSerializer;
pub use write::Writer;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;

/// Serialize any `T: Serialize` into a node named `name`.
///
/// # Examples
///
/// ```rust
/// use keyvalues::{to_tree, NodeExt};
/// use std::collections::BTreeMap;
///
/// let mut proxies = BTreeMap::new();
/// proxies.insert("AnimatedTexture", "frame");
///
/// let kv = to_tree("Proxies", &proxies).unwrap();
/// assert_eq!(kv.name(), "Proxies");
/// assert_eq!(kv.sub_key("animatedtexture").as_str(""), "frame");
/// ```
///
/// # Errors
///
/// Returns an error if the value contains byte arrays or map keys that aren't scalars.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_tree<T>(name: &str, value: &T) -> Result<KeyValues>
where
    T: ?Sized + Serialize,
{
    let payload = ser::to_value(value)?.unwrap_or_default();
    Ok(KeyValues::with_value(name, payload))
}

/// Serialize any `T: Serialize` to KeyValues text.
///
/// The fields (or map entries, or sequence elements) of `value` become the
/// top-level keys.
///
/// # Examples
///
/// ```rust
/// use keyvalues::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let text = to_string(&Point { x: 1, y: -2 }).unwrap();
/// assert_eq!(text, "\"x\" \"1\"\n\"y\" \"-2\"\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if `value` is a bare scalar, since text
/// needs at least a key per value.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let tree = top_level(value)?;
    Ok(tree.to_text())
}

/// Serialize any `T: Serialize` as KeyValues text into an I/O stream.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Same as [`to_string`], plus [`Error::Io`] if the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<usize>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let tree = top_level(value)?;
    tree.write_to(writer)
}

fn top_level<T>(value: &T) -> Result<KeyValues>
where
    T: ?Sized + Serialize,
{
    let tree = to_tree("", value)?;
    if tree.is_leaf() {
        return Err(Error::unsupported_type(
            "a scalar cannot be written as a document; wrap it in a struct or map",
        ));
    }
    Ok(tree)
}

/// Deserialize an instance of type `T` from a node, borrowing strings from it.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Proxy<'a> {
///     #[serde(rename = "resultVar")]
///     result_var: &'a str,
///     rate: f32,
/// }
///
/// let root = keyvalues::parse("AnimatedTexture { resultvar $frame rate 12 }").unwrap();
/// let proxy: Proxy = keyvalues::from_tree(root.sub_key("AnimatedTexture").unwrap()).unwrap();
/// assert_eq!(proxy.result_var, "$frame");
/// assert_eq!(proxy.rate, 12.0);
/// ```
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] naming the key if a value can't be read as the
/// requested type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_tree<'de, T>(kv: &'de KeyValues) -> Result<T>
where
    T: Deserialize<'de>,
{
    T::deserialize(Deserializer::new(kv))
}

/// Deserialize an instance of type `T` from KeyValues text.
///
/// The top-level keys of the document are read as the fields of `T`.
///
/// # Examples
///
/// ```rust
/// use keyvalues::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x 1\nY 0x10\n").unwrap();
/// assert_eq!(point, Point { x: 1, y: 16 });
/// ```
///
/// # Errors
///
/// Returns an error if the text doesn't parse or can't be read as `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let root = parse(s)?;
    from_tree(&root)
}

/// Deserialize an instance of type `T` from an I/O stream of KeyValues text.
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, and otherwise the same errors as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut root = KeyValues::new();
    root.read_from(reader)?;
    from_tree(&root)
}

/// Deserialize an instance of type `T` from bytes of KeyValues text.
///
/// # Errors
///
/// Returns [`Error::InvalidUtf8`] with the offset of the first bad byte, and
/// otherwise the same errors as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::InvalidUtf8 {
        offset: e.valid_up_to(),
    })?;
    from_str(s)
}
