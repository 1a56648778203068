//! The KeyValues tree.
//!
//! This module provides [`KeyValues`], a named node that holds either a scalar string
//! or an ordered list of child nodes, plus the helpers used to read it.
//!
//! ## Core Types
//!
//! - [`KeyValues`]: a named node
//! - [`Value`]: what a node holds (`Empty`, `Leaf` or `Container`)
//! - [`Children`]: an ordered cursor over a node's children
//! - [`NodeExt`]: the same read API for `Option<&KeyValues>`, so lookups can be
//!   chained through keys that don't exist
//!
//! ## Usage Patterns
//!
//! ### Building a Tree
//!
//! ```rust
//! use keyvalues::KeyValues;
//!
//! let mut root = KeyValues::new();
//! let material = root.new_sub_key("LightmappedGeneric");
//! material.new_sub_key("$basetexture").set_string("nature/dirtfloor001a");
//! material.new_sub_key("$surfaceprop").set_string("dirt");
//!
//! assert_eq!(root.len(), 1);
//! ```
//!
//! ### Reading with Defaults
//!
//! ```rust
//! use keyvalues::{parse, NodeExt};
//!
//! let root = parse("viewsettings { nGridSpacing 32 }\n").unwrap();
//! let settings = root.sub_key("ViewSettings");
//!
//! assert_eq!(settings.sub_key("nGridSpacing").as_int(64), 32);
//! assert_eq!(settings.sub_key("bShowGrid").as_bool(true), true);
//! assert_eq!(root.sub_key("missing").sub_key("deeper").as_str("none"), "none");
//! ```
//!
//! ## Usage Errors
//!
//! A node never holds a scalar and children at the same time. Calling a `set_*`
//! method on a container, or adding a child to a scalar, is a bug in the calling
//! code and panics. Bad *input* never panics; it surfaces as an [`Error`](crate::Error)
//! from the parser instead.

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::FusedIterator;
use std::slice;

/// What a [`KeyValues`] node holds.
///
/// A freshly created node is `Empty`: it reads like a scalar holding `""` and is
/// written as `""`, but it can still become either a `Leaf` (on the first `set_*`)
/// or a `Container` (on the first child).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Empty,
    Leaf(String),
    Container(Vec<KeyValues>),
}

/// A named node of a KeyValues tree.
///
/// The unnamed node returned by [`KeyValues::new`] doubles as the root of a forest:
/// the parser fills it with top-level keys and the writer emits only its children.
///
/// # Examples
///
/// ```rust
/// use keyvalues::KeyValues;
///
/// let mut root = KeyValues::new();
/// root.new_sub_key("editorversion").set_int(400);
/// root.new_sub_key("mapversion").set_uint64(255);
///
/// assert_eq!(root.sub_key("EditorVersion").unwrap().as_int(0), 400);
/// assert_eq!(root.sub_key("mapversion").unwrap().as_str(""), "0xff");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct KeyValues {
    name: String,
    value: Value,
}

impl KeyValues {
    /// Creates an unnamed, empty node. Use it as the root of a forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty node with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        KeyValues {
            name: name.into(),
            value: Value::Empty,
        }
    }

    /// Creates a scalar node.
    #[must_use]
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValues {
            name: name.into(),
            value: Value::Leaf(value.into()),
        }
    }

    /// Creates a container node with no children.
    #[must_use]
    pub fn container(name: impl Into<String>) -> Self {
        KeyValues {
            name: name.into(),
            value: Value::Container(Vec::new()),
        }
    }

    /// Creates a node from a name and a payload.
    #[must_use]
    pub fn with_value(name: impl Into<String>, value: Value) -> Self {
        KeyValues {
            name: name.into(),
            value,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns `true` if this node holds a scalar set through `set_*` or parsed from text.
    #[inline]
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.value, Value::Leaf(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self.value, Value::Container(_))
    }

    /// Number of direct children. Scalars have none.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.value {
            Value::Container(children) => children.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The scalar text, with `Empty` reading as `""`. Containers have none.
    fn scalar(&self) -> Option<&str> {
        match &self.value {
            Value::Empty => Some(""),
            Value::Leaf(s) => Some(s),
            Value::Container(_) => None,
        }
    }

    /// Returns the scalar value, or `default` if this node is a container.
    #[must_use]
    pub fn as_str<'a>(&'a self, default: &'a str) -> &'a str {
        self.scalar().unwrap_or(default)
    }

    /// Parses the scalar as a signed 64-bit integer.
    ///
    /// Base prefixes are honoured: `0x`/`0X` for hex, `0b`/`0B` for binary,
    /// `0o`/`0O` or a bare leading `0` for octal. Returns `default` for containers
    /// and for text that doesn't parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyvalues::KeyValues;
    ///
    /// assert_eq!(KeyValues::leaf("k", "0x1F").as_int(0), 31);
    /// assert_eq!(KeyValues::leaf("k", "-010").as_int(0), -8);
    /// assert_eq!(KeyValues::leaf("k", "ten").as_int(57), 57);
    /// ```
    #[must_use]
    pub fn as_int(&self, default: i64) -> i64 {
        self.scalar().and_then(parse_int).unwrap_or(default)
    }

    /// Parses the scalar as an unsigned 64-bit integer. Same prefixes as
    /// [`as_int`](Self::as_int); signs are rejected.
    #[must_use]
    pub fn as_uint64(&self, default: u64) -> u64 {
        self.scalar().and_then(parse_uint).unwrap_or(default)
    }

    #[must_use]
    pub fn as_float(&self, default: f64) -> f64 {
        self.scalar().and_then(parse_float).unwrap_or(default)
    }

    /// Reads the scalar as an integer and tests it against zero.
    ///
    /// The default is routed through [`as_int`](Self::as_int), so text that isn't a
    /// number yields `default`, and *any* nonzero number is `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyvalues::KeyValues;
    ///
    /// let kv = KeyValues::leaf("bSnapToGrid", "notanumber");
    /// assert!(kv.as_bool(true));
    /// assert!(!kv.as_bool(false));
    /// assert!(KeyValues::leaf("b", "10").as_bool(false));
    /// ```
    #[must_use]
    pub fn as_bool(&self, default: bool) -> bool {
        self.as_int(if default { 1 } else { 0 }) != 0
    }

    fn set_scalar(&mut self, op: &str, value: String) {
        if self.is_container() {
            panic!(
                "{} called on key {:?}, which holds child keys",
                op, self.name
            );
        }
        self.value = Value::Leaf(value);
    }

    /// Overwrites the scalar value.
    ///
    /// # Panics
    ///
    /// Panics if this node holds children.
    pub fn set_string(&mut self, value: impl Into<String>) {
        self.set_scalar("set_string", value.into());
    }

    /// Stores `value` in base 10.
    ///
    /// # Panics
    ///
    /// Panics if this node holds children.
    pub fn set_int(&mut self, value: i64) {
        self.set_scalar("set_int", value.to_string());
    }

    /// Stores `value` as lowercase hex with a `0x` prefix.
    ///
    /// # Panics
    ///
    /// Panics if this node holds children.
    pub fn set_uint64(&mut self, value: u64) {
        self.set_scalar("set_uint64", format!("{:#x}", value));
    }

    /// Stores the shortest decimal text that parses back to `value`.
    ///
    /// Magnitudes below `1e-4` or from `1e21` up use exponent form, so
    /// `1e300` is stored as `"1e+300"` and `1e-7` as `"1e-07"`.
    ///
    /// # Panics
    ///
    /// Panics if this node holds children.
    pub fn set_float(&mut self, value: f64) {
        self.set_scalar("set_float", format_float(value));
    }

    /// Stores `"1"` or `"0"`.
    ///
    /// # Panics
    ///
    /// Panics if this node holds children.
    pub fn set_bool(&mut self, value: bool) {
        self.set_scalar("set_bool", if value { "1" } else { "0" }.to_string());
    }

    /// Turns an `Empty` node into a container with no children.
    ///
    /// # Panics
    ///
    /// Panics if this node holds a scalar.
    pub fn make_container(&mut self) -> &mut Self {
        self.children_vec("make_container");
        self
    }

    fn children_vec(&mut self, op: &str) -> &mut Vec<KeyValues> {
        if self.is_leaf() {
            panic!("{} called on key {:?}, which holds a value", op, self.name);
        }
        if let Value::Empty = self.value {
            self.value = Value::Container(Vec::new());
        }
        match &mut self.value {
            Value::Container(children) => children,
            _ => unreachable!("key was just made a container"),
        }
    }

    /// Appends a new, empty child and returns it.
    ///
    /// The returned reference borrows `self`, so the parent can't be changed while
    /// it is alive.
    ///
    /// # Panics
    ///
    /// Panics if this node holds a scalar.
    pub fn new_sub_key(&mut self, name: impl Into<String>) -> &mut KeyValues {
        let children = self.children_vec("new_sub_key");
        let index = children.len();
        children.push(KeyValues::named(name));
        &mut children[index]
    }

    /// Appends `node` as the last child. Passing `None` does nothing.
    ///
    /// # Panics
    ///
    /// Panics if this node holds a scalar and `node` is `Some`.
    pub fn append(&mut self, node: impl Into<Option<KeyValues>>) {
        if let Some(node) = node.into() {
            self.children_vec("append").push(node);
        }
    }

    /// Returns the first child whose name matches `name`, ignoring case.
    #[must_use]
    pub fn sub_key(&self, name: &str) -> Option<&KeyValues> {
        self.children().find(|child| names_match(&child.name, name))
    }

    pub fn sub_key_mut(&mut self, name: &str) -> Option<&mut KeyValues> {
        self.children_mut().find(|child| names_match(&child.name, name))
    }

    /// Iterates over every child whose name matches `name`, ignoring case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyvalues::parse;
    ///
    /// let root = parse("world { solid { id 1 } solid { id 2 } entity { id 3 } }").unwrap();
    /// let world = root.sub_key("world").unwrap();
    /// let ids: Vec<i64> = world.sub_keys("SOLID").map(|s| s.sub_key("id").unwrap().as_int(0)).collect();
    /// assert_eq!(ids, vec![1, 2]);
    /// ```
    pub fn sub_keys<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a KeyValues> + 'a {
        self.children()
            .filter(move |child| names_match(&child.name, name))
    }

    /// Returns a cursor over the direct children, in insertion order.
    ///
    /// Scalars and empty nodes yield nothing.
    pub fn children(&self) -> Children<'_> {
        match &self.value {
            Value::Container(children) => Children {
                iter: children.iter(),
            },
            _ => Children {
                iter: Default::default(),
            },
        }
    }

    pub fn children_mut(&mut self) -> ChildrenMut<'_> {
        match &mut self.value {
            Value::Container(children) => ChildrenMut {
                iter: children.iter_mut(),
            },
            _ => ChildrenMut {
                iter: Default::default(),
            },
        }
    }

    /// Renders the children of this node as canonical KeyValues text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::write::render_forest(self, f)
    }
}

impl<'a> IntoIterator for &'a KeyValues {
    type Item = &'a KeyValues;
    type IntoIter = Children<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.children()
    }
}

/// Ordered cursor over the children of a [`KeyValues`] node.
///
/// Created by [`KeyValues::children`]. Call `children()` again to start over.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    iter: slice::Iter<'a, KeyValues>,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a KeyValues;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl FusedIterator for Children<'_> {}

/// Mutable counterpart of [`Children`].
#[derive(Debug)]
pub struct ChildrenMut<'a> {
    iter: slice::IterMut<'a, KeyValues>,
}

impl<'a> Iterator for ChildrenMut<'a> {
    type Item = &'a mut KeyValues;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for ChildrenMut<'_> {}

impl FusedIterator for ChildrenMut<'_> {}

/// Read access for a node that may not exist.
///
/// Lookups return `Option<&KeyValues>`; this trait lets the caller keep going as if
/// the missing node were an empty scalar, falling back to the supplied defaults.
///
/// # Examples
///
/// ```rust
/// use keyvalues::{KeyValues, NodeExt};
///
/// let root = KeyValues::new();
/// let missing = root.sub_key("versioninfo");
///
/// assert_eq!(missing.name(), "");
/// assert_eq!(missing.sub_key("editorbuild").as_int(57), 57);
/// assert_eq!(missing.children().count(), 0);
/// ```
pub trait NodeExt<'a> {
    fn name(self) -> &'a str;
    fn sub_key(self, name: &str) -> Option<&'a KeyValues>;
    fn as_str(self, default: &'a str) -> &'a str;
    fn as_int(self, default: i64) -> i64;
    fn as_uint64(self, default: u64) -> u64;
    fn as_float(self, default: f64) -> f64;
    fn as_bool(self, default: bool) -> bool;
    fn children(self) -> Children<'a>;
}

impl<'a> NodeExt<'a> for Option<&'a KeyValues> {
    fn name(self) -> &'a str {
        self.map_or("", KeyValues::name)
    }

    fn sub_key(self, name: &str) -> Option<&'a KeyValues> {
        self.and_then(|kv| kv.sub_key(name))
    }

    fn as_str(self, default: &'a str) -> &'a str {
        match self {
            Some(kv) => kv.as_str(default),
            None => default,
        }
    }

    fn as_int(self, default: i64) -> i64 {
        self.map_or(default, |kv| kv.as_int(default))
    }

    fn as_uint64(self, default: u64) -> u64 {
        self.map_or(default, |kv| kv.as_uint64(default))
    }

    fn as_float(self, default: f64) -> f64 {
        self.map_or(default, |kv| kv.as_float(default))
    }

    fn as_bool(self, default: bool) -> bool {
        self.as_int(if default { 1 } else { 0 }) != 0
    }

    fn children(self) -> Children<'a> {
        match self {
            Some(kv) => kv.children(),
            None => Children {
                iter: Default::default(),
            },
        }
    }
}

/// Compares key names the way lookups do: Unicode case-insensitively.
pub(crate) fn names_match(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .map(fold_variant)
        .eq(b.chars().flat_map(char::to_lowercase).map(fold_variant))
}

/// Maps lowercase letters that share a case-fold orbit with another lowercase
/// letter onto that letter, e.g. final sigma onto `σ`.
fn fold_variant(c: char) -> char {
    match c {
        'ς' => 'σ',
        'ſ' => 's',
        'ϐ' => 'β',
        'ϑ' => 'θ',
        'ϕ' => 'φ',
        'ϖ' => 'π',
        'ϰ' => 'κ',
        'ϱ' => 'ρ',
        'ϵ' => 'ε',
        'ẛ' => 'ṡ',
        '\u{345}' | '\u{1FBE}' => 'ι',
        'ᲀ' => 'в',
        'ᲁ' => 'д',
        'ᲂ' => 'о',
        'ᲃ' => 'с',
        'ᲄ' | 'ᲅ' => 'т',
        'ᲆ' => 'ъ',
        'ᲇ' => 'ѣ',
        'ᲈ' => 'ꙋ',
        _ => c,
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    match s.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&s[prefix.len()..]),
        _ => None,
    }
}

/// Parses an unsigned integer literal, picking the radix from its prefix.
pub(crate) fn parse_uint(s: &str) -> Option<u64> {
    let (radix, digits) = if let Some(rest) = strip_prefix_ignore_case(s, "0x") {
        (16, rest)
    } else if let Some(rest) = strip_prefix_ignore_case(s, "0b") {
        (2, rest)
    } else if let Some(rest) = strip_prefix_ignore_case(s, "0o") {
        (8, rest)
    } else if s.len() > 1 && s.starts_with('0') {
        (8, &s[1..])
    } else {
        (10, s)
    };

    // from_str_radix would accept a leading '+'
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// Parses a signed integer literal: an optional sign, then [`parse_uint`] syntax.
pub(crate) fn parse_int(s: &str) -> Option<i64> {
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = parse_uint(unsigned)?;

    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            None
        } else {
            Some((magnitude as i64).wrapping_neg())
        }
    } else {
        i64::try_from(magnitude).ok()
    }
}

pub(crate) fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

/// Shortest round-trip text for a float. Decimal exponents below -4 or from 21
/// up switch to `1e+21` form, with at least two exponent digits.
pub(crate) fn format_float<T>(value: T) -> String
where
    T: fmt::Display + fmt::LowerExp,
{
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent),
        // inf and NaN
        None => return value.to_string(),
    };
    match exponent.parse::<i32>() {
        Ok(exp) if (-4..21).contains(&exp) => value.to_string(),
        Ok(exp) => format!(
            "{}e{}{:02}",
            mantissa,
            if exp < 0 { '-' } else { '+' },
            exp.unsigned_abs()
        ),
        Err(_) => value.to_string(),
    }
}

impl Serialize for KeyValues {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.value {
            Value::Empty => serializer.serialize_str(""),
            Value::Leaf(s) => serializer.serialize_str(s),
            Value::Container(children) => {
                // Duplicate names are emitted as-is, in order
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for child in children {
                    map.serialize_entry(&child.name, child)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for KeyValues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyValuesVisitor;

        impl<'de> Visitor<'de> for KeyValuesVisitor {
            type Value = KeyValues;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number, boolean, map or sequence")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                let mut kv = KeyValues::new();
                kv.set_bool(value);
                Ok(kv)
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                let mut kv = KeyValues::new();
                kv.set_int(value);
                Ok(kv)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(KeyValues::leaf("", value.to_string()))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                let mut kv = KeyValues::new();
                kv.set_float(value);
                Ok(kv)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(KeyValues::leaf("", value))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(KeyValues::leaf("", value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(KeyValues::new())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(KeyValues::new())
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut kv = KeyValues::container("");
                let mut index = 0usize;
                while let Some(mut child) = seq.next_element::<KeyValues>()? {
                    child.set_name(index.to_string());
                    kv.append(child);
                    index += 1;
                }
                Ok(kv)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut kv = KeyValues::container("");
                while let Some((key, mut child)) = map.next_entry::<String, KeyValues>()? {
                    child.set_name(key);
                    kv.append(child);
                }
                Ok(kv)
            }
        }

        deserializer.deserialize_any(KeyValuesVisitor)
    }
}
