//! Serde deserialization from KeyValues trees.
//!
//! This module provides the [`Deserializer`] that reads Rust data structures
//! out of a parsed [`KeyValues`] node, borrowing strings from the tree.
//!
//! ## Overview
//!
//! - **Structs**: fields are matched against child names case-insensitively,
//!   so `nGridSpacing` fills a field renamed to `ngridspacing`
//! - **Numbers**: integer text accepts `0x`, `0b`, `0o` and leading-zero octal
//! - **Booleans**: any integer literal (non-zero is true), `true` or `false`
//! - **Sequences**: either child keys in order, or the whitespace-separated words
//!   of a single value, so `"255 128 0"` reads as `[u8; 3]`
//! - **Options**: an empty value is `None`; a missing field is `None` too
//!
//! ## Usage
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct VisGroup {
//!     name: String,
//!     visgroupid: u32,
//!     color: (u8, u8, u8),
//! }
//!
//! let root = keyvalues::parse(
//!     "visgroup { name \"Lights\" visgroupid 7 color \"255 128 0\" }",
//! )
//! .unwrap();
//! let group: VisGroup = keyvalues::from_tree(root.sub_key("visgroup").unwrap()).unwrap();
//! assert_eq!(
//!     group,
//!     VisGroup { name: "Lights".to_string(), visgroupid: 7, color: (255, 128, 0) }
//! );
//! ```

use crate::node::{names_match, parse_float, parse_int, parse_uint};
use crate::{Error, KeyValues, Result, Value};
use serde::de::{self, IntoDeserializer};

#[derive(Clone, Copy)]
enum Content<'de> {
    Text(&'de str),
    Children(&'de [KeyValues]),
}

/// Deserializer over a borrowed node.
///
/// Created with [`Deserializer::new`]; most callers use [`from_tree`](crate::from_tree).
#[derive(Clone, Copy)]
pub struct Deserializer<'de> {
    key: &'de str,
    content: Content<'de>,
}

impl<'de> Deserializer<'de> {
    pub fn new(node: &'de KeyValues) -> Self {
        let content = match node.value() {
            Value::Empty => Content::Text(""),
            Value::Leaf(text) => Content::Text(text),
            Value::Container(children) => Content::Children(children),
        };
        Deserializer {
            key: node.name(),
            content,
        }
    }

    fn scalar(key: &'de str, text: &'de str) -> Self {
        Deserializer {
            key,
            content: Content::Text(text),
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        let found = match self.content {
            Content::Text(text) => format!("{text:?}"),
            Content::Children(children) => format!("{} child key(s)", children.len()),
        };
        Error::type_mismatch(self.key, expected, &found)
    }

    fn text(&self, expected: &str) -> Result<&'de str> {
        match self.content {
            Content::Text(text) => Ok(text),
            Content::Children(_) => Err(self.mismatch(expected)),
        }
    }

    fn entries(&self, fields: Option<&'static [&'static str]>) -> Result<Entries<'de>> {
        let children: &'de [KeyValues] = match self.content {
            Content::Children(children) => children,
            Content::Text("") => &[],
            Content::Text(_) => return Err(self.mismatch("child keys")),
        };
        Ok(Entries {
            iter: children.iter(),
            value: None,
            fields,
        })
    }
}

macro_rules! deserialize_signed {
    ($($method:ident: $ty:ident),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let text = self.text(stringify!($ty))?;
                let n = parse_int(text).ok_or_else(|| self.mismatch(stringify!($ty)))?;
                visitor.visit_i64(n)
            }
        )*
    };
}

macro_rules! deserialize_unsigned {
    ($($method:ident: $ty:ident),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let text = self.text(stringify!($ty))?;
                let n = parse_uint(text).ok_or_else(|| self.mismatch(stringify!($ty)))?;
                visitor.visit_u64(n)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.content {
            Content::Text(text) => visitor.visit_borrowed_str(text),
            Content::Children(_) => visitor.visit_map(self.entries(None)?),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let text = self.text("bool")?;
        if let Some(n) = parse_int(text) {
            return visitor.visit_bool(n != 0);
        }
        if text.eq_ignore_ascii_case("true") {
            visitor.visit_bool(true)
        } else if text.eq_ignore_ascii_case("false") {
            visitor.visit_bool(false)
        } else {
            Err(self.mismatch("bool"))
        }
    }

    deserialize_signed! {
        deserialize_i8: i8,
        deserialize_i16: i16,
        deserialize_i32: i32,
        deserialize_i64: i64,
    }

    deserialize_unsigned! {
        deserialize_u8: u8,
        deserialize_u16: u16,
        deserialize_u32: u32,
        deserialize_u64: u64,
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let text = self.text("float")?;
        let n = parse_float(text).ok_or_else(|| self.mismatch("float"))?;
        visitor.visit_f64(n)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let text = self.text("char")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => visitor.visit_char(ch),
            _ => Err(self.mismatch("char")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.text("string")?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("byte arrays"))
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.content {
            Content::Text("") => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.content {
            Content::Text("") => visitor.visit_unit(),
            _ => Err(self.mismatch("empty value")),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.content {
            Content::Children(children) => visitor.visit_seq(Elements {
                iter: children.iter(),
            }),
            Content::Text(text) => visitor.visit_seq(Words {
                key: self.key,
                iter: text.split_whitespace(),
            }),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(self.entries(None)?)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(self.entries(Some(fields))?)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.content {
            Content::Text(text) => visitor.visit_enum(text.into_deserializer()),
            Content::Children([only]) => visitor.visit_enum(Variant { node: only }),
            Content::Children(_) => Err(self.mismatch("a single variant key")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Child keys read in order as sequence elements; their names are ignored.
struct Elements<'de> {
    iter: std::slice::Iter<'de, KeyValues>,
}

impl<'de> de::SeqAccess<'de> for Elements<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(node) => seed.deserialize(Deserializer::new(node)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Whitespace-separated words of one value read as sequence elements.
struct Words<'de> {
    key: &'de str,
    iter: std::str::SplitWhitespace<'de>,
}

impl<'de> de::SeqAccess<'de> for Words<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(word) => seed
                .deserialize(Deserializer::scalar(self.key, word))
                .map(Some),
            None => Ok(None),
        }
    }
}

struct Entries<'de> {
    iter: std::slice::Iter<'de, KeyValues>,
    value: Option<&'de KeyValues>,
    fields: Option<&'static [&'static str]>,
}

impl<'de> de::MapAccess<'de> for Entries<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let node = match self.iter.next() {
            Some(node) => node,
            None => return Ok(None),
        };
        self.value = Some(node);

        // Report the declared field name so derived structs match regardless of case
        let name: &'de str = self
            .fields
            .and_then(|fields| fields.iter().find(|f| names_match(f, node.name())))
            .copied()
            .unwrap_or(node.name());

        seed.deserialize(Deserializer::scalar(node.name(), name))
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(node) => seed.deserialize(Deserializer::new(node)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// A container holding one child, read as an enum variant named after the child.
struct Variant<'de> {
    node: &'de KeyValues,
}

impl<'de> de::EnumAccess<'de> for Variant<'de> {
    type Error = Error;
    type Variant = Deserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name = self.node.name();
        let variant = seed.deserialize(Deserializer::scalar(name, name))?;
        Ok((variant, Deserializer::new(self.node)))
    }
}

impl<'de> de::VariantAccess<'de> for Deserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.content {
            Content::Text("") => Ok(()),
            _ => Err(self.mismatch("unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(self.entries(Some(fields))?)
    }
}
