//! Serde serialization into KeyValues trees.
//!
//! This module provides [`NodeSerializer`], which turns any `T: Serialize` into
//! the payload of a [`KeyValues`] node.
//!
//! ## Mapping
//!
//! - **Structs and maps**: a container whose children are named by field or key
//! - **Sequences and tuples**: a container whose children are named `"0"`, `"1"`, ...
//! - **Scalars**: decimal text; `bool` is written as `"1"` or `"0"`
//! - **`None` and `()`**: an empty node; `None` struct fields and map values are left out
//! - **Enums**: a unit variant is its name, any other variant is a container
//!   holding one child named after the variant
//!
//! ## Usage
//!
//! Most users should use the functions in the crate root:
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Material {
//!     #[serde(rename = "$basetexture")]
//!     base_texture: String,
//!     #[serde(rename = "$translucent")]
//!     translucent: bool,
//! }
//!
//! let material = Material {
//!     base_texture: "glass/window001".to_string(),
//!     translucent: true,
//! };
//!
//! let tree = keyvalues::to_tree("LightmappedGeneric", &material).unwrap();
//! assert_eq!(
//!     tree.to_string(),
//!     "\"$basetexture\" \"glass/window001\"\n\"$translucent\" \"1\"\n"
//! );
//! ```

use crate::node::format_float;
use crate::{Error, KeyValues, Result, Value};
use serde::ser::{self, Impossible, Serialize};

/// Serializes a value into a node payload.
///
/// Returns `None` for `Option::None`, which lets containers skip the entry.
pub struct NodeSerializer;

/// Collects sequence and tuple elements.
pub struct SerializeVec {
    children: Vec<KeyValues>,
    variant: Option<&'static str>,
}

/// Collects map entries and struct fields.
pub struct SerializeMap {
    children: Vec<KeyValues>,
    next_key: Option<String>,
    variant: Option<&'static str>,
}

fn leaf(text: String) -> Result<Option<Value>> {
    Ok(Some(Value::Leaf(text)))
}

/// Wraps `inner` in a container holding a single child named `variant`.
fn wrap_variant(variant: &'static str, inner: Value) -> Value {
    Value::Container(vec![KeyValues::with_value(variant, inner)])
}

impl ser::Serializer for NodeSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Option<Value>> {
        leaf(if v { "1" } else { "0" }.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<Option<Value>> {
        leaf(format_float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Option<Value>> {
        leaf(format_float(v))
    }

    fn serialize_char(self, v: char) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<Option<Value>> {
        leaf(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Option<Value>> {
        Err(Error::unsupported_type("byte arrays"))
    }

    fn serialize_none(self) -> Result<Option<Value>> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Option<Value>> {
        Ok(Some(Value::Empty))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Option<Value>> {
        Ok(Some(Value::Empty))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Option<Value>> {
        leaf(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        let inner = to_value(value)?.unwrap_or_default();
        Ok(Some(wrap_variant(variant, inner)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len.unwrap_or(0), None))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len, Some(variant)))
    }
}

impl SerializeVec {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            children: Vec::with_capacity(len),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let payload = to_value(value)?.unwrap_or_default();
        let name = self.children.len().to_string();
        self.children.push(KeyValues::with_value(name, payload));
        Ok(())
    }

    fn finish(self) -> Result<Option<Value>> {
        let container = Value::Container(self.children);
        Ok(Some(match self.variant {
            Some(variant) => wrap_variant(variant, container),
            None => container,
        }))
    }
}

impl SerializeMap {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        SerializeMap {
            children: Vec::with_capacity(len),
            next_key: None,
            variant,
        }
    }

    fn insert<T: ?Sized + Serialize>(&mut self, name: String, value: &T) -> Result<()> {
        if let Some(payload) = to_value(value)? {
            self.children.push(KeyValues::with_value(name, payload));
        }
        Ok(())
    }

    fn finish(self) -> Result<Option<Value>> {
        let container = Value::Container(self.children);
        Ok(Some(match self.variant {
            Some(variant) => wrap_variant(variant, container),
            None => container,
        }))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

/// Turns map keys into key names. Only scalars can name a key.
struct KeySerializer;

macro_rules! key_to_string {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<String> {
                Ok(v.to_string())
            }
        )*
    };
}

fn key_must_be_scalar() -> Error {
    Error::unsupported_type("map keys must be strings or scalars")
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    key_to_string! {
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_char: char,
        serialize_str: &str,
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(format_float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(format_float(v))
    }

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(if v { "1" } else { "0" }.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_some<T>(self, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_scalar())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_scalar())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_scalar())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_scalar())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_scalar())
    }
}

/// Serializes `value` into a node payload; `None` means "omit this entry".
pub(crate) fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Option<Value>> {
    value.serialize(NodeSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeExt;
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn tree<T: Serialize>(value: &T) -> KeyValues {
        KeyValues::with_value("root", to_value(value).unwrap().unwrap_or_default())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(to_value(&true).unwrap(), Some(Value::Leaf("1".into())));
        assert_eq!(to_value(&false).unwrap(), Some(Value::Leaf("0".into())));
        assert_eq!(to_value(&-42i32).unwrap(), Some(Value::Leaf("-42".into())));
        assert_eq!(
            to_value(&u64::MAX).unwrap(),
            Some(Value::Leaf("18446744073709551615".into()))
        );
        assert_eq!(to_value(&1.5f64).unwrap(), Some(Value::Leaf("1.5".into())));
        assert_eq!(to_value(&1e300f64).unwrap(), Some(Value::Leaf("1e+300".into())));
        assert_eq!(to_value(&1e-7f32).unwrap(), Some(Value::Leaf("1e-07".into())));
        assert_eq!(to_value(&'x').unwrap(), Some(Value::Leaf("x".into())));
        assert_eq!(to_value(&()).unwrap(), Some(Value::Empty));
        assert_eq!(to_value(&None::<i32>).unwrap(), None);
        assert_eq!(to_value(&Some(7u8)).unwrap(), Some(Value::Leaf("7".into())));
    }

    #[test]
    fn test_struct_skips_none_fields() {
        #[derive(Serialize)]
        struct Entity {
            classname: String,
            targetname: Option<String>,
            spawnflags: u32,
        }

        let kv = tree(&Entity {
            classname: "light".to_string(),
            targetname: None,
            spawnflags: 0,
        });
        let names: Vec<&str> = kv.children().map(|c| c.name()).collect();
        assert_eq!(names, vec!["classname", "spawnflags"]);
    }

    #[test]
    fn test_sequence_children_are_indexed() {
        let kv = tree(&vec![Some("a"), None, Some("c")]);
        let pairs: Vec<(&str, &str)> = kv.children().map(|c| (c.name(), c.as_str("?"))).collect();
        assert_eq!(pairs, vec![("0", "a"), ("1", ""), ("2", "c")]);
        assert_eq!(kv.sub_key("1").unwrap().value(), &Value::Empty);
    }

    #[test]
    fn test_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(2u32, "two");
        map.insert(10u32, "ten");
        let kv = tree(&map);
        assert_eq!(kv.sub_key("2").as_str(""), "two");
        assert_eq!(kv.sub_key("10").as_str(""), "ten");
    }

    #[test]
    fn test_compound_map_key_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1u8);
        let err = to_value(&map).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
    }

    #[test]
    fn test_bytes_are_rejected() {
        struct Blob;

        impl Serialize for Blob {
            fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_bytes(&[1, 2, 3])
            }
        }

        assert!(matches!(to_value(&Blob), Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn test_enum_variants() {
        #[derive(Serialize)]
        enum Shape {
            Point,
            Circle(f64),
            Line(i32, i32),
            Box { w: u32, h: u32 },
        }

        assert_eq!(to_value(&Shape::Point).unwrap(), Some(Value::Leaf("Point".into())));

        let circle = tree(&Shape::Circle(2.5));
        assert_eq!(circle.sub_key("Circle").as_float(0.0), 2.5);

        let line = tree(&Shape::Line(1, -1));
        let line = line.sub_key("Line");
        assert_eq!(line.sub_key("0").as_int(0), 1);
        assert_eq!(line.sub_key("1").as_int(0), -1);

        let boxed = tree(&Shape::Box { w: 3, h: 4 });
        assert_eq!(boxed.sub_key("box").sub_key("H").as_int(0), 4);
    }
}
