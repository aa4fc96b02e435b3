//! Attribute descriptions
//!
//! An attribute description owns the values of one attribute for every
//! element slot of its element type. The store never looks inside those
//! values; it goes through the native representation each description
//! declares (see [`crate::graph::native`]).

pub mod number;
pub mod primitive;
pub mod object;
pub mod registry;
pub mod string;

pub use number::{
    ByteAttributeDescription, DoubleAttributeDescription, FloatAttributeDescription,
    IntegerAttributeDescription, LongAttributeDescription, NumberAttributeDescription,
    ShortAttributeDescription,
};
pub use object::ObjectAttributeDescription;
pub use primitive::{BooleanAttributeDescription, CharAttributeDescription};
pub use registry::{AttributeFactory, AttributeRegistry};
pub use string::StringAttributeDescription;

use super::error::{GraphError, GraphResult};
use super::native::{NativeAttributeType, NativeValue};
use super::types::{GraphElementType, GraphIndexType};
use super::value::AttributeValue;
use crate::index::{self, GraphIndex};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Metadata for one attribute of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAttribute {
    pub id: u32,
    pub element_type: GraphElementType,
    pub attribute_type: String,
    pub name: String,
    pub description: String,
    pub default_value: AttributeValue,
    pub merger_id: Option<String>,
}

fn unsupported<D: AttributeDescription + ?Sized>(description: &D, requested: &str) -> GraphError {
    GraphError::UnsupportedConversion {
        attribute_type: description.name().to_string(),
        requested: requested.to_string(),
    }
}

/// Storage and conversion for the values of one attribute.
///
/// Implementations provide native access, string parsing, default handling
/// and capacity. The typed accessors route through the native value and
/// fail with `UnsupportedConversion` when the stored representation has no
/// sensible view of the requested type.
pub trait AttributeDescription: fmt::Debug + Send + Sync {
    /// Registry name of this attribute type.
    fn name(&self) -> &'static str;

    fn native_type(&self) -> NativeAttributeType;

    fn capacity(&self) -> usize;

    fn set_capacity(&mut self, capacity: usize);

    fn default_value(&self) -> AttributeValue;

    fn set_default_value(&mut self, value: &AttributeValue) -> GraphResult<()>;

    fn get_native(&self, id: u32) -> NativeValue;

    fn set_native(&mut self, id: u32, value: NativeValue) -> GraphResult<()>;

    /// Parses a string into this attribute's native representation.
    /// `None` stands for the default value.
    fn parse_string(&self, value: Option<&str>) -> GraphResult<NativeValue>;

    fn clear(&mut self, id: u32);

    fn is_clear(&self, id: u32) -> bool;

    fn boxed_clone(&self) -> Box<dyn AttributeDescription>;

    fn get_object(&self, id: u32) -> AttributeValue {
        self.get_native(id).into_object()
    }

    fn set_object(&mut self, id: u32, value: &AttributeValue) -> GraphResult<()> {
        if value.is_null() {
            self.clear(id);
            return Ok(());
        }
        let native = self.native_type().create(value)?;
        self.set_native(id, native)
    }

    /// Text form of the value. Feeding it back to `set_string` reproduces
    /// the value.
    fn get_string(&self, id: u32) -> Option<String> {
        match self.get_object(id) {
            AttributeValue::Null => None,
            value => Some(value.to_string()),
        }
    }

    fn set_string(&mut self, id: u32, value: Option<&str>) -> GraphResult<()> {
        let native = self.parse_string(value)?;
        self.set_native(id, native)
    }

    /// A message explaining why `value` would be rejected, or `None`.
    fn accepts_string(&self, value: Option<&str>) -> Option<String> {
        self.parse_string(value).err().map(|e| e.to_string())
    }

    fn get_byte(&self, id: u32) -> GraphResult<i8> {
        let value = self.get_long(id)?;
        i8::try_from(value).map_err(|_| unsupported(self, "byte"))
    }

    fn get_short(&self, id: u32) -> GraphResult<i16> {
        let value = self.get_long(id)?;
        i16::try_from(value).map_err(|_| unsupported(self, "short"))
    }

    fn get_int(&self, id: u32) -> GraphResult<i32> {
        let value = self.get_long(id)?;
        i32::try_from(value).map_err(|_| unsupported(self, "int"))
    }

    fn get_long(&self, id: u32) -> GraphResult<i64> {
        self.get_native(id)
            .as_i64()
            .ok_or_else(|| unsupported(self, "long"))
    }

    fn get_float(&self, id: u32) -> GraphResult<f32> {
        self.get_double(id).map(|v| v as f32)
    }

    fn get_double(&self, id: u32) -> GraphResult<f64> {
        self.get_native(id)
            .as_f64()
            .ok_or_else(|| unsupported(self, "double"))
    }

    fn get_boolean(&self, id: u32) -> GraphResult<bool> {
        match self.get_native(id) {
            NativeValue::Boolean(b) => Ok(b),
            NativeValue::Float(v) => Ok(v != 0.0),
            NativeValue::Double(v) => Ok(v != 0.0),
            other => other
                .as_i64()
                .map(|v| v != 0)
                .ok_or_else(|| unsupported(self, "boolean")),
        }
    }

    fn get_char(&self, id: u32) -> GraphResult<char> {
        match self.get_native(id) {
            NativeValue::Char(c) => Ok(c),
            other => other
                .as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .and_then(char::from_u32)
                .ok_or_else(|| unsupported(self, "char")),
        }
    }

    fn set_byte(&mut self, id: u32, value: i8) -> GraphResult<()> {
        self.set_native(id, NativeValue::Byte(value))
    }

    fn set_short(&mut self, id: u32, value: i16) -> GraphResult<()> {
        self.set_native(id, NativeValue::Short(value))
    }

    fn set_int(&mut self, id: u32, value: i32) -> GraphResult<()> {
        self.set_native(id, NativeValue::Int(value))
    }

    fn set_long(&mut self, id: u32, value: i64) -> GraphResult<()> {
        self.set_native(id, NativeValue::Long(value))
    }

    fn set_float(&mut self, id: u32, value: f32) -> GraphResult<()> {
        self.set_native(id, NativeValue::Float(value))
    }

    fn set_double(&mut self, id: u32, value: f64) -> GraphResult<()> {
        self.set_native(id, NativeValue::Double(value))
    }

    fn set_boolean(&mut self, id: u32, value: bool) -> GraphResult<()> {
        self.set_native(id, NativeValue::Boolean(value))
    }

    fn set_char(&mut self, id: u32, value: char) -> GraphResult<()> {
        self.set_native(id, NativeValue::Char(value))
    }

    /// Hash of the value held by `id`, consistent with `values_equal`.
    fn hash_value(&self, id: u32) -> u64 {
        let mut hasher = FxHasher::default();
        self.get_object(id).hash(&mut hasher);
        hasher.finish()
    }

    fn values_equal(&self, id1: u32, id2: u32) -> bool {
        self.native_type()
            .equal_value(&self.get_native(id1), &self.get_native(id2))
    }

    /// Copies of every slot, for whole-attribute snapshots.
    fn save_data(&self) -> Vec<AttributeValue> {
        (0..self.capacity() as u32).map(|id| self.get_object(id)).collect()
    }

    fn restore_data(&mut self, data: &[AttributeValue]) -> GraphResult<()> {
        if data.len() > self.capacity() {
            self.set_capacity(data.len());
        }
        for (id, value) in data.iter().enumerate() {
            self.set_object(id as u32, value)?;
        }
        Ok(())
    }

    fn supports_index_type(&self, _index_type: GraphIndexType) -> bool {
        true
    }

    fn create_index(&self, index_type: GraphIndexType) -> Box<dyn GraphIndex> {
        index::create_index(index_type, self.capacity())
    }
}

impl Clone for Box<dyn AttributeDescription> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

pub(crate) fn invalid_string<D: AttributeDescription + ?Sized>(
    description: &D,
    value: &str,
    reason: impl fmt::Display,
) -> GraphError {
    GraphError::InvalidStringValue {
        attribute_type: description.name().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn unsupported_native<D: AttributeDescription + ?Sized>(
    description: &D,
    value: &NativeValue,
) -> GraphError {
    GraphError::UnsupportedConversion {
        attribute_type: value.native_type().to_string(),
        requested: description.name().to_string(),
    }
}
