//! Boolean and character attribute descriptions

use super::{invalid_string, unsupported_native, AttributeDescription};
use crate::graph::error::GraphResult;
use crate::graph::native::{NativeAttributeType, NativeValue};
use crate::graph::types::GraphIndexType;
use crate::graph::value::AttributeValue;

#[derive(Debug, Clone, Default)]
pub struct BooleanAttributeDescription {
    data: Vec<bool>,
    default: bool,
}

impl AttributeDescription for BooleanAttributeDescription {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn native_type(&self) -> NativeAttributeType {
        NativeAttributeType::Boolean
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.data.resize(capacity, self.default);
    }

    fn default_value(&self) -> AttributeValue {
        AttributeValue::Boolean(self.default)
    }

    fn set_default_value(&mut self, value: &AttributeValue) -> GraphResult<()> {
        self.default = match value {
            AttributeValue::Null => false,
            other => other
                .as_bool()
                .ok_or_else(|| unsupported_native(self, &NativeValue::Object(other.clone())))?,
        };
        Ok(())
    }

    fn get_native(&self, id: u32) -> NativeValue {
        NativeValue::Boolean(self.data[id as usize])
    }

    fn set_native(&mut self, id: u32, value: NativeValue) -> GraphResult<()> {
        let converted = match &value {
            NativeValue::Boolean(b) => Some(*b),
            NativeValue::Float(v) => Some(*v != 0.0),
            NativeValue::Double(v) => Some(*v != 0.0),
            NativeValue::Object(AttributeValue::Null) => Some(self.default),
            NativeValue::Object(object) => object.as_bool(),
            other => other.as_i64().map(|v| v != 0),
        };
        let converted = converted.ok_or_else(|| unsupported_native(self, &value))?;
        self.data[id as usize] = converted;
        Ok(())
    }

    fn parse_string(&self, value: Option<&str>) -> GraphResult<NativeValue> {
        match value {
            None => Ok(NativeValue::Boolean(self.default)),
            Some(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(NativeValue::Boolean(true)),
                "false" => Ok(NativeValue::Boolean(false)),
                _ => Err(invalid_string(self, text, "expected true or false")),
            },
        }
    }

    fn get_string(&self, id: u32) -> Option<String> {
        Some(self.data[id as usize].to_string())
    }

    fn clear(&mut self, id: u32) {
        self.data[id as usize] = self.default;
    }

    fn is_clear(&self, id: u32) -> bool {
        self.data[id as usize] == self.default
    }

    fn boxed_clone(&self) -> Box<dyn AttributeDescription> {
        Box::new(self.clone())
    }

    fn hash_value(&self, id: u32) -> u64 {
        self.data[id as usize] as u64
    }

    fn values_equal(&self, id1: u32, id2: u32) -> bool {
        self.data[id1 as usize] == self.data[id2 as usize]
    }

    fn supports_index_type(&self, index_type: GraphIndexType) -> bool {
        index_type != GraphIndexType::Ordered
    }
}

#[derive(Debug, Clone)]
pub struct CharAttributeDescription {
    data: Vec<char>,
    default: char,
}

impl Default for CharAttributeDescription {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            default: '\0',
        }
    }
}

impl AttributeDescription for CharAttributeDescription {
    fn name(&self) -> &'static str {
        "char"
    }

    fn native_type(&self) -> NativeAttributeType {
        NativeAttributeType::Char
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.data.resize(capacity, self.default);
    }

    fn default_value(&self) -> AttributeValue {
        AttributeValue::Char(self.default)
    }

    fn set_default_value(&mut self, value: &AttributeValue) -> GraphResult<()> {
        self.default = match value {
            AttributeValue::Null => '\0',
            other => other
                .as_char()
                .ok_or_else(|| unsupported_native(self, &NativeValue::Object(other.clone())))?,
        };
        Ok(())
    }

    fn get_native(&self, id: u32) -> NativeValue {
        NativeValue::Char(self.data[id as usize])
    }

    fn set_native(&mut self, id: u32, value: NativeValue) -> GraphResult<()> {
        let converted = match &value {
            NativeValue::Char(c) => Some(*c),
            NativeValue::Object(AttributeValue::Null) => Some(self.default),
            NativeValue::Object(object) => object.as_char(),
            other => other
                .as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .and_then(char::from_u32),
        };
        let converted = converted.ok_or_else(|| unsupported_native(self, &value))?;
        self.data[id as usize] = converted;
        Ok(())
    }

    fn parse_string(&self, value: Option<&str>) -> GraphResult<NativeValue> {
        let Some(text) = value else {
            return Ok(NativeValue::Char(self.default));
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(NativeValue::Char(c)),
            _ => Err(invalid_string(self, text, "expected a single character")),
        }
    }

    fn get_string(&self, id: u32) -> Option<String> {
        Some(self.data[id as usize].to_string())
    }

    fn clear(&mut self, id: u32) {
        self.data[id as usize] = self.default;
    }

    fn is_clear(&self, id: u32) -> bool {
        self.data[id as usize] == self.default
    }

    fn boxed_clone(&self) -> Box<dyn AttributeDescription> {
        Box::new(self.clone())
    }

    fn hash_value(&self, id: u32) -> u64 {
        self.data[id as usize] as u64
    }

    fn values_equal(&self, id1: u32, id2: u32) -> bool {
        self.data[id1 as usize] == self.data[id2 as usize]
    }
}
