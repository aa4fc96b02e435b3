//! Attribute description holding arbitrary owned values
//!
//! The text form is the JSON encoding of the value, which keeps the variant
//! so that a string round trip reproduces the same value.

use super::{invalid_string, AttributeDescription};
use crate::graph::error::GraphResult;
use crate::graph::native::{NativeAttributeType, NativeValue};
use crate::graph::types::GraphIndexType;
use crate::graph::value::AttributeValue;

#[derive(Debug, Clone, Default)]
pub struct ObjectAttributeDescription {
    data: Vec<AttributeValue>,
    default: AttributeValue,
}

impl AttributeDescription for ObjectAttributeDescription {
    fn name(&self) -> &'static str {
        "object"
    }

    fn native_type(&self) -> NativeAttributeType {
        NativeAttributeType::Object
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.data.resize(capacity, self.default.clone());
    }

    fn default_value(&self) -> AttributeValue {
        self.default.clone()
    }

    fn set_default_value(&mut self, value: &AttributeValue) -> GraphResult<()> {
        self.default = value.clone();
        Ok(())
    }

    fn get_native(&self, id: u32) -> NativeValue {
        NativeValue::Object(self.data[id as usize].clone())
    }

    fn set_native(&mut self, id: u32, value: NativeValue) -> GraphResult<()> {
        self.data[id as usize] = value.into_object();
        Ok(())
    }

    fn set_object(&mut self, id: u32, value: &AttributeValue) -> GraphResult<()> {
        self.data[id as usize] = value.clone();
        Ok(())
    }

    fn get_object(&self, id: u32) -> AttributeValue {
        self.data[id as usize].clone()
    }

    fn parse_string(&self, value: Option<&str>) -> GraphResult<NativeValue> {
        match value {
            None => Ok(NativeValue::Object(AttributeValue::Null)),
            Some(text) => serde_json::from_str::<AttributeValue>(text)
                .map(NativeValue::Object)
                .map_err(|e| invalid_string(self, text, e)),
        }
    }

    fn get_string(&self, id: u32) -> Option<String> {
        match &self.data[id as usize] {
            AttributeValue::Null => None,
            value => serde_json::to_string(value).ok(),
        }
    }

    fn clear(&mut self, id: u32) {
        self.data[id as usize] = self.default.clone();
    }

    fn is_clear(&self, id: u32) -> bool {
        let value = &self.data[id as usize];
        value.type_name() == self.default.type_name() && *value == self.default
    }

    fn boxed_clone(&self) -> Box<dyn AttributeDescription> {
        Box::new(self.clone())
    }

    fn supports_index_type(&self, index_type: GraphIndexType) -> bool {
        index_type != GraphIndexType::Ordered
    }
}
