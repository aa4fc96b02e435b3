//! String attribute description, stored natively as OBJECT

use super::{unsupported_native, AttributeDescription};
use crate::graph::error::GraphResult;
use crate::graph::native::{NativeAttributeType, NativeValue};
use crate::graph::value::AttributeValue;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Default)]
pub struct StringAttributeDescription {
    data: Vec<Option<String>>,
    default: Option<String>,
}

fn to_object(value: &Option<String>) -> AttributeValue {
    match value {
        Some(s) => AttributeValue::String(s.clone()),
        None => AttributeValue::Null,
    }
}

impl AttributeDescription for StringAttributeDescription {
    fn name(&self) -> &'static str {
        "string"
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
        to_object(&self.default)
    }

    fn set_default_value(&mut self, value: &AttributeValue) -> GraphResult<()> {
        self.default = match value {
            AttributeValue::Null => None,
            other => Some(other.to_string()),
        };
        Ok(())
    }

    fn get_native(&self, id: u32) -> NativeValue {
        NativeValue::Object(to_object(&self.data[id as usize]))
    }

    fn set_native(&mut self, id: u32, value: NativeValue) -> GraphResult<()> {
        if matches!(value, NativeValue::Object(AttributeValue::Array(_))) {
            return Err(unsupported_native(self, &value));
        }
        let converted = match value {
            NativeValue::Object(AttributeValue::Null) => None,
            NativeValue::Object(AttributeValue::String(s)) => Some(s),
            other => Some(other.into_object().to_string()),
        };
        self.data[id as usize] = converted;
        Ok(())
    }

    fn parse_string(&self, value: Option<&str>) -> GraphResult<NativeValue> {
        Ok(NativeValue::Object(AttributeValue::from(value)))
    }

    fn get_string(&self, id: u32) -> Option<String> {
        self.data[id as usize].clone()
    }

    fn set_string(&mut self, id: u32, value: Option<&str>) -> GraphResult<()> {
        self.data[id as usize] = value.map(str::to_string);
        Ok(())
    }

    fn clear(&mut self, id: u32) {
        self.data[id as usize] = self.default.clone();
    }

    fn is_clear(&self, id: u32) -> bool {
        self.data[id as usize] == self.default
    }

    fn boxed_clone(&self) -> Box<dyn AttributeDescription> {
        Box::new(self.clone())
    }

    fn hash_value(&self, id: u32) -> u64 {
        let mut hasher = FxHasher::default();
        self.data[id as usize].hash(&mut hasher);
        hasher.finish()
    }

    fn values_equal(&self, id1: u32, id2: u32) -> bool {
        self.data[id1 as usize] == self.data[id2 as usize]
    }
}
