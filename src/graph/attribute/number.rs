//! Numeric attribute descriptions, one generic implementation per width

use super::{invalid_string, unsupported_native, AttributeDescription};
use crate::graph::error::GraphResult;
use crate::graph::native::{NativeAttributeType, NativeValue};
use crate::graph::value::AttributeValue;
use std::fmt;
use std::str::FromStr;

/// A primitive number type an attribute can store natively.
pub trait NumericValue:
    Copy + Default + fmt::Debug + fmt::Display + FromStr + Send + Sync + 'static
{
    const NATIVE: NativeAttributeType;
    const NAME: &'static str;

    fn from_native(value: &NativeValue) -> Option<Self>;
    fn from_value(value: &AttributeValue) -> Option<Self>;
    fn to_native(self) -> NativeValue;
    /// Bit pattern used for hashing and equality.
    fn bits(self) -> u64;
}

macro_rules! integer_value {
    ($t:ty, $native:ident, $name:literal) => {
        impl NumericValue for $t {
            const NATIVE: NativeAttributeType = NativeAttributeType::$native;
            const NAME: &'static str = $name;

            fn from_native(value: &NativeValue) -> Option<Self> {
                value.as_i64().and_then(|v| <$t>::try_from(v).ok())
            }

            fn from_value(value: &AttributeValue) -> Option<Self> {
                value.as_i64().and_then(|v| <$t>::try_from(v).ok())
            }

            fn to_native(self) -> NativeValue {
                NativeValue::$native(self)
            }

            fn bits(self) -> u64 {
                self as i64 as u64
            }
        }
    };
}

macro_rules! float_value {
    ($t:ty, $native:ident, $name:literal) => {
        impl NumericValue for $t {
            const NATIVE: NativeAttributeType = NativeAttributeType::$native;
            const NAME: &'static str = $name;

            fn from_native(value: &NativeValue) -> Option<Self> {
                value.as_f64().map(|v| v as $t)
            }

            fn from_value(value: &AttributeValue) -> Option<Self> {
                value.as_f64().map(|v| v as $t)
            }

            fn to_native(self) -> NativeValue {
                NativeValue::$native(self)
            }

            fn bits(self) -> u64 {
                self.to_bits() as u64
            }
        }
    };
}

integer_value!(i8, Byte, "byte");
integer_value!(i16, Short, "short");
integer_value!(i32, Int, "integer");
integer_value!(i64, Long, "long");
float_value!(f32, Float, "float");
float_value!(f64, Double, "double");

#[derive(Debug, Clone)]
pub struct NumberAttributeDescription<T: NumericValue> {
    data: Vec<T>,
    default: T,
}

pub type ByteAttributeDescription = NumberAttributeDescription<i8>;
pub type ShortAttributeDescription = NumberAttributeDescription<i16>;
pub type IntegerAttributeDescription = NumberAttributeDescription<i32>;
pub type LongAttributeDescription = NumberAttributeDescription<i64>;
pub type FloatAttributeDescription = NumberAttributeDescription<f32>;
pub type DoubleAttributeDescription = NumberAttributeDescription<f64>;

impl<T: NumericValue> Default for NumberAttributeDescription<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            default: T::default(),
        }
    }
}

impl<T: NumericValue> AttributeDescription for NumberAttributeDescription<T>
where
    <T as FromStr>::Err: fmt::Display,
{
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn native_type(&self) -> NativeAttributeType {
        T::NATIVE
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.data.resize(capacity, self.default);
    }

    fn default_value(&self) -> AttributeValue {
        self.default.to_native().into_object()
    }

    fn set_default_value(&mut self, value: &AttributeValue) -> GraphResult<()> {
        self.default = if value.is_null() {
            T::default()
        } else {
            match T::from_value(value) {
                Some(v) => v,
                None => return Err(unsupported_native(self, &NativeValue::Object(value.clone()))),
            }
        };
        Ok(())
    }

    fn get_native(&self, id: u32) -> NativeValue {
        self.data[id as usize].to_native()
    }

    fn set_native(&mut self, id: u32, value: NativeValue) -> GraphResult<()> {
        let converted = match &value {
            NativeValue::Object(AttributeValue::Null) => Some(self.default),
            NativeValue::Object(object) => T::from_value(object),
            primitive => T::from_native(primitive),
        };
        match converted {
            Some(v) => {
                self.data[id as usize] = v;
                Ok(())
            }
            None => Err(unsupported_native(self, &value)),
        }
    }

    fn parse_string(&self, value: Option<&str>) -> GraphResult<NativeValue> {
        match value {
            None => Ok(self.default.to_native()),
            Some(text) => text
                .trim()
                .parse::<T>()
                .map(T::to_native)
                .map_err(|e| invalid_string(self, text, e)),
        }
    }

    fn get_string(&self, id: u32) -> Option<String> {
        Some(self.data[id as usize].to_string())
    }

    fn clear(&mut self, id: u32) {
        self.data[id as usize] = self.default;
    }

    fn is_clear(&self, id: u32) -> bool {
        self.data[id as usize].bits() == self.default.bits()
    }

    fn boxed_clone(&self) -> Box<dyn AttributeDescription> {
        Box::new(self.clone())
    }

    fn hash_value(&self, id: u32) -> u64 {
        self.data[id as usize].bits()
    }

    fn values_equal(&self, id1: u32, id2: u32) -> bool {
        self.data[id1 as usize].bits() == self.data[id2 as usize].bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::error::GraphError;

    #[test]
    fn test_capacity_fills_with_default() {
        let mut desc = IntegerAttributeDescription::default();
        desc.set_default_value(&AttributeValue::Int(7)).unwrap();
        desc.set_capacity(4);
        assert_eq!(desc.get_int(3).unwrap(), 7);
        assert!(desc.is_clear(3));
    }

    #[test]
    fn test_cross_width_setters() {
        let mut desc = ShortAttributeDescription::default();
        desc.set_capacity(1);
        desc.set_int(0, 1234).unwrap();
        assert_eq!(desc.get_short(0).unwrap(), 1234);
        desc.set_double(0, 9.75).unwrap();
        assert_eq!(desc.get_long(0).unwrap(), 9);
        desc.set_boolean(0, true).unwrap();
        assert_eq!(desc.get_short(0).unwrap(), 1);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let mut desc = ByteAttributeDescription::default();
        desc.set_capacity(1);
        desc.set_byte(0, 5).unwrap();
        assert!(matches!(
            desc.set_int(0, 300),
            Err(GraphError::UnsupportedConversion { .. })
        ));
        assert!(matches!(
            desc.set_object(0, &AttributeValue::Long(-129)),
            Err(GraphError::UnsupportedConversion { .. })
        ));
        assert!(desc.set_default_value(&AttributeValue::Int(1000)).is_err());
        assert_eq!(desc.get_byte(0).unwrap(), 5);

        let mut wide = LongAttributeDescription::default();
        wide.set_capacity(1);
        wide.set_long(0, 70_000).unwrap();
        assert!(matches!(
            wide.get_short(0),
            Err(GraphError::UnsupportedConversion { .. })
        ));
        assert_eq!(wide.get_int(0).unwrap(), 70_000);
    }

    #[test]
    fn test_parse_errors() {
        let desc = ByteAttributeDescription::default();
        let err = desc.parse_string(Some("300")).unwrap_err();
        assert!(matches!(err, GraphError::InvalidStringValue { .. }));
    }

    #[test]
    fn test_float_equality_by_bits() {
        let mut desc = FloatAttributeDescription::default();
        desc.set_capacity(2);
        desc.set_float(0, f32::NAN).unwrap();
        desc.set_float(1, f32::NAN).unwrap();
        assert!(desc.values_equal(0, 1));
        assert_eq!(desc.hash_value(0), desc.hash_value(1));
    }

    #[test]
    fn test_object_setter_parses_strings() {
        let mut desc = LongAttributeDescription::default();
        desc.set_capacity(1);
        desc.set_object(0, &AttributeValue::from("42")).unwrap();
        assert_eq!(desc.get_long(0).unwrap(), 42);
        assert_eq!(desc.get_object(0), AttributeValue::Long(42));
    }
}
