//! Native value representations
//!
//! Every attribute description stores its values in one of nine native
//! representations. The store uses this module to copy, compare and log
//! values without knowing what an attribute means.

use super::attribute::AttributeDescription;
use super::edit::GraphEdit;
use super::error::{GraphError, GraphResult};
use super::value::AttributeValue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeAttributeType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Char,
    Object,
}

impl fmt::Display for NativeAttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NativeAttributeType::Byte => "BYTE",
            NativeAttributeType::Short => "SHORT",
            NativeAttributeType::Int => "INT",
            NativeAttributeType::Long => "LONG",
            NativeAttributeType::Float => "FLOAT",
            NativeAttributeType::Double => "DOUBLE",
            NativeAttributeType::Boolean => "BOOLEAN",
            NativeAttributeType::Char => "CHAR",
            NativeAttributeType::Object => "OBJECT",
        };
        write!(f, "{}", name)
    }
}

/// A single value in its native representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NativeValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Char(char),
    Object(AttributeValue),
}

impl NativeValue {
    pub fn native_type(&self) -> NativeAttributeType {
        match self {
            NativeValue::Byte(_) => NativeAttributeType::Byte,
            NativeValue::Short(_) => NativeAttributeType::Short,
            NativeValue::Int(_) => NativeAttributeType::Int,
            NativeValue::Long(_) => NativeAttributeType::Long,
            NativeValue::Float(_) => NativeAttributeType::Float,
            NativeValue::Double(_) => NativeAttributeType::Double,
            NativeValue::Boolean(_) => NativeAttributeType::Boolean,
            NativeValue::Char(_) => NativeAttributeType::Char,
            NativeValue::Object(_) => NativeAttributeType::Object,
        }
    }

    /// Integral view of a primitive. OBJECT values have none.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NativeValue::Byte(v) => Some(*v as i64),
            NativeValue::Short(v) => Some(*v as i64),
            NativeValue::Int(v) => Some(*v as i64),
            NativeValue::Long(v) => Some(*v),
            NativeValue::Float(v) => Some(*v as i64),
            NativeValue::Double(v) => Some(*v as i64),
            NativeValue::Boolean(b) => Some(*b as i64),
            NativeValue::Char(c) => Some(*c as i64),
            NativeValue::Object(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NativeValue::Float(v) => Some(*v as f64),
            NativeValue::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn into_object(self) -> AttributeValue {
        match self {
            NativeValue::Byte(v) => AttributeValue::Byte(v),
            NativeValue::Short(v) => AttributeValue::Short(v),
            NativeValue::Int(v) => AttributeValue::Int(v),
            NativeValue::Long(v) => AttributeValue::Long(v),
            NativeValue::Float(v) => AttributeValue::Float(v),
            NativeValue::Double(v) => AttributeValue::Double(v),
            NativeValue::Boolean(v) => AttributeValue::Boolean(v),
            NativeValue::Char(v) => AttributeValue::Char(v),
            NativeValue::Object(v) => v,
        }
    }
}

impl NativeAttributeType {
    /// Copies one element's value to another inside the same description.
    pub fn copy_attribute_value(
        self,
        description: &mut dyn AttributeDescription,
        source: u32,
        destination: u32,
    ) -> GraphResult<()> {
        let value = description.get_native(source);
        description.set_native(destination, value)
    }

    /// Compares two values of this representation. Floats compare by bit
    /// pattern so that an unchanged NaN is not reported as a change.
    pub fn equal_value(self, a: &NativeValue, b: &NativeValue) -> bool {
        match (a, b) {
            (NativeValue::Byte(x), NativeValue::Byte(y)) => x == y,
            (NativeValue::Short(x), NativeValue::Short(y)) => x == y,
            (NativeValue::Int(x), NativeValue::Int(y)) => x == y,
            (NativeValue::Long(x), NativeValue::Long(y)) => x == y,
            (NativeValue::Float(x), NativeValue::Float(y)) => x.to_bits() == y.to_bits(),
            (NativeValue::Double(x), NativeValue::Double(y)) => x.to_bits() == y.to_bits(),
            (NativeValue::Boolean(x), NativeValue::Boolean(y)) => x == y,
            (NativeValue::Char(x), NativeValue::Char(y)) => x == y,
            (NativeValue::Object(x), NativeValue::Object(y)) => {
                x.type_name() == y.type_name() && x == y
            }
            _ => false,
        }
    }

    /// Converts a boxed value into this representation.
    pub fn create(self, value: &AttributeValue) -> GraphResult<NativeValue> {
        let unsupported = || GraphError::UnsupportedConversion {
            attribute_type: value.type_name().to_string(),
            requested: self.to_string(),
        };
        // Integers out of range for the width are rejected, not wrapped.
        let integer = || value.as_i64().ok_or_else(unsupported);
        let native = match self {
            NativeAttributeType::Byte => {
                NativeValue::Byte(i8::try_from(integer()?).map_err(|_| unsupported())?)
            }
            NativeAttributeType::Short => {
                NativeValue::Short(i16::try_from(integer()?).map_err(|_| unsupported())?)
            }
            NativeAttributeType::Int => {
                NativeValue::Int(i32::try_from(integer()?).map_err(|_| unsupported())?)
            }
            NativeAttributeType::Long => NativeValue::Long(integer()?),
            NativeAttributeType::Float => {
                NativeValue::Float(value.as_f64().ok_or_else(unsupported)? as f32)
            }
            NativeAttributeType::Double => NativeValue::Double(value.as_f64().ok_or_else(unsupported)?),
            NativeAttributeType::Boolean => NativeValue::Boolean(value.as_bool().ok_or_else(unsupported)?),
            NativeAttributeType::Char => NativeValue::Char(value.as_char().ok_or_else(unsupported)?),
            NativeAttributeType::Object => NativeValue::Object(value.clone()),
        };
        Ok(native)
    }

    /// Reports a value change to the edit sink through the method matching
    /// this representation.
    pub fn add_edit(
        self,
        edit: &mut dyn GraphEdit,
        attribute: u32,
        id: u32,
        old: NativeValue,
        new: NativeValue,
    ) {
        match (old, new) {
            (NativeValue::Byte(o), NativeValue::Byte(n)) => edit.set_byte_value(attribute, id, o, n),
            (NativeValue::Short(o), NativeValue::Short(n)) => edit.set_short_value(attribute, id, o, n),
            (NativeValue::Int(o), NativeValue::Int(n)) => edit.set_int_value(attribute, id, o, n),
            (NativeValue::Long(o), NativeValue::Long(n)) => edit.set_long_value(attribute, id, o, n),
            (NativeValue::Float(o), NativeValue::Float(n)) => edit.set_float_value(attribute, id, o, n),
            (NativeValue::Double(o), NativeValue::Double(n)) => {
                edit.set_double_value(attribute, id, o, n)
            }
            (NativeValue::Boolean(o), NativeValue::Boolean(n)) => {
                edit.set_boolean_value(attribute, id, o, n)
            }
            (NativeValue::Char(o), NativeValue::Char(n)) => edit.set_char_value(attribute, id, o, n),
            (old, new) => edit.set_object_value(attribute, id, old.into_object(), new.into_object()),
        }
    }

    /// Logs the change only if the value actually moved. Returns whether it did.
    pub fn add_edit_if_changed(
        self,
        edit: &mut dyn GraphEdit,
        attribute: u32,
        id: u32,
        old: NativeValue,
        new: NativeValue,
    ) -> bool {
        if self.equal_value(&old, &new) {
            return false;
        }
        self.add_edit(edit, attribute, id, old, new);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edit::{EditLog, EditOperation};

    #[test]
    fn test_equal_value_uses_bits_for_floats() {
        let t = NativeAttributeType::Double;
        assert!(t.equal_value(&NativeValue::Double(f64::NAN), &NativeValue::Double(f64::NAN)));
        assert!(!t.equal_value(&NativeValue::Double(0.0), &NativeValue::Double(-0.0)));
        assert!(!t.equal_value(&NativeValue::Int(1), &NativeValue::Long(1)));
    }

    #[test]
    fn test_equal_value_objects() {
        let t = NativeAttributeType::Object;
        let a = NativeValue::Object(AttributeValue::from("x"));
        let b = NativeValue::Object(AttributeValue::from("x"));
        let c = NativeValue::Object(AttributeValue::Null);
        assert!(t.equal_value(&a, &b));
        assert!(!t.equal_value(&a, &c));
    }

    #[test]
    fn test_create() {
        let v = NativeAttributeType::Short.create(&AttributeValue::Int(12)).unwrap();
        assert!(matches!(v, NativeValue::Short(12)));
        let v = NativeAttributeType::Char.create(&AttributeValue::from("z")).unwrap();
        assert!(matches!(v, NativeValue::Char('z')));
        let err = NativeAttributeType::Int.create(&AttributeValue::from("twelve"));
        assert!(matches!(err, Err(GraphError::UnsupportedConversion { .. })));
    }

    #[test]
    fn test_create_rejects_out_of_range_integers() {
        let err = NativeAttributeType::Byte.create(&AttributeValue::Int(300));
        assert!(matches!(err, Err(GraphError::UnsupportedConversion { .. })));
        let err = NativeAttributeType::Short.create(&AttributeValue::Long(1 << 20));
        assert!(matches!(err, Err(GraphError::UnsupportedConversion { .. })));
        let err = NativeAttributeType::Int.create(&AttributeValue::Long(i64::MAX));
        assert!(matches!(err, Err(GraphError::UnsupportedConversion { .. })));

        let v = NativeAttributeType::Byte.create(&AttributeValue::Int(-128)).unwrap();
        assert!(matches!(v, NativeValue::Byte(-128)));
    }

    #[test]
    fn test_add_edit_if_changed() {
        let mut log = EditLog::new();
        let t = NativeAttributeType::Int;
        assert!(!t.add_edit_if_changed(&mut log, 0, 1, NativeValue::Int(3), NativeValue::Int(3)));
        assert!(log.is_empty());
        assert!(t.add_edit_if_changed(&mut log, 0, 1, NativeValue::Int(3), NativeValue::Int(4)));
        assert_eq!(log.len(), 1);
        assert!(matches!(
            log.operations()[0],
            EditOperation::SetValue { attribute: 0, id: 1, .. }
        ));
    }

    #[test]
    fn test_copy_attribute_value() {
        use crate::graph::attribute::number::IntegerAttributeDescription;

        let mut desc = IntegerAttributeDescription::default();
        desc.set_capacity(3);
        desc.set_int(0, 41).unwrap();
        NativeAttributeType::Int
            .copy_attribute_value(&mut desc, 0, 2)
            .unwrap();
        assert_eq!(desc.get_int(2).unwrap(), 41);
        assert_eq!(desc.get_int(1).unwrap(), 0);
    }

    #[test]
    fn test_into_object() {
        assert_eq!(NativeValue::Long(9).into_object(), AttributeValue::Long(9));
        assert_eq!(NativeValue::Char('c').native_type(), NativeAttributeType::Char);
        assert_eq!(NativeValue::Boolean(true).as_i64(), Some(1));
        assert_eq!(NativeValue::Object(AttributeValue::Null).as_f64(), None);
    }
}
