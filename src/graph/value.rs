//! Owned attribute values
//!
//! `AttributeValue` is the boxed form of any attribute value. It carries the
//! default value of every attribute, the payload of OBJECT-backed attributes,
//! the keys of attribute indices and the generic get/set surface.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Attribute value type supporting the native primitives plus strings and arrays
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum AttributeValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(#[serde(with = "float_text::single")] f32),
    Double(#[serde(with = "float_text::double")] f64),
    Boolean(bool),
    Char(char),
    String(String),
    Array(Vec<AttributeValue>),
    #[default]
    Null,
}

impl AttributeValue {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral view of the value. Floats truncate, booleans map to 0/1,
    /// chars to their code point and strings are parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Byte(v) => Some(*v as i64),
            AttributeValue::Short(v) => Some(*v as i64),
            AttributeValue::Int(v) => Some(*v as i64),
            AttributeValue::Long(v) => Some(*v),
            AttributeValue::Float(v) if v.is_finite() => Some(*v as i64),
            AttributeValue::Double(v) if v.is_finite() => Some(*v as i64),
            AttributeValue::Boolean(b) => Some(*b as i64),
            AttributeValue::Char(c) => Some(*c as i64),
            AttributeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(v) => Some(*v as f64),
            AttributeValue::Double(v) => Some(*v),
            AttributeValue::String(s) => s.trim().parse().ok(),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            AttributeValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            AttributeValue::Null | AttributeValue::Array(_) | AttributeValue::Char(_) => None,
            other => other.as_i64().map(|v| v != 0),
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            AttributeValue::Char(c) => Some(*c),
            AttributeValue::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            other => other
                .as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .and_then(char::from_u32),
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Byte(_) => "Byte",
            AttributeValue::Short(_) => "Short",
            AttributeValue::Int(_) => "Int",
            AttributeValue::Long(_) => "Long",
            AttributeValue::Float(_) => "Float",
            AttributeValue::Double(_) => "Double",
            AttributeValue::Boolean(_) => "Boolean",
            AttributeValue::Char(_) => "Char",
            AttributeValue::String(_) => "String",
            AttributeValue::Array(_) => "Array",
            AttributeValue::Null => "Null",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            AttributeValue::Null => 0,
            AttributeValue::Boolean(_) => 1,
            AttributeValue::Byte(_)
            | AttributeValue::Short(_)
            | AttributeValue::Int(_)
            | AttributeValue::Long(_) => 2,
            AttributeValue::Float(_) | AttributeValue::Double(_) => 3,
            AttributeValue::Char(_) => 4,
            AttributeValue::String(_) => 5,
            AttributeValue::Array(_) => 6,
        }
    }
}

// Integers of different widths compare by value, as do the two float widths.
// Floats use the IEEE total order so that NaN can key an index.
impl Ord for AttributeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use AttributeValue::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Char(a), Char(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Array(a), Array(b)) => a.cmp(b),
            (Null, Null) => Ordering::Equal,
            _ => match self.rank().cmp(&other.rank()) {
                Ordering::Equal if self.rank() == 2 => {
                    self.as_i64().unwrap_or(0).cmp(&other.as_i64().unwrap_or(0))
                }
                Ordering::Equal => {
                    let a = self.as_f64().unwrap_or(0.0);
                    let b = other.as_f64().unwrap_or(0.0);
                    a.total_cmp(&b)
                }
                unequal => unequal,
            },
        }
    }
}

impl PartialOrd for AttributeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AttributeValue {}

impl Hash for AttributeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            AttributeValue::Byte(_)
            | AttributeValue::Short(_)
            | AttributeValue::Int(_)
            | AttributeValue::Long(_) => self.as_i64().unwrap_or(0).hash(state),
            AttributeValue::Float(_) | AttributeValue::Double(_) => {
                self.as_f64().unwrap_or(0.0).to_bits().hash(state)
            }
            AttributeValue::Boolean(b) => b.hash(state),
            AttributeValue::Char(c) => c.hash(state),
            AttributeValue::String(s) => s.hash(state),
            AttributeValue::Array(a) => a.hash(state),
            AttributeValue::Null => {}
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Byte(v) => write!(f, "{}", v),
            AttributeValue::Short(v) => write!(f, "{}", v),
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Long(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Double(v) => write!(f, "{}", v),
            AttributeValue::Boolean(b) => write!(f, "{}", b),
            AttributeValue::Char(c) => write!(f, "{}", c),
            AttributeValue::String(s) => write!(f, "{}", s),
            AttributeValue::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            AttributeValue::Null => write!(f, "null"),
        }
    }
}

// Convenience conversions
impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<Option<&str>> for AttributeValue {
    fn from(s: Option<&str>) -> Self {
        s.map_or(AttributeValue::Null, AttributeValue::from)
    }
}

impl From<i8> for AttributeValue {
    fn from(v: i8) -> Self {
        AttributeValue::Byte(v)
    }
}

impl From<i16> for AttributeValue {
    fn from(v: i16) -> Self {
        AttributeValue::Short(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Long(v)
    }
}

impl From<f32> for AttributeValue {
    fn from(v: f32) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Double(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl From<char> for AttributeValue {
    fn from(c: char) -> Self {
        AttributeValue::Char(c)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(arr: Vec<AttributeValue>) -> Self {
        AttributeValue::Array(arr)
    }
}

/// Serde form of floats that also carries NaN and the infinities, which
/// JSON numbers cannot. Those are written as the tokens `"NaN"`,
/// `"Infinity"` and `"-Infinity"`; finite values stay numbers.
mod float_text {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Number(f64),
        Token(String),
    }

    fn token(value: f64) -> Option<&'static str> {
        if value.is_nan() {
            Some("NaN")
        } else if value == f64::INFINITY {
            Some("Infinity")
        } else if value == f64::NEG_INFINITY {
            Some("-Infinity")
        } else {
            None
        }
    }

    fn parse<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Text::deserialize(deserializer)? {
            Text::Number(value) => Ok(value),
            Text::Token(token) => match token.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid float token: {}", other))),
            },
        }
    }

    pub mod single {
        use super::{parse, token};
        use serde::{Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
            match token(f64::from(*value)) {
                Some(token) => serializer.serialize_str(token),
                None => serializer.serialize_f32(*value),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
            parse(deserializer).map(|value| value as f32)
        }
    }

    pub mod double {
        use super::{parse, token};
        use serde::{Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
            match token(*value) {
                Some(token) => serializer.serialize_str(token),
                None => serializer.serialize_f64(*value),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            parse(deserializer)
        }
    }
}
