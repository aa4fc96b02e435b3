//! Errors that can occur during graph operations

use super::types::GraphElementType;
use std::fmt;
use thiserror::Error;

/// Two live elements of the same type share a primary key.
///
/// Carries both element ids and a dump of the clashing key values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKeyError {
    pub element_type: GraphElementType,
    pub existing_element: u32,
    pub new_element: u32,
    pub message: String,
}

impl fmt::Display for DuplicateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DuplicateKeyError {}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} does not exist")]
    VertexNotFound(u32),

    #[error("Transaction {0} does not exist")]
    TransactionNotFound(u32),

    #[error("Attribute {0} does not exist")]
    AttributeNotFound(u32),

    #[error("{element_type} {id} does not exist")]
    ElementNotFound {
        element_type: GraphElementType,
        id: u32,
    },

    #[error("Vertex {0} already exists")]
    DuplicateVertexId(u32),

    #[error("Transaction {0} already exists")]
    DuplicateTransactionId(u32),

    #[error("Unknown attribute type: {0}")]
    UnknownAttributeType(String),

    #[error("Unknown attribute merger: {0}")]
    UnknownAttributeMerger(String),

    #[error("Attribute {label} already exists on {element_type} with a different type")]
    DuplicateAttributeLabel {
        element_type: GraphElementType,
        label: String,
    },

    #[error("Attribute {0} already exists")]
    DuplicateAttributeId(u32),

    #[error("Attribute {0} is part of a primary key")]
    AttributeIsPrimaryKey(u32),

    #[error("Key attribute {attribute} has the wrong element type, expected {expected}")]
    KeyElementTypeMismatch {
        attribute: u32,
        expected: GraphElementType,
    },

    #[error("Cannot convert {attribute_type} value to {requested}")]
    UnsupportedConversion {
        attribute_type: String,
        requested: String,
    },

    #[error("Invalid {attribute_type} value '{value}': {reason}")]
    InvalidStringValue {
        attribute_type: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    DuplicateKey(#[from] DuplicateKeyError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
