//! Core graph storage
//!
//! This module implements the array-backed property graph:
//! - Vertices and transactions with stable ids over a packed layout
//! - Links and edges maintained automatically from transactions
//! - Typed attributes with pluggable descriptions and value indices
//! - Primary keys validated on demand, with merging of clashes
//! - Change reporting for undo and redo

pub mod attribute;
pub mod edit;
pub mod element_list;
pub mod element_store;
pub mod error;
pub mod key;
pub mod list_store;
pub mod merge;
pub mod native;
pub mod schema;
pub mod store;
pub mod types;
pub mod value;

// Re-export main types
pub use attribute::{AttributeDescription, AttributeRegistry, GraphAttribute};
pub use edit::{EditLog, EditOperation, GraphEdit};
pub use element_list::ElementList;
pub use element_store::ElementStore;
pub use error::{DuplicateKeyError, GraphError, GraphResult};
pub use key::{ElementKeySet, GraphKey};
pub use list_store::ListStore;
pub use merge::{GraphAttributeMerger, GraphElementMerger, KeepFirstElementMerger, MergerRegistry};
pub use native::{NativeAttributeType, NativeValue};
pub use schema::Schema;
pub use store::{StoreGraph, StoreGraphBuilder};
pub use types::{
    Direction, GraphElementType, GraphIndexType, GraphOperationMode, VertexDirection,
};
pub use value::AttributeValue;
