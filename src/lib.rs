//! StoreGraph
//!
//! An embeddable, in-memory, mutable property-graph storage engine: the
//! element-id allocator, adjacency machinery and attribute-value store that
//! back a single graph instance.
//!
//! # Architecture
//!
//! - Element ids are dense integers recycled through a swap-to-end store.
//!   Positions of unrelated elements change on removal; ids never do.
//! - Users add vertices and transactions. Links (one per vertex pair) and
//!   edges (one per link and direction class) are maintained automatically.
//! - Attributes are typed columns indexed by element id. Each attribute
//!   type is a pluggable [`AttributeDescription`](graph::AttributeDescription)
//!   with one of nine native representations.
//! - Primary keys are checked only when validation is requested, so key
//!   values may clash temporarily during multi-step edits.
//! - Every effective change is reported to an optional
//!   [`GraphEdit`](graph::GraphEdit) sink for undo and redo.
//!
//! # Features
//!
//! - Vertex, transaction, link and edge lifecycle with adjacency queries
//! - Attribute lifecycle, typed value access and string parsing
//! - Unordered and ordered value indices
//! - Primary key validation with pluggable element and attribute mergers
//! - Global, structure, attribute and per-attribute modification counters
//! - Configuration from YAML or JSON
//!
//! ## Example Usage
//!
//! ```rust
//! use storegraph::graph::{AttributeValue, GraphElementType, StoreGraph};
//!
//! let mut graph = StoreGraph::new();
//!
//! let name = graph
//!     .add_attribute(GraphElementType::Vertex, "string", "Name", "", &AttributeValue::Null, None)
//!     .unwrap();
//!
//! let alice = graph.add_vertex();
//! let bob = graph.add_vertex();
//! graph.set_string_value(name, alice, Some("Alice")).unwrap();
//! graph.set_string_value(name, bob, Some("Bob")).unwrap();
//!
//! let knows = graph.add_transaction(alice, bob, true).unwrap();
//! assert_eq!(graph.transaction_source_vertex(knows), Some(alice));
//! assert_eq!(graph.vertex_transaction_count(bob), 1);
//!
//! graph.set_primary_key(GraphElementType::Vertex, &[name]).unwrap();
//! graph.validate_keys().unwrap();
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod index;
pub mod memory;

pub use config::StoreGraphConfig;
pub use graph::{
    AttributeValue, GraphElementType, GraphError, GraphResult, StoreGraph, StoreGraphBuilder,
};
pub use index::{GraphIndex, GraphIndexResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
