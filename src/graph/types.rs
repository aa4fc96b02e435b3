//! Core type definitions for the graph store

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of element a graph holds.
///
/// META and GRAPH are singletons that only carry attributes. The remaining
/// four are the structural element types managed by their own id stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum GraphElementType {
    Meta,
    Graph,
    Vertex,
    Link,
    Edge,
    Transaction,
}

impl GraphElementType {
    pub const ALL: [GraphElementType; 6] = [
        GraphElementType::Meta,
        GraphElementType::Graph,
        GraphElementType::Vertex,
        GraphElementType::Link,
        GraphElementType::Edge,
        GraphElementType::Transaction,
    ];

    pub const COUNT: usize = 6;

    /// Dense index used to address per-type tables.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            GraphElementType::Meta => "meta",
            GraphElementType::Graph => "graph",
            GraphElementType::Vertex => "vertex",
            GraphElementType::Link => "link",
            GraphElementType::Edge => "edge",
            GraphElementType::Transaction => "transaction",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            GraphElementType::Meta => "meta",
            GraphElementType::Graph => "graph",
            GraphElementType::Vertex => "vx",
            GraphElementType::Link => "ln",
            GraphElementType::Edge => "ed",
            GraphElementType::Transaction => "tx",
        }
    }

    /// Whether the type is a single-instance attribute carrier.
    pub fn is_singleton(self) -> bool {
        matches!(self, GraphElementType::Meta | GraphElementType::Graph)
    }
}

impl fmt::Display for GraphElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphElementType::Meta => "META",
            GraphElementType::Graph => "GRAPH",
            GraphElementType::Vertex => "VERTEX",
            GraphElementType::Link => "LINK",
            GraphElementType::Edge => "EDGE",
            GraphElementType::Transaction => "TRANSACTION",
        };
        write!(f, "{}", name)
    }
}

/// Direction class of a transaction or edge relative to vertex id order.
///
/// Uphill runs from the lower vertex id to the higher one, downhill the
/// other way. Flat covers undirected connections and self loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Uphill = 0,
    Downhill = 1,
    Flat = 2,
}

impl Direction {
    pub fn from_category(category: usize) -> Self {
        match category {
            0 => Direction::Uphill,
            1 => Direction::Downhill,
            _ => Direction::Flat,
        }
    }

    pub fn category(self) -> usize {
        self as usize
    }
}

/// Role of a connection at one of its vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexDirection {
    Outgoing = 0,
    Incoming = 1,
    Undirected = 2,
}

impl VertexDirection {
    pub fn from_category(category: usize) -> Self {
        match category {
            0 => VertexDirection::Outgoing,
            1 => VertexDirection::Incoming,
            _ => VertexDirection::Undirected,
        }
    }

    pub fn category(self) -> usize {
        self as usize
    }

    /// Occupancy bit used by the per-vertex link state.
    pub(crate) fn bit(self) -> usize {
        1 << (self as usize)
    }
}

/// Why a mutation is running.
///
/// Undo replays apply a negative increment so that a replayed and reversed
/// sequence leaves every modification counter at its prior value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GraphOperationMode {
    #[default]
    Execute,
    Undo,
    Redo,
}

impl GraphOperationMode {
    pub fn modification_increment(self) -> i64 {
        match self {
            GraphOperationMode::Execute | GraphOperationMode::Redo => 1,
            GraphOperationMode::Undo => -1,
        }
    }
}

/// Kinds of value index an attribute can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GraphIndexType {
    #[default]
    None,
    Unordered,
    Ordered,
}

impl fmt::Display for GraphIndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphIndexType::None => write!(f, "NONE"),
            GraphIndexType::Unordered => write!(f, "UNORDERED"),
            GraphIndexType::Ordered => write!(f, "ORDERED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_ordinals() {
        for (i, t) in GraphElementType::ALL.iter().enumerate() {
            assert_eq!(t.ordinal(), i);
            assert_eq!(GraphElementType::from_ordinal(i), Some(*t));
        }
        assert_eq!(GraphElementType::from_ordinal(6), None);
    }

    #[test]
    fn test_element_type_display() {
        assert_eq!(format!("{}", GraphElementType::Vertex), "VERTEX");
        assert_eq!(GraphElementType::Transaction.short_label(), "tx");
        assert!(GraphElementType::Graph.is_singleton());
        assert!(!GraphElementType::Edge.is_singleton());
    }

    #[test]
    fn test_direction_categories() {
        assert_eq!(Direction::from_category(0), Direction::Uphill);
        assert_eq!(Direction::from_category(1), Direction::Downhill);
        assert_eq!(Direction::from_category(2), Direction::Flat);
        assert_eq!(VertexDirection::Incoming.bit(), 2);
        assert_eq!(VertexDirection::Undirected.bit(), 4);
    }

    #[test]
    fn test_operation_mode_increment() {
        assert_eq!(GraphOperationMode::Execute.modification_increment(), 1);
        assert_eq!(GraphOperationMode::Redo.modification_increment(), 1);
        assert_eq!(GraphOperationMode::Undo.modification_increment(), -1);
    }
}
