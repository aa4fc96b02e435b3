//! Per-element-type dispatch over a store
//!
//! META and GRAPH each have exactly one element, id 0.

use super::StoreGraph;
use crate::graph::error::{GraphError, GraphResult};
use crate::graph::types::GraphElementType;

impl GraphElementType {
    pub fn element_count(self, graph: &StoreGraph) -> usize {
        match self {
            GraphElementType::Meta | GraphElementType::Graph => 1,
            GraphElementType::Vertex => graph.vertex_count(),
            GraphElementType::Link => graph.link_count(),
            GraphElementType::Edge => graph.edge_count(),
            GraphElementType::Transaction => graph.transaction_count(),
        }
    }

    /// The element at `position`.
    pub fn element(self, graph: &StoreGraph, position: usize) -> Option<u32> {
        match self {
            GraphElementType::Meta | GraphElementType::Graph => (position == 0).then_some(0),
            GraphElementType::Vertex => graph.vertex(position),
            GraphElementType::Link => graph.link(position),
            GraphElementType::Edge => graph.edge(position),
            GraphElementType::Transaction => graph.transaction(position),
        }
    }

    pub fn element_capacity(self, graph: &StoreGraph) -> usize {
        match self {
            GraphElementType::Meta | GraphElementType::Graph => 1,
            GraphElementType::Vertex => graph.vertex_capacity(),
            GraphElementType::Link => graph.link_capacity(),
            GraphElementType::Edge => graph.edge_capacity(),
            GraphElementType::Transaction => graph.transaction_capacity(),
        }
    }

    pub fn element_exists(self, graph: &StoreGraph, id: u32) -> bool {
        match self {
            GraphElementType::Meta | GraphElementType::Graph => id == 0,
            GraphElementType::Vertex => graph.vertex_exists(id),
            GraphElementType::Link => graph.link_exists(id),
            GraphElementType::Edge => graph.edge_exists(id),
            GraphElementType::Transaction => graph.transaction_exists(id),
        }
    }

    pub fn uid(self, graph: &StoreGraph, id: u32) -> Option<i64> {
        match self {
            GraphElementType::Meta | GraphElementType::Graph => (id == 0).then_some(0),
            GraphElementType::Vertex => graph.vertex_uid(id),
            GraphElementType::Link => graph.link_uid(id),
            GraphElementType::Edge => graph.edge_uid(id),
            GraphElementType::Transaction => graph.transaction_uid(id),
        }
    }

    /// Live elements of this type, in position order.
    pub fn elements(self, graph: &StoreGraph) -> Vec<u32> {
        (0..self.element_count(graph))
            .filter_map(|position| self.element(graph, position))
            .collect()
    }

    /// Removes one element. Only vertices and transactions can be removed
    /// directly; links and edges follow their transactions.
    pub fn remove_element(self, graph: &mut StoreGraph, id: u32) -> GraphResult<()> {
        match self {
            GraphElementType::Vertex => graph.remove_vertex(id),
            GraphElementType::Transaction => graph.remove_transaction(id),
            _ => Err(GraphError::ElementNotFound {
                element_type: self,
                id,
            }),
        }
    }

    /// Runs the graph's schema completion hook for this element, if any.
    pub fn complete_with_schema(self, graph: &mut StoreGraph, id: u32) -> GraphResult<()> {
        let Some(schema) = graph.schema() else {
            return Ok(());
        };
        match self {
            GraphElementType::Vertex => schema.complete_vertex(graph, id),
            GraphElementType::Transaction => schema.complete_transaction(graph, id),
            _ => Ok(()),
        }
    }
}
