//! Domain hooks run over freshly created or merged elements

use super::error::GraphResult;
use super::merge::GraphElementMerger;
use super::store::StoreGraph;
use std::fmt;
use std::sync::Arc;

/// Domain-level completion of elements.
///
/// The store never calls these itself; they are reached through
/// [`GraphElementType::complete_with_schema`](super::types::GraphElementType)
/// by whoever finishes building an element.
pub trait Schema: fmt::Debug + Send + Sync {
    fn complete_vertex(&self, _graph: &mut StoreGraph, _vertex: u32) -> GraphResult<()> {
        Ok(())
    }

    fn complete_transaction(&self, _graph: &mut StoreGraph, _transaction: u32) -> GraphResult<()> {
        Ok(())
    }

    /// Merger used to resolve key clashes when the graph was not given one
    /// directly.
    fn element_merger(&self) -> Option<Arc<dyn GraphElementMerger>> {
        None
    }
}
