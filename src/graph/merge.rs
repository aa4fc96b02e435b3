//! Resolving primary key clashes
//!
//! When key validation finds two elements with the same key it hands them to
//! the graph's [`GraphElementMerger`]. The merger folds the newer element
//! into the older one and removes it; per-attribute behaviour comes from the
//! [`GraphAttributeMerger`] named on each attribute.

use super::error::GraphResult;
use super::store::StoreGraph;
use super::types::GraphElementType;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Merges one attribute's value from a losing element into a survivor.
pub trait GraphAttributeMerger: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;

    /// Returns whether the survivor's value changed.
    fn merge_attribute(
        &self,
        graph: &mut StoreGraph,
        survivor: u32,
        loser: u32,
        attribute: u32,
    ) -> GraphResult<bool>;
}

/// Takes the loser's value whenever the loser has one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceMerger;

impl GraphAttributeMerger for ReplaceMerger {
    fn id(&self) -> &str {
        "replace"
    }

    fn merge_attribute(
        &self,
        graph: &mut StoreGraph,
        survivor: u32,
        loser: u32,
        attribute: u32,
    ) -> GraphResult<bool> {
        if graph.is_default_value(attribute, loser)? {
            return Ok(false);
        }
        graph.copy_value(attribute, loser, survivor)?;
        Ok(true)
    }
}

/// Keeps the survivor's value.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreMerger;

impl GraphAttributeMerger for IgnoreMerger {
    fn id(&self) -> &str {
        "ignore"
    }

    fn merge_attribute(
        &self,
        _graph: &mut StoreGraph,
        _survivor: u32,
        _loser: u32,
        _attribute: u32,
    ) -> GraphResult<bool> {
        Ok(false)
    }
}

/// Joins both string forms with ", " when they differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatenateMerger;

impl GraphAttributeMerger for ConcatenateMerger {
    fn id(&self) -> &str {
        "concatenate"
    }

    fn merge_attribute(
        &self,
        graph: &mut StoreGraph,
        survivor: u32,
        loser: u32,
        attribute: u32,
    ) -> GraphResult<bool> {
        let Some(theirs) = graph.string_value(attribute, loser)? else {
            return Ok(false);
        };
        let merged = match graph.string_value(attribute, survivor)? {
            None => theirs,
            Some(ours) if ours == theirs => return Ok(false),
            Some(ours) => format!("{}, {}", ours, theirs),
        };
        graph.set_string_value(attribute, survivor, Some(&merged))?;
        Ok(true)
    }
}

/// Attribute mergers by id.
#[derive(Debug, Clone)]
pub struct MergerRegistry {
    mergers: IndexMap<String, Arc<dyn GraphAttributeMerger>>,
}

impl MergerRegistry {
    pub fn empty() -> Self {
        Self {
            mergers: IndexMap::new(),
        }
    }

    /// The built-in "replace", "ignore" and "concatenate" mergers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(ReplaceMerger));
        registry.register(Arc::new(IgnoreMerger));
        registry.register(Arc::new(ConcatenateMerger));
        registry
    }

    pub fn register(&mut self, merger: Arc<dyn GraphAttributeMerger>) {
        self.mergers.insert(merger.id().to_string(), merger);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn GraphAttributeMerger>> {
        self.mergers.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.mergers.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.mergers.keys().map(String::as_str)
    }
}

impl Default for MergerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Resolves a key clash between two live elements of the same type.
pub trait GraphElementMerger: fmt::Debug + Send + Sync {
    /// Merges `loser` into `survivor`. A merger returning `Ok(true)` must
    /// have removed one of the two elements.
    fn merge_element(
        &self,
        graph: &mut StoreGraph,
        element_type: GraphElementType,
        survivor: u32,
        loser: u32,
    ) -> GraphResult<bool>;
}

/// Applies each attribute's merger to the survivor, then removes the loser.
///
/// When merging vertices, the loser's transactions are moved onto the
/// survivor first, so no connection is lost. The moved transactions become
/// pending if transactions are keyed.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepFirstElementMerger;

impl KeepFirstElementMerger {
    fn reattach_transactions(graph: &mut StoreGraph, survivor: u32, loser: u32) -> GraphResult<()> {
        let mut transactions: Vec<u32> = graph.vertex_transactions(loser).collect();
        transactions.sort_unstable();
        transactions.dedup();
        for transaction in transactions {
            // Undirected transactions may swap ends when one moves.
            loop {
                if graph.transaction_source_vertex(transaction) == Some(loser) {
                    graph.set_transaction_source_vertex(transaction, survivor)?;
                } else if graph.transaction_destination_vertex(transaction) == Some(loser) {
                    graph.set_transaction_destination_vertex(transaction, survivor)?;
                } else {
                    break;
                }
            }
        }
        Ok(())
    }
}

impl GraphElementMerger for KeepFirstElementMerger {
    fn merge_element(
        &self,
        graph: &mut StoreGraph,
        element_type: GraphElementType,
        survivor: u32,
        loser: u32,
    ) -> GraphResult<bool> {
        let attributes: Vec<u32> = (0..graph.attribute_count(element_type))
            .filter_map(|position| graph.attribute_at(element_type, position))
            .collect();
        for attribute in attributes {
            let merger = graph
                .attribute_merger(attribute)?
                .and_then(|id| graph.merger_registry().get(&id));
            if let Some(merger) = merger {
                merger.merge_attribute(graph, survivor, loser, attribute)?;
            }
        }
        if element_type == GraphElementType::Vertex {
            Self::reattach_transactions(graph, survivor, loser)?;
        }
        trace!(%element_type, survivor, loser, "merged element");
        element_type.remove_element(graph, loser)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids() {
        let registry = MergerRegistry::default();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["replace", "ignore", "concatenate"]);
        assert!(registry.get("replace").is_some());
        assert!(registry.get("sum").is_none());
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = MergerRegistry::empty();
        registry.register(Arc::new(IgnoreMerger));
        registry.register(Arc::new(IgnoreMerger));
        assert_eq!(registry.ids().count(), 1);
        assert!(registry.contains("ignore"));
    }
}
