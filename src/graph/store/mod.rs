//! The array-backed graph store
//!
//! `StoreGraph` ties the id stores, adjacency lists, attribute descriptions
//! and key sets together. The implementation is spread over submodules:
//!
//! - `structure`: vertex, link, edge and transaction lifecycle and reads
//! - `attributes`: attribute lifecycle, metadata and indices
//! - `values`: typed value access
//! - `keys`: primary keys and their validation
//! - `element_type`: per-element-type dispatch
//!
//! The store is single threaded. Wrap it in a lock to share it.

mod attributes;
mod element_type;
mod keys;
mod structure;
mod values;

#[cfg(test)]
mod tests;

use super::attribute::{AttributeDescription, AttributeRegistry, GraphAttribute};
use super::edit::GraphEdit;
use super::element_list::ElementList;
use super::element_store::ElementStore;
use super::key::ElementKeySet;
use super::list_store::ListStore;
use super::merge::{GraphElementMerger, MergerRegistry};
use super::schema::Schema;
use super::types::{GraphElementType, GraphIndexType, GraphOperationMode};
use crate::config::StoreGraphConfig;
use crate::index::GraphIndex;
use crate::memory;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Everything the store keeps for one live attribute.
#[derive(Debug, Clone)]
pub(crate) struct AttributeSlot {
    pub(crate) metadata: GraphAttribute,
    pub(crate) description: Box<dyn AttributeDescription>,
    pub(crate) index_type: GraphIndexType,
    pub(crate) index: Box<dyn GraphIndex>,
    /// Element type whose primary key includes this attribute.
    pub(crate) key_type: Option<GraphElementType>,
    pub(crate) value_counter: i64,
}

/// In-memory property graph with stable integer ids.
///
/// Vertices and transactions are created explicitly. Links (one per
/// unordered vertex pair) and edges (one per direction class under a link)
/// are maintained automatically from the transactions.
pub struct StoreGraph {
    id: String,

    vertex_store: ElementStore,
    link_store: ElementStore,
    edge_store: ElementStore,
    transaction_store: ElementStore,
    attribute_store: ElementStore,

    /// Link chains keyed by `(low, high)` vertex pair.
    link_hash: Vec<u32>,
    link_next: Vec<u32>,
    link_prev: Vec<u32>,
    link_mask: u32,

    /// Per vertex: `link << 1` at the low end, `link << 1 | 1` at the high
    /// end, bucketed by the vertex's direction state on that link.
    vertex_links: ListStore,
    /// Per vertex: `edge << 1` as source, `edge << 1 | 1` as destination.
    vertex_edges: ListStore,
    /// Per vertex: `transaction << 1` as source, `transaction << 1 | 1` as
    /// destination.
    vertex_transactions: ListStore,
    link_edges: ListStore,
    link_transactions: ListStore,
    /// Per element type ordinal: its attribute ids.
    type_attributes: ListStore,

    attributes: Vec<Option<AttributeSlot>>,
    attribute_names: [FxHashMap<String, u32>; GraphElementType::COUNT],

    primary_keys: [Vec<u32>; GraphElementType::COUNT],
    key_sets: [Option<ElementKeySet>; GraphElementType::COUNT],
    /// Keyed elements whose key has not been checked since they last changed.
    pending_keys: [Option<ElementList>; GraphElementType::COUNT],

    global_counter: i64,
    structure_counter: i64,
    attribute_counter: i64,
    next_uid: i64,

    operation_mode: GraphOperationMode,
    graph_edit: Option<Box<dyn GraphEdit>>,

    attribute_registry: Arc<AttributeRegistry>,
    merger_registry: Arc<MergerRegistry>,
    schema: Option<Arc<dyn Schema>>,
    element_merger: Option<Arc<dyn GraphElementMerger>>,
}

/// Collects collaborators for a new [`StoreGraph`].
pub struct StoreGraphBuilder {
    config: StoreGraphConfig,
    attribute_registry: Option<Arc<AttributeRegistry>>,
    merger_registry: Option<Arc<MergerRegistry>>,
    schema: Option<Arc<dyn Schema>>,
    element_merger: Option<Arc<dyn GraphElementMerger>>,
}

impl StoreGraphBuilder {
    pub fn attribute_registry(mut self, registry: Arc<AttributeRegistry>) -> Self {
        self.attribute_registry = Some(registry);
        self
    }

    pub fn merger_registry(mut self, registry: Arc<MergerRegistry>) -> Self {
        self.merger_registry = Some(registry);
        self
    }

    pub fn schema(mut self, schema: Arc<dyn Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Merger for key clashes. Takes precedence over the schema's merger.
    pub fn element_merger(mut self, merger: Arc<dyn GraphElementMerger>) -> Self {
        self.element_merger = Some(merger);
        self
    }

    pub fn build(self) -> StoreGraph {
        let config = self.config;
        let element_merger = self
            .element_merger
            .or_else(|| self.schema.as_ref().and_then(|schema| schema.element_merger()));

        let vertex_store = ElementStore::new(config.vertex_capacity);
        let link_store = ElementStore::new(config.link_capacity);
        let edge_store = ElementStore::new(config.edge_capacity);
        let transaction_store = ElementStore::new(config.transaction_capacity);
        let attribute_store = ElementStore::new(config.attribute_capacity);

        let vertices = vertex_store.capacity();
        let links = link_store.capacity();
        let edges = edge_store.capacity();
        let transactions = transaction_store.capacity();
        let attribute_capacity = attribute_store.capacity();

        let graph = StoreGraph {
            id: config.resolve_id(),
            link_hash: vec![structure::NO_LINK; links],
            link_next: vec![structure::NO_LINK; links],
            link_prev: vec![structure::NO_LINK; links],
            link_mask: (links - 1) as u32,
            vertex_links: ListStore::new(structure::LINK_CATEGORIES, vertices, links << 1),
            vertex_edges: ListStore::new(3, vertices, edges << 1),
            vertex_transactions: ListStore::new(3, vertices, transactions << 1),
            link_edges: ListStore::new(3, links, edges),
            link_transactions: ListStore::new(3, links, transactions),
            type_attributes: ListStore::new(1, GraphElementType::COUNT, attribute_capacity),
            attributes: vec![None; attribute_capacity],
            attribute_names: Default::default(),
            primary_keys: Default::default(),
            key_sets: Default::default(),
            pending_keys: Default::default(),
            vertex_store,
            link_store,
            edge_store,
            transaction_store,
            attribute_store,
            global_counter: 0,
            structure_counter: 0,
            attribute_counter: 0,
            next_uid: 0,
            operation_mode: GraphOperationMode::Execute,
            graph_edit: None,
            attribute_registry: self.attribute_registry.unwrap_or_default(),
            merger_registry: self.merger_registry.unwrap_or_default(),
            schema: self.schema,
            element_merger,
        };
        memory::register_graph();
        debug!(id = %graph.id, vertices, transactions, "created graph");
        graph
    }
}

impl StoreGraph {
    /// An empty graph with default capacities, the built-in attribute types
    /// and mergers, and a random id.
    pub fn new() -> Self {
        Self::builder(StoreGraphConfig::default()).build()
    }

    pub fn with_config(config: StoreGraphConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: StoreGraphConfig) -> StoreGraphBuilder {
        StoreGraphBuilder {
            config,
            attribute_registry: None,
            merger_registry: None,
            schema: None,
            element_merger: None,
        }
    }

    /// A deep copy carrying a different id.
    pub fn copy_with_id(&self, id: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.id = id.into();
        copy
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attribute_registry(&self) -> &AttributeRegistry {
        &self.attribute_registry
    }

    pub fn merger_registry(&self) -> &MergerRegistry {
        &self.merger_registry
    }

    pub fn schema(&self) -> Option<Arc<dyn Schema>> {
        self.schema.clone()
    }

    pub fn element_merger(&self) -> Option<Arc<dyn GraphElementMerger>> {
        self.element_merger.clone()
    }

    pub fn set_element_merger(&mut self, merger: Option<Arc<dyn GraphElementMerger>>) {
        self.element_merger = merger;
    }

    // Modification counters. They move by the operation mode's increment,
    // so compare them with `!=` rather than `<`.

    pub fn global_modification_counter(&self) -> i64 {
        self.global_counter
    }

    pub fn structure_modification_counter(&self) -> i64 {
        self.structure_counter
    }

    pub fn attribute_modification_counter(&self) -> i64 {
        self.attribute_counter
    }

    /// Restores all three graph-level counters at once.
    pub fn set_modification_counters(&mut self, global: i64, structure: i64, attribute: i64) {
        self.global_counter = global;
        self.structure_counter = structure;
        self.attribute_counter = attribute;
    }

    pub fn operation_mode(&self) -> GraphOperationMode {
        self.operation_mode
    }

    pub fn set_operation_mode(&mut self, mode: GraphOperationMode) {
        self.operation_mode = mode;
    }

    pub fn graph_edit(&self) -> Option<&dyn GraphEdit> {
        self.graph_edit.as_deref()
    }

    /// Attaches a sink, or detaches with `None`.
    pub fn set_graph_edit(&mut self, edit: Option<Box<dyn GraphEdit>>) {
        self.graph_edit = edit;
    }

    pub fn take_graph_edit(&mut self) -> Option<Box<dyn GraphEdit>> {
        self.graph_edit.take()
    }

    #[inline]
    fn increment(&self) -> i64 {
        self.operation_mode.modification_increment()
    }

    fn bump_structure(&mut self) {
        let increment = self.increment();
        self.structure_counter += increment;
        self.global_counter += increment;
    }

    fn bump_attributes(&mut self) {
        let increment = self.increment();
        self.attribute_counter += increment;
        self.global_counter += increment;
    }

    fn issue_uid(&mut self) -> i64 {
        self.next_uid += 1;
        self.next_uid
    }
}

impl Default for StoreGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy. The copy starts with no edit sink attached.
impl Clone for StoreGraph {
    fn clone(&self) -> Self {
        memory::register_graph();
        Self {
            id: self.id.clone(),
            vertex_store: self.vertex_store.clone(),
            link_store: self.link_store.clone(),
            edge_store: self.edge_store.clone(),
            transaction_store: self.transaction_store.clone(),
            attribute_store: self.attribute_store.clone(),
            link_hash: self.link_hash.clone(),
            link_next: self.link_next.clone(),
            link_prev: self.link_prev.clone(),
            link_mask: self.link_mask,
            vertex_links: self.vertex_links.clone(),
            vertex_edges: self.vertex_edges.clone(),
            vertex_transactions: self.vertex_transactions.clone(),
            link_edges: self.link_edges.clone(),
            link_transactions: self.link_transactions.clone(),
            type_attributes: self.type_attributes.clone(),
            attributes: self.attributes.clone(),
            attribute_names: self.attribute_names.clone(),
            primary_keys: self.primary_keys.clone(),
            key_sets: self.key_sets.clone(),
            pending_keys: self.pending_keys.clone(),
            global_counter: self.global_counter,
            structure_counter: self.structure_counter,
            attribute_counter: self.attribute_counter,
            next_uid: self.next_uid,
            operation_mode: self.operation_mode,
            graph_edit: None,
            attribute_registry: Arc::clone(&self.attribute_registry),
            merger_registry: Arc::clone(&self.merger_registry),
            schema: self.schema.clone(),
            element_merger: self.element_merger.clone(),
        }
    }
}

impl Drop for StoreGraph {
    fn drop(&mut self) {
        memory::release_graph();
    }
}

impl fmt::Debug for StoreGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreGraph")
            .field("id", &self.id)
            .field("vertices", &self.vertex_store.count())
            .field("transactions", &self.transaction_store.count())
            .field("attributes", &self.attribute_store.count())
            .finish()
    }
}

impl fmt::Display for StoreGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[StoreGraph; vertices:{}, transactions:{}]",
            self.vertex_store.count(),
            self.transaction_store.count()
        )
    }
}
