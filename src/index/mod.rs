//! Attribute value indexing
//!
//! An attribute may carry an index over the values its elements hold. The
//! store keeps the index current on every add, remove and value change, and
//! answers value and range queries from it.

pub mod ordered;
pub mod unordered;

pub use ordered::OrderedIndex;
pub use unordered::UnorderedIndex;

use crate::graph::types::GraphIndexType;
use crate::graph::value::AttributeValue;
use std::fmt;

/// Elements matching an index query, in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphIndexResult {
    elements: Vec<u32>,
}

impl GraphIndexResult {
    pub fn new(mut elements: Vec<u32>) -> Self {
        elements.sort_unstable();
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, element: u32) -> bool {
        self.elements.binary_search(&element).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.elements.iter().copied()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.elements
    }
}

impl IntoIterator for GraphIndexResult {
    type Item = u32;
    type IntoIter = std::vec::IntoIter<u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

/// A value index over one attribute.
pub trait GraphIndex: fmt::Debug + Send + Sync {
    fn index_type(&self) -> GraphIndexType;

    fn add_element(&mut self, element: u32, value: &AttributeValue);

    fn remove_element(&mut self, element: u32);

    fn update_element(&mut self, element: u32, value: &AttributeValue) {
        self.remove_element(element);
        self.add_element(element, value);
    }

    /// Elements holding `value`, or `None` if this index cannot answer.
    fn elements_with_value(&self, value: &AttributeValue) -> Option<GraphIndexResult>;

    /// Elements whose value lies in `[start, end]`, or `None` if this index
    /// keeps no ordering.
    fn elements_in_range(
        &self,
        start: &AttributeValue,
        end: &AttributeValue,
    ) -> Option<GraphIndexResult>;

    fn expand_capacity(&mut self, capacity: usize);

    fn boxed_clone(&self) -> Box<dyn GraphIndex>;
}

impl Clone for Box<dyn GraphIndex> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Placeholder index for attributes with no index.
#[derive(Debug, Clone, Default)]
pub struct NullGraphIndex;

impl GraphIndex for NullGraphIndex {
    fn index_type(&self) -> GraphIndexType {
        GraphIndexType::None
    }

    fn add_element(&mut self, _element: u32, _value: &AttributeValue) {}

    fn remove_element(&mut self, _element: u32) {}

    fn update_element(&mut self, _element: u32, _value: &AttributeValue) {}

    fn elements_with_value(&self, _value: &AttributeValue) -> Option<GraphIndexResult> {
        None
    }

    fn elements_in_range(
        &self,
        _start: &AttributeValue,
        _end: &AttributeValue,
    ) -> Option<GraphIndexResult> {
        None
    }

    fn expand_capacity(&mut self, _capacity: usize) {}

    fn boxed_clone(&self) -> Box<dyn GraphIndex> {
        Box::new(NullGraphIndex)
    }
}

/// Builds an empty index of the requested kind.
pub fn create_index(index_type: GraphIndexType, capacity: usize) -> Box<dyn GraphIndex> {
    match index_type {
        GraphIndexType::None => Box::new(NullGraphIndex),
        GraphIndexType::Unordered => Box::new(UnorderedIndex::new(capacity)),
        GraphIndexType::Ordered => Box::new(OrderedIndex::new(capacity)),
    }
}
