//! B-Tree based attribute index supporting value and range lookups

use super::{GraphIndex, GraphIndexResult};
use crate::graph::types::GraphIndexType;
use crate::graph::value::AttributeValue;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Debug, Clone, Default)]
pub struct OrderedIndex {
    /// Value -> set of element ids
    index: BTreeMap<AttributeValue, FxHashSet<u32>>,
    /// Element id -> value it is filed under
    values: Vec<Option<AttributeValue>>,
}

impl OrderedIndex {
    pub fn new(capacity: usize) -> Self {
        Self {
            index: BTreeMap::new(),
            values: vec![None; capacity],
        }
    }
}

impl GraphIndex for OrderedIndex {
    fn index_type(&self) -> GraphIndexType {
        GraphIndexType::Ordered
    }

    fn add_element(&mut self, element: u32, value: &AttributeValue) {
        self.expand_capacity(element as usize + 1);
        self.index.entry(value.clone()).or_default().insert(element);
        self.values[element as usize] = Some(value.clone());
    }

    fn remove_element(&mut self, element: u32) {
        let Some(value) = self.values.get_mut(element as usize).and_then(Option::take) else {
            return;
        };
        if let Some(elements) = self.index.get_mut(&value) {
            elements.remove(&element);
            if elements.is_empty() {
                self.index.remove(&value);
            }
        }
    }

    fn elements_with_value(&self, value: &AttributeValue) -> Option<GraphIndexResult> {
        let elements = self
            .index
            .get(value)
            .map(|elements| elements.iter().copied().collect())
            .unwrap_or_default();
        Some(GraphIndexResult::new(elements))
    }

    fn elements_in_range(
        &self,
        start: &AttributeValue,
        end: &AttributeValue,
    ) -> Option<GraphIndexResult> {
        if start > end {
            return Some(GraphIndexResult::default());
        }
        let mut result = Vec::new();
        for (_, elements) in self
            .index
            .range((Bound::Included(start), Bound::Included(end)))
        {
            result.extend(elements.iter().copied());
        }
        Some(GraphIndexResult::new(result))
    }

    fn expand_capacity(&mut self, capacity: usize) {
        if capacity > self.values.len() {
            self.values.resize(capacity, None);
        }
    }

    fn boxed_clone(&self) -> Box<dyn GraphIndex> {
        Box::new(self.clone())
    }
}
