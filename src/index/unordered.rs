//! Hash based attribute index for equality lookups

use super::{GraphIndex, GraphIndexResult};
use crate::graph::types::GraphIndexType;
use crate::graph::value::AttributeValue;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default)]
pub struct UnorderedIndex {
    index: FxHashMap<AttributeValue, FxHashSet<u32>>,
    values: Vec<Option<AttributeValue>>,
}

impl UnorderedIndex {
    pub fn new(capacity: usize) -> Self {
        Self {
            index: FxHashMap::default(),
            values: vec![None; capacity],
        }
    }
}

impl GraphIndex for UnorderedIndex {
    fn index_type(&self) -> GraphIndexType {
        GraphIndexType::Unordered
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
        _start: &AttributeValue,
        _end: &AttributeValue,
    ) -> Option<GraphIndexResult> {
        None
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
