//! Primary keys and their validation
//!
//! A keyed element type keeps each of its live elements in exactly one of
//! two places: the key set, once its key has been checked for uniqueness,
//! or the pending list, while its key is unchecked. New elements and
//! elements whose key values change go to the pending list; validation
//! drains it into the key set.

use super::StoreGraph;
use crate::graph::element_list::ElementList;
use crate::graph::error::{DuplicateKeyError, GraphError, GraphResult};
use crate::graph::key::{ElementKeySet, GraphKey, DIRECTION_HASH_MULTIPLIER, KEY_HASH_MULTIPLIER};
use crate::graph::types::{Direction, GraphElementType};
use std::fmt::Write as _;
use tracing::{debug, warn};

impl StoreGraph {
    /// Replaces the primary key of `element_type`.
    ///
    /// Every live element of the type becomes pending, so the next
    /// validation checks all of them against the new key. An empty slice
    /// removes the key.
    pub fn set_primary_key(
        &mut self,
        element_type: GraphElementType,
        attributes: &[u32],
    ) -> GraphResult<()> {
        for &attribute in attributes {
            if self.slot(attribute)?.metadata.element_type != element_type {
                return Err(GraphError::KeyElementTypeMismatch {
                    attribute,
                    expected: element_type,
                });
            }
        }

        let o = element_type.ordinal();
        let increment = self.increment();
        let old_keys = std::mem::replace(&mut self.primary_keys[o], attributes.to_vec());
        for &attribute in &old_keys {
            if let Ok(slot) = self.slot_mut(attribute) {
                slot.key_type = None;
                slot.value_counter += increment;
            }
            self.attribute_counter += increment;
        }
        for &attribute in attributes {
            let slot = self.slot_mut(attribute)?;
            slot.key_type = Some(element_type);
            slot.value_counter += increment;
            self.attribute_counter += increment;
        }

        if attributes.is_empty() {
            self.key_sets[o] = None;
            self.pending_keys[o] = None;
        } else {
            let capacity = element_type.element_capacity(self);
            self.key_sets[o] = Some(ElementKeySet::new(element_type, capacity));
            self.pending_keys[o] = Some(self.all_elements_pending(element_type));
        }

        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.set_primary_key(element_type, &old_keys, attributes);
        }
        self.global_counter += increment;
        debug!(%element_type, keys = ?attributes, "set primary key");
        Ok(())
    }

    fn all_elements_pending(&self, element_type: GraphElementType) -> ElementList {
        match element_type {
            GraphElementType::Vertex => ElementList::from_store(&self.vertex_store),
            GraphElementType::Link => ElementList::from_store(&self.link_store),
            GraphElementType::Edge => ElementList::from_store(&self.edge_store),
            GraphElementType::Transaction => ElementList::from_store(&self.transaction_store),
            GraphElementType::Meta | GraphElementType::Graph => {
                let mut list = ElementList::new(1);
                list.add_to_back(0);
                list
            }
        }
    }

    /// The key attributes of `element_type`, in key order.
    pub fn primary_key(&self, element_type: GraphElementType) -> Vec<u32> {
        self.primary_keys[element_type.ordinal()].clone()
    }

    pub fn is_primary_key(&self, attribute: u32) -> bool {
        self.slot(attribute)
            .is_ok_and(|slot| slot.key_type.is_some())
    }

    /// Number of elements of `element_type` whose key is still unchecked.
    pub fn pending_key_count(&self, element_type: GraphElementType) -> usize {
        self.pending_keys[element_type.ordinal()]
            .as_ref()
            .map_or(0, ElementList::len)
    }

    /// The key value of one element, or `None` if the type has no key.
    pub fn primary_key_value(
        &self,
        element_type: GraphElementType,
        id: u32,
    ) -> GraphResult<Option<GraphKey>> {
        if self.primary_keys[element_type.ordinal()].is_empty() {
            return Ok(None);
        }
        if !element_type.element_exists(self, id) {
            return Err(GraphError::ElementNotFound { element_type, id });
        }
        let values = self.primary_keys[element_type.ordinal()]
            .iter()
            .map(|&attribute| self.object_value(attribute, id))
            .collect::<GraphResult<Vec<_>>>()?;
        if element_type != GraphElementType::Transaction {
            return Ok(Some(GraphKey::element(element_type, values)));
        }

        let endpoint_key = |vertex: Option<u32>| -> GraphResult<GraphKey> {
            let vertex = vertex.ok_or(GraphError::TransactionNotFound(id))?;
            Ok(self
                .primary_key_value(GraphElementType::Vertex, vertex)?
                .unwrap_or_else(|| GraphKey::element(GraphElementType::Vertex, Vec::new())))
        };
        let source = endpoint_key(self.transaction_source_vertex(id))?;
        let destination = endpoint_key(self.transaction_destination_vertex(id))?;
        let undirected = self.transaction_direction(id) == Some(Direction::Flat);
        Ok(Some(GraphKey::transaction(values, source, destination, undirected)))
    }

    /// Validates vertex keys, then transaction keys, merging clashes where
    /// a merger is configured.
    pub fn validate_keys(&mut self) -> GraphResult<()> {
        self.validate_key(GraphElementType::Vertex, true)?;
        self.validate_key(GraphElementType::Transaction, true)
    }

    /// Moves every pending element of `element_type` into the key set.
    ///
    /// A clash is handed to the element merger when `allow_merging` is set
    /// and one is configured. An unresolved clash fails with
    /// [`GraphError::DuplicateKey`]; elements validated before it stay
    /// validated and the clashing element stays pending.
    pub fn validate_key(
        &mut self,
        element_type: GraphElementType,
        allow_merging: bool,
    ) -> GraphResult<()> {
        let o = element_type.ordinal();
        while let Some(element) = self.pending_keys[o].as_ref().and_then(ElementList::first) {
            self.validate_pending(element_type, element, allow_merging)?;
        }
        Ok(())
    }

    /// Validates one element if it is pending.
    pub fn validate_key_element(
        &mut self,
        element_type: GraphElementType,
        element: u32,
        allow_merging: bool,
    ) -> GraphResult<()> {
        let pending = self.pending_keys[element_type.ordinal()]
            .as_ref()
            .is_some_and(|list| list.contains(element));
        if pending {
            self.validate_pending(element_type, element, allow_merging)?;
        }
        Ok(())
    }

    fn validate_pending(
        &mut self,
        element_type: GraphElementType,
        element: u32,
        allow_merging: bool,
    ) -> GraphResult<()> {
        let o = element_type.ordinal();
        let Some(mut key_set) = self.key_sets[o].take() else {
            return Ok(());
        };
        let hash = self.key_hash(element_type, element);
        let clash = key_set.add(element, hash, |other| self.keys_equal(element_type, other, element));
        self.key_sets[o] = Some(key_set);

        let Some(existing) = clash else {
            if let Some(pending) = self.pending_keys[o].as_mut() {
                pending.remove(element);
            }
            return Ok(());
        };

        let merger = self.element_merger.clone().filter(|_| allow_merging);
        if let Some(merger) = merger {
            match merger.merge_element(self, element_type, existing, element) {
                Ok(true)
                    if element_type.element_exists(self, existing)
                        && element_type.element_exists(self, element) =>
                {
                    warn!(%element_type, existing, element, "element merger kept both elements");
                }
                Ok(true) => return Ok(()),
                Ok(false) => {
                    warn!(%element_type, existing, element, "element merger refused merge");
                }
                Err(e) => {
                    warn!(%element_type, existing, element, error = %e, "element merger failed");
                }
            }
        }
        Err(self.duplicate_key_error(element_type, existing, element))
    }

    fn key_hash(&self, element_type: GraphElementType, element: u32) -> u64 {
        let mut hash: u64 = 0;
        for &attribute in &self.primary_keys[element_type.ordinal()] {
            if let Ok(slot) = self.slot(attribute) {
                hash = hash.wrapping_mul(KEY_HASH_MULTIPLIER) ^ slot.description.hash_value(element);
            }
        }
        if element_type == GraphElementType::Transaction {
            let direction = self
                .transaction_direction(element)
                .map_or(0, Direction::category) as u64;
            let source = self.transaction_source_vertex(element).unwrap_or_default();
            let destination = self.transaction_destination_vertex(element).unwrap_or_default();
            hash ^= direction.wrapping_mul(DIRECTION_HASH_MULTIPLIER) ^ u64::from(source ^ destination);
        }
        hash
    }

    fn keys_equal(&self, element_type: GraphElementType, a: u32, b: u32) -> bool {
        let values_equal = self.primary_keys[element_type.ordinal()].iter().all(|&attribute| {
            self.slot(attribute)
                .is_ok_and(|slot| slot.description.values_equal(a, b))
        });
        if !values_equal || element_type != GraphElementType::Transaction {
            return values_equal;
        }
        self.transaction_direction(a) == self.transaction_direction(b)
            && self.transaction_source_vertex(a) == self.transaction_source_vertex(b)
            && self.transaction_destination_vertex(a) == self.transaction_destination_vertex(b)
    }

    fn duplicate_key_error(
        &self,
        element_type: GraphElementType,
        existing: u32,
        element: u32,
    ) -> GraphError {
        let describe = |id: u32, label: &str| {
            let mut text = format!("{}[{}]: ", label, id);
            for (i, &attribute) in self.primary_keys[element_type.ordinal()].iter().enumerate() {
                if i > 0 {
                    text.push_str(", ");
                }
                let name = self.attribute_name(attribute).unwrap_or_default();
                let value = self.string_value(attribute, id).ok().flatten();
                let _ = write!(text, "{} = {}", name, value.as_deref().unwrap_or("null"));
            }
            text
        };
        let message = format!(
            "Duplicate Primary Keys ({}): \n\n\t{}, \n\n\t{}",
            element_type,
            describe(existing, "Existing"),
            describe(element, "New")
        );
        DuplicateKeyError {
            element_type,
            existing_element: existing,
            new_element: element,
            message,
        }
        .into()
    }

    /// Queues a new element for validation.
    pub(super) fn mark_key_pending(&mut self, element_type: GraphElementType, element: u32) {
        if let Some(pending) = self.pending_keys[element_type.ordinal()].as_mut() {
            pending.add_to_back(element);
        }
    }

    /// Moves a validated element back to pending after a key value changed.
    pub(super) fn mark_key_dirty(&mut self, element_type: GraphElementType, element: u32) {
        let o = element_type.ordinal();
        if let Some(pending) = self.pending_keys[o].as_mut() {
            if pending.add_to_back(element) {
                if let Some(key_set) = self.key_sets[o].as_mut() {
                    key_set.remove(element);
                }
            }
        }
    }

    /// Drops a removed element from whichever of the two it was in.
    pub(super) fn forget_key(&mut self, element_type: GraphElementType, element: u32) {
        let o = element_type.ordinal();
        let was_pending = self.pending_keys[o]
            .as_mut()
            .is_some_and(|pending| pending.remove(element));
        if !was_pending {
            if let Some(key_set) = self.key_sets[o].as_mut() {
                key_set.remove(element);
            }
        }
    }
}
