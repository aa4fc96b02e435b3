//! Attribute lifecycle, metadata and value indices

use super::{AttributeSlot, StoreGraph};
use crate::graph::attribute::{AttributeDescription, GraphAttribute};
use crate::graph::error::{GraphError, GraphResult};
use crate::graph::native::NativeAttributeType;
use crate::graph::types::{GraphElementType, GraphIndexType, GraphOperationMode};
use crate::graph::value::AttributeValue;
use crate::index::{GraphIndexResult, NullGraphIndex};
use tracing::debug;

impl StoreGraph {
    /// Declares an attribute and returns its id.
    ///
    /// Declaring a name that already exists on `element_type` with the same
    /// type returns the existing id. `default_value` may be any value the
    /// attribute type can convert, for example a string for a float type.
    pub fn add_attribute(
        &mut self,
        element_type: GraphElementType,
        attribute_type: &str,
        name: &str,
        description: &str,
        default_value: &AttributeValue,
        merger_id: Option<&str>,
    ) -> GraphResult<u32> {
        let template = GraphAttribute {
            id: 0,
            element_type,
            attribute_type: attribute_type.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            default_value: default_value.clone(),
            merger_id: merger_id.map(str::to_string),
        };
        self.create_attribute(None, template)
    }

    /// Re-declares a removed attribute under its old id.
    pub fn restore_attribute(&mut self, attribute: &GraphAttribute) -> GraphResult<u32> {
        self.create_attribute(Some(attribute.id), attribute.clone())
    }

    fn create_attribute(
        &mut self,
        requested: Option<u32>,
        mut template: GraphAttribute,
    ) -> GraphResult<u32> {
        let element_type = template.element_type;
        let mut description = self
            .attribute_registry
            .create(&template.attribute_type)
            .ok_or_else(|| GraphError::UnknownAttributeType(template.attribute_type.clone()))?;

        if let Some(merger) = template.merger_id.as_deref() {
            if !self.merger_registry.contains(merger) {
                return Err(GraphError::UnknownAttributeMerger(merger.to_string()));
            }
        }

        if let Some(&existing) = self.attribute_names[element_type.ordinal()].get(&template.name) {
            let same_type = self
                .slot(existing)
                .is_ok_and(|slot| slot.metadata.attribute_type == template.attribute_type);
            if same_type {
                return Ok(existing);
            }
            return Err(GraphError::DuplicateAttributeLabel {
                element_type,
                label: template.name,
            });
        }

        if let Some(id) = requested {
            if self.attribute_store.element_exists(id) {
                return Err(GraphError::DuplicateAttributeId(id));
            }
        }

        description.set_default_value(&template.default_value)?;
        description.set_capacity(element_type.element_capacity(self));

        let id = match requested {
            None => {
                self.ensure_attribute_capacity(self.attribute_store.count() + 1);
                self.attribute_store.add()
            }
            Some(id) => {
                self.ensure_attribute_capacity(id as usize + 1);
                self.attribute_store.add_id(id);
                id
            }
        };
        self.bump_attributes();
        let uid = self.issue_uid();
        self.attribute_store.set_uid(id, uid);

        self.type_attributes
            .add_element(element_type.ordinal() as u32, id, 0);
        self.attribute_names[element_type.ordinal()].insert(template.name.clone(), id);

        template.id = id;
        template.default_value = description.default_value();
        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.add_attribute(&template);
        }
        debug!(
            attribute = id,
            %element_type,
            name = %template.name,
            attribute_type = %template.attribute_type,
            "added attribute"
        );
        self.attributes[id as usize] = Some(AttributeSlot {
            metadata: template,
            description,
            index_type: GraphIndexType::None,
            index: Box::new(NullGraphIndex),
            key_type: None,
            value_counter: 0,
        });
        Ok(id)
    }

    /// Removes an attribute that is not part of a primary key.
    pub fn remove_attribute(&mut self, attribute: u32) -> GraphResult<()> {
        let slot = self.slot(attribute)?;
        if slot.key_type.is_some() {
            return Err(GraphError::AttributeIsPrimaryKey(attribute));
        }
        let element_type = slot.metadata.element_type;

        if self.operation_mode == GraphOperationMode::Execute {
            for element in element_type.elements(self) {
                if !self.is_default_value(attribute, element)? {
                    self.clear_value(attribute, element)?;
                }
            }
        }

        let Some(slot) = self.attributes[attribute as usize].take() else {
            return Err(GraphError::AttributeNotFound(attribute));
        };
        self.attribute_store.remove(attribute);
        self.type_attributes.remove_element(attribute);
        let names = &mut self.attribute_names[element_type.ordinal()];
        if names.get(&slot.metadata.name) == Some(&attribute) {
            names.remove(&slot.metadata.name);
        }
        self.bump_attributes();

        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.remove_attribute(&slot.metadata);
        }
        debug!(attribute, %element_type, name = %slot.metadata.name, "removed attribute");
        Ok(())
    }

    pub fn update_attribute_name(&mut self, attribute: u32, new_name: &str) -> GraphResult<()> {
        let slot = self.slot(attribute)?;
        let element_type = slot.metadata.element_type;
        let old_name = slot.metadata.name.clone();
        let names = &mut self.attribute_names[element_type.ordinal()];
        if names.get(new_name).is_some_and(|&other| other != attribute) {
            return Err(GraphError::DuplicateAttributeLabel {
                element_type,
                label: new_name.to_string(),
            });
        }
        names.remove(&old_name);
        names.insert(new_name.to_string(), attribute);
        self.slot_mut(attribute)?.metadata.name = new_name.to_string();
        self.bump_attributes();

        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.update_attribute_name(attribute, &old_name, new_name);
        }
        Ok(())
    }

    pub fn update_attribute_description(
        &mut self,
        attribute: u32,
        new_description: &str,
    ) -> GraphResult<()> {
        let slot = self.slot_mut(attribute)?;
        let old_description =
            std::mem::replace(&mut slot.metadata.description, new_description.to_string());
        self.bump_attributes();

        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.update_attribute_description(attribute, &old_description, new_description);
        }
        Ok(())
    }

    /// Changes the default and resets every unused slot to it, so elements
    /// created later start from the new default.
    pub fn update_attribute_default_value(
        &mut self,
        attribute: u32,
        new_default: &AttributeValue,
    ) -> GraphResult<()> {
        let element_type = self.slot(attribute)?.metadata.element_type;
        let capacity = element_type.element_capacity(self);
        let unused: Vec<u32> = (0..capacity as u32)
            .filter(|&id| !element_type.element_exists(self, id))
            .collect();

        let slot = self.slot_mut(attribute)?;
        slot.description.set_default_value(new_default)?;
        let new_default = slot.description.default_value();
        let old_default = std::mem::replace(&mut slot.metadata.default_value, new_default.clone());
        for id in unused {
            slot.description.clear(id);
        }
        self.bump_attributes();

        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.update_attribute_default_value(attribute, &old_default, &new_default);
        }
        Ok(())
    }

    pub fn attribute_count(&self, element_type: GraphElementType) -> usize {
        self.type_attributes
            .element_count(element_type.ordinal() as u32)
    }

    /// The attribute of `element_type` at `position`.
    pub fn attribute_at(&self, element_type: GraphElementType, position: usize) -> Option<u32> {
        (position < self.attribute_count(element_type))
            .then(|| self.type_attributes.element(element_type.ordinal() as u32, position))
    }

    /// Attribute ids of `element_type`.
    pub fn attributes_of(&self, element_type: GraphElementType) -> Vec<u32> {
        self.type_attributes
            .elements(element_type.ordinal() as u32)
            .to_vec()
    }

    pub fn attribute_by_name(&self, element_type: GraphElementType, name: &str) -> Option<u32> {
        self.attribute_names[element_type.ordinal()].get(name).copied()
    }

    pub fn attribute_exists(&self, attribute: u32) -> bool {
        self.attribute_store.element_exists(attribute)
    }

    pub fn attribute_capacity(&self) -> usize {
        self.attribute_store.capacity()
    }

    pub fn attribute_uid(&self, attribute: u32) -> Option<i64> {
        self.attribute_exists(attribute)
            .then(|| self.attribute_store.uid(attribute))
    }

    /// A copy of the attribute's metadata.
    pub fn attribute(&self, attribute: u32) -> GraphResult<GraphAttribute> {
        Ok(self.slot(attribute)?.metadata.clone())
    }

    pub fn attribute_name(&self, attribute: u32) -> GraphResult<&str> {
        Ok(&self.slot(attribute)?.metadata.name)
    }

    pub fn attribute_type(&self, attribute: u32) -> GraphResult<&str> {
        Ok(&self.slot(attribute)?.metadata.attribute_type)
    }

    pub fn attribute_description(&self, attribute: u32) -> GraphResult<&str> {
        Ok(&self.slot(attribute)?.metadata.description)
    }

    pub fn attribute_default_value(&self, attribute: u32) -> GraphResult<AttributeValue> {
        Ok(self.slot(attribute)?.metadata.default_value.clone())
    }

    pub fn attribute_merger(&self, attribute: u32) -> GraphResult<Option<String>> {
        Ok(self.slot(attribute)?.metadata.merger_id.clone())
    }

    pub fn attribute_element_type(&self, attribute: u32) -> GraphResult<GraphElementType> {
        Ok(self.slot(attribute)?.metadata.element_type)
    }

    pub fn native_attribute_type(&self, attribute: u32) -> GraphResult<NativeAttributeType> {
        Ok(self.slot(attribute)?.description.native_type())
    }

    /// Every slot's value, for a whole-attribute snapshot.
    pub fn copy_attribute(&self, attribute: u32) -> GraphResult<Vec<AttributeValue>> {
        Ok(self.slot(attribute)?.description.save_data())
    }

    /// Puts back a snapshot taken with [`copy_attribute`](Self::copy_attribute).
    pub fn restore_attribute_data(
        &mut self,
        attribute: u32,
        data: &[AttributeValue],
    ) -> GraphResult<()> {
        self.slot_mut(attribute)?.description.restore_data(data)?;
        self.rebuild_index(attribute)?;
        let increment = self.increment();
        self.slot_mut(attribute)?.value_counter += increment;
        self.global_counter += increment;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Indices
    // ---------------------------------------------------------------------

    pub fn attribute_supports_index_type(
        &self,
        attribute: u32,
        index_type: GraphIndexType,
    ) -> GraphResult<bool> {
        Ok(self.slot(attribute)?.description.supports_index_type(index_type))
    }

    pub fn attribute_index_type(&self, attribute: u32) -> GraphResult<GraphIndexType> {
        Ok(self.slot(attribute)?.index_type)
    }

    /// Switches the attribute to a new kind of index, filled from the
    /// current values. Index types the attribute cannot support are ignored.
    pub fn set_attribute_index_type(
        &mut self,
        attribute: u32,
        index_type: GraphIndexType,
    ) -> GraphResult<()> {
        let slot = self.slot(attribute)?;
        let old_index_type = slot.index_type;
        if index_type == old_index_type {
            return Ok(());
        }
        if !slot.description.supports_index_type(index_type) {
            debug!(attribute, %index_type, "index type not supported");
            return Ok(());
        }

        let slot = self.slot_mut(attribute)?;
        slot.index_type = index_type;
        slot.index = slot.description.create_index(index_type);
        self.rebuild_index(attribute)?;

        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.set_attribute_index_type(attribute, old_index_type, index_type);
        }
        debug!(attribute, from = %old_index_type, to = %index_type, "changed index type");
        Ok(())
    }

    /// Elements holding `value`, or `None` when the attribute has no index
    /// able to answer.
    pub fn elements_with_attribute_value(
        &self,
        attribute: u32,
        value: &AttributeValue,
    ) -> GraphResult<Option<GraphIndexResult>> {
        Ok(self.slot(attribute)?.index.elements_with_value(value))
    }

    /// Elements whose value lies in `[start, end]`, or `None` without an
    /// ordered index.
    pub fn elements_with_attribute_value_range(
        &self,
        attribute: u32,
        start: &AttributeValue,
        end: &AttributeValue,
    ) -> GraphResult<Option<GraphIndexResult>> {
        Ok(self.slot(attribute)?.index.elements_in_range(start, end))
    }

    fn rebuild_index(&mut self, attribute: u32) -> GraphResult<()> {
        let element_type = self.slot(attribute)?.metadata.element_type;
        let elements = element_type.elements(self);
        let slot = self.slot_mut(attribute)?;
        if slot.index_type == GraphIndexType::None {
            return Ok(());
        }
        let capacity = slot.description.capacity();
        slot.index = slot.description.create_index(slot.index_type);
        slot.index.expand_capacity(capacity);
        for element in elements {
            let value = slot.description.get_object(element);
            slot.index.add_element(element, &value);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Helpers shared with the structure and value code
    // ---------------------------------------------------------------------

    pub(super) fn slot(&self, attribute: u32) -> GraphResult<&AttributeSlot> {
        self.attributes
            .get(attribute as usize)
            .and_then(Option::as_ref)
            .ok_or(GraphError::AttributeNotFound(attribute))
    }

    pub(super) fn slot_mut(&mut self, attribute: u32) -> GraphResult<&mut AttributeSlot> {
        self.attributes
            .get_mut(attribute as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::AttributeNotFound(attribute))
    }

    pub(super) fn add_element_to_indices(&mut self, element_type: GraphElementType, element: u32) {
        for attribute in self.attributes_of(element_type) {
            if let Some(slot) = self.attributes[attribute as usize].as_mut() {
                if slot.index_type != GraphIndexType::None {
                    let value = slot.description.get_object(element);
                    slot.index.add_element(element, &value);
                }
            }
        }
    }

    pub(super) fn remove_element_from_indices(
        &mut self,
        element_type: GraphElementType,
        element: u32,
    ) {
        for attribute in self.attributes_of(element_type) {
            if let Some(slot) = self.attributes[attribute as usize].as_mut() {
                slot.index.remove_element(element);
            }
        }
    }

    /// Clears every non-default value the element holds.
    pub(super) fn clear_element_values(
        &mut self,
        element_type: GraphElementType,
        element: u32,
    ) -> GraphResult<()> {
        for attribute in self.attributes_of(element_type) {
            if !self.is_default_value(attribute, element)? {
                self.clear_value(attribute, element)?;
            }
        }
        Ok(())
    }

    /// Puts the element's slots back to their defaults without reporting
    /// anything. Used for links and edges, which leave no edit record.
    pub(super) fn reset_element_values(&mut self, element_type: GraphElementType, element: u32) {
        for attribute in self.attributes_of(element_type) {
            if let Some(slot) = self.attributes[attribute as usize].as_mut() {
                slot.description.clear(element);
            }
        }
    }

    pub(super) fn expand_attribute_element_capacity(
        &mut self,
        element_type: GraphElementType,
        capacity: usize,
    ) {
        for attribute in self.attributes_of(element_type) {
            if let Some(slot) = self.attributes[attribute as usize].as_mut() {
                slot.description.set_capacity(capacity);
                slot.index.expand_capacity(capacity);
            }
        }
        let o = element_type.ordinal();
        if let Some(key_set) = self.key_sets[o].as_mut() {
            key_set.ensure_capacity(capacity);
        }
        if let Some(pending) = self.pending_keys[o].as_mut() {
            pending.ensure_capacity(capacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edit::{EditLog, EditOperation};

    #[test]
    fn test_add_attribute_is_idempotent_for_same_type() {
        let mut graph = StoreGraph::new();
        let a = graph
            .add_attribute(GraphElementType::Vertex, "string", "Name", "", &AttributeValue::Null, None)
            .unwrap();
        let b = graph
            .add_attribute(GraphElementType::Vertex, "string", "Name", "again", &AttributeValue::Null, None)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(graph.attribute_count(GraphElementType::Vertex), 1);

        let err = graph
            .add_attribute(GraphElementType::Vertex, "integer", "Name", "", &AttributeValue::Null, None)
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateAttributeLabel { .. }));

        // Same label on another element type is a separate attribute.
        let t = graph
            .add_attribute(GraphElementType::Transaction, "integer", "Name", "", &AttributeValue::Null, None)
            .unwrap();
        assert_ne!(t, a);
    }

    #[test]
    fn test_add_attribute_rejects_unknown_names() {
        let mut graph = StoreGraph::new();
        let err = graph
            .add_attribute(GraphElementType::Vertex, "colour", "c", "", &AttributeValue::Null, None)
            .unwrap_err();
        assert_eq!(err, GraphError::UnknownAttributeType("colour".to_string()));

        let err = graph
            .add_attribute(GraphElementType::Vertex, "string", "c", "", &AttributeValue::Null, Some("sum"))
            .unwrap_err();
        assert_eq!(err, GraphError::UnknownAttributeMerger("sum".to_string()));
        assert_eq!(graph.attribute_count(GraphElementType::Vertex), 0);
    }

    #[test]
    fn test_default_value_parsed_from_text() {
        let mut graph = StoreGraph::new();
        let attr = graph
            .add_attribute(GraphElementType::Vertex, "float", "weight", "", &AttributeValue::from("2.5"), None)
            .unwrap();
        assert_eq!(graph.attribute_default_value(attr).unwrap(), AttributeValue::Float(2.5));
        let v = graph.add_vertex();
        assert_eq!(graph.float_value(attr, v).unwrap(), 2.5);
    }

    #[test]
    fn test_update_default_only_touches_unused_slots() {
        let mut graph = StoreGraph::new();
        let attr = graph
            .add_attribute(GraphElementType::Vertex, "integer", "n", "", &AttributeValue::Int(1), None)
            .unwrap();
        let v = graph.add_vertex();
        graph
            .update_attribute_default_value(attr, &AttributeValue::Int(5))
            .unwrap();
        assert_eq!(graph.int_value(attr, v).unwrap(), 1);
        let w = graph.add_vertex();
        assert_eq!(graph.int_value(attr, w).unwrap(), 5);
    }

    #[test]
    fn test_rename_updates_lookup() {
        let mut graph = StoreGraph::new();
        let attr = graph
            .add_attribute(GraphElementType::Vertex, "string", "old", "", &AttributeValue::Null, None)
            .unwrap();
        graph.update_attribute_name(attr, "new").unwrap();
        assert_eq!(graph.attribute_by_name(GraphElementType::Vertex, "old"), None);
        assert_eq!(graph.attribute_by_name(GraphElementType::Vertex, "new"), Some(attr));
        assert_eq!(graph.attribute_name(attr).unwrap(), "new");
    }

    #[test]
    fn test_remove_attribute_logs_and_frees_id() {
        let mut graph = StoreGraph::new();
        let log = EditLog::new();
        let attr = graph
            .add_attribute(GraphElementType::Vertex, "string", "label", "", &AttributeValue::Null, None)
            .unwrap();
        let v = graph.add_vertex();
        graph.set_string_value(attr, v, Some("x")).unwrap();

        graph.set_graph_edit(Some(Box::new(log.clone())));
        graph.remove_attribute(attr).unwrap();
        assert!(!graph.attribute_exists(attr));
        assert_eq!(graph.attribute_count(GraphElementType::Vertex), 0);

        let ops = log.operations();
        assert!(matches!(ops[0], EditOperation::SetValue { .. }));
        assert!(matches!(ops[1], EditOperation::RemoveAttribute(_)));

        log.undo(&mut graph).unwrap();
        assert!(graph.attribute_exists(attr));
        assert_eq!(graph.string_value(attr, v).unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_ordered_index_range() {
        let mut graph = StoreGraph::new();
        let attr = graph
            .add_attribute(GraphElementType::Vertex, "integer", "age", "", &AttributeValue::Null, None)
            .unwrap();
        let vertices: Vec<u32> = (0..5).map(|_| graph.add_vertex()).collect();
        for (i, &v) in vertices.iter().enumerate() {
            graph.set_int_value(attr, v, i as i32 * 10).unwrap();
        }
        assert!(graph
            .elements_with_attribute_value_range(attr, &10.into(), &30.into())
            .unwrap()
            .is_none());

        graph
            .set_attribute_index_type(attr, GraphIndexType::Ordered)
            .unwrap();
        let hits = graph
            .elements_with_attribute_value_range(attr, &AttributeValue::Int(10), &AttributeValue::Int(30))
            .unwrap()
            .unwrap();
        assert_eq!(hits.into_vec(), vec![vertices[1], vertices[2], vertices[3]]);

        graph.set_int_value(attr, vertices[2], 99).unwrap();
        let hits = graph
            .elements_with_attribute_value(attr, &AttributeValue::Int(99))
            .unwrap()
            .unwrap();
        assert_eq!(hits.into_vec(), vec![vertices[2]]);

        let late = graph.add_vertex();
        let hits = graph
            .elements_with_attribute_value(attr, &AttributeValue::Int(0))
            .unwrap()
            .unwrap();
        assert!(hits.contains(late));
    }

    #[test]
    fn test_boolean_refuses_ordered_index() {
        let mut graph = StoreGraph::new();
        let attr = graph
            .add_attribute(GraphElementType::Vertex, "boolean", "selected", "", &AttributeValue::Null, None)
            .unwrap();
        assert!(!graph
            .attribute_supports_index_type(attr, GraphIndexType::Ordered)
            .unwrap());
        graph
            .set_attribute_index_type(attr, GraphIndexType::Ordered)
            .unwrap();
        assert_eq!(graph.attribute_index_type(attr).unwrap(), GraphIndexType::None);
    }

    #[test]
    fn test_copy_and_restore_attribute_data() {
        let mut graph = StoreGraph::new();
        let attr = graph
            .add_attribute(GraphElementType::Vertex, "long", "n", "", &AttributeValue::Null, None)
            .unwrap();
        let v = graph.add_vertex();
        graph.set_long_value(attr, v, 7).unwrap();
        let saved = graph.copy_attribute(attr).unwrap();
        graph.set_long_value(attr, v, 8).unwrap();
        graph.restore_attribute_data(attr, &saved).unwrap();
        assert_eq!(graph.long_value(attr, v).unwrap(), 7);
    }
}
