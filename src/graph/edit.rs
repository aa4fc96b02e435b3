//! Change reporting for undo and redo
//!
//! A [`GraphEdit`] attached to a store hears about every change that
//! actually happened, one callback per change kind. [`EditLog`] is a
//! recording sink that can replay what it heard backwards (undo) or
//! forwards (redo) against a store.

use super::attribute::GraphAttribute;
use super::error::GraphResult;
use super::native::NativeValue;
use super::store::StoreGraph;
use super::types::{GraphElementType, GraphIndexType, GraphOperationMode};
use super::value::AttributeValue;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub trait GraphEdit: Send {
    fn set_primary_key(&mut self, element_type: GraphElementType, old_keys: &[u32], new_keys: &[u32]);

    fn add_vertex(&mut self, vertex: u32);

    fn remove_vertex(&mut self, vertex: u32);

    fn add_transaction(&mut self, source: u32, destination: u32, directed: bool, transaction: u32);

    fn remove_transaction(&mut self, source: u32, destination: u32, directed: bool, transaction: u32);

    /// `reversed` is set when the new endpoint forced an undirected
    /// transaction's endpoints to swap.
    fn set_transaction_source_vertex(
        &mut self,
        transaction: u32,
        old_source: u32,
        new_source: u32,
        reversed: bool,
    );

    fn set_transaction_destination_vertex(
        &mut self,
        transaction: u32,
        old_destination: u32,
        new_destination: u32,
        reversed: bool,
    );

    fn add_attribute(&mut self, attribute: &GraphAttribute);

    fn remove_attribute(&mut self, attribute: &GraphAttribute);

    fn update_attribute_name(&mut self, attribute: u32, old_name: &str, new_name: &str);

    fn update_attribute_description(
        &mut self,
        attribute: u32,
        old_description: &str,
        new_description: &str,
    );

    fn update_attribute_default_value(
        &mut self,
        attribute: u32,
        old_default: &AttributeValue,
        new_default: &AttributeValue,
    );

    fn set_attribute_index_type(&mut self, attribute: u32, old: GraphIndexType, new: GraphIndexType);

    fn set_byte_value(&mut self, attribute: u32, id: u32, old: i8, new: i8);

    fn set_short_value(&mut self, attribute: u32, id: u32, old: i16, new: i16);

    fn set_int_value(&mut self, attribute: u32, id: u32, old: i32, new: i32);

    fn set_long_value(&mut self, attribute: u32, id: u32, old: i64, new: i64);

    fn set_float_value(&mut self, attribute: u32, id: u32, old: f32, new: f32);

    fn set_double_value(&mut self, attribute: u32, id: u32, old: f64, new: f64);

    fn set_boolean_value(&mut self, attribute: u32, id: u32, old: bool, new: bool);

    fn set_char_value(&mut self, attribute: u32, id: u32, old: char, new: char);

    fn set_object_value(&mut self, attribute: u32, id: u32, old: AttributeValue, new: AttributeValue);
}

/// One recorded change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EditOperation {
    SetPrimaryKey {
        element_type: GraphElementType,
        old_keys: Vec<u32>,
        new_keys: Vec<u32>,
    },
    AddVertex(u32),
    RemoveVertex(u32),
    AddTransaction {
        source: u32,
        destination: u32,
        directed: bool,
        transaction: u32,
    },
    RemoveTransaction {
        source: u32,
        destination: u32,
        directed: bool,
        transaction: u32,
    },
    SetTransactionSource {
        transaction: u32,
        old_vertex: u32,
        new_vertex: u32,
        reversed: bool,
    },
    SetTransactionDestination {
        transaction: u32,
        old_vertex: u32,
        new_vertex: u32,
        reversed: bool,
    },
    AddAttribute(GraphAttribute),
    RemoveAttribute(GraphAttribute),
    UpdateAttributeName {
        attribute: u32,
        old: String,
        new: String,
    },
    UpdateAttributeDescription {
        attribute: u32,
        old: String,
        new: String,
    },
    UpdateAttributeDefaultValue {
        attribute: u32,
        old: AttributeValue,
        new: AttributeValue,
    },
    SetAttributeIndexType {
        attribute: u32,
        old: GraphIndexType,
        new: GraphIndexType,
    },
    SetValue {
        attribute: u32,
        id: u32,
        old: NativeValue,
        new: NativeValue,
    },
}

impl EditOperation {
    /// Applies the inverse of this change.
    pub fn undo(&self, graph: &mut StoreGraph) -> GraphResult<()> {
        match self {
            EditOperation::SetPrimaryKey {
                element_type,
                old_keys,
                ..
            } => graph.set_primary_key(*element_type, old_keys),
            EditOperation::AddVertex(vertex) => graph.remove_vertex(*vertex),
            EditOperation::RemoveVertex(vertex) => graph.add_vertex_with_id(*vertex).map(|_| ()),
            EditOperation::AddTransaction { transaction, .. } => {
                graph.remove_transaction(*transaction)
            }
            EditOperation::RemoveTransaction {
                source,
                destination,
                directed,
                transaction,
            } => graph
                .add_transaction_with_id(*transaction, *source, *destination, *directed)
                .map(|_| ()),
            // A reversed change left the new vertex at the other end.
            EditOperation::SetTransactionSource {
                transaction,
                old_vertex,
                reversed,
                ..
            } => {
                if *reversed {
                    graph.set_transaction_destination_vertex(*transaction, *old_vertex)
                } else {
                    graph.set_transaction_source_vertex(*transaction, *old_vertex)
                }
            }
            EditOperation::SetTransactionDestination {
                transaction,
                old_vertex,
                reversed,
                ..
            } => {
                if *reversed {
                    graph.set_transaction_source_vertex(*transaction, *old_vertex)
                } else {
                    graph.set_transaction_destination_vertex(*transaction, *old_vertex)
                }
            }
            EditOperation::AddAttribute(attribute) => graph.remove_attribute(attribute.id),
            EditOperation::RemoveAttribute(attribute) => {
                graph.restore_attribute(attribute).map(|_| ())
            }
            EditOperation::UpdateAttributeName { attribute, old, .. } => {
                graph.update_attribute_name(*attribute, old)
            }
            EditOperation::UpdateAttributeDescription { attribute, old, .. } => {
                graph.update_attribute_description(*attribute, old)
            }
            EditOperation::UpdateAttributeDefaultValue { attribute, old, .. } => {
                graph.update_attribute_default_value(*attribute, old)
            }
            EditOperation::SetAttributeIndexType { attribute, old, .. } => {
                graph.set_attribute_index_type(*attribute, *old)
            }
            EditOperation::SetValue {
                attribute, id, old, ..
            } => graph.set_native_value(*attribute, *id, old.clone()),
        }
    }

    /// Applies this change again.
    pub fn redo(&self, graph: &mut StoreGraph) -> GraphResult<()> {
        match self {
            EditOperation::SetPrimaryKey {
                element_type,
                new_keys,
                ..
            } => graph.set_primary_key(*element_type, new_keys),
            EditOperation::AddVertex(vertex) => graph.add_vertex_with_id(*vertex).map(|_| ()),
            EditOperation::RemoveVertex(vertex) => graph.remove_vertex(*vertex),
            EditOperation::AddTransaction {
                source,
                destination,
                directed,
                transaction,
            } => graph
                .add_transaction_with_id(*transaction, *source, *destination, *directed)
                .map(|_| ()),
            EditOperation::RemoveTransaction { transaction, .. } => {
                graph.remove_transaction(*transaction)
            }
            EditOperation::SetTransactionSource {
                transaction,
                new_vertex,
                ..
            } => graph.set_transaction_source_vertex(*transaction, *new_vertex),
            EditOperation::SetTransactionDestination {
                transaction,
                new_vertex,
                ..
            } => graph.set_transaction_destination_vertex(*transaction, *new_vertex),
            EditOperation::AddAttribute(attribute) => {
                graph.restore_attribute(attribute).map(|_| ())
            }
            EditOperation::RemoveAttribute(attribute) => graph.remove_attribute(attribute.id),
            EditOperation::UpdateAttributeName { attribute, new, .. } => {
                graph.update_attribute_name(*attribute, new)
            }
            EditOperation::UpdateAttributeDescription { attribute, new, .. } => {
                graph.update_attribute_description(*attribute, new)
            }
            EditOperation::UpdateAttributeDefaultValue { attribute, new, .. } => {
                graph.update_attribute_default_value(*attribute, new)
            }
            EditOperation::SetAttributeIndexType { attribute, new, .. } => {
                graph.set_attribute_index_type(*attribute, *new)
            }
            EditOperation::SetValue {
                attribute, id, new, ..
            } => graph.set_native_value(*attribute, *id, new.clone()),
        }
    }
}

/// A recording edit sink.
///
/// Clones share the same record, so one handle can be attached to a graph
/// while another is kept to inspect or replay the changes.
#[derive(Debug, Clone, Default)]
pub struct EditLog {
    operations: Arc<Mutex<Vec<EditOperation>>>,
}

impl EditLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self) -> MutexGuard<'_, Vec<EditOperation>> {
        self.operations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, operation: EditOperation) {
        self.record().push(operation);
    }

    pub fn len(&self) -> usize {
        self.record().len()
    }

    pub fn is_empty(&self) -> bool {
        self.record().is_empty()
    }

    pub fn operations(&self) -> Vec<EditOperation> {
        self.record().clone()
    }

    pub fn clear(&self) {
        self.record().clear();
    }

    /// Reverts every recorded change, newest first, in UNDO mode.
    pub fn undo(&self, graph: &mut StoreGraph) -> GraphResult<()> {
        let operations = self.operations();
        debug!(operations = operations.len(), "undoing edit log");
        replay(graph, GraphOperationMode::Undo, |graph| {
            operations.iter().rev().try_for_each(|op| op.undo(graph))
        })
    }

    /// Re-applies every recorded change, oldest first, in REDO mode.
    pub fn redo(&self, graph: &mut StoreGraph) -> GraphResult<()> {
        let operations = self.operations();
        debug!(operations = operations.len(), "redoing edit log");
        replay(graph, GraphOperationMode::Redo, |graph| {
            operations.iter().try_for_each(|op| op.redo(graph))
        })
    }
}

/// Runs `apply` with the given mode and no edit sink attached, then puts the
/// graph's own mode and sink back.
fn replay<F>(graph: &mut StoreGraph, mode: GraphOperationMode, apply: F) -> GraphResult<()>
where
    F: FnOnce(&mut StoreGraph) -> GraphResult<()>,
{
    let sink = graph.take_graph_edit();
    let previous = graph.operation_mode();
    graph.set_operation_mode(mode);
    let result = apply(graph);
    graph.set_operation_mode(previous);
    graph.set_graph_edit(sink);
    result
}

impl GraphEdit for EditLog {
    fn set_primary_key(&mut self, element_type: GraphElementType, old_keys: &[u32], new_keys: &[u32]) {
        self.push(EditOperation::SetPrimaryKey {
            element_type,
            old_keys: old_keys.to_vec(),
            new_keys: new_keys.to_vec(),
        });
    }

    fn add_vertex(&mut self, vertex: u32) {
        self.push(EditOperation::AddVertex(vertex));
    }

    fn remove_vertex(&mut self, vertex: u32) {
        self.push(EditOperation::RemoveVertex(vertex));
    }

    fn add_transaction(&mut self, source: u32, destination: u32, directed: bool, transaction: u32) {
        self.push(EditOperation::AddTransaction {
            source,
            destination,
            directed,
            transaction,
        });
    }

    fn remove_transaction(&mut self, source: u32, destination: u32, directed: bool, transaction: u32) {
        self.push(EditOperation::RemoveTransaction {
            source,
            destination,
            directed,
            transaction,
        });
    }

    fn set_transaction_source_vertex(
        &mut self,
        transaction: u32,
        old_source: u32,
        new_source: u32,
        reversed: bool,
    ) {
        self.push(EditOperation::SetTransactionSource {
            transaction,
            old_vertex: old_source,
            new_vertex: new_source,
            reversed,
        });
    }

    fn set_transaction_destination_vertex(
        &mut self,
        transaction: u32,
        old_destination: u32,
        new_destination: u32,
        reversed: bool,
    ) {
        self.push(EditOperation::SetTransactionDestination {
            transaction,
            old_vertex: old_destination,
            new_vertex: new_destination,
            reversed,
        });
    }

    fn add_attribute(&mut self, attribute: &GraphAttribute) {
        self.push(EditOperation::AddAttribute(attribute.clone()));
    }

    fn remove_attribute(&mut self, attribute: &GraphAttribute) {
        self.push(EditOperation::RemoveAttribute(attribute.clone()));
    }

    fn update_attribute_name(&mut self, attribute: u32, old_name: &str, new_name: &str) {
        self.push(EditOperation::UpdateAttributeName {
            attribute,
            old: old_name.to_string(),
            new: new_name.to_string(),
        });
    }

    fn update_attribute_description(
        &mut self,
        attribute: u32,
        old_description: &str,
        new_description: &str,
    ) {
        self.push(EditOperation::UpdateAttributeDescription {
            attribute,
            old: old_description.to_string(),
            new: new_description.to_string(),
        });
    }

    fn update_attribute_default_value(
        &mut self,
        attribute: u32,
        old_default: &AttributeValue,
        new_default: &AttributeValue,
    ) {
        self.push(EditOperation::UpdateAttributeDefaultValue {
            attribute,
            old: old_default.clone(),
            new: new_default.clone(),
        });
    }

    fn set_attribute_index_type(&mut self, attribute: u32, old: GraphIndexType, new: GraphIndexType) {
        self.push(EditOperation::SetAttributeIndexType { attribute, old, new });
    }

    fn set_byte_value(&mut self, attribute: u32, id: u32, old: i8, new: i8) {
        self.push(set_value(attribute, id, NativeValue::Byte(old), NativeValue::Byte(new)));
    }

    fn set_short_value(&mut self, attribute: u32, id: u32, old: i16, new: i16) {
        self.push(set_value(attribute, id, NativeValue::Short(old), NativeValue::Short(new)));
    }

    fn set_int_value(&mut self, attribute: u32, id: u32, old: i32, new: i32) {
        self.push(set_value(attribute, id, NativeValue::Int(old), NativeValue::Int(new)));
    }

    fn set_long_value(&mut self, attribute: u32, id: u32, old: i64, new: i64) {
        self.push(set_value(attribute, id, NativeValue::Long(old), NativeValue::Long(new)));
    }

    fn set_float_value(&mut self, attribute: u32, id: u32, old: f32, new: f32) {
        self.push(set_value(attribute, id, NativeValue::Float(old), NativeValue::Float(new)));
    }

    fn set_double_value(&mut self, attribute: u32, id: u32, old: f64, new: f64) {
        self.push(set_value(attribute, id, NativeValue::Double(old), NativeValue::Double(new)));
    }

    fn set_boolean_value(&mut self, attribute: u32, id: u32, old: bool, new: bool) {
        self.push(set_value(attribute, id, NativeValue::Boolean(old), NativeValue::Boolean(new)));
    }

    fn set_char_value(&mut self, attribute: u32, id: u32, old: char, new: char) {
        self.push(set_value(attribute, id, NativeValue::Char(old), NativeValue::Char(new)));
    }

    fn set_object_value(&mut self, attribute: u32, id: u32, old: AttributeValue, new: AttributeValue) {
        self.push(set_value(attribute, id, NativeValue::Object(old), NativeValue::Object(new)));
    }
}

fn set_value(attribute: u32, id: u32, old: NativeValue, new: NativeValue) -> EditOperation {
    EditOperation::SetValue {
        attribute,
        id,
        old,
        new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_record() {
        let log = EditLog::new();
        let mut sink = log.clone();
        sink.add_vertex(3);
        sink.set_int_value(0, 3, 1, 2);
        assert_eq!(log.len(), 2);
        assert!(matches!(log.operations()[0], EditOperation::AddVertex(3)));
        log.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_operations_serialize() {
        let mut log = EditLog::new();
        log.set_object_value(1, 2, AttributeValue::Null, AttributeValue::from("x"));
        let json = serde_json::to_string(&log.operations()).unwrap();
        let back: Vec<EditOperation> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
    }
}
