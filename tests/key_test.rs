use std::sync::Arc;
use storegraph::graph::{
    AttributeValue, GraphElementMerger, GraphElementType, GraphError, GraphResult, StoreGraph,
};

/// Keeps the first element and deletes the second.
#[derive(Debug)]
struct DropSecond;

impl GraphElementMerger for DropSecond {
    fn merge_element(
        &self,
        graph: &mut StoreGraph,
        element_type: GraphElementType,
        _survivor: u32,
        loser: u32,
    ) -> GraphResult<bool> {
        element_type.remove_element(graph, loser)?;
        Ok(true)
    }
}

/// Claims success without removing anything.
#[derive(Debug)]
struct Liar;

impl GraphElementMerger for Liar {
    fn merge_element(
        &self,
        _graph: &mut StoreGraph,
        _element_type: GraphElementType,
        _survivor: u32,
        _loser: u32,
    ) -> GraphResult<bool> {
        Ok(true)
    }
}

fn two_named(graph: &mut StoreGraph) -> (u32, u32, u32) {
    let name = graph
        .add_attribute(GraphElementType::Vertex, "string", "Name", "", &AttributeValue::Null, None)
        .unwrap();
    let a = graph.add_vertex();
    let b = graph.add_vertex();
    graph.set_string_value(name, a, Some("Alice")).unwrap();
    graph.set_string_value(name, b, Some("Alice")).unwrap();
    graph.set_primary_key(GraphElementType::Vertex, &[name]).unwrap();
    (name, a, b)
}

#[test]
fn test_duplicate_names_fail_validation() {
    let mut graph = StoreGraph::new();
    let (_, a, b) = two_named(&mut graph);

    match graph.validate_key(GraphElementType::Vertex, false) {
        Err(GraphError::DuplicateKey(e)) => {
            assert_eq!(e.element_type, GraphElementType::Vertex);
            assert_eq!(e.existing_element, a);
            assert_eq!(e.new_element, b);
            assert!(e.message.contains("Existing[0]: Name = Alice"));
            assert!(e.message.contains("New[1]: Name = Alice"));
        }
        other => panic!("expected a duplicate key error, got {other:?}"),
    }
    assert_eq!(graph.vertex_count(), 2);
}

#[test]
fn test_merger_resolves_duplicates() {
    let mut graph = StoreGraph::new();
    graph.set_element_merger(Some(Arc::new(DropSecond)));
    let (name, a, b) = two_named(&mut graph);

    graph.validate_key(GraphElementType::Vertex, true).unwrap();
    assert_eq!(graph.vertex_count(), 1);
    assert!(graph.vertex_exists(a));
    assert!(!graph.vertex_exists(b));
    let remaining: Vec<u32> = graph
        .vertices()
        .filter(|&v| graph.string_value(name, v).unwrap().as_deref() == Some("Alice"))
        .collect();
    assert_eq!(remaining, vec![a]);
}

#[test]
fn test_merging_not_allowed_ignores_merger() {
    let mut graph = StoreGraph::new();
    graph.set_element_merger(Some(Arc::new(DropSecond)));
    two_named(&mut graph);
    assert!(graph.validate_key(GraphElementType::Vertex, false).is_err());
    assert_eq!(graph.vertex_count(), 2);
}

#[test]
fn test_merger_that_removes_nothing_is_an_error() {
    let mut graph = StoreGraph::new();
    graph.set_element_merger(Some(Arc::new(Liar)));
    two_named(&mut graph);
    assert!(matches!(
        graph.validate_key(GraphElementType::Vertex, true),
        Err(GraphError::DuplicateKey(_))
    ));
}

#[test]
fn test_schema_merger_is_used() {
    #[derive(Debug)]
    struct MergingSchema;

    impl storegraph::graph::Schema for MergingSchema {
        fn element_merger(&self) -> Option<Arc<dyn GraphElementMerger>> {
            Some(Arc::new(DropSecond))
        }
    }

    let mut graph = StoreGraph::builder(Default::default())
        .schema(Arc::new(MergingSchema))
        .build();
    two_named(&mut graph);
    graph.validate_keys().unwrap();
    assert_eq!(graph.vertex_count(), 1);
}

#[test]
fn test_attribute_mergers_apply_before_removal() {
    let mut graph = StoreGraph::new();
    graph.set_element_merger(Some(Arc::new(storegraph::graph::KeepFirstElementMerger)));
    let (_, a, b) = two_named(&mut graph);
    let notes = graph
        .add_attribute(GraphElementType::Vertex, "string", "Notes", "", &AttributeValue::Null, Some("concatenate"))
        .unwrap();
    let score = graph
        .add_attribute(GraphElementType::Vertex, "integer", "Score", "", &AttributeValue::Null, Some("replace"))
        .unwrap();
    graph.set_string_value(notes, a, Some("first")).unwrap();
    graph.set_string_value(notes, b, Some("second")).unwrap();
    graph.set_int_value(score, b, 7).unwrap();

    graph.validate_keys().unwrap();
    assert!(!graph.vertex_exists(b));
    assert_eq!(graph.string_value(notes, a).unwrap().as_deref(), Some("first, second"));
    assert_eq!(graph.int_value(score, a).unwrap(), 7);
}

#[test]
fn test_primary_key_value() {
    let mut graph = StoreGraph::new();
    let (name, a, _) = two_named(&mut graph);
    let key = graph
        .primary_key_value(GraphElementType::Vertex, a)
        .unwrap()
        .unwrap();
    assert_eq!(key.values, vec![AttributeValue::from("Alice")]);
    assert_eq!(graph.primary_key(GraphElementType::Vertex), vec![name]);
    assert!(graph
        .primary_key_value(GraphElementType::Transaction, 0)
        .unwrap()
        .is_none());
}

#[test]
fn test_validate_single_element() {
    let mut graph = StoreGraph::new();
    let (name, a, b) = two_named(&mut graph);
    graph.set_string_value(name, b, Some("Bob")).unwrap();

    graph.validate_key_element(GraphElementType::Vertex, b, false).unwrap();
    assert_eq!(graph.pending_key_count(GraphElementType::Vertex), 1);
    graph.validate_key_element(GraphElementType::Vertex, a, false).unwrap();
    assert_eq!(graph.pending_key_count(GraphElementType::Vertex), 0);
}

#[test]
fn test_new_links_are_pending_until_validated() {
    let mut graph = StoreGraph::new();
    let key = graph
        .add_attribute(GraphElementType::Link, "string", "k", "", &AttributeValue::Null, None)
        .unwrap();
    graph.set_primary_key(GraphElementType::Link, &[key]).unwrap();

    let a = graph.add_vertex();
    let b = graph.add_vertex();
    let c = graph.add_vertex();
    graph.add_transaction(a, b, true).unwrap();
    let bc = graph.add_transaction(b, c, true).unwrap();
    assert_eq!(graph.link_count(), 2);
    assert_eq!(graph.pending_key_count(GraphElementType::Link), 2);

    // Both links carry a null key.
    let err = graph.validate_key(GraphElementType::Link, false).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateKey(_)));
    assert_eq!(graph.pending_key_count(GraphElementType::Link), 1);

    // Retiring the clashing link drops it from the pending list.
    graph.remove_transaction(bc).unwrap();
    assert_eq!(graph.pending_key_count(GraphElementType::Link), 0);
    graph.validate_key(GraphElementType::Link, false).unwrap();
}

#[test]
fn test_retired_link_leaves_the_key_set() {
    let mut graph = StoreGraph::new();
    let key = graph
        .add_attribute(GraphElementType::Link, "string", "k", "", &AttributeValue::Null, None)
        .unwrap();
    graph.set_primary_key(GraphElementType::Link, &[key]).unwrap();

    let a = graph.add_vertex();
    let b = graph.add_vertex();
    let c = graph.add_vertex();
    let ab = graph.add_transaction(a, b, true).unwrap();
    graph.validate_key(GraphElementType::Link, false).unwrap();

    graph.remove_transaction(ab).unwrap();
    graph.add_transaction(a, c, true).unwrap();
    assert_eq!(graph.pending_key_count(GraphElementType::Link), 1);
    graph.validate_key(GraphElementType::Link, false).unwrap();
    assert_eq!(graph.pending_key_count(GraphElementType::Link), 0);
}

#[test]
fn test_new_edges_are_pending() {
    let mut graph = StoreGraph::new();
    let key = graph
        .add_attribute(GraphElementType::Edge, "string", "k", "", &AttributeValue::Null, None)
        .unwrap();
    graph.set_primary_key(GraphElementType::Edge, &[key]).unwrap();

    let a = graph.add_vertex();
    let b = graph.add_vertex();
    graph.add_transaction(a, b, true).unwrap();
    let back = graph.add_transaction(b, a, true).unwrap();
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.pending_key_count(GraphElementType::Edge), 2);

    let edge = graph.transaction_edge(back).unwrap();
    graph.set_string_value(key, edge, Some("back")).unwrap();
    graph.validate_key(GraphElementType::Edge, false).unwrap();

    graph.remove_transaction(back).unwrap();
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.pending_key_count(GraphElementType::Edge), 0);
}

#[test]
fn test_keep_first_moves_transactions_to_survivor() {
    let mut graph = StoreGraph::new();
    graph.set_element_merger(Some(Arc::new(storegraph::graph::KeepFirstElementMerger)));
    let name = graph
        .add_attribute(GraphElementType::Vertex, "string", "Name", "", &AttributeValue::Null, None)
        .unwrap();
    let mut named = |value: &str| {
        let v = graph.add_vertex();
        graph.set_string_value(name, v, Some(value)).unwrap();
        v
    };
    let a = named("x");
    let b = named("x");
    let c = named("y");

    let out = graph.add_transaction(b, c, true).unwrap();
    let back = graph.add_transaction(c, b, true).unwrap();
    let lp = graph.add_transaction(b, b, false).unwrap();
    let between = graph.add_transaction(a, b, true).unwrap();

    graph.set_primary_key(GraphElementType::Vertex, &[name]).unwrap();
    graph.validate_keys().unwrap();

    assert!(graph.vertex_exists(a));
    assert!(!graph.vertex_exists(b));
    assert_eq!(graph.transaction_count(), 4);
    assert_eq!(graph.transaction_source_vertex(out), Some(a));
    assert_eq!(graph.transaction_destination_vertex(out), Some(c));
    assert_eq!(graph.transaction_source_vertex(back), Some(c));
    assert_eq!(graph.transaction_destination_vertex(back), Some(a));
    assert_eq!(graph.transaction_source_vertex(lp), Some(a));
    assert_eq!(graph.transaction_destination_vertex(lp), Some(a));
    assert_eq!(graph.transaction_source_vertex(between), Some(a));
    assert_eq!(graph.transaction_destination_vertex(between), Some(a));
    assert_eq!(graph.vertex_transaction_count(a), 6);
    assert_eq!(graph.vertex_transaction_count(c), 2);
}
