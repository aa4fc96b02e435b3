use super::*;
use crate::graph::edit::EditLog;
use crate::graph::error::{GraphError, GraphResult};
use crate::graph::types::{Direction, VertexDirection};
use crate::graph::value::AttributeValue;

fn vertices(graph: &mut StoreGraph, n: usize) -> Vec<u32> {
    (0..n).map(|_| graph.add_vertex()).collect()
}

#[test]
fn test_vertex_positions_stay_consistent() {
    let mut graph = StoreGraph::new();
    let v = vertices(&mut graph, 5);
    graph.remove_vertex(v[1]).unwrap();

    assert_eq!(graph.vertex_count(), 4);
    assert_eq!(graph.vertex(1), Some(v[4]));
    for p in 0..graph.vertex_count() {
        let id = graph.vertex(p).unwrap();
        assert_eq!(graph.vertex_position(id), Some(p));
    }
    assert_eq!(graph.vertex_position(v[1]), None);
    assert_eq!(graph.remove_vertex(v[1]), Err(GraphError::VertexNotFound(v[1])));
}

#[test]
fn test_uids_are_never_reused() {
    let mut graph = StoreGraph::new();
    let a = graph.add_vertex();
    let first = graph.vertex_uid(a).unwrap();
    graph.remove_vertex(a).unwrap();
    let b = graph.add_vertex();
    assert_eq!(a, b);
    assert_ne!(graph.vertex_uid(b), Some(first));
}

#[test]
fn test_directed_transaction_adjacency() {
    let mut graph = StoreGraph::new();
    let v = vertices(&mut graph, 2);
    let t = graph.add_transaction(v[0], v[1], true).unwrap();

    assert_eq!(graph.transaction_source_vertex(t), Some(v[0]));
    assert_eq!(graph.transaction_destination_vertex(t), Some(v[1]));
    assert_eq!(graph.transaction_direction(t), Some(Direction::Uphill));
    assert_eq!(graph.vertex_transaction_count_in(v[0], VertexDirection::Outgoing), 1);
    assert_eq!(graph.vertex_transaction_count_in(v[1], VertexDirection::Incoming), 1);
    assert_eq!(graph.vertex_transaction_count_in(v[0], VertexDirection::Incoming), 0);

    let link = graph.link_between(v[1], v[0]).unwrap();
    assert_eq!(graph.link_between(v[0], v[1]), Some(link));
    assert_eq!(graph.transaction_link(t), Some(link));
    assert_eq!(graph.link_low_vertex(link), Some(v[0]));
    assert_eq!(graph.link_high_vertex(link), Some(v[1]));

    let edge = graph.transaction_edge(t).unwrap();
    assert_eq!(graph.edge_link(edge), Some(link));
    assert_eq!(graph.edge_source_vertex(edge), Some(v[0]));
    assert_eq!(graph.edge_destination_vertex(edge), Some(v[1]));
    assert_eq!(graph.edge_transaction_count(edge), 1);
    assert_eq!(graph.vertex_neighbours(v[0]).collect::<Vec<_>>(), vec![v[1]]);
}

#[test]
fn test_reverse_transaction_gets_downhill_edge() {
    let mut graph = StoreGraph::new();
    let v = vertices(&mut graph, 2);
    let forward = graph.add_transaction(v[0], v[1], true).unwrap();
    let back = graph.add_transaction(v[1], v[0], true).unwrap();
    let flat = graph.add_transaction(v[1], v[0], false).unwrap();

    assert_eq!(graph.link_count(), 1);
    assert_eq!(graph.edge_count(), 3);
    let link = graph.transaction_link(forward).unwrap();
    assert_eq!(graph.link_edge_count_in(link, Direction::Downhill), 1);
    assert_eq!(graph.transaction_direction(back), Some(Direction::Downhill));
    assert_eq!(graph.transaction_direction(flat), Some(Direction::Flat));
    assert_eq!(graph.vertex_link_count(v[0]), 1);

    graph.remove_transaction(back).unwrap();
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.link_edge_count_in(link, Direction::Downhill), 0);
    assert_eq!(graph.link_edge_count(link), 2);
}

#[test]
fn test_parallel_transactions_share_an_edge() {
    let mut graph = StoreGraph::new();
    let v = vertices(&mut graph, 2);
    let a = graph.add_transaction(v[0], v[1], true).unwrap();
    let b = graph.add_transaction(v[0], v[1], true).unwrap();
    assert_eq!(graph.transaction_edge(a), graph.transaction_edge(b));
    assert_eq!(graph.edge_count(), 1);

    graph.remove_transaction(a).unwrap();
    assert_eq!(graph.edge_count(), 1);
    graph.remove_transaction(b).unwrap();
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.link_count(), 0);
    assert_eq!(graph.link_between(v[0], v[1]), None);
    assert_eq!(graph.vertex_link_count(v[0]), 0);
}

#[test]
fn test_self_loop_counts_twice() {
    let mut graph = StoreGraph::new();
    let v = graph.add_vertex();
    let t = graph.add_transaction(v, v, true).unwrap();
    assert_eq!(graph.vertex_transaction_count(v), 2);
    assert_eq!(graph.transaction_source_vertex(t), Some(v));
    assert_eq!(graph.transaction_destination_vertex(t), Some(v));
    assert_eq!(graph.link_count(), 1);

    graph.remove_vertex(v).unwrap();
    assert_eq!(graph.transaction_count(), 0);
    assert_eq!(graph.link_count(), 0);
}

#[test]
fn test_remove_vertex_cascades() {
    let mut graph = StoreGraph::new();
    let v = vertices(&mut graph, 3);
    graph.add_transaction(v[0], v[1], true).unwrap();
    graph.add_transaction(v[2], v[0], false).unwrap();
    let kept = graph.add_transaction(v[1], v[2], true).unwrap();

    graph.remove_vertex(v[0]).unwrap();
    assert_eq!(graph.transactions().collect::<Vec<_>>(), vec![kept]);
    assert_eq!(graph.link_count(), 1);
    assert_eq!(graph.vertex_transaction_count(v[1]), 1);
}

#[test]
fn test_missing_endpoints_are_rejected() {
    let mut graph = StoreGraph::new();
    let v = graph.add_vertex();
    assert_eq!(graph.add_transaction(v, 9, true), Err(GraphError::VertexNotFound(9)));
    assert_eq!(graph.add_vertex_with_id(v), Err(GraphError::DuplicateVertexId(v)));
    assert_eq!(graph.transaction_count(), 0);
}

#[test]
fn test_vertex_with_id_beyond_capacity() {
    let mut graph = StoreGraph::new();
    let id = graph.vertex_capacity() as u32 + 10;
    assert_eq!(graph.add_vertex_with_id(id), Ok(id));
    assert!(graph.vertex_exists(id));
    assert!(graph.vertex_capacity() > id as usize);
}

#[test]
fn test_growth_keeps_values() {
    let mut graph = StoreGraph::new();
    let attr = graph
        .add_attribute(GraphElementType::Vertex, "integer", "n", "", &AttributeValue::Null, None)
        .unwrap();
    let v = vertices(&mut graph, 500);
    for &id in &v {
        graph.set_int_value(attr, id, id as i32 * 2).unwrap();
    }
    for window in v.windows(2) {
        graph.add_transaction(window[0], window[1], true).unwrap();
    }
    assert_eq!(graph.transaction_count(), 499);
    assert_eq!(graph.int_value(attr, v[321]).unwrap(), v[321] as i32 * 2);
    assert!(graph.link_between(v[10], v[11]).is_some());
}

#[test]
fn test_move_transaction_source() {
    let mut graph = StoreGraph::new();
    let weight = graph
        .add_attribute(GraphElementType::Transaction, "double", "weight", "", &AttributeValue::Null, None)
        .unwrap();
    let v = vertices(&mut graph, 3);
    let t = graph.add_transaction(v[0], v[1], true).unwrap();
    graph.set_double_value(weight, t, 0.5).unwrap();

    let uid = graph.transaction_uid(t);

    let log = EditLog::new();
    graph.set_graph_edit(Some(Box::new(log.clone())));
    graph.set_transaction_source_vertex(t, v[2]).unwrap();

    assert_eq!(graph.transaction_uid(t), uid);
    assert_eq!(graph.transaction_source_vertex(t), Some(v[2]));
    assert_eq!(graph.transaction_destination_vertex(t), Some(v[1]));
    assert_eq!(graph.double_value(weight, t).unwrap(), 0.5);
    assert_eq!(graph.link_between(v[0], v[1]), None);
    assert_eq!(log.len(), 1);

    log.undo(&mut graph).unwrap();
    assert_eq!(graph.transaction_source_vertex(t), Some(v[0]));
    assert_eq!(graph.double_value(weight, t).unwrap(), 0.5);
    assert_eq!(graph.transaction_uid(t), uid);
}

#[test]
fn test_undirected_move_reports_reversal() {
    let mut graph = StoreGraph::new();
    let v = vertices(&mut graph, 3);
    let t = graph.add_transaction(v[1], v[2], false).unwrap();
    let log = EditLog::new();
    graph.set_graph_edit(Some(Box::new(log.clone())));

    graph.set_transaction_destination_vertex(t, v[0]).unwrap();
    assert_eq!(graph.transaction_source_vertex(t), Some(v[0]));
    assert_eq!(graph.transaction_destination_vertex(t), Some(v[1]));

    log.undo(&mut graph).unwrap();
    assert_eq!(graph.transaction_source_vertex(t), Some(v[1]));
    assert_eq!(graph.transaction_destination_vertex(t), Some(v[2]));
}

#[test]
fn test_undo_redo_structure() {
    let mut graph = StoreGraph::new();
    let log = EditLog::new();
    graph.set_graph_edit(Some(Box::new(log.clone())));
    let counters = |g: &StoreGraph| {
        (
            g.global_modification_counter(),
            g.structure_modification_counter(),
            g.attribute_modification_counter(),
        )
    };
    let before = counters(&graph);

    let v = vertices(&mut graph, 3);
    let t = graph.add_transaction(v[0], v[2], true).unwrap();
    graph.remove_vertex(v[1]).unwrap();
    let after = counters(&graph);

    log.undo(&mut graph).unwrap();
    assert_eq!(graph.vertex_count(), 0);
    assert_eq!(graph.transaction_count(), 0);
    assert_eq!(counters(&graph), before);

    log.redo(&mut graph).unwrap();
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.transaction_source_vertex(t), Some(v[0]));
    assert_eq!(counters(&graph), after);
    assert!(graph.graph_edit().is_some());
}

#[test]
fn test_clone_is_independent() {
    let mut graph = StoreGraph::with_config(StoreGraphConfig::default().with_id("original"));
    let name = graph
        .add_attribute(GraphElementType::Vertex, "string", "Name", "", &AttributeValue::Null, None)
        .unwrap();
    graph
        .set_attribute_index_type(name, GraphIndexType::Unordered)
        .unwrap();
    let v = graph.add_vertex();
    graph.set_string_value(name, v, Some("a")).unwrap();
    graph.set_graph_edit(Some(Box::new(EditLog::new())));

    let mut copy = graph.clone();
    assert_eq!(copy.id(), "original");
    assert!(copy.graph_edit().is_none());
    copy.set_string_value(name, v, Some("b")).unwrap();
    copy.add_vertex();

    assert_eq!(graph.string_value(name, v).unwrap().as_deref(), Some("a"));
    assert_eq!(graph.vertex_count(), 1);
    let hits = copy
        .elements_with_attribute_value(name, &AttributeValue::from("b"))
        .unwrap()
        .unwrap();
    assert_eq!(hits.into_vec(), vec![v]);

    let renamed = graph.copy_with_id("other");
    assert_eq!(renamed.id(), "other");
    assert_eq!(renamed.vertex_count(), 1);
}

#[derive(Debug)]
struct LabelSchema;

impl Schema for LabelSchema {
    fn complete_vertex(&self, graph: &mut StoreGraph, vertex: u32) -> GraphResult<()> {
        let label = graph.add_attribute(
            GraphElementType::Vertex,
            "string",
            "Label",
            "",
            &AttributeValue::Null,
            None,
        )?;
        graph.set_string_value(label, vertex, Some(&format!("vertex {vertex}")))
    }
}

#[test]
fn test_schema_completes_vertices() {
    let mut graph = StoreGraph::builder(StoreGraphConfig::default())
        .schema(Arc::new(LabelSchema))
        .build();
    let v = graph.add_vertex();
    GraphElementType::Vertex.complete_with_schema(&mut graph, v).unwrap();
    let label = graph.attribute_by_name(GraphElementType::Vertex, "Label").unwrap();
    assert_eq!(
        graph.string_value(label, v).unwrap().as_deref(),
        Some("vertex 0")
    );
    // Transactions have no completion hook.
    let t = graph.add_transaction(v, v, false).unwrap();
    GraphElementType::Transaction.complete_with_schema(&mut graph, t).unwrap();
}

#[test]
fn test_builder_uses_custom_registry() {
    let mut registry = AttributeRegistry::with_builtins();
    registry.register("icon", || {
        Box::<crate::graph::attribute::StringAttributeDescription>::default()
    });
    let mut graph = StoreGraph::builder(StoreGraphConfig::default())
        .attribute_registry(Arc::new(registry))
        .build();
    let attr = graph
        .add_attribute(GraphElementType::Vertex, "icon", "Icon", "", &AttributeValue::Null, None)
        .unwrap();
    assert_eq!(graph.attribute_type(attr).unwrap(), "icon");
}

#[test]
fn test_display() {
    let mut graph = StoreGraph::new();
    let v = vertices(&mut graph, 2);
    graph.add_transaction(v[0], v[1], true).unwrap();
    assert_eq!(graph.to_string(), "[StoreGraph; vertices:2, transactions:1]");
}
