use std::sync::Arc;
use storegraph::graph::{
    AttributeValue, EditLog, GraphElementType, GraphIndexType, KeepFirstElementMerger, StoreGraph,
};
use storegraph::{GraphError, StoreGraphConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), GraphError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storegraph=info")),
        )
        .init();

    println!("StoreGraph v{}", storegraph::version());
    println!("==========================================");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| GraphError::Config(format!("{}: {}", path, e)))?;
            StoreGraphConfig::from_yaml_str(&text)?
        }
        None => StoreGraphConfig::default().with_id("demo"),
    };

    let mut graph = StoreGraph::builder(config)
        .element_merger(Arc::new(KeepFirstElementMerger))
        .build();

    demo_structure(&mut graph)?;
    demo_keys(&mut graph)?;
    demo_undo(&mut graph)?;
    Ok(())
}

fn demo_structure(graph: &mut StoreGraph) -> Result<(), GraphError> {
    println!("=== Demo 1: Structure ===");
    let name = graph.add_attribute(
        GraphElementType::Vertex,
        "string",
        "Name",
        "Display name",
        &AttributeValue::Null,
        Some("replace"),
    )?;
    let age = graph.add_attribute(
        GraphElementType::Vertex,
        "integer",
        "Age",
        "Age in years",
        &AttributeValue::Int(0),
        None,
    )?;
    graph.set_attribute_index_type(age, GraphIndexType::Ordered)?;

    let mut people = Vec::new();
    for (person, years) in [("Alice", 30), ("Bob", 25), ("Charlie", 35)] {
        let v = graph.add_vertex();
        graph.set_string_value(name, v, Some(person))?;
        graph.set_int_value(age, v, years)?;
        println!("✓ Created vertex {}: {} (age {})", v, person, years);
        people.push(v);
    }

    graph.add_transaction(people[0], people[1], true)?;
    graph.add_transaction(people[1], people[0], true)?;
    graph.add_transaction(people[1], people[2], false)?;

    println!("\nGraph Statistics:");
    println!("  {}", graph);
    println!("  Links: {}", graph.link_count());
    println!("  Edges: {}", graph.edge_count());

    if let Some(hits) = graph.elements_with_attribute_value_range(
        age,
        &AttributeValue::Int(28),
        &AttributeValue::Int(40),
    )? {
        println!("  Aged 28 to 40: {:?}", hits.into_vec());
    }
    Ok(())
}

fn demo_keys(graph: &mut StoreGraph) -> Result<(), GraphError> {
    println!("\n=== Demo 2: Primary Keys ===");
    let Some(name) = graph.attribute_by_name(GraphElementType::Vertex, "Name") else {
        return Ok(());
    };
    graph.set_primary_key(GraphElementType::Vertex, &[name])?;

    let duplicate = graph.add_vertex();
    graph.set_string_value(name, duplicate, Some("Alice"))?;
    match graph.validate_key(GraphElementType::Vertex, false) {
        Err(GraphError::DuplicateKey(e)) => println!("✓ Clash detected:\n{}", e),
        other => other?,
    }

    graph.validate_keys()?;
    println!("✓ Clash merged, {} vertices remain", graph.vertex_count());
    Ok(())
}

fn demo_undo(graph: &mut StoreGraph) -> Result<(), GraphError> {
    println!("\n=== Demo 3: Undo ===");
    let log = EditLog::new();
    graph.set_graph_edit(Some(Box::new(log.clone())));
    let before = graph.global_modification_counter();

    let v = graph.add_vertex();
    if let Some(first) = graph.vertex(0) {
        graph.add_transaction(v, first, true)?;
    }
    println!("  Recorded {} changes: {}", log.len(), graph);

    log.undo(graph)?;
    println!("  After undo: {}", graph);
    println!(
        "  Counter restored: {}",
        graph.global_modification_counter() == before
    );
    Ok(())
}
