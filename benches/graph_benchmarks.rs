use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use storegraph::graph::{AttributeValue, GraphElementType, GraphIndexType, StoreGraph};

/// Benchmark vertex insertion with one attribute set per vertex
fn bench_vertex_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_insertion");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut graph = StoreGraph::new();
                let name = graph
                    .add_attribute(GraphElementType::Vertex, "string", "Name", "", &AttributeValue::Null, None)
                    .unwrap();
                for i in 0..size {
                    let v = graph.add_vertex();
                    graph
                        .set_string_value(name, v, Some(&format!("Person{}", i)))
                        .unwrap();
                }
                graph
            });
        });
    }
    group.finish();
}

/// Benchmark transaction insertion on a ring with chords
fn bench_transaction_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction_insertion");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut graph = StoreGraph::new();
                let vertices: Vec<u32> = (0..size).map(|_| graph.add_vertex()).collect();
                for i in 0..size {
                    let source = vertices[i];
                    graph
                        .add_transaction(source, vertices[(i + 1) % size], true)
                        .unwrap();
                    graph
                        .add_transaction(source, vertices[(i * 7 + 3) % size], i % 2 == 0)
                        .unwrap();
                }
                graph
            });
        });
    }
    group.finish();
}

fn build_graph(size: usize) -> StoreGraph {
    let mut graph = StoreGraph::new();
    let vertices: Vec<u32> = (0..size).map(|_| graph.add_vertex()).collect();
    for i in 0..size {
        for step in [1, 5, 17] {
            graph
                .add_transaction(vertices[i], vertices[(i + step) % size], true)
                .unwrap();
        }
    }
    graph
}

/// Benchmark adjacency scans over every vertex
fn bench_adjacency_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("adjacency_scan");

    for size in [1000, 10_000].iter() {
        let graph = build_graph(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| {
                let mut total = 0u64;
                for v in graph.vertices() {
                    for t in graph.vertex_transactions(v) {
                        total += t as u64;
                    }
                    total += graph.vertex_neighbours(v).count() as u64;
                }
                black_box(total)
            });
        });
    }
    group.finish();
}

/// Benchmark range lookups through an ordered index
fn bench_ordered_index_range(c: &mut Criterion) {
    let mut graph = StoreGraph::new();
    let age = graph
        .add_attribute(GraphElementType::Vertex, "integer", "age", "", &AttributeValue::Null, None)
        .unwrap();
    graph.set_attribute_index_type(age, GraphIndexType::Ordered).unwrap();
    for i in 0..10_000 {
        let v = graph.add_vertex();
        graph.set_int_value(age, v, i % 100).unwrap();
    }

    c.bench_function("ordered_index_range", |b| {
        b.iter(|| {
            graph
                .elements_with_attribute_value_range(
                    age,
                    black_box(&AttributeValue::Int(20)),
                    black_box(&AttributeValue::Int(30)),
                )
                .unwrap()
                .map(|hits| hits.len())
        });
    });
}

criterion_group!(
    benches,
    bench_vertex_insertion,
    bench_transaction_insertion,
    bench_adjacency_scan,
    bench_ordered_index_range
);
criterion_main!(benches);
