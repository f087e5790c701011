use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dutil_core::{AcceptAll, EdgeId, Graph, PathControl, VertexId};

/// Layered DAG: `depth` layers of `width` vertices, fully linked layer to layer
fn layered(width: usize, depth: usize) -> (Graph<(), u32>, VertexId, VertexId) {
    let mut graph = Graph::new();
    let source = graph.add_vertex(()).unwrap();
    let sink = graph.add_vertex(()).unwrap();
    let mut layer = vec![source];
    for _ in 0..depth {
        let next: Vec<_> = (0..width).map(|_| graph.add_vertex(()).unwrap()).collect();
        for &a in &layer {
            for &b in &next {
                graph.add_edge(a, b, 1).unwrap();
            }
        }
        layer = next;
    }
    for &a in &layer {
        graph.add_edge(a, sink, 1).unwrap();
    }
    (graph, source, sink)
}

fn bench_depth_first(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_paths_depth_first");
    for &(width, depth) in &[(3usize, 4usize), (4, 5)] {
        let (graph, source, sink) = layered(width, depth);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", width, depth)), &(), |b, _| {
            b.iter(|| {
                let mut paths = 0usize;
                let mut count = |_: &[EdgeId]| {
                    paths += 1;
                    PathControl::Ok
                };
                graph.iterate_edge_paths(source, sink, &mut count).unwrap();
                black_box(paths)
            });
        });
    }
    group.finish();
}

fn bench_breadth_first(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_paths_breadth_first");
    for &(width, depth) in &[(3usize, 4usize), (4, 5)] {
        let (graph, source, sink) = layered(width, depth);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", width, depth)), &(), |b, _| {
            b.iter(|| {
                let mut paths = 0usize;
                graph
                    .iterate_vertex_paths_breadth_first(source, sink, &mut AcceptAll, |_| {
                        paths += 1;
                        PathControl::Ok
                    })
                    .unwrap();
                black_box(paths)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_depth_first, bench_breadth_first);
criterion_main!(benches);
