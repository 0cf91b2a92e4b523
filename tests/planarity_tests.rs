use ahash::AHashMap;
use nativegraph::{
    Engine, Graph, GraphConfig, KuratowskiKind, PlanarEmbedding, SetKind,
    bench_utils::{GraphShape, generate_graph},
    planarity::{classify_subdivision, is_planar, test_planarity},
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

fn build(config: GraphConfig, n: usize, edges: &[(usize, usize)]) -> Graph {
    let mut graph = Graph::new(config);
    for _ in 0..n {
        graph.add_vertex(None).expect("vertex");
    }
    for &(u, v) in edges {
        graph.add_edge(u as i64, v as i64, None).expect("edge");
    }
    graph
}

fn complete(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|u| (u + 1..n).map(move |v| (u, v)))
        .collect()
}

fn k33() -> Vec<(usize, usize)> {
    (0..3)
        .flat_map(|u| (3..6).map(move |v| (u, v)))
        .collect()
}

/// Checks the rotation system against the graph and returns the number of
/// faces after verifying Euler's formula per component.
fn check_embedding(graph: &Graph, embedding: &PlanarEmbedding) -> usize {
    assert_eq!(embedding.vertex_count(), graph.vertex_count());
    assert_eq!(embedding.edge_count(), graph.edge_count());

    let mut occurrences: AHashMap<i64, usize> = AHashMap::new();
    for vertex in graph.vertices() {
        let around = embedding.edges_around(vertex).expect("rotation");
        assert_eq!(around.len(), graph.degree(vertex).expect("degree"));
        for &edge in around {
            *occurrences.entry(edge).or_insert(0) += 1;
        }
    }
    assert_eq!(occurrences.len(), graph.edge_count());
    assert!(occurrences.values().all(|&count| count == 2));

    let faces = embedding.faces();
    let face_edges: usize = faces.iter().map(Vec::len).sum();
    assert_eq!(face_edges, 2 * graph.edge_count());

    // components that contain at least one edge
    let non_isolated: Vec<i64> = graph
        .vertices()
        .filter(|&v| graph.degree(v).expect("degree") > 0)
        .collect();
    let mut parent: AHashMap<i64, i64> = non_isolated.iter().map(|&v| (v, v)).collect();
    fn find(parent: &mut AHashMap<i64, i64>, v: i64) -> i64 {
        let p = parent[&v];
        if p == v {
            return v;
        }
        let root = find(parent, p);
        parent.insert(v, root);
        root
    }
    for record in graph.edges() {
        let a = find(&mut parent, record.source);
        let b = find(&mut parent, record.target);
        parent.insert(a, b);
    }
    let components = non_isolated
        .iter()
        .filter(|&&v| find(&mut parent, v) == v)
        .count();

    let euler = non_isolated.len() as i64 - graph.edge_count() as i64 + faces.len() as i64;
    assert_eq!(euler, 2 * components as i64, "rotation system is not planar");
    faces.len()
}

#[test]
fn test_k4_is_planar_with_four_faces() {
    let graph = build(GraphConfig::undirected(), 4, &complete(4));
    let result = test_planarity(&graph).expect("planarity");
    assert!(result.is_planar);
    assert!(result.kuratowski.is_none());
    let embedding = result.embedding.expect("embedding");
    assert_eq!(check_embedding(&graph, &embedding), 4);
}

#[test]
fn test_grid_is_planar() {
    let dataset = generate_graph(GraphShape::Grid2D { width: 3, height: 3 }, 9, 0);
    let (graph, _) = dataset
        .materialize(GraphConfig::undirected())
        .expect("materialize");
    let result = test_planarity(&graph).expect("planarity");
    assert!(result.is_planar);
    let faces = check_embedding(&graph, &result.embedding.expect("embedding"));
    assert_eq!(faces, 5);
}

#[test]
fn test_seven_vertex_embedding_satisfies_euler() {
    let graph = build(
        GraphConfig::undirected(),
        7,
        &[
            (0, 2),
            (0, 3),
            (1, 2),
            (1, 5),
            (0, 4),
            (1, 3),
            (2, 5),
            (3, 4),
            (3, 5),
        ],
    );
    let result = test_planarity(&graph).expect("planarity");
    assert!(result.is_planar);
    assert_eq!(check_embedding(&graph, &result.embedding.expect("embedding")), 5);
}

#[test]
fn test_thinned_triangulations_embed() {
    for seed in 0..150u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.gen_range(10..=60);
        let dataset = generate_graph(GraphShape::Apollonian, n, seed);
        let mut label: Vec<usize> = (0..n).collect();
        label.shuffle(&mut rng);
        let mut edges: Vec<(usize, usize)> = dataset
            .edges
            .iter()
            .map(|&(a, b, _)| (label[a], label[b]))
            .collect();
        edges.shuffle(&mut rng);
        let dropped = rng.gen_range(0..=edges.len() / 3);
        edges.truncate(edges.len() - dropped);

        let graph = build(GraphConfig::undirected(), n, &edges);
        let result = test_planarity(&graph).expect("planarity");
        assert!(result.is_planar, "seed {seed}");
        check_embedding(&graph, &result.embedding.expect("embedding"));
    }
}

#[test]
fn test_k5_certificate() {
    let graph = build(GraphConfig::undirected(), 5, &complete(5));
    assert!(!is_planar(&graph));
    let result = test_planarity(&graph).expect("planarity");
    assert!(!result.is_planar);
    assert!(result.embedding.is_none());
    let certificate = result.kuratowski.expect("certificate");
    assert_eq!(certificate.kind(), KuratowskiKind::K5);
    assert_eq!(certificate.edges().len(), 10);
}

#[test]
fn test_k33_certificate() {
    let graph = build(GraphConfig::undirected(), 6, &k33());
    let certificate = test_planarity(&graph).expect("planarity").kuratowski.expect("certificate");
    assert_eq!(certificate.kind(), KuratowskiKind::K33);
    assert_eq!(certificate.edges().len(), 9);
    assert_eq!(certificate.kind().to_string(), "K3,3");
}

#[test]
fn test_petersen_certificate_is_k33_subdivision() {
    let mut edges = Vec::new();
    for i in 0..5 {
        edges.push((i, (i + 1) % 5));
        edges.push((i, i + 5));
        edges.push((i + 5, (i + 2) % 5 + 5));
    }
    let graph = build(GraphConfig::undirected(), 10, &edges);
    let certificate = test_planarity(&graph).expect("planarity").kuratowski.expect("certificate");
    assert_eq!(certificate.kind(), KuratowskiKind::K33);
    assert_eq!(
        classify_subdivision(&graph, certificate.edges()).expect("classify"),
        Some(KuratowskiKind::K33)
    );
}

#[test]
fn test_loops_and_parallel_edges_are_embedded() {
    let mut graph = build(GraphConfig::pseudograph(), 4, &complete(4));
    let looped = graph.add_edge(0, 0, None).expect("loop");
    let parallel = graph.add_edge(2, 1, None).expect("parallel");
    let result = test_planarity(&graph).expect("planarity");
    assert!(result.is_planar);
    let embedding = result.embedding.expect("embedding");
    // K4 faces, one more for the loop and one between the parallel pair
    assert_eq!(check_embedding(&graph, &embedding), 6);

    let around = embedding.edges_around(0).expect("rotation");
    assert_eq!(around.iter().filter(|&&e| e == looped).count(), 2);
    let around = embedding.edges_around(1).expect("rotation");
    assert!(around.contains(&parallel));
}

#[test]
fn test_direction_is_ignored() {
    // antiparallel arcs collapse to one undirected edge for the test
    let mut edges = complete(5);
    edges.extend(complete(5).into_iter().map(|(u, v)| (v, u)));
    let graph = build(GraphConfig::directed(), 5, &edges);
    let certificate = test_planarity(&graph).expect("planarity").kuratowski.expect("certificate");
    assert_eq!(certificate.kind(), KuratowskiKind::K5);
    assert_eq!(certificate.edges().len(), 10);

    let graph = build(GraphConfig::directed(), 3, &[(0, 1), (1, 0), (1, 2)]);
    let result = test_planarity(&graph).expect("planarity");
    assert!(result.is_planar);
    check_embedding(&graph, &result.embedding.expect("embedding"));
}

#[test]
fn test_edge_count_bound_rejects_early() {
    // K6 minus nothing: 15 edges > 3 * 6 - 6
    let graph = build(GraphConfig::undirected(), 6, &complete(6));
    assert!(!is_planar(&graph));
    let certificate = test_planarity(&graph).expect("planarity").kuratowski.expect("certificate");
    assert_eq!(
        classify_subdivision(&graph, certificate.edges()).expect("classify"),
        Some(certificate.kind())
    );
}

#[test]
fn test_tombstoned_vertices_are_skipped() {
    let mut graph = build(GraphConfig::undirected(), 6, &complete(5));
    graph.add_edge(5, 0, None).expect("edge");
    graph.remove_vertex(2).expect("remove");
    let result = test_planarity(&graph).expect("planarity");
    assert!(result.is_planar);
    let embedding = result.embedding.expect("embedding");
    assert!(embedding.edges_around(2).is_err());
    check_embedding(&graph, &embedding);
}

#[test]
fn test_classify_rejects_non_subdivisions() {
    let graph = build(GraphConfig::undirected(), 6, &complete(6));
    let all = nativegraph::LongSet::from_values(SetKind::Linked, graph.edge_ids());
    assert_eq!(classify_subdivision(&graph, &all).expect("classify"), None);

    let missing = nativegraph::LongSet::from_values(SetKind::Linked, [99]);
    assert!(classify_subdivision(&graph, &missing).is_err());
}

#[test]
fn test_random_graphs_yield_checkable_certificates() {
    let mut planar = 0;
    let mut non_planar = 0;
    for seed in 0..200u64 {
        let n = 5 + (seed % 5) as usize;
        let max_edges = n * (n - 1) / 2;
        let edges = (n + seed as usize % (2 * n)).min(max_edges);
        let dataset = generate_graph(GraphShape::RandomErdosRenyi { edges }, n, seed);
        let (graph, _) = dataset
            .materialize(GraphConfig::undirected())
            .expect("materialize");
        let result = test_planarity(&graph).expect("planarity");
        assert_eq!(result.is_planar, is_planar(&graph), "seed {seed}");
        if result.is_planar {
            planar += 1;
            check_embedding(&graph, &result.embedding.expect("embedding"));
            continue;
        }
        non_planar += 1;
        let certificate = result.kuratowski.expect("certificate");
        assert_eq!(
            classify_subdivision(&graph, certificate.edges()).expect("classify"),
            Some(certificate.kind()),
            "seed {seed}"
        );

        // dropping any certificate edge leaves a planar graph
        let kept: Vec<(usize, usize)> = certificate
            .edges()
            .iter()
            .map(|e| {
                let (u, v) = graph.edge_endpoints(e).expect("endpoints");
                (u as usize, v as usize)
            })
            .collect();
        for skip in 0..kept.len() {
            let rest: Vec<(usize, usize)> = kept
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != skip)
                .map(|(_, &pair)| pair)
                .collect();
            assert!(is_planar(&build(GraphConfig::undirected(), n, &rest)), "seed {seed}");
        }
    }
    assert!(planar > 0 && non_planar > 0);
}

#[test]
fn test_certificate_inside_large_grid() {
    let side = 40;
    let dataset = generate_graph(
        GraphShape::Grid2D {
            width: side,
            height: side,
        },
        side * side,
        0,
    );
    let (mut graph, ids) = dataset
        .materialize(GraphConfig::undirected())
        .expect("materialize");
    // K5 on five far-apart grid vertices
    let corners = [0, side - 1, side * side - side, side * side - 1, side * (side / 2) + side / 2];
    for (i, &a) in corners.iter().enumerate() {
        for &b in &corners[i + 1..] {
            graph.add_edge(ids[a], ids[b], None).expect("edge");
        }
    }

    let certificate = test_planarity(&graph)
        .expect("planarity")
        .kuratowski
        .expect("certificate");
    assert_eq!(
        classify_subdivision(&graph, certificate.edges()).expect("classify"),
        Some(certificate.kind())
    );
    assert!(certificate.edges().len() < graph.edge_count() / 4);

    let kept: Vec<(usize, usize)> = certificate
        .edges()
        .iter()
        .map(|e| {
            let (u, v) = graph.edge_endpoints(e).expect("endpoints");
            (u as usize, v as usize)
        })
        .collect();
    assert!(!is_planar(&build(GraphConfig::undirected(), side * side, &kept)));
    for skip in 0..kept.len() {
        let mut rest = kept.clone();
        rest.swap_remove(skip);
        assert!(is_planar(&build(GraphConfig::undirected(), side * side, &rest)));
    }
}

#[test]
fn test_engine_planarity_handles() {
    let mut engine = Engine::new();
    let graph = engine.create_graph(GraphConfig::undirected());
    let vs: Vec<i64> = (0..5)
        .map(|_| engine.add_vertex(graph).expect("vertex"))
        .collect();
    for (u, v) in complete(4) {
        engine.add_edge(graph, vs[u], vs[v]).expect("edge");
    }
    let outcome = engine.planarity_test(graph).expect("planarity");
    assert!(outcome.is_planar);
    assert!(outcome.kuratowski.is_none());
    let embedding = outcome.embedding.expect("embedding handle");
    assert_eq!(engine.embedding_face_count(embedding).expect("faces"), 4);

    let it = engine
        .embedding_edges_around(embedding, vs[0])
        .expect("rotation iterator");
    let mut around = Vec::new();
    while engine.iterator_has_next(it).expect("has_next") {
        around.push(engine.iterator_next_long(it).expect("edge"));
    }
    around.sort_unstable();
    assert_eq!(around, vec![0, 1, 2]);

    for u in 0..4 {
        engine.add_edge(graph, vs[u], vs[4]).expect("edge");
    }
    let outcome = engine.planarity_test(graph).expect("planarity");
    assert!(!outcome.is_planar);
    let certificate = outcome.kuratowski.expect("certificate handle");
    assert_eq!(engine.kuratowski_kind(certificate).expect("kind"), KuratowskiKind::K5);
    assert_eq!(
        engine.classify_subdivision(graph, certificate).expect("classify"),
        Some(KuratowskiKind::K5)
    );
    assert_eq!(engine.set_size(certificate).expect("size"), 10);

    // the old embedding stays readable after the graph changed
    assert_eq!(engine.embedding_face_count(embedding).expect("faces"), 4);
}
