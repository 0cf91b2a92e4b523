use nativegraph::{
    EdgeDirection, ExternalId, Graph, GraphConfig, GraphError,
    graph::DEFAULT_EDGE_WEIGHT,
};

fn triangle(config: GraphConfig) -> (Graph, Vec<i64>) {
    let mut graph = Graph::new(config);
    let vs: Vec<i64> = (0..3)
        .map(|_| graph.add_vertex(None).expect("vertex"))
        .collect();
    graph.add_edge(vs[0], vs[1], None).expect("edge");
    graph.add_edge(vs[1], vs[2], None).expect("edge");
    graph.add_edge(vs[2], vs[0], None).expect("edge");
    (graph, vs)
}

#[test]
fn test_add_edge_to_unknown_vertex_mutates_nothing() {
    let (mut graph, vs) = triangle(GraphConfig::default());
    let before = graph.version();
    let err = graph.add_edge(vs[0], 99, None).expect_err("unknown target");
    assert_eq!(err, GraphError::UnknownVertex(99));
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.version(), before);
}

#[test]
fn test_policy_violations_are_illegal_arguments() {
    let (mut graph, vs) = triangle(GraphConfig::default());
    let looped = graph.add_edge(vs[0], vs[0], None).expect_err("loop");
    assert!(matches!(looped, GraphError::IllegalArgument(_)));
    let parallel = graph.add_edge(vs[1], vs[0], None).expect_err("parallel");
    assert!(matches!(parallel, GraphError::IllegalArgument(_)));
    assert_eq!(graph.edge_count(), 3);

    let (mut multi, ws) = triangle(GraphConfig::pseudograph());
    multi.add_edge(ws[0], ws[0], None).expect("loop allowed");
    multi.add_edge(ws[1], ws[0], None).expect("parallel allowed");
    assert_eq!(multi.edge_count(), 5);
    assert_eq!(multi.degree(ws[0]).expect("degree"), 5);
}

#[test]
fn test_removal_keeps_other_indices_stable() {
    let mut graph = Graph::new(GraphConfig::default());
    let vs: Vec<i64> = (0..4)
        .map(|_| graph.add_vertex(None).expect("vertex"))
        .collect();
    let e01 = graph.add_edge(vs[0], vs[1], None).expect("edge");
    let e12 = graph.add_edge(vs[1], vs[2], None).expect("edge");
    let e23 = graph.add_edge(vs[2], vs[3], None).expect("edge");

    graph.remove_vertex(vs[1]).expect("remove");
    assert!(!graph.contains_vertex(vs[1]));
    assert!(!graph.contains_edge(e01));
    assert!(!graph.contains_edge(e12));
    assert_eq!(graph.edge_endpoints(e23).expect("endpoints"), (vs[2], vs[3]));
    assert_eq!(graph.vertices().collect::<Vec<_>>(), vec![vs[0], vs[2], vs[3]]);

    let fresh = graph.add_vertex(None).expect("vertex");
    assert_eq!(fresh, 4, "removed indices are never reused");
    let edge = graph.add_edge(vs[0], fresh, None).expect("edge");
    assert_eq!(edge, 3);
}

#[test]
fn test_weights_require_weighted_graph() {
    let (mut plain, _) = triangle(GraphConfig::default());
    assert_eq!(plain.edge_weight(0).expect("weight"), DEFAULT_EDGE_WEIGHT);
    let err = plain.set_edge_weight(0, 3.0).expect_err("unweighted");
    assert!(matches!(err, GraphError::UnsupportedOperation(_)));

    let (mut weighted, _) = triangle(GraphConfig::default().weighted(true));
    weighted.set_edge_weight(1, 2.5).expect("set");
    assert_eq!(weighted.edge_weight(1).expect("weight"), 2.5);
    let err = weighted.set_edge_weight(1, f64::NAN).expect_err("nan");
    assert!(matches!(err, GraphError::IllegalArgument(_)));
    let err = weighted.set_edge_weight(42, 1.0).expect_err("missing edge");
    assert_eq!(err, GraphError::UnknownEdge(42));
}

#[test]
fn test_directed_degrees_and_incidence() {
    let mut graph = Graph::new(GraphConfig::directed());
    let a = graph.add_vertex(None).expect("vertex");
    let b = graph.add_vertex(None).expect("vertex");
    let c = graph.add_vertex(None).expect("vertex");
    let ab = graph.add_edge(a, b, None).expect("edge");
    let cb = graph.add_edge(c, b, None).expect("edge");
    let ba = graph.add_edge(b, a, None).expect("antiparallel is not parallel");

    assert_eq!(graph.out_degree(b).expect("out"), 1);
    assert_eq!(graph.in_degree(b).expect("in"), 2);
    assert_eq!(graph.degree(b).expect("degree"), 3);
    assert_eq!(
        graph.incident_edges(b, EdgeDirection::Incoming).expect("incoming"),
        vec![ab, cb]
    );
    assert_eq!(
        graph.incident_edges(b, EdgeDirection::Outgoing).expect("outgoing"),
        vec![ba]
    );
    assert_eq!(graph.edge_between(a, b).expect("lookup"), Some(ab));
    assert_eq!(graph.edge_between(b, c).expect("lookup"), None);
    assert_eq!(graph.opposite(cb, b).expect("opposite"), c);
    assert!(graph.opposite(cb, a).is_err());
}

#[test]
fn test_external_ids_are_unique_and_bidirectional() {
    let mut graph = Graph::new(GraphConfig::default());
    let alice = graph
        .add_vertex(Some(ExternalId::from("alice")))
        .expect("vertex");
    let bob = graph.add_vertex(Some(ExternalId::Int(7))).expect("vertex");
    let dup = graph
        .add_vertex(Some(ExternalId::from("alice")))
        .expect_err("duplicate id");
    assert!(matches!(dup, GraphError::IllegalArgument(_)));

    let edge = graph
        .add_edge(alice, bob, Some(ExternalId::from("knows")))
        .expect("edge");
    assert_eq!(graph.vertex_by_external_id(&ExternalId::Int(7)), Some(bob));
    assert_eq!(graph.edge_by_external_id(&ExternalId::from("knows")), Some(edge));
    assert_eq!(
        graph.external_id_of_vertex(alice).expect("lookup"),
        Some(&ExternalId::from("alice"))
    );

    graph.remove_vertex(alice).expect("remove");
    assert_eq!(graph.vertex_by_external_id(&ExternalId::from("alice")), None);
    assert_eq!(graph.edge_by_external_id(&ExternalId::from("knows")), None);
}

#[test]
fn test_every_mutation_bumps_version() {
    let mut graph = Graph::new(GraphConfig::default().weighted(true));
    let mut last = graph.version();
    let a = graph.add_vertex(None).expect("vertex");
    assert!(graph.version() > last);
    last = graph.version();
    let b = graph.add_vertex(None).expect("vertex");
    let e = graph.add_edge(a, b, None).expect("edge");
    assert!(graph.version() > last);
    last = graph.version();
    graph.set_edge_weight(e, 4.0).expect("weight");
    assert!(graph.version() > last);
    last = graph.version();
    graph.remove_edge(e).expect("remove");
    assert!(graph.version() > last);
}

#[test]
fn test_dense_index_skips_tombstones() {
    let (mut graph, vs) = triangle(GraphConfig::default());
    graph.remove_vertex(vs[0]).expect("remove");
    let index = graph.dense_index();
    assert_eq!(index.len(), 2);
    assert_eq!(index.index_of(vs[1]), Some(0));
    assert_eq!(index.index_of(vs[0]), None);
    assert_eq!(index.vertex(1), vs[2]);
}
