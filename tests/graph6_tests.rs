use std::io::Cursor;

use nativegraph::{
    Engine, ExternalId, Graph, GraphConfig, GraphError,
    bench_utils::{GraphShape, generate_graph},
    codec::{
        Format, decode_edge_list, decode_json_edge_list, encode, import, read_graph,
        read_json_edge_list, write_graph,
    },
};

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

#[test]
fn test_known_graph6_strings() {
    let path = build(GraphConfig::undirected(), 3, &[(0, 1), (1, 2)]);
    assert_eq!(encode(&path, Format::Graph6, false).expect("encode"), "Bg");

    let cycle = build(
        GraphConfig::undirected(),
        5,
        &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)],
    );
    assert_eq!(encode(&cycle, Format::Graph6, false).expect("encode"), "Dhc");
    assert_eq!(
        encode(&cycle, Format::Graph6, true).expect("encode"),
        ">>graph6<<Dhc"
    );
}

#[test]
fn test_decode_graph6() {
    let decoded = decode_edge_list("Dhc\n").expect("decode");
    assert_eq!(decoded.format, Format::Graph6);
    assert_eq!(decoded.vertex_count, 5);
    assert_eq!(decoded.edges, vec![(0, 1), (1, 2), (2, 3), (0, 4), (3, 4)]);
}

#[test]
fn test_known_sparse6_string() {
    let decoded = decode_edge_list(":Fa@x^").expect("decode");
    assert_eq!(decoded.format, Format::Sparse6);
    assert_eq!(decoded.vertex_count, 7);
    assert_eq!(decoded.edges, vec![(0, 1), (0, 2), (1, 2), (5, 6)]);

    let graph = build(GraphConfig::undirected(), 7, &decoded.edges);
    assert_eq!(encode(&graph, Format::Sparse6, false).expect("encode"), ":Fa@x^");
    assert_eq!(
        encode(&graph, Format::Sparse6, true).expect("encode"),
        ">>sparse6<<:Fa@x^"
    );
}

#[test]
fn test_large_vertex_count_field() {
    let graph = build(GraphConfig::undirected(), 63, &[]);
    let text = encode(&graph, Format::Graph6, false).expect("encode");
    assert!(text.starts_with("~??~"));
    let decoded = decode_edge_list(&text).expect("decode");
    assert_eq!(decoded.vertex_count, 63);
    assert!(decoded.edges.is_empty());
}

#[test]
fn test_export_renumbers_live_vertices() {
    let mut graph = build(GraphConfig::undirected(), 4, &[(0, 2), (2, 3)]);
    graph.add_edge(1, 3, None).expect("edge");
    graph.remove_vertex(1).expect("remove");
    assert_eq!(encode(&graph, Format::Graph6, false).expect("encode"), "Bg");
}

#[test]
fn test_graph6_rejects_loops_and_multiple_edges() {
    let looped = build(GraphConfig::pseudograph(), 2, &[(0, 1), (1, 1)]);
    let err = encode(&looped, Format::Graph6, false).expect_err("loop");
    assert!(matches!(err, GraphError::IllegalArgument(_)));

    let antiparallel = build(GraphConfig::directed(), 2, &[(0, 1), (1, 0)]);
    let err = encode(&antiparallel, Format::Graph6, false).expect_err("multiple");
    assert!(matches!(err, GraphError::IllegalArgument(_)));

    // sparse6 carries both
    let text = encode(&looped, Format::Sparse6, false).expect("sparse6");
    let decoded = decode_edge_list(&text).expect("decode");
    assert_eq!(decoded.edges, vec![(0, 1), (1, 1)]);
}

#[test]
fn test_random_graphs_survive_both_formats() {
    for seed in 0..40u64 {
        let n = 2 + (seed as usize * 7) % 70;
        let edges = (seed as usize * 13) % (n * (n - 1) / 2 + 1);
        let dataset = generate_graph(GraphShape::RandomErdosRenyi { edges }, n, seed);
        let (graph, _) = dataset
            .materialize(GraphConfig::undirected())
            .expect("materialize");
        for format in [Format::Graph6, Format::Sparse6] {
            let text = encode(&graph, format, seed % 2 == 0).expect("encode");
            let mut copy = Graph::new(GraphConfig::undirected());
            import(&mut copy, &text, None).expect("import");
            assert_eq!(copy.vertex_count(), graph.vertex_count(), "seed {seed}");
            assert_eq!(copy.edge_count(), graph.edge_count(), "seed {seed}");
            assert_eq!(
                encode(&copy, format, false).expect("re-encode"),
                encode(&graph, format, false).expect("encode"),
                "seed {seed}"
            );
        }
    }
}

#[test]
fn test_sparse6_multigraph_round_trip() {
    let graph = build(
        GraphConfig::pseudograph(),
        6,
        &[(0, 0), (0, 1), (1, 0), (4, 5), (5, 5), (2, 5)],
    );
    let text = encode(&graph, Format::Sparse6, false).expect("encode");
    let mut copy = Graph::new(GraphConfig::pseudograph());
    import(&mut copy, &text, None).expect("import");
    assert_eq!(copy.edge_count(), 6);
    assert_eq!(copy.degree(0).expect("degree"), 4);
    assert_eq!(copy.degree(5).expect("degree"), 4);
    assert_eq!(encode(&copy, Format::Sparse6, false).expect("re-encode"), text);
}

#[test]
fn test_sparse6_padding_does_not_add_a_loop() {
    // n = 4 (k = 2) with the last edge on vertex n - 2
    for edges in [
        vec![(0, 1), (1, 2), (0, 2)],
        vec![(0, 1), (1, 2)],
        vec![(0, 2)],
        vec![(2, 2)],
    ] {
        let graph = build(GraphConfig::pseudograph(), 4, &edges);
        let text = encode(&graph, Format::Sparse6, false).expect("encode");
        let decoded = decode_edge_list(&text).expect("decode");
        assert_eq!(decoded.edges.len(), edges.len(), "{text}");
    }
}

#[test]
fn test_import_appends_to_existing_graph() {
    let mut graph = build(GraphConfig::undirected(), 2, &[(0, 1)]);
    let vertices = import(&mut graph, ">>graph6<<Bg", None).expect("import");
    assert_eq!(vertices, vec![2, 3, 4]);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.edge_between(3, 4).expect("lookup"), Some(2));
}

#[test]
fn test_mapper_reuses_vertices_with_the_same_id() {
    let mut graph = Graph::new(GraphConfig::pseudograph());
    let offset = |position: &str| position.parse::<i64>().map_or(-1, |p| p + 100);
    let first = import(&mut graph, "Bg", Some(&offset)).expect("import");
    let second = import(&mut graph, "Bg", Some(&offset)).expect("import again");
    assert_eq!(first, second);
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.vertex_by_external_id(&ExternalId::Int(101)), Some(first[1]));
}

#[test]
fn test_malformed_input_is_io_error() {
    for input in [
        "",
        "  \n",
        "B",
        "B g",
        "Bgg",
        "&Bg",
        ">>graph6<<:Fa@x^",
        ">>sparse6<<Bg",
        // 2^36 - 1 vertices followed by three body bytes
        "~~~~~~~~???",
        "~~~~~~~~",
    ] {
        let err = decode_edge_list(input).expect_err(input);
        assert!(matches!(err, GraphError::Io(_)), "{input:?}: {err}");
    }
}

#[test]
fn test_huge_empty_sparse6_graph_is_refused_on_import() {
    let decoded = decode_edge_list(":~~~~~~~~").expect("well-formed sparse6");
    assert_eq!(decoded.vertex_count, (1 << 36) - 1);
    assert!(decoded.edges.is_empty());

    let mut graph = Graph::new(GraphConfig::pseudograph());
    let err = import(&mut graph, ":~~~~~~~~", None).expect_err("too many vertices");
    assert!(matches!(err, GraphError::Io(_)), "{err}");
    assert_eq!(graph.vertex_count(), 0);
}

#[test]
fn test_failed_import_is_not_rolled_back() {
    // a loop decoded into a simple graph fails after the vertices exist
    let mut graph = Graph::new(GraphConfig::undirected());
    let looped = build(GraphConfig::pseudograph(), 2, &[(0, 1), (1, 1)]);
    let text = encode(&looped, Format::Sparse6, false).expect("encode");
    let err = import(&mut graph, &text, None).expect_err("loop in simple graph");
    assert!(matches!(err, GraphError::IllegalArgument(_)));
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_writer_and_reader() {
    let graph = build(GraphConfig::undirected(), 3, &[(0, 1), (1, 2)]);
    let mut out = Vec::new();
    write_graph(&graph, Format::Graph6, true, &mut out).expect("write");
    assert_eq!(out, b">>graph6<<Bg\n");

    let mut copy = Graph::new(GraphConfig::undirected());
    read_graph(&mut copy, &mut Cursor::new(out), None).expect("read");
    assert_eq!(copy.edge_count(), 2);
}

#[test]
fn test_engine_export_and_import() {
    let mut engine = Engine::new();
    let source = engine.create_graph(GraphConfig::undirected());
    let a = engine.add_vertex(source).expect("vertex");
    let b = engine.add_vertex(source).expect("vertex");
    let c = engine.add_vertex(source).expect("vertex");
    engine.add_edge(source, a, b).expect("edge");
    engine.add_edge(source, b, c).expect("edge");
    let text = engine
        .export_graph(source, Format::Sparse6, false)
        .expect("export");

    let target = engine.create_graph(GraphConfig::undirected());
    let vertices = engine.import_graph(target, &text, None).expect("import");
    assert_eq!(vertices.len(), 3);
    assert_eq!(engine.edge_count(target).expect("edges"), 2);

    let err = engine.import_graph(target, "&Bg", None).expect_err("digraph6");
    assert!(matches!(err, GraphError::Io(_)));
    assert_eq!(engine.last_status(), nativegraph::Status::IoError);
}

const JSON_DOCUMENT: &str = r#"{
  "creator": "exporter",
  "version": "1",
  "nodes": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
  "edges": [
    {"source": "a", "target": "b", "weight": 3.5},
    {"source": "b", "target": "c"},
    {"id": "e2", "source": "c", "target": "a", "weight": -1.0}
  ]
}"#;

fn letter_ids(id: &str) -> i64 {
    id.bytes()
        .next()
        .map_or(-1, |b| i64::from(b) - i64::from(b'a') + 10)
}

#[test]
fn test_json_edge_list_maps_ids_and_defaults_weight() {
    let list = decode_json_edge_list(JSON_DOCUMENT, &letter_ids).expect("decode");
    assert_eq!(
        list.as_slice().to_vec(),
        vec![(10, 11, 3.5), (11, 12, 1.0), (12, 10, -1.0)]
    );

    let again = read_json_edge_list(Cursor::new(JSON_DOCUMENT), &letter_ids).expect("read");
    assert_eq!(again, list);

    let err = list.get(3).expect_err("past the end");
    assert!(matches!(err, GraphError::IndexOutOfBounds(_)));
}

#[test]
fn test_malformed_json_edge_list_is_io_error() {
    for input in [
        "",
        "{",
        r#"{"edges": [{"source": "a"}]}"#,
        r#"{"edges": [{"source": true, "target": "b"}]}"#,
        r#"{"edges": [{"source": "a", "target": "b", "weight": "heavy"}]}"#,
    ] {
        let err = decode_json_edge_list(input, &letter_ids).expect_err(input);
        assert!(matches!(err, GraphError::Io(_)), "{input:?}: {err}");
    }
}

#[test]
fn test_engine_json_edge_list_handles() {
    let mut engine = Engine::new();
    let list = engine
        .import_edge_list_json(JSON_DOCUMENT, &letter_ids)
        .expect("import");
    assert_eq!(engine.edge_list_len(list).expect("len"), 3);
    assert_eq!(engine.edge_list_get(list, 1).expect("entry"), (11, 12, 1.0));

    let err = engine.edge_list_get(list, 7).expect_err("out of range");
    assert!(matches!(err, GraphError::IndexOutOfBounds(_)));
    assert_eq!(engine.last_status(), nativegraph::Status::IndexOutOfBounds);
    assert_eq!(engine.last_status().code(), 4);

    let path = std::env::temp_dir().join(format!("nativegraph-edges-{}.json", std::process::id()));
    std::fs::write(&path, JSON_DOCUMENT).expect("write document");
    let from_file = engine
        .import_edge_list_json_file(&path, &letter_ids)
        .expect("import file");
    std::fs::remove_file(&path).expect("remove document");
    assert_eq!(engine.edge_list_get(from_file, 2).expect("entry"), (12, 10, -1.0));

    let missing = std::env::temp_dir().join("nativegraph-no-such-file.json");
    let err = engine
        .import_edge_list_json_file(&missing, &letter_ids)
        .expect_err("missing file");
    assert!(matches!(err, GraphError::Io(_)));

    // wrong handle kind
    let graph = engine.create_graph(GraphConfig::undirected());
    assert!(matches!(
        engine.edge_list_len(graph),
        Err(GraphError::InvalidHandle(_))
    ));
}
