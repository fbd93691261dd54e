//! Map loading and naming tests
//!
//! Uses the hand-written extract in `tests/fixtures/small_town.osm` and a few
//! inline documents for individual tag rules.

use osm_traffic_sim::map::{haversine_km, MapGraph, Node, NodeId};

fn fixture_path() -> String {
    format!("{}/tests/fixtures/small_town.osm", env!("CARGO_MANIFEST_DIR"))
}

fn load_fixture() -> MapGraph {
    let mut graph = MapGraph::new();
    graph.load(fixture_path()).expect("fixture should load");
    graph
}

/// Wrap node elements and an optional way into an OSM document
fn osm_document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><osm version="0.6">{}</osm>"#,
        body
    )
}

/// Name resolved for a single node carrying `tags`
fn single_node_name(tags: &[(&str, &str)]) -> Option<String> {
    let tag_xml: String = tags
        .iter()
        .map(|(k, v)| format!(r#"<tag k="{}" v="{}"/>"#, k, v))
        .collect();
    let text = osm_document(&format!(
        r#"<node id="1" lat="10.0" lon="20.0">{}</node>"#,
        tag_xml
    ));

    let mut graph = MapGraph::new();
    graph.load_from_str(&text).expect("document should load");
    graph.node(NodeId(1)).and_then(|node| node.name.clone())
}

#[test]
fn test_fixture_counts() {
    let graph = load_fixture();

    assert_eq!(graph.node_count(), 8);
    // 1-2, 2-4 from High Street and 2-3, 3-5 from the unnamed road;
    // the building outline and the dangling reference add nothing
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.component_count(), 4);
}

#[test]
fn test_fixture_edges_are_paired_with_haversine_weights() {
    let graph = load_fixture();

    let forward = graph
        .edges(NodeId(1))
        .iter()
        .find(|edge| edge.to == NodeId(2))
        .expect("edge 1 -> 2");
    let backward = graph
        .edges(NodeId(2))
        .iter()
        .find(|edge| edge.to == NodeId(1))
        .expect("edge 2 -> 1");

    let expected = haversine_km(51.5, -0.1, 51.501, -0.1);
    assert!((forward.distance_km - expected).abs() < 1e-12);
    assert_eq!(forward.distance_km, backward.distance_km);

    // Non-highway way between 3 and 8 is ignored
    assert!(graph.edges(NodeId(8)).is_empty());
    // Reference to the missing node 999 is skipped
    assert!(graph.edges(NodeId(5)).iter().all(|edge| edge.to == NodeId(3)));
}

#[test]
fn test_fixture_names_and_backfill() {
    let graph = load_fixture();

    let station = graph.node(NodeId(1)).unwrap();
    assert_eq!(station.name.as_deref(), Some("Central Station"));
    // Own street wins over the road name
    assert_eq!(station.street_name.as_deref(), Some("Station Road"));

    let junction = graph.node(NodeId(2)).unwrap();
    assert_eq!(junction.name.as_deref(), Some("High Street"));
    assert_eq!(junction.street_name.as_deref(), Some("High Street"));

    assert_eq!(graph.node(NodeId(3)).unwrap().name.as_deref(), Some("post office"));
    assert_eq!(graph.node(NodeId(3)).unwrap().street_name, None);
    assert_eq!(
        graph.node(NodeId(5)).unwrap().name.as_deref(),
        Some("hardware store Shop")
    );
    assert_eq!(graph.node(NodeId(8)).unwrap().name.as_deref(), Some("village Area"));
    assert_eq!(graph.node(NodeId(6)).unwrap().name, None);
}

#[test]
fn test_fixture_display_names() {
    let graph = load_fixture();

    let expected = [
        (1, "Central Station (51.5000, -0.1000)"),
        (2, "High Street - Junction 1 (51.5010, -0.1000)"),
        (4, "High Street - Junction 2 (51.5010, -0.0990)"),
        (6, "Intersection #1 (51.6000, -0.2000)"),
        (7, "Intersection #2 (51.6010, -0.2010)"),
        (5, "hardware store Shop (51.5030, -0.1010)"),
        (3, "post office (51.5020, -0.1000)"),
        (8, "village Area (51.5500, -0.1500)"),
    ];

    for (id, name) in expected {
        assert_eq!(graph.display_name_of(NodeId(id)), name);
    }

    let locations = graph.named_locations();
    let listed: Vec<(i64, &str)> = locations
        .iter()
        .map(|location| (location.node_id.0, location.display_name.as_str()))
        .collect();
    assert_eq!(listed, expected.to_vec());

    let station = &locations[0];
    assert_eq!(station.lat, 51.5);
    assert_eq!(station.lon, -0.1);
}

#[test]
fn test_display_name_round_trip() {
    let graph = load_fixture();

    for id in graph.node_ids() {
        let name = graph.display_name_of(id);
        assert_eq!(graph.find_node_by_name(&name), Some(id), "{}", name);
    }
    assert_eq!(graph.find_node_by_name("Nowhere"), None);
}

#[test]
fn test_name_priority() {
    assert_eq!(
        single_node_name(&[("amenity", "cafe"), ("name:en", "Mill"), ("name", "Molen")]),
        Some("Molen".to_string())
    );
    assert_eq!(
        single_node_name(&[("name", ""), ("name:en", "Mill")]),
        Some("Mill".to_string())
    );
    assert_eq!(
        single_node_name(&[("addr:district", "Docks"), ("addr:suburb", "Harbour")]),
        Some("Harbour".to_string())
    );
    assert_eq!(
        single_node_name(&[("place", "hamlet"), ("addr:district", "Docks")]),
        Some("Docks".to_string())
    );
    assert_eq!(
        single_node_name(&[("shop", "bakery"), ("place", "square")]),
        Some("square Area".to_string())
    );
    assert_eq!(
        single_node_name(&[("shop", "bakery"), ("amenity", "fire_station")]),
        Some("fire station".to_string())
    );
    assert_eq!(
        single_node_name(&[("shop", "second_hand")]),
        Some("second hand Shop".to_string())
    );
    assert_eq!(single_node_name(&[("addr:street", "Quay Lane")]), None);
    assert_eq!(single_node_name(&[("highway", "traffic_signals")]), None);
}

#[test]
fn test_street_only_node_is_grouped_by_street() {
    let text = osm_document(
        r#"<node id="1" lat="1.0" lon="2.0"><tag k="addr:street" v="Quay Lane"/></node>"#,
    );
    let mut graph = MapGraph::new();
    graph.load_from_str(&text).unwrap();

    assert_eq!(graph.display_name_of(NodeId(1)), "Quay Lane (1.0000, 2.0000)");
}

#[test]
fn test_way_name_falls_back_to_english_then_street() {
    let text = osm_document(
        r#"
        <node id="1" lat="0.0" lon="0.0"/>
        <node id="2" lat="0.0" lon="0.001"/>
        <node id="3" lat="0.0" lon="0.002"/>
        <way id="10"><nd ref="1"/><nd ref="2"/>
            <tag k="highway" v="service"/><tag k="name:en" v="Ring Road"/></way>
        <way id="11"><nd ref="3"/><nd ref="2"/>
            <tag k="highway" v="service"/><tag k="addr:street" v="Back Lane"/></way>
        "#,
    );
    let mut graph = MapGraph::new();
    graph.load_from_str(&text).unwrap();

    assert_eq!(graph.node(NodeId(1)).unwrap().name.as_deref(), Some("Ring Road"));
    // Node 2 was already named by the first road
    assert_eq!(graph.node(NodeId(2)).unwrap().name.as_deref(), Some("Ring Road"));
    assert_eq!(graph.node(NodeId(3)).unwrap().name.as_deref(), Some("Back Lane"));
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn test_highway_tag_with_any_value_counts_as_road() {
    let text = osm_document(
        r#"
        <node id="1" lat="0.0" lon="0.0"/>
        <node id="2" lat="0.0" lon="0.001"/>
        <way id="10"><nd ref="1"/><nd ref="2"/><tag k="highway" v="footway"/></way>
        "#,
    );
    let mut graph = MapGraph::new();
    graph.load_from_str(&text).unwrap();

    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_malformed_document_leaves_graph_empty() {
    let mut graph = load_fixture();
    assert!(!graph.is_empty());

    assert!(graph.load_from_str("<osm><node id=\"1\"").is_err());
    assert!(graph.is_empty());
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.named_locations().is_empty());
}

#[test]
fn test_invalid_node_attributes_fail_the_load() {
    let mut graph = MapGraph::new();
    let text = osm_document(r#"<node id="1" lat="north" lon="0.0"/>"#);

    assert!(graph.load_from_str(&text).is_err());
    assert!(graph.is_empty());
}

#[test]
fn test_missing_file_leaves_graph_empty() {
    let mut graph = load_fixture();

    let result = graph.load("/definitely/not/a/map.osm");
    assert!(result.is_err());
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn test_edge_count_of_paired_edges() {
    let mut graph = MapGraph::new();
    for id in 1..=4 {
        graph.add_node(Node::new(NodeId(id), 0.0, id as f64 * 0.01));
    }

    graph.add_edge(NodeId(1), NodeId(2), 1.0);
    graph.add_edge(NodeId(2), NodeId(1), 1.0);
    graph.add_edge(NodeId(2), NodeId(3), 2.0);
    graph.add_edge(NodeId(3), NodeId(2), 2.0);
    graph.add_road(NodeId(3), NodeId(4)).unwrap();

    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.add_road(NodeId(1), NodeId(99)), None);
    assert_eq!(graph.edge_count(), 3);
}

#[test]
fn test_display_name_fallback() {
    let mut graph = MapGraph::new();
    graph.add_node(Node::new(NodeId(5), 1.0, 2.0));

    // Not indexed until the names are rebuilt
    assert_eq!(graph.display_name_of(NodeId(5)), "Node 5 (1.0000,2.0000)");
    assert_eq!(graph.display_name_of(NodeId(42)), "Node 42");

    graph.rebuild_name_index();
    assert_eq!(
        graph.display_name_of(NodeId(5)),
        "Unnamed Location (1.0000, 2.0000)"
    );
}

#[test]
fn test_reload_replaces_previous_map() {
    let mut graph = load_fixture();
    let text = osm_document(r#"<node id="77" lat="0.0" lon="0.0"/>"#);

    graph.load_from_str(&text).unwrap();
    assert_eq!(graph.node_count(), 1);
    assert!(!graph.has_node(NodeId(1)));
    assert_eq!(graph.find_node_by_name("Central Station (51.5000, -0.1000)"), None);
}
