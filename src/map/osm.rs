//! OSM XML reader
//!
//! Reads `node` and `way` elements of an OpenStreetMap XML extract in two
//! passes. The first pass records every node with the names its own tags
//! carry. The second pass walks ways tagged `highway=*`, backfills street and
//! node names from the road name, and adds a two-way edge for every pair of
//! consecutive node references that both exist. Everything else in the
//! document (relations, bounds, non-road ways) is ignored.

use anyhow::{Context, Result};
use std::str::FromStr;

use super::graph::MapGraph;
use super::naming;
use super::types::{Node, NodeId};

type XmlNode<'a, 'input> = roxmltree::Node<'a, 'input>;

/// Build a graph from an OSM XML document
pub fn read_extract(text: &str) -> Result<MapGraph> {
    let document = roxmltree::Document::parse(text).context("Malformed OSM XML")?;
    let mut graph = MapGraph::new();

    // Pass 1: nodes
    for element in document.descendants().filter(|e| e.has_tag_name("node")) {
        let id = NodeId(attribute(element, "id").context("Invalid node element")?);
        let lat = attribute(element, "lat").with_context(|| format!("Invalid node {}", id))?;
        let lon = attribute(element, "lon").with_context(|| format!("Invalid node {}", id))?;

        let tags = element_tags(element);
        let mut node = Node::new(id, lat, lon);
        node.name = naming::resolve_node_name(&tags);
        node.street_name = naming::resolve_street_name(&tags);
        graph.add_node(node);
    }

    // Pass 2: roads
    for element in document.descendants().filter(|e| e.has_tag_name("way")) {
        let tags = element_tags(element);
        if !tags.iter().any(|(k, _)| *k == "highway") {
            continue;
        }

        let refs = element
            .children()
            .filter(|child| child.has_tag_name("nd"))
            .map(|nd| attribute(nd, "ref").map(NodeId))
            .collect::<Result<Vec<NodeId>>>()
            .with_context(|| format!("Invalid node reference in way {:?}", element.attribute("id")))?;

        if let Some(way_name) = naming::resolve_way_name(&tags) {
            for id in &refs {
                if let Some(node) = graph.node_mut(*id) {
                    if node.street_name.is_none() {
                        node.street_name = Some(way_name.clone());
                    }
                    if node.name.is_none() {
                        node.name = Some(way_name.clone());
                    }
                }
            }
        }

        for pair in refs.windows(2) {
            // Unknown references yield no edge
            graph.add_road(pair[0], pair[1]);
        }
    }

    graph.rebuild_name_index();
    Ok(graph)
}

/// `k`/`v` pairs of the element's `tag` children
fn element_tags<'a>(element: XmlNode<'a, '_>) -> Vec<(&'a str, &'a str)> {
    element
        .children()
        .filter(|child| child.has_tag_name("tag"))
        .filter_map(|tag| Some((tag.attribute("k")?, tag.attribute("v")?)))
        .collect()
}

fn attribute<T>(element: XmlNode<'_, '_>, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    element
        .attribute(name)
        .with_context(|| format!("Missing `{}` attribute", name))?
        .trim()
        .parse()
        .with_context(|| format!("Unparsable `{}` attribute", name))
}
