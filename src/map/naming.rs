//! Human-readable names for road-network nodes
//!
//! Names come from OSM tags in a fixed priority order. Once the graph is
//! loaded, every node gets a unique display name built from its base name and
//! its coordinates, with ordinals to tell same-named nodes apart.

use std::collections::BTreeMap;

use super::types::{Node, NodeId};

/// Base name for nodes with neither a name nor a street
pub const UNNAMED_LOCATION: &str = "Unnamed Location";

/// Tag list of an element, in document order
pub type Tags<'a> = [(&'a str, &'a str)];

/// First non-empty value for `key`
fn tag<'a>(tags: &Tags<'a>, key: &str) -> Option<&'a str> {
    tags.iter()
        .filter(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .find(|v| !v.is_empty())
}

/// Resolve the display name of a node from its own tags
pub fn resolve_node_name(tags: &Tags<'_>) -> Option<String> {
    tag(tags, "name")
        .map(str::to_string)
        .or_else(|| tag(tags, "name:en").map(str::to_string))
        .or_else(|| tag(tags, "addr:suburb").map(str::to_string))
        .or_else(|| tag(tags, "addr:district").map(str::to_string))
        .or_else(|| tag(tags, "place").map(|place| format!("{} Area", place)))
        .or_else(|| tag(tags, "amenity").map(|amenity| amenity.replace('_', " ")))
        .or_else(|| tag(tags, "shop").map(|shop| format!("{} Shop", shop.replace('_', " "))))
}

/// Resolve the street a node lies on from its own tags
pub fn resolve_street_name(tags: &Tags<'_>) -> Option<String> {
    tag(tags, "addr:street").map(str::to_string)
}

/// Resolve the name of a road, used to backfill the nodes it passes through
pub fn resolve_way_name(tags: &Tags<'_>) -> Option<String> {
    tag(tags, "name")
        .or_else(|| tag(tags, "name:en"))
        .or_else(|| tag(tags, "addr:street"))
        .map(str::to_string)
}

/// Name a node is grouped under before disambiguation
pub fn base_name(node: &Node) -> &str {
    node.name
        .as_deref()
        .or(node.street_name.as_deref())
        .unwrap_or(UNNAMED_LOCATION)
}

fn coordinates(node: &Node) -> String {
    format!("({:.4}, {:.4})", node.lat(), node.lon())
}

/// Generate a display name for every node
///
/// Nodes are grouped by base name in lexicographic order, members of a group
/// in ascending id order. A lone node keeps its base name. Unnamed nodes that
/// share the group get a running `Intersection #k` counter that spans every
/// unnamed group; other shared names get a 1-based `Junction` ordinal.
pub fn generate_display_names(nodes: &BTreeMap<NodeId, Node>) -> Vec<(NodeId, String)> {
    let mut groups: BTreeMap<&str, Vec<&Node>> = BTreeMap::new();
    for node in nodes.values() {
        groups.entry(base_name(node)).or_default().push(node);
    }

    let mut names = Vec::with_capacity(nodes.len());
    let mut intersection_counter = 0usize;

    for (base, members) in groups {
        if members.len() == 1 {
            let node = members[0];
            names.push((node.id, format!("{} {}", base, coordinates(node))));
            continue;
        }

        for (index, node) in members.iter().enumerate() {
            let display_name = if base == UNNAMED_LOCATION {
                intersection_counter += 1;
                format!("Intersection #{} {}", intersection_counter, coordinates(node))
            } else {
                format!("{} - Junction {} {}", base, index + 1, coordinates(node))
            };
            names.push((node.id, display_name));
        }
    }

    names
}
