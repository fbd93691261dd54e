//! Road-network graph built from an OSM extract
//!
//! Nodes and adjacency are kept in ordered maps so that every enumeration
//! (naming, routing tie-breaks, traffic-light sampling) runs in ascending id
//! order and stays reproducible between runs.

use anyhow::{Context, Result};
use log::info;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::naming;
use super::osm;
use super::types::{Edge, NamedLocation, Node, NodeId};

/// Road network with a unique display name for every node
#[derive(Debug, Clone, Default)]
pub struct MapGraph {
    /// All nodes by id
    nodes: BTreeMap<NodeId, Node>,

    /// Outgoing edges per node. Roads are stored as one edge in each direction.
    adjacency: BTreeMap<NodeId, Vec<Edge>>,

    /// Display name to node id
    name_index: BTreeMap<String, NodeId>,

    /// Node id to display name
    display_names: BTreeMap<NodeId, String>,
}

impl MapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every node, edge and name
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.adjacency.clear();
        self.name_index.clear();
        self.display_names.clear();
    }

    /// Replace the graph with the contents of an OSM XML file
    ///
    /// On failure the graph is left empty.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.clear();

        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read map file {}", path.display()))?;

        self.load_from_str(&text)
            .with_context(|| format!("Failed to load map file {}", path.display()))
    }

    /// Replace the graph with the contents of an in-memory OSM XML document
    ///
    /// On failure the graph is left empty.
    pub fn load_from_str(&mut self, text: &str) -> Result<()> {
        self.clear();

        *self = osm::read_extract(text)?;

        info!(
            "Loaded map: {} nodes, {} edges, {} named locations",
            self.node_count(),
            self.edge_count(),
            self.name_index.len()
        );
        Ok(())
    }

    /// Add a node, replacing any node with the same id
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Add a single directed edge
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, distance_km: f64) {
        self.adjacency
            .entry(from)
            .or_default()
            .push(Edge { to, distance_km });
    }

    /// Add a two-way road weighted by the great-circle distance between its ends
    ///
    /// Returns the road length, or `None` if either end is not in the graph.
    pub fn add_road(&mut self, a: NodeId, b: NodeId) -> Option<f64> {
        let distance_km = self
            .nodes
            .get(&a)?
            .position
            .distance_km(&self.nodes.get(&b)?.position);

        self.add_edge(a, b, distance_km);
        self.add_edge(b, a, distance_km);
        Some(distance_km)
    }

    /// Regenerate display names after nodes were added or renamed
    pub fn rebuild_name_index(&mut self) {
        self.name_index.clear();
        self.display_names.clear();

        for (id, mut display_name) in naming::generate_display_names(&self.nodes) {
            if self.name_index.contains_key(&display_name) {
                display_name = format!("{} [{}]", display_name, id);
            }
            self.name_index.insert(display_name.clone(), id);
            self.display_names.insert(id, display_name);
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Node ids in ascending order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Outgoing edges of a node
    pub fn edges(&self, id: NodeId) -> &[Edge] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of two-way roads
    ///
    /// Counts directed edges and halves the total, so it only holds while
    /// every edge has its reverse counterpart.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node with its display name, sorted alphabetically by name
    pub fn named_locations(&self) -> Vec<NamedLocation> {
        self.name_index
            .iter()
            .filter_map(|(display_name, id)| {
                let node = self.nodes.get(id)?;
                Some(NamedLocation {
                    node_id: *id,
                    display_name: display_name.clone(),
                    lat: node.lat(),
                    lon: node.lon(),
                })
            })
            .collect()
    }

    pub fn find_node_by_name(&self, display_name: &str) -> Option<NodeId> {
        self.name_index.get(display_name).copied()
    }

    /// Display name of a node, or a coordinate-based fallback for unindexed ids
    pub fn display_name_of(&self, id: NodeId) -> String {
        if let Some(display_name) = self.display_names.get(&id) {
            return display_name.clone();
        }

        match self.nodes.get(&id) {
            Some(node) => format!("Node {} ({:.4},{:.4})", id, node.lat(), node.lon()),
            None => format!("Node {}", id),
        }
    }

    /// Convert to a petgraph graph, returning the node index of every map node
    pub fn to_petgraph(&self) -> (DiGraph<NodeId, f64>, BTreeMap<NodeId, NodeIndex>) {
        let edge_total = self.adjacency.values().map(Vec::len).sum();
        let mut graph = DiGraph::with_capacity(self.nodes.len(), edge_total);

        let indices: BTreeMap<NodeId, NodeIndex> = self
            .nodes
            .keys()
            .map(|id| (*id, graph.add_node(*id)))
            .collect();

        for (from, edges) in &self.adjacency {
            for edge in edges {
                if let (Some(a), Some(b)) = (indices.get(from), indices.get(&edge.to)) {
                    graph.add_edge(*a, *b, edge.distance_km);
                }
            }
        }

        (graph, indices)
    }

    /// Number of connected pieces of road network (isolated nodes count as one each)
    pub fn component_count(&self) -> usize {
        let (graph, _) = self.to_petgraph();
        petgraph::algo::connected_components(&graph)
    }
}
