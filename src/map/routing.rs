//! Shortest routes over the road network
//!
//! Dijkstra with a linear scan for the next node instead of a heap. The scan
//! visits nodes in ascending id order and keeps the first strictly smaller
//! distance, so among equal-cost routes the one through lower ids wins.

use ordered_float::OrderedFloat;
use thiserror::Error;

use super::graph::MapGraph;
use super::types::NodeId;

/// A route between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Node ids from source to destination, both included
    pub path: Vec<NodeId>,
    pub total_distance_km: f64,
}

impl Route {
    /// `true` if source and destination are the same node
    pub fn is_trivial(&self) -> bool {
        self.path.len() < 2
    }
}

/// Reasons a route could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Source node {0} not found in graph")]
    SourceNotFound(NodeId),

    #[error("Destination node {0} not found in graph")]
    DestinationNotFound(NodeId),

    #[error("No path found from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("Path reconstruction failed: node {at} has no predecessor")]
    Reconstruction { at: NodeId },
}

impl MapGraph {
    /// Find the shortest route from `source` to `destination`
    pub fn shortest_path(&self, source: NodeId, destination: NodeId) -> Result<Route, PathError> {
        if !self.has_node(source) {
            return Err(PathError::SourceNotFound(source));
        }
        if !self.has_node(destination) {
            return Err(PathError::DestinationNotFound(destination));
        }
        if source == destination {
            return Ok(Route {
                path: vec![source],
                total_distance_km: 0.0,
            });
        }

        // Ascending, so index order is id order
        let ids: Vec<NodeId> = self.node_ids().collect();
        let index_of = |id: NodeId| ids.binary_search(&id).ok();

        let start = index_of(source).ok_or(PathError::SourceNotFound(source))?;
        let goal = index_of(destination).ok_or(PathError::DestinationNotFound(destination))?;

        let mut distance = vec![f64::INFINITY; ids.len()];
        let mut visited = vec![false; ids.len()];
        let mut previous: Vec<Option<usize>> = vec![None; ids.len()];
        distance[start] = 0.0;

        // min_by_key keeps the first of equal keys
        while let Some(current) = (0..ids.len())
            .filter(|&i| !visited[i])
            .min_by_key(|&i| OrderedFloat(distance[i]))
        {
            if distance[current].is_infinite() {
                break;
            }

            visited[current] = true;
            if current == goal {
                break;
            }

            for edge in self.edges(ids[current]) {
                let Some(next) = index_of(edge.to) else {
                    continue;
                };

                let candidate = distance[current] + edge.distance_km;
                if candidate < distance[next] {
                    distance[next] = candidate;
                    previous[next] = Some(current);
                }
            }
        }

        if distance[goal].is_infinite() {
            return Err(PathError::NoPath {
                from: source,
                to: destination,
            });
        }

        let mut path = vec![destination];
        let mut cursor = goal;
        while cursor != start {
            cursor = previous[cursor].ok_or(PathError::Reconstruction { at: ids[cursor] })?;
            path.push(ids[cursor]);
        }
        path.reverse();

        Ok(Route {
            path,
            total_distance_km: distance[goal],
        })
    }
}
