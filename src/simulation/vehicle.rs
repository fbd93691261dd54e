//! Vehicle state for the traffic simulation

use super::types::{Position, VehicleColor, VehicleId};
use crate::map::{MapGraph, NodeId};

/// A vehicle following a fixed route
#[derive(Debug, Clone, PartialEq)]
pub struct SimVehicle {
    pub id: VehicleId,
    /// Node ids of the route, fixed at creation
    pub path: Vec<NodeId>,
    /// Index of the edge `path[current_index] -> path[current_index + 1]`
    pub current_index: usize,
    /// Fraction of the current edge already covered, 0.0..=1.0
    pub progress: f64,
    pub speed: f64,
    pub waiting_at_light: bool,
    pub color: VehicleColor,
    pub position: Position,
}

impl SimVehicle {
    pub fn new(
        id: VehicleId,
        path: Vec<NodeId>,
        speed: f64,
        color: VehicleColor,
        position: Position,
    ) -> Self {
        Self {
            id,
            path,
            current_index: 0,
            progress: 0.0,
            speed,
            waiting_at_light: false,
            color,
            position,
        }
    }

    /// Endpoints of the edge the vehicle is on, or `None` once it has arrived
    pub fn current_edge(&self) -> Option<(NodeId, NodeId)> {
        let from = *self.path.get(self.current_index)?;
        let to = *self.path.get(self.current_index + 1)?;
        Some((from, to))
    }

    /// A finished vehicle stays in the fleet but never moves again
    pub fn is_finished(&self) -> bool {
        self.current_index + 1 >= self.path.len()
    }

    pub fn destination(&self) -> Option<NodeId> {
        self.path.last().copied()
    }

    /// Move along the current edge
    ///
    /// Progress grows by the distance covered over the edge length in meters.
    /// Passing the end of the edge moves to the start of the next one; the
    /// overshoot is dropped.
    pub fn advance(&mut self, graph: &MapGraph, edge_length_km: f64, delta_secs: f64) {
        let step = if edge_length_km > 0.0 {
            self.speed * delta_secs / (edge_length_km * 1000.0)
        } else {
            // Zero-length edge, crossed at once
            f64::INFINITY
        };

        self.progress += step;
        if self.progress > 1.0 {
            self.progress = 0.0;
            self.current_index += 1;
        }

        self.update_position(graph);
    }

    /// Recompute the map position from the current edge and progress
    pub fn update_position(&mut self, graph: &MapGraph) {
        let position = match self.current_edge() {
            Some((from, to)) => graph.node(from).zip(graph.node(to)).map(|(a, b)| {
                Position::from(a.position).lerp(&Position::from(b.position), self.progress)
            }),
            None => self
                .destination()
                .and_then(|id| graph.node(id))
                .map(|node| Position::from(node.position)),
        };

        if let Some(position) = position {
            self.position = position;
        }
    }
}
