//! Vehicle spawning and movement
//!
//! Vehicles live in a flat list indexed by id and are never removed. Each
//! tick every vehicle still en route checks the light ahead and the vehicles
//! around it, then moves along its edge if nothing holds it back.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::intersection::IntersectionControl;
use super::types::{
    Position, VehicleColor, VehicleId, MAX_VEHICLE_SPEED, MIN_VEHICLE_GAP, MIN_VEHICLE_SPEED,
    STOP_LINE_DISTANCE_KM,
};
use super::vehicle::SimVehicle;
use crate::map::{MapGraph, NodeId};

/// All vehicles of a simulation run
#[derive(Debug, Clone)]
pub struct VehicleFleet {
    vehicles: Vec<SimVehicle>,

    /// Next ID to assign
    next_id: u64,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl Default for VehicleFleet {
    fn default() -> Self {
        Self::new(None)
    }
}

impl VehicleFleet {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            vehicles: Vec::new(),
            next_id: 1,
            rng: seed.map(StdRng::seed_from_u64),
        }
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distr::uniform::SampleUniform,
        R: rand::distr::uniform::SampleRange<T>,
    {
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    /// Remove every vehicle and restart ids at 1
    pub fn clear(&mut self) {
        self.vehicles.clear();
        self.next_id = 1;
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Vehicles in creation order
    pub fn vehicles(&self) -> &[SimVehicle] {
        &self.vehicles
    }

    /// Mutable access for scripted scenarios; paths must not be changed
    pub fn vehicles_mut(&mut self) -> &mut [SimVehicle] {
        &mut self.vehicles
    }

    pub fn get(&self, id: VehicleId) -> Option<&SimVehicle> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.vehicles.get(index).filter(|vehicle| vehicle.id == id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut SimVehicle> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.vehicles.get_mut(index).filter(|vehicle| vehicle.id == id)
    }

    /// Spawn a vehicle routed from `source` to `destination`
    ///
    /// Returns `None` without changing the fleet if either node is unknown or
    /// no route of at least one edge connects them.
    pub fn add_vehicle(
        &mut self,
        graph: &MapGraph,
        source: NodeId,
        destination: NodeId,
    ) -> Option<VehicleId> {
        if !graph.has_node(source) || !graph.has_node(destination) {
            return None;
        }

        let route = graph.shortest_path(source, destination).ok()?;
        if route.path.len() < 2 {
            return None;
        }

        let position = graph
            .node(source)
            .map(|node| Position::from(node.position))
            .unwrap_or_default();

        let id = VehicleId(self.next_id);
        self.next_id += 1;

        let speed = self.random_range(MIN_VEHICLE_SPEED..MAX_VEHICLE_SPEED);
        let color = VehicleColor::from_hue(self.random_range(0..360u16));

        debug!(
            "Vehicle {} spawned: {} -> {} over {} nodes ({:.3} km), speed {:.1}",
            id.0,
            source,
            destination,
            route.path.len(),
            route.total_distance_km,
            speed
        );

        self.vehicles
            .push(SimVehicle::new(id, route.path, speed, color, position));
        Some(id)
    }

    /// Let released vehicles move again on a later tick
    pub fn release(&mut self, released: &[VehicleId]) {
        for id in released {
            if let Some(vehicle) = self.get_mut(*id) {
                vehicle.waiting_at_light = false;
            }
        }
    }

    /// `true` if another vehicle is just ahead of vehicle `index` on the same edge index
    fn is_too_close(&self, index: usize) -> bool {
        let vehicle = &self.vehicles[index];
        self.vehicles.iter().enumerate().any(|(other_index, other)| {
            other_index != index
                && other.current_index == vehicle.current_index
                && other.progress > vehicle.progress
                && other.progress - vehicle.progress < MIN_VEHICLE_GAP
        })
    }

    /// Update all vehicles in creation order
    pub fn update(&mut self, delta_secs: f64, graph: &MapGraph, control: &mut IntersectionControl) {
        for index in 0..self.vehicles.len() {
            let Some((from, to)) = self.vehicles[index].current_edge() else {
                continue;
            };

            let (Some(start), Some(end)) = (graph.node(from), graph.node(to)) else {
                warn!(
                    "Vehicle {} is on edge {} -> {} which is not in the map",
                    self.vehicles[index].id.0, from, to
                );
                continue;
            };
            let edge_length_km = start.position.distance_km(&end.position);

            let vehicle = &mut self.vehicles[index];
            let remaining_km = edge_length_km * (1.0 - vehicle.progress);
            let stop_for_light = control.is_red(to) && remaining_km < STOP_LINE_DISTANCE_KM;
            if stop_for_light {
                vehicle.waiting_at_light = true;
                control.enqueue(to, vehicle.id);
            }

            let too_close = self.is_too_close(index);

            let vehicle = &mut self.vehicles[index];
            if stop_for_light || too_close || vehicle.waiting_at_light {
                continue;
            }

            vehicle.advance(graph, edge_length_km, delta_secs);
        }
    }
}
