//! Fixed-timestep driver that ties the map, lights and vehicles together
//!
//! This is the entry point for running the traffic simulation. A host calls
//! [`SimulationScheduler::tick`] on its own timer (or [`SimulationScheduler::advance`]
//! with an explicit time step); each tick advances the lights, drains the
//! light queues, moves the vehicles and hands snapshots to the observers.

use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

use super::fleet::VehicleFleet;
use super::intersection::{IntersectionControl, SimTrafficLight};
use super::observer::SimulationObserver;
use super::types::{VehicleId, DEFAULT_TICK_INTERVAL};
use super::vehicle::SimVehicle;
use crate::map::{MapGraph, NodeId};

/// Timing and randomness settings of a simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Simulated seconds per tick at multiplier 1.0
    pub tick_interval: f64,
    pub speed_multiplier: f64,
    /// Seed for vehicle speeds and colors; `None` draws from the thread RNG
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            speed_multiplier: 1.0,
            seed: None,
        }
    }
}

/// The simulation: map, traffic lights and vehicles behind one tick loop
///
/// All mutation goes through `&mut self`, so a host that shares the
/// scheduler has to serialize ticks, loads and vehicle spawns itself.
pub struct SimulationScheduler {
    graph: MapGraph,
    control: IntersectionControl,
    fleet: VehicleFleet,
    tick_interval: f64,
    speed_multiplier: f64,
    running: bool,

    /// Simulated time since the last reset
    time: f64,
    ticks: u64,

    observers: Vec<Box<dyn SimulationObserver>>,
}

impl Default for SimulationScheduler {
    fn default() -> Self {
        Self::new(MapGraph::new())
    }
}

impl SimulationScheduler {
    pub fn new(graph: MapGraph) -> Self {
        Self::with_config(graph, SimConfig::default())
    }

    pub fn with_config(graph: MapGraph, config: SimConfig) -> Self {
        Self {
            graph,
            control: IntersectionControl::new(),
            fleet: VehicleFleet::new(config.seed),
            tick_interval: config.tick_interval,
            speed_multiplier: config.speed_multiplier,
            running: false,
            time: 0.0,
            ticks: 0,
            observers: Vec::new(),
        }
    }

    pub fn graph(&self) -> &MapGraph {
        &self.graph
    }

    /// Reset the simulation and replace the map with an OSM XML file
    ///
    /// On failure the map is left empty.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.reset();
        self.graph.load(path)
    }

    /// Reset the simulation and replace the map with an already built graph
    pub fn set_graph(&mut self, graph: MapGraph) {
        self.reset();
        self.graph = graph;
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Remove all vehicles, lights and queues and restart vehicle ids at 1
    ///
    /// The map and the running state are kept.
    pub fn reset(&mut self) {
        self.fleet.clear();
        self.control.clear();
        self.time = 0.0;
        self.ticks = 0;
    }

    pub fn tick_interval(&self) -> f64 {
        self.tick_interval
    }

    pub fn set_tick_interval(&mut self, tick_interval: f64) {
        self.tick_interval = tick_interval;
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    pub fn set_speed_multiplier(&mut self, speed_multiplier: f64) {
        self.speed_multiplier = speed_multiplier;
    }

    /// Simulated seconds covered by one tick
    pub fn delta_time(&self) -> f64 {
        self.tick_interval * self.speed_multiplier
    }

    /// Simulated seconds since the last reset
    pub fn elapsed(&self) -> f64 {
        self.time
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Spawn a vehicle routed between two nodes
    ///
    /// Returns `None` if either node is unknown or unreachable.
    pub fn add_vehicle(&mut self, source: NodeId, destination: NodeId) -> Option<VehicleId> {
        self.fleet.add_vehicle(&self.graph, source, destination)
    }

    /// Run one tick of `delta_time()` if the simulation is started
    /// Returns true if a tick ran
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.advance(self.delta_time());
        true
    }

    /// Run one tick with an explicit time step, whether started or not
    pub fn advance(&mut self, delta_secs: f64) {
        if self.control.is_empty() && !self.graph.is_empty() {
            self.control.place_lights(self.graph.node_ids());
        }

        self.control.update_lights(delta_secs);

        let released = self.control.drain_queues(delta_secs);
        self.fleet.release(&released);

        self.fleet.update(delta_secs, &self.graph, &mut self.control);

        self.time += delta_secs;
        self.ticks += 1;

        self.notify_observers();
    }

    fn notify_observers(&mut self) {
        if self.observers.is_empty() {
            return;
        }

        let lights = self.traffic_lights();
        for observer in &mut self.observers {
            observer.vehicles_updated(self.fleet.vehicles());
            observer.traffic_lights_updated(&lights);
        }
    }

    /// Vehicles in creation order
    pub fn vehicles(&self) -> &[SimVehicle] {
        self.fleet.vehicles()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&SimVehicle> {
        self.fleet.get(id)
    }

    /// Traffic lights in ascending node order
    pub fn traffic_lights(&self) -> Vec<SimTrafficLight> {
        self.control.lights().cloned().collect()
    }

    pub fn intersections(&self) -> &IntersectionControl {
        &self.control
    }

    pub fn intersections_mut(&mut self) -> &mut IntersectionControl {
        &mut self.control
    }

    pub fn queue_len(&self, node_id: NodeId) -> usize {
        self.control.queue_len(node_id)
    }

    /// Human-readable state of the simulation
    pub fn summary(&self) -> String {
        let vehicles = self.fleet.vehicles();
        let finished = vehicles.iter().filter(|v| v.is_finished()).count();
        let waiting = vehicles.iter().filter(|v| v.waiting_at_light).count();
        let green = self.control.lights().filter(|l| l.is_green).count();
        let queued: usize = self
            .control
            .lights()
            .map(|l| self.control.queue_len(l.node_id))
            .sum();

        let mut summary = String::new();
        let _ = writeln!(summary, "=== Traffic Simulation Summary ===");
        let _ = writeln!(summary, "Time: {:.2}s ({} ticks)", self.time, self.ticks);
        let _ = writeln!(
            summary,
            "Nodes: {}, Roads: {}",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        let _ = writeln!(
            summary,
            "Traffic lights: {} ({} green, {} red), queued vehicles: {}",
            self.control.light_count(),
            green,
            self.control.light_count() - green,
            queued
        );
        let _ = writeln!(
            summary,
            "Vehicles: {} ({} en route, {} waiting, {} arrived)",
            vehicles.len(),
            vehicles.len() - finished,
            waiting,
            finished
        );

        for vehicle in vehicles.iter().filter(|v| !v.is_finished()) {
            let _ = writeln!(
                summary,
                "  Vehicle {}: speed={:.1}, edge={}/{}, progress={:.3}, position=({:.5}, {:.5}){}",
                vehicle.id.0,
                vehicle.speed,
                vehicle.current_index + 1,
                vehicle.path.len() - 1,
                vehicle.progress,
                vehicle.position.y,
                vehicle.position.x,
                if vehicle.waiting_at_light { " [waiting]" } else { "" }
            );
        }

        summary
    }
}
