//! Snapshot observer for hosts that render or record the simulation.

use super::intersection::SimTrafficLight;
use super::vehicle::SimVehicle;

/// Callbacks invoked by [`SimulationScheduler`][super::SimulationScheduler]
/// once per tick, after lights, queues and vehicles have been updated.
///
/// Both methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimulationObserver {
    /// Full vehicle list, in creation order
    fn vehicles_updated(&mut self, _vehicles: &[SimVehicle]) {}

    /// Full traffic-light list, in ascending node order
    fn traffic_lights_updated(&mut self, _lights: &[SimTrafficLight]) {}
}
