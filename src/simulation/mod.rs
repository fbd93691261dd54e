//! Standalone traffic simulation module
//!
//! Vehicles follow shortest routes over a [`MapGraph`](crate::map::MapGraph)
//! and stop at red traffic lights. The simulation has no timer of its own:
//! the host drives it one tick at a time and reads snapshots back.

mod fleet;
mod intersection;
mod observer;
mod scheduler;
mod types;
mod vehicle;

pub use fleet::VehicleFleet;
pub use intersection::{IntersectionControl, IntersectionQueue, SimTrafficLight};
pub use observer::SimulationObserver;
pub use scheduler::{SimConfig, SimulationScheduler};
pub use types::{
    Position, VehicleColor, VehicleId, DEFAULT_TICK_INTERVAL, LIGHT_CYCLE_DURATION, LIGHT_SPACING,
    MAX_VEHICLE_SPEED, MIN_VEHICLE_GAP, MIN_VEHICLE_SPEED, RELEASE_INTERVAL,
    STOP_LINE_DISTANCE_KM,
};
pub use vehicle::SimVehicle;
