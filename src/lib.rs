//! OSM Traffic Simulation Library
//!
//! Loads an OpenStreetMap road extract, finds shortest routes between named
//! locations and simulates vehicles driving those routes past traffic lights.

pub mod map;
pub mod simulation;
