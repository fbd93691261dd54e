//! Core types for the road-network graph
//!
//! These are plain data types shared by the loader, the naming pass and routing.

use std::fmt;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Identifier of a node in the road-network extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A WGS-84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in kilometers
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Great-circle distance between two latitude/longitude pairs, in kilometers
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let r_lat1 = lat1.to_radians();
    let r_lat2 = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + r_lat1.cos() * r_lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// A node of the road network
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: GeoPoint,
    /// Name resolved from the node's own tags or backfilled from a road
    pub name: Option<String>,
    /// Street the node lies on
    pub street_name: Option<String>,
}

impl Node {
    pub fn new(id: NodeId, lat: f64, lon: f64) -> Self {
        Self {
            id,
            position: GeoPoint::new(lat, lon),
            name: None,
            street_name: None,
        }
    }

    pub fn lat(&self) -> f64 {
        self.position.lat
    }

    pub fn lon(&self) -> f64 {
        self.position.lon
    }
}

/// A directed, weighted connection to another node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: NodeId,
    /// Great-circle length in kilometers
    pub distance_km: f64,
}

/// A node with its unique display string, as offered to location pickers
#[derive(Debug, Clone, PartialEq)]
pub struct NamedLocation {
    pub node_id: NodeId,
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}
