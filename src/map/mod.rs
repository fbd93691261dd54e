//! Road-network map
//!
//! Loads an OSM XML extract into a graph of nodes and two-way roads, gives
//! every node a unique display name and answers shortest-route queries.

mod graph;
mod naming;
mod osm;
mod routing;
mod types;

pub use graph::MapGraph;
pub use naming::UNNAMED_LOCATION;
pub use routing::{PathError, Route};
pub use types::{haversine_km, Edge, GeoPoint, NamedLocation, Node, NodeId, EARTH_RADIUS_KM};
