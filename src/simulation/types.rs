//! Core types for the traffic simulation
//!
//! These are standalone types shared by the lights, the fleet and the scheduler.

use crate::map::GeoPoint;

/// A unique identifier for vehicles
/// Starts at 1 and is never reused until the simulation is reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleId(pub u64);

/// A 2D map position (x = longitude, y = latitude)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<GeoPoint> for Position {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.lon, point.lat)
    }
}

/// Display color of a vehicle in HSL form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleColor {
    /// Hue in degrees, 0..360
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl VehicleColor {
    pub fn from_hue(hue: u16) -> Self {
        Self {
            hue: hue % 360,
            saturation: VEHICLE_COLOR_SATURATION,
            lightness: VEHICLE_COLOR_LIGHTNESS,
        }
    }

    /// Convert to 8-bit RGB
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let s = self.saturation as f64 / 255.0;
        let l = self.lightness as f64 / 255.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h = self.hue as f64 / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let m = l - c / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

/// Default time between ticks in seconds
pub const DEFAULT_TICK_INTERVAL: f64 = 0.05;

/// One traffic light is placed at every Nth node in ascending id order
pub const LIGHT_SPACING: usize = 20;

/// Time a light stays in one color, in seconds
pub const LIGHT_CYCLE_DURATION: f64 = 10.0;

/// Green time needed between two releases from the same queue, in seconds
pub const RELEASE_INTERVAL: f64 = 1.0;

/// Remaining edge length (km) under which a vehicle is at the stop line
pub const STOP_LINE_DISTANCE_KM: f64 = 0.001;

/// Smallest progress gap kept to a vehicle ahead on the same edge index
pub const MIN_VEHICLE_GAP: f64 = 0.0002;

/// Range vehicle speeds are drawn from
pub const MIN_VEHICLE_SPEED: f64 = 10.0;
pub const MAX_VEHICLE_SPEED: f64 = 15.0;

pub const VEHICLE_COLOR_SATURATION: u8 = 255;
pub const VEHICLE_COLOR_LIGHTNESS: u8 = 150;
