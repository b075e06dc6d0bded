//! Core data types for the positioning engine
//!
//! Every value here is request-scoped: built when a request arrives and
//! dropped when it has been answered.

use serde::{Deserialize, Serialize};

/// 2-D position in the building frame (x grows East, y grows North, meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Point at fraction `t` of the way from `self` to `other`
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Fixed Bluetooth anchor with known coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// One RSSI reading of the tracked tag as heard by an anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiSample {
    pub anchor_id: String,
    /// Signal strength in dBm
    pub rssi: i32,
}

impl RssiSample {
    pub fn new(anchor_id: impl Into<String>, rssi: i32) -> Self {
        Self { anchor_id: anchor_id.into(), rssi }
    }
}

/// Reading as delivered by the sensor relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayReading {
    pub anchor_id: String,
    pub rssi: i32,
    /// Opaque name of the tracked tag
    pub beacon_name: String,
}

impl From<RelayReading> for RssiSample {
    fn from(reading: RelayReading) -> Self {
        RssiSample {
            anchor_id: reading.anchor_id,
            rssi: reading.rssi,
        }
    }
}

/// Range to an anchor derived from an RSSI sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedDistance {
    pub anchor_id: String,
    /// Meters, never negative
    pub distance: f64,
}

impl EstimatedDistance {
    pub fn new(anchor_id: impl Into<String>, distance: f64) -> Self {
        Self { anchor_id: anchor_id.into(), distance }
    }
}

/// Named destination inside the building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub name: String,
}

impl PointOfInterest {
    pub fn new(id: u32, x: f64, y: f64, name: impl Into<String>) -> Self {
        Self { id, x, y, name: name.into() }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Eight-point compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Direction {
    /// Clockwise order starting at North
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::Northeast,
        Direction::East,
        Direction::Southeast,
        Direction::South,
        Direction::Southwest,
        Direction::West,
        Direction::Northwest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::Northeast => "Northeast",
            Direction::East => "East",
            Direction::Southeast => "Southeast",
            Direction::South => "South",
            Direction::Southwest => "Southwest",
            Direction::West => "West",
            Direction::Northwest => "Northwest",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Guidance from a position to one point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSuggestion {
    pub poi_id: u32,
    pub poi_name: String,
    /// Coordinates of the point of interest
    pub destination: Position,
    /// Straight-line distance in meters
    pub distance: f64,
    pub direction: Direction,
    /// Compass bearing in degrees, 0 = North, clockwise
    pub bearing_deg: f64,
    pub estimated_walk_seconds: u64,
    pub instructions: Vec<String>,
}

/// Point of interest paired with its distance from a position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPoi {
    pub poi: PointOfInterest,
    pub distance: f64,
}
