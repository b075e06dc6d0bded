//! Bearing computation and eight-sector compass quantization
//!
//! Frame: +y is North and +x is East. Bearings are measured clockwise from
//! North, so 0° = North and 90° = East.

use crate::core::{Direction, Position};
use serde::{Deserialize, Serialize};

/// Where the sector boundaries sit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompassConvention {
    /// Each 45° sector is centred on its direction: North spans [-22.5°, 22.5°)
    #[default]
    Centered,
    /// Each sector starts at its direction: North spans [0°, 45°)
    Leading,
}

/// Bearing from `from` to `to` in degrees, normalised to [0, 360)
pub fn bearing_degrees(from: &Position, to: &Position) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    // atan2(dy, dx) runs counter-clockwise from East; swapping the arguments
    // gives the same angle measured clockwise from North
    let bearing = dx.atan2(dy).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Quantize a bearing into one of eight compass directions
pub fn direction_from_bearing(bearing_deg: f64, convention: CompassConvention) -> Direction {
    let shifted = match convention {
        CompassConvention::Centered => bearing_deg + 22.5,
        CompassConvention::Leading => bearing_deg,
    };
    let sector = (shifted.rem_euclid(360.0) / 45.0).floor() as usize % 8;
    Direction::ALL[sector]
}

/// Compass direction from one position toward another
pub fn direction_between(from: &Position, to: &Position, convention: CompassConvention) -> Direction {
    direction_from_bearing(bearing_degrees(from, to), convention)
}
