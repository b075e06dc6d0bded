//! Proximity ranking and route guidance

pub mod compass;
pub mod ranking;
pub mod route;

pub use compass::{bearing_degrees, direction_between, direction_from_bearing, CompassConvention};
pub use ranking::{nearest, rank};
pub use route::{axis_directions, plan_route, suggest_routes, RoutePlanner};
