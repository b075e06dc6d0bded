//! Indoor Navigation Engine
//!
//! Locates a Bluetooth tag from RSSI readings taken by fixed anchors, using
//! a log-distance path-loss model and 2-D trilateration, then ranks nearby
//! points of interest and plans walking routes to them.

pub mod core;
pub mod algorithms;
pub mod navigation;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{
    Anchor, Direction, EstimatedDistance, PointOfInterest, Position, RankedPoi, RelayReading, RouteSuggestion,
    RssiSample,
};
pub use algorithms::{estimate_distance, solve, Confidence, DistanceModel, PositionFix, SolveMethod, Trilateration};
pub use navigation::{axis_directions, nearest, plan_route, rank, suggest_routes, CompassConvention, RoutePlanner};
pub use validation::{group_by_beacon, NavError, NavResult, PositioningQuality, SampleValidator};
pub use utils::{Bounds, ConfigError, ConfigurationManager, EngineConfig};
pub use api::{
    AnchorRegistry, JsonFormatter, NavigationEngine, NavigationRequest, NavigationResponse, PoiRegistry,
    PositionReport, StaticRegistry, TextFormatter,
};
