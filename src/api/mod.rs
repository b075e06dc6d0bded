//! Engine entry points for callers
//!
//! Registries are read-only inputs, the engine sequences validation,
//! trilateration, ranking and routing, and formatters render the result.

pub mod engine;
pub mod formatting;
pub mod registry;
pub mod types;

pub use engine::NavigationEngine;
pub use formatting::{format_walk_time, JsonFormatter, TextFormatter};
pub use registry::{AnchorRegistry, PoiRegistry, StaticRegistry};
pub use types::{NavigationRequest, NavigationResponse, PositionReport, RequestFile};
