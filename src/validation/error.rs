use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for engine operations
pub type NavResult<T> = Result<T, NavError>;

/// Failures surfaced by the positioning and routing engine
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum NavError {
    /// RSSI outside the plausible range, or parameters that give no finite distance
    #[error("Invalid sample: RSSI {rssi} dBm ({reason})")]
    InvalidSample { rssi: i32, reason: String },

    /// Too few usable distance estimates to position
    #[error("Insufficient data: {available} usable estimates, {required} required")]
    InsufficientData { available: usize, required: usize },

    /// Selected anchors are collinear or coincident
    #[error("Degenerate geometry: anchors [{}] are collinear (determinant {determinant:.3e})", .anchor_ids.join(", "))]
    DegenerateGeometry {
        anchor_ids: Vec<String>,
        determinant: f64,
    },

    /// No points of interest to rank or route against
    #[error("No points of interest available")]
    EmptyRegistry,

    /// Requested destination is not in the supplied set
    #[error("Unknown destination: point of interest {poi_id}")]
    UnknownDestination { poi_id: u32 },

    /// Caller-supplied position lies outside the configured building bounds
    #[error("Position ({x:.2}, {y:.2}) is outside the configured bounds")]
    OutOfBounds { x: f64, y: f64 },
}

/// How serious an error is for the user-facing application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// No position or route can be produced
    High,
    /// The request can be answered after correcting the input
    Medium,
    /// Only one sample was affected
    Low,
}

/// What a caller can do about an error; the engine itself never retries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecoveryHint {
    DropSample,
    WaitForMoreAnchors { missing: usize },
    TryAnotherSubset,
    ProvidePointsOfInterest,
    ChooseKnownDestination,
    CheckCoordinates,
}

impl NavError {
    /// Stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            NavError::InvalidSample { .. } => "InvalidSample",
            NavError::InsufficientData { .. } => "InsufficientData",
            NavError::DegenerateGeometry { .. } => "DegenerateGeometry",
            NavError::EmptyRegistry => "EmptyRegistry",
            NavError::UnknownDestination { .. } => "UnknownDestination",
            NavError::OutOfBounds { .. } => "OutOfBounds",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            NavError::InvalidSample { .. } => ErrorSeverity::Low,
            NavError::InsufficientData { .. } => ErrorSeverity::High,
            NavError::DegenerateGeometry { .. } => ErrorSeverity::High,
            NavError::EmptyRegistry => ErrorSeverity::High,
            NavError::UnknownDestination { .. } => ErrorSeverity::Medium,
            NavError::OutOfBounds { .. } => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_hint(&self) -> RecoveryHint {
        match self {
            NavError::InvalidSample { .. } => RecoveryHint::DropSample,
            NavError::InsufficientData { available, required } => RecoveryHint::WaitForMoreAnchors {
                missing: required.saturating_sub(*available),
            },
            NavError::DegenerateGeometry { .. } => RecoveryHint::TryAnotherSubset,
            NavError::EmptyRegistry => RecoveryHint::ProvidePointsOfInterest,
            NavError::UnknownDestination { .. } => RecoveryHint::ChooseKnownDestination,
            NavError::OutOfBounds { .. } => RecoveryHint::CheckCoordinates,
        }
    }

    /// True when the request failed because no position could be computed
    pub fn is_positioning_failure(&self) -> bool {
        matches!(
            self,
            NavError::InsufficientData { .. } | NavError::DegenerateGeometry { .. }
        )
    }
}
