//! Sample validation, positioning quality and error types

pub mod data;
pub mod error;

pub use data::{group_by_beacon, PositioningQuality, RejectedSample, RejectionReason, SampleValidation, SampleValidator};
pub use error::{ErrorSeverity, NavError, NavResult, RecoveryHint};
