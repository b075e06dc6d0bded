//! Core positioning algorithms

pub mod distance;
pub mod trilateration;

pub use distance::{estimate_distance, DistanceModel};
pub use trilateration::{solve, Confidence, PositionFix, SolveMethod, Trilateration};
