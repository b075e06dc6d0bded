//! Radio and walking constants used as engine defaults

/// Calibrated RSSI measured at 1 meter from an anchor (dBm)
pub const DEFAULT_REFERENCE_RSSI: i32 = -59;

/// Free-space path-loss exponent
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 2.0;

/// Weakest RSSI still treated as a real reading (dBm)
pub const MIN_PLAUSIBLE_RSSI: i32 = -120;

/// Strongest RSSI still treated as a real reading (dBm)
pub const MAX_PLAUSIBLE_RSSI: i32 = 0;

/// Average indoor walking speed (m/s)
pub const DEFAULT_WALKING_SPEED: f64 = 1.2;

/// Anchors needed for a closed-form trilateration solve
pub const MIN_TRILATERATION_ANCHORS: usize = 3;

/// Anchors needed for the weighted-midpoint fallback
pub const MIN_FALLBACK_ANCHORS: usize = 2;

/// Relative determinant threshold below which three anchors count as collinear
pub const DEFAULT_COLLINEARITY_EPSILON: f64 = 1e-9;
