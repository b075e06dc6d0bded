//! RSSI to range conversion using the log-distance path-loss model
//!
//! `distance = 10 ^ ((reference_rssi - rssi) / (10 * n))`, where
//! `reference_rssi` is the calibrated strength at 1 m and `n` the
//! environment's path-loss exponent.

use crate::core::{
    EstimatedDistance, RssiSample, DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_REFERENCE_RSSI,
    MAX_PLAUSIBLE_RSSI, MIN_PLAUSIBLE_RSSI,
};
use crate::validation::error::{NavError, NavResult};

/// Convert an RSSI reading into an estimated distance in meters
///
/// Rejects readings outside the plausible range (-120..=0 dBm) so they are
/// dropped instead of distorting the solve.
pub fn estimate_distance(rssi: i32, reference_rssi: i32, path_loss_exponent: f64) -> NavResult<f64> {
    DistanceModel::new(reference_rssi, path_loss_exponent).estimate(rssi)
}

/// Calibrated path-loss model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceModel {
    pub reference_rssi: i32,
    pub path_loss_exponent: f64,
    pub min_rssi: i32,
    pub max_rssi: i32,
}

impl Default for DistanceModel {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_RSSI, DEFAULT_PATH_LOSS_EXPONENT)
    }
}

impl DistanceModel {
    pub fn new(reference_rssi: i32, path_loss_exponent: f64) -> Self {
        Self {
            reference_rssi,
            path_loss_exponent,
            min_rssi: MIN_PLAUSIBLE_RSSI,
            max_rssi: MAX_PLAUSIBLE_RSSI,
        }
    }

    /// Override the plausible RSSI window
    pub fn with_rssi_range(mut self, min_rssi: i32, max_rssi: i32) -> Self {
        self.min_rssi = min_rssi;
        self.max_rssi = max_rssi;
        self
    }

    pub fn estimate(&self, rssi: i32) -> NavResult<f64> {
        if rssi > self.max_rssi {
            return Err(NavError::InvalidSample {
                rssi,
                reason: format!("stronger than {} dBm", self.max_rssi),
            });
        }
        if rssi < self.min_rssi {
            return Err(NavError::InvalidSample {
                rssi,
                reason: format!("weaker than {} dBm", self.min_rssi),
            });
        }
        if !(self.path_loss_exponent.is_finite() && self.path_loss_exponent > 0.0) {
            return Err(NavError::InvalidSample {
                rssi,
                reason: format!("path-loss exponent {} is not positive", self.path_loss_exponent),
            });
        }

        let exponent = (self.reference_rssi - rssi) as f64 / (10.0 * self.path_loss_exponent);
        let distance = 10f64.powf(exponent);

        if !distance.is_finite() || distance < 0.0 {
            return Err(NavError::InvalidSample {
                rssi,
                reason: "no finite distance".to_string(),
            });
        }

        Ok(distance)
    }

    /// Convert a whole sample into a range estimate for its anchor
    pub fn estimate_sample(&self, sample: &RssiSample) -> NavResult<EstimatedDistance> {
        self.estimate(sample.rssi)
            .map(|distance| EstimatedDistance::new(sample.anchor_id.clone(), distance))
    }
}
