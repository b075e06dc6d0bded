use crate::algorithms::distance::DistanceModel;
use crate::algorithms::trilateration::Trilateration;
use crate::core::{
    Position, DEFAULT_COLLINEARITY_EPSILON, DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_REFERENCE_RSSI,
    DEFAULT_WALKING_SPEED, MAX_PLAUSIBLE_RSSI, MIN_FALLBACK_ANCHORS, MIN_PLAUSIBLE_RSSI,
    MIN_TRILATERATION_ANCHORS,
};
use crate::navigation::compass::CompassConvention;
use crate::navigation::route::RoutePlanner;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Rectangular building extent for caller-supplied positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn contains(&self, position: &Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x) && (self.min_y..=self.max_y).contains(&position.y)
    }
}

/// Engine-wide tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Calibrated RSSI at 1 meter (dBm)
    pub reference_rssi: i32,
    /// Path-loss exponent, 2.0 for free space
    pub path_loss_exponent: f64,
    /// Weakest accepted RSSI (dBm)
    pub min_rssi: i32,
    /// Strongest accepted RSSI (dBm)
    pub max_rssi: i32,
    /// Walking speed used for time estimates (m/s)
    pub average_walking_speed: f64,
    /// Estimates needed for a full trilateration
    pub min_trilateration_anchors: usize,
    /// Estimates needed for the two-anchor fallback
    pub min_fallback_anchors: usize,
    /// Relative determinant threshold for collinear anchors
    pub collinearity_epsilon: f64,
    /// Fit every available anchor when more than three are usable
    pub least_squares_refinement: bool,
    pub compass_convention: CompassConvention,
    /// Distance under which the user counts as arrived (m)
    pub arrival_radius_m: f64,
    /// Axis legs shorter than this are omitted from walking directions (m)
    pub axis_threshold_m: f64,
    /// Routes at least this long get a midpoint instruction (m)
    pub checkpoint_distance_m: f64,
    /// Route suggestions when no destination is requested
    pub max_suggestions: usize,
    /// Entries returned by nearest-point queries
    pub max_nearest: usize,
    /// Optional extent for caller-supplied positions
    pub bounds: Option<Bounds>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_rssi: DEFAULT_REFERENCE_RSSI,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
            min_rssi: MIN_PLAUSIBLE_RSSI,
            max_rssi: MAX_PLAUSIBLE_RSSI,
            average_walking_speed: DEFAULT_WALKING_SPEED,
            min_trilateration_anchors: MIN_TRILATERATION_ANCHORS,
            min_fallback_anchors: MIN_FALLBACK_ANCHORS,
            collinearity_epsilon: DEFAULT_COLLINEARITY_EPSILON,
            least_squares_refinement: false,
            compass_convention: CompassConvention::Centered,
            arrival_radius_m: 0.5,
            axis_threshold_m: 0.5,
            checkpoint_distance_m: 20.0,
            max_suggestions: 3,
            max_nearest: 5,
            bounds: None,
        }
    }
}

impl EngineConfig {
    pub fn distance_model(&self) -> DistanceModel {
        DistanceModel::new(self.reference_rssi, self.path_loss_exponent)
            .with_rssi_range(self.min_rssi, self.max_rssi)
    }

    pub fn trilateration(&self) -> Trilateration {
        Trilateration {
            collinearity_epsilon: self.collinearity_epsilon,
            least_squares_refinement: self.least_squares_refinement,
            min_anchors: self.min_trilateration_anchors,
            min_fallback_anchors: self.min_fallback_anchors,
        }
    }

    pub fn route_planner(&self) -> RoutePlanner {
        RoutePlanner {
            average_walking_speed: self.average_walking_speed,
            compass_convention: self.compass_convention,
            arrival_radius_m: self.arrival_radius_m,
            checkpoint_distance_m: self.checkpoint_distance_m,
            axis_threshold_m: self.axis_threshold_m,
        }
    }

    /// Check every parameter, returning the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_rssi > self.max_rssi {
            return Err(invalid("min_rssi", self.min_rssi, format!("must not exceed max_rssi ({})", self.max_rssi)));
        }
        if self.max_rssi > MAX_PLAUSIBLE_RSSI || self.min_rssi < MIN_PLAUSIBLE_RSSI {
            return Err(invalid(
                "rssi range",
                format!("{}..={}", self.min_rssi, self.max_rssi),
                format!("must lie within {}..={} dBm", MIN_PLAUSIBLE_RSSI, MAX_PLAUSIBLE_RSSI),
            ));
        }
        if !(-100..=0).contains(&self.reference_rssi) {
            return Err(invalid("reference_rssi", self.reference_rssi, "must be between -100 and 0 dBm"));
        }
        if !(1.0..=6.0).contains(&self.path_loss_exponent) {
            return Err(invalid("path_loss_exponent", self.path_loss_exponent, "must be between 1.0 and 6.0"));
        }
        if !(self.average_walking_speed.is_finite() && self.average_walking_speed > 0.0) {
            return Err(invalid("average_walking_speed", self.average_walking_speed, "must be positive"));
        }
        if self.min_trilateration_anchors != MIN_TRILATERATION_ANCHORS {
            return Err(invalid(
                "min_trilateration_anchors",
                self.min_trilateration_anchors,
                "closed-form trilateration needs exactly 3 anchors",
            ));
        }
        if self.min_fallback_anchors != MIN_FALLBACK_ANCHORS && self.min_fallback_anchors != MIN_TRILATERATION_ANCHORS {
            return Err(invalid(
                "min_fallback_anchors",
                self.min_fallback_anchors,
                "must be 2 (midpoint fallback enabled) or 3 (disabled)",
            ));
        }
        if !(self.collinearity_epsilon.is_finite() && self.collinearity_epsilon >= 0.0) {
            return Err(invalid("collinearity_epsilon", self.collinearity_epsilon, "must be non-negative"));
        }
        for (name, value) in [
            ("arrival_radius_m", self.arrival_radius_m),
            ("axis_threshold_m", self.axis_threshold_m),
            ("checkpoint_distance_m", self.checkpoint_distance_m),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(name, value, "must be a non-negative distance"));
            }
        }
        if self.max_suggestions == 0 {
            return Err(invalid("max_suggestions", self.max_suggestions, "must be at least 1"));
        }
        if self.max_nearest == 0 {
            return Err(invalid("max_nearest", self.max_nearest, "must be at least 1"));
        }
        if let Some(bounds) = &self.bounds {
            if bounds.min_x > bounds.max_x || bounds.min_y > bounds.max_y {
                return Err(invalid("bounds", format!("{:?}", bounds), "min must not exceed max"));
            }
        }
        Ok(())
    }
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid value {value} for {parameter}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("No file path set for saving configuration")]
    NoPath,
}

fn invalid(parameter: &str, value: impl ToString, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Owns the active configuration and its backing file
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: EngineConfig,
    config_file_path: Option<PathBuf>,
    is_modified: bool,
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from a JSON file; missing keys take defaults
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded engine configuration");
        debug!(?config, "Active configuration");

        self.config = config;
        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file the configuration was loaded from
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::NoPath),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    // Runtime parameter adjustment

    /// Update the path-loss calibration, returning the previous values
    pub fn set_calibration(&mut self, reference_rssi: i32, path_loss_exponent: f64) -> Result<(i32, f64), ConfigError> {
        let mut candidate = self.config.clone();
        candidate.reference_rssi = reference_rssi;
        candidate.path_loss_exponent = path_loss_exponent;
        candidate.validate()?;

        let old = (self.config.reference_rssi, self.config.path_loss_exponent);
        self.config = candidate;
        self.is_modified = true;
        Ok(old)
    }

    /// Update the walking speed, returning the previous value
    pub fn set_walking_speed(&mut self, speed: f64) -> Result<f64, ConfigError> {
        if !(0.1..=3.0).contains(&speed) {
            return Err(invalid("average_walking_speed", speed, "must be between 0.1 and 3.0 m/s"));
        }
        let old = self.config.average_walking_speed;
        self.config.average_walking_speed = speed;
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_compass_convention(&mut self, convention: CompassConvention) {
        self.config.compass_convention = convention;
        self.is_modified = true;
    }

    pub fn set_bounds(&mut self, bounds: Option<Bounds>) -> Result<(), ConfigError> {
        let mut candidate = self.config.clone();
        candidate.bounds = bounds;
        candidate.validate()?;
        self.config = candidate;
        self.is_modified = true;
        Ok(())
    }
}
