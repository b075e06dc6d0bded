//! Request and response types for the navigation engine

use crate::algorithms::trilateration::PositionFix;
use crate::api::registry::StaticRegistry;
use crate::core::{Anchor, PointOfInterest, RankedPoi, RouteSuggestion, RssiSample};
use crate::validation::data::{PositioningQuality, RejectedSample};
use serde::{Deserialize, Serialize};

/// One navigation request: where am I, and how do I get there
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationRequest {
    pub samples: Vec<RssiSample>,
    /// Route to this point of interest; suggestions to the nearest ones otherwise
    pub destination: Option<u32>,
    /// Overrides the configured number of suggestions
    pub max_suggestions: Option<usize>,
    /// Include the full distance ranking of every point of interest
    pub include_ranking: bool,
}

impl NavigationRequest {
    pub fn new(samples: Vec<RssiSample>) -> Self {
        Self {
            samples,
            ..Default::default()
        }
    }

    pub fn with_destination(mut self, poi_id: u32) -> Self {
        self.destination = Some(poi_id);
        self
    }

    pub fn with_ranking(mut self) -> Self {
        self.include_ranking = true;
        self
    }
}

/// Position estimate with the validation outcome behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub fix: PositionFix,
    pub quality: PositioningQuality,
    /// Samples left out of the solve
    pub rejected: Vec<RejectedSample>,
}

/// Complete answer to a navigation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationResponse {
    pub fix: PositionFix,
    pub quality: PositioningQuality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Vec<RankedPoi>>,
    /// One route when a destination was requested, nearest suggestions otherwise
    pub routes: Vec<RouteSuggestion>,
    pub rejected: Vec<RejectedSample>,
}

/// Self-contained request file read by the command-line tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestFile {
    pub anchors: Vec<Anchor>,
    pub pois: Vec<PointOfInterest>,
    pub samples: Vec<RssiSample>,
    pub destination: Option<u32>,
    pub max_suggestions: Option<usize>,
    pub include_ranking: bool,
}

impl RequestFile {
    /// Split into the registries and the request proper
    pub fn into_parts(self) -> (StaticRegistry, NavigationRequest) {
        let registry = StaticRegistry::new(self.anchors, self.pois);
        let request = NavigationRequest {
            samples: self.samples,
            destination: self.destination,
            max_suggestions: self.max_suggestions,
            include_ranking: self.include_ranking,
        };
        (registry, request)
    }
}
