use crate::algorithms::distance::DistanceModel;
use crate::api::registry::AnchorRegistry;
use crate::core::{EstimatedDistance, RelayReading, RssiSample};
use crate::validation::error::NavError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Why a sample was left out of the solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectionReason {
    /// No anchor with this id in the registry
    UnknownAnchor,
    /// A later sample for the same anchor replaced this one
    Superseded,
    /// RSSI could not be turned into a distance
    Invalid(NavError),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UnknownAnchor => write!(f, "unknown anchor"),
            RejectionReason::Superseded => write!(f, "superseded by a later sample"),
            RejectionReason::Invalid(error) => write!(f, "{}", error),
        }
    }
}

/// Sample that did not make it into the estimate set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedSample {
    pub sample: RssiSample,
    pub reason: RejectionReason,
}

/// Positioning quality implied by the number of usable estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositioningQuality {
    /// No samples were supplied
    NoData,
    /// Samples arrived but none were usable
    NoSignal,
    /// One reference anchor
    Basic,
    /// Two reference anchors
    Good,
    /// Three or more reference anchors
    Excellent,
}

impl PositioningQuality {
    pub fn from_counts(sample_count: usize, usable: usize) -> Self {
        match (sample_count, usable) {
            (0, _) => PositioningQuality::NoData,
            (_, 0) => PositioningQuality::NoSignal,
            (_, 1) => PositioningQuality::Basic,
            (_, 2) => PositioningQuality::Good,
            _ => PositioningQuality::Excellent,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PositioningQuality::NoData => "No data available",
            PositioningQuality::NoSignal => "No valid signals",
            PositioningQuality::Basic => "Basic positioning with 1 reference point",
            PositioningQuality::Good => "Good positioning with 2 reference points",
            PositioningQuality::Excellent => "Excellent positioning with 3+ reference points",
        }
    }

    /// Whether a position can be computed at this quality
    pub fn can_position(&self) -> bool {
        matches!(self, PositioningQuality::Good | PositioningQuality::Excellent)
    }
}

/// Outcome of validating one request's samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleValidation {
    /// One estimate per anchor, in arrival order
    pub estimates: Vec<EstimatedDistance>,
    pub rejected: Vec<RejectedSample>,
    pub quality: PositioningQuality,
}

impl SampleValidation {
    pub fn usable_count(&self) -> usize {
        self.estimates.len()
    }

    /// Rejections caused by implausible RSSI values
    pub fn invalid_samples(&self) -> impl Iterator<Item = &RejectedSample> {
        self.rejected
            .iter()
            .filter(|r| matches!(r.reason, RejectionReason::Invalid(_)))
    }
}

/// Turns raw samples into distance estimates
///
/// Stateless: every call sees only the samples it is given.
#[derive(Debug, Clone, Default)]
pub struct SampleValidator {
    model: DistanceModel,
}

impl SampleValidator {
    pub fn new(model: DistanceModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &DistanceModel {
        &self.model
    }

    /// Drop unknown anchors, keep the latest sample per anchor and convert RSSI to range
    pub fn validate<R: AnchorRegistry + ?Sized>(&self, samples: &[RssiSample], anchors: &R) -> SampleValidation {
        let mut rejected = Vec::new();

        // index of the last sample seen for each anchor
        let mut latest: HashMap<&str, usize> = HashMap::new();
        for (i, sample) in samples.iter().enumerate() {
            latest.insert(sample.anchor_id.as_str(), i);
        }

        let mut estimates = Vec::with_capacity(latest.len());
        for (i, sample) in samples.iter().enumerate() {
            if latest.get(sample.anchor_id.as_str()) != Some(&i) {
                rejected.push(RejectedSample {
                    sample: sample.clone(),
                    reason: RejectionReason::Superseded,
                });
                continue;
            }

            if anchors.get_anchor(&sample.anchor_id).is_none() {
                rejected.push(RejectedSample {
                    sample: sample.clone(),
                    reason: RejectionReason::UnknownAnchor,
                });
                continue;
            }

            match self.model.estimate_sample(sample) {
                Ok(estimate) => estimates.push(estimate),
                Err(error) => rejected.push(RejectedSample {
                    sample: sample.clone(),
                    reason: RejectionReason::Invalid(error),
                }),
            }
        }

        let quality = PositioningQuality::from_counts(samples.len(), estimates.len());
        SampleValidation {
            estimates,
            rejected,
            quality,
        }
    }

    /// Quality of a sample set without keeping the estimates
    pub fn assess_quality<R: AnchorRegistry + ?Sized>(&self, samples: &[RssiSample], anchors: &R) -> PositioningQuality {
        self.validate(samples, anchors).quality
    }
}

/// Split one relay batch into per-tag sample sets
///
/// Tags are returned in order of first appearance; within a tag the latest
/// reading per anchor wins while keeping the anchor's first arrival slot.
pub fn group_by_beacon(readings: &[RelayReading]) -> Vec<(String, Vec<RssiSample>)> {
    let mut groups: Vec<(String, Vec<RssiSample>)> = Vec::new();

    for reading in readings {
        let index = match groups.iter().position(|(beacon, _)| *beacon == reading.beacon_name) {
            Some(index) => index,
            None => {
                groups.push((reading.beacon_name.clone(), Vec::new()));
                groups.len() - 1
            }
        };

        let samples = &mut groups[index].1;
        match samples.iter_mut().find(|s| s.anchor_id == reading.anchor_id) {
            Some(existing) => existing.rssi = reading.rssi,
            None => samples.push(RssiSample::new(reading.anchor_id.clone(), reading.rssi)),
        }
    }

    groups
}
