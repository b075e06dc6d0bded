//! Orders points of interest by straight-line distance

use crate::core::{PointOfInterest, Position, RankedPoi};
use crate::validation::error::{NavError, NavResult};

/// Rank points of interest nearest first, ties by id ascending
pub fn rank(position: &Position, pois: &[PointOfInterest]) -> NavResult<Vec<RankedPoi>> {
    if pois.is_empty() {
        return Err(NavError::EmptyRegistry);
    }

    let mut ranked: Vec<RankedPoi> = pois
        .iter()
        .map(|poi| RankedPoi {
            distance: position.distance_to(&poi.position()),
            poi: poi.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.poi.id.cmp(&b.poi.id))
    });

    Ok(ranked)
}

/// The `max` closest points of interest
pub fn nearest(position: &Position, pois: &[PointOfInterest], max: usize) -> NavResult<Vec<RankedPoi>> {
    let mut ranked = rank(position, pois)?;
    ranked.truncate(max);
    Ok(ranked)
}
