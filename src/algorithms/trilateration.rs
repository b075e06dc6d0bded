//! Algebraic 2-D trilateration
//!
//! Anchors are translated so the reference anchor sits at the origin, the
//! circle equations are subtracted pairwise and the resulting linear system
//! is solved in closed form. With exactly two usable estimates the solver
//! falls back to an inverse-distance weighted midpoint, flagged as
//! low-confidence.

use crate::api::registry::AnchorRegistry;
use crate::core::{
    EstimatedDistance, Position, DEFAULT_COLLINEARITY_EPSILON, MIN_FALLBACK_ANCHORS,
    MIN_TRILATERATION_ANCHORS,
};
use crate::validation::error::{NavError, NavResult};
use nalgebra::{DMatrix, DVector, Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How far a fix can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Low,
}

/// Which computation produced a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMethod {
    ClosedForm,
    LeastSquares,
    WeightedMidpoint,
}

/// Position estimate with the context it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub position: Position,
    pub confidence: Confidence,
    pub method: SolveMethod,
    /// Anchor ids in the order they entered the solve (reference first)
    pub anchors_used: Vec<String>,
    /// RMS mismatch between estimated and fitted anchor distances (meters)
    pub residual_m: f64,
}

/// Estimate resolved against its anchor's coordinates
#[derive(Debug, Clone)]
struct Ranged {
    anchor_id: String,
    position: Position,
    distance: f64,
}

/// Trilateration solver
#[derive(Debug, Clone)]
pub struct Trilateration {
    /// Relative determinant threshold for collinearity
    pub collinearity_epsilon: f64,
    /// Fit all available anchors instead of only the nearest three
    pub least_squares_refinement: bool,
    pub min_anchors: usize,
    pub min_fallback_anchors: usize,
}

impl Default for Trilateration {
    fn default() -> Self {
        Self {
            collinearity_epsilon: DEFAULT_COLLINEARITY_EPSILON,
            least_squares_refinement: false,
            min_anchors: MIN_TRILATERATION_ANCHORS,
            min_fallback_anchors: MIN_FALLBACK_ANCHORS,
        }
    }
}

/// Solve with default settings
pub fn solve<R: AnchorRegistry + ?Sized>(samples: &[EstimatedDistance], anchors: &R) -> NavResult<PositionFix> {
    Trilateration::default().solve(samples, anchors)
}

impl Trilateration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_least_squares(mut self, enabled: bool) -> Self {
        self.least_squares_refinement = enabled;
        self
    }

    /// Compute a position from the distance estimates
    ///
    /// Estimates whose anchor is unknown or whose distance is not a finite
    /// non-negative number are ignored. Repeated anchors keep the last value.
    pub fn solve<R: AnchorRegistry + ?Sized>(
        &self,
        samples: &[EstimatedDistance],
        anchors: &R,
    ) -> NavResult<PositionFix> {
        let ranged = Self::resolve(samples, anchors);
        // thresholds below what the geometry needs are raised to the minimum
        let required = self.min_fallback_anchors.max(MIN_FALLBACK_ANCHORS);
        let full = self.min_anchors.max(MIN_TRILATERATION_ANCHORS);

        if ranged.len() < required {
            return Err(NavError::InsufficientData {
                available: ranged.len(),
                required,
            });
        }

        match ranged.as_slice() {
            [first, second, ..] if ranged.len() < full => Ok(Self::weighted_midpoint(first, second)),
            all if self.least_squares_refinement && all.len() > full => self.least_squares(all),
            [_, _, _, ..] => self.closed_form(&ranged[..3]),
            _ => Err(NavError::InsufficientData {
                available: ranged.len(),
                required,
            }),
        }
    }

    /// Every 3-anchor subset, most promising first
    ///
    /// Ordered by the sum of distances, ties by position in the distance
    /// ranking, so the first entry is the nearest-three selection `solve`
    /// uses. Callers receiving `DegenerateGeometry` can walk this list.
    pub fn candidate_subsets<R: AnchorRegistry + ?Sized>(
        &self,
        samples: &[EstimatedDistance],
        anchors: &R,
    ) -> Vec<[EstimatedDistance; 3]> {
        let ranged = Self::resolve(samples, anchors);
        let n = ranged.len();

        let mut triples = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let sum = ranged[i].distance + ranged[j].distance + ranged[k].distance;
                    triples.push((sum, [i, j, k]));
                }
            }
        }
        triples.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        triples
            .into_iter()
            .map(|(_, idx)| idx.map(|i| EstimatedDistance::new(ranged[i].anchor_id.clone(), ranged[i].distance)))
            .collect()
    }

    /// Closed-form solve on exactly the given three estimates
    pub fn solve_subset<R: AnchorRegistry + ?Sized>(
        &self,
        subset: &[EstimatedDistance; 3],
        anchors: &R,
    ) -> NavResult<PositionFix> {
        let ranged = Self::resolve(subset, anchors);
        if ranged.len() < 3 {
            return Err(NavError::InsufficientData {
                available: ranged.len(),
                required: 3,
            });
        }
        self.closed_form(&ranged)
    }

    /// Keep usable estimates, latest per anchor, sorted by distance then id
    fn resolve<R: AnchorRegistry + ?Sized>(samples: &[EstimatedDistance], anchors: &R) -> Vec<Ranged> {
        let mut ranged: Vec<Ranged> = Vec::with_capacity(samples.len());

        for sample in samples {
            if !sample.distance.is_finite() || sample.distance < 0.0 {
                continue;
            }
            let Some(anchor) = anchors.get_anchor(&sample.anchor_id) else {
                continue;
            };
            let entry = Ranged {
                anchor_id: anchor.id.clone(),
                position: anchor.position(),
                distance: sample.distance,
            };
            match ranged.iter_mut().find(|r| r.anchor_id == entry.anchor_id) {
                Some(existing) => *existing = entry,
                None => ranged.push(entry),
            }
        }

        ranged.sort_by(|a, b| match a.distance.total_cmp(&b.distance) {
            Ordering::Equal => a.anchor_id.cmp(&b.anchor_id),
            other => other,
        });
        ranged
    }

    /// Standard 3-circle trilateration with the first anchor as origin
    fn closed_form(&self, ranged: &[Ranged]) -> NavResult<PositionFix> {
        let origin = ranged[0].position;
        let r1 = ranged[0].distance;
        let p2 = Vector2::new(ranged[1].position.x - origin.x, ranged[1].position.y - origin.y);
        let p3 = Vector2::new(ranged[2].position.x - origin.x, ranged[2].position.y - origin.y);
        let r2 = ranged[1].distance;
        let r3 = ranged[2].distance;

        #[rustfmt::skip]
        let a = Matrix2::new(
            2.0 * p2.x, 2.0 * p2.y,
            2.0 * p3.x, 2.0 * p3.y,
        );
        let b = Vector2::new(
            r1 * r1 - r2 * r2 + p2.norm_squared(),
            r1 * r1 - r3 * r3 + p3.norm_squared(),
        );

        let determinant = a.determinant();
        let scale = 4.0 * p2.norm() * p3.norm();
        let ids = || ranged.iter().map(|r| r.anchor_id.clone()).collect::<Vec<_>>();

        if scale == 0.0 || determinant.abs() <= self.collinearity_epsilon * scale {
            return Err(NavError::DegenerateGeometry {
                anchor_ids: ids(),
                determinant,
            });
        }

        let local = a.lu().solve(&b).ok_or_else(|| NavError::DegenerateGeometry {
            anchor_ids: ids(),
            determinant,
        })?;

        let position = Position::new(local.x + origin.x, local.y + origin.y);
        Ok(PositionFix {
            position,
            confidence: Confidence::High,
            method: SolveMethod::ClosedForm,
            anchors_used: ids(),
            residual_m: Self::rms_residual(&position, ranged),
        })
    }

    /// Linearised least squares over every usable anchor
    fn least_squares(&self, ranged: &[Ranged]) -> NavResult<PositionFix> {
        let origin = ranged[0].position;
        let r1 = ranged[0].distance;
        let rows = ranged.len() - 1;

        let mut a = DMatrix::<f64>::zeros(rows, 2);
        let mut b = DVector::<f64>::zeros(rows);
        for (row, anchor) in ranged[1..].iter().enumerate() {
            let x = anchor.position.x - origin.x;
            let y = anchor.position.y - origin.y;
            a[(row, 0)] = 2.0 * x;
            a[(row, 1)] = 2.0 * y;
            b[row] = r1 * r1 - anchor.distance * anchor.distance + x * x + y * y;
        }

        let ata = a.transpose() * &a;
        let atb = a.transpose() * &b;
        let normal = Matrix2::new(ata[(0, 0)], ata[(0, 1)], ata[(1, 0)], ata[(1, 1)]);
        let determinant = normal.determinant();
        let scale = normal.trace() * normal.trace();
        let ids = || ranged.iter().map(|r| r.anchor_id.clone()).collect::<Vec<_>>();

        if scale == 0.0 || determinant.abs() <= self.collinearity_epsilon * scale {
            return Err(NavError::DegenerateGeometry {
                anchor_ids: ids(),
                determinant,
            });
        }

        let local = normal
            .lu()
            .solve(&Vector2::new(atb[0], atb[1]))
            .ok_or_else(|| NavError::DegenerateGeometry {
                anchor_ids: ids(),
                determinant,
            })?;

        let position = Position::new(local.x + origin.x, local.y + origin.y);
        Ok(PositionFix {
            position,
            confidence: Confidence::High,
            method: SolveMethod::LeastSquares,
            anchors_used: ids(),
            residual_m: Self::rms_residual(&position, ranged),
        })
    }

    /// Two-anchor estimate pulled toward the closer anchor
    fn weighted_midpoint(first: &Ranged, second: &Ranged) -> PositionFix {
        let total = first.distance + second.distance;
        // weight of the second anchor is d1 / (d1 + d2)
        let t = if total > 0.0 { first.distance / total } else { 0.5 };
        let position = first.position.lerp(&second.position, t);
        let pair = [first.clone(), second.clone()];

        PositionFix {
            position,
            confidence: Confidence::Low,
            method: SolveMethod::WeightedMidpoint,
            anchors_used: vec![first.anchor_id.clone(), second.anchor_id.clone()],
            residual_m: Self::rms_residual(&position, &pair),
        }
    }

    fn rms_residual(position: &Position, ranged: &[Ranged]) -> f64 {
        if ranged.is_empty() {
            return 0.0;
        }
        let sum: f64 = ranged
            .iter()
            .map(|r| {
                let error = position.distance_to(&r.position) - r.distance;
                error * error
            })
            .sum();
        (sum / ranged.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Anchor;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn registry(anchors: &[(&str, f64, f64)]) -> HashMap<String, Anchor> {
        anchors
            .iter()
            .map(|(id, x, y)| (id.to_string(), Anchor::new(*id, *x, *y)))
            .collect()
    }

    fn ranges_to(target: Position, anchors: &HashMap<String, Anchor>) -> Vec<EstimatedDistance> {
        let mut ids: Vec<&String> = anchors.keys().collect();
        ids.sort();
        ids.into_iter()
            .map(|id| EstimatedDistance::new(id.clone(), anchors[id].position().distance_to(&target)))
            .collect()
    }

    #[test]
    fn test_recovers_known_point() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 4.0, 0.0), ("c", 0.0, 3.0)]);
        let samples = vec![
            EstimatedDistance::new("a", 2f64.sqrt()),
            EstimatedDistance::new("b", 10f64.sqrt()),
            EstimatedDistance::new("c", 5f64.sqrt()),
        ];

        let fix = solve(&samples, &anchors).unwrap();
        assert!((fix.position.x - 1.0).abs() < 1e-6, "x = {}", fix.position.x);
        assert!((fix.position.y - 1.0).abs() < 1e-6, "y = {}", fix.position.y);
        assert_eq!(fix.confidence, Confidence::High);
        assert_eq!(fix.method, SolveMethod::ClosedForm);
        assert!(fix.residual_m < 1e-6);
    }

    #[test]
    fn test_symmetric_fixture() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 10.0, 0.0), ("c", 0.0, 10.0)]);
        let samples = vec![
            EstimatedDistance::new("a", 5.0),
            EstimatedDistance::new("b", 5.0),
            EstimatedDistance::new("c", 5.0),
        ];

        // 10x = 100 and 10y = 100 after subtracting the circle equations
        let fix = solve(&samples, &anchors).unwrap();
        assert!((fix.position.x - 5.0).abs() < 1e-9);
        assert!((fix.position.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_off_origin_anchors() {
        let anchors = registry(&[("a", 12.0, -3.0), ("b", 20.0, -3.0), ("c", 12.0, 7.0)]);
        let target = Position::new(15.5, 1.25);
        let fix = solve(&ranges_to(target, &anchors), &anchors).unwrap();
        assert!((fix.position.x - target.x).abs() < 1e-6);
        assert!((fix.position.y - target.y).abs() < 1e-6);
    }

    #[test]
    fn test_collinear_anchors_are_degenerate() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 1.0, 0.0), ("c", 2.0, 0.0)]);
        let samples = vec![
            EstimatedDistance::new("a", 1.0),
            EstimatedDistance::new("b", 2.0),
            EstimatedDistance::new("c", 3.0),
        ];

        match solve(&samples, &anchors) {
            Err(NavError::DegenerateGeometry { anchor_ids, .. }) => assert_eq!(anchor_ids.len(), 3),
            other => panic!("Expected DegenerateGeometry, got {:?}", other),
        }
    }

    #[test]
    fn test_coincident_anchors_are_degenerate() {
        let anchors = registry(&[("a", 1.0, 1.0), ("b", 1.0, 1.0), ("c", 5.0, 2.0)]);
        let samples = vec![
            EstimatedDistance::new("a", 1.0),
            EstimatedDistance::new("b", 1.5),
            EstimatedDistance::new("c", 3.0),
        ];
        assert!(matches!(solve(&samples, &anchors), Err(NavError::DegenerateGeometry { .. })));
    }

    #[test]
    fn test_nearest_three_selected() {
        let anchors = registry(&[
            ("a", 0.0, 0.0),
            ("b", 4.0, 0.0),
            ("c", 0.0, 3.0),
            ("far", 50.0, 50.0),
        ]);
        let mut samples = ranges_to(Position::new(1.0, 1.0), &anchors);
        // corrupt the far anchor; it must not take part
        for sample in samples.iter_mut().filter(|s| s.anchor_id == "far") {
            sample.distance = 500.0;
        }

        let fix = solve(&samples, &anchors).unwrap();
        assert_eq!(fix.anchors_used, vec!["a", "c", "b"]);
        assert!((fix.position.x - 1.0).abs() < 1e-6);
        assert!((fix.position.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_ties_broken_by_anchor_id() {
        let anchors = registry(&[
            ("d", 10.0, 10.0),
            ("c", 0.0, 10.0),
            ("b", 10.0, 0.0),
            ("a", 0.0, 0.0),
        ]);
        let samples: Vec<_> = ["d", "c", "b", "a"]
            .iter()
            .map(|id| EstimatedDistance::new(*id, 50f64.sqrt()))
            .collect();

        let fix = solve(&samples, &anchors).unwrap();
        assert_eq!(fix.anchors_used, vec!["a", "b", "c"]);
        assert!((fix.position.x - 5.0).abs() < 1e-9);
        assert!((fix.position.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_latest_duplicate_wins() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 4.0, 0.0), ("c", 0.0, 3.0)]);
        let samples = vec![
            EstimatedDistance::new("a", 40.0),
            EstimatedDistance::new("b", 10f64.sqrt()),
            EstimatedDistance::new("c", 5f64.sqrt()),
            EstimatedDistance::new("a", 2f64.sqrt()),
        ];
        let fix = solve(&samples, &anchors).unwrap();
        assert!((fix.position.x - 1.0).abs() < 1e-6);
        assert!((fix.position.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_estimates_use_weighted_midpoint() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 10.0, 0.0)]);
        let samples = vec![EstimatedDistance::new("a", 2.0), EstimatedDistance::new("b", 8.0)];

        let fix = solve(&samples, &anchors).unwrap();
        assert_eq!(fix.confidence, Confidence::Low);
        assert_eq!(fix.method, SolveMethod::WeightedMidpoint);
        assert!((fix.position.x - 2.0).abs() < 1e-12);
        assert_eq!(fix.position.y, 0.0);
    }

    #[test]
    fn test_two_estimates_at_zero_distance() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 10.0, 0.0)]);
        let samples = vec![EstimatedDistance::new("a", 0.0), EstimatedDistance::new("b", 0.0)];
        let fix = solve(&samples, &anchors).unwrap();
        assert_eq!(fix.position, Position::new(5.0, 0.0));
    }

    #[test]
    fn test_too_few_estimates() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 10.0, 0.0)]);

        let none: Vec<EstimatedDistance> = Vec::new();
        assert_eq!(
            solve(&none, &anchors),
            Err(NavError::InsufficientData { available: 0, required: 2 })
        );

        let one = vec![EstimatedDistance::new("a", 3.0)];
        assert_eq!(
            solve(&one, &anchors),
            Err(NavError::InsufficientData { available: 1, required: 2 })
        );
    }

    #[test]
    fn test_thresholds_below_geometric_minimum() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 10.0, 0.0), ("c", 0.0, 10.0)]);
        let solver = Trilateration {
            min_fallback_anchors: 1,
            min_anchors: 2,
            ..Trilateration::default()
        };

        let one = vec![EstimatedDistance::new("a", 3.0)];
        assert_eq!(
            solver.solve(&one, &anchors),
            Err(NavError::InsufficientData { available: 1, required: 2 })
        );

        let two = vec![EstimatedDistance::new("a", 2.0), EstimatedDistance::new("b", 8.0)];
        let fix = solver.solve(&two, &anchors).unwrap();
        assert_eq!(fix.method, SolveMethod::WeightedMidpoint);

        let three = ranges_to(Position::new(2.0, 3.0), &anchors);
        let fix = solver.solve(&three, &anchors).unwrap();
        assert_eq!(fix.method, SolveMethod::ClosedForm);
    }

    #[test]
    fn test_unknown_and_invalid_estimates_ignored() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 10.0, 0.0)]);
        let samples = vec![
            EstimatedDistance::new("a", 3.0),
            EstimatedDistance::new("ghost", 1.0),
            EstimatedDistance::new("b", f64::NAN),
        ];
        assert_eq!(
            solve(&samples, &anchors),
            Err(NavError::InsufficientData { available: 1, required: 2 })
        );
    }

    #[test]
    fn test_least_squares_uses_all_anchors() {
        let anchors = registry(&[
            ("a", 0.0, 0.0),
            ("b", 10.0, 0.0),
            ("c", 0.0, 10.0),
            ("d", 10.0, 10.0),
            ("e", 5.0, -4.0),
        ]);
        let target = Position::new(3.0, 6.0);
        let samples = ranges_to(target, &anchors);

        let fix = Trilateration::new()
            .with_least_squares(true)
            .solve(&samples, &anchors)
            .unwrap();
        assert_eq!(fix.method, SolveMethod::LeastSquares);
        assert_eq!(fix.anchors_used.len(), 5);
        assert!((fix.position.x - target.x).abs() < 1e-6);
        assert!((fix.position.y - target.y).abs() < 1e-6);
    }

    #[test]
    fn test_least_squares_skipped_with_three_anchors() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 4.0, 0.0), ("c", 0.0, 3.0)]);
        let samples = ranges_to(Position::new(1.0, 1.0), &anchors);
        let fix = Trilateration::new()
            .with_least_squares(true)
            .solve(&samples, &anchors)
            .unwrap();
        assert_eq!(fix.method, SolveMethod::ClosedForm);
    }

    #[test]
    fn test_candidate_subsets_allow_retry_after_degenerate() {
        let anchors = registry(&[
            ("a", 0.0, 0.0),
            ("b", 1.0, 0.0),
            ("c", 2.0, 0.0),
            ("d", 1.0, 5.0),
        ]);
        let target = Position::new(1.0, 1.0);
        // d is 4 m away, so the nearest three are the collinear a, b, c
        let samples = ranges_to(target, &anchors);

        let solver = Trilateration::new();
        assert!(matches!(solver.solve(&samples, &anchors), Err(NavError::DegenerateGeometry { .. })));

        let subsets = solver.candidate_subsets(&samples, &anchors);
        assert_eq!(subsets.len(), 4);
        let first_ids: Vec<_> = subsets[0].iter().map(|s| s.anchor_id.as_str()).collect();
        assert_eq!(first_ids, vec!["b", "a", "c"]);

        let fix = subsets
            .iter()
            .find_map(|subset| solver.solve_subset(subset, &anchors).ok())
            .unwrap();
        assert!((fix.position.x - target.x).abs() < 1e-6);
        assert!((fix.position.y - target.y).abs() < 1e-6);
    }

    #[test]
    fn test_solve_is_idempotent() {
        let anchors = registry(&[("a", 0.0, 0.0), ("b", 7.0, 1.0), ("c", 2.0, 9.0)]);
        let samples = vec![
            EstimatedDistance::new("a", 4.1),
            EstimatedDistance::new("b", 5.3),
            EstimatedDistance::new("c", 6.7),
        ];
        let first = solve(&samples, &anchors).unwrap();
        let second = solve(&samples, &anchors).unwrap();
        assert_eq!(first.position.x.to_bits(), second.position.x.to_bits());
        assert_eq!(first.position.y.to_bits(), second.position.y.to_bits());
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn test_weighted_midpoint_lies_on_segment(
            ax in -50.0f64..50.0, ay in -50.0f64..50.0,
            bx in -50.0f64..50.0, by in -50.0f64..50.0,
            da in 0.0f64..30.0, db in 0.0f64..30.0,
        ) {
            let anchors = registry(&[("a", ax, ay), ("b", bx, by)]);
            let samples = vec![EstimatedDistance::new("a", da), EstimatedDistance::new("b", db)];
            let fix = solve(&samples, &anchors)?;

            prop_assert_eq!(fix.confidence, Confidence::Low);
            let a = Position::new(ax, ay);
            let b = Position::new(bx, by);
            let along = a.distance_to(&fix.position) + fix.position.distance_to(&b);
            prop_assert!((along - a.distance_to(&b)).abs() < 1e-9);
        }

        #[test]
        fn test_exact_ranges_recover_target(
            tx in -20.0f64..20.0,
            ty in -20.0f64..20.0,
        ) {
            let anchors = registry(&[("a", -25.0, -25.0), ("b", 25.0, -25.0), ("c", 0.0, 30.0)]);
            let target = Position::new(tx, ty);
            let fix = solve(&ranges_to(target, &anchors), &anchors)?;
            prop_assert!((fix.position.x - tx).abs() < 1e-6);
            prop_assert!((fix.position.y - ty).abs() < 1e-6);
        }
    }
}
