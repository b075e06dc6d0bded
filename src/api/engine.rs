//! Request orchestration: validate, locate, rank and route
//!
//! The engine holds configuration only. Every call works on the samples and
//! registries it is handed, so one engine can serve concurrent requests.

use crate::algorithms::trilateration::Trilateration;
use crate::api::registry::{AnchorRegistry, PoiRegistry};
use crate::api::types::{NavigationRequest, NavigationResponse, PositionReport};
use crate::core::{Position, RankedPoi, RouteSuggestion, RssiSample};
use crate::navigation::ranking;
use crate::navigation::route::RoutePlanner;
use crate::utils::config::EngineConfig;
use crate::validation::data::{PositioningQuality, SampleValidator};
use crate::validation::error::{NavError, NavResult};
use tracing::debug;

/// Stateless navigation engine
#[derive(Debug, Clone)]
pub struct NavigationEngine {
    config: EngineConfig,
    validator: SampleValidator,
    solver: Trilateration,
    planner: RoutePlanner,
}

impl Default for NavigationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl NavigationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            validator: SampleValidator::new(config.distance_model()),
            solver: config.trilateration(),
            planner: config.route_planner(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Estimate the tag position from one batch of samples
    pub fn locate<A: AnchorRegistry + ?Sized>(&self, samples: &[RssiSample], anchors: &A) -> NavResult<PositionReport> {
        let validation = self.validator.validate(samples, anchors);
        debug!(
            samples = samples.len(),
            usable = validation.usable_count(),
            rejected = validation.rejected.len(),
            quality = ?validation.quality,
            "Validated samples"
        );

        let fix = self.solver.solve(&validation.estimates, anchors)?;
        debug!(
            method = ?fix.method,
            anchors = ?fix.anchors_used,
            x = fix.position.x,
            y = fix.position.y,
            residual_m = fix.residual_m,
            "Position solved"
        );

        Ok(PositionReport {
            fix,
            quality: validation.quality,
            rejected: validation.rejected,
        })
    }

    /// Quality of a sample batch without solving
    pub fn assess_quality<A: AnchorRegistry + ?Sized>(&self, samples: &[RssiSample], anchors: &A) -> PositioningQuality {
        self.validator.assess_quality(samples, anchors)
    }

    /// Every point of interest by distance from a caller-supplied position
    pub fn rank_from<P: PoiRegistry + ?Sized>(&self, position: &Position, pois: &P) -> NavResult<Vec<RankedPoi>> {
        self.check_bounds(position)?;
        ranking::rank(position, pois.list_pois())
    }

    /// Nearest points of interest; `max` defaults to the configured count
    pub fn nearest_from<P: PoiRegistry + ?Sized>(
        &self,
        position: &Position,
        pois: &P,
        max: Option<usize>,
    ) -> NavResult<Vec<RankedPoi>> {
        self.check_bounds(position)?;
        ranking::nearest(position, pois.list_pois(), max.unwrap_or(self.config.max_nearest))
    }

    /// Route from a caller-supplied position to one point of interest
    pub fn route_from<P: PoiRegistry + ?Sized>(
        &self,
        position: &Position,
        destination_id: u32,
        pois: &P,
    ) -> NavResult<RouteSuggestion> {
        self.check_bounds(position)?;
        self.planner.plan_to(position, destination_id, pois.list_pois())
    }

    /// Routes to the nearest points of interest from a caller-supplied position
    pub fn suggest_from<P: PoiRegistry + ?Sized>(
        &self,
        position: &Position,
        pois: &P,
        max: Option<usize>,
    ) -> NavResult<Vec<RouteSuggestion>> {
        self.check_bounds(position)?;
        self.planner
            .suggest(position, pois.list_pois(), max.unwrap_or(self.config.max_suggestions))
    }

    /// Locate, then route to the destination or suggest nearby ones
    ///
    /// Either every requested part is computed or an error is returned.
    pub fn navigate<A, P>(&self, request: &NavigationRequest, anchors: &A, pois: &P) -> NavResult<NavigationResponse>
    where
        A: AnchorRegistry + ?Sized,
        P: PoiRegistry + ?Sized,
    {
        let report = self.locate(&request.samples, anchors)?;
        let position = report.fix.position;
        let pois = pois.list_pois();

        // solver output is not bounds-checked
        let ranking = if request.include_ranking {
            Some(ranking::rank(&position, pois)?)
        } else {
            None
        };

        let routes = match request.destination {
            Some(poi_id) => vec![self.planner.plan_to(&position, poi_id, pois)?],
            None => {
                let max = request.max_suggestions.unwrap_or(self.config.max_suggestions);
                self.planner.suggest(&position, pois, max)?
            }
        };
        debug!(routes = routes.len(), destination = ?request.destination, "Routes planned");

        Ok(NavigationResponse {
            fix: report.fix,
            quality: report.quality,
            ranking,
            routes,
            rejected: report.rejected,
        })
    }

    fn check_bounds(&self, position: &Position) -> NavResult<()> {
        match &self.config.bounds {
            Some(bounds) if !bounds.contains(position) => Err(NavError::OutOfBounds {
                x: position.x,
                y: position.y,
            }),
            _ => Ok(()),
        }
    }
}
