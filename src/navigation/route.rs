//! Route guidance from a position to a point of interest

use crate::core::{Direction, PointOfInterest, Position, RouteSuggestion, DEFAULT_WALKING_SPEED};
use crate::navigation::compass::{bearing_degrees, direction_from_bearing, CompassConvention};
use crate::navigation::ranking;
use crate::validation::error::{NavError, NavResult};

/// Route planning parameters
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    /// Meters per second
    pub average_walking_speed: f64,
    pub compass_convention: CompassConvention,
    /// Below this distance the user is told they have arrived
    pub arrival_radius_m: f64,
    /// Routes at least this long get a midpoint checkpoint
    pub checkpoint_distance_m: f64,
    /// Axis legs shorter than this are left out of walking directions
    pub axis_threshold_m: f64,
}

impl Default for RoutePlanner {
    fn default() -> Self {
        Self {
            average_walking_speed: DEFAULT_WALKING_SPEED,
            compass_convention: CompassConvention::Centered,
            arrival_radius_m: 0.5,
            checkpoint_distance_m: 20.0,
            axis_threshold_m: 0.5,
        }
    }
}

/// Plan with default parameters
pub fn plan_route(position: &Position, destination: &PointOfInterest) -> RouteSuggestion {
    RoutePlanner::default().plan(position, destination)
}

/// Routes to the `max` nearest points of interest with default parameters
pub fn suggest_routes(position: &Position, pois: &[PointOfInterest], max: usize) -> NavResult<Vec<RouteSuggestion>> {
    RoutePlanner::default().suggest(position, pois, max)
}

impl RoutePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guidance toward a known point of interest
    pub fn plan(&self, position: &Position, destination: &PointOfInterest) -> RouteSuggestion {
        let target = destination.position();
        let distance = position.distance_to(&target);
        let bearing_deg = bearing_degrees(position, &target);
        let direction = direction_from_bearing(bearing_deg, self.compass_convention);

        RouteSuggestion {
            poi_id: destination.id,
            poi_name: destination.name.clone(),
            destination: target,
            distance,
            direction,
            bearing_deg,
            estimated_walk_seconds: self.walk_seconds(distance),
            instructions: self.instructions(distance, direction, destination),
        }
    }

    /// Guidance toward the point of interest with the given id
    pub fn plan_to(
        &self,
        position: &Position,
        destination_id: u32,
        pois: &[PointOfInterest],
    ) -> NavResult<RouteSuggestion> {
        if pois.is_empty() {
            return Err(NavError::EmptyRegistry);
        }
        let destination = pois
            .iter()
            .find(|poi| poi.id == destination_id)
            .ok_or(NavError::UnknownDestination { poi_id: destination_id })?;
        Ok(self.plan(position, destination))
    }

    /// Routes to the `max` nearest points of interest, nearest first
    pub fn suggest(
        &self,
        position: &Position,
        pois: &[PointOfInterest],
        max: usize,
    ) -> NavResult<Vec<RouteSuggestion>> {
        let nearest = ranking::nearest(position, pois, max)?;
        Ok(nearest.iter().map(|ranked| self.plan(position, &ranked.poi)).collect())
    }

    /// Whole seconds needed to walk `distance` meters, rounded up
    pub fn walk_seconds(&self, distance: f64) -> u64 {
        let speed = self.average_walking_speed;
        if !speed.is_finite() || speed <= 0.0 || !distance.is_finite() || distance <= 0.0 {
            return 0;
        }
        (distance / speed).ceil() as u64
    }

    /// East/West then North/South legs, e.g. "Walk 3.0 meters East and then 4.0 meters North"
    pub fn axis_directions(&self, from: &Position, to: &Position) -> String {
        axis_directions(from, to, self.axis_threshold_m)
    }

    fn instructions(&self, distance: f64, direction: Direction, destination: &PointOfInterest) -> Vec<String> {
        if distance < self.arrival_radius_m {
            return vec![format!("You are already at {}", destination.name)];
        }

        let mut steps = Vec::with_capacity(3);
        if distance >= self.checkpoint_distance_m {
            let half = distance / 2.0;
            steps.push(format!("Head {} for {:.1} meters", direction, half));
            steps.push(format!(
                "Halfway there: continue {} for another {:.1} meters",
                direction, half
            ));
        } else {
            steps.push(format!("Head {} for {:.1} meters", direction, distance));
        }
        steps.push(format!("You will arrive at {}", destination.name));
        steps
    }
}

/// Axis-aligned walking directions between two positions
pub fn axis_directions(from: &Position, to: &Position, threshold_m: f64) -> String {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let mut legs = Vec::with_capacity(2);

    if dx.abs() > threshold_m {
        let heading = if dx > 0.0 { Direction::East } else { Direction::West };
        legs.push(format!("{:.1} meters {}", dx.abs(), heading));
    }
    if dy.abs() > threshold_m {
        let heading = if dy > 0.0 { Direction::North } else { Direction::South };
        legs.push(format!("{:.1} meters {}", dy.abs(), heading));
    }

    if legs.is_empty() {
        return "You are already very close to the destination".to_string();
    }
    format!("Walk {}", legs.join(" and then "))
}
