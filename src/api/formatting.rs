//! Navigation response output formatting

use crate::api::types::NavigationResponse;
use crate::navigation::route::axis_directions;
use serde::Serialize;

/// Render a walk time: "N seconds" under a minute, "M min S sec" otherwise
pub fn format_walk_time(seconds: u64) -> String {
    if seconds < 60 {
        format!("{} seconds", seconds)
    } else {
        format!("{} min {} sec", seconds / 60, seconds % 60)
    }
}

/// Human-readable text formatter
#[derive(Debug, Clone)]
pub struct TextFormatter {
    /// One line for the position and one per route
    pub compact: bool,
    /// List samples that were left out of the solve
    pub include_rejected: bool,
    /// Axis legs shorter than this are left out of walking directions
    pub axis_threshold_m: f64,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            compact: false,
            include_rejected: false,
            axis_threshold_m: 0.5,
        }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self {
            compact: true,
            ..Self::default()
        }
    }

    pub fn format_text(&self, response: &NavigationResponse) -> String {
        let fix = &response.fix;
        let mut output = String::new();

        if self.compact {
            output.push_str(&format!(
                "Pos: ({:.2}, {:.2}) | {:?}/{:?} | Anc:{}\n",
                fix.position.x,
                fix.position.y,
                response.quality,
                fix.confidence,
                fix.anchors_used.len()
            ));
            for route in &response.routes {
                output.push_str(&format!(
                    "#{} {}: {:.1} m {}, {}\n",
                    route.poi_id,
                    route.poi_name,
                    route.distance,
                    route.direction,
                    format_walk_time(route.estimated_walk_seconds)
                ));
            }
            return output;
        }

        output.push_str("Position:\n");
        output.push_str(&format!("  X:        {:.2} m\n", fix.position.x));
        output.push_str(&format!("  Y:        {:.2} m\n", fix.position.y));
        output.push_str(&format!("  Quality:  {}\n", response.quality.description()));
        output.push_str(&format!("  Method:   {:?} ({:?} confidence)\n", fix.method, fix.confidence));
        output.push_str(&format!("  Anchors:  {}\n", fix.anchors_used.join(", ")));
        output.push_str(&format!("  Residual: {:.2} m\n", fix.residual_m));

        if let Some(ranking) = &response.ranking {
            output.push_str("\nNearest points:\n");
            for (rank, entry) in ranking.iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {} (#{}) {:.1} m\n",
                    rank + 1,
                    entry.poi.name,
                    entry.poi.id,
                    entry.distance
                ));
            }
        }

        for route in &response.routes {
            output.push_str(&format!("\nRoute to {} (#{}):\n", route.poi_name, route.poi_id));
            output.push_str(&format!(
                "  Distance:  {:.1} m {} ({:.0}°)\n",
                route.distance, route.direction, route.bearing_deg
            ));
            output.push_str(&format!("  Walk time: {}\n", format_walk_time(route.estimated_walk_seconds)));
            output.push_str(&format!(
                "  Directions: {}\n",
                axis_directions(&fix.position, &route.destination, self.axis_threshold_m)
            ));
            for (step, instruction) in route.instructions.iter().enumerate() {
                output.push_str(&format!("    {}. {}\n", step + 1, instruction));
            }
        }

        if self.include_rejected && !response.rejected.is_empty() {
            output.push_str("\nRejected samples:\n");
            for rejected in &response.rejected {
                output.push_str(&format!(
                    "  - {} ({} dBm): {}\n",
                    rejected.sample.anchor_id, rejected.sample.rssi, rejected.reason
                ));
            }
        }

        output
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::trilateration::{Confidence, PositionFix, SolveMethod};
    use crate::core::{Direction, PointOfInterest, Position, RssiSample};
    use crate::navigation::route::RoutePlanner;
    use crate::validation::data::{PositioningQuality, RejectedSample, RejectionReason};

    fn response() -> NavigationResponse {
        let position = Position::new(0.0, 0.0);
        let route = RoutePlanner::default().plan(&position, &PointOfInterest::new(7, 3.0, 4.0, "Library"));
        NavigationResponse {
            fix: PositionFix {
                position,
                confidence: Confidence::High,
                method: SolveMethod::ClosedForm,
                anchors_used: vec!["esp32-1".into(), "esp32-2".into(), "esp32-3".into()],
                residual_m: 0.0,
            },
            quality: PositioningQuality::Excellent,
            ranking: None,
            routes: vec![route],
            rejected: vec![RejectedSample {
                sample: RssiSample::new("rogue", -40),
                reason: RejectionReason::UnknownAnchor,
            }],
        }
    }

    #[test]
    fn test_walk_time() {
        assert_eq!(format_walk_time(0), "0 seconds");
        assert_eq!(format_walk_time(59), "59 seconds");
        assert_eq!(format_walk_time(60), "1 min 0 sec");
        assert_eq!(format_walk_time(125), "2 min 5 sec");
    }

    #[test]
    fn test_text_output() {
        let text = TextFormatter::new().format_text(&response());
        assert!(text.contains("Excellent positioning with 3+ reference points"));
        assert!(text.contains("Route to Library (#7)"));
        assert!(text.contains("Walk time: 5 seconds"));
        assert!(text.contains("Walk 3.0 meters East and then 4.0 meters North"));
        assert!(text.contains("1. Head Northeast for 5.0 meters"));
        assert!(!text.contains("Rejected samples"));
    }

    #[test]
    fn test_axis_legs_use_exact_destination() {
        let mut response = response();
        let route = RoutePlanner::default().plan(&Position::new(0.0, 0.0), &PointOfInterest::new(8, 0.5, 6.0, "Lab"));
        assert_eq!(route.destination, Position::new(0.5, 6.0));
        response.routes = vec![route];

        let text = TextFormatter::new().format_text(&response);
        assert!(text.contains("Directions: Walk 6.0 meters North\n"));
    }

    #[test]
    fn test_text_output_with_rejections() {
        let formatter = TextFormatter {
            include_rejected: true,
            ..TextFormatter::default()
        };
        let text = formatter.format_text(&response());
        assert!(text.contains("rogue (-40 dBm): unknown anchor"));
    }

    #[test]
    fn test_compact_output() {
        let text = TextFormatter::compact().format_text(&response());
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("#7 Library: 5.0 m Northeast, 5 seconds"));
    }

    #[test]
    fn test_json_output() {
        let response = response();
        let json = JsonFormatter::new().format_json(&response).unwrap();
        assert!(!json.contains('\n'));
        assert!(!json.contains("ranking"));

        let pretty = JsonFormatter::pretty().format_json(&response).unwrap();
        assert!(pretty.contains('\n'));

        let parsed: NavigationResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.routes[0].direction, Direction::Northeast);
    }
}
