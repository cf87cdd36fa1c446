//! Decodes Route Directions responses into [`RouteResult`].
//!
//! The wire schema lives here and nowhere else; everything downstream works
//! with the `shared` types.

use serde::Deserialize;
use shared::{Location, RouteLeg, RouteResult};

use crate::error::PlannerError;

const METERS_PER_KM: f64 = 1_000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<RouteDto>,
    #[serde(default)]
    optimized_waypoints: Option<Vec<OptimizedWaypoint>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteDto {
    summary: SummaryDto,
    #[serde(default)]
    legs: Vec<LegDto>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDto {
    length_in_meters: f64,
    travel_time_in_seconds: f64,
}

#[derive(Debug, Deserialize)]
struct LegDto {
    summary: SummaryDto,
    #[serde(default)]
    points: Vec<PointDto>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct PointDto {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptimizedWaypoint {
    provided_index: usize,
    optimized_index: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(alias = "description")]
    message: String,
}

/// `waypoint_count` excludes the origin; it is needed to complete the
/// visiting order, since the service never reorders the final stop.
pub fn interpret_response(
    status: u16,
    body: &str,
    waypoint_count: usize,
) -> Result<RouteResult, PlannerError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorPayload>(body)
            .ok()
            .map(|payload| payload.error.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("routing service returned status {status}"));
        tracing::warn!(status, %message, "directions request failed");
        return Err(PlannerError::Service(message));
    }

    let response: DirectionsResponse = serde_json::from_str(body).map_err(|err| {
        tracing::error!(%err, "failed to decode directions response");
        err
    })?;

    let route = response.routes.into_iter().next().ok_or(PlannerError::NoRouteFound)?;
    let result = RouteResult {
        total_distance_km: route.summary.length_in_meters / METERS_PER_KM,
        total_duration_min: route.summary.travel_time_in_seconds / SECONDS_PER_MINUTE,
        optimized_order: response
            .optimized_waypoints
            .map(|waypoints| optimized_order(waypoints, waypoint_count)),
        legs: route.legs.iter().enumerate().map(|(idx, leg)| to_leg(idx, leg)).collect(),
        path_coordinates: route
            .legs
            .iter()
            .flat_map(|leg| leg.points.iter())
            .map(|point| Location::new(point.latitude, point.longitude))
            .collect(),
    };

    tracing::debug!(
        km = result.total_distance_km,
        minutes = result.total_duration_min,
        legs = result.legs.len(),
        points = result.path_coordinates.len(),
        "decoded directions response"
    );
    Ok(result)
}

/// Maps a connectivity-level failure to the generic fallback error.
pub fn interpret_transport_failure(err: impl std::fmt::Display) -> PlannerError {
    tracing::error!(%err, "directions request did not complete");
    PlannerError::Transport(err.to_string())
}

/// Labels follow position along the route, not input order.
fn to_leg(idx: usize, leg: &LegDto) -> RouteLeg {
    let start_label = if idx == 0 {
        "Start".to_string()
    } else {
        format!("Waypoint {idx}")
    };
    RouteLeg {
        distance_km: leg.summary.length_in_meters / METERS_PER_KM,
        duration_min: leg.summary.travel_time_in_seconds / SECONDS_PER_MINUTE,
        start_label,
        end_label: format!("Waypoint {}", idx + 1),
    }
}

/// The service reorders only the stops between the fixed first and last
/// ones, so the last waypoint is appended when the list omits it.
fn optimized_order(mut waypoints: Vec<OptimizedWaypoint>, waypoint_count: usize) -> Vec<usize> {
    waypoints.sort_by_key(|wp| wp.optimized_index);
    let mut order: Vec<usize> = waypoints.into_iter().map(|wp| wp.provided_index).collect();
    if let Some(last) = waypoint_count.checked_sub(1) {
        if order.len() == last && !order.contains(&last) {
            order.push(last);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_leg_body() -> String {
        json!({
            "formatVersion": "0.0.12",
            "routes": [
                {
                    "summary": {"lengthInMeters": 15000, "travelTimeInSeconds": 1200},
                    "legs": [
                        {
                            "summary": {"lengthInMeters": 6000, "travelTimeInSeconds": 480},
                            "points": [
                                {"latitude": 47.60, "longitude": -122.30},
                                {"latitude": 47.61, "longitude": -122.25}
                            ]
                        },
                        {
                            "summary": {"lengthInMeters": 9000, "travelTimeInSeconds": 720},
                            "points": [
                                {"latitude": 47.61, "longitude": -122.25},
                                {"latitude": 47.70, "longitude": -122.10}
                            ]
                        }
                    ]
                },
                {
                    "summary": {"lengthInMeters": 99999, "travelTimeInSeconds": 9999},
                    "legs": []
                }
            ],
            "optimizedWaypoints": [
                {"providedIndex": 0, "optimizedIndex": 0}
            ]
        })
        .to_string()
    }

    #[test]
    fn test_converts_units_from_first_route() {
        let result = interpret_response(200, &two_leg_body(), 2).unwrap();
        assert_eq!(result.total_distance_km, 15.0);
        assert_eq!(result.total_duration_min, 20.0);
    }

    #[test]
    fn test_legs_are_labeled_by_route_position() {
        let result = interpret_response(200, &two_leg_body(), 2).unwrap();
        assert_eq!(result.legs.len(), 2);
        assert_eq!(result.legs[0].start_label, "Start");
        assert_eq!(result.legs[0].end_label, "Waypoint 1");
        assert_eq!(result.legs[0].distance_km, 6.0);
        assert_eq!(result.legs[0].duration_min, 8.0);
        assert_eq!(result.legs[1].start_label, "Waypoint 1");
        assert_eq!(result.legs[1].end_label, "Waypoint 2");
    }

    #[test]
    fn test_path_concatenates_leg_points() {
        let result = interpret_response(200, &two_leg_body(), 2).unwrap();
        assert_eq!(result.path_coordinates.len(), 4);
        assert_eq!(result.path_coordinates[0], Location::new(47.60, -122.30));
        assert_eq!(result.path_coordinates[3], Location::new(47.70, -122.10));
    }

    #[test]
    fn test_optimized_order_appends_fixed_destination() {
        let result = interpret_response(200, &two_leg_body(), 2).unwrap();
        assert_eq!(result.optimized_order, Some(vec![0, 1]));
    }

    fn summary_only_body(optimized: serde_json::Value) -> String {
        json!({
            "routes": [{"summary": {"lengthInMeters": 100, "travelTimeInSeconds": 60}, "legs": []}],
            "optimizedWaypoints": optimized
        })
        .to_string()
    }

    #[test]
    fn test_optimized_order_is_full_permutation() {
        let body = summary_only_body(json!([
            {"providedIndex": 0, "optimizedIndex": 1},
            {"providedIndex": 1, "optimizedIndex": 0}
        ]));
        let result = interpret_response(200, &body, 3).unwrap();
        assert_eq!(result.optimized_order, Some(vec![1, 0, 2]));
    }

    #[test]
    fn test_single_waypoint_order_is_destination_only() {
        let result = interpret_response(200, &summary_only_body(json!([])), 1).unwrap();
        assert_eq!(result.optimized_order, Some(vec![0]));
    }

    #[test]
    fn test_complete_order_is_kept_as_is() {
        let body = summary_only_body(json!([
            {"providedIndex": 1, "optimizedIndex": 0},
            {"providedIndex": 0, "optimizedIndex": 1}
        ]));
        let result = interpret_response(200, &body, 2).unwrap();
        assert_eq!(result.optimized_order, Some(vec![1, 0]));
    }

    #[test]
    fn test_optimized_order_absent_when_missing() {
        let body = json!({
            "routes": [{"summary": {"lengthInMeters": 100, "travelTimeInSeconds": 60}, "legs": []}]
        })
        .to_string();
        let result = interpret_response(200, &body, 2).unwrap();
        assert_eq!(result.optimized_order, None);
        assert!(result.path_coordinates.is_empty());
    }

    #[test]
    fn test_zero_routes_is_no_route_found() {
        let body = json!({"routes": []}).to_string();
        assert!(matches!(interpret_response(200, &body, 2), Err(PlannerError::NoRouteFound)));
    }

    #[test]
    fn test_service_error_prefers_payload_message() {
        let body = json!({"error": {"code": "400 BadRequest", "message": "Query is invalid"}}).to_string();
        match interpret_response(400, &body, 2) {
            Err(PlannerError::Service(message)) => assert_eq!(message, "Query is invalid"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_service_error_falls_back_to_status() {
        match interpret_response(503, "<html>unavailable</html>", 2) {
            Err(PlannerError::Service(message)) => assert_eq!(message, "routing service returned status 503"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_malformed_success_body_is_decode_error() {
        let body = json!({"routes": [{"legs": []}]}).to_string();
        assert!(matches!(interpret_response(200, &body, 2), Err(PlannerError::Decode(_))));
    }

    #[test]
    fn test_transport_failure_is_generic() {
        let err = interpret_transport_failure("connection refused");
        assert!(matches!(err, PlannerError::Transport(ref detail) if detail == "connection refused"));
    }
}
