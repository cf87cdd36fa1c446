//! Builds the outbound Route Directions request from a computation snapshot.

use shared::{Location, TravelOptions, VehicleKind};

use crate::{config::ServiceConfig, error::PlannerError, state::ComputationTicket};

pub const DIRECTIONS_PATH: &str = "/route/directions/json";
pub const API_VERSION: &str = "1.0";

/// Nominal truck dimensions in meters and kilograms.
pub const TRUCK_WIDTH_M: f64 = 2.5;
pub const TRUCK_HEIGHT_M: f64 = 4.0;
pub const TRUCK_LENGTH_M: f64 = 12.0;
pub const TRUCK_WEIGHT_KG: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    /// Origin first, then waypoints in insertion order.
    pub stops: Vec<Location>,
    pub travel_options: TravelOptions,
    pub compute_best_order: bool,
}

pub fn build_request(ticket: &ComputationTicket) -> Result<DirectionsRequest, PlannerError> {
    build_request_from(Some(ticket.origin), &ticket.waypoints, ticket.travel_options)
}

pub fn build_request_from(
    origin: Option<Location>,
    waypoints: &[Location],
    travel_options: TravelOptions,
) -> Result<DirectionsRequest, PlannerError> {
    let origin = origin.ok_or_else(PlannerError::missing_origin)?;
    if waypoints.is_empty() {
        return Err(PlannerError::missing_waypoints());
    }

    let mut stops = Vec::with_capacity(waypoints.len() + 1);
    stops.push(origin);
    stops.extend_from_slice(waypoints);

    let request = DirectionsRequest {
        stops,
        travel_options,
        compute_best_order: true,
    };
    tracing::debug!(
        stops = request.stops.len(),
        mode = travel_options.vehicle_kind.travel_mode(),
        traffic = travel_options.traffic_enabled,
        "built directions request"
    );
    Ok(request)
}

impl DirectionsRequest {
    /// Stops after the origin.
    pub fn waypoint_count(&self) -> usize {
        self.stops.len().saturating_sub(1)
    }

    /// `lat,lon:lat,lon:...`
    pub fn stop_query(&self) -> String {
        self.stops
            .iter()
            .map(Location::to_string)
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Query parameters, without the credential.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("api-version", API_VERSION.to_string()),
            ("query", self.stop_query()),
            ("computeBestOrder", self.compute_best_order.to_string()),
            ("traffic", self.travel_options.traffic_enabled.to_string()),
            ("travelMode", self.travel_options.vehicle_kind.travel_mode().to_string()),
        ];

        if self.travel_options.vehicle_kind == VehicleKind::Truck {
            pairs.extend([
                ("vehicleWidth", TRUCK_WIDTH_M.to_string()),
                ("vehicleHeight", TRUCK_HEIGHT_M.to_string()),
                ("vehicleLength", TRUCK_LENGTH_M.to_string()),
                ("vehicleWeight", TRUCK_WEIGHT_KG.to_string()),
            ]);
        }

        pairs
    }

    pub fn url(&self, config: &ServiceConfig) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.query_pairs() {
            query.append_pair(key, &value);
        }
        query.append_pair("subscription-key", config.api_key());

        format!("{}{}?{}", config.base_url(), DIRECTIONS_PATH, query.finish())
    }
}
