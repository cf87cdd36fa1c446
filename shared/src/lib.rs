use std::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
///
/// Ranges are not enforced; out-of-range values travel as-is to the
/// directions service, which rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Formats as `lat,lon`, the stop syntax of the directions query.
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    #[default]
    Car,
    Truck,
}

impl VehicleKind {
    /// Value of the `travelMode` query parameter.
    pub fn travel_mode(self) -> &'static str {
        match self {
            VehicleKind::Car => "car",
            VehicleKind::Truck => "truck",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TravelOptions {
    pub traffic_enabled: bool,
    pub vehicle_kind: VehicleKind,
}

/// Partial update merged into [`TravelOptions`]; `None` leaves a field as is.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TravelOptionsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_kind: Option<VehicleKind>,
}

impl TravelOptions {
    pub fn merge(&mut self, update: TravelOptionsUpdate) {
        if let Some(traffic) = update.traffic_enabled {
            self.traffic_enabled = traffic;
        }
        if let Some(kind) = update.vehicle_kind {
            self.vehicle_kind = kind;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_km: f64,
    pub duration_min: f64,
    pub start_label: String,
    pub end_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub total_distance_km: f64,
    pub total_duration_min: f64,
    /// Waypoint indices (insertion order) in the visiting order chosen by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_order: Option<Vec<usize>>,
    pub legs: Vec<RouteLeg>,
    pub path_coordinates: Vec<Location>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display_is_query_syntax() {
        let loc = Location::new(47.6062, -122.3321);
        assert_eq!(loc.to_string(), "47.6062,-122.3321");
    }

    #[test]
    fn test_travel_options_default() {
        let options = TravelOptions::default();
        assert!(!options.traffic_enabled);
        assert_eq!(options.vehicle_kind, VehicleKind::Car);
    }

    #[test]
    fn test_travel_options_merge_partial() {
        let mut options = TravelOptions::default();
        options.merge(TravelOptionsUpdate {
            vehicle_kind: Some(VehicleKind::Truck),
            ..Default::default()
        });
        assert_eq!(options.vehicle_kind, VehicleKind::Truck);
        assert!(!options.traffic_enabled);

        options.merge(TravelOptionsUpdate {
            traffic_enabled: Some(true),
            ..Default::default()
        });
        assert!(options.traffic_enabled);
        assert_eq!(options.vehicle_kind, VehicleKind::Truck);
    }

    #[test]
    fn test_vehicle_kind_serializes_lowercase() {
        let json = serde_json::to_string(&VehicleKind::Truck).unwrap();
        assert_eq!(json, "\"truck\"");
        assert_eq!(VehicleKind::Car.travel_mode(), "car");
    }
}
