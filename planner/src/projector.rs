//! Derives map overlay features from [`RouteState`] and pushes them to a
//! [`MapHost`].

use serde::Serialize;
use shared::Location;

use crate::state::RouteState;

/// Upper bound on direction arrows drawn along a route.
pub const MAX_ARROWS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureRole {
    Origin,
    Waypoint,
    Route,
    Arrow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFeature {
    pub location: Location,
    pub role: FeatureRole,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrowFeature {
    pub location: Location,
    /// Degrees clockwise from map "up", in `[0, 360)`.
    pub heading: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteGeometry {
    pub line: Vec<Location>,
    pub arrows: Vec<ArrowFeature>,
}

impl RouteGeometry {
    pub fn is_empty(&self) -> bool {
        self.line.is_empty() && self.arrows.is_empty()
    }
}

/// Everything drawn on top of the base map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotations {
    pub markers: Vec<PointFeature>,
    pub route: RouteGeometry,
    pub traffic_visible: bool,
}

/// The mapping widget: camera access plus two overlay collections that are
/// always replaced wholesale.
pub trait MapHost {
    fn camera_center(&self) -> Location;
    fn replace_markers(&mut self, markers: &[PointFeature]);
    fn replace_route(&mut self, route: &RouteGeometry);
    fn set_traffic_visible(&mut self, visible: bool);
}

pub fn project(state: &RouteState) -> Annotations {
    let route = state
        .last_result()
        .map(|result| route_geometry(&result.path_coordinates))
        .unwrap_or_else(|| route_geometry(&[]));

    Annotations {
        markers: point_features(state.origin(), state.waypoints()),
        route,
        traffic_visible: state.travel_options().traffic_enabled,
    }
}

/// "Start" for the origin, then 1-based insertion positions.
pub fn point_features(origin: Option<Location>, waypoints: &[Location]) -> Vec<PointFeature> {
    let origin = origin.map(|location| PointFeature {
        location,
        role: FeatureRole::Origin,
        label: "Start".to_string(),
    });
    let stops = waypoints.iter().enumerate().map(|(idx, location)| PointFeature {
        location: *location,
        role: FeatureRole::Waypoint,
        label: (idx + 1).to_string(),
    });
    origin.into_iter().chain(stops).collect()
}

/// A path that never leaves its first sample draws nothing.
pub fn route_geometry(path: &[Location]) -> RouteGeometry {
    if path.len() < 2 || path.iter().all(|sample| *sample == path[0]) {
        return RouteGeometry {
            line: Vec::new(),
            arrows: Vec::new(),
        };
    }
    RouteGeometry {
        line: path.to_vec(),
        arrows: arrow_features(path),
    }
}

pub fn arrow_features(path: &[Location]) -> Vec<ArrowFeature> {
    if path.len() < 2 {
        return Vec::new();
    }
    let stride = arrow_stride(path.len());
    (stride / 2..path.len())
        .step_by(stride)
        .map(|idx| ArrowFeature {
            location: path[idx],
            heading: heading_degrees(
                idx.checked_sub(1).map(|prev| path[prev]),
                path[idx],
                path.get(idx + 1).copied(),
            ),
        })
        .collect()
}

fn arrow_stride(samples: usize) -> usize {
    samples.div_ceil(MAX_ARROWS).max(1)
}

/// Direction of travel through `current`, measured on the Web Mercator plane
/// between its neighbors. A missing neighbor is replaced by `current`.
pub fn heading_degrees(prev: Option<Location>, current: Location, next: Option<Location>) -> f64 {
    let from = prev.unwrap_or(current);
    let to = next.unwrap_or(current);

    // Shortest way around, so crossing the antimeridian keeps its direction.
    let dx = wrap_longitude_delta(to.lon - from.lon).to_radians();
    let dy = mercator_y(to.lat) - mercator_y(from.lat);
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let degrees = dx.atan2(dy).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative angles
    if degrees >= 360.0 { 0.0 } else { degrees }
}

/// Folds a longitude difference into `(-180, 180]`.
fn wrap_longitude_delta(delta: f64) -> f64 {
    let wrapped = (delta + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

fn mercator_y(lat: f64) -> f64 {
    let phi = lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();
    (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln()
}

/// Remembers what was last pushed so that [`AnnotationProjector::sync`]
/// only touches the overlay collections that changed.
#[derive(Debug, Default)]
pub struct AnnotationProjector {
    applied: Option<Annotations>,
}

impl AnnotationProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, state: &RouteState, host: &mut impl MapHost) {
        let next = project(state);
        let previous = self.applied.as_ref();

        if previous.map(|a| &a.markers) != Some(&next.markers) {
            host.replace_markers(&next.markers);
        }
        if previous.map(|a| &a.route) != Some(&next.route) {
            host.replace_route(&next.route);
        }
        if previous.map(|a| a.traffic_visible) != Some(next.traffic_visible) {
            host.set_traffic_visible(next.traffic_visible);
        }

        self.applied = Some(next);
    }

    /// Forces the next [`sync`](Self::sync) to push every collection, e.g.
    /// after the map widget was recreated.
    pub fn force_redraw(&mut self) {
        self.applied = None;
    }
}
