use planner::{
    AnnotationProjector, ComputationTicket, Completion, MapHost, PlannerError, RouteState,
    ServiceConfig, build_request,
    config::DEFAULT_BASE_URL,
    interpret_response,
    projector::{PointFeature, RouteGeometry},
    response::interpret_transport_failure,
};
use seed::{prelude::*, virtual_dom::AtValue, *};
use serde::Deserialize;
use serde_wasm_bindgen::to_value;
use shared::{Location, RouteResult, TravelOptionsUpdate, VehicleKind};
use wasm_bindgen::prelude::{JsValue, wasm_bindgen};

#[wasm_bindgen(module = "/map_host.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map(subscription_key: &str);
    #[wasm_bindgen(js_name = getCameraCenter)]
    fn get_camera_center() -> JsValue;
    #[wasm_bindgen(js_name = setMarkers)]
    fn set_markers_js(markers: JsValue);
    #[wasm_bindgen(js_name = setRouteGeometry)]
    fn set_route_geometry_js(route: JsValue);
    #[wasm_bindgen(js_name = setTrafficVisible)]
    fn set_traffic_visible_js(visible: bool);
}

const FALLBACK_CENTER: Location = Location::new(47.6062, -122.3321);

/// Overlay sink backed by `map_host.js`.
struct BrowserMap;

#[derive(Deserialize)]
struct CameraCenter {
    lat: f64,
    lon: f64,
}

impl MapHost for BrowserMap {
    fn camera_center(&self) -> Location {
        match serde_wasm_bindgen::from_value::<Option<CameraCenter>>(get_camera_center()) {
            Ok(Some(center)) => Location::new(center.lat, center.lon),
            _ => {
                web_sys::console::warn_1(&"[frontend] map camera unavailable, using fallback center".into());
                FALLBACK_CENTER
            }
        }
    }

    fn replace_markers(&mut self, markers: &[PointFeature]) {
        if let Ok(value) = to_value(markers) {
            set_markers_js(value);
        }
    }

    fn replace_route(&mut self, route: &RouteGeometry) {
        if let Ok(value) = to_value(route) {
            set_route_geometry_js(value);
        }
    }

    fn set_traffic_visible(&mut self, visible: bool) {
        set_traffic_visible_js(visible);
    }
}

pub struct Model {
    route: RouteState,
    projector: AnnotationProjector,
    map: BrowserMap,
    config: Option<ServiceConfig>,
    key_input: String,
}

pub enum Msg {
    SetOriginAtCenter,
    ClearOrigin,
    AddWaypointAtCenter,
    ClearAll,
    TrafficToggled,
    VehicleSelected(String),
    Calculate,
    RouteFetched {
        ticket: ComputationTicket,
        result: Result<RouteResult, PlannerError>,
    },
    ApiKeyChanged(String),
    ApplyApiKey,
    MapReady,
}

pub fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    orders.stream(streams::window_event(Ev::from("map-ready"), |_| Msg::MapReady));

    let config = match ServiceConfig::from_build_env() {
        Ok(config) => {
            init_map(config.api_key());
            Some(config)
        }
        Err(err) => {
            web_sys::console::warn_1(&format!("[frontend] {err}").into());
            None
        }
    };

    Model {
        route: RouteState::new(),
        projector: AnnotationProjector::new(),
        map: BrowserMap,
        config,
        key_input: String::new(),
    }
}

pub fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::SetOriginAtCenter => {
            let center = model.map.camera_center();
            model.route.set_origin(center);
        }
        Msg::ClearOrigin => model.route.clear_origin(),
        Msg::AddWaypointAtCenter => {
            let center = model.map.camera_center();
            model.route.add_waypoint(center);
        }
        Msg::ClearAll => model.route.clear_all(),
        Msg::TrafficToggled => {
            let enabled = !model.route.travel_options().traffic_enabled;
            model.route.set_travel_options(TravelOptionsUpdate {
                traffic_enabled: Some(enabled),
                ..Default::default()
            });
        }
        Msg::VehicleSelected(value) => {
            let kind = match value.as_str() {
                "truck" => VehicleKind::Truck,
                _ => VehicleKind::Car,
            };
            model.route.set_travel_options(TravelOptionsUpdate {
                vehicle_kind: Some(kind),
                ..Default::default()
            });
        }
        Msg::Calculate => {
            if model.route.pending() {
                return;
            }
            let Some(config) = model.config.clone() else {
                model.route.record_error(PlannerError::ConfigurationMissing.to_string());
                return;
            };
            match model.route.begin_computation() {
                Ok(ticket) => {
                    orders.perform_cmd(send_directions_request(config, ticket));
                }
                Err(err) => model.route.record_error(err.to_string()),
            }
        }
        Msg::RouteFetched { ticket, result } => {
            let completion = match result {
                Ok(route) => model.route.complete_computation(&ticket, route),
                Err(err) => model.route.fail_computation(&ticket, err.to_string()),
            };
            if completion == Completion::Discarded {
                web_sys::console::debug_1(
                    &format!("[frontend] ignored stale route response #{}", ticket.id).into(),
                );
            }
        }
        Msg::ApiKeyChanged(value) => model.key_input = value,
        Msg::ApplyApiKey => {
            let config = match &model.config {
                Some(config) => config.with_api_key(model.key_input.clone()),
                None => ServiceConfig::new(model.key_input.clone(), DEFAULT_BASE_URL),
            };
            match config {
                Ok(config) => {
                    init_map(config.api_key());
                    model.config = Some(config);
                    model.projector.force_redraw();
                }
                Err(err) => model.route.record_error(err.to_string()),
            }
        }
        Msg::MapReady => model.projector.force_redraw(),
    }

    if model.config.is_some() {
        model.projector.sync(&model.route, &mut model.map);
    }
}

async fn send_directions_request(config: ServiceConfig, ticket: ComputationTicket) -> Msg {
    let result = match build_request(&ticket) {
        Err(err) => Err(err),
        Ok(request) => {
            web_sys::console::debug_1(
                &format!(
                    "[frontend] sending directions request #{} stops={}",
                    ticket.id,
                    request.stop_query()
                )
                .into(),
            );
            match Request::new(request.url(&config)).fetch().await {
                Err(err) => Err(interpret_transport_failure(format!("{err:?}"))),
                Ok(raw) => {
                    let status = raw.status().code;
                    match raw.text().await {
                        Err(err) => Err(interpret_transport_failure(format!("{err:?}"))),
                        Ok(body) => interpret_response(status, &body, request.waypoint_count()),
                    }
                }
            }
        }
    };

    Msg::RouteFetched { ticket, result }
}

pub fn view(model: &Model) -> Node<Msg> {
    let header = h1!["Route planner"];
    if model.config.is_none() {
        return div![C!["app-container"], header, view_configuration_required(model)];
    }

    div![
        C!["app-container"],
        header,
        view_controls(model),
        view_summary(model),
    ]
}

fn view_configuration_required(model: &Model) -> Node<Msg> {
    div![
        C!["config-required"],
        h2!["Configuration required"],
        p![PlannerError::ConfigurationMissing.to_string()],
        p!["Rebuild with AZURE_MAPS_KEY set, or paste a key below."],
        input![
            attrs! {
                At::Type => "password",
                At::Value => &model.key_input,
                At::Placeholder => "Subscription key",
                At::AutoComplete => "off",
            },
            input_ev(Ev::Input, Msg::ApiKeyChanged),
        ],
        button![
            "Use key",
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::ApplyApiKey
            }),
        ],
        if let Some(error) = model.route.last_error() {
            p![C!["error"], error]
        } else {
            empty![]
        },
    ]
}

fn view_controls(model: &Model) -> Node<Msg> {
    let action = |label: &str, msg: fn() -> Msg, disabled: bool| {
        button![
            label,
            ev(Ev::Click, move |event| {
                event.prevent_default();
                msg()
            }),
            attrs! { At::Disabled => bool_attr(disabled) },
        ]
    };
    let options = model.route.travel_options();

    form![
        C!["controls"],
        fieldset![
            legend!["Stops"],
            action("Set start at map center", || Msg::SetOriginAtCenter, false),
            action("Clear start", || Msg::ClearOrigin, model.route.origin().is_none()),
            action("Add waypoint at map center", || Msg::AddWaypointAtCenter, false),
            action("Clear all", || Msg::ClearAll, false),
            small![format!(
                "{} · {} waypoint(s)",
                model
                    .route
                    .origin()
                    .map(|origin| format!("Start {}", format_location(origin)))
                    .unwrap_or_else(|| "No start".to_string()),
                model.route.waypoints().len()
            )],
        ],
        fieldset![
            legend!["Options"],
            label![
                input![
                    attrs! {
                        At::Type => "checkbox",
                        At::Checked => bool_attr(options.traffic_enabled),
                    },
                    ev(Ev::Change, |_| Msg::TrafficToggled),
                ],
                span!["Live traffic"],
            ],
            select![
                option![
                    attrs! { At::Value => "car", At::Selected => bool_attr(options.vehicle_kind == VehicleKind::Car) },
                    "Car",
                ],
                option![
                    attrs! { At::Value => "truck", At::Selected => bool_attr(options.vehicle_kind == VehicleKind::Truck) },
                    "Truck",
                ],
                input_ev(Ev::Change, Msg::VehicleSelected),
            ],
        ],
        action(
            if model.route.pending() { "Calculating…" } else { "Calculate route" },
            || Msg::Calculate,
            model.route.pending(),
        ),
        if let Some(error) = model.route.last_error() {
            p![C!["error"], error]
        } else {
            empty![]
        },
    ]
}

fn view_summary(model: &Model) -> Node<Msg> {
    let Some(result) = model.route.last_result() else {
        return div![
            C!["preview"],
            h2!["No route yet"],
            p!["Set a start, add waypoints, then calculate."]
        ];
    };

    let card = |label: &str, content: String| {
        div![
            C!["metadata-card"],
            span![C!["label"], label],
            strong![content],
        ]
    };

    let legs = result.legs.iter().map(|leg| {
        li![format!(
            "{} → {}: {:.1} km, {}",
            leg.start_label,
            leg.end_label,
            leg.distance_km,
            format_duration(leg.duration_min)
        )]
    });

    div![
        C!["preview"],
        h2!["Route"],
        div![
            C!["metadata-grid"],
            card("Distance", format!("{:.1} km", result.total_distance_km)),
            card("Duration", format_duration(result.total_duration_min)),
            result
                .optimized_order
                .as_deref()
                .map(|order| card("Visiting order", format_order(order)))
                .unwrap_or_else(|| empty![]),
        ],
        ul![C!["legs"], legs],
    ]
}

#[wasm_bindgen(start)]
pub fn start() {
    App::start("app", init, update, view);
}

fn bool_attr(value: bool) -> AtValue {
    if value {
        AtValue::Some("true".into())
    } else {
        AtValue::Ignored
    }
}

fn format_location(location: Location) -> String {
    format!("{:.5}, {:.5}", location.lat, location.lon)
}

fn format_duration(minutes: f64) -> String {
    let total = minutes.round() as u64;
    match (total / 60, total % 60) {
        (0, mins) => format!("{mins} min"),
        (hours, mins) => format!("{hours} h {mins} min"),
    }
}

/// Waypoint numbers match the marker labels.
fn format_order(order: &[usize]) -> String {
    std::iter::once("Start".to_string())
        .chain(order.iter().map(|idx| (idx + 1).to_string()))
        .collect::<Vec<_>>()
        .join(" → ")
}
