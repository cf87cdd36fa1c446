pub mod client;
pub mod config;
pub mod error;
pub mod projector;
pub mod request;
pub mod response;
pub mod session;
pub mod state;

pub use client::DirectionsService;
#[cfg(not(target_arch = "wasm32"))]
pub use client::HttpDirectionsClient;
pub use config::ServiceConfig;
pub use error::PlannerError;
pub use projector::{AnnotationProjector, Annotations, MapHost};
pub use request::{DirectionsRequest, build_request};
pub use response::interpret_response;
pub use session::calculate_route;
pub use state::{Completion, ComputationTicket, RouteState};
