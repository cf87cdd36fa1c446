use std::future::Future;

use shared::RouteResult;

use crate::{error::PlannerError, request::DirectionsRequest};

/// Transport seam for the directions service.
///
/// The browser frontend performs the fetch itself and only uses the
/// interpreter; native code and tests go through this trait.
pub trait DirectionsService {
    fn fetch(&self, request: &DirectionsRequest) -> impl Future<Output = Result<RouteResult, PlannerError>>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::HttpDirectionsClient;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use reqwest::Client;
    use shared::RouteResult;

    use super::DirectionsService;
    use crate::{
        config::ServiceConfig,
        error::PlannerError,
        request::DirectionsRequest,
        response::{interpret_response, interpret_transport_failure},
    };

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub struct HttpDirectionsClient {
        client: Client,
        config: ServiceConfig,
    }

    impl HttpDirectionsClient {
        pub fn new(config: ServiceConfig) -> Result<Self, PlannerError> {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(interpret_transport_failure)?;
            Ok(Self { client, config })
        }
    }

    impl DirectionsService for HttpDirectionsClient {
        async fn fetch(&self, request: &DirectionsRequest) -> Result<RouteResult, PlannerError> {
            tracing::debug!(query = %request.stop_query(), "calling directions service");

            let response = self
                .client
                .get(request.url(&self.config))
                .send()
                .await
                .map_err(interpret_transport_failure)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(interpret_transport_failure)?;

            interpret_response(status, &body, request.waypoint_count())
        }
    }
}
