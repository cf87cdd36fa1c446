use thiserror::Error;

/// Every failure the route computation path can produce.
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("An Azure Maps subscription key is required. Set AZURE_MAPS_KEY or enter a key.")]
    ConfigurationMissing,
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Service(String),
    #[error("No route found. The points may be too far apart or unconnected.")]
    NoRouteFound,
    #[error("unexpected response from routing service: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("An error occurred while calculating the route. Please try again.")]
    Transport(String),
}

impl PlannerError {
    pub fn missing_origin() -> Self {
        Self::InvalidState("Please set a starting point first.".into())
    }

    pub fn missing_waypoints() -> Self {
        Self::InvalidState("Please add at least one waypoint.".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_is_shown_verbatim() {
        let err = PlannerError::Service("Invalid subscription key".into());
        assert_eq!(err.to_string(), "Invalid subscription key");
    }

    #[test]
    fn test_transport_detail_stays_out_of_message() {
        let err = PlannerError::Transport("dns error: no such host".into());
        assert!(!err.to_string().contains("dns"));
    }
}
