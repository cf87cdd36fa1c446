use crate::{
    client::DirectionsService,
    error::PlannerError,
    request::build_request,
    state::{Completion, RouteState},
};

/// Runs one computation: snapshot, request, response, state update.
///
/// Service and decode failures end up in `state.last_error()` and are not
/// returned. Only an `InvalidState` rejection is returned, since no
/// computation was started; it is recorded as `last_error` as well.
pub async fn calculate_route<S: DirectionsService>(
    state: &mut RouteState,
    service: &S,
) -> Result<Completion, PlannerError> {
    let ticket = match state.begin_computation() {
        Ok(ticket) => ticket,
        Err(err) => {
            state.record_error(err.to_string());
            return Err(err);
        }
    };

    let outcome = match build_request(&ticket) {
        Ok(request) => service.fetch(&request).await,
        Err(err) => Err(err),
    };

    let completion = match outcome {
        Ok(result) => {
            tracing::info!(
                ticket = ticket.id,
                km = result.total_distance_km,
                minutes = result.total_duration_min,
                "route computed"
            );
            state.complete_computation(&ticket, result)
        }
        Err(err) => {
            tracing::warn!(ticket = ticket.id, error = %err, "route computation failed");
            state.fail_computation(&ticket, err.to_string())
        }
    };
    Ok(completion)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use shared::{Location, RouteResult};

    use super::*;
    use crate::request::DirectionsRequest;

    struct MockService {
        calls: Cell<usize>,
        seen: RefCell<Vec<DirectionsRequest>>,
        reply: fn() -> Result<RouteResult, PlannerError>,
    }

    impl MockService {
        fn new(reply: fn() -> Result<RouteResult, PlannerError>) -> Self {
            Self {
                calls: Cell::new(0),
                seen: RefCell::new(Vec::new()),
                reply,
            }
        }
    }

    impl DirectionsService for MockService {
        async fn fetch(&self, request: &DirectionsRequest) -> Result<RouteResult, PlannerError> {
            self.calls.set(self.calls.get() + 1);
            self.seen.borrow_mut().push(request.clone());
            (self.reply)()
        }
    }

    fn ok_route() -> Result<RouteResult, PlannerError> {
        Ok(RouteResult {
            total_distance_km: 15.0,
            total_duration_min: 20.0,
            optimized_order: Some(vec![0]),
            legs: Vec::new(),
            path_coordinates: vec![Location::new(1.0, 1.0), Location::new(2.0, 2.0)],
        })
    }

    fn no_route() -> Result<RouteResult, PlannerError> {
        Err(PlannerError::NoRouteFound)
    }

    fn ready_state() -> RouteState {
        let mut state = RouteState::new();
        state.set_origin(Location::new(1.0, 1.0));
        state.add_waypoint(Location::new(2.0, 2.0));
        state
    }

    #[tokio::test]
    async fn test_invalid_state_never_calls_service() {
        let service = MockService::new(ok_route);
        let mut state = RouteState::new();
        state.add_waypoint(Location::new(2.0, 2.0));

        let result = calculate_route(&mut state, &service).await;
        assert!(matches!(result, Err(PlannerError::InvalidState(_))));
        assert_eq!(service.calls.get(), 0);
        assert!(!state.pending());
        assert!(state.last_error().is_some());
        assert_eq!(state.waypoints().len(), 1);
    }

    #[tokio::test]
    async fn test_success_updates_state() {
        let service = MockService::new(ok_route);
        let mut state = ready_state();

        let completion = calculate_route(&mut state, &service).await.unwrap();
        assert_eq!(completion, Completion::Applied);
        assert!(!state.pending());
        assert_eq!(state.last_result().unwrap().total_distance_km, 15.0);
        assert_eq!(service.seen.borrow()[0].stops.len(), 2);
    }

    #[tokio::test]
    async fn test_no_route_keeps_previous_result() {
        let mut state = ready_state();
        calculate_route(&mut state, &MockService::new(ok_route)).await.unwrap();

        let completion = calculate_route(&mut state, &MockService::new(no_route)).await.unwrap();
        assert_eq!(completion, Completion::Applied);
        assert_eq!(state.last_result().unwrap().total_distance_km, 15.0);
        assert_eq!(state.last_error(), Some(PlannerError::NoRouteFound.to_string().as_str()));
    }
}
