//! Route state store.
//!
//! All mutation goes through `&mut RouteState`; the store is an ordinary
//! value owned by whoever drives the UI.

use shared::{Location, RouteResult, TravelOptions, TravelOptionsUpdate};

use crate::error::PlannerError;

/// Input snapshot of one route computation, captured by
/// [`RouteState::begin_computation`] and handed back on completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputationTicket {
    pub id: u64,
    pub origin: Location,
    pub waypoints: Vec<Location>,
    pub travel_options: TravelOptions,
}

/// Whether a finished computation was written into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer computation was started, or the state was cleared, after this
    /// ticket was issued.
    Discarded,
}

#[derive(Debug, Default, Clone)]
pub struct RouteState {
    origin: Option<Location>,
    waypoints: Vec<Location>,
    travel_options: TravelOptions,
    last_result: Option<RouteResult>,
    last_error: Option<String>,
    in_flight: Option<u64>,
    last_ticket: u64,
    invalidated_through: u64,
}

impl RouteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Option<Location> {
        self.origin
    }

    pub fn waypoints(&self) -> &[Location] {
        &self.waypoints
    }

    pub fn travel_options(&self) -> TravelOptions {
        self.travel_options
    }

    pub fn last_result(&self) -> Option<&RouteResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn set_origin(&mut self, location: Location) {
        self.origin = Some(location);
    }

    pub fn clear_origin(&mut self) {
        self.origin = None;
    }

    pub fn add_waypoint(&mut self, location: Location) {
        self.waypoints.push(location);
    }

    /// Resets inputs and outputs. An in-flight computation keeps running, but
    /// its result will be discarded.
    pub fn clear_all(&mut self) {
        self.origin = None;
        self.waypoints.clear();
        self.last_result = None;
        self.last_error = None;
        self.invalidated_through = self.last_ticket;
    }

    pub fn set_travel_options(&mut self, update: TravelOptionsUpdate) {
        self.travel_options.merge(update);
    }

    pub fn begin_computation(&mut self) -> Result<ComputationTicket, PlannerError> {
        let origin = self.origin.ok_or_else(PlannerError::missing_origin)?;
        if self.waypoints.is_empty() {
            return Err(PlannerError::missing_waypoints());
        }

        self.last_ticket += 1;
        self.in_flight = Some(self.last_ticket);
        self.last_error = None;

        Ok(ComputationTicket {
            id: self.last_ticket,
            origin,
            waypoints: self.waypoints.clone(),
            travel_options: self.travel_options,
        })
    }

    pub fn complete_computation(&mut self, ticket: &ComputationTicket, result: RouteResult) -> Completion {
        let completion = self.finish(ticket);
        if completion == Completion::Applied {
            self.last_result = Some(result);
            self.last_error = None;
        }
        completion
    }

    pub fn fail_computation(&mut self, ticket: &ComputationTicket, message: impl Into<String>) -> Completion {
        let completion = self.finish(ticket);
        if completion == Completion::Applied {
            self.last_error = Some(message.into());
        }
        completion
    }

    /// Records a failure that happened before any computation started.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    fn finish(&mut self, ticket: &ComputationTicket) -> Completion {
        if self.in_flight != Some(ticket.id) {
            tracing::warn!(ticket = ticket.id, in_flight = ?self.in_flight, "discarding superseded route result");
            return Completion::Discarded;
        }

        self.in_flight = None;
        if ticket.id <= self.invalidated_through {
            tracing::warn!(ticket = ticket.id, "discarding route result issued before reset");
            return Completion::Discarded;
        }
        Completion::Applied
    }
}
