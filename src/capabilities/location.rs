//! Device location capability.
//!
//! Permission requests go through the request/response cycle below; the
//! position fixes themselves do not. Once updates are started the shell
//! delivers each fix as a plain `Event::LocationUpdated`, so location
//! delivery is ordinary event delivery rather than delegate callbacks.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PermissionState {
    #[default]
    NotDetermined,
    Denied,
    Restricted,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl PermissionState {
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse | Self::AuthorizedAlways)
    }

    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }

    #[must_use]
    pub const fn needs_request(self) -> bool {
        matches!(self, Self::NotDetermined)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op")]
pub enum LocationOperation {
    RequestPermission,
    StartUpdates,
    StopUpdates,
}

impl Operation for LocationOperation {
    type Output = LocationResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location services unavailable: {reason}")]
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum LocationOutput {
    PermissionStatus(PermissionState),
    Stopped,
}

pub type LocationResult = Result<LocationOutput, LocationError>;

#[derive(Clone)]
pub struct Location<E> {
    context: CapabilityContext<LocationOperation, E>,
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<E> Location<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, E>) -> Self {
        Self { context }
    }

    pub fn request_permission<F>(&self, callback: F)
    where
        F: Fn(LocationResult) -> E + Send + Sync + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(LocationOperation::RequestPermission)
                .await;
            context.update_app(callback(result));
        });
    }

    /// Asks the shell to begin delivering position fixes as events.
    pub fn start_updates(&self) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(LocationOperation::StartUpdates).await;
        });
    }

    /// Suspends fix delivery. Idempotent on the shell side.
    pub fn stop_updates(&self) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(LocationOperation::StopUpdates).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_state_checks() {
        assert!(PermissionState::AuthorizedWhenInUse.is_authorized());
        assert!(PermissionState::AuthorizedAlways.is_authorized());
        assert!(!PermissionState::Denied.is_authorized());

        assert!(PermissionState::Denied.is_denied());
        assert!(PermissionState::Restricted.is_denied());
        assert!(!PermissionState::NotDetermined.is_denied());

        assert!(PermissionState::NotDetermined.needs_request());
        assert!(!PermissionState::AuthorizedAlways.needs_request());
    }

    #[test]
    fn location_operation_round_trips_through_serde() {
        for op in [
            LocationOperation::RequestPermission,
            LocationOperation::StartUpdates,
            LocationOperation::StopUpdates,
        ] {
            let json = serde_json::to_string(&op).unwrap();
            let back: LocationOperation = serde_json::from_str(&json).unwrap();
            assert_eq!(op, back);
        }
    }

    #[test]
    fn location_result_round_trips_through_serde() {
        let result: LocationResult =
            Ok(LocationOutput::PermissionStatus(PermissionState::Denied));
        let json = serde_json::to_string(&result).unwrap();
        let back: LocationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }
}
