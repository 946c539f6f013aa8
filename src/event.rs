use serde::{Deserialize, Serialize};

use crate::capabilities::{PermissionState, TimerOutput};
use crate::query::QueryResponse;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum Event {
    Noop,

    /// Session start: kicks off the location permission flow.
    Started,

    // Rendering surface
    /// The visible map region changed; spans are in degrees.
    ViewportChanged {
        latitude_span: f64,
        longitude_span: f64,
    },

    // Location provider
    LocationUpdated {
        lat: f64,
        lon: f64,
    },
    AuthorizationChanged(PermissionState),

    // Toggle control
    TrackingToggled,

    // Debounce timer
    DebounceFired(TimerOutput),

    // Remote call completion (shell-resolved, never serialized; boxed to
    // keep the enum small)
    #[serde(skip)]
    FetchCompleted(Box<crux_http::Result<crux_http::Response<QueryResponse>>>),

    /// The owning session is going away: cancel the pending timer and
    /// discard anything that arrives afterwards.
    Shutdown,
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Started => "started",
            Self::ViewportChanged { .. } => "viewport_changed",
            Self::LocationUpdated { .. } => "location_updated",
            Self::AuthorizationChanged(_) => "authorization_changed",
            Self::TrackingToggled => "tracking_toggled",
            Self::DebounceFired(_) => "debounce_fired",
            Self::FetchCompleted(_) => "fetch_completed",
            Self::Shutdown => "shutdown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_facing_events_round_trip_through_serde() {
        let event = Event::ViewportChanged {
            latitude_span: 0.04,
            longitude_span: 0.06,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        match back {
            Event::ViewportChanged {
                latitude_span,
                longitude_span,
            } => {
                assert_eq!(latitude_span, 0.04);
                assert_eq!(longitude_span, 0.06);
            }
            other => panic!("expected ViewportChanged, got {}", other.name()),
        }
    }

    #[test]
    fn event_size_is_reasonable() {
        // Keep the enum small; box variants if this starts failing.
        assert!(std::mem::size_of::<Event>() <= 128);
    }
}
