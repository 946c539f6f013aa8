#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod event;
pub mod model;
pub mod overlay;
pub mod query;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use capabilities::{LocationError, LocationOutput, PermissionState, TimerOutput};
use event::Event;
use model::{Coordinate, MapRegion, Model, SearchRadius, ViewportExtent};
use query::{Element, QueryResponse};

pub use capabilities::{Capabilities, Effect};
pub use crux_core::App as CruxApp;

pub const DEFAULT_QUERY_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";
/// Deadline the remote service applies to the query, encoded in the payload.
pub const SERVER_QUERY_TIMEOUT_S: u32 = 25;
pub const MIN_SEARCH_RADIUS_M: f64 = 1.0;
pub const MAX_SEARCH_RADIUS_M: f64 = 3000.0;
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 1000.0;
pub const RADIUS_M_PER_SPAN_DEG: f64 = 20_000.0;
pub const MARKER_RADIUS_M: f64 = 100.0;
pub const DEFAULT_REGION_SPAN_DEG: f64 = 0.02;
pub const DEBOUNCE_QUIET_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    BadStatus,
    Decode,
    LocationPermissionDenied,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::BadStatus => "BAD_STATUS",
            Self::Decode => "DECODE_ERROR",
            Self::LocationPermissionDenied => "LOCATION_PERMISSION_DENIED",
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::BadStatus)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to reach the map data service. Please check your connection.".into()
            }
            ErrorKind::BadStatus => "The map data service returned an error.".into(),
            ErrorKind::Decode => "The map data service sent an unexpected response.".into(),
            ErrorKind::LocationPermissionDenied => {
                "Location access is restricted or denied.".into()
            }
        }
    }
}

/// Failure classes at the fetch boundary. All of them leave the existing
/// marker set untouched; none are retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    BadStatus(u16),
    #[error("response did not match the expected shape: {0}")]
    Decode(String),
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        let kind = match e {
            FetchError::Network(_) => ErrorKind::Network,
            FetchError::BadStatus(_) => ErrorKind::BadStatus,
            FetchError::Decode(_) => ErrorKind::Decode,
        };
        Self::new(kind, e.to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MarkerView {
    pub lat: f64,
    pub lon: f64,
    pub radius_m: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorView {
    pub code: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub map_center_lat: f64,
    pub map_center_lon: f64,
    pub map_latitude_span: f64,
    pub map_longitude_span: f64,
    pub markers: Vec<MarkerView>,
    pub search_radius_m: f64,
    pub tracking_enabled: bool,
    pub is_fetching: bool,
    pub error: Option<ErrorView>,
}

#[derive(Default)]
pub struct App;

impl App {
    /// Restarts the debounce window: the previous timer is invalidated and a
    /// new quiet period begins. At most one cycle is live at a time.
    fn restart_debounce(model: &mut Model, caps: &Capabilities) {
        if model.debounce_pending {
            caps.timer.cancel(model.debounce_generation);
        }
        model.debounce_generation += 1;
        model.debounce_pending = true;
        caps.timer
            .start(model.debounce_generation, model.debounce_quiet_ms(), Event::DebounceFired);
    }

    /// Issues the remote query. Without a known location this aborts
    /// silently; the next location or viewport change retriggers naturally.
    fn start_fetch(model: &mut Model, caps: &Capabilities) {
        let Some(location) = model.location else {
            debug!("skipping fetch: location unavailable");
            return;
        };

        let payload = query::build(location, model.search_radius, model.config.timeout_s);
        model.is_fetching = true;

        caps.http
            .post(model.config.endpoint())
            .body_string(payload)
            .expect_json()
            .send(|result| Event::FetchCompleted(Box::new(result)));
    }

    fn classify_response(
        result: crux_http::Result<crux_http::Response<QueryResponse>>,
    ) -> Result<Vec<Element>, FetchError> {
        match result {
            Err(crux_http::HttpError::Json(message)) => Err(FetchError::Decode(message)),
            Err(e) => Err(FetchError::Network(e.to_string())),
            Ok(mut response) => {
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::BadStatus(status as u16));
                }
                response
                    .take_body()
                    .map(|body| body.elements)
                    .ok_or_else(|| FetchError::Decode("empty response body".into()))
            }
        }
    }

    fn apply_fetch_result(
        result: crux_http::Result<crux_http::Response<QueryResponse>>,
        model: &mut Model,
    ) {
        match Self::classify_response(result) {
            Ok(elements) => {
                model.markers = overlay::markers_for_elements(&elements);
                model.last_error = None;
                debug!(markers = model.markers.len(), "marker set replaced");
            }
            Err(e) => {
                // Prior markers stay on screen; no automatic retry.
                error!("fetch failed: {e}");
                model.set_error(e.into());
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        match event {
            Event::Noop => {}

            Event::Started => {
                caps.location.request_permission(|result| match result {
                    Ok(LocationOutput::PermissionStatus(state)) => {
                        Event::AuthorizationChanged(state)
                    }
                    Ok(_) => Event::Noop,
                    Err(LocationError::PermissionDenied) => {
                        Event::AuthorizationChanged(PermissionState::Denied)
                    }
                    Err(LocationError::Unavailable { .. }) => Event::Noop,
                });
                caps.render.render();
            }

            Event::ViewportChanged {
                latitude_span,
                longitude_span,
            } => {
                let extent = match ViewportExtent::new(latitude_span, longitude_span) {
                    Ok(extent) => extent,
                    Err(e) => {
                        warn!("ignoring viewport change: {e}");
                        return;
                    }
                };

                model.search_radius = SearchRadius::for_extent(extent);
                model.region.latitude_span = extent.latitude_span();
                model.region.longitude_span = extent.longitude_span();
                Self::restart_debounce(model, caps);
                caps.render.render();
            }

            Event::LocationUpdated { lat, lon } => {
                let coordinate = match Coordinate::new(lat, lon) {
                    Ok(coordinate) => coordinate,
                    Err(e) => {
                        warn!("ignoring location update: {e}");
                        return;
                    }
                };

                model.location = Some(coordinate);

                if model.tracking_enabled && model.recenter_on_next_fix {
                    model.region = MapRegion::centered_on(coordinate);
                    model.recenter_on_next_fix = false;
                }
                caps.render.render();
            }

            Event::AuthorizationChanged(state) => {
                model.permission = state;

                if state.is_authorized() {
                    model.permission_denial_reported = false;
                    if model.tracking_enabled {
                        caps.location.start_updates();
                    }
                } else if state.is_denied() && !model.permission_denial_reported {
                    // Degraded but live: map stays visible without tracking.
                    warn!("location access is restricted or denied");
                    model.set_error(AppError::new(
                        ErrorKind::LocationPermissionDenied,
                        "location access is restricted or denied",
                    ));
                    model.permission_denial_reported = true;
                }
                caps.render.render();
            }

            Event::TrackingToggled => {
                model.tracking_enabled = !model.tracking_enabled;

                if model.tracking_enabled {
                    model.recenter_on_next_fix = true;
                    caps.location.start_updates();
                } else {
                    caps.location.stop_updates();
                }
                caps.render.render();
            }

            Event::DebounceFired(TimerOutput::Cancelled { .. }) => {}

            Event::DebounceFired(TimerOutput::Fired { id }) => {
                if model.shutting_down || id != model.debounce_generation {
                    debug!(id, "ignoring stale debounce firing");
                    return;
                }
                model.debounce_pending = false;
                Self::start_fetch(model, caps);
                caps.render.render();
            }

            Event::FetchCompleted(result) => {
                model.is_fetching = false;
                if model.shutting_down {
                    debug!("discarding fetch result after shutdown");
                    return;
                }
                Self::apply_fetch_result(*result, model);
                caps.render.render();
            }

            Event::Shutdown => {
                model.shutting_down = true;
                if model.debounce_pending {
                    caps.timer.cancel(model.debounce_generation);
                    model.debounce_pending = false;
                }
                caps.location.stop_updates();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel {
            map_center_lat: model.region.center.lat(),
            map_center_lon: model.region.center.lon(),
            map_latitude_span: model.region.latitude_span,
            map_longitude_span: model.region.longitude_span,
            markers: model
                .markers
                .iter()
                .map(|m| MarkerView {
                    lat: m.center.lat(),
                    lon: m.center.lon(),
                    radius_m: m.radius_m,
                })
                .collect(),
            search_radius_m: model.search_radius.meters(),
            tracking_enabled: model.tracking_enabled,
            is_fetching: model.is_fetching,
            error: model.last_error.as_ref().map(|e| ErrorView {
                code: e.code().into(),
                message: e.user_facing_message(),
            }),
        }
    }
}
