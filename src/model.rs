use serde::{Deserialize, Serialize};

use crate::capabilities::PermissionState;
use crate::{
    AppError, DEBOUNCE_QUIET_MS, DEFAULT_QUERY_ENDPOINT, DEFAULT_REGION_SPAN_DEG,
    DEFAULT_SEARCH_RADIUS_M, MAX_SEARCH_RADIUS_M, MIN_SEARCH_RADIUS_M, RADIUS_M_PER_SPAN_DEG,
    SERVER_QUERY_TIMEOUT_S,
};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid coordinate: lat={0}, lon={1}")]
    InvalidCoordinate(f64, f64),
    #[error("invalid viewport extent: {0}° x {1}°")]
    InvalidExtent(f64, f64),
    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),
}

// --- Coordinate: validated, NaN-safe ---

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite()
            || !lon.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lon)
        {
            return Err(ValidationError::InvalidCoordinate(lat, lon));
        }
        Ok(Self { lat, lon })
    }

    #[must_use]
    pub const fn origin() -> Self {
        Self { lat: 0.0, lon: 0.0 }
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lon.to_bits() == other.lon.to_bits()
    }
}

impl Eq for Coordinate {}

// --- ViewportExtent: visible map area in degrees ---

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportExtent {
    latitude_span: f64,
    longitude_span: f64,
}

impl ViewportExtent {
    pub fn new(latitude_span: f64, longitude_span: f64) -> Result<Self, ValidationError> {
        if !latitude_span.is_finite()
            || !longitude_span.is_finite()
            || latitude_span < 0.0
            || longitude_span < 0.0
        {
            return Err(ValidationError::InvalidExtent(latitude_span, longitude_span));
        }
        Ok(Self {
            latitude_span,
            longitude_span,
        })
    }

    #[must_use]
    pub fn latitude_span(&self) -> f64 {
        self.latitude_span
    }

    #[must_use]
    pub fn longitude_span(&self) -> f64 {
        self.longitude_span
    }
}

// --- SearchRadius: meters, clamped ---

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchRadius(f64);

impl SearchRadius {
    /// Derives a search radius from the visible map area. A larger visible
    /// area means a larger radius, bounded so the remote service never
    /// receives an oversized query.
    #[must_use]
    pub fn for_extent(extent: ViewportExtent) -> Self {
        let raw = (extent.latitude_span() + extent.longitude_span()) * RADIUS_M_PER_SPAN_DEG;
        Self(raw.clamp(MIN_SEARCH_RADIUS_M, MAX_SEARCH_RADIUS_M))
    }

    #[must_use]
    pub fn meters(self) -> f64 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(DEFAULT_SEARCH_RADIUS_M)
    }
}

// --- MapRegion: center + visible span, read by the rendering surface ---

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: Coordinate,
    pub latitude_span: f64,
    pub longitude_span: f64,
}

impl MapRegion {
    #[must_use]
    pub fn centered_on(center: Coordinate) -> Self {
        Self {
            center,
            latitude_span: DEFAULT_REGION_SPAN_DEG,
            longitude_span: DEFAULT_REGION_SPAN_DEG,
        }
    }
}

impl Default for MapRegion {
    fn default() -> Self {
        Self::centered_on(Coordinate::origin())
    }
}

// --- Remote service configuration ---

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    endpoint: String,
    pub timeout_s: u32,
}

impl ApiConfig {
    pub fn with_endpoint(endpoint: &str) -> Result<Self, ValidationError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| ValidationError::InvalidEndpoint(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidEndpoint(endpoint.into()));
        }
        Ok(Self {
            endpoint: endpoint.into(),
            timeout_s: SERVER_QUERY_TIMEOUT_S,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_QUERY_ENDPOINT.into(),
            timeout_s: SERVER_QUERY_TIMEOUT_S,
        }
    }
}

/// All session state, mutated only inside `App::update`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    pub region: MapRegion,
    pub search_radius: SearchRadius,
    pub location: Option<Coordinate>,
    pub markers: Vec<crate::overlay::Marker>,

    pub tracking_enabled: bool,
    /// Armed when tracking is (re-)enabled; the next fix recenters the map
    /// and clears this so free panning stays possible afterwards.
    pub recenter_on_next_fix: bool,

    pub permission: PermissionState,
    pub permission_denial_reported: bool,

    /// Debounce generation. A firing whose id does not match is stale.
    pub debounce_generation: u64,
    pub debounce_pending: bool,

    pub is_fetching: bool,
    pub shutting_down: bool,

    pub last_error: Option<AppError>,
    pub config: ApiConfig,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self {
            region: MapRegion::default(),
            search_radius: SearchRadius::default(),
            location: None,
            markers: Vec::new(),
            tracking_enabled: true,
            recenter_on_next_fix: true,
            permission: PermissionState::NotDetermined,
            permission_denial_reported: false,
            debounce_generation: 0,
            debounce_pending: false,
            is_fetching: false,
            shutting_down: false,
            last_error: None,
            config: ApiConfig::default(),
        }
    }

    pub fn set_error(&mut self, error: AppError) {
        self.last_error = Some(error);
    }

    /// Quiet period for the viewport debounce, in milliseconds.
    #[must_use]
    pub fn debounce_quiet_ms(&self) -> u64 {
        DEBOUNCE_QUIET_MS
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
