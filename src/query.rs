//! Overpass QL payload construction and response decoding.
//!
//! The category filter set is fixed configuration, not user input: the query
//! always selects education/childcare, recreation/sports and youth-related
//! facilities around the current location.

use serde::{Deserialize, Serialize};

use crate::model::{Coordinate, SearchRadius};

/// One `nwr(around:...)` clause is emitted per filter.
const CATEGORY_FILTERS: &[&str] = &[
    r#"["amenity"~"school|kindergarten|childcare"]"#,
    r#"["leisure"~"sports_centre|sports_hall|pitch|golf_course|stadium|playground|water_park"]"#,
    r#"["building"="kindergarten"]"#,
    r#"["community"="youth_centre"]"#,
    r#"["name"~"Jugendherberge"]"#,
    r#"["social_facility:for"~"child|juvenile"]"#,
];

/// Builds the query payload selecting points of interest within `radius`
/// meters of `location`. Requests full geometry for matched elements.
#[must_use]
pub fn build(location: Coordinate, radius: SearchRadius, timeout_s: u32) -> String {
    let mut query = format!("[out:json][timeout:{timeout_s}];\n(\n");
    for filter in CATEGORY_FILTERS {
        query.push_str(&format!(
            "  nwr(around:{},{},{}){filter};\n",
            radius.meters(),
            location.lat(),
            location.lon(),
        ));
    }
    query.push_str(");\nout geom;\n");
    query
}

/// Top-level response shape of the spatial query service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub elements: Vec<Element>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub minlat: f64,
    pub minlon: f64,
    pub maxlat: f64,
    pub maxlon: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    pub amenity: Option<String>,
    pub leisure: Option<String>,
    pub building: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A single result entity. The wire shape carries geometry as optional
/// fields; [`Element::geometry`] resolves them into a tagged variant so
/// consumers can match exhaustively instead of probing optionals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point { lat: f64, lon: f64 },
    Bounds(Bounds),
}

impl Element {
    /// A direct point wins over a bounding box; an element with neither has
    /// no usable geometry.
    #[must_use]
    pub fn geometry(&self) -> Option<Geometry> {
        match (self.lat, self.lon, &self.bounds) {
            (Some(lat), Some(lon), _) => Some(Geometry::Point { lat, lon }),
            (_, _, Some(bounds)) => Some(Geometry::Bounds(bounds.clone())),
            _ => None,
        }
    }
}

impl Bounds {
    /// Midpoint of the box, `(min+max)/2` per axis.
    #[must_use]
    pub fn midpoint(&self) -> (f64, f64) {
        (
            (self.minlat + self.maxlat) / 2.0,
            (self.minlon + self.maxlon) / 2.0,
        )
    }
}
