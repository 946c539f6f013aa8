//! Mapping of query results to renderable map overlays.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Coordinate;
use crate::query::{Element, Geometry};
use crate::MARKER_RADIUS_M;

/// A circular overlay the rendering surface draws. Derived state, never
/// persisted; the full set is replaced on each successful fetch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl Marker {
    #[must_use]
    pub fn at(center: Coordinate) -> Self {
        Self {
            center,
            radius_m: MARKER_RADIUS_M,
        }
    }
}

/// Maps result elements to markers. Points map directly, bounding boxes map
/// to their midpoint, elements without usable geometry are dropped. Order is
/// preserved and duplicates are permitted.
#[must_use]
pub fn markers_for_elements(elements: &[Element]) -> Vec<Marker> {
    elements
        .iter()
        .filter_map(|element| {
            let center = match element.geometry() {
                Some(Geometry::Point { lat, lon }) => Coordinate::new(lat, lon),
                Some(Geometry::Bounds(bounds)) => {
                    let (lat, lon) = bounds.midpoint();
                    Coordinate::new(lat, lon)
                }
                None => return None,
            };
            match center {
                Ok(center) => Some(Marker::at(center)),
                Err(e) => {
                    debug!(element_id = element.id, "dropping element: {e}");
                    None
                }
            }
        })
        .collect()
}
