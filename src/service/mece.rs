//! MECE neighborhood boundaries.
//!
//! Boundaries of one city must not overlap. Incoming polygons are clipped
//! against everything already accepted ("claimed") for that city, in order,
//! so earlier neighborhoods keep their full shape and later ones receive only
//! the area nobody has claimed yet. Polygon clipping is delegated to `geo`.

use geo::{Area, BooleanOps, Geometry, MultiPolygon};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::error::HomeMatchError;

/// Clipped fragments smaller than this (in square degrees, roughly 100 m²
/// at mid latitudes) are treated as fully overlapped.
pub const MIN_FRAGMENT_AREA: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub shape: MultiPolygon<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    DuplicateName,
    FullyOverlapped,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Accepted {
        name: String,
        shape: MultiPolygon<f64>,
        area_retained: f64,
    },
    Skipped {
        name: String,
        reason: SkipReason,
    },
}

/// Clip `candidates`, in order, against `claimed` and each other.
///
/// `taken_names` holds the names already used in the city; comparison is
/// case-insensitive.
pub fn dedupe(
    claimed: &[MultiPolygon<f64>],
    taken_names: &[String],
    candidates: Vec<Candidate>,
) -> Vec<Outcome> {
    let mut names: HashSet<String> = taken_names.iter().map(|n| n.to_lowercase()).collect();
    let mut claimed_area = claimed
        .iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, shape| acc.union(shape));

    candidates
        .into_iter()
        .map(|candidate| {
            let key = candidate.name.to_lowercase();
            if names.contains(&key) {
                return Outcome::Skipped {
                    name: candidate.name,
                    reason: SkipReason::DuplicateName,
                };
            }

            let original = candidate.shape.unsigned_area();
            let (clipped, retained) = if claimed_area.0.is_empty() {
                (candidate.shape, original)
            } else {
                let clipped = candidate.shape.difference(&claimed_area);
                let retained = clipped.unsigned_area();
                (clipped, retained)
            };
            if retained < MIN_FRAGMENT_AREA {
                return Outcome::Skipped {
                    name: candidate.name,
                    reason: SkipReason::FullyOverlapped,
                };
            }

            claimed_area = claimed_area.union(&clipped);
            names.insert(key);
            Outcome::Accepted {
                name: candidate.name,
                shape: clipped,
                area_retained: (retained / original).min(1.0),
            }
        })
        .collect()
}

/// Parse a GeoJSON `Polygon` or `MultiPolygon` into a validated shape.
pub fn parse_bounds(value: Value) -> Result<MultiPolygon<f64>, HomeMatchError> {
    let geometry: geojson::Geometry = serde_json::from_value(value)
        .map_err(|e| HomeMatchError::Geometry(format!("not a GeoJSON geometry: {e}")))?;
    check_rings(&geometry.value)?;
    let shape: Geometry<f64> = Geometry::try_from(geometry)
        .map_err(|e| HomeMatchError::Geometry(format!("unreadable geometry: {e}")))?;
    let shape = match shape {
        Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
        Geometry::MultiPolygon(mp) => mp,
        _ => {
            return Err(HomeMatchError::Geometry(
                "bounds must be a Polygon or MultiPolygon".to_string(),
            ));
        }
    };
    validate_shape(&shape)?;
    Ok(shape)
}

/// Rings as submitted: at least four positions, first equal to last.
/// Runs before conversion since `geo` closes open rings on its own.
fn check_rings(value: &geojson::Value) -> Result<(), HomeMatchError> {
    let polygons: Vec<&geojson::PolygonType> = match value {
        geojson::Value::Polygon(polygon) => vec![polygon],
        geojson::Value::MultiPolygon(polygons) => polygons.iter().collect(),
        _ => return Ok(()),
    };
    for ring in polygons.into_iter().flatten() {
        if ring.len() < 4 {
            return Err(HomeMatchError::Geometry(
                "polygon rings need at least 4 positions".to_string(),
            ));
        }
        if ring.first() != ring.last() {
            return Err(HomeMatchError::Geometry(
                "polygon rings must be closed".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_shape(shape: &MultiPolygon<f64>) -> Result<(), HomeMatchError> {
    if shape.0.is_empty() {
        return Err(HomeMatchError::Geometry("bounds contain no polygons".to_string()));
    }
    for polygon in &shape.0 {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for ring in rings {
            if ring.0.len() < 4 {
                return Err(HomeMatchError::Geometry(
                    "polygon rings need at least 4 positions".to_string(),
                ));
            }
            let out_of_range = ring.coords().any(|c| {
                !(c.x.is_finite() && c.y.is_finite())
                    || !(-180.0..=180.0).contains(&c.x)
                    || !(-90.0..=90.0).contains(&c.y)
            });
            if out_of_range {
                return Err(HomeMatchError::Geometry(
                    "coordinates must be [longitude, latitude] within range".to_string(),
                ));
            }
        }
    }
    if shape.unsigned_area() <= 0.0 {
        return Err(HomeMatchError::Geometry("bounds enclose no area".to_string()));
    }
    Ok(())
}

/// Serialize a shape as GeoJSON MultiPolygon text for storage.
pub fn to_geojson(shape: &MultiPolygon<f64>) -> Result<String, HomeMatchError> {
    let geometry = geojson::Geometry::new(geojson::Value::from(shape));
    Ok(serde_json::to_string(&geometry)?)
}

/// Read back a stored boundary.
pub fn from_geojson(text: &str) -> Result<MultiPolygon<f64>, HomeMatchError> {
    let value: Value = serde_json::from_str(text)?;
    parse_bounds(value)
}
