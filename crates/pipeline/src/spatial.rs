//! Place → CBSA spatial join.
//!
//! Geometry arrives in WGS84 lon/lat (EPSG:4326). Centroids are computed in
//! spherical Web Mercator (EPSG:3857) and projected back, so they match what
//! a planar GIS centroid of the projected layer would give.

use std::f64::consts::FRAC_PI_4;

use geo::{
    BoundingRect, Centroid, Contains, Coord, Intersects, MapCoords, MultiPolygon, Point, Rect,
};

use crate::records::{CbsaAttributes, CbsaBoundary, PlaceBoundary};
use crate::{JoinPredicate, PlaceId};

/// WGS84 semi-major axis, the sphere radius of EPSG:3857.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude at which Web Mercator's square extent ends.
const MAX_LATITUDE_DEG: f64 = 85.051_128_779_806_59;

/// Projects a lon/lat coordinate (degrees) to Web Mercator metres.
///
/// Latitudes beyond ±85.05° are clamped to the projection's extent.
pub fn to_web_mercator(c: Coord<f64>) -> Coord<f64> {
    let lat = c.y.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG).to_radians();
    Coord {
        x: EARTH_RADIUS_M * c.x.to_radians(),
        y: EARTH_RADIUS_M * (FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

/// Inverse of [`to_web_mercator`].
pub fn from_web_mercator(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (c.x / EARTH_RADIUS_M).to_degrees(),
        y: (2.0 * (c.y / EARTH_RADIUS_M).exp().atan() - 2.0 * FRAC_PI_4).to_degrees(),
    }
}

/// Centroid of `geometry` computed in Web Mercator, returned in lon/lat.
///
/// `None` for empty geometry.
pub fn projected_centroid(geometry: &MultiPolygon<f64>) -> Option<Point<f64>> {
    let projected = geometry.map_coords(to_web_mercator);
    projected.centroid().map(|p| Point::from(from_web_mercator(p.0)))
}

/// The CBSA a place was assigned to, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CbsaAssignment {
    pub place: PlaceId,
    pub cbsa: Option<CbsaAttributes>,
}

/// Left spatial join of places to CBSAs.
///
/// Each place receives the first CBSA, in `cbsas` order, that satisfies
/// `predicate`; places matching none get `None`. Output has one entry per
/// place, in `places` order. Candidate CBSAs are prefiltered on bounding
/// rectangles.
pub fn assign_cbsas(
    places: &[PlaceBoundary],
    cbsas: &[CbsaBoundary],
    predicate: JoinPredicate,
) -> Vec<CbsaAssignment> {
    let cbsa_bounds: Vec<Option<Rect<f64>>> =
        cbsas.iter().map(|c| c.geometry.bounding_rect()).collect();

    places
        .iter()
        .map(|place| {
            let matched = match predicate {
                JoinPredicate::Intersects => place.geometry.bounding_rect().and_then(|bounds| {
                    cbsas.iter().zip(&cbsa_bounds).find_map(|(cbsa, cbsa_rect)| {
                        let candidate = cbsa_rect.is_some_and(|r| r.intersects(&bounds));
                        (candidate && cbsa.geometry.intersects(&place.geometry)).then_some(cbsa)
                    })
                }),
                JoinPredicate::Centroid => projected_centroid(&place.geometry).and_then(|centroid| {
                    cbsas.iter().zip(&cbsa_bounds).find_map(|(cbsa, cbsa_rect)| {
                        let candidate = cbsa_rect.is_some_and(|r| r.intersects(&centroid.0));
                        (candidate && cbsa.geometry.contains(&centroid)).then_some(cbsa)
                    })
                }),
            };

            CbsaAssignment {
                place: place.attributes.place_2020_id.clone(),
                cbsa: matched.map(|c| c.attributes.clone()),
            }
        })
        .collect()
}
