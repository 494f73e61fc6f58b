//! Geometry primitives: great-circle distances, polyline lengths and
//! bounding boxes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gpx_types::GpxPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two WGS84 coordinates.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS * c
}

/// Distance in meters ignoring elevation.
#[inline]
pub fn distance_2d(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_distance(lat1, lon1, lat2, lon2)
}

/// Distance in meters including the elevation difference. Falls back to
/// [`distance_2d`] when either elevation is absent.
pub fn distance_3d(
    lat1: f64,
    lon1: f64,
    ele1: Option<f64>,
    lat2: f64,
    lon2: f64,
    ele2: Option<f64>,
) -> f64 {
    let d2d = distance_2d(lat1, lon1, lat2, lon2);
    match (ele1, ele2) {
        (Some(e1), Some(e2)) => {
            let dele = e2 - e1;
            (d2d * d2d + dele * dele).sqrt()
        }
        _ => d2d,
    }
}

/// Sum of consecutive pairwise distances, in 3D when `three_d` is set.
pub fn polyline_length(points: &[GpxPoint], three_d: bool) -> f64 {
    points
        .windows(2)
        .map(|w| {
            if three_d {
                w[0].distance_3d(&w[1])
            } else {
                w[0].distance_2d(&w[1])
            }
        })
        .sum()
}

pub fn length_2d(points: &[GpxPoint]) -> f64 {
    polyline_length(points, false)
}

pub fn length_3d(points: &[GpxPoint]) -> f64 {
    polyline_length(points, true)
}

/// Distance in meters from `point` to the great-circle chord between
/// `start` and `end`, via the triangle area (Heron's formula).
pub fn distance_from_line(point: &GpxPoint, start: &GpxPoint, end: &GpxPoint) -> f64 {
    let a = start.distance_2d(end);
    if a == 0.0 {
        return start.distance_2d(point);
    }
    let b = start.distance_2d(point);
    let c = end.distance_2d(point);
    let s = (a + b + c) / 2.0;
    2.0 * (s * (s - a) * (s - b) * (s - c)).abs().sqrt() / a
}

/// Latitude/longitude bounding box.
///
/// [`GpxBounds::empty`] starts inverted so that the first sample tightens
/// every side; a box that never saw a sample reports [`GpxBounds::is_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpxBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GpxBounds {
    pub fn empty() -> Self {
        Self {
            min_lat: f64::MAX,
            max_lat: f64::MIN,
            min_lon: f64::MAX,
            max_lon: f64::MIN,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_lat > self.max_lat || self.min_lon > self.max_lon
    }

    pub fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
    }

    pub fn merge(&self, other: &GpxBounds) -> GpxBounds {
        GpxBounds {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }
}

impl Default for GpxBounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for GpxBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Max: {}, {} Min: {}, {}",
            self.max_lat, self.max_lon, self.min_lat, self.min_lon
        )
    }
}

/// Elevation interval in meters, inverted when no elevation was seen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElevationBounds {
    pub min: f64,
    pub max: f64,
}

impl ElevationBounds {
    pub fn empty() -> Self {
        Self {
            min: f64::MAX,
            max: f64::MIN,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn extend(&mut self, ele: f64) {
        self.min = self.min.min(ele);
        self.max = self.max.max(ele);
    }

    pub fn merge(&self, other: &ElevationBounds) -> ElevationBounds {
        ElevationBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl Default for ElevationBounds {
    fn default() -> Self {
        Self::empty()
    }
}

/// First and last known timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBounds {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl TimeBounds {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.93).abs() < 0.1, "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = distance_2d(52.5113534275, 13.4571944922, 52.511710329, 13.456941694);
        let b = distance_2d(52.511710329, 13.456941694, 52.5113534275, 13.4571944922);
        assert!((a - b).abs() < 1e-9);
        assert_eq!(distance_2d(10.0, 20.0, 10.0, 20.0), 0.0);
    }

    #[test]
    fn test_distance_3d_falls_back_without_elevation() {
        let d2 = distance_2d(45.0, 7.0, 45.001, 7.0);
        assert_eq!(distance_3d(45.0, 7.0, None, 45.001, 7.0, Some(100.0)), d2);
        assert_eq!(distance_3d(45.0, 7.0, Some(1.0), 45.001, 7.0, None), d2);

        let d3 = distance_3d(45.0, 7.0, Some(0.0), 45.001, 7.0, Some(100.0));
        assert!((d3 - (d2 * d2 + 100.0 * 100.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_distance_3d_vertical_only() {
        let d = distance_3d(45.0, 7.0, Some(10.0), 45.0, 7.0, Some(13.0));
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_polyline_length_degenerate() {
        assert_eq!(polyline_length(&[], true), 0.0);
        assert_eq!(polyline_length(&[GpxPoint::new(1.0, 1.0)], false), 0.0);
    }

    #[test]
    fn test_polyline_length_sums_pairs() {
        let pts = vec![
            GpxPoint::new(0.0, 0.0),
            GpxPoint::new(0.0, 1.0),
            GpxPoint::new(0.0, 2.0),
        ];
        let expected = 2.0 * distance_2d(0.0, 0.0, 0.0, 1.0);
        assert!((length_2d(&pts) - expected).abs() < 1e-6);
        assert_eq!(length_2d(&pts), length_3d(&pts));
    }

    #[test]
    fn test_distance_from_line() {
        let start = GpxPoint::new(0.0, 0.0);
        let end = GpxPoint::new(0.0, 0.002);
        let on_line = GpxPoint::new(0.0, 0.001);
        let off_line = GpxPoint::new(0.001, 0.001);

        assert!(distance_from_line(&on_line, &start, &end) < 0.01);
        let d = distance_from_line(&off_line, &start, &end);
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }

    #[test]
    fn test_empty_bounds() {
        let b = GpxBounds::empty();
        assert!(b.is_empty());
        assert_eq!(b.min_lat, f64::MAX);
        assert_eq!(b.max_lat, f64::MIN);

        let mut b = GpxBounds::empty();
        b.extend(10.0, 20.0);
        assert!(!b.is_empty());
        assert_eq!(b.min_lat, 10.0);
        assert_eq!(b.max_lon, 20.0);
    }

    #[test]
    fn test_bounds_merge() {
        let mut a = GpxBounds::empty();
        a.extend(1.0, 2.0);
        let mut b = GpxBounds::empty();
        b.extend(-1.0, 5.0);
        let m = a.merge(&b);
        assert_eq!(m.min_lat, -1.0);
        assert_eq!(m.max_lat, 1.0);
        assert_eq!(m.min_lon, 2.0);
        assert_eq!(m.max_lon, 5.0);

        assert_eq!(a.merge(&GpxBounds::empty()), a);
    }

    #[test]
    fn test_elevation_bounds() {
        let mut e = ElevationBounds::empty();
        assert!(e.is_empty());
        e.extend(12.0);
        e.extend(-3.0);
        assert_eq!(e.min, -3.0);
        assert_eq!(e.max, 12.0);
    }
}
