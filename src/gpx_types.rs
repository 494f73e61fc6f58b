use chrono::{DateTime, Datelike, Utc};

use crate::error::{GpxError, Result};
use crate::geo;

/// GPX schema generation a document is read from or written to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GpxVersion {
    V1_0,
    #[default]
    V1_1,
}

impl GpxVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            GpxVersion::V1_0 => "1.0",
            GpxVersion::V1_1 => "1.1",
        }
    }

    pub fn namespace(&self) -> &'static str {
        match self {
            GpxVersion::V1_0 => "http://www.topografix.com/GPX/1/0",
            GpxVersion::V1_1 => "http://www.topografix.com/GPX/1/1",
        }
    }
}

impl std::fmt::Display for GpxVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GpxVersion {
    type Err = GpxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1.0" => Ok(GpxVersion::V1_0),
            "1.1" => Ok(GpxVersion::V1_1),
            other => Err(GpxError::UnknownVersion(other.to_string())),
        }
    }
}

/// A parsed GPX document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxData {
    pub version: GpxVersion,
    pub creator: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_link: Option<GpxLink>,
    pub copyright: Option<GpxCopyright>,
    pub link: Option<GpxLink>,
    pub time: Option<DateTime<Utc>>,
    pub keywords: Option<String>,
    pub waypoints: Vec<GpxPoint>,
    pub routes: Vec<GpxRoute>,
    pub tracks: Vec<GpxTrack>,
}

/// A single GPX point (used for wpt, rtept, trkpt).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    pub magvar: Option<String>,
    pub geoid_height: Option<String>,
    pub name: Option<String>,
    pub cmt: Option<String>,
    pub desc: Option<String>,
    pub src: Option<String>,
    pub sym: Option<String>,
    pub point_type: Option<String>,
    pub fix: Option<String>,
    pub sat: Option<u32>,
    pub hdop: Option<f64>,
    pub vdop: Option<f64>,
    pub pdop: Option<f64>,
    pub age_of_dgps_data: Option<f64>,
    pub dgps_id: Option<u32>,
}

impl GpxPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Default::default()
        }
    }

    pub fn with_elevation(lat: f64, lon: f64, ele: f64) -> Self {
        Self {
            lat,
            lon,
            ele: Some(ele),
            ..Default::default()
        }
    }

    /// True when the point carries a usable timestamp. Year 1 and earlier
    /// count as unset.
    pub fn has_time(&self) -> bool {
        self.time.is_some_and(|t| t.year() > 1)
    }

    pub fn distance_2d(&self, other: &GpxPoint) -> f64 {
        geo::distance_2d(self.lat, self.lon, other.lat, other.lon)
    }

    pub fn distance_3d(&self, other: &GpxPoint) -> f64 {
        geo::distance_3d(self.lat, self.lon, self.ele, other.lat, other.lon, other.ele)
    }

    /// Absolute time difference in seconds, if both points are timed.
    pub fn time_diff(&self, other: &GpxPoint) -> Option<f64> {
        match (self.time, other.time) {
            (Some(a), Some(b)) if self.has_time() && other.has_time() => {
                Some((b - a).num_milliseconds().abs() as f64 / 1000.0)
            }
            _ => None,
        }
    }

    /// Speed in m/s between this point and `other`. `None` when either point
    /// lacks a timestamp or both share the same instant.
    pub fn speed_between(&self, other: &GpxPoint, three_d: bool) -> Option<f64> {
        let seconds = self.time_diff(other)?;
        if seconds <= 0.0 {
            return None;
        }
        let dist = if three_d {
            self.distance_3d(other)
        } else {
            self.distance_2d(other)
        };
        Some(dist / seconds)
    }

    /// Largest of the present dilution-of-precision values, 0 if none.
    pub fn max_dilution_of_precision(&self) -> f64 {
        [self.hdop, self.vdop, self.pdop]
            .into_iter()
            .flatten()
            .fold(0.0, f64::max)
    }
}

/// A GPX link element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxLink {
    pub href: String,
    pub text: Option<String>,
    pub link_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxCopyright {
    pub author: String,
    pub year: Option<String>,
    pub license: Option<String>,
}

/// A GPX route (<rte>).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxRoute {
    pub name: Option<String>,
    pub cmt: Option<String>,
    pub desc: Option<String>,
    pub src: Option<String>,
    pub number: Option<u32>,
    pub route_type: Option<String>,
    pub points: Vec<GpxPoint>,
}

/// A GPX track (<trk>).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxTrack {
    pub name: Option<String>,
    pub cmt: Option<String>,
    pub desc: Option<String>,
    pub src: Option<String>,
    pub number: Option<u32>,
    pub track_type: Option<String>,
    pub segments: Vec<GpxSegment>,
}

/// A GPX track segment (<trkseg>).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxSegment {
    pub points: Vec<GpxPoint>,
}

impl GpxData {
    pub fn append_track(&mut self, track: GpxTrack) {
        self.tracks.push(track);
    }

    pub fn append_route(&mut self, route: GpxRoute) {
        self.routes.push(route);
    }

    pub fn append_waypoint(&mut self, point: GpxPoint) {
        self.waypoints.push(point);
    }

    /// Append a track point to the last segment of the last track, creating
    /// either one when missing.
    pub fn append_point(&mut self, point: GpxPoint) {
        if self.tracks.is_empty() {
            self.tracks.push(GpxTrack::default());
        }
        if let Some(track) = self.tracks.last_mut() {
            track.append_point(point);
        }
    }

    /// Iterate over every track point in track/segment order.
    pub fn track_points(&self) -> impl Iterator<Item = &GpxPoint> {
        self.tracks
            .iter()
            .flat_map(|t| t.segments.iter())
            .flat_map(|s| s.points.iter())
    }
}

impl GpxTrack {
    pub fn append_segment(&mut self, segment: GpxSegment) {
        self.segments.push(segment);
    }

    pub fn append_point(&mut self, point: GpxPoint) {
        if self.segments.is_empty() {
            self.segments.push(GpxSegment::default());
        }
        if let Some(segment) = self.segments.last_mut() {
            segment.append_point(point);
        }
    }
}

impl GpxRoute {
    pub fn append_point(&mut self, point: GpxPoint) {
        self.points.push(point);
    }

    /// Mean latitude/longitude of the route points.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (lat, lon) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(lat, lon), p| (lat + p.lat, lon + p.lon));
        Some((lat / n, lon / n))
    }
}

impl GpxSegment {
    pub fn new(points: Vec<GpxPoint>) -> Self {
        Self { points }
    }

    pub fn append_point(&mut self, point: GpxPoint) {
        self.points.push(point);
    }
}
