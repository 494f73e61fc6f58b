//! Derived statistics over the document model.
//!
//! Every level of the tree (segment, route, track, document) implements
//! [`TrackStats`]. Segments and routes compute over their point slice;
//! tracks fold their segments and documents fold their tracks.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geo::{self, ElevationBounds, GpxBounds, TimeBounds};
use crate::gpx_types::{GpxData, GpxPoint, GpxRoute, GpxSegment, GpxTrack};
use crate::options::{AnalysisOptions, DEFAULT_STOPPED_SPEED_THRESHOLD};

/// Fewer moving samples than this yields a max speed of 0.
const MAX_SPEED_MIN_SAMPLES: usize = 20;
const MAX_SPEED_PERCENTILE: f64 = 0.95;
/// Query points match within this fraction of the total track length.
const POSITION_MATCH_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovingData {
    /// Seconds
    pub moving_time: f64,
    pub stopped_time: f64,
    /// Meters
    pub moving_distance: f64,
    pub stopped_distance: f64,
    /// m/s
    pub max_speed: f64,
}

impl MovingData {
    /// Sum times and distances; keep the larger max speed.
    pub fn merge(&self, other: &MovingData) -> MovingData {
        MovingData {
            moving_time: self.moving_time + other.moving_time,
            stopped_time: self.stopped_time + other.stopped_time,
            moving_distance: self.moving_distance + other.moving_distance,
            stopped_distance: self.stopped_distance + other.stopped_distance,
            max_speed: self.max_speed.max(other.max_speed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UphillDownhill {
    pub uphill: f64,
    pub downhill: f64,
}

/// Index of a point within a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationMatch {
    pub segment_no: usize,
    pub point_no: usize,
}

/// A track point together with where it sits in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPosition {
    pub point: GpxPoint,
    pub track_no: usize,
    pub segment_no: usize,
    pub point_no: usize,
}

/// Aggregate statistics shared by every level of the document tree.
pub trait TrackStats {
    fn points_count(&self) -> usize;
    fn length_2d(&self) -> f64;
    fn length_3d(&self) -> f64;
    fn bounds(&self) -> GpxBounds;
    fn elevation_bounds(&self) -> ElevationBounds;
    fn time_bounds(&self) -> TimeBounds;
    fn moving_data_with_threshold(&self, stopped_speed_threshold: f64) -> MovingData;
    fn uphill_downhill(&self) -> UphillDownhill;
    /// Seconds between first and last point; parents sum their children.
    fn duration(&self) -> f64;
    fn has_times(&self) -> bool;

    fn moving_data(&self) -> MovingData {
        self.moving_data_with_threshold(DEFAULT_STOPPED_SPEED_THRESHOLD)
    }
}

fn points_bounds(points: &[GpxPoint]) -> GpxBounds {
    points.iter().fold(GpxBounds::empty(), |mut b, p| {
        b.extend(p.lat, p.lon);
        b
    })
}

fn points_elevation_bounds(points: &[GpxPoint]) -> ElevationBounds {
    points
        .iter()
        .filter_map(|p| p.ele)
        .fold(ElevationBounds::empty(), |mut b, ele| {
            b.extend(ele);
            b
        })
}

fn points_time_bounds(points: &[GpxPoint]) -> TimeBounds {
    let mut timed = points.iter().filter(|p| p.has_time()).filter_map(|p| p.time);
    let start_time = timed.next();
    let end_time = timed.last().or(start_time);
    TimeBounds {
        start_time,
        end_time,
    }
}

fn points_duration(points: &[GpxPoint]) -> f64 {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => first.time_diff(last).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Elapsed seconds from `prev` to `next`, 0 if either is untimed.
fn elapsed_seconds(prev: &GpxPoint, next: &GpxPoint) -> f64 {
    match (prev.time, next.time) {
        (Some(a), Some(b)) if prev.has_time() && next.has_time() => {
            (b - a).num_milliseconds() as f64 / 1000.0
        }
        _ => 0.0,
    }
}

fn points_moving_data(points: &[GpxPoint], stopped_speed_threshold: f64) -> MovingData {
    // Pairs without elapsed time have speed 0 and must land on the stopped side.
    let threshold = stopped_speed_threshold.max(0.0);
    let mut data = MovingData::default();
    let mut speeds_distances = Vec::new();

    for pair in points.windows(2) {
        let (prev, pt) = (&pair[0], &pair[1]);
        let dist = prev.distance_3d(pt);
        let seconds = elapsed_seconds(prev, pt);

        let speed_kmh = if seconds > 0.0 {
            (dist / 1000.0) / (seconds / 3600.0)
        } else {
            0.0
        };

        if speed_kmh <= threshold {
            data.stopped_time += seconds.max(0.0);
            data.stopped_distance += dist;
        } else {
            data.moving_time += seconds;
            data.moving_distance += dist;
            speeds_distances.push((dist / seconds, dist));
        }
    }

    data.max_speed = calc_max_speed(&speeds_distances);
    data
}

/// Max speed (m/s) from `(speed, distance)` samples, robust to GPS jumps.
///
/// Samples whose distance deviates from the mean by more than 1.5 times
/// the deviation are dropped, then the 95th percentile speed is taken.
pub fn calc_max_speed(speeds_distances: &[(f64, f64)]) -> f64 {
    if speeds_distances.len() < MAX_SPEED_MIN_SAMPLES {
        return 0.0;
    }

    let n = speeds_distances.len() as f64;
    let average_dist = speeds_distances.iter().map(|(_, d)| d).sum::<f64>() / n;
    let deviation = speeds_distances
        .iter()
        .map(|(_, d)| (d - average_dist).powi(2))
        .sum::<f64>()
        .sqrt();

    let mut speeds: Vec<f64> = speeds_distances
        .iter()
        .filter(|(_, d)| (d - average_dist).abs() <= deviation * 1.5)
        .map(|(s, _)| *s)
        .filter(|s| s.is_finite())
        .collect();
    if speeds.is_empty() {
        return 0.0;
    }
    speeds.sort_by(f64::total_cmp);

    let idx = ((speeds.len() as f64 * MAX_SPEED_PERCENTILE) as usize).min(speeds.len() - 1);
    speeds[idx]
}

/// Total ascent and descent over a sequence of elevations.
///
/// Interior samples are smoothed with their neighbours (0.3/0.4/0.3) before
/// differencing so that a single-sample spike does not count both ways.
pub fn calc_uphill_downhill(elevations: &[f64]) -> UphillDownhill {
    let n = elevations.len();
    let smoothed: Vec<f64> = (0..n)
        .map(|i| {
            if 0 < i && i < n - 1 {
                elevations[i - 1] * 0.3 + elevations[i] * 0.4 + elevations[i + 1] * 0.3
            } else {
                elevations[i]
            }
        })
        .collect();

    smoothed
        .windows(2)
        .fold(UphillDownhill::default(), |mut acc, w| {
            let d = w[1] - w[0];
            if d > 0.0 {
                acc.uphill += d;
            } else {
                acc.downhill -= d;
            }
            acc
        })
}

fn points_uphill_downhill(points: &[GpxPoint]) -> UphillDownhill {
    let elevations: Vec<f64> = points.iter().filter_map(|p| p.ele).collect();
    calc_uphill_downhill(&elevations)
}

fn points_speed(points: &[GpxPoint], point_no: usize) -> f64 {
    let Some(last) = points.len().checked_sub(1) else {
        return 0.0;
    };
    let i = point_no.min(last);
    let point = &points[i];

    let before = (i > 0)
        .then(|| points[i - 1].speed_between(point, true))
        .flatten();
    let after = (i < last)
        .then(|| point.speed_between(&points[i + 1], true))
        .flatten();

    match (before, after) {
        (Some(a), Some(b)) => (a.abs() + b.abs()) / 2.0,
        (Some(s), None) | (None, Some(s)) => s.abs(),
        (None, None) => 0.0,
    }
}

impl TrackStats for GpxSegment {
    fn points_count(&self) -> usize {
        self.points.len()
    }

    fn length_2d(&self) -> f64 {
        geo::length_2d(&self.points)
    }

    fn length_3d(&self) -> f64 {
        geo::length_3d(&self.points)
    }

    fn bounds(&self) -> GpxBounds {
        points_bounds(&self.points)
    }

    fn elevation_bounds(&self) -> ElevationBounds {
        points_elevation_bounds(&self.points)
    }

    fn time_bounds(&self) -> TimeBounds {
        points_time_bounds(&self.points)
    }

    fn moving_data_with_threshold(&self, stopped_speed_threshold: f64) -> MovingData {
        points_moving_data(&self.points, stopped_speed_threshold)
    }

    fn uphill_downhill(&self) -> UphillDownhill {
        points_uphill_downhill(&self.points)
    }

    fn duration(&self) -> f64 {
        points_duration(&self.points)
    }

    fn has_times(&self) -> bool {
        self.points.iter().all(GpxPoint::has_time)
    }
}

impl TrackStats for GpxRoute {
    fn points_count(&self) -> usize {
        self.points.len()
    }

    fn length_2d(&self) -> f64 {
        geo::length_2d(&self.points)
    }

    fn length_3d(&self) -> f64 {
        geo::length_3d(&self.points)
    }

    fn bounds(&self) -> GpxBounds {
        points_bounds(&self.points)
    }

    fn elevation_bounds(&self) -> ElevationBounds {
        points_elevation_bounds(&self.points)
    }

    fn time_bounds(&self) -> TimeBounds {
        points_time_bounds(&self.points)
    }

    fn moving_data_with_threshold(&self, stopped_speed_threshold: f64) -> MovingData {
        points_moving_data(&self.points, stopped_speed_threshold)
    }

    fn uphill_downhill(&self) -> UphillDownhill {
        points_uphill_downhill(&self.points)
    }

    fn duration(&self) -> f64 {
        points_duration(&self.points)
    }

    fn has_times(&self) -> bool {
        self.points.iter().all(GpxPoint::has_time)
    }
}

/// Fold helpers shared by the track and document levels.
fn fold_time_bounds<'a, T: TrackStats + 'a>(children: impl Iterator<Item = &'a T>) -> TimeBounds {
    children
        .map(TrackStats::time_bounds)
        .filter(|tb| !tb.is_empty())
        .fold(None, |acc: Option<TimeBounds>, tb| match acc {
            None => Some(tb),
            Some(acc) => Some(TimeBounds {
                start_time: acc.start_time,
                end_time: tb.end_time,
            }),
        })
        .unwrap_or_default()
}

macro_rules! impl_track_stats_by_folding {
    ($ty:ty, $children:ident) => {
        impl TrackStats for $ty {
            fn points_count(&self) -> usize {
                self.$children.iter().map(TrackStats::points_count).sum()
            }

            fn length_2d(&self) -> f64 {
                self.$children.iter().map(TrackStats::length_2d).sum()
            }

            fn length_3d(&self) -> f64 {
                self.$children.iter().map(TrackStats::length_3d).sum()
            }

            fn bounds(&self) -> GpxBounds {
                self.$children
                    .iter()
                    .fold(GpxBounds::empty(), |acc, c| acc.merge(&c.bounds()))
            }

            fn elevation_bounds(&self) -> ElevationBounds {
                self.$children
                    .iter()
                    .fold(ElevationBounds::empty(), |acc, c| {
                        acc.merge(&c.elevation_bounds())
                    })
            }

            fn time_bounds(&self) -> TimeBounds {
                fold_time_bounds(self.$children.iter())
            }

            fn moving_data_with_threshold(&self, stopped_speed_threshold: f64) -> MovingData {
                self.$children
                    .iter()
                    .fold(MovingData::default(), |acc, c| {
                        acc.merge(&c.moving_data_with_threshold(stopped_speed_threshold))
                    })
            }

            fn uphill_downhill(&self) -> UphillDownhill {
                self.$children
                    .iter()
                    .map(TrackStats::uphill_downhill)
                    .fold(UphillDownhill::default(), |acc, ud| UphillDownhill {
                        uphill: acc.uphill + ud.uphill,
                        downhill: acc.downhill + ud.downhill,
                    })
            }

            fn duration(&self) -> f64 {
                self.$children.iter().map(TrackStats::duration).sum()
            }

            fn has_times(&self) -> bool {
                self.$children.iter().all(TrackStats::has_times)
            }
        }
    };
}

impl_track_stats_by_folding!(GpxTrack, segments);
impl_track_stats_by_folding!(GpxData, tracks);

impl GpxSegment {
    /// Speed in m/s at `point_no`, averaged over both neighbouring legs.
    /// Indices past the end clamp to the last point.
    pub fn speed(&self, point_no: usize) -> f64 {
        points_speed(&self.points, point_no)
    }

    /// Index of the first point timed after `time`, or `None` when the
    /// segment is empty, not strictly increasing from first to last point,
    /// or `time` is at/after the last point.
    pub fn location_at(&self, time: DateTime<Utc>) -> Option<usize> {
        let (first, last) = (self.points.first()?, self.points.last()?);
        match (first.time, last.time) {
            (Some(start), Some(end)) if first.has_time() && last.has_time() && start < end => {}
            _ => return None,
        }
        self.points
            .iter()
            .position(|p| p.has_time() && p.time.is_some_and(|t| time < t))
    }
}

impl GpxTrack {
    pub fn location_at(&self, time: DateTime<Utc>) -> Vec<LocationMatch> {
        self.segments
            .iter()
            .enumerate()
            .filter_map(|(segment_no, seg)| {
                seg.location_at(time).map(|point_no| LocationMatch {
                    segment_no,
                    point_no,
                })
            })
            .collect()
    }
}

impl GpxData {
    /// Every track point, one per segment, that follows `time`.
    pub fn position_at(&self, time: DateTime<Utc>) -> Vec<TrackPosition> {
        let mut result = Vec::new();
        for (track_no, track) in self.tracks.iter().enumerate() {
            for m in track.location_at(time) {
                result.push(TrackPosition {
                    point: track.segments[m.segment_no].points[m.point_no].clone(),
                    track_no,
                    segment_no: m.segment_no,
                    point_no: m.point_no,
                });
            }
        }
        result
    }

    /// Points reached at a speed below the stopped threshold (km/h).
    pub fn stopped_positions(&self, stopped_speed_threshold: f64) -> Vec<TrackPosition> {
        let mut result = Vec::new();
        for (track_no, track) in self.tracks.iter().enumerate() {
            for (segment_no, segment) in track.segments.iter().enumerate() {
                for (point_no, pair) in segment.points.windows(2).enumerate() {
                    let Some(speed) = pair[0].speed_between(&pair[1], true) else {
                        continue;
                    };
                    if speed * 3.6 < stopped_speed_threshold {
                        result.push(TrackPosition {
                            point: pair[1].clone(),
                            track_no,
                            segment_no,
                            point_no: point_no + 1,
                        });
                    }
                }
            }
        }
        result
    }

    /// Along-track distances (meters from the start) where the track passes
    /// near `location`. See [`GpxData::location_positions_on_track`].
    pub fn location_position_on_track(&self, samples: usize, location: &GpxPoint) -> Vec<f64> {
        self.location_positions_on_track(samples, std::slice::from_ref(location))
            .pop()
            .unwrap_or_default()
    }

    /// For every query point, the along-track distances at which the track
    /// passes within 1% of its total length. A track that revisits a place
    /// yields one distance per visit.
    ///
    /// Only a sparse sample of the track is compared: the first and last
    /// points plus every point at least `length_2d / samples` meters past the
    /// previous sample.
    pub fn location_positions_on_track(
        &self,
        samples: usize,
        locations: &[GpxPoint],
    ) -> Vec<Vec<f64>> {
        let total = self.length_2d();
        if total <= 0.0 || samples == 0 {
            return vec![Vec::new(); locations.len()];
        }

        let sampled = self.sample_along_track(total / samples as f64);
        let threshold = total * POSITION_MATCH_FRACTION;

        locations
            .iter()
            .map(|location| {
                let mut positions = Vec::new();
                let mut candidate: Option<(f64, f64)> = None;
                for (point, from_start) in &sampled {
                    let d = point.distance_2d(location);
                    if d <= threshold {
                        if candidate.is_none_or(|(best, _)| d < best) {
                            candidate = Some((d, *from_start));
                        }
                    } else if let Some((_, pos)) = candidate.take() {
                        positions.push(pos);
                    }
                }
                if let Some((_, pos)) = candidate {
                    positions.push(pos);
                }
                positions
            })
            .collect()
    }

    fn sample_along_track(&self, sample_every: f64) -> Vec<(&GpxPoint, f64)> {
        let total_points = self.points_count();
        let mut sampled = Vec::new();
        let mut from_start = 0.0;
        let mut since_sample = 0.0;
        let mut index = 0;

        for segment in self.tracks.iter().flat_map(|t| t.segments.iter()) {
            let mut prev: Option<&GpxPoint> = None;
            for point in &segment.points {
                if let Some(prev) = prev {
                    let d = prev.distance_2d(point);
                    from_start += d;
                    since_sample += d;
                }
                if index == 0 || index + 1 == total_points || since_sample > sample_every {
                    sampled.push((point, from_start));
                    since_sample = 0.0;
                }
                prev = Some(point);
                index += 1;
            }
        }
        sampled
    }
}

/// Totals for one level of the tree, in a serializable shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub points: usize,
    pub length_2d: f64,
    pub length_3d: f64,
    pub duration: f64,
    pub bounds: Option<GpxBounds>,
    pub elevation_bounds: Option<ElevationBounds>,
    pub time_bounds: TimeBounds,
    pub moving_data: MovingData,
    pub uphill_downhill: UphillDownhill,
}

impl StatsSummary {
    pub fn of(stats: &impl TrackStats, options: &AnalysisOptions) -> Self {
        let bounds = stats.bounds();
        let elevation_bounds = stats.elevation_bounds();
        Self {
            points: stats.points_count(),
            length_2d: stats.length_2d(),
            length_3d: stats.length_3d(),
            duration: stats.duration(),
            bounds: (!bounds.is_empty()).then_some(bounds),
            elevation_bounds: (!elevation_bounds.is_empty()).then_some(elevation_bounds),
            time_bounds: stats.time_bounds(),
            moving_data: stats.moving_data_with_threshold(options.stopped_speed_threshold),
            uphill_downhill: stats.uphill_downhill(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub name: Option<String>,
    #[serde(flatten)]
    pub totals: StatsSummary,
    pub segments: Vec<StatsSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub version: String,
    pub creator: Option<String>,
    pub name: Option<String>,
    pub waypoints: usize,
    pub routes: usize,
    #[serde(flatten)]
    pub totals: StatsSummary,
    pub tracks: Vec<TrackSummary>,
}

impl GpxData {
    /// Document, track and segment totals.
    pub fn stats_summary(&self, options: &AnalysisOptions) -> DocumentStats {
        DocumentStats {
            version: self.version.to_string(),
            creator: self.creator.clone(),
            name: self.name.clone(),
            waypoints: self.waypoints.len(),
            routes: self.routes.len(),
            totals: StatsSummary::of(self, options),
            tracks: self
                .tracks
                .iter()
                .map(|track| TrackSummary {
                    name: track.name.clone(),
                    totals: StatsSummary::of(track, options),
                    segments: track
                        .segments
                        .iter()
                        .map(|segment| StatsSummary::of(segment, options))
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2012, 3, 17, h, m, s).unwrap())
    }

    fn timed(lat: f64, lon: f64, ele: f64, time: Option<DateTime<Utc>>) -> GpxPoint {
        GpxPoint {
            time,
            ..GpxPoint::with_elevation(lat, lon, ele)
        }
    }

    fn sample_segment() -> GpxSegment {
        GpxSegment::new(vec![
            timed(52.5113534275, 13.4571944922, 59.26, at(12, 46, 19)),
            timed(52.5113568641, 13.4571697656, 65.51, at(12, 46, 44)),
            timed(52.511710329, 13.456941694, 65.99, at(12, 47, 1)),
            timed(52.5117189623, 13.4567520116, 63.58, at(12, 47, 23)),
        ])
    }

    #[test]
    fn test_segment_lengths() {
        let seg = sample_segment();
        assert!((seg.length_2d() - 56.814084).abs() < 1e-3);
        assert!((seg.length_3d() - 61.805460).abs() < 1e-3);
        assert!(seg.length_3d() >= seg.length_2d());
    }

    #[test]
    fn test_segment_duration_and_time_bounds() {
        let seg = sample_segment();
        assert_eq!(seg.duration(), 64.0);
        let tb = seg.time_bounds();
        assert_eq!(tb.start_time, at(12, 46, 19));
        assert_eq!(tb.end_time, at(12, 47, 23));
        assert!(seg.has_times());
    }

    #[test]
    fn test_segment_bounds() {
        let b = sample_segment().bounds();
        assert_eq!(b.max_lat, 52.5117189623);
        assert_eq!(b.min_lat, 52.5113534275);
        assert_eq!(b.max_lon, 13.4571944922);
        assert_eq!(b.min_lon, 13.4567520116);

        let e = sample_segment().elevation_bounds();
        assert_eq!(e.min, 59.26);
        assert_eq!(e.max, 65.99);
    }

    #[test]
    fn test_segment_uphill_downhill() {
        let ud = sample_segment().uphill_downhill();
        assert!((ud.uphill - 5.863).abs() < 1e-9, "uphill {}", ud.uphill);
        assert!((ud.downhill - 1.543).abs() < 1e-9, "downhill {}", ud.downhill);
    }

    #[test]
    fn test_uphill_downhill_skips_absent_elevation() {
        let mut seg = sample_segment();
        seg.points.insert(2, GpxPoint::new(52.5115, 13.4570));
        let ud = seg.uphill_downhill();
        assert!((ud.uphill - 5.863).abs() < 1e-9);
    }

    #[test]
    fn test_segment_moving_data() {
        let md = sample_segment().moving_data();
        assert_eq!(md.moving_time, 39.0);
        assert_eq!(md.stopped_time, 25.0);
        assert!((md.moving_distance - 55.324056).abs() < 1e-3);
        assert!((md.stopped_distance - 6.481404).abs() < 1e-3);
        // too few samples for a max speed
        assert_eq!(md.max_speed, 0.0);
    }

    #[test]
    fn test_negative_threshold_keeps_moving_data_finite() {
        let seg = GpxSegment::new(vec![
            timed(52.0, 13.0, 10.0, at(12, 0, 0)),
            timed(52.001, 13.0, 10.0, at(12, 0, 0)),
            timed(52.002, 13.0, 10.0, at(12, 0, 30)),
        ]);
        let md = seg.moving_data_with_threshold(-5.0);
        assert_eq!(md.moving_time, 30.0);
        assert_eq!(md.stopped_time, 0.0);
        assert!(md.stopped_distance > 100.0);
        assert!(md.moving_distance.is_finite());
        assert!(md.max_speed.is_finite());
    }

    #[test]
    fn test_moving_data_threshold_is_configurable() {
        let md = sample_segment().moving_data_with_threshold(100.0);
        assert_eq!(md.moving_time, 0.0);
        assert_eq!(md.stopped_time, 64.0);
    }

    #[test]
    fn test_moving_data_untimed_pairs_are_stopped() {
        let seg = GpxSegment::new(vec![GpxPoint::new(0.0, 0.0), GpxPoint::new(0.0, 0.001)]);
        let md = seg.moving_data();
        assert_eq!(md.moving_time, 0.0);
        assert_eq!(md.stopped_time, 0.0);
        assert!(md.stopped_distance > 100.0);
    }

    #[test]
    fn test_calc_max_speed_rejects_glitch() {
        let mut samples: Vec<(f64, f64)> = (0..30).map(|i| (5.0 + i as f64 * 0.01, 5.0)).collect();
        samples.push((300.0, 300.0));
        let max = calc_max_speed(&samples);
        assert!(max < 6.0, "got {max}");
        assert!(max > 5.0);
    }

    #[test]
    fn test_calc_max_speed_needs_samples() {
        assert_eq!(calc_max_speed(&[(10.0, 10.0); 5]), 0.0);
    }

    #[test]
    fn test_speed_at_point() {
        let seg = sample_segment();
        assert!((seg.speed(2) - 1.5396386).abs() < 1e-6);

        let first = seg.points[0].speed_between(&seg.points[1], true).unwrap();
        assert_eq!(seg.speed(0), first);
        let last = seg.points[2].speed_between(&seg.points[3], true).unwrap();
        assert_eq!(seg.speed(3), last);
        assert_eq!(seg.speed(99), last);
        assert_eq!(GpxSegment::default().speed(0), 0.0);
    }

    #[test]
    fn test_location_at() {
        let seg = sample_segment();
        assert_eq!(seg.location_at(at(12, 46, 30).unwrap()), Some(1));
        assert_eq!(seg.location_at(at(12, 0, 0).unwrap()), Some(0));
        assert_eq!(seg.location_at(at(12, 47, 23).unwrap()), None);
        assert_eq!(GpxSegment::default().location_at(at(12, 0, 0).unwrap()), None);

        let mut reversed = sample_segment();
        reversed.points.reverse();
        assert_eq!(reversed.location_at(at(12, 46, 30).unwrap()), None);
    }

    #[test]
    fn test_track_aggregation() {
        let mut track = GpxTrack::default();
        track.append_segment(sample_segment());
        track.append_segment(sample_segment());

        let seg = sample_segment();
        assert_eq!(track.points_count(), 8);
        assert_eq!(track.duration(), 128.0);
        assert!((track.length_2d() - 2.0 * seg.length_2d()).abs() < 1e-9);
        assert_eq!(track.bounds(), seg.bounds());
        assert_eq!(track.moving_data().moving_time, 78.0);
        let ud = track.uphill_downhill();
        assert!((ud.uphill - 2.0 * 5.863).abs() < 1e-9);
        assert_eq!(track.location_at(at(12, 46, 30).unwrap()).len(), 2);
    }

    #[test]
    fn test_time_bounds_take_first_start_and_last_end() {
        let mut track = GpxTrack::default();
        track.append_segment(GpxSegment::new(sample_segment().points[..2].to_vec()));
        track.append_segment(GpxSegment::default());
        track.append_segment(GpxSegment::new(sample_segment().points[2..].to_vec()));

        let tb = track.time_bounds();
        assert_eq!(tb.start_time, at(12, 46, 19));
        assert_eq!(tb.end_time, at(12, 47, 23));
    }

    #[test]
    fn test_empty_document_is_neutral() {
        let data = GpxData::default();
        assert_eq!(data.points_count(), 0);
        assert_eq!(data.length_2d(), 0.0);
        assert!(data.bounds().is_empty());
        assert!(data.elevation_bounds().is_empty());
        assert!(data.time_bounds().is_empty());
        assert_eq!(data.moving_data(), MovingData::default());
        assert_eq!(data.duration(), 0.0);
        assert!(data.location_positions_on_track(10, &[GpxPoint::new(0.0, 0.0)])[0].is_empty());

        let summary = data.stats_summary(&AnalysisOptions::default());
        assert_eq!(summary.totals.bounds, None);
        assert_eq!(summary.totals.elevation_bounds, None);
        assert!(summary.tracks.is_empty());
    }

    #[test]
    fn test_stats_summary_nests_tracks_and_segments() {
        let mut track = GpxTrack::default();
        track.append_segment(sample_segment());
        track.append_segment(sample_segment());
        let mut data = GpxData::default();
        data.append_track(track);

        let summary = data.stats_summary(&AnalysisOptions::default());
        assert_eq!(summary.totals.points, 8);
        assert_eq!(summary.tracks[0].segments.len(), 2);
        assert_eq!(summary.tracks[0].segments[0].points, 4);
        assert_eq!(summary.totals.duration, 128.0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["version"], "1.1");
        assert_eq!(json["points"], 8);
        assert_eq!(json["movingData"]["movingTime"], 78.0);
        assert!(json["bounds"]["maxLat"].is_number());
        assert!(json["tracks"][0]["segments"][1]["length2d"].is_number());
    }

    #[test]
    fn test_position_at() {
        let mut data = GpxData::default();
        let mut track = GpxTrack::default();
        track.append_segment(sample_segment());
        data.append_track(track);

        let positions = data.position_at(at(12, 46, 50).unwrap());
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].track_no, 0);
        assert_eq!(positions[0].segment_no, 0);
        assert_eq!(positions[0].point_no, 2);
        assert_eq!(positions[0].point.ele, Some(65.99));
    }

    #[test]
    fn test_stopped_positions() {
        let mut data = GpxData::default();
        for p in sample_segment().points {
            data.append_point(p);
        }
        let stopped = data.stopped_positions(DEFAULT_STOPPED_SPEED_THRESHOLD);
        assert_eq!(stopped.len(), 1);
        assert_eq!(stopped[0].point_no, 1);
    }

    fn line_track(lons: impl Iterator<Item = f64>) -> GpxData {
        let mut data = GpxData::default();
        for lon in lons {
            data.append_point(GpxPoint::new(0.0, lon));
        }
        data
    }

    #[test]
    fn test_location_positions_single_pass() {
        let data = line_track((0..=100).map(|i| i as f64 * 0.001));
        let query = GpxPoint::new(0.0001, 0.05);
        let positions = data.location_position_on_track(1000, &query);
        assert_eq!(positions.len(), 1);
        let expected = geo::distance_2d(0.0, 0.0, 0.0, 0.05);
        assert!((positions[0] - expected).abs() < 150.0, "got {positions:?}");
    }

    #[test]
    fn test_location_positions_revisited() {
        let out = (0..=100).map(|i| i as f64 * 0.001);
        let back = (0..100).rev().map(|i| i as f64 * 0.001);
        let data = line_track(out.chain(back));
        let total = data.length_2d();

        let positions = data.location_position_on_track(2000, &GpxPoint::new(0.0, 0.05));
        assert_eq!(positions.len(), 2, "got {positions:?}");
        let leg = geo::distance_2d(0.0, 0.0, 0.0, 0.05);
        assert!((positions[0] - leg).abs() < 250.0);
        assert!((positions[1] - (total - leg)).abs() < 250.0);
    }

    #[test]
    fn test_location_positions_far_query() {
        let data = line_track((0..=100).map(|i| i as f64 * 0.001));
        let positions = data.location_positions_on_track(100, &[GpxPoint::new(1.0, 1.0)]);
        assert_eq!(positions, vec![Vec::<f64>::new()]);
    }
}
