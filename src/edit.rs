//! In-place edits of the document model: simplification, smoothing,
//! outlier removal, time interpolation and structural changes.

use chrono::TimeDelta;
use tracing::debug;

use crate::geo;
use crate::gpx_types::{GpxData, GpxPoint, GpxRoute, GpxSegment, GpxTrack};
use crate::stats::TrackStats;

/// Segments shorter than this are left alone by extreme removal.
pub const REMOVE_EXTREMES_MIN_POINTS: usize = 10;
const VERTICAL_EXTREMES_FACTOR: f64 = 5.0;
const HORIZONTAL_EXTREMES_FACTOR: f64 = 1.75;
/// A point whose detour `d(prev, pt) + d(pt, next)` exceeds the direct
/// distance `d(prev, next)` by this ratio is a candidate for removal.
const DETOUR_RATIO: f64 = 1.5;

/// Copy of `points` with interior elevations replaced by a 0.4/0.2/0.4
/// average of the point and its neighbours. Points next to an absent
/// elevation keep their own.
pub fn smoothed_vertical(points: &[GpxPoint]) -> Vec<GpxPoint> {
    let mut result = points.to_vec();
    for i in 1..points.len().saturating_sub(1) {
        if let (Some(prev), Some(cur), Some(next)) =
            (points[i - 1].ele, points[i].ele, points[i + 1].ele)
        {
            result[i].ele = Some(prev * 0.4 + cur * 0.2 + next * 0.4);
        }
    }
    result
}

/// Copy of `points` with interior coordinates replaced by a 0.4/0.2/0.4
/// average of the point and its neighbours.
pub fn smoothed_horizontal(points: &[GpxPoint]) -> Vec<GpxPoint> {
    let mut result = points.to_vec();
    for i in 1..points.len().saturating_sub(1) {
        let (prev, cur, next) = (&points[i - 1], &points[i], &points[i + 1]);
        result[i].lat = prev.lat * 0.4 + cur.lat * 0.2 + next.lat * 0.4;
        result[i].lon = prev.lon * 0.4 + cur.lon * 0.2 + next.lon * 0.4;
    }
    result
}

fn rdp_recursive(
    points: &[GpxPoint],
    max_distance: f64,
    start: usize,
    end: usize,
    keep: &mut [bool],
) {
    if end <= start + 1 {
        return;
    }

    let mut max_idx = start;
    let mut max_deviation = -1.0;
    for i in start + 1..end {
        let d = geo::distance_from_line(&points[i], &points[start], &points[end]);
        if d > max_deviation {
            max_deviation = d;
            max_idx = i;
        }
    }

    if max_deviation > max_distance {
        keep[max_idx] = true;
        rdp_recursive(points, max_distance, start, max_idx, keep);
        rdp_recursive(points, max_distance, max_idx, end, keep);
    }
}

impl GpxSegment {
    /// Keep the first point, then every point at least `min_distance`
    /// meters (3D) from the last kept one.
    pub fn reduce_points(&mut self, min_distance: f64) {
        if min_distance <= 0.0 || self.points.len() <= 1 {
            return;
        }
        let mut points = std::mem::take(&mut self.points).into_iter();
        let mut kept: Vec<GpxPoint> = points.next().into_iter().collect();
        for point in points {
            let far_enough = kept
                .last()
                .is_some_and(|last| last.distance_3d(&point) >= min_distance);
            if far_enough {
                kept.push(point);
            }
        }
        self.points = kept;
    }

    /// Ramer-Douglas-Peucker simplification with `max_distance` meters of
    /// allowed deviation. First and last points are always kept.
    pub fn simplify(&mut self, max_distance: f64) {
        let n = self.points.len();
        if n < 3 {
            return;
        }
        let mut keep = vec![false; n];
        keep[0] = true;
        keep[n - 1] = true;
        rdp_recursive(&self.points, max_distance.max(0.0), 0, n - 1, &mut keep);

        let mut flags = keep.into_iter();
        self.points.retain(|_| flags.next().unwrap_or(false));
    }

    pub fn smooth_vertical(&mut self) {
        self.points = smoothed_vertical(&self.points);
    }

    pub fn smooth_horizontal(&mut self) {
        self.points = smoothed_horizontal(&self.points);
    }

    /// Drop interior points whose elevation sits further from the smoothed
    /// profile than five times the average elevation step.
    pub fn remove_vertical_extremes(&mut self) {
        if self.points.len() < REMOVE_EXTREMES_MIN_POINTS {
            return;
        }
        let deltas: Vec<f64> = self
            .points
            .windows(2)
            .filter_map(|w| Some((w[1].ele? - w[0].ele?).abs()))
            .collect();
        if deltas.is_empty() {
            return;
        }
        let average = deltas.iter().sum::<f64>() / deltas.len() as f64;
        let threshold = average * VERTICAL_EXTREMES_FACTOR;
        let smoothed = smoothed_vertical(&self.points);

        self.remove_detours(GpxPoint::distance_3d, |i, point| {
            match (point.ele, smoothed[i].ele) {
                (Some(ele), Some(smooth)) => (smooth - ele).abs() >= threshold,
                _ => false,
            }
        });
    }

    /// Drop interior points that moved further from their smoothed position
    /// than 1.75 times the average point spacing.
    pub fn remove_horizontal_extremes(&mut self) {
        if self.points.len() < REMOVE_EXTREMES_MIN_POINTS {
            return;
        }
        let average = self.length_2d() / (self.points.len() - 1) as f64;
        let threshold = average * HORIZONTAL_EXTREMES_FACTOR;
        let smoothed = smoothed_horizontal(&self.points);

        self.remove_detours(GpxPoint::distance_2d, |i, point| {
            smoothed[i].distance_2d(point) >= threshold
        });
    }

    /// Remove interior points that form a detour, measured with `distance`,
    /// and for which `reject` returns true.
    fn remove_detours(
        &mut self,
        distance: fn(&GpxPoint, &GpxPoint) -> f64,
        reject: impl Fn(usize, &GpxPoint) -> bool,
    ) {
        let before = self.points.len();
        let original = std::mem::take(&mut self.points);
        let last = original.len() - 1;

        self.points = original
            .iter()
            .enumerate()
            .filter(|&(i, point)| {
                if i == 0 || i == last {
                    return true;
                }
                let (prev, next) = (&original[i - 1], &original[i + 1]);
                let direct = distance(prev, next);
                let detour = distance(prev, point) + distance(point, next);
                !(detour > direct * DETOUR_RATIO && reject(i, point))
            })
            .map(|(_, point)| point.clone())
            .collect();

        if self.points.len() != before {
            debug!(removed = before - self.points.len(), "removed extreme points");
        }
    }

    /// Interpolate timestamps for runs of untimed points that have a timed
    /// point on both sides, proportionally to the 2D distance travelled.
    /// Runs at either end of the segment stay untimed.
    pub fn add_missing_time(&mut self) {
        let mut run_start: Option<usize> = None;
        for i in 0..self.points.len() {
            if !self.points[i].has_time() {
                run_start.get_or_insert(i);
            } else if let Some(start) = run_start.take() {
                if start > 0 {
                    self.interpolate_time(start, i - 1);
                }
            }
        }
    }

    fn interpolate_time(&mut self, start: usize, end: usize) {
        let (Some(start_time), Some(end_time)) =
            (self.points[start - 1].time, self.points[end + 1].time)
        else {
            return;
        };

        let mut cumulative = Vec::with_capacity(end - start + 1);
        let mut length = 0.0;
        for i in start..=end {
            length += self.points[i - 1].distance_2d(&self.points[i]);
            cumulative.push(length);
        }
        length += self.points[end].distance_2d(&self.points[end + 1]);

        let run_len = (end - start + 2) as f64;
        let span_ms = (end_time - start_time).num_milliseconds() as f64;
        for (offset, dist) in cumulative.into_iter().enumerate() {
            let ratio = if length > 0.0 {
                dist / length
            } else {
                (offset + 1) as f64 / run_len
            };
            let shift = TimeDelta::milliseconds((ratio * span_ms) as i64);
            self.points[start + offset].time = Some(start_time + shift);
        }
    }

    /// Split after `point_no`: the pivot point ends the first segment.
    pub fn split(mut self, point_no: usize) -> (GpxSegment, GpxSegment) {
        let at = point_no.saturating_add(1).min(self.points.len());
        let rest = self.points.split_off(at);
        (self, GpxSegment::new(rest))
    }

    /// Append all points of `other` to this segment.
    pub fn join(&mut self, other: GpxSegment) {
        self.points.extend(other.points);
    }
}

impl GpxTrack {
    /// Replace segment `segment_no` by its two halves split after `point_no`.
    /// Out-of-range indices leave the track untouched.
    pub fn split(&mut self, segment_no: usize, point_no: usize) {
        let in_range = self
            .segments
            .get(segment_no)
            .is_some_and(|s| point_no < s.points.len());
        if !in_range {
            return;
        }
        let segment = self.segments.remove(segment_no);
        let (first, second) = segment.split(point_no);
        self.segments.insert(segment_no, second);
        self.segments.insert(segment_no, first);
    }

    /// Append segment `other_no` onto segment `segment_no` and drop it.
    pub fn join(&mut self, segment_no: usize, other_no: usize) {
        let len = self.segments.len();
        if segment_no == other_no || segment_no >= len || other_no >= len {
            return;
        }
        let other = std::mem::take(&mut self.segments[other_no]);
        self.segments[segment_no].join(other);
        self.segments.remove(other_no);
    }

    pub fn join_next(&mut self, segment_no: usize) {
        self.join(segment_no, segment_no + 1);
    }

    pub fn remove_empty(&mut self) {
        self.segments.retain(|s| !s.points.is_empty());
    }
}

impl GpxRoute {
    pub fn move_by(&mut self, delta_lat: f64, delta_lon: f64) {
        for point in &mut self.points {
            point.lat += delta_lat;
            point.lon += delta_lon;
        }
    }
}

impl GpxData {
    fn for_each_segment(&mut self, mut f: impl FnMut(&mut GpxSegment)) {
        for track in &mut self.tracks {
            for segment in &mut track.segments {
                f(segment);
            }
        }
    }

    pub fn execute_on_waypoints(&mut self, mut f: impl FnMut(&mut GpxPoint)) {
        self.waypoints.iter_mut().for_each(&mut f);
    }

    pub fn execute_on_route_points(&mut self, mut f: impl FnMut(&mut GpxPoint)) {
        for route in &mut self.routes {
            route.points.iter_mut().for_each(&mut f);
        }
    }

    pub fn execute_on_track_points(&mut self, mut f: impl FnMut(&mut GpxPoint)) {
        self.for_each_segment(|s| s.points.iter_mut().for_each(&mut f));
    }

    /// Run `f` on waypoints, route points and track points.
    pub fn execute_on_all_points(&mut self, mut f: impl FnMut(&mut GpxPoint)) {
        self.execute_on_waypoints(&mut f);
        self.execute_on_route_points(&mut f);
        self.execute_on_track_points(&mut f);
    }

    /// Shift every elevation by `delta`. A point without elevation ends up
    /// with an elevation of `delta`.
    pub fn add_elevation(&mut self, delta: f64) {
        self.execute_on_all_points(|p| p.ele = Some(p.ele.unwrap_or(0.0) + delta));
    }

    pub fn remove_elevation(&mut self) {
        self.execute_on_all_points(|p| p.ele = None);
    }

    /// Shift every set timestamp by `delta`.
    pub fn add_time(&mut self, delta: TimeDelta) {
        self.execute_on_all_points(|p| {
            if p.has_time() {
                p.time = p.time.map(|t| t + delta);
            }
        });
    }

    pub fn remove_time(&mut self) {
        self.execute_on_all_points(|p| p.time = None);
    }

    /// Drop segments without points, then tracks without segments.
    pub fn remove_empty(&mut self) {
        for track in &mut self.tracks {
            track.remove_empty();
        }
        self.tracks.retain(|t| !t.segments.is_empty());
    }

    /// Move every segment into the first track, preserving order.
    pub fn reduce_to_single_track(&mut self) {
        if self.tracks.len() <= 1 {
            return;
        }
        let mut tracks = std::mem::take(&mut self.tracks).into_iter();
        if let Some(mut first) = tracks.next() {
            for track in tracks {
                first.segments.extend(track.segments);
            }
            self.tracks.push(first);
        }
    }

    /// Thin track points so that consecutive points are at least
    /// `max(min_distance, ceil(length_3d / max_points))` meters apart.
    pub fn reduce_track_points(&mut self, max_points: usize, min_distance: f64) {
        let before = self.points_count();
        if before < max_points && min_distance <= 0.0 {
            return;
        }
        let spacing = if max_points == 0 {
            min_distance
        } else {
            min_distance.max((self.length_3d() / max_points as f64).ceil())
        };
        self.for_each_segment(|s| s.reduce_points(spacing));
        debug!(before, after = self.points_count(), spacing, "reduced track points");
    }

    pub fn simplify_tracks(&mut self, max_distance: f64) {
        let before = self.points_count();
        self.for_each_segment(|s| s.simplify(max_distance));
        debug!(before, after = self.points_count(), max_distance, "simplified tracks");
    }

    pub fn smooth_vertical(&mut self) {
        self.for_each_segment(GpxSegment::smooth_vertical);
    }

    pub fn smooth_horizontal(&mut self) {
        self.for_each_segment(GpxSegment::smooth_horizontal);
    }

    pub fn remove_vertical_extremes(&mut self) {
        self.for_each_segment(GpxSegment::remove_vertical_extremes);
    }

    pub fn remove_horizontal_extremes(&mut self) {
        self.for_each_segment(GpxSegment::remove_horizontal_extremes);
    }

    pub fn add_missing_time(&mut self) {
        self.for_each_segment(GpxSegment::add_missing_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn line(n: usize) -> GpxSegment {
        GpxSegment::new(
            (0..n)
                .map(|i| GpxPoint::with_elevation(0.0, i as f64 * 0.0001, 100.0))
                .collect(),
        )
    }

    #[test]
    fn test_add_elevation() {
        let mut data = GpxData::default();
        data.append_point(GpxPoint::with_elevation(12.0, 13.0, 100.0));
        data.append_point(GpxPoint::new(12.0, 13.0));

        data.add_elevation(10.0);
        let pts = &data.tracks[0].segments[0].points;
        assert_eq!(pts[0].ele, Some(110.0));
        assert_eq!(pts[1].ele, Some(10.0));

        data.add_elevation(-20.0);
        let pts = &data.tracks[0].segments[0].points;
        assert_eq!(pts[0].ele, Some(90.0));
        assert_eq!(pts[1].ele, Some(-10.0));
    }

    #[test]
    fn test_remove_elevation_and_time() {
        let mut data = GpxData::default();
        let mut pt = GpxPoint::with_elevation(1.0, 1.0, 5.0);
        pt.time = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        data.append_waypoint(pt.clone());
        data.append_point(pt);

        data.remove_elevation();
        data.remove_time();
        assert_eq!(data.waypoints[0].ele, None);
        assert_eq!(data.tracks[0].segments[0].points[0].ele, None);
        assert_eq!(data.tracks[0].segments[0].points[0].time, None);
    }

    #[test]
    fn test_add_time_skips_unset() {
        let mut data = GpxData::default();
        let mut timed = GpxPoint::new(0.0, 0.0);
        timed.time = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        data.append_point(timed);
        data.append_point(GpxPoint::new(0.0, 0.1));

        data.add_time(TimeDelta::hours(2));
        let pts = &data.tracks[0].segments[0].points;
        assert_eq!(pts[0].time, Some(Utc.with_ymd_and_hms(2020, 1, 1, 2, 0, 0).unwrap()));
        assert_eq!(pts[1].time, None);
    }

    #[test]
    fn test_reduce_points_keeps_min_spacing() {
        let mut seg = line(50);
        let first = seg.points[0].clone();
        seg.reduce_points(30.0);

        assert_eq!(seg.points[0], first);
        for w in seg.points.windows(2) {
            assert!(w[0].distance_3d(&w[1]) >= 30.0);
        }
        // 0.0001 deg ~ 11.1 m, so every third point survives
        assert_eq!(seg.points.len(), 17);
    }

    #[test]
    fn test_reduce_points_noop_cases() {
        let mut seg = line(5);
        seg.reduce_points(0.0);
        assert_eq!(seg.points.len(), 5);

        let mut single = line(1);
        single.reduce_points(100.0);
        assert_eq!(single.points.len(), 1);
    }

    #[test]
    fn test_reduce_track_points_by_count() {
        let mut data = GpxData::default();
        data.append_track(GpxTrack {
            segments: vec![line(100)],
            ..Default::default()
        });
        data.reduce_track_points(10, 0.0);
        assert!(data.points_count() <= 11, "got {}", data.points_count());
        assert!(data.points_count() >= 2);

        let mut small = GpxData::default();
        small.append_track(GpxTrack {
            segments: vec![line(5)],
            ..Default::default()
        });
        small.reduce_track_points(10, 0.0);
        assert_eq!(small.points_count(), 5);
    }

    #[test]
    fn test_simplify_colinear_collapses_to_endpoints() {
        let mut seg = GpxSegment::new(
            (0..20)
                .map(|i| GpxPoint::new(0.0, i as f64 * 0.001))
                .collect(),
        );
        let (first, last) = (seg.points[0].clone(), seg.points[19].clone());
        seg.simplify(1.0);
        assert_eq!(seg.points, vec![first, last]);
    }

    #[test]
    fn test_simplify_keeps_corner() {
        let mut seg = GpxSegment::new(vec![
            GpxPoint::new(0.0, 0.0),
            GpxPoint::new(0.0, 0.0005),
            GpxPoint::new(0.0, 0.001),
            GpxPoint::new(0.0005, 0.001),
            GpxPoint::new(0.001, 0.001),
        ]);
        seg.simplify(5.0);
        let coords: Vec<(f64, f64)> = seg.points.iter().map(|p| (p.lat, p.lon)).collect();
        assert_eq!(coords, vec![(0.0, 0.0), (0.0, 0.001), (0.001, 0.001)]);
    }

    #[test]
    fn test_simplify_never_grows() {
        let mut seg = GpxSegment::new(
            (0..30)
                .map(|i| GpxPoint::new((i as f64 * 0.7).sin() * 0.001, i as f64 * 0.0003))
                .collect(),
        );
        let original = seg.points.clone();
        seg.simplify(0.0);
        assert!(seg.points.len() <= original.len());
        assert_eq!(seg.points.first(), original.first());
        assert_eq!(seg.points.last(), original.last());
    }

    #[test]
    fn test_smooth_vertical_leaves_endpoints() {
        let mut seg = GpxSegment::new(vec![
            GpxPoint::with_elevation(0.0, 0.0, 10.0),
            GpxPoint::with_elevation(0.0, 0.001, 20.0),
            GpxPoint::with_elevation(0.0, 0.002, 10.0),
        ]);
        seg.smooth_vertical();
        assert_eq!(seg.points[0].ele, Some(10.0));
        assert_eq!(seg.points[2].ele, Some(10.0));
        assert!((seg.points[1].ele.unwrap() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_smooth_horizontal() {
        let mut seg = GpxSegment::new(vec![
            GpxPoint::new(0.0, 0.0),
            GpxPoint::new(1.0, 1.0),
            GpxPoint::new(0.0, 2.0),
        ]);
        seg.smooth_horizontal();
        assert!((seg.points[1].lat - 0.2).abs() < 1e-12);
        assert!((seg.points[1].lon - 1.0).abs() < 1e-12);
        assert_eq!(seg.points[2].lon, 2.0);
    }

    #[test]
    fn test_remove_vertical_extremes() {
        let mut seg = line(15);
        seg.points[7].ele = Some(400.0);
        seg.remove_vertical_extremes();
        assert_eq!(seg.points.len(), 14);
        assert!(seg.points.iter().all(|p| p.ele == Some(100.0)));
    }

    #[test]
    fn test_remove_extremes_ignores_short_segments() {
        let mut seg = line(5);
        seg.points[2].ele = Some(400.0);
        seg.remove_vertical_extremes();
        assert_eq!(seg.points.len(), 5);
    }

    #[test]
    fn test_remove_horizontal_extremes() {
        let mut seg = line(15);
        seg.points[7].lat = 0.003;
        seg.remove_horizontal_extremes();
        assert_eq!(seg.points.len(), 14);
        assert!(seg.points.iter().all(|p| p.lat == 0.0));
    }

    #[test]
    fn test_remove_horizontal_extremes_on_steep_climb() {
        // 1000 m of climb per ~111 m step hides the lateral spike in 3D.
        let mut seg = GpxSegment::new(
            (0..15)
                .map(|i| GpxPoint::with_elevation(0.0, i as f64 * 0.001, i as f64 * 1000.0))
                .collect(),
        );
        seg.points[7].lat = 0.003;
        seg.remove_horizontal_extremes();
        assert_eq!(seg.points.len(), 14);
        assert!(seg.points.iter().all(|p| p.lat == 0.0));
        assert_eq!(seg.points[7].ele, Some(8000.0));
    }

    #[test]
    fn test_add_missing_time() {
        let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut seg = line(5);
        seg.points[0].time = Some(t0);
        seg.points[4].time = Some(t0 + TimeDelta::seconds(40));
        seg.add_missing_time();

        for (i, p) in seg.points.iter().enumerate() {
            let t = p.time.unwrap();
            let expected = t0 + TimeDelta::seconds(10 * i as i64);
            assert!((t - expected).num_milliseconds().abs() <= 1, "point {i}: {t}");
        }
    }

    #[test]
    fn test_add_missing_time_leaves_open_runs() {
        let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut seg = line(5);
        seg.points[1].time = Some(t0);
        seg.points[2].time = Some(t0 + TimeDelta::seconds(10));
        seg.add_missing_time();

        assert_eq!(seg.points[0].time, None);
        assert_eq!(seg.points[3].time, None);
        assert_eq!(seg.points[4].time, None);
    }

    #[test]
    fn test_segment_split_and_join() {
        let seg = line(5);
        let original = seg.clone();
        let (mut a, b) = seg.split(2);
        assert_eq!(a.points.len(), 3);
        assert_eq!(b.points.len(), 2);
        assert_eq!(a.points[2], original.points[2]);

        a.join(b);
        assert_eq!(a, original);
    }

    #[test]
    fn test_track_split_join() {
        let mut track = GpxTrack::default();
        track.append_segment(line(4));
        track.append_segment(line(6));

        track.split(1, 1);
        let lens: Vec<usize> = track.segments.iter().map(|s| s.points.len()).collect();
        assert_eq!(lens, vec![4, 2, 4]);

        track.join_next(1);
        let lens: Vec<usize> = track.segments.iter().map(|s| s.points.len()).collect();
        assert_eq!(lens, vec![4, 6]);

        track.split(5, 0);
        track.join(0, 9);
        assert_eq!(track.segments.len(), 2);
    }

    #[test]
    fn test_remove_empty_is_idempotent() {
        let mut data = GpxData::default();
        data.append_track(GpxTrack {
            segments: vec![GpxSegment::default(), line(3), GpxSegment::default()],
            ..Default::default()
        });
        data.append_track(GpxTrack::default());
        data.append_track(GpxTrack {
            segments: vec![GpxSegment::default()],
            ..Default::default()
        });

        data.remove_empty();
        let once = data.clone();
        data.remove_empty();
        assert_eq!(data, once);
        assert_eq!(data.tracks.len(), 1);
        assert_eq!(data.tracks[0].segments.len(), 1);
    }

    #[test]
    fn test_reduce_to_single_track() {
        let mut data = GpxData::default();
        for n in [2, 3, 4] {
            data.append_track(GpxTrack {
                name: Some(format!("t{n}")),
                segments: vec![line(n)],
                ..Default::default()
            });
        }
        data.reduce_to_single_track();
        assert_eq!(data.tracks.len(), 1);
        assert_eq!(data.tracks[0].name.as_deref(), Some("t2"));
        let lens: Vec<usize> = data.tracks[0].segments.iter().map(|s| s.points.len()).collect();
        assert_eq!(lens, vec![2, 3, 4]);
    }

    #[test]
    fn test_route_move_by() {
        let mut route = GpxRoute::default();
        route.append_point(GpxPoint::new(1.0, 2.0));
        route.move_by(0.5, -1.0);
        assert_eq!(route.points[0].lat, 1.5);
        assert_eq!(route.points[0].lon, 1.0);
    }

    #[test]
    fn test_execute_on_all_points_visits_everything() {
        let mut data = GpxData::default();
        data.append_waypoint(GpxPoint::new(0.0, 0.0));
        data.append_route(GpxRoute {
            points: vec![GpxPoint::new(0.0, 0.0); 2],
            ..Default::default()
        });
        data.append_point(GpxPoint::new(0.0, 0.0));

        let mut count = 0;
        data.execute_on_all_points(|_| count += 1);
        assert_eq!(count, 4);
    }
}
