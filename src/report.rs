//! Plain-text summary of a document, its tracks and their segments.

use std::fmt::Display;

use chrono::{DateTime, Utc};

use crate::gpx_time::format_time;
use crate::gpx_types::GpxData;
use crate::options::AnalysisOptions;
use crate::stats::TrackStats;

const INDENT: &str = "    ";

#[derive(Default)]
struct Report {
    out: String,
}

impl Report {
    fn line(&mut self, depth: usize, label: &str, value: impl Display) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(label);
        self.out.push_str(": ");
        self.out.push_str(&value.to_string());
        self.out.push('\n');
    }

    fn heading(&mut self, depth: usize, title: String) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(&title);
        self.out.push_str(":\n");
    }

    fn stats(&mut self, depth: usize, stats: &impl TrackStats, options: &AnalysisOptions) {
        let bounds = stats.bounds();
        let moving = stats.moving_data_with_threshold(options.stopped_speed_threshold);
        let updown = stats.uphill_downhill();
        let times = stats.time_bounds();

        self.line(depth, "Points", stats.points_count());
        self.line(depth, "Length 2D", format!("{:.3} km", stats.length_2d() / 1000.0));
        self.line(depth, "Length 3D", format!("{:.3} km", stats.length_3d() / 1000.0));
        if bounds.is_empty() {
            self.line(depth, "Bounds", "-");
        } else {
            self.line(depth, "Bounds", bounds);
        }
        self.line(depth, "Moving time", format_duration(moving.moving_time));
        self.line(depth, "Stopped time", format_duration(moving.stopped_time));
        self.line(
            depth,
            "Max speed",
            format!("{:.2} m/s = {:.2} km/h", moving.max_speed, moving.max_speed * 3.6),
        );
        self.line(depth, "Total uphill", format!("{:.2} m", updown.uphill));
        self.line(depth, "Total downhill", format!("{:.2} m", updown.downhill));
        self.line(depth, "Started", display_time(times.start_time));
        self.line(depth, "Ended", display_time(times.end_time));
    }
}

/// Seconds as `H:MM:SS`.
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

fn display_time(time: Option<DateTime<Utc>>) -> String {
    time.as_ref()
        .and_then(format_time)
        .unwrap_or_else(|| "-".to_string())
}

impl GpxData {
    /// Multi-line summary: document totals, then each track and segment.
    pub fn report(&self, options: &AnalysisOptions) -> String {
        let mut report = Report::default();

        report.line(0, "Version", self.version);
        if let Some(creator) = &self.creator {
            report.line(0, "Creator", creator);
        }
        if let Some(name) = &self.name {
            report.line(0, "Name", name);
        }
        report.line(0, "Waypoints", self.waypoints.len());
        report.line(0, "Routes", self.routes.len());
        report.line(0, "Tracks", self.tracks.len());
        report.stats(0, self, options);

        for (track_no, track) in self.tracks.iter().enumerate() {
            report.heading(1, format!("Track #{}", track_no + 1));
            if let Some(name) = &track.name {
                report.line(2, "Name", name);
            }
            report.stats(2, track, options);

            for (segment_no, segment) in track.segments.iter().enumerate() {
                report.heading(2, format!("Segment #{}", segment_no + 1));
                report.stats(3, segment, options);
            }
        }

        report.out
    }
}
