use serde::Deserialize;

use crate::error::Result;
use crate::gpx_types::{GpxData, GpxVersion};

/// Speed (km/h) at or below which a point pair counts as stopped.
pub const DEFAULT_STOPPED_SPEED_THRESHOLD: f64 = 1.0;

/// Options for encoding a document back to GPX.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    /// Target schema version ("1.0" or "1.1"). Empty or missing keeps the
    /// document's own version.
    #[serde(default)]
    pub version: Option<String>,

    /// Indent nested elements with one tab per level (default: false)
    #[serde(default)]
    pub indent: bool,
}

impl EncodeOptions {
    pub fn new(version: GpxVersion, indent: bool) -> Self {
        Self {
            version: Some(version.to_string()),
            indent,
        }
    }

    pub fn resolve_version(&self, data: &GpxData) -> Result<GpxVersion> {
        match self.version.as_deref() {
            None | Some("") => Ok(data.version),
            Some(v) => v.parse(),
        }
    }
}

/// Options for statistics and report generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Speed in km/h below which the recording is considered stopped (default: 1.0)
    #[serde(default = "default_stopped_speed_threshold")]
    pub stopped_speed_threshold: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            stopped_speed_threshold: DEFAULT_STOPPED_SPEED_THRESHOLD,
        }
    }
}

fn default_stopped_speed_threshold() -> f64 {
    DEFAULT_STOPPED_SPEED_THRESHOLD
}
