//! GPX document model with track statistics, editing, and lossless GPX
//! 1.0/1.1 conversion. The Rust API is the primary interface; a small
//! `wasm-bindgen` surface wraps decode, stats, report and re-encode.

pub mod edit;
pub mod error;
pub mod geo;
pub mod gpx10;
pub mod gpx11;
pub mod gpx_time;
pub mod gpx_types;
pub mod options;
pub mod parser;
pub mod report;
pub mod stats;
pub mod writer;

use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub use crate::error::{GpxError, Result};
pub use crate::geo::{ElevationBounds, GpxBounds, TimeBounds};
pub use crate::gpx_types::{
    GpxCopyright, GpxData, GpxLink, GpxPoint, GpxRoute, GpxSegment, GpxTrack, GpxVersion,
};
pub use crate::options::{AnalysisOptions, EncodeOptions};
pub use crate::parser::{
    detect_version, parse_bytes, parse_bytes_with_warnings, parse_file, parse_str,
};
pub use crate::stats::{DocumentStats, MovingData, TrackStats, UphillDownhill};
pub use crate::writer::{encode, encode_to_string};

/// Parse a GPX string and return the text report.
#[wasm_bindgen(js_name = gpxInfo)]
pub fn gpx_info(gpx_string: &str, options: JsValue) -> std::result::Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts: AnalysisOptions = parse_options(options)?;
    let gpx_data = parse_str(gpx_string)?;
    Ok(gpx_data.report(&opts))
}

/// Parse a GPX string and return its statistics as a JS object.
#[wasm_bindgen(js_name = gpxStats)]
pub fn gpx_stats(gpx_string: &str, options: JsValue) -> std::result::Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts: AnalysisOptions = parse_options(options)?;
    let gpx_data = parse_str(gpx_string)?;
    let stats = gpx_data.stats_summary(&opts);
    serde_wasm_bindgen::to_value(&stats).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse a GPX string and return its statistics as a JSON string.
#[wasm_bindgen(js_name = gpxStatsString)]
pub fn gpx_stats_string(
    gpx_string: &str,
    options: JsValue,
) -> std::result::Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts: AnalysisOptions = parse_options(options)?;
    let gpx_data = parse_str(gpx_string)?;
    let stats = gpx_data.stats_summary(&opts);
    serde_json::to_string(&stats).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse a GPX string and re-encode it, optionally in the other version.
#[wasm_bindgen(js_name = gpxConvert)]
pub fn gpx_convert(gpx_string: &str, options: JsValue) -> std::result::Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts: EncodeOptions = parse_options(options)?;
    let gpx_data = parse_str(gpx_string)?;
    Ok(encode_to_string(&gpx_data, &opts)?)
}

/// Route `tracing` output to the browser console. `level` is a level name
/// such as `"debug"` or `"WARN"` (default INFO). Calling this again keeps
/// the first subscriber.
#[wasm_bindgen(js_name = initLogging)]
#[cfg_attr(not(target_arch = "wasm32"), allow(unused_variables))]
pub fn init_logging(level: Option<String>) {
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let max_level = level
            .as_deref()
            .and_then(|l| l.parse::<tracing::Level>().ok())
            .unwrap_or(tracing::Level::INFO);

        let mut builder = tracing_wasm::WASMLayerConfigBuilder::new();
        builder.set_max_level(max_level);
        if let Err(e) = tracing_subscriber::registry()
            .with(tracing_wasm::WASMLayer::new(builder.build()))
            .try_init()
        {
            tracing::debug!(error = %e, "logging already initialised");
        }
    }
}

fn parse_options<T>(options: JsValue) -> std::result::Result<T, JsValue>
where
    T: DeserializeOwned + Default,
{
    if options.is_undefined() || options.is_null() {
        Ok(T::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
