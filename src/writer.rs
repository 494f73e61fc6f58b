use std::fmt::Display;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::error::Result;
use crate::gpx10::Gpx10;
use crate::gpx11::Gpx11;
use crate::gpx_time::format_time;
use crate::gpx_types::*;
use crate::options::EncodeOptions;

pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

pub(crate) type XmlWriter = Writer<Vec<u8>>;

/// Encode a document as GPX XML in the version selected by `options`.
pub fn encode(data: &GpxData, options: &EncodeOptions) -> Result<Vec<u8>> {
    let version = options.resolve_version(data)?;
    let buffer = XML_HEADER.as_bytes().to_vec();
    let mut writer = if options.indent {
        Writer::new_with_indent(buffer, b'\t', 1)
    } else {
        Writer::new(buffer)
    };

    match version {
        GpxVersion::V1_0 => Gpx10::from_data(data).write(&mut writer)?,
        GpxVersion::V1_1 => Gpx11::from_data(data).write(&mut writer)?,
    }

    let bytes = writer.into_inner();
    debug!(%version, indent = options.indent, len = bytes.len(), "encoded GPX");
    Ok(bytes)
}

pub fn encode_to_string(data: &GpxData, options: &EncodeOptions) -> Result<String> {
    let bytes = encode(data, options)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Root `<gpx>` start tag with namespace, version and creator.
pub(crate) fn root_start(version: GpxVersion, creator: Option<&str>) -> BytesStart<'static> {
    let mut root = BytesStart::new("gpx");
    root.push_attribute(("xmlns", version.namespace()));
    root.push_attribute(("version", version.as_str()));
    if let Some(creator) = creator {
        root.push_attribute(("creator", creator));
    }
    root
}

pub(crate) fn write_start(writer: &mut XmlWriter, start: BytesStart<'_>) -> Result<()> {
    writer.write_event(Event::Start(start))?;
    Ok(())
}

pub(crate) fn write_end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub(crate) fn write_text(writer: &mut XmlWriter, name: &str, value: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    write_end(writer, name)
}

pub(crate) fn write_opt_text(
    writer: &mut XmlWriter,
    name: &str,
    value: Option<&str>,
) -> Result<()> {
    match value {
        Some(value) => write_text(writer, name, value),
        None => Ok(()),
    }
}

pub(crate) fn write_opt_number<T: Display>(
    writer: &mut XmlWriter,
    name: &str,
    value: Option<T>,
) -> Result<()> {
    match value {
        Some(value) => write_text(writer, name, &value.to_string()),
        None => Ok(()),
    }
}

pub(crate) fn write_opt_time(
    writer: &mut XmlWriter,
    name: &str,
    value: Option<&chrono::DateTime<chrono::Utc>>,
) -> Result<()> {
    write_opt_text(writer, name, value.and_then(format_time).as_deref())
}

/// `<link href="..">` with optional text and type children.
pub(crate) fn write_link(writer: &mut XmlWriter, link: &GpxLink) -> Result<()> {
    let mut start = BytesStart::new("link");
    start.push_attribute(("href", link.href.as_str()));
    write_start(writer, start)?;
    write_opt_text(writer, "text", link.text.as_deref())?;
    write_opt_text(writer, "type", link.link_type.as_deref())?;
    write_end(writer, "link")
}

/// Write a wpt, rtept or trkpt element. Both schema versions share the
/// relative order of these children.
pub(crate) fn write_point(writer: &mut XmlWriter, name: &str, point: &GpxPoint) -> Result<()> {
    let mut start = BytesStart::new(name);
    start.push_attribute(("lat", point.lat.to_string().as_str()));
    start.push_attribute(("lon", point.lon.to_string().as_str()));
    write_start(writer, start)?;

    write_opt_number(writer, "ele", point.ele)?;
    write_opt_time(writer, "time", point.time.as_ref())?;
    write_opt_text(writer, "magvar", point.magvar.as_deref())?;
    write_opt_text(writer, "geoidheight", point.geoid_height.as_deref())?;
    write_opt_text(writer, "name", point.name.as_deref())?;
    write_opt_text(writer, "cmt", point.cmt.as_deref())?;
    write_opt_text(writer, "desc", point.desc.as_deref())?;
    write_opt_text(writer, "src", point.src.as_deref())?;
    write_opt_text(writer, "sym", point.sym.as_deref())?;
    write_opt_text(writer, "type", point.point_type.as_deref())?;
    write_opt_text(writer, "fix", point.fix.as_deref())?;
    write_opt_number(writer, "sat", point.sat)?;
    write_opt_number(writer, "hdop", point.hdop)?;
    write_opt_number(writer, "vdop", point.vdop)?;
    write_opt_number(writer, "pdop", point.pdop)?;
    write_opt_number(writer, "ageofdgpsdata", point.age_of_dgps_data)?;
    write_opt_number(writer, "dgpsid", point.dgps_id)?;

    write_end(writer, name)
}

pub(crate) fn write_route(writer: &mut XmlWriter, route: &GpxRoute) -> Result<()> {
    write_start(writer, BytesStart::new("rte"))?;
    write_opt_text(writer, "name", route.name.as_deref())?;
    write_opt_text(writer, "cmt", route.cmt.as_deref())?;
    write_opt_text(writer, "desc", route.desc.as_deref())?;
    write_opt_text(writer, "src", route.src.as_deref())?;
    write_opt_number(writer, "number", route.number)?;
    write_opt_text(writer, "type", route.route_type.as_deref())?;
    for point in &route.points {
        write_point(writer, "rtept", point)?;
    }
    write_end(writer, "rte")
}

pub(crate) fn write_track(writer: &mut XmlWriter, track: &GpxTrack) -> Result<()> {
    write_start(writer, BytesStart::new("trk"))?;
    write_opt_text(writer, "name", track.name.as_deref())?;
    write_opt_text(writer, "cmt", track.cmt.as_deref())?;
    write_opt_text(writer, "desc", track.desc.as_deref())?;
    write_opt_text(writer, "src", track.src.as_deref())?;
    write_opt_number(writer, "number", track.number)?;
    write_opt_text(writer, "type", track.track_type.as_deref())?;
    for segment in &track.segments {
        write_start(writer, BytesStart::new("trkseg"))?;
        for point in &segment.points {
            write_point(writer, "trkpt", point)?;
        }
        write_end(writer, "trkseg")?;
    }
    write_end(writer, "trk")
}

/// Waypoints, routes and tracks in schema order.
pub(crate) fn write_body(
    writer: &mut XmlWriter,
    waypoints: &[GpxPoint],
    routes: &[GpxRoute],
    tracks: &[GpxTrack],
) -> Result<()> {
    for point in waypoints {
        write_point(writer, "wpt", point)?;
    }
    for route in routes {
        write_route(writer, route)?;
    }
    for track in tracks {
        write_track(writer, track)?;
    }
    Ok(())
}
