use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::error::{GpxError, Result};
use crate::gpx10::Gpx10;
use crate::gpx11::Gpx11;
use crate::gpx_time::parse_time;
use crate::gpx_types::*;

/// Number of leading bytes inspected when looking for the version.
const VERSION_SNIFF_WINDOW: usize = 1000;
/// Shortest tail after `version=` accepted as holding a quoted version.
const VERSION_MIN_TAIL: usize = 10;

pub(crate) type XmlReader<'a> = Reader<&'a [u8]>;

/// Detect the schema version from the `version` attribute of the root
/// `<gpx>` element, looking only at the start of the input.
pub fn detect_version(bytes: &[u8]) -> Result<GpxVersion> {
    let window = &bytes[..bytes.len().min(VERSION_SNIFF_WINDOW)];
    let head = String::from_utf8_lossy(window);

    let missing = || GpxError::UnknownVersion(String::new());
    let (_, after_root) = head.split_once("<gpx").ok_or_else(missing)?;
    let (_, after_attr) = after_root.split_once("version=").ok_or_else(missing)?;
    if after_attr.len() < VERSION_MIN_TAIL {
        return Err(missing());
    }
    let version = after_attr.get(1..4).ok_or_else(missing)?;
    version.parse()
}

/// Decode a GPX document. Timestamps that cannot be parsed are dropped;
/// use [`parse_bytes_with_warnings`] to inspect them.
pub fn parse_bytes(bytes: &[u8]) -> Result<GpxData> {
    parse_bytes_with_warnings(bytes).map(|(data, _)| data)
}

/// Decode a GPX document, also returning the recoverable per-field errors
/// (unparseable timestamps) met along the way.
pub fn parse_bytes_with_warnings(bytes: &[u8]) -> Result<(GpxData, Vec<GpxError>)> {
    let version = detect_version(bytes)?;
    debug!(%version, len = bytes.len(), "decoding GPX");

    let mut reader = Reader::from_reader(bytes);
    let mut warnings = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"gpx" => {
                let data = match version {
                    GpxVersion::V1_0 => {
                        Gpx10::read(&mut reader, &e, &mut warnings)?.into_data(&mut warnings)
                    }
                    GpxVersion::V1_1 => {
                        Gpx11::read(&mut reader, &e, &mut warnings)?.into_data(&mut warnings)
                    }
                };
                debug!(
                    waypoints = data.waypoints.len(),
                    routes = data.routes.len(),
                    tracks = data.tracks.len(),
                    warnings = warnings.len(),
                    "decoded GPX"
                );
                return Ok((data, warnings));
            }
            Event::Empty(e) if e.local_name().as_ref() == b"gpx" => {
                let data = GpxData {
                    version,
                    creator: attr_value(&e, b"creator")?,
                    ..Default::default()
                };
                return Ok((data, warnings));
            }
            Event::Eof => return Err(GpxError::UnexpectedEof("gpx".to_string())),
            _ => {}
        }
    }
}

pub fn parse_str(text: &str) -> Result<GpxData> {
    parse_bytes(text.as_bytes())
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<GpxData> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes)
}

/// Read the next event, turning end of input into an error naming the
/// element that was still open.
pub(crate) fn next_event<'a>(reader: &mut XmlReader<'a>, open: &[u8]) -> Result<Event<'a>> {
    match reader.read_event()? {
        Event::Eof => Err(GpxError::UnexpectedEof(
            String::from_utf8_lossy(open).into_owned(),
        )),
        event => Ok(event),
    }
}

/// Skip an element and all of its children.
pub(crate) fn skip_element(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<()> {
    reader.read_to_end(start.name())?;
    Ok(())
}

/// Unescaped value of the attribute with the given local name.
pub(crate) fn attr_value(start: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr_result in start.attributes() {
        let attr = attr_result?;
        if attr.key.local_name().as_ref() == name {
            let raw = String::from_utf8_lossy(&attr.value);
            let value = match quick_xml::escape::unescape(&raw) {
                Ok(unescaped) => unescaped.into_owned(),
                Err(_) => raw.into_owned(),
            };
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Coordinates of a point, or the attribute error that disqualifies it.
fn parse_lat_lon(e: &BytesStart<'_>, element: &'static str) -> Result<(f64, f64)> {
    let coordinate = |attribute: &'static str| -> Result<f64> {
        let value = attr_value(e, attribute.as_bytes())?
            .ok_or(GpxError::MissingAttribute { element, attribute })?;
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| GpxError::InvalidAttribute {
                element,
                attribute,
                value,
            })
    };
    Ok((coordinate("lat")?, coordinate("lon")?))
}

/// Collect the character data of an element up to its end tag, resolving
/// CDATA and entity references. Nested elements are skipped.
pub(crate) fn read_text_owned(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match next_event(reader, &end_name)? {
            Event::Text(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    match e.as_ref() {
                        b"amp" => text.push('&'),
                        b"lt" => text.push('<'),
                        b"gt" => text.push('>'),
                        b"quot" => text.push('"'),
                        b"apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Numeric element text. An empty element is `None`; anything that does
/// not parse as `T` fails the decode.
fn read_number<T: FromStr>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
) -> Result<Option<T>> {
    let text = read_text_owned(reader, start)?;
    let value = text.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .map_err(|_| GpxError::InvalidNumber {
            element: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            value: value.to_string(),
        })
}

pub(crate) fn read_f64(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<Option<f64>> {
    read_number(reader, start)
}

pub(crate) fn read_u32(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<Option<u32>> {
    read_number(reader, start)
}

/// Parse a timestamp, recording the failure instead of aborting the decode.
pub(crate) fn parse_time_field(
    value: &str,
    warnings: &mut Vec<GpxError>,
) -> Option<DateTime<Utc>> {
    match parse_time(value) {
        Ok(time) => Some(time),
        Err(e) => {
            warn!(value, "unparseable timestamp");
            warnings.push(e);
            None
        }
    }
}

/// Parse a `<link href="..">` element with optional text and type.
pub(crate) fn read_link(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<GpxLink> {
    let mut link = GpxLink {
        href: attr_value(start, b"href")?.unwrap_or_default(),
        ..Default::default()
    };
    let end_name = start.name().0.to_vec();

    loop {
        match next_event(reader, &end_name)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"text" => link.text = Some(read_text_owned(reader, &e)?),
                b"type" => link.link_type = Some(read_text_owned(reader, &e)?),
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            _ => {}
        }
    }

    Ok(link)
}

/// Decode a `wpt`, `rtept` or `trkpt` with its children.
pub(crate) fn read_point(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    element: &'static str,
    warnings: &mut Vec<GpxError>,
) -> Result<GpxPoint> {
    let (lat, lon) = parse_lat_lon(start, element)?;
    let mut point = GpxPoint::new(lat, lon);
    let end_name = start.name().0.to_vec();

    loop {
        match next_event(reader, &end_name)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ele" => point.ele = read_f64(reader, &e)?,
                b"time" => {
                    let text = read_text_owned(reader, &e)?;
                    point.time = parse_time_field(&text, warnings);
                }
                b"magvar" => point.magvar = Some(read_text_owned(reader, &e)?),
                b"geoidheight" => point.geoid_height = Some(read_text_owned(reader, &e)?),
                b"name" => point.name = Some(read_text_owned(reader, &e)?),
                b"cmt" => point.cmt = Some(read_text_owned(reader, &e)?),
                b"desc" => point.desc = Some(read_text_owned(reader, &e)?),
                b"src" => point.src = Some(read_text_owned(reader, &e)?),
                b"sym" => point.sym = Some(read_text_owned(reader, &e)?),
                b"type" => point.point_type = Some(read_text_owned(reader, &e)?),
                b"fix" => point.fix = Some(read_text_owned(reader, &e)?),
                b"sat" => point.sat = read_u32(reader, &e)?,
                b"hdop" => point.hdop = read_f64(reader, &e)?,
                b"vdop" => point.vdop = read_f64(reader, &e)?,
                b"pdop" => point.pdop = read_f64(reader, &e)?,
                b"ageofdgpsdata" => point.age_of_dgps_data = read_f64(reader, &e)?,
                b"dgpsid" => point.dgps_id = read_u32(reader, &e)?,
                // links, extensions and 1.0 course/speed/url
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            _ => {}
        }
    }

    Ok(point)
}

/// Point written as an empty element: coordinates only.
pub(crate) fn empty_point(start: &BytesStart<'_>, element: &'static str) -> Result<GpxPoint> {
    let (lat, lon) = parse_lat_lon(start, element)?;
    Ok(GpxPoint::new(lat, lon))
}

pub(crate) fn read_route(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    warnings: &mut Vec<GpxError>,
) -> Result<GpxRoute> {
    let mut route = GpxRoute::default();
    let end_name = start.name().0.to_vec();

    loop {
        match next_event(reader, &end_name)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => route.name = Some(read_text_owned(reader, &e)?),
                b"cmt" => route.cmt = Some(read_text_owned(reader, &e)?),
                b"desc" => route.desc = Some(read_text_owned(reader, &e)?),
                b"src" => route.src = Some(read_text_owned(reader, &e)?),
                b"number" => route.number = read_u32(reader, &e)?,
                b"type" => route.route_type = Some(read_text_owned(reader, &e)?),
                b"rtept" => route.points.push(read_point(reader, &e, "rtept", warnings)?),
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"rtept" => {
                route.points.push(empty_point(&e, "rtept")?);
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            _ => {}
        }
    }

    Ok(route)
}

/// Parse a <trk> element. Empty segments are kept.
pub(crate) fn read_track(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    warnings: &mut Vec<GpxError>,
) -> Result<GpxTrack> {
    let mut track = GpxTrack::default();
    let end_name = start.name().0.to_vec();

    loop {
        match next_event(reader, &end_name)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => track.name = Some(read_text_owned(reader, &e)?),
                b"cmt" => track.cmt = Some(read_text_owned(reader, &e)?),
                b"desc" => track.desc = Some(read_text_owned(reader, &e)?),
                b"src" => track.src = Some(read_text_owned(reader, &e)?),
                b"number" => track.number = read_u32(reader, &e)?,
                b"type" => track.track_type = Some(read_text_owned(reader, &e)?),
                b"trkseg" => track.segments.push(read_segment(reader, &e, warnings)?),
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"trkseg" => {
                track.segments.push(GpxSegment::default());
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            _ => {}
        }
    }

    Ok(track)
}

fn read_segment(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    warnings: &mut Vec<GpxError>,
) -> Result<GpxSegment> {
    let mut segment = GpxSegment::default();
    let end_name = start.name().0.to_vec();

    loop {
        match next_event(reader, &end_name)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trkpt" => segment.points.push(read_point(reader, &e, "trkpt", warnings)?),
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"trkpt" => {
                segment.points.push(empty_point(&e, "trkpt")?);
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            _ => {}
        }
    }

    Ok(segment)
}
