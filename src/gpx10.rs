//! GPX 1.0 schema tree. Author, email, url and time sit directly under the
//! root; there is no metadata block, copyright or route/track type.

use quick_xml::events::{BytesStart, Event};

use crate::error::{GpxError, Result};
use crate::gpx_time::format_time;
use crate::gpx_types::*;
use crate::parser::{self, XmlReader};
use crate::writer::{self, XmlWriter};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gpx10 {
    pub creator: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub urlname: Option<String>,
    /// Raw timestamp text as found in (or destined for) the document.
    pub time: Option<String>,
    pub keywords: Option<String>,
    pub waypoints: Vec<GpxPoint>,
    pub routes: Vec<GpxRoute>,
    pub tracks: Vec<GpxTrack>,
}

impl Gpx10 {
    /// Map a document onto the 1.0 layout. Fields 1.0 cannot hold are dropped.
    pub fn from_data(data: &GpxData) -> Self {
        let (url, urlname) = match &data.link {
            Some(link) => (Some(link.href.clone()), link.text.clone()),
            None => (None, None),
        };
        Self {
            creator: data.creator.clone(),
            name: data.name.clone(),
            desc: data.desc.clone(),
            author: data.author_name.clone(),
            email: data.author_email.clone(),
            url,
            urlname,
            time: data.time.as_ref().and_then(format_time),
            keywords: data.keywords.clone(),
            waypoints: data.waypoints.clone(),
            routes: data.routes.iter().cloned().map(without_route_type).collect(),
            tracks: data.tracks.iter().cloned().map(without_track_type).collect(),
        }
    }

    /// Map the tree back to a document. Timestamp errors are pushed to
    /// `warnings` and leave the time unset.
    pub fn into_data(self, warnings: &mut Vec<GpxError>) -> GpxData {
        let link = match (self.url, self.urlname) {
            (None, None) => None,
            (href, text) => Some(GpxLink {
                href: href.unwrap_or_default(),
                text,
                link_type: None,
            }),
        };
        GpxData {
            version: GpxVersion::V1_0,
            creator: self.creator,
            name: self.name,
            desc: self.desc,
            author_name: self.author,
            author_email: self.email,
            author_link: None,
            copyright: None,
            link,
            time: self
                .time
                .and_then(|t| parser::parse_time_field(&t, warnings)),
            keywords: self.keywords,
            waypoints: self.waypoints,
            routes: self.routes.into_iter().map(without_route_type).collect(),
            tracks: self.tracks.into_iter().map(without_track_type).collect(),
        }
    }

    /// Read the children of the root element. `start` is the `<gpx>` tag.
    pub(crate) fn read(
        reader: &mut XmlReader<'_>,
        start: &BytesStart<'_>,
        warnings: &mut Vec<GpxError>,
    ) -> Result<Self> {
        let mut gpx = Gpx10 {
            creator: parser::attr_value(start, b"creator")?,
            ..Default::default()
        };
        let end_name = start.name().0.to_vec();

        loop {
            match parser::next_event(reader, &end_name)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"name" => gpx.name = Some(parser::read_text_owned(reader, &e)?),
                    b"desc" => gpx.desc = Some(parser::read_text_owned(reader, &e)?),
                    b"author" => gpx.author = Some(parser::read_text_owned(reader, &e)?),
                    b"email" => gpx.email = Some(parser::read_text_owned(reader, &e)?),
                    b"url" => gpx.url = Some(parser::read_text_owned(reader, &e)?),
                    b"urlname" => gpx.urlname = Some(parser::read_text_owned(reader, &e)?),
                    b"time" => gpx.time = Some(parser::read_text_owned(reader, &e)?),
                    b"keywords" => gpx.keywords = Some(parser::read_text_owned(reader, &e)?),
                    b"wpt" => {
                        let point = parser::read_point(reader, &e, "wpt", warnings)?;
                        gpx.waypoints.push(point);
                    }
                    b"rte" => gpx.routes.push(parser::read_route(reader, &e, warnings)?),
                    b"trk" => gpx.tracks.push(parser::read_track(reader, &e, warnings)?),
                    // bounds and extensions
                    _ => parser::skip_element(reader, &e)?,
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"wpt" => gpx.waypoints.push(parser::empty_point(&e, "wpt")?),
                    b"rte" => gpx.routes.push(GpxRoute::default()),
                    b"trk" => gpx.tracks.push(GpxTrack::default()),
                    _ => {}
                },
                Event::End(e) if e.name().0 == end_name.as_slice() => break,
                _ => {}
            }
        }

        Ok(gpx)
    }

    pub(crate) fn write(&self, w: &mut XmlWriter) -> Result<()> {
        writer::write_start(w, writer::root_start(GpxVersion::V1_0, self.creator.as_deref()))?;
        writer::write_opt_text(w, "name", self.name.as_deref())?;
        writer::write_opt_text(w, "desc", self.desc.as_deref())?;
        writer::write_opt_text(w, "author", self.author.as_deref())?;
        writer::write_opt_text(w, "email", self.email.as_deref())?;
        writer::write_opt_text(w, "url", self.url.as_deref())?;
        writer::write_opt_text(w, "urlname", self.urlname.as_deref())?;
        writer::write_opt_text(w, "time", self.time.as_deref())?;
        writer::write_opt_text(w, "keywords", self.keywords.as_deref())?;
        writer::write_body(w, &self.waypoints, &self.routes, &self.tracks)?;
        writer::write_end(w, "gpx")
    }
}

fn without_route_type(route: GpxRoute) -> GpxRoute {
    GpxRoute {
        route_type: None,
        ..route
    }
}

fn without_track_type(track: GpxTrack) -> GpxTrack {
    GpxTrack {
        track_type: None,
        ..track
    }
}
