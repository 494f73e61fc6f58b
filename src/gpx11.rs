//! GPX 1.1 schema tree. Document information lives in a `<metadata>` block
//! with structured author, copyright and link elements.

use quick_xml::events::{BytesStart, Event};

use crate::error::{GpxError, Result};
use crate::gpx_time::format_time;
use crate::gpx_types::*;
use crate::parser::{self, XmlReader};
use crate::writer::{self, XmlWriter};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gpx11 {
    pub creator: Option<String>,
    pub metadata: Option<Gpx11Metadata>,
    pub waypoints: Vec<GpxPoint>,
    pub routes: Vec<GpxRoute>,
    pub tracks: Vec<GpxTrack>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gpx11Metadata {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub author: Option<Gpx11Person>,
    pub copyright: Option<GpxCopyright>,
    pub link: Option<GpxLink>,
    pub time: Option<String>,
    pub keywords: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gpx11Person {
    pub name: Option<String>,
    /// Full address; split into `id` and `domain` attributes on output.
    pub email: Option<String>,
    pub link: Option<GpxLink>,
}

impl Gpx11Metadata {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Gpx11 {
    pub fn from_data(data: &GpxData) -> Self {
        let author = Gpx11Person {
            name: data.author_name.clone(),
            email: data.author_email.clone(),
            link: data.author_link.clone(),
        };
        let metadata = Gpx11Metadata {
            name: data.name.clone(),
            desc: data.desc.clone(),
            author: (author != Gpx11Person::default()).then_some(author),
            copyright: data.copyright.clone(),
            link: data.link.clone(),
            time: data.time.as_ref().and_then(format_time),
            keywords: data.keywords.clone(),
        };
        Self {
            creator: data.creator.clone(),
            metadata: (!metadata.is_empty()).then_some(metadata),
            waypoints: data.waypoints.clone(),
            routes: data.routes.clone(),
            tracks: data.tracks.clone(),
        }
    }

    pub fn into_data(self, warnings: &mut Vec<GpxError>) -> GpxData {
        let metadata = self.metadata.unwrap_or_default();
        let author = metadata.author.unwrap_or_default();
        GpxData {
            version: GpxVersion::V1_1,
            creator: self.creator,
            name: metadata.name,
            desc: metadata.desc,
            author_name: author.name,
            author_email: author.email,
            author_link: author.link,
            copyright: metadata.copyright,
            link: metadata.link,
            time: metadata
                .time
                .and_then(|t| parser::parse_time_field(&t, warnings)),
            keywords: metadata.keywords,
            waypoints: self.waypoints,
            routes: self.routes,
            tracks: self.tracks,
        }
    }

    /// Read the children of the root element. `start` is the `<gpx>` tag.
    pub(crate) fn read(
        reader: &mut XmlReader<'_>,
        start: &BytesStart<'_>,
        warnings: &mut Vec<GpxError>,
    ) -> Result<Self> {
        let mut gpx = Gpx11 {
            creator: parser::attr_value(start, b"creator")?,
            ..Default::default()
        };
        let end_name = start.name().0.to_vec();

        loop {
            match parser::next_event(reader, &end_name)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"metadata" => gpx.metadata = Some(read_metadata(reader, &e)?),
                    b"wpt" => {
                        let point = parser::read_point(reader, &e, "wpt", warnings)?;
                        gpx.waypoints.push(point);
                    }
                    b"rte" => gpx.routes.push(parser::read_route(reader, &e, warnings)?),
                    b"trk" => gpx.tracks.push(parser::read_track(reader, &e, warnings)?),
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
        writer::write_start(w, writer::root_start(GpxVersion::V1_1, self.creator.as_deref()))?;
        if let Some(metadata) = &self.metadata {
            write_metadata(w, metadata)?;
        }
        writer::write_body(w, &self.waypoints, &self.routes, &self.tracks)?;
        writer::write_end(w, "gpx")
    }
}

fn read_metadata(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<Gpx11Metadata> {
    let mut metadata = Gpx11Metadata::default();
    let end_name = start.name().0.to_vec();

    loop {
        match parser::next_event(reader, &end_name)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => metadata.name = Some(parser::read_text_owned(reader, &e)?),
                b"desc" => metadata.desc = Some(parser::read_text_owned(reader, &e)?),
                b"author" => metadata.author = Some(read_person(reader, &e)?),
                b"copyright" => metadata.copyright = Some(read_copyright(reader, &e)?),
                b"link" => metadata.link = Some(parser::read_link(reader, &e)?),
                b"time" => metadata.time = Some(parser::read_text_owned(reader, &e)?),
                b"keywords" => metadata.keywords = Some(parser::read_text_owned(reader, &e)?),
                // bounds and extensions
                _ => parser::skip_element(reader, &e)?,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"author" => metadata.author = Some(Gpx11Person::default()),
                b"copyright" => {
                    metadata.copyright = Some(GpxCopyright {
                        author: parser::attr_value(&e, b"author")?.unwrap_or_default(),
                        ..Default::default()
                    })
                }
                b"link" => {
                    metadata.link = Some(GpxLink {
                        href: parser::attr_value(&e, b"href")?.unwrap_or_default(),
                        ..Default::default()
                    })
                }
                _ => {}
            },
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            _ => {}
        }
    }

    Ok(metadata)
}

fn read_person(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<Gpx11Person> {
    let mut person = Gpx11Person::default();
    let end_name = start.name().0.to_vec();

    loop {
        match parser::next_event(reader, &end_name)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => person.name = Some(parser::read_text_owned(reader, &e)?),
                b"email" => {
                    person.email = Some(join_email(&e)?);
                    parser::skip_element(reader, &e)?;
                }
                b"link" => person.link = Some(parser::read_link(reader, &e)?),
                _ => parser::skip_element(reader, &e)?,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"email" => person.email = Some(join_email(&e)?),
                b"link" => {
                    person.link = Some(GpxLink {
                        href: parser::attr_value(&e, b"href")?.unwrap_or_default(),
                        ..Default::default()
                    })
                }
                _ => {}
            },
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            _ => {}
        }
    }

    Ok(person)
}

fn read_copyright(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<GpxCopyright> {
    let mut copyright = GpxCopyright {
        author: parser::attr_value(start, b"author")?.unwrap_or_default(),
        ..Default::default()
    };
    let end_name = start.name().0.to_vec();

    loop {
        match parser::next_event(reader, &end_name)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"year" => copyright.year = Some(parser::read_text_owned(reader, &e)?),
                b"license" => copyright.license = Some(parser::read_text_owned(reader, &e)?),
                _ => parser::skip_element(reader, &e)?,
            },
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            _ => {}
        }
    }

    Ok(copyright)
}

/// `<email id="aaa" domain="bbb.com"/>` becomes `aaa@bbb.com`.
fn join_email(e: &BytesStart<'_>) -> Result<String> {
    let id = parser::attr_value(e, b"id")?.unwrap_or_default();
    Ok(match parser::attr_value(e, b"domain")? {
        Some(domain) if !domain.is_empty() => format!("{id}@{domain}"),
        _ => id,
    })
}

fn write_metadata(w: &mut XmlWriter, metadata: &Gpx11Metadata) -> Result<()> {
    writer::write_start(w, BytesStart::new("metadata"))?;
    writer::write_opt_text(w, "name", metadata.name.as_deref())?;
    writer::write_opt_text(w, "desc", metadata.desc.as_deref())?;
    if let Some(author) = &metadata.author {
        writer::write_start(w, BytesStart::new("author"))?;
        writer::write_opt_text(w, "name", author.name.as_deref())?;
        if let Some(email) = &author.email {
            let (id, domain) = email.split_once('@').unwrap_or((email.as_str(), ""));
            let mut start = BytesStart::new("email");
            start.push_attribute(("id", id));
            start.push_attribute(("domain", domain));
            w.write_event(Event::Empty(start))?;
        }
        if let Some(link) = &author.link {
            writer::write_link(w, link)?;
        }
        writer::write_end(w, "author")?;
    }
    if let Some(copyright) = &metadata.copyright {
        let mut start = BytesStart::new("copyright");
        start.push_attribute(("author", copyright.author.as_str()));
        writer::write_start(w, start)?;
        writer::write_opt_text(w, "year", copyright.year.as_deref())?;
        writer::write_opt_text(w, "license", copyright.license.as_deref())?;
        writer::write_end(w, "copyright")?;
    }
    if let Some(link) = &metadata.link {
        writer::write_link(w, link)?;
    }
    writer::write_opt_text(w, "time", metadata.time.as_deref())?;
    writer::write_opt_text(w, "keywords", metadata.keywords.as_deref())?;
    writer::write_end(w, "metadata")
}
