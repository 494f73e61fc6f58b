use chrono::{DateTime, Utc};
use quick_xml::events::attributes::AttrError;
use wasm_bindgen::JsValue;

#[derive(Debug)]
pub enum GpxError {
    XmlParse(quick_xml::Error),
    /// The document ended while `element` was still open.
    UnexpectedEof(String),
    Io(std::io::Error),
    UnknownVersion(String),
    /// A timestamp matched none of the accepted layouts. `fallback` is the
    /// time at which parsing was attempted and carries no meaning of its own.
    InvalidTime {
        value: String,
        fallback: DateTime<Utc>,
    },
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
    /// Text of a numeric element such as `<ele>` or `<sat>` is not a number
    /// of the expected kind.
    InvalidNumber { element: String, value: String },
}

impl std::fmt::Display for GpxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XmlParse(e) => write!(f, "XML parse error: {e}"),
            Self::UnexpectedEof(element) => {
                write!(f, "Unexpected end of document inside <{element}>")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnknownVersion(version) if version.is_empty() => {
                write!(f, "Invalid GPX file, cannot find version")
            }
            Self::UnknownVersion(version) => write!(f, "Invalid version {version}"),
            Self::InvalidTime { value, .. } => write!(f, "Cannot parse time '{value}'"),
            Self::MissingAttribute { element, attribute } => {
                write!(f, "Missing attribute '{attribute}' on <{element}>")
            }
            Self::InvalidAttribute {
                element,
                attribute,
                value,
            } => write!(
                f,
                "Invalid value '{value}' for attribute '{attribute}' on <{element}>"
            ),
            Self::InvalidNumber { element, value } => {
                write!(f, "Invalid number '{value}' in <{element}>")
            }
        }
    }
}

impl std::error::Error for GpxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::XmlParse(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for GpxError {
    fn from(e: quick_xml::Error) -> Self {
        Self::XmlParse(e)
    }
}

impl From<AttrError> for GpxError {
    fn from(e: AttrError) -> Self {
        Self::XmlParse(e.into())
    }
}

impl From<std::io::Error> for GpxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<GpxError> for JsValue {
    fn from(e: GpxError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GpxError>;
