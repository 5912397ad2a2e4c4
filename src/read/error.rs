use super::event_summary::EventSummary;

use derive_more::{Constructor, Display, From};
use quick_xml::name::QName;

/// everything that can go wrong turning a file on disk into a [`RawGrid`](super::RawGrid)
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    UnknownFormat(#[from] UnknownFormat),
    #[error("Error parsing grid file before the variables section: {0}")]
    Header(#[from] Header),
    #[error("Error parsing grid file variables: {0}")]
    Body(#[from] Body),
    #[error("Inconsistent grid file layout: {0}")]
    Layout(#[from] Layout),
    #[cfg(feature = "json")]
    #[error("Error parsing json grid file: {0}")]
    Json(#[from] serde_json::Error),
}

/// errors reading the `GridFile`, `Dimensions` and `Attributes` sections
#[derive(Debug, thiserror::Error, From)]
pub enum Header {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    UnexpectedAttributeValue(UnexpectedAttributeValue),
    #[error("{0}")]
    InvalidNumber(InvalidNumber),
}

/// errors reading the `Variables` section
#[derive(Debug, thiserror::Error, From)]
pub enum Body {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    UnexpectedAttributeValue(UnexpectedAttributeValue),
    #[error("{0}")]
    InvalidNumber(InvalidNumber),
    #[error("{0}")]
    InvalidBase64(InvalidBase64),
    #[error("{0}")]
    Layout(Layout),
}

/// the values of a variable do not fit the declared dimensions
#[derive(Debug, thiserror::Error, From, Clone, PartialEq, Eq)]
pub enum Layout {
    #[error("{0}")]
    UndeclaredDimension(UndeclaredDimension),
    #[error("{0}")]
    ShapeMismatch(ShapeMismatch),
    #[error("{0}")]
    TooLarge(TooLarge),
    #[error("{0}")]
    LengthConflict(LengthConflict),
    #[error("{0}")]
    AxisCount(AxisCount),
    #[error("{0}")]
    UnrecognizedDimension(UnrecognizedDimension),
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml element: {xml_err}")]
pub struct MalformedXml {
    xml_err: quick_xml::Error,
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml attribute: {att_err}")]
pub struct MalformedAttribute {
    att_err: quick_xml::events::attributes::AttrError,
}

#[derive(Display, Debug)]
#[display(fmt = "unexpected element. Expected `{expected_name}`, got {actual_element}")]
pub struct UnexpectedElement {
    expected_name: String,
    actual_element: EventSummary,
}

impl UnexpectedElement {
    pub(crate) fn new<T: Into<String>>(expected_name: T, actual_element: EventSummary) -> Self {
        Self {
            expected_name: expected_name.into(),
            actual_element,
        }
    }
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "unexpected attribute value for {attribute_name} in {element_name} element: expected {expected_value}, got {actual_value}"
)]
pub struct UnexpectedAttributeValue {
    pub(crate) element_name: String,
    pub(crate) attribute_name: String,
    pub(crate) expected_value: String,
    pub(crate) actual_value: ParsedNameOrBytes,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "missing attribute `{attribute_name}` in {element_name} element")]
pub struct MissingAttribute {
    element_name: String,
    attribute_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "could not parse `{text}` as a number in the {element_name} element")]
pub struct InvalidNumber {
    element_name: String,
    text: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "binary values of variable `{variable}` could not be decoded: {reason}")]
pub struct InvalidBase64 {
    variable: String,
    reason: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "cannot infer a grid file format from the path `{path}`, pass an engine explicitly")]
pub struct UnknownFormat {
    path: String,
}

impl std::error::Error for UnknownFormat {}

#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "variable `{variable}` depends on dimension `{dimension}` which has no declared length")]
pub struct UndeclaredDimension {
    variable: String,
    dimension: String,
}

#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "variable `{variable}` should hold {expected} values, found {actual}")]
pub struct ShapeMismatch {
    variable: String,
    expected: usize,
    actual: usize,
}

/// the declared lengths of a variable's dimensions multiply past `usize::MAX`
#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "variable `{variable}` has declared shape {shape:?}, which is too large to index")]
pub struct TooLarge {
    variable: String,
    shape: Vec<usize>,
}

#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(
    fmt = "variable `{variable}` has length {actual} along `{dimension}`, which is declared with length {declared}"
)]
pub struct LengthConflict {
    variable: String,
    dimension: String,
    declared: usize,
    actual: usize,
}

#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "variable `{variable}` names {dims} dimensions for an array with {axes} axes")]
pub struct AxisCount {
    variable: String,
    dims: usize,
    axes: usize,
}

/// raised when a raw grid that still holds a dimension other than `t`, `x`, `y`, `z`
/// is turned into a dataset
#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "variable `{variable}` depends on unrecognised dimension `{dimension}`")]
pub struct UnrecognizedDimension {
    variable: String,
    dimension: String,
}

#[derive(From, Display, Debug)]
pub enum ParsedNameOrBytes {
    #[display(fmt = "{_0}")]
    Utf8(String),
    #[display(fmt = "{_0:?} (cannot convert to UTF8 string)")]
    Bytes(Vec<u8>),
}

impl ParsedNameOrBytes {
    pub(crate) fn new(bytes: &[u8]) -> Self {
        let vec = Vec::from(bytes);
        match String::from_utf8(vec) {
            Ok(string) => Self::Utf8(string),
            Err(e) => Self::Bytes(e.into_bytes()),
        }
    }
}

impl<'a> From<QName<'a>> for ParsedNameOrBytes {
    fn from(x: QName) -> Self {
        Self::new(x.as_ref())
    }
}

impl<'a> From<std::borrow::Cow<'a, [u8]>> for ParsedNameOrBytes {
    fn from(x: std::borrow::Cow<'a, [u8]>) -> Self {
        Self::new(x.as_ref())
    }
}

impl<'a> From<&'a str> for ParsedNameOrBytes {
    fn from(x: &str) -> Self {
        Self::Utf8(x.into())
    }
}
