//! reading grid files from disk
//!
//! A grid file is read into a [`RawGrid`]: named dimensions with declared lengths,
//! free-form attributes and variables whose dimensions are still plain strings. Only
//! [`RawGrid::into_dataset`] checks the dimension names, which lets the loader decide
//! what to do with dimensions it does not recognise before anything is rejected.
//!
//! Two on-disk formats are understood, selected by [`Engine`].

mod error;
mod event_summary;
#[cfg(feature = "json")]
mod json;

pub use error::{Body, Header, Layout, LoadError};
use event_summary::EventSummary;

use crate::dataset::{AttrValue, Attributes, Dataset, Dim, Variable};
use crate::write_grid::Encoding;

use ndarray::{ArrayD, IxDyn};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::Path;

/// The on-disk format of a grid file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// `GridFile` xml documents, see [`write_grid`](crate::write_grid)
    Xml,
    /// json documents with `dimensions`, `attributes` and `variables` keys
    #[cfg(feature = "json")]
    Json,
}

impl Engine {
    /// infer the engine from the file extension
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xml") | Some("grd") => Ok(Engine::Xml),
            #[cfg(feature = "json")]
            Some("json") => Ok(Engine::Json),
            _ => Err(error::UnknownFormat::new(path.display().to_string()).into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Engine::Xml => "xml",
            #[cfg(feature = "json")]
            Engine::Json => "json",
        }
    }
}

/// A grid file as stored on disk, before its dimension names have been checked
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    dimensions: BTreeMap<String, usize>,
    attributes: Attributes,
    variables: BTreeMap<String, RawVariable>,
}

/// a variable of a [`RawGrid`]
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariable {
    dims: Vec<String>,
    data: ArrayD<f64>,
}

impl RawVariable {
    /// lay row-major `values` out along `dims`, whose lengths are looked up in `dimensions`
    pub fn from_values(
        name: &str,
        dims: Vec<String>,
        values: Vec<f64>,
        dimensions: &BTreeMap<String, usize>,
    ) -> Result<Self, Layout> {
        let shape = dims
            .iter()
            .map(|dim| {
                dimensions
                    .get(dim)
                    .copied()
                    .ok_or_else(|| error::UndeclaredDimension::new(name.into(), dim.clone()))
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let expected = match shape.iter().try_fold(1_usize, |total, len| total.checked_mul(*len)) {
            Some(expected) => expected,
            None => return Err(error::TooLarge::new(name.into(), shape).into()),
        };
        let actual = values.len();

        if expected != actual {
            return Err(error::ShapeMismatch::new(name.into(), expected, actual).into());
        }

        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|_| error::ShapeMismatch::new(name.into(), expected, actual))?;

        Ok(Self { dims, data })
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }
}

impl RawGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// declare a dimension and its length
    pub fn with_dimension<N: Into<String>>(mut self, name: N, length: usize) -> Self {
        self.dimensions.insert(name.into(), length);
        self
    }

    pub fn with_attribute<K: Into<String>, V: Into<AttrValue>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// add a variable, declaring any of its dimensions that are not yet declared
    pub fn with_variable<N: Into<String>>(
        mut self,
        name: N,
        dims: &[&str],
        data: ArrayD<f64>,
    ) -> Result<Self, Layout> {
        let name = name.into();

        if dims.len() != data.ndim() {
            return Err(error::AxisCount::new(name, dims.len(), data.ndim()).into());
        }

        for (dim, actual) in dims.iter().zip(data.shape()) {
            match self.dimensions.get(*dim) {
                Some(declared) if declared != actual => {
                    return Err(
                        error::LengthConflict::new(name, dim.to_string(), *declared, *actual).into(),
                    );
                }
                Some(_) => {}
                None => {
                    self.dimensions.insert(dim.to_string(), *actual);
                }
            }
        }

        let dims = dims.iter().map(|dim| dim.to_string()).collect();
        self.variables.insert(name, RawVariable { dims, data });

        Ok(self)
    }

    pub fn dimensions(&self) -> &BTreeMap<String, usize> {
        &self.dimensions
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &RawVariable)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn variable(&self, name: &str) -> Option<&RawVariable> {
        self.variables.get(name)
    }

    /// every dimension name that is either declared or used by a variable
    pub fn dimension_names(&self) -> BTreeSet<String> {
        let used = self.variables.values().flat_map(|var| var.dims.iter().cloned());
        self.dimensions.keys().cloned().chain(used).collect()
    }

    /// drop, in a single pass, every variable depending on any of `dims` along with the
    /// dimension declarations themselves
    pub fn drop_dims(mut self, dims: &BTreeSet<String>) -> Self {
        self.variables
            .retain(|_, var| !var.dims.iter().any(|dim| dims.contains(dim)));
        self.dimensions.retain(|name, _| !dims.contains(name));
        self
    }

    /// Convert into a [`Dataset`], which fails if any variable still depends on a
    /// dimension other than `t`, `x`, `y`, `z`.
    ///
    /// Declared dimensions that no variable uses are forgotten.
    pub fn into_dataset(self) -> crate::Result<Dataset> {
        let mut dataset = Dataset::new();

        for (key, value) in self.attributes {
            dataset.set_attr(key, value);
        }

        for (name, raw) in self.variables {
            let dims = raw
                .dims
                .iter()
                .map(|dim| {
                    Dim::from_name(dim)
                        .ok_or_else(|| error::UnrecognizedDimension::new(name.clone(), dim.clone()))
                })
                .collect::<Result<Vec<Dim>, _>>()
                .map_err(|e| LoadError::Layout(e.into()))?;

            let variable = Variable::new(dims, raw.data)?;
            dataset.insert_variable(name, variable)?;
        }

        Ok(dataset)
    }
}

/// Store the data variables and attributes of a dataset. Coordinates are not
/// stored; they are rebuilt by the geometry when the grid is opened.
impl From<&Dataset> for RawGrid {
    fn from(dataset: &Dataset) -> Self {
        let mut dimensions = BTreeMap::new();
        for (dim, len) in dataset.sizes() {
            dimensions.insert(dim.name().to_string(), len);
        }

        let variables = dataset
            .variables()
            .map(|(name, var)| {
                let raw = RawVariable {
                    dims: var.dims().iter().map(|dim| dim.name().to_string()).collect(),
                    data: var.data().clone(),
                };
                (name.to_string(), raw)
            })
            .collect();

        Self {
            dimensions,
            attributes: dataset.attrs().clone(),
            variables,
        }
    }
}

/// read a grid file from `path`, inferring the format from the extension if no
/// engine is given
pub fn read_grid(path: &Path, engine: Option<Engine>) -> Result<RawGrid, LoadError> {
    let engine = match engine {
        Some(engine) => engine,
        None => Engine::from_path(path)?,
    };

    let file = std::fs::File::open(path)?;
    let buf_reader = std::io::BufReader::new(file);

    match engine {
        Engine::Xml => parse_xml_grid(Reader::from_reader(buf_reader)),
        #[cfg(feature = "json")]
        Engine::Json => json::parse_json_grid(buf_reader),
    }
}

/// parse a `GridFile` xml document
#[doc(hidden)]
pub fn parse_xml_grid<R: BufRead>(mut reader: Reader<R>) -> Result<RawGrid, LoadError> {
    let mut buffer = Vec::new();

    // ignore whitespace in the reader
    reader.trim_text(true);

    read_to_grid_file(&mut reader, &mut buffer)?;

    let dimensions = read_dimensions(&mut reader, &mut buffer)?;
    let attributes = read_attributes(&mut reader, &mut buffer)?;
    let variables = read_variables(&mut reader, &mut buffer, &dimensions)?;

    buffer.clear();
    read_ending_element::<Body, _>(&mut reader, &mut buffer, "GridFile")?;

    Ok(RawGrid {
        dimensions,
        attributes,
        variables,
    })
}

fn read_to_grid_file<R: BufRead>(reader: &mut Reader<R>, buffer: &mut Vec<u8>) -> Result<(), Header> {
    // find the GridFile leading element
    loop {
        buffer.clear();
        let event = reader
            .read_event_into(buffer)
            .map_err(error::MalformedXml::from)?;

        match event {
            // the xml declaration and any comments before the root are skipped
            Event::Decl(_) | Event::Comment(_) | Event::DocType(_) => continue,
            Event::Start(start) if start.name().as_ref() == b"GridFile" => {
                for attribute in start.attributes() {
                    let attribute = attribute.map_err(error::MalformedAttribute::from)?;

                    if attribute.key.as_ref() == b"version" {
                        check_attribute_value(attribute, "GridFile", "version", "1.0")?;
                    }
                }

                return Ok(());
            }
            Event::Eof => {
                return Err(error::UnexpectedElement::new("GridFile", EventSummary::eof()).into());
            }
            other => {
                return Err(error::UnexpectedElement::new("GridFile", EventSummary::new(&other)).into());
            }
        }
    }
}

fn read_dimensions<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> Result<BTreeMap<String, usize>, Header> {
    let mut dimensions = BTreeMap::new();

    buffer.clear();
    let was_empty = read_empty_or_starting_element::<Header, _>(reader, buffer, "Dimensions")?.0;
    if was_empty {
        return Ok(dimensions);
    }

    loop {
        buffer.clear();
        let event = reader
            .read_event_into(buffer)
            .map_err(error::MalformedXml::from)?;

        match event {
            Event::Empty(element) if element.name().as_ref() == b"Dimension" => {
                let name = attribute_string::<Header>(&element, "name", "Dimension")?;
                let length = attribute_string::<Header>(&element, "length", "Dimension")?;

                let length = match length.trim().parse::<usize>() {
                    Ok(length) => length,
                    Err(_) => return Err(error::InvalidNumber::new("Dimension".into(), length).into()),
                };

                dimensions.insert(name, length);
            }
            Event::End(element) if element.name().as_ref() == b"Dimensions" => break,
            other => {
                let actual = EventSummary::new(&other);
                return Err(error::UnexpectedElement::new("Dimension,/Dimensions", actual).into());
            }
        }
    }

    Ok(dimensions)
}

fn read_attributes<R: BufRead>(reader: &mut Reader<R>, buffer: &mut Vec<u8>) -> Result<Attributes, Header> {
    let mut attributes = Attributes::new();

    buffer.clear();
    let was_empty = read_empty_or_starting_element::<Header, _>(reader, buffer, "Attributes")?.0;
    if was_empty {
        return Ok(attributes);
    }

    loop {
        buffer.clear();
        let event = reader
            .read_event_into(buffer)
            .map_err(error::MalformedXml::from)?;

        match event {
            Event::Empty(element) if element.name().as_ref() == b"Attribute" => {
                let name = attribute_string::<Header>(&element, "name", "Attribute")?;
                let value = attribute_string::<Header>(&element, "value", "Attribute")?;
                let value = attribute_value(&element, value)?;

                attributes.insert(name, value);
            }
            Event::End(element) if element.name().as_ref() == b"Attributes" => break,
            other => {
                let actual = EventSummary::new(&other);
                return Err(error::UnexpectedElement::new("Attribute,/Attributes", actual).into());
            }
        }
    }

    Ok(attributes)
}

/// interpret the `value` of an `Attribute` element according to its optional `type`
fn attribute_value(element: &BytesStart<'_>, value: String) -> Result<AttrValue, Header> {
    let declared = match get_attribute_value::<Header>(element, "type", "Attribute") {
        Ok(attribute) => Some(attribute),
        Err(Header::MissingAttribute(_)) => None,
        Err(other) => return Err(other),
    };

    let as_number = || value.trim().parse::<f64>().ok();

    match declared {
        None => Ok(as_number()
            .map(AttrValue::Number)
            .unwrap_or_else(|| AttrValue::Text(value.clone()))),
        Some(attribute) if attribute.value.as_ref() == b"text" => Ok(AttrValue::Text(value)),
        Some(attribute) if attribute.value.as_ref() == b"number" => match as_number() {
            Some(number) => Ok(AttrValue::Number(number)),
            None => Err(error::InvalidNumber::new("Attribute".into(), value).into()),
        },
        Some(attribute) => Err(error::UnexpectedAttributeValue::new(
            "Attribute".into(),
            "type".into(),
            "text|number".into(),
            error::ParsedNameOrBytes::from(attribute.value),
        )
        .into()),
    }
}

/// the header of a `Variable` element
struct VariableHeader {
    name: String,
    dims: Vec<String>,
    encoding: Encoding,
}

impl VariableHeader {
    fn from_element(element: &BytesStart<'_>) -> Result<Self, Body> {
        let name = attribute_string::<Body>(element, "name", "Variable")?;
        let dims = attribute_string::<Body>(element, "dims", "Variable")?
            .split_ascii_whitespace()
            .map(str::to_string)
            .collect();

        let format = get_attribute_value::<Body>(element, "format", "Variable")?;
        let encoding = match Encoding::from_format(format.value.as_ref()) {
            Some(encoding) => encoding,
            None => {
                return Err(error::UnexpectedAttributeValue::new(
                    "Variable".into(),
                    "format".into(),
                    "ascii|binary".into(),
                    error::ParsedNameOrBytes::from(format.value),
                )
                .into())
            }
        };

        Ok(Self { name, dims, encoding })
    }
}

fn read_variables<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    dimensions: &BTreeMap<String, usize>,
) -> Result<BTreeMap<String, RawVariable>, Body> {
    let mut variables = BTreeMap::new();

    buffer.clear();
    let was_empty = read_empty_or_starting_element::<Body, _>(reader, buffer, "Variables")?.0;
    if was_empty {
        return Ok(variables);
    }

    loop {
        buffer.clear();
        let event = reader
            .read_event_into(buffer)
            .map_err(error::MalformedXml::from)?;

        let (was_empty, header) = match event {
            Event::Start(element) if element.name().as_ref() == b"Variable" => {
                (false, VariableHeader::from_element(&element)?)
            }
            Event::Empty(element) if element.name().as_ref() == b"Variable" => {
                (true, VariableHeader::from_element(&element)?)
            }
            Event::End(element) if element.name().as_ref() == b"Variables" => break,
            other => {
                let actual = EventSummary::new(&other);
                return Err(error::UnexpectedElement::new("Variable,/Variables", actual).into());
            }
        };

        let values = if was_empty {
            Vec::new()
        } else {
            read_variable_values(reader, buffer, &header)?
        };

        let variable = RawVariable::from_values(&header.name, header.dims, values, dimensions)?;
        variables.insert(header.name, variable);
    }

    Ok(variables)
}

/// read the body of a `Variable` element and its closing tag
fn read_variable_values<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    header: &VariableHeader,
) -> Result<Vec<f64>, Body> {
    buffer.clear();
    let event = reader
        .read_event_into(buffer)
        .map_err(error::MalformedXml::from)?;

    let values = match event {
        Event::Text(text) => {
            let bytes = text.into_inner();
            match header.encoding {
                Encoding::Ascii => parse_ascii_values(&bytes, &header.name)?,
                Encoding::Base64 => parse_base64_values(&bytes, &header.name)?,
            }
        }
        // `<Variable ...></Variable>` with nothing inside
        Event::End(end) if end.name().as_ref() == b"Variable" => return Ok(Vec::new()),
        other => {
            let actual = EventSummary::new(&other);
            return Err(error::UnexpectedElement::new("variable values", actual).into());
        }
    };

    buffer.clear();
    read_ending_element::<Body, _>(reader, buffer, "Variable")?;

    Ok(values)
}

fn parse_ascii_values(bytes: &[u8], variable: &str) -> Result<Vec<f64>, Body> {
    let text = std::str::from_utf8(bytes).map_err(|_| {
        error::InvalidNumber::new(
            format!("Variable `{variable}`"),
            String::from_utf8_lossy(bytes).into_owned(),
        )
    })?;

    text.split_ascii_whitespace()
        .map(|number| {
            number
                .parse::<f64>()
                .map_err(|_| Body::from(error::InvalidNumber::new(format!("Variable `{variable}`"), number.into())))
        })
        .collect()
}

fn parse_base64_values(bytes: &[u8], variable: &str) -> Result<Vec<f64>, Body> {
    let numerical_bytes =
        base64::decode(bytes).map_err(|e| error::InvalidBase64::new(variable.into(), e.to_string()))?;

    if numerical_bytes.len() % 8 != 0 {
        let reason = format!("{} bytes is not a whole number of f64 values", numerical_bytes.len());
        return Err(error::InvalidBase64::new(variable.into(), reason).into());
    }

    let values = numerical_bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut const_slice = [0; 8];
            const_slice.copy_from_slice(chunk);
            f64::from_le_bytes(const_slice)
        })
        .collect();

    Ok(values)
}

fn read_empty_or_starting_element<'a, E, R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &'a mut Vec<u8>,
    expected_name: &str,
) -> Result<(bool, BytesStart<'a>), E>
where
    E: From<error::UnexpectedElement> + From<error::MalformedXml>,
{
    let element = reader
        .read_event_into(buffer)
        .map_err(error::MalformedXml::from)?;

    let (was_empty, event) = match element {
        Event::Empty(empty) => (true, empty),
        Event::Start(start) => (false, start),
        _ => {
            let actual_event = EventSummary::new(&element);
            let unexpected = error::UnexpectedElement::new(expected_name, actual_event);
            return Err(E::from(unexpected));
        }
    };

    if event.name().as_ref() != expected_name.as_bytes() {
        let unexpected = error::UnexpectedElement::new(expected_name, EventSummary::start(&event));
        return Err(E::from(unexpected));
    }

    Ok((was_empty, event))
}

fn read_ending_element<'a, E, R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &'a mut Vec<u8>,
    expected_name: &str,
) -> Result<BytesEnd<'a>, E>
where
    E: From<error::UnexpectedElement> + From<error::MalformedXml>,
{
    let element = reader
        .read_event_into(buffer)
        .map_err(error::MalformedXml::from)?;

    let event = if let Event::End(event) = element {
        event
    } else {
        let actual_event = EventSummary::new(&element);
        let unexpected = error::UnexpectedElement::new(format!("/{expected_name}"), actual_event);
        return Err(E::from(unexpected));
    };

    if event.name().as_ref() != expected_name.as_bytes() {
        let actual_event = EventSummary::end(&event);
        let unexpected = error::UnexpectedElement::new(format!("/{expected_name}"), actual_event);
        return Err(E::from(unexpected));
    }

    Ok(event)
}

fn get_attribute_value<'a, E>(
    bytes_start: &'a BytesStart<'_>,
    attribute_key: &str,
    element_name: &str,
) -> Result<Attribute<'a>, E>
where
    E: From<error::MissingAttribute> + From<error::MalformedAttribute>,
{
    // find the `attribute_key` attribute on the `element_name` element
    for attribute in bytes_start.attributes() {
        let attribute = attribute.map_err(error::MalformedAttribute::from)?;

        if attribute.key.as_ref() == attribute_key.as_bytes() {
            return Ok(attribute);
        }
    }

    let err = error::MissingAttribute::new(element_name.into(), attribute_key.into());
    Err(E::from(err))
}

/// the unescaped value of a required attribute
fn attribute_string<E>(bytes_start: &BytesStart<'_>, attribute_key: &str, element_name: &str) -> Result<String, E>
where
    E: From<error::MissingAttribute> + From<error::MalformedAttribute> + From<error::MalformedXml>,
{
    let attribute = get_attribute_value::<E>(bytes_start, attribute_key, element_name)?;
    let value = attribute.unescape_value().map_err(error::MalformedXml::from)?;
    Ok(value.into_owned())
}

/// ensure that an attribute's value is what we expect it to be, otherwise return an error with
/// some location information
fn check_attribute_value(
    att: Attribute<'_>,
    element_name: &str,
    attribute_name: &str,
    expected_attribute_value: &str,
) -> Result<(), error::UnexpectedAttributeValue> {
    if att.value.as_ref() != expected_attribute_value.as_bytes() {
        let unexpected_value = error::UnexpectedAttributeValue {
            element_name: element_name.into(),
            attribute_name: attribute_name.into(),
            expected_value: expected_attribute_value.into(),
            actual_value: error::ParsedNameOrBytes::from(att.value),
        };

        Err(unexpected_value)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Result<RawGrid, LoadError> {
        parse_xml_grid(Reader::from_str(xml))
    }

    const SMALL_GRID: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GridFile version="1.0">
    <Dimensions>
        <Dimension name="x" length="2"/>
        <Dimension name="y" length="3"/>
    </Dimensions>
    <Attributes>
        <Attribute name="geometry" value="toroidal"/>
        <Attribute name="version" value="1.5"/>
        <Attribute name="label" value="2" type="text"/>
    </Attributes>
    <Variables>
        <Variable name="g11" dims="x y" format="ascii">
            0 1 2
            10 11 NaN
        </Variable>
        <Variable name="MXG" dims="" format="ascii">2</Variable>
        <Variable name="dy" dims="y" format="binary">AAAAAAAA8D8AAAAAAAAAQAAAAAAAAAhA</Variable>
    </Variables>
</GridFile>
"#;

    #[test]
    fn parse_small_grid() {
        let grid = parse(SMALL_GRID).unwrap();

        assert_eq!(grid.dimensions().get("x"), Some(&2));
        assert_eq!(grid.dimensions().get("y"), Some(&3));

        assert_eq!(grid.attributes().get("geometry"), Some(&AttrValue::from("toroidal")));
        assert_eq!(grid.attributes().get("version"), Some(&AttrValue::Number(1.5)));
        assert_eq!(grid.attributes().get("label"), Some(&AttrValue::from("2")));

        let g11 = grid.variable("g11").unwrap();
        assert_eq!(g11.dims(), &["x".to_string(), "y".to_string()]);
        assert_eq!(g11.data().shape(), &[2, 3]);
        assert_eq!(g11.data()[[1, 1]], 11.0);
        assert!(g11.data()[[1, 2]].is_nan());

        let mxg = grid.variable("MXG").unwrap();
        assert_eq!(mxg.data().ndim(), 0);
        assert_eq!(mxg.data().iter().next(), Some(&2.0));

        let dy = grid.variable("dy").unwrap();
        assert_eq!(dy.data().iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_sections() {
        let grid = parse("<GridFile><Dimensions/><Attributes/><Variables/></GridFile>").unwrap();
        assert_eq!(grid, RawGrid::new());
    }

    #[test]
    fn value_count_must_match_dimensions() {
        let xml = r#"<GridFile>
            <Dimensions><Dimension name="x" length="3"/></Dimensions>
            <Attributes/>
            <Variables><Variable name="dx" dims="x" format="ascii">1 2</Variable></Variables>
        </GridFile>"#;

        let err = parse(xml).unwrap_err();
        assert!(matches!(err, LoadError::Body(Body::Layout(Layout::ShapeMismatch(_)))));
    }

    #[test]
    fn declared_shape_too_large() {
        let xml = r#"<GridFile>
            <Dimensions>
                <Dimension name="x" length="18446744073709551615"/>
                <Dimension name="y" length="4294967296"/>
            </Dimensions>
            <Attributes/>
            <Variables><Variable name="g11" dims="x y" format="ascii">1 2</Variable></Variables>
        </GridFile>"#;

        let err = parse(xml).unwrap_err();
        assert!(matches!(err, LoadError::Body(Body::Layout(Layout::TooLarge(_)))));
    }

    #[test]
    fn undeclared_dimension() {
        let xml = r#"<GridFile>
            <Dimensions/>
            <Attributes/>
            <Variables><Variable name="dx" dims="x" format="ascii">1 2</Variable></Variables>
        </GridFile>"#;

        let err = parse(xml).unwrap_err();
        assert!(matches!(err, LoadError::Body(Body::Layout(Layout::UndeclaredDimension(_)))));
    }

    #[test]
    fn wrong_root_element() {
        let err = parse("<VTKFile></VTKFile>").unwrap_err();
        assert!(matches!(err, LoadError::Header(Header::UnexpectedElement(_))));

        let err = parse("").unwrap_err();
        assert!(matches!(err, LoadError::Header(Header::UnexpectedElement(_))));
    }

    #[test]
    fn unknown_variable_format() {
        let xml = r#"<GridFile><Dimensions/><Attributes/><Variables>
            <Variable name="a" dims="" format="hex">ff</Variable>
        </Variables></GridFile>"#;

        let err = parse(xml).unwrap_err();
        assert!(matches!(err, LoadError::Body(Body::UnexpectedAttributeValue(_))));
    }

    #[test]
    fn bad_number() {
        let xml = r#"<GridFile><Dimensions/><Attributes/><Variables>
            <Variable name="a" dims="" format="ascii">two</Variable>
        </Variables></GridFile>"#;

        let err = parse(xml).unwrap_err();
        assert!(matches!(err, LoadError::Body(Body::InvalidNumber(_))));
    }

    #[test]
    fn engine_from_extension() {
        assert_eq!(Engine::from_path(Path::new("grid.xml")).unwrap(), Engine::Xml);
        assert_eq!(Engine::from_path(Path::new("grid.GRD")).unwrap(), Engine::Xml);
        #[cfg(feature = "json")]
        assert_eq!(Engine::from_path(Path::new("a/b/grid.json")).unwrap(), Engine::Json);

        assert!(matches!(
            Engine::from_path(Path::new("grid.nc")),
            Err(LoadError::UnknownFormat(_))
        ));
        assert!(matches!(
            Engine::from_path(Path::new("grid")),
            Err(LoadError::UnknownFormat(_))
        ));
    }

    #[test]
    fn unknown_format_is_the_error_source() {
        let err = Engine::from_path(Path::new("grid.nc")).unwrap_err();

        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("grid.nc"));
        assert!(err.to_string().contains("pass an engine explicitly"));
    }

    #[test]
    fn builder_declares_dimensions() {
        let grid = RawGrid::new()
            .with_variable("dx", &["x"], ndarray::Array1::zeros(4).into_dyn())
            .unwrap();
        assert_eq!(grid.dimensions().get("x"), Some(&4));

        let err = grid
            .with_variable("dy", &["x"], ndarray::Array1::zeros(5).into_dyn())
            .unwrap_err();
        assert!(matches!(err, Layout::LengthConflict(_)));
    }

    #[test]
    fn drop_dims_and_convert() {
        let grid = RawGrid::new()
            .with_variable("dx", &["x"], ndarray::Array1::zeros(4).into_dyn())
            .unwrap()
            .with_variable("w", &["x", "w"], ndarray::Array2::zeros((4, 2)).into_dyn())
            .unwrap();

        assert!(matches!(
            grid.clone().into_dataset(),
            Err(crate::Error::Load(LoadError::Layout(Layout::UnrecognizedDimension(_))))
        ));

        let unrecognized: BTreeSet<String> = ["w".to_string()].into_iter().collect();
        let grid = grid.drop_dims(&unrecognized);
        assert!(!grid.dimension_names().contains("w"));

        let dataset = grid.into_dataset().unwrap();
        assert_eq!(dataset.len_of(Dim::X), Some(4));
        assert!(dataset.variable("w").is_none());
    }
}
