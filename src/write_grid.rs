use crate::dataset::AttrValue;
use crate::read::{RawGrid, RawVariable};
use crate::Error;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use std::io::Write;
use std::path::Path;

/// how the values of each variable are written inside their `Variable` element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// whitespace separated decimal numbers
    Ascii,
    /// base64 encoded little endian `f64`s
    Base64,
}

impl Encoding {
    fn to_str(&self) -> &'static str {
        match &self {
            Self::Ascii => "ascii",
            Self::Base64 => "binary",
        }
    }

    /// the encoding named by a `format` attribute
    pub(crate) fn from_format(format: &[u8]) -> Option<Self> {
        match format {
            b"ascii" => Some(Self::Ascii),
            b"binary" => Some(Self::Base64),
            _ => None,
        }
    }
}

/// Write a grid to a `Writer` as a `GridFile` xml document
///
/// ```
/// use bout_grid::{write_grid, Encoding, RawGrid};
///
/// let grid = RawGrid::new()
///     .with_attribute("geometry", "toroidal")
///     .with_variable("dx", &["x"], bout_grid::ndarray::arr1(&[0.5, 0.5]).into_dyn())
///     .unwrap();
///
/// let mut out = Vec::new();
/// write_grid(&mut out, &grid, Encoding::Ascii).unwrap();
///
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.contains(r#"<Dimension name="x" length="2"/>"#));
/// ```
pub fn write_grid<W: Write>(writer: W, grid: &RawGrid, encoding: Encoding) -> Result<(), Error> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let root = BytesStart::new("GridFile").with_attributes([("version", "1.0")]);
    writer.write_event(Event::Start(root))?;

    write_dimensions(&mut writer, grid)?;
    write_attributes(&mut writer, grid)?;

    writer.write_event(Event::Start(BytesStart::new("Variables")))?;
    for (name, variable) in grid.variables() {
        write_variable(&mut writer, name, variable, encoding)?;
    }
    writer.write_event(Event::End(BytesEnd::new("Variables")))?;

    writer.write_event(Event::End(BytesEnd::new("GridFile")))?;

    Ok(())
}

/// write a grid to a file at `path`, replacing it if it exists
pub fn write_grid_file(path: &Path, grid: &RawGrid, encoding: Encoding) -> Result<(), Error> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);

    write_grid(&mut writer, grid, encoding)?;
    writer.flush()?;

    Ok(())
}

fn write_dimensions<W: Write>(writer: &mut Writer<W>, grid: &RawGrid) -> Result<(), Error> {
    writer.write_event(Event::Start(BytesStart::new("Dimensions")))?;

    for (name, length) in grid.dimensions() {
        let length = length.to_string();
        let element = BytesStart::new("Dimension")
            .with_attributes([("name", name.as_str()), ("length", length.as_str())]);
        writer.write_event(Event::Empty(element))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Dimensions")))?;

    Ok(())
}

fn write_attributes<W: Write>(writer: &mut Writer<W>, grid: &RawGrid) -> Result<(), Error> {
    writer.write_event(Event::Start(BytesStart::new("Attributes")))?;

    for (name, value) in grid.attributes() {
        let (value, kind) = match value {
            AttrValue::Text(text) => (text.clone(), "text"),
            AttrValue::Number(number) => (ryu::Buffer::new().format(*number).to_string(), "number"),
        };

        let element = BytesStart::new("Attribute").with_attributes([
            ("name", name.as_str()),
            ("value", value.as_str()),
            ("type", kind),
        ]);
        writer.write_event(Event::Empty(element))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Attributes")))?;

    Ok(())
}

fn write_variable<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    variable: &RawVariable,
    encoding: Encoding,
) -> Result<(), Error> {
    let dims = variable.dims().join(" ");

    let header = BytesStart::new("Variable").with_attributes([
        ("name", name),
        ("dims", dims.as_str()),
        ("format", encoding.to_str()),
    ]);

    if variable.data().is_empty() {
        writer.write_event(Event::Empty(header))?;
        return Ok(());
    }

    writer.write_event(Event::Start(header))?;

    let data = match encoding {
        Encoding::Ascii => {
            let mut buffer = ryu::Buffer::new();
            let mut text = String::with_capacity(variable.data().len() * 8);

            for (idx, value) in variable.data().iter().enumerate() {
                if idx > 0 {
                    text.push(' ');
                }
                text.push_str(buffer.format(*value));
            }

            text
        }
        Encoding::Base64 => {
            let mut byte_data: Vec<u8> = Vec::with_capacity(variable.data().len() * 8);

            // convert the floats into LE bytes
            variable
                .data()
                .iter()
                .for_each(|float| byte_data.extend_from_slice(&float.to_le_bytes()));

            base64::encode(byte_data.as_slice())
        }
    };

    writer.write_event(Event::Text(BytesText::new(&data)))?;
    writer.write_event(Event::End(BytesEnd::new("Variable")))?;

    Ok(())
}
