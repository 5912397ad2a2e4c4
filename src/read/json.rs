//! the json grid format
//!
//! ```json
//! {
//!   "dimensions": {"x": 2, "y": 3},
//!   "attributes": {"geometry": "toroidal"},
//!   "variables": {
//!     "g11": {"dims": ["x", "y"], "data": [0, 1, 2, 10, 11, null]},
//!     "MXG": {"dims": [], "data": 2}
//!   }
//! }
//! ```
//!
//! `null` values are read as NaN.

use super::{LoadError, RawGrid, RawVariable};
use crate::dataset::{AttrValue, Attributes};

use serde::Deserialize;

use std::collections::BTreeMap;
use std::io::Read;

#[derive(Deserialize)]
struct GridDocument {
    #[serde(default)]
    dimensions: BTreeMap<String, usize>,
    #[serde(default)]
    attributes: BTreeMap<String, JsonAttribute>,
    #[serde(default)]
    variables: BTreeMap<String, JsonVariable>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonAttribute {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
struct JsonVariable {
    #[serde(default)]
    dims: Vec<String>,
    data: JsonValues,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonValues {
    Scalar(Option<f64>),
    Flat(Vec<Option<f64>>),
}

impl JsonValues {
    fn into_values(self) -> Vec<f64> {
        let nan = |value: Option<f64>| value.unwrap_or(f64::NAN);

        match self {
            JsonValues::Scalar(value) => vec![nan(value)],
            JsonValues::Flat(values) => values.into_iter().map(nan).collect(),
        }
    }
}

pub(super) fn parse_json_grid<R: Read>(reader: R) -> Result<RawGrid, LoadError> {
    let document: GridDocument = serde_json::from_reader(reader)?;

    let attributes: Attributes = document
        .attributes
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                JsonAttribute::Number(number) => AttrValue::Number(number),
                JsonAttribute::Text(text) => AttrValue::Text(text),
            };
            (key, value)
        })
        .collect();

    let mut variables = BTreeMap::new();

    for (name, variable) in document.variables {
        let raw = RawVariable::from_values(
            &name,
            variable.dims,
            variable.data.into_values(),
            &document.dimensions,
        )?;
        variables.insert(name, raw);
    }

    Ok(RawGrid {
        dimensions: document.dimensions,
        attributes,
        variables,
    })
}
