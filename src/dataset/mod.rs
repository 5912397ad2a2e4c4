//! # Labelled datasets
//!
//! A [`Dataset`] is a collection of named [`Variable`]s whose axes are labelled by one
//! of the four simulation dimensions `t`, `x`, `y`, `z` ([`Dim`]). Variables are either
//! field arrays or zero-dimensional scalar constants. Alongside the variables a dataset
//! holds coordinate variables, free-form attributes, a [`Metadata`] record (present on
//! datasets assembled from simulation output) and, once fused with a grid file, the
//! grid's [`GeometryMetadata`](crate::GeometryMetadata).
//!
//! Every operation here returns a new dataset; inputs are never modified in place.

mod combine;
mod variable;

pub use variable::Variable;

use crate::metadata::GeometryMetadata;
use crate::utils;
use crate::{InvalidScalar, MissingMetadata};

use derive_more::From;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// The dimensions a simulation variable may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dim {
    T,
    X,
    Y,
    Z,
}

impl Dim {
    pub const ALL: [Dim; 4] = [Dim::T, Dim::X, Dim::Y, Dim::Z];

    /// the name used for this dimension in grid files
    pub fn name(&self) -> &'static str {
        match self {
            Dim::T => "t",
            Dim::X => "x",
            Dim::Y => "y",
            Dim::Z => "z",
        }
    }

    /// parse a dimension name as found in a grid file. `time` is accepted as an
    /// alias of `t`.
    pub fn from_name(name: &str) -> Option<Dim> {
        match name {
            "t" | "time" => Some(Dim::T),
            "x" => Some(Dim::X),
            "y" => Some(Dim::Y),
            "z" => Some(Dim::Z),
            _ => None,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a dataset or variable attribute
#[derive(Debug, Clone, PartialEq, From)]
pub enum AttrValue {
    Text(String),
    Number(f64),
}

impl From<&str> for AttrValue {
    fn from(x: &str) -> Self {
        Self::Text(x.into())
    }
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

pub type Attributes = BTreeMap<String, AttrValue>;

/// A single entry of a [`Metadata`] record
#[derive(Debug, Clone, PartialEq, From)]
pub enum MetaValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl From<&str> for MetaValue {
    fn from(x: &str) -> Self {
        Self::Text(x.into())
    }
}

/// Scalar bookkeeping recorded by the simulation when a dataset was assembled:
/// guard-cell widths (`MXG`, `MYG`), whether y-boundary cells were kept
/// (`keep_yboundaries`), processor counts and so on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    values: BTreeMap<String, MetaValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// builder-style insert
    pub fn with<K: Into<String>, V: Into<MetaValue>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<K: Into<String>, V: Into<MetaValue>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// numeric value of `key`, booleans count as 0 / 1
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            MetaValue::Int(value) => Some(*value as f64),
            MetaValue::Float(value) => Some(*value),
            MetaValue::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            MetaValue::Text(_) => None,
        }
    }

    /// a required non-negative integer entry such as a guard-cell width
    pub fn width(&self, key: &str) -> crate::Result<usize> {
        match self.values.get(key) {
            Some(MetaValue::Int(value)) => usize::try_from(*value)
                .map_err(|_| InvalidScalar::new(key.into(), *value as f64, "a non-negative integer").into()),
            Some(MetaValue::Float(value)) => utils::width(key, *value),
            Some(_) => Err(InvalidScalar::new(key.into(), f64::NAN, "a non-negative integer").into()),
            None => Err(MissingMetadata::new(key.into(), "dataset metadata").into()),
        }
    }

    /// a required boolean entry. Integers are accepted the way the simulation
    /// writes flags: zero is false, anything else true.
    pub fn flag(&self, key: &str) -> crate::Result<bool> {
        match self.values.get(key) {
            Some(MetaValue::Bool(value)) => Ok(*value),
            Some(MetaValue::Int(value)) => Ok(*value != 0),
            Some(MetaValue::Float(value)) => Ok(*value != 0.0),
            Some(MetaValue::Text(_)) => Err(InvalidScalar::new(key.into(), f64::NAN, "a boolean").into()),
            None => Err(MissingMetadata::new(key.into(), "dataset metadata").into()),
        }
    }

    /// add every entry of `other` whose key is not already present
    pub(crate) fn extend_missing(&mut self, other: Metadata) {
        for (key, value) in other.values {
            self.values.entry(key).or_insert(value);
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum DatasetError {
    #[error("variable was given {dims} dimension names for an array with {axes} axes")]
    AxisCount { dims: usize, axes: usize },
    #[error("dimension `{dim}` appears more than once on a variable")]
    RepeatedDimension { dim: Dim },
    #[error("variable `{name}` has length {actual} along `{dim}` but the dataset has length {expected}")]
    DimensionSizeConflict {
        name: String,
        dim: Dim,
        expected: usize,
        actual: usize,
    },
    #[error("no variable depends on dimension `{dim}`")]
    MissingDimension { dim: Dim },
    #[error("cannot select {start}..{end} along `{dim}` with length {len}")]
    SliceOutOfBounds {
        dim: Dim,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("cannot concatenate `{name}`: {reason}")]
    ConcatConflict { name: String, reason: &'static str },
    #[error("conflicting values for variable `{name}` while merging")]
    MergeConflict { name: String },
}

/// A labelled collection of variables sharing the dimensions `t`, `x`, `y`, `z`
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    variables: BTreeMap<String, Variable>,
    coords: BTreeMap<String, Variable>,
    attrs: Attributes,
    metadata: Metadata,
    grid: Option<Arc<GeometryMetadata>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// builder-style [`insert_variable`](Self::insert_variable)
    pub fn with_variable<N: Into<String>>(mut self, name: N, variable: Variable) -> Result<Self, DatasetError> {
        self.insert_variable(name, variable)?;
        Ok(self)
    }

    /// add or replace a data variable, checking its lengths agree with the
    /// lengths already in the dataset
    pub fn insert_variable<N: Into<String>>(&mut self, name: N, variable: Variable) -> Result<(), DatasetError> {
        let name = name.into();
        self.check_sizes(&name, &variable)?;
        self.variables.insert(name, variable);
        Ok(())
    }

    /// add or replace a coordinate variable
    pub fn insert_coord<N: Into<String>>(&mut self, name: N, variable: Variable) -> Result<(), DatasetError> {
        let name = name.into();
        self.check_sizes(&name, &variable)?;
        self.coords.insert(name, variable);
        Ok(())
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    pub fn with_attr<K: Into<String>, V: Into<AttrValue>>(mut self, key: K, value: V) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn set_attr<K: Into<String>, V: Into<AttrValue>>(&mut self, key: K, value: V) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn coord(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name)
    }

    /// true if `name` is a data variable or a coordinate
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name) || self.coords.contains_key(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn coords(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.coords.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// constants of the grid file this dataset was fused with
    pub fn grid_metadata(&self) -> Option<&GeometryMetadata> {
        self.grid.as_deref()
    }

    pub(crate) fn grid_arc(&self) -> Option<Arc<GeometryMetadata>> {
        self.grid.clone()
    }

    /// value of a zero-dimensional data variable
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.variables.get(name).and_then(Variable::scalar_value)
    }

    /// length of every dimension used by a variable or coordinate
    pub fn sizes(&self) -> BTreeMap<Dim, usize> {
        let mut sizes = BTreeMap::new();

        for var in self.variables.values().chain(self.coords.values()) {
            for (dim, len) in var.dims().iter().zip(var.shape()) {
                sizes.entry(*dim).or_insert(*len);
            }
        }

        sizes
    }

    pub fn dims(&self) -> BTreeSet<Dim> {
        self.sizes().into_keys().collect()
    }

    pub fn len_of(&self, dim: Dim) -> Option<usize> {
        self.variables
            .values()
            .chain(self.coords.values())
            .find_map(|var| var.len_of(dim))
    }

    /// remove data variables by name, names that are not present are ignored
    pub fn drop_vars<'a, I: IntoIterator<Item = &'a str>>(mut self, names: I) -> Dataset {
        for name in names {
            self.variables.remove(name);
        }
        self
    }

    /// split the zero-dimensional data variables out of the dataset
    pub fn split_scalars(self) -> (Dataset, BTreeMap<String, f64>) {
        let Dataset {
            variables,
            coords,
            attrs,
            metadata,
            grid,
        } = self;

        let (scalars, arrays): (BTreeMap<String, Variable>, BTreeMap<String, Variable>) =
            variables.into_iter().partition(|(_, var)| var.is_scalar());

        let scalars = scalars
            .into_iter()
            .filter_map(|(name, var)| var.scalar_value().map(|value| (name, value)))
            .collect();

        let dataset = Dataset {
            variables: arrays,
            coords,
            attrs,
            metadata,
            grid,
        };

        (dataset, scalars)
    }

    /// attach the grid constants to the dataset and to every variable and coordinate in it
    pub fn with_grid_metadata(self, grid: Arc<GeometryMetadata>) -> Dataset {
        let attach = |vars: BTreeMap<String, Variable>| -> BTreeMap<String, Variable> {
            vars.into_iter()
                .map(|(name, var)| (name, var.with_grid(Some(grid.clone()))))
                .collect()
        };

        let variables = attach(self.variables);
        let coords = attach(self.coords);

        Dataset {
            variables,
            coords,
            attrs: self.attrs,
            metadata: self.metadata,
            grid: Some(grid),
        }
    }

    /// same variables, coordinates, attributes and metadata. Values are compared with
    /// NaN equal to NaN.
    pub fn identical(&self, other: &Dataset) -> bool {
        fn same(a: &BTreeMap<String, Variable>, b: &BTreeMap<String, Variable>) -> bool {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((na, va), (nb, vb))| na == nb && va.identical(vb))
        }

        same(&self.variables, &other.variables)
            && same(&self.coords, &other.coords)
            && self.attrs == other.attrs
            && self.metadata == other.metadata
            && self.grid == other.grid
    }

    fn check_sizes(&self, name: &str, variable: &Variable) -> Result<(), DatasetError> {
        for (dim, actual) in variable.dims().iter().zip(variable.shape()) {
            let existing = self
                .variables
                .iter()
                .chain(self.coords.iter())
                .filter(|(other, _)| other.as_str() != name)
                .find_map(|(_, var)| var.len_of(*dim));

            if let Some(expected) = existing {
                if expected != *actual {
                    return Err(DatasetError::DimensionSizeConflict {
                        name: name.into(),
                        dim: *dim,
                        expected,
                        actual: *actual,
                    });
                }
            }
        }

        Ok(())
    }
}
