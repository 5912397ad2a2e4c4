#![doc = include_str!("../README.md")]

pub mod dataset;
pub mod fuse;
pub mod geometry;
mod grid;
pub mod loader;
mod metadata;
pub mod prelude;
pub mod read;
pub mod trim;
mod utils;
mod write_grid;

pub use dataset::{AttrValue, Attributes, Dataset, DatasetError, Dim, MetaValue, Metadata, Variable};
pub use geometry::{CoordinateNames, Cylindrical, Geometry, GeometryRegistry, Toroidal};
pub use grid::{open_grid, open_grid_dataset, OpenOptions, OpenedGrid};
pub use metadata::GeometryMetadata;
pub use loader::LoadedGrid;
pub use read::{Engine, LoadError, RawGrid, RawVariable};
pub use trim::{BoundaryPolicy, TargetGuards, Topology, TopologyDescriptor};
pub use write_grid::{write_grid, write_grid_file, Encoding};

pub use ndarray;

pub use quick_xml::Reader;
pub use quick_xml::Writer;

use derive_more::{Constructor, Display, From};
use std::fmt;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug, From)]
pub enum Error {
    #[error("An io error occured: `{0}`")]
    Io(std::io::Error),
    #[error("Could not load grid file: {0}")]
    Load(#[source] LoadError),
    #[error("Could not combine datasets: {0}")]
    Dataset(#[source] DatasetError),
    #[error("{0}")]
    TopologyMismatch(TopologyMismatch),
    #[error("{0}")]
    UnknownGeometry(geometry::UnknownGeometry),
    #[error("{0}")]
    InvalidCoordinateNames(geometry::InvalidCoordinateNames),
    #[error("{0}")]
    CoordinateNameConflict(geometry::CoordinateNameConflict),
    #[error("{0}")]
    MissingMetadata(MissingMetadata),
    #[error("{0}")]
    InvalidScalar(InvalidScalar),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(quick_xml::Error),
}

/// The grid still carries y-boundary cells but the dataset it is being fused into
/// was built without them.
#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(
    fmt = "grid has {y_boundary_guards} y-boundary guard cells but the target dataset was not built with y-boundary cells kept"
)]
pub struct TopologyMismatch {
    pub y_boundary_guards: usize,
}

#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "missing required entry `{key}` in {record}")]
pub struct MissingMetadata {
    pub key: String,
    pub record: &'static str,
}

/// a scalar constant that must be an integer (guard width, separatrix index) was not
#[derive(Display, Debug, Constructor, Clone, PartialEq)]
#[display(fmt = "scalar `{name}` has value {value}, expected {expected}")]
pub struct InvalidScalar {
    pub name: String,
    pub value: f64,
    pub expected: &'static str,
}

/// Advisory conditions raised while opening a grid. None of these stop the pipeline;
/// each one is logged at `warn` level and handed back to the caller in
/// [`OpenedGrid::warnings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Variables depending on these dimensions were dropped while loading
    UnrecognizedDimensions(Vec<String>),
    /// No geometry was given or recorded, so no coordinates were added
    NoGeometry,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedDimensions(dims) => write!(
                f,
                "will drop all variables containing the dimensions {{{}}} because they are not recognised",
                dims.join(", ")
            ),
            Self::NoGeometry => write!(f, "no geometry type found, no coordinates will be added"),
        }
    }
}

impl Warning {
    /// emit the warning through the `log` facade
    pub(crate) fn emit(self) -> Self {
        log::warn!("{self}");
        self
    }
}
