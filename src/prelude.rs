//! Common types that are useful for opening and fusing grid files

pub use crate::dataset::{AttrValue, Dataset, Dim, MetaValue, Metadata, Variable};
pub use crate::geometry::{CoordinateNames, Geometry, GeometryRegistry};
pub use crate::{open_grid, open_grid_dataset, OpenOptions, OpenedGrid, Warning};
pub use crate::{write_grid, write_grid_file, Encoding, Engine, RawGrid};
pub use crate::{Error, GeometryMetadata};
