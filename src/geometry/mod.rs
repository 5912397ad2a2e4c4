//! # Geometries
//!
//! A [`Geometry`] turns the fields of a fused grid into physical coordinates along the
//! `x`, `y` and `z` dimensions. Geometries are looked up by name in a
//! [`GeometryRegistry`], which is assembled once up front and only read afterwards:
//!
//! ```
//! use bout_grid::GeometryRegistry;
//!
//! let registry = GeometryRegistry::builtin();
//! assert_eq!(registry.names().collect::<Vec<_>>(), vec!["cylindrical", "toroidal"]);
//! ```
//!
//! To add coordinates for another kind of grid, implement [`Geometry`] and register
//! it with [`GeometryRegistry::with_geometry`].

mod cylindrical;
mod toroidal;

pub use cylindrical::Cylindrical;
pub use toroidal::Toroidal;

use crate::dataset::{AttrValue, Dataset, Dim, Variable};
use crate::Warning;

use derive_more::{Constructor, Display};
use ndarray::Array1;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builds the physical coordinates of one kind of grid
pub trait Geometry: Send + Sync {
    /// the identifier the geometry is registered and recorded under
    fn name(&self) -> &'static str;

    /// coordinate names used when the caller does not give any
    fn default_coordinates(&self) -> CoordinateNames;

    /// Add coordinates called `names` to `dataset`.
    ///
    /// Only coordinates are added; data variables may be moved to coordinates but
    /// their values are never changed.
    fn apply(&self, dataset: Dataset, names: &CoordinateNames) -> crate::Result<Dataset>;
}

/// Names of the physical coordinates along `x`, `y` and `z`, in that order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateNames {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl CoordinateNames {
    pub fn new<X: Into<String>, Y: Into<String>, Z: Into<String>>(x: X, y: Y, z: Z) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    /// exactly three distinct names
    pub fn from_slice<S: AsRef<str>>(names: &[S]) -> Result<Self, InvalidCoordinateNames> {
        let owned: Vec<String> = names.iter().map(|name| name.as_ref().to_string()).collect();

        match owned.as_slice() {
            [x, y, z] if x != y && y != z && x != z => Ok(Self::new(x.as_str(), y.as_str(), z.as_str())),
            _ => Err(InvalidCoordinateNames::new(owned)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [self.x.as_str(), self.y.as_str(), self.z.as_str()].into_iter()
    }
}

/// A fixed mapping from geometry identifiers to the geometries that build their
/// coordinates
#[derive(Clone)]
pub struct GeometryRegistry {
    geometries: BTreeMap<&'static str, Arc<dyn Geometry>>,
}

impl GeometryRegistry {
    /// a registry that knows no geometries
    pub fn empty() -> Self {
        Self {
            geometries: BTreeMap::new(),
        }
    }

    /// the `toroidal` and `cylindrical` geometries
    pub fn builtin() -> Self {
        Self::empty().with_geometry(Toroidal).with_geometry(Cylindrical)
    }

    /// register `geometry` under its name, replacing any geometry of the same name
    pub fn with_geometry<G: Geometry + 'static>(mut self, geometry: G) -> Self {
        self.geometries.insert(geometry.name(), Arc::new(geometry));
        self
    }

    pub fn get(&self, name: &str) -> Result<&dyn Geometry, UnknownGeometry> {
        self.geometries
            .get(name)
            .map(|geometry| geometry.as_ref())
            .ok_or_else(|| UnknownGeometry::new(name.into(), self.names().collect::<Vec<_>>().join(", ")))
    }

    /// registered identifiers in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.geometries.keys().copied()
    }

    /// Add the coordinates of the geometry called `name` to `dataset`.
    ///
    /// `coordinates` overrides the geometry's default coordinate names. Afterwards the
    /// dataset's `geometry` attribute records `name`, and the new coordinates carry the
    /// same grid constants as the rest of the dataset.
    pub fn apply_geometry(
        &self,
        dataset: Dataset,
        name: &str,
        coordinates: Option<&[String]>,
    ) -> crate::Result<Dataset> {
        let geometry = self.get(name)?;

        let names = match coordinates {
            Some(coordinates) => CoordinateNames::from_slice(coordinates)?,
            None => geometry.default_coordinates(),
        };

        if let Some(taken) = names.iter().find(|coord| dataset.variable(coord).is_some()) {
            return Err(CoordinateNameConflict::new(taken.into()).into());
        }

        log::debug!("adding {name} coordinates {}, {}, {}", names.x, names.y, names.z);

        let mut dataset = geometry.apply(dataset, &names)?;
        dataset.set_attr("geometry", name);

        Ok(match dataset.grid_arc() {
            Some(grid) => dataset.with_grid_metadata(grid),
            None => dataset,
        })
    }
}

impl Default for GeometryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for GeometryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "unknown geometry `{name}`, registered geometries are: {known}")]
pub struct UnknownGeometry {
    pub name: String,
    pub known: String,
}

#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "expected 3 distinct coordinate names for the x, y and z directions, got {names:?}")]
pub struct InvalidCoordinateNames {
    pub names: Vec<String>,
}

#[derive(Display, Debug, Constructor, Clone, PartialEq, Eq)]
#[display(fmt = "cannot add coordinate `{name}`, a data variable of that name already exists")]
pub struct CoordinateNameConflict {
    pub name: String,
}

/// the explicit identifier if there is one, otherwise the dataset's `geometry` attribute
pub fn resolve_geometry(dataset: &Dataset, explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| dataset.attr("geometry").and_then(AttrValue::as_str).map(str::to_string))
}

/// Resolve the geometry of `dataset` and add its coordinates.
///
/// When no geometry can be resolved the dataset is returned unchanged, together with
/// a [`Warning::NoGeometry`] unless `quiet` is set.
pub fn dispatch_geometry(
    dataset: Dataset,
    geometry: Option<&str>,
    coordinates: Option<&[String]>,
    quiet: bool,
    registry: &GeometryRegistry,
) -> crate::Result<(Dataset, Option<Warning>)> {
    match resolve_geometry(&dataset, geometry) {
        Some(name) => Ok((registry.apply_geometry(dataset, &name, coordinates)?, None)),
        None if quiet => Ok((dataset, None)),
        None => Ok((dataset, Some(Warning::NoGeometry.emit()))),
    }
}

/// a grid constant, looked up in the grid metadata first and the simulation metadata second
pub(crate) fn grid_constant(dataset: &Dataset, name: &str) -> Option<f64> {
    dataset
        .grid_metadata()
        .and_then(|grid| grid.get(name))
        .or_else(|| dataset.metadata().number(name))
        .or_else(|| dataset.scalar(name))
}

/// positions of the centres of consecutive cells of the given widths, starting at 0
pub(crate) fn cell_centres(widths: &Array1<f64>) -> Array1<f64> {
    let mut total = 0.0;

    widths
        .iter()
        .map(|width| {
            let centre = total + 0.5 * width;
            total += width;
            centre
        })
        .collect()
}

/// `0, 1, 2, ...` for `len` points
pub(crate) fn index_coordinate(len: usize) -> Array1<f64> {
    (0..len).map(|i| i as f64).collect()
}

/// Coordinate along `dim` from the cumulative cell widths stored in the variable
/// `widths`, or the plain index if the grid has no such variable.
pub(crate) fn cumulative_coordinate(dataset: &Dataset, dim: Dim, widths: &str) -> Option<Array1<f64>> {
    let len = dataset.len_of(dim)?;

    let values = dataset
        .variable(widths)
        .and_then(|var| var.profile(dim))
        .map(|widths| cell_centres(&widths))
        .unwrap_or_else(|| index_coordinate(len));

    Some(values)
}

/// The toroidal angle along `z`, spanning `2π * [ZMIN, ZMAX)` in units of a full turn
/// (a full turn when neither is set).
pub(crate) fn toroidal_angle(dataset: &Dataset) -> Option<Array1<f64>> {
    let nz = dataset.len_of(Dim::Z)?;

    let zmin = grid_constant(dataset, "ZMIN").unwrap_or(0.0);
    let zmax = grid_constant(dataset, "ZMAX").unwrap_or(1.0);
    let turn = 2.0 * std::f64::consts::PI;

    let values = (0..nz)
        .map(|k| turn * (zmin + (zmax - zmin) * k as f64 / nz as f64))
        .collect();

    Some(values)
}

/// insert a one-dimensional coordinate along `dim`
pub(crate) fn insert_axis_coordinate(
    dataset: &mut Dataset,
    name: &str,
    dim: Dim,
    values: Array1<f64>,
) -> crate::Result<()> {
    let variable = Variable::new(vec![dim], values.into_dyn())?;
    dataset.insert_coord(name, variable)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    fn dataset() -> Dataset {
        let f = Array3::<f64>::zeros((4, 6, 8));
        let dy = Array2::from_elem((4, 6), 0.5);

        Dataset::new()
            .with_variable("n", Variable::new(vec![Dim::X, Dim::Y, Dim::Z], f.into_dyn()).unwrap())
            .unwrap()
            .with_variable("dy", Variable::new(vec![Dim::X, Dim::Y], dy.into_dyn()).unwrap())
            .unwrap()
    }

    /// records that it was applied, without adding anything
    struct Slab;

    impl Geometry for Slab {
        fn name(&self) -> &'static str {
            "slab"
        }

        fn default_coordinates(&self) -> CoordinateNames {
            CoordinateNames::new("a", "b", "c")
        }

        fn apply(&self, dataset: Dataset, _: &CoordinateNames) -> crate::Result<Dataset> {
            Ok(dataset.with_attr("applied", "slab"))
        }
    }

    #[test]
    fn coordinate_name_count() {
        assert!(CoordinateNames::from_slice(&["a", "b", "c"]).is_ok());
        assert!(CoordinateNames::from_slice(&["a", "b"]).is_err());
        assert!(CoordinateNames::from_slice(&["a", "b", "c", "d"]).is_err());
        assert!(CoordinateNames::from_slice(&["a", "b", "a"]).is_err());
    }

    #[test]
    fn unknown_geometry() {
        let registry = GeometryRegistry::builtin();
        let err = registry.apply_geometry(dataset(), "spherical", None).unwrap_err();
        assert!(matches!(err, crate::Error::UnknownGeometry(g) if g.name == "spherical"));
    }

    #[test]
    fn custom_geometry() {
        let registry = GeometryRegistry::empty().with_geometry(Slab);
        let out = registry.apply_geometry(dataset(), "slab", None).unwrap();

        assert_eq!(out.attr("applied").and_then(|a| a.as_str()), Some("slab"));
        assert_eq!(out.attr("geometry").and_then(|a| a.as_str()), Some("slab"));
        assert_eq!(format!("{registry:?}"), "{\"slab\"}");
    }

    #[test]
    fn override_count_is_checked() {
        let registry = GeometryRegistry::builtin();
        let names = vec!["r".to_string(), "z".to_string()];

        let err = registry.apply_geometry(dataset(), "toroidal", Some(&names)).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidCoordinateNames(_)));
    }

    #[test]
    fn coordinate_names_must_be_free() {
        let registry = GeometryRegistry::builtin();
        let names = vec!["n".to_string(), "theta".to_string(), "phi".to_string()];

        let err = registry.apply_geometry(dataset(), "toroidal", Some(&names)).unwrap_err();
        assert!(matches!(err, crate::Error::CoordinateNameConflict(c) if c.name == "n"));
    }

    #[test]
    fn explicit_geometry_wins() {
        let ds = dataset().with_attr("geometry", "cylindrical");

        assert_eq!(resolve_geometry(&ds, Some("toroidal")).as_deref(), Some("toroidal"));
        assert_eq!(resolve_geometry(&ds, None).as_deref(), Some("cylindrical"));
        assert_eq!(resolve_geometry(&dataset(), None), None);
    }

    #[test]
    fn unresolved_geometry_warns_unless_quiet() {
        let registry = GeometryRegistry::builtin();

        let (out, warning) = dispatch_geometry(dataset(), None, None, false, &registry).unwrap();
        assert_eq!(warning, Some(Warning::NoGeometry));
        assert!(out.identical(&dataset()));

        let (_, warning) = dispatch_geometry(dataset(), None, None, true, &registry).unwrap();
        assert_eq!(warning, None);
    }

    #[test]
    fn cell_centres_accumulate() {
        let widths = Array1::from(vec![1.0, 1.0, 2.0]);
        assert_eq!(cell_centres(&widths).to_vec(), vec![0.5, 1.5, 3.0]);
    }

    #[test]
    fn toroidal_angle_defaults_to_a_full_turn() {
        let angle = toroidal_angle(&dataset()).unwrap();
        assert_eq!(angle.len(), 8);
        assert_eq!(angle[0], 0.0);
        assert!((angle[4] - std::f64::consts::PI).abs() < 1e-12);
    }
}
