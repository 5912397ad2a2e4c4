use super::{cumulative_coordinate, insert_axis_coordinate, toroidal_angle};
use super::{CoordinateNames, Geometry};
use crate::dataset::{Dataset, Dim};

/// Coordinates of a straight cylinder: radius along `x` and axial position along `y`,
/// both accumulated from the cell widths `dx` and `dy`, and the azimuthal angle along
/// `z` from `ZMIN` and `ZMAX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cylindrical;

impl Geometry for Cylindrical {
    fn name(&self) -> &'static str {
        "cylindrical"
    }

    fn default_coordinates(&self) -> CoordinateNames {
        CoordinateNames::new("r", "z", "theta")
    }

    fn apply(&self, mut dataset: Dataset, names: &CoordinateNames) -> crate::Result<Dataset> {
        if let Some(radius) = cumulative_coordinate(&dataset, Dim::X, "dx") {
            insert_axis_coordinate(&mut dataset, &names.x, Dim::X, radius)?;
        }

        if let Some(axial) = cumulative_coordinate(&dataset, Dim::Y, "dy") {
            insert_axis_coordinate(&mut dataset, &names.y, Dim::Y, axial)?;
        }

        if let Some(angle) = toroidal_angle(&dataset) {
            insert_axis_coordinate(&mut dataset, &names.z, Dim::Z, angle)?;
        }

        Ok(dataset)
    }
}
