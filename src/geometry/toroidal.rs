use super::{cumulative_coordinate, index_coordinate, insert_axis_coordinate, toroidal_angle};
use super::{CoordinateNames, Geometry};
use crate::dataset::{Dataset, Dim};

/// Flux coordinates of a tokamak grid.
///
/// * `x`: poloidal flux, from `psixy` at the first y index
/// * `y`: poloidal angle, from the cumulative cell widths `dy` at the first x index
/// * `z`: toroidal angle, from `ZMIN` and `ZMAX`
///
/// The cylindrical positions `Rxy` and `Zxy`, when present, are turned into the
/// two-dimensional coordinates `R` and `Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Toroidal;

impl Geometry for Toroidal {
    fn name(&self) -> &'static str {
        "toroidal"
    }

    fn default_coordinates(&self) -> CoordinateNames {
        CoordinateNames::new("psi", "theta", "zeta")
    }

    fn apply(&self, mut dataset: Dataset, names: &CoordinateNames) -> crate::Result<Dataset> {
        if let Some(nx) = dataset.len_of(Dim::X) {
            let psi = dataset
                .variable("psixy")
                .and_then(|psixy| psixy.profile(Dim::X))
                .unwrap_or_else(|| index_coordinate(nx));

            insert_axis_coordinate(&mut dataset, &names.x, Dim::X, psi)?;
        }

        if let Some(theta) = cumulative_coordinate(&dataset, Dim::Y, "dy") {
            insert_axis_coordinate(&mut dataset, &names.y, Dim::Y, theta)?;
        }

        if let Some(zeta) = toroidal_angle(&dataset) {
            insert_axis_coordinate(&mut dataset, &names.z, Dim::Z, zeta)?;
        }

        for (source, target) in [("Rxy", "R"), ("Zxy", "Z")] {
            if dataset.contains(target) {
                continue;
            }

            if let Some(position) = dataset.remove_variable(source) {
                dataset.insert_coord(target, position)?;
            }
        }

        Ok(dataset)
    }
}
