//! Moving grid constants out of the dataset body and merging grid fields into a
//! simulation dataset

use crate::dataset::Dataset;
use crate::metadata::GeometryMetadata;

use std::sync::Arc;

/// split the zero-dimensional variables of `grid` off into a [`GeometryMetadata`] record
pub fn separate_metadata(grid: Dataset) -> (Dataset, GeometryMetadata) {
    let (arrays, scalars) = grid.split_scalars();
    (arrays, GeometryMetadata::from_scalars(scalars))
}

/// Fuse a trimmed grid with an optional simulation dataset.
///
/// The scalar constants of the grid are separated out first. Without a target the
/// remaining grid fields are the result. With a target, grid fields whose name the
/// target already uses are discarded, since the target's copy may have been
/// normalised by the simulation, and the rest are merged into the target.
///
/// Every variable and coordinate of the result, including those that came from the
/// target, carries the grid constants (see [`Variable::grid_metadata`](crate::Variable::grid_metadata)).
pub fn fuse(grid: Dataset, target: Option<Dataset>) -> crate::Result<Dataset> {
    let (grid, metadata) = separate_metadata(grid);

    log::debug!("separated {} grid constants", metadata.len());

    let fused = match target {
        None => grid,
        Some(target) => {
            let collisions: Vec<String> = grid
                .variable_names()
                .filter(|name| target.contains(name))
                .map(str::to_string)
                .collect();

            if !collisions.is_empty() {
                log::debug!("keeping the dataset's copy of {}", collisions.join(", "));
            }

            let grid = grid.drop_vars(collisions.iter().map(String::as_str));
            target.merge(grid)?
        }
    };

    Ok(fused.with_grid_metadata(Arc::new(metadata)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetError, Dim, Metadata, Variable};
    use ndarray::{Array1, Array2};

    fn field(nx: usize, ny: usize, scale: f64) -> Variable {
        let arr = Array2::from_shape_fn((nx, ny), |(i, j)| scale * (10 * i + j) as f64);
        Variable::new(vec![Dim::X, Dim::Y], arr.into_dyn()).unwrap()
    }

    fn grid() -> Dataset {
        Dataset::new()
            .with_variable("g11", field(4, 6, 1.0))
            .unwrap()
            .with_variable("Bxy", field(4, 6, 1.0))
            .unwrap()
            .with_variable("ny_inner", Variable::scalar(3.0))
            .unwrap()
            .with_variable("ZMAX", Variable::scalar(0.5))
            .unwrap()
            .with_attr("geometry", "toroidal")
    }

    fn target() -> Dataset {
        Dataset::new()
            .with_variable("n", field(4, 6, 3.0))
            .unwrap()
            .with_variable("Bxy", field(4, 6, 0.01))
            .unwrap()
            .with_metadata(Metadata::new().with("MXG", 2_i64).with("keep_yboundaries", false))
    }

    #[test]
    fn scalars_become_metadata() {
        let (arrays, metadata) = separate_metadata(grid());

        assert!(arrays.variable("ny_inner").is_none());
        assert!(arrays.variable("g11").is_some());
        assert_eq!(metadata.ny_inner, Some(3));
        assert_eq!(metadata.get("ZMAX"), Some(0.5));
    }

    #[test]
    fn without_target() {
        let fused = fuse(grid(), None).unwrap();

        let names: Vec<_> = fused.variable_names().collect();
        assert_eq!(names, vec!["Bxy", "g11"]);
        assert_eq!(fused.attr("geometry").and_then(|a| a.as_str()), Some("toroidal"));
        assert_eq!(fused.grid_metadata().and_then(|m| m.ny_inner), Some(3));
    }

    #[test]
    fn target_wins_collisions() {
        let fused = fuse(grid(), Some(target())).unwrap();

        assert!(fused.variable("Bxy").unwrap().identical(target().variable("Bxy").unwrap()));
        assert!(fused.variable("g11").is_some());
        assert!(fused.variable("n").is_some());
        assert_eq!(fused.metadata().width("MXG").unwrap(), 2);
    }

    #[test]
    fn every_variable_carries_grid_constants() {
        let fused = fuse(grid(), Some(target())).unwrap();

        for (name, var) in fused.variables() {
            let metadata = var.grid_metadata();
            assert!(metadata.is_some(), "{name} has no grid metadata");
            assert_eq!(metadata.and_then(|m| m.get("ZMAX")), Some(0.5));
        }
    }

    #[test]
    fn size_conflicts_are_not_resolved() {
        let target = Dataset::new()
            .with_variable("n", Variable::new(vec![Dim::X], Array1::zeros(8).into_dyn()).unwrap())
            .unwrap();

        let err = fuse(grid(), Some(target)).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Dataset(DatasetError::DimensionSizeConflict { dim: Dim::X, .. })
        ));
    }
}
