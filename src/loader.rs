//! Opening grid files and restricting them to the simulation dimensions

use crate::dataset::{Dataset, Dim};
use crate::read::{self, Engine, RawGrid};
use crate::Warning;

use std::collections::BTreeSet;
use std::path::Path;

/// A grid file converted to a [`Dataset`], along with the warning raised if some of
/// its variables had to be dropped.
#[derive(Debug, Clone)]
pub struct LoadedGrid {
    pub dataset: Dataset,
    pub warning: Option<Warning>,
}

/// Open the grid file at `path` and validate its dimensions.
///
/// The file is closed before this returns; only the in-memory dataset is kept.
pub fn load_grid(path: &Path, engine: Option<Engine>) -> crate::Result<LoadedGrid> {
    let raw = read::read_grid(path, engine)?;

    log::debug!(
        "read grid file {} with {} dimensions",
        path.display(),
        raw.dimensions().len()
    );

    validate_dimensions(raw)
}

/// Drop every variable that depends on a dimension other than `t`, `x`, `y` or `z`.
///
/// All unrecognised dimensions are collected first and named together in a single
/// warning, in sorted order. The variables depending on them are then removed in one
/// pass.
pub fn validate_dimensions(raw: RawGrid) -> crate::Result<LoadedGrid> {
    let unrecognized: BTreeSet<String> = raw
        .dimension_names()
        .into_iter()
        .filter(|name| Dim::from_name(name).is_none())
        .collect();

    if unrecognized.is_empty() {
        return Ok(LoadedGrid {
            dataset: raw.into_dataset()?,
            warning: None,
        });
    }

    let warning = Warning::UnrecognizedDimensions(unrecognized.iter().cloned().collect()).emit();
    let dataset = raw.drop_dims(&unrecognized).into_dataset()?;

    Ok(LoadedGrid {
        dataset,
        warning: Some(warning),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, Array3};

    fn raw() -> RawGrid {
        RawGrid::new()
            .with_variable("g11", &["x", "y"], Array2::zeros((4, 6)).into_dyn())
            .unwrap()
            .with_variable("spectrum", &["x", "k"], Array2::zeros((4, 3)).into_dyn())
            .unwrap()
            .with_variable("modes", &["w", "k", "y"], Array3::zeros((2, 3, 6)).into_dyn())
            .unwrap()
            .with_variable("bias", &["w"], Array1::zeros(2).into_dyn())
            .unwrap()
            .with_variable("MXG", &[], ndarray::arr0(2.0).into_dyn())
            .unwrap()
    }

    #[test]
    fn one_warning_names_every_dimension() {
        let loaded = validate_dimensions(raw()).unwrap();

        assert_eq!(
            loaded.warning,
            Some(Warning::UnrecognizedDimensions(vec!["k".into(), "w".into()]))
        );

        let names: Vec<_> = loaded.dataset.variable_names().collect();
        assert_eq!(names, vec!["MXG", "g11"]);
    }

    #[test]
    fn recognised_dimensions_pass_through() {
        let raw = RawGrid::new()
            .with_variable("f", &["t", "x"], Array2::zeros((2, 4)).into_dyn())
            .unwrap()
            .with_variable("h", &["time", "z"], Array2::zeros((2, 5)).into_dyn())
            .unwrap();

        let loaded = validate_dimensions(raw).unwrap();

        assert!(loaded.warning.is_none());
        assert_eq!(loaded.dataset.len_of(Dim::T), Some(2));
        assert_eq!(loaded.dataset.len_of(Dim::Z), Some(5));
    }

    #[test]
    fn declared_but_unused_dimensions_are_reported() {
        let raw = RawGrid::new()
            .with_dimension("theta", 3)
            .with_variable("dx", &["x"], Array1::zeros(4).into_dyn())
            .unwrap();

        let loaded = validate_dimensions(raw).unwrap();
        assert_eq!(loaded.warning, Some(Warning::UnrecognizedDimensions(vec!["theta".into()])));
        assert!(loaded.dataset.variable("dx").is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_grid(&dir.path().join("missing.xml"), None).unwrap_err();
        assert!(matches!(err, crate::Error::Load(read::LoadError::Io(_))));
    }
}
