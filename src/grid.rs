use crate::dataset::Dataset;
use crate::fuse::fuse;
use crate::geometry::{dispatch_geometry, GeometryRegistry};
use crate::loader;
use crate::read::Engine;
use crate::trim::{trim_boundaries, BoundaryPolicy, TargetGuards};
use crate::Warning;

use std::path::Path;

/// Settings for [`open_grid`]
///
/// ```
/// use bout_grid::OpenOptions;
///
/// let options = OpenOptions::new()
///     .geometry("toroidal")
///     .coordinates(["psi", "theta", "phi"])
///     .keep_y_boundaries(true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    engine: Option<Engine>,
    geometry: Option<String>,
    coordinates: Option<Vec<String>>,
    quiet: bool,
    keep_x_boundaries: bool,
    keep_y_boundaries: bool,
    registry: GeometryRegistry,
}

impl OpenOptions {
    /// no engine hint, no geometry, the built-in geometries, and every guard cell removed
    pub fn new() -> Self {
        Self::default()
    }

    /// read the file with `engine` instead of inferring it from the extension
    pub fn engine(mut self, engine: Engine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// use this geometry even if the grid records a different one
    pub fn geometry<S: Into<String>>(mut self, geometry: S) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    /// names of the coordinates along `x`, `y` and `z`
    pub fn coordinates<I, S>(mut self, coordinates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.coordinates = Some(coordinates.into_iter().map(Into::into).collect());
        self
    }

    /// do not warn when no geometry can be found
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn keep_x_boundaries(mut self, keep: bool) -> Self {
        self.keep_x_boundaries = keep;
        self
    }

    pub fn keep_y_boundaries(mut self, keep: bool) -> Self {
        self.keep_y_boundaries = keep;
        self
    }

    /// look geometries up in `registry` instead of the built-in one
    pub fn registry(mut self, registry: GeometryRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn boundary_policy(&self) -> BoundaryPolicy {
        BoundaryPolicy::new(self.keep_x_boundaries, self.keep_y_boundaries)
    }
}

/// The result of [`open_grid`]: the fused dataset and every warning raised on the way
#[derive(Debug, Clone)]
pub struct OpenedGrid {
    pub dataset: Dataset,
    pub warnings: Vec<Warning>,
}

impl OpenedGrid {
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}

/// Open a grid file and fuse it with an optional simulation dataset.
///
/// The grid is loaded and stripped of variables on dimensions other than `t`, `x`,
/// `y`, `z`, then its guard cells are removed, its scalar constants are moved into the
/// [`GeometryMetadata`](crate::GeometryMetadata) of the result, its fields are merged
/// into `target` and finally the coordinates of its geometry are added.
///
/// A `target` must carry `MXG` and `keep_yboundaries` in its [`Metadata`](crate::Metadata).
///
/// ```
/// use bout_grid::{open_grid, write_grid_file, Dim, Encoding, OpenOptions, RawGrid};
/// use bout_grid::ndarray::{arr0, Array2};
///
/// let grid = RawGrid::new()
///     .with_attribute("geometry", "toroidal")
///     .with_variable("g11", &["x", "y"], Array2::ones((6, 10)).into_dyn())?
///     .with_variable("y_boundary_guards", &[], arr0(2.0).into_dyn())?;
///
/// let path = std::env::temp_dir().join("bout_grid_open_grid_example.xml");
/// write_grid_file(&path, &grid, Encoding::Base64)?;
///
/// let opened = open_grid(&path, None, &OpenOptions::new())?;
///
/// assert_eq!(opened.dataset.len_of(Dim::Y), Some(6));
/// assert!(opened.dataset.coord("theta").is_some());
/// assert!(opened.warnings.is_empty());
/// # std::fs::remove_file(&path)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn open_grid<P: AsRef<Path>>(
    path: P,
    target: Option<Dataset>,
    options: &OpenOptions,
) -> crate::Result<OpenedGrid> {
    let loaded = loader::load_grid(path.as_ref(), options.engine)?;

    let mut opened = open_grid_dataset(loaded.dataset, target, options)?;

    if let Some(warning) = loaded.warning {
        opened.warnings.insert(0, warning);
    }

    Ok(opened)
}

/// [`open_grid`] for a grid that has already been loaded
///
/// The options' engine is not used.
pub fn open_grid_dataset(
    grid: Dataset,
    target: Option<Dataset>,
    options: &OpenOptions,
) -> crate::Result<OpenedGrid> {
    let guards = target
        .as_ref()
        .map(|target| TargetGuards::from_metadata(target.metadata()))
        .transpose()?;

    let trimmed = trim_boundaries(&grid, guards.as_ref(), options.boundary_policy())?;
    let fused = fuse(trimmed, target)?;

    let (dataset, warning) = dispatch_geometry(
        fused,
        options.geometry.as_deref(),
        options.coordinates.as_deref(),
        options.quiet,
        &options.registry,
    )?;

    Ok(OpenedGrid {
        dataset,
        warnings: warning.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = OpenOptions::default();

        assert_eq!(options.engine, None);
        assert_eq!(options.geometry, None);
        assert!(!options.quiet);
        assert_eq!(options.boundary_policy(), BoundaryPolicy::default());
        assert_eq!(
            options.registry.names().collect::<Vec<_>>(),
            vec!["cylindrical", "toroidal"]
        );
    }

    #[test]
    fn setters_chain() {
        let options = OpenOptions::new()
            .engine(Engine::Xml)
            .geometry("cylindrical")
            .coordinates(vec!["r", "h", "phi"])
            .quiet(true)
            .keep_x_boundaries(true);

        assert_eq!(options.engine, Some(Engine::Xml));
        assert_eq!(options.geometry.as_deref(), Some("cylindrical"));
        assert_eq!(options.coordinates.as_deref().map(<[String]>::len), Some(3));
        assert_eq!(options.boundary_policy(), BoundaryPolicy::new(true, false));
    }
}
