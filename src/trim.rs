//! # Removing guard cells
//!
//! Grid files are written with the guard cells of the simulation domain included. When
//! a grid is fused with a simulation dataset that was assembled without its boundary
//! cells, those cells have to be cut out of the grid first so that the two agree in
//! shape.
//!
//! Along x the guard width comes from the simulation dataset (`MXG`). Along y it comes
//! from the grid itself (`y_boundary_guards`). In a double-null configuration the y
//! direction holds two divertor legs, so besides the cells at both ends there is a
//! second pair of boundary regions just after the inner leg (`ny_inner`) which has to
//! be removed as well:
//!
//! ```text
//! | g | ny_inner | g | g | upper legs | g |
//!     '----------'         '----------'
//!          kept                kept
//! ```

use crate::dataset::{Dataset, Dim, Metadata};
use crate::{utils, MissingMetadata, TopologyMismatch};

/// The magnetic topology of a grid, as far as the y direction is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// the y boundary cells are all at the two ends of the y direction
    SingleNull,
    /// the y direction holds two divertor legs, each with boundary cells at both ends
    DoubleNull,
}

/// The scalar constants of a grid file that decide how it is trimmed along y
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopologyDescriptor {
    pub y_boundary_guards: usize,
    pub jyseps2_1: Option<i64>,
    pub jyseps1_2: Option<i64>,
    pub ny_inner: Option<usize>,
}

impl TopologyDescriptor {
    /// read the descriptor from the scalar variables of a grid.
    ///
    /// A grid without `y_boundary_guards` has no y guard cells.
    pub fn from_grid(grid: &Dataset) -> crate::Result<Self> {
        let y_boundary_guards = match grid.scalar("y_boundary_guards") {
            Some(value) => utils::width("y_boundary_guards", value)?,
            None => 0,
        };

        let jyseps2_1 = grid
            .scalar("jyseps2_1")
            .map(|value| utils::index("jyseps2_1", value))
            .transpose()?;

        let jyseps1_2 = grid
            .scalar("jyseps1_2")
            .map(|value| utils::index("jyseps1_2", value))
            .transpose()?;

        let ny_inner = grid
            .scalar("ny_inner")
            .map(|value| utils::width("ny_inner", value))
            .transpose()?;

        Ok(Self {
            y_boundary_guards,
            jyseps2_1,
            jyseps1_2,
            ny_inner,
        })
    }

    pub fn is_double_null(&self) -> bool {
        matches!((self.jyseps2_1, self.jyseps1_2), (Some(lower), Some(upper)) if upper > lower)
    }

    pub fn kind(&self) -> Topology {
        if self.is_double_null() {
            Topology::DoubleNull
        } else {
            Topology::SingleNull
        }
    }
}

/// Which guard cells the caller wants to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryPolicy {
    pub keep_x_boundaries: bool,
    pub keep_y_boundaries: bool,
}

impl BoundaryPolicy {
    pub fn new(keep_x_boundaries: bool, keep_y_boundaries: bool) -> Self {
        Self {
            keep_x_boundaries,
            keep_y_boundaries,
        }
    }
}

/// What trimming needs to know about the simulation dataset the grid will be fused into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetGuards {
    /// width of the x guard cells
    pub mxg: usize,
    /// whether the dataset was assembled with its y boundary cells
    pub keep_yboundaries: bool,
}

impl TargetGuards {
    /// read `MXG` and `keep_yboundaries` from the metadata of a simulation dataset
    pub fn from_metadata(metadata: &Metadata) -> crate::Result<Self> {
        Ok(Self {
            mxg: metadata.width("MXG")?,
            keep_yboundaries: metadata.flag("keep_yboundaries")?,
        })
    }
}

/// Remove the guard cells of `grid` along x and y.
///
/// x cells are only removed when a target is given, since the grid file does not record
/// its own x guard width. Fails with [`TopologyMismatch`] if the grid would keep y guard
/// cells that the target does not have. When y cells are removed (the default) a target
/// built without y boundary cells matches the trimmed grid, so no error is raised.
pub fn trim_boundaries(
    grid: &Dataset,
    target: Option<&TargetGuards>,
    policy: BoundaryPolicy,
) -> crate::Result<Dataset> {
    let topology = TopologyDescriptor::from_grid(grid)?;

    if let Some(target) = target {
        if policy.keep_y_boundaries && topology.y_boundary_guards > 0 && !target.keep_yboundaries {
            return Err(TopologyMismatch::new(topology.y_boundary_guards).into());
        }
    }

    let mut trimmed = grid.clone();

    let mxg = match target {
        Some(target) if !policy.keep_x_boundaries => target.mxg,
        _ => 0,
    };

    if mxg > 0 {
        if let Some(nx) = trimmed.len_of(Dim::X) {
            log::debug!("removing {mxg} x guard cells from each side of {nx}");
            trimmed = trimmed.isel(Dim::X, mxg..nx.saturating_sub(mxg))?;
        }
    }

    let guards = topology.y_boundary_guards;

    if policy.keep_y_boundaries || guards == 0 {
        return Ok(trimmed);
    }

    let ny = match trimmed.len_of(Dim::Y) {
        Some(ny) => ny,
        None => return Ok(trimmed),
    };

    log::debug!("removing {guards} y guard cells from each end of {ny}");
    trimmed = trimmed.isel(Dim::Y, guards..ny.saturating_sub(guards))?;

    if topology.is_double_null() {
        let ny_inner = topology
            .ny_inner
            .ok_or_else(|| MissingMetadata::new("ny_inner".into(), "grid file"))?;

        let ny = trimmed.len_of(Dim::Y).unwrap_or(0);
        log::debug!("double null grid, removing {guards} y guard cells either side of index {ny_inner}");

        let lower = trimmed.isel(Dim::Y, 0..ny_inner)?;
        let upper = trimmed.isel(Dim::Y, ny_inner + 2 * guards..ny)?;

        trimmed = lower.concat(&upper, Dim::Y)?;
    }

    Ok(trimmed)
}
