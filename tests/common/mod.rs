#![allow(dead_code)]

use bout_grid::ndarray::{arr0, Array2, Array3};
use bout_grid::{write_grid_file, Dataset, Dim, Encoding, Metadata, RawGrid, Variable};

use std::path::PathBuf;

/// value of every field of the test grids at cell `(i, j)`
pub fn cell(i: usize, j: usize) -> f64 {
    (1000 * i + j) as f64
}

/// A single-null toroidal grid of `nx` by `ny` cells with `guards` y guard cells at
/// each end of the y range.
pub fn single_null(nx: usize, ny: usize, guards: usize) -> RawGrid {
    let g11 = Array2::from_shape_fn((nx, ny), |(i, j)| cell(i, j));
    let dx = Array2::from_elem((nx, ny), 0.1);
    let dy = Array2::from_elem((nx, ny), 0.25);
    let rxy = Array2::from_shape_fn((nx, ny), |(i, j)| 1.5 + 0.01 * i as f64 + 0.001 * j as f64);
    let zxy = Array2::from_shape_fn((nx, ny), |(i, j)| 0.01 * i as f64 - 0.002 * j as f64);

    RawGrid::new()
        .with_attribute("geometry", "toroidal")
        .with_variable("g11", &["x", "y"], g11.into_dyn())
        .unwrap()
        .with_variable("dx", &["x", "y"], dx.into_dyn())
        .unwrap()
        .with_variable("dy", &["x", "y"], dy.into_dyn())
        .unwrap()
        .with_variable("Rxy", &["x", "y"], rxy.into_dyn())
        .unwrap()
        .with_variable("Zxy", &["x", "y"], zxy.into_dyn())
        .unwrap()
        .with_variable("y_boundary_guards", &[], arr0(guards as f64).into_dyn())
        .unwrap()
        .with_variable("jyseps2_1", &[], arr0((ny / 2) as f64).into_dyn())
        .unwrap()
        .with_variable("jyseps1_2", &[], arr0((ny / 2) as f64).into_dyn())
        .unwrap()
}

/// A double-null grid: `ny_inner` cells in the inner leg and guard cells at both
/// ends and either side of the upper target.
pub fn double_null(nx: usize, ny: usize, guards: usize, ny_inner: usize) -> RawGrid {
    single_null(nx, ny, guards)
        .with_variable("jyseps2_1", &[], arr0(0.0).into_dyn())
        .unwrap()
        .with_variable("jyseps1_2", &[], arr0((ny - 1) as f64).into_dyn())
        .unwrap()
        .with_variable("ny_inner", &[], arr0(ny_inner as f64).into_dyn())
        .unwrap()
}

/// A simulation dataset with one three-dimensional field of the given shape
pub fn simulation(nx: usize, ny: usize, nz: usize, mxg: i64, keep_yboundaries: bool) -> Dataset {
    let n = Array3::from_elem((nx, ny, nz), 1.0);

    Dataset::new()
        .with_variable("n", Variable::new(vec![Dim::X, Dim::Y, Dim::Z], n.into_dyn()).unwrap())
        .unwrap()
        .with_attr("title", "test run")
        .with_metadata(
            Metadata::new()
                .with("MXG", mxg)
                .with("keep_yboundaries", keep_yboundaries),
        )
}

/// Write `grid` to `name` inside a fresh temporary directory. The directory lives
/// as long as the returned guard.
pub fn write_to_temp(grid: &RawGrid, name: &str, encoding: Encoding) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    write_grid_file(&path, grid, encoding).unwrap();
    (dir, path)
}
