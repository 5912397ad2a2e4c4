mod common;

use bout_grid::{open_grid_dataset, Dim, OpenOptions};
use common::{cell, double_null, simulation, single_null};
use proptest::prelude::*;

proptest! {
    #[test]
    fn single_null_trim_shape(
        inner_x in 1usize..12,
        inner_y in 1usize..20,
        mxg in 0usize..3,
        guards in 0usize..4,
    ) {
        let nx = inner_x + 2 * mxg;
        let ny = inner_y + 2 * guards;

        let grid = single_null(nx, ny, guards).into_dataset().unwrap();
        let target = simulation(inner_x, inner_y, 2, mxg as i64, false);

        let dataset = open_grid_dataset(grid, Some(target), &OpenOptions::new().quiet(true))
            .unwrap()
            .dataset;

        prop_assert_eq!(dataset.len_of(Dim::X), Some(inner_x));
        prop_assert_eq!(dataset.len_of(Dim::Y), Some(inner_y));

        let g11 = dataset.variable("g11").unwrap().data();
        prop_assert_eq!(g11[[0, 0]], cell(mxg, guards));
        prop_assert_eq!(g11[[inner_x - 1, inner_y - 1]], cell(mxg + inner_x - 1, guards + inner_y - 1));
    }

    #[test]
    fn double_null_trim_shape(
        nx in 1usize..6,
        ny_inner in 1usize..10,
        outer in 1usize..10,
        guards in 0usize..4,
    ) {
        let ny = ny_inner + outer + 4 * guards;

        let grid = double_null(nx, ny, guards, ny_inner).into_dataset().unwrap();
        let dataset = open_grid_dataset(grid, None, &OpenOptions::new().quiet(true))
            .unwrap()
            .dataset;

        prop_assert_eq!(dataset.len_of(Dim::Y), Some(ny - 4 * guards));

        let g11 = dataset.variable("g11").unwrap().profile(Dim::Y).unwrap();
        let expected: Vec<f64> = (guards..guards + ny_inner)
            .chain(ny_inner + 3 * guards..ny - guards)
            .map(|j| cell(0, j))
            .collect();
        prop_assert_eq!(g11.to_vec(), expected);
    }
}
