use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array3;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use bout_grid::{Encoding, RawGrid};

fn write_grid(grid: &RawGrid, encoding: Encoding) {
    let writer: Vec<u8> = Vec::new();
    let buf_writer = std::io::BufWriter::new(writer);

    bout_grid::write_grid(buf_writer, grid, encoding).unwrap();
}

fn write_grid_bench(c: &mut Criterion) {
    let array: Array3<f64> = Array3::random((64, 128, 16), Uniform::new(0., 10.));
    let grid = RawGrid::new()
        .with_variable("field", &["x", "y", "z"], array.into_dyn())
        .unwrap();

    c.bench_function("write grid ascii 64x128x16", |b| {
        b.iter(|| write_grid(black_box(&grid), Encoding::Ascii))
    });

    c.bench_function("write grid base64 64x128x16", |b| {
        b.iter(|| write_grid(black_box(&grid), Encoding::Base64))
    });
}

criterion_group!(benches, write_grid_bench);
criterion_main!(benches);
