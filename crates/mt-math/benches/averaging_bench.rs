// ─────────────────────────────────────────────────────────────────────
// SCPN MT3D — Averaging Operator Benchmarks
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use mt_math::averaging::{cell_to_edge, cell_to_node, edge_to_cell};
use mt_types::grid::Grid3D;
use ndarray::Array3;
use std::hint::black_box;

fn bench_grid(n: usize) -> Grid3D {
    Grid3D::uniform(n, n, 8, n, 100.0).expect("benchmark grid should be valid")
}

fn bench_cell_to_edge(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell_to_edge");
    group.sample_size(20);
    for n in [16usize, 32usize] {
        let grid = bench_grid(n);
        let cells = Array3::from_elem((n, n, n + 8), 0.01);
        group.bench_function(format!("{n}x{n}x{}", n + 8), |b| {
            b.iter(|| black_box(cell_to_edge(&grid, cells.view()).expect("cell_to_edge")))
        });
    }
    group.finish();
}

fn bench_edge_to_cell(c: &mut Criterion) {
    let grid = bench_grid(32);
    let edges = cell_to_edge(&grid, Array3::from_elem((32, 32, 40), 1.0).view())
        .expect("cell_to_edge");
    c.bench_function("edge_to_cell_32x32x40", |b| {
        b.iter(|| {
            black_box(
                edge_to_cell(&grid, [edges[0].view(), edges[1].view(), edges[2].view()])
                    .expect("edge_to_cell"),
            )
        })
    });
}

fn bench_cell_to_node(c: &mut Criterion) {
    let grid = bench_grid(32);
    let cells = Array3::from_elem((32, 32, 40), 0.01);
    c.bench_function("cell_to_node_32x32x40", |b| {
        b.iter(|| black_box(cell_to_node(&grid, cells.view()).expect("cell_to_node")))
    });
}

criterion_group!(
    benches,
    bench_cell_to_edge,
    bench_edge_to_cell,
    bench_cell_to_node
);
criterion_main!(benches);
