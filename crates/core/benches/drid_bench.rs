//! Criterion benchmarks for DRID descriptor computation.
//!
//! Uses synthetic chain molecules with sequential bonds so both the
//! all-pairs distance work and the bonded exclusions are exercised.
//!
//! Run with: cargo bench -p drid-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use drid_core::{BondSet, DridConfig, DridEngine, Parallelism, Trajectory};

/// Build `n_frames` frames of a helical chain of `n_atoms` atoms, each frame
/// slightly rotated, with a bond between every consecutive pair of atoms.
fn build_synthetic_system(n_frames: usize, n_atoms: usize) -> (Trajectory, BondSet) {
    let frames: Vec<Vec<[f64; 3]>> = (0..n_frames)
        .map(|f| {
            let phase = f as f64 * 0.05;
            (0..n_atoms)
                .map(|i| {
                    let t = i as f64 * 0.6 + phase;
                    [2.3 * t.cos(), 2.3 * t.sin(), 0.15 * i as f64]
                })
                .collect()
        })
        .collect();
    let pairs: Vec<(usize, usize)> = (0..n_atoms - 1).map(|i| (i, i + 1)).collect();

    let traj = Trajectory::from_frames(&frames).expect("synthetic frames are rectangular");
    let bonds = BondSet::new(n_atoms, &pairs).expect("synthetic bonds are in range");
    (traj, bonds)
}

fn bench_atom_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("drid_atoms");
    group.sample_size(20);

    for &n_atoms in &[64, 256, 1024] {
        let (traj, bonds) = build_synthetic_system(1, n_atoms);
        let engine = DridEngine::new(n_atoms, &bonds, DridConfig::default()).unwrap();
        let label = format!("{}atoms", n_atoms);

        group.bench_with_input(BenchmarkId::new("single_frame", &label), &traj, |b, traj| {
            b.iter(|| engine.compute(black_box(traj)).unwrap());
        });
    }
    group.finish();
}

fn bench_parallelism(c: &mut Criterion) {
    let mut group = c.benchmark_group("drid_parallelism");
    group.sample_size(10);

    let n_atoms = 256;
    let (traj, bonds) = build_synthetic_system(64, n_atoms);

    for (name, parallelism) in [
        ("serial", Parallelism::Serial),
        ("frames", Parallelism::Frames),
        ("atoms", Parallelism::Atoms),
    ] {
        let config = DridConfig {
            parallelism,
            ..Default::default()
        };
        let engine = DridEngine::new(n_atoms, &bonds, config).unwrap();

        group.bench_with_input(BenchmarkId::new(name, "64frames"), &traj, |b, traj| {
            b.iter(|| engine.compute(black_box(traj)).unwrap());
        });
    }
    group.finish();
}

fn bench_bond_set_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("bond_set");

    for &n_atoms in &[1_000, 10_000, 100_000] {
        let pairs: Vec<(usize, usize)> = (0..n_atoms - 1).map(|i| (i, i + 1)).collect();
        let label = format!("{}atoms", n_atoms);

        group.bench_with_input(BenchmarkId::new("chain", &label), &pairs, |b, pairs| {
            b.iter(|| BondSet::new(n_atoms, black_box(pairs)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_atom_scaling,
    bench_parallelism,
    bench_bond_set_construction,
);
criterion_main!(benches);
