//! Foliation construction benchmarks.
//!
//! Measures the stages of the pipeline separately so regressions can be
//! attributed:
//!
//! 1. Batch insertion of concentric spheres into the Delaunay engine
//! 2. Foliation validation on a finished triangulation
//! 3. The full build (sampling, insertion, repair, classification)
//!
//! Every case uses a fixed seed so runs are comparable.
//!
//! ```bash
//! cargo bench --bench foliation_construction
//! ```

#![allow(missing_docs)]

use causal_dynamical_triangulations::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

/// (simplices, timeslices) pairs
const CASES: &[(usize, usize)] = &[(32, 2), (128, 4), (512, 8)];

const SEED: u64 = 0x5EED;

fn config(simplices: usize, timeslices: usize) -> FoliationConfig {
    FoliationConfigBuilder::default()
        .simplices(simplices)
        .timeslices(timeslices)
        .seed(SEED)
        .build()
        .expect("benchmark configuration is valid")
}

fn bench_batch_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_insertion");
    group.sample_size(20);
    for &(simplices, timeslices) in CASES {
        let builder = FoliationBuilder::new(config(simplices, timeslices));
        let points = builder
            .generate_points(&mut StdRng::seed_from_u64(SEED))
            .expect("sampling succeeds");
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{simplices}/{timeslices}")),
            &points,
            |b, points| {
                b.iter(|| {
                    let radius = f64::from(u32::try_from(timeslices).unwrap_or(u32::MAX));
                    let mut dt = DelaunayTriangulation::with_bounds(Point::default(), radius)
                        .expect("bounds are valid");
                    black_box(TriangulationEngine::insert_batch(&mut dt, points))
                });
            },
        );
    }
    group.finish();
}

fn bench_check_timeslices(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_timeslices");
    for &(simplices, timeslices) in CASES {
        let foliation = FoliationBuilder::new(config(simplices, timeslices))
            .build()
            .expect("foliation builds");
        group.bench_function(
            BenchmarkId::from_parameter(format!("{simplices}/{timeslices}")),
            |b| b.iter(|| black_box(check_timeslices(foliation.triangulation(), false))),
        );
    }
    group.finish();
}

fn bench_full_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("foliation_build");
    group.sample_size(10);
    for &(simplices, timeslices) in CASES {
        let builder = FoliationBuilder::new(config(simplices, timeslices));
        group.bench_function(
            BenchmarkId::from_parameter(format!("{simplices}/{timeslices}")),
            |b| b.iter(|| black_box(builder.build().map(|f| f.report().cells))),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_batch_insertion,
    bench_check_timeslices,
    bench_full_build
);
criterion_main!(benches);
