use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;
use orbital_link::altitude::AltitudeColorScaler;
use orbital_link::links::LinkTopologyBuilder;
use std::hint::black_box;

/// `count` satellites spread over a Walker-like shell at 550 km.
fn shell(count: usize) -> Vec<Option<Vector3<f64>>> {
    let planes = (count as f64).sqrt().ceil() as usize;
    let radius = 1.0 + 550.0 / 6371.0;
    (0..count)
        .map(|i| {
            let plane = (i % planes) as f64;
            let slot = (i / planes) as f64;
            let raan = plane / planes as f64 * std::f64::consts::TAU;
            let u = slot / planes as f64 * std::f64::consts::TAU;
            let inc = 53f64.to_radians();
            let (x, y) = (u.cos(), u.sin());
            let (yi, zi) = (y * inc.cos(), y * inc.sin());
            let p = Vector3::new(x * raan.cos() - yi * raan.sin(), zi, -(x * raan.sin() + yi * raan.cos()));
            Some(p * radius)
        })
        .collect()
}

fn bench_link_topology(c: &mut Criterion) {
    let mut group = c.benchmark_group("link_topology");
    for &count in &[50usize, 200, 500, 1000] {
        let positions = shell(count);
        group.bench_with_input(BenchmarkId::new("brute_force", count), &positions, |b, positions| {
            let mut builder = LinkTopologyBuilder::new(0.5, 4);
            let mut edges = Vec::new();
            b.iter(|| {
                builder.build(black_box(positions), &mut edges);
                black_box(edges.len());
            })
        });
    }
    group.finish();
}

fn bench_altitude_colors(c: &mut Criterion) {
    let positions = shell(500);
    let mut scaler = AltitudeColorScaler::new(1.0);
    let mut colors = Vec::new();
    c.bench_function("altitude_colors_500", |b| {
        b.iter(|| {
            scaler.apply(black_box(&positions), &mut colors);
            black_box(colors.len());
        })
    });
}

criterion_group!(benches, bench_link_topology, bench_altitude_colors);
criterion_main!(benches);
