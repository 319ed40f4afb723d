use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_cluster::cluster::{ClusterIndex, ClusterOptions};
use geo_cluster::{BoundingBox, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_points(n: usize) -> Vec<Point<usize>> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..n)
        .map(|i| Point::new(rng.gen_range(-180.0..180.0), rng.gen_range(-85.0..85.0), i))
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let params = ClusterOptions::default().resolve(400.).unwrap();

    let mut group = c.benchmark_group("construction");
    for n in [1_000, 10_000, 100_000] {
        let points = random_points(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &points, |b, points| {
            b.iter(|| ClusterIndex::new(points.iter().cloned(), params))
        });
    }
    group.finish();

    let index = ClusterIndex::new(random_points(100_000), params);
    let world = BoundingBox::world();
    let city = BoundingBox::new(-123., 37., -122., 38.);

    c.bench_function("query world (zoom 2)", |b| b.iter(|| index.query(&world, 2)));
    c.bench_function("query world (zoom 8)", |b| b.iter(|| index.query(&world, 8)));
    c.bench_function("query city (zoom 12)", |b| b.iter(|| index.query(&city, 12)));
    c.bench_function("query antimeridian (zoom 6)", |b| {
        b.iter(|| index.query(&BoundingBox::new(170., -20., 190., 20.), 6))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
