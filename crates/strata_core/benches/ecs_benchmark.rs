//! # ECS Performance Benchmark
//!
//! Measures the sparse-set hot paths:
//! - entity creation with component assignment
//! - view iteration with in-place mutation
//! - swap-remove churn
//!
//! Run with: `cargo bench --package strata_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_core::{Entity, Position, Velocity, World};

/// Entity counts swept by the grouped benchmarks.
const COUNTS: [usize; 3] = [1_000, 10_000, 100_000];

/// Builds a world where every entity has a `Position` and every other one a
/// `Velocity`.
fn populated_world(count: usize) -> (World, Vec<Entity>) {
    let mut world = World::new();
    let mut entities = Vec::with_capacity(count);

    for i in 0..count {
        let entity = world.create();
        let f = i as f32;
        world
            .insert(entity, Position::new(f, f, f))
            .expect("fresh entity");
        if i % 2 == 0 {
            world
                .insert(entity, Velocity::new(0.1, 0.2, 0.3))
                .expect("fresh entity");
        }
        entities.push(entity);
    }

    (world, entities)
}

fn bench_create_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_assign");

    for count in COUNTS {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let (world, _) = populated_world(count);
                black_box(world.alive_count())
            });
        });
    }

    group.finish();
}

fn bench_view_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_tick");

    for count in COUNTS {
        let (mut world, _) = populated_world(count);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let mut view = world.view::<(Position, Velocity)>();
                let mut cursor = view.cursor();
                while let Some(entity) = cursor.next(&view) {
                    let (pos, vel) = view.fetch_mut(entity).expect("entity in view");
                    pos.advance(*vel, 1.0 / 60.0);
                }
            });
        });
    }

    group.finish();
}

fn bench_view_read(c: &mut Criterion) {
    let (mut world, _) = populated_world(100_000);

    c.bench_function("view_read_100k", |b| {
        b.iter(|| {
            let view = world.view::<(Position, Velocity)>();
            let sum: f32 = view
                .iter_components()
                .map(|(_, (pos, vel))| pos.x * vel.x)
                .sum();
            black_box(sum)
        });
    });
}

fn bench_remove_churn(c: &mut Criterion) {
    let (mut world, entities) = populated_world(10_000);

    c.bench_function("remove_reinsert_10k", |b| {
        b.iter(|| {
            for &entity in entities.iter().step_by(3) {
                let pos = world.remove::<Position>(entity).expect("has position");
                world.insert(entity, pos).expect("position removed");
            }
        });
    });
}

criterion_group!(
    benches,
    bench_create_assign,
    bench_view_tick,
    bench_view_read,
    bench_remove_churn,
);
criterion_main!(benches);
