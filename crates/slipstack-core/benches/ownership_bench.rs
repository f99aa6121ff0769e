//! Benchmark: ownership resolution and touch start by nesting depth.
//!
//! Run with: `cargo bench -p slipstack-core --bench ownership_bench`
//!
//! Ownership is recomputed on every touch start, walking from the focused
//! leaf toward the root. Depths 1..32 cover flat stacks up to deeply nested
//! tab/stack/modal trees.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use slipstack_core::config::{GestureDirection, ScreenGestureConfig};
use slipstack_core::direction::Direction;
use slipstack_core::engine::TransitionEngine;
use slipstack_core::geometry::{Point, Size};
use slipstack_core::ownership::{NavigatorId, OwnershipRegistry, ScreenId, ScreenRegistration};

const DEPTHS: [u64; 4] = [1, 4, 12, 32];

/// One screen per level. Only the root claims anything, so every lookup
/// from the leaf walks the full depth.
fn registrations(depth: u64) -> Vec<(NavigatorId, Option<ScreenId>, ScreenRegistration)> {
    (1..=depth)
        .map(|level| {
            let config = if level == 1 {
                ScreenGestureConfig::dismissible([GestureDirection::Vertical])
            } else {
                ScreenGestureConfig::default()
            };
            let host = (level > 1).then(|| ScreenId::new(level - 1));
            (
                NavigatorId::new(level),
                host,
                ScreenRegistration {
                    id: ScreenId::new(level),
                    navigator: NavigatorId::new(level),
                    config,
                },
            )
        })
        .collect()
}

fn nested_registry(depth: u64) -> OwnershipRegistry {
    let mut registry = OwnershipRegistry::new();
    for (nav, host, registration) in registrations(depth) {
        registry.register_navigator(nav, host).unwrap();
        registry.mount(registration).unwrap();
    }
    registry
}

fn nested_engine(depth: u64) -> TransitionEngine {
    let mut engine = TransitionEngine::new(Size::new(390.0, 844.0));
    for (nav, host, registration) in registrations(depth) {
        engine.register_navigator(nav, host).unwrap();
        engine.mount(registration).unwrap();
    }
    engine
}

// ===========================================================================
// Registry lookups
// ===========================================================================

fn bench_owner_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("owner_lookup");
    for depth in DEPTHS {
        let registry = nested_registry(depth);
        let leaf = ScreenId::new(depth);
        group.bench_with_input(BenchmarkId::new("single_direction", depth), &depth, |b, _| {
            b.iter(|| black_box(registry.owner(black_box(leaf), Direction::Vertical)));
        });
        group.bench_with_input(BenchmarkId::new("all_directions", depth), &depth, |b, _| {
            b.iter(|| black_box(registry.owners_from(black_box(leaf))));
        });
        group.bench_with_input(BenchmarkId::new("focused_leaf", depth), &depth, |b, _| {
            b.iter(|| black_box(registry.focused_leaf()));
        });
    }
    group.finish();
}

// ===========================================================================
// Touch start (resolution + recognizer construction)
// ===========================================================================

fn bench_touch_start(c: &mut Criterion) {
    let mut group = c.benchmark_group("touch_start");
    for depth in DEPTHS {
        let mut engine = nested_engine(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                let outcome = engine.touch_start(black_box(Point::new(195.0, 400.0)), None);
                engine.touch_cancel();
                black_box(outcome)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_owner_lookup, bench_touch_start);
criterion_main!(benches);
