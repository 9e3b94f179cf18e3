//! Performance benchmarks for type recovery and host dispatch.
//!
//! - Recovery: first-match probe scans at the front, middle and end of a domain
//! - Presentation: recovery plus host wrapping, including the degrade path
//! - Loading: a full core + render module load
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect scope timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use scenebind::core::{Class, Variant};
use scenebind::modules::classes;
use scenebind::prelude::*;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

static UNPROBED: Class = Class::new("Unprobed", Some(&classes::OBJECT));

fn bridge() -> Bridge {
    Bridge::with_default_modules(BridgeConfig::default()).unwrap()
}

/// Probe scans hitting early, late and never.
fn recovery_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let bridge = bridge();
    let bus = bridge.bus().unwrap();
    let mut group = c.benchmark_group("recovery/first_match");

    let cases: [(&str, &'static Class); 4] = [
        ("scene_first", &classes::SCENE),
        ("bsdf_middle", &classes::BSDF),
        ("medium_last", &classes::MEDIUM),
        ("no_match", &UNPROBED),
    ];
    for (name, class) in cases {
        let object = Plugin::handle(class, "scalar_rgb", name);
        group.bench_with_input(BenchmarkId::from_parameter(name), &object, |b, object| {
            b.iter(|| {
                let recovered = bus.recover(black_box(object.as_ref()));
                end_profiling_frame();
                recovered
            });
        });
    }
    group.finish();
}

/// Recovery plus wrapping, as the host sees it.
fn present_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let bridge = bridge();
    let mut group = c.benchmark_group("dispatch/present");

    let mesh = Plugin::handle(&classes::MESH, "scalar_rgb", "bunny");
    group.bench_function("mesh", |b| {
        b.iter(|| black_box(bridge.present(black_box(mesh.clone())).unwrap()));
    });

    let unprobed = Plugin::handle(&UNPROBED, "scalar_rgb", "odd");
    group.bench_function("degrade_to_base", |b| {
        b.iter(|| black_box(bridge.present(black_box(unprobed.clone())).unwrap()));
    });
    group.finish();
}

/// Full module loads into a fresh runtime.
fn load_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("loading/modules");
    for variant in ["scalar_rgb", "llvm_ad_spectral_polarized"] {
        let parsed = Variant::parse(variant).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(variant), &parsed, |b, variant| {
            b.iter(|| {
                let bridge = Bridge::new(BridgeConfig::default());
                bridge.load(&CoreModule::default()).unwrap();
                bridge.load_variant(variant.clone()).unwrap();
                end_profiling_frame();
                black_box(bridge.shutdown())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    recovery_benchmarks,
    present_benchmarks,
    load_benchmarks
);
criterion_main!(benches);
