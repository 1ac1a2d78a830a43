use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use forcebench_core::mocks::RecordingActuator;
use forcebench_core::{ControlCfg, ControllerBuilder, FaultFilter, Reading};
use forcebench_traits::ManualClock;

// Synthetic load trace: slow ramp with sparse zero dropouts.
fn synth_trace(n: usize, seed: u32) -> Vec<f64> {
    let mut state = seed.max(1);
    let mut next_u32 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        x
    };
    (0..n)
        .map(|i| {
            if next_u32() % 97 == 0 {
                0.0
            } else {
                1.0 + (i % 400) as f64 * 0.2
            }
        })
        .collect()
}

pub fn bench_fault_filter(c: &mut Criterion) {
    let trace = synth_trace(10_000, 7);
    c.bench_function("fault_filter_10k", |b| {
        b.iter_batched(
            || FaultFilter::new(5, 50.0),
            |mut f| {
                for &v in &trace {
                    black_box(f.accept(v));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn bench_controller_step(c: &mut Criterion) {
    let trace = synth_trace(1_000, 11);
    c.bench_function("controller_step_1k", |b| {
        b.iter_batched(
            || {
                ControllerBuilder::new()
                    .with_actuator(RecordingActuator::new())
                    .with_setpoints(vec![40, 10, 70])
                    .with_control(ControlCfg {
                        settle_ms: 0,
                        max_segment_mm: 1_000.0,
                        ..ControlCfg::default()
                    })
                    .with_clock(Arc::new(ManualClock::new()))
                    .build()
                    .expect("valid controller")
            },
            |mut ctl| {
                for &v in &trace {
                    let _ = black_box(ctl.step(Some(Reading::Force(v))));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_fault_filter, bench_controller_step);
criterion_main!(benches);
