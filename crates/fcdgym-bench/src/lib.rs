//! Reference workloads for benchmarking fcdgym.
//!
//! - [`reference_trace`]: 100 vehicles over 600 timesteps (60 s at 0.1 s)
//! - [`stress_trace`]: 1000 vehicles over 600 timesteps
//! - [`synthetic_trace`]: the generator behind both
//! - [`reference_config`]: replay configuration matching the traces

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use fcdgym_engine::{EnvConfig, ReplayPolicy};
use fcdgym_test_utils::fixtures::TraceBuilder;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seconds per timestep in the generated traces.
pub const TRACE_TICK: f64 = 0.1;

/// 100 vehicles, 600 timesteps.
pub fn reference_trace(seed: u64) -> String {
    synthetic_trace(100, 600, seed)
}

/// 1000 vehicles, 600 timesteps.
pub fn stress_trace(seed: u64) -> String {
    synthetic_trace(1000, 600, seed)
}

/// Generate a trace of `vehicles` straight-line drivers over `timesteps`
/// timesteps on a 1 km square.
///
/// Each vehicle enters at a random timestep in the first half and leaves
/// at a random timestep in the second half, so frames have churn.
pub fn synthetic_trace(vehicles: usize, timesteps: usize, seed: u64) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let half = (timesteps / 2).max(1);
    let drivers: Vec<_> = (0..vehicles)
        .map(|_| {
            let enter = rng.random_range(0..half);
            let leave = rng.random_range(half..=timesteps);
            let start = (rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0));
            let velocity: (f64, f64) = (rng.random_range(-15.0..15.0), rng.random_range(-15.0..15.0));
            (enter, leave, start, velocity)
        })
        .collect();

    let mut builder = TraceBuilder::new();
    for step in 0..timesteps {
        let t = step as f64 * TRACE_TICK;
        builder = builder.timestep(t);
        for (i, &(enter, leave, (x0, y0), (vx, vy))) in drivers.iter().enumerate() {
            if step < enter || step >= leave {
                continue;
            }
            let dt = (step - enter) as f64 * TRACE_TICK;
            let speed: f64 = (vx * vx + vy * vy).sqrt();
            builder = builder.vehicle(&format!("veh{i}"), x0 + vx * dt, y0 + vy * dt, Some(speed));
        }
    }
    builder.build()
}

/// Replay configuration for the generated traces: 0.1 s ticks, looped,
/// 1000-step budget, silent per-tick logging.
pub fn reference_config() -> EnvConfig {
    let mut cfg = EnvConfig::training();
    cfg.tick_duration = TRACE_TICK;
    cfg.policy = ReplayPolicy::Loop;
    cfg.max_steps = 1000;
    cfg.log_interval = 0;
    cfg
}
