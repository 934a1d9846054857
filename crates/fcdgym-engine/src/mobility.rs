//! Seeded random-walk procedural mobility.
//!
//! Used when no trace is available. Each vehicle starts at a uniform
//! position in the configured area with a uniform speed and heading,
//! draws a new speed and heading every `direction_change_interval`
//! seconds, and reflects off the area boundary.
//!
//! Every vehicle owns a [`ChaCha8Rng`] seeded from a master generator
//! keyed on `(seed, run)`, so a vehicle's path depends only on the
//! configuration and on simulation time, never on how often it is polled.

use std::f64::consts::TAU;
use std::time::Duration;

use fcdgym_core::{ActiveStateSnapshot, ActorIndex, ProceduralMobility, VehicleState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::EnvConfig;

#[derive(Clone, Debug)]
struct Walker {
    rng: ChaCha8Rng,
    x: f64,
    y: f64,
    speed: f64,
    heading: f64,
    next_change: f64,
}

/// Bounds and timing shared by every walker.
#[derive(Clone, Copy, Debug, PartialEq)]
struct WalkArea {
    min: (f64, f64),
    max: (f64, f64),
    speed_min: f64,
    speed_max: f64,
    interval: f64,
}

impl WalkArea {
    fn redraw(&self, walker: &mut Walker) {
        walker.speed = walker.rng.random_range(self.speed_min..=self.speed_max);
        walker.heading = walker.rng.random_range(0.0..TAU);
    }

    /// Move `walker` from `from` to `to` seconds in a straight line,
    /// reflecting at the boundary.
    fn advance(&self, walker: &mut Walker, from: f64, to: f64) {
        let dt = to - from;
        let (dx, dy) = (walker.heading.cos(), walker.heading.sin());
        let (x, flip_x) = reflect(walker.x + walker.speed * dx * dt, self.min.0, self.max.0);
        let (y, flip_y) = reflect(walker.y + walker.speed * dy * dt, self.min.1, self.max.1);
        walker.x = x;
        walker.y = y;
        let (dx, dy) = (if flip_x { -dx } else { dx }, if flip_y { -dy } else { dy });
        walker.heading = dy.atan2(dx);
    }
}

/// Fold `v` into `[lo, hi]` by mirroring at the ends. Returns the folded
/// value and whether the direction of travel is reversed.
fn reflect(v: f64, lo: f64, hi: f64) -> (f64, bool) {
    let width = hi - lo;
    if width <= 0.0 {
        return (lo, false);
    }
    let offset = v - lo;
    let folds = (offset / width).floor();
    let within = offset - folds * width;
    if folds.rem_euclid(2.0) == 0.0 {
        (lo + within, false)
    } else {
        (hi - within, true)
    }
}

/// Random-walk mobility for a fixed number of vehicles.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fcdgym_core::ProceduralMobility;
/// use fcdgym_engine::{EnvConfig, RandomWalkMobility};
///
/// let cfg = EnvConfig::basic();
/// let mut a = RandomWalkMobility::from_config(&cfg);
/// let mut b = RandomWalkMobility::from_config(&cfg);
/// assert_eq!(a.poll(Duration::from_secs(3)), b.poll(Duration::from_secs(3)));
/// assert_eq!(a.vehicle_count(), cfg.vehicle_count);
/// ```
#[derive(Clone, Debug)]
pub struct RandomWalkMobility {
    area: WalkArea,
    walkers: Vec<Walker>,
    now: f64,
}

impl RandomWalkMobility {
    /// Build the walk described by `config`'s procedural fields.
    pub fn from_config(config: &EnvConfig) -> Self {
        let area = WalkArea {
            min: config.area_min,
            max: config.area_max,
            speed_min: config.speed_min,
            speed_max: config.speed_max,
            interval: config.direction_change_interval,
        };
        let mut master = ChaCha8Rng::seed_from_u64(config.seed);
        master.set_stream(config.run);

        let walkers = (0..config.vehicle_count)
            .map(|_| {
                let mut rng = ChaCha8Rng::seed_from_u64(master.random());
                let x = rng.random_range(area.min.0..=area.max.0);
                let y = rng.random_range(area.min.1..=area.max.1);
                let mut walker = Walker {
                    rng,
                    x,
                    y,
                    speed: 0.0,
                    heading: 0.0,
                    next_change: area.interval,
                };
                area.redraw(&mut walker);
                walker
            })
            .collect();

        Self {
            area,
            walkers,
            now: 0.0,
        }
    }

    fn advance_to(&mut self, t: f64) {
        let area = self.area;
        for walker in &mut self.walkers {
            let mut from = self.now;
            while walker.next_change <= t {
                area.advance(walker, from, walker.next_change);
                from = walker.next_change;
                walker.next_change += area.interval;
                area.redraw(walker);
            }
            area.advance(walker, from, t);
        }
        self.now = t;
    }

    fn snapshot(&self) -> ActiveStateSnapshot {
        self.walkers
            .iter()
            .enumerate()
            .map(|(i, w)| (ActorIndex(i as u32), VehicleState::new(w.x, w.y, w.speed)))
            .collect()
    }
}

impl ProceduralMobility for RandomWalkMobility {
    fn vehicle_count(&self) -> usize {
        self.walkers.len()
    }

    fn poll(&mut self, now: Duration) -> ActiveStateSnapshot {
        let t = now.as_secs_f64();
        if t > self.now {
            self.advance_to(t);
        }
        self.snapshot()
    }
}
