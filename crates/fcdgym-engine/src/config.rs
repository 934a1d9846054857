//! Environment configuration, presets, validation, and error types.
//!
//! [`EnvConfig`] is the single input for constructing a
//! [`VehicularEnv`](crate::VehicularEnv) and a
//! [`StepScheduler`](crate::StepScheduler). [`validate()`](EnvConfig::validate)
//! checks structural invariants at startup. The engine never reads the
//! process environment or argv; binaries fill in the struct.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use fcdgym_trace::DEFAULT_TICK_DURATION;

use crate::replay::{ReplayPolicy, SpeedSource};
use crate::reward::RewardConfig;

/// Slack, in ticks, added past the step budget when extending the stop
/// time.
const STOP_TIME_SLACK_TICKS: u64 = 5;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EnvConfig::validate()`] or environment
/// construction.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Neither the trace nor procedural mobility provides any actor.
    NoActors,
    /// `tick_duration` is NaN, infinite, or a positive value that no
    /// non-zero [`Duration`] can represent.
    InvalidTickDuration {
        /// The invalid value.
        value: f64,
    },
    /// `sim_time` is NaN, infinite, or negative.
    InvalidSimTime {
        /// The invalid value.
        value: f64,
    },
    /// Procedural area bounds are non-finite or inverted.
    InvalidArea {
        /// Description of the violation.
        reason: String,
    },
    /// Procedural speed bounds are non-finite, negative, or inverted.
    InvalidSpeedBounds {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Observation bounds are non-finite or inverted.
    InvalidObservationBounds {
        /// Lower bound.
        low: f32,
        /// Upper bound.
        high: f32,
    },
    /// Random-walk direction change interval is not finite and positive.
    InvalidDirectionInterval {
        /// The invalid value.
        value: f64,
    },
    /// A reward coefficient is NaN or infinite.
    InvalidReward {
        /// Description of the violation.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActors => write!(f, "no actors: trace is unusable and vehicle_count is 0"),
            Self::InvalidTickDuration { value } => {
                write!(
                    f,
                    "tick_duration must be finite and representable as an interval, got {value}"
                )
            }
            Self::InvalidSimTime { value } => {
                write!(f, "sim_time must be finite and non-negative, got {value}")
            }
            Self::InvalidArea { reason } => write!(f, "invalid area: {reason}"),
            Self::InvalidSpeedBounds { min, max } => {
                write!(f, "speed bounds must satisfy 0 <= min <= max, got [{min}, {max}]")
            }
            Self::InvalidObservationBounds { low, high } => {
                write!(f, "observation bounds must satisfy low < high, got [{low}, {high}]")
            }
            Self::InvalidDirectionInterval { value } => {
                write!(
                    f,
                    "direction_change_interval must be finite and positive, got {value}"
                )
            }
            Self::InvalidReward { reason } => write!(f, "invalid reward: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Complete configuration for one environment run.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvConfig {
    /// Port the agent transport listens on. Carried for the transport
    /// layer; the engine itself does not bind it.
    pub port: u16,
    /// Simulation stop time in seconds. 0 = no time limit.
    pub sim_time: f64,
    /// Seconds per tick. Non-positive values fall back to 0.1.
    pub tick_duration: f64,
    /// FCD trace to replay. `None` = procedural mobility.
    pub trace_path: Option<PathBuf>,
    /// Vehicles driven by procedural mobility when no trace is usable.
    pub vehicle_count: usize,
    /// Out-of-range tick policy for trace replay.
    pub policy: ReplayPolicy,
    /// Step budget. 0 = unbounded.
    pub max_steps: u64,
    /// Per-tick log interval: 0 silent, 1 every tick, N every Nth tick.
    pub log_interval: u64,
    /// Lower corner of the procedural area `(x, y)` in metres.
    pub area_min: (f64, f64),
    /// Upper corner of the procedural area `(x, y)` in metres.
    pub area_max: (f64, f64),
    /// Minimum procedural speed in m/s.
    pub speed_min: f64,
    /// Maximum procedural speed in m/s.
    pub speed_max: f64,
    /// RNG seed for procedural mobility.
    pub seed: u64,
    /// Run number; combined with `seed` to select an independent stream.
    pub run: u64,
    /// Observation space lower bound.
    pub obs_low: f32,
    /// Observation space upper bound.
    pub obs_high: f32,
    /// Reward strategy.
    pub reward: RewardConfig,
    /// Where replayed speeds come from.
    pub speed_source: SpeedSource,
    /// Seconds between random-walk speed and heading changes.
    pub direction_change_interval: f64,
}

impl EnvConfig {
    /// The short evaluation preset: 30 s, clamped replay, 1000 steps,
    /// every tick logged, 10 procedural vehicles on a 500 m square.
    pub fn basic() -> Self {
        Self {
            port: 5555,
            sim_time: 30.0,
            tick_duration: 0.1,
            trace_path: None,
            vehicle_count: 10,
            policy: ReplayPolicy::Clamp,
            max_steps: 1000,
            log_interval: 1,
            area_min: (0.0, 0.0),
            area_max: (500.0, 500.0),
            speed_min: 10.0,
            speed_max: 30.0,
            seed: 1,
            run: 1,
            obs_low: -1000.0,
            obs_high: 1000.0,
            reward: RewardConfig::TimeScaled { k1: 0.05, k2: 0.1 },
            speed_source: SpeedSource::Reported,
            direction_change_interval: 2.0,
        }
    }

    /// The training preset: 120 s, looped replay, unbounded steps, every
    /// 10th tick logged, 40 procedural vehicles on an 800 m square.
    pub fn training() -> Self {
        Self {
            port: 5556,
            sim_time: 120.0,
            vehicle_count: 40,
            policy: ReplayPolicy::Loop,
            max_steps: 0,
            log_interval: 10,
            area_max: (800.0, 800.0),
            speed_min: 5.0,
            speed_max: 25.0,
            obs_low: -10000.0,
            obs_high: 10000.0,
            reward: RewardConfig::ActiveCount { k: 0.1 },
            ..Self::basic()
        }
    }

    /// Set the trace to replay.
    pub fn with_trace(mut self, path: impl Into<PathBuf>) -> Self {
        self.trace_path = Some(path.into());
        self
    }

    /// `tick_duration`, or 0.1 when it is not a positive number of
    /// seconds that converts to a non-zero [`Duration`].
    pub fn effective_tick_duration(&self) -> f64 {
        if interval_for(self.tick_duration).is_some() {
            self.tick_duration
        } else {
            DEFAULT_TICK_DURATION
        }
    }

    /// The tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        interval_for(self.effective_tick_duration())
            .unwrap_or(Duration::from_millis(100))
    }

    /// Simulation stop time, extended so a bounded step budget can be
    /// reached: at least `tick * (max_steps + 5)` when `max_steps > 0`.
    /// `None` when neither time nor steps bound the run.
    pub fn stop_time(&self) -> Option<f64> {
        if self.max_steps > 0 {
            let needed =
                self.effective_tick_duration() * (self.max_steps + STOP_TIME_SLACK_TICKS) as f64;
            return Some(self.sim_time.max(needed));
        }
        (self.sim_time > 0.0).then_some(self.sim_time)
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_duration.is_finite()
            || (self.tick_duration > 0.0 && interval_for(self.tick_duration).is_none())
        {
            return Err(ConfigError::InvalidTickDuration {
                value: self.tick_duration,
            });
        }
        if !self.sim_time.is_finite() || self.sim_time < 0.0 {
            return Err(ConfigError::InvalidSimTime {
                value: self.sim_time,
            });
        }
        let (x0, y0) = self.area_min;
        let (x1, y1) = self.area_max;
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::InvalidArea {
                reason: "bounds must be finite".to_string(),
            });
        }
        if x0 > x1 || y0 > y1 {
            return Err(ConfigError::InvalidArea {
                reason: format!("min ({x0}, {y0}) exceeds max ({x1}, {y1})"),
            });
        }
        if !self.speed_min.is_finite()
            || !self.speed_max.is_finite()
            || self.speed_min < 0.0
            || self.speed_min > self.speed_max
        {
            return Err(ConfigError::InvalidSpeedBounds {
                min: self.speed_min,
                max: self.speed_max,
            });
        }
        if !self.obs_low.is_finite() || !self.obs_high.is_finite() || self.obs_low >= self.obs_high
        {
            return Err(ConfigError::InvalidObservationBounds {
                low: self.obs_low,
                high: self.obs_high,
            });
        }
        if !self.direction_change_interval.is_finite() || self.direction_change_interval <= 0.0 {
            return Err(ConfigError::InvalidDirectionInterval {
                value: self.direction_change_interval,
            });
        }
        self.reward.validate()
    }
}

fn interval_for(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|d| !d.is_zero())
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::training()
    }
}
