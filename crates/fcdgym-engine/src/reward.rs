//! Reward strategies.

use fcdgym_core::TickId;

use crate::config::ConfigError;

/// Computes the scalar reward for a tick.
///
/// Implemented for any `Fn(TickId, usize) -> f64`, so a closure can be
/// plugged in directly with
/// [`VehicularEnv::with_reward_policy`](crate::VehicularEnv::with_reward_policy).
pub trait RewardPolicy: Send {
    /// Reward at `tick` with `active_count` vehicles reporting.
    fn reward(&self, tick: TickId, active_count: usize) -> f64;
}

impl<F> RewardPolicy for F
where
    F: Fn(TickId, usize) -> f64 + Send,
{
    fn reward(&self, tick: TickId, active_count: usize) -> f64 {
        self(tick, active_count)
    }
}

/// `active_count * k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveCountReward {
    /// Per-vehicle coefficient.
    pub k: f64,
}

impl RewardPolicy for ActiveCountReward {
    fn reward(&self, _tick: TickId, active_count: usize) -> f64 {
        active_count as f64 * self.k
    }
}

/// `tick * k1 + active_count * k2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScaledReward {
    /// Per-tick coefficient.
    pub k1: f64,
    /// Per-vehicle coefficient.
    pub k2: f64,
}

impl RewardPolicy for TimeScaledReward {
    fn reward(&self, tick: TickId, active_count: usize) -> f64 {
        tick.0 as f64 * self.k1 + active_count as f64 * self.k2
    }
}

/// Built-in reward strategy selection for [`EnvConfig`](crate::EnvConfig).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RewardConfig {
    /// [`ActiveCountReward`].
    ActiveCount {
        /// Per-vehicle coefficient.
        k: f64,
    },
    /// [`TimeScaledReward`].
    TimeScaled {
        /// Per-tick coefficient.
        k1: f64,
        /// Per-vehicle coefficient.
        k2: f64,
    },
}

impl RewardConfig {
    /// Check that every coefficient is finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = match *self {
            Self::ActiveCount { k } => k.is_finite(),
            Self::TimeScaled { k1, k2 } => k1.is_finite() && k2.is_finite(),
        };
        if finite {
            Ok(())
        } else {
            Err(ConfigError::InvalidReward {
                reason: format!("coefficients must be finite: {self:?}"),
            })
        }
    }

    /// Instantiate the strategy.
    pub fn build(&self) -> Box<dyn RewardPolicy> {
        match *self {
            Self::ActiveCount { k } => Box::new(ActiveCountReward { k }),
            Self::TimeScaled { k1, k2 } => Box::new(TimeScaledReward { k1, k2 }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_count_reward() {
        let r = ActiveCountReward { k: 0.1 };
        assert!((r.reward(TickId(99), 40) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn time_scaled_reward() {
        let r = TimeScaledReward { k1: 0.05, k2: 0.1 };
        assert!((r.reward(TickId(20), 10) - 2.0).abs() < 1e-12);
        assert_eq!(r.reward(TickId(0), 0), 0.0);
    }

    #[test]
    fn closure_is_a_policy() {
        let policy: Box<dyn RewardPolicy> =
            Box::new(|tick: TickId, n: usize| n as f64 - tick.0 as f64);
        assert_eq!(policy.reward(TickId(3), 5), 2.0);
    }

    #[test]
    fn config_builds_matching_strategy() {
        let policy = RewardConfig::TimeScaled { k1: 1.0, k2: 2.0 }.build();
        assert_eq!(policy.reward(TickId(1), 1), 3.0);
    }

    #[test]
    fn infinite_coefficient_rejected() {
        let cfg = RewardConfig::TimeScaled {
            k1: 1.0,
            k2: f64::INFINITY,
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidReward { .. })));
    }
}
