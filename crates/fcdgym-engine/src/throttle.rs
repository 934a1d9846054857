//! Per-tick log throttling.

use fcdgym_core::TickId;

/// Decides which ticks emit per-tick log messages.
///
/// Interval 0 is silent, 1 logs every tick, `N` logs ticks that are a
/// multiple of `N`. Forced messages bypass the throttle entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogThrottle {
    interval: u64,
}

impl LogThrottle {
    /// A throttle logging every `interval`th tick.
    pub fn new(interval: u64) -> Self {
        Self { interval }
    }

    /// Whether per-tick messages for `tick` should be emitted.
    pub fn allows(&self, tick: TickId) -> bool {
        self.interval != 0 && tick.0 % self.interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_silent() {
        let t = LogThrottle::new(0);
        assert!((0..100).all(|i| !t.allows(TickId(i))));
    }

    #[test]
    fn one_logs_everything() {
        let t = LogThrottle::new(1);
        assert!((0..100).all(|i| t.allows(TickId(i))));
    }

    #[test]
    fn every_tenth() {
        let t = LogThrottle::new(10);
        let logged: Vec<u64> = (0..35).filter(|&i| t.allows(TickId(i))).collect();
        assert_eq!(logged, vec![0, 10, 20, 30]);
    }
}
