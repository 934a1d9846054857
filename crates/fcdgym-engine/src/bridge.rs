//! The vehicular environment: replay, aggregation and the six-operation
//! bridge state machine.
//!
//! [`VehicularEnv`] owns everything that changes per tick: the actor
//! roster, the current snapshot and its aggregate, the tick counter and
//! the terminal latch. It is driven from one thread by the
//! [`StepScheduler`](crate::StepScheduler) through the
//! [`EnvironmentBridge`] trait.
//!
//! # Lifecycle
//!
//! `Init` (constructed, tick-0 snapshot prepared) → `Running` (first
//! observation published) → `Terminal` (latched by the first
//! [`game_over`](EnvironmentBridge::game_over) that returns `true`).

use std::time::{Duration, Instant};

use fcdgym_core::{
    ActiveStateSnapshot, BoxSpace, BridgeError, EnvironmentBridge, ProceduralMobility, TickId,
};
use fcdgym_obs::{action_space, Aggregate, MetricsAggregator, ObservationLayout, ACTION_LEN};
use fcdgym_trace::{LoadedTrace, TraceLoader};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, EnvConfig};
use crate::metrics::StepMetrics;
use crate::mobility::RandomWalkMobility;
use crate::replay::MobilityReplayEngine;
use crate::reward::RewardPolicy;
use crate::roster::ActorRoster;
use crate::throttle::LogThrottle;

const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<VehicularEnv>();
    }
};

// ── EnvPhase ────────────────────────────────────────────────────

/// Episode phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvPhase {
    /// Constructed; no observation published yet.
    Init,
    /// Observations published, budget not exhausted.
    Running,
    /// Episode over. Never left.
    Terminal,
}

// ── MobilitySource ──────────────────────────────────────────────

enum MobilitySource {
    Trace {
        trace: LoadedTrace,
        replay: MobilityReplayEngine,
    },
    Procedural(Box<dyn ProceduralMobility + Send>),
}

impl MobilitySource {
    fn actor_count(&self) -> usize {
        match self {
            Self::Trace { trace, .. } => trace.vehicle_count(),
            Self::Procedural(mobility) => mobility.vehicle_count(),
        }
    }
}

// ── VehicularEnv ────────────────────────────────────────────────

/// Step-synchronized vehicular environment.
pub struct VehicularEnv {
    source: MobilitySource,
    roster: ActorRoster,
    layout: ObservationLayout,
    aggregator: MetricsAggregator,
    reward_policy: Box<dyn RewardPolicy>,
    throttle: LogThrottle,
    max_steps: u64,
    time_limit: f64,
    tick: TickId,
    elapsed: Duration,
    phase: EnvPhase,
    refreshed_at: Option<(TickId, Duration)>,
    snapshot: ActiveStateSnapshot,
    aggregate: Aggregate,
    last_action: Option<Vec<f32>>,
    metrics: StepMetrics,
}

impl VehicularEnv {
    /// Startup from configuration.
    ///
    /// Loads `config.trace_path` if set; an unavailable or empty trace is
    /// logged and replaced with [`RandomWalkMobility`]. The roster is
    /// sized to the trace's vehicle count, or to `config.vehicle_count`
    /// for procedural mobility.
    ///
    /// # Errors
    ///
    /// Any [`EnvConfig::validate`] failure, or [`ConfigError::NoActors`]
    /// when the resulting roster would be empty.
    pub fn from_config(config: &EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if let Some(path) = &config.trace_path {
            match TraceLoader::new(config.effective_tick_duration()).load_path(path) {
                Ok(trace) => return Self::from_trace(config, trace),
                Err(error) => warn!(
                    path = %path.display(),
                    %error,
                    "trace unusable, falling back to procedural mobility"
                ),
            }
        }
        Self::from_mobility(config, RandomWalkMobility::from_config(config))
    }

    /// Replay an already loaded trace.
    pub fn from_trace(config: &EnvConfig, trace: LoadedTrace) -> Result<Self, ConfigError> {
        let replay = MobilityReplayEngine::new(config.policy, config.speed_source);
        Self::build(config, MobilitySource::Trace { trace, replay })
    }

    /// Drive the roster from a procedural mobility model.
    pub fn from_mobility(
        config: &EnvConfig,
        mobility: impl ProceduralMobility + Send + 'static,
    ) -> Result<Self, ConfigError> {
        Self::build(config, MobilitySource::Procedural(Box::new(mobility)))
    }

    fn build(config: &EnvConfig, source: MobilitySource) -> Result<Self, ConfigError> {
        let roster_size = source.actor_count();
        if roster_size == 0 {
            return Err(ConfigError::NoActors);
        }
        let layout = ObservationLayout::new(roster_size, config.obs_low, config.obs_high);

        match &source {
            MobilitySource::Trace { trace, replay } => info!(
                vehicles = roster_size,
                frames = trace.trajectory.frame_count(),
                max_time = trace.max_time(),
                policy = ?replay.policy(),
                "replaying mobility trace"
            ),
            MobilitySource::Procedural(_) => {
                info!(vehicles = roster_size, "using procedural mobility")
            }
        }
        info!(
            observation_space = %layout.space(),
            action_space = %action_space(),
            max_steps = config.max_steps,
            "environment ready"
        );

        let mut env = Self {
            source,
            roster: ActorRoster::new(roster_size),
            layout,
            aggregator: MetricsAggregator::for_layout(&layout),
            reward_policy: config.reward.build(),
            throttle: LogThrottle::new(config.log_interval),
            max_steps: config.max_steps,
            time_limit: config.stop_time().unwrap_or(0.0),
            tick: TickId::default(),
            elapsed: Duration::ZERO,
            phase: EnvPhase::Init,
            refreshed_at: None,
            snapshot: ActiveStateSnapshot::new(),
            aggregate: Aggregate::default(),
            last_action: None,
            metrics: StepMetrics::default(),
        };
        env.refresh();
        Ok(env)
    }

    /// Replace the reward strategy.
    pub fn with_reward_policy(mut self, policy: impl RewardPolicy + 'static) -> Self {
        self.reward_policy = Box::new(policy);
        self
    }

    /// Tell the environment the current simulation time.
    pub fn sync_clock(&mut self, now: Duration) {
        self.elapsed = now;
    }

    /// Rebuild the snapshot for the current tick and simulation time.
    ///
    /// A no-op in the terminal phase, and when nothing changed since the
    /// last refresh.
    pub fn refresh(&mut self) {
        if self.phase == EnvPhase::Terminal || self.refreshed_at == Some((self.tick, self.elapsed))
        {
            return;
        }
        let started = Instant::now();
        let (snapshot, dropped) = match &mut self.source {
            MobilitySource::Trace { trace, replay } => {
                let outcome = replay.apply(self.tick, &mut self.roster, &trace.trajectory);
                (outcome.snapshot, outcome.dropped)
            }
            MobilitySource::Procedural(mobility) => {
                let snapshot = mobility.poll(self.elapsed);
                let mut dropped = 0;
                for (&actor, state) in &snapshot {
                    if !self.roster.teleport(actor, state) {
                        dropped += 1;
                    }
                }
                (snapshot, dropped)
            }
        };
        let replayed = Instant::now();
        self.aggregate = self.aggregator.aggregate(&snapshot);
        self.snapshot = snapshot;
        self.refreshed_at = Some((self.tick, self.elapsed));

        let m = &mut self.metrics;
        m.replay_us = replayed.duration_since(started).as_micros() as u64;
        m.aggregate_us = replayed.elapsed().as_micros() as u64;
        m.total_us = started.elapsed().as_micros() as u64;
        m.active_count = self.aggregate.global.active_count;
        m.roster_mismatch_drops += dropped as u64;

        if self.throttle.allows(self.tick) {
            debug!(
                tick = self.tick.0,
                sim_time = self.elapsed.as_secs_f64(),
                active = self.aggregate.global.active_count,
                mean_speed = self.aggregate.global.mean_speed,
                dropped,
                "snapshot refreshed"
            );
        }
    }

    /// Current tick.
    pub fn current_tick(&self) -> TickId {
        self.tick
    }

    /// Current phase.
    pub fn phase(&self) -> EnvPhase {
        self.phase
    }

    /// Simulation time last passed to [`sync_clock`](Self::sync_clock).
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of roster slots.
    pub fn roster_size(&self) -> usize {
        self.roster.len()
    }

    /// The roster with every actor's last applied state.
    pub fn roster(&self) -> &ActorRoster {
        &self.roster
    }

    /// The most recent snapshot.
    pub fn snapshot(&self) -> &ActiveStateSnapshot {
        &self.snapshot
    }

    /// The most recent aggregate.
    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    /// The last accepted action, if any.
    pub fn last_action(&self) -> Option<&[f32]> {
        self.last_action.as_deref()
    }

    /// Metrics from the most recent refresh.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Whether the trace is being replayed (as opposed to procedural
    /// mobility).
    pub fn is_replaying(&self) -> bool {
        matches!(self.source, MobilitySource::Trace { .. })
    }

    /// The observation layout.
    pub fn layout(&self) -> &ObservationLayout {
        &self.layout
    }

    fn step_budget_exhausted(&self) -> bool {
        self.max_steps > 0 && self.tick.0 >= self.max_steps
    }
}

impl EnvironmentBridge for VehicularEnv {
    fn observation_space(&self) -> BoxSpace {
        self.layout.space()
    }

    fn action_space(&self) -> BoxSpace {
        action_space()
    }

    fn game_over(&mut self) -> bool {
        if self.phase == EnvPhase::Terminal {
            return true;
        }
        let time_up = self.time_limit > 0.0 && self.elapsed.as_secs_f64() >= self.time_limit;
        if self.step_budget_exhausted() || time_up {
            self.phase = EnvPhase::Terminal;
            info!(
                tick = self.tick.0,
                sim_time = self.elapsed.as_secs_f64(),
                step_budget = self.step_budget_exhausted(),
                "episode terminal"
            );
            return true;
        }
        false
    }

    fn observation(&mut self) -> Vec<f32> {
        if self.phase != EnvPhase::Terminal {
            self.refresh();
            self.phase = EnvPhase::Running;
        }
        self.aggregate.feature_vector()
    }

    fn reward(&self) -> f64 {
        self.reward_policy
            .reward(self.tick, self.aggregate.global.active_count)
    }

    fn extra_info(&self) -> String {
        format!("step:{};vehicles:{}", self.tick, self.roster.len())
    }

    fn execute_actions(&mut self, action: &[f32]) -> Result<(), BridgeError> {
        if self.phase == EnvPhase::Terminal || self.step_budget_exhausted() {
            self.metrics.rejected_actions += 1;
            warn!(tick = self.tick.0, "action rejected: episode is terminal");
            return Err(BridgeError::ActionAfterTerminal { tick: self.tick });
        }
        if action.len() != ACTION_LEN {
            warn!(
                tick = self.tick.0,
                expected = ACTION_LEN,
                got = action.len(),
                "action shape mismatch"
            );
        }
        if self.throttle.allows(self.tick) {
            debug!(tick = self.tick.0, ?action, "executing action");
        }
        self.last_action = Some(action.to_vec());
        self.tick = self.tick.next();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcdgym_core::{ActorIndex, VehicleState};
    use fcdgym_test_utils::FixedMobility;
    use fcdgym_trace::{Trajectory, TrajectoryFrame, VehicleIdRegistry};

    use crate::replay::ReplayPolicy;
    use crate::reward::RewardConfig;

    fn loaded(frames: Vec<TrajectoryFrame>, vehicles: &[&str]) -> LoadedTrace {
        let mut registry = VehicleIdRegistry::new();
        for id in vehicles {
            registry.resolve(id).unwrap();
        }
        LoadedTrace {
            trajectory: Trajectory::new(frames, 1.0).unwrap(),
            registry,
            stats: Default::default(),
        }
    }

    /// The two-vehicle trace from the loader reference example.
    fn two_vehicle_env(max_steps: u64) -> VehicularEnv {
        let frame: TrajectoryFrame = [
            (ActorIndex(0), VehicleState::new(1.0, 2.0, 3.0)),
            (ActorIndex(1), VehicleState::new(5.0, 6.0, 0.0)),
        ]
        .into_iter()
        .collect();
        let mut cfg = EnvConfig::basic();
        cfg.tick_duration = 1.0;
        cfg.sim_time = 0.0;
        cfg.max_steps = max_steps;
        cfg.reward = RewardConfig::ActiveCount { k: 0.1 };
        VehicularEnv::from_trace(&cfg, loaded(vec![frame], &["A", "B"])).unwrap()
    }

    #[test]
    fn tick_zero_aggregate() {
        let mut env = two_vehicle_env(0);
        assert_eq!(env.phase(), EnvPhase::Init);
        let obs = env.observation();
        assert_eq!(env.phase(), EnvPhase::Running);
        assert_eq!(obs.len(), 4 + 3 * 2);
        assert_eq!(&obs[..4], &[2.0, 1.5, 3.0, 4.0]);
        assert!((env.reward() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn spaces_match_roster() {
        let env = two_vehicle_env(0);
        assert_eq!(env.observation_space().element_count(), 10);
        assert_eq!(env.observation_space().low, -1000.0);
        assert_eq!(env.action_space(), BoxSpace::vector(0.0, 10.0, 4));
    }

    #[test]
    fn extra_info_format() {
        let mut env = two_vehicle_env(0);
        env.execute_actions(&[0.0; 4]).unwrap();
        assert_eq!(env.extra_info(), "step:1;vehicles:2");
    }

    #[test]
    fn execute_actions_advances_and_retains() {
        let mut env = two_vehicle_env(0);
        env.execute_actions(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(env.current_tick(), TickId(1));
        assert_eq!(env.last_action(), Some(&[1.0, 2.0, 3.0, 4.0][..]));
    }

    #[test]
    fn wrong_action_shape_is_accepted() {
        let mut env = two_vehicle_env(0);
        assert!(env.execute_actions(&[1.0]).is_ok());
        assert_eq!(env.current_tick(), TickId(1));
    }

    #[test]
    fn step_budget_rejects_and_latches() {
        let mut env = two_vehicle_env(2);
        env.execute_actions(&[0.0; 4]).unwrap();
        env.execute_actions(&[0.0; 4]).unwrap();
        assert_eq!(
            env.execute_actions(&[0.0; 4]),
            Err(BridgeError::ActionAfterTerminal { tick: TickId(2) })
        );
        assert_eq!(env.current_tick(), TickId(2));
        assert!(env.game_over());
        assert_eq!(env.phase(), EnvPhase::Terminal);
        assert_eq!(env.last_metrics().rejected_actions, 1);
    }

    #[test]
    fn time_limit_ends_episode() {
        let mut cfg = EnvConfig::basic();
        cfg.max_steps = 0;
        cfg.sim_time = 2.0;
        let mut env = VehicularEnv::from_mobility(&cfg, FixedMobility::new(3, 5.0, 1.0)).unwrap();
        env.sync_clock(Duration::from_millis(1900));
        assert!(!env.game_over());
        env.sync_clock(Duration::from_secs(2));
        assert!(env.game_over());
        // Latched even if the clock were to read earlier.
        env.sync_clock(Duration::ZERO);
        assert!(env.game_over());
        assert!(env.execute_actions(&[0.0; 4]).is_err());
    }

    #[test]
    fn terminal_observation_returns_last_features() {
        let mut cfg = EnvConfig::basic();
        cfg.max_steps = 1;
        let mut env = VehicularEnv::from_mobility(&cfg, FixedMobility::new(2, 10.0, 4.0)).unwrap();
        let before = env.observation();
        env.execute_actions(&[0.0; 4]).unwrap();
        assert!(env.game_over());
        assert_eq!(env.observation(), before);
    }

    #[test]
    fn zero_procedural_vehicles_rejected() {
        let cfg = EnvConfig::basic();
        let result = VehicularEnv::from_mobility(&cfg, FixedMobility::new(0, 1.0, 1.0));
        assert!(matches!(result, Err(ConfigError::NoActors)));
    }

    #[test]
    fn missing_trace_falls_back_to_procedural() {
        let cfg = EnvConfig::basic().with_trace("/definitely/not/here/fcd.xml");
        let env = VehicularEnv::from_config(&cfg).unwrap();
        assert!(!env.is_replaying());
        assert_eq!(env.roster_size(), cfg.vehicle_count);
    }

    #[test]
    fn missing_trace_with_zero_vehicles_is_no_actors() {
        let mut cfg = EnvConfig::basic().with_trace("/definitely/not/here/fcd.xml");
        cfg.vehicle_count = 0;
        assert!(matches!(
            VehicularEnv::from_config(&cfg),
            Err(ConfigError::NoActors)
        ));
    }

    #[test]
    fn invalid_config_rejected_before_startup() {
        let mut cfg = EnvConfig::basic();
        cfg.speed_min = 99.0;
        assert!(matches!(
            VehicularEnv::from_config(&cfg),
            Err(ConfigError::InvalidSpeedBounds { .. })
        ));
    }

    #[test]
    fn loop_policy_wraps_replay() {
        let frames: Vec<TrajectoryFrame> = vec![
            [(ActorIndex(0), VehicleState::new(0.0, 0.0, 0.0))]
                .into_iter()
                .collect(),
            [(ActorIndex(0), VehicleState::new(9.0, 0.0, 0.0))]
                .into_iter()
                .collect(),
        ];
        let mut cfg = EnvConfig::training();
        cfg.policy = ReplayPolicy::Loop;
        let mut env = VehicularEnv::from_trace(&cfg, loaded(frames, &["A"])).unwrap();
        let xs: Vec<f32> = (0..4)
            .map(|_| {
                let x = env.observation()[4];
                env.execute_actions(&[0.0; 4]).unwrap();
                x
            })
            .collect();
        assert_eq!(xs, vec![0.0, 9.0, 0.0, 9.0]);
    }

    #[test]
    fn roster_mismatch_is_counted() {
        let frame: TrajectoryFrame = [
            (ActorIndex(0), VehicleState::new(1.0, 1.0, 1.0)),
            (ActorIndex(5), VehicleState::new(2.0, 2.0, 2.0)),
        ]
        .into_iter()
        .collect();
        let env = VehicularEnv::from_trace(&EnvConfig::basic(), loaded(vec![frame], &["A"])).unwrap();
        assert_eq!(env.last_metrics().roster_mismatch_drops, 1);
        assert_eq!(env.last_metrics().active_count, 1);
    }

    #[test]
    fn custom_reward_closure() {
        let mut env = two_vehicle_env(0).with_reward_policy(|tick: TickId, n: usize| {
            tick.0 as f64 + n as f64 * 100.0
        });
        env.observation();
        assert_eq!(env.reward(), 200.0);
    }

    #[test]
    fn refresh_is_idempotent_per_tick() {
        let cfg = EnvConfig::basic();
        let mut env = VehicularEnv::from_mobility(&cfg, FixedMobility::new(2, 1.0, 1.0)).unwrap();
        let first = env.snapshot().clone();
        env.refresh();
        env.refresh();
        assert_eq!(env.snapshot(), &first);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn game_over_is_monotonic(
                max_steps in 1u64..20,
                calls in prop::collection::vec(any::<bool>(), 1..60),
            ) {
                let mut cfg = EnvConfig::basic();
                cfg.max_steps = max_steps;
                let mut env = VehicularEnv::from_mobility(&cfg, FixedMobility::new(1, 1.0, 1.0)).unwrap();
                let mut seen_over = false;
                for act in calls {
                    let over = env.game_over();
                    prop_assert!(!seen_over || over);
                    seen_over = over;
                    let tick = env.current_tick();
                    let result = if act { env.execute_actions(&[0.0; 4]) } else { Ok(()) };
                    if over {
                        prop_assert!(result.is_err() || !act);
                        prop_assert_eq!(env.current_tick(), tick);
                    }
                    prop_assert_eq!(env.observation().len(), 4 + 3);
                }
            }
        }
    }
}
