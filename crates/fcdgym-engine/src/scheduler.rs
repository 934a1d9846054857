//! Periodic step scheduler.
//!
//! [`StepScheduler`] re-arms a tick callback on an [`EventQueue`] at a
//! fixed interval. Each firing:
//!
//! 1. hands the current simulation time to the environment and refreshes
//!    its snapshot for the current tick;
//! 2. publishes game-over, observation, reward and extra-info through the
//!    [`Transport`] and waits for the agent's reply;
//! 3. executes the returned action;
//! 4. stops if the episode is now over, otherwise re-arms one interval
//!    later unless that would pass the stop time.
//!
//! The scheduler owns no simulation state. It holds the environment and
//! the transport for the duration of [`run`](StepScheduler::run) only.

use std::fmt;
use std::time::Duration;

use fcdgym_core::{AgentReply, EnvState, EnvironmentBridge, TickId, Transport};
use tracing::{info, warn};

use crate::bridge::VehicularEnv;
use crate::clock::EventQueue;
use crate::config::EnvConfig;

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The environment reported game over.
    GameOver,
    /// The environment refused the agent's action.
    ActionRejected,
    /// The agent ended the session.
    SessionEnded,
    /// The transport failed.
    TransportClosed,
    /// The next firing would fall past the stop time.
    TimeLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::GameOver => "game over",
            Self::ActionRejected => "action rejected",
            Self::SessionEnded => "session ended by agent",
            Self::TransportClosed => "transport closed",
            Self::TimeLimit => "time limit",
        };
        f.write_str(s)
    }
}

/// Outcome of [`StepScheduler::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Number of firings, including the one that stopped the run.
    pub firings: u64,
    /// Environment tick when the run stopped.
    pub final_tick: TickId,
    /// Simulation time of the last firing.
    pub final_time: Duration,
    /// Why the run stopped.
    pub stop_reason: StopReason,
}

#[derive(Debug)]
enum Event {
    Fire,
}

/// Drives one episode on a virtual clock.
#[derive(Debug)]
pub struct StepScheduler {
    interval: Duration,
    stop_time: Option<Duration>,
    queue: EventQueue<Event>,
}

impl StepScheduler {
    /// A scheduler firing every `interval`, stopping before any firing
    /// later than `stop_time`.
    pub fn new(interval: Duration, stop_time: Option<Duration>) -> Self {
        Self {
            interval,
            stop_time,
            queue: EventQueue::new(),
        }
    }

    /// Interval and stop time from `config`. The stop time is extended
    /// when needed so that a bounded step budget can be reached.
    pub fn from_config(config: &EnvConfig) -> Self {
        let stop_time = config.stop_time();
        if config.max_steps > 0 && stop_time.is_some_and(|t| t > config.sim_time) {
            info!(
                requested = config.sim_time,
                extended = stop_time.unwrap_or_default(),
                max_steps = config.max_steps,
                "simulation time extended to reach the step budget"
            );
        }
        Self::new(
            config.tick_interval(),
            stop_time.and_then(|t| Duration::try_from_secs_f64(t).ok()),
        )
    }

    /// Run the episode to completion.
    ///
    /// Sends the spaces handshake, fires at time 0 and every interval
    /// after, and finally notifies the transport that the simulation
    /// ended.
    pub fn run(&mut self, env: &mut VehicularEnv, transport: &mut dyn Transport) -> RunSummary {
        self.queue.clear();
        let mut firings = 0;

        let stop_reason = match transport.handshake(&env.observation_space(), &env.action_space())
        {
            Ok(()) => {
                self.queue.schedule(self.queue.now(), Event::Fire);
                loop {
                    let Some((now, Event::Fire)) = self.queue.pop() else {
                        break StopReason::TimeLimit;
                    };
                    firings += 1;
                    if let Some(reason) = self.fire(now, env, transport) {
                        break reason;
                    }
                }
            }
            Err(error) => {
                warn!(%error, "handshake failed");
                StopReason::TransportClosed
            }
        };

        transport.notify_simulation_end();
        let summary = RunSummary {
            firings,
            final_tick: env.current_tick(),
            final_time: env.elapsed(),
            stop_reason,
        };
        info!(
            firings = summary.firings,
            final_tick = summary.final_tick.0,
            final_time = summary.final_time.as_secs_f64(),
            reason = %summary.stop_reason,
            "simulation ended"
        );
        summary
    }

    fn fire(
        &mut self,
        now: Duration,
        env: &mut VehicularEnv,
        transport: &mut dyn Transport,
    ) -> Option<StopReason> {
        env.sync_clock(now);
        env.refresh();

        let game_over = env.game_over();
        let state = EnvState {
            tick: env.current_tick(),
            game_over,
            observation: env.observation(),
            reward: env.reward(),
            extra_info: env.extra_info(),
        };
        let reply = match transport.exchange(state) {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, tick = env.current_tick().0, "transport failed");
                return Some(StopReason::TransportClosed);
            }
        };
        if game_over {
            return Some(StopReason::GameOver);
        }

        match reply {
            AgentReply::EndSession => return Some(StopReason::SessionEnded),
            AgentReply::Action(action) => {
                if env.execute_actions(&action).is_err() {
                    return Some(StopReason::ActionRejected);
                }
            }
        }

        if env.game_over() {
            info!(tick = env.current_tick().0, "episode over, schedule stopped");
            return Some(StopReason::GameOver);
        }
        let next = now + self.interval;
        if self.stop_time.is_some_and(|stop| next > stop) {
            return Some(StopReason::TimeLimit);
        }
        self.queue.schedule(next, Event::Fire);
        None
    }
}
