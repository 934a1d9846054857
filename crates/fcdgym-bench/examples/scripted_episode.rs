//! End-to-end episode with an agent on its own thread.
//!
//! Demonstrates: write a trace → VehicularEnv::from_config →
//! StepScheduler::run against a ChannelTransport, with the agent reading
//! states and answering with actions from another thread.
//!
//! Run with `RUST_LOG=fcdgym_engine=debug` to see per-tick messages.

use std::thread;

use fcdgym_bench::{reference_config, synthetic_trace};
use fcdgym_engine::{channel_pair, EnvMessage, StepScheduler, VehicularEnv};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::temp_dir().join("fcdgym-scripted-episode.xml");
    std::fs::write(&path, synthetic_trace(20, 300, 7)).unwrap();

    let mut cfg = reference_config().with_trace(&path);
    cfg.max_steps = 200;
    cfg.log_interval = 50;
    let mut env = VehicularEnv::from_config(&cfg).unwrap();

    let (mut transport, agent) = channel_pair();
    let agent_thread = thread::spawn(move || {
        let mut total_reward = 0.0;
        loop {
            match agent.recv() {
                Ok(EnvMessage::Spaces {
                    observation,
                    action,
                }) => {
                    tracing::info!(%observation, %action, "agent received spaces");
                }
                Ok(EnvMessage::State(state)) => {
                    total_reward += state.reward;
                    if state.tick.0 % 50 == 0 {
                        tracing::info!(
                            tick = state.tick.0,
                            active = state.observation[0],
                            reward = state.reward,
                            info = %state.extra_info,
                            "agent observed state"
                        );
                    }
                    // Cycle through the four action dimensions.
                    let mut action = vec![0.0; 4];
                    action[(state.tick.0 % 4) as usize] = 10.0;
                    if agent.send_action(action).is_err() {
                        break;
                    }
                }
                Ok(EnvMessage::SimulationEnd) | Err(_) => break,
            }
        }
        total_reward
    });

    let summary = StepScheduler::from_config(&cfg).run(&mut env, &mut transport);
    drop(transport);
    let total_reward = agent_thread.join().unwrap();
    let _ = std::fs::remove_file(&path);

    println!(
        "stopped after {} firings at tick {} ({:.1} s): {}",
        summary.firings,
        summary.final_tick,
        summary.final_time.as_secs_f64(),
        summary.stop_reason
    );
    println!("total reward: {total_reward:.2}");
    println!("last refresh: {:?}", env.last_metrics());
}
