//! Trace loader: FCD text → [`Trajectory`].
//!
//! [`TraceLoader`] parses in two passes over owned data. The first pass
//! scans tags, resolves vehicle ids and collects `(tick, actor, state)`
//! records; the second allocates the frame arena once, at its final
//! size, and fills it in record order (so the last record for an actor
//! within a tick wins).

use std::fs;
use std::io::Read;
use std::path::Path;

use fcdgym_core::{ActorIndex, VehicleState, DEFAULT_VEHICLE_TYPE};
use tracing::{debug, info};

use crate::codec::{tags, Tag};
use crate::error::{RecordError, TraceError};
use crate::registry::VehicleIdRegistry;
use crate::types::{effective_tick_duration, Trajectory, TrajectoryFrame};

/// Tick duration substituted when the configured one is not positive.
pub const DEFAULT_TICK_DURATION: f64 = 0.1;

/// Default ceiling on the number of frames one trace may span (a little
/// over 29 hours at 0.1 s per tick).
pub const DEFAULT_MAX_FRAMES: usize = 1 << 20;

/// Counters describing one load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Timestep records whose time was accepted.
    pub timesteps: usize,
    /// Timestep records skipped (missing or invalid `time`, or a time
    /// past the frame ceiling).
    pub skipped_timesteps: usize,
    /// Vehicle records stored in a frame.
    pub vehicle_records: usize,
    /// Vehicle records skipped as malformed.
    pub skipped_records: usize,
}

/// A successfully loaded trace.
#[derive(Clone, Debug)]
pub struct LoadedTrace {
    /// The replay source.
    pub trajectory: Trajectory,
    /// Id ↔ index mapping built during the load.
    pub registry: VehicleIdRegistry,
    /// Load counters.
    pub stats: LoadStats,
}

impl LoadedTrace {
    /// Number of distinct vehicles (the registry size).
    pub fn vehicle_count(&self) -> usize {
        self.registry.len()
    }

    /// Time of the last frame in seconds.
    pub fn max_time(&self) -> f64 {
        self.trajectory.max_time()
    }
}

/// Parses FCD traces at a fixed tick duration.
///
/// # Examples
///
/// ```
/// use fcdgym_core::ActorIndex;
/// use fcdgym_trace::TraceLoader;
///
/// let text = r#"
/// <timestep time="0.0">
///   <vehicle id="A" x="1" y="2" speed="3"/>
///   <vehicle id="B" x="5" y="6"/>
/// </timestep>"#;
/// let trace = TraceLoader::new(1.0).load_str(text).unwrap();
/// let frame = trace.trajectory.frame(0).unwrap();
/// assert_eq!(trace.vehicle_count(), 2);
/// assert_eq!(frame.get(ActorIndex(1)).unwrap().speed, 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceLoader {
    tick_duration: f64,
    max_frames: usize,
}

impl TraceLoader {
    /// A loader quantizing time at `tick_duration` seconds per tick.
    ///
    /// A non-positive or non-finite duration is replaced with
    /// [`DEFAULT_TICK_DURATION`].
    pub fn new(tick_duration: f64) -> Self {
        Self {
            tick_duration: effective_tick_duration(tick_duration),
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }

    /// Limit the trace to `max_frames` frames (at least 1). A timestep
    /// whose tick falls at or past the limit is skipped.
    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames.max(1);
        self
    }

    /// The effective tick duration in seconds.
    pub fn tick_duration(&self) -> f64 {
        self.tick_duration
    }

    /// The frame ceiling.
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Quantize a time in seconds to a tick index. Saturates at
    /// `u64::MAX`.
    pub fn tick_for(&self, time: f64) -> u64 {
        (time / self.tick_duration).round() as u64
    }

    /// Tick index of `time` if it lies below the frame ceiling.
    fn frame_tick(&self, time: f64) -> Option<usize> {
        let tick = (time / self.tick_duration).round();
        (tick < self.max_frames as f64).then_some(tick as usize)
    }

    /// Load a trace from a file.
    ///
    /// # Errors
    ///
    /// [`TraceError::Unavailable`] if the file cannot be opened or read;
    /// otherwise as [`load_str`](Self::load_str).
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedTrace, TraceError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| TraceError::Unavailable {
            path: Some(path.to_path_buf()),
            source,
        })?;
        let trace = self.load_bytes(&bytes)?;
        info!(
            path = %path.display(),
            vehicles = trace.vehicle_count(),
            frames = trace.trajectory.frame_count(),
            max_time = trace.max_time(),
            skipped = trace.stats.skipped_records,
            "loaded mobility trace"
        );
        Ok(trace)
    }

    /// Load a trace from any reader.
    pub fn load_reader<R: Read>(&self, mut reader: R) -> Result<LoadedTrace, TraceError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.load_bytes(&bytes)
    }

    /// Load a trace from raw bytes. Invalid UTF-8 sequences become
    /// U+FFFD and only affect the records that contain them.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<LoadedTrace, TraceError> {
        self.load_str(&String::from_utf8_lossy(bytes))
    }

    /// Load a trace from in-memory text.
    ///
    /// # Errors
    ///
    /// [`TraceError::Empty`] if no well-formed vehicle record was found,
    /// [`TraceError::RegistryFull`] if the trace names more vehicles than
    /// an actor index can address.
    pub fn load_str(&self, text: &str) -> Result<LoadedTrace, TraceError> {
        let mut registry = VehicleIdRegistry::new();
        let mut stats = LoadStats::default();
        let mut records: Vec<(usize, ActorIndex, VehicleState)> = Vec::new();
        let mut current_tick = 0;

        for tag in tags(text) {
            match tag.name {
                "timestep" => match parse_time(&tag).and_then(|time| {
                    self.frame_tick(time).ok_or(RecordError::InvalidNumber {
                        name: "time",
                        value: time.to_string(),
                    })
                }) {
                    Ok(tick) => {
                        current_tick = tick;
                        stats.timesteps += 1;
                    }
                    Err(reason) => {
                        stats.skipped_timesteps += 1;
                        debug!(%reason, "skipping timestep record");
                    }
                },
                "vehicle" => match parse_vehicle(&tag) {
                    Ok((id, state)) => {
                        let actor = registry.resolve(id)?;
                        records.push((current_tick, actor, state));
                    }
                    Err(reason) => {
                        stats.skipped_records += 1;
                        debug!(%reason, id = ?tag.attribute("id"), "skipping vehicle record");
                    }
                },
                _ => {}
            }
        }

        stats.vehicle_records = records.len();
        let Some(last_tick) = records.iter().map(|(tick, _, _)| *tick).max() else {
            return Err(TraceError::Empty {
                vehicle_records: 0,
                skipped_records: stats.skipped_records,
            });
        };

        // last_tick < max_frames, so the frame count fits.
        let frame_count = last_tick.saturating_add(1);
        let mut frames = vec![TrajectoryFrame::new(); frame_count];
        for (tick, actor, state) in records {
            frames[tick].insert(actor, state);
        }

        Ok(LoadedTrace {
            trajectory: Trajectory::new(frames, self.tick_duration)?,
            registry,
            stats,
        })
    }
}

fn parse_number(tag: &Tag<'_>, name: &'static str) -> Result<Option<f64>, RecordError> {
    let Some(raw) = tag.non_empty_attribute(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(RecordError::InvalidNumber {
            name,
            value: raw.to_string(),
        }),
    }
}

fn require_number(tag: &Tag<'_>, name: &'static str) -> Result<f64, RecordError> {
    parse_number(tag, name)?.ok_or(RecordError::MissingAttribute { name })
}

fn parse_time(tag: &Tag<'_>) -> Result<f64, RecordError> {
    let time = require_number(tag, "time")?;
    if time < 0.0 {
        return Err(RecordError::InvalidNumber {
            name: "time",
            value: time.to_string(),
        });
    }
    Ok(time)
}

fn parse_vehicle<'a>(tag: &Tag<'a>) -> Result<(&'a str, VehicleState), RecordError> {
    let id = tag
        .non_empty_attribute("id")
        .ok_or(RecordError::MissingAttribute { name: "id" })?;
    let x = require_number(tag, "x")?;
    let y = require_number(tag, "y")?;
    let speed = parse_number(tag, "speed")?.unwrap_or(0.0);
    let vehicle_type = tag
        .non_empty_attribute("type")
        .unwrap_or(DEFAULT_VEHICLE_TYPE);
    Ok((id, VehicleState::new(x, y, speed).with_type(vehicle_type)))
}
