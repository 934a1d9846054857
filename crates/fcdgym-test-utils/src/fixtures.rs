//! Trace text fixtures.
//!
//! - [`TraceBuilder`] writes FCD trace text timestep by timestep.
//! - [`sample_trace`] is a small three-vehicle trace used across crates.

use std::fmt::Write;

/// Builds FCD trace text.
///
/// Timesteps are emitted in the order they are opened; vehicle records go
/// into the most recently opened timestep.
///
/// ```
/// use fcdgym_test_utils::fixtures::TraceBuilder;
///
/// let text = TraceBuilder::new()
///     .timestep(0.0)
///     .vehicle("a", 1.0, 2.0, Some(3.0))
///     .build();
/// assert!(text.contains(r#"<vehicle id="a" x="1" y="2" speed="3"/>"#));
/// ```
#[derive(Clone, Debug, Default)]
pub struct TraceBuilder {
    body: String,
    open: bool,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the current timestep (if any) and open one at `time` seconds.
    pub fn timestep(mut self, time: f64) -> Self {
        self.close();
        let _ = writeln!(self.body, "  <timestep time=\"{time}\">");
        self.open = true;
        self
    }

    /// Add a `passenger` record.
    pub fn vehicle(self, id: &str, x: f64, y: f64, speed: Option<f64>) -> Self {
        self.typed_vehicle(id, x, y, speed, None)
    }

    /// Add a record with an explicit vehicle type.
    pub fn typed_vehicle(
        mut self,
        id: &str,
        x: f64,
        y: f64,
        speed: Option<f64>,
        vehicle_type: Option<&str>,
    ) -> Self {
        let _ = write!(self.body, "    <vehicle id=\"{id}\" x=\"{x}\" y=\"{y}\"");
        if let Some(speed) = speed {
            let _ = write!(self.body, " speed=\"{speed}\"");
        }
        if let Some(vehicle_type) = vehicle_type {
            let _ = write!(self.body, " type=\"{vehicle_type}\"");
        }
        self.body.push_str("/>\n");
        self
    }

    /// Append a raw line, e.g. a deliberately malformed record.
    pub fn raw(mut self, line: &str) -> Self {
        self.body.push_str("    ");
        self.body.push_str(line);
        self.body.push('\n');
        self
    }

    /// The finished document, with XML prologue and root element.
    pub fn build(mut self) -> String {
        self.close();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<fcd-export>\n{}</fcd-export>\n",
            self.body
        )
    }

    fn close(&mut self) {
        if self.open {
            self.body.push_str("  </timestep>\n");
            self.open = false;
        }
    }
}

/// Three vehicles over four 1-second timesteps.
///
/// - `veh0` drives east at 10 m/s for the whole trace.
/// - `veh1` appears at t=1 and leaves after t=2.
/// - `bus0` (type `bus`) is parked at (50, 50) throughout.
///
/// Actor indices in first-seen order: `veh0`=0, `bus0`=1, `veh1`=2.
pub fn sample_trace() -> String {
    TraceBuilder::new()
        .timestep(0.0)
        .vehicle("veh0", 0.0, 0.0, Some(10.0))
        .typed_vehicle("bus0", 50.0, 50.0, Some(0.0), Some("bus"))
        .timestep(1.0)
        .vehicle("veh0", 10.0, 0.0, Some(10.0))
        .typed_vehicle("bus0", 50.0, 50.0, Some(0.0), Some("bus"))
        .vehicle("veh1", 100.0, 20.0, Some(5.0))
        .timestep(2.0)
        .vehicle("veh0", 20.0, 0.0, Some(10.0))
        .typed_vehicle("bus0", 50.0, 50.0, Some(0.0), Some("bus"))
        .vehicle("veh1", 105.0, 20.0, Some(5.0))
        .timestep(3.0)
        .vehicle("veh0", 30.0, 0.0, Some(10.0))
        .typed_vehicle("bus0", 50.0, 50.0, Some(0.0), Some("bus"))
        .build()
}
