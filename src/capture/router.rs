use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error};

use super::output::append_line;
use super::session::SessionHandle;
use crate::types::{Sample, SensorEvent};

/// What happened to one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Written,
    NotRecording,
    WarmingUp,
    UnrecognizedSensor,
    MalformedValues,
    WriteFailed,
}

/// Routes inbound sensor events to the stream file of the active session.
pub struct SampleRouter {
    session: Arc<SessionHandle>,
    warmup: Duration,
}

impl SampleRouter {
    pub fn new(session: Arc<SessionHandle>, warmup: Duration) -> Self {
        Self { session, warmup }
    }

    /// Routes an event that arrived at `received_at`. Never fails: write errors are logged
    /// and counted.
    pub fn route(&self, event: &SensorEvent, received_at: Instant) -> RouteOutcome {
        if !self.session.is_recording() {
            return RouteOutcome::NotRecording;
        }

        // held until the append completes so stop() cannot trim underneath us
        let guard = self.session.read();
        let Some(active) = guard.as_ref() else {
            return RouteOutcome::NotRecording;
        };

        if active.elapsed_at(received_at) < self.warmup {
            return RouteOutcome::WarmingUp;
        }

        let Some(path) = active.files.path_for(event.sensor_type) else {
            debug!("Dropping event of unrecognized sensor type");
            return RouteOutcome::UnrecognizedSensor;
        };

        let Some(sample) = Sample::from_event(self.session.activity().code(), event) else {
            return RouteOutcome::MalformedValues;
        };

        match append_line(path, &sample.to_csv_line()) {
            Ok(()) => {
                self.session.counters.record_written(event.sensor_type);
                RouteOutcome::Written
            }
            Err(e) => {
                error!("Failed to append to {}: {}", path.display(), e);
                self.session.counters.record_failed(event.sensor_type);
                RouteOutcome::WriteFailed
            }
        }
    }
}
