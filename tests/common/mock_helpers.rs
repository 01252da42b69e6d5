//! Mock observers and channel helpers

use crossbeam_channel::{bounded, Receiver, Sender};
use imu_blocks::pipeline::{NotifyContext, Observer, PipelineResult, Sample};
use std::any::Any;
use std::sync::{Arc, Mutex};

/// Shared log of `(identifier, value pulled on notify)`
pub type NotifyLog = Arc<Mutex<Vec<(String, Sample)>>>;

/// Observer that pulls the notified node's value and appends it to a log
/// the test keeps a handle on.
pub struct RecordingObserver {
    name: String,
    log: NotifyLog,
}

impl RecordingObserver {
    pub fn new(name: &str) -> (Self, NotifyLog) {
        let log = NotifyLog::default();
        (
            Self {
                name: name.to_string(),
                log: log.clone(),
            },
            log,
        )
    }
}

impl Observer for RecordingObserver {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&mut self, identifier: &str, ctx: &mut NotifyContext<'_>) -> PipelineResult<()> {
        let sample = ctx.sample(identifier)?;
        self.log
            .lock()
            .unwrap()
            .push((identifier.to_string(), sample));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Snapshot of a log
pub fn entries(log: &NotifyLog) -> Vec<(String, Sample)> {
    log.lock().unwrap().clone()
}

/// Create a test channel with default size
pub fn create_test_channel<T>() -> (Sender<T>, Receiver<T>) {
    bounded(64)
}
