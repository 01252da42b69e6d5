//! RecorderSink observer: records notified nodes into a session.
//!
//! Built on `SessionRecorder`; the sink only pulls the changed value and
//! forwards it with the write timestamp.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::observer::{NotifyContext, Observer};
use crate::session::{RecordOutcome, SessionRecorder};
use std::any::Any;
use std::collections::HashSet;

pub struct RecorderSink {
    recorder: SessionRecorder,
    /// When set, only these identifiers are recorded.
    channels: Option<HashSet<String>>,
    recorded: u64,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new(SessionRecorder::new())
    }
}

impl RecorderSink {
    pub fn new(recorder: SessionRecorder) -> Self {
        Self {
            recorder,
            channels: None,
            recorded: 0,
        }
    }

    /// Restrict recording to the given identifiers.
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = Some(channels.into_iter().map(Into::into).collect());
        self
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut SessionRecorder {
        &mut self.recorder
    }

    /// Samples stored since the sink was created.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    fn accepts(&self, identifier: &str) -> bool {
        self.channels
            .as_ref()
            .map_or(true, |set| set.contains(identifier))
    }
}

impl Observer for RecorderSink {
    fn name(&self) -> &str {
        "RecorderSink"
    }

    fn notify(&mut self, identifier: &str, ctx: &mut NotifyContext<'_>) -> PipelineResult<()> {
        if !self.recorder.is_recording() || !self.accepts(identifier) {
            return Ok(());
        }

        let sample = ctx.sample(identifier)?;
        if self.recorder.record_sample(ctx.timestamp(), identifier, sample)
            == RecordOutcome::Recorded
        {
            self.recorded += 1;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
