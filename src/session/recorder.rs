//! Session recorder for capturing IMU sessions

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{ImuError, Result};
use crate::pipeline::Sample;

use super::types::{RecordedFrame, SessionMetadata, SessionRecording, SessionState};

/// Outcome of offering one sample to the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Stored in a new or existing frame
    Recorded,
    /// Not recording
    Inactive,
    /// Within the sample interval of the previous value for this channel
    Throttled,
    /// Frame limit reached
    Full,
}

/// Session recorder for capturing IMU sessions
#[derive(Debug)]
pub struct SessionRecorder {
    /// Current recording state
    state: SessionState,
    /// Current recording
    recording: SessionRecording,
    /// Maximum number of frames to record (0 = unlimited)
    max_frames: usize,
    /// Minimum spacing between two recorded values of one channel
    sample_interval: Duration,
    /// Last recorded time for each channel
    last_recorded: HashMap<String, Duration>,
    /// Samples rejected because the frame limit was reached
    overflow: u64,
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRecorder {
    /// Create a new session recorder that keeps every sample
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            recording: SessionRecording::new(),
            max_frames: 0,
            sample_interval: Duration::ZERO,
            last_recorded: HashMap::new(),
            overflow: 0,
        }
    }

    /// Create with a specific sample interval
    pub fn with_sample_interval(sample_interval: Duration) -> Self {
        Self {
            sample_interval,
            ..Self::new()
        }
    }

    /// Set maximum number of frames to record
    pub fn set_max_frames(&mut self, max: usize) {
        self.max_frames = max;
    }

    pub fn set_sample_interval(&mut self, interval: Duration) {
        self.sample_interval = interval;
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if recording
    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// Get the current recording
    pub fn recording(&self) -> &SessionRecording {
        &self.recording
    }

    /// Samples dropped because of the frame limit
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Take the recording, returning the recorder to idle.
    ///
    /// A recording still in progress is finalized first.
    pub fn take_recording(&mut self) -> SessionRecording {
        if self.state == SessionState::Recording {
            self.recording.finalize();
        }
        self.state = SessionState::Idle;
        self.last_recorded.clear();
        std::mem::take(&mut self.recording)
    }

    /// Start a new recording. Fails on invalid metadata or if a recording
    /// is already running.
    pub fn start_recording(&mut self, metadata: SessionMetadata) -> Result<()> {
        if self.is_recording() {
            return Err(ImuError::Session(format!(
                "already recording '{}'",
                self.recording.metadata.name
            )));
        }
        metadata.validate()?;

        tracing::info!(
            "Recording session '{}' ({}, {})",
            metadata.name,
            metadata.device,
            metadata.position
        );
        self.recording = SessionRecording::with_metadata(metadata);
        self.last_recorded.clear();
        self.overflow = 0;
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Stop recording
    pub fn stop_recording(&mut self) {
        if self.state == SessionState::Recording {
            self.recording.finalize();
            self.state = SessionState::Stopped;
            tracing::info!(
                "Stopped recording '{}': {} frames, {} samples",
                self.recording.metadata.name,
                self.recording.frame_count(),
                self.recording.metadata.total_samples
            );
            if self.overflow > 0 {
                tracing::warn!(
                    "Recorder frame limit reached, {} samples discarded",
                    self.overflow
                );
            }
        }
    }

    /// Cancel recording (discard data)
    pub fn cancel_recording(&mut self) {
        self.recording = SessionRecording::new();
        self.last_recorded.clear();
        self.state = SessionState::Idle;
    }

    /// Record one channel value.
    ///
    /// Values with the same timestamp share a frame; frames stay sorted by
    /// timestamp even if samples arrive out of order.
    pub fn record_sample(
        &mut self,
        timestamp: Duration,
        identifier: &str,
        sample: Sample,
    ) -> RecordOutcome {
        if !self.is_recording() {
            return RecordOutcome::Inactive;
        }

        let throttled = self
            .last_recorded
            .get(identifier)
            .map(|last| {
                timestamp >= *last && timestamp.saturating_sub(*last) < self.sample_interval
            })
            .unwrap_or(false);
        if throttled {
            return RecordOutcome::Throttled;
        }

        let frames = &mut self.recording.frames;
        let idx = frames.partition_point(|f| f.timestamp < timestamp);
        let shared = frames.get(idx).is_some_and(|f| f.timestamp == timestamp);
        if shared {
            frames[idx].values.insert(identifier.to_string(), sample);
        } else {
            if self.max_frames > 0 && frames.len() >= self.max_frames {
                self.overflow += 1;
                return RecordOutcome::Full;
            }
            let mut frame = RecordedFrame::new(timestamp);
            frame.values.insert(identifier.to_string(), sample);
            frames.insert(idx, frame);
        }

        self.last_recorded.insert(identifier.to_string(), timestamp);
        RecordOutcome::Recorded
    }
}
