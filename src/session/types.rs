//! Session data types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ImuError, Result};
use crate::pipeline::Sample;
use crate::types::{ImuDevice, ImuPosition};

/// State of session recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No active session
    #[default]
    Idle,
    /// Currently recording a session
    Recording,
    /// Session recorded, ready to be taken
    Stopped,
}

impl SessionState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, SessionState::Recording)
    }

    /// Check if has recorded data
    pub fn has_recording(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Recording => "Recording",
            SessionState::Stopped => "Stopped",
        }
    }
}

/// Metadata for a recorded session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Name of the session. Required.
    pub name: String,
    /// Device family the data came from
    pub device: ImuDevice,
    /// Where the unit was worn
    pub position: ImuPosition,
    /// Free-form notes
    pub notes: Option<String>,
    /// Folder the raw device files were taken from
    pub folder: Option<PathBuf>,
    /// When the session was recorded
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    /// Nominal sample rate (Hz)
    pub sample_rate_hz: u32,
    /// Total duration of the session
    pub duration: Duration,
    /// Number of samples recorded, across all channels
    pub total_samples: usize,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            device: ImuDevice::default(),
            position: ImuPosition::default(),
            notes: None,
            folder: None,
            recorded_at: chrono::Utc::now(),
            sample_rate_hz: 50,
            duration: Duration::ZERO,
            total_samples: 0,
        }
    }
}

impl SessionMetadata {
    /// Create new metadata with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device: ImuDevice) -> Self {
        self.device = device;
        self
    }

    pub fn with_position(mut self, position: ImuPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_sample_rate(mut self, hz: u32) -> Self {
        self.sample_rate_hz = hz;
        self
    }

    /// Check the fields a recording cannot start without
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ImuError::Session("session name is required".to_string()));
        }
        if self.sample_rate_hz == 0 {
            return Err(ImuError::Session(
                "sample rate must be greater than zero".to_string(),
            ));
        }
        if let ImuDevice::Other(name) = &self.device {
            if name.trim().is_empty() {
                return Err(ImuError::Session("device name is empty".to_string()));
            }
        }
        Ok(())
    }
}

/// All channel values sharing one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Time offset from start of recording
    pub timestamp: Duration,
    /// Node identifier to value
    pub values: BTreeMap<String, Sample>,
}

impl RecordedFrame {
    pub fn new(timestamp: Duration) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }
}

/// A complete recorded session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRecording {
    /// Session metadata
    pub metadata: SessionMetadata,
    /// Recorded data frames (sorted by timestamp)
    pub frames: Vec<RecordedFrame>,
}

impl SessionRecording {
    /// Create a new empty recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with metadata
    pub fn with_metadata(metadata: SessionMetadata) -> Self {
        Self {
            metadata,
            frames: Vec::new(),
        }
    }

    /// Time span covered by the frames
    pub fn duration(&self) -> Duration {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.timestamp.saturating_sub(first.timestamp),
            _ => Duration::ZERO,
        }
    }

    /// Get the number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total values across all frames
    pub fn sample_count(&self) -> usize {
        self.frames.iter().map(|f| f.values.len()).sum()
    }

    /// Check if the recording is empty
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Identifiers that appear in at least one frame
    pub fn channels(&self) -> BTreeSet<&str> {
        self.frames
            .iter()
            .flat_map(|f| f.values.keys().map(|k| k.as_str()))
            .collect()
    }

    /// Time series of one channel
    pub fn channel_series(&self, identifier: &str) -> Vec<(Duration, Sample)> {
        self.frames
            .iter()
            .filter_map(|f| f.values.get(identifier).map(|s| (f.timestamp, s.clone())))
            .collect()
    }

    /// Time series of one channel within `[start, end]`
    pub fn channel_series_between(
        &self,
        identifier: &str,
        start: Duration,
        end: Duration,
    ) -> Vec<(Duration, Sample)> {
        self.channel_series(identifier)
            .into_iter()
            .filter(|(t, _)| *t >= start && *t <= end)
            .collect()
    }

    /// Find the frame index at or before a given time
    pub fn find_frame_at(&self, time: Duration) -> Option<usize> {
        if self.frames.is_empty() {
            return None;
        }

        let idx = self.frames.partition_point(|f| f.timestamp <= time);
        if idx == 0 {
            Some(0)
        } else {
            Some(idx - 1)
        }
    }

    /// Serialize the recording to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Finalize the recording by updating metadata
    pub fn finalize(&mut self) {
        self.metadata.duration = self.duration();
        self.metadata.total_samples = self.sample_count();
    }
}
