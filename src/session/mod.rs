//! Session recording module
//!
//! A session is one continuous capture from a single IMU: metadata describing
//! who, where and with what device, plus the channel values grouped into
//! timestamped frames.
//!
//! # Features
//!
//! - Record sessions from the block graph through a `RecorderSink` observer
//! - Per-channel sample interval and optional frame limit
//! - Per-channel series extraction and time lookup on finished recordings

pub mod recorder;
pub mod types;

pub use recorder::{RecordOutcome, SessionRecorder};
pub use types::{RecordedFrame, SessionMetadata, SessionRecording, SessionState};
