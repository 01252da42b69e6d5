//! Bridge types for communication between producer threads and the graph worker.
//!
//! `GraphBridge` is the producer-side handle: device loops, replay and the CLI
//! send `GraphCommand`s through it and drain `SinkMessage`s that channel sinks
//! and the worker send back.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::graph::GraphStats;
use crate::pipeline::value::Sample;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Messages sent from the graph thread back to producers and consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkMessage {
    /// A node changed.
    Update {
        identifier: String,
        timestamp: Duration,
        sample: Sample,
    },
    /// A queued write failed. The worker keeps running.
    WriteError {
        identifier: String,
        error: PipelineError,
    },
    /// Counters, in reply to `GraphCommand::RequestStats`.
    Stats(GraphStats),
    /// The worker has exited.
    Shutdown,
}

/// Commands sent from producers to the graph thread.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphCommand {
    /// Write a sample. `None` timestamps with the graph clock.
    Write {
        identifier: String,
        sample: Sample,
        timestamp: Option<Duration>,
    },
    /// Request current statistics.
    RequestStats,
    /// Shut down the graph thread.
    Shutdown,
}

/// Channel capacity for commands (producers → graph).
pub const CMD_CHANNEL_CAPACITY: usize = 1024;
/// Channel capacity for messages (graph → consumers).
pub const MSG_CHANNEL_CAPACITY: usize = 10_000;

/// Producer-side handle for communicating with the graph thread.
#[derive(Clone)]
pub struct GraphBridge {
    pub cmd_tx: Sender<GraphCommand>,
    pub msg_rx: Receiver<SinkMessage>,
}

impl GraphBridge {
    /// Create a new bridge: `(bridge, cmd_rx, msg_tx)`.
    ///
    /// The graph thread owns `cmd_rx` and `msg_tx`.
    pub fn new() -> (Self, Receiver<GraphCommand>, Sender<SinkMessage>) {
        Self::with_capacity(CMD_CHANNEL_CAPACITY, MSG_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(
        commands: usize,
        messages: usize,
    ) -> (Self, Receiver<GraphCommand>, Sender<SinkMessage>) {
        let (cmd_tx, cmd_rx) = bounded(commands);
        let (msg_tx, msg_rx) = bounded(messages);
        (Self { cmd_tx, msg_rx }, cmd_rx, msg_tx)
    }

    // --- Commands ---

    pub fn send_command(&self, cmd: GraphCommand) -> PipelineResult<()> {
        self.cmd_tx.send(cmd).map_err(|_| PipelineError::NotRunning)
    }

    /// Queue a write. Blocks while the command channel is full.
    pub fn write(
        &self,
        identifier: impl Into<String>,
        sample: Sample,
        timestamp: Option<Duration>,
    ) -> PipelineResult<()> {
        self.send_command(GraphCommand::Write {
            identifier: identifier.into(),
            sample,
            timestamp,
        })
    }

    pub fn request_stats(&self) -> PipelineResult<()> {
        self.send_command(GraphCommand::RequestStats)
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(GraphCommand::Shutdown);
    }

    // --- Messages ---

    /// Drain all pending messages.
    pub fn drain(&self) -> Vec<SinkMessage> {
        self.msg_rx.try_iter().collect()
    }

    /// Try to receive a single message without blocking.
    pub fn try_recv(&self) -> Option<SinkMessage> {
        self.msg_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a message. `None` on timeout or once the
    /// worker is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SinkMessage> {
        match self.msg_rx.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_after_worker_gone() {
        let (bridge, cmd_rx, _msg_tx) = GraphBridge::new();
        drop(cmd_rx);
        assert_eq!(
            bridge.write("accel_x", Sample::Float(1.0), None),
            Err(PipelineError::NotRunning)
        );
    }

    #[test]
    fn test_drain_collects_in_order() {
        let (bridge, cmd_rx, msg_tx) = GraphBridge::new();
        bridge.write("accel_x", Sample::Int(1), None).unwrap();
        assert!(matches!(
            cmd_rx.try_recv().unwrap(),
            GraphCommand::Write { .. }
        ));

        msg_tx.send(SinkMessage::Stats(GraphStats::default())).unwrap();
        msg_tx.send(SinkMessage::Shutdown).unwrap();
        let msgs = bridge.drain();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1], SinkMessage::Shutdown);
        assert!(bridge.try_recv().is_none());
    }
}
