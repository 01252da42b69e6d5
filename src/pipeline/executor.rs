//! Graph worker: owns a `BlockGraph` on a dedicated thread.
//!
//! The graph itself is single-threaded: every write and its whole cascade
//! run on the thread that owns it. Producers on other threads go through
//! `GraphBridge`, and the worker applies their commands in arrival order.
//!
//! The loop:
//! 1. Block on the next command.
//! 2. Apply it to the graph.
//! 3. Report failed writes as `SinkMessage::WriteError` and keep going.
//!
//! It exits on `GraphCommand::Shutdown` or once every bridge is dropped, and
//! hands the graph back so callers can collect observer state. The worker
//! never blocks on the message channel: replies are dropped when it is full.

use crate::pipeline::bridge::{GraphBridge, GraphCommand, SinkMessage};
use crate::pipeline::graph::BlockGraph;
use crate::pipeline::value::Sample;
use crossbeam_channel::{Receiver, Sender};
use std::io;
use std::thread::JoinHandle;
use std::time::Duration;

pub struct GraphWorker {
    graph: BlockGraph,
    cmd_rx: Receiver<GraphCommand>,
    msg_tx: Sender<SinkMessage>,
    errors: u64,
}

impl GraphWorker {
    pub fn new(
        graph: BlockGraph,
        cmd_rx: Receiver<GraphCommand>,
        msg_tx: Sender<SinkMessage>,
    ) -> Self {
        Self {
            graph,
            cmd_rx,
            msg_tx,
            errors: 0,
        }
    }

    /// Start a worker thread for `graph` and return the producer-side bridge.
    pub fn spawn(graph: BlockGraph) -> io::Result<(GraphBridge, JoinHandle<BlockGraph>)> {
        let (bridge, cmd_rx, msg_tx) = GraphBridge::new();
        let handle = Self::new(graph, cmd_rx, msg_tx).start()?;
        Ok((bridge, handle))
    }

    /// Run this worker on a named thread.
    pub fn start(self) -> io::Result<JoinHandle<BlockGraph>> {
        std::thread::Builder::new()
            .name("imu-graph".to_string())
            .spawn(move || self.run())
    }

    /// Run the command loop on the current thread until shutdown.
    pub fn run(mut self) -> BlockGraph {
        tracing::info!("Graph worker started ({} nodes)", self.graph.len());

        while let Ok(cmd) = self.cmd_rx.recv() {
            match cmd {
                GraphCommand::Write {
                    identifier,
                    sample,
                    timestamp,
                } => self.handle_write(identifier, sample, timestamp),
                GraphCommand::RequestStats => {
                    let _ = self.msg_tx.try_send(SinkMessage::Stats(self.graph.stats()));
                }
                GraphCommand::Shutdown => break,
            }
        }

        if self.errors > 0 {
            tracing::warn!("Graph worker saw {} failed writes", self.errors);
        }
        let _ = self.msg_tx.try_send(SinkMessage::Shutdown);
        tracing::info!("Graph worker exiting");
        self.graph
    }

    fn handle_write(&mut self, identifier: String, sample: Sample, timestamp: Option<Duration>) {
        let timestamp = timestamp.unwrap_or_else(|| self.graph.elapsed());
        if let Err(error) = self.graph.write_sample(&identifier, &sample, timestamp) {
            self.errors += 1;
            tracing::debug!("Write to '{}' failed: {}", identifier, error);
            let _ = self
                .msg_tx
                .try_send(SinkMessage::WriteError { identifier, error });
        }
    }
}
