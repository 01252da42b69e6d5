//! ChannelSink observer: forwards node updates over a crossbeam channel.

use crate::pipeline::bridge::SinkMessage;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::observer::{NotifyContext, Observer};
use crossbeam_channel::{Sender, TrySendError};
use std::any::Any;

/// Sends one `SinkMessage::Update` per notification.
///
/// The sink never blocks the graph: a full channel drops the update and
/// counts it. A disconnected receiver is an error.
pub struct ChannelSink {
    tx: Sender<SinkMessage>,
    sent: u64,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(tx: Sender<SinkMessage>) -> Self {
        Self {
            tx,
            sent: 0,
            dropped: 0,
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Observer for ChannelSink {
    fn name(&self) -> &str {
        "ChannelSink"
    }

    fn notify(&mut self, identifier: &str, ctx: &mut NotifyContext<'_>) -> PipelineResult<()> {
        let msg = SinkMessage::Update {
            identifier: identifier.to_string(),
            timestamp: ctx.timestamp(),
            sample: ctx.sample(identifier)?,
        };

        match self.tx.try_send(msg) {
            Ok(()) => self.sent += 1,
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                if self.dropped.is_power_of_two() {
                    tracing::warn!(
                        "ChannelSink dropped {} messages due to backpressure",
                        self.dropped
                    );
                }
            }
            Err(TrySendError::Disconnected(_)) => return Err(PipelineError::ChannelSend),
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
