//! MovingAverageBlock: sliding window mean of one `f64` node.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node::NodeHandle;
use crate::pipeline::observer::{NotifyContext, Observer};
use std::any::Any;
use std::collections::VecDeque;

pub struct MovingAverageBlock {
    name: String,
    input: String,
    output: NodeHandle<f64>,
    window: usize,
    buffer: VecDeque<f64>,
}

impl MovingAverageBlock {
    /// `window` must be at least 1. Until the window fills, the mean is taken
    /// over the samples seen so far.
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        output: NodeHandle<f64>,
        window: usize,
    ) -> PipelineResult<Self> {
        let name = name.into();
        if window == 0 {
            return Err(PipelineError::observer(name, "window must be at least 1"));
        }
        Ok(Self {
            name,
            input: input.into(),
            output,
            window,
            buffer: VecDeque::with_capacity(window),
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Samples currently in the window.
    pub fn filled(&self) -> usize {
        self.buffer.len()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    fn push(&mut self, value: f64) -> f64 {
        if self.buffer.len() == self.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
        self.buffer.iter().sum::<f64>() / self.buffer.len() as f64
    }
}

impl Observer for MovingAverageBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&mut self, identifier: &str, ctx: &mut NotifyContext<'_>) -> PipelineResult<()> {
        if identifier != self.input {
            return Ok(());
        }
        let value: f64 = ctx.read(identifier)?;
        let mean = self.push(value);
        ctx.emit(self.output, mean)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
