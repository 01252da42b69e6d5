//! DeriveBlock: generic closure-based processing block.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::node::NodeHandle;
use crate::pipeline::observer::{NotifyContext, Observer};
use crate::pipeline::value::Payload;
use std::any::Any;

type Compute<T> = Box<dyn FnMut(&NotifyContext<'_>) -> PipelineResult<T> + Send>;

/// Recomputes one derived node whenever one of its inputs is written.
///
/// Notifications for identifiers outside `inputs` are ignored, so the block
/// can sit behind a shared dispatcher.
pub struct DeriveBlock<T: Payload> {
    name: String,
    inputs: Vec<String>,
    output: NodeHandle<T>,
    compute: Compute<T>,
    evaluations: u64,
}

impl<T: Payload> DeriveBlock<T> {
    pub fn new<I, S, F>(name: impl Into<String>, inputs: I, output: NodeHandle<T>, compute: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&NotifyContext<'_>) -> PipelineResult<T> + Send + 'static,
    {
        Self {
            name: name.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            output,
            compute: Box::new(compute),
            evaluations: 0,
        }
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn output(&self) -> NodeHandle<T> {
        self.output
    }

    /// Number of times the output was recomputed.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}

impl<T: Payload> Observer for DeriveBlock<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&mut self, identifier: &str, ctx: &mut NotifyContext<'_>) -> PipelineResult<()> {
        if !self.inputs.iter().any(|i| i == identifier) {
            return Ok(());
        }
        let value = (self.compute)(&*ctx)?;
        self.evaluations += 1;
        ctx.emit(self.output, value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
