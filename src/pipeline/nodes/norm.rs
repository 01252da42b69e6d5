//! NormBlock: Euclidean norm of three axis nodes.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::node::NodeHandle;
use crate::pipeline::observer::{NotifyContext, Observer};
use crate::pipeline::value::Vector3;
use std::any::Any;

/// Writes `sqrt(x² + y² + z²)` of its three `f64` inputs into a derived node
/// each time one of the axes changes.
pub struct NormBlock {
    name: String,
    axes: [String; 3],
    output: NodeHandle<f64>,
}

impl NormBlock {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        axes: [S; 3],
        output: NodeHandle<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            axes: axes.map(Into::into),
            output,
        }
    }

    pub fn axes(&self) -> &[String; 3] {
        &self.axes
    }

    pub fn output(&self) -> NodeHandle<f64> {
        self.output
    }
}

impl Observer for NormBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&mut self, identifier: &str, ctx: &mut NotifyContext<'_>) -> PipelineResult<()> {
        if !self.axes.iter().any(|a| a == identifier) {
            return Ok(());
        }
        let [x, y, z] = &self.axes;
        let v = Vector3::new(ctx.read(x)?, ctx.read(y)?, ctx.read(z)?);
        ctx.emit(self.output, v.norm())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
