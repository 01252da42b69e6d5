//! Observer side of the block graph.
//!
//! An observer receives the identifier of the node that changed and pulls
//! whatever it needs through [`NotifyContext`]. Nodes never push their value,
//! so an observer is free to ignore, defer or batch its reaction.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::NodeId;
use crate::pipeline::node::{AnyNode, Node, NodeHandle, NodeKind};
use crate::pipeline::registry::NodeRegistry;
use crate::pipeline::value::{Payload, Sample};
use std::any::Any;
use std::time::Duration;

/// Polymorphic notification target.
pub trait Observer: Send {
    /// Human-readable name, used in logs and errors.
    fn name(&self) -> &str;

    /// Called once per write of every node wired to this observer.
    fn notify(&mut self, identifier: &str, ctx: &mut NotifyContext<'_>) -> PipelineResult<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A derived-node write queued by an observer, applied once it returns.
pub(crate) struct PendingWrite {
    pub node: NodeId,
    pub apply: Box<dyn FnOnce(&mut dyn AnyNode) -> PipelineResult<()> + Send>,
}

/// Context passed to [`Observer::notify`].
pub struct NotifyContext<'a> {
    registry: &'a NodeRegistry,
    pending: &'a mut Vec<PendingWrite>,
    timestamp: Duration,
}

impl<'a> NotifyContext<'a> {
    pub(crate) fn new(
        registry: &'a NodeRegistry,
        pending: &'a mut Vec<PendingWrite>,
        timestamp: Duration,
    ) -> Self {
        Self {
            registry,
            pending,
            timestamp,
        }
    }

    /// Timestamp of the write being propagated.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Typed read by identifier.
    pub fn read<T: Payload>(&self, identifier: &str) -> PipelineResult<T> {
        self.registry.read(identifier)
    }

    /// Typed read through a handle.
    pub fn get<T: Payload>(&self, node: NodeHandle<T>) -> PipelineResult<T> {
        Ok(self.registry.typed::<T>(node.id())?.read().clone())
    }

    /// Erased read by identifier.
    pub fn sample(&self, identifier: &str) -> PipelineResult<Sample> {
        self.registry.sample(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.registry.contains(identifier)
    }

    /// Queue a write to a derived node. The graph stores it and notifies the
    /// node's observer after the current observer returns.
    pub fn emit<T: Payload>(&mut self, node: NodeHandle<T>, value: T) -> PipelineResult<()> {
        let target = self.registry.get(node.id())?;
        if target.kind() != NodeKind::Derived {
            return Err(PipelineError::observer(
                target.identifier(),
                "processing blocks may only emit to derived nodes",
            ));
        }

        self.pending.push(PendingWrite {
            node: node.id(),
            apply: Box::new(move |slot: &mut dyn AnyNode| {
                let identifier = slot.identifier().to_string();
                let expected = slot.type_name();
                match slot.as_any_mut().downcast_mut::<Node<T>>() {
                    Some(typed) => {
                        typed.store(value);
                        Ok(())
                    }
                    None => Err(PipelineError::TypeMismatch {
                        identifier,
                        expected,
                        found: std::any::type_name::<T>(),
                    }),
                }
            }),
        });
        Ok(())
    }
}
