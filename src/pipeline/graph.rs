//! Block graph assembly and the write → notify path.
//!
//! Construction is two-phase. [`GraphBuilder`] collects nodes, observers and
//! wiring requests; [`GraphBuilder::finalize`] applies every wiring request in
//! one pass and hands back a [`BlockGraph`]. A half-wired graph is never
//! writable.
//!
//! Each write:
//! 1. Validates the target (kind, wiring) before storing anything.
//! 2. Stores the value.
//! 3. Notifies the node's observer with the node's identifier.
//! 4. Runs derived-node writes the observer queued in FIFO order. Each one is
//!    stored immediately before its own notification, so every notification
//!    sees the value that triggered it.
//!
//! Everything runs on the caller's thread and `write` returns only once the
//! cascade has completed.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::{NodeId, ObserverId};
use crate::pipeline::node::{Node, NodeHandle, NodeKind};
use crate::pipeline::observer::{NotifyContext, Observer, PendingWrite};
use crate::pipeline::registry::NodeRegistry;
use crate::pipeline::value::{Payload, Sample};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Maximum number of derived hops a single write may trigger.
pub const MAX_CASCADE_DEPTH: usize = 16;

/// First phase: nodes and observers are registered, wiring is only recorded.
#[derive(Default)]
pub struct GraphBuilder {
    registry: NodeRegistry,
    observers: Vec<Box<dyn Observer>>,
    wiring: Vec<(NodeId, ObserverId)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node built by the caller.
    pub fn add_node<T: Payload>(&mut self, node: Node<T>) -> PipelineResult<NodeHandle<T>> {
        let kind = node.kind();
        let handle = self.registry.insert(node)?;
        tracing::debug!(
            "Registered {} node {} as {:?}",
            kind,
            self.registry.get(handle.id())?.identifier(),
            handle.id()
        );
        Ok(handle)
    }

    pub fn add_input<T: Payload>(
        &mut self,
        identifier: impl Into<String>,
    ) -> PipelineResult<NodeHandle<T>> {
        self.add_node(Node::input(identifier))
    }

    pub fn add_derived<T: Payload>(
        &mut self,
        identifier: impl Into<String>,
    ) -> PipelineResult<NodeHandle<T>> {
        self.add_node(Node::derived(identifier))
    }

    pub fn add_observer(&mut self, observer: impl Observer + 'static) -> ObserverId {
        let id = ObserverId(self.observers.len() as u32);
        tracing::debug!("Registered observer '{}' as {:?}", observer.name(), id);
        self.observers.push(Box::new(observer));
        id
    }

    /// Request that `node` notify `observer`. Applied by [`finalize`](Self::finalize).
    pub fn wire<T>(&mut self, node: NodeHandle<T>, observer: ObserverId) -> PipelineResult<()> {
        self.wire_id(node.id(), observer)
    }

    pub fn wire_named(&mut self, identifier: &str, observer: ObserverId) -> PipelineResult<()> {
        let id = self.registry.lookup(identifier)?;
        self.wire_id(id, observer)
    }

    /// Wire every node that has no wiring request yet to `observer`.
    /// Returns the number of nodes wired.
    pub fn wire_remaining(&mut self, observer: ObserverId) -> PipelineResult<usize> {
        let unwired: Vec<NodeId> = self
            .registry
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !self.wiring.iter().any(|(n, _)| n == id))
            .collect();
        for id in &unwired {
            self.wire_id(*id, observer)?;
        }
        Ok(unwired.len())
    }

    fn wire_id(&mut self, node: NodeId, observer: ObserverId) -> PipelineResult<()> {
        let identifier = self.registry.get(node)?.identifier().to_string();
        if observer.index() >= self.observers.len() {
            return Err(PipelineError::UnknownObserver(observer));
        }
        if self.wiring.iter().any(|(n, _)| *n == node) {
            return Err(PipelineError::AlreadyWired(identifier));
        }
        self.wiring.push((node, observer));
        Ok(())
    }

    /// Typed lookup, for wiring code that only knows identifiers.
    pub fn handle<T: Payload>(&self, identifier: &str) -> PipelineResult<NodeHandle<T>> {
        let id = self.registry.lookup(identifier)?;
        self.registry.typed::<T>(id)?;
        Ok(NodeHandle::new(id))
    }

    /// Second phase: apply all wiring and produce a writable graph.
    ///
    /// Derived nodes must be wired, since they are only ever written by a
    /// cascade. Unwired input nodes are allowed; writing one fails with
    /// [`PipelineError::UnwiredObserver`].
    pub fn finalize(mut self) -> PipelineResult<BlockGraph> {
        for (node, observer) in std::mem::take(&mut self.wiring) {
            self.registry.get_mut(node)?.wire(observer)?;
        }

        let mut unwired_inputs = 0;
        for (_, node) in self.registry.iter() {
            if node.observer().is_some() {
                continue;
            }
            match node.kind() {
                NodeKind::Derived => {
                    return Err(PipelineError::UnwiredObserver {
                        identifier: node.identifier().to_string(),
                    });
                }
                NodeKind::Input => {
                    unwired_inputs += 1;
                    tracing::warn!(
                        "Input node '{}' has no observer, writes to it will fail",
                        node.identifier()
                    );
                }
            }
        }

        tracing::info!(
            "Block graph finalized: {} nodes ({} unwired), {} observers",
            self.registry.len(),
            unwired_inputs,
            self.observers.len()
        );

        Ok(BlockGraph {
            registry: self.registry,
            observers: self.observers,
            started: Instant::now(),
            stats: GraphStats::default(),
        })
    }
}

/// Write and notification counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Successful producer writes.
    pub writes: u64,
    /// Producer writes that returned an error.
    pub failed_writes: u64,
    /// Observer notifications delivered, derived cascades included.
    pub notifications: u64,
}

/// A fully wired graph. Owns its nodes and its observers.
pub struct BlockGraph {
    registry: NodeRegistry,
    observers: Vec<Box<dyn Observer>>,
    started: Instant,
    stats: GraphStats,
}

impl BlockGraph {
    /// Write through a typed handle, timestamped relative to graph creation.
    pub fn write<T: Payload>(&mut self, node: NodeHandle<T>, value: T) -> PipelineResult<()> {
        let timestamp = self.started.elapsed();
        self.write_at(node, value, timestamp)
    }

    /// Write with a producer-supplied timestamp (device clock, replay).
    pub fn write_at<T: Payload>(
        &mut self,
        node: NodeHandle<T>,
        value: T,
        timestamp: Duration,
    ) -> PipelineResult<()> {
        let result = self
            .store_input(node.id(), value)
            .and_then(|()| self.propagate(node.id(), timestamp));
        self.count(&result);
        result
    }

    /// Write by identifier. The payload type is checked at runtime.
    pub fn write_named<T: Payload>(&mut self, identifier: &str, value: T) -> PipelineResult<()> {
        let id = self.registry.lookup(identifier)?;
        self.write(NodeHandle::new(id), value)
    }

    /// Write an erased sample by identifier, as received from another thread.
    pub fn write_sample(
        &mut self,
        identifier: &str,
        sample: &Sample,
        timestamp: Duration,
    ) -> PipelineResult<()> {
        let result = self.store_sample(identifier, sample).and_then(|id| self.propagate(id, timestamp));
        self.count(&result);
        result
    }

    fn store_input<T: Payload>(&mut self, id: NodeId, value: T) -> PipelineResult<()> {
        let node = self.registry.typed_mut::<T>(id)?;
        check_writable(node.kind(), node.is_wired(), node.identifier())?;
        node.store(value);
        Ok(())
    }

    fn store_sample(&mut self, identifier: &str, sample: &Sample) -> PipelineResult<NodeId> {
        let id = self.registry.lookup(identifier)?;
        let node = self.registry.get_mut(id)?;
        check_writable(node.kind(), node.observer().is_some(), node.identifier())?;
        node.store_sample(sample)?;
        Ok(id)
    }

    fn count(&mut self, result: &PipelineResult<()>) {
        match result {
            Ok(()) => self.stats.writes += 1,
            Err(e) => {
                self.stats.failed_writes += 1;
                tracing::debug!("Write failed: {}", e);
            }
        }
    }

    fn propagate(&mut self, origin: NodeId, timestamp: Duration) -> PipelineResult<()> {
        // The origin is already stored. Derived writes are stored only when
        // popped, right before their own notification.
        let mut queue: VecDeque<(NodeId, Option<PendingWrite>, usize)> =
            VecDeque::from([(origin, None, 0usize)]);

        while let Some((id, write, depth)) = queue.pop_front() {
            if let Some(write) = write {
                let target = self.registry.get_mut(id)?;
                if target.observer().is_none() {
                    return Err(PipelineError::UnwiredObserver {
                        identifier: target.identifier().to_string(),
                    });
                }
                (write.apply)(target)?;
            }

            let node = self.registry.get(id)?;
            let identifier = node.identifier().to_string();
            let observer_id = node
                .observer()
                .ok_or_else(|| PipelineError::UnwiredObserver {
                    identifier: identifier.clone(),
                })?;

            let mut pending = Vec::new();
            {
                let observer = self
                    .observers
                    .get_mut(observer_id.index())
                    .ok_or(PipelineError::UnknownObserver(observer_id))?;
                tracing::trace!("Notify '{}' -> {}", identifier, observer.name());
                let mut ctx = NotifyContext::new(&self.registry, &mut pending, timestamp);
                observer.notify(&identifier, &mut ctx)?;
            }
            self.stats.notifications += 1;

            if !pending.is_empty() && depth + 1 > MAX_CASCADE_DEPTH {
                return Err(PipelineError::CascadeOverflow(MAX_CASCADE_DEPTH));
            }
            for write in pending {
                queue.push_back((write.node, Some(write), depth + 1));
            }
        }

        Ok(())
    }

    pub fn read<T: Payload>(&self, node: NodeHandle<T>) -> PipelineResult<T> {
        Ok(self.registry.typed::<T>(node.id())?.read().clone())
    }

    pub fn read_named<T: Payload>(&self, identifier: &str) -> PipelineResult<T> {
        self.registry.read(identifier)
    }

    pub fn sample(&self, identifier: &str) -> PipelineResult<Sample> {
        self.registry.sample(identifier)
    }

    /// Typed lookup by identifier.
    pub fn handle<T: Payload>(&self, identifier: &str) -> PipelineResult<NodeHandle<T>> {
        let id = self.registry.lookup(identifier)?;
        self.registry.typed::<T>(id)?;
        Ok(NodeHandle::new(id))
    }

    pub fn identifier(&self, node: NodeId) -> PipelineResult<&str> {
        Ok(self.registry.get(node)?.identifier())
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.registry.identifiers()
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Downcast a registered observer, e.g. to collect a recording.
    pub fn observer<O: Observer + 'static>(&self, id: ObserverId) -> Option<&O> {
        self.observers.get(id.index())?.as_any().downcast_ref::<O>()
    }

    pub fn observer_mut<O: Observer + 'static>(&mut self, id: ObserverId) -> Option<&mut O> {
        self.observers
            .get_mut(id.index())?
            .as_any_mut()
            .downcast_mut::<O>()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    /// Time since the graph was finalized.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

fn check_writable(kind: NodeKind, wired: bool, identifier: &str) -> PipelineResult<()> {
    if kind == NodeKind::Derived {
        return Err(PipelineError::ReadOnly(identifier.to_string()));
    }
    if !wired {
        return Err(PipelineError::UnwiredObserver {
            identifier: identifier.to_string(),
        });
    }
    Ok(())
}
