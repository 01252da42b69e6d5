//! Node abstraction for the block graph.
//!
//! Two-layer design:
//! - **`Node<T>`**: the typed value holder. One identifier, one current value,
//!   one optional observer reference.
//! - **`AnyNode` trait**: the object-safe view the registry stores, so nodes of
//!   different payload types live in one graph and observers can inspect them
//!   without knowing `T`.
//!
//! A node never calls its observer directly: the graph owns the observer
//! registry and performs the notify step after every store.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::{NodeId, ObserverId};
use crate::pipeline::value::{Payload, Sample};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// Role of a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Source node: written by producers (device loop, UI, replay).
    Input,
    /// Processing output: written only by processing blocks during a cascade.
    Derived,
}

impl NodeKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Input => "Input",
            NodeKind::Derived => "Derived",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A named holder of one current value.
#[derive(Debug, Clone)]
pub struct Node<T: Payload> {
    identifier: String,
    value: T,
    kind: NodeKind,
    observer: Option<ObserverId>,
}

impl<T: Payload> Node<T> {
    /// Create an empty node: default value, no identifier, unwired.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            identifier: String::new(),
            value: T::default(),
            kind,
            observer: None,
        }
    }

    /// Create an input node with an identifier.
    pub fn input(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::new(NodeKind::Input)
        }
    }

    /// Create a derived node with an identifier.
    pub fn derived(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::new(NodeKind::Derived)
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Assign the identifier. Rejected once the node is wired, since the
    /// observer routes on it.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) -> PipelineResult<()> {
        if self.observer.is_some() {
            return Err(PipelineError::IdentifierLocked(self.identifier.clone()));
        }
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(PipelineError::EmptyIdentifier);
        }
        self.identifier = identifier;
        Ok(())
    }

    /// Last stored value, or `T::default()` before any write.
    pub fn read(&self) -> &T {
        &self.value
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.observer
    }

    pub fn is_wired(&self) -> bool {
        self.observer.is_some()
    }

    /// Overwrite the current value. Notification is the caller's job.
    pub(crate) fn store(&mut self, value: T) {
        self.value = value;
    }

    /// Unwired → Wired. Happens once.
    pub(crate) fn wire(&mut self, observer: ObserverId) -> PipelineResult<()> {
        if self.identifier.is_empty() {
            return Err(PipelineError::EmptyIdentifier);
        }
        if self.observer.is_some() {
            return Err(PipelineError::AlreadyWired(self.identifier.clone()));
        }
        self.observer = Some(observer);
        Ok(())
    }
}

/// Object-safe view over a `Node<T>` of any payload type.
pub trait AnyNode: Send {
    fn identifier(&self) -> &str;
    fn kind(&self) -> NodeKind;
    fn observer(&self) -> Option<ObserverId>;
    /// Snapshot of the current value.
    fn sample(&self) -> Sample;
    /// Name of the payload type, for mismatch errors.
    fn type_name(&self) -> &'static str;
    /// Store an erased sample. Fails on a payload mismatch, leaving the value.
    fn store_sample(&mut self, sample: &Sample) -> PipelineResult<()>;
    fn wire(&mut self, observer: ObserverId) -> PipelineResult<()>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Payload> AnyNode for Node<T> {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn observer(&self) -> Option<ObserverId> {
        self.observer
    }

    fn sample(&self) -> Sample {
        self.value.to_sample()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn store_sample(&mut self, sample: &Sample) -> PipelineResult<()> {
        match T::from_sample(sample) {
            Some(value) => {
                self.value = value;
                Ok(())
            }
            None => Err(PipelineError::TypeMismatch {
                identifier: self.identifier.clone(),
                expected: std::any::type_name::<T>(),
                found: sample.kind_name(),
            }),
        }
    }

    fn wire(&mut self, observer: ObserverId) -> PipelineResult<()> {
        Node::wire(self, observer)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed reference to a node in a graph.
///
/// Writes and reads through a handle are type-checked at compile time; the
/// identifier-based paths check at runtime instead.
pub struct NodeHandle<T> {
    id: NodeId,
    _payload: PhantomData<fn() -> T>,
}

impl<T> NodeHandle<T> {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            _payload: PhantomData,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<T> Clone for NodeHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeHandle<T> {}

impl<T> PartialEq for NodeHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for NodeHandle<T> {}

impl<T> fmt::Debug for NodeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle<{}>({})", std::any::type_name::<T>(), self.id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_before_write_is_default() {
        let node: Node<i32> = Node::input("accel_x");
        assert_eq!(*node.read(), 0);
        assert!(!node.is_wired());
    }

    #[test]
    fn test_store_overwrites() {
        let mut node: Node<i32> = Node::input("accel_x");
        node.store(1);
        node.store(2);
        assert_eq!(*node.read(), 2);
    }

    #[test]
    fn test_empty_node_lifecycle() {
        let mut node: Node<f64> = Node::new(NodeKind::Input);
        assert_eq!(node.identifier(), "");
        assert_eq!(node.wire(ObserverId(0)), Err(PipelineError::EmptyIdentifier));

        node.set_identifier("gyro_x").unwrap();
        node.wire(ObserverId(0)).unwrap();
        assert!(node.is_wired());
        assert_eq!(node.observer(), Some(ObserverId(0)));
    }

    #[test]
    fn test_identifier_locked_after_wiring() {
        let mut node: Node<i32> = Node::input("accel_x");
        node.set_identifier("accel_y").unwrap();
        node.wire(ObserverId(1)).unwrap();

        let err = node.set_identifier("accel_z").unwrap_err();
        assert_eq!(err, PipelineError::IdentifierLocked("accel_y".to_string()));
        assert_eq!(node.identifier(), "accel_y");
    }

    #[test]
    fn test_blank_identifier_rejected() {
        let mut node: Node<i32> = Node::new(NodeKind::Input);
        assert_eq!(node.set_identifier("  "), Err(PipelineError::EmptyIdentifier));
    }

    #[test]
    fn test_rewire_rejected() {
        let mut node: Node<i32> = Node::input("accel_x");
        node.wire(ObserverId(0)).unwrap();
        assert_eq!(
            node.wire(ObserverId(1)),
            Err(PipelineError::AlreadyWired("accel_x".to_string()))
        );
        assert_eq!(node.observer(), Some(ObserverId(0)));
    }

    #[test]
    fn test_any_node_view() {
        let mut node: Node<u16> = Node::derived("baro");
        node.store(101);
        let erased: &dyn AnyNode = &node;
        assert_eq!(erased.kind(), NodeKind::Derived);
        assert_eq!(erased.sample(), Sample::Int(101));
        assert_eq!(erased.type_name(), "u16");
        assert!(erased.as_any().downcast_ref::<Node<u16>>().is_some());
        assert!(erased.as_any().downcast_ref::<Node<i32>>().is_none());
    }

    #[test]
    fn test_store_sample_checks_payload() {
        let mut node: Node<f64> = Node::input("gyro_y");
        AnyNode::store_sample(&mut node, &Sample::Float(0.5)).unwrap();
        assert_eq!(*node.read(), 0.5);

        let err = AnyNode::store_sample(&mut node, &Sample::Int(3)).unwrap_err();
        assert!(matches!(err, PipelineError::TypeMismatch { found: "int", .. }));
        assert_eq!(*node.read(), 0.5);
    }
}
