//! Node registry: storage plus identifier lookup.
//!
//! Nodes live in a flat `Vec` with `NodeId` as the index. The identifier map is
//! what observers use to find the node that notified them.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::NodeId;
use crate::pipeline::node::{AnyNode, Node, NodeHandle};
use crate::pipeline::value::{Payload, Sample};
use std::collections::HashMap;

#[derive(Default)]
pub struct NodeRegistry {
    nodes: Vec<Box<dyn AnyNode>>,
    index: HashMap<String, NodeId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. Rejects empty and duplicate identifiers.
    pub fn insert<T: Payload>(&mut self, node: Node<T>) -> PipelineResult<NodeHandle<T>> {
        let identifier = node.identifier().to_string();
        if identifier.trim().is_empty() {
            return Err(PipelineError::EmptyIdentifier);
        }
        if self.index.contains_key(&identifier) {
            return Err(PipelineError::IdentifierCollision(identifier));
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Box::new(node));
        self.index.insert(identifier, id);
        Ok(NodeHandle::new(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn lookup(&self, identifier: &str) -> PipelineResult<NodeId> {
        self.index
            .get(identifier)
            .copied()
            .ok_or_else(|| PipelineError::UnknownNode(identifier.to_string()))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    pub fn get(&self, id: NodeId) -> PipelineResult<&dyn AnyNode> {
        self.nodes
            .get(id.index())
            .map(|n| n.as_ref())
            .ok_or_else(|| PipelineError::UnknownNode(id.to_string()))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> PipelineResult<&mut dyn AnyNode> {
        match self.nodes.get_mut(id.index()) {
            Some(node) => Ok(node.as_mut()),
            None => Err(PipelineError::UnknownNode(id.to_string())),
        }
    }

    /// Downcast to the concrete node type.
    pub fn typed<T: Payload>(&self, id: NodeId) -> PipelineResult<&Node<T>> {
        let node = self.get(id)?;
        node.as_any()
            .downcast_ref::<Node<T>>()
            .ok_or_else(|| PipelineError::TypeMismatch {
                identifier: node.identifier().to_string(),
                expected: node.type_name(),
                found: std::any::type_name::<T>(),
            })
    }

    pub(crate) fn typed_mut<T: Payload>(&mut self, id: NodeId) -> PipelineResult<&mut Node<T>> {
        let node = self.get_mut(id)?;
        let identifier = node.identifier().to_string();
        let expected = node.type_name();
        node.as_any_mut()
            .downcast_mut::<Node<T>>()
            .ok_or(PipelineError::TypeMismatch {
                identifier,
                expected,
                found: std::any::type_name::<T>(),
            })
    }

    pub fn sample(&self, identifier: &str) -> PipelineResult<Sample> {
        let id = self.lookup(identifier)?;
        Ok(self.get(id)?.sample())
    }

    pub fn read<T: Payload>(&self, identifier: &str) -> PipelineResult<T> {
        let id = self.lookup(identifier)?;
        Ok(self.typed::<T>(id)?.read().clone())
    }

    /// Identifiers in registration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.identifier())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &dyn AnyNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n.as_ref()))
    }
}
