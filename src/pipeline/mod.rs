//! Block graph: typed nodes that notify observers on every write.
//!
//! A node holds one value and a reference to one observer. Writing a node
//! stores the value and then notifies the observer with the node's
//! identifier; the observer pulls whatever it needs from the graph. Processing
//! blocks react by emitting into derived nodes, which notify in turn.
//!
//! # Architecture
//!
//! ```text
//! [accel_x] ─┐
//! [accel_y] ─┼──► Dispatcher ──► NormBlock ──► [accel_norm] ──► Dispatcher
//! [accel_z] ─┘        ├──► RecorderSink
//!                     └──► ChannelSink ──► consumers
//! ```
//!
//! # Design
//!
//! - **Arena storage**: nodes and observers live in `Vec`s owned by the graph,
//!   referenced by `NodeId` / `ObserverId` indices. Nodes never own observers.
//! - **Two-phase construction**: `GraphBuilder` records wiring, `finalize`
//!   applies it in one pass.
//! - **Typed handles**: `NodeHandle<T>` checks payload types at compile time;
//!   identifier-based access checks at runtime.
//! - **Thread confinement**: a graph is driven from one thread. `GraphWorker`
//!   owns it on a dedicated thread fed by `GraphBridge` over crossbeam channels.

pub mod bridge;
pub mod error;
pub mod executor;
pub mod graph;
pub mod id;
pub mod node;
pub mod nodes;
pub mod observer;
pub mod registry;
pub mod value;

pub use bridge::{GraphBridge, GraphCommand, SinkMessage};
pub use error::{PipelineError, PipelineResult};
pub use executor::GraphWorker;
pub use graph::{BlockGraph, GraphBuilder, GraphStats, MAX_CASCADE_DEPTH};
pub use id::{NodeId, ObserverId};
pub use node::{AnyNode, Node, NodeHandle, NodeKind};
pub use observer::{NotifyContext, Observer};
pub use registry::NodeRegistry;
pub use value::{Payload, Sample, Vector3};
