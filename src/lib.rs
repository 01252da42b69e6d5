//! # imu-blocks: block-based IMU signal pipeline
//!
//! A library for routing inertial measurement unit data through named,
//! typed nodes. Writing a node stores the value and notifies the node's
//! observer with the node's identifier; observers pull what they need and may
//! feed derived nodes in turn.
//!
//! ## Architecture
//!
//! - **Pipeline**: nodes, observers, the write → notify cascade and the
//!   graph worker thread
//! - **Session**: recording of notified values into timestamped frames
//! - **Signal**: synthetic signal source standing in for a device loop
//! - **Communication**: crossbeam channels between producers and the graph
//!
//! ## Example
//!
//! ```
//! use imu_blocks::pipeline::nodes::Dispatcher;
//! use imu_blocks::pipeline::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! let accel_x = builder.add_input::<i32>("accel_x").unwrap();
//! let hub = builder.add_observer(Dispatcher::new("hub"));
//! builder.wire(accel_x, hub).unwrap();
//! let mut graph = builder.finalize().unwrap();
//!
//! graph.write(accel_x, 42).unwrap();
//! assert_eq!(graph.read(accel_x).unwrap(), 42);
//! ```

pub mod config;
pub mod error;
pub mod imu;
pub mod pipeline;
pub mod session;
pub mod signal;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{ImuError, Result};
pub use imu::{ImuGraphBuilder, ImuGraphIds};
pub use pipeline::{BlockGraph, GraphBuilder, NodeHandle, Observer, PipelineError, Sample};
pub use session::{SessionMetadata, SessionRecorder, SessionRecording};
pub use types::{Axis, ImuChannel, ImuDevice, ImuPosition, SensorKind};
