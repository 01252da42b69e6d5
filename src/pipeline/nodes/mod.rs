//! Built-in observers: routing, processing blocks and sinks.

pub mod channel_sink;
pub mod derive;
pub mod dispatcher;
pub mod moving_average;
pub mod norm;
pub mod recorder_sink;

pub use channel_sink::ChannelSink;
pub use derive::DeriveBlock;
pub use dispatcher::{Dispatcher, Handler};
pub use moving_average::MovingAverageBlock;
pub use norm::NormBlock;
pub use recorder_sink::RecorderSink;
