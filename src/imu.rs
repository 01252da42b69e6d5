//! IMU graph assembly.
//!
//! Builds the standard graph for one IMU from an [`AppConfig`]:
//!
//! ```text
//! accel_x/y/z, gyro_x/y/z, ... ──► Dispatcher "imu"
//!                                     ├──► NormBlock ──► <sensor>_norm
//!                                     ├──► MovingAverageBlock ──► <sensor>_norm_avg
//!                                     ├──► RecorderSink
//!                                     └──► ChannelSink (optional)
//! ```
//!
//! Every node, derived ones included, is wired to the single dispatcher.

use crate::config::AppConfig;
use crate::error::{ImuError, Result, ResultExt};
use crate::pipeline::nodes::{ChannelSink, Dispatcher, MovingAverageBlock, NormBlock, RecorderSink};
use crate::pipeline::{BlockGraph, GraphBuilder, ObserverId, SinkMessage};
use crate::session::{SessionMetadata, SessionRecorder, SessionRecording};
use crate::types::{ImuChannel, SensorKind};
use crossbeam_channel::Sender;

/// Where the assembled graph keeps its parts.
#[derive(Debug, Clone)]
pub struct ImuGraphIds {
    pub hub: ObserverId,
    /// Input node identifiers, in registration order
    pub inputs: Vec<String>,
    /// Derived node identifiers, in registration order
    pub derived: Vec<String>,
}

impl ImuGraphIds {
    pub fn recorder<'g>(&self, graph: &'g BlockGraph) -> Option<&'g SessionRecorder> {
        graph
            .observer::<Dispatcher>(self.hub)?
            .listener::<RecorderSink>()
            .map(|sink| sink.recorder())
    }

    pub fn recorder_mut<'g>(&self, graph: &'g mut BlockGraph) -> Option<&'g mut SessionRecorder> {
        graph
            .observer_mut::<Dispatcher>(self.hub)?
            .listener_mut::<RecorderSink>()
            .map(|sink| sink.recorder_mut())
    }

    pub fn channel_sink<'g>(&self, graph: &'g BlockGraph) -> Option<&'g ChannelSink> {
        graph.observer::<Dispatcher>(self.hub)?.listener::<ChannelSink>()
    }

    /// Arm the recorder of an assembled graph.
    pub fn start_recording(&self, graph: &mut BlockGraph, metadata: SessionMetadata) -> Result<()> {
        self.recorder_mut(graph)
            .ok_or_else(|| ImuError::Session("graph has no recorder".to_string()))?
            .start_recording(metadata)
    }

    /// Stop the recorder and take what it captured.
    pub fn finish_recording(&self, graph: &mut BlockGraph) -> Result<SessionRecording> {
        let recorder = self
            .recorder_mut(graph)
            .ok_or_else(|| ImuError::Session("graph has no recorder".to_string()))?;
        recorder.stop_recording();
        Ok(recorder.take_recording())
    }
}

pub struct ImuGraphBuilder {
    config: AppConfig,
}

impl ImuGraphBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Assemble and finalize the graph. With `sink`, every notification is
    /// also forwarded as a `SinkMessage::Update`.
    pub fn build(self, sink: Option<Sender<SinkMessage>>) -> Result<(BlockGraph, ImuGraphIds)> {
        self.config.validate()?;
        let graph_cfg = &self.config.graph;

        let mut builder = GraphBuilder::new();
        let mut hub = Dispatcher::new("imu");
        let mut inputs = Vec::new();
        let mut derived = Vec::new();

        for channel in self.config.enabled_channels() {
            let identifier = channel.identifier();
            builder
                .add_input::<f64>(identifier.clone())
                .context("Failed to register input")?;
            inputs.push(identifier);
        }

        if graph_cfg.norm {
            let triaxial = SensorKind::ALL
                .iter()
                .filter(|s| s.is_triaxial() && graph_cfg.sensors.contains(*s));
            for sensor in triaxial {
                let axes: Vec<String> = sensor.channels().iter().map(|c| c.identifier()).collect();
                let [x, y, z] = <[String; 3]>::try_from(axes).map_err(|_| {
                    ImuError::Config(format!("{} does not have three axes", sensor))
                })?;

                let norm_id = ImuChannel::norm_identifier(*sensor);
                let norm = builder.add_derived::<f64>(norm_id.clone())?;
                hub.listen(NormBlock::new(norm_id.clone(), [x, y, z], norm));
                derived.push(norm_id.clone());

                let window = graph_cfg.moving_average_window;
                if window > 0 {
                    let avg_id = format!("{}_avg", norm_id);
                    let avg = builder.add_derived::<f64>(avg_id.clone())?;
                    hub.listen(MovingAverageBlock::new(avg_id.clone(), norm_id, avg, window)?);
                    derived.push(avg_id);
                }
            }
        } else if graph_cfg.moving_average_window > 0 {
            tracing::warn!("moving_average_window is set but norm is disabled, ignoring it");
        }

        let mut recorder = SessionRecorder::with_sample_interval(self.config.recorder.sample_interval());
        recorder.set_max_frames(self.config.recorder.max_frames);
        hub.listen(RecorderSink::new(recorder));

        if let Some(tx) = sink {
            hub.listen(ChannelSink::new(tx));
        }

        let hub = builder.add_observer(hub);
        builder.wire_remaining(hub)?;
        let graph = builder.finalize()?;

        tracing::info!(
            "IMU graph built: {} inputs, {} derived",
            inputs.len(),
            derived.len()
        );

        Ok((
            graph,
            ImuGraphIds {
                hub,
                inputs,
                derived,
            },
        ))
    }
}
