//! Integration tests for the graph worker
//!
//! These tests validate the threaded workflow:
//! - Producers write through the bridge, the worker owns the graph
//! - Derived cascades and recording run on the worker thread
//! - Failed writes come back as messages without stopping the worker

mod common;

use common::builders::ConfigBuilder;
use common::{assert_float_eq, test_timeout};
use imu_blocks::pipeline::{GraphBridge, GraphWorker, PipelineError, Sample, SinkMessage};
use imu_blocks::session::SessionMetadata;
use imu_blocks::signal::{SignalPattern, SignalSource};
use imu_blocks::types::SensorKind;
use imu_blocks::ImuGraphBuilder;
use std::thread;
use std::time::Duration;

#[test]
fn test_worker_runs_imu_graph() {
    let config = ConfigBuilder::new()
        .sensors(&[SensorKind::Accelerometer])
        .moving_average(2)
        .build();
    let (bridge, cmd_rx, msg_tx) = GraphBridge::new();
    let (graph, ids) = ImuGraphBuilder::new(config)
        .build(Some(msg_tx.clone()))
        .unwrap();
    let handle = GraphWorker::new(graph, cmd_rx, msg_tx).start().unwrap();

    bridge.write("accel_x", Sample::Float(3.0), None).unwrap();
    bridge.write("accel_y", Sample::Float(4.0), None).unwrap();
    bridge.shutdown();
    let graph = handle.join().unwrap();

    assert_float_eq(graph.read_named::<f64>("accel_norm").unwrap(), 5.0, 1e-12);
    assert_float_eq(graph.read_named::<f64>("accel_norm_avg").unwrap(), 4.0, 1e-12);

    let updated: Vec<String> = bridge
        .drain()
        .into_iter()
        .filter_map(|msg| match msg {
            SinkMessage::Update { identifier, .. } => Some(identifier),
            _ => None,
        })
        .collect();
    assert_eq!(
        updated,
        vec![
            "accel_x",
            "accel_norm",
            "accel_norm_avg",
            "accel_y",
            "accel_norm",
            "accel_norm_avg",
        ]
    );
    assert!(ids.channel_sink(&graph).is_some());
}

#[test]
fn test_worker_records_session() {
    let config = ConfigBuilder::new()
        .sensors(&[SensorKind::Gyrometer])
        .norm(false)
        .build();
    let (mut graph, ids) = ImuGraphBuilder::new(config).build(None).unwrap();
    ids.start_recording(&mut graph, SessionMetadata::new("walk"))
        .unwrap();
    let (bridge, handle) = GraphWorker::spawn(graph).unwrap();

    let mut source = SignalSource::for_sensors(
        &[SensorKind::Gyrometer],
        SignalPattern::Sine {
            frequency: 1.0,
            amplitude: 2.0,
            offset: 0.0,
        },
    );
    let period = Duration::from_millis(20);
    for i in 0..10u32 {
        let ts = period * i;
        for (identifier, value) in source.sample(ts) {
            bridge.write(identifier, Sample::Float(value), Some(ts)).unwrap();
        }
    }
    bridge.shutdown();
    let mut graph = handle.join().unwrap();

    let recording = ids.finish_recording(&mut graph).unwrap();
    assert_eq!(recording.frame_count(), 10);
    assert_eq!(recording.metadata.total_samples, 30);
    assert_eq!(recording.metadata.duration, Duration::from_millis(180));
    assert_eq!(
        recording.channels().into_iter().collect::<Vec<_>>(),
        vec!["gyro_x", "gyro_y", "gyro_z"]
    );
}

#[test]
fn test_worker_survives_bad_writes() {
    let config = ConfigBuilder::new().sensors(&[SensorKind::Battery]).build();
    let (graph, _ids) = ImuGraphBuilder::new(config).build(None).unwrap();
    let (bridge, handle) = GraphWorker::spawn(graph).unwrap();

    bridge.write("battery", Sample::Bool(true), None).unwrap();
    bridge.write("nope", Sample::Float(1.0), None).unwrap();
    bridge.write("battery", Sample::Float(3.9), None).unwrap();
    bridge.request_stats().unwrap();

    let mut errors = Vec::new();
    let stats = loop {
        match bridge.recv_timeout(test_timeout()) {
            Some(SinkMessage::WriteError { error, .. }) => errors.push(error),
            Some(SinkMessage::Stats(stats)) => break stats,
            Some(_) => {}
            None => panic!("worker did not answer"),
        }
    };

    assert!(matches!(errors[0], PipelineError::TypeMismatch { .. }));
    assert_eq!(errors[1], PipelineError::UnknownNode("nope".to_string()));
    assert_eq!(stats.writes, 1);
    assert_eq!(stats.failed_writes, 2);

    bridge.shutdown();
    let graph = handle.join().unwrap();
    assert_float_eq(graph.read_named::<f64>("battery").unwrap(), 3.9, 1e-12);
}

#[test]
fn test_producers_on_several_threads() {
    let config = ConfigBuilder::new()
        .sensors(&[SensorKind::Accelerometer, SensorKind::Barometer])
        .norm(false)
        .build();
    let (graph, _ids) = ImuGraphBuilder::new(config).build(None).unwrap();
    let (bridge, handle) = GraphWorker::spawn(graph).unwrap();

    let producers: Vec<_> = ["accel_x", "accel_y", "baro"]
        .into_iter()
        .map(|identifier| {
            let bridge = bridge.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    bridge
                        .write(identifier, Sample::Float(f64::from(i)), None)
                        .unwrap();
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    bridge.shutdown();
    let graph = handle.join().unwrap();
    assert_eq!(graph.stats().writes, 300);
    for identifier in ["accel_x", "accel_y", "baro"] {
        assert_float_eq(graph.read_named::<f64>(identifier).unwrap(), 99.0, 1e-12);
    }
}
