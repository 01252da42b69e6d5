//! Integration tests for the node → observer contract
//!
//! These tests validate:
//! - Write stores the value and notifies the wired observer once
//! - One observer shared by several nodes sees each node's own identifier
//! - Wiring and identifier rules (collisions, locking, unwired writes)
//! - Typed access and payload mismatches

mod common;

use common::assert_float_eq;
use common::mock_helpers::{entries, RecordingObserver};
use imu_blocks::pipeline::nodes::{DeriveBlock, Dispatcher};
use imu_blocks::pipeline::{GraphBuilder, Node, NodeKind, PipelineError, Sample, Vector3};
use std::time::Duration;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

#[test]
fn test_write_read_and_notify() {
    let mut builder = GraphBuilder::new();
    let accel_x = builder.add_input::<i32>("accel_x").unwrap();
    let (observer, log) = RecordingObserver::new("probe");
    let obs = builder.add_observer(observer);
    builder.wire(accel_x, obs).unwrap();
    let mut graph = builder.finalize().unwrap();

    graph.write(accel_x, 42).unwrap();

    assert_eq!(graph.read(accel_x).unwrap(), 42);
    assert_eq!(
        entries(&log),
        vec![("accel_x".to_string(), Sample::Int(42))]
    );
}

#[test]
fn test_shared_observer_sees_each_identifier() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (x_log, y_log) = (seen.clone(), seen.clone());

    let mut builder = GraphBuilder::new();
    let accel_x = builder.add_input::<f64>("accel_x").unwrap();
    let accel_y = builder.add_input::<f64>("accel_y").unwrap();
    let hub = builder.add_observer(
        Dispatcher::new("hub")
            .with_handler("accel_x", move |id, ctx| {
                let v = ctx.read::<f64>(id)?;
                x_log.lock().unwrap().push(format!("x:{}", v));
                Ok(())
            })
            .with_handler("accel_y", move |id, ctx| {
                let v = ctx.read::<f64>(id)?;
                y_log.lock().unwrap().push(format!("y:{}", v));
                Ok(())
            }),
    );
    builder.wire(accel_x, hub).unwrap();
    builder.wire(accel_y, hub).unwrap();
    let mut graph = builder.finalize().unwrap();

    graph.write(accel_x, 1.5).unwrap();
    graph.write(accel_y, -2.0).unwrap();
    graph.write(accel_x, 3.0).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["x:1.5", "y:-2", "x:3"]);
    assert_eq!(graph.stats().notifications, 3);
}

#[test]
fn test_unwired_write_fails_and_keeps_value() {
    let mut builder = GraphBuilder::new();
    let gyro_z = builder.add_input::<f64>("gyro_z").unwrap();
    let mut graph = builder.finalize().unwrap();

    let err = graph.write(gyro_z, 9.0).unwrap_err();
    assert_eq!(
        err,
        PipelineError::UnwiredObserver {
            identifier: "gyro_z".to_string()
        }
    );
    assert_eq!(graph.read(gyro_z).unwrap(), 0.0);
    assert_eq!(graph.stats().failed_writes, 1);
}

#[test]
fn test_identifier_collision_rejected() {
    let mut builder = GraphBuilder::new();
    builder.add_input::<f64>("accel_x").unwrap();
    let err = builder.add_input::<i32>("accel_x").unwrap_err();
    assert_eq!(err, PipelineError::IdentifierCollision("accel_x".to_string()));
}

#[test]
fn test_identifier_set_before_wiring() {
    let mut node = Node::<f64>::new(NodeKind::Input);
    assert_eq!(node.identifier(), "");
    assert_eq!(node.set_identifier("  "), Err(PipelineError::EmptyIdentifier));
    node.set_identifier("mag_x").unwrap();
    node.set_identifier("mag_y").unwrap();

    let mut builder = GraphBuilder::new();
    let handle = builder.add_node(node).unwrap();
    let (observer, log) = RecordingObserver::new("probe");
    let obs = builder.add_observer(observer);
    builder.wire(handle, obs).unwrap();
    let mut graph = builder.finalize().unwrap();

    graph.write(handle, 0.25).unwrap();
    assert_eq!(entries(&log)[0].0, "mag_y");
    assert!(graph.handle::<f64>("mag_x").is_err());
}

#[test]
fn test_type_mismatch_by_identifier() {
    let mut builder = GraphBuilder::new();
    builder.add_input::<i32>("battery").unwrap();
    let (observer, log) = RecordingObserver::new("probe");
    let obs = builder.add_observer(observer);
    builder.wire_remaining(obs).unwrap();
    let mut graph = builder.finalize().unwrap();

    graph.write_named("battery", 7i32).unwrap();
    let err = graph.write_named("battery", 3.7f64).unwrap_err();
    assert!(matches!(err, PipelineError::TypeMismatch { ref identifier, .. } if identifier == "battery"));

    assert!(graph.read_named::<f64>("battery").is_err());
    assert_eq!(graph.read_named::<i32>("battery").unwrap(), 7);
    assert_eq!(entries(&log).len(), 1);
}

#[test]
fn test_derived_node_is_read_only() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_input::<f64>("a").unwrap();
    let b = builder.add_input::<f64>("b").unwrap();
    let sum = builder.add_derived::<f64>("sum").unwrap();
    let hub = builder.add_observer(Dispatcher::new("hub").with_listener(DeriveBlock::new(
        "sum",
        ["a", "b"],
        sum,
        |ctx| Ok(ctx.read::<f64>("a")? + ctx.read::<f64>("b")?),
    )));
    builder.wire_remaining(hub).unwrap();
    let mut graph = builder.finalize().unwrap();

    graph.write(a, 0.1).unwrap();
    graph.write(b, 0.2).unwrap();
    assert_float_eq(graph.read(sum).unwrap(), 0.3, 1e-12);

    let err = graph.write(sum, 1.0).unwrap_err();
    assert_eq!(err, PipelineError::ReadOnly("sum".to_string()));
}

#[test]
fn test_unwired_derived_node_fails_finalize() {
    let mut builder = GraphBuilder::new();
    builder.add_derived::<f64>("accel_norm").unwrap();
    assert!(matches!(
        builder.finalize(),
        Err(PipelineError::UnwiredObserver { .. })
    ));
}

#[test]
fn test_rewiring_rejected() {
    let mut builder = GraphBuilder::new();
    let x = builder.add_input::<f64>("accel_x").unwrap();
    let first = builder.add_observer(Dispatcher::new("first"));
    let second = builder.add_observer(Dispatcher::new("second"));
    builder.wire(x, first).unwrap();
    assert_eq!(
        builder.wire(x, second),
        Err(PipelineError::AlreadyWired("accel_x".to_string()))
    );
}

#[test]
fn test_vector_payload_round_trip() {
    let mut builder = GraphBuilder::new();
    let accel = builder.add_input::<Vector3>("accel").unwrap();
    let (observer, log) = RecordingObserver::new("probe");
    let obs = builder.add_observer(observer);
    builder.wire(accel, obs).unwrap();
    let mut graph = builder.finalize().unwrap();

    assert_eq!(graph.read(accel).unwrap(), Vector3::default());

    let v = Vector3::new(0.1, -9.81, 0.3);
    graph.write(accel, v).unwrap();
    assert_eq!(graph.read(accel).unwrap(), v);

    let w = Vector3::new(1.0, 2.0, 2.0);
    graph
        .write_sample("accel", &Sample::Vector(w), Duration::from_millis(20))
        .unwrap();
    assert_float_eq(graph.read(accel).unwrap().norm(), 3.0, 1e-12);

    let err = graph
        .write_sample("accel", &Sample::Float(1.0), Duration::ZERO)
        .unwrap_err();
    assert!(matches!(err, PipelineError::TypeMismatch { .. }));
    assert_eq!(graph.read(accel).unwrap(), w);

    assert_eq!(
        entries(&log),
        vec![
            ("accel".to_string(), Sample::Vector(v)),
            ("accel".to_string(), Sample::Vector(w)),
        ]
    );
}

#[test]
fn test_diamond_cascade_keeps_store_and_notify_paired() {
    let mut builder = GraphBuilder::new();
    let src = builder.add_input::<i32>("src").unwrap();
    let left = builder.add_derived::<i32>("left").unwrap();
    let right = builder.add_derived::<i32>("right").unwrap();
    let merged = builder.add_derived::<i32>("merged").unwrap();
    let (observer, log) = RecordingObserver::new("probe");
    let hub = builder.add_observer(
        Dispatcher::new("hub")
            .with_listener(DeriveBlock::new("left", ["src"], left, |ctx| {
                Ok(ctx.read::<i32>("src")? + 1)
            }))
            .with_listener(DeriveBlock::new("right", ["src"], right, |ctx| {
                Ok(ctx.read::<i32>("src")? + 2)
            }))
            .with_listener(DeriveBlock::new("merge_left", ["left"], merged, |ctx| {
                Ok(ctx.read::<i32>("left")? * 10)
            }))
            .with_listener(DeriveBlock::new("merge_right", ["right"], merged, |ctx| {
                Ok(ctx.read::<i32>("right")? * 100)
            }))
            .with_listener(observer),
    );
    builder.wire_remaining(hub).unwrap();
    let mut graph = builder.finalize().unwrap();

    graph.write(src, 1).unwrap();

    let merged_seen: Vec<Sample> = entries(&log)
        .into_iter()
        .filter(|(id, _)| id == "merged")
        .map(|(_, s)| s)
        .collect();
    assert_eq!(merged_seen, vec![Sample::Int(20), Sample::Int(300)]);
    assert_eq!(graph.read(merged).unwrap(), 300);
}

proptest! {
    #[test]
    fn prop_last_write_wins(values in prop::collection::vec(any::<i32>(), 1..50)) {
        let mut builder = GraphBuilder::new();
        let node = builder.add_input::<i32>("current").unwrap();
        let (observer, log) = RecordingObserver::new("probe");
        let obs = builder.add_observer(observer);
        builder.wire(node, obs).unwrap();
        let mut graph = builder.finalize().unwrap();

        for v in &values {
            graph.write(node, *v).unwrap();
            prop_assert_eq!(graph.read(node).unwrap(), *v);
        }

        let log = entries(&log);
        prop_assert_eq!(log.len(), values.len());
        for ((identifier, sample), v) in log.iter().zip(&values) {
            prop_assert_eq!(identifier.as_str(), "current");
            prop_assert_eq!(sample, &Sample::Int(i64::from(*v)));
        }
    }

    #[test]
    fn prop_one_notification_per_write(writes in prop::collection::vec((0usize..3, -100.0f64..100.0), 0..40)) {
        let names = ["accel_x", "accel_y", "accel_z"];
        let mut builder = GraphBuilder::new();
        let handles: Vec<_> = names
            .iter()
            .map(|n| builder.add_input::<f64>(*n).unwrap())
            .collect();
        let (observer, log) = RecordingObserver::new("probe");
        let obs = builder.add_observer(observer);
        builder.wire_remaining(obs).unwrap();
        let mut graph = builder.finalize().unwrap();

        for (i, v) in &writes {
            graph.write(handles[*i], *v).unwrap();
        }

        let log = entries(&log);
        prop_assert_eq!(log.len(), writes.len());
        for ((identifier, sample), (i, v)) in log.iter().zip(&writes) {
            prop_assert_eq!(identifier.as_str(), names[*i]);
            prop_assert_eq!(sample, &Sample::Float(*v));
        }
        prop_assert_eq!(graph.stats().notifications, writes.len() as u64);
    }
}
