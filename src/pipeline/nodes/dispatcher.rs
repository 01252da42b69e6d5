//! Dispatcher observer: routes notifications by identifier.
//!
//! One observer can be shared by many nodes. The dispatcher looks at the
//! identifier it is notified with and only runs the handlers registered for
//! that identifier, so writing `accel_y` never fires the `accel_x` handler.
//! Listeners (sinks, processing blocks) see every notification.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::observer::{NotifyContext, Observer};
use std::any::Any;
use std::collections::HashMap;

/// Per-identifier reaction.
pub type Handler = Box<dyn FnMut(&str, &mut NotifyContext<'_>) -> PipelineResult<()> + Send>;

pub struct Dispatcher {
    name: String,
    handlers: HashMap<String, Vec<Handler>>,
    listeners: Vec<Box<dyn Observer>>,
    unrouted: u64,
}

impl Dispatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: HashMap::new(),
            listeners: Vec::new(),
            unrouted: 0,
        }
    }

    /// Register a handler for one identifier. Several handlers per identifier
    /// run in registration order.
    pub fn on<F>(&mut self, identifier: impl Into<String>, handler: F) -> &mut Self
    where
        F: FnMut(&str, &mut NotifyContext<'_>) -> PipelineResult<()> + Send + 'static,
    {
        self.handlers
            .entry(identifier.into())
            .or_default()
            .push(Box::new(handler));
        self
    }

    /// Builder form of [`on`](Self::on).
    pub fn with_handler<F>(mut self, identifier: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&str, &mut NotifyContext<'_>) -> PipelineResult<()> + Send + 'static,
    {
        self.on(identifier, handler);
        self
    }

    /// Attach an observer that receives every notification after the handlers.
    pub fn listen(&mut self, observer: impl Observer + 'static) -> &mut Self {
        self.listeners.push(Box::new(observer));
        self
    }

    pub fn with_listener(mut self, observer: impl Observer + 'static) -> Self {
        self.listen(observer);
        self
    }

    /// First listener of type `O`.
    pub fn listener<O: Observer + 'static>(&self) -> Option<&O> {
        self.listeners
            .iter()
            .find_map(|l| l.as_any().downcast_ref::<O>())
    }

    pub fn listener_mut<O: Observer + 'static>(&mut self) -> Option<&mut O> {
        self.listeners
            .iter_mut()
            .find_map(|l| l.as_any_mut().downcast_mut::<O>())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|k| k.as_str())
    }

    pub fn has_route(&self, identifier: &str) -> bool {
        self.handlers.contains_key(identifier)
    }

    /// Notifications that matched no handler and found no listener.
    pub fn unrouted(&self) -> u64 {
        self.unrouted
    }
}

impl Observer for Dispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&mut self, identifier: &str, ctx: &mut NotifyContext<'_>) -> PipelineResult<()> {
        let mut routed = false;

        if let Some(handlers) = self.handlers.get_mut(identifier) {
            for handler in handlers.iter_mut() {
                handler(identifier, ctx)?;
            }
            routed = !handlers.is_empty();
        }

        for listener in &mut self.listeners {
            listener.notify(identifier, ctx)?;
            routed = true;
        }

        if !routed {
            self.unrouted += 1;
            tracing::trace!("{}: no route for '{}'", self.name, identifier);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::graph::GraphBuilder;
    use crate::pipeline::value::Sample;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(String, Sample)>>>;

    fn recording_handler(
        log: Log,
    ) -> impl FnMut(&str, &mut NotifyContext<'_>) -> PipelineResult<()> + Send + 'static {
        move |identifier, ctx| {
            let sample = ctx.sample(identifier)?;
            log.lock().unwrap().push((identifier.to_string(), sample));
            Ok(())
        }
    }

    #[test]
    fn test_routes_by_identifier() {
        let x_log: Log = Arc::default();
        let y_log: Log = Arc::default();

        let mut builder = GraphBuilder::new();
        let x = builder.add_input::<i32>("accel_x").unwrap();
        let y = builder.add_input::<i32>("accel_y").unwrap();
        let hub = builder.add_observer(
            Dispatcher::new("hub")
                .with_handler("accel_x", recording_handler(x_log.clone()))
                .with_handler("accel_y", recording_handler(y_log.clone())),
        );
        builder.wire(x, hub).unwrap();
        builder.wire(y, hub).unwrap();
        let mut graph = builder.finalize().unwrap();

        graph.write(y, 7).unwrap();
        assert!(x_log.lock().unwrap().is_empty());
        assert_eq!(
            *y_log.lock().unwrap(),
            vec![("accel_y".to_string(), Sample::Int(7))]
        );

        graph.write(x, 3).unwrap();
        assert_eq!(x_log.lock().unwrap().len(), 1);
        assert_eq!(y_log.lock().unwrap().len(), 1);
        assert_eq!(graph.observer::<Dispatcher>(hub).unwrap().unrouted(), 0);
    }

    #[test]
    fn test_unrouted_counted() {
        let mut builder = GraphBuilder::new();
        let x = builder.add_input::<f64>("gyro_x").unwrap();
        let hub = builder.add_observer(Dispatcher::new("hub"));
        builder.wire(x, hub).unwrap();
        let mut graph = builder.finalize().unwrap();

        graph.write(x, 1.0).unwrap();
        graph.write(x, 2.0).unwrap();
        assert_eq!(graph.observer::<Dispatcher>(hub).unwrap().unrouted(), 2);
        assert_eq!(graph.read(x).unwrap(), 2.0);
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut builder = GraphBuilder::new();
        let x = builder.add_input::<i32>("accel_x").unwrap();
        let hub = builder.add_observer(Dispatcher::new("hub").with_handler(
            "accel_x",
            |identifier: &str, _ctx: &mut NotifyContext<'_>| {
                Err(crate::pipeline::PipelineError::observer(identifier, "rejected"))
            },
        ));
        builder.wire(x, hub).unwrap();
        let mut graph = builder.finalize().unwrap();

        assert!(graph.write(x, 1).is_err());
        assert_eq!(graph.stats().failed_writes, 1);
    }

    #[test]
    fn test_routes_listing() {
        let mut hub = Dispatcher::new("hub");
        hub.on("accel_x", |_: &str, _: &mut NotifyContext<'_>| Ok(()));
        assert!(hub.has_route("accel_x"));
        assert!(!hub.has_route("accel_y"));
        assert_eq!(hub.routes().collect::<Vec<_>>(), vec!["accel_x"]);
        assert_eq!(hub.listener_count(), 0);
    }
}
