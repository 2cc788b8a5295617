//! A backend that records every interaction against the (paused) tokio clock.

#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use helix_motion_core::{
    Backend, BackendError, Capabilities, Capability, Channel, Connector, Endpoint,
};
use serde_json::{Value, json};
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Call {
        service: String,
        args: Option<Value>,
        at: Duration,
        done: Duration,
    },
    Publish {
        topic: String,
        msg: Value,
        at: Duration,
    },
}

pub struct Shared {
    start: Instant,
    advertised: Capabilities,
    events: Mutex<Vec<Event>>,
    closes: AtomicUsize,
    connects: AtomicUsize,
    fail_service: Option<String>,
    fail_publish_at: Option<usize>,
    planner_success: bool,
    call_latency: Duration,
}

impl Shared {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn calls_to(&self, service: &str) -> Vec<(Option<Value>, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Call {
                    service: s,
                    args,
                    at,
                    ..
                } if s == service => Some((args, at)),
                _ => None,
            })
            .collect()
    }

    /// `(started, finished)` for every call to `service`.
    pub fn call_spans(&self, service: &str) -> Vec<(Duration, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Call {
                    service: s,
                    at,
                    done,
                    ..
                } if s == service => Some((at, done)),
                _ => None,
            })
            .collect()
    }

    pub fn publishes(&self) -> Vec<(Value, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Publish { msg, at, .. } => Some((msg, at)),
                Event::Call { .. } => None,
            })
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

/// Builder for a [`StubConnector`] and the shared record it writes to.
pub struct Stub {
    advertised: Vec<Capability>,
    refuse: bool,
    fail_service: Option<String>,
    fail_publish_at: Option<usize>,
    planner_success: bool,
    call_latency: Duration,
}

impl Stub {
    pub fn advertising(advertised: &[Capability]) -> Self {
        Self {
            advertised: advertised.to_vec(),
            refuse: false,
            fail_service: None,
            fail_publish_at: None,
            planner_success: true,
            call_latency: Duration::ZERO,
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::advertising(&[])
        }
    }

    pub fn failing_service(mut self, service: &str) -> Self {
        self.fail_service = Some(service.to_string());
        self
    }

    pub fn failing_publish_at(mut self, n: usize) -> Self {
        self.fail_publish_at = Some(n);
        self
    }

    /// Every service call takes `latency` before it responds.
    pub fn responding_after(mut self, latency: Duration) -> Self {
        self.call_latency = latency;
        self
    }

    pub fn planner_rejects(mut self) -> Self {
        self.planner_success = false;
        self
    }

    pub fn build(self) -> (StubConnector, Arc<Shared>) {
        let shared = Arc::new(Shared {
            start: Instant::now(),
            advertised: self.advertised.into_iter().collect(),
            events: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
            connects: AtomicUsize::new(0),
            fail_service: self.fail_service,
            fail_publish_at: self.fail_publish_at,
            planner_success: self.planner_success,
            call_latency: self.call_latency,
        });
        let connector = StubConnector {
            shared: Arc::clone(&shared),
            refuse: self.refuse,
        };
        (connector, shared)
    }
}

pub struct StubConnector {
    shared: Arc<Shared>,
    refuse: bool,
}

#[async_trait]
impl Connector for StubConnector {
    type Backend = RecordingBackend;

    async fn connect(&self, endpoint: &Endpoint) -> Result<RecordingBackend, BackendError> {
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(BackendError::ConnectFailed(format!("{endpoint}: connection refused")));
        }
        Ok(RecordingBackend {
            shared: Arc::clone(&self.shared),
        })
    }
}

pub struct RecordingBackend {
    shared: Arc<Shared>,
}

#[async_trait]
impl Backend for RecordingBackend {
    fn is_connected(&self) -> bool {
        self.shared.closes() == 0
    }

    async fn advertised(&self) -> Result<Capabilities, BackendError> {
        Ok(self.shared.advertised.clone())
    }

    async fn call(&self, service: &Channel, args: Option<Value>) -> Result<Value, BackendError> {
        if self.shared.fail_service.as_deref() == Some(service.name.as_str()) {
            return Err(BackendError::ServiceFailed {
                service: service.name.clone(),
                message: "service unavailable".to_string(),
            });
        }
        let at = self.shared.start.elapsed();
        if !self.shared.call_latency.is_zero() {
            tokio::time::sleep(self.shared.call_latency).await;
        }
        self.shared.events.lock().unwrap().push(Event::Call {
            service: service.name.clone(),
            args,
            at,
            done: self.shared.start.elapsed(),
        });
        Ok(json!({"success": self.shared.planner_success, "message": ""}))
    }

    async fn publish(&self, topic: &Channel, msg: Value) -> Result<(), BackendError> {
        let mut events = self.shared.events.lock().unwrap();
        let published = events
            .iter()
            .filter(|e| matches!(e, Event::Publish { .. }))
            .count();
        if self.shared.fail_publish_at == Some(published) {
            return Err(BackendError::SendFailed("socket reset".to_string()));
        }
        events.push(Event::Publish {
            topic: topic.name.clone(),
            msg,
            at: self.shared.start.elapsed(),
        });
        Ok(())
    }

    async fn close(&self) -> Result<(), BackendError> {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
