//! rosbridge websocket client.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex as StdMutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use futures::{SinkExt, Stream, StreamExt};
use helix_motion_core::{
    Backend, BackendError, BridgeOptions, Capabilities, Channel, Connector, Endpoint,
};
use serde_json::Value;
use tokio::{
    sync::{Mutex, mpsc, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use uuid::Uuid;

use crate::protocol::{self, ClientOp, ServerOp};

/// Payload of a `service_response`.
#[derive(Debug)]
struct ServiceReply {
    values: Option<Value>,
    result: bool,
}

type PendingCalls = Arc<Mutex<HashMap<String, oneshot::Sender<ServiceReply>>>>;

/// Opens [`RosbridgeClient`] sessions.
#[derive(Debug, Clone, Default)]
pub struct RosbridgeConnector {
    options: BridgeOptions,
}

impl RosbridgeConnector {
    #[must_use]
    pub const fn new(options: BridgeOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Connector for RosbridgeConnector {
    type Backend = RosbridgeClient;

    async fn connect(&self, endpoint: &Endpoint) -> Result<RosbridgeClient, BackendError> {
        RosbridgeClient::connect(endpoint, self.options).await
    }
}

/// A connected rosbridge client.
///
/// Outgoing frames go through a single writer task; a reader task routes
/// `service_response` frames back to the waiting caller by request id.
pub struct RosbridgeClient {
    endpoint: Endpoint,
    options: BridgeOptions,
    tx: mpsc::UnboundedSender<Message>,
    pending: PendingCalls,
    advertised_topics: Mutex<HashSet<String>>,
    connected: Arc<AtomicBool>,
    closed: AtomicBool,
    send_task: StdMutex<Option<JoinHandle<()>>>,
    recv_task: StdMutex<Option<JoinHandle<()>>>,
}

impl RosbridgeClient {
    /// Connect to the bridge at `endpoint`.
    ///
    /// # Errors
    /// Returns error if the handshake fails or exceeds `options.connect_timeout`.
    pub async fn connect(endpoint: &Endpoint, options: BridgeOptions) -> Result<Self, BackendError> {
        let url = endpoint.url();
        let (ws_stream, _) = tokio::time::timeout(options.connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| BackendError::Timeout(format!("handshake with {url}")))?
            .map_err(|e| BackendError::ConnectFailed(e.to_string()))?;

        tracing::info!(%endpoint, "Connected to rosbridge");

        let (mut sender, receiver) = ws_stream.split();

        // Channel for frames headed to the bridge
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

        let send_task = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if let Err(e) = sender.send(msg).await {
                    tracing::error!("Failed to write to rosbridge: {e}");
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        let pending: PendingCalls = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(true));
        let recv_task = tokio::spawn(read_loop(
            receiver,
            Arc::clone(&pending),
            Arc::clone(&connected),
        ));

        Ok(Self {
            endpoint: endpoint.clone(),
            options,
            tx,
            pending,
            advertised_topics: Mutex::new(HashSet::new()),
            connected,
            closed: AtomicBool::new(false),
            send_task: StdMutex::new(Some(send_task)),
            recv_task: StdMutex::new(Some(recv_task)),
        })
    }

    /// Endpoint this client is connected to.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn enqueue(&self, op: &ClientOp) -> Result<(), BackendError> {
        let json = serde_json::to_string(op)?;
        self.tx
            .send(Message::Text(json))
            .map_err(|_| BackendError::ConnectionClosed)
    }

    fn send(&self, op: &ClientOp) -> Result<(), BackendError> {
        if !self.is_connected() {
            return Err(BackendError::ConnectionClosed);
        }
        self.enqueue(op)
    }

    fn take_task(slot: &StdMutex<Option<JoinHandle<()>>>) -> Option<JoinHandle<()>> {
        slot.lock().ok().and_then(|mut guard| guard.take())
    }
}

#[async_trait]
impl Backend for RosbridgeClient {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && !self.closed.load(Ordering::SeqCst)
    }

    async fn advertised(&self) -> Result<Capabilities, BackendError> {
        let topics = self.call(&protocol::rosapi_topics(), None).await?;
        let services = self.call(&protocol::rosapi_services(), None).await?;

        let mut capabilities = protocol::parse_topics(&topics)?;
        capabilities.extend(protocol::parse_services(&services)?);
        tracing::debug!(count = capabilities.len(), "Fetched advertised capabilities");
        Ok(capabilities)
    }

    async fn call(&self, service: &Channel, args: Option<Value>) -> Result<Value, BackendError> {
        let id = format!("call_service:{}:{}", service.name, Uuid::new_v4());
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), reply_tx);

        if let Err(e) = self.send(&ClientOp::call_service(id.clone(), service, args)) {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }
        tracing::debug!(service = %service.name, %id, "Service call sent");

        let reply = match tokio::time::timeout(self.options.call_timeout, reply_rx).await {
            Ok(Ok(reply)) => reply,
            // Reader dropped the waiter: the connection went away.
            Ok(Err(_)) => return Err(BackendError::ConnectionClosed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(BackendError::Timeout(service.name.clone()));
            }
        };

        if reply.result {
            Ok(reply.values.unwrap_or(Value::Null))
        } else {
            Err(BackendError::ServiceFailed {
                service: service.name.clone(),
                message: protocol::failure_message(reply.values.as_ref()),
            })
        }
    }

    async fn publish(&self, topic: &Channel, msg: Value) -> Result<(), BackendError> {
        {
            let mut topics = self.advertised_topics.lock().await;
            if !topics.contains(&topic.name) {
                self.send(&ClientOp::advertise(topic))?;
                topics.insert(topic.name.clone());
                tracing::debug!(topic = %topic.name, "Advertised topic");
            }
        }

        self.send(&ClientOp::Publish {
            topic: topic.name.clone(),
            msg,
        })
    }

    async fn close(&self) -> Result<(), BackendError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let topics: Vec<String> = self.advertised_topics.lock().await.drain().collect();
        for topic in topics {
            if let Err(e) = self.enqueue(&ClientOp::unadvertise(topic)) {
                tracing::debug!("Skipping unadvertise: {e}");
                break;
            }
        }
        let _ = self.tx.send(Message::Close(None));

        if let Some(mut handle) = Self::take_task(&self.send_task) {
            if tokio::time::timeout(self.options.connect_timeout, &mut handle)
                .await
                .is_err()
            {
                tracing::warn!(endpoint = %self.endpoint, "Timed out flushing close frame");
                handle.abort();
            }
        }
        if let Some(handle) = Self::take_task(&self.recv_task) {
            handle.abort();
        }

        self.connected.store(false, Ordering::SeqCst);
        self.pending.lock().await.clear();
        tracing::info!(endpoint = %self.endpoint, "Closed rosbridge connection");
        Ok(())
    }
}

impl Drop for RosbridgeClient {
    fn drop(&mut self) {
        if let Some(handle) = Self::take_task(&self.recv_task) {
            handle.abort();
        }
    }
}

async fn read_loop<S, E>(mut receiver: S, pending: PendingCalls, connected: Arc<AtomicBool>)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(data)) => match String::from_utf8(data) {
                Ok(s) => s,
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {e}");
                break;
            }
        };

        match serde_json::from_str::<ServerOp>(&text) {
            Ok(ServerOp::ServiceResponse {
                id,
                service,
                values,
                result,
            }) => {
                let waiter = match id {
                    Some(id) => pending.lock().await.remove(&id),
                    None => None,
                };
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(ServiceReply { values, result });
                    }
                    None => tracing::warn!(%service, "Unmatched service response"),
                }
            }
            Ok(ServerOp::Status { level, msg, .. }) => match level.as_deref() {
                Some("error") => tracing::error!("rosbridge: {msg}"),
                Some("warning") => tracing::warn!("rosbridge: {msg}"),
                _ => tracing::info!("rosbridge: {msg}"),
            },
            Ok(ServerOp::Publish { topic, .. }) => {
                tracing::trace!(%topic, "Ignoring topic message");
            }
            Ok(ServerOp::Unknown) => {}
            Err(e) => tracing::warn!("Invalid rosbridge message: {e}"),
        }
    }

    connected.store(false, Ordering::SeqCst);
    // Dropping the senders wakes every waiting caller with ConnectionClosed.
    pending.lock().await.clear();
    tracing::debug!("rosbridge reader finished");
}
