//! rosbridge v2 wire protocol.

use helix_motion_core::{BackendError, Capabilities, Capability, Channel};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// rosapi service listing advertised topics.
pub const ROSAPI_TOPICS: &str = "/rosapi/topics";
/// rosapi service listing advertised services.
pub const ROSAPI_SERVICES: &str = "/rosapi/services";

/// Channel for [`ROSAPI_TOPICS`].
#[must_use]
pub fn rosapi_topics() -> Channel {
    Channel::service(ROSAPI_TOPICS, "rosapi/Topics")
}

/// Channel for [`ROSAPI_SERVICES`].
#[must_use]
pub fn rosapi_services() -> Channel {
    Channel::service(ROSAPI_SERVICES, "rosapi/Services")
}

/// Operation sent from this client to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ClientOp {
    /// Request/response service call.
    CallService {
        id: String,
        service: String,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        service_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        args: Option<Value>,
    },
    /// Declare this client as a publisher.
    Advertise {
        id: String,
        topic: String,
        #[serde(rename = "type")]
        msg_type: String,
    },
    /// Withdraw a previous advertisement.
    Unadvertise { id: String, topic: String },
    /// Publish one message.
    Publish { topic: String, msg: Value },
}

impl ClientOp {
    /// Build a service call for `service`.
    #[must_use]
    pub fn call_service(id: impl Into<String>, service: &Channel, args: Option<Value>) -> Self {
        Self::CallService {
            id: id.into(),
            service: service.name.clone(),
            service_type: Some(service.type_name.clone()),
            args,
        }
    }

    /// Build an advertisement for `topic`.
    #[must_use]
    pub fn advertise(topic: &Channel) -> Self {
        Self::Advertise {
            id: format!("advertise:{}", topic.name),
            topic: topic.name.clone(),
            msg_type: topic.type_name.clone(),
        }
    }

    /// Build the matching unadvertisement for a topic name.
    #[must_use]
    pub fn unadvertise(topic: impl Into<String>) -> Self {
        let topic = topic.into();
        Self::Unadvertise {
            id: format!("advertise:{topic}"),
            topic,
        }
    }
}

const fn default_result() -> bool {
    true
}

/// Operation received from the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ServerOp {
    /// Reply to a [`ClientOp::CallService`].
    ServiceResponse {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        service: String,
        #[serde(default)]
        values: Option<Value>,
        #[serde(default = "default_result")]
        result: bool,
    },
    /// Message on a subscribed topic.
    Publish { topic: String, msg: Value },
    /// Bridge status or error report.
    Status {
        #[serde(default)]
        level: Option<String>,
        msg: String,
        #[serde(default)]
        id: Option<String>,
    },
    /// Any operation this client does not handle.
    #[serde(other)]
    Unknown,
}

fn string_list(values: &Value, key: &str) -> Result<Vec<String>, BackendError> {
    let list = values
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| BackendError::InvalidResponse(format!("missing `{key}` list")))?;

    list.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| BackendError::InvalidResponse(format!("non-string entry in `{key}`")))
        })
        .collect()
}

/// Decode a `/rosapi/topics` response into topic capabilities.
///
/// # Errors
/// Returns error if `values` lacks a `topics` string list.
pub fn parse_topics(values: &Value) -> Result<Capabilities, BackendError> {
    Ok(string_list(values, "topics")?
        .into_iter()
        .map(Capability::topic)
        .collect())
}

/// Decode a `/rosapi/services` response into service capabilities.
///
/// # Errors
/// Returns error if `values` lacks a `services` string list.
pub fn parse_services(values: &Value) -> Result<Capabilities, BackendError> {
    Ok(string_list(values, "services")?
        .into_iter()
        .map(Capability::service)
        .collect())
}

/// Human-readable reason carried by a failed service response.
#[must_use]
pub fn failure_message(values: Option<&Value>) -> String {
    match values {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "no reason given".to_string(),
    }
}
