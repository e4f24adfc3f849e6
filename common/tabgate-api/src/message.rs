//! The wire envelope exchanged on the browser channel and every client
//! socket: `{"type": "request" | "response" | "event", "data": ...}`, with
//! event payloads nested as a second tagged envelope.
//!
//! Decoding is total.  Unknown envelope types and unknown event names fail
//! with [`MessageError::UnknownVariant`]; unknown fields are ignored; fields
//! omitted on the wire are never emitted on encode.

use crate::tab::{Tab, TabDelta, TabId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Status of a [`Response`] produced by the gateway itself.  Statuses from
/// the browser pass through unchanged.
pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Request methods understood by the browser extension.  The gateway
/// answers `list` from its own tab store; everything else is forwarded.
pub mod method {
    pub const LIST: &str = "list";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const MOVE: &str = "move";
    pub const RELOAD: &str = "reload";
    pub const REMOVE: &str = "remove";
    pub const DUPLICATE: &str = "duplicate";
    pub const DISCARD: &str = "discard";
    pub const HIDE: &str = "hide";
    pub const SHOW: &str = "show";
    pub const TOGGLE_READER_MODE: &str = "toggleReaderMode";
    pub const GO_BACK: &str = "goBack";
    pub const GO_FORWARD: &str = "goForward";
    pub const SUBSCRIBE: &str = "subscribe";
}

/// A request, sent from a client to the gateway, and usually forwarded on to
/// the browser.  Correlated with its [`Response`] by uuid.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: Uuid,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_ids: Option<Vec<TabId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: method.into(),
            tab_id: None,
            tab_ids: None,
            props: None,
        }
    }

    pub fn with_tab(method: impl Into<String>, tab_id: TabId) -> Self {
        let mut request = Self::new(method);
        request.tab_id = Some(tab_id);
        request
    }

    pub fn with_tabs(method: impl Into<String>, tab_ids: Vec<TabId>) -> Self {
        let mut request = Self::new(method);
        request.tab_ids = Some(tab_ids);
        request
    }

    pub fn with_props(mut self, props: Value) -> Self {
        self.props = Some(props);
        self
    }
}

/// A response, produced by the browser or synthesized by the gateway,
/// carrying the id of the originating request.  `info` is an opaque payload
/// whose shape depends on the request method.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Response {
    pub id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
}

impl Response {
    pub fn success(id: Uuid, info: Option<Value>) -> Self {
        Self {
            id,
            status: STATUS_SUCCESS.to_string(),
            info,
        }
    }

    pub fn error(id: Uuid, info: impl Into<String>) -> Self {
        Self {
            id,
            status: STATUS_ERROR.to_string(),
            info: Some(Value::String(info.into())),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// A tab lifecycle event, pushed by the browser.  Applied to the gateway's
/// tab store exactly once, then broadcast to every connected client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum TabEvent {
    Created(Tab),
    Activated(Activated),
    Updated(Updated),
    Moved(Moved),
    Removed(Removed),
    Attached(Attached),
    Detached(Detached),
}

impl TabEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TabEvent::Created(_) => "created",
            TabEvent::Activated(_) => "activated",
            TabEvent::Updated(_) => "updated",
            TabEvent::Moved(_) => "moved",
            TabEvent::Removed(_) => "removed",
            TabEvent::Attached(_) => "attached",
            TabEvent::Detached(_) => "detached",
        }
    }

    pub fn from_value(value: Value) -> Result<Self, MessageError> {
        let envelope: Envelope = serde_json::from_value(value)?;
        let event = match envelope.tag.as_str() {
            "created" => TabEvent::Created(serde_json::from_value(envelope.data)?),
            "activated" => TabEvent::Activated(serde_json::from_value(envelope.data)?),
            "updated" => TabEvent::Updated(serde_json::from_value(envelope.data)?),
            "moved" => TabEvent::Moved(serde_json::from_value(envelope.data)?),
            "removed" => TabEvent::Removed(serde_json::from_value(envelope.data)?),
            "attached" => TabEvent::Attached(serde_json::from_value(envelope.data)?),
            "detached" => TabEvent::Detached(serde_json::from_value(envelope.data)?),
            _ => return Err(MessageError::UnknownVariant(envelope.tag)),
        };

        Ok(event)
    }
}

/// `previous` is the tab that lost focus.  The browser omits it for the
/// first activation in a window, and it may already be closed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activated {
    pub tab_id: TabId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<TabId>,
    #[serde(default)]
    pub window_id: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Updated {
    pub tab_id: TabId,
    #[serde(default)]
    pub delta: TabDelta,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Moved {
    pub tab_id: TabId,
    #[serde(default)]
    pub window_id: u32,
    #[serde(default)]
    pub from_index: u32,
    pub to_index: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Removed {
    pub tab_id: TabId,
    #[serde(default)]
    pub window_id: u32,
    #[serde(default)]
    pub is_window_closing: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attached {
    pub tab_id: TabId,
    #[serde(default)]
    pub window_id: u32,
    #[serde(default)]
    pub position: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Detached {
    pub tab_id: TabId,
    #[serde(default)]
    pub window_id: u32,
    #[serde(default)]
    pub position: u32,
}

/// The envelope carried by every frame.  Exactly one payload is populated;
/// the discriminating tag exists only on the wire.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Message {
    Request(Request),
    Response(Response),
    Event(TabEvent),
}

impl Message {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MessageError> {
        let value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, MessageError> {
        let envelope: Envelope = serde_json::from_value(value)?;
        let message = match envelope.tag.as_str() {
            "request" => Message::Request(serde_json::from_value(envelope.data)?),
            "response" => Message::Response(serde_json::from_value(envelope.data)?),
            "event" => Message::Event(TabEvent::from_value(envelope.data)?),
            _ => return Err(MessageError::UnknownVariant(envelope.tag)),
        };

        Ok(message)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, MessageError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: String,
    data: Value,
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("malformed message payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown message variant: {0}")]
    UnknownVariant(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab::{Tab, TabDelta, TabId};

    fn tab_id(id: u32) -> TabId {
        TabId::new(id).expect("nonzero id")
    }

    fn sample_events() -> Vec<TabEvent> {
        let mut tab = Tab::new(tab_id(1));
        tab.window_id = 10;
        tab.url = "https://example.com".into();
        tab.title = "Example".into();

        vec![
            TabEvent::Created(tab),
            TabEvent::Activated(Activated {
                tab_id: tab_id(1),
                previous: Some(tab_id(2)),
                window_id: 10,
            }),
            TabEvent::Updated(Updated {
                tab_id: tab_id(1),
                delta: TabDelta {
                    title: Some("New".into()),
                    ..TabDelta::default()
                },
            }),
            TabEvent::Moved(Moved {
                tab_id: tab_id(1),
                window_id: 10,
                from_index: 0,
                to_index: 3,
            }),
            TabEvent::Removed(Removed {
                tab_id: tab_id(1),
                window_id: 10,
                is_window_closing: false,
            }),
            TabEvent::Attached(Attached {
                tab_id: tab_id(1),
                window_id: 11,
                position: 0,
            }),
            TabEvent::Detached(Detached {
                tab_id: tab_id(1),
                window_id: 10,
                position: 2,
            }),
        ]
    }

    #[test]
    fn message_roundtrips_every_event_variant() {
        for event in sample_events() {
            let message = Message::Event(event);
            let bytes = message.to_vec().expect("encode");
            let decoded = Message::from_slice(&bytes).expect("decode");
            assert_eq!(message, decoded);
        }
    }

    #[test]
    fn request_roundtrips() {
        let request = Request::with_tab(method::UPDATE, tab_id(7))
            .with_props(serde_json::json!({"active": true}));
        let message = Message::Request(request);

        let bytes = message.to_vec().expect("encode");
        assert_eq!(message, Message::from_slice(&bytes).expect("decode"));
    }

    #[test]
    fn response_roundtrips() {
        let response = Response::success(Uuid::new_v4(), Some(serde_json::json!([1, 2, 3])));
        let message = Message::Response(response);

        let bytes = message.to_vec().expect("encode");
        assert_eq!(message, Message::from_slice(&bytes).expect("decode"));
    }

    #[test]
    fn request_wire_shape() {
        let request = Request::new(method::LIST);
        let id = request.id;
        let json = serde_json::to_value(&Message::Request(request)).expect("encode");

        assert_eq!(
            serde_json::json!({
                "type": "request",
                "data": {"id": id.to_string(), "method": "list"}
            }),
            json
        );
    }

    #[test]
    fn event_wire_shape() {
        let event = TabEvent::Updated(Updated {
            tab_id: tab_id(1),
            delta: TabDelta {
                title: Some("New".into()),
                ..TabDelta::default()
            },
        });
        let json = serde_json::to_value(&Message::Event(event)).expect("encode");

        assert_eq!(
            serde_json::json!({
                "type": "event",
                "data": {
                    "type": "updated",
                    "data": {"tabId": 1, "delta": {"title": "New"}}
                }
            }),
            json
        );
    }

    #[test]
    fn unknown_envelope_type_fails() {
        let result = Message::from_slice(br#"{"type":"telemetry","data":{}}"#);
        match result {
            Err(MessageError::UnknownVariant(name)) => assert_eq!("telemetry", name),
            other => panic!("expected UnknownVariant, got {:?}", other),
        }
    }

    #[test]
    fn unknown_event_name_fails() {
        let result =
            Message::from_slice(br#"{"type":"event","data":{"type":"zoomed","data":{}}}"#);
        match result {
            Err(MessageError::UnknownVariant(name)) => assert_eq!("zoomed", name),
            other => panic!("expected UnknownVariant, got {:?}", other),
        }
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let message = Message::from_slice(
            br#"{"type":"event","data":{"type":"removed","data":{"tabId":1,"windowId":10,"isWindowClosing":false,"reason":"user"}},"extra":42}"#,
        )
        .expect("unknown fields should be ignored");

        match message {
            Message::Event(TabEvent::Removed(removed)) => {
                assert_eq!(tab_id(1), removed.tab_id);
            }
            other => panic!("expected removed event, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_fails_with_json_error() {
        let result = Message::from_slice(b"{not json");
        assert!(matches!(result, Err(MessageError::Json(_))));
    }
}
