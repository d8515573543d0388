use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::RouterError;
use crate::websockets::{EventKind, WebSocketMessage};

/// Opaque transport-assigned identifier of one client connection.
///
/// Distinct from the identity a client announces in `join_chat`: one
/// connection may speak for several identities and one identity may be
/// present through several connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A chat message as relayed between clients.
///
/// `read_by` is a snapshot of the room roster taken when the relay received
/// the message. It is a presence proxy, not an acknowledgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub room_id: String,
    pub text: String,
    pub sender: String,
    #[serde(default)]
    pub read_by: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Client -> Server payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPayload {
    pub room_id: String,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagePayload {
    pub room_id: String,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    pub room_id: String,
    pub identity: String,
    pub message_ids: Vec<String>,
}

/// Used in both directions: the relay forwards it unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub room_id: String,
    pub identity: String,
    pub typing: bool,
}

/// Server -> Client payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUsersPayload {
    pub room_id: String,
    pub identities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesReadPayload {
    pub room_id: String,
    pub identity: String,
    pub message_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a ChatMessage,
}

/// Room-scoped events accepted from clients
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    JoinChat(MembershipPayload),
    LeaveChat(MembershipPayload),
    NewMessage(NewMessagePayload),
    MarkRead(MarkReadPayload),
    Typing(TypingPayload),
}

impl InboundEvent {
    /// Parses one text frame into an inbound event.
    ///
    /// Frames with an unknown or server-only `type` are rejected with
    /// `UnknownEvent`; anything else that does not fit the payload shape is
    /// `MalformedPayload`.
    pub fn parse(frame: &str) -> Result<Self, RouterError> {
        let raw: Value = serde_json::from_str(frame)
            .map_err(|e| RouterError::MalformedPayload(format!("invalid JSON frame: {}", e)))?;

        let kind_name = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| RouterError::MalformedPayload("missing event type".to_string()))?;

        let kind = EventKind::from_str(kind_name)
            .map_err(|_| RouterError::UnknownEvent(kind_name.to_string()))?;

        let payload = raw.get("payload").cloned().unwrap_or(Value::Null);
        Self::from_parts(kind, payload)
    }

    pub fn from_parts(kind: EventKind, payload: Value) -> Result<Self, RouterError> {
        match kind {
            EventKind::JoinChat => Ok(InboundEvent::JoinChat(decode(kind, payload)?)),
            EventKind::LeaveChat => Ok(InboundEvent::LeaveChat(decode(kind, payload)?)),
            EventKind::NewMessage => Ok(InboundEvent::NewMessage(decode(kind, payload)?)),
            EventKind::MarkRead => Ok(InboundEvent::MarkRead(decode(kind, payload)?)),
            EventKind::Typing => Ok(InboundEvent::Typing(decode(kind, payload)?)),
            EventKind::ActiveUsers | EventKind::MessagesRead | EventKind::Error => {
                Err(RouterError::UnknownEvent(kind.to_string()))
            }
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::JoinChat(_) => EventKind::JoinChat,
            InboundEvent::LeaveChat(_) => EventKind::LeaveChat,
            InboundEvent::NewMessage(_) => EventKind::NewMessage,
            InboundEvent::MarkRead(_) => EventKind::MarkRead,
            InboundEvent::Typing(_) => EventKind::Typing,
        }
    }

    pub fn room_id(&self) -> &str {
        match self {
            InboundEvent::JoinChat(p) | InboundEvent::LeaveChat(p) => &p.room_id,
            InboundEvent::NewMessage(p) => &p.room_id,
            InboundEvent::MarkRead(p) => &p.room_id,
            InboundEvent::Typing(p) => &p.room_id,
        }
    }
}

impl TryFrom<WebSocketMessage> for InboundEvent {
    type Error = RouterError;

    fn try_from(message: WebSocketMessage) -> Result<Self, Self::Error> {
        Self::from_parts(message.message_type, message.payload)
    }
}

fn decode<T: DeserializeOwned>(kind: EventKind, payload: Value) -> Result<T, RouterError> {
    serde_json::from_value(payload)
        .map_err(|e| RouterError::MalformedPayload(format!("{}: {}", kind, e)))
}

/// Events the relay fans out to connections
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    ActiveUsers(ActiveUsersPayload),
    NewMessage(ChatMessage),
    MessagesRead(MessagesReadPayload),
    Typing(TypingPayload),
    Error(ErrorPayload),
}

impl OutboundEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            OutboundEvent::ActiveUsers(_) => EventKind::ActiveUsers,
            OutboundEvent::NewMessage(_) => EventKind::NewMessage,
            OutboundEvent::MessagesRead(_) => EventKind::MessagesRead,
            OutboundEvent::Typing(_) => EventKind::Typing,
            OutboundEvent::Error(_) => EventKind::Error,
        }
    }

    /// Wraps the event in the wire envelope
    pub fn to_message(&self) -> Result<WebSocketMessage, RouterError> {
        let payload = match self {
            OutboundEvent::ActiveUsers(p) => serde_json::to_value(p)?,
            OutboundEvent::NewMessage(message) => serde_json::to_value(MessageBody { message })?,
            OutboundEvent::MessagesRead(p) => serde_json::to_value(p)?,
            OutboundEvent::Typing(p) => serde_json::to_value(p)?,
            OutboundEvent::Error(p) => serde_json::to_value(p)?,
        };
        Ok(WebSocketMessage::new(self.kind(), payload))
    }

    pub fn to_json(&self) -> Result<String, RouterError> {
        Ok(serde_json::to_string(&self.to_message()?)?)
    }

    pub fn error(message: impl Into<String>) -> Self {
        OutboundEvent::Error(ErrorPayload {
            message: message.into(),
        })
    }
}
