//! Signaling event classification
//!
//! This module defines the wire-shaped event raised by the signaling
//! layer, the exhaustive [`SignalingEvent`] enum the rest of the crate
//! works with, and the per-dispatch [`EventContext`] snapshot.
//!
//! Classification replaces the string-keyed handler lookup a signaling
//! stack typically exposes with a tagged enum and an exhaustive match:
//! unknown names are rejected here, at the boundary, with a typed error
//! instead of a silent table miss.
//!
//! # Usage Examples
//!
//! ```rust
//! use tone_client_core::events::{RawSignalingEvent, SignalingEvent};
//!
//! let raw: RawSignalingEvent = serde_json::from_str(
//!     r#"{ "name": "registered" }"#,
//! ).unwrap();
//! let event = SignalingEvent::classify(&raw).unwrap();
//! assert_eq!(event, SignalingEvent::Registered);
//! ```
//!
//! ```rust
//! use tone_client_core::events::{RawSignalingEvent, SignalingEvent};
//! use tone_client_core::ClientError;
//!
//! let raw = RawSignalingEvent::named("bogus");
//! let err = SignalingEvent::classify(&raw).unwrap_err();
//! assert_eq!(err, ClientError::UnhandledEvent { name: "bogus".to_string() });
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// A signaling event as received from the signaling layer
///
/// Only `name` is guaranteed; `data` is present on events that carry a
/// session payload (currently invites). No other wire format is in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSignalingEvent {
    /// Event tag as raised by the signaling layer
    pub name: String,
    /// Optional session payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EventData>,
}

impl RawSignalingEvent {
    /// Build a payload-less event with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), data: None }
    }

    /// Build an event carrying a session payload with the given remote user
    pub fn with_remote_user(name: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Some(EventData {
                session: SessionPayload {
                    remote_identity: RemoteIdentity {
                        uri: IdentityUri { user: user.into() },
                    },
                },
            }),
        }
    }
}

/// Payload attached to session-bearing events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    /// The signaling session the event refers to
    pub session: SessionPayload,
}

/// Opaque session object; only the remote identity is consumed here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// Identity of the party that originated the session
    pub remote_identity: RemoteIdentity,
}

/// Remote identity wrapper as the signaling layer shapes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIdentity {
    /// URI of the remote party
    pub uri: IdentityUri,
}

/// URI of the remote party; only the user part is consumed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUri {
    /// User part of the URI (the caller's number or account name)
    pub user: String,
}

/// A classified signaling event
///
/// Exhaustive over every event kind this core handles; classification of
/// any other name fails with [`ClientError::UnhandledEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingEvent {
    /// Registration with the signaling layer succeeded
    Registered,
    /// Registration with the signaling layer was rejected
    RegistrationFailed,
    /// The client unregistered from the signaling layer
    Unregistered,
    /// A call leg ended; which one is inferred by the terminate handler
    Terminated,
    /// The remote side accepted an outbound call
    Accepted,
    /// An inbound invite was accepted
    InviteAccepted,
    /// The remote side rejected the call
    Rejected,
    /// An inbound call invitation arrived
    InviteReceived {
        /// User part of the caller's URI
        caller: String,
    },
    /// The call failed at the signaling level
    Failed,
    /// The outbound call is ringing at the remote side
    Progress,
    /// The remote side cancelled an invite; deliberately a no-op here
    Cancel,
}

impl SignalingEvent {
    /// Classify a raw signaling event into its tagged variant
    ///
    /// # Errors
    ///
    /// - [`ClientError::UnhandledEvent`] for names outside the
    ///   classification table
    /// - [`ClientError::InvalidEventPayload`] when a session-bearing
    ///   event arrives without its payload
    pub fn classify(raw: &RawSignalingEvent) -> ClientResult<Self> {
        let event = match raw.name.as_str() {
            "registered" => Self::Registered,
            "registrationFailed" => Self::RegistrationFailed,
            "unregistered" => Self::Unregistered,
            "terminated" => Self::Terminated,
            "accepted" => Self::Accepted,
            "inviteAccepted" => Self::InviteAccepted,
            "rejected" => Self::Rejected,
            "inviteReceived" => Self::InviteReceived {
                caller: remote_user(raw)?,
            },
            "failed" => Self::Failed,
            "progress" => Self::Progress,
            "cancel" => Self::Cancel,
            other => {
                return Err(ClientError::UnhandledEvent { name: other.to_string() });
            }
        };
        Ok(event)
    }

    /// The wire name of this event kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::RegistrationFailed => "registrationFailed",
            Self::Unregistered => "unregistered",
            Self::Terminated => "terminated",
            Self::Accepted => "accepted",
            Self::InviteAccepted => "inviteAccepted",
            Self::Rejected => "rejected",
            Self::InviteReceived { .. } => "inviteReceived",
            Self::Failed => "failed",
            Self::Progress => "progress",
            Self::Cancel => "cancel",
        }
    }
}

fn remote_user(raw: &RawSignalingEvent) -> ClientResult<String> {
    raw.data
        .as_ref()
        .map(|data| data.session.remote_identity.uri.user.clone())
        .ok_or_else(|| ClientError::InvalidEventPayload {
            event: raw.name.clone(),
            reason: "missing session payload".to_string(),
        })
}

/// Per-dispatch snapshot of ambient inputs
///
/// Built once at dispatch time so a handler never observes the
/// background flag or the most-recent session changing mid-turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// Whether the application was in the background at dispatch time
    pub is_in_background: bool,
    /// Id of the most recent signaling session; populated for invites
    pub session_id: Option<String>,
}

impl EventContext {
    /// Context for a foreground dispatch with no session payload
    pub fn foreground() -> Self {
        Self { is_in_background: false, session_id: None }
    }

    /// Context for a background dispatch with no session payload
    pub fn background() -> Self {
        Self { is_in_background: true, session_id: None }
    }

    /// Attach the most recent signaling session id
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_known_name() {
        for name in [
            "registered",
            "registrationFailed",
            "unregistered",
            "terminated",
            "accepted",
            "inviteAccepted",
            "rejected",
            "failed",
            "progress",
            "cancel",
        ] {
            let event = SignalingEvent::classify(&RawSignalingEvent::named(name)).unwrap();
            assert_eq!(event.name(), name);
        }
    }

    #[test]
    fn unknown_name_is_rejected_not_defaulted() {
        let err = SignalingEvent::classify(&RawSignalingEvent::named("bogus")).unwrap_err();
        assert_eq!(err, ClientError::UnhandledEvent { name: "bogus".to_string() });
    }

    #[test]
    fn invite_requires_the_session_payload() {
        let err = SignalingEvent::classify(&RawSignalingEvent::named("inviteReceived")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidEventPayload { .. }));

        let raw = RawSignalingEvent::with_remote_user("inviteReceived", "alice");
        let event = SignalingEvent::classify(&raw).unwrap();
        assert_eq!(event, SignalingEvent::InviteReceived { caller: "alice".to_string() });
    }

    #[test]
    fn wire_shape_deserializes_with_camel_case_payload() {
        let json = r#"{
            "name": "inviteReceived",
            "data": { "session": { "remoteIdentity": { "uri": { "user": "bob" } } } }
        }"#;
        let raw: RawSignalingEvent = serde_json::from_str(json).unwrap();
        let event = SignalingEvent::classify(&raw).unwrap();
        assert_eq!(event, SignalingEvent::InviteReceived { caller: "bob".to_string() });
    }
}
