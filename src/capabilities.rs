//! Boundary traits for external collaborators
//!
//! The coordination core never talks to the platform directly; every
//! outward dependency is a capability trait implemented by the embedding
//! application. The core only issues instructions through these traits
//! and never reads state back from them (the settings snapshot being the
//! one read-only exception).
//!
//! All instruction-issuing methods return [`ClientResult`] so a refusing
//! platform can be logged and tolerated; the executor treats every
//! failure as log-and-continue.

use async_trait::async_trait;

use crate::call::{CallOutcome, Remote};
use crate::error::ClientResult;

/// Handle onto a signaling session, as exposed by the signaling layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    /// Session identifier as the signaling layer knows it
    pub id: String,
}

/// The signaling layer capability
///
/// Consulted only on the invite path: the most recent session supplies
/// the tone-session correlation key, and `answer` drives the background
/// auto-answer.
#[async_trait]
pub trait SignalingApi: Send + Sync {
    /// The session most recently created by the signaling layer
    fn most_recent_session(&self) -> SessionHandle;

    /// Answer the most recent session
    async fn answer(&self) -> ClientResult<()>;
}

/// The device-level call-management capability (incoming-call screen,
/// active-call state)
///
/// Instructions are fire-and-forget: the core issues them and never
/// awaits platform acknowledgement beyond the call returning.
#[async_trait]
pub trait NativeCallUi: Send + Sync {
    /// Show the native incoming-call screen for the given call identifier
    async fn display_incoming_call(&self, call_id: &str, name: &str, number: &str) -> ClientResult<()>;

    /// Mark the given call active on the native surface
    async fn set_current_call_active(&self, call_id: &str) -> ClientResult<()>;

    /// End the given call on the native surface
    ///
    /// Ending an already-ended call must be tolerated by implementors;
    /// the executor treats a refusal as non-fatal either way.
    async fn end_call(&self, call_id: &str) -> ClientResult<()>;

    /// Toggle whether the native surface advertises call availability
    async fn set_available(&self, available: bool) -> ClientResult<()>;
}

/// User-facing alert capability, used for registration failures only
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Display an alert with the given title and message
    async fn display_alert(&self, title: &str, message: &str) -> ClientResult<()>;
}

/// Ringback/ringtone playback control
///
/// Playback itself is out of scope; the core only ever asks for silence.
/// Platforms without local tone playback can leave the default no-ops.
#[async_trait]
pub trait Ringer: Send + Sync {
    /// Stop the outbound ringback tone, if one is playing
    async fn stop_ringback(&self) -> ClientResult<()> {
        Ok(())
    }

    /// Stop the inbound ringtone, if one is playing
    async fn stop_ringtone(&self) -> ClientResult<()> {
        Ok(())
    }
}

/// Append-only sink for finished call legs
///
/// The core writes entries and never reads them back.
#[async_trait]
pub trait HistorySink: Send + Sync {
    /// Record a finished call leg and its outcome
    async fn add_recent_call(&self, remote: Remote, outcome: CallOutcome) -> ClientResult<()>;
}

/// Read-only process settings consulted once per dispatch
pub trait SettingsSource: Send + Sync {
    /// Whether the application is currently backgrounded
    fn is_in_background(&self) -> bool;
}
