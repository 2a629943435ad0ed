//! Call state store for the coordination layer
//!
//! This module holds the authoritative in-memory record of connection
//! status and of the zero, one, or two concurrent call legs the client
//! supports (primary call plus at most one additional/"temp" call). It is
//! pure data with transition methods; nothing here performs I/O.
//!
//! # Key Components
//!
//! - **ConnectionState** - Registration status with the signaling layer
//! - **Remote** - Identity of the other party of a call leg
//! - **CallState** - The central call aggregate (slots, stacking, outcome)
//! - **PhoneState** - Connection + call aggregate threaded through handlers
//!
//! # Slot model
//!
//! The primary slot (`remote`) holds the ongoing call; the temp slot
//! (`temp_remote`) holds an incoming or queued second leg before it is
//! promoted. Both legs may be *known* simultaneously, but only one is
//! *active* on the native call UI at a time.
//!
//! # Usage Examples
//!
//! ```rust
//! use tone_client_core::call::{CallState, Remote};
//!
//! let mut call = CallState::new();
//! call.receive_invite(Remote::incoming("alice", "session-1"));
//! assert!(call.temp_remote.is_some());
//! assert!(!call.on_call);
//!
//! call.accept();
//! assert!(call.on_call);
//! assert_eq!(call.remote.as_ref().unwrap().number, "alice");
//! ```

use serde::{Deserialize, Serialize};

/// Diagnostic code recorded when registration with the signaling layer fails
pub const REGISTRATION_FAILED_CODE: &str = "UA-2-registration-failed";

/// Diagnostic code recorded when a call leg fails mid-signaling
pub const CALL_FAILED_CODE: &str = "NI";

/// A fixed diagnostic payload for protocol-level failures
///
/// Carried in `ConnectionState` for registration failures and in
/// `CallState` for call failures, and surfaced to the user through the
/// alert capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalingFault {
    /// Stable diagnostic code (e.g. "UA-2-registration-failed")
    pub code: String,
    /// Human-readable description of the failure
    pub message: String,
}

impl SignalingFault {
    /// The fixed fault recorded when the signaling layer rejects registration
    pub fn registration_failed() -> Self {
        Self {
            code: REGISTRATION_FAILED_CODE.to_string(),
            message: "Unable to authenticate the user on the signaling service".to_string(),
        }
    }

    /// The fixed fault recorded when a call leg fails
    pub fn call_failed() -> Self {
        Self {
            code: CALL_FAILED_CODE.to_string(),
            message: "Call failed".to_string(),
        }
    }
}

/// Registration status with the signaling layer
///
/// Created disconnected at process start and mutated only by
/// registration/unregistration events. Lives for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionState {
    /// Whether the client is currently registered with the signaling layer
    pub connected: bool,
    /// Last registration failure, if any
    pub registration_failure: Option<SignalingFault>,
}

impl ConnectionState {
    /// Create a new, disconnected connection state
    pub fn new() -> Self {
        Self::default()
    }
}

/// Identity of the other party of a call leg
///
/// Attached wholesale to a call slot and replaced wholesale, never patched
/// field-by-field, so a half-updated remote can never be observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    /// Display name of the remote party, when known
    pub name: Option<String>,
    /// Phone number or user part of the remote party's URI
    pub number: String,
    /// Native call-UI identifier for this leg, once one has been bound
    ///
    /// A freshly generated UUID when the invite is surfaced in the
    /// foreground, or the session key itself on the background
    /// auto-answer path. `None` until the invite handler binds one.
    pub call_id: Option<String>,
    /// Lower-cased signaling session id, used as the tone-session
    /// correlation key
    pub session_key: String,
}

impl Remote {
    /// Build the remote for a freshly received invite, before a native
    /// call id has been bound
    ///
    /// The session id is lower-cased here so every later correlation
    /// against it is case-insensitive.
    pub fn incoming(number: impl Into<String>, session_id: &str) -> Self {
        Self {
            name: None,
            number: number.into(),
            call_id: None,
            session_key: session_id.to_lowercase(),
        }
    }

    /// Return a copy of this remote with the given native call id bound
    ///
    /// Used by the invite handler to replace the temp remote wholesale
    /// once an identifier exists.
    pub fn with_call_id(&self, call_id: impl Into<String>) -> Self {
        Self {
            call_id: Some(call_id.into()),
            ..self.clone()
        }
    }
}

/// Outcome of the current (or most recently finished) call leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    /// No outcome recorded yet
    None,
    /// The call was answered
    Accepted,
    /// The call was rejected by this client
    Rejected,
    /// The call rang out or was declined remotely
    Missed,
    /// The call failed at the signaling level
    Failed,
}

impl Default for CallOutcome {
    fn default() -> Self {
        Self::None
    }
}

/// The central call aggregate
///
/// Tracks the primary and temp call slots, the stacking counter for a
/// queued second leg, the outbound-ringing indicator, and the externally
/// owned terminate tie-break flag.
///
/// # Invariants
///
/// - `additional_calls > 0` implies `temp_remote` is `Some`
/// - `on_call == true` implies `remote` is `Some`
/// - `hangup_default` is read, never written, by the terminate handler;
///   its source of truth is the UI affordance behind
///   [`set_hangup_default`](CallState::set_hangup_default)
#[derive(Debug, Clone, PartialEq)]
pub struct CallState {
    /// True once a call slot is active, not just ringing
    pub on_call: bool,
    /// Number of queued/additional call legs (0 or 1 in practice)
    pub additional_calls: u32,
    /// Primary call's remote party
    pub remote: Option<Remote>,
    /// Additional/incoming call's remote party, before promotion
    pub temp_remote: Option<Remote>,
    /// Tie-break flag: when a terminate arrives while two legs exist,
    /// `true` drops the primary leg and keeps the temp one
    pub hangup_default: bool,
    /// Outcome recorded for the current leg
    pub outcome: CallOutcome,
    /// Outbound ringing indicator, set by progress events
    pub is_calling: bool,
    /// Fault recorded when the leg failed
    pub failure: Option<SignalingFault>,
}

impl Default for CallState {
    fn default() -> Self {
        Self {
            on_call: false,
            additional_calls: 0,
            remote: None,
            temp_remote: None,
            hangup_default: false,
            outcome: CallOutcome::None,
            is_calling: false,
            failure: None,
        }
    }
}

impl CallState {
    /// Create an empty call state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly received invite in the temp slot
    ///
    /// If a call is already ongoing the new leg is queued by bumping
    /// `additional_calls`; either way the temp slot is replaced wholesale
    /// with the new remote.
    pub fn receive_invite(&mut self, remote: Remote) {
        if self.on_call {
            self.additional_calls += 1;
        }
        self.temp_remote = Some(remote);
    }

    /// Replace the temp remote with a copy carrying the given native call id
    ///
    /// No-op when the temp slot is vacant.
    pub fn bind_temp_call_id(&mut self, call_id: &str) {
        if let Some(temp) = &self.temp_remote {
            self.temp_remote = Some(temp.with_call_id(call_id));
        }
    }

    /// Mark the current leg accepted and promote the temp leg if the
    /// primary slot is vacant
    ///
    /// With two known legs the accepted temp leg stays in the temp slot
    /// (pending swap) until a terminate resolves which leg survives.
    pub fn accept(&mut self) {
        self.outcome = CallOutcome::Accepted;
        self.is_calling = false;
        if self.remote.is_none() {
            self.remote = self.temp_remote.take();
        }
        if self.remote.is_some() {
            self.on_call = true;
        }
    }

    /// Record that the remote side missed or declined the call
    pub fn set_missed(&mut self) {
        self.outcome = CallOutcome::Missed;
        self.is_calling = false;
    }

    /// Record a signaling-level call failure
    pub fn set_failed(&mut self, fault: SignalingFault) {
        self.outcome = CallOutcome::Failed;
        self.is_calling = false;
        self.failure = Some(fault);
    }

    /// Set the outbound ringing indicator
    pub fn set_calling(&mut self, is_calling: bool) {
        self.is_calling = is_calling;
    }

    /// Set the terminate tie-break flag
    ///
    /// Owned by the UI affordance that lets the user choose which leg to
    /// drop; the terminate handler only ever reads it.
    pub fn set_hangup_default(&mut self, hangup_default: bool) {
        self.hangup_default = hangup_default;
    }

    /// Clear the primary slot after its leg terminated, returning the
    /// finished remote
    ///
    /// Resets the aggregate when this leaves both slots vacant.
    pub fn finish_primary(&mut self) -> Option<Remote> {
        let finished = self.remote.take();
        if finished.is_some() {
            self.on_call = false;
            self.reset_if_idle();
        }
        finished
    }

    /// Clear the temp slot after its leg terminated, returning the
    /// finished remote
    ///
    /// Resets the aggregate when this leaves both slots vacant.
    pub fn finish_temp(&mut self) -> Option<Remote> {
        let finished = self.temp_remote.take();
        if finished.is_some() {
            self.reset_if_idle();
        }
        finished
    }

    /// Whether neither slot holds a call leg
    pub fn is_idle(&self) -> bool {
        self.remote.is_none() && self.temp_remote.is_none()
    }

    /// Reset the aggregate to empty once both slots are vacant
    ///
    /// `hangup_default` survives the reset: it is owned by the UI, not by
    /// the call lifecycle.
    fn reset_if_idle(&mut self) {
        if self.is_idle() {
            let hangup_default = self.hangup_default;
            *self = Self::default();
            self.hangup_default = hangup_default;
        }
    }
}

/// Connection and call state threaded through the lifecycle handlers
///
/// The dispatcher owns the single instance and is the only mutation
/// point; handlers receive it by mutable reference for the duration of
/// one dispatch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhoneState {
    /// Registration status with the signaling layer
    pub connection: ConnectionState,
    /// The call aggregate
    pub call: CallState,
}

impl PhoneState {
    /// Create an empty, disconnected phone state
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(number: &str, call_id: &str) -> Remote {
        Remote::incoming(number, "Session-X").with_call_id(call_id)
    }

    #[test]
    fn incoming_remote_lowercases_session_key() {
        let r = Remote::incoming("alice", "AB12-CD34");
        assert_eq!(r.session_key, "ab12-cd34");
        assert_eq!(r.call_id, None);
    }

    #[test]
    fn invite_while_idle_fills_temp_slot_without_stacking() {
        let mut call = CallState::new();
        call.receive_invite(Remote::incoming("alice", "s1"));
        assert_eq!(call.additional_calls, 0);
        assert!(call.temp_remote.is_some());
        assert!(!call.on_call);
    }

    #[test]
    fn invite_while_on_call_queues_an_additional_leg() {
        let mut call = CallState::new();
        call.remote = Some(remote("alice", "c1"));
        call.on_call = true;

        call.receive_invite(Remote::incoming("bob", "s2"));
        assert_eq!(call.additional_calls, 1);
        assert_eq!(call.temp_remote.as_ref().unwrap().number, "bob");
        // additional_calls > 0 implies temp_remote is Some
        assert!(call.temp_remote.is_some());
    }

    #[test]
    fn accept_promotes_temp_leg_into_vacant_primary_slot() {
        let mut call = CallState::new();
        call.receive_invite(Remote::incoming("alice", "s1"));
        call.bind_temp_call_id("c1");

        call.accept();
        assert!(call.on_call);
        assert_eq!(call.outcome, CallOutcome::Accepted);
        assert_eq!(call.remote.as_ref().unwrap().call_id.as_deref(), Some("c1"));
        assert!(call.temp_remote.is_none());
    }

    #[test]
    fn accept_with_occupied_primary_keeps_both_legs_known() {
        let mut call = CallState::new();
        call.remote = Some(remote("alice", "c1"));
        call.on_call = true;
        call.receive_invite(Remote::incoming("bob", "s2"));
        call.bind_temp_call_id("c2");

        call.accept();
        assert_eq!(call.remote.as_ref().unwrap().number, "alice");
        assert_eq!(call.temp_remote.as_ref().unwrap().number, "bob");
        assert!(call.on_call);
    }

    #[test]
    fn finishing_both_slots_resets_the_aggregate() {
        let mut call = CallState::new();
        call.set_hangup_default(true);
        call.remote = Some(remote("alice", "c1"));
        call.on_call = true;
        call.outcome = CallOutcome::Accepted;

        let finished = call.finish_primary();
        assert_eq!(finished.unwrap().number, "alice");
        assert_eq!(call.outcome, CallOutcome::None);
        assert!(!call.on_call);
        // externally owned flag survives the reset
        assert!(call.hangup_default);
    }

    #[test]
    fn finishing_one_of_two_slots_does_not_reset() {
        let mut call = CallState::new();
        call.remote = Some(remote("alice", "c1"));
        call.on_call = true;
        call.temp_remote = Some(remote("bob", "c2"));
        call.outcome = CallOutcome::Accepted;

        call.finish_temp();
        assert_eq!(call.outcome, CallOutcome::Accepted);
        assert_eq!(call.remote.as_ref().unwrap().number, "alice");
        assert!(call.on_call);
    }

    #[test]
    fn faults_carry_the_fixed_diagnostic_codes() {
        assert_eq!(SignalingFault::registration_failed().code, REGISTRATION_FAILED_CODE);
        assert_eq!(SignalingFault::call_failed().code, CALL_FAILED_CODE);
        assert_eq!(SignalingFault::call_failed().message, "Call failed");
    }
}
