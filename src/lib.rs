//! # tone-client-core
//!
//! Call-signaling coordination layer for a softphone client. This crate
//! reconciles asynchronous telephony events coming from a signaling
//! layer (registration, invitation, accept, reject, terminate, cancel,
//! failure, progress) with a local call-state store and with the
//! device-level native call UI, keeping all three views consistent
//! despite events arriving out of order, duplicated, or racing with
//! local user actions.
//!
//! # Architecture
//!
//! ```text
//! signaling layer -> EventDispatcher -> lifecycle handlers -> EffectExecutor
//!                        |                   |                     |
//!                        |                   v                     v
//!                        +-----------> PhoneState           capabilities
//!                                    (single owner)    (native call UI, alerts,
//!                                                       ringer, history sink)
//! ```
//!
//! - [`call`] - the call state store: connection status plus primary and
//!   temp call slots (at most one additional leg)
//! - [`events`] - wire-shaped events and the exhaustive classifier
//! - [`handlers`] - pure per-event transitions and the terminate
//!   tie-break algorithm
//! - [`effects`] - side-effect list and its executor
//! - [`capabilities`] - boundary traits for the platform collaborators
//! - [`history`] - append-only recency log of finished calls
//! - [`dispatcher`] - the sequential dispatch point that owns the state
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tone_client_core::{EventDispatcher, RawSignalingEvent, RecencyLog};
//!
//! let history = Arc::new(RecencyLog::new());
//! let mut dispatcher = EventDispatcher::new(
//!     signaling, call_ui, alerts, ringer, history.clone(), settings,
//! );
//!
//! dispatcher.dispatch(&RawSignalingEvent::named("registered")).await;
//! dispatcher
//!     .dispatch(&RawSignalingEvent::with_remote_user("inviteReceived", "alice"))
//!     .await;
//! ```
//!
//! # Error handling
//!
//! Nothing in this crate is fatal to the process. Protocol failures are
//! recorded in state and surfaced as alerts; defensive invariant catches
//! are logged warnings; unknown events and handler errors are contained
//! at the dispatch boundary so the dispatcher always accepts the next
//! event.

pub mod call;
pub mod capabilities;
pub mod dispatcher;
pub mod effects;
pub mod error;
pub mod events;
pub mod handlers;
pub mod history;

// Convenience re-exports of the main working set
pub use call::{CallOutcome, CallState, ConnectionState, PhoneState, Remote, SignalingFault};
pub use capabilities::{
    AlertSink, HistorySink, NativeCallUi, Ringer, SessionHandle, SettingsSource, SignalingApi,
};
pub use dispatcher::EventDispatcher;
pub use effects::{EffectExecutor, SideEffect};
pub use error::{ClientError, ClientResult};
pub use events::{EventContext, RawSignalingEvent, SignalingEvent};
pub use history::{HistoryEntry, RecencyLog};
