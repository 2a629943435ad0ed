//! Event dispatcher
//!
//! The single point every signaling event funnels through. The
//! dispatcher owns the [`PhoneState`] aggregate (no other code mutates
//! it), snapshots ambient inputs once per event, classifies the event,
//! runs its lifecycle handler to completion, and applies the resulting
//! side effects before accepting the next event.
//!
//! # Crash isolation
//!
//! Any error a handler returns is caught here, logged, and dropped: one
//! malformed event can never take the dispatch loop down. Unknown event
//! names are logged and ignored the same way.
//!
//! # Sequencing
//!
//! `dispatch` takes `&mut self`, so two handlers can never interleave
//! their reads and writes of the state aggregate. The [`run`] loop
//! drains an unbounded channel in arrival order, one event at a time,
//! including each event's side effects.
//!
//! [`run`]: EventDispatcher::run
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tone_client_core::dispatcher::EventDispatcher;
//! use tone_client_core::events::RawSignalingEvent;
//! use tone_client_core::history::RecencyLog;
//! # use tone_client_core::capabilities::*;
//! # use tone_client_core::error::ClientResult;
//! # struct Stub;
//! # #[async_trait::async_trait]
//! # impl SignalingApi for Stub {
//! #     fn most_recent_session(&self) -> SessionHandle { SessionHandle { id: "s".into() } }
//! #     async fn answer(&self) -> ClientResult<()> { Ok(()) }
//! # }
//! # #[async_trait::async_trait]
//! # impl NativeCallUi for Stub {
//! #     async fn display_incoming_call(&self, _: &str, _: &str, _: &str) -> ClientResult<()> { Ok(()) }
//! #     async fn set_current_call_active(&self, _: &str) -> ClientResult<()> { Ok(()) }
//! #     async fn end_call(&self, _: &str) -> ClientResult<()> { Ok(()) }
//! #     async fn set_available(&self, _: bool) -> ClientResult<()> { Ok(()) }
//! # }
//! # #[async_trait::async_trait]
//! # impl AlertSink for Stub {
//! #     async fn display_alert(&self, _: &str, _: &str) -> ClientResult<()> { Ok(()) }
//! # }
//! # impl Ringer for Stub {}
//! # impl SettingsSource for Stub {
//! #     fn is_in_background(&self) -> bool { false }
//! # }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let stub = Arc::new(Stub);
//! let mut dispatcher = EventDispatcher::new(
//!     stub.clone(),
//!     stub.clone(),
//!     stub.clone(),
//!     stub.clone(),
//!     Arc::new(RecencyLog::new()),
//!     stub,
//! );
//!
//! dispatcher.dispatch(&RawSignalingEvent::named("registered")).await;
//! assert!(dispatcher.state().connection.connected);
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::call::PhoneState;
use crate::capabilities::{AlertSink, HistorySink, NativeCallUi, Ringer, SettingsSource, SignalingApi};
use crate::effects::EffectExecutor;
use crate::events::{EventContext, RawSignalingEvent, SignalingEvent};
use crate::handlers;

/// Sequential dispatcher over the call-signaling state machine
pub struct EventDispatcher {
    state: PhoneState,
    signaling: Arc<dyn SignalingApi>,
    settings: Arc<dyn SettingsSource>,
    executor: EffectExecutor,
}

impl EventDispatcher {
    /// Create a dispatcher over the given capabilities, starting from an
    /// empty, disconnected state
    pub fn new(
        signaling: Arc<dyn SignalingApi>,
        call_ui: Arc<dyn NativeCallUi>,
        alerts: Arc<dyn AlertSink>,
        ringer: Arc<dyn Ringer>,
        history: Arc<dyn HistorySink>,
        settings: Arc<dyn SettingsSource>,
    ) -> Self {
        let executor = EffectExecutor::new(signaling.clone(), call_ui, alerts, ringer, history);
        Self {
            state: PhoneState::new(),
            signaling,
            settings,
            executor,
        }
    }

    /// The current connection and call state
    pub fn state(&self) -> &PhoneState {
        &self.state
    }

    /// Set the terminate tie-break flag
    ///
    /// Exposed for the UI affordance that lets the user choose which of
    /// two concurrent legs a hangup refers to; the terminate handler
    /// only reads the flag.
    pub fn set_hangup_default(&mut self, hangup_default: bool) {
        self.state.call.set_hangup_default(hangup_default);
    }

    /// Dispatch one signaling event to completion
    ///
    /// Classification failures and handler errors are logged and
    /// contained here; this method never propagates them and leaves the
    /// dispatcher ready for the next event.
    pub async fn dispatch(&mut self, raw: &RawSignalingEvent) {
        tracing::info!(event = %raw.name, "Signaling event received");

        let event = match SignalingEvent::classify(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("{}", e);
                return;
            }
        };

        let ctx = self.snapshot_context(&event);

        match handlers::apply(&mut self.state, &event, &ctx) {
            Ok(effects) => self.executor.execute(effects).await,
            Err(e) => {
                tracing::error!(event = event.name(), "Error on event handler: {}", e);
            }
        }
    }

    /// Drain a channel of signaling events, one at a time, in order
    ///
    /// Returns when the sender side is dropped.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<RawSignalingEvent>) {
        while let Some(raw) = events.recv().await {
            self.dispatch(&raw).await;
        }
        tracing::debug!("Signaling event channel closed, dispatcher stopping");
    }

    /// Snapshot ambient inputs for one dispatch
    ///
    /// The background flag is read once here; invites additionally
    /// snapshot the most recent signaling session id, the only point the
    /// core reads from the signaling capability.
    fn snapshot_context(&self, event: &SignalingEvent) -> EventContext {
        let mut ctx = if self.settings.is_in_background() {
            EventContext::background()
        } else {
            EventContext::foreground()
        };
        if matches!(event, SignalingEvent::InviteReceived { .. }) {
            ctx = ctx.with_session_id(self.signaling.most_recent_session().id);
        }
        ctx
    }
}
