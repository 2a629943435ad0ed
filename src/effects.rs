//! Side effects and their executor
//!
//! Lifecycle handlers are pure: they describe what must happen as a list
//! of [`SideEffect`] values and never touch a capability themselves. The
//! [`EffectExecutor`] applies that list, in order, against the capability
//! traits.
//!
//! Every effect is safe to fail: a refusing capability (for example the
//! native call UI being asked to end an already-ended call) is logged and
//! skipped, never propagated, so the dispatcher stays live.

use std::sync::Arc;

use crate::call::{CallOutcome, Remote};
use crate::capabilities::{AlertSink, HistorySink, NativeCallUi, Ringer, SignalingApi};

/// A single instruction produced by a lifecycle handler
///
/// Effects are applied in the order the handler emitted them; ordering is
/// load-bearing (history is appended before the native leg is ended, the
/// background auto-answer precedes marking the call active).
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// Toggle native call availability
    SetUiAvailable(bool),
    /// Show the native incoming-call screen
    DisplayIncomingCall {
        /// Freshly generated native call identifier
        call_id: String,
        /// Caller display name (falls back to the number)
        name: String,
        /// Caller number
        number: String,
    },
    /// Mark a call active on the native surface
    SetCurrentCallActive {
        /// Native call identifier of the leg to activate
        call_id: String,
    },
    /// End a call leg on the native surface
    EndNativeCall {
        /// Native call identifier of the leg that ended
        call_id: String,
    },
    /// Answer the most recent signaling session (background auto-answer)
    AnswerSession,
    /// Stop ringback and ringtone playback
    StopRinging,
    /// Surface a user-facing alert
    DisplayAlert {
        /// Alert title
        title: String,
        /// Alert body
        message: String,
    },
    /// Append a finished call leg to the history sink
    AddRecentCall {
        /// The finished leg's remote party
        remote: Remote,
        /// Outcome recorded for the leg
        outcome: CallOutcome,
    },
}

/// Applies side effects against the capability traits
///
/// Owned by the dispatcher; one executor instance serves every dispatch.
/// Effects execute synchronously within the handler's turn, and a failed
/// effect is logged and skipped so the remaining effects still run.
pub struct EffectExecutor {
    signaling: Arc<dyn SignalingApi>,
    call_ui: Arc<dyn NativeCallUi>,
    alerts: Arc<dyn AlertSink>,
    ringer: Arc<dyn Ringer>,
    history: Arc<dyn HistorySink>,
}

impl EffectExecutor {
    /// Create an executor over the given capabilities
    pub fn new(
        signaling: Arc<dyn SignalingApi>,
        call_ui: Arc<dyn NativeCallUi>,
        alerts: Arc<dyn AlertSink>,
        ringer: Arc<dyn Ringer>,
        history: Arc<dyn HistorySink>,
    ) -> Self {
        Self { signaling, call_ui, alerts, ringer, history }
    }

    /// Apply a list of effects in order
    pub async fn execute(&self, effects: Vec<SideEffect>) {
        for effect in effects {
            self.apply(effect).await;
        }
    }

    async fn apply(&self, effect: SideEffect) {
        let result = match effect {
            SideEffect::SetUiAvailable(available) => self.call_ui.set_available(available).await,
            SideEffect::DisplayIncomingCall { call_id, name, number } => {
                self.call_ui.display_incoming_call(&call_id, &name, &number).await
            }
            SideEffect::SetCurrentCallActive { call_id } => {
                self.call_ui.set_current_call_active(&call_id).await
            }
            SideEffect::EndNativeCall { call_id } => self.call_ui.end_call(&call_id).await,
            SideEffect::AnswerSession => self.signaling.answer().await,
            SideEffect::StopRinging => {
                if let Err(e) = self.ringer.stop_ringback().await {
                    tracing::warn!("Failed to stop ringback: {}", e);
                }
                self.ringer.stop_ringtone().await
            }
            SideEffect::DisplayAlert { title, message } => {
                self.alerts.display_alert(&title, &message).await
            }
            SideEffect::AddRecentCall { remote, outcome } => {
                self.history.add_recent_call(remote, outcome).await
            }
        };

        if let Err(e) = result {
            tracing::warn!("Side effect failed, continuing: {}", e);
        }
    }
}
