//! Dispatch-boundary containment: unknown events, malformed payloads,
//! refusing capabilities, and duplicate terminates must all leave the
//! dispatcher live and the state consistent.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing_test::traced_test;

use tone_client_core::{
    AlertSink, ClientError, ClientResult, EventDispatcher, NativeCallUi, PhoneState,
    RawSignalingEvent, RecencyLog, Ringer, SessionHandle, SettingsSource, SignalingApi,
};

struct StubSignaling;

#[async_trait::async_trait]
impl SignalingApi for StubSignaling {
    fn most_recent_session(&self) -> SessionHandle {
        SessionHandle { id: "session-1".to_string() }
    }

    async fn answer(&self) -> ClientResult<()> {
        Ok(())
    }
}

/// Native call UI that refuses every end-call instruction, the way a
/// platform refuses to end an already-ended call.
#[derive(Default)]
struct RefusingCallUi {
    end_attempts: Mutex<u32>,
}

#[async_trait::async_trait]
impl NativeCallUi for RefusingCallUi {
    async fn display_incoming_call(&self, _call_id: &str, _name: &str, _number: &str) -> ClientResult<()> {
        Ok(())
    }

    async fn set_current_call_active(&self, _call_id: &str) -> ClientResult<()> {
        Ok(())
    }

    async fn end_call(&self, _call_id: &str) -> ClientResult<()> {
        *self.end_attempts.lock().await += 1;
        Err(ClientError::CallUiFailed { reason: "call already ended".to_string() })
    }

    async fn set_available(&self, _available: bool) -> ClientResult<()> {
        Ok(())
    }
}

struct NoAlerts;

#[async_trait::async_trait]
impl AlertSink for NoAlerts {
    async fn display_alert(&self, _title: &str, _message: &str) -> ClientResult<()> {
        Ok(())
    }
}

struct SilentRinger;
impl Ringer for SilentRinger {}

struct Foreground;
impl SettingsSource for Foreground {
    fn is_in_background(&self) -> bool {
        false
    }
}

fn dispatcher_with(call_ui: Arc<RefusingCallUi>, history: Arc<RecencyLog>) -> EventDispatcher {
    EventDispatcher::new(
        Arc::new(StubSignaling),
        call_ui,
        Arc::new(NoAlerts),
        Arc::new(SilentRinger),
        history,
        Arc::new(Foreground),
    )
}

#[tokio::test]
#[traced_test]
async fn bogus_event_changes_nothing_and_logs_a_diagnostic() {
    let mut dispatcher = dispatcher_with(Arc::new(RefusingCallUi::default()), Arc::new(RecencyLog::new()));
    let before = dispatcher.state().clone();

    dispatcher.dispatch(&RawSignalingEvent::named("bogus")).await;

    assert_eq!(*dispatcher.state(), before);
    assert_eq!(*dispatcher.state(), PhoneState::new());
    assert!(logs_contain("Unhandled signaling event: bogus"));
}

#[tokio::test]
#[traced_test]
async fn malformed_invite_is_contained_and_the_dispatcher_stays_live() {
    let mut dispatcher = dispatcher_with(Arc::new(RefusingCallUi::default()), Arc::new(RecencyLog::new()));

    // invite with no session payload: classification fails, state untouched
    dispatcher.dispatch(&RawSignalingEvent::named("inviteReceived")).await;
    assert_eq!(*dispatcher.state(), PhoneState::new());
    assert!(logs_contain("Invalid payload for inviteReceived event"));

    // the next event still dispatches normally
    dispatcher.dispatch(&RawSignalingEvent::named("registered")).await;
    assert!(dispatcher.state().connection.connected);
}

#[tokio::test]
async fn refusing_call_ui_does_not_lose_the_history_entry() {
    let call_ui = Arc::new(RefusingCallUi::default());
    let history = Arc::new(RecencyLog::new());
    let mut dispatcher = dispatcher_with(call_ui.clone(), history.clone());

    dispatcher
        .dispatch(&RawSignalingEvent::with_remote_user("inviteReceived", "alice"))
        .await;
    dispatcher.dispatch(&RawSignalingEvent::named("accepted")).await;
    dispatcher.dispatch(&RawSignalingEvent::named("terminated")).await;

    // the end-call instruction was attempted and refused
    assert_eq!(*call_ui.end_attempts.lock().await, 1);
    // history was appended before the refusal and state still resolved
    assert_eq!(history.len().await, 1);
    assert!(dispatcher.state().call.is_idle());
}

#[tokio::test]
async fn duplicate_terminate_is_a_no_op() {
    let call_ui = Arc::new(RefusingCallUi::default());
    let history = Arc::new(RecencyLog::new());
    let mut dispatcher = dispatcher_with(call_ui.clone(), history.clone());

    dispatcher
        .dispatch(&RawSignalingEvent::with_remote_user("inviteReceived", "alice"))
        .await;
    dispatcher.dispatch(&RawSignalingEvent::named("accepted")).await;
    dispatcher.dispatch(&RawSignalingEvent::named("terminated")).await;

    let before = dispatcher.state().clone();
    dispatcher.dispatch(&RawSignalingEvent::named("terminated")).await;

    assert_eq!(*dispatcher.state(), before);
    assert_eq!(history.len().await, 1, "no second history entry");
    assert_eq!(*call_ui.end_attempts.lock().await, 1, "no second end-call instruction");
}

#[tokio::test]
async fn events_queued_on_the_run_loop_are_processed_in_order() {
    let call_ui = Arc::new(RefusingCallUi::default());
    let history = Arc::new(RecencyLog::new());
    let dispatcher = dispatcher_with(call_ui, history.clone());

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    tx.send(RawSignalingEvent::named("registered")).unwrap();
    tx.send(RawSignalingEvent::with_remote_user("inviteReceived", "alice")).unwrap();
    tx.send(RawSignalingEvent::named("accepted")).unwrap();
    tx.send(RawSignalingEvent::named("bogus")).unwrap();
    tx.send(RawSignalingEvent::named("terminated")).unwrap();
    drop(tx);

    dispatcher.run(rx).await;

    let entries = history.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].remote.number, "alice");
}
