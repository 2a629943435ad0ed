//! Call lifecycle handlers
//!
//! One pure function per signaling event kind. Each handler reads and
//! writes the [`PhoneState`] it is given and returns the list of side
//! effects the executor must apply, in order. Handlers never touch a
//! capability directly, which keeps the stacking policy and the
//! terminate tie-break unit-testable without any platform in the loop.
//!
//! Defensive posture throughout: an event that does not match the
//! current state (an accept without a ringing leg, a terminate with no
//! leg at all) is logged and skipped, never an error that could stall
//! the dispatcher.

use uuid::Uuid;

use crate::call::{PhoneState, Remote, SignalingFault};
use crate::error::{ClientError, ClientResult};
use crate::events::{EventContext, SignalingEvent};
use crate::effects::SideEffect;

/// Apply a classified event to the phone state
///
/// The single entry point the dispatcher uses; exhaustive over every
/// event kind. `accepted` and `inviteAccepted` share one handler.
pub fn apply(
    state: &mut PhoneState,
    event: &SignalingEvent,
    ctx: &EventContext,
) -> ClientResult<Vec<SideEffect>> {
    match event {
        SignalingEvent::Registered => handle_registered(state),
        SignalingEvent::RegistrationFailed => handle_registration_failed(state),
        SignalingEvent::Unregistered => handle_unregistered(state),
        SignalingEvent::Terminated => handle_terminated(state),
        SignalingEvent::Accepted | SignalingEvent::InviteAccepted => handle_accepted(state, ctx),
        SignalingEvent::Rejected => handle_rejected(state),
        SignalingEvent::InviteReceived { caller } => handle_invite_received(state, caller, ctx),
        SignalingEvent::Failed => handle_failed(state),
        SignalingEvent::Progress => handle_progress(state),
        SignalingEvent::Cancel => handle_cancel(),
    }
}

/// Registration succeeded: mark connected and enable the native surface
///
/// No-op when already connected.
fn handle_registered(state: &mut PhoneState) -> ClientResult<Vec<SideEffect>> {
    if state.connection.connected {
        return Ok(Vec::new());
    }
    tracing::info!("Registered with the signaling layer");
    state.connection.connected = true;
    Ok(vec![SideEffect::SetUiAvailable(true)])
}

/// Registration rejected: record the fault and alert the user
fn handle_registration_failed(state: &mut PhoneState) -> ClientResult<Vec<SideEffect>> {
    let fault = SignalingFault::registration_failed();
    state.connection.registration_failure = Some(fault.clone());
    Ok(vec![SideEffect::DisplayAlert {
        title: fault.code,
        message: fault.message,
    }])
}

/// Unregistered from the signaling layer
fn handle_unregistered(state: &mut PhoneState) -> ClientResult<Vec<SideEffect>> {
    state.connection.connected = false;
    Ok(Vec::new())
}

/// An inbound invite arrived
///
/// Queues a second leg when a call is already ongoing, then replaces the
/// temp slot wholesale with the new remote. Foreground: a fresh native
/// call id is generated, bound into state, and the incoming-call screen
/// requested. Background: the session is auto-answered with no user
/// prompt and the temp leg marked active, keyed by the session key.
fn handle_invite_received(
    state: &mut PhoneState,
    caller: &str,
    ctx: &EventContext,
) -> ClientResult<Vec<SideEffect>> {
    let session_id = ctx.session_id.as_deref().ok_or_else(|| ClientError::InvalidEventPayload {
        event: "inviteReceived".to_string(),
        reason: "no most-recent session id in dispatch context".to_string(),
    })?;

    tracing::info!(on_call = state.call.on_call, caller, "Invite received");

    let incoming = Remote::incoming(caller, session_id);

    if !ctx.is_in_background {
        let call_id = Uuid::new_v4().to_string();
        state.call.receive_invite(incoming.with_call_id(&call_id));
        Ok(vec![SideEffect::DisplayIncomingCall {
            call_id,
            name: caller.to_string(),
            number: caller.to_string(),
        }])
    } else {
        // No incoming-call screen in the background: answer immediately
        // and activate the leg under its session key.
        let session_key = incoming.session_key.clone();
        state.call.receive_invite(incoming.with_call_id(&session_key));
        Ok(vec![
            SideEffect::AnswerSession,
            SideEffect::SetCurrentCallActive { call_id: session_key },
        ])
    }
}

/// The call was accepted (inbound or outbound)
///
/// Requires a temp leg with a bound call id; anything else is logged and
/// skipped so a duplicate or stray accept can never corrupt state.
fn handle_accepted(state: &mut PhoneState, ctx: &EventContext) -> ClientResult<Vec<SideEffect>> {
    let temp_call_id = state
        .call
        .temp_remote
        .as_ref()
        .and_then(|temp| temp.call_id.clone());

    let Some(call_id) = temp_call_id else {
        tracing::warn!("Trying to accept a call without a call id");
        return Ok(Vec::new());
    };

    let mut effects = vec![SideEffect::StopRinging];
    state.call.accept();
    if !ctx.is_in_background {
        effects.push(SideEffect::SetCurrentCallActive { call_id });
    }
    Ok(effects)
}

/// The remote side rejected or rang out the call
fn handle_rejected(state: &mut PhoneState) -> ClientResult<Vec<SideEffect>> {
    state.call.set_missed();
    Ok(vec![SideEffect::StopRinging])
}

/// The call failed at the signaling level
fn handle_failed(state: &mut PhoneState) -> ClientResult<Vec<SideEffect>> {
    state.call.set_failed(SignalingFault::call_failed());
    Ok(Vec::new())
}

/// The outbound call is ringing at the remote side
fn handle_progress(state: &mut PhoneState) -> ClientResult<Vec<SideEffect>> {
    state.call.set_calling(true);
    Ok(Vec::new())
}

/// Cancel is deliberately a no-op
fn handle_cancel() -> ClientResult<Vec<SideEffect>> {
    tracing::warn!("Cancel event received, deliberately doing nothing");
    Ok(Vec::new())
}

/// A call leg ended; infer which one
///
/// A terminate does not identify the leg it refers to, so the handler
/// infers it from state read at entry time, in this order:
///
/// 1. An additional leg is queued: decrement the counter and consult the
///    externally owned `hangup_default` flag. `true` drops the primary
///    leg and keeps the temp one; `false` drops the temp leg. The
///    additional-calls branch must be checked first: with two legs a
///    terminate always reflects the most recently resolved ambiguity.
/// 2. A single active call: finish the primary leg and end it on the
///    native surface.
/// 3. Only a ringing, never-promoted temp leg: finish it and end it on
///    the native surface.
/// 4. Fully idle: a late or duplicate terminate, ignored.
///
/// History is appended before the native end-call instruction.
fn handle_terminated(state: &mut PhoneState) -> ClientResult<Vec<SideEffect>> {
    let call = &mut state.call;
    let outcome = call.outcome;

    if call.additional_calls > 0 {
        call.additional_calls -= 1;

        if call.hangup_default {
            tracing::info!("Terminate with two legs: hanging up the primary call");
            let Some(finished) = call.finish_primary() else {
                tracing::warn!("Additional leg queued but primary slot was vacant");
                return Ok(Vec::new());
            };
            return Ok(vec![SideEffect::AddRecentCall { remote: finished, outcome }]);
        }

        tracing::info!("Terminate with two legs: hanging up the additional leg");
        let Some(finished) = call.finish_temp() else {
            tracing::warn!("Additional leg counted but temp slot was vacant");
            return Ok(Vec::new());
        };
        return Ok(vec![SideEffect::AddRecentCall { remote: finished, outcome }]);
    }

    if call.on_call {
        let Some(finished) = call.finish_primary() else {
            tracing::warn!("On a call but the primary slot was vacant");
            return Ok(Vec::new());
        };
        return Ok(finish_effects(finished, outcome));
    }

    match call.finish_temp() {
        Some(finished) => Ok(finish_effects(finished, outcome)),
        None => {
            tracing::debug!("Terminate with no call leg in either slot, ignoring");
            Ok(Vec::new())
        }
    }
}

/// History entry plus the native end-call instruction for a finished leg
fn finish_effects(finished: Remote, outcome: crate::call::CallOutcome) -> Vec<SideEffect> {
    let mut effects = vec![SideEffect::AddRecentCall { remote: finished.clone(), outcome }];
    match finished.call_id {
        Some(call_id) => effects.push(SideEffect::EndNativeCall { call_id }),
        None => tracing::debug!("Finished leg had no native call id, skipping end-call"),
    }
    effects
}
