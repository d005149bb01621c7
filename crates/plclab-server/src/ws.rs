//! Per-connection session protocol handler.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{Sink, SinkExt, StreamExt};
use plclab_core::action::Action;

use crate::broadcast;
use crate::client::ClientId;
use crate::lessons;
use crate::protocol::{self, Inbound, Outbound};
use crate::state::AppState;

/// WebSocket upgrade handler for `GET /ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one session from registration to close.
///
/// On open: register, send the lesson catalog, send an initial full state
/// frame. Then a single loop multiplexes broadcast frames queued for this
/// session with inbound frames from the socket. Any failure on one inbound
/// frame is answered with an `error` frame; only transport close/error ends
/// the session. Unregistration is idempotent.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (client_id, mut rx) = state.registry.register();
    tracing::info!(client = %client_id, viewers = state.registry.count(), "viewer connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    let greeting = [
        Outbound::Lessons(lessons::list()),
        Outbound::State(state.snapshot()),
    ];
    for frame in greeting {
        if send_frame(&mut ws_tx, &frame).await.is_err() {
            state.registry.unregister(&client_id);
            return;
        }
    }

    loop {
        tokio::select! {
            queued = rx.recv() => match queued {
                Some(text) => {
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = handle_frame(&state, &client_id, text.as_str()) {
                        if send_frame(&mut ws_tx, &reply).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                // axum answers pings itself; binary frames are not part of
                // the protocol and are ignored.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(client = %client_id, error = %e, "socket error");
                    break;
                }
            },
        }
    }

    state.registry.unregister(&client_id);
    tracing::info!(client = %client_id, viewers = state.registry.count(), "viewer disconnected");
}

async fn send_frame(
    ws_tx: &mut (impl Sink<Message, Error = axum::Error> + Unpin),
    frame: &Outbound,
) -> Result<(), axum::Error> {
    let text = match frame.encode() {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize outbound frame");
            return Ok(());
        }
    };
    ws_tx.send(Message::Text(text.into())).await
}

/// Process one inbound text frame, returning the direct reply if any.
///
/// A successful action replies with nothing here: the resulting `state`
/// frame reaches this session through the broadcast pass, the same as every
/// other viewer.
fn handle_frame(state: &AppState, client_id: &ClientId, text: &str) -> Option<Outbound> {
    match protocol::decode(text) {
        Ok(Inbound::Ping) => Some(Outbound::Pong),
        Ok(Inbound::Lesson(key)) => match lessons::load_html(&key) {
            Ok(html) => {
                state.registry.set_current_lesson(client_id, &key);
                Some(Outbound::Lesson(html))
            }
            Err(e) => Some(Outbound::Error(e.to_string())),
        },
        Ok(Inbound::Action(payload)) => {
            match Action::parse(&payload).and_then(|action| state.apply(&action)) {
                Ok(snapshot) => {
                    broadcast::broadcast_state(&state.registry, snapshot);
                    None
                }
                Err(e) => {
                    tracing::debug!(client = %client_id, error = %e, "action rejected");
                    Some(Outbound::Error(e.to_string()))
                }
            }
        }
        Err(e) => Some(Outbound::Error(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn state_frame(text: &str) -> Value {
        let value: Value = serde_json::from_str(text).unwrap();
        assert_eq!(value["kind"], "state");
        value["payload"].clone()
    }

    #[test]
    fn ping_gets_pong() {
        let state = AppState::new();
        let (id, _rx) = state.registry.register();
        let reply = handle_frame(&state, &id, r#"{"kind":"ping"}"#);
        assert_eq!(reply, Some(Outbound::Pong));
    }

    #[test]
    fn lesson_request_replies_with_html_and_records_it() {
        let state = AppState::new();
        let (id, _rx) = state.registry.register();
        let reply = handle_frame(&state, &id, r#"{"kind":"lesson","payload":"01_intro"}"#);
        match reply {
            Some(Outbound::Lesson(html)) => assert!(html.contains("<h1>")),
            other => panic!("expected lesson reply, got {other:?}"),
        }
        assert_eq!(
            state.registry.current_lesson(&id),
            Some("01_intro".to_string())
        );
    }

    #[test]
    fn unknown_lesson_replies_with_error() {
        let state = AppState::new();
        let (id, _rx) = state.registry.register();
        let reply = handle_frame(&state, &id, r#"{"kind":"lesson","payload":"99_bogus"}"#);
        assert!(matches!(reply, Some(Outbound::Error(_))));
    }

    #[test]
    fn action_broadcasts_state_to_all_sessions() {
        let state = AppState::new();
        let (actor, mut actor_rx) = state.registry.register();
        let (_viewer, mut viewer_rx) = state.registry.register();

        let reply = handle_frame(
            &state,
            &actor,
            r#"{"kind":"action","payload":{"action_type":"toggle_input","address":5}}"#,
        );
        assert_eq!(reply, None);

        let actor_frame = actor_rx.try_recv().unwrap();
        let viewer_frame = viewer_rx.try_recv().unwrap();
        assert_eq!(actor_frame, viewer_frame);
        assert_eq!(state_frame(&actor_frame)["discrete_inputs"][5], true);
    }

    #[test]
    fn legacy_flip_is_equivalent_to_toggle() {
        let state = AppState::new();
        let (id, mut rx) = state.registry.register();
        let reply = handle_frame(&state, &id, r#"{"kind":"action","payload":{"flip":"3"}}"#);
        assert_eq!(reply, None);
        assert_eq!(state_frame(&rx.try_recv().unwrap())["discrete_inputs"][3], true);
    }

    #[test]
    fn out_of_range_action_gets_error_and_no_broadcast() {
        let state = AppState::new();
        let (id, mut rx) = state.registry.register();
        let before = state.snapshot();

        let reply = handle_frame(
            &state,
            &id,
            r#"{"kind":"action","payload":{"action_type":"set_register","address":150,"value":10}}"#,
        );
        match reply {
            Some(Outbound::Error(msg)) => assert!(msg.contains("out of range")),
            other => panic!("expected error reply, got {other:?}"),
        }
        assert!(rx.try_recv().is_err(), "no state frame may follow a failure");
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn malformed_json_gets_one_error_and_zero_mutations() {
        let state = AppState::new();
        let (id, mut rx) = state.registry.register();
        let before = state.snapshot();

        let reply = handle_frame(&state, &id, "{not json");
        assert!(matches!(reply, Some(Outbound::Error(_))));
        assert!(rx.try_recv().is_err());
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn unknown_kind_gets_error() {
        let state = AppState::new();
        let (id, _rx) = state.registry.register();
        let reply = handle_frame(&state, &id, r#"{"kind":"telemetry","payload":{}}"#);
        match reply {
            Some(Outbound::Error(msg)) => assert!(msg.contains("telemetry")),
            other => panic!("expected error reply, got {other:?}"),
        }
    }
}
