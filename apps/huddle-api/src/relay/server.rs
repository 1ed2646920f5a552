//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};

use crate::AppState;

use super::fanout::RelaySession;

pub fn router() -> Router<AppState> {
    Router::new().route("/chat", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, ws_rx) = socket.split();

    let (session, replay) = state.relay.join();

    // Replay the full history, in order, before any live traffic.
    for entry in &replay {
        if ws_tx
            .send(Message::Text(entry.text.clone().into()))
            .await
            .is_err()
        {
            // Transport already gone; no retry.
            state.relay.leave(&session.id);
            return;
        }
    }

    let id = session.id.clone();
    run_session(session, ws_tx, ws_rx, &state).await;

    state.relay.leave(&id);
}

/// Main connection loop: relay inbound text frames to the hub, write fanned
/// out entries back to the socket.
async fn run_session(
    mut session: RelaySession,
    mut ws_tx: futures_util::stream::SplitSink<WebSocket, Message>,
    mut ws_rx: futures_util::stream::SplitStream<WebSocket>,
    state: &AppState,
) {
    loop {
        tokio::select! {
            // Client sends us a frame.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let seq = state.relay.publish(text.as_str().to_owned());
                        tracing::debug!(connection_id = %session.id, seq, "message ingested");
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, connection_id = %session.id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Entry fanned out by the hub.
            entry = session.outbound.recv() => {
                match entry {
                    Some(entry) => {
                        if ws_tx
                            .send(Message::Text(entry.text.clone().into()))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    // Queue closed: the hub already deregistered us.
                    None => break,
                }
            }
        }
    }
}
