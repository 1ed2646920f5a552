use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use huddle_api::config::Config;
use huddle_api::relay::fanout::RelayHub;
use huddle_api::store::ProjectStore;
use huddle_api::AppState;

/// Build a test AppState with default limits and empty stores.
pub fn test_state() -> AppState {
    let config = Config {
        port: 0,
        history_capacity: None,
        outbound_buffer: 256,
    };
    AppState {
        relay: Arc::new(RelayHub::new(
            config.history_capacity,
            config.outbound_buffer,
        )),
        projects: Arc::new(ProjectStore::new()),
        config: Arc::new(config),
    }
}

/// Build the full application router over a fresh test state.
pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    let app = huddle_api::routes::router().with_state(state.clone());
    (app, state)
}

/// Start an actual TCP server for WebSocket testing.
/// Returns (addr, state). The server runs in the background.
#[allow(dead_code)]
pub async fn start_ws_server() -> (SocketAddr, AppState) {
    let (app, state) = test_app();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}
