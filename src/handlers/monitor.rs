//! Observer subscription channel

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};

use crate::models::{Connection, OUTBOX_CAPACITY};
use crate::AppState;

/// `GET /ws/monitor` — upgrade and register the peer as an observer.
pub async fn subscribe(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Owns the socket for the session: drains the connection's outbox into
/// the socket and watches for the peer going away. The registry only
/// ever sees the sending half.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let (connection, mut outbox) = Connection::channel(OUTBOX_CAPACITY);
    let id = connection.id();
    state.registry.register(connection);
    tracing::info!(connection = %id, observers = state.registry.len(), "observer connected");

    loop {
        tokio::select! {
            frame = outbox.recv() => match frame {
                Some(payload) => {
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                // Sender side dropped: the dispatcher already pruned us
                None => break,
            },
            incoming = socket.recv() => match incoming {
                // Inbound frames (pings, stray messages) are ignored
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }

    state.registry.unregister(id);
    tracing::info!(connection = %id, observers = state.registry.len(), "observer disconnected");
}
