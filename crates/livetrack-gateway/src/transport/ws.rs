//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS at `GET /ws`
//! - Assign the connection id (uuid v4, stable for the connection lifetime)
//! - Lifecycle: ping tick + idle timeout
//! - Decode each text frame once, then forward the typed event to the hub
//!
//! Decode failures are answered to the offending sender only; the
//! connection stays open. Abrupt transport errors and graceful closes take
//! the same exit path, so the registry cannot tell them apart.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

use livetrack_core::error::{LivetrackError, Result};
use livetrack_core::protocol::{ClientEvent, ServerEvent};

use crate::app_state::AppState;

pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        let conn_id = Uuid::new_v4().to_string();
        if let Err(err) = run_session(app, &conn_id, socket).await {
            tracing::warn!(conn = %conn_id, %err, "session ended with error");
        }
    })
}

async fn run_session(app: AppState, conn_id: &str, socket: WebSocket) -> Result<()> {
    // ---- outbound channel; the hub holds a clone for broadcasts
    let (out_tx, out_rx) = mpsc::channel::<Message>(app.cfg().server.outbound_queue);

    // A refused connect returns here and drops the socket; the id still
    // belongs to its original holder, so no Disconnect may be sent for it.
    app.hub().connect(conn_id.to_string(), out_tx.clone()).await?;

    // Once accepted, the hub must see Disconnect on every exit path,
    // including transport faults, so the loop result is only propagated
    // afterwards.
    let result = session_loop(&app, conn_id, socket, &out_tx, out_rx).await;
    let _ = app.hub().disconnect(conn_id.to_string()).await;
    result
}

async fn session_loop(
    app: &AppState,
    conn_id: &str,
    socket: WebSocket,
    out_tx: &mpsc::Sender<Message>,
    mut out_rx: mpsc::Receiver<Message>,
) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let server = &app.cfg().server;
    let ping_every = Duration::from_millis(server.ping_interval_ms);
    let idle_timeout = Duration::from_millis(server.idle_timeout_ms);

    let mut ping_tick = tokio::time::interval(ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                // An errored read is an abrupt disconnect; same exit as Close.
                let Ok(msg) = incoming else { break; };

                last_activity = Instant::now();

                match msg {
                    Message::Text(frame) => {
                        match ClientEvent::decode(&frame) {
                            Ok(ev) => dispatch_event(app, conn_id, ev).await?,
                            Err(err) => {
                                tracing::warn!(conn = %conn_id, %err, "frame rejected");
                                reply_error(out_tx, &err);
                            }
                        }
                    }
                    Message::Binary(_) => {
                        let err = LivetrackError::BadRequest("binary frames unsupported".into());
                        reply_error(out_tx, &err);
                    }
                    Message::Ping(payload) => {
                        let _ = out_tx.send(Message::Pong(payload)).await;
                    }
                    Message::Pong(_) => {}
                    Message::Close(_) => break,
                }
            }

            // ping
            _ = ping_tick.tick() => {
                let _ = out_tx.send(Message::Ping(Vec::new())).await;
            }

            // idle timeout
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if last_activity.elapsed() >= idle_timeout {
                    tracing::info!(conn = %conn_id, "idle timeout");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Forward a decoded event to the hub. Only a closed hub is an error here;
/// per-event rejections come back to the client from the hub itself.
async fn dispatch_event(app: &AppState, conn_id: &str, ev: ClientEvent) -> Result<()> {
    match ev {
        ClientEvent::SendLocation(report) => app.hub().locate(conn_id.to_string(), report).await,
        ClientEvent::IdentifyUser { name } => app.hub().identify(conn_id.to_string(), name).await,
    }
}

/// Error reply to this sender only, best effort.
fn reply_error(out_tx: &mpsc::Sender<Message>, err: &LivetrackError) {
    if let Ok(frame) = ServerEvent::error_for(err).encode() {
        let _ = out_tx.try_send(Message::Text(frame));
    }
}
