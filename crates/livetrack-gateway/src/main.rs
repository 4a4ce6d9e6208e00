//! livetrack gateway binary.
//!
//! - WebSocket endpoint: /ws
//! - HTTP API: /health, /users, /users/count
//! - Presence hub: single-owner event loop, broadcast to all peers
//! - Heartbeat ping + idle timeout per connection

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use livetrack_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "livetrack.yaml".to_string());
    let cfg = config::load_from_file(&path).expect("config load failed");
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg);
    let app = router::build_router(state);

    tracing::info!(%listen, "livetrack-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
