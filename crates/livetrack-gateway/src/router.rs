//! Axum router wiring (HTTP API + WS upgrade).
//!
//! The allowed-origin layer stamps `Access-Control-Allow-Origin` on every
//! response so the browser UI can call the API from its own origin.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};

use crate::{api, app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(transport::ws::ws_upgrade))
        .route("/health", get(api::health))
        .route("/users", get(api::users))
        .route("/users/count", get(api::users_count))
        .layer(middleware::from_fn_with_state(state.clone(), allow_origin))
        .with_state(state)
}

async fn allow_origin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut res = next.run(req).await;
    if let Ok(origin) = HeaderValue::from_str(&state.cfg().server.allowed_origin) {
        res.headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        res.headers_mut()
            .insert(header::VARY, HeaderValue::from_static("Origin"));
    }
    res
}
