//! Axum router wiring.
//!
//! `/` is the stream endpoint (GET only); the ops endpoints sit beside it.
//! Serve with `into_make_service_with_connect_info::<SocketAddr>()` so the
//! handler can see the caller address.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(transport::sse::serve_stream).fallback(transport::sse::method_not_allowed),
        )
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
