use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{field, Span};

use crate::state::AppState;
use crate::{auth, debug, pages};

pub fn build_app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .merge(pages::router(&config))
        .merge(auth::router(&config));
    if config.debug_routes {
        tracing::warn!("debug user listings are mounted without authentication");
        router = router.merge(debug::router());
    }

    router.with_state(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_response(log_response),
    )
}

fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        status = field::Empty,
    )
}

fn log_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", field::display(status));
    let latency_ms = latency.as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%status, latency_ms, "request failed");
    } else {
        tracing::info!(%status, latency_ms, "request served");
    }
}

pub async fn serve(app: Router, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler unavailable");
            }
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
