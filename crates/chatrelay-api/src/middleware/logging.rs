use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Request logging middleware
///
/// Client errors log at `warn`, server errors at `error`.
pub async fn log_request(
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(method = %method, uri = %uri, status = %status, duration_ms, "Request failed");
    } else if status.is_client_error() {
        tracing::warn!(method = %method, uri = %uri, status = %status, duration_ms, "Request rejected");
    } else {
        tracing::info!(method = %method, uri = %uri, status = %status, duration_ms, "Request processed");
    }

    response
}
