use axum::response::IntoResponse;

/// Answered by the proxy itself, never forwarded or cached.
pub async fn health_check() -> impl IntoResponse {
    "healthy"
}
