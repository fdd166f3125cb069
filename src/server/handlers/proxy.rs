use axum::{
    body::to_bytes,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::cache::{CacheStorage, FetchRequest, Network};
use crate::server::{AppState, errors::AppError};

/// Largest request body forwarded to the backend.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Forwards any request through the cache router to the backend origin.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn proxy_handler<S: CacheStorage, N: Network>(
    State(state): State<AppState<S, N>>,
    request: Request,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // Only path and query are taken from the client; the origin is fixed.
    let mut url = state.upstream.clone();
    url.set_path(parts.uri.path());
    url.set_query(parts.uri.query());

    let fetch = FetchRequest {
        method: parts.method,
        url,
        headers: parts.headers,
        body,
    };

    let response = state.router.handle(fetch).await?;
    Ok(response.into_response())
}
