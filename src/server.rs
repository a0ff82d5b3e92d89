use crate::config::Feed;
use crate::feed;
use crate::params::{display_ceiling, ParameterSource};
use crate::store::ItemStore;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub store: ItemStore,
    pub params: Arc<dyn ParameterSource>,
    pub feed: Arc<Feed>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// First non-empty value of a possibly comma-separated header.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// `{scheme}://{host}` as seen by the client. The host comes from
/// `X-Forwarded-Host`, then `Host`, then the request authority (HTTP/2).
pub fn channel_link(headers: &HeaderMap, uri: &Uri) -> String {
    let host = first_value(headers, "x-forwarded-host")
        .or_else(|| first_value(headers, header::HOST.as_str()))
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    let scheme = first_value(headers, "x-forwarded-proto")
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");
    format!("{scheme}://{host}")
}

async fn serve_feed(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let link = channel_link(&headers, &uri);
    let limit = display_ceiling(state.params.as_ref()).await;
    let items = state.store.list(limit).await;
    let body = feed::render(&state.feed, &link, &items).unwrap_or_else(|err| {
        error!(?err, "failed to generate rss feed");
        feed::fallback(&state.feed, &link)
    });
    (StatusCode::OK, [(header::CONTENT_TYPE, feed::CONTENT_TYPE)], body).into_response()
}
