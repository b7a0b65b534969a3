use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::usecase::contracts::ContentRepository;
use crate::usecase::error::UsecaseError;
use crate::usecase::notifications::NotificationFeed;
use crate::AppState;

/// Category queried when the caller does not name one.
const DEFAULT_CATEGORY: &str = "news";

#[derive(Debug, Deserialize)]
pub struct NotificationListParams {
    pub category: Option<String>,
}

/// `GET /api/v1/notifications?category=<slug>`
///
/// Public, read-only. Responds 200 with a JSON array of active notification
/// items plus `ETag`/`Last-Modified` validators, or 304 when the caller's
/// `If-None-Match` is current. `If-Modified-Since` is deliberately ignored.
#[tracing::instrument(skip(state, headers))]
pub async fn list_notifications<C>(
    State(state): State<Arc<AppState<C>>>,
    Query(params): Query<NotificationListParams>,
    headers: HeaderMap,
) -> Result<Response, UsecaseError>
where
    C: ContentRepository + 'static,
{
    metrics::counter!("notifications_requests_total").increment(1);

    let category = params.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
    let today = Utc::now().date_naive();
    tracing::debug!(category, %today, "listing active notifications");

    let feed = state
        .notifications_usecase
        .active_notifications(category, today)
        .await?;

    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());

    let response = feed_response(feed, if_none_match, Utc::now())?;
    if response.status() == StatusCode::NOT_MODIFIED {
        metrics::counter!("notifications_not_modified_total").increment(1);
    }
    Ok(response)
}

/// Serializes the feed and applies conditional-request semantics: a matching
/// `If-None-Match` short-circuits to an empty 304.
fn feed_response(
    feed: NotificationFeed,
    if_none_match: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Response, serde_json::Error> {
    let body = serde_json::to_vec(&feed.items)?;
    let etag = etag_for(&body);

    if if_none_match == Some(etag.as_str()) {
        tracing::debug!(%etag, "validator matches, not modified");
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let last_modified = feed.last_modified.unwrap_or(now);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
            (header::ETAG, etag),
            (header::LAST_MODIFIED, http_date(last_modified)),
        ],
        body,
    )
        .into_response())
}

/// Quoted lowercase-hex SHA-256 over the exact response body bytes.
fn etag_for(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// RFC 7231 fixed-format date, always GMT.
fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
