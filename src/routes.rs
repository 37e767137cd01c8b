use crate::AppState;
use crate::upstream::UpstreamError;
use crate::video_id;
use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

const USAGE_HINT: &str = "Missing \"url\" query parameter. Example: /api/download?url=https://www.youtube.com/watch?v=...";
const INVALID_URL: &str = "Invalid YouTube URL provided.";
const STRUCTURE_CHANGED: &str =
    "Could not find the security token. The website structure may have changed.";
const CONVERSION_FAILED: &str = "Failed to retrieve download link from the target site.";
const INTERNAL_ERROR: &str = "An internal error occurred during the scraping process.";

#[derive(Deserialize)]
pub(crate) struct DownloadQuery {
    url: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct DownloadResponse {
    pub(crate) title: String,
    #[serde(rename = "downloadUrl")]
    pub(crate) download_url: String,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) details: Option<JsonValue>,
}

fn client_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
            details: None,
        }),
    )
        .into_response()
}

fn server_error(message: &str, details: Option<JsonValue>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.into(),
            details,
        }),
    )
        .into_response()
}

/// `GET /api/download?url=<video-url>`
///
/// Sequences identifier extraction, the page scrape, and the conversion
/// POST. Each outcome is matched explicitly; every failure path answers
/// with a JSON `error` body and nothing is cached between requests.
#[axum::debug_handler]
pub(crate) async fn download(
    Extension(state): Extension<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let Some(video_url) = query.url else {
        return client_error(USAGE_HINT);
    };

    let Some(id) = video_id::extract(&video_url) else {
        warn!(url = %video_url, "Rejected unrecognizable video URL");
        return client_error(INVALID_URL);
    };

    let page = match state.upstream.fetch_page(&id).await {
        Ok(page) => page,
        Err(UpstreamError::TokenMissing) => {
            error!(video_id = %id, "Conversion page carries no token field");
            return server_error(STRUCTURE_CHANGED, None);
        }
        Err(err) => {
            error!(video_id = %id, %err, "Failed to fetch conversion page");
            return server_error(INTERNAL_ERROR, None);
        }
    };

    let conversion = match state.upstream.request_conversion(&id, &page.token).await {
        Ok(conversion) => conversion,
        Err(UpstreamError::ConversionRejected { payload }) => {
            warn!(video_id = %id, "Upstream refused the conversion");
            return server_error(CONVERSION_FAILED, Some(payload));
        }
        Err(err) => {
            error!(video_id = %id, %err, "Conversion request failed");
            return server_error(INTERNAL_ERROR, None);
        }
    };

    // Prefer the title scraped from the page over the one in the POST
    // reply, matching the upstream site's own frontend.
    let title = page.title.or(conversion.title).unwrap_or_default();

    info!(video_id = %id, "Relaying download link");
    (
        StatusCode::OK,
        Json(DownloadResponse {
            title,
            download_url: conversion.download_link,
        }),
    )
        .into_response()
}
