use crate::video_id::VideoId;
use reqwest::header;
use scraper::{Html, Selector};
use serde_json::Value as JsonValue;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

/// The upstream rejects bare clients, so both hops present a browser
/// user-agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

// Selectors compiled once, shared by every request.
static TOKEN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[name="token"]"#).unwrap());
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#title").unwrap());

/// Failures talking to the conversion site.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The fetched page carried no token field. The site structure has
    /// changed rather than a transient fault.
    #[error("security token not found in the conversion page")]
    TokenMissing,

    /// The conversion endpoint answered, but not with a usable link.
    /// Carries the raw reply for diagnosis.
    #[error("upstream refused the conversion request")]
    ConversionRejected { payload: JsonValue },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Values scraped from the conversion page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    pub token: String,
    pub title: Option<String>,
}

/// A successful conversion reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub title: Option<String>,
    pub download_link: String,
}

/// Client for the two-hop interaction with the conversion site.
///
/// Wraps a single pooled `reqwest::Client`; cloning is cheap and shares
/// the pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: String,
}

impl UpstreamClient {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    /// URL of the conversion page for a video, also used as the referer
    /// for the conversion POST.
    pub fn page_url(&self, id: &VideoId) -> String {
        format!("{}/{}/", self.base, id)
    }

    fn api_url(&self) -> String {
        format!("{}/api/", self.base)
    }

    /// Fetch the conversion page and pull out the security token and the
    /// display title.
    pub async fn fetch_page(&self, id: &VideoId) -> Result<ScrapedPage, UpstreamError> {
        let url = self.page_url(id);
        debug!(%url, "Fetching conversion page");

        let body = self
            .http
            .get(&url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_page(&body)
    }

    /// Submit the id/token pair and interpret the reply.
    ///
    /// The referer must point back at the page the token came from; the
    /// upstream validates the pairing.
    pub async fn request_conversion(
        &self,
        id: &VideoId,
        token: &str,
    ) -> Result<Conversion, UpstreamError> {
        debug!(video_id = %id, "Requesting conversion");

        let body = self
            .http
            .post(self.api_url())
            .form(&[("id", id.as_str()), ("token", token)])
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(header::REFERER, self.page_url(id))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        // Non-JSON replies still end up in the error payload verbatim.
        let reply: JsonValue =
            serde_json::from_str(&body).unwrap_or_else(|_| JsonValue::String(body));

        interpret_reply(reply)
    }
}

fn parse_page(body: &str) -> Result<ScrapedPage, UpstreamError> {
    let document = Html::parse_document(body);

    let token = document
        .select(&TOKEN_SELECTOR)
        .next()
        .and_then(|input| input.attr("value"))
        .map(str::to_owned)
        .ok_or(UpstreamError::TokenMissing)?;

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .and_then(|element| element.attr("value"))
        .filter(|title| !title.is_empty())
        .map(str::to_owned);

    Ok(ScrapedPage { token, title })
}

fn interpret_reply(reply: JsonValue) -> Result<Conversion, UpstreamError> {
    let success = reply.get("status").and_then(JsonValue::as_str) == Some("success");
    let download_link = reply
        .get("download_link")
        .and_then(JsonValue::as_str)
        .map(str::to_owned);

    match (success, download_link) {
        (true, Some(download_link)) => Ok(Conversion {
            title: reply
                .get("title")
                .and_then(JsonValue::as_str)
                .map(str::to_owned),
            download_link,
        }),
        _ => Err(UpstreamError::ConversionRejected { payload: reply }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_token_and_title() {
        let page = parse_page(concat!(
            "<html><body><form>",
            r#"<input type="hidden" name="token" value="T">"#,
            r#"<input id="title" value="Song Name">"#,
            "</form></body></html>",
        ))
        .unwrap();

        assert_eq!(page.token, "T");
        assert_eq!(page.title.as_deref(), Some("Song Name"));
    }

    #[test]
    fn title_is_optional() {
        let page = parse_page(r#"<form><input name="token" value="tok"></form>"#).unwrap();

        assert_eq!(page.token, "tok");
        assert_eq!(page.title, None);
    }

    #[test]
    fn empty_title_treated_as_absent() {
        let page =
            parse_page(r#"<form><input name="token" value="tok"><input id="title" value=""></form>"#)
                .unwrap();

        assert_eq!(page.title, None);
    }

    #[test]
    fn missing_token_is_a_contract_error() {
        let err = parse_page(r#"<html><body><p>nothing here</p></body></html>"#).unwrap_err();

        assert!(matches!(err, UpstreamError::TokenMissing));
    }

    #[test]
    fn success_reply_yields_conversion() {
        let conversion = interpret_reply(json!({
            "status": "success",
            "title": "X",
            "download_link": "https://host/f.mp3",
        }))
        .unwrap();

        assert_eq!(conversion.title.as_deref(), Some("X"));
        assert_eq!(conversion.download_link, "https://host/f.mp3");
    }

    #[test]
    fn error_status_carries_raw_payload() {
        let payload = json!({"status": "error"});
        let err = interpret_reply(payload.clone()).unwrap_err();

        match err {
            UpstreamError::ConversionRejected { payload: raw } => assert_eq!(raw, payload),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn success_without_link_is_rejected() {
        let err = interpret_reply(json!({"status": "success", "title": "X"})).unwrap_err();

        assert!(matches!(err, UpstreamError::ConversionRejected { .. }));
    }

    #[test]
    fn non_object_reply_is_rejected() {
        let err = interpret_reply(JsonValue::String("<html>503</html>".into())).unwrap_err();

        assert!(matches!(err, UpstreamError::ConversionRejected { .. }));
    }
}
