//! Buffered HTTP response

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use url::Url;

/// The only media type the engine decodes
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A fully read HTTP response.
///
/// Owned and constructible so response hooks can inspect, modify or replace
/// it, and so tests can build one without a server.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Option<Url>,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            url: None,
            body: body.into(),
        }
    }

    /// A 200 response with a JSON body
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(StatusCode::OK, value.to_string())
            .with_header(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE))
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Media type of the body without parameters, lowercased.
    ///
    /// `None` when the header is absent.
    pub fn media_type(&self) -> Option<String> {
        let raw = String::from_utf8_lossy(self.headers.get(CONTENT_TYPE)?.as_bytes());
        let media = raw.split(';').next().unwrap_or_default().trim();
        Some(media.to_ascii_lowercase())
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_no_content(&self) -> bool {
        self.status == StatusCode::NO_CONTENT
    }
}
