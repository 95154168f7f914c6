//! Response classification and the result of one dispatch

use crate::context::OperationContext;
use crate::error::{Error, Result};
use crate::http::{ApiResponse, JSON_MEDIA_TYPE};
use crate::object::{decode_object, Object};
use bytes::Bytes;
use reqwest::StatusCode;

/// Maximum length of a response body quoted in an error
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Map terminal HTTP statuses to typed errors
pub(crate) fn check_status(method: &str, url: &str, response: &ApiResponse) -> Result<()> {
    match response.status.as_u16() {
        404 => Err(Error::NotFound {
            method: method.to_string(),
            url: url.to_string(),
        }),
        403 => Err(Error::AccessDenied {
            method: method.to_string(),
            url: url.to_string(),
        }),
        status if status > 300 => Err(Error::http_status(
            method,
            url,
            status,
            error_message(response),
        )),
        _ => Ok(()),
    }
}

/// Error text for a failed response: the body, truncated, or the status
/// reason when the body is empty
fn error_message(response: &ApiResponse) -> String {
    let text = response.text();
    let body = text.trim();
    if body.is_empty() {
        return response
            .status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string();
    }

    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{truncated}... [truncated, {} bytes total]", body.len())
    } else {
        body.to_string()
    }
}

/// Only JSON bodies are understood; a missing Content-Type counts as JSON
pub(crate) fn check_media_type(response: &ApiResponse) -> Result<()> {
    match response.media_type() {
        None => Ok(()),
        Some(media) if media.is_empty() || media == JSON_MEDIA_TYPE => Ok(()),
        Some(media) => Err(Error::UnsupportedResponseFormat {
            content_type: media,
        }),
    }
}

/// Outcome of one dispatched request, ready to be decoded
#[derive(Debug)]
pub struct Dispatched {
    context: OperationContext,
    status: StatusCode,
    body: Option<Bytes>,
}

impl Dispatched {
    pub(crate) fn new(context: OperationContext, response: ApiResponse) -> Self {
        let body = if response.is_no_content() || response.body.is_empty() {
            None
        } else {
            Some(response.body)
        };
        Self {
            context,
            status: response.status,
            body,
        }
    }

    /// Operation context as it was when the request was sent
    pub fn context(&self) -> &OperationContext {
        &self.context
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response body; `None` for "no content" and empty bodies
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Decode the body into `dest` through its decode hook or as JSON.
    ///
    /// Without a body this leaves `dest` untouched.
    pub fn decode_into<O: Object>(&self, dest: &mut O) -> Result<()> {
        match &self.body {
            Some(body) => decode_object(&self.context, dest, body),
            None => Ok(()),
        }
    }

    pub fn into_parts(self) -> (OperationContext, Option<Bytes>) {
        (self.context, self.body)
    }
}
