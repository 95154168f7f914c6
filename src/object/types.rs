//! Object trait and endpoint type

use super::hooks::{
    PaginationSupportHook, RequestBodyHook, RequestFilterHook, RequestUrlHook, ResponseDecodeHook,
    ResponseFilterHook,
};
use crate::context::OperationContext;
use crate::error::Result;
use crate::identifier::Describe;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

/// Path and query of a resource collection, relative to the API base URL
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    path: String,
    query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter; repeated keys are kept
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append several query parameters
    #[must_use]
    pub fn extend_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }
}

impl FromStr for Endpoint {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (path, query) = s.split_once('?').unwrap_or((s, ""));
        Ok(Self {
            path: path.to_string(),
            query: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// A resource description the engine can dispatch operations for.
///
/// Implementors are plain serde types: the default request body is the
/// value itself and the default response decoding merges the decoded body
/// into the value, keeping fields the response leaves out. Identifier resolution goes through [`Describe`].
pub trait Object: Describe + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Endpoint of the resource collection for the current operation.
    ///
    /// Called before the request URL exists, so `ctx.url()` is `None` here.
    fn endpoint_url(&self, ctx: &OperationContext) -> Result<Endpoint>;

    fn as_request_url_hook(&self) -> Option<&dyn RequestUrlHook> {
        None
    }

    fn as_request_body_hook(&self) -> Option<&dyn RequestBodyHook> {
        None
    }

    fn as_request_filter_hook(&self) -> Option<&dyn RequestFilterHook> {
        None
    }

    fn as_response_filter_hook(&self) -> Option<&dyn ResponseFilterHook> {
        None
    }

    fn as_response_decode_hook(&mut self) -> Option<&mut dyn ResponseDecodeHook> {
        None
    }

    fn as_pagination_support_hook(&self) -> Option<&dyn PaginationSupportHook> {
        None
    }
}
