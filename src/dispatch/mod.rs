//! Operation dispatcher
//!
//! [`Api`] turns an [`Object`] and an [`Operation`] into one HTTP request,
//! runs the object's capability hooks at each step and classifies the
//! response:
//!
//! ```text
//! identifier ─▶ endpoint_url ─▶ compose URL ─▶ RequestUrlHook
//!     ─▶ body (RequestBodyHook | JSON) ─▶ RequestFilterHook ─▶ Transport
//!     ─▶ ResponseFilterHook ─▶ status / media type ─▶ Dispatched
//! ```
//!
//! Typed operations ([`Api::get`], [`Api::create`], ...) decode the response
//! back into the caller's object. [`Api::list`] hands off to the page
//! iterator or the object channel.

mod request;
mod response;

pub use response::Dispatched;

use crate::config::ClientConfig;
use crate::context::{Context, OperationContext};
use crate::error::{Error, Result};
use crate::http::{HttpClient, Transport, JSON_MEDIA_TYPE};
use crate::identifier::resolve_identifier;
use crate::object::Object;
use crate::options::{
    CreateOptions, DestroyOptions, GetOptions, ListOptions, OperationOptions, OptionsBag, Paging,
    UpdateOptions,
};
use crate::pagination::{PageIter, DEFAULT_CHANNEL_PAGE_SIZE};
use crate::stream::ObjectChannel;
use crate::types::Operation;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Request;
use request::compose_url;
use response::{check_media_type, check_status};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, Instrument};
use url::Url;

/// Entry point for operations against one API
#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn Transport>,
    base_url: Url,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Create an API handle sending requests through `transport`
    pub fn new(base_url: Url, transport: impl Transport + 'static) -> Self {
        Self::with_transport(base_url, Arc::new(transport))
    }

    /// Create an API handle sharing an existing transport
    pub fn with_transport(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    /// Create an API handle backed by [`HttpClient`]
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = HttpClient::with_config(config.http_config())?;
        Ok(Self::new(base_url, client))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send one request for `operation` on `object` without decoding.
    ///
    /// Fails with [`Error::ContextRequired`] when no context is given.
    pub async fn dispatch<O: Object>(
        &self,
        ctx: Option<&Context>,
        object: &O,
        options: &OptionsBag,
        operation: Operation,
    ) -> Result<Dispatched> {
        self.execute(ctx, object, options, operation, None).await
    }

    /// Fetch `object` by its identifier, replacing it with the response
    pub async fn get<O: Object>(
        &self,
        ctx: &Context,
        object: &mut O,
        options: GetOptions,
    ) -> Result<()> {
        self.dispatch(Some(ctx), &*object, options.bag(), Operation::Get)
            .await?
            .decode_into(object)
    }

    /// Create `object`, decoding the server's answer back into it
    pub async fn create<O: Object>(
        &self,
        ctx: &Context,
        object: &mut O,
        options: CreateOptions,
    ) -> Result<()> {
        self.dispatch(Some(ctx), &*object, options.bag(), Operation::Create)
            .await?
            .decode_into(object)
    }

    /// Update `object` by its identifier
    pub async fn update<O: Object>(
        &self,
        ctx: &Context,
        object: &mut O,
        options: UpdateOptions,
    ) -> Result<()> {
        self.dispatch(Some(ctx), &*object, options.bag(), Operation::Update)
            .await?
            .decode_into(object)
    }

    /// Destroy `object` by its identifier
    pub async fn destroy<O: Object>(
        &self,
        ctx: &Context,
        object: &mut O,
        options: DestroyOptions,
    ) -> Result<()> {
        self.dispatch(Some(ctx), &*object, options.bag(), Operation::Destroy)
            .await?
            .decode_into(object)
    }

    /// List objects of `filter`'s type.
    ///
    /// `filter` supplies the endpoint and filter fields; each listed record is
    /// decoded into a clone of it. Channel delivery cannot be combined with
    /// explicit paging and defaults to pages of
    /// [`DEFAULT_CHANNEL_PAGE_SIZE`] starting at page 1.
    pub async fn list<O: Object>(
        &self,
        ctx: &Context,
        filter: &O,
        options: ListOptions,
    ) -> Result<Listing<O>> {
        let mut options = options;
        if options.wants_channel() {
            if options.paging().is_some() {
                return Err(Error::CannotListChannelAndPaged);
            }
            options.set_paging(Paging::new(1, DEFAULT_CHANNEL_PAGE_SIZE));
        }

        let channel = options.wants_channel();
        let pages = PageIter::start(self.clone(), ctx.clone(), filter.clone(), options).await?;
        if channel {
            Ok(Listing::Channel(ObjectChannel::spawn(pages, ctx.clone())))
        } else {
            Ok(Listing::Pages(pages))
        }
    }

    pub(crate) async fn execute<O: Object>(
        &self,
        ctx: Option<&Context>,
        object: &O,
        options: &OptionsBag,
        operation: Operation,
        paging: Option<Paging>,
    ) -> Result<Dispatched> {
        let ctx = ctx.ok_or(Error::ContextRequired)?;
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }

        self.send(ctx, object, options, operation, paging)
            .instrument(ctx.span())
            .await
    }

    async fn send<O: Object>(
        &self,
        ctx: &Context,
        object: &O,
        options: &OptionsBag,
        operation: Operation,
        paging: Option<Paging>,
    ) -> Result<Dispatched> {
        let mut op_ctx = OperationContext::new(operation, options.clone());
        op_ctx.set_paging(paging);

        let identifier = if operation.is_single_object() {
            Some(resolve_identifier(object, true)?)
        } else {
            None
        };

        let endpoint = object.endpoint_url(&op_ctx)?;
        let mut url = compose_url(&self.base_url, &endpoint, identifier.as_ref(), paging)?;
        op_ctx.set_endpoint(endpoint);

        if let Some(hook) = object.as_request_url_hook() {
            url = hook.request_url(&op_ctx, url)?;
        }
        op_ctx.set_url(url.clone());

        let mut request = Request::new(operation.method().into(), url);
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));

        if operation.has_body() {
            let body = match object.as_request_body_hook() {
                Some(hook) => serde_json::to_vec(&hook.request_body(&op_ctx)?)?,
                None => serde_json::to_vec(object)?,
            };
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
            *request.body_mut() = Some(body.into());
        }

        if let Some(hook) = object.as_request_filter_hook() {
            request = hook.filter_request(&op_ctx, request)?;
        }

        let method = request.method().to_string();
        let request_url = request.url().to_string();
        debug!(operation = %operation, "{} {}", method, request_url);

        let response = tokio::select! {
            response = self.transport.execute(request) => response?,
            () = ctx.cancelled() => return Err(Error::Cancelled),
        };

        let response = match object.as_response_filter_hook() {
            Some(hook) => hook.filter_response(&op_ctx, response)?,
            None => response,
        };

        debug!(status = response.status.as_u16(), "{} {} completed", method, request_url);
        check_status(&method, &request_url, &response)?;
        if !response.is_no_content() {
            check_media_type(&response)?;
        }

        Ok(Dispatched::new(op_ctx, response))
    }
}

/// Result of [`Api::list`]
#[derive(Debug)]
pub enum Listing<O: Object> {
    /// Pull pages on demand
    Pages(PageIter<O>),
    /// Objects pushed by a background task
    Channel(ObjectChannel<O>),
}

impl<O: Object> Listing<O> {
    /// The page iterator, or `None` for channel listings
    pub fn into_pages(self) -> Option<PageIter<O>> {
        match self {
            Self::Pages(pages) => Some(pages),
            Self::Channel(_) => None,
        }
    }

    /// The object channel, or `None` for paged listings
    pub fn into_channel(self) -> Option<ObjectChannel<O>> {
        match self {
            Self::Channel(channel) => Some(channel),
            Self::Pages(_) => None,
        }
    }
}

#[cfg(test)]
mod tests;
