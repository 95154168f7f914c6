//! Caller and operation contexts
//!
//! [`Context`] is what callers hand to every API call: it carries a
//! cancellation signal and, optionally, the tracing span the engine logs
//! under. [`OperationContext`] is built by the engine for one operation and
//! passed explicitly to every capability hook.

use crate::object::Endpoint;
use crate::options::{OptionsBag, Paging};
use crate::types::Operation;
use futures::future::select_all;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Span;
use url::Url;

/// Ambient context of an API call
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// One receiver per ancestor `with_cancel` call; any of them firing cancels
    cancel: Vec<watch::Receiver<bool>>,
    span: Option<Span>,
}

/// Cancels the context returned alongside it by [`Context::with_cancel`]
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Cancel the context and every context derived from it
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and logs nowhere
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a cancellable child context
    #[must_use]
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let mut child = self.clone();
        child.cancel.push(receiver);
        (
            child,
            CancelHandle {
                sender: Arc::new(sender),
            },
        )
    }

    /// Attach the span operations run under
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Span for this context; a disabled span when none was attached
    pub fn span(&self) -> Span {
        self.span.clone().unwrap_or_else(Span::none)
    }

    pub fn has_span(&self) -> bool {
        self.span.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.iter().any(|rx| *rx.borrow())
    }

    /// Resolves once the context is cancelled; never resolves for
    /// contexts without a cancel handle.
    pub async fn cancelled(&self) {
        if self.cancel.is_empty() {
            return std::future::pending().await;
        }

        let waits = self.cancel.iter().cloned().map(|mut rx| {
            Box::pin(async move {
                // A dropped handle can no longer cancel
                if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                    std::future::pending::<()>().await;
                }
            })
        });
        select_all(waits).await;
    }
}

/// State of one operation, handed to every capability hook.
///
/// The endpoint is only known after address resolution, and the full
/// request URL only after composition, so both start out empty.
#[derive(Debug, Clone)]
pub struct OperationContext {
    operation: Operation,
    options: OptionsBag,
    paging: Option<Paging>,
    endpoint: Option<Endpoint>,
    url: Option<Url>,
}

impl OperationContext {
    pub fn new(operation: Operation, options: OptionsBag) -> Self {
        Self {
            operation,
            options,
            paging: None,
            endpoint: None,
            url: None,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Extension options of the operation
    pub fn options(&self) -> &OptionsBag {
        &self.options
    }

    /// Page requested by this call, for paged List requests
    pub fn paging(&self) -> Option<Paging> {
        self.paging
    }

    /// Resource endpoint, once resolved
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Full request URL, once composed
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub(crate) fn set_paging(&mut self, paging: Option<Paging>) {
        self.paging = paging;
    }

    pub(crate) fn set_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoint = Some(endpoint);
    }

    pub(crate) fn set_url(&mut self, url: Url) {
        self.url = Some(url);
    }
}
