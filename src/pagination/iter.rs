//! Page-at-a-time cursor over a List result

use super::types::{decode_pagination_response_body, PageResponse, PaginationState, RawRecord};
use crate::context::{Context, OperationContext};
use crate::dispatch::Api;
use crate::error::{Error, Result};
use crate::object::{decode_object, Object};
use crate::options::{GetOptions, ListOptions, OperationOptions, Paging};
use crate::types::Operation;
use std::fmt;
use tracing::{debug, warn};

/// One fetched, not yet delivered page
struct FetchedPage {
    number: u64,
    response: PageResponse,
    context: OperationContext,
    /// Fetched by `Api::list` and handed out by the first `next`
    initial: bool,
}

/// Cursor over the pages of a List result.
///
/// The first page is fetched by [`Api::list`] and delivered by the first
/// call to [`PageIter::next`]; every later call fetches one more page. A
/// failed fetch is kept as a sticky error: `next` returns `false` until
/// [`PageIter::reset_error`] clears it, and the same page is fetched again.
pub struct PageIter<O: Object> {
    api: Api,
    ctx: Context,
    filter: O,
    options: ListOptions,
    single_page: bool,
    limit: u64,
    pending: Option<FetchedPage>,
    state: PaginationState,
    error: Option<Error>,
}

impl<O: Object> fmt::Debug for PageIter<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageIter")
            .field("type", &self.filter.type_name())
            .field("single_page", &self.single_page)
            .field("state", &self.state)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<O: Object> PageIter<O> {
    /// Fetch the first page and hold it for the first `next`
    pub(crate) async fn start(api: Api, ctx: Context, filter: O, options: ListOptions) -> Result<Self> {
        let paginated = match filter.as_pagination_support_hook() {
            Some(hook) => {
                let mut op_ctx = OperationContext::new(Operation::List, options.bag().clone());
                op_ctx.set_endpoint(filter.endpoint_url(&op_ctx)?);
                hook.has_pagination(&op_ctx)?
            }
            None => true,
        };
        let paging = options.paging().filter(|_| paginated);
        let limit = paging.map_or(0, |p| p.limit);

        let mut iter = Self {
            api,
            ctx,
            filter,
            options,
            single_page: paging.is_none(),
            limit,
            pending: None,
            state: PaginationState::new(limit),
            error: None,
        };

        let mut first = iter.fetch(paging.map_or(1, |p| p.page)).await?;
        first.initial = true;
        debug!(
            page = first.number,
            items = first.response.data.len(),
            single_page = iter.single_page,
            "Fetched first page of {}",
            iter.filter.type_name()
        );
        iter.pending = Some(first);
        Ok(iter)
    }

    /// Decode the next page into `dest`.
    ///
    /// Returns `false` at the end of the listing or on failure, leaving
    /// `dest` untouched; check [`PageIter::error`] to tell them apart.
    pub async fn next(&mut self, dest: &mut Vec<O>) -> bool {
        let Some(page) = self.next_page().await else {
            return false;
        };

        match self.decode_page(&page).await {
            Ok(items) => {
                self.complete(&page);
                dest.extend(items);
                true
            }
            Err(error) => {
                self.fail(error);
                if page.initial {
                    self.pending = Some(page);
                }
                false
            }
        }
    }

    /// Append the next page's undecoded records to `dest`
    pub async fn next_raw(&mut self, dest: &mut Vec<RawRecord>) -> bool {
        match self.next_records().await {
            Some((_, records)) => {
                dest.extend(records);
                true
            }
            None => false,
        }
    }

    /// Page last delivered
    pub fn current_page(&self) -> u64 {
        self.state.page
    }

    /// Total pages, 0 if the server does not report it
    pub fn total_pages(&self) -> u64 {
        self.state.total_pages
    }

    /// Total items, 0 if the server does not report it
    pub fn total_items(&self) -> u64 {
        self.state.total_items
    }

    pub fn items_per_page(&self) -> u64 {
        self.state.items_per_page
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Error of the last failed page fetch, kept until reset
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Clear the sticky error so the failed page is fetched again.
    ///
    /// Refused once the page has failed [`super::MAX_PAGE_RETRIES`] times in
    /// a row; the error then stays in place.
    pub fn reset_error(&mut self) -> bool {
        if !self.state.can_retry() {
            warn!(
                retries = self.state.retries,
                "Refusing to reset page error after too many failures"
            );
            return false;
        }
        self.error = None;
        true
    }

    pub(crate) fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Api and context to fetch full objects with, when requested
    pub(crate) fn full_objects(&self) -> Option<(Api, Context)> {
        self.options
            .wants_full_objects()
            .then(|| (self.api.clone(), self.ctx.clone()))
    }

    /// Next page's records with the context they were fetched under
    pub(crate) async fn next_records(&mut self) -> Option<(OperationContext, Vec<RawRecord>)> {
        let page = self.next_page().await?;
        self.complete(&page);
        Some((page.context, page.response.data))
    }

    async fn next_page(&mut self) -> Option<FetchedPage> {
        if self.error.is_some() || self.state.done {
            return None;
        }

        let page = match self.pending.take() {
            Some(page) => page,
            None if self.single_page => {
                self.state.mark_done();
                return None;
            }
            None => match self.fetch(self.state.page + 1).await {
                Ok(page) => page,
                Err(error) => {
                    self.fail(error);
                    return None;
                }
            },
        };

        if page.response.data.is_empty() {
            debug!(page = page.number, "Empty page ends the listing");
            self.state.record_page(page.number, &page.response);
            return None;
        }
        Some(page)
    }

    async fn fetch(&self, number: u64) -> Result<FetchedPage> {
        let paging = (!self.single_page).then(|| Paging::new(number, self.limit));
        let dispatched = self
            .api
            .execute(
                Some(&self.ctx),
                &self.filter,
                self.options.bag(),
                Operation::List,
                paging,
            )
            .await?;

        let (context, body) = dispatched.into_parts();
        let response = match body {
            Some(body) => decode_pagination_response_body(&body, number, self.limit)?,
            None => PageResponse::empty(number, self.limit),
        };

        let count = response.data.len() as u64;
        if self.limit > 0 && count > self.limit {
            warn!(
                page = number,
                limit = self.limit,
                items = count,
                "Server returned more items than the page size"
            );
        }

        Ok(FetchedPage {
            number,
            response,
            context,
            initial: false,
        })
    }

    async fn decode_page(&self, page: &FetchedPage) -> Result<Vec<O>> {
        let full = self.full_objects();
        let mut items = Vec::with_capacity(page.response.data.len());
        for record in &page.response.data {
            let mut item = self.filter.clone();
            decode_record(
                &mut item,
                &page.context,
                record,
                full.as_ref().map(|(api, ctx)| (api, ctx)),
            )
            .await?;
            items.push(item);
        }
        Ok(items)
    }

    fn complete(&mut self, page: &FetchedPage) {
        self.state.record_page(page.number, &page.response);
        if self.single_page {
            self.state.mark_done();
        }
    }

    fn fail(&mut self, error: Error) {
        self.state.add_retry();
        warn!(
            page = self.state.page + 1,
            retries = self.state.retries,
            error = %error,
            "Page fetch failed"
        );
        self.error = Some(error);
    }
}

/// Decode one listed record into `dest`, then fetch the full object if
/// `full` is given
pub(crate) async fn decode_record<O: Object>(
    dest: &mut O,
    ctx: &OperationContext,
    record: &RawRecord,
    full: Option<(&Api, &Context)>,
) -> Result<()> {
    decode_object(ctx, dest, record.as_bytes())?;
    if let Some((api, caller)) = full {
        api.get(caller, dest, GetOptions::new()).await?;
    }
    Ok(())
}
