//! Pagination module
//!
//! Supports: envelope pages, flat pages, bare arrays
//!
//! # Overview
//!
//! List responses arrive in one of three wire shapes. Each page is decoded
//! on its own into a [`PageResponse`], and [`PageIter`] walks the pages with
//! one iteration contract regardless of shape:
//!
//! - `{"state": .., "messages": [..], "data": {page, total_pages, total_items, limit, data}}`
//! - `{page, total_pages, total_items, limit, data}`
//! - `[record, ...]`, with page and limit taken from the request
//!
//! Failed page fetches are sticky and can be reset up to
//! [`MAX_PAGE_RETRIES`] times in a row.

mod iter;
mod types;

pub(crate) use iter::decode_record;
pub use iter::PageIter;
pub use types::{
    decode_pagination_response_body, PageResponse, PageShape, PaginationState, RawRecord,
    DEFAULT_CHANNEL_PAGE_SIZE, MAX_PAGE_RETRIES,
};
