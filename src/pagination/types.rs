//! Page response shapes and their decoding

use crate::error::{Error, Result};
use serde::de::value::MapAccessDeserializer;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use std::fmt;

/// Consecutive failures of one page after which errors can no longer be
/// reset
pub const MAX_PAGE_RETRIES: u32 = 10;

/// Page size used for channel listings
pub const DEFAULT_CHANNEL_PAGE_SIZE: u64 = 10;

/// One undecoded record of a page
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Box<RawValue>);

impl RawRecord {
    /// Encode `value` as a record
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self(serde_json::value::to_raw_value(value)?))
    }

    /// Record JSON exactly as received
    pub fn as_str(&self) -> &str {
        self.0.get()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.get().as_bytes()
    }

    /// Decode the record into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(self.0.get())?)
    }
}

impl fmt::Debug for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for RawRecord {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Wire shape a page was received in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageShape {
    /// `{"state", "messages", "data": {page, total_pages, total_items, limit, data}}`
    Envelope,
    /// `{page, total_pages, total_items, limit, data}`
    Flat,
    /// `[record, ...]`
    Array,
}

/// A decoded page, independent of its wire shape
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub shape: PageShape,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub limit: u64,
    pub data: Vec<RawRecord>,
}

impl PageResponse {
    /// A page without records, used when the server answers "no content"
    pub fn empty(page: u64, limit: u64) -> Self {
        Self {
            shape: PageShape::Array,
            page,
            total_pages: 0,
            total_items: 0,
            limit,
            data: Vec::new(),
        }
    }

    /// Encode the page in its shape
    pub fn encode(&self) -> Result<Vec<u8>> {
        let flat = FlatPage {
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            limit: self.limit,
            data: self.data.clone(),
        };
        let body = match self.shape {
            PageShape::Envelope => serde_json::to_vec(&Envelope {
                state: "success".to_string(),
                messages: Vec::new(),
                data: flat,
            })?,
            PageShape::Flat => serde_json::to_vec(&flat)?,
            PageShape::Array => serde_json::to_vec(&self.data)?,
        };
        Ok(body)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlatPage {
    #[serde(default)]
    page: u64,
    #[serde(default)]
    total_pages: u64,
    #[serde(default)]
    total_items: u64,
    #[serde(default)]
    limit: u64,
    #[serde(default)]
    data: Vec<RawRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    #[serde(default)]
    state: String,
    #[serde(default)]
    messages: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "flat_page_object")]
    data: FlatPage,
}

/// Envelope payloads must be JSON objects; a bare array under `data` is a
/// flat page's record list
fn flat_page_object<'de, D>(deserializer: D) -> std::result::Result<FlatPage, D::Error>
where
    D: Deserializer<'de>,
{
    struct ObjectOnly;

    impl<'de> Visitor<'de> for ObjectOnly {
        type Value = FlatPage;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a page object")
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<FlatPage, A::Error> {
            FlatPage::deserialize(MapAccessDeserializer::new(map))
        }
    }

    deserializer.deserialize_map(ObjectOnly)
}

impl FlatPage {
    fn into_response(self, shape: PageShape) -> PageResponse {
        PageResponse {
            shape,
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            limit: self.limit,
            data: self.data,
        }
    }
}

/// Decode a List response body.
///
/// Shapes are tried in order: envelope, flat page, bare array. The first one
/// that decodes strictly (no unknown keys) wins. A bare array carries no
/// page metadata, so `page` and `limit` are taken from the request.
pub fn decode_pagination_response_body(body: &[u8], page: u64, limit: u64) -> Result<PageResponse> {
    let first = body.iter().copied().find(|b| !b.is_ascii_whitespace());

    // serde also accepts structs written as sequences, so object shapes are
    // only tried on JSON objects. The envelope's payload is held to the same
    // rule by `flat_page_object`.
    match first {
        Some(b'{') => {
            if let Ok(envelope) = serde_json::from_slice::<Envelope>(body) {
                return Ok(envelope.data.into_response(PageShape::Envelope));
            }
            if let Ok(flat) = serde_json::from_slice::<FlatPage>(body) {
                return Ok(flat.into_response(PageShape::Flat));
            }
        }
        Some(b'[') => {
            if let Ok(data) = serde_json::from_slice::<Vec<RawRecord>>(body) {
                return Ok(PageResponse {
                    shape: PageShape::Array,
                    page,
                    total_pages: 0,
                    total_items: 0,
                    limit,
                    data,
                });
            }
        }
        _ => {}
    }

    Err(Error::PageResponseNotSupported)
}

/// Progress of one listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Page last delivered, 0 before the first delivery
    pub page: u64,
    /// Total pages reported by the server, 0 if unknown
    pub total_pages: u64,
    /// Total items reported by the server, 0 if unknown
    pub total_items: u64,
    /// Page size in effect
    pub items_per_page: u64,
    /// Records delivered so far
    pub total_fetched: u64,
    /// Consecutive failures of the current page
    pub retries: u32,
    /// No further page will be fetched
    pub done: bool,
}

impl PaginationState {
    /// Create state for pages of `limit` items
    pub fn new(limit: u64) -> Self {
        Self {
            items_per_page: limit,
            ..Default::default()
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Count one more failure of the current page
    pub fn add_retry(&mut self) {
        self.retries += 1;
    }

    /// Whether errors may still be cleared
    pub fn can_retry(&self) -> bool {
        self.retries < MAX_PAGE_RETRIES
    }

    /// Record page `number` as delivered and decide whether it was the last.
    ///
    /// A page is the last when it is empty, shorter than the page size, or
    /// reaches the reported total page count.
    pub fn record_page(&mut self, number: u64, response: &PageResponse) {
        let count = response.data.len() as u64;

        self.page = number;
        self.retries = 0;
        self.total_pages = response.total_pages;
        self.total_items = response.total_items;
        if response.limit > 0 {
            self.items_per_page = response.limit;
        }
        self.total_fetched += count;

        let short = self.items_per_page > 0 && count < self.items_per_page;
        let last = self.total_pages > 0 && self.page >= self.total_pages;
        if count == 0 || short || last {
            self.mark_done();
        }
    }
}
