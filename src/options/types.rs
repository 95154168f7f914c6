//! Options bag and per-operation option types

use crate::error::{Error, Result};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Keyed store of caller-defined option values.
///
/// Values are type-erased and shared, so cloning a bag is cheap and a clone
/// can travel into background tasks alongside the operation it belongs to.
#[derive(Clone, Default)]
pub struct OptionsBag {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl OptionsBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`.
    ///
    /// Fails with [`Error::KeyAlreadySet`] if the key holds a value and
    /// `overwrite` is false.
    pub fn set<T: Any + Send + Sync>(
        &mut self,
        key: impl Into<String>,
        value: T,
        overwrite: bool,
    ) -> Result<()> {
        let key = key.into();
        if !overwrite && self.values.contains_key(&key) {
            return Err(Error::KeyAlreadySet { key });
        }
        self.values.insert(key, Arc::new(value));
        Ok(())
    }

    /// Read the value stored under `key`
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Result<&T> {
        let value = self.values.get(key).ok_or_else(|| Error::KeyNotSet {
            key: key.to_string(),
        })?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| Error::OptionTypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Check whether `key` holds a value
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove `key`, returning whether it was set
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Iterate over the keys currently set
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for OptionsBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("OptionsBag").field("keys", &keys).finish()
    }
}

/// Access to the extension bag shared by every options type
pub trait OperationOptions {
    /// Borrow the extension bag
    fn bag(&self) -> &OptionsBag;

    /// Mutably borrow the extension bag
    fn bag_mut(&mut self) -> &mut OptionsBag;

    /// Set an extension key; see [`OptionsBag::set`]
    fn set<T: Any + Send + Sync>(
        &mut self,
        key: impl Into<String>,
        value: T,
        overwrite: bool,
    ) -> Result<()> {
        self.bag_mut().set(key, value, overwrite)
    }

    /// Read an extension key; see [`OptionsBag::get`]
    fn get<T: Any + Send + Sync>(&self, key: &str) -> Result<&T> {
        self.bag().get(key)
    }
}

macro_rules! options_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            bag: OptionsBag,
        }

        impl $name {
            /// Create empty options
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl OperationOptions for $name {
            fn bag(&self) -> &OptionsBag {
                &self.bag
            }

            fn bag_mut(&mut self) -> &mut OptionsBag {
                &mut self.bag
            }
        }
    };
}

options_type!(
    /// Options for a Get operation
    GetOptions
);
options_type!(
    /// Options for a Create operation
    CreateOptions
);
options_type!(
    /// Options for an Update operation
    UpdateOptions
);
options_type!(
    /// Options for a Destroy operation
    DestroyOptions
);

/// Page number and page size of an explicit page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// 1-based page number
    pub page: u64,
    /// Items per page
    pub limit: u64,
}

impl Paging {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// Query pairs sent with a page request
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [("page", self.page.to_string()), ("limit", self.limit.to_string())]
    }
}

/// Options for a List operation
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    bag: OptionsBag,
    paging: Option<Paging>,
    channel: bool,
    full_objects: bool,
}

impl ListOptions {
    /// Create empty options: one request, no paging parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Request paged output starting at `page` with `limit` items per page
    #[must_use]
    pub fn paged(mut self, page: u64, limit: u64) -> Self {
        self.paging = Some(Paging::new(page, limit));
        self
    }

    /// Request delivery through an [`crate::ObjectChannel`]
    #[must_use]
    pub fn object_channel(mut self) -> Self {
        self.channel = true;
        self
    }

    /// Fetch every listed object again with a Get before handing it out
    #[must_use]
    pub fn full_objects(mut self, full: bool) -> Self {
        self.full_objects = full;
        self
    }

    /// Explicit paging requested by the caller
    pub fn paging(&self) -> Option<Paging> {
        self.paging
    }

    pub fn wants_channel(&self) -> bool {
        self.channel
    }

    pub fn wants_full_objects(&self) -> bool {
        self.full_objects
    }

    pub(crate) fn set_paging(&mut self, paging: Paging) {
        self.paging = Some(paging);
    }
}

impl OperationOptions for ListOptions {
    fn bag(&self) -> &OptionsBag {
        &self.bag
    }

    fn bag_mut(&mut self) -> &mut OptionsBag {
        &mut self.bag
    }
}
