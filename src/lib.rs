// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # resource-dispatch
//!
//! A generic client engine for resource-oriented JSON APIs. Five operations
//! (Get, Create, Update, Destroy, List) are mapped onto HTTP requests for
//! any type that describes a resource, with no per-resource request code.
//!
//! ## Features
//!
//! - **Capability hooks**: resources customize URL, body, request, response
//!   and decoding by implementing small independent traits
//! - **Identifier resolution**: the identifier field is found by tag, at any
//!   embedding depth
//! - **Three page formats**: envelope, flat page and bare array pages share
//!   one cursor
//! - **Streaming**: listings can be delivered one object at a time from a
//!   background task
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resource_dispatch::identifier::{Describe, Fields};
//! use resource_dispatch::{Api, Context, Endpoint, GetOptions, HttpClient, Object, OperationContext};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Vlan {
//!     identifier: String,
//!     description_customer: String,
//! }
//!
//! impl Describe for Vlan {
//!     fn fields(&self) -> Fields<'_> {
//!         Fields::new().identifier("identifier", &self.identifier)
//!     }
//! }
//!
//! impl Object for Vlan {
//!     fn endpoint_url(&self, _ctx: &OperationContext) -> resource_dispatch::Result<Endpoint> {
//!         Ok(Endpoint::new("/api/vlan/v1/vlan.json"))
//!     }
//! }
//!
//! # async fn run() -> resource_dispatch::Result<()> {
//! let api = Api::new("https://engine.example.com/".parse()?, HttpClient::new()?);
//! let mut vlan = Vlan { identifier: "6f1b...".into(), ..Default::default() };
//! api.get(&Context::background(), &mut vlan, GetOptions::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                              Api                                │
//! │   get / create / update / destroy → Dispatched                  │
//! │   list → PageIter | ObjectChannel                               │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────┬─────────────┬───┴─────────┬────────────┬───────────┐
//! │ identifier │   object    │  dispatch   │ pagination │  stream   │
//! ├────────────┼─────────────┼─────────────┼────────────┼───────────┤
//! │ Describe   │ Object      │ URL compose │ Envelope   │ mpsc(1)   │
//! │ Fields     │ hooks       │ status map  │ Flat page  │ Retriever │
//! │ resolve    │ Endpoint    │ media type  │ Bare array │ cancel    │
//! └────────────┴─────────────┴──────┬──────┴────────────┴───────────┘
//!                                   │
//!                          http::Transport (reqwest)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the engine
pub mod error;

/// Common types and type aliases
pub mod types;

/// Caller and operation contexts
pub mod context;

/// Extension options per operation
pub mod options;

/// Identifier resolution over described fields
pub mod identifier;

/// Resource capability protocol and hooks
pub mod object;

/// HTTP transport
pub mod http;

/// Operation dispatcher
pub mod dispatch;

/// Page decoding and iteration
pub mod pagination;

/// Channel-based listing
pub mod stream;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{ignore_not_found, Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ClientConfig;
pub use context::{CancelHandle, Context, OperationContext};
pub use dispatch::{Api, Dispatched, Listing};
pub use http::{ApiResponse, HttpClient, HttpClientConfig, Transport};
pub use identifier::{Describe, Fields, Identifier};
pub use object::{DynamicResource, Endpoint, Object};
pub use options::{
    CreateOptions, DestroyOptions, GetOptions, ListOptions, OperationOptions, OptionsBag,
    UpdateOptions,
};
pub use pagination::{PageIter, RawRecord};
pub use stream::{ObjectChannel, ObjectRetriever};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
