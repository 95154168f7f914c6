//! Identifier resolution
//!
//! Locates the single field tagged as "the identifier" in a resource
//! description. Types expose their fields through [`Describe`]; the resolver
//! walks that tree, descending into embedded records, and is the only place
//! in the crate that inspects fields this way.
//!
//! # Example
//!
//! ```rust
//! use resource_dispatch::identifier::{resolve_identifier, Describe, Fields, Identifier};
//!
//! struct Vlan {
//!     identifier: String,
//!     description: String,
//! }
//!
//! impl Describe for Vlan {
//!     fn fields(&self) -> Fields<'_> {
//!         Fields::new()
//!             .identifier("identifier", &self.identifier)
//!             .filterable("description", &self.description)
//!     }
//! }
//!
//! let vlan = Vlan { identifier: "abc".into(), description: String::new() };
//! assert_eq!(resolve_identifier(&vlan, true).unwrap(), Identifier::Text("abc".into()));
//! ```

mod resolver;
mod types;

pub use resolver::{filter_query, resolve_identifier};
pub use types::{Describe, Field, FieldTag, FieldValue, Fields, Identifier};
