//! Resource capability protocol
//!
//! A resource description is any type implementing [`Object`]. The only
//! required capability is resolving the endpoint for an operation; every
//! other step of the pipeline can be customized by implementing one of the
//! hook traits and returning it from the matching `as_*` accessor:
//!
//! | Hook                       | Customizes                                  |
//! |----------------------------|---------------------------------------------|
//! | [`RequestUrlHook`]         | the composed request URL                    |
//! | [`RequestBodyHook`]        | the Create/Update body (default: `self`)    |
//! | [`RequestFilterHook`]      | the finished request before it is sent      |
//! | [`ResponseFilterHook`]     | the response before it is classified        |
//! | [`ResponseDecodeHook`]     | decoding (default: JSON into `self`)        |
//! | [`PaginationSupportHook`]  | whether List requests are paged at all      |
//!
//! The dispatcher queries each capability at call time, so implementing a
//! hook never requires touching a type hierarchy.

mod dynamic;
mod hooks;
mod types;

pub use dynamic::DynamicResource;
pub use hooks::{
    decode_object, PaginationSupportHook, RequestBodyHook, RequestFilterHook, RequestUrlHook,
    ResponseDecodeHook, ResponseFilterHook,
};
pub use types::{Endpoint, Object};
