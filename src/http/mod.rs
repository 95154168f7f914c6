//! HTTP transport module
//!
//! The dispatcher only needs "execute this request, give me the response or
//! a transport error". That contract is the [`Transport`] trait;
//! [`HttpClient`] is the reqwest-backed implementation.
//!
//! # Features
//!
//! - **Buffered responses**: bodies are read fully into [`ApiResponse`]
//! - **Default headers**: applied to every request unless already set
//! - **Timeouts**: owned by the transport, never by the engine
//!
//! Authentication, retries and rate limiting are left to custom
//! [`Transport`] implementations.

mod client;
mod response;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, Transport};
pub use response::{ApiResponse, JSON_MEDIA_TYPE};
