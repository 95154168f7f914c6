//! CLI module
//!
//! Command-line interface driving the engine with [`crate::DynamicResource`].
//!
//! # Commands
//!
//! - `get` - Fetch one resource by identifier
//! - `create` - Create a resource from JSON attributes
//! - `update` - Replace a resource's attributes
//! - `destroy` - Delete a resource
//! - `list` - List a collection, paged or streamed

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
