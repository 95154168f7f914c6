//! Operation options
//!
//! Every operation takes its own options type. All of them wrap an
//! [`OptionsBag`] for caller-defined extension keys; [`ListOptions`]
//! additionally carries the built-in paging and delivery knobs.
//!
//! Keys are set once: a second `set` for the same key fails unless the
//! caller explicitly asks to overwrite.

mod types;

pub use types::{
    CreateOptions, DestroyOptions, GetOptions, ListOptions, OperationOptions, OptionsBag, Paging,
    UpdateOptions,
};
