//! Channel-based listing
//!
//! [`ObjectChannel`] delivers listed objects one at a time from a background
//! task. Each record arrives as an [`ObjectRetriever`]; the next record is
//! only offered once the previous retriever has been used or dropped, so at
//! most one record is outstanding.
//!
//! ```text
//! PageIter ──▶ producer task ──▶ mpsc(1) ──▶ ObjectRetriever ──▶ caller
//!                    ▲                              │
//!                    └──────── oneshot consumed ────┘
//! ```

mod channel;

pub use channel::{ObjectChannel, ObjectRetriever};
