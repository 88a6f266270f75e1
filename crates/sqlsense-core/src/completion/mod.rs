//! Cursor-position context classification.
//!
//! Maps a cursor position plus the terminal parser state onto a completion
//! mode. `{mode, scope, statements}` is the sole interface exposed to
//! completion providers.

mod context;

pub use context::completion_context;
