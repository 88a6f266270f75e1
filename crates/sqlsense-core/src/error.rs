//! Internal fault type for the parsing core.
//!
//! # Error Handling Strategy
//!
//! The public entry points ([`crate::parse_sql`], [`crate::completion_context`],
//! [`crate::tokenize`]) never return `Err` and never panic: the input is
//! whatever the user has typed so far, so truncated and invalid text is the
//! normal case, not an error. Every parse function guarantees forward
//! progress and returns a best-effort partial result.
//!
//! [`ParseFault`] exists for the two situations worth telling apart
//! internally:
//!
//! - [`ParseFault::EmptyConstruct`]: a construct yielded nothing (e.g. a
//!   FROM clause with no parsable reference). Expected on partial input;
//!   the enclosing parser continues with what it has.
//!
//! - [`ParseFault::CursorStalled`]: a parser returned without consuming a
//!   token. This is a programmer error guard — the driver logs it, force-
//!   advances one token and keeps going, so a bug degrades output instead
//!   of hanging the editor.

use thiserror::Error;

/// A non-fatal fault raised inside the parsing core.
///
/// Faults are logged (under the `tracing` feature) and absorbed before the
/// public boundary; callers only ever see partial results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseFault {
    /// A construct produced no usable result at the given token index.
    #[error("construct produced no result at token {at}")]
    EmptyConstruct { at: usize },

    /// A parser failed to advance the cursor at the given token index.
    #[error("parser stalled at token {at} in {context}")]
    CursorStalled { at: usize, context: &'static str },
}

impl ParseFault {
    /// Whether this fault is expected on partial input (as opposed to a
    /// progress-guard trip).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyConstruct { .. })
    }
}
