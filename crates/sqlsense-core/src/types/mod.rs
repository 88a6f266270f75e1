//! Types for the incremental SQL parsing API.
//!
//! This module defines the token stream handed to the reformatting engine and
//! the statement/scope/completion types handed to completion providers. All
//! result types are plain data: they are built fresh on every parse trigger
//! and never mutated after the driver finalizes them.

mod completion;
mod statement;
mod token;

// Re-export all public types
pub use completion::{CompletionContext, CompletionMode, ParsedScript, ScopeSnapshot};
pub use statement::{
    ClausePosition, QualifiedName, StatementChunk, StatementType, TableReference,
};
pub use token::{Token, TokenKind, TokenPosition};
