//! Types on the completion-provider and reformatter boundaries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{StatementChunk, StatementType, TableReference, Token};

/// What kind of suggestion the cursor position calls for.
///
/// This is the closed set of completion modes the classifier can produce;
/// completion providers dispatch on it and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// Empty input, or a fresh statement position.
    Start,
    /// In a select list, right after SELECT or a list comma.
    AfterSelect,
    /// Inside a function call in a select list.
    SelectFunction,
    /// Right after FROM, expecting a table name.
    AfterFrom,
    /// Typing `alias.` or a dotted name inside a FROM clause.
    FromQualified,
    /// Inside a function call in a FROM clause (table-valued function).
    FromFunction,
    /// Right after WHERE, expecting a predicate.
    AfterWhere,
    /// Right after a JOIN keyword, expecting a table name.
    AfterJoin,
    /// Typing a dotted name inside a JOIN segment.
    JoinQualified,
    /// Inside an EXEC statement, expecting a procedure name or arguments.
    Exec,
    /// No more specific mode applies.
    #[default]
    Default,
}

/// Read-only view of the names resolvable at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSnapshot {
    /// CTE names visible from the cursor's scope chain, sorted.
    pub ctes: Vec<String>,
    /// Table references accumulated along the scope chain, in source order.
    pub visible_tables: Vec<TableReference>,
    pub statement_type: StatementType,
}

/// The full payload handed to completion providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionContext {
    pub mode: CompletionMode,
    pub scope: ScopeSnapshot,
    pub statements: Vec<StatementChunk>,
}

impl CompletionContext {
    /// Context for input with nothing actionable at the cursor.
    pub fn start() -> Self {
        Self {
            mode: CompletionMode::Start,
            scope: ScopeSnapshot::default(),
            statements: Vec::new(),
        }
    }
}

/// The full parse of one input snapshot.
///
/// `tokens` plus the per-chunk clause positions are the surface shared with
/// the reformatting engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedScript {
    pub tokens: Vec<Token>,
    pub statements: Vec<StatementChunk>,
}
