//! Structural statement types built by the parser.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::TokenPosition;

/// Statement verb of a parsed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Merge,
    Exec,
    Declare,
    With,
    #[default]
    Unknown,
}

impl StatementType {
    /// Stable uppercase form used in serialized output and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::Exec => "EXEC",
            Self::Declare => "DECLARE",
            Self::With => "WITH",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for StatementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dotted object name, filled right-to-left.
///
/// The last segment is always `name`; earlier segments fill `schema`, then
/// `database`, then `server`, only as present. `a.b` therefore means
/// schema `a`, name `b` — never server `a`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualifiedName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            server: None,
            database: None,
            schema: None,
            name: name.into(),
        }
    }
}

/// One table named in a statement, with its alias and surface classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Name carries a single temp marker (`#name`).
    pub is_temp: bool,
    /// Name carries a double temp marker (`##name`).
    pub is_global_temp: bool,
    /// Name is a table variable (`@name`).
    pub is_table_variable: bool,
    /// Name resolves to a CTE visible from the current scope chain.
    pub is_cte: bool,
}

impl TableReference {
    pub fn from_qualified_name(qualified: QualifiedName) -> Self {
        Self {
            server: qualified.server,
            database: qualified.database,
            schema: qualified.schema,
            name: qualified.name,
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A labeled clause boundary within a statement's source text.
///
/// Labels are emitted in source order: `from`, then `join_1`, `on_1`,
/// `join_2`, `on_2`, …, plus `where`, `group_by`, `having` and `order_by`
/// when those clauses are present. The reformatting engine aligns its output
/// to these boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClausePosition {
    pub label: String,
    pub position: TokenPosition,
}

impl ClausePosition {
    pub fn new(label: impl Into<String>, position: TokenPosition) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }
}

/// The parsed structural record for one statement.
///
/// Built by a statement parser, finalized by the driver, immutable
/// afterwards. A chunk is always produced, even for truncated or
/// unrecognized input; the worst case is an empty table list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementChunk {
    pub statement_type: StatementType,
    /// Position of the statement's leading token.
    pub start: TokenPosition,
    /// Index of the batch this statement belongs to.
    pub batch_index: usize,
    /// Every table reference the statement queries, in source order.
    pub tables: Vec<TableReference>,
    /// Labeled clause boundaries, in source order.
    pub clause_positions: Vec<ClausePosition>,
    /// Leading reference of an UPDATE, captured optimistically; resolved by
    /// the two-phase protocol once a FROM clause is (or is not) seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_target: Option<TableReference>,
    /// Leading reference of an extended DELETE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_target: Option<TableReference>,
    /// Whether a FROM clause supplied `tables`.
    pub has_from_clause: bool,
}

impl StatementChunk {
    pub fn new(statement_type: StatementType, start: TokenPosition, batch_index: usize) -> Self {
        Self {
            statement_type,
            start,
            batch_index,
            tables: Vec::new(),
            clause_positions: Vec::new(),
            update_target: None,
            delete_target: None,
            has_from_clause: false,
        }
    }

    /// Position of a labeled clause, if that clause was seen.
    pub fn clause_position(&self, label: &str) -> Option<TokenPosition> {
        self.clause_positions
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.position)
    }

    pub fn push_clause(&mut self, label: impl Into<String>, position: TokenPosition) {
        self.clause_positions
            .push(ClausePosition::new(label, position));
    }
}
