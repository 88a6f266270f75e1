//! The incremental statement parser.
//!
//! The driver splits the token stream into batches (`GO`) and statements
//! (`;` or a new verb), dispatches each statement to its parser, manages
//! the scope stack and finalizes the resulting chunks. Parsing never fails:
//! any input — truncated, invalid, or not SQL at all — produces a
//! best-effort list of statement chunks.

mod clauses;
mod names;
mod scope;
mod state;
mod statements;
mod table_ref;


pub use clauses::{
    parse_from_clause, parse_group_by_clause, parse_having_clause, parse_order_by_clause,
    parse_where_clause, FromClause,
};
pub use names::{parse_alias, parse_qualified_name};
pub use scope::{ScopeFrame, ScopeStack};
pub use state::{Mark, ParserState};
pub use statements::{StatementDispatch, StatementHandler};
pub use table_ref::{parse_table_reference, parse_table_reference_with_ctes};

use crate::error::ParseFault;
use crate::tokenizer::tokenize;
use crate::types::{ParsedScript, StatementChunk, StatementType, Token, TokenKind};

#[cfg(feature = "tracing")]
use tracing::trace;

/// Keywords that terminate any clause without being consumed by it.
pub(crate) const CLAUSE_TERMINATOR_KEYWORDS: &[&str] = &[
    "EXCEPT", "FROM", "GROUP", "HAVING", "INTERSECT", "INTO", "ORDER", "UNION", "WHERE",
];

/// Keywords that can open a join phrase.
pub(crate) const JOIN_START_KEYWORDS: &[&str] = &[
    "APPLY", "CROSS", "FULL", "INNER", "JOIN", "LEFT", "NATURAL", "OUTER", "RIGHT",
];

pub(crate) const SET_OPERATOR_KEYWORDS: &[&str] = &["EXCEPT", "INTERSECT", "UNION"];

/// Keywords that can only start or continue a subsequent clause; a bare
/// identifier position holding one of these is never an alias.
pub(crate) const CLAUSE_BOUNDARY_KEYWORDS: &[&str] = &[
    "APPLY", "AS", "BY", "CROSS", "EXCEPT", "FROM", "FULL", "GROUP", "HAVING", "INNER",
    "INTERSECT", "INTO", "JOIN", "LEFT", "NATURAL", "ON", "ORDER", "OUTER", "RIGHT", "SET",
    "THEN", "UNION", "USING", "VALUES", "WHEN", "WHERE",
];

/// Keywords that can start a statement; seeing one mid-clause means the
/// clause (and statement) ended earlier than its grammar wanted.
pub(crate) const STATEMENT_KEYWORDS: &[&str] = &[
    "ALTER", "BEGIN", "COMMIT", "CREATE", "DECLARE", "DELETE", "DROP", "EXEC", "EXECUTE", "GO",
    "IF", "INSERT", "MERGE", "PRINT", "RETURN", "ROLLBACK", "SELECT", "SET", "TRUNCATE", "UPDATE",
    "WHILE", "WITH",
];

/// Everything one parse run produced, including the scope arena the
/// classifier reads. Internal; the public surfaces are [`ParsedScript`] and
/// [`crate::types::CompletionContext`].
pub(crate) struct Parsed {
    pub tokens: Vec<Token>,
    pub chunks: Vec<StatementChunk>,
    pub scopes: ScopeStack,
    /// Arena index of the scope frame each chunk was parsed under.
    pub chunk_frames: Vec<usize>,
}

/// Parses `sql` into tokens and ordered statement chunks. Never fails.
pub fn parse_sql(sql: &str) -> ParsedScript {
    let parsed = parse_internal(sql);
    ParsedScript {
        tokens: parsed.tokens,
        statements: parsed.chunks,
    }
}

pub(crate) fn parse_internal(sql: &str) -> Parsed {
    let tokens = tokenize(sql);
    #[cfg(feature = "tracing")]
    trace!(tokens = tokens.len(), "parse run");

    let dispatch = statements::dispatch();
    let mut state = ParserState::new(&tokens);
    let mut scopes = ScopeStack::new();
    scopes.push(); // batch root, holds table variables
    let mut chunks = Vec::new();
    let mut chunk_frames = Vec::new();

    while !state.at_end() {
        state.skip_statement_terminators();
        if state.at_end() {
            break;
        }
        if state.is_keyword("GO") {
            state.advance();
            state.next_batch();
            scopes.pop();
            scopes.push(); // fresh batch root
            continue;
        }

        let before = state.cursor();
        let frame = scopes.push();
        let had_with = state.is_keyword("WITH");
        if had_with {
            parse_with_prologue(&mut state, &mut scopes);
        }
        loop {
            let handler = state
                .current()
                .filter(|t| t.kind == TokenKind::Keyword)
                .and_then(|t| dispatch.get(&t.text));
            let mut chunk = match handler {
                Some(handler) => handler(&mut state, &mut scopes),
                None => {
                    let fallback = if had_with {
                        StatementType::With
                    } else {
                        StatementType::Unknown
                    };
                    statements::skip_unknown_statement(&mut state, &mut scopes, fallback)
                }
            };
            statements::finalize_statement(&mut chunk);
            #[cfg(feature = "tracing")]
            trace!(statement = %chunk.statement_type, tables = chunk.tables.len(), "finalized chunk");
            chunks.push(chunk);
            chunk_frames.push(frame);

            // Set-operator branches share the statement's scope frame so a
            // WITH prologue covers every branch.
            if state.is_any_keyword(SET_OPERATOR_KEYWORDS) {
                state.advance();
                if state.is_keyword("ALL") {
                    state.advance();
                }
                continue;
            }
            break;
        }
        scopes.pop();

        if state.cursor() == before {
            // Progress guard: a handler consumed nothing.
            let fault = ParseFault::CursorStalled {
                at: before,
                context: "statement driver",
            };
            #[cfg(feature = "tracing")]
            trace!(%fault, "forcing progress");
            let _ = fault;
            state.advance();
        }
    }

    Parsed {
        tokens,
        chunks,
        scopes,
        chunk_frames,
    }
}

/// Parses a `WITH name [(cols)] AS ( body ) [, ...]` prologue. CTE names go
/// into the current statement frame; each body gets its own child frame, so
/// earlier CTEs (and the CTE itself, for the recursive form) are visible
/// inside later bodies but never in sibling statements.
fn parse_with_prologue(state: &mut ParserState<'_>, scopes: &mut ScopeStack) {
    scopes.set_statement_type(StatementType::With);
    state.advance(); // WITH
    loop {
        if !(state.is_type(TokenKind::Identifier) || state.is_type(TokenKind::BracketId)) {
            break;
        }
        let name = state
            .advance()
            .map(|t| names::strip_quoting(&t.text))
            .unwrap_or_default();
        scopes.add_cte(&name);
        if state.is_punctuation("(") {
            state.skip_balanced_group(); // column list
        }
        if state.is_keyword("AS") {
            state.advance();
        }
        if state.is_punctuation("(") {
            statements::parse_subquery_group(state, scopes);
        }
        if state.is_punctuation(",") {
            state.advance();
        } else {
            break;
        }
    }
}
