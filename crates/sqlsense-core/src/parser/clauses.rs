//! Clause parsers: FROM (with joins), WHERE, GROUP BY, HAVING, ORDER BY.
//!
//! Each parser consumes its clause's tokens and terminates — without
//! consuming the terminator — on a following clause keyword, a set
//! operator, statement-ending punctuation, a closing parenthesis (end of an
//! enclosing subquery), end of batch, or a new statement verb.

use crate::types::{ClausePosition, StatementChunk, TableReference};

use super::names::parse_alias;
use super::scope::ScopeStack;
use super::state::ParserState;
use super::statements::parse_subquery_group;
use super::table_ref::{at_reference_start, parse_table_reference};
use super::{CLAUSE_TERMINATOR_KEYWORDS, JOIN_START_KEYWORDS, STATEMENT_KEYWORDS};

#[cfg(feature = "tracing")]
use tracing::trace;

/// Result of parsing one FROM clause: the referenced tables in source order
/// and a labeled position for FROM itself and every JOIN/ON keyword.
#[derive(Debug, Clone, Default)]
pub struct FromClause {
    pub tables: Vec<TableReference>,
    pub clause_positions: Vec<ClausePosition>,
}

/// Whether the current token ends the clause being parsed.
pub(crate) fn at_clause_terminator(state: &ParserState<'_>) -> bool {
    state.at_end()
        || state.is_punctuation(";")
        || state.is_punctuation(")")
        || state.is_any_keyword(CLAUSE_TERMINATOR_KEYWORDS)
        || state.is_any_keyword(STATEMENT_KEYWORDS)
}

fn at_join_start(state: &ParserState<'_>) -> bool {
    state.is_any_keyword(JOIN_START_KEYWORDS)
}

/// Whether a parenthesized group at the cursor opens a subquery.
pub(crate) fn subquery_ahead(state: &ParserState<'_>) -> bool {
    state.is_punctuation("(") && state.peek(1).is_some_and(|t| t.is_keyword("SELECT"))
}

/// Consumes expression tokens until a clause terminator, recursing into
/// subqueries (with a pushed scope frame) and skipping other parenthesized
/// groups whole. `stop_at_join` / `stop_at_comma` additionally end the
/// expression at a join keyword or list comma, used for ON predicates.
pub(crate) fn consume_expression(
    state: &mut ParserState<'_>,
    scopes: &mut ScopeStack,
    stop_at_join: bool,
    stop_at_comma: bool,
) {
    loop {
        if at_clause_terminator(state) {
            return;
        }
        if stop_at_join && at_join_start(state) {
            return;
        }
        if state.is_keyword("ON") && stop_at_join {
            return;
        }
        if stop_at_comma && state.is_punctuation(",") {
            return;
        }
        if state.is_punctuation("(") {
            if subquery_ahead(state) {
                parse_subquery_group(state, scopes);
            } else {
                state.skip_balanced_group();
            }
            continue;
        }
        state.advance();
    }
}

/// Parses a comma-joined and/or explicitly JOIN-ed table reference list.
///
/// Join and ON positions are numbered sequentially in source order
/// (`join_1`, `on_1`, `join_2`, `on_2`, …) so the reformatting engine can
/// align to exact clause boundaries. Unparsable fragments are skipped
/// opaquely; tables recognized before them are kept.
pub fn parse_from_clause(state: &mut ParserState<'_>, scopes: &mut ScopeStack) -> FromClause {
    let mut clause = FromClause::default();
    if !state.is_keyword("FROM") {
        return clause;
    }
    clause
        .clause_positions
        .push(ClausePosition::new("from", state.position()));
    state.advance();

    let mut join_count = 0usize;
    let mut on_count = 0usize;
    parse_reference_item(state, scopes, &mut clause);
    loop {
        if state.is_punctuation(",") {
            state.advance();
            parse_reference_item(state, scopes, &mut clause);
            continue;
        }
        if at_join_start(state) {
            join_count += 1;
            clause
                .clause_positions
                .push(ClausePosition::new(format!("join_{join_count}"), state.position()));
            consume_join_phrase(state);
            parse_reference_item(state, scopes, &mut clause);
            continue;
        }
        if state.is_keyword("ON") {
            on_count += 1;
            clause
                .clause_positions
                .push(ClausePosition::new(format!("on_{on_count}"), state.position()));
            state.advance();
            consume_expression(state, scopes, true, true);
            continue;
        }
        if at_clause_terminator(state) {
            break;
        }
        // Unsupported construct: skip it opaquely and keep what we have.
        #[cfg(feature = "tracing")]
        trace!(token = ?state.current().map(|t| &t.text), "skipping unrecognized from-clause token");
        if state.is_punctuation("(") {
            state.skip_balanced_group();
        } else {
            state.advance();
        }
    }
    clause
}

/// Consumes a join phrase: any of INNER/LEFT/RIGHT/FULL/OUTER/CROSS/NATURAL
/// followed by JOIN or APPLY.
fn consume_join_phrase(state: &mut ParserState<'_>) {
    while state.is_any_keyword(&["INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "NATURAL"]) {
        state.advance();
    }
    if state.is_keyword("JOIN") || state.is_keyword("APPLY") {
        state.advance();
    }
}

/// Parses one item of a FROM list: a table reference, or a derived table /
/// parenthesized group with an optional alias. An item that cannot be
/// parsed yet (mid-keystroke) contributes nothing and consumes nothing.
fn parse_reference_item(
    state: &mut ParserState<'_>,
    scopes: &mut ScopeStack,
    clause: &mut FromClause,
) {
    if state.is_punctuation("(") {
        if subquery_ahead(state) {
            parse_subquery_group(state, scopes);
        } else {
            state.skip_balanced_group();
        }
        if let Some(alias) = parse_alias(state) {
            // The derived table is addressable only through its alias.
            let reference = TableReference::named(alias);
            scopes.add_table(reference.clone());
            clause.tables.push(reference);
        }
        return;
    }
    if !at_reference_start(state) {
        return;
    }
    if let Some(reference) = parse_table_reference(state, scopes) {
        scopes.add_table(reference.clone());
        clause.tables.push(reference);
    }
}

/// Parses a WHERE clause into the chunk: records the `where` position and
/// consumes the predicate.
pub fn parse_where_clause(
    state: &mut ParserState<'_>,
    scopes: &mut ScopeStack,
    chunk: &mut StatementChunk,
) {
    if !state.is_keyword("WHERE") {
        return;
    }
    chunk.push_clause("where", state.position());
    state.advance();
    consume_expression(state, scopes, false, false);
}

/// Parses a GROUP BY clause: records the `group_by` position at GROUP and
/// consumes the grouping list.
pub fn parse_group_by_clause(
    state: &mut ParserState<'_>,
    scopes: &mut ScopeStack,
    chunk: &mut StatementChunk,
) {
    if !state.is_keyword("GROUP") {
        return;
    }
    chunk.push_clause("group_by", state.position());
    state.advance();
    if state.is_keyword("BY") {
        state.advance();
    }
    consume_expression(state, scopes, false, false);
}

/// Parses a HAVING clause.
pub fn parse_having_clause(
    state: &mut ParserState<'_>,
    scopes: &mut ScopeStack,
    chunk: &mut StatementChunk,
) {
    if !state.is_keyword("HAVING") {
        return;
    }
    chunk.push_clause("having", state.position());
    state.advance();
    consume_expression(state, scopes, false, false);
}

/// Parses an ORDER BY clause.
pub fn parse_order_by_clause(
    state: &mut ParserState<'_>,
    scopes: &mut ScopeStack,
    chunk: &mut StatementChunk,
) {
    if !state.is_keyword("ORDER") {
        return;
    }
    chunk.push_clause("order_by", state.position());
    state.advance();
    if state.is_keyword("BY") {
        state.advance();
    }
    consume_expression(state, scopes, false, false);
}
