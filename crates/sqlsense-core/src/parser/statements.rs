//! Statement parsers, one per leading verb, plus the dispatch table.
//!
//! Contract: a handler is given the state positioned at its verb and the
//! active scope stack, consumes exactly that statement's tokens and returns
//! a [`StatementChunk`]. Handlers never fail; truncated input yields a
//! partial chunk.

use std::sync::OnceLock;

use crate::types::{StatementChunk, StatementType, TableReference, TokenKind};

use super::clauses::{
    at_clause_terminator, consume_expression, parse_from_clause, parse_group_by_clause,
    parse_having_clause, parse_order_by_clause, parse_where_clause,
};
use super::names::{parse_qualified_name, strip_quoting};
use super::scope::ScopeStack;
use super::state::ParserState;
use super::table_ref::{at_reference_start, parse_table_reference};
use super::SET_OPERATOR_KEYWORDS;

/// A statement parser: verb keyword in, chunk out.
pub type StatementHandler =
    for<'t> fn(&mut ParserState<'t>, &mut ScopeStack) -> StatementChunk;

/// Explicit verb-to-parser dispatch table, built once at startup and passed
/// by reference. Immutable outside test setup.
pub struct StatementDispatch {
    entries: Vec<(&'static str, StatementHandler)>,
}

impl StatementDispatch {
    pub fn new() -> Self {
        Self {
            entries: vec![
                ("SELECT", parse_select as StatementHandler),
                ("INSERT", parse_insert),
                ("UPDATE", parse_update),
                ("DELETE", parse_delete),
                ("MERGE", parse_merge),
                ("EXEC", parse_exec),
                ("EXECUTE", parse_exec),
                ("DECLARE", parse_declare),
            ],
        }
    }

    pub fn get(&self, keyword: &str) -> Option<StatementHandler> {
        self.entries
            .iter()
            .find(|(verb, _)| keyword.eq_ignore_ascii_case(verb))
            .map(|(_, handler)| *handler)
    }
}

impl Default for StatementDispatch {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide dispatch table.
pub(crate) fn dispatch() -> &'static StatementDispatch {
    static DISPATCH: OnceLock<StatementDispatch> = OnceLock::new();
    DISPATCH.get_or_init(StatementDispatch::new)
}

/// Statement verbs that may follow a MERGE body. INSERT/UPDATE/DELETE are
/// excluded because they appear inside `WHEN ... THEN` arms.
const MERGE_ARM_STOP: &[&str] = &[
    "ALTER", "BEGIN", "COMMIT", "CREATE", "DECLARE", "DROP", "EXEC", "EXECUTE", "GO", "IF",
    "MERGE", "PRINT", "RETURN", "ROLLBACK", "TRUNCATE", "WHILE", "WITH",
];

/// Skips an optional `TOP (n) [PERCENT]` clause right after a verb. The
/// parenthesized form goes through the balanced-group primitive; the bare
/// `TOP 10` form is tolerated too.
pub(crate) fn skip_top_clause(state: &mut ParserState<'_>) {
    if !state.is_keyword("TOP") {
        return;
    }
    match state.peek(1) {
        Some(t) if t.is_punctuation("(") => {
            state.advance();
            state.skip_balanced_group();
        }
        Some(t) if t.kind == TokenKind::Number => {
            state.advance();
            state.advance();
        }
        _ => {
            state.advance();
        }
    }
    if state.is_keyword("PERCENT") {
        state.advance();
    }
}

/// Consumes a parenthesized subquery group: `( SELECT ... )`.
///
/// Pushes a scope frame for the body, parses the inner statement(s)
/// including set-operator branches, then consumes up to and including the
/// matching `)`. Anything the inner parser did not claim is skipped
/// opaquely, so a malformed body never escapes the group.
pub(crate) fn parse_subquery_group(state: &mut ParserState<'_>, scopes: &mut ScopeStack) {
    if !state.is_punctuation("(") {
        return;
    }
    state.advance();
    scopes.push();
    if state.is_keyword("SELECT") {
        let _inner = parse_select(state, scopes);
        while state.is_any_keyword(SET_OPERATOR_KEYWORDS) {
            state.advance();
            if state.is_keyword("ALL") {
                state.advance();
            }
            if state.is_keyword("SELECT") {
                let _branch = parse_select(state, scopes);
            }
        }
    }
    let mut depth = 1usize;
    while let Some(token) = state.current() {
        if token.is_punctuation("(") {
            depth += 1;
        } else if token.is_punctuation(")") {
            depth -= 1;
            if depth == 0 {
                break;
            }
        }
        state.advance();
    }
    scopes.pop();
    if state.is_punctuation(")") {
        state.advance();
    }
}

fn new_chunk(
    statement_type: StatementType,
    state: &ParserState<'_>,
    scopes: &mut ScopeStack,
) -> StatementChunk {
    scopes.set_statement_type(statement_type);
    StatementChunk::new(statement_type, state.position(), state.batch_index())
}

/// Shared SELECT body: select list, INTO target, FROM and trailing clauses.
/// Appends into `chunk` so `INSERT ... SELECT` reuses it for its own chunk.
pub(crate) fn parse_select_body(
    state: &mut ParserState<'_>,
    scopes: &mut ScopeStack,
    chunk: &mut StatementChunk,
) {
    if state.is_keyword("SELECT") {
        state.advance();
    }
    if state.is_keyword("DISTINCT") || state.is_keyword("ALL") {
        state.advance();
    }
    skip_top_clause(state);
    consume_expression(state, scopes, false, false);

    if state.is_keyword("INTO") {
        state.advance();
        if let Some(reference) = parse_table_reference(state, scopes) {
            scopes.add_table(reference.clone());
            chunk.tables.push(reference);
        }
    }
    if state.is_keyword("FROM") {
        let from = parse_from_clause(state, scopes);
        chunk.tables.extend(from.tables);
        chunk.clause_positions.extend(from.clause_positions);
        chunk.has_from_clause = true;
    }
    loop {
        if state.is_keyword("WHERE") {
            parse_where_clause(state, scopes, chunk);
        } else if state.is_keyword("GROUP") {
            parse_group_by_clause(state, scopes, chunk);
        } else if state.is_keyword("HAVING") {
            parse_having_clause(state, scopes, chunk);
        } else if state.is_keyword("ORDER") {
            parse_order_by_clause(state, scopes, chunk);
        } else {
            break;
        }
    }
}

fn parse_select(state: &mut ParserState<'_>, scopes: &mut ScopeStack) -> StatementChunk {
    let mut chunk = new_chunk(StatementType::Select, state, scopes);
    parse_select_body(state, scopes, &mut chunk);
    chunk
}

fn parse_insert(state: &mut ParserState<'_>, scopes: &mut ScopeStack) -> StatementChunk {
    let mut chunk = new_chunk(StatementType::Insert, state, scopes);
    state.advance(); // INSERT
    if state.is_keyword("INTO") {
        state.advance();
    }
    if let Some(reference) = parse_table_reference(state, scopes) {
        scopes.add_table(reference.clone());
        chunk.tables.push(reference);
    }
    if state.is_punctuation("(") {
        state.skip_balanced_group();
    }
    if state.is_keyword("VALUES") {
        state.advance();
        loop {
            if state.is_punctuation("(") {
                state.skip_balanced_group();
            }
            if state.is_punctuation(",") {
                state.advance();
            } else {
                break;
            }
        }
    } else if state.is_keyword("SELECT") {
        parse_select_body(state, scopes, &mut chunk);
    } else if state.is_keyword("EXEC") || state.is_keyword("EXECUTE") {
        state.advance();
        parse_exec_body(state, scopes);
    }
    chunk
}

/// UPDATE phase 1: the leading reference is captured optimistically into
/// `update_target` — in `UPDATE alias SET ... FROM table alias` it is an
/// alias, not the table, which phase 2 resolves once FROM is seen.
fn parse_update(state: &mut ParserState<'_>, scopes: &mut ScopeStack) -> StatementChunk {
    let mut chunk = new_chunk(StatementType::Update, state, scopes);
    state.advance(); // UPDATE
    skip_top_clause(state);
    chunk.update_target = parse_table_reference(state, scopes);

    if state.is_keyword("SET") {
        state.advance();
    }
    consume_expression(state, scopes, false, false);

    if state.is_keyword("FROM") {
        apply_from_phase(state, scopes, &mut chunk);
    }
    parse_where_clause(state, scopes, &mut chunk);
    if !chunk.has_from_clause {
        if let Some(target) = &chunk.update_target {
            scopes.add_table(target.clone());
        }
    }
    chunk
}

fn parse_delete(state: &mut ParserState<'_>, scopes: &mut ScopeStack) -> StatementChunk {
    let mut chunk = new_chunk(StatementType::Delete, state, scopes);
    state.advance(); // DELETE
    skip_top_clause(state);

    if state.is_keyword("FROM") {
        // Simple form: DELETE FROM t — the FROM clause supplies the target.
        apply_from_phase(state, scopes, &mut chunk);
    } else {
        // Extended form phase 1: the leading name is an alias into a FROM
        // clause that has not been seen yet, so it lands in `alias`.
        chunk.delete_target = parse_table_reference(state, scopes).map(|mut target| {
            if target.alias.is_none()
                && target.schema.is_none()
                && target.database.is_none()
                && target.server.is_none()
            {
                target.alias = Some(target.name.clone());
            }
            target
        });
        consume_expression(state, scopes, false, false);
        if state.is_keyword("FROM") {
            apply_from_phase(state, scopes, &mut chunk);
        }
    }
    parse_where_clause(state, scopes, &mut chunk);
    chunk
}

/// Phase 2 of the UPDATE/DELETE protocol: a FROM clause was encountered, so
/// its result replaces the chunk's table list.
pub(crate) fn apply_from_phase(
    state: &mut ParserState<'_>,
    scopes: &mut ScopeStack,
    chunk: &mut StatementChunk,
) {
    let from = parse_from_clause(state, scopes);
    chunk.tables = from.tables;
    chunk.clause_positions.extend(from.clause_positions);
    chunk.has_from_clause = true;
}

fn parse_merge(state: &mut ParserState<'_>, scopes: &mut ScopeStack) -> StatementChunk {
    let mut chunk = new_chunk(StatementType::Merge, state, scopes);
    state.advance(); // MERGE
    skip_top_clause(state);
    if state.is_keyword("INTO") {
        state.advance();
    }
    if let Some(target) = parse_table_reference(state, scopes) {
        scopes.add_table(target.clone());
        chunk.tables.push(target);
    }
    if state.is_keyword("USING") {
        state.advance();
        if state.is_punctuation("(") {
            parse_subquery_group(state, scopes);
            if let Some(alias) = super::names::parse_alias(state) {
                let reference = TableReference::named(alias);
                scopes.add_table(reference.clone());
                chunk.tables.push(reference);
            }
        } else if let Some(source) = parse_table_reference(state, scopes) {
            scopes.add_table(source.clone());
            chunk.tables.push(source);
        }
    }
    if state.is_keyword("ON") {
        chunk.push_clause("on_1", state.position());
        state.advance();
        while !at_clause_terminator(state) && !state.is_keyword("WHEN") {
            if state.is_punctuation("(") {
                state.skip_balanced_group();
            } else {
                state.advance();
            }
        }
    }
    // WHEN ... THEN arms, consumed opaquely; they contain INSERT/UPDATE/
    // DELETE keywords so the generic statement-verb stops don't apply.
    while !state.at_end()
        && !state.is_punctuation(";")
        && !state.is_any_keyword(MERGE_ARM_STOP)
    {
        if state.is_punctuation("(") {
            state.skip_balanced_group();
        } else {
            state.advance();
        }
    }
    chunk
}

fn parse_exec(state: &mut ParserState<'_>, scopes: &mut ScopeStack) -> StatementChunk {
    let chunk = new_chunk(StatementType::Exec, state, scopes);
    state.advance(); // EXEC | EXECUTE
    parse_exec_body(state, scopes);
    chunk
}

/// Consumes an optional `@ret =` assignment, the procedure name and the
/// argument list. The procedure name is not a table and is not recorded.
fn parse_exec_body(state: &mut ParserState<'_>, scopes: &mut ScopeStack) {
    let _ = scopes;
    if state
        .current()
        .is_some_and(|t| t.kind == TokenKind::Identifier && t.text.starts_with('@'))
        && state.peek(1).is_some_and(|t| t.text == "=")
    {
        state.advance();
        state.advance();
    }
    if at_reference_start(state) {
        let _procedure = parse_qualified_name(state);
    }
    while !state.at_end()
        && !state.is_punctuation(";")
        && !state.is_any_keyword(super::STATEMENT_KEYWORDS)
    {
        if state.is_punctuation("(") {
            state.skip_balanced_group();
        } else {
            state.advance();
        }
    }
}

fn parse_declare(state: &mut ParserState<'_>, scopes: &mut ScopeStack) -> StatementChunk {
    let mut chunk = new_chunk(StatementType::Declare, state, scopes);
    state.advance(); // DECLARE
    loop {
        let Some(token) = state.current() else { break };
        if token.kind != TokenKind::Identifier || !token.text.starts_with('@') {
            break;
        }
        let name = strip_quoting(&token.text);
        state.advance();
        if state.is_keyword("AS") {
            state.advance();
        }
        if state.is_keyword("TABLE") {
            state.advance();
            if state.is_punctuation("(") {
                state.skip_balanced_group();
            }
            let mut reference = TableReference::named(name);
            reference.is_table_variable = true;
            // Table variables stay visible for the rest of the batch.
            scopes.add_table_at_root(reference.clone());
            chunk.tables.push(reference);
        } else {
            while !at_clause_terminator(state) && !state.is_punctuation(",") {
                if state.is_punctuation("(") {
                    state.skip_balanced_group();
                } else {
                    state.advance();
                }
            }
        }
        if state.is_punctuation(",") {
            state.advance();
        } else {
            break;
        }
    }
    chunk
}

/// Fallback for verbs with no registered parser: consume the statement's
/// tokens opaquely up to the next statement boundary.
pub(crate) fn skip_unknown_statement(
    state: &mut ParserState<'_>,
    scopes: &mut ScopeStack,
    statement_type: StatementType,
) -> StatementChunk {
    let chunk = new_chunk(statement_type, state, scopes);
    let mut first = true;
    while let Some(token) = state.current() {
        if token.is_punctuation(";") {
            break;
        }
        if !first && token.is_any_keyword(super::STATEMENT_KEYWORDS) {
            break;
        }
        if token.is_punctuation("(") {
            state.skip_balanced_group();
        } else {
            state.advance();
        }
        first = false;
    }
    chunk
}

/// Driver-invoked finalize step. UPDATE only: when no FROM clause was found
/// the optimistic target is the queried table, so it joins `tables`; with a
/// FROM clause this is a no-op. An extended DELETE without FROM leaves
/// `delete_target` unmerged.
pub(crate) fn finalize_statement(chunk: &mut StatementChunk) {
    if chunk.statement_type == StatementType::Update && !chunk.has_from_clause {
        if let Some(target) = chunk.update_target.clone() {
            chunk.tables.push(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn run(sql: &str, handler: StatementHandler) -> StatementChunk {
        let tokens = tokenize(sql);
        let mut state = ParserState::new(&tokens);
        let mut scopes = ScopeStack::new();
        scopes.push();
        handler(&mut state, &mut scopes)
    }

    #[test]
    fn dispatch_table_resolves_verbs_case_insensitively() {
        let table = StatementDispatch::new();
        assert!(table.get("select").is_some());
        assert!(table.get("ExEc").is_some());
        assert!(table.get("EXECUTE").is_some());
        assert!(table.get("GRANT").is_none());
    }

    #[test]
    fn select_with_top_and_clauses() {
        let chunk = run(
            "SELECT TOP (10) PERCENT a, b FROM t WHERE a > 1 GROUP BY a HAVING COUNT(*) > 1 ORDER BY a",
            |s, sc| dispatch().get("SELECT").unwrap()(s, sc),
        );
        assert_eq!(chunk.statement_type, StatementType::Select);
        assert_eq!(chunk.tables.len(), 1);
        let labels: Vec<_> = chunk
            .clause_positions
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(labels, vec!["from", "where", "group_by", "having", "order_by"]);
    }

    #[test]
    fn select_into_records_target() {
        let chunk = run("SELECT a INTO #staging FROM src", parse_select);
        let names: Vec<_> = chunk.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["#staging", "src"]);
        assert!(chunk.tables[0].is_temp);
    }

    #[test]
    fn insert_values() {
        let chunk = run("INSERT INTO dbo.T (a, b) VALUES (1, 2), (3, 4)", parse_insert);
        assert_eq!(chunk.statement_type, StatementType::Insert);
        assert_eq!(chunk.tables.len(), 1);
        assert_eq!(chunk.tables[0].name, "T");
    }

    #[test]
    fn insert_select_reuses_select_body() {
        let chunk = run("INSERT T SELECT x FROM src WHERE x > 0", parse_insert);
        let names: Vec<_> = chunk.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["T", "src"]);
        assert!(chunk.has_from_clause);
    }

    #[test]
    fn simple_update_before_finalize_has_no_tables() {
        let chunk = run("UPDATE Employees SET x = 1", parse_update);
        assert!(chunk.tables.is_empty());
        assert_eq!(chunk.update_target.as_ref().unwrap().name, "Employees");
        assert!(!chunk.has_from_clause);
    }

    #[test]
    fn simple_update_finalize_appends_target() {
        let mut chunk = run("UPDATE Employees SET x = 1", parse_update);
        finalize_statement(&mut chunk);
        assert_eq!(chunk.tables.len(), 1);
        assert_eq!(chunk.tables[0].name, "Employees");
    }

    #[test]
    fn extended_update_replaces_tables_and_finalize_is_a_noop() {
        let mut chunk = run("UPDATE e SET x = 1 FROM Employees e", parse_update);
        assert!(chunk.has_from_clause);
        assert_eq!(chunk.tables.len(), 1);
        assert_eq!(chunk.tables[0].name, "Employees");
        assert_eq!(chunk.tables[0].alias.as_deref(), Some("e"));
        let before = chunk.clone();
        finalize_statement(&mut chunk);
        assert_eq!(chunk, before);
    }

    #[test]
    fn simple_delete_has_no_target() {
        let chunk = run("DELETE FROM Employees WHERE x = 1", parse_delete);
        assert!(chunk.delete_target.is_none());
        assert_eq!(chunk.tables.len(), 1);
        assert_eq!(chunk.tables[0].name, "Employees");
    }

    #[test]
    fn extended_delete_two_phase() {
        let chunk = run("DELETE e FROM Employees e WHERE e.x = 1", parse_delete);
        assert_eq!(chunk.delete_target.as_ref().unwrap().alias.as_deref(), Some("e"));
        assert!(chunk.has_from_clause);
        assert_eq!(chunk.tables.len(), 1);
        assert_eq!(chunk.tables[0].name, "Employees");
        assert_eq!(chunk.tables[0].alias.as_deref(), Some("e"));
    }

    #[test]
    fn extended_delete_without_from_keeps_target_unmerged() {
        let mut chunk = run("DELETE e", parse_delete);
        assert_eq!(chunk.delete_target.as_ref().unwrap().alias.as_deref(), Some("e"));
        finalize_statement(&mut chunk);
        assert!(chunk.tables.is_empty());
    }

    #[test]
    fn merge_records_target_and_source() {
        let chunk = run(
            "MERGE INTO T t USING S s ON t.id = s.id WHEN MATCHED THEN UPDATE SET t.x = s.x;",
            parse_merge,
        );
        let names: Vec<_> = chunk.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["T", "S"]);
        assert!(chunk.clause_position("on_1").is_some());
    }

    #[test]
    fn declare_table_variable() {
        let chunk = run("DECLARE @tv TABLE (id INT), @x INT", parse_declare);
        assert_eq!(chunk.tables.len(), 1);
        assert_eq!(chunk.tables[0].name, "@tv");
        assert!(chunk.tables[0].is_table_variable);
    }

    #[test]
    fn unknown_statement_consumes_to_boundary() {
        let tokens = tokenize("CREATE NONCLUSTERED INDEX ix ON t (a) SELECT 1");
        let mut state = ParserState::new(&tokens);
        let mut scopes = ScopeStack::new();
        scopes.push();
        let chunk = skip_unknown_statement(&mut state, &mut scopes, StatementType::Unknown);
        assert_eq!(chunk.statement_type, StatementType::Unknown);
        assert!(state.is_keyword("SELECT"));
    }
}
