use rstest::rstest;
use sqlsense_core::{completion_context, CompletionMode};

/// Runs the classifier with the cursor at the end of `sql`, on line 1.
fn mode_at_end(sql: &str) -> CompletionMode {
    assert!(!sql.contains('\n'), "single-line helper");
    completion_context(sql, 1, sql.chars().count() as u32 + 1).mode
}

#[rstest]
#[case("", CompletionMode::Start)]
#[case("  ", CompletionMode::Start)]
#[case("SELECT 1; ", CompletionMode::Start)]
#[case("SELECT ", CompletionMode::AfterSelect)]
#[case("SELECT a, ", CompletionMode::AfterSelect)]
#[case("SELECT DISTINCT ", CompletionMode::AfterSelect)]
#[case("SELECT COUNT( ", CompletionMode::SelectFunction)]
#[case("SELECT * FROM ", CompletionMode::AfterFrom)]
#[case("SELECT * FROM Emp", CompletionMode::AfterFrom)]
#[case("SELECT * FROM dbo.", CompletionMode::FromQualified)]
#[case("SELECT * FROM tvf( ", CompletionMode::FromFunction)]
#[case("SELECT * FROM t WHERE ", CompletionMode::AfterWhere)]
#[case("SELECT * FROM a JOIN ", CompletionMode::AfterJoin)]
#[case("SELECT * FROM a INNER ", CompletionMode::AfterJoin)]
#[case("SELECT * FROM a JOIN b.", CompletionMode::JoinQualified)]
#[case("EXEC ", CompletionMode::Exec)]
#[case("SELECT * FROM t ORDER ", CompletionMode::Default)]
fn classifies_cursor_at_end(#[case] sql: &str, #[case] expected: CompletionMode) {
    assert_eq!(mode_at_end(sql), expected, "sql: {sql:?}");
}

#[test]
fn cursor_in_the_middle_of_earlier_text() {
    // Cursor right after FROM on line 1 even though more SQL follows.
    let sql = "SELECT * FROM Employees WHERE x = 1";
    let ctx = completion_context(sql, 1, 15);
    assert_eq!(ctx.mode, CompletionMode::AfterFrom);
}

#[test]
fn scope_is_empty_before_any_statement() {
    let ctx = completion_context("   SELECT * FROM t", 1, 1);
    assert_eq!(ctx.mode, CompletionMode::Start);
    assert!(ctx.scope.visible_tables.is_empty());
    // The parsed statements still ride along for providers that want them.
    assert_eq!(ctx.statements.len(), 1);
}

#[test]
fn second_statement_does_not_see_first_statement_ctes() {
    let sql = "WITH c AS (SELECT 1) SELECT * FROM c; SELECT * FROM ";
    let ctx = completion_context(sql, 1, sql.chars().count() as u32 + 1);
    assert_eq!(ctx.mode, CompletionMode::AfterFrom);
    assert!(ctx.scope.ctes.is_empty());
}

#[test]
fn table_variables_remain_visible_within_the_batch() {
    let sql = "DECLARE @tv TABLE (id INT); SELECT * FROM ";
    let ctx = completion_context(sql, 1, sql.chars().count() as u32 + 1);
    assert!(ctx
        .scope
        .visible_tables
        .iter()
        .any(|t| t.name == "@tv" && t.is_table_variable));
}
