use rstest::rstest;
use sqlsense_core::{parse_sql, QualifiedName, StatementType};

fn first_chunk(sql: &str) -> sqlsense_core::StatementChunk {
    let script = parse_sql(sql);
    script
        .statements
        .first()
        .cloned()
        .unwrap_or_else(|| panic!("no chunk for {sql:?}"))
}

#[rstest]
#[case("SELECT * FROM t", StatementType::Select)]
#[case("select * from t", StatementType::Select)]
#[case("INSERT INTO t VALUES (1)", StatementType::Insert)]
#[case("UPDATE t SET x = 1", StatementType::Update)]
#[case("DELETE FROM t", StatementType::Delete)]
#[case("MERGE INTO t USING s ON t.id = s.id;", StatementType::Merge)]
#[case("EXEC dbo.Proc", StatementType::Exec)]
#[case("EXECUTE dbo.Proc", StatementType::Exec)]
#[case("DECLARE @x INT", StatementType::Declare)]
#[case("GRANT SELECT ON t TO someone", StatementType::Unknown)]
fn statement_type_dispatch(#[case] sql: &str, #[case] expected: StatementType) {
    assert_eq!(first_chunk(sql).statement_type, expected);
}

#[rstest]
#[case("a", QualifiedName { server: None, database: None, schema: None, name: "a".into() })]
#[case("a.b", QualifiedName { server: None, database: None, schema: Some("a".into()), name: "b".into() })]
#[case("a.b.c", QualifiedName { server: None, database: Some("a".into()), schema: Some("b".into()), name: "c".into() })]
#[case("a.b.c.d", QualifiedName { server: Some("a".into()), database: Some("b".into()), schema: Some("c".into()), name: "d".into() })]
fn qualified_names_fill_right_to_left(#[case] name: &str, #[case] expected: QualifiedName) {
    let chunk = first_chunk(&format!("SELECT * FROM {name}"));
    let table = &chunk.tables[0];
    assert_eq!(table.server, expected.server);
    assert_eq!(table.database, expected.database);
    assert_eq!(table.schema, expected.schema);
    assert_eq!(table.name, expected.name);
}

#[rstest]
#[case("SELECT * FROM")]
#[case("SELECT * FROM t WHERE")]
#[case("UPDATE")]
#[case("DELETE")]
#[case("WITH c AS (SELECT")]
#[case("SELECT * FROM a JOIN")]
#[case("INSERT INTO")]
fn truncated_inputs_still_produce_chunks(#[case] sql: &str) {
    let script = parse_sql(sql);
    assert!(!script.statements.is_empty(), "no chunk for {sql:?}");
}

#[test]
fn extended_delete_target_is_an_alias() {
    let chunk = first_chunk("DELETE e FROM Employees e WHERE e.x = 1");
    let target = chunk.delete_target.as_ref().expect("delete target");
    assert_eq!(target.alias.as_deref(), Some("e"));
    assert!(chunk.has_from_clause);
    assert_eq!(chunk.tables[0].name, "Employees");
    assert_eq!(chunk.tables[0].alias.as_deref(), Some("e"));
}

#[test]
fn full_script_round_trip() {
    let sql = r#"
-- load staging rows
WITH recent AS (
    SELECT id, name FROM dbo.Employees WHERE hired > '2024-01-01'
)
SELECT r.id, r.name
INTO #staging
FROM recent r
LEFT JOIN dbo.Departments d ON r.dept_id = d.id
WHERE d.active = 1
ORDER BY r.name;
GO
UPDATE s SET name = UPPER(name) FROM #staging s;
DELETE FROM #staging WHERE name = N'';
"#;
    let script = parse_sql(sql);
    assert_eq!(script.statements.len(), 3);

    let select = &script.statements[0];
    assert_eq!(select.statement_type, StatementType::Select);
    assert_eq!(select.batch_index, 0);
    let names: Vec<_> = select.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["#staging", "recent", "Departments"]);
    assert!(select.tables[1].is_cte);
    let labels: Vec<_> = select
        .clause_positions
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(labels, vec!["from", "join_1", "on_1", "where", "order_by"]);

    let update = &script.statements[1];
    assert_eq!(update.batch_index, 1);
    assert!(update.has_from_clause);
    assert_eq!(update.tables[0].name, "#staging");
    assert!(update.tables[0].is_temp);

    let delete = &script.statements[2];
    assert_eq!(delete.statement_type, StatementType::Delete);
    assert!(delete.delete_target.is_none());
    assert_eq!(delete.tables[0].name, "#staging");
}

#[test]
fn serialized_output_shape() {
    let script = parse_sql("SELECT * FROM dbo.T t");
    let json = serde_json::to_value(&script).unwrap();
    let table = &json["statements"][0]["tables"][0];
    assert_eq!(table["schema"], "dbo");
    assert_eq!(table["name"], "T");
    assert_eq!(table["alias"], "t");
    assert_eq!(table["isCte"], false);
    assert_eq!(json["statements"][0]["statementType"], "select");
}
