use std::fs;
use std::path::Path;

use sheetload::loader::{load_sql_directory, SqlExecutor, SqlStatement, SqlxExecutor};
use sheetload::schema::{process_json_directory, ColumnPolicy};
use sheetload::PipelineError;

fn sqlite_url(db: &Path) -> String {
    format!("sqlite://{}?mode=rwc", db.display())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn query_strings(db: &Path, sql: &str) -> Vec<Option<String>> {
    runtime().block_on(async {
        let pool = sqlx::SqlitePool::connect(&sqlite_url(db)).await.unwrap();
        let rows: Vec<Option<String>> = sqlx::query_scalar(sql).fetch_all(&pool).await.unwrap();
        pool.close().await;
        rows
    })
}

fn count_rows(db: &Path, table: &str) -> i64 {
    runtime().block_on(async {
        let pool = sqlx::SqlitePool::connect(&sqlite_url(db)).await.unwrap();
        let n: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        pool.close().await;
        n
    })
}

fn ten_inserts_one_bad() -> String {
    let mut text = String::from("CREATE TABLE IF NOT EXISTS people (id TEXT, name TEXT);\n\n");
    for i in 1..=10 {
        if i == 4 {
            text.push_str("INSERT INTO people (id, no_such_column) VALUES ('4', 'x');\n");
        } else {
            text.push_str(&format!("INSERT INTO people (id, name) VALUES ('{i}', 'p{i}');\n"));
        }
    }
    text
}

#[test]
fn one_failing_insert_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let sql_dir = dir.path().join("sql");
    fs::create_dir_all(&sql_dir).unwrap();
    fs::write(sql_dir.join("people_output.sql"), ten_inserts_one_bad()).unwrap();
    let db = dir.path().join("load.sqlite");

    let mut exec = SqlxExecutor::connect_url(&sqlite_url(&db)).unwrap();
    let report = load_sql_directory(&sql_dir, &mut exec, None).unwrap();
    drop(exec);

    assert_eq!(report.executed(), 10);
    assert_eq!(report.failure_count(), 1);
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.index, 5);
    assert_eq!(failure.file, sql_dir.join("people_output.sql"));
    assert_eq!(count_rows(&db, "people"), 9);
}

#[test]
fn rerunning_appends_rows_without_table_errors() {
    let dir = tempfile::tempdir().unwrap();
    let sql_dir = dir.path().join("sql");
    fs::create_dir_all(&sql_dir).unwrap();
    fs::write(
        sql_dir.join("id_output.sql"),
        "CREATE TABLE IF NOT EXISTS id (id TEXT, name TEXT);\n\n\
         INSERT INTO id (id, name) VALUES ('1', 'Alice');\n\
         INSERT INTO id (id, name) VALUES ('2', 'Bob');\n",
    )
    .unwrap();
    let db = dir.path().join("rerun.sqlite");

    for _ in 0..2 {
        let mut exec = SqlxExecutor::connect_url(&sqlite_url(&db)).unwrap();
        let report = load_sql_directory(&sql_dir, &mut exec, None).unwrap();
        assert_eq!(report.failure_count(), 0);
    }

    assert_eq!(count_rows(&db, "id"), 4);
}

#[test]
fn quotes_and_semicolons_in_values_survive() {
    let dir = tempfile::tempdir().unwrap();
    let sql_dir = dir.path().join("sql");
    fs::create_dir_all(&sql_dir).unwrap();
    fs::write(
        sql_dir.join("notes_output.sql"),
        "CREATE TABLE IF NOT EXISTS note (note TEXT, `Due Date` TEXT);\n\n\
         INSERT INTO note (note, `Due Date`) VALUES ('O''Brien; then DROP TABLE note', NULL);\n\
         INSERT INTO note (note, `Due Date`) VALUES ('C:\\temp\\', '2024-01-05');\n",
    )
    .unwrap();
    let db = dir.path().join("quotes.sqlite");

    let mut exec = SqlxExecutor::connect_url(&sqlite_url(&db)).unwrap();
    let report = load_sql_directory(&sql_dir, &mut exec, None).unwrap();
    drop(exec);

    assert_eq!(report.failure_count(), 0);
    assert_eq!(
        query_strings(&db, "SELECT note FROM note ORDER BY rowid"),
        vec![
            Some("O'Brien; then DROP TABLE note".to_string()),
            Some("C:\\temp\\".to_string()),
        ]
    );
    assert_eq!(
        query_strings(&db, "SELECT `Due Date` FROM note ORDER BY rowid"),
        vec![None, Some("2024-01-05".to_string())]
    );
}

#[test]
fn reserved_word_headers_load_into_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let json_dir = dir.path().join("json");
    let sql_dir = dir.path().join("sql");
    fs::create_dir_all(&json_dir).unwrap();
    fs::write(
        json_dir.join("orders_Sheet1.json"),
        r#"[{"Order":"1","Group":"a"},{"Order":"2","Group":"b"}]"#,
    )
    .unwrap();
    let db = dir.path().join("reserved.sqlite");

    let inferred = process_json_directory(&json_dir, &sql_dir, ColumnPolicy::FirstRecord, None).unwrap();
    assert_eq!(inferred.written.len(), 1);
    let sql = fs::read_to_string(&inferred.written[0]).unwrap();
    assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `order` (`Order` TEXT, `Group` TEXT);"));

    let mut exec = SqlxExecutor::connect_url(&sqlite_url(&db)).unwrap();
    let report = load_sql_directory(&sql_dir, &mut exec, None).unwrap();
    drop(exec);

    assert_eq!(report.failure_count(), 0);
    assert_eq!(report.executed(), 3);
    assert_eq!(count_rows(&db, "`order`"), 2);
    assert_eq!(
        query_strings(&db, "SELECT `Group` FROM `order` ORDER BY rowid"),
        vec![Some("a".to_string()), Some("b".to_string())]
    );
}

#[test]
fn uncommitted_work_is_not_visible() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tx.sqlite");

    let mut exec = SqlxExecutor::connect_url(&sqlite_url(&db)).unwrap();
    exec.execute(&SqlStatement::parse("CREATE TABLE IF NOT EXISTS t (a TEXT)"))
        .unwrap();
    exec.commit().unwrap();
    drop(exec);

    let mut exec = SqlxExecutor::connect_url(&sqlite_url(&db)).unwrap();
    exec.execute(&SqlStatement::parse("INSERT INTO t (a) VALUES ('x')"))
        .unwrap();
    drop(exec);

    assert_eq!(count_rows(&db, "t"), 0);
}

#[test]
fn unreachable_database_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no_such_dir").join("db.sqlite");

    let err = SqlxExecutor::connect_url(&format!("sqlite://{}", missing.display()))
        .err()
        .unwrap();
    assert!(matches!(err, PipelineError::Connection { .. }));
}
