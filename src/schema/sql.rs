//! SQL text rendering for generated schemas.
//!
//! Values are never spliced into SQL unescaped: text literals double embedded single quotes, and
//! every [`InsertStatement`] can also be executed with bound parameters via
//! [`InsertStatement::to_parameterized`].

use std::collections::HashSet;
use std::fmt::Write as _;

use once_cell::sync::Lazy;

/// Reserved words of MySQL and SQLite that cannot be used as bare identifiers (upper case).
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ABORT", "ACCESSIBLE", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYZE",
        "AND", "AS", "ASC", "ASENSITIVE", "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN",
        "BIGINT", "BINARY", "BLOB", "BOTH", "BY", "CALL", "CASCADE", "CASE", "CAST", "CHANGE",
        "CHAR", "CHARACTER", "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONDITION", "CONFLICT",
        "CONSTRAINT", "CONTINUE", "CONVERT", "CREATE", "CROSS", "CUBE", "CUME_DIST",
        "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR",
        "DATABASE", "DATABASES", "DAY_HOUR", "DAY_MICROSECOND", "DAY_MINUTE", "DAY_SECOND", "DEC",
        "DECIMAL", "DECLARE", "DEFAULT", "DEFERRABLE", "DEFERRED", "DELAYED", "DELETE",
        "DENSE_RANK", "DESC", "DESCRIBE", "DETACH", "DETERMINISTIC", "DISTINCT", "DISTINCTROW",
        "DIV", "DO", "DOUBLE", "DROP", "DUAL", "EACH", "ELSE", "ELSEIF", "EMPTY", "ENCLOSED",
        "END", "ESCAPE", "ESCAPED", "EXCEPT", "EXCLUDE", "EXCLUSIVE", "EXISTS", "EXIT", "EXPLAIN",
        "FAIL", "FALSE", "FETCH", "FILTER", "FIRST_VALUE", "FLOAT", "FLOAT4", "FLOAT8",
        "FOLLOWING", "FOR", "FORCE", "FOREIGN", "FROM", "FULL", "FULLTEXT", "FUNCTION", "GENERATED",
        "GET", "GLOB", "GRANT", "GROUP", "GROUPING", "GROUPS", "HAVING", "HIGH_PRIORITY",
        "HOUR_MICROSECOND", "HOUR_MINUTE", "HOUR_SECOND", "IF", "IGNORE", "IMMEDIATE", "IN",
        "INDEX", "INDEXED", "INFILE", "INITIALLY", "INNER", "INOUT", "INSENSITIVE", "INSERT",
        "INSTEAD", "INT", "INT1", "INT2", "INT3", "INT4", "INT8", "INTEGER", "INTERSECT",
        "INTERVAL", "INTO", "IS", "ISNULL", "ITERATE", "JOIN", "JSON_TABLE", "KEY", "KEYS", "KILL",
        "LAG", "LAST_VALUE", "LATERAL", "LEAD", "LEADING", "LEAVE", "LEFT", "LIKE", "LIMIT",
        "LINEAR", "LINES", "LOAD", "LOCALTIME", "LOCALTIMESTAMP", "LOCK", "LONG", "LONGBLOB",
        "LONGTEXT", "LOOP", "LOW_PRIORITY", "MASTER_BIND", "MATCH", "MATERIALIZED", "MAXVALUE",
        "MEDIUMBLOB", "MEDIUMINT", "MEDIUMTEXT", "MIDDLEINT", "MINUTE_MICROSECOND",
        "MINUTE_SECOND", "MOD", "MODIFIES", "NATURAL", "NO", "NOT", "NOTHING", "NOTNULL",
        "NO_WRITE_TO_BINLOG", "NTH_VALUE", "NTILE", "NULL", "NULLS", "NUMERIC", "OF", "OFFSET",
        "ON", "OPTIMIZE", "OPTIMIZER_COSTS", "OPTION", "OPTIONALLY", "OR", "ORDER", "OTHERS",
        "OUT", "OUTER", "OUTFILE", "OVER", "PARTITION", "PERCENT_RANK", "PLAN", "PRAGMA",
        "PRECEDING", "PRECISION", "PRIMARY", "PROCEDURE", "PURGE", "QUERY", "RAISE", "RANGE",
        "RANK", "READ", "READS", "READ_WRITE", "REAL", "RECURSIVE", "REFERENCES", "REGEXP",
        "REINDEX", "RELEASE", "RENAME", "REPEAT", "REPLACE", "REQUIRE", "RESIGNAL", "RESTRICT",
        "RETURN", "RETURNING", "REVOKE", "RIGHT", "RLIKE", "ROLLBACK", "ROW", "ROWS",
        "ROW_NUMBER", "SAVEPOINT", "SCHEMA", "SCHEMAS", "SECOND_MICROSECOND", "SELECT",
        "SENSITIVE", "SEPARATOR", "SET", "SHOW", "SIGNAL", "SMALLINT", "SPATIAL", "SPECIFIC",
        "SQL", "SQLEXCEPTION", "SQLSTATE", "SQLWARNING", "SQL_BIG_RESULT",
        "SQL_CALC_FOUND_ROWS", "SQL_SMALL_RESULT", "SSL", "STARTING", "STORED", "STRAIGHT_JOIN",
        "SYSTEM", "TABLE", "TEMP", "TEMPORARY", "TERMINATED", "THEN", "TIES", "TINYBLOB",
        "TINYINT", "TINYTEXT", "TO", "TRAILING", "TRANSACTION", "TRIGGER", "TRUE", "UNBOUNDED",
        "UNDO", "UNION", "UNIQUE", "UNLOCK", "UNSIGNED", "UPDATE", "USAGE", "USE", "USING",
        "UTC_DATE", "UTC_TIME", "UTC_TIMESTAMP", "VACUUM", "VALUES", "VARBINARY", "VARCHAR",
        "VARCHARACTER", "VARYING", "VIEW", "VIRTUAL", "WHEN", "WHERE", "WHILE", "WINDOW", "WITH",
        "WITHOUT", "WRITE", "XOR", "YEAR_MONTH", "ZEROFILL",
    ]
    .into_iter()
    .collect()
});

/// Column type of a generated table. Every inferred column is `TEXT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    #[default]
    Text,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
        }
    }
}

/// A single named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Text,
        }
    }
}

/// Inferred table: a non-empty name plus ordered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// `CREATE TABLE IF NOT EXISTS <table> (<col> TEXT, ...);`
    pub fn create_statement(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.column_type.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({cols});",
            quote_identifier(&self.name)
        )
    }
}

/// One row to insert. `None` values are SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Option<String>>,
}

impl InsertStatement {
    /// Render as SQL text with escaped literals.
    pub fn to_sql(&self) -> String {
        let values = self
            .values
            .iter()
            .map(|v| match v {
                Some(s) => quote_literal(s),
                None => "NULL".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} VALUES ({values});", self.head())
    }

    /// Render with `?` placeholders, returning the statement and the values to bind in order.
    pub fn to_parameterized(&self) -> (String, &[Option<String>]) {
        let marks = vec!["?"; self.values.len()].join(", ");
        (format!("{} VALUES ({marks})", self.head()), &self.values)
    }

    fn head(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        format!("INSERT INTO {} ({cols})", quote_identifier(&self.table))
    }
}

/// The statements generated from one JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementSet {
    pub schema: TableSchema,
    pub inserts: Vec<InsertStatement>,
}

impl StatementSet {
    pub fn create_statement(&self) -> String {
        self.schema.create_statement()
    }

    pub fn insert_statements(&self) -> Vec<String> {
        self.inserts.iter().map(InsertStatement::to_sql).collect()
    }

    /// File contents: the CREATE statement, a blank line, then one INSERT per line.
    pub fn to_sql_text(&self) -> String {
        let mut out = self.create_statement();
        out.push_str("\n\n");
        for insert in &self.inserts {
            let _ = writeln!(out, "{}", insert.to_sql());
        }
        out
    }
}

/// Emit an identifier bare when it is a plain word that is not reserved, otherwise back-tick
/// quoted.
pub fn quote_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if plain && !is_reserved_word(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

/// `true` when `name` is a MySQL or SQLite reserved word (case-insensitive).
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(name.to_ascii_uppercase().as_str())
}

/// Single-quote a text literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
