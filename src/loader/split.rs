//! Statement splitting and INSERT recognition for generated SQL files.
//!
//! Only the INSERT shape written by [`crate::schema`] is recognized; anything else runs verbatim.

use crate::schema::InsertStatement;

/// One executable fragment of a SQL file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlStatement {
    /// `INSERT INTO t (..) VALUES (..)` with literal values, executed with bound parameters.
    Insert(InsertStatement),
    /// Anything else, executed as written.
    Raw(String),
}

impl SqlStatement {
    /// Classify a trimmed, non-empty fragment.
    pub fn parse(fragment: &str) -> Self {
        match parse_insert(fragment) {
            Some(insert) => SqlStatement::Insert(insert),
            None => SqlStatement::Raw(fragment.to_string()),
        }
    }
}

/// Split SQL text on `;` outside quoted strings and identifiers, dropping empty fragments.
///
/// Quotes are `'...'`, `"..."` and `` `...` ``; a doubled quote character inside a quoted run is
/// an escaped quote. Backslashes have no special meaning.
pub fn split_statements(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' || c == '`' => quote = Some(c),
            None if c == ';' => {
                push_fragment(&mut out, &buf);
                buf.clear();
                continue;
            }
            None => {}
        }
        buf.push(c);
    }
    push_fragment(&mut out, &buf);
    out
}

fn push_fragment(out: &mut Vec<String>, buf: &str) {
    let trimmed = buf.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Ident(String),
    Str(String),
    Open,
    Close,
    Comma,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            ',' => tokens.push(Token::Comma),
            '\'' | '`' | '"' => {
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == c => {
                            if chars.peek() == Some(&c) {
                                chars.next();
                                s.push(c);
                            } else {
                                break;
                            }
                        }
                        Some(ch) => s.push(ch),
                        None => return None,
                    }
                }
                tokens.push(if c == '\'' { Token::Str(s) } else { Token::Ident(s) });
            }
            _ => {
                let mut s = String::from(c);
                while let Some(&n) = chars.peek() {
                    if n.is_whitespace() || matches!(n, '(' | ')' | ',' | '\'' | '`' | '"') {
                        break;
                    }
                    s.push(n);
                    chars.next();
                }
                tokens.push(Token::Word(s));
            }
        }
    }

    Some(tokens)
}

fn parse_insert(fragment: &str) -> Option<InsertStatement> {
    let tokens = tokenize(fragment)?;
    let mut it = tokens.into_iter();

    keyword(it.next()?, "INSERT")?;
    keyword(it.next()?, "INTO")?;
    let table = identifier(it.next()?)?;

    if it.next()? != Token::Open {
        return None;
    }
    let mut columns = Vec::new();
    loop {
        columns.push(identifier(it.next()?)?);
        match it.next()? {
            Token::Comma => continue,
            Token::Close => break,
            _ => return None,
        }
    }

    keyword(it.next()?, "VALUES")?;
    if it.next()? != Token::Open {
        return None;
    }
    let mut values = Vec::new();
    loop {
        values.push(match it.next()? {
            Token::Str(s) => Some(s),
            Token::Word(w) if w.eq_ignore_ascii_case("NULL") => None,
            Token::Word(w) if w.parse::<f64>().is_ok() => Some(w),
            _ => return None,
        });
        match it.next()? {
            Token::Comma => continue,
            Token::Close => break,
            _ => return None,
        }
    }

    if it.next().is_some() || columns.len() != values.len() {
        return None;
    }

    Some(InsertStatement {
        table,
        columns,
        values,
    })
}

fn keyword(token: Token, expected: &str) -> Option<()> {
    match token {
        Token::Word(w) if w.eq_ignore_ascii_case(expected) => Some(()),
        _ => None,
    }
}

fn identifier(token: Token) -> Option<String> {
    match token {
        Token::Word(w) | Token::Ident(w) => Some(w),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_outside_quotes_only() {
        let text = "CREATE TABLE IF NOT EXISTS t (a TEXT);\n\nINSERT INTO t (a) VALUES ('x;y');\nINSERT INTO t (a) VALUES ('it''s');\n";
        let parts = split_statements(text);
        assert_eq!(
            parts,
            vec![
                "CREATE TABLE IF NOT EXISTS t (a TEXT)",
                "INSERT INTO t (a) VALUES ('x;y')",
                "INSERT INTO t (a) VALUES ('it''s')",
            ]
        );
    }

    #[test]
    fn blank_fragments_are_dropped() {
        assert!(split_statements(" ;\n; ").is_empty());
    }

    #[test]
    fn inserts_become_parameterized() {
        let stmt = SqlStatement::parse("INSERT INTO `my table` (id, `First Name`) VALUES ('it''s', NULL)");
        assert_eq!(
            stmt,
            SqlStatement::Insert(InsertStatement {
                table: "my table".to_string(),
                columns: vec!["id".to_string(), "First Name".to_string()],
                values: vec![Some("it's".to_string()), None],
            })
        );
    }

    #[test]
    fn numeric_literals_are_kept_as_text() {
        let stmt = SqlStatement::parse("insert into t (a, b) values (42, -1.5)");
        match stmt {
            SqlStatement::Insert(ins) => {
                assert_eq!(ins.values, vec![Some("42".to_string()), Some("-1.5".to_string())])
            }
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[test]
    fn other_statements_stay_raw() {
        let ddl = "CREATE TABLE IF NOT EXISTS t (a TEXT)";
        assert_eq!(SqlStatement::parse(ddl), SqlStatement::Raw(ddl.to_string()));

        let select_insert = "INSERT INTO t (a) SELECT a FROM u";
        assert!(matches!(SqlStatement::parse(select_insert), SqlStatement::Raw(_)));

        let arity = "INSERT INTO t (a, b) VALUES ('1')";
        assert!(matches!(SqlStatement::parse(arity), SqlStatement::Raw(_)));
    }
}
