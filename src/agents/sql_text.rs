//! Pulling SQL out of model replies.
//!
//! Replies are free text that usually wraps SQL in markdown fences. Statements are split
//! with a small scanner rather than a plain `split(';')`, so terminators inside string
//! literals, quoted identifiers, comments and trigger bodies stay where they are.

use regex::Regex;
use std::sync::LazyLock;

/// Three backticks plus the word that may follow them.
static FENCE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```([A-Za-z0-9_+-]*)").expect("valid fence regex"));

/// A complete fenced block: group 1 is the word after the opening fence, group 2 the rest.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_+-]*)(.*?)```").expect("valid fenced block regex")
});

/// A bare `SELECT ... FROM ...` up to the first terminator or the end of the text.
static SELECT_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(\bSELECT\b.*?\bFROM\b.*?)(?:;|$)").expect("valid select regex")
});

/// Words that open a statement, so they are content rather than a fence language tag.
const SQL_LEADING_KEYWORDS: [&str; 14] = [
    "ALTER", "ANALYZE", "BEGIN", "CREATE", "DELETE", "DROP", "EXPLAIN", "INSERT", "PRAGMA",
    "REPLACE", "SELECT", "UPDATE", "VALUES", "WITH",
];

const SQL_LANGUAGE_TAGS: [&str; 6] = ["sql", "sqlite", "sqlite3", "postgresql", "mysql", "plsql"];

fn is_language_tag(word: &str) -> bool {
    !word.is_empty()
        && !SQL_LEADING_KEYWORDS
            .iter()
            .any(|kw| word.eq_ignore_ascii_case(kw))
}

struct FencedBlock<'a> {
    tag: Option<&'a str>,
    body: &'a str,
}

impl FencedBlock<'_> {
    /// Untagged blocks and blocks tagged as SQL.
    fn is_sql(&self) -> bool {
        self.tag.is_none_or(|tag| {
            SQL_LANGUAGE_TAGS
                .iter()
                .any(|known| tag.eq_ignore_ascii_case(known))
        })
    }
}

fn fenced_blocks(text: &str) -> impl Iterator<Item = FencedBlock<'_>> {
    FENCED_BLOCK.captures_iter(text).filter_map(|caps| {
        let word = caps.get(1)?;
        let rest = caps.get(2)?;
        let (tag, body_start) = if is_language_tag(word.as_str()) {
            (Some(word.as_str()), rest.start())
        } else {
            (None, word.start())
        };
        Some(FencedBlock {
            tag,
            body: text[body_start..rest.end()].trim(),
        })
    })
}

/// Removes fence markers and their language tags, keeping everything else.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_MARKER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let word = &caps[1];
            if is_language_tag(word) {
                String::new()
            } else {
                word.to_string()
            }
        })
        .into_owned()
}

/// Splits a schema reply into executable statements, each ending in exactly one `;`.
///
/// When the reply contains complete fenced blocks only the bodies of untagged or
/// SQL-tagged blocks are used, so prose and other languages are not executed; otherwise
/// the whole text is used with any stray fence markers removed.
pub fn extract_sql_statements(text: &str) -> Vec<String> {
    let mut saw_block = false;
    let sql_blocks: Vec<&str> = fenced_blocks(text)
        .inspect(|_| saw_block = true)
        .filter(FencedBlock::is_sql)
        .map(|block| block.body)
        .collect();

    let source = if saw_block {
        sql_blocks.join("\n")
    } else {
        strip_code_fences(text)
    };

    split_statements(&source)
        .into_iter()
        .map(|stmt| format!("{stmt};"))
        .collect()
}

/// Finds the one query the analyst should run.
///
/// First untagged or SQL-tagged fenced block wins; otherwise the first
/// `SELECT ... FROM ...` without its terminator. `None` when neither yields any text.
pub fn extract_sql_query(text: &str) -> Option<String> {
    let query = fenced_blocks(text)
        .find(FencedBlock::is_sql)
        .map(|block| block.body)
        .or_else(|| {
            SELECT_QUERY
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
        })?;

    (!query.is_empty()).then(|| query.to_string())
}

/// Splits on top-level `;` and returns trimmed, non-empty statements without terminators.
fn split_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut words = StatementWords::default();
    let mut has_content = false;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' | b'"' | b'`' => {
                has_content = true;
                i = skip_quoted(bytes, i, b);
            }
            b'[' => {
                has_content = true;
                i = skip_past(bytes, i + 1, b"]");
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = skip_past(bytes, i + 2, b"\n");
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_past(bytes, i + 2, b"*/");
            }
            b';' => {
                if words.in_trigger_body() {
                    i += 1;
                    continue;
                }
                if has_content {
                    statements.push(sql[start..i].trim());
                }
                start = i + 1;
                words = StatementWords::default();
                has_content = false;
                i += 1;
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                has_content = true;
                let end = bytes[i..]
                    .iter()
                    .position(|c| !(c.is_ascii_alphanumeric() || *c == b'_' || *c == b'$'))
                    .map_or(bytes.len(), |n| i + n);
                words.push(&sql[i..end]);
                i = end;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                has_content = true;
                i += 1;
            }
        }
    }

    if has_content {
        let tail = sql[start..].trim();
        if !tail.is_empty() {
            statements.push(tail);
        }
    }
    statements
}

/// Index just past the closing `quote`; a doubled quote is an escaped one.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Index just past the next occurrence of `needle` at or after `from`, or the end.
fn skip_past(bytes: &[u8], from: usize, needle: &[u8]) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.windows(needle.len()).position(|w| w == needle))
        .map_or(bytes.len(), |n| from + n + needle.len())
}

/// Keywords seen so far in the current statement; enough to recognise trigger bodies.
#[derive(Default)]
struct StatementWords {
    leading: Vec<String>,
    case_depth: usize,
    /// The last word was an `END` that closes the trigger body rather than a `CASE`.
    closed_body: bool,
}

impl StatementWords {
    fn push(&mut self, word: &str) {
        let upper = word.to_ascii_uppercase();
        self.closed_body = false;
        match upper.as_str() {
            "CASE" => self.case_depth += 1,
            "END" if self.case_depth > 0 => self.case_depth -= 1,
            "END" => self.closed_body = true,
            _ => {}
        }
        if self.leading.len() < 3 {
            self.leading.push(upper);
        }
    }

    /// Inside `CREATE [TEMP] TRIGGER ... BEGIN ... END` a `;` only ends the statement
    /// right after the `END` that closes the body.
    fn in_trigger_body(&self) -> bool {
        let leading: Vec<&str> = self.leading.iter().map(String::as_str).collect();
        let is_trigger = matches!(
            leading.as_slice(),
            ["CREATE", "TRIGGER", ..] | ["CREATE", "TEMP" | "TEMPORARY", "TRIGGER"]
        );
        is_trigger && !self.closed_body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_schema_yields_two_terminated_statements() {
        let text = "```sql\nCREATE TABLE a(id int);\nCREATE TABLE b(id int);\n```";
        assert_eq!(
            extract_sql_statements(text),
            ["CREATE TABLE a(id int);", "CREATE TABLE b(id int);"]
        );
    }

    #[test]
    fn unfenced_text_is_split_and_trimmed() {
        let text = "  CREATE TABLE a(id int) ;\n\n;  CREATE INDEX ia ON a(id)  ";
        assert_eq!(
            extract_sql_statements(text),
            ["CREATE TABLE a(id int);", "CREATE INDEX ia ON a(id);"]
        );
    }

    #[test]
    fn prose_outside_fences_is_ignored() {
        let text = "Here is the schema:\n\n```sql\nCREATE TABLE a(id int);\n```\n\nAnd an index:\n```\nCREATE INDEX ia ON a(id);\n```\nDone.";
        assert_eq!(
            extract_sql_statements(text),
            ["CREATE TABLE a(id int);", "CREATE INDEX ia ON a(id);"]
        );
    }

    #[test]
    fn terminators_inside_literals_and_comments_do_not_split() {
        let text = "INSERT INTO t VALUES ('a;b', 'it''s; fine');\n\
                    -- trailing; comment\n\
                    /* block; comment */ CREATE TABLE \"odd;name\" (x int);";
        assert_eq!(
            extract_sql_statements(text),
            [
                "INSERT INTO t VALUES ('a;b', 'it''s; fine');",
                "-- trailing; comment\n/* block; comment */ CREATE TABLE \"odd;name\" (x int);",
            ]
        );
    }

    #[test]
    fn comment_only_fragments_are_dropped() {
        let text = "CREATE TABLE a(id int);\n-- end of schema\n";
        assert_eq!(extract_sql_statements(text), ["CREATE TABLE a(id int);"]);
    }

    #[test]
    fn trigger_bodies_stay_in_one_statement() {
        let text = "CREATE TABLE a(id int);\n\
                    CREATE TRIGGER trg AFTER INSERT ON a BEGIN\n  UPDATE a SET id = id; DELETE FROM a WHERE id < 0;\nEND;\n\
                    CREATE INDEX ia ON a(id);";
        let statements = extract_sql_statements(text);
        assert_eq!(statements.len(), 3);
        assert!(statements[1].starts_with("CREATE TRIGGER"));
        assert!(statements[1].ends_with("END;"));
        assert_eq!(statements[2], "CREATE INDEX ia ON a(id);");
    }

    #[test]
    fn case_expressions_inside_trigger_bodies_do_not_end_the_trigger() {
        let text = "CREATE TRIGGER trg AFTER INSERT ON a BEGIN \
                    UPDATE a SET x = CASE WHEN new.id > 0 THEN 1 ELSE 0 END; \
                    DELETE FROM a WHERE id < 0; END;\n\
                    SELECT CASE WHEN 1 THEN 'end' END;";
        let statements = extract_sql_statements(text);
        assert_eq!(statements.len(), 2, "{statements:?}");
        assert!(statements[0].starts_with("CREATE TRIGGER"));
        assert!(statements[0].ends_with("id < 0; END;"));
        assert_eq!(statements[1], "SELECT CASE WHEN 1 THEN 'end' END;");
    }

    #[test]
    fn only_sql_blocks_are_executed() {
        let text = "```text\nThe following tables; are created\n```\n\
                    ```sql\nCREATE TABLE a(id int);\n```\n\
                    ```json\n{\"tables\": [\"a\"]}\n```";
        assert_eq!(extract_sql_statements(text), ["CREATE TABLE a(id int);"]);
    }

    #[test]
    fn keyword_after_fence_is_content_not_a_tag() {
        assert_eq!(
            extract_sql_query("```SELECT\nname FROM t\n```").as_deref(),
            Some("SELECT\nname FROM t")
        );
        assert_eq!(
            extract_sql_statements("```CREATE TABLE a(id int);```"),
            ["CREATE TABLE a(id int);"]
        );
        assert_eq!(strip_code_fences("```SELECT 1"), "SELECT 1");
    }

    #[test]
    fn query_skips_non_sql_blocks() {
        let reply = "```text\nplan: count rows\n```\n```sqlite\nSELECT COUNT(*) FROM t;\n```";
        assert_eq!(
            extract_sql_query(reply).as_deref(),
            Some("SELECT COUNT(*) FROM t;")
        );
    }

    #[test]
    fn strip_code_fences_removes_tagged_and_bare_markers() {
        assert_eq!(
            strip_code_fences("```sql\nSELECT 1;\n```"),
            "\nSELECT 1;\n"
        );
        assert_eq!(strip_code_fences("```\nSELECT 1;\n```"), "\nSELECT 1;\n");
    }

    #[test]
    fn query_from_fenced_block_is_verbatim_and_trimmed() {
        let reply = "Use this:\n```sql\n  SELECT name, price\n  FROM products;  \n```\nThen read it.";
        assert_eq!(
            extract_sql_query(reply).as_deref(),
            Some("SELECT name, price\n  FROM products;")
        );

        let bare = "```\nSELECT 1 FROM t\n```";
        assert_eq!(extract_sql_query(bare).as_deref(), Some("SELECT 1 FROM t"));
    }

    #[test]
    fn query_falls_back_to_select_up_to_terminator() {
        let reply = "The query is SELECT id, name FROM users WHERE id > 3; and it lists users.";
        assert_eq!(
            extract_sql_query(reply).as_deref(),
            Some("SELECT id, name FROM users WHERE id > 3")
        );

        let no_terminator = "try select count(*) from orders";
        assert_eq!(
            extract_sql_query(no_terminator).as_deref(),
            Some("select count(*) from orders")
        );
    }

    #[test]
    fn query_extraction_reports_absence() {
        assert_eq!(extract_sql_query("I cannot answer that."), None);
        assert_eq!(extract_sql_query("```sql\n\n```"), None);
    }
}
