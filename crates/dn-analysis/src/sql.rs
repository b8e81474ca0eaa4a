//! Symbol extraction for SQL blocks.
//!
//! SQL blocks consume notebook symbols two ways: `{{ variable }}` Jinja
//! interpolations, and bare table identifiers after FROM/JOIN/INTO/UPDATE
//! that refer to dataframes exposed by other blocks. The symbol a SQL
//! block defines comes from its metadata, not its text, and is added by
//! the extractor registry.

use std::sync::OnceLock;

use regex::Regex;

use crate::extract::SymbolInfo;

/// SQL keywords that can follow FROM/JOIN and must not count as table
/// references.
static SQL_KEYWORDS: &[&str] = &[
    "select", "where", "group", "order", "having", "limit", "offset", "union", "intersect",
    "except",
];

/// Extract the symbols a SQL block's text consumes.
pub fn extract_sql(sql: &str) -> SymbolInfo {
    static JINJA_VAR: OnceLock<Regex> = OnceLock::new();
    static JINJA_EXPR: OnceLock<Regex> = OnceLock::new();
    static JINJA_STMT: OnceLock<Regex> = OnceLock::new();
    static TABLE_REF: OnceLock<Regex> = OnceLock::new();

    let jinja_var = JINJA_VAR.get_or_init(|| Regex::new(r"\{\{\s*(\w+)").unwrap());
    let jinja_expr = JINJA_EXPR.get_or_init(|| Regex::new(r"\{\{.*?\}\}").unwrap());
    let jinja_stmt = JINJA_STMT.get_or_init(|| Regex::new(r"(?s)\{%.*?%\}").unwrap());
    let table_ref = TABLE_REF.get_or_init(|| {
        Regex::new(r"(?i)\b(?:FROM|JOIN|INTO|UPDATE)\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap()
    });

    let mut info = SymbolInfo::default();

    for capture in jinja_var.captures_iter(sql) {
        info.used_symbols.insert(capture[1].to_string());
    }

    // Strip Jinja constructs before looking for table references so
    // `FROM {{ table }}` is not double counted
    let cleaned = jinja_expr.replace_all(sql, "");
    let cleaned = jinja_stmt.replace_all(&cleaned, "");

    for capture in table_ref.captures_iter(&cleaned) {
        let name = &capture[1];
        if !SQL_KEYWORDS.contains(&name.to_lowercase().as_str()) {
            info.used_symbols.insert(name.to_string());
        }
    }

    info
}

#[cfg(test)]
#[path = "sql_test.rs"]
mod tests;
