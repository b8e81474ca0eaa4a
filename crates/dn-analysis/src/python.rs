//! Top-level symbol scanner for Python code blocks.
//!
//! Notebook dependency analysis only cares about a block's top-level
//! namespace: which global names it binds and which it reads. This
//! scanner works on logical lines (strings and comments blanked,
//! bracketed continuations joined) rather than a full AST, matching the
//! granularity the dependency graph needs. Reads inside nested scopes
//! count only when they refer to a name the same block binds globally or
//! declares `global`, mirroring the reference analyzer's scope rules.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::builtins::is_builtin;
use crate::extract::SymbolInfo;

/// Python keywords, never reported as symbol uses.
static KEYWORDS: &[&str] = &[
    "and", "or", "not", "in", "is", "if", "else", "elif", "for", "while", "def", "class", "return",
    "yield", "lambda", "import", "from", "as", "with", "try", "except", "finally", "raise", "pass",
    "break", "continue", "global", "nonlocal", "del", "assert", "async", "await", "match", "case",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Extract top-level definitions, uses, and imports from Python source.
pub fn extract_python(code: &str) -> SymbolInfo {
    let code = comment_out_magics(code);
    let lines = match logical_lines(&code) {
        Ok(lines) => lines,
        Err(message) => return SymbolInfo::parse_error(message),
    };

    let mut info = SymbolInfo::default();
    let mut global_decls: BTreeSet<String> = BTreeSet::new();

    // First pass: top-level bindings and `global` declarations.
    for line in &lines {
        if line.indent == 0 {
            collect_definitions(&line.text, &mut info);
        } else if let Some(rest) = statement_body(&line.text, "global") {
            for name in rest.split(',') {
                let name = name.trim();
                if !name.is_empty() {
                    global_decls.insert(name.to_string());
                }
            }
        }
    }

    // Second pass: uses. Nested reads only count for names this block
    // binds globally or declares global.
    for line in &lines {
        let top_level = line.indent == 0;
        for name in load_candidates(&line.text) {
            if is_keyword(&name) || is_builtin(&name) {
                continue;
            }
            if top_level
                || global_decls.contains(&name)
                || info.defined_symbols.contains(&name)
                || info.imported_modules.contains(&name)
            {
                info.used_symbols.insert(name);
            }
        }
    }

    info
}

/// Sanitize a user-facing input label into a Python variable name.
///
/// Whitespace becomes `_`, other non-word characters are removed, and
/// any leading characters that cannot start an identifier are stripped.
/// A label that sanitizes to nothing falls back to `input_1`.
pub fn sanitize_variable_name(name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    static LEADING: OnceLock<Regex> = OnceLock::new();

    let ws = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    let nw = NON_WORD.get_or_init(|| Regex::new(r"[^0-9a-zA-Z_]").unwrap());
    let lead = LEADING.get_or_init(|| Regex::new(r"^[^a-zA-Z_]+").unwrap());

    let sanitized = ws.replace_all(name, "_");
    let sanitized = nw.replace_all(&sanitized, "");
    let sanitized = lead.replace(&sanitized, "");

    if sanitized.is_empty() {
        "input_1".to_string()
    } else {
        sanitized.into_owned()
    }
}

/// Comment out Jupyter magic and shell lines (`%`, `!`) so they do not
/// trip the scanner.
pub fn comment_out_magics(code: &str) -> String {
    code.lines()
        .map(|line| {
            if line.starts_with('%') || line.starts_with('!') {
                format!("#{}", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One logical line: physical lines joined across bracketed continuations
/// and backslashes, with strings and comments blanked out.
struct LogicalLine {
    indent: usize,
    text: String,
}

/// Split source into logical lines, blanking strings and comments.
///
/// Returns an error for source the scanner cannot make sense of
/// (unterminated string, unbalanced brackets).
fn logical_lines(code: &str) -> Result<Vec<LogicalLine>, String> {
    let chars: Vec<char> = code.chars().collect();
    let mut lines = Vec::new();
    let mut text = String::new();
    let mut indent = 0usize;
    let mut depth = 0i32;
    let mut at_line_start = true;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if at_line_start {
            if c == ' ' || c == '\t' {
                if text.is_empty() {
                    indent += 1;
                }
                i += 1;
                continue;
            }
            if c != '\n' {
                at_line_start = false;
            }
        }

        match c {
            '\'' | '"' => {
                let quote = c;
                let triple = i + 2 < chars.len() && chars[i + 1] == quote && chars[i + 2] == quote;
                let len = skip_string(&chars, i, quote, triple)?;
                text.push_str("\"\"");
                i += len;
                continue;
            }
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '(' | '[' | '{' => {
                depth += 1;
                text.push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return Err(format!("unbalanced '{}'", c));
                }
                text.push(c);
            }
            '\\' if i + 1 < chars.len() && chars[i + 1] == '\n' => {
                text.push(' ');
                i += 2;
                continue;
            }
            '\n' => {
                if depth > 0 {
                    text.push(' ');
                } else {
                    if !text.trim().is_empty() {
                        lines.push(LogicalLine {
                            indent,
                            text: std::mem::take(&mut text),
                        });
                    } else {
                        text.clear();
                    }
                    indent = 0;
                    at_line_start = true;
                }
            }
            _ => text.push(c),
        }
        i += 1;
    }

    if depth > 0 {
        return Err("unexpected end of source inside brackets".to_string());
    }
    if !text.trim().is_empty() {
        lines.push(LogicalLine { indent, text });
    }
    Ok(lines)
}

/// Skip over a string literal starting at `start`, returning its length
/// in chars. `start` points at the opening quote.
fn skip_string(chars: &[char], start: usize, quote: char, triple: bool) -> Result<usize, String> {
    let mut i = start + if triple { 3 } else { 1 };
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => {
                if !triple {
                    return Ok(i + 1 - start);
                }
                if i + 2 < chars.len() && chars[i + 1] == quote && chars[i + 2] == quote {
                    return Ok(i + 3 - start);
                }
                i += 1;
            }
            '\n' if !triple => return Err("unterminated string literal".to_string()),
            _ => i += 1,
        }
    }
    Err("unterminated string literal".to_string())
}

/// If `text` starts with the given statement keyword, return the rest.
fn statement_body<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let trimmed = text.trim_start();
    let rest = trimmed.strip_prefix(keyword)?;
    if rest.starts_with(|c: char| c.is_whitespace()) || rest.is_empty() {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Collect the names a top-level logical line binds.
fn collect_definitions(text: &str, info: &mut SymbolInfo) {
    let trimmed = text.trim();

    if let Some(body) = statement_body(trimmed, "import") {
        for part in body.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let binding = match part.split_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => part.split_whitespace().next().unwrap_or(part),
            };
            if !binding.is_empty() {
                info.imported_modules.insert(binding.to_string());
            }
        }
        return;
    }

    if statement_body(trimmed, "from").is_some() {
        if let Some((_, imports)) = trimmed.split_once(" import ") {
            let imports = imports.trim().trim_matches(|c| c == '(' || c == ')');
            for part in imports.split(',') {
                let part = part.trim();
                if part.is_empty() || part == "*" {
                    continue;
                }
                let binding = match part.split_once(" as ") {
                    Some((_, alias)) => alias.trim(),
                    None => part,
                };
                if !binding.is_empty() {
                    info.imported_modules.insert(binding.to_string());
                }
            }
        }
        return;
    }

    let def_body = statement_body(trimmed, "def")
        .or_else(|| statement_body(trimmed, "async def"))
        .or_else(|| {
            statement_body(trimmed, "async").and_then(|rest| statement_body(rest, "def"))
        });
    if let Some(body) = def_body {
        if let Some(name) = leading_identifier(body) {
            info.defined_symbols.insert(name);
        }
        return;
    }

    if let Some(body) = statement_body(trimmed, "class") {
        if let Some(name) = leading_identifier(body) {
            info.defined_symbols.insert(name);
        }
        return;
    }

    if let Some(body) = statement_body(trimmed, "for") {
        if let Some((targets, _)) = body.split_once(" in ") {
            for name in identifiers_in(targets) {
                info.defined_symbols.insert(name);
            }
        }
        return;
    }

    if statement_body(trimmed, "with").is_some() {
        let mut rest = trimmed;
        while let Some((_, after)) = rest.split_once(" as ") {
            if let Some(name) = leading_identifier(after) {
                info.defined_symbols.insert(name);
            }
            rest = after;
        }
        return;
    }

    if statement_body(trimmed, "global").is_some() || statement_body(trimmed, "nonlocal").is_some()
    {
        return;
    }

    // Walrus bindings anywhere in the line
    let mut search = trimmed;
    while let Some(pos) = search.find(":=") {
        if let Some(name) = trailing_identifier(&search[..pos]) {
            info.defined_symbols.insert(name);
        }
        search = &search[pos + 2..];
    }

    // Plain, chained, annotated, or augmented assignment
    if let Some((lhs, _)) = split_assignment(trimmed) {
        for target in lhs.split(['=', ',']) {
            let target = target.trim();
            // Annotated target: name before the colon
            let target = target.split(':').next().unwrap_or(target).trim();
            // Only plain names bind globals; attribute/subscript targets do not
            if is_identifier(target) {
                info.defined_symbols.insert(target.to_string());
            }
        }
    }
}

/// Split an assignment statement into (lhs, rhs) at the first top-level
/// assignment operator. Handles `=`, augmented forms (`+=`, `//=`, ...),
/// and ignores `==`, `!=`, `<=`, `>=`, and `:=`.
fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut split_at = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 => {
                let prev = if i > 0 { bytes[i - 1] } else { 0 };
                let next = bytes.get(i + 1).copied().unwrap_or(0);
                if next == b'=' {
                    i += 2;
                    continue;
                }
                if !matches!(prev, b'=' | b'!' | b'<' | b'>' | b':') {
                    // Chained `a = b = c` splits at the last `=` so every
                    // target lands on the lhs
                    split_at = Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    let i = split_at?;
    // Augmented: strip operator chars off the lhs
    let mut end = i;
    while end > 0
        && matches!(
            bytes[end - 1],
            b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'^' | b'@'
        )
    {
        end -= 1;
    }
    Some((&text[..end], &text[i + 1..]))
}

/// Names a logical line reads.
///
/// Statement-aware: import lines read nothing, assignment lines only read
/// their right-hand side, `def` headers read nothing, `class` headers
/// read their base list.
fn load_candidates(text: &str) -> Vec<String> {
    let trimmed = text.trim();

    if statement_body(trimmed, "import").is_some()
        || statement_body(trimmed, "from").is_some()
        || statement_body(trimmed, "global").is_some()
        || statement_body(trimmed, "nonlocal").is_some()
        || statement_body(trimmed, "def").is_some()
        || statement_body(trimmed, "async").is_some()
    {
        return Vec::new();
    }

    if let Some(body) = statement_body(trimmed, "class") {
        return match body.split_once('(') {
            Some((_, bases)) => identifiers_in(bases),
            None => Vec::new(),
        };
    }

    if let Some(body) = statement_body(trimmed, "for") {
        return match body.split_once(" in ") {
            Some((_, iterable)) => identifiers_in(iterable),
            None => Vec::new(),
        };
    }

    match split_assignment(trimmed) {
        Some((_, rhs)) => identifiers_in(rhs),
        None => identifiers_in(trimmed),
    }
}

/// Scan identifiers out of an expression fragment.
///
/// Attribute accesses report only the base name (`df.head` reads `df`),
/// and keyword-argument names inside calls (`f(n=1)`) are skipped.
fn identifiers_in(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut names = Vec::new();
    let mut depth = 0i32;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();

                let preceded_by_dot = start > 0
                    && chars[..start]
                        .iter()
                        .rev()
                        .find(|ch| !ch.is_whitespace())
                        .is_some_and(|ch| *ch == '.');

                // Keyword argument name: `name=` inside a call
                let mut j = i;
                while j < chars.len() && chars[j] == ' ' {
                    j += 1;
                }
                let is_kwarg = depth > 0
                    && chars.get(j) == Some(&'=')
                    && chars.get(j + 1) != Some(&'=');

                if !preceded_by_dot && !is_kwarg {
                    names.push(name);
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    names
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn leading_identifier(s: &str) -> Option<String> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphanumeric() && *c != '_')
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let name = &s[..end];
    if is_identifier(name) {
        Some(name.to_string())
    } else {
        None
    }
}

fn trailing_identifier(s: &str) -> Option<String> {
    let s = s.trim_end();
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)?;
    let name = &s[start..];
    if is_identifier(name) {
        Some(name.to_string())
    } else {
        None
    }
}

#[cfg(test)]
#[path = "python_test.rs"]
mod tests;
