//! Column/table name normalization.
//!
//! Source files carry names with accents, punctuation, embedded spaces, and
//! the occasional SQL keyword. [`normalize_identifier`] folds any input string
//! into an identifier that is safe to use unquoted in every supported dialect.
//! The function is deterministic and total: no input can make it fail.

use deunicode::deunicode;

/// SQL keywords that may not be used as bare identifiers on one or more of
/// the supported targets. Names landing on one of these get a `_` suffix.
const RESERVED: &[&str] = &[
    "access", "add", "all", "alter", "and", "as", "asc", "audit", "between", "by", "case",
    "check", "column", "comment", "create", "current", "date", "default", "delete", "desc",
    "distinct", "drop", "else", "end", "exists", "file", "for", "from", "grant", "group",
    "having", "in", "index", "insert", "integer", "into", "is", "key", "level", "like", "limit",
    "mode", "not", "null", "number", "of", "on", "option", "or", "order", "primary", "public",
    "references", "rename", "row", "rowid", "rows", "select", "session", "set", "size", "table",
    "then", "to", "trigger", "union", "unique", "update", "user", "values", "view", "when",
    "where", "with",
];

/// Normalize an arbitrary string into a safe, lower-case SQL identifier.
///
/// Steps, in order:
///
/// 1. transliterate to ASCII and trim
/// 2. lower-case
/// 3. `#` becomes `no` (a habit inherited from tank-registry style sources)
/// 4. every run of non-alphanumeric characters becomes a single `_`
/// 5. leading/trailing `_` are dropped
/// 6. a leading digit is prefixed with `a`
/// 7. reserved words get a trailing `_`
/// 8. an empty result becomes `col`
pub fn normalize_identifier(name: &str) -> String {
    let ascii = deunicode(name);
    let lowered = ascii.trim().to_ascii_lowercase().replace('#', "no");

    let mut out = String::with_capacity(lowered.len());
    let mut last_was_sep = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_sep = false;
        } else if !last_was_sep && !out.is_empty() {
            out.push('_');
            last_was_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'a');
    }
    if RESERVED.contains(&out.as_str()) {
        out.push('_');
    }
    if out.is_empty() {
        out.push_str("col");
    }
    out
}
