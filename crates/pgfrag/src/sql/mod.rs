//! Composable SQL fragments.
//!
//! A [`Fragment`] stores SQL pieces and parameters separately, so callers
//! compose statements dynamically without tracking placeholder indices and
//! without any path for a value to leak into statement text.
//!
//! # Example
//!
//! ```ignore
//! use pgfrag::frag;
//!
//! let mut q = frag("SELECT id, username FROM users WHERE 1=1");
//! if let Some(status) = status {
//!     q.push(" AND status = ").push_bind(status);
//! }
//! q.push(" ORDER BY created_at DESC");
//!
//! let users = q.fetch_all(&conn).await?;
//! ```

mod builder;
mod compile;
mod exec;
mod parts;


pub use builder::Fragment;
pub use compile::CompiledQuery;

/// Start building a SQL fragment.
pub fn frag(initial_sql: impl Into<String>) -> Fragment {
    Fragment::new(initial_sql)
}

/// Strip leading whitespace, SQL comments (`--` and `/* */`), and parentheses
/// from a SQL string to find the first meaningful keyword.
pub(crate) fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        // Trim whitespace
        s = s.trim_start();
        // Skip line comments
        if s.starts_with("--") {
            if let Some(pos) = s.find('\n') {
                s = &s[pos + 1..];
                continue;
            }
            return ""; // comment is the whole remaining string
        }
        // Skip block comments
        if s.starts_with("/*") {
            if let Some(pos) = s.find("*/") {
                s = &s[pos + 2..];
                continue;
            }
            return ""; // unclosed block comment
        }
        // Skip leading parentheses
        if s.starts_with('(') {
            s = &s[1..];
            continue;
        }
        if s == before {
            break;
        }
    }
    s
}

pub(crate) fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    match s.get(0..keyword.len()) {
        Some(prefix) => prefix.eq_ignore_ascii_case(keyword),
        None => false,
    }
}
