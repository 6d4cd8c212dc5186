use std::sync::Arc;

use serde::Serialize;
use tokio_postgres::types::ToSql;

use super::parts::{Binding, Token};
use crate::error::{QueryError, QueryResult};
use crate::ident::IntoIdent;

/// A composable, parameter-safe piece of SQL.
///
/// `Fragment` stores SQL text and parameters separately and generates
/// `$1, $2, ...` placeholders automatically when [compiled](Fragment::compile).
/// Fragments nest: a fragment interpolated into another keeps its bindings,
/// which are renumbered to continue the outer placeholder sequence.
#[must_use]
#[derive(Debug)]
pub struct Fragment {
    pub(crate) kind: FragmentKind,
}

/// The two flavors of fragment.
#[derive(Debug)]
pub(crate) enum FragmentKind {
    /// Verbatim SQL text, spliced as-is. Only [`Fragment::raw`] builds this.
    Literal(String),
    /// Interleaved text, bindings, identifiers, and nested fragments.
    Parameterized(Vec<Token>),
}

impl Fragment {
    /// Create a new fragment with an initial SQL segment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        let initial_sql = initial_sql.into();
        let tokens = if initial_sql.is_empty() {
            Vec::new()
        } else {
            vec![Token::Text(initial_sql)]
        };
        Self {
            kind: FragmentKind::Parameterized(tokens),
        }
    }

    /// Create an empty fragment.
    pub fn empty() -> Self {
        Self {
            kind: FragmentKind::Parameterized(Vec::new()),
        }
    }

    /// Create a verbatim fragment that bypasses all escaping.
    ///
    /// This is the explicit opt-out of the safety layer: the text is spliced
    /// into the statement exactly as given. Never pass caller-controlled data
    /// here; use [`Fragment::push_bind`] for values and
    /// [`Fragment::push_ident`] for names.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Literal(sql.into()),
        }
    }

    /// Build a comma-list fragment binding each value: `$1, $2, $3`.
    ///
    /// Useful nested inside `IN (...)`. If `values` is empty the fragment
    /// renders `NULL` (so `IN (NULL)` is valid SQL, matching nothing).
    pub fn list<T>(values: impl IntoIterator<Item = T>) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        let mut fragment = Self::empty();
        fragment.push_bind_list(values);
        fragment
    }

    /// Join fragments with a separator: `join([a, b, c], ", ")`.
    ///
    /// Used for `IN (...)` member lists and bulk-insert row lists. Each
    /// sub-fragment keeps its own bindings.
    pub fn join(fragments: impl IntoIterator<Item = Fragment>, separator: &str) -> Self {
        let mut out = Self::empty();
        for (i, fragment) in fragments.into_iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_fragment(fragment);
        }
        out
    }

    fn tokens_mut(&mut self) -> &mut Vec<Token> {
        // A literal promotes to a single-text parameterized fragment the
        // first time something is appended; the rendered SQL is unchanged.
        if let FragmentKind::Literal(text) = &mut self.kind {
            let text = std::mem::take(text);
            let tokens = if text.is_empty() {
                Vec::new()
            } else {
                vec![Token::Text(text)]
            };
            self.kind = FragmentKind::Parameterized(tokens);
        }
        match &mut self.kind {
            FragmentKind::Parameterized(tokens) => tokens,
            FragmentKind::Literal(_) => unreachable!("literal promoted above"),
        }
    }

    /// Append literal SQL text (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        let tokens = self.tokens_mut();
        match tokens.last_mut() {
            Some(Token::Text(last)) => last.push_str(sql),
            _ => tokens.push(Token::Text(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    ///
    /// The value never enters the statement text; it travels to the driver
    /// in the parameter list. `Option<T>` binds SQL `NULL` for `None`.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.push_bind_value(Arc::new(value))
    }

    pub(crate) fn push_bind_value(&mut self, value: Binding) -> &mut Self {
        self.tokens_mut().push(Token::Bind(value));
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    ///
    /// If `values` is empty, this appends `NULL` (so `IN (NULL)` is valid SQL
    /// but matches nothing, since nothing equals NULL).
    pub fn push_bind_list<T>(&mut self, values: impl IntoIterator<Item = T>) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("NULL");
        };

        self.push_bind(first);
        for v in iter {
            self.push(", ");
            self.push_bind(v);
        }
        self
    }

    /// Serialize a value to JSON and bind it as a `jsonb` parameter.
    pub fn push_json<T: Serialize>(&mut self, value: &T) -> QueryResult<&mut Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| QueryError::Serialization(e.to_string()))?;
        Ok(self.push_bind(json))
    }

    /// Append another fragment, consuming it.
    ///
    /// The nested fragment's text is spliced at this position and its
    /// bindings are renumbered into the outer sequence at compile time.
    pub fn push_fragment(&mut self, other: Fragment) -> &mut Self {
        self.tokens_mut().push(Token::Nested(other));
        self
    }

    /// Append a SQL identifier (schema/table/column) safely.
    ///
    /// Identifiers cannot be parameterized in PostgreSQL, so they are
    /// rendered as quoted, escaped text instead — see [`Ident`](crate::Ident).
    pub fn push_ident(&mut self, ident: impl IntoIdent) -> QueryResult<&mut Self> {
        let ident = ident.into_ident()?;
        self.tokens_mut().push(Token::Ident(ident));
        Ok(self)
    }
}
