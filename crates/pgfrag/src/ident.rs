//! Safe SQL identifier handling.
//!
//! This module provides [`Ident`], a schema/table/column name path that is
//! rendered as escaped, quoted SQL text. Identifiers cannot be bound as
//! positional parameters, so they are the one place where caller input
//! becomes statement text; quoting every segment and doubling embedded
//! quotes keeps that path injection-safe.
//!
//! # Example
//! ```ignore
//! use pgfrag::Ident;
//!
//! let t = Ident::parse("public.users")?;
//! assert_eq!(t.to_sql(), r#""public"."users""#);
//! # Ok::<(), pgfrag::QueryError>(())
//! ```

use crate::error::{QueryError, QueryResult};

/// A SQL identifier path (schema, table, or column name).
///
/// Each segment is quoted independently when rendered, so any character
/// except NUL is allowed inside a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    segments: Vec<String>,
}

impl Ident {
    /// Build an identifier from explicit segments.
    ///
    /// Use this form when a segment contains a literal `.`:
    /// `Ident::new(["public", "weird.column"])`.
    pub fn new<I, S>(segments: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(QueryError::composition("Identifier cannot be empty"));
        }
        for seg in &segments {
            if seg.is_empty() {
                return Err(QueryError::composition("Empty identifier segment"));
            }
            if seg.contains('\0') {
                return Err(QueryError::composition(
                    "Identifier cannot contain NUL character",
                ));
            }
        }
        Ok(Self { segments })
    }

    /// Parse a dotted identifier path: `schema.table.column`.
    pub fn parse(path: &str) -> QueryResult<Self> {
        if path.is_empty() {
            return Err(QueryError::composition("Identifier cannot be empty"));
        }
        Self::new(path.split('.'))
    }

    /// The identifier's segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Render the identifier as quoted SQL.
    pub fn to_sql(&self) -> String {
        let mut cap = self.segments.len().saturating_sub(1); // dots
        for seg in &self.segments {
            cap += seg.len() + 2; // surrounding quotes (escapes may add more)
        }
        let mut out = String::with_capacity(cap);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push('"');
            for ch in seg.chars() {
                if ch == '"' {
                    out.push('"');
                    out.push('"');
                } else {
                    out.push(ch);
                }
            }
            out.push('"');
        }
    }
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in the fragment-builder API.
pub trait IntoIdent {
    fn into_ident(self) -> QueryResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> QueryResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> QueryResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> QueryResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> QueryResult<Ident> {
        Ident::parse(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("users").unwrap();
        assert_eq!(ident.to_sql(), r#""users""#);
    }

    #[test]
    fn ident_dotted() {
        let ident = Ident::parse("public.users").unwrap();
        assert_eq!(ident.to_sql(), r#""public"."users""#);
    }

    #[test]
    fn ident_three_parts() {
        let ident = Ident::parse("schema.table.column").unwrap();
        assert_eq!(ident.to_sql(), r#""schema"."table"."column""#);
    }

    #[test]
    fn ident_escapes_embedded_quote() {
        let ident = Ident::new([r#"has"quote"#]).unwrap();
        assert_eq!(ident.to_sql(), r#""has""quote""#);
    }

    #[test]
    fn ident_quotes_injection_attempt() {
        let ident = Ident::new(["users; DROP TABLE users; --"]).unwrap();
        // The whole string is one quoted token, not three statements.
        assert_eq!(ident.to_sql(), r#""users; DROP TABLE users; --""#);
    }

    #[test]
    fn ident_segment_with_literal_dot() {
        let ident = Ident::new(["public", "weird.column"]).unwrap();
        assert_eq!(ident.to_sql(), r#""public"."weird.column""#);
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn ident_rejects_empty_segment() {
        assert!(Ident::parse("schema..table").is_err());
        assert!(Ident::parse("schema.").is_err());
        assert!(Ident::parse(".table").is_err());
    }

    #[test]
    fn ident_rejects_nul() {
        assert!(Ident::new(["bad\0name"]).is_err());
    }

    #[test]
    fn ident_errors_are_composition() {
        let err = Ident::parse("").unwrap_err();
        assert!(err.is_composition());
    }
}
