use std::fmt::Write as _;
use std::sync::Arc;

use tokio_postgres::types::ToSql;

use super::builder::{Fragment, FragmentKind};
use super::parts::{Binding, Token};
use crate::error::{QueryError, QueryResult};

/// Maximum fragment nesting depth accepted by the composer.
///
/// Ownership makes true cycles unrepresentable, but a pathologically deep
/// tree would still produce an unusable statement; flattening is bounded so
/// composition fails instead.
pub(crate) const MAX_DEPTH: usize = 32;

/// A compiled statement: final SQL text plus its ordered parameters.
///
/// Invariants: the number of `$n` placeholders in [`sql`](Self::sql) equals
/// [`param_count`](Self::param_count), and numbering is contiguous starting
/// at `$1`, in left-to-right occurrence order.
#[derive(Debug)]
pub struct CompiledQuery {
    sql: String,
    params: Vec<Binding>,
}

impl CompiledQuery {
    /// The final SQL text with `$1, $2, ...` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}

impl Fragment {
    /// Flatten this fragment tree into a [`CompiledQuery`].
    ///
    /// Nested fragments are spliced in place with their bindings renumbered
    /// to continue the running placeholder sequence. Fails with
    /// [`QueryError::Composition`] if the statement flattens to nothing or
    /// the tree nests deeper than the composer's bound.
    pub fn compile(&self) -> QueryResult<CompiledQuery> {
        let mut sql = String::new();
        let mut params: Vec<Binding> = Vec::new();
        flatten(self, &mut sql, &mut params)?;

        if sql.trim().is_empty() {
            return Err(QueryError::composition(
                "Cannot compile an empty statement",
            ));
        }

        Ok(CompiledQuery { sql, params })
    }
}

/// Walk the fragment tree with an explicit work stack; the stack height is
/// the current nesting depth.
fn flatten<'a>(
    root: &'a Fragment,
    out: &mut String,
    params: &mut Vec<Binding>,
) -> QueryResult<()> {
    let mut stack: Vec<std::slice::Iter<'a, Token>> = Vec::new();

    match &root.kind {
        FragmentKind::Literal(text) => {
            out.push_str(text);
            return Ok(());
        }
        FragmentKind::Parameterized(tokens) => stack.push(tokens.iter()),
    }

    loop {
        let token = {
            let Some(top) = stack.last_mut() else { break };
            top.next()
        };

        let Some(token) = token else {
            stack.pop();
            continue;
        };

        match token {
            Token::Text(text) => out.push_str(text),
            Token::Ident(ident) => ident.write_sql(out),
            Token::Bind(value) => {
                params.push(Arc::clone(value));
                let _ = write!(out, "${}", params.len());
            }
            Token::Nested(inner) => match &inner.kind {
                FragmentKind::Literal(text) => out.push_str(text),
                FragmentKind::Parameterized(tokens) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(QueryError::composition(format!(
                            "Fragment nesting exceeds {MAX_DEPTH} levels"
                        )));
                    }
                    stack.push(tokens.iter());
                }
            },
        }
    }

    Ok(())
}
