use std::sync::Arc;

use tokio_postgres::types::ToSql;

use super::builder::Fragment;
use crate::ident::Ident;

/// A bound query parameter, held until compilation assigns it a placeholder.
pub(crate) type Binding = Arc<dyn ToSql + Sync + Send>;

/// One element of a parameterized fragment.
///
/// This is the closed set of things that may be interpolated into a
/// statement: literal text, a bound value, an escaped identifier, or another
/// fragment. Caller data values only ever enter as [`Token::Bind`]; the only
/// token kinds rendered into statement text are template text, identifier
/// quoting, and nested fragment content.
#[derive(Debug)]
pub(crate) enum Token {
    /// Literal SQL text from the template.
    Text(String),
    /// A bound value, rendered as a positional placeholder.
    Bind(Binding),
    /// An identifier path, rendered as escaped quoted text.
    Ident(Ident),
    /// A nested fragment, spliced during compilation.
    Nested(Fragment),
}
