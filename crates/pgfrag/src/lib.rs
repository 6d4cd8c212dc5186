//! # pgfrag
//!
//! Composable, injection-safe SQL fragments and row-cardinality contracts
//! for PostgreSQL.
//!
//! ## Features
//!
//! - **Safe composition**: values bind as parameters, identifiers render
//!   quoted and escaped; the only unescaped path is the loudly named
//!   [`Fragment::raw`]
//! - **Nesting**: fragments interpolate into fragments, placeholders
//!   renumber automatically
//! - **Cardinality contracts**: declare how many rows you expect
//!   (`fetch_one`, `fetch_maybe_one`, `fetch_many`, ...) and get a typed
//!   error when the database disagrees
//! - **Transaction-friendly**: pass a transaction anywhere a
//!   [`GenericClient`] is expected
//!
//! ## Example
//!
//! ```ignore
//! use pgfrag::{frag, Fragment};
//!
//! let mut q = frag("SELECT id, username FROM users WHERE status = ");
//! q.push_bind("active");
//! q.push(" AND team_id IN (");
//! q.push_fragment(Fragment::list(team_ids));
//! q.push(")");
//!
//! // Exactly one row or a typed error (NotFound / DataIntegrity).
//! let row = q.fetch_one(&client).await?;
//! ```

pub mod client;
pub mod contract;
pub mod error;
pub mod ident;
pub mod prelude;
pub mod sql;

pub use client::{GenericClient, RowStream, StreamingClient};
pub use contract::{enforce, Cardinality, Enforced, ResultRow};
pub use error::{QueryError, QueryResult};
pub use ident::{Ident, IntoIdent};
pub use sql::{frag, CompiledQuery, Fragment};
