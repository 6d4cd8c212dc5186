//! Convenient imports for typical `pgfrag` usage.
//!
//! This module is intentionally small and focused on the most common APIs so
//! examples can start with:
//!
//! ```ignore
//! use pgfrag::prelude::*;
//! ```

pub use crate::{frag, Fragment, GenericClient, QueryError, QueryResult};

pub use crate::{Cardinality, CompiledQuery, Ident, IntoIdent, RowStream, StreamingClient};
