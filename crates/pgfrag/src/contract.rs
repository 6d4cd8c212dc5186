//! Result-cardinality contracts.
//!
//! A [`Cardinality`] declares how many rows a query is expected to return;
//! [`enforce`] turns that declaration into a runtime check over the driver's
//! result set. All checks are pure functions of row count and column count:
//! the enforcer never mutates or reorders rows and performs no I/O, so it
//! only ever fails *after* the driver has successfully returned rows.
//!
//! | Policy          | 0 rows     | 1 row        | >1 rows         |
//! |-----------------|------------|--------------|-----------------|
//! | `ExactlyOne`    | `NotFound` | row          | `DataIntegrity` |
//! | `AtMostOne`     | `None`     | `Some(row)`  | `DataIntegrity` |
//! | `AtLeastOne`    | `NotFound` | rows         | rows            |
//! | `Any`           | `[]`       | rows         | rows            |
//! | `ExactlyOneValue` | `NotFound` | row        | `DataIntegrity` |
//! | `AtMostOneValue`  | `None`   | `Some(row)`  | `DataIntegrity` |
//!
//! The value policies additionally require every returned row to have
//! exactly one column, failing with `DataIntegrity` otherwise regardless of
//! row count.

use crate::error::{QueryError, QueryResult};

/// The caller's declared expectation about how many rows a query returns.
///
/// Chosen per call site and stateless; the `fetch_*` methods on
/// [`Fragment`](crate::Fragment) each map to one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Exactly one row.
    ExactlyOne,
    /// Zero or one row.
    AtMostOne,
    /// One or more rows.
    AtLeastOne,
    /// Any number of rows, including none.
    Any,
    /// Exactly one row with exactly one column.
    ExactlyOneValue,
    /// Zero or one row, with exactly one column when present.
    AtMostOneValue,
}

impl Cardinality {
    /// Whether this policy requires rows to carry a single column.
    pub fn expects_single_column(self) -> bool {
        matches!(self, Self::ExactlyOneValue | Self::AtMostOneValue)
    }
}

/// Minimal view of a driver row: the enforcer only ever inspects shape.
///
/// Implemented for `tokio_postgres::Row`; tests use stub rows.
pub trait ResultRow {
    /// Number of columns in the row.
    fn width(&self) -> usize;
}

impl ResultRow for tokio_postgres::Row {
    fn width(&self) -> usize {
        self.len()
    }
}

/// The shape produced by [`enforce`], matching the policy's contract.
#[derive(Debug)]
pub enum Enforced<R> {
    /// A single row (`ExactlyOne`, `ExactlyOneValue`).
    Row(R),
    /// An optional row (`AtMostOne`, `AtMostOneValue`).
    MaybeRow(Option<R>),
    /// Zero or more rows in driver order (`AtLeastOne`, `Any`).
    Rows(Vec<R>),
}

impl<R> Enforced<R> {
    pub(crate) fn expect_row(self) -> R {
        match self {
            Self::Row(row) => row,
            _ => unreachable!("policy guarantees a single row"),
        }
    }

    pub(crate) fn expect_maybe_row(self) -> Option<R> {
        match self {
            Self::MaybeRow(row) => row,
            _ => unreachable!("policy guarantees an optional row"),
        }
    }

    pub(crate) fn expect_rows(self) -> Vec<R> {
        match self {
            Self::Rows(rows) => rows,
            _ => unreachable!("policy guarantees a row list"),
        }
    }
}

/// Require that every row carries exactly one column.
pub(crate) fn ensure_single_column<R: ResultRow>(rows: &[R]) -> QueryResult<()> {
    for row in rows {
        let width = row.width();
        if width != 1 {
            return Err(QueryError::data_integrity(format!(
                "Expected a single-column result, got {width} columns"
            )));
        }
    }
    Ok(())
}

/// Apply a cardinality policy to a raw result set.
///
/// Rows are consumed and handed back in driver order; the only inspection is
/// `rows.len()` and, for the value policies, each row's column count.
pub fn enforce<R: ResultRow>(policy: Cardinality, mut rows: Vec<R>) -> QueryResult<Enforced<R>> {
    if policy.expects_single_column() {
        ensure_single_column(&rows)?;
    }

    match policy {
        Cardinality::ExactlyOne | Cardinality::ExactlyOneValue => match rows.len() {
            0 => Err(QueryError::not_found("Expected 1 row, got 0")),
            1 => Ok(Enforced::Row(rows.pop().expect("len == 1"))),
            got => Err(QueryError::data_integrity(format!(
                "Expected 1 row, got {got}"
            ))),
        },
        Cardinality::AtMostOne | Cardinality::AtMostOneValue => match rows.len() {
            0 | 1 => Ok(Enforced::MaybeRow(rows.pop())),
            got => Err(QueryError::data_integrity(format!(
                "Expected at most 1 row, got {got}"
            ))),
        },
        Cardinality::AtLeastOne => {
            if rows.is_empty() {
                Err(QueryError::not_found("Expected at least 1 row, got 0"))
            } else {
                Ok(Enforced::Rows(rows))
            }
        }
        Cardinality::Any => Ok(Enforced::Rows(rows)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stub row carrying only a column count.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct FakeRow {
        id: usize,
        width: usize,
    }

    impl FakeRow {
        fn new(id: usize) -> Self {
            Self { id, width: 1 }
        }

        fn wide(id: usize, width: usize) -> Self {
            Self { id, width }
        }
    }

    impl ResultRow for FakeRow {
        fn width(&self) -> usize {
            self.width
        }
    }

    fn rows(n: usize) -> Vec<FakeRow> {
        (0..n).map(FakeRow::new).collect()
    }

    #[test]
    fn exactly_one_returns_the_row() {
        match enforce(Cardinality::ExactlyOne, rows(1)).unwrap() {
            Enforced::Row(row) => assert_eq!(row.id, 0),
            other => panic!("expected Row, got {other:?}"),
        }
    }

    #[test]
    fn exactly_one_rejects_zero_rows() {
        let err = enforce(Cardinality::ExactlyOne, rows(0)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn exactly_one_rejects_two_rows() {
        let err = enforce(Cardinality::ExactlyOne, rows(2)).unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn at_most_one_returns_none_on_empty() {
        match enforce(Cardinality::AtMostOne, rows(0)).unwrap() {
            Enforced::MaybeRow(None) => {}
            other => panic!("expected MaybeRow(None), got {other:?}"),
        }
    }

    #[test]
    fn at_most_one_returns_some_row() {
        match enforce(Cardinality::AtMostOne, rows(1)).unwrap() {
            Enforced::MaybeRow(Some(row)) => assert_eq!(row.id, 0),
            other => panic!("expected MaybeRow(Some), got {other:?}"),
        }
    }

    #[test]
    fn at_most_one_rejects_two_rows() {
        let err = enforce(Cardinality::AtMostOne, rows(2)).unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn at_least_one_rejects_zero_rows() {
        let err = enforce(Cardinality::AtLeastOne, rows(0)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn at_least_one_keeps_driver_order() {
        match enforce(Cardinality::AtLeastOne, rows(3)).unwrap() {
            Enforced::Rows(out) => {
                assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![0, 1, 2]);
            }
            other => panic!("expected Rows, got {other:?}"),
        }
    }

    #[test]
    fn any_accepts_zero_one_and_many() {
        for n in 0..3 {
            match enforce(Cardinality::Any, rows(n)).unwrap() {
                Enforced::Rows(out) => assert_eq!(out.len(), n),
                other => panic!("expected Rows, got {other:?}"),
            }
        }
    }

    #[test]
    fn value_policies_require_single_column() {
        let err = enforce(Cardinality::ExactlyOneValue, vec![FakeRow::wide(0, 2)]).unwrap_err();
        assert!(err.is_data_integrity());

        let err = enforce(Cardinality::AtMostOneValue, vec![FakeRow::wide(0, 0)]).unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn value_policy_column_check_applies_to_every_row() {
        let input = vec![FakeRow::new(0), FakeRow::wide(1, 3)];
        let err = enforce(Cardinality::AtMostOneValue, input).unwrap_err();
        // Column-count violation wins even though the row count is also wrong.
        assert!(err.is_data_integrity());
    }

    #[test]
    fn exactly_one_value_rejects_zero_rows() {
        let err = enforce(Cardinality::ExactlyOneValue, rows(0)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn at_most_one_value_returns_none_on_empty() {
        match enforce(Cardinality::AtMostOneValue, rows(0)).unwrap() {
            Enforced::MaybeRow(None) => {}
            other => panic!("expected MaybeRow(None), got {other:?}"),
        }
    }

    /// Every policy crossed with 0, 1, and 2 rows.
    #[test]
    fn policy_table_by_construction() {
        use Cardinality::*;

        enum Expect {
            Ok,
            NotFound,
            Integrity,
        }

        let table = [
            (ExactlyOne, 0, Expect::NotFound),
            (ExactlyOne, 1, Expect::Ok),
            (ExactlyOne, 2, Expect::Integrity),
            (AtMostOne, 0, Expect::Ok),
            (AtMostOne, 1, Expect::Ok),
            (AtMostOne, 2, Expect::Integrity),
            (AtLeastOne, 0, Expect::NotFound),
            (AtLeastOne, 1, Expect::Ok),
            (AtLeastOne, 2, Expect::Ok),
            (Any, 0, Expect::Ok),
            (Any, 1, Expect::Ok),
            (Any, 2, Expect::Ok),
            (ExactlyOneValue, 0, Expect::NotFound),
            (ExactlyOneValue, 1, Expect::Ok),
            (ExactlyOneValue, 2, Expect::Integrity),
            (AtMostOneValue, 0, Expect::Ok),
            (AtMostOneValue, 1, Expect::Ok),
            (AtMostOneValue, 2, Expect::Integrity),
        ];

        for (policy, n, expect) in table {
            let outcome = enforce(policy, rows(n));
            match expect {
                Expect::Ok => assert!(outcome.is_ok(), "{policy:?} with {n} rows should pass"),
                Expect::NotFound => assert!(
                    outcome.unwrap_err().is_not_found(),
                    "{policy:?} with {n} rows should be NotFound"
                ),
                Expect::Integrity => assert!(
                    outcome.unwrap_err().is_data_integrity(),
                    "{policy:?} with {n} rows should be DataIntegrity"
                ),
            }
        }
    }

    #[test]
    fn enforcement_is_idempotent() {
        let input = rows(2);
        let first = enforce(Cardinality::ExactlyOne, input.clone());
        let second = enforce(Cardinality::ExactlyOne, input);
        assert!(first.unwrap_err().is_data_integrity());
        assert!(second.unwrap_err().is_data_integrity());
    }
}
