//! Query construction for collection listings.
//!
//! A [`Query`] combines an optional filter expression with an ordering, a
//! start-after cursor and offset/limit paging. Backends translate it through
//! [`QueryVisitor`].
//!
//! ```ignore
//! use bookshelf_core::query::{Filter, Query, SortDirection};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("createdById", "u1"))
//!     .order_by("title", SortDirection::Asc)
//!     .start_after("Dune")
//!     .limit(10)
//!     .build();
//! ```
//!
//! # Cursor semantics
//!
//! Ordering by a field restricts the result to documents that carry that field.
//! `start_after` keeps only documents whose ordering field sorts strictly after
//! the cursor value in the query's direction, and is only valid together with
//! an ordering. `offset` is applied after the cursor, `limit` last.

use bson::Bson;

use crate::error::{StoreError, StoreResult};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Ordering specification for query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to order by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    /// The comparison operator that selects documents strictly after a cursor.
    pub fn cursor_op(&self) -> FieldOp {
        match self.direction {
            SortDirection::Asc => FieldOp::Gt,
            SortDirection::Desc => FieldOp::Lt,
        }
    }
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A filter expression for querying documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression.
    Not(Box<Expr>),
    /// Checks if a field exists or doesn't exist.
    Exists(String, bool),
    /// Field comparison expression.
    Field {
        field: String,
        op: FieldOp,
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression.
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }
}

/// A structured query for listing documents of one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Optional filter expression to match documents.
    pub filter: Option<Expr>,
    /// Ordering of the result.
    pub sort: Option<Sort>,
    /// Cursor value on the ordering field; results start strictly after it.
    pub start_after: Option<Bson>,
    /// Number of documents to skip after the cursor.
    pub offset: Option<usize>,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Returns a copy of this query that skips `offset` documents past the cursor.
    ///
    /// Listing uses this to check whether another page follows the current one.
    pub fn with_offset(&self, offset: usize) -> Self {
        Query {
            offset: Some(offset),
            ..self.clone()
        }
    }

    /// Checks the invariants every backend relies on before executing.
    pub fn validate(&self) -> StoreResult<()> {
        if self.limit == Some(0) {
            return Err(StoreError::InvalidQuery("limit must be positive".to_string()));
        }
        if self.start_after.is_some() && self.sort.is_none() {
            return Err(StoreError::InvalidQuery(
                "start_after requires an ordering".to_string(),
            ));
        }

        Ok(())
    }

    /// The complete filter a backend has to apply: the user filter, the
    /// existence of the ordering field and the cursor bound, combined with AND.
    pub fn effective_filter(&self) -> Option<Expr> {
        let mut parts = Vec::new();

        if let Some(filter) = &self.filter {
            parts.push(filter.clone());
        }
        if let Some(sort) = &self.sort {
            parts.push(Filter::exists(sort.field.clone()));

            if let Some(cursor) = &self.start_after {
                parts.push(Expr::field(sort.field.clone(), sort.cursor_op(), cursor.clone()));
            }
        }

        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Expr::And(parts)),
        }
    }
}

/// Helper for constructing filter expressions.
///
/// ```ignore
/// let expr = Filter::eq("createdById", "u1").and(Filter::gt("pages", 100));
/// ```
pub struct Filter;

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Matches documents where the field is present.
    pub fn exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), true)
    }

    /// Matches documents where the field is absent.
    pub fn not_exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), false)
    }

    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets the filter expression. Calling it again combines with AND.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(match self.query.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Orders results by `field`.
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort { field: field.into(), direction });
        self
    }

    /// Starts results strictly after `value` on the ordering field.
    pub fn start_after(mut self, value: impl Into<Bson>) -> Self {
        self.query.start_after = Some(value.into());
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Walks a filter expression, producing a backend-specific output.
pub trait QueryVisitor {
    type Output;
    type Error: Into<StoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_combines_repeated_filters() {
        let query = Query::builder()
            .filter(Filter::eq("createdById", "u1"))
            .filter(Filter::ne("title", ""))
            .build();

        assert_eq!(
            query.filter,
            Some(Expr::And(vec![Filter::eq("createdById", "u1"), Filter::ne("title", "")]))
        );
    }

    #[test]
    fn effective_filter_adds_existence_and_cursor_bound() {
        let query = Query::builder()
            .filter(Filter::eq("createdById", "u1"))
            .order_by("title", SortDirection::Asc)
            .start_after("B")
            .build();

        assert_eq!(
            query.effective_filter(),
            Some(Expr::And(vec![
                Filter::eq("createdById", "u1"),
                Filter::exists("title"),
                Filter::gt("title", "B"),
            ]))
        );
    }

    #[test]
    fn descending_cursor_selects_smaller_values() {
        let query = Query::builder()
            .order_by("title", SortDirection::Desc)
            .start_after("M")
            .build();

        assert_eq!(
            query.effective_filter(),
            Some(Expr::And(vec![Filter::exists("title"), Filter::lt("title", "M")]))
        );
    }

    #[test]
    fn unordered_query_has_no_implicit_filter() {
        assert_eq!(Query::new().effective_filter(), None);
    }

    #[test]
    fn validation_rejects_zero_limit_and_unordered_cursor() {
        let zero = Query::builder().order_by("title", SortDirection::Asc).limit(0).build();
        let cursor = Query::builder().start_after("A").build();

        assert!(matches!(zero.validate(), Err(StoreError::InvalidQuery(_))));
        assert!(matches!(cursor.validate(), Err(StoreError::InvalidQuery(_))));
        assert!(Query::builder().order_by("title", SortDirection::Asc).limit(5).build().validate().is_ok());
    }

    #[test]
    fn with_offset_keeps_everything_else() {
        let query = Query::builder()
            .order_by("title", SortDirection::Asc)
            .start_after("B")
            .limit(2)
            .build();
        let lookahead = query.with_offset(2);

        assert_eq!(lookahead.offset, Some(2));
        assert_eq!(lookahead.limit, Some(2));
        assert_eq!(lookahead.start_after, query.start_after);
        assert_eq!(lookahead.sort, query.sort);
    }
}
