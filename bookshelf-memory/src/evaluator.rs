//! Filter evaluation and value ordering for in-memory queries.

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, Document, datetime::DateTime};

use bookshelf_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::{StoreError, StoreResult},
};


/// Comparable view of a BSON value.
///
/// Integers and floats are normalized to `f64`. Values of different kinds are
/// never equal; for ordering they are ranked by kind first
/// (null < bool < number < datetime < string < array < map).
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> Comparable<'a> {
    fn rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Bool(_) => 1,
            Comparable::Number(_) => 2,
            Comparable::DateTime(_) => 3,
            Comparable::String(_) => 4,
            Comparable::Array(_) => 5,
            Comparable::Map(_) => 6,
        }
    }

    /// Total order used for sorting query results.
    ///
    /// Numbers use `f64::total_cmp` (NaN sorts above every other number),
    /// arrays compare element-wise and maps compare their entries in key order.
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a.total_cmp(b),
            (Comparable::Array(a), Comparable::Array(b)) => Self::cmp_sequences(
                a.iter().map(|item| (None, item)),
                b.iter().map(|item| (None, item)),
            ),
            (Comparable::Map(a), Comparable::Map(b)) => Self::cmp_sequences(
                Self::sorted_entries(a),
                Self::sorted_entries(b),
            ),
            _ => self
                .partial_cmp(other)
                .unwrap_or_else(|| self.rank().cmp(&other.rank())),
        }
    }

    fn sorted_entries<'m>(map: &'m HashMap<&'a str, Comparable<'a>>) -> Vec<(Option<&'a str>, &'m Comparable<'a>)> {
        let mut entries: Vec<_> = map.iter().map(|(key, value)| (Some(*key), value)).collect();
        entries.sort_by_key(|(key, _)| *key);
        entries
    }

    fn cmp_sequences<'m>(
        left: impl IntoIterator<Item = (Option<&'a str>, &'m Comparable<'a>)>,
        right: impl IntoIterator<Item = (Option<&'a str>, &'m Comparable<'a>)>,
    ) -> Ordering
    where
        'a: 'm,
    {
        let mut left = left.into_iter();
        let mut right = right.into_iter();

        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some((left_key, left_value)), Some((right_key, right_value))) => {
                    let ordering = left_key
                        .cmp(&right_key)
                        .then_with(|| left_value.sort_cmp(right_value));
                    if ordering.is_ne() {
                        return ordering;
                    }
                }
            }
        }
    }
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(arr.iter().map(Comparable::from).collect()),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect()
            ),
            // Binary, ObjectId and the rest carry no ordering we rely on
            _ => Comparable::Null,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}


/// Evaluates filter expressions against one document.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> StoreResult<bool> {
        self.visit_expr(expr)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(self.document.contains_key(field) == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.document.get(field) else {
            return Ok(false);
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(value);

        Ok(match op {
            FieldOp::Eq => left == right,
            FieldOp::Ne => left != right,
            // Range comparisons only hold between values of the same kind
            FieldOp::Gt => left.partial_cmp(&right) == Some(Ordering::Greater),
            FieldOp::Gte => matches!(left.partial_cmp(&right), Some(Ordering::Greater | Ordering::Equal)),
            FieldOp::Lt => left.partial_cmp(&right) == Some(Ordering::Less),
            FieldOp::Lte => matches!(left.partial_cmp(&right), Some(Ordering::Less | Ordering::Equal)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bookshelf_core::query::Filter;

    fn matches(document: &Document, expr: Expr) -> bool {
        DocumentEvaluator::new(document).evaluate(&expr).unwrap()
    }

    #[test]
    fn equality_normalizes_numbers() {
        let book = doc! { "pages": 300_i32, "rating": 4.5 };

        assert!(matches(&book, Filter::eq("pages", 300_i64)));
        assert!(matches(&book, Filter::ne("rating", 4.0)));
    }

    #[test]
    fn range_operators_compare_strings_lexicographically() {
        let book = doc! { "title": "B" };

        assert!(matches(&book, Filter::gt("title", "A")));
        assert!(!matches(&book, Filter::gt("title", "B")));
        assert!(matches(&book, Filter::gte("title", "B")));
        assert!(matches(&book, Filter::lt("title", "C")));
        assert!(matches(&book, Filter::lte("title", "B")));
    }

    #[test]
    fn range_operators_never_match_across_kinds() {
        let book = doc! { "title": "B" };

        assert!(!matches(&book, Filter::gt("title", 1)));
        assert!(!matches(&book, Filter::lt("title", 1)));
    }

    #[test]
    fn missing_fields_only_match_non_existence() {
        let book = doc! { "title": "B" };

        assert!(!matches(&book, Filter::eq("createdById", "u1")));
        assert!(matches(&book, Filter::not_exists("createdById")));
        assert!(matches(&book, Filter::exists("title")));
    }

    #[test]
    fn logical_combinators() {
        let book = doc! { "title": "B", "createdById": "u1" };

        assert!(matches(&book, Filter::and([Filter::eq("createdById", "u1"), Filter::exists("title")])));
        assert!(matches(&book, Filter::or([Filter::eq("createdById", "u2"), Filter::eq("title", "B")])));
        assert!(matches(&book, Filter::eq("createdById", "u2").not()));
    }

    #[test]
    fn sort_order_ranks_kinds_before_values() {
        let null = Bson::Null;
        let number = Bson::Int32(7);
        let text = Bson::String("a".into());

        assert_eq!(Comparable::from(&null).sort_cmp(&Comparable::from(&number)), Ordering::Less);
        assert_eq!(Comparable::from(&text).sort_cmp(&Comparable::from(&number)), Ordering::Greater);
        assert_eq!(Comparable::from(&text).sort_cmp(&Comparable::from(&text)), Ordering::Equal);
    }

    #[test]
    fn sort_order_is_total_for_nan_arrays_and_maps() {
        let values = vec![
            Bson::Double(f64::NAN),
            Bson::Array(vec![Bson::Int32(2)]),
            Bson::Document(doc! { "b": 1 }),
            Bson::Double(1.0),
            Bson::Array(vec![Bson::Int32(1), Bson::Int32(5)]),
            Bson::Document(doc! { "a": 2 }),
            Bson::Array(vec![Bson::Int32(1)]),
            Bson::Document(doc! { "a": 1 }),
        ];

        let mut sorted: Vec<&Bson> = values.iter().collect();
        sorted.sort_by(|a, b| Comparable::from(*a).sort_cmp(&Comparable::from(*b)));

        let nan = Comparable::from(&values[0]);
        assert_eq!(nan.sort_cmp(&nan), Ordering::Equal);
        assert_eq!(sorted[0], &Bson::Double(1.0));
        assert!(matches!(sorted[1], Bson::Double(value) if value.is_nan()));
        assert_eq!(
            &sorted[2..],
            &[
                &Bson::Array(vec![Bson::Int32(1)]),
                &Bson::Array(vec![Bson::Int32(1), Bson::Int32(5)]),
                &Bson::Array(vec![Bson::Int32(2)]),
                &Bson::Document(doc! { "a": 1 }),
                &Bson::Document(doc! { "a": 2 }),
                &Bson::Document(doc! { "b": 1 }),
            ]
        );
    }
}
