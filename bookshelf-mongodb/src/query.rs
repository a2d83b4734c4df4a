//! Translation of bookshelf filter expressions into MongoDB filter documents.

use bson::{Document, Bson, doc};

use bookshelf_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::StoreError,
};

use crate::sanitizer::KeySanitizer;


/// Translates filter expressions into MongoDB's native filter syntax.
pub(crate) struct MongoQueryTranslator;

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        // $not only wraps operator expressions; $nor negates a whole filter
        let inner = self.visit_expr(expr)?;

        Ok(doc! { "$nor": [inner] })
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        let key = KeySanitizer::sanitize_key(field);

        Ok(doc! { key: { "$exists": should_exist } })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let operator = match op {
            FieldOp::Eq => "$eq",
            FieldOp::Ne => "$ne",
            FieldOp::Gt => "$gt",
            FieldOp::Gte => "$gte",
            FieldOp::Lt => "$lt",
            FieldOp::Lte => "$lte",
        };

        let key = KeySanitizer::sanitize_key(field);

        Ok(doc! { key: { operator: value.clone() } })
    }
}
