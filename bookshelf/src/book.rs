//! The book entity.

use bson::{Bson, Document};
use serde::{Serialize, Serializer};

use bookshelf_core::document::DocumentExt;

/// Field holding the book title; the listing sort key.
pub const TITLE_FIELD: &str = "title";
/// Field holding the id of the user who created the book.
pub const CREATED_BY_FIELD: &str = "createdById";

/// Caller-supplied book payload. Any fields are accepted.
pub type BookData = Document;

/// A stored book: its identifier and the full payload, `id` included.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    id: String,
    fields: Document,
}

impl Book {
    /// Wraps a stored payload, mirroring `id` into it.
    pub(crate) fn new(id: String, fields: Document) -> Self {
        let fields = fields.with_id(&id);
        Self { id, fields }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.fields.get_str(TITLE_FIELD).ok()
    }

    pub fn created_by_id(&self) -> Option<&str> {
        self.fields.get_str(CREATED_BY_FIELD).ok()
    }

    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn into_fields(self) -> Document {
        self.fields
    }
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Page token for a listing that ended at `book`: its title.
pub(crate) fn title_token(book: &Book) -> Option<String> {
    book.title().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn accessors_read_payload_fields() {
        let book = Book::new(
            "b1".to_string(),
            doc! { "id": "b1", "title": "Dune", "createdById": "u1", "pages": 412 },
        );

        assert_eq!(book.id(), "b1");
        assert_eq!(book.title(), Some("Dune"));
        assert_eq!(book.created_by_id(), Some("u1"));
        assert_eq!(book.get("pages"), Some(&Bson::Int32(412)));
        assert_eq!(book.get("missing"), None);
    }

    #[test]
    fn serializes_as_flat_payload() {
        let book = Book::new("b1".to_string(), doc! { "id": "b1", "title": "Dune" });

        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            serde_json::json!({ "id": "b1", "title": "Dune" })
        );
    }

    #[test]
    fn title_token_is_the_title() {
        let book = Book::new("b1".to_string(), doc! { "title": "Dune" });
        assert_eq!(title_token(&book).as_deref(), Some("Dune"));

        let untitled = Book::new("b2".to_string(), doc! {});
        assert_eq!(title_token(&untitled), None);

        let numbered = Book::new("b3".to_string(), doc! { "title": 1984 });
        assert_eq!(title_token(&numbered), None);
    }

    #[test]
    fn payloads_without_id_gain_it() {
        let book = Book::new("b1".to_string(), doc! { "title": "Dune" });

        assert_eq!(book.fields(), &doc! { "title": "Dune", "id": "b1" });
        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            serde_json::json!({ "title": "Dune", "id": "b1" })
        );
    }
}
