//! Field name escaping for MongoDB.
//!
//! MongoDB field names may not contain `.` or `$` or NUL, all of which are legal in
//! schema-less payloads. Keys are percent-escaped on the way in and restored on
//! the way out; values are stored untouched. `%` itself is escaped first, so
//! every key survives the round trip.

use bson::{Bson, Document};


pub(crate) struct KeySanitizer;

impl KeySanitizer {
    // `%` leads; restoring walks the table backwards so it is decoded last
    const REPLACEMENTS: [(&'static str, &'static str); 4] = [
        ("%", "%25"),
        (".", "%2E"),
        ("$", "%24"),
        ("\0", "%00"),
    ];

    /// Escapes every key of `document`, recursing into nested documents and arrays.
    pub(crate) fn sanitize_document(document: &Document) -> Document {
        document
            .iter()
            .map(|(k, v)| (Self::sanitize_key(k), Self::map_value(v, Self::sanitize_document)))
            .collect()
    }

    /// Reverts [`sanitize_document`](Self::sanitize_document).
    pub(crate) fn restore_document(document: &Document) -> Document {
        document
            .iter()
            .map(|(k, v)| (Self::restore_key(k), Self::map_value(v, Self::restore_document)))
            .collect()
    }

    pub(crate) fn sanitize_key(input: &str) -> String {
        let mut sanitized = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter() {
            sanitized = sanitized.replace(*target, *replacement);
        }
        sanitized
    }

    pub(crate) fn restore_key(input: &str) -> String {
        let mut restored = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter().rev() {
            restored = restored.replace(*replacement, *target);
        }
        restored
    }

    fn map_value(value: &Bson, on_document: fn(&Document) -> Document) -> Bson {
        match value {
            Bson::Document(doc) => Bson::Document(on_document(doc)),
            Bson::Array(arr) => Bson::Array(
                arr
                    .iter()
                    .map(|item| Self::map_value(item, on_document))
                    .collect(),
            ),
            _ => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn keys_are_escaped_and_values_kept() {
        let document = doc! {
            "title": "Mr. Smith $5",
            "meta.info": { "$price": 5 },
            "editions": [{ "a.b": 1 }],
        };

        let sanitized = KeySanitizer::sanitize_document(&document);

        assert_eq!(sanitized.get_str("title").ok(), Some("Mr. Smith $5"));
        assert!(sanitized.contains_key("meta%2Einfo"));
        assert!(
            sanitized
                .get_document("meta%2Einfo")
                .unwrap()
                .contains_key("%24price")
        );
        assert_eq!(
            sanitized.get_array("editions").unwrap()[0],
            Bson::Document(doc! { "a%2Eb": 1 })
        );
        assert_eq!(KeySanitizer::restore_document(&sanitized), document);
    }

    #[test]
    fn keys_resembling_escapes_round_trip() {
        for key in ["100%", "%2E", "a.%2E", "__dot__", "$%24"] {
            let sanitized = KeySanitizer::sanitize_key(key);

            assert!(!sanitized.contains('.') && !sanitized.contains('$'));
            assert_eq!(KeySanitizer::restore_key(&sanitized), key);
        }
    }
}
