use bson::doc;
use bookshelf_core::{
    error::StoreError,
    query::{Filter, Query, SortDirection},
    store::{DocumentStore, IntoDynDocumentStore},
};
use bookshelf_memory::InMemoryStore;

#[tokio::test]
async fn document_refs_write_and_read_through_the_collection() {
    let store = DocumentStore::new(InMemoryStore::new());
    let books = store.collection("Book");

    let fresh = books.doc(None);
    let other = books.doc(None);
    assert_ne!(fresh.id(), other.id());
    assert_eq!(fresh.collection(), "Book");

    fresh.set(doc! { "title": "Dune" }).await.unwrap();

    assert_eq!(fresh.get().await.unwrap(), Some(doc! { "title": "Dune" }));
    assert_eq!(other.get().await.unwrap(), None);

    fresh.delete().await.unwrap();
    assert_eq!(books.doc(Some(fresh.id())).get().await.unwrap(), None);
}

#[tokio::test]
async fn collection_queries_are_validated_first() {
    let store = DocumentStore::new(InMemoryStore::new()).into_dyn();

    let result = store
        .collection("Book")
        .query(Query::builder().start_after("A").build())
        .await;

    assert!(matches!(result, Err(StoreError::InvalidQuery(_))));
}

#[tokio::test]
async fn shared_handles_see_the_same_documents() {
    let store = DocumentStore::new(InMemoryStore::new()).into_dyn();
    let clone = store.clone();

    store
        .collection("Book")
        .doc(Some("b1"))
        .set(doc! { "title": "Dune", "createdById": "u1" })
        .await
        .unwrap();

    let found = clone
        .collection("Book")
        .query(
            Query::builder()
                .filter(Filter::eq("createdById", "u1"))
                .order_by("title", SortDirection::Asc)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(found, vec![("b1".to_string(), doc! { "title": "Dune", "createdById": "u1" })]);

    clone.shutdown().await.unwrap();
    assert!(store.collection("Book").doc(Some("b1")).get().await.is_err());
}
