use std::{
    sync::RwLock,
    collections::HashMap,
};

use super::{compare_values, Document, DocumentStore, Fields, OrderBy, StoreError};
use crate::util;


const ID_LENGTH: usize = 20;


/// In-process document store.
///
/// Documents are kept in insertion order per collection. Ids look like
/// Firestore auto ids.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Malformed("memory store lock poisoned".into())
    }
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let docs = collections.entry(collection.to_owned()).or_insert_with(Vec::new);

        let id = loop {
            let id = util::generate_rand_id(ID_LENGTH);
            if !docs.iter().any(|d| d.id == id) {
                break id;
            }
        };

        docs.push(Document {
            id: id.clone(),
            fields,
        });

        Ok(id)
    }

    async fn query(&self, collection: &str, order: Option<&OrderBy>, limit: Option<usize>)
        -> Result<Vec<Document>, StoreError> {

        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        let docs = match collections.get(collection) {
            Some(docs) => docs,
            None => return Ok(Vec::new()),
        };

        let mut result: Vec<Document> = match order {
            Some(order) => {
                // Newer documents first so that ties keep the latest write on top.
                let mut ordered = docs.iter().rev()
                    .filter(|d| d.fields.contains_key(&order.field))
                    .cloned()
                    .collect::<Vec<_>>();

                ordered.sort_by(|a, b| {
                    let ord = compare_values(&a.fields[&order.field], &b.fields[&order.field]);
                    if order.descending { ord.reverse() } else { ord }
                });

                ordered
            },
            None => docs.clone(),
        };

        if let Some(limit) = limit {
            result.truncate(limit);
        }

        Ok(result)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().unwrap().clone()
    }

    #[rocket::async_test]
    async fn create_assigns_unique_ids() {
        let store = MemoryStore::new();

        let a = store.create("reportes", fields(json!({"n": 1}))).await.unwrap();
        let b = store.create("reportes", fields(json!({"n": 2}))).await.unwrap();

        assert_eq!(a.len(), ID_LENGTH);
        assert_ne!(a, b);
    }

    #[rocket::async_test]
    async fn query_orders_and_skips_documents_without_field() {
        let store = MemoryStore::new();
        store.create("c", fields(json!({"at": "2024-01-01"}))).await.unwrap();
        store.create("c", fields(json!({"other": true}))).await.unwrap();
        store.create("c", fields(json!({"at": "2024-03-01"}))).await.unwrap();
        store.create("c", fields(json!({"at": "2024-02-01"}))).await.unwrap();

        let docs = store.query("c", Some(&OrderBy::desc("at")), None).await.unwrap();
        let order = docs.iter().map(|d| d.fields["at"].as_str().unwrap()).collect::<Vec<_>>();
        assert_eq!(order, vec!["2024-03-01", "2024-02-01", "2024-01-01"]);

        let all = store.query("c", None, None).await.unwrap();
        assert_eq!(all.len(), 4);

        let newest = store.query("c", Some(&OrderBy::desc("at")), Some(1)).await.unwrap();
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].fields["at"], json!("2024-03-01"));
    }

    #[rocket::async_test]
    async fn missing_collection_is_empty() {
        let store = MemoryStore::new();

        assert!(store.query("nothing", None, None).await.unwrap().is_empty());
    }
}
