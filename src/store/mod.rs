pub mod firestore;
pub mod memory;


use std::cmp::Ordering;

use serde_json::{json, Map, Value as JsonValue};

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;


pub type Fields = Map<String, JsonValue>;


#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid store credentials: {0}")]
    Credentials(String),

    #[error("Store authentication failed: {0}")]
    Auth(String),

    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed store response: {0}")]
    Malformed(String),
}


/// A stored document: the id the store assigned plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}


#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(field: &str) -> Self {
        OrderBy {
            field: field.into(),
            descending: true,
        }
    }
}


/// Schemaless document persistence, organized in named collections.
///
/// Implementations must be safe to share across concurrent requests.
#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores `fields` as a new document and returns the assigned id.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Reads documents of `collection`.
    ///
    /// When ordered, documents lacking the order field are left out.
    async fn query(&self, collection: &str, order: Option<&OrderBy>, limit: Option<usize>)
        -> Result<Vec<Document>, StoreError>;
}


/// Writes a connection test document to the `test` collection and returns its id.
pub async fn check_connection(store: &dyn DocumentStore) -> Result<String, StoreError> {
    let doc = json!({
        "mensaje": "Hola desde report-map-server",
        "estado": "conectado",
    });

    match doc {
        JsonValue::Object(fields) => store.create("test", fields).await,
        _ => Err(StoreError::Malformed("test document is not an object".into())),
    }
}


/// Ordering between two field values of the same kind.
/// Values of different kinds compare by kind rank.
pub(crate) fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
    fn rank(v: &JsonValue) -> u8 {
        match v {
            JsonValue::Null => 0,
            JsonValue::Bool(_) => 1,
            JsonValue::Number(_) => 2,
            JsonValue::String(_) => 3,
            JsonValue::Array(_) => 4,
            JsonValue::Object(_) => 5,
        }
    }

    match (a, b) {
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x.cmp(y),
        (JsonValue::Number(x), JsonValue::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        },
        (JsonValue::String(x), JsonValue::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_of_same_kind_compare_naturally() {
        assert_eq!(compare_values(&json!("2024-01-02"), &json!("2024-01-01")), Ordering::Greater);
        assert_eq!(compare_values(&json!(1), &json!(2.5)), Ordering::Less);
        assert_eq!(compare_values(&json!(true), &json!(true)), Ordering::Equal);
    }

    #[rocket::async_test]
    async fn connection_check_writes_test_document() {
        let store = MemoryStore::new();

        let id = check_connection(&store).await.unwrap();

        let docs = store.query("test", None, None).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].fields["estado"], json!("conectado"));
    }

    #[test]
    fn values_of_different_kinds_compare_by_kind() {
        assert_eq!(compare_values(&json!(null), &json!(0)), Ordering::Less);
        assert_eq!(compare_values(&json!("a"), &json!(100)), Ordering::Greater);
    }
}
