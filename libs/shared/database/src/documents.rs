use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::collections::Collection;

/// Decodes one stored document into its typed form.
pub fn decode<T: DeserializeOwned>(collection: Collection, document: Value) -> Result<T> {
    serde_json::from_value(document)
        .with_context(|| format!("Malformed document in {}", collection))
}

pub fn decode_all<T: DeserializeOwned>(collection: Collection, documents: Vec<Value>) -> Result<Vec<T>> {
    documents
        .into_iter()
        .map(|document| decode(collection, document))
        .collect()
}
