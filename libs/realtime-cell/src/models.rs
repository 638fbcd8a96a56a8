use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use shared_database::Collection;
use shared_models::error::AppError;

/// Full contents of a collection at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub collection: Collection,
    pub documents: Vec<Value>,
}

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

impl From<RealtimeError> for AppError {
    fn from(err: RealtimeError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

/// Resolves a path segment to a collection clients may watch.
pub fn subscribable(name: &str) -> Result<Collection, RealtimeError> {
    Collection::from_name(name)
        .filter(Collection::is_subscribable)
        .ok_or_else(|| RealtimeError::UnknownCollection(name.to_string()))
}

/// Order in which each collection is listed elsewhere in the API.
pub fn snapshot_order(collection: Collection) -> Option<&'static str> {
    match collection {
        Collection::Patients => Some("name.asc"),
        Collection::Appointments => Some("date.asc,time.asc"),
        Collection::Campaigns => Some("created_at.desc"),
        Collection::Templates => Some("title.asc"),
        Collection::Users => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_subscribable_collections() {
        assert_eq!(subscribable("patients").unwrap(), Collection::Patients);
        assert_eq!(subscribable("templates").unwrap(), Collection::Templates);
        assert_matches!(subscribable("users"), Err(RealtimeError::UnknownCollection(name)) if name == "users");
        assert!(subscribable("invoices").is_err());
    }

    #[test]
    fn test_unknown_collection_is_not_found() {
        let err = AppError::from(subscribable("invoices").unwrap_err());
        assert_matches!(err, AppError::NotFound(msg) if msg == "Unknown collection: invoices");
    }
}
