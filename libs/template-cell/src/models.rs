use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_utils::validation::{matches_search, required, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub message: String,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Template {
    pub fn matches(&self, search: &str) -> bool {
        matches_search(Some(self.title.as_str()), search)
            || matches_search(Some(self.subject.as_str()), search)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateFields {
    pub title: String,
    pub subject: String,
    pub message: String,
}

impl TemplateRequest {
    pub fn validate(self) -> Result<TemplateFields, ValidationError> {
        Ok(TemplateFields {
            title: required("title", self.title)?,
            subject: required("subject", self.subject)?,
            message: required("message", self.message)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateList {
    pub templates: Vec<Template>,
    pub total: usize,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for TemplateError {
    fn from(err: anyhow::Error) -> Self {
        TemplateError::DatabaseError(format!("{:#}", err))
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        let message = err.to_string();
        match err {
            TemplateError::NotFound => AppError::NotFound(message),
            TemplateError::Validation(_) => AppError::ValidationError(message),
            TemplateError::DatabaseError(_) => AppError::ExternalService(message),
        }
    }
}
