use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_utils::validation::{matches_search, required, ValidationError};

use crate::audience::{AudienceAction, SelectAllState, TargetType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub template_id: String,
    #[serde(default)]
    pub patient_ids: Vec<String>,
    #[serde(default)]
    pub target_type: TargetType,
    #[serde(default)]
    pub status: CampaignStatus,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Campaign {
    pub fn matches(&self, search: &str) -> bool {
        matches_search(Some(self.name.as_str()), search)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    #[default]
    Pending,
    Sent,
}

/// Campaign as listed, with template and audience spelled out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRow {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub template_name: String,
    pub audience_label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignRequest {
    pub name: Option<String>,
    pub template_id: Option<String>,
    pub patient_ids: Option<Vec<String>>,
    pub status: Option<CampaignStatus>,
}

/// Validated campaign body; `target_type` is derived by the service.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignFields {
    pub name: String,
    pub template_id: String,
    pub patient_ids: Vec<String>,
    pub target_type: TargetType,
    pub status: CampaignStatus,
}

impl CampaignRequest {
    pub fn validate(self) -> Result<CampaignFields, CampaignError> {
        let name = required("name", self.name)?;
        let template_id = required("template_id", self.template_id)?;

        let mut patient_ids = Vec::new();
        for id in self.patient_ids.unwrap_or_default() {
            let id = id.trim().to_string();
            if !id.is_empty() && !patient_ids.contains(&id) {
                patient_ids.push(id);
            }
        }
        if patient_ids.is_empty() {
            return Err(CampaignError::EmptyAudience);
        }

        Ok(CampaignFields {
            name,
            template_id,
            patient_ids,
            target_type: TargetType::Single,
            status: self.status.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignList {
    pub campaigns: Vec<CampaignRow>,
    pub total: usize,
}

// ==============================================================================
// AUDIENCE PICKER
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudienceRequest {
    #[serde(default)]
    pub selected: Vec<String>,
    pub search: Option<String>,
    pub action: Option<AudienceAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceView {
    pub selected: Vec<String>,
    pub visible: Vec<AudienceRow>,
    pub total: usize,
    pub select_all_state: SelectAllState,
    pub select_all_caption: String,
    pub summary: String,
    pub badge: Option<String>,
    pub confirm_enabled: bool,
    pub target_type: TargetType,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("Campaign not found")]
    NotFound,

    #[error("Please select at least one patient")]
    EmptyAudience,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for CampaignError {
    fn from(err: anyhow::Error) -> Self {
        CampaignError::DatabaseError(format!("{:#}", err))
    }
}

impl From<patient_cell::PatientError> for CampaignError {
    fn from(err: patient_cell::PatientError) -> Self {
        CampaignError::DatabaseError(err.to_string())
    }
}

impl From<template_cell::TemplateError> for CampaignError {
    fn from(err: template_cell::TemplateError) -> Self {
        CampaignError::DatabaseError(err.to_string())
    }
}

impl From<CampaignError> for AppError {
    fn from(err: CampaignError) -> Self {
        let message = err.to_string();
        match err {
            CampaignError::NotFound => AppError::NotFound(message),
            CampaignError::EmptyAudience => AppError::BadRequest(message),
            CampaignError::Validation(_) => AppError::ValidationError(message),
            CampaignError::DatabaseError(_) => AppError::ExternalService(message),
        }
    }
}
