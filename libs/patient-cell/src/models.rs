use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_utils::validation::{non_blank, optional_email, required, ValidationError};

pub const MAX_AGE: u32 = 130;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub medical_history: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Patient {
    /// Name/email match case-insensitively, phone as typed.
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.email.as_deref().is_some_and(|e| e.to_lowercase().contains(&needle))
            || self.phone.as_deref().is_some_and(|p| p.contains(search))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Other => write!(f, "Other"),
        }
    }
}

/// Body of both the add and the edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRequest {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub medical_history: Option<String>,
}

/// Editable fields after form validation.
#[derive(Debug, Clone, Serialize)]
pub struct PatientFields {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub medical_history: Option<String>,
}

impl PatientRequest {
    pub fn validate(self) -> Result<PatientFields, ValidationError> {
        let name = required("name", self.name)?;
        let age = self.age.ok_or(ValidationError::Required("age"))?;
        if age > MAX_AGE {
            return Err(ValidationError::invalid("age", format!("must be between 0 and {}", MAX_AGE)));
        }
        let gender = self.gender.ok_or(ValidationError::Required("gender"))?;

        Ok(PatientFields {
            name,
            age,
            gender,
            phone: non_blank(self.phone),
            email: optional_email("email", self.email)?,
            medical_history: non_blank(self.medical_history),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientList {
    pub patients: Vec<Patient>,
    /// Registered patients, before the search filter.
    pub total: usize,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("This patient has {0} appointment(s). Delete them first.")]
    HasAppointments(usize),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for PatientError {
    fn from(err: anyhow::Error) -> Self {
        PatientError::DatabaseError(format!("{:#}", err))
    }
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        let message = err.to_string();
        match err {
            PatientError::NotFound => AppError::NotFound(message),
            PatientError::HasAppointments(_) => AppError::Conflict(message),
            PatientError::Validation(_) => AppError::ValidationError(message),
            PatientError::DatabaseError(_) => AppError::ExternalService(message),
        }
    }
}
