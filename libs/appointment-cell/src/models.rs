// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_utils::validation::{non_blank, required, ValidationError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Shown in place of a patient that no longer exists.
pub const UNKNOWN_PATIENT: &str = "Unknown";

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub doctor_name: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: String,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    #[serde(rename = "No Show")]
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "Scheduled"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
            AppointmentStatus::NoShow => write!(f, "No Show"),
        }
    }
}

/// Appointment as listed, with the patient's name resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRow {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
}

impl AppointmentRow {
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.patient_name.to_lowercase().contains(&needle)
            || self.appointment.doctor_name.to_lowercase().contains(&needle)
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub patient_id: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// `HH:MM`
    pub time: Option<String>,
    pub doctor_name: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentFields {
    pub patient_id: String,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub doctor_name: String,
    pub status: AppointmentStatus,
    pub notes: String,
}

impl AppointmentRequest {
    pub fn validate(self) -> Result<AppointmentFields, ValidationError> {
        let patient_id = required("patient_id", self.patient_id)?;

        let date = required("date", self.date)?;
        let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|_| ValidationError::invalid("date", "must be formatted as YYYY-MM-DD"))?;

        let time = required("time", self.time)?;
        let time = parse_time(&time)
            .ok_or_else(|| ValidationError::invalid("time", "must be formatted as HH:MM"))?;

        Ok(AppointmentFields {
            patient_id,
            date,
            time,
            doctor_name: required("doctor_name", self.doctor_name)?,
            status: self.status.unwrap_or_default(),
            notes: non_blank(self.notes).unwrap_or_default(),
        })
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentList {
    pub appointments: Vec<AppointmentRow>,
    pub total: usize,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(err: anyhow::Error) -> Self {
        AppointmentError::DatabaseError(format!("{:#}", err))
    }
}

impl From<patient_cell::PatientError> for AppointmentError {
    fn from(err: patient_cell::PatientError) -> Self {
        AppointmentError::DatabaseError(err.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::NotFound => AppError::NotFound(message),
            AppointmentError::Validation(_) => AppError::ValidationError(message),
            AppointmentError::DatabaseError(_) => AppError::ExternalService(message),
        }
    }
}

/// Wall-clock times are stored as `HH:MM`.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(super::TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", raw)))
    }
}
