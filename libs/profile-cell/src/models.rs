use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::{auth::User, error::AppError};
use shared_utils::validation::{is_valid_phone, non_blank, required, ValidationError};

/// Staff member's own profile, stored in `users` under their identity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StaffProfile {
    /// Starting point for a profile that was never saved.
    pub fn prefill(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.display_name().unwrap_or_default(),
            email: user.email.clone(),
            phone: Some(String::new()),
            specialty: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: StaffProfile,
    /// False when the profile was prefilled from the identity.
    pub stored: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileFields {
    pub name: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
}

impl ProfileRequest {
    pub fn validate(self) -> Result<ProfileFields, ValidationError> {
        let name = required("name", self.name)?;

        let phone = non_blank(self.phone);
        if let Some(phone) = &phone {
            if !is_valid_phone(phone) {
                return Err(ValidationError::invalid("phone", "must be a valid phone number"));
            }
        }

        Ok(ProfileFields {
            name,
            phone,
            specialty: non_blank(self.specialty),
        })
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to load profile: {0}")]
    LoadFailed(String),

    #[error("Failed to save profile: {0}")]
    SaveFailed(String),
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        let message = err.to_string();
        match err {
            ProfileError::Validation(_) => AppError::ValidationError(message),
            ProfileError::LoadFailed(_) | ProfileError::SaveFailed(_) => AppError::ExternalService(message),
        }
    }
}
