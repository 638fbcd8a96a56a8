use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::documents::decode;
use shared_database::{Collection, SupabaseClient};
use shared_models::auth::User;

use crate::models::{ProfileError, ProfileRequest, ProfileResponse, StaffProfile};

pub struct ProfileService {
    supabase: SupabaseClient,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Stored profile, or one prefilled from the identity when none was saved yet.
    pub async fn get_profile(&self, user: &User, auth_token: &str) -> Result<ProfileResponse, ProfileError> {
        debug!("Fetching profile for user: {}", user.id);

        let stored = self.supabase
            .select_by_id(Collection::Users, &user.id, auth_token)
            .await
            .map_err(|e| ProfileError::LoadFailed(format!("{:#}", e)))?;

        match stored {
            Some(row) => {
                let profile = decode(Collection::Users, row)
                    .map_err(|e| ProfileError::LoadFailed(format!("{:#}", e)))?;
                Ok(ProfileResponse { profile, stored: true })
            }
            None => Ok(ProfileResponse { profile: StaffProfile::prefill(user), stored: false }),
        }
    }

    /// Replaces the stored profile, then mirrors the name onto the identity.
    /// The two writes are independent; a failure in the second leaves the
    /// first in place.
    pub async fn update_profile(
        &self,
        user: &User,
        request: ProfileRequest,
        auth_token: &str,
    ) -> Result<StaffProfile, ProfileError> {
        let fields = request.validate()?;
        debug!("Saving profile for user: {}", user.id);

        let document = json!({
            "id": user.id,
            "name": fields.name,
            "email": user.email,
            "phone": fields.phone,
            "specialty": fields.specialty,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let row = self.supabase
            .upsert(Collection::Users, document, auth_token)
            .await
            .map_err(|e| ProfileError::SaveFailed(format!("{:#}", e)))?;
        let profile: StaffProfile = decode(Collection::Users, row)
            .map_err(|e| ProfileError::SaveFailed(format!("{:#}", e)))?;

        self.supabase
            .update_user_metadata(json!({ "display_name": fields.name }), auth_token)
            .await
            .map_err(|e| ProfileError::SaveFailed(format!("{:#}", e)))?;

        info!("Profile for user {} updated", user.id);
        Ok(profile)
    }
}
