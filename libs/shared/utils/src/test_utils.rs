use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Points the store at a mock server.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            api_port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub display_name: Option<String>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("staff@clinic.test", "authenticated")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
            display_name: None,
        }
    }

    pub fn staff(email: &str) -> Self {
        Self::new(email, "authenticated")
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: self
                .display_name
                .as_ref()
                .map(|name| json!({ "display_name": name })),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "user_metadata": user.display_name.as_ref().map(|name| json!({ "display_name": name })),
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned documents as the hosted store returns them.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn patient(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "age": 42,
            "gender": "Female",
            "phone": "+1 555 0100",
            "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            "medical_history": "Seasonal allergies",
            "created_by": "staff-1",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": null
        })
    }

    pub fn appointment(id: &str, patient_id: &str, date: &str, time: &str) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "date": date,
            "time": time,
            "doctor_name": "Dr. John Smith",
            "status": "Scheduled",
            "notes": "",
            "created_by": "staff-1",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn template(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "subject": format!("{} subject", title),
            "message": "Hello {name}, this is a reminder from your clinic.",
            "created_by": "staff-1",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn campaign(id: &str, name: &str, template_id: &str, patient_ids: &[&str], target_type: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "template_id": template_id,
            "patient_ids": patient_ids,
            "target_type": target_type,
            "status": "Pending",
            "created_by": "staff-1",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn user_profile(user_id: &str, email: &str) -> Value {
        json!({
            "id": user_id,
            "name": "Dr. Jane Roe",
            "email": email,
            "phone": "+1 555 0199",
            "specialty": "General Practitioner",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn session(user_id: &str, email: &str) -> Value {
        json!({
            "access_token": "access-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-token",
            "user": {
                "id": user_id,
                "email": email,
                "user_metadata": { "display_name": "Dr. Jane Roe" }
            }
        })
    }

    pub fn error_response(message: &str) -> Value {
        json!({
            "message": message
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::with_url("http://127.0.0.1:9999").to_app_config();

        assert_eq!(config.supabase_url, "http://127.0.0.1:9999");
        assert_eq!(config.supabase_anon_key, "test-anon-key");
        assert!(config.is_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::staff("desk@clinic.test").with_display_name("Front Desk");
        let model = user.to_user();

        assert_eq!(model.id, user.id);
        assert_eq!(model.email.as_deref(), Some("desk@clinic.test"));
        assert_eq!(model.display_name().as_deref(), Some("Front Desk"));
    }

    #[test]
    fn test_jwt_token_creation() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), "test-secret", Some(1));
        assert_eq!(token.split('.').count(), 3);
    }
}
