use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::documents::{decode, decode_all};
use shared_database::{ChangeFeed, Collection, SupabaseClient};

use crate::models::{Template, TemplateError, TemplateList, TemplateRequest};

pub struct TemplateService {
    supabase: SupabaseClient,
    feed: ChangeFeed,
}

impl TemplateService {
    pub fn new(config: &AppConfig, feed: ChangeFeed) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            feed,
        }
    }

    pub async fn fetch_all(&self, auth_token: &str) -> Result<Vec<Template>, TemplateError> {
        let rows = self.supabase
            .select_all(Collection::Templates, Some("title.asc"), auth_token)
            .await?;

        Ok(decode_all(Collection::Templates, rows)?)
    }

    pub async fn list_templates(
        &self,
        search: Option<&str>,
        auth_token: &str,
    ) -> Result<TemplateList, TemplateError> {
        let templates = self.fetch_all(auth_token).await?;
        let total = templates.len();

        let templates = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => templates.into_iter().filter(|t| t.matches(term)).collect(),
            None => templates,
        };

        Ok(TemplateList { templates, total })
    }

    pub async fn get_template(&self, template_id: &str, auth_token: &str) -> Result<Template, TemplateError> {
        let row = self.supabase
            .select_by_id(Collection::Templates, template_id, auth_token)
            .await?
            .ok_or(TemplateError::NotFound)?;

        Ok(decode(Collection::Templates, row)?)
    }

    pub async fn create_template(
        &self,
        request: TemplateRequest,
        created_by: &str,
        auth_token: &str,
    ) -> Result<Template, TemplateError> {
        let fields = request.validate()?;
        debug!("Creating template: {}", fields.title);

        let now = Utc::now().to_rfc3339();
        let document = json!({
            "title": fields.title,
            "subject": fields.subject,
            "message": fields.message,
            "created_by": created_by,
            "created_at": now,
            "updated_at": now,
        });

        let row = self.supabase.insert(Collection::Templates, document, auth_token).await?;
        let template: Template = decode(Collection::Templates, row)?;

        info!("Template {} created", template.id);
        self.feed.publish(Collection::Templates);
        Ok(template)
    }

    pub async fn update_template(
        &self,
        template_id: &str,
        request: TemplateRequest,
        auth_token: &str,
    ) -> Result<Template, TemplateError> {
        let fields = request.validate()?;

        let document = json!({
            "title": fields.title,
            "subject": fields.subject,
            "message": fields.message,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let row = self.supabase
            .update_by_id(Collection::Templates, template_id, document, auth_token)
            .await?
            .ok_or(TemplateError::NotFound)?;
        let template: Template = decode(Collection::Templates, row)?;

        info!("Template {} updated", template.id);
        self.feed.publish(Collection::Templates);
        Ok(template)
    }

    pub async fn delete_template(&self, template_id: &str, auth_token: &str) -> Result<(), TemplateError> {
        if !self.supabase.delete_by_id(Collection::Templates, template_id, auth_token).await? {
            return Err(TemplateError::NotFound);
        }

        info!("Template {} deleted", template_id);
        self.feed.publish(Collection::Templates);
        Ok(())
    }
}
