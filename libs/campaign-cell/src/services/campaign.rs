use std::collections::HashMap;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};

use patient_cell::{Patient, PatientService};
use shared_config::AppConfig;
use shared_database::documents::{decode, decode_all};
use shared_database::{ChangeFeed, Collection, SupabaseClient};
use template_cell::TemplateService;

use crate::audience::{audience_label, filter_patients, select_all_caption, AudienceSelection};
use crate::models::{
    AudienceRequest, AudienceRow, AudienceView, Campaign, CampaignError, CampaignFields,
    CampaignList, CampaignRequest, CampaignRow,
};

pub struct CampaignService {
    supabase: SupabaseClient,
    patients: PatientService,
    templates: TemplateService,
    feed: ChangeFeed,
}

impl CampaignService {
    pub fn new(config: &AppConfig, feed: ChangeFeed) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            patients: PatientService::new(config, feed.clone()),
            templates: TemplateService::new(config, feed.clone()),
            feed,
        }
    }

    /// Every campaign, newest first.
    pub async fn fetch_all(&self, auth_token: &str) -> Result<Vec<Campaign>, CampaignError> {
        let rows = self.supabase
            .select_all(Collection::Campaigns, Some("created_at.desc"), auth_token)
            .await?;

        Ok(decode_all(Collection::Campaigns, rows)?)
    }

    pub async fn list_campaigns(
        &self,
        search: Option<&str>,
        auth_token: &str,
    ) -> Result<CampaignList, CampaignError> {
        debug!("Listing campaigns with search: {:?}", search);

        let campaigns = self.fetch_all(auth_token).await?;
        let patients = self.patients.fetch_all(auth_token).await?;
        let titles: HashMap<String, String> = self.templates
            .fetch_all(auth_token)
            .await?
            .into_iter()
            .map(|t| (t.id, t.title))
            .collect();

        let total = campaigns.len();
        let rows = campaigns.into_iter().map(|campaign| {
            let template_name = titles
                .get(&campaign.template_id)
                .cloned()
                .unwrap_or_else(|| campaign.template_id.clone());
            let audience_label = audience_label(campaign.target_type, &campaign.patient_ids, &patients);
            CampaignRow { campaign, template_name, audience_label }
        });

        let campaigns = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => rows.filter(|row| row.campaign.matches(term)).collect(),
            None => rows.collect(),
        };

        Ok(CampaignList { campaigns, total })
    }

    pub async fn get_campaign(&self, campaign_id: &str, auth_token: &str) -> Result<Campaign, CampaignError> {
        let row = self.supabase
            .select_by_id(Collection::Campaigns, campaign_id, auth_token)
            .await?
            .ok_or(CampaignError::NotFound)?;

        Ok(decode(Collection::Campaigns, row)?)
    }

    pub async fn create_campaign(
        &self,
        request: CampaignRequest,
        created_by: &str,
        auth_token: &str,
    ) -> Result<Campaign, CampaignError> {
        let fields = self.prepare(request, auth_token).await?;
        debug!("Creating campaign {} for {} patient(s)", fields.name, fields.patient_ids.len());

        let now = Utc::now().to_rfc3339();
        let mut document = fields_document(&fields)?;
        document["created_by"] = json!(created_by);
        document["created_at"] = json!(now);
        document["updated_at"] = json!(now);

        let row = self.supabase.insert(Collection::Campaigns, document, auth_token).await?;
        let campaign: Campaign = decode(Collection::Campaigns, row)?;

        info!("Campaign {} created ({})", campaign.id, campaign.target_type);
        self.feed.publish(Collection::Campaigns);
        Ok(campaign)
    }

    pub async fn update_campaign(
        &self,
        campaign_id: &str,
        request: CampaignRequest,
        auth_token: &str,
    ) -> Result<Campaign, CampaignError> {
        let fields = self.prepare(request, auth_token).await?;

        let mut document = fields_document(&fields)?;
        document["updated_at"] = json!(Utc::now().to_rfc3339());

        let row = self.supabase
            .update_by_id(Collection::Campaigns, campaign_id, document, auth_token)
            .await?
            .ok_or(CampaignError::NotFound)?;
        let campaign: Campaign = decode(Collection::Campaigns, row)?;

        info!("Campaign {} updated", campaign.id);
        self.feed.publish(Collection::Campaigns);
        Ok(campaign)
    }

    pub async fn delete_campaign(&self, campaign_id: &str, auth_token: &str) -> Result<(), CampaignError> {
        if !self.supabase.delete_by_id(Collection::Campaigns, campaign_id, auth_token).await? {
            return Err(CampaignError::NotFound);
        }

        info!("Campaign {} deleted", campaign_id);
        self.feed.publish(Collection::Campaigns);
        Ok(())
    }

    /// One step of the patient picker: apply the action to the selection and
    /// describe the result against the current patient list.
    pub async fn pick_audience(
        &self,
        request: AudienceRequest,
        auth_token: &str,
    ) -> Result<AudienceView, CampaignError> {
        let patients = self.patients.fetch_all(auth_token).await?;
        Ok(audience_view(request, &patients))
    }

    /// Validates and stamps `target_type` against the patient set as it is now.
    async fn prepare(&self, request: CampaignRequest, auth_token: &str) -> Result<CampaignFields, CampaignError> {
        let mut fields = request.validate()?;

        let patients = self.patients.fetch_all(auth_token).await?;
        fields.target_type = AudienceSelection::new(fields.patient_ids.iter().cloned())
            .target_type(patients.iter().map(|p| p.id.as_str()));

        Ok(fields)
    }
}

pub fn audience_view(request: AudienceRequest, patients: &[Patient]) -> AudienceView {
    let search = request.search.as_deref();
    let all_ids: Vec<&str> = patients.iter().map(|p| p.id.as_str()).collect();

    let visible = filter_patients(patients, search);
    let visible_ids: Vec<&str> = visible.iter().map(|p| p.id.as_str()).collect();

    let mut selection = AudienceSelection::new(request.selected);
    if let Some(action) = &request.action {
        selection.apply(action, &visible_ids);
    }
    // Stale ids and toggles of unknown ids never reach the selection.
    selection.retain_known(all_ids.iter().copied());

    let covers_all = selection.covers_all(all_ids.iter().copied());

    AudienceView {
        visible: visible
            .iter()
            .map(|p| AudienceRow {
                id: p.id.clone(),
                name: p.name.clone(),
                email: p.email.clone(),
                checked: selection.contains(&p.id),
            })
            .collect(),
        total: patients.len(),
        select_all_state: selection.select_all_state(&visible_ids),
        select_all_caption: select_all_caption(search, visible_ids.len()),
        summary: selection.summary(patients.len(), covers_all),
        badge: selection.badge(covers_all),
        confirm_enabled: !selection.is_empty(),
        target_type: selection.target_type(all_ids.iter().copied()),
        selected: selection.into_ids(),
    }
}

fn fields_document(fields: &CampaignFields) -> Result<Value, CampaignError> {
    serde_json::to_value(fields).map_err(|e| CampaignError::DatabaseError(e.to_string()))
}
