use chrono::{Local, Timelike};
use futures::future::try_join_all;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::{Collection, SupabaseClient};
use shared_models::auth::User;

use crate::models::{greeting, CollectionCounts, DashboardError, DashboardSummary};

pub struct DashboardService {
    supabase: SupabaseClient,
}

impl DashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn counts(&self, auth_token: &str) -> Result<CollectionCounts, DashboardError> {
        let counted = [Collection::Patients, Collection::Campaigns, Collection::Appointments];
        let sizes = try_join_all(
            counted.map(|collection| self.supabase.count(collection, auth_token)),
        )
        .await?;

        Ok(CollectionCounts {
            patients: sizes[0],
            campaigns: sizes[1],
            appointments: sizes[2],
        })
    }

    pub async fn summary(
        &self,
        user: &User,
        hour: Option<u32>,
        auth_token: &str,
    ) -> Result<DashboardSummary, DashboardError> {
        let hour = match hour {
            Some(h) if h > 23 => return Err(DashboardError::InvalidHour),
            Some(h) => h,
            None => Local::now().hour(),
        };
        debug!("Building dashboard for user {} at hour {}", user.id, hour);

        let counts = self.counts(auth_token).await?;

        Ok(DashboardSummary {
            greeting: greeting(hour).to_string(),
            display_name: user.greeting_name(),
            activity_score: counts.activity_score(),
            overview: counts.overview(),
            counts,
        })
    }
}
