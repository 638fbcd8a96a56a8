use std::collections::HashMap;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};

use patient_cell::PatientService;
use shared_config::AppConfig;
use shared_database::documents::{decode, decode_all};
use shared_database::{ChangeFeed, Collection, SupabaseClient};

use crate::models::{
    Appointment, AppointmentError, AppointmentFields, AppointmentList, AppointmentRequest,
    AppointmentRow, UNKNOWN_PATIENT,
};

pub struct AppointmentService {
    supabase: SupabaseClient,
    patients: PatientService,
    feed: ChangeFeed,
}

impl AppointmentService {
    pub fn new(config: &AppConfig, feed: ChangeFeed) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            patients: PatientService::new(config, feed.clone()),
            feed,
        }
    }

    /// Every appointment, earliest first.
    pub async fn fetch_all(&self, auth_token: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let rows = self.supabase
            .select_all(Collection::Appointments, Some("date.asc,time.asc"), auth_token)
            .await?;

        Ok(decode_all(Collection::Appointments, rows)?)
    }

    pub async fn list_appointments(
        &self,
        search: Option<&str>,
        auth_token: &str,
    ) -> Result<AppointmentList, AppointmentError> {
        debug!("Listing appointments with search: {:?}", search);

        let appointments = self.fetch_all(auth_token).await?;
        let names: HashMap<String, String> = self.patients
            .fetch_all(auth_token)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let total = appointments.len();
        let rows = appointments.into_iter().map(|appointment| {
            let patient_name = names
                .get(&appointment.patient_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PATIENT.to_string());
            AppointmentRow { appointment, patient_name }
        });

        let appointments = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => rows.filter(|row| row.matches(term)).collect(),
            None => rows.collect(),
        };

        Ok(AppointmentList { appointments, total })
    }

    pub async fn get_appointment(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let row = self.supabase
            .select_by_id(Collection::Appointments, appointment_id, auth_token)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        Ok(decode(Collection::Appointments, row)?)
    }

    pub async fn create_appointment(
        &self,
        request: AppointmentRequest,
        created_by: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let fields = request.validate()?;
        debug!("Scheduling appointment for patient {} on {}", fields.patient_id, fields.date);

        let now = Utc::now().to_rfc3339();
        let mut document = fields_document(&fields)?;
        document["created_by"] = json!(created_by);
        document["created_at"] = json!(now);
        document["updated_at"] = json!(now);

        let row = self.supabase.insert(Collection::Appointments, document, auth_token).await?;
        let appointment: Appointment = decode(Collection::Appointments, row)?;

        info!("Appointment {} scheduled", appointment.id);
        self.feed.publish(Collection::Appointments);
        Ok(appointment)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: &str,
        request: AppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let fields = request.validate()?;

        let mut document = fields_document(&fields)?;
        document["updated_at"] = json!(Utc::now().to_rfc3339());

        let row = self.supabase
            .update_by_id(Collection::Appointments, appointment_id, document, auth_token)
            .await?
            .ok_or(AppointmentError::NotFound)?;
        let appointment: Appointment = decode(Collection::Appointments, row)?;

        info!("Appointment {} updated", appointment.id);
        self.feed.publish(Collection::Appointments);
        Ok(appointment)
    }

    pub async fn delete_appointment(&self, appointment_id: &str, auth_token: &str) -> Result<(), AppointmentError> {
        if !self.supabase.delete_by_id(Collection::Appointments, appointment_id, auth_token).await? {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} deleted", appointment_id);
        self.feed.publish(Collection::Appointments);
        Ok(())
    }
}

fn fields_document(fields: &AppointmentFields) -> Result<Value, AppointmentError> {
    serde_json::to_value(fields).map_err(|e| AppointmentError::DatabaseError(e.to_string()))
}
