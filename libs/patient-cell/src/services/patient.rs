use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::documents::{decode, decode_all};
use shared_database::{ChangeFeed, Collection, SupabaseClient};

use crate::models::{Patient, PatientError, PatientFields, PatientList, PatientRequest};

pub struct PatientService {
    supabase: SupabaseClient,
    feed: ChangeFeed,
}

impl PatientService {
    pub fn new(config: &AppConfig, feed: ChangeFeed) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            feed,
        }
    }

    /// Every patient, ordered by name.
    pub async fn fetch_all(&self, auth_token: &str) -> Result<Vec<Patient>, PatientError> {
        let rows = self.supabase
            .select_all(Collection::Patients, Some("name.asc"), auth_token)
            .await?;

        Ok(decode_all(Collection::Patients, rows)?)
    }

    pub async fn list_patients(
        &self,
        search: Option<&str>,
        auth_token: &str,
    ) -> Result<PatientList, PatientError> {
        debug!("Listing patients with search: {:?}", search);

        let patients = self.fetch_all(auth_token).await?;
        let total = patients.len();

        let patients = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => patients.into_iter().filter(|p| p.matches(term)).collect(),
            None => patients,
        };

        Ok(PatientList { patients, total })
    }

    pub async fn get_patient(&self, patient_id: &str, auth_token: &str) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        let row = self.supabase
            .select_by_id(Collection::Patients, patient_id, auth_token)
            .await?
            .ok_or(PatientError::NotFound)?;

        Ok(decode(Collection::Patients, row)?)
    }

    pub async fn create_patient(
        &self,
        request: PatientRequest,
        created_by: &str,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        let fields = request.validate()?;
        debug!("Creating patient: {}", fields.name);

        let now = Utc::now().to_rfc3339();
        let mut document = fields_document(&fields)?;
        document["created_by"] = json!(created_by);
        document["created_at"] = json!(now);
        document["updated_at"] = json!(now);

        let row = self.supabase.insert(Collection::Patients, document, auth_token).await?;
        let patient: Patient = decode(Collection::Patients, row)?;

        info!("Patient {} added", patient.id);
        self.feed.publish(Collection::Patients);
        Ok(patient)
    }

    pub async fn update_patient(
        &self,
        patient_id: &str,
        request: PatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        let fields = request.validate()?;
        debug!("Updating patient: {}", patient_id);

        let mut document = fields_document(&fields)?;
        document["updated_at"] = json!(Utc::now().to_rfc3339());

        let row = self.supabase
            .update_by_id(Collection::Patients, patient_id, document, auth_token)
            .await?
            .ok_or(PatientError::NotFound)?;
        let patient: Patient = decode(Collection::Patients, row)?;

        info!("Patient {} updated", patient.id);
        self.feed.publish(Collection::Patients);
        Ok(patient)
    }

    /// Refuses while any appointment still references the patient. The check
    /// and the delete are separate calls; nothing prevents an appointment
    /// being added in between.
    pub async fn delete_patient(&self, patient_id: &str, auth_token: &str) -> Result<(), PatientError> {
        debug!("Deleting patient: {}", patient_id);

        let referencing = self.supabase
            .select_eq(Collection::Appointments, "patient_id", patient_id, auth_token)
            .await?;

        if !referencing.is_empty() {
            warn!("Refusing to delete patient {} with {} appointment(s)", patient_id, referencing.len());
            return Err(PatientError::HasAppointments(referencing.len()));
        }

        if !self.supabase.delete_by_id(Collection::Patients, patient_id, auth_token).await? {
            return Err(PatientError::NotFound);
        }

        info!("Patient {} deleted", patient_id);
        self.feed.publish(Collection::Patients);
        Ok(())
    }
}

fn fields_document(fields: &PatientFields) -> Result<Value, PatientError> {
    serde_json::to_value(fields).map_err(|e| PatientError::DatabaseError(e.to_string()))
}
