use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionCounts {
    pub patients: usize,
    pub campaigns: usize,
    pub appointments: usize,
}

impl CollectionCounts {
    pub fn activity_score(&self) -> usize {
        self.patients + self.campaigns + self.appointments
    }

    /// Bar widths for the overview panel. Campaigns and appointments are
    /// measured against the patient count.
    pub fn overview(&self) -> Overview {
        let base = self.patients.max(1);
        Overview {
            patients: percent(self.patients, self.patients.max(1)),
            campaigns: percent(self.campaigns, base),
            appointments: percent(self.appointments, base),
        }
    }
}

fn percent(count: usize, of: usize) -> u32 {
    ((count as f64 / of as f64) * 100.0).round().min(100.0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub patients: u32,
    pub campaigns: u32,
    pub appointments: u32,
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// Caller's local hour (0-23); the server clock is used when absent.
    pub hour: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub greeting: String,
    pub display_name: String,
    pub counts: CollectionCounts,
    pub activity_score: usize,
    pub overview: Overview,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("hour must be between 0 and 23")]
    InvalidHour,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::DatabaseError(format!("{:#}", err))
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        let message = err.to_string();
        match err {
            DashboardError::InvalidHour => AppError::BadRequest(message),
            DashboardError::DatabaseError(_) => AppError::ExternalService(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_boundaries() {
        assert_eq!(greeting(0), "Good morning");
        assert_eq!(greeting(11), "Good morning");
        assert_eq!(greeting(12), "Good afternoon");
        assert_eq!(greeting(16), "Good afternoon");
        assert_eq!(greeting(17), "Good evening");
        assert_eq!(greeting(23), "Good evening");
    }

    #[test]
    fn test_overview_relative_to_patients() {
        let counts = CollectionCounts { patients: 4, campaigns: 1, appointments: 10 };
        assert_eq!(counts.activity_score(), 15);
        assert_eq!(counts.overview(), Overview { patients: 100, campaigns: 25, appointments: 100 });
    }

    #[test]
    fn test_overview_without_patients() {
        let counts = CollectionCounts { patients: 0, campaigns: 0, appointments: 3 };
        assert_eq!(counts.overview(), Overview { patients: 0, campaigns: 0, appointments: 100 });
        assert_eq!(CollectionCounts::default().activity_score(), 0);
    }
}
