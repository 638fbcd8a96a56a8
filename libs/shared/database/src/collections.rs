use std::fmt;

use serde::{Deserialize, Serialize};

/// Named document collections held by the hosted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Patients,
    Appointments,
    Campaigns,
    Templates,
    Users,
}

impl Collection {
    /// Collections a client may subscribe to for live snapshots.
    pub const SUBSCRIBABLE: [Collection; 4] = [
        Collection::Patients,
        Collection::Appointments,
        Collection::Campaigns,
        Collection::Templates,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Collection::Patients => "patients",
            Collection::Appointments => "appointments",
            Collection::Campaigns => "campaigns",
            Collection::Templates => "templates",
            Collection::Users => "users",
        }
    }

    pub fn rest_path(&self) -> String {
        format!("/rest/v1/{}", self.table())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "patients" => Some(Collection::Patients),
            "appointments" => Some(Collection::Appointments),
            "campaigns" => Some(Collection::Campaigns),
            "templates" => Some(Collection::Templates),
            "users" => Some(Collection::Users),
            _ => None,
        }
    }

    pub fn is_subscribable(&self) -> bool {
        Self::SUBSCRIBABLE.contains(self)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
