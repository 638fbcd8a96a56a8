//! Target-audience selection for campaigns.
//!
//! Pure set bookkeeping over the current patient list: filtering, per-row
//! toggles, "select all matching" and the derived display state. Nothing in
//! here talks to the store.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use patient_cell::Patient;
use shared_utils::validation::matches_search;

/// Whether a campaign was addressed to every patient at save time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    All,
    #[default]
    Single,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::All => write!(f, "all"),
            TargetType::Single => write!(f, "single"),
        }
    }
}

/// Display state of the select-all checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAllState {
    Checked,
    Indeterminate,
    Unchecked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudienceAction {
    Toggle { id: String },
    /// Adds or removes only the ids matching the current search.
    ToggleAll { checked: bool },
    Clear,
}

/// Ordered, duplicate-free set of selected patient ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudienceSelection {
    ids: Vec<String>,
}

impl AudienceSelection {
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        let mut selection = Self::default();
        for id in ids {
            selection.insert(id);
        }
        selection
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<String> {
        self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    fn insert(&mut self, id: String) {
        if !self.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn toggle(&mut self, id: &str) {
        if self.contains(id) {
            self.ids.retain(|selected| selected != id);
        } else {
            self.ids.push(id.to_string());
        }
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.insert(id.to_string());
        }
    }

    pub fn deselect_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let removed: HashSet<&str> = ids.into_iter().collect();
        self.ids.retain(|selected| !removed.contains(selected.as_str()));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drops ids that no longer belong to any patient.
    pub fn retain_known<'a>(&mut self, known: impl IntoIterator<Item = &'a str>) {
        let known: HashSet<&str> = known.into_iter().collect();
        self.ids.retain(|selected| known.contains(selected.as_str()));
    }

    pub fn apply(&mut self, action: &AudienceAction, filtered_ids: &[&str]) {
        match action {
            AudienceAction::Toggle { id } => self.toggle(id),
            AudienceAction::ToggleAll { checked: true } => self.select_all(filtered_ids.iter().copied()),
            AudienceAction::ToggleAll { checked: false } => self.deselect_all(filtered_ids.iter().copied()),
            AudienceAction::Clear => self.clear(),
        }
    }

    /// Checked when every filtered id is selected, indeterminate when only
    /// some are. An empty filter is never checked.
    pub fn select_all_state(&self, filtered_ids: &[&str]) -> SelectAllState {
        let hits = filtered_ids.iter().filter(|id| self.contains(id)).count();
        match hits {
            0 => SelectAllState::Unchecked,
            n if n == filtered_ids.len() => SelectAllState::Checked,
            _ => SelectAllState::Indeterminate,
        }
    }

    /// True when the selection is exactly the given id set.
    pub fn covers_all<'a>(&self, all_ids: impl IntoIterator<Item = &'a str>) -> bool {
        let all: HashSet<&str> = all_ids.into_iter().collect();
        let selected: HashSet<&str> = self.ids.iter().map(String::as_str).collect();
        !selected.is_empty() && selected == all
    }

    pub fn target_type<'a>(&self, all_ids: impl IntoIterator<Item = &'a str>) -> TargetType {
        if self.covers_all(all_ids) {
            TargetType::All
        } else {
            TargetType::Single
        }
    }

    pub fn summary(&self, total: usize, covers_all: bool) -> String {
        if self.is_empty() {
            "No patients selected".to_string()
        } else if covers_all {
            format!("All {} patients selected", total)
        } else {
            format!("{} of {} selected", self.len(), total)
        }
    }

    /// Counter shown next to the picker title; absent while nothing is selected.
    pub fn badge(&self, covers_all: bool) -> Option<String> {
        match (self.is_empty(), covers_all) {
            (true, _) => None,
            (false, true) => Some("All".to_string()),
            (false, false) => Some(self.len().to_string()),
        }
    }
}

/// Patients whose name or email contains the search text. Any non-empty
/// text filters, whitespace included.
pub fn filter_patients<'a>(patients: &'a [Patient], search: Option<&str>) -> Vec<&'a Patient> {
    match search.filter(|s| !s.is_empty()) {
        Some(term) => patients
            .iter()
            .filter(|p| matches_search(Some(p.name.as_str()), term) || matches_search(p.email.as_deref(), term))
            .collect(),
        None => patients.iter().collect(),
    }
}

pub fn select_all_caption(search: Option<&str>, matching: usize) -> String {
    match search.filter(|s| !s.is_empty()) {
        Some(_) => format!("Select all matching ({})", matching),
        None => "Select All Patients".to_string(),
    }
}

/// Short description of a saved campaign's audience.
pub fn audience_label(target_type: TargetType, patient_ids: &[String], patients: &[Patient]) -> String {
    match (target_type, patient_ids) {
        (TargetType::All, ids) => format!("All Patients ({})", ids.len()),
        (TargetType::Single, [only]) => patients
            .iter()
            .find(|p| &p.id == only)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "1 Patient".to_string()),
        (TargetType::Single, ids) => format!("{} Patients", ids.len()),
    }
}
