//! Driver entity and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::team::TeamId;

/// Store-assigned driver identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(i64);

impl DriverId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied driver fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverDraft {
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub team_id: Option<TeamId>,
}

impl DriverDraft {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, dob: NaiveDate) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            dob,
            team_id: None,
        }
    }

    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }
}

/// Driver entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    id: DriverId,
    first_name: String,
    last_name: String,
    dob: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_id: Option<TeamId>,
}

impl Driver {
    pub fn from_draft(id: DriverId, draft: DriverDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            dob: draft.dob,
            team_id: draft.team_id,
        }
    }

    pub fn to_draft(&self) -> DriverDraft {
        DriverDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            dob: self.dob,
            team_id: self.team_id,
        }
    }

    pub fn apply(&mut self, draft: DriverDraft) {
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.dob = draft.dob;
        self.team_id = draft.team_id;
    }

    pub fn id(&self) -> DriverId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn dob(&self) -> NaiveDate {
        self.dob
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }

    /// "First Last", the form name-based lookups accept
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}
