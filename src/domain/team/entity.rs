//! Team entity and related types

use serde::{Deserialize, Serialize};

/// Store-assigned team identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(i64);

impl TeamId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied team fields, validated before they reach a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
}

impl TeamDraft {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Team entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    /// Unique display name
    name: String,
    location: String,
    /// Reference returned by the logo store
    logo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Team {
    /// Assemble a persisted team from a validated draft
    pub fn from_draft(id: TeamId, draft: TeamDraft, logo: impl Into<String>) -> Self {
        Self {
            id,
            name: draft.name,
            location: draft.location,
            logo: logo.into(),
            description: draft.description,
        }
    }

    /// Current fields as a draft, the starting point of an update
    pub fn to_draft(&self) -> TeamDraft {
        TeamDraft {
            name: self.name.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
        }
    }

    /// Replace the editable fields with a validated draft
    pub fn apply(&mut self, draft: TeamDraft) {
        self.name = draft.name;
        self.location = draft.location;
        self.description = draft.description;
    }

    /// Swap the logo reference, returning the previous one
    pub fn replace_logo(&mut self, logo: impl Into<String>) -> String {
        std::mem::replace(&mut self.logo, logo.into())
    }

    // Getters

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn logo(&self) -> &str {
        &self.logo
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
