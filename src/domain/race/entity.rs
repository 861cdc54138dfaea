//! Race entity and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned race identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaceId(i64);

impl RaceId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied race fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceDraft {
    pub track_name: String,
    pub track_location: String,
    pub race_date: NaiveDate,
    pub registration_closure_date: Option<NaiveDate>,
}

impl RaceDraft {
    pub fn new(
        track_name: impl Into<String>,
        track_location: impl Into<String>,
        race_date: NaiveDate,
    ) -> Self {
        Self {
            track_name: track_name.into(),
            track_location: track_location.into(),
            race_date,
            registration_closure_date: None,
        }
    }

    pub fn with_closure(mut self, date: NaiveDate) -> Self {
        self.registration_closure_date = Some(date);
        self
    }
}

/// Race entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    id: RaceId,
    track_name: String,
    track_location: String,
    race_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    registration_closure_date: Option<NaiveDate>,
}

impl Race {
    pub fn from_draft(id: RaceId, draft: RaceDraft) -> Self {
        Self {
            id,
            track_name: draft.track_name,
            track_location: draft.track_location,
            race_date: draft.race_date,
            registration_closure_date: draft.registration_closure_date,
        }
    }

    pub fn to_draft(&self) -> RaceDraft {
        RaceDraft {
            track_name: self.track_name.clone(),
            track_location: self.track_location.clone(),
            race_date: self.race_date,
            registration_closure_date: self.registration_closure_date,
        }
    }

    pub fn apply(&mut self, draft: RaceDraft) {
        self.track_name = draft.track_name;
        self.track_location = draft.track_location;
        self.race_date = draft.race_date;
        self.registration_closure_date = draft.registration_closure_date;
    }

    pub fn id(&self) -> RaceId {
        self.id
    }

    pub fn track_name(&self) -> &str {
        &self.track_name
    }

    pub fn track_location(&self) -> &str {
        &self.track_location
    }

    pub fn race_date(&self) -> NaiveDate {
        self.race_date
    }

    pub fn registration_closure_date(&self) -> Option<NaiveDate> {
        self.registration_closure_date
    }

    /// "Track on YYYY-MM-DD", how a driver lists its races
    pub fn label(&self) -> String {
        format!("{} on {}", self.track_name, self.race_date)
    }
}

impl std::fmt::Display for Race {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.track_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_label() {
        let race = Race::from_draft(
            RaceId::new(1),
            RaceDraft::new("Monza", "Italy", NaiveDate::from_ymd_opt(2030, 9, 1).unwrap()),
        );

        assert_eq!(race.label(), "Monza on 2030-09-01");
        assert_eq!(race.to_string(), "Monza");
        assert!(race.registration_closure_date().is_none());
    }

    #[test]
    fn test_race_apply() {
        let date = NaiveDate::from_ymd_opt(2030, 5, 25).unwrap();
        let mut race = Race::from_draft(RaceId::new(2), RaceDraft::new("Monaco", "Monaco", date));
        let closure = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        race.apply(race.to_draft().with_closure(closure));
        assert_eq!(race.registration_closure_date(), Some(closure));
        assert_eq!(race.race_date(), date);
    }
}
