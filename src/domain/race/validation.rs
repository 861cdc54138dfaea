//! Race validation
//!
//! Date rules compare against the `today` handed in by the caller's clock.

use chrono::NaiveDate;

use super::entity::RaceDraft;
use crate::domain::validation::{validate_text, FieldError, ValidationErrors, ValidationKind};

const MAX_TRACK_NAME_LENGTH: usize = 256;
const MAX_TRACK_LOCATION_LENGTH: usize = 100;

pub fn validate_future_date(race_date: NaiveDate, today: NaiveDate) -> Result<(), FieldError> {
    if race_date <= today {
        return Err(FieldError::new(
            "race_date",
            ValidationKind::InvalidDate,
            "Race date must be in the future.",
        ));
    }

    Ok(())
}

pub fn validate_past_date(closure: Option<NaiveDate>, today: NaiveDate) -> Result<(), FieldError> {
    match closure {
        Some(date) if date >= today => Err(FieldError::new(
            "registration_closure_date",
            ValidationKind::InvalidDate,
            "Registration closure date must be in the past.",
        )),
        _ => Ok(()),
    }
}

pub fn validate_closure_before_race(draft: &RaceDraft) -> Result<(), FieldError> {
    match draft.registration_closure_date {
        Some(closure) if closure >= draft.race_date => Err(FieldError::new(
            "registration_closure_date",
            ValidationKind::InvalidOrdering,
            "Registration Closure date must be before the Race date !",
        )),
        _ => Ok(()),
    }
}

pub fn validate_race(draft: &RaceDraft, today: NaiveDate) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    errors.check(validate_text(
        "track_name",
        &draft.track_name,
        MAX_TRACK_NAME_LENGTH,
    ));
    errors.check(validate_text(
        "track_location",
        &draft.track_location,
        MAX_TRACK_LOCATION_LENGTH,
    ));
    errors.check(validate_future_date(draft.race_date, today));
    errors.check(validate_past_date(draft.registration_closure_date, today));
    errors.check(validate_closure_before_race(draft));

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 15)
    }

    #[test]
    fn test_race_date_must_be_after_today() {
        assert!(validate_future_date(date(2025, 6, 16), today()).is_ok());

        for race_date in [today(), date(2025, 6, 14), date(1999, 1, 1)] {
            let err = validate_future_date(race_date, today()).unwrap_err();
            assert_eq!(err.field, "race_date");
            assert_eq!(err.kind, ValidationKind::InvalidDate);
        }
    }

    #[test]
    fn test_closure_must_be_before_today() {
        assert!(validate_past_date(None, today()).is_ok());
        assert!(validate_past_date(Some(date(2025, 6, 14)), today()).is_ok());
        assert!(validate_past_date(Some(today()), today()).is_err());
        assert!(validate_past_date(Some(date(2025, 7, 1)), today()).is_err());
    }

    #[test]
    fn test_closure_on_or_after_race_date() {
        let race_date = date(2025, 8, 1);

        for closure in [race_date, date(2025, 8, 2)] {
            let draft = RaceDraft::new("Spa", "Belgium", race_date).with_closure(closure);
            let errors = validate_race(&draft, today());
            assert!(errors.has("registration_closure_date", ValidationKind::InvalidOrdering));
        }

        let draft = RaceDraft::new("Spa", "Belgium", race_date).with_closure(date(2025, 6, 1));
        assert!(validate_race(&draft, today()).is_empty());
    }

    #[test]
    fn test_validate_race_reports_every_field() {
        let draft = RaceDraft::new("", "x".repeat(101), today());
        let errors = validate_race(&draft, today());

        assert!(errors.has("track_name", ValidationKind::Required));
        assert!(errors.has("track_location", ValidationKind::TooLong));
        assert!(errors.has("race_date", ValidationKind::InvalidDate));
    }

    #[test]
    fn test_simulated_clock() {
        let draft = RaceDraft::new("Suzuka", "Japan", date(2030, 4, 6));

        assert!(validate_race(&draft, date(2030, 4, 5)).is_empty());
        assert!(!validate_race(&draft, date(2030, 4, 6)).is_empty());
    }
}
