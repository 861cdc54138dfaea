//! Driver validation

use chrono::{Datelike, NaiveDate};

use super::entity::DriverDraft;
use crate::domain::validation::{validate_text, FieldError, ValidationErrors, ValidationKind};

const MAX_DRIVER_NAME_LENGTH: usize = 96;

/// Drivers must be born on or before 31 December of this year
pub const DOB_CUTOFF_YEAR: i32 = 2000;

pub fn validate_dob(dob: NaiveDate) -> Result<(), FieldError> {
    if dob.year() > DOB_CUTOFF_YEAR {
        return Err(FieldError::new(
            "dob",
            ValidationKind::InvalidDate,
            "Driver must be born on or before 31/12/2000.",
        ));
    }

    Ok(())
}

/// Field checks that need no other record
pub fn validate_driver(draft: &DriverDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    errors.check(validate_text(
        "first_name",
        &draft.first_name,
        MAX_DRIVER_NAME_LENGTH,
    ));
    errors.check(validate_text(
        "last_name",
        &draft.last_name,
        MAX_DRIVER_NAME_LENGTH,
    ));
    errors.check(validate_dob(draft.dob));

    errors
}

pub fn duplicate_driver_error() -> FieldError {
    FieldError::new(
        "non_field_errors",
        ValidationKind::DuplicateEntity,
        "Driver already exists",
    )
}
