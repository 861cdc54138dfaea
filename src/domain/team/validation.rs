//! Team validation

use super::entity::TeamDraft;
use crate::domain::validation::{
    validate_optional_text, validate_text, FieldError, ValidationErrors, ValidationKind,
};

pub const MAX_TEAM_NAME_LENGTH: usize = 256;
pub const MAX_TEAM_LOCATION_LENGTH: usize = 256;
pub const MAX_TEAM_DESCRIPTION_LENGTH: usize = 1024;

/// Field checks that need no other record
pub fn validate_team(draft: &TeamDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    errors.check(validate_text("name", &draft.name, MAX_TEAM_NAME_LENGTH));
    errors.check(validate_text(
        "location",
        &draft.location,
        MAX_TEAM_LOCATION_LENGTH,
    ));
    errors.check(validate_optional_text(
        "description",
        draft.description.as_deref(),
        MAX_TEAM_DESCRIPTION_LENGTH,
    ));

    errors
}

pub fn duplicate_name_error() -> FieldError {
    FieldError::new(
        "name",
        ValidationKind::DuplicateEntity,
        "Team with this name already exists.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_team() {
        let draft = TeamDraft::new("McLaren", "Woking").with_description("Papaya");
        assert!(validate_team(&draft).is_empty());
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let draft = TeamDraft::new("", " ");
        let errors = validate_team(&draft);

        assert_eq!(errors.len(), 2);
        assert!(errors.has("name", ValidationKind::Required));
        assert!(errors.has("location", ValidationKind::Required));
    }

    #[test]
    fn test_name_too_long() {
        let draft = TeamDraft::new("a".repeat(257), "Brackley");
        assert!(validate_team(&draft).has("name", ValidationKind::TooLong));

        let draft = TeamDraft::new("a".repeat(256), "Brackley");
        assert!(validate_team(&draft).is_empty());
    }

    #[test]
    fn test_description_too_long() {
        let draft = TeamDraft::new("Williams", "Grove").with_description("x".repeat(1025));
        assert!(validate_team(&draft).has("description", ValidationKind::TooLong));
    }
}
