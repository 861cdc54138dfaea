use thiserror::Error;

use super::validation::ValidationErrors;

/// Core domain errors
///
/// Every failure a caller can recover from is classified into exactly one of
/// the first five variants; the remaining ones describe broken infrastructure.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Referential conflict: {message}")]
    ReferentialConflict { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Duplicate entity: {message}")]
    DuplicateEntity { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn referential_conflict(message: impl Into<String>) -> Self {
        Self::ReferentialConflict {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::DuplicateEntity {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The human-readable part of the error, without the kind prefix
    pub fn message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::ReferentialConflict { message }
            | Self::NotFound { message }
            | Self::InvalidFormat { message }
            | Self::DuplicateEntity { message }
            | Self::Storage { message }
            | Self::Configuration { message }
            | Self::Internal { message } => message.clone(),
        }
    }

    /// Returns the field errors when this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_referential_conflict(&self) -> bool {
        matches!(self, Self::ReferentialConflict { .. })
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::{FieldError, ValidationKind};

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Team 'Ferrari' not found");
        assert_eq!(error.to_string(), "Not found: Team 'Ferrari' not found");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_referential_conflict_error() {
        let error = DomainError::referential_conflict("Cannot delete race with registered drivers");
        assert_eq!(
            error.to_string(),
            "Referential conflict: Cannot delete race with registered drivers"
        );
        assert!(error.is_referential_conflict());
        assert_eq!(error.message(), "Cannot delete race with registered drivers");
    }

    #[test]
    fn test_validation_error_from_field_errors() {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::new("dob", ValidationKind::InvalidDate, "too late"));

        let error = DomainError::from(errors);
        let fields = error.validation_errors().unwrap();
        assert_eq!(fields.len(), 1);
        assert!(error.to_string().starts_with("Validation failed"));
    }
}
