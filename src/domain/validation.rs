//! Field-level validation primitives shared by every entity

use serde::{Deserialize, Serialize};

/// Classification of a single field failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Required,
    TooLong,
    SizeExceeded,
    InvalidFormat,
    InvalidDate,
    InvalidOrdering,
    DuplicateEntity,
    NotFound,
    AlreadyRegistered,
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Required => "required",
            Self::TooLong => "too_long",
            Self::SizeExceeded => "size_exceeded",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidDate => "invalid_date",
            Self::InvalidOrdering => "invalid_ordering",
            Self::DuplicateEntity => "duplicate_entity",
            Self::NotFound => "not_found",
            Self::AlreadyRegistered => "already_registered",
        };
        write!(f, "{}", s)
    }
}

/// A failure reported alongside the offending field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub kind: ValidationKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field failures collected from one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Record the error of a fallible check, if any
    pub fn check(&mut self, result: Result<(), FieldError>) {
        if let Err(error) = result {
            self.push(error);
        }
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Errors reported against the given field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |e| e.field == field)
    }

    pub fn has(&self, field: &str, kind: ValidationKind) -> bool {
        self.for_field(field).any(|e| e.kind == kind)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Whether a write creates a record or updates the one identified by `K`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode<K> {
    Create,
    Update(K),
}

impl<K> ValidationMode<K> {
    /// The record a uniqueness check has to ignore
    pub fn excluded(&self) -> Option<&K> {
        match self {
            Self::Create => None,
            Self::Update(key) => Some(key),
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }
}

/// Required text field with an upper bound on its length in characters
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(
            field,
            ValidationKind::Required,
            "This field is required.",
        ));
    }

    let len = value.chars().count();

    if len > max_len {
        return Err(FieldError::new(
            field,
            ValidationKind::TooLong,
            format!("Ensure this field has at most {} characters (it has {}).", max_len, len),
        ));
    }

    Ok(())
}

/// Optional text field; only the length is checked
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Result<(), FieldError> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(FieldError::new(
            field,
            ValidationKind::TooLong,
            format!("Ensure this field has at most {} characters.", max_len),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text() {
        assert!(validate_text("name", "Ferrari", 10).is_ok());

        let err = validate_text("name", "   ", 10).unwrap_err();
        assert_eq!(err.kind, ValidationKind::Required);

        let err = validate_text("name", &"a".repeat(11), 10).unwrap_err();
        assert_eq!(err.kind, ValidationKind::TooLong);
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_validate_text_counts_characters() {
        assert!(validate_text("name", "Pérez", 5).is_ok());
    }

    #[test]
    fn test_validate_optional_text() {
        assert!(validate_optional_text("description", None, 3).is_ok());
        assert!(validate_optional_text("description", Some("abc"), 3).is_ok());
        assert!(validate_optional_text("description", Some("abcd"), 3).is_err());
    }

    #[test]
    fn test_validation_errors_collects() {
        let mut errors = ValidationErrors::new();
        errors.check(Ok(()));
        errors.check(Err(FieldError::new("a", ValidationKind::Required, "x")));
        errors.check(Err(FieldError::new("b", ValidationKind::TooLong, "y")));

        assert_eq!(errors.len(), 2);
        assert!(errors.has("a", ValidationKind::Required));
        assert!(!errors.has("a", ValidationKind::TooLong));
        assert_eq!(errors.to_string(), "a: x; b: y");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_validation_mode_excluded() {
        assert_eq!(ValidationMode::<i64>::Create.excluded(), None);
        assert_eq!(ValidationMode::Update(7).excluded(), Some(&7));
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ValidationKind::AlreadyRegistered).unwrap(),
            "\"already_registered\""
        );
        assert_eq!(ValidationKind::SizeExceeded.to_string(), "size_exceeded");
    }
}
