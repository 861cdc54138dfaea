//! "First Last" driver names as used by the API

use crate::domain::DomainError;

/// A display name split into the columns it is matched against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName {
    pub first_name: String,
    pub last_name: String,
}

impl std::fmt::Display for FullName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Splits on the first space; everything after it is the last name
pub fn parse_full_name(full_name: &str) -> Result<FullName, DomainError> {
    let invalid = || {
        DomainError::invalid_format(format!(
            "Invalid driver name format: '{}'. Use 'First Last'.",
            full_name
        ))
    };

    let (first, last) = full_name.trim().split_once(' ').ok_or_else(invalid)?;

    if first.is_empty() || last.trim().is_empty() {
        return Err(invalid());
    }

    Ok(FullName {
        first_name: first.to_string(),
        last_name: last.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_name() {
        let name = parse_full_name("Lewis Hamilton").unwrap();
        assert_eq!(name.first_name, "Lewis");
        assert_eq!(name.last_name, "Hamilton");
        assert_eq!(name.to_string(), "Lewis Hamilton");
    }

    #[test]
    fn test_remainder_is_last_name() {
        let name = parse_full_name("Carlos Sainz Vázquez").unwrap();
        assert_eq!(name.first_name, "Carlos");
        assert_eq!(name.last_name, "Sainz Vázquez");
    }

    #[test]
    fn test_outer_whitespace_is_ignored() {
        let name = parse_full_name("  Max Verstappen ").unwrap();
        assert_eq!(name.first_name, "Max");
        assert_eq!(name.last_name, "Verstappen");
    }

    #[test]
    fn test_missing_last_name() {
        let err = parse_full_name("Lewis").unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormat { .. }));
        assert!(err.to_string().contains("'Lewis'"));

        assert!(parse_full_name("").is_err());
        assert!(parse_full_name("Lewis   ").is_err());
    }
}
