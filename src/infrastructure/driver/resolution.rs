//! Driver lookup by "First Last" display name

use tracing::debug;

use crate::domain::driver::{parse_full_name, Driver, DriverRepository};
use crate::domain::validation::{FieldError, ValidationErrors, ValidationKind};
use crate::domain::DomainError;

/// Resolves one display name to exactly one driver
///
/// More than one match is reported as `DuplicateEntity` rather than picking one.
pub async fn resolve_driver_by_name(
    drivers: &dyn DriverRepository,
    full_name: &str,
) -> Result<Driver, DomainError> {
    let name = parse_full_name(full_name)?;
    let mut matches = drivers
        .find_by_name(&name.first_name, &name.last_name)
        .await?;

    debug!(name = %name, matches = matches.len(), "Resolving driver by name");

    match matches.len() {
        0 => Err(DomainError::not_found(format!(
            "Driver '{}' not found.",
            full_name.trim()
        ))),
        1 => Ok(matches.remove(0)),
        n => Err(DomainError::duplicate(format!(
            "Driver name '{}' is ambiguous: {} drivers match",
            full_name.trim(),
            n
        ))),
    }
}

/// Drivers resolved from a batch of names, plus per-name failures
#[derive(Debug, Default)]
pub struct ResolvedNames {
    /// Resolved drivers with the name each was requested as, without repeats
    pub drivers: Vec<(String, Driver)>,
    pub errors: ValidationErrors,
}

/// Resolves every name, reporting lookup failures against `field`
///
/// Names repeated in the batch are resolved once. Storage failures abort.
pub async fn resolve_driver_names(
    drivers: &dyn DriverRepository,
    names: &[String],
    field: &str,
) -> Result<ResolvedNames, DomainError> {
    let mut resolved = ResolvedNames::default();
    let mut seen: Vec<&str> = Vec::new();

    for name in names {
        let trimmed = name.trim();
        if seen.contains(&trimmed) {
            continue;
        }
        seen.push(trimmed);

        match resolve_driver_by_name(drivers, trimmed).await {
            Ok(driver) => {
                if !resolved.drivers.iter().any(|(_, d)| d.id() == driver.id()) {
                    resolved.drivers.push((trimmed.to_string(), driver));
                }
            }
            Err(e) => {
                let kind = match &e {
                    DomainError::InvalidFormat { .. } => Some(ValidationKind::InvalidFormat),
                    DomainError::NotFound { .. } => Some(ValidationKind::NotFound),
                    DomainError::DuplicateEntity { .. } => Some(ValidationKind::DuplicateEntity),
                    _ => None,
                };
                let Some(kind) = kind else {
                    return Err(e);
                };
                resolved.errors.push(FieldError::new(field, kind, e.message()));
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::driver::{DriverDraft, DriverId, MockDriverRepository};
    use chrono::NaiveDate;

    fn driver(id: i64, first: &str, last: &str, year: i32) -> Driver {
        let dob = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        Driver::from_draft(DriverId::new(id), DriverDraft::new(first, last, dob))
    }

    fn repo_with(drivers: Vec<Driver>) -> MockDriverRepository {
        let mut repo = MockDriverRepository::new();
        repo.expect_find_by_name().returning(move |first, last| {
            Ok(drivers
                .iter()
                .filter(|d| d.first_name() == first && d.last_name() == last)
                .cloned()
                .collect())
        });
        repo
    }

    #[tokio::test]
    async fn test_resolve_exact_match() {
        let repo = repo_with(vec![driver(1, "Lewis", "Hamilton", 1985)]);

        let found = resolve_driver_by_name(&repo, "Lewis Hamilton").await.unwrap();
        assert_eq!(found.id(), DriverId::new(1));
    }

    #[tokio::test]
    async fn test_resolve_failures() {
        let repo = repo_with(vec![
            driver(1, "Lewis", "Hamilton", 1985),
            driver(2, "Mick", "Schumacher", 1999),
            driver(3, "Mick", "Schumacher", 1969),
        ]);

        let err = resolve_driver_by_name(&repo, "Hamilton").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormat { .. }));

        let err = resolve_driver_by_name(&repo, "Lewis Hamiltonn").await.unwrap_err();
        assert!(err.is_not_found());

        let err = resolve_driver_by_name(&repo, "Mick Schumacher").await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateEntity { .. }));
    }

    #[tokio::test]
    async fn test_batch_reports_each_failure() {
        let repo = repo_with(vec![driver(1, "Lewis", "Hamilton", 1985)]);
        let names = vec![
            "Lewis Hamilton".to_string(),
            "Nobody Here".to_string(),
            "Mononym".to_string(),
            " Lewis Hamilton".to_string(),
        ];

        let resolved = resolve_driver_names(&repo, &names, "drivers").await.unwrap();

        assert_eq!(resolved.drivers.len(), 1);
        assert_eq!(resolved.drivers[0].0, "Lewis Hamilton");
        assert_eq!(resolved.errors.len(), 2);
        assert!(resolved.errors.has("drivers", ValidationKind::NotFound));
        assert!(resolved.errors.has("drivers", ValidationKind::InvalidFormat));
    }

    #[tokio::test]
    async fn test_batch_aborts_on_storage_failure() {
        let mut repo = MockDriverRepository::new();
        repo.expect_find_by_name()
            .returning(|_, _| Err(DomainError::storage("pool closed")));

        let err = resolve_driver_names(&repo, &["Lewis Hamilton".to_string()], "drivers")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }
}
