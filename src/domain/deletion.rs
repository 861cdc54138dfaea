//! Deletion guards
//!
//! Each entity kind has its own rule: a team takes its unregistered drivers
//! with it, drivers and races never cascade. A guard only looks at the
//! reference counts of its own entity; stores evaluate it inside the same
//! transaction as the delete it protects.

use serde::Serialize;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Driver,
    Race,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Team => write!(f, "team"),
            Self::Driver => write!(f, "driver"),
            Self::Race => write!(f, "race"),
        }
    }
}

/// What happens to dependent records once a delete is allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPolicy {
    /// Owned drivers are removed along with the owner
    CascadeUnreferenced,
    /// Nothing else is removed
    Restrict,
}

#[derive(Debug, Clone, Copy)]
pub struct DeletionRule {
    pub kind: EntityKind,
    pub policy: DeletionPolicy,
    pub blocked_message: &'static str,
}

pub const DELETION_RULES: [DeletionRule; 3] = [
    DeletionRule {
        kind: EntityKind::Team,
        policy: DeletionPolicy::CascadeUnreferenced,
        blocked_message: "Cannot delete team with drivers registered to races",
    },
    DeletionRule {
        kind: EntityKind::Driver,
        policy: DeletionPolicy::Restrict,
        blocked_message: "Cannot delete driver who is registered for races",
    },
    DeletionRule {
        kind: EntityKind::Race,
        policy: DeletionPolicy::Restrict,
        blocked_message: "Cannot delete race with registered drivers",
    },
];

pub fn rule_for(kind: EntityKind) -> &'static DeletionRule {
    match kind {
        EntityKind::Team => &DELETION_RULES[0],
        EntityKind::Driver => &DELETION_RULES[1],
        EntityKind::Race => &DELETION_RULES[2],
    }
}

/// Relationships currently pointing at one record
///
/// For a team, `registrations` counts the registrations held by its drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct References {
    pub owned_drivers: usize,
    pub registrations: usize,
}

impl References {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn registrations(count: usize) -> Self {
        Self {
            owned_drivers: 0,
            registrations: count,
        }
    }
}

/// Evaluates the guard for `kind`; `Ok` means the delete may proceed
pub fn check_deletable(kind: EntityKind, refs: &References) -> Result<(), DomainError> {
    let rule = rule_for(kind);

    if refs.registrations > 0 {
        return Err(DomainError::referential_conflict(rule.blocked_message));
    }

    Ok(())
}

/// Result of a delete that went through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    pub kind: EntityKind,
    pub id: i64,
    /// Drivers removed together with a team
    pub cascaded_drivers: usize,
}

impl DeletionOutcome {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self {
            kind,
            id,
            cascaded_drivers: 0,
        }
    }

    pub fn with_cascaded_drivers(mut self, count: usize) -> Self {
        debug_assert_eq!(
            rule_for(self.kind).policy,
            DeletionPolicy::CascadeUnreferenced
        );
        self.cascaded_drivers = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_per_kind() {
        assert_eq!(
            rule_for(EntityKind::Team).policy,
            DeletionPolicy::CascadeUnreferenced
        );
        assert_eq!(rule_for(EntityKind::Driver).policy, DeletionPolicy::Restrict);
        assert_eq!(rule_for(EntityKind::Race).policy, DeletionPolicy::Restrict);

        for rule in DELETION_RULES.iter() {
            assert_eq!(rule_for(rule.kind).kind, rule.kind);
        }
    }

    #[test]
    fn test_unreferenced_is_deletable() {
        for kind in [EntityKind::Team, EntityKind::Driver, EntityKind::Race] {
            assert!(check_deletable(kind, &References::none()).is_ok());
        }
    }

    #[test]
    fn test_team_with_unregistered_drivers_is_deletable() {
        let refs = References {
            owned_drivers: 3,
            registrations: 0,
        };
        assert!(check_deletable(EntityKind::Team, &refs).is_ok());
    }

    #[test]
    fn test_registrations_block_every_kind() {
        let refs = References {
            owned_drivers: 1,
            registrations: 1,
        };

        let err = check_deletable(EntityKind::Team, &refs).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Referential conflict: Cannot delete team with drivers registered to races"
        );

        let err = check_deletable(EntityKind::Driver, &References::registrations(2)).unwrap_err();
        assert!(err.is_referential_conflict());

        let err = check_deletable(EntityKind::Race, &References::registrations(1)).unwrap_err();
        assert!(err.to_string().contains("registered drivers"));
    }

    #[test]
    fn test_guard_is_repeatable() {
        let refs = References::none();
        for _ in 0..3 {
            assert!(check_deletable(EntityKind::Race, &refs).is_ok());
        }
    }
}
