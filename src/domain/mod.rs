//! Domain layer - Core business logic and entities

pub mod clock;
pub mod deletion;
pub mod driver;
pub mod error;
pub mod race;
pub mod registration;
pub mod team;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use deletion::{
    check_deletable, rule_for, DeletionOutcome, DeletionPolicy, DeletionRule, EntityKind,
    References, DELETION_RULES,
};
pub use driver::{Driver, DriverDraft, DriverId, DriverRepository, FullName};
pub use error::DomainError;
pub use race::{Race, RaceDraft, RaceId, RaceRepository};
pub use registration::{RegistrationDiff, RegistrationRepository};
pub use team::{LogoStore, LogoUpload, Team, TeamDraft, TeamId, TeamRepository};
pub use validation::{FieldError, ValidationErrors, ValidationKind, ValidationMode};
