//! Driver/race registrations
//!
//! A registration is a (driver, race) pair with no identity of its own.
//! Replacing the set for one side is expressed as a diff so stores only
//! touch the pairs that actually change.

mod diff;
mod repository;

pub use diff::RegistrationDiff;
pub use repository::RegistrationRepository;

#[cfg(test)]
pub use repository::MockRegistrationRepository;
