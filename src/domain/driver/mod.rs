//! Driver domain module

mod entity;
mod name;
mod repository;
mod validation;

pub use entity::{Driver, DriverDraft, DriverId};
pub use name::{parse_full_name, FullName};
pub use repository::DriverRepository;
pub use validation::{duplicate_driver_error, validate_dob, validate_driver, DOB_CUTOFF_YEAR};

#[cfg(test)]
pub use repository::MockDriverRepository;
