//! Race domain module

mod entity;
mod repository;
mod validation;

pub use entity::{Race, RaceDraft, RaceId};
pub use repository::RaceRepository;
pub use validation::{
    validate_closure_before_race, validate_future_date, validate_past_date, validate_race,
};

#[cfg(test)]
pub use repository::MockRaceRepository;
