//! Team domain module
//!
//! Teams own drivers. A team is identified by a unique display name on the
//! API surface and carries a size-bounded logo image.

mod entity;
mod logo;
mod repository;
mod validation;

pub use entity::{Team, TeamDraft, TeamId};
pub use logo::{validate_logo, LogoStore, LogoUpload, MAX_LOGO_BYTES};
pub use repository::TeamRepository;
pub use validation::{
    duplicate_name_error, validate_team, MAX_TEAM_DESCRIPTION_LENGTH, MAX_TEAM_LOCATION_LENGTH,
    MAX_TEAM_NAME_LENGTH,
};

#[cfg(test)]
pub use logo::MockLogoStore;
#[cfg(test)]
pub use repository::MockTeamRepository;
