pub mod auth;
pub mod extractors;

pub use auth::require_auth;
pub use auth::AuthenticatedUser;
pub use extractors::*;
