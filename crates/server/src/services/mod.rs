//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Email and password accounts
//! - `roles` - Role lookup for the signed-in user
//! - `forms` - Form validation for every write
//! - `flash` - One-shot notifications across redirects
//! - `audit` - Best-effort audit trail

pub mod audit;
pub mod auth;
pub mod flash;
pub mod forms;
pub mod roles;

pub use auth::{AuthError, AuthService};
pub use flash::{Flash, FlashKind};
pub use forms::ValidationError;
