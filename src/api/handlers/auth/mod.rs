//! Auth handlers and supporting modules.
//!
//! Signup stores a new account, login exchanges credentials for a bearer token
//! and `/api/auth/me` resolves that token back into the account. Tokens are
//! stateless; the only server-side state is the account table.

pub(crate) mod login;
pub(crate) mod me;
pub(crate) mod principal;
pub(crate) mod signup;
mod state;
pub(crate) mod types;

pub use principal::Principal;
pub use state::{AuthConfig, AuthState};
