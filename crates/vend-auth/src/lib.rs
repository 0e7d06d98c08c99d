//! Users, roles, and session issuance for Vend.
//!
//! Checkout consumes the [`AccountProvider`] contract to auto-register
//! first-time buyers; fulfillment checks the caller's [`Role`] before
//! any transition.

mod error;
mod password;
mod provider;
mod session;
mod user;

pub use error::AuthError;
pub use password::{generate_password, hash_password, verify_password};
pub use provider::{AccountProvider, MemoryAccounts};
pub use session::{AuthSession, SessionId};
pub use user::{Role, User};
