//! Account provisioning for checkout.
//!
//! The orchestrator consumes only this contract: given buyer contact
//! info, return an account and a session. First-time buyers get an
//! account created on the spot with a generated (hashed) password.

use crate::password::{generate_password, hash_password};
use crate::session::AuthSession;
use crate::user::{Role, User};
use crate::AuthError;
use std::collections::HashMap;
use std::sync::Mutex;
use vend_commerce::checkout::BuyerInfo;
use vend_commerce::ids::UserId;

/// Length of generated first-purchase passwords.
const GENERATED_PASSWORD_LEN: usize = 16;

/// Mints sessions for new or returning buyers.
pub trait AccountProvider {
    /// Find or create the account for this buyer and issue a session.
    fn ensure_account(&self, buyer: &BuyerInfo) -> Result<(User, AuthSession), AuthError>;
}

struct StoredAccount {
    user: User,
    #[allow(dead_code)] // Read by the login path, which lives outside this core.
    password_hash: String,
}

/// In-memory account registry.
#[derive(Default)]
pub struct MemoryAccounts {
    // Keyed by lower-cased email.
    accounts: Mutex<HashMap<String, StoredAccount>>,
}

impl MemoryAccounts {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with an explicit role and password.
    pub fn seed(&self, email: &str, role: Role, password: &str) -> Result<User, AuthError> {
        let user = User::new(UserId::generate(), email, None, role);
        let password_hash = hash_password(password)?;
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| AuthError::Backend("accounts lock poisoned".into()))?;
        accounts.insert(
            user.email.clone(),
            StoredAccount {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }
}

impl AccountProvider for MemoryAccounts {
    fn ensure_account(&self, buyer: &BuyerInfo) -> Result<(User, AuthSession), AuthError> {
        let email = buyer.email.trim().to_lowercase();
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| AuthError::Backend("accounts lock poisoned".into()))?;

        if let Some(stored) = accounts.get(&email) {
            let session = AuthSession::issue(&stored.user);
            return Ok((stored.user.clone(), session));
        }

        // First purchase: auto-register with a generated password.
        let user = User::new(
            UserId::generate(),
            &email,
            Some(buyer.name.clone()),
            Role::Customer,
        );
        let password_hash = hash_password(&generate_password(GENERATED_PASSWORD_LEN))?;
        accounts.insert(
            email,
            StoredAccount {
                user: user.clone(),
                password_hash,
            },
        );
        let session = AuthSession::issue(&user);
        Ok((user, session))
    }
}

impl<T: AccountProvider + ?Sized> AccountProvider for &T {
    fn ensure_account(&self, buyer: &BuyerInfo) -> Result<(User, AuthSession), AuthError> {
        (**self).ensure_account(buyer)
    }
}

impl<T: AccountProvider + ?Sized> AccountProvider for std::sync::Arc<T> {
    fn ensure_account(&self, buyer: &BuyerInfo) -> Result<(User, AuthSession), AuthError> {
        (**self).ensure_account(buyer)
    }
}
