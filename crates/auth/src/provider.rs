//! Contract consumed from the identity provider, plus an in-process
//! implementation used by the shell binary and by tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::{Role, SessionUser};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Account creation request sent to [`IdentityProvider::register`].
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub name: String,
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("name", &self.name)
            .finish()
    }
}

/// Session/identity provider.
///
/// The shell never authenticates anyone itself; it only reads the current
/// user, asks for logout, and forwards account creation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The logged-in user, or `None` for an anonymous session.
    fn current_user(&self) -> Option<SessionUser>;

    fn logout(&self);

    /// Create an account.
    ///
    /// `Ok(false)` means the provider declined (e.g. the email is taken).
    /// Callers treat `Err` the same way as a decline.
    async fn register(&self, registration: Registration) -> Result<bool, IdentityError>;
}

#[derive(Debug, Clone)]
struct Account {
    name: String,
    password: String,
    role: Role,
}

#[derive(Debug, Default)]
struct ProviderState {
    current: Option<SessionUser>,
    accounts: HashMap<String, Account>,
}

/// Provider keeping accounts in memory, keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    state: Mutex<ProviderState>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account without going through `register`.
    pub fn with_account(self, email: &str, password: &str, role: Role, name: &str) -> Self {
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                name: name.to_string(),
                password: password.to_string(),
                role,
            },
        );
        self
    }

    pub fn login(&self, email: &str, password: &str) -> Result<SessionUser, IdentityError> {
        let mut state = self.lock();
        let account = state
            .accounts
            .get(email)
            .filter(|a| a.password == password)
            .ok_or(IdentityError::InvalidCredentials)?;

        let user = SessionUser::new(email, account.role);
        tracing::info!(identity = %email, role = %account.role, "session started");
        state.current = Some(user.clone());
        Ok(user)
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.lock().accounts.contains_key(email)
    }

    /// Display name and role of a stored account.
    pub fn account(&self, email: &str) -> Option<(String, Role)> {
        self.lock().accounts.get(email).map(|a| (a.name.clone(), a.role))
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn current_user(&self) -> Option<SessionUser> {
        self.lock().current.clone()
    }

    fn logout(&self) {
        if let Some(user) = self.lock().current.take() {
            tracing::info!(identity = %user.identity, "session ended");
        }
    }

    async fn register(&self, registration: Registration) -> Result<bool, IdentityError> {
        let mut state = self.lock();
        if state.accounts.contains_key(&registration.email) {
            tracing::debug!(email = %registration.email, "registration declined: email already registered");
            return Ok(false);
        }

        state.accounts.insert(
            registration.email,
            Account {
                name: registration.name,
                password: registration.password,
                role: registration.role,
            },
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: "s3cret".to_string(),
            role: Role::Vendedor,
            name: "Luis".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let provider = InMemoryIdentityProvider::new();

        assert!(provider.register(registration("luis@sieeg.mx")).await.unwrap());
        let user = provider.login("luis@sieeg.mx", "s3cret").unwrap();

        assert_eq!(user.role, Role::Vendedor);
        assert_eq!(provider.current_user(), Some(user));
        assert_eq!(provider.account("luis@sieeg.mx"), Some(("Luis".to_string(), Role::Vendedor)));
    }

    #[tokio::test]
    async fn duplicate_email_is_declined() {
        let provider = InMemoryIdentityProvider::new().with_account("luis@sieeg.mx", "x", Role::Admin, "Luis");

        assert!(!provider.register(registration("luis@sieeg.mx")).await.unwrap());
        // Existing account untouched.
        assert_eq!(provider.account("luis@sieeg.mx").map(|(_, r)| r), Some(Role::Admin));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let provider = InMemoryIdentityProvider::new().with_account("ana@sieeg.mx", "right", Role::Admin, "Ana");
        assert_eq!(provider.login("ana@sieeg.mx", "wrong"), Err(IdentityError::InvalidCredentials));
        assert_eq!(provider.current_user(), None);
    }

    #[test]
    fn logout_clears_current_user() {
        let provider = InMemoryIdentityProvider::new().with_account("ana@sieeg.mx", "pw", Role::Admin, "Ana");
        provider.login("ana@sieeg.mx", "pw").unwrap();

        provider.logout();

        assert_eq!(provider.current_user(), None);
    }

    #[test]
    fn registration_debug_redacts_password() {
        let rendered = format!("{:?}", registration("a@b.c"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
