//! Access control for graph mutation.
//!
//! Account management lives outside this crate. The engine only consumes
//! a [`CredentialStore`] to decide who may add or remove routes; see
//! [`RouteManager::authorize`](crate::RouteManager::authorize).

use log::{info, warn};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("user {0} could not be authenticated")]
    Denied(String),
}

/// The account collaborator consumed by the engine.
pub trait CredentialStore: Send + Sync {
    /// Registers a new account. Returns `false` if the username or
    /// e-mail address is already taken. An empty e-mail address is
    /// never considered taken.
    fn register(&self, username: &str, email: &str, password: &str) -> bool;

    /// Whether `password` is correct for `username`.
    fn authenticate(&self, username: &str, password: &str) -> bool;
}

struct Account {
    email: String,
    password: String,
}

/// A process-local credential store, for tests and single-operator
/// deployments. Secrets are held in memory as given; a store backed by
/// real account storage should hash them.
#[derive(Default)]
pub struct InMemoryCredentials {
    accounts: RwLock<HashMap<String, Account>>,
}

impl Debug for InMemoryCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let accounts = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();

        write!(f, "InMemoryCredentials {{ accounts: {accounts} }}")
    }
}

impl CredentialStore for InMemoryCredentials {
    fn register(&self, username: &str, email: &str, password: &str) -> bool {
        if username.trim().is_empty() || password.is_empty() {
            warn!("Refusing to register an account without username or password");
            return false;
        }

        let mut accounts = self
            .accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let taken = accounts.contains_key(username)
            || (!email.is_empty() && accounts.values().any(|account| account.email == email));

        if taken {
            warn!("Username {username} or its e-mail address is already registered");
            return false;
        }

        accounts.insert(
            username.to_string(),
            Account {
                email: email.to_string(),
                password: password.to_string(),
            },
        );

        info!("Registered user {username}");
        true
    }

    fn authenticate(&self, username: &str, password: &str) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .is_some_and(|account| account.password == password)
    }
}
