//! Session Manager for vaultdesk.
//!
//! Tracks where the user is in the sign-in flow. Key material lives in
//! [`KeyRing`](crate::services::keyring::KeyRing); this only holds the state
//! the UI routes on.

use serde::Serialize;

use crate::types::errors::AuthError;

/// Sign-in state of the application session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Anonymous,
    /// Registered, but the recovery seed phrase hasn't been acknowledged.
    AwaitingSeedConfirmation { email: String, seed_phrase: String },
    Authenticated { email: String },
}

/// Snapshot returned to the UI by `AuthStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub is_registration_complete: bool,
    pub seed_phrase: Option<String>,
    pub email: Option<String>,
}

/// Trait defining session state transitions.
pub trait SessionManagerTrait {
    fn state(&self) -> &AuthState;
    fn sign_in(&mut self, email: &str);
    fn await_seed_confirmation(&mut self, email: &str, seed_phrase: String);
    fn confirm_seed_phrase(&mut self) -> Result<(), AuthError>;
    fn sign_out(&mut self);
    fn is_authenticated(&self) -> bool;
    fn email(&self) -> Option<&str>;
    fn status(&self) -> AuthStatus;
}

#[derive(Debug, Default)]
pub struct SessionManager {
    state: AuthState,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionManagerTrait for SessionManager {
    fn state(&self) -> &AuthState {
        &self.state
    }

    fn sign_in(&mut self, email: &str) {
        self.state = AuthState::Authenticated {
            email: email.to_string(),
        };
    }

    fn await_seed_confirmation(&mut self, email: &str, seed_phrase: String) {
        self.state = AuthState::AwaitingSeedConfirmation {
            email: email.to_string(),
            seed_phrase,
        };
    }

    /// Moves a fresh registration to authenticated.
    fn confirm_seed_phrase(&mut self) -> Result<(), AuthError> {
        match std::mem::take(&mut self.state) {
            AuthState::AwaitingSeedConfirmation { email, .. } => {
                self.state = AuthState::Authenticated { email };
                Ok(())
            }
            other => {
                self.state = other;
                Err(AuthError::NotSignedIn)
            }
        }
    }

    fn sign_out(&mut self) {
        self.state = AuthState::Anonymous;
    }

    /// A registration awaiting seed confirmation already holds its keys.
    fn is_authenticated(&self) -> bool {
        !matches!(self.state, AuthState::Anonymous)
    }

    fn email(&self) -> Option<&str> {
        match &self.state {
            AuthState::Anonymous => None,
            AuthState::AwaitingSeedConfirmation { email, .. } | AuthState::Authenticated { email } => Some(email),
        }
    }

    fn status(&self) -> AuthStatus {
        AuthStatus {
            is_authenticated: self.is_authenticated(),
            is_registration_complete: matches!(self.state, AuthState::Authenticated { .. }),
            seed_phrase: match &self.state {
                AuthState::AwaitingSeedConfirmation { seed_phrase, .. } => Some(seed_phrase.clone()),
                _ => None,
            },
            email: self.email().map(str::to_string),
        }
    }
}
