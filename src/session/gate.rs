use tracing::{info, warn};

use super::state::{SessionGraph, SessionRequest, SessionState};
use super::store::SessionStore;
use super::verifier::CredentialVerifier;

/// Key of the persisted flag.
pub const SESSION_FLAG_KEY: &str = "miftah_auth";
const FLAG_TRUE: &str = "true";
const FLAG_FALSE: &str = "false";

/// Login gate in front of the dashboard.
///
/// Never fails: wrong credentials and unreadable storage both come back as
/// `false`. Storage problems are logged.
pub struct SessionGate {
    verifier: Box<dyn CredentialVerifier>,
    store: Box<dyn SessionStore>,
    state: SessionState,
}

impl SessionGate {
    /// Restores the session from the persisted flag.
    pub fn new(verifier: Box<dyn CredentialVerifier>, store: Box<dyn SessionStore>) -> Self {
        let mut gate = Self {
            verifier,
            store,
            state: SessionState::Unauthenticated,
        };
        gate.state = SessionState::from_flag(gate.check_session());
        info!("Session restored: {:?}", gate.state);
        gate
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` only when the verifier accepts the pair and the flag
    /// could be persisted. A rejected pair leaves storage untouched.
    pub fn authenticate(&mut self, username: &str, password: &str) -> bool {
        if !self.verifier.verify(username, password) {
            info!("Login rejected for user '{}'", username);
            return false;
        }

        if let Err(e) = self.store.save(SESSION_FLAG_KEY, FLAG_TRUE) {
            warn!("Could not persist session flag: {}", e);
            return false;
        }

        self.apply(SessionRequest::CredentialsAccepted);
        info!("Login accepted for user '{}'", username);
        true
    }

    /// Clears the persisted flag. Safe to call when already logged out.
    ///
    /// If the key cannot be removed it is overwritten with `"false"`, which
    /// reads as logged out as well.
    pub fn logout(&mut self) {
        if let Err(e) = self.store.remove(SESSION_FLAG_KEY) {
            warn!("Could not clear session flag: {}", e);
            if let Err(e) = self.store.save(SESSION_FLAG_KEY, FLAG_FALSE) {
                warn!("Could not overwrite session flag: {}", e);
            }
        }
        self.apply(SessionRequest::Logout);
    }

    /// Reads the persisted flag. Absent, malformed or unreadable means `false`.
    pub fn check_session(&self) -> bool {
        match self.store.load(SESSION_FLAG_KEY) {
            Ok(Some(value)) => value == FLAG_TRUE,
            Ok(None) => false,
            Err(e) => {
                warn!("Could not read session flag: {}", e);
                false
            }
        }
    }

    fn apply(&mut self, request: SessionRequest) {
        if let Some(next) = SessionGraph::transition(self.state, request) {
            info!("Session transition: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}
