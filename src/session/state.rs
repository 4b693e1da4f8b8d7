use serde::{Deserialize, Serialize};

/// Whether the dashboard is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated,
}

impl SessionState {
    pub fn from_flag(authenticated: bool) -> Self {
        if authenticated {
            Self::Authenticated
        } else {
            Self::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Requests a session transition. The graph decides whether it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    /// The verifier accepted a credential pair and the flag was persisted.
    CredentialsAccepted,
    Logout,
}

pub struct SessionGraph;

impl SessionGraph {
    /// Pure function: (Current State, Request) -> New State.
    /// Returns None when the request leaves the state unchanged.
    pub fn transition(current: SessionState, request: SessionRequest) -> Option<SessionState> {
        use SessionRequest::*;
        use SessionState::*;

        match (current, request) {
            (Unauthenticated, CredentialsAccepted) => Some(Authenticated),
            (Authenticated, Logout) => Some(Unauthenticated),
            // Re-login while authenticated, logout while logged out
            _ => None,
        }
    }
}
