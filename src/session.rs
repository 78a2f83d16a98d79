//! Player identity
//!
//! The identity service itself is external; the game only needs to know who
//! (if anyone) a finished run should be attributed to.

use serde::{Deserialize, Serialize};

/// Opaque user identifier issued by the identity service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public leaderboard handle: `Player_` plus the first 8 characters
    pub fn display_name(&self) -> String {
        let short: String = self.0.chars().take(8).collect();
        format!("Player_{short}")
    }
}

/// Read access to the signed-in user
pub trait IdentityProvider {
    fn current_user(&self) -> Option<UserId>;
}

/// In-process session mirror of the identity service
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<UserId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, user: UserId) {
        log::info!("Signed in as {}", user.display_name());
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        if self.user.take().is_some() {
            log::info!("Signed out");
        }
    }
}

impl IdentityProvider for Session {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }
}
