//! Channel container: server-pushed channel state, the user collection, and
//! the playlist.

use serde_json::Value;

use crate::errors::{Error, Result};
use crate::playlist::Playlist;
use crate::user::{User, UserMeta};

/// A channel on the media-sync service.
///
/// Owned exclusively by one bot instance; all mutation flows through the
/// state-mirror handlers or the bot itself.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    /// Channel name.
    pub name: String,
    /// Join password, if the channel requires one.
    pub password: Option<String>,
    /// Message of the day.
    pub motd: String,
    /// Channel CSS.
    pub css: String,
    /// Channel JS.
    pub js: String,
    /// Channel options document, kept verbatim.
    pub options: Value,
    /// Permission table: action name → minimum rank (fractional ranks exist).
    pub permissions: Value,
    /// Emote list, kept verbatim.
    pub emotes: Value,
    /// Drink counter.
    pub drink_count: i64,
    /// Connected-user count as reported by the server (includes anonymous
    /// viewers absent from the user collection).
    pub user_count: u64,
    /// The channel's playlist.
    pub playlist: Playlist,
    users: Vec<User>,
}

impl Channel {
    /// Create a channel with an optional join password.
    pub fn new(name: impl Into<String>, password: Option<String>) -> Self {
        Self {
            name: name.into(),
            password,
            ..Self::default()
        }
    }

    /// Known users, in arrival order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Look up a user by name.
    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }

    /// Look up a user by name for in-place mutation.
    pub fn user_mut(&mut self, name: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.name == name)
    }

    /// Insert a user, replacing any existing entry with the same name.
    pub fn add_user(&mut self, user: User) {
        match self.user_mut(&user.name) {
            Some(existing) => *existing = user,
            None => self.users.push(user),
        }
    }

    /// Remove a user by name. `None` when no such user is known.
    pub fn remove_user(&mut self, name: &str) -> Option<User> {
        let pos = self.users.iter().position(|u| u.name == name)?;
        Some(self.users.remove(pos))
    }

    /// Drop the entire user collection.
    pub fn clear_users(&mut self) {
        self.users.clear();
    }

    /// Merge meta fields onto the named user. Returns whether the user was
    /// found.
    pub fn set_user_meta(&mut self, name: &str, meta: &UserMeta) -> bool {
        match self.user_mut(name) {
            Some(user) => {
                user.set_meta(meta);
                true
            }
            None => false,
        }
    }

    /// Check whether `user` may perform `action`.
    ///
    /// The permission table maps action names to a minimum rank. A missing
    /// table or entry denies, matching the server's default-closed stance
    /// before channel state has been mirrored.
    pub fn check_permission(&self, action: &str, user: &User) -> Result<()> {
        let Some(required) = self.permissions.get(action).and_then(Value::as_f64) else {
            return Err(Error::Permission(format!("{action}: no such permission")));
        };
        if (user.rank as f64) < required {
            return Err(Error::Permission(format!(
                "{action}: rank {} below required {required}",
                user.rank
            )));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
