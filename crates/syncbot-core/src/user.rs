//! User identity and session attributes.

use std::fmt;

use serde::Deserialize;

use crate::util::uncloak_ip;

/// Profile payload (`{image, text}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Avatar image URL.
    pub image: String,
    /// Profile text.
    pub text: String,
}

/// Meta payload (`{afk, muted, smuted, ip, aliases}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserMeta {
    /// Away-from-keyboard flag.
    pub afk: bool,
    /// Muted flag.
    pub muted: bool,
    /// Shadow-muted flag (messages silently dropped server-side).
    pub smuted: bool,
    /// Raw (possibly cloaked) IP, visible only to sufficiently ranked users.
    pub ip: Option<String>,
    /// Known aliases.
    pub aliases: Vec<String>,
}

/// Server user entry as carried by `userlist` / `addUser` payloads.
///
/// Absent fields deserialize to `None` and are skipped by [`User::apply`],
/// so partial updates never clobber known state.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    /// User name (identity key).
    pub name: String,
    /// Privilege rank.
    #[serde(default)]
    pub rank: Option<i64>,
    /// Profile fields.
    #[serde(default)]
    pub profile: Option<UserProfile>,
    /// Meta fields.
    #[serde(default)]
    pub meta: Option<UserMeta>,
}

/// A chat user.
///
/// Equality is defined by name only, which makes lookup-by-name in the
/// channel's user collection work regardless of which fields have been
/// mirrored so far.
#[derive(Debug, Clone)]
pub struct User {
    /// User name (identity key). Empty for anonymous sessions.
    pub name: String,
    /// Login password, if any.
    pub password: Option<String>,
    /// Privilege rank; -1 while unauthenticated.
    pub rank: i64,
    /// Avatar image URL.
    pub image: String,
    /// Profile text.
    pub text: String,
    /// Away-from-keyboard flag.
    pub afk: bool,
    /// Muted flag.
    pub muted: bool,
    /// Shadow-muted flag.
    pub smuted: bool,
    /// Known aliases.
    pub aliases: Vec<String>,
    ip: Option<String>,
    uncloaked_ip: Option<String>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            name: String::new(),
            password: None,
            rank: -1,
            image: String::new(),
            text: String::new(),
            afk: false,
            muted: false,
            smuted: false,
            aliases: Vec::new(),
            ip: None,
            uncloaked_ip: None,
        }
    }
}

impl User {
    /// Create a named user with optional login password.
    pub fn new(name: impl Into<String>, password: Option<String>) -> Self {
        Self {
            name: name.into(),
            password,
            ..Self::default()
        }
    }

    /// Build a user from a server payload entry.
    pub fn from_payload(payload: &UserPayload) -> Self {
        let mut user = Self::default();
        user.apply(payload);
        user
    }

    /// Raw (possibly cloaked) IP.
    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    /// Uncloaked form of the IP, recomputed whenever the IP is set.
    pub fn uncloaked_ip(&self) -> Option<&str> {
        self.uncloaked_ip.as_deref()
    }

    /// Set the raw IP and recompute the derived uncloaked form.
    pub fn set_ip(&mut self, ip: Option<String>) {
        self.uncloaked_ip = ip.as_deref().map(uncloak_ip);
        self.ip = ip;
    }

    /// Profile fields as a payload struct.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            image: self.image.clone(),
            text: self.text.clone(),
        }
    }

    /// Overwrite profile fields.
    pub fn set_profile(&mut self, profile: &UserProfile) {
        self.image = profile.image.clone();
        self.text = profile.text.clone();
    }

    /// Meta fields as a payload struct.
    pub fn meta(&self) -> UserMeta {
        UserMeta {
            afk: self.afk,
            muted: self.muted,
            smuted: self.smuted,
            ip: self.ip.clone(),
            aliases: self.aliases.clone(),
        }
    }

    /// Overwrite meta fields, recomputing the uncloaked IP.
    pub fn set_meta(&mut self, meta: &UserMeta) {
        self.afk = meta.afk;
        self.muted = meta.muted;
        self.smuted = meta.smuted;
        self.aliases = meta.aliases.clone();
        self.set_ip(meta.ip.clone());
    }

    /// Merge a server payload: present fields overwrite, absent fields are
    /// left untouched.
    pub fn apply(&mut self, payload: &UserPayload) {
        self.name.clone_from(&payload.name);
        if let Some(rank) = payload.rank {
            self.rank = rank;
        }
        if let Some(profile) = &payload.profile {
            self.set_profile(profile);
        }
        if let Some(meta) = &payload.meta {
            self.set_meta(meta);
        }
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for User {}

impl PartialEq<str> for User {
    fn eq(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ip, &self.uncloaked_ip) {
            (Some(ip), Some(uncloaked)) => write!(
                f,
                "<user \"{}\" [{} {}] (rank {})>",
                self.name, ip, uncloaked, self.rank
            ),
            _ => write!(f, "<user \"{}\" (rank {})>", self.name, self.rank),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
