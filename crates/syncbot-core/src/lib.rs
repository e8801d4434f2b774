//! # syncbot-core
//!
//! Foundation types for the syncbot client runtime.
//!
//! This crate provides the shared vocabulary that the runtime crate depends on:
//!
//! - **Errors**: [`errors::Error`] taxonomy via `thiserror`, plus the
//!   collaborator error types [`errors::TransportError`] and [`errors::FetchError`]
//! - **User**: [`user::User`] identity/session model with merge semantics for
//!   server payloads
//! - **Channel**: [`channel::Channel`] container owning the user collection and
//!   the playlist
//! - **Playlist**: [`playlist::Playlist`] ordered media queue with anchored
//!   insertion
//! - **Uncloaking**: [`util::uncloak_ip`] pure helper for cloaked viewer IPs
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `syncbot-runtime`.

#![deny(unsafe_code)]

pub mod channel;
pub mod errors;
pub mod playlist;
pub mod user;
pub mod util;

pub use channel::Channel;
pub use errors::{Error, FetchError, Result, TransportError};
pub use playlist::{Anchor, Playlist, PlaylistItem};
pub use user::{User, UserMeta, UserPayload, UserProfile};
pub use util::uncloak_ip;
