//! # syncbot-runtime
//!
//! The bot runtime: connection lifecycle, login handshake, event dispatch,
//! and state mirroring for a persistent-connection media-sync chat client.
//!
//! - **Bot**: [`bot::Bot`] owns the state aggregate and drives connect →
//!   login → receive-loop, with transparent reconnect on transport failure
//! - **Dispatcher**: [`dispatch::EventDispatcher`] per-event ordered handler
//!   registry with short-circuiting invocation
//! - **Mirror**: [`mirror`] fixed table of internal handlers projecting
//!   inbound events onto the owned channel/playlist/user state
//! - **Config**: [`config::SocketConfig`] endpoint resolution with
//!   secure-server preference
//! - **Collaborators**: [`transport::Transport`]/[`transport::TransportSession`]
//!   and [`http::Fetcher`] trait seams; the transport's wire framing is not
//!   implemented here
//!
//! ## Crate Position
//!
//! Aggregation layer. Depends on: syncbot-core.

#![deny(unsafe_code)]

pub mod bot;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod mirror;
pub mod state;
pub mod transport;

pub use bot::{Bot, BotConfig};
pub use config::SocketConfig;
pub use dispatch::{Control, EventDispatcher, Handler, handler_fn};
pub use http::{Fetcher, HttpFetcher};
pub use state::BotState;
pub use transport::{Transport, TransportSession, is_truthy};
