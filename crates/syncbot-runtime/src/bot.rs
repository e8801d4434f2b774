//! Bot lifecycle: endpoint resolution, connection management, the login
//! handshake with guest-throttle backoff, the receive loop, and chat.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use metrics::counter;
use regex::Regex;
use serde_json::{Value, json};
use syncbot_core::{Channel, Error, Result, TransportError, User};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{SocketConfig, config_url, endpoint_url};
use crate::dispatch::{EventDispatcher, Handler};
use crate::http::Fetcher;
use crate::mirror::{MIRROR_TABLE, MirrorHandler};
use crate::state::BotState;
use crate::transport::{Transport, TransportSession, is_truthy};

/// Default bounded wait for emit acks.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(100);

/// Reconnect backoff when the session cannot supply a hint.
const RETRY_FALLBACK: Duration = Duration::from_secs(1);

/// Server-issued guest-login cooldown, e.g.
/// `guest logins are limited to 1 per 30 seconds.`
static GUEST_LOGIN_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)guest logins .* ([0-9]+) seconds\.").expect("static regex")
});

/// Construction parameters for a [`Bot`].
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Service domain, with or without scheme.
    pub domain: String,
    /// Channel to join.
    pub channel: String,
    /// Channel join password.
    pub channel_password: Option<String>,
    /// Login name; `None` runs an anonymous session.
    pub user_name: Option<String>,
    /// Login password.
    pub user_password: Option<String>,
    /// Bounded wait for emit acks.
    pub response_timeout: Duration,
    /// Whether transport failures in the run loop restart the login flow.
    pub restart_on_error: bool,
}

impl BotConfig {
    /// Config with defaults: no credentials, restart enabled, 100ms acks.
    pub fn new(domain: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            channel: channel.into(),
            channel_password: None,
            user_name: None,
            user_password: None,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            restart_on_error: true,
        }
    }

    /// Set login credentials.
    pub fn with_user(mut self, name: impl Into<String>, password: Option<String>) -> Self {
        self.user_name = Some(name.into());
        self.user_password = password;
        self
    }

    /// Set the channel join password.
    pub fn with_channel_password(mut self, password: impl Into<String>) -> Self {
        self.channel_password = Some(password.into());
        self
    }

    /// Set the ack wait window.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Enable or disable restart-on-error.
    pub fn with_restart_on_error(mut self, restart: bool) -> Self {
        self.restart_on_error = restart;
        self
    }
}

/// A connected client for one channel on a media-sync chat service.
///
/// All operations take `&mut self`, so one bot instance is a single
/// sequential flow of control: the receive loop and every
/// login/connect/emit call share it, and no two operations on the same bot
/// can overlap. Independent bot instances share nothing.
pub struct Bot {
    domain: String,
    response_timeout: Duration,
    restart_on_error: bool,
    state: BotState,
    server: Option<String>,
    session: Option<Box<dyn TransportSession>>,
    dispatcher: EventDispatcher,
    transport: Arc<dyn Transport>,
    fetcher: Arc<dyn Fetcher>,
}

impl Bot {
    /// Build a bot and register the state-mirror handler table.
    pub fn new(config: BotConfig, transport: Arc<dyn Transport>, fetcher: Arc<dyn Fetcher>) -> Self {
        let user = User::new(
            config.user_name.unwrap_or_default(),
            config.user_password,
        );
        let channel = Channel::new(config.channel, config.channel_password);
        let mut dispatcher = EventDispatcher::new();
        for (event, projection) in MIRROR_TABLE {
            dispatcher.on(event, Arc::new(MirrorHandler::new(*projection)));
        }
        Self {
            domain: config.domain,
            response_timeout: config.response_timeout,
            restart_on_error: config.restart_on_error,
            state: BotState::new(user, channel),
            server: None,
            session: None,
            dispatcher,
            transport,
            fetcher,
        }
    }

    /// The mirrored state aggregate.
    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Mutable access to the state aggregate.
    pub fn state_mut(&mut self) -> &mut BotState {
        &mut self.state
    }

    /// Cached transport endpoint, once resolved.
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Whether a transport session is open.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Register a handler for an inbound event.
    pub fn on(&mut self, event: &str, handler: Arc<dyn Handler>) {
        self.dispatcher.on(event, handler);
    }

    /// Remove a previously registered handler.
    pub fn off(&mut self, event: &str, handler: &Arc<dyn Handler>) {
        self.dispatcher.off(event, handler);
    }

    /// Dispatch one event through the handler registry.
    pub async fn trigger(&mut self, event: &str, data: &Value) -> Result<()> {
        self.dispatcher.trigger(&mut self.state, event, data).await
    }

    /// Resolve (and cache) the transport endpoint for this channel.
    async fn endpoint(&mut self) -> Result<String> {
        if let Some(server) = &self.server {
            return Ok(server.clone());
        }
        let url = config_url(&self.domain, &self.state.channel.name);
        info!(url, "fetching socket config");
        let body = self.fetcher.get(&url).await?;
        let config = SocketConfig::parse(&body)?;
        let server = config.select_server()?;
        info!(server, "resolved transport endpoint");
        let endpoint = endpoint_url(server);
        self.server = Some(endpoint.clone());
        Ok(endpoint)
    }

    /// Open a transport session, closing any existing one first.
    pub async fn connect(&mut self) -> Result<()> {
        self.disconnect().await?;
        let server = self.endpoint().await?;
        info!(server, "connecting");
        self.session = Some(self.transport.connect(&server).await?);
        Ok(())
    }

    /// Close the transport session.
    ///
    /// Idempotent. The handle is cleared and the rank reset even when the
    /// close itself fails; the failure is logged and re-raised.
    pub async fn disconnect(&mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        info!(server = self.server.as_deref(), "disconnecting");
        self.state.user.rank = -1;
        if let Err(e) = session.close().await {
            error!(error = %e, "transport close failed");
            return Err(e.into());
        }
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut Box<dyn TransportSession>> {
        self.session
            .as_mut()
            .ok_or(Error::Transport(TransportError::Closed))
    }

    /// Join the channel and authenticate.
    ///
    /// Guest logins hit a server-side cooldown; the hinted wait (floored at
    /// one second) is slept before retrying. Any other rejection is fatal.
    /// On success a synthetic `login` event runs through the dispatcher.
    pub async fn login(&mut self) -> Result<()> {
        self.connect().await?;

        info!(channel = %self.state.channel.name, "joining channel");
        let join = json!({
            "name": self.state.channel.name,
            "pw": self.state.channel.password,
        });
        let timeout = self.response_timeout;
        let ack = self
            .session_mut()?
            .emit_with_ack("joinChannel", join, "needPassword", timeout)
            .await?;
        if ack.as_ref().is_some_and(is_truthy) {
            return Err(Error::Login("invalid channel password".into()));
        }

        if self.state.user.name.is_empty() {
            warn!("no user name configured, continuing as anonymous session");
        } else {
            loop {
                info!(user = %self.state.user.name, "authenticating");
                let credentials = json!({
                    "name": self.state.user.name,
                    "pw": self.state.user.password,
                });
                let response = self.session_mut()?.request("login", credentials).await?;
                if response["success"].as_bool().unwrap_or(false) {
                    debug!(?response, "login accepted");
                    break;
                }
                let message = response["error"]
                    .as_str()
                    .unwrap_or("<no error message>")
                    .to_owned();
                error!(error = %message, "login rejected");
                let delay = guest_login_delay(&message)
                    .ok_or_else(|| Error::Login(message.clone()))?;
                warn!(seconds = delay, "guest login throttled, backing off");
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
        }

        let user = json!({"name": self.state.user.name});
        self.trigger("login", &user).await
    }

    /// Drive the receive loop until cancellation, a fatal error, or an
    /// unrecoverable transport failure.
    ///
    /// Disconnect cleanup runs on every exit path.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        let result = self.run_loop(&cancel).await;
        let cleanup = self.disconnect().await;
        result.and(cleanup)
    }

    async fn run_loop(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.login().await?;
        info!("run loop started");
        loop {
            let session = self
                .session
                .as_mut()
                .ok_or(Error::Transport(TransportError::Closed))?;
            let received = tokio::select! {
                () = cancel.cancelled() => {
                    info!("run loop cancelled");
                    return Ok(());
                }
                received = session.recv() => received,
            };
            match received {
                Ok((event, data)) => self.trigger(&event, &data).await?,
                Err(e) => {
                    error!(error = %e, "transport failure in receive loop");
                    if !self.restart_on_error {
                        warn!("restart disabled, stopping");
                        return Ok(());
                    }
                    counter!("bot_reconnects_total").increment(1);
                    let delay = self
                        .session
                        .as_ref()
                        .map_or(RETRY_FALLBACK, |s| s.retry_delay());
                    info!(?delay, "restarting after transport failure");
                    tokio::select! {
                        () = cancel.cancelled() => {
                            info!("run loop cancelled during backoff");
                            return Ok(());
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                    self.login().await?;
                }
            }
        }
    }

    /// Send a chat message, or a private message when `to` is given.
    ///
    /// Permission and mute checks fail fast without touching the network.
    /// A truthy flood-control ack is surfaced as a permission error carrying
    /// the server message.
    pub async fn chat_message(
        &mut self,
        msg: &str,
        to: Option<&str>,
        meta: Option<Value>,
    ) -> Result<()> {
        debug!(msg, to, "chat message");
        self.state.channel.check_permission("chat", &self.state.user)?;

        let mut payload = json!({
            "msg": msg,
            "meta": meta.unwrap_or_else(|| json!({})),
        });
        let event = if let Some(to) = to {
            payload["to"] = json!(to);
            "pm"
        } else if self.state.user.muted || self.state.user.smuted {
            return Err(Error::Permission("muted".into()));
        } else {
            "chatMsg"
        };

        let timeout = self.response_timeout;
        let ack = self
            .session_mut()?
            .emit_with_ack(event, payload, "noflood", timeout)
            .await?;
        if let Some(ack) = ack.filter(is_truthy) {
            error!(%ack, "chat message rejected by flood control");
            return Err(Error::Permission(
                ack["msg"].as_str().unwrap_or("noflood").to_owned(),
            ));
        }
        Ok(())
    }
}

/// Parse the wait-seconds hint out of a guest-throttle message, floored at
/// one second. `None` when the message does not match or the hint does not
/// parse as an integer.
fn guest_login_delay(message: &str) -> Option<u64> {
    let captures = GUEST_LOGIN_LIMIT.captures(message)?;
    let seconds: u64 = captures[1].parse().ok()?;
    Some(seconds.max(1))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
