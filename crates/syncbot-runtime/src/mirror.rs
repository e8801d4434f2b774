//! Fixed table of internal handlers projecting inbound events onto the
//! bot-owned state aggregate.
//!
//! One projection per supported inbound event, registered once at bot
//! construction. Each is a pure state projection with explicit merge
//! semantics; none of them short-circuits, so user handlers registered for
//! the same events always run afterwards.

use async_trait::async_trait;
use serde_json::Value;
use syncbot_core::{Anchor, Error, PlaylistItem, Result, User, UserMeta, UserPayload};
use tracing::{debug, error, info, warn};

use crate::dispatch::{Control, Handler};
use crate::state::BotState;
use crate::transport::is_truthy;

/// Internal projection applied for one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Overwrite the bot user's rank.
    Rank,
    /// Overwrite the channel motd.
    Motd,
    /// Overwrite channel css/js.
    CssJs,
    /// Overwrite the channel options document.
    Options,
    /// Overwrite the channel permission table.
    Permissions,
    /// Overwrite the emote list.
    Emotes,
    /// Overwrite the drink counter.
    DrinkCount,
    /// Overwrite the connected-user count.
    UserCount,
    /// Replace the user collection.
    UserList,
    /// Upsert a single user.
    AddUser,
    /// Remove a user by name.
    UserLeave,
    /// Merge meta fields onto the named user.
    UserMeta,
    /// Overwrite the playlist's raw running time.
    PlaylistMeta,
    /// Overwrite the paused flag and playback position.
    MediaUpdate,
    /// Mark the currently-playing entry.
    SetCurrent,
    /// Insert a playlist entry after an anchor.
    Queue,
    /// Remove a playlist entry by uid.
    Delete,
    /// Set the temporary flag on a playlist entry.
    SetTemp,
    /// Replace the entire playlist.
    Playlist,
    /// Channel password became invalid mid-session. Fatal.
    NeedPassword,
    /// Forcible session termination. Fatal.
    Kick,
    /// Flood-control notice arriving outside an ack wait.
    NoFlood,
}

/// Event name → projection. Built once; registration order is table order.
pub const MIRROR_TABLE: &[(&str, Projection)] = &[
    ("rank", Projection::Rank),
    ("setMotd", Projection::Motd),
    ("channelCSSJS", Projection::CssJs),
    ("channelOpts", Projection::Options),
    ("setPermissions", Projection::Permissions),
    ("emoteList", Projection::Emotes),
    ("drinkCount", Projection::DrinkCount),
    ("usercount", Projection::UserCount),
    ("userlist", Projection::UserList),
    ("addUser", Projection::AddUser),
    ("userLeave", Projection::UserLeave),
    ("setUserMeta", Projection::UserMeta),
    ("setPlaylistMeta", Projection::PlaylistMeta),
    ("mediaUpdate", Projection::MediaUpdate),
    ("setCurrent", Projection::SetCurrent),
    ("queue", Projection::Queue),
    ("delete", Projection::Delete),
    ("setTemp", Projection::SetTemp),
    ("playlist", Projection::Playlist),
    ("needPassword", Projection::NeedPassword),
    ("kick", Projection::Kick),
    ("noflood", Projection::NoFlood),
];

/// Handler adapter binding one [`Projection`] into the dispatcher.
pub struct MirrorHandler {
    projection: Projection,
}

impl MirrorHandler {
    /// Bind a projection.
    pub fn new(projection: Projection) -> Self {
        Self { projection }
    }
}

#[async_trait]
impl Handler for MirrorHandler {
    async fn handle(&self, state: &mut BotState, _event: &str, data: &Value) -> Result<Control> {
        apply(self.projection, state, data)?;
        Ok(Control::Continue)
    }
}

/// Apply one projection to the state aggregate.
pub fn apply(projection: Projection, state: &mut BotState, data: &Value) -> Result<()> {
    match projection {
        Projection::Rank => {
            state.user.rank = data
                .as_i64()
                .ok_or_else(|| invalid("rank: expected integer"))?;
        }
        Projection::Motd => {
            state.channel.motd = data.as_str().unwrap_or_default().to_owned();
        }
        Projection::CssJs => {
            state.channel.css = data["css"].as_str().unwrap_or_default().to_owned();
            state.channel.js = data["js"].as_str().unwrap_or_default().to_owned();
        }
        Projection::Options => state.channel.options = data.clone(),
        Projection::Permissions => state.channel.permissions = data.clone(),
        Projection::Emotes => state.channel.emotes = data.clone(),
        Projection::DrinkCount => state.channel.drink_count = data.as_i64().unwrap_or(0),
        Projection::UserCount => state.channel.user_count = data.as_u64().unwrap_or(0),
        Projection::UserList => {
            let entries = data
                .as_array()
                .ok_or_else(|| invalid("userlist: expected array"))?;
            state.channel.clear_users();
            for entry in entries {
                upsert_user(state, entry)?;
            }
            info!(users = state.channel.users().len(), "userlist replaced");
        }
        Projection::AddUser => {
            upsert_user(state, data)?;
            debug!(users = state.channel.users().len(), "user added");
        }
        Projection::UserLeave => {
            let name = required_str(data, "name")?;
            if state.channel.remove_user(name).is_none() {
                error!(name, "userLeave: user not found");
            }
        }
        Projection::UserMeta => {
            let name = required_str(data, "name")?;
            let meta: UserMeta = serde_json::from_value(data["meta"].clone())
                .map_err(|e| invalid(&format!("setUserMeta: {e}")))?;
            if state.user.name == name {
                state.user.set_meta(&meta);
            }
            if !state.channel.set_user_meta(name, &meta) {
                warn!(name, "setUserMeta: user not found");
            }
        }
        Projection::PlaylistMeta => {
            state.channel.playlist.time = data["rawTime"].as_i64().unwrap_or(0);
        }
        Projection::MediaUpdate => {
            state.channel.playlist.paused = data["paused"].as_bool().unwrap_or(true);
            state.channel.playlist.current_time = data["currentTime"].as_f64().unwrap_or(0.0);
        }
        Projection::SetCurrent => {
            let uid = data
                .as_i64()
                .ok_or_else(|| invalid("setCurrent: expected uid"))?;
            state.channel.playlist.set_current(uid);
            info!(uid, "current media changed");
        }
        Projection::Queue => {
            let item = parse_item(&data["item"])?;
            state.channel.playlist.insert(parse_anchor(&data["after"]), item);
            debug!(queued = state.channel.playlist.len(), "playlist item queued");
        }
        Projection::Delete => {
            let uid = required_uid(data)?;
            if state.channel.playlist.remove(uid).is_none() {
                error!(uid, "delete: playlist item not found");
            }
        }
        Projection::SetTemp => {
            let uid = required_uid(data)?;
            let temp = data["temp"].as_bool().unwrap_or(false);
            match state.channel.playlist.get_mut(uid) {
                Some(item) => item.temp = temp,
                None => error!(uid, "setTemp: playlist item not found"),
            }
        }
        Projection::Playlist => {
            let items = data
                .as_array()
                .ok_or_else(|| invalid("playlist: expected array"))?
                .iter()
                .map(parse_item)
                .collect::<Result<Vec<_>>>()?;
            info!(items = items.len(), "playlist replaced");
            state.channel.playlist.replace(items);
        }
        Projection::NeedPassword => {
            if is_truthy(data) {
                return Err(Error::Login("invalid channel password".into()));
            }
        }
        Projection::Kick => return Err(Error::Kicked(kick_reason(data))),
        Projection::NoFlood => error!(%data, "noflood"),
    }
    Ok(())
}

/// Merge one user entry: the bot's own user is updated in place and synced
/// into the channel collection; everyone else is upserted directly.
fn upsert_user(state: &mut BotState, entry: &Value) -> Result<()> {
    let payload: UserPayload = serde_json::from_value(entry.clone())
        .map_err(|e| invalid(&format!("user entry: {e}")))?;
    if !state.user.name.is_empty() && payload.name == state.user.name {
        state.user.apply(&payload);
        let own = state.user.clone();
        state.channel.add_user(own);
    } else {
        state.channel.add_user(User::from_payload(&payload));
    }
    Ok(())
}

fn parse_item(value: &Value) -> Result<PlaylistItem> {
    serde_json::from_value(value.clone()).map_err(|e| invalid(&format!("playlist item: {e}")))
}

/// `after` is a uid, the literal `"prepend"`, or absent (append).
fn parse_anchor(value: &Value) -> Option<Anchor> {
    match value {
        Value::String(s) if s == "prepend" => Some(Anchor::Prepend),
        Value::Number(n) => n.as_i64().map(Anchor::After),
        _ => None,
    }
}

fn kick_reason(data: &Value) -> String {
    if let Some(reason) = data.as_str() {
        return reason.to_owned();
    }
    match data["reason"].as_str() {
        Some(reason) => reason.to_owned(),
        None => data.to_string(),
    }
}

fn required_str<'a>(data: &'a Value, key: &str) -> Result<&'a str> {
    data[key]
        .as_str()
        .ok_or_else(|| invalid(&format!("missing field: {key}")))
}

fn required_uid(data: &Value) -> Result<i64> {
    data["uid"]
        .as_i64()
        .ok_or_else(|| invalid("missing field: uid"))
}

fn invalid(message: &str) -> Error {
    Error::InvalidPayload(message.to_owned())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
