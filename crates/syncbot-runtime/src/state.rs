//! Mutable state aggregate owned by one bot instance.

use syncbot_core::{Channel, User};

/// Everything the state mirror projects onto.
///
/// Exclusively owned by the bot; handlers receive it as an explicit
/// `&mut BotState`, so there is no hidden aliasing between the bot's own
/// user, the channel's user collection, and the playlist.
#[derive(Debug, Clone, Default)]
pub struct BotState {
    /// The bot's own user.
    pub user: User,
    /// The joined channel, which owns the user collection and the playlist.
    pub channel: Channel,
}

impl BotState {
    /// Assemble the aggregate.
    pub fn new(user: User, channel: Channel) -> Self {
        Self { user, channel }
    }
}
