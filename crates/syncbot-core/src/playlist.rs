//! Media playlist container.

use serde::Deserialize;
use serde_json::Value;

/// One queued media entry.
///
/// Only the fields the runtime acts on are typed; the rest of the server
/// payload (media descriptor, queueing user, duration) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaylistItem {
    /// Server-assigned unique id.
    pub uid: i64,
    /// Temporary entries are dropped after playback.
    #[serde(default)]
    pub temp: bool,
    /// Remaining payload fields, untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Insertion anchor for [`Playlist::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Insert at the head of the queue.
    Prepend,
    /// Insert directly after the entry with this uid.
    After(i64),
}

/// Ordered media queue plus playback position state.
#[derive(Debug, Clone)]
pub struct Playlist {
    items: Vec<PlaylistItem>,
    current_uid: Option<i64>,
    /// Whether playback is paused.
    pub paused: bool,
    /// Playback position within the current item, in seconds.
    pub current_time: f64,
    /// Total queue running time in seconds, as reported by the server.
    pub time: i64,
}

impl Default for Playlist {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_uid: None,
            paused: true,
            current_time: 0.0,
            time: 0,
        }
    }
}

impl Playlist {
    /// Create an empty playlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queued items in play order.
    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert an item relative to `anchor`.
    ///
    /// `None` appends; [`Anchor::Prepend`] inserts at the head;
    /// [`Anchor::After`] inserts behind the named uid, falling back to an
    /// append when that uid is no longer queued.
    pub fn insert(&mut self, anchor: Option<Anchor>, item: PlaylistItem) {
        match anchor {
            Some(Anchor::Prepend) => self.items.insert(0, item),
            Some(Anchor::After(uid)) => match self.items.iter().position(|i| i.uid == uid) {
                Some(pos) => self.items.insert(pos + 1, item),
                None => self.items.push(item),
            },
            None => self.items.push(item),
        }
    }

    /// Remove an item by uid.
    pub fn remove(&mut self, uid: i64) -> Option<PlaylistItem> {
        let pos = self.items.iter().position(|i| i.uid == uid)?;
        Some(self.items.remove(pos))
    }

    /// Look up an item by uid.
    pub fn get(&self, uid: i64) -> Option<&PlaylistItem> {
        self.items.iter().find(|i| i.uid == uid)
    }

    /// Look up an item by uid for in-place mutation.
    pub fn get_mut(&mut self, uid: i64) -> Option<&mut PlaylistItem> {
        self.items.iter_mut().find(|i| i.uid == uid)
    }

    /// Drop all queued items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the entire queue with `items`, preserving their order.
    pub fn replace(&mut self, items: Vec<PlaylistItem>) {
        self.items = items;
    }

    /// Mark the entry with `uid` as currently playing.
    pub fn set_current(&mut self, uid: i64) {
        self.current_uid = Some(uid);
    }

    /// The currently-playing entry, if it is still queued.
    pub fn current(&self) -> Option<&PlaylistItem> {
        self.get(self.current_uid?)
    }

    /// Uid of the currently-playing entry.
    pub fn current_uid(&self) -> Option<i64> {
        self.current_uid
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn item(uid: i64) -> PlaylistItem {
        PlaylistItem {
            uid,
            temp: false,
            extra: serde_json::Map::new(),
        }
    }

    fn uids(playlist: &Playlist) -> Vec<i64> {
        playlist.items().iter().map(|i| i.uid).collect()
    }

    #[test]
    fn new_playlist_starts_paused_and_empty() {
        let playlist = Playlist::new();
        assert!(playlist.is_empty());
        assert!(playlist.paused);
        assert_eq!(playlist.time, 0);
        assert!(playlist.current().is_none());
    }

    #[test]
    fn insert_none_appends() {
        let mut playlist = Playlist::new();
        playlist.insert(None, item(1));
        playlist.insert(None, item(2));
        assert_eq!(uids(&playlist), vec![1, 2]);
    }

    #[test]
    fn insert_prepend_goes_to_head() {
        let mut playlist = Playlist::new();
        playlist.insert(None, item(1));
        playlist.insert(Some(Anchor::Prepend), item(2));
        assert_eq!(uids(&playlist), vec![2, 1]);
    }

    #[test]
    fn insert_after_known_uid() {
        let mut playlist = Playlist::new();
        playlist.insert(None, item(1));
        playlist.insert(None, item(3));
        playlist.insert(Some(Anchor::After(1)), item(2));
        assert_eq!(uids(&playlist), vec![1, 2, 3]);
    }

    #[test]
    fn insert_after_unknown_uid_appends() {
        let mut playlist = Playlist::new();
        playlist.insert(None, item(1));
        playlist.insert(Some(Anchor::After(99)), item(2));
        assert_eq!(uids(&playlist), vec![1, 2]);
    }

    #[test]
    fn remove_by_uid() {
        let mut playlist = Playlist::new();
        playlist.insert(None, item(1));
        playlist.insert(None, item(2));
        assert_eq!(playlist.remove(1).map(|i| i.uid), Some(1));
        assert_eq!(uids(&playlist), vec![2]);
        assert!(playlist.remove(1).is_none());
    }

    #[test]
    fn current_resolves_through_queue() {
        let mut playlist = Playlist::new();
        playlist.insert(None, item(7));
        playlist.set_current(7);
        assert_eq!(playlist.current().map(|i| i.uid), Some(7));

        // Deleting the current entry leaves no resolvable current item.
        let _ = playlist.remove(7);
        assert!(playlist.current().is_none());
        assert_eq!(playlist.current_uid(), Some(7));
    }

    #[test]
    fn replace_swaps_contents() {
        let mut playlist = Playlist::new();
        playlist.insert(None, item(1));
        playlist.replace(vec![item(5), item(6)]);
        assert_eq!(uids(&playlist), vec![5, 6]);
    }

    #[test]
    fn item_deserializes_with_flattened_extras() {
        let item: PlaylistItem = serde_json::from_value(serde_json::json!({
            "uid": 42,
            "temp": true,
            "media": {"id": "abc123", "seconds": 212},
            "queueby": "moose"
        }))
        .unwrap();
        assert_eq!(item.uid, 42);
        assert!(item.temp);
        assert_eq!(item.extra["media"]["seconds"], 212);
        assert_eq!(item.extra["queueby"], "moose");
    }

    #[test]
    fn item_temp_defaults_to_false() {
        let item: PlaylistItem =
            serde_json::from_value(serde_json::json!({"uid": 1})).unwrap();
        assert!(!item.temp);
    }
}
