//! Entity cache
//!
//! Holds the client's projection of remote state using `DashMap` for the
//! tables and one `RwLock` per entity, so packets for unrelated entities never
//! block each other.

use chat_common::CacheConfig;
use chat_core::{Channel, Guild, Message, Snowflake, User};
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

type Shared<T> = Arc<RwLock<T>>;

/// Result of removing a guild from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRemoval {
    /// The removed guild snapshot, if it was cached
    pub guild: Option<Guild>,
    /// Ids of the guild's channels that were dropped with it
    pub channel_ids: Vec<Snowflake>,
    /// Ids of cached messages in those channels
    pub message_ids: Vec<Snowflake>,
}

/// Result of removing a channel from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRemoval {
    /// The removed channel snapshot, if it was cached
    pub channel: Option<Channel>,
    /// Ids of cached messages that were dropped with it
    pub message_ids: Vec<Snowflake>,
}

/// In-memory entity cache
///
/// Packet handlers are the only writers. Reads return cloned snapshots taken
/// under the entity's read lock.
pub struct EntityCache {
    guilds: DashMap<Snowflake, Shared<Guild>>,
    channels: DashMap<Snowflake, Shared<Channel>>,
    messages: DashMap<Snowflake, Shared<Message>>,
    users: DashMap<Snowflake, Shared<User>>,

    /// Ids of cached messages in insertion order, for capacity eviction.
    /// Locked before any message table shard.
    message_order: Mutex<VecDeque<Snowflake>>,
    message_capacity: usize,

    /// The connected account, once known
    current_user: RwLock<Option<Snowflake>>,
}

impl EntityCache {
    /// Create a new cache
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_message_capacity(config.message_capacity)
    }

    /// Create a new cache with an explicit message capacity
    #[must_use]
    pub fn with_message_capacity(message_capacity: usize) -> Self {
        Self {
            guilds: DashMap::new(),
            channels: DashMap::new(),
            messages: DashMap::new(),
            users: DashMap::new(),
            message_order: Mutex::new(VecDeque::new()),
            message_capacity,
            current_user: RwLock::new(None),
        }
    }

    /// Create a new cache wrapped in Arc
    #[must_use]
    pub fn new_shared(config: &CacheConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    // === Current user ===

    /// Set the connected account
    pub fn set_current_user(&self, user_id: Snowflake) {
        *self.current_user.write() = Some(user_id);
    }

    /// Get the connected account, if known
    pub fn current_user_id(&self) -> Option<Snowflake> {
        *self.current_user.read()
    }

    /// Check if a user id is the connected account
    pub fn is_current_user(&self, user_id: Snowflake) -> bool {
        self.current_user_id() == Some(user_id)
    }

    // === Guilds ===

    /// Get a guild snapshot
    pub fn guild(&self, id: Snowflake) -> Option<Guild> {
        self.guilds.get(&id).map(|entry| entry.read().clone())
    }

    /// Insert or replace a guild
    pub fn insert_guild(&self, guild: Guild) {
        tracing::trace!(guild_id = %guild.id, "Guild cached");
        upsert(&self.guilds, guild.id, guild);
    }

    /// Mutate a cached guild in place
    pub fn update_guild<R>(&self, id: Snowflake, f: impl FnOnce(&mut Guild) -> R) -> Option<R> {
        update(&self.guilds, id, f)
    }

    /// Remove a guild together with its channels and their messages
    pub fn remove_guild(&self, id: Snowflake) -> GuildRemoval {
        let guild = self.guilds.remove(&id).map(|(_, entry)| entry.read().clone());

        let channel_ids: Vec<Snowflake> = self
            .channels
            .iter()
            .filter(|entry| entry.value().read().guild_id == Some(id))
            .map(|entry| *entry.key())
            .collect();

        let mut message_ids = Vec::new();
        for channel_id in &channel_ids {
            message_ids.extend(self.remove_channel(*channel_id).message_ids);
        }

        tracing::debug!(
            guild_id = %id,
            channels = channel_ids.len(),
            messages = message_ids.len(),
            "Guild removed from cache"
        );

        GuildRemoval {
            guild,
            channel_ids,
            message_ids,
        }
    }

    // === Channels ===

    /// Get a channel snapshot
    pub fn channel(&self, id: Snowflake) -> Option<Channel> {
        self.channels.get(&id).map(|entry| entry.read().clone())
    }

    /// Insert or replace a channel
    pub fn insert_channel(&self, channel: Channel) {
        tracing::trace!(channel_id = %channel.id, "Channel cached");
        upsert(&self.channels, channel.id, channel);
    }

    /// Remove a channel and any cached messages in it
    pub fn remove_channel(&self, id: Snowflake) -> ChannelRemoval {
        let channel = self.channels.remove(&id).map(|(_, entry)| entry.read().clone());

        let mut order = self.message_order.lock();
        let message_ids: Vec<Snowflake> = self
            .messages
            .iter()
            .filter(|entry| entry.value().read().channel_id == id)
            .map(|entry| *entry.key())
            .collect();

        for message_id in &message_ids {
            self.messages.remove(message_id);
        }
        if !message_ids.is_empty() {
            let removed: HashSet<Snowflake> = message_ids.iter().copied().collect();
            order.retain(|message_id| !removed.contains(message_id));
        }

        ChannelRemoval {
            channel,
            message_ids,
        }
    }

    // === Messages ===

    /// Get a cached message snapshot
    pub fn cached_message(&self, id: Snowflake) -> Option<Message> {
        self.messages.get(&id).map(|entry| entry.read().clone())
    }

    /// Check if a message is cached
    pub fn has_message(&self, id: Snowflake) -> bool {
        self.messages.contains_key(&id)
    }

    /// Insert or replace a message, evicting the oldest messages past capacity
    pub fn insert_message(&self, message: Message) {
        if self.message_capacity == 0 {
            return;
        }

        let id = message.id;
        let mut order = self.message_order.lock();
        if upsert(&self.messages, id, message) {
            order.push_back(id);
            self.evict_messages(&mut order);
        }
    }

    /// Mutate a cached message in place under its write lock
    ///
    /// Returns `None` without calling `f` when the message is not cached.
    pub fn update_message<R>(&self, id: Snowflake, f: impl FnOnce(&mut Message) -> R) -> Option<R> {
        update(&self.messages, id, f)
    }

    /// Remove a message
    pub fn remove_message(&self, id: Snowflake) -> Option<Message> {
        let mut order = self.message_order.lock();
        let (_, entry) = self.messages.remove(&id)?;
        if let Some(position) = order.iter().position(|message_id| *message_id == id) {
            order.remove(position);
        }
        let message = entry.read().clone();
        Some(message)
    }

    fn evict_messages(&self, order: &mut VecDeque<Snowflake>) {
        while self.messages.len() > self.message_capacity {
            let Some(oldest) = order.pop_front() else {
                break;
            };
            if self.messages.remove(&oldest).is_some() {
                tracing::trace!(message_id = %oldest, "Message evicted from cache");
            }
        }
    }

    // === Users ===

    /// Get a user snapshot
    pub fn user(&self, id: Snowflake) -> Option<User> {
        self.users.get(&id).map(|entry| entry.read().clone())
    }

    /// Insert or replace a user
    pub fn insert_user(&self, user: User) {
        upsert(&self.users, user.id, user);
    }

    // === Stats ===

    /// Number of cached guilds
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Number of cached channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of cached messages
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of cached users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl std::fmt::Debug for EntityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("guilds", &self.guild_count())
            .field("channels", &self.channel_count())
            .field("messages", &self.message_count())
            .field("users", &self.user_count())
            .field("message_capacity", &self.message_capacity)
            .finish()
    }
}

/// Replace the value behind an existing entry, or insert a new entry.
/// Returns true if the entry was newly inserted.
fn upsert<T>(table: &DashMap<Snowflake, Shared<T>>, id: Snowflake, value: T) -> bool {
    match table.entry(id) {
        Entry::Occupied(entry) => {
            *entry.get().write() = value;
            false
        }
        Entry::Vacant(entry) => {
            entry.insert(Arc::new(RwLock::new(value)));
            true
        }
    }
}

/// Run `f` under the entity's write lock without holding the table shard lock
fn update<T, R>(
    table: &DashMap<Snowflake, Shared<T>>,
    id: Snowflake,
    f: impl FnOnce(&mut T) -> R,
) -> Option<R> {
    let entry = table.get(&id).map(|entry| Arc::clone(entry.value()))?;
    let mut guard = entry.write();
    Some(f(&mut guard))
}
