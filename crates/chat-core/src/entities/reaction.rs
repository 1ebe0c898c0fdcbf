//! Reaction entity - one emoji's reactions on a message
//!
//! The gateway only reports aggregated counts when a message is first seen, so
//! the set of known reacting users can be smaller than the count. Every
//! mutation keeps `count >= users.len()`.

use std::collections::HashSet;

use crate::value_objects::{Emoji, Snowflake};

/// Reaction record (emoji identity -> reacting users + count)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    emoji: Emoji,
    count: u32,
    users: HashSet<Snowflake>,
    me: bool,
}

impl Reaction {
    /// Create an empty reaction for an emoji
    pub fn new(emoji: Emoji) -> Self {
        Self {
            emoji,
            count: 0,
            users: HashSet::new(),
            me: false,
        }
    }

    /// Create a reaction from an aggregated count whose users are unknown
    pub fn with_count(emoji: Emoji, count: u32, me: bool) -> Self {
        Self {
            emoji,
            count: count.max(u32::from(me)),
            users: HashSet::new(),
            me,
        }
    }

    /// Get the emoji
    #[inline]
    pub fn emoji(&self) -> &Emoji {
        &self.emoji
    }

    /// Get the total reaction count
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether the current user reacted with this emoji
    #[inline]
    pub fn me(&self) -> bool {
        self.me
    }

    /// Users known to have reacted
    pub fn users(&self) -> impl Iterator<Item = Snowflake> + '_ {
        self.users.iter().copied()
    }

    /// Check whether a user is known to have reacted
    pub fn contains_user(&self, user_id: Snowflake) -> bool {
        self.users.contains(&user_id)
    }

    /// Check if the reaction has no remaining count
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Record a user's reaction. Returns false if it was already known.
    pub fn add_user(&mut self, user_id: Snowflake, is_current_user: bool) -> bool {
        if !self.users.insert(user_id) {
            return false;
        }
        self.count += 1;
        if is_current_user {
            self.me = true;
        }
        true
    }

    /// Remove a user's reaction
    ///
    /// A user missing from the known set still decrements the count when the
    /// count includes reactors whose ids were never reported.
    pub fn remove_user(&mut self, user_id: Snowflake, is_current_user: bool) -> bool {
        let known = self.users.remove(&user_id);
        let unknown_reactors = self.count as usize > self.users.len();
        let removed = known || unknown_reactors;
        if removed {
            self.count -= 1;
        }
        if is_current_user {
            self.me = false;
        }
        removed
    }
}
