//! Message entity - a cached chat message and its reactions

use chrono::{DateTime, Utc};

use super::{MessageAuthor, Reaction};
use crate::value_objects::{Emoji, Snowflake};

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author: MessageAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    reactions: Vec<Reaction>,
}

impl Message {
    /// Create a new Message
    pub fn new(id: Snowflake, channel_id: Snowflake, author: MessageAuthor, content: String) -> Self {
        Self {
            id,
            channel_id,
            author,
            content,
            created_at: id.created_at(),
            edited_at: None,
            reactions: Vec::new(),
        }
    }

    /// Attach initial reactions (as reported alongside the message)
    #[must_use]
    pub fn with_reactions(mut self, reactions: Vec<Reaction>) -> Self {
        self.reactions = reactions.into_iter().filter(|r| !r.is_empty()).collect();
        self
    }

    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Edit the message content
    pub fn edit(&mut self, content: String, edited_at: DateTime<Utc>) {
        self.content = content;
        self.edited_at = Some(edited_at);
    }

    /// Get a truncated preview of the message (for notifications)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }

    /// Reactions in the order they first appeared
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Find the reaction for an emoji
    pub fn reaction(&self, emoji: &Emoji) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.emoji() == emoji)
    }

    /// Record a user's reaction, creating the record if needed
    pub fn add_reaction(&mut self, emoji: &Emoji, user_id: Snowflake, is_current_user: bool) {
        let index = match self.reactions.iter().position(|r| r.emoji() == emoji) {
            Some(index) => index,
            None => {
                self.reactions.push(Reaction::new(emoji.clone()));
                self.reactions.len() - 1
            }
        };
        self.reactions[index].add_user(user_id, is_current_user);
    }

    /// Remove a user's reaction, dropping the record once its count hits zero
    pub fn remove_reaction(&mut self, emoji: &Emoji, user_id: Snowflake, is_current_user: bool) {
        if let Some(index) = self.reactions.iter().position(|r| r.emoji() == emoji) {
            let reaction = &mut self.reactions[index];
            reaction.remove_user(user_id, is_current_user);
            if reaction.is_empty() {
                self.reactions.remove(index);
            }
        }
    }

    /// Remove every reaction for one emoji
    pub fn remove_reactions_by_emoji(&mut self, emoji: &Emoji) {
        self.reactions.retain(|r| r.emoji() != emoji);
    }

    /// Remove all reactions
    pub fn remove_all_reactions(&mut self) {
        self.reactions.clear();
    }
}
