//! Emoji identity used by reactions
//!
//! The gateway sends emoji as `{ "id": <snowflake|null>, "name": <string|null>, "animated": <bool> }`.
//! A null id means a unicode emoji identified by its name; otherwise the id is
//! the identity and the name is only a display hint (it may be null for
//! custom emoji that were deleted from their guild).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// A unicode or custom emoji
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawEmoji", into = "RawEmoji")]
pub enum Emoji {
    /// Standard unicode emoji, e.g. "👍"
    Unicode(String),
    /// Guild custom emoji
    Custom {
        id: Snowflake,
        name: Option<String>,
        animated: bool,
    },
}

impl Emoji {
    /// Create a unicode emoji
    pub fn unicode(name: impl Into<String>) -> Self {
        Self::Unicode(name.into())
    }

    /// Create a custom emoji
    pub fn custom(id: Snowflake, name: Option<String>, animated: bool) -> Self {
        Self::Custom { id, name, animated }
    }

    /// Check if this is a unicode emoji
    #[inline]
    pub fn is_unicode(&self) -> bool {
        matches!(self, Self::Unicode(_))
    }

    /// Get the custom emoji id, if any
    #[inline]
    pub fn custom_id(&self) -> Option<Snowflake> {
        match self {
            Self::Unicode(_) => None,
            Self::Custom { id, .. } => Some(*id),
        }
    }

    /// Get the display name (the unicode character, or the custom emoji name)
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Unicode(name) => Some(name),
            Self::Custom { name, .. } => name.as_deref(),
        }
    }
}

// Identity: unicode emoji by character, custom emoji by id only
impl PartialEq for Emoji {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unicode(a), Self::Unicode(b)) => a == b,
            (Self::Custom { id: a, .. }, Self::Custom { id: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Emoji {}

impl Hash for Emoji {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Unicode(name) => {
                0u8.hash(state);
                name.hash(state);
            }
            Self::Custom { id, .. } => {
                1u8.hash(state);
                id.hash(state);
            }
        }
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(name) => write!(f, "{name}"),
            Self::Custom { id, name, animated } => {
                let prefix = if *animated { "a" } else { "" };
                write!(f, "<{prefix}:{}:{id}>", name.as_deref().unwrap_or("_"))
            }
        }
    }
}

/// Wire shape of an emoji object
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEmoji {
    #[serde(default)]
    id: Option<Snowflake>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    animated: bool,
}

impl TryFrom<RawEmoji> for Emoji {
    type Error = DomainError;

    fn try_from(raw: RawEmoji) -> Result<Self, Self::Error> {
        match (raw.id, raw.name) {
            (Some(id), name) => Ok(Self::Custom {
                id,
                name,
                animated: raw.animated,
            }),
            (None, Some(name)) if !name.is_empty() => Ok(Self::Unicode(name)),
            (None, _) => Err(DomainError::InvalidEmoji("unicode emoji without a name")),
        }
    }
}

impl From<Emoji> for RawEmoji {
    fn from(emoji: Emoji) -> Self {
        match emoji {
            Emoji::Unicode(name) => Self {
                id: None,
                name: Some(name),
                animated: false,
            },
            Emoji::Custom { id, name, animated } => Self {
                id: Some(id),
                name,
                animated,
            },
        }
    }
}
