//! Guild entity - represents a server

use crate::value_objects::Snowflake;

/// Guild (server) entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub icon: Option<String>,
    pub owner_id: Snowflake,
    /// Set while the guild is affected by an outage
    pub unavailable: bool,
}

impl Guild {
    /// Create a new Guild
    pub fn new(id: Snowflake, name: String, owner_id: Snowflake) -> Self {
        Self {
            id,
            name,
            icon: None,
            owner_id,
            unavailable: false,
        }
    }
}
