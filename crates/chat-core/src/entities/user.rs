//! User entity - a cached user account

use crate::value_objects::Snowflake;

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
    pub bot: bool,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, username: String) -> Self {
        Self {
            id,
            username,
            discriminator: None,
            avatar: None,
            bot: false,
        }
    }

}
