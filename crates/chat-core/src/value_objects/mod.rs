//! Value objects - immutable types that represent domain concepts

mod emoji;
mod snowflake;

pub use emoji::Emoji;
pub use snowflake::{Snowflake, SnowflakeParseError};
