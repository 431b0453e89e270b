//! Value objects - immutable types that represent domain concepts

mod message_content;
mod snowflake;

pub use message_content::MessageContent;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
