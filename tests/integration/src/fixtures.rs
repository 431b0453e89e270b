//! Test fixtures
//!
//! Known users with their bearer tokens, and one registered integration.

use chat_core::{Snowflake, UserProfile};

/// A user known to the identity service and the token verifier
#[derive(Debug, Clone, Copy)]
pub struct TestUser {
    pub id: Snowflake,
    pub username: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub token: &'static str,
}

impl TestUser {
    pub fn email(&self) -> String {
        format!("{}@example.test", self.username)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.to_string(),
            email: self.email(),
            first_name: self.first_name.to_string(),
            last_name: self.last_name.to_string(),
        }
    }

    /// The id in the string form used on the wire
    pub fn id_str(&self) -> String {
        self.id.to_string()
    }
}

pub const ALICE: TestUser = TestUser {
    id: Snowflake::new(1001),
    username: "alice",
    first_name: "Alice",
    last_name: "Liddell",
    token: "alice-token",
};

pub const BOB: TestUser = TestUser {
    id: Snowflake::new(1002),
    username: "bob",
    first_name: "Bob",
    last_name: "",
    token: "bob-token",
};

pub const CAROL: TestUser = TestUser {
    id: Snowflake::new(1003),
    username: "carol",
    first_name: "",
    last_name: "",
    token: "carol-token",
};

/// Registered with the verifier but not with the identity service
pub const GHOST: TestUser = TestUser {
    id: Snowflake::new(1999),
    username: "ghost",
    first_name: "",
    last_name: "",
    token: "ghost-token",
};

pub const USERS: [TestUser; 3] = [ALICE, BOB, CAROL];

/// Integration registered as "ci-bot"
pub const INTEGRATION: Snowflake = Snowflake::new(7001);

/// A token no verifier accepts
pub const BAD_TOKEN: &str = "not-a-real-token";
