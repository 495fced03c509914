use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,                 // surrogate key, never reassigned
    pub username: String,             // login identifier
    pub display_name: String,         // public-facing name
    pub bio: Option<String>,
    pub pfp_link: Option<String>,     // profile image URL
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 PHC string, not exposed in JSON
}
