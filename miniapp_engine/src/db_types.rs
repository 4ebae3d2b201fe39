use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

//--------------------------------------        User        -----------------------------------------------------------

/// The durable account record for a Mini App user.
///
/// `id` is the service-internal durable key; `telegram_id` is the platform-assigned identifier
/// (stable, unique, never reused). The display fields track the most recently observed claim and
/// are overwritten when a returning user's launch data diverges from the stored values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// True when the stored display fields already match the claim, i.e. no update is needed.
    pub fn profile_matches(&self, claim: &TelegramUser) -> bool {
        self.username == claim.username
            && self.first_name == claim.first_name
            && self.last_name == claim.last_name
    }
}

//--------------------------------------     TelegramUser     ---------------------------------------------------------

/// The identity claim embedded in the `user` field of Telegram launch data.
///
/// Only `id` is mandatory on the wire. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allows_write_to_pm: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}
