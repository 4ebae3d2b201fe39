use miniapp_engine::db_types::User;
use serde::{Deserialize, Serialize};

/// Body of `POST /auth/telegram`: the raw launch-data string, exactly as Telegram handed it to
/// the Mini App.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    pub init_data: String,
}

/// Successful authentication response: a bearer token and the resolved account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
