use crate::{
    db_types::{TelegramUser, User},
    traits::AuthApiError,
};

/// The `UserManagement` trait defines the storage contract for durable user records.
///
/// Backends only provide the primitives; the read-then-write choreography of an authentication
/// attempt (exactly one read, at most one write) lives in [`crate::AuthApi`] and must not be
/// duplicated here. None of these methods open multi-statement transactions: a concurrent
/// first-time sign-in race is allowed to surface as [`AuthApiError::DuplicateUser`] from
/// [`insert_user`](UserManagement::insert_user) and is resolved by the caller.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Fetches the account for the given Telegram id. If no account exists, `None` is returned.
    async fn fetch_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, AuthApiError>;

    /// Fetches the account with the given durable key. If no account exists, `None` is returned.
    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthApiError>;

    /// Creates a new account from the identity claim, returning the stored record.
    ///
    /// If an account for the claim's Telegram id already exists, the backend must return
    /// [`AuthApiError::DuplicateUser`] rather than overwrite anything.
    async fn insert_user(&self, claim: &TelegramUser) -> Result<User, AuthApiError>;

    /// Overwrites the display fields of the account with durable key `user_id` and refreshes its
    /// `updated_at` timestamp. Returns [`AuthApiError::UserNotFound`] if the row is missing.
    async fn update_user_profile(&self, user_id: i64, claim: &TelegramUser) -> Result<User, AuthApiError>;
}
