use std::fmt::Debug;

use log::{debug, warn};

use crate::{
    db_types::{TelegramUser, User},
    traits::{AuthApiError, UserManagement},
};

/// Resolves a verified identity claim to a durable user account.
///
/// This is the `Verified -> Resolved` step of the authentication flow. The signature on the
/// launch data MUST have been checked before calling [`get_or_create_user`]; this API trusts the
/// claim it is given.
pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    /// Fetch-or-create the account for the claim's Telegram id.
    ///
    /// The nominal path is a single read followed by at most one write: an insert for a
    /// first-time user, or a display-field update when the stored record has diverged from the
    /// claim. Never both in one attempt.
    ///
    /// Two concurrent first-time sign-ins for the same Telegram id race on the insert; the loser
    /// re-reads the winner's row once and returns it. Only if that re-read also comes up empty
    /// does the attempt surface [`AuthApiError::DuplicateUser`] so the caller can retry.
    pub async fn get_or_create_user(&self, claim: &TelegramUser) -> Result<User, AuthApiError> {
        match self.db.fetch_user_by_telegram_id(claim.id).await? {
            Some(user) if user.profile_matches(claim) => Ok(user),
            Some(user) => {
                debug!("🗃️ Profile for Telegram id {} has changed. Updating record {}", claim.id, user.id);
                self.db.update_user_profile(user.id, claim).await
            },
            None => match self.db.insert_user(claim).await {
                Ok(user) => {
                    debug!("🗃️ Created account {} for Telegram id {}", user.id, claim.id);
                    Ok(user)
                },
                Err(AuthApiError::DuplicateUser) => {
                    warn!("🗃️ Lost an insert race for Telegram id {}. Using the existing record.", claim.id);
                    self.db
                        .fetch_user_by_telegram_id(claim.id)
                        .await?
                        .ok_or(AuthApiError::DuplicateUser)
                },
                Err(e) => Err(e),
            },
        }
    }

    /// Fetch the account with the given durable key.
    pub async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, AuthApiError> {
        self.db.fetch_user_by_id(user_id).await
    }
}
