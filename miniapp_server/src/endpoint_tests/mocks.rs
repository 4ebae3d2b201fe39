use miniapp_engine::{
    db_types::{TelegramUser, User},
    traits::{AuthApiError, UserManagement},
};
use mockall::mock;

mock! {
    pub UserDb {}
    impl UserManagement for UserDb {
        async fn fetch_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, AuthApiError>;
        async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthApiError>;
        async fn insert_user(&self, claim: &TelegramUser) -> Result<User, AuthApiError>;
        async fn update_user_profile(&self, user_id: i64, claim: &TelegramUser) -> Result<User, AuthApiError>;
    }
}
