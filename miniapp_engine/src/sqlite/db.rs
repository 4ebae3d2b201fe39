use std::{fmt::Debug, time::Duration};

use log::info;
use sqlx::{pool::PoolOptions, Sqlite, SqlitePool};

use crate::{
    db_types::{TelegramUser, User},
    sqlite::users,
    traits::{AuthApiError, UserManagement},
};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connect to the database at `url`, bootstrapping the schema on a fresh file.
    ///
    /// Connections that cannot be acquired within the pool timeout surface as
    /// [`AuthApiError::Timeout`] so callers can retry with backoff instead of hanging.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, AuthApiError> {
        let pool = PoolOptions::<Sqlite>::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await?;
        users::create_schema(&pool).await?;
        info!("🗃️ Connected to database at {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl UserManagement for SqliteDatabase {
    async fn fetch_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::user_by_telegram_id(telegram_id, &mut conn).await
    }

    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::user_by_id(user_id, &mut conn).await
    }

    async fn insert_user(&self, claim: &TelegramUser) -> Result<User, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(claim, &mut conn).await
    }

    async fn update_user_profile(&self, user_id: i64, claim: &TelegramUser) -> Result<User, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::update_user_profile(user_id, claim, &mut conn).await
    }
}
