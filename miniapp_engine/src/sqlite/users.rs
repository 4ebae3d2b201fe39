//! Sqlite operations on the users table.
//!
//! Clients should never call these directly; use the [`UserManagement`](crate::UserManagement)
//! implementation on [`SqliteDatabase`](crate::SqliteDatabase) instead.

use chrono::Utc;
use log::trace;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    db_types::{TelegramUser, User},
    traits::AuthApiError,
};

const USER_COLUMNS: &str = "id, telegram_id, username, first_name, last_name, created_at, updated_at";

/// Create the users table if this is a fresh database.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), AuthApiError> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            telegram_id INTEGER NOT NULL UNIQUE,
            username    TEXT,
            first_name  TEXT,
            last_name   TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn user_by_telegram_id(
    telegram_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, AuthApiError> {
    trace!("🗃️ Fetching user account for Telegram id [{telegram_id}]");
    let q = format!("SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?");
    let user = sqlx::query_as::<_, User>(&q).bind(telegram_id).fetch_optional(&mut *conn).await?;
    Ok(user)
}

pub async fn user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, AuthApiError> {
    let q = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&q).bind(user_id).fetch_optional(&mut *conn).await?;
    Ok(user)
}

pub async fn insert_user(claim: &TelegramUser, conn: &mut SqliteConnection) -> Result<User, AuthApiError> {
    let now = Utc::now();
    let q = format!(
        "INSERT INTO users (telegram_id, username, first_name, last_name, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
    );
    let user = sqlx::query_as::<_, User>(&q)
        .bind(claim.id)
        .bind(&claim.username)
        .bind(&claim.first_name)
        .bind(&claim.last_name)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
    trace!("🗃️ User account {} saved for Telegram id [{}]", user.id, claim.id);
    Ok(user)
}

pub async fn update_user_profile(
    user_id: i64,
    claim: &TelegramUser,
    conn: &mut SqliteConnection,
) -> Result<User, AuthApiError> {
    let q = format!(
        "UPDATE users SET username = ?, first_name = ?, last_name = ?, updated_at = ? \
         WHERE id = ? RETURNING {USER_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, User>(&q)
        .bind(&claim.username)
        .bind(&claim.first_name)
        .bind(&claim.last_name)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    updated.ok_or(AuthApiError::UserNotFound)
}
