//! # Mini App Auth Engine
//!
//! Core logic for authenticating Telegram Mini App users. The crate is split into two parts:
//! 1. Launch-data handling ([`mod@helpers`]). Parsing the signed `init_data` payload that Telegram
//!    hands to a Mini App at startup, and verifying its HMAC signature against the bot token.
//!    This part is pure CPU work and touches no I/O.
//! 2. Identity storage ([`mod@traits`] and the SQLite backend). The [`UserManagement`] trait
//!    defines the contract a storage backend must fulfil; [`AuthApi`] composes it into the
//!    get-or-create resolution step of the authentication flow. You should never need to access
//!    the database directly - go through [`AuthApi`].
mod api;
pub mod db_types;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use api::AuthApi;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{AuthApiError, UserManagement};
