//! # Mini App Auth Server
//!
//! HTTP front end for authenticating Telegram Mini App users. It is responsible for:
//! * Exchanging signed launch data (`init_data`) for a bearer access token (`POST /auth/telegram`).
//! * Guarding protected routes with that token and exposing the caller's account
//!   (`GET /api/profile`, `GET /api/check_token`).
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;
