//! # Storage contracts
//!
//! This module defines the interface contract between the authentication flow and the storage
//! *backends* that hold durable user records.
//!
//! The [`UserManagement`] trait is deliberately small: one lookup per key, one insert, one
//! display-field update. Dynamic queries, pagination and the rest of the CRUD surface live with
//! the resource handlers, not here.
mod errors;
mod user_management;

pub use errors::AuthApiError;
pub use user_management::UserManagement;
