//! API request handlers.
//!
//! This module contains all HTTP request handlers, organized by domain:
//! - `users`: User account CRUD
//! - `auth`: Login, refresh, logout, who-am-I
//! - `misc`: Health check

mod auth;
mod misc;
mod users;

// Re-export all public handlers

pub use users::{UserResponse, create_user, delete_user, get_user, list_users, update_user};

pub use auth::{login, logout, me, refresh};

pub use misc::health;
