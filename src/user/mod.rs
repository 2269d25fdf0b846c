//! User account module.
//!
//! Provides the user data model, the persistence layer, and the account
//! service that orchestrates CRUD and uniqueness semantics on top of it.

mod error;
mod models;
mod repository;
mod service;

pub use error::UserError;
pub use models::{NewUser, User, UserPatch};
pub use repository::UserRepository;
pub use service::{AccountService, MAX_PAGE_SIZE};

pub(crate) use service::verify_password;
