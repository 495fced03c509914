//! ForkedFlavors recipe-sharing backend.
//!
//! Cookie-session authentication in front of a single-connection SQLite
//! user store.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod users;

pub use app::build_app;
pub use config::AppConfig;
pub use db::{Database, DbError};
pub use error::AppError;
pub use state::AppState;
