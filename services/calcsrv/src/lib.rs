//! Tally calculation service (`calcsrv`)
//!
//! HTTP front end for the evaluator and ledger: users register, log in for
//! an HS256 bearer token, submit expressions, and read back their own
//! calculation history. Everything persists to a single SQLite database.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;

pub use app_state::AppState;
pub use config::CalcsrvConfig;
pub use error::{CalcsrvError, Result};
pub use routes::create_routes;
