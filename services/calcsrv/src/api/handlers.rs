pub mod admin;
pub mod auth_handlers;
pub mod calculation_handlers;
pub mod health;

pub use auth_handlers::{login, register};
pub use calculation_handlers::{calculate, list_calculations};
pub use health::health_check;
