//! REST API
//!
//! ```text
//! /health                     GET   liveness and database check
//! /api/v1/register            POST  create an account
//! /api/v1/login               POST  exchange credentials for a token
//! /api/v1/calculate           POST  evaluate and record (bearer token)
//! /api/v1/calculations        GET   caller's history (bearer token)
//! /api/v1/admin/log-level     GET/PUT runtime log filter (api.enable_admin only)
//! ```

pub mod dto;
pub mod handlers;
