//! # API Shared
//!
//! Shared record and wire definitions for the cardio risk APIs.
//!
//! Contains:
//! - Record and request/response types (`models` module), serialisable and OpenAPI-described
//! - Shared services like `HealthService`
//! - Bearer token parsing (usable by the REST layer and any future transport)
//!
//! Used by `cardio-core` and `api-rest` for common functionality.

pub mod auth;
pub mod health;
pub mod models;

pub use health::HealthService;
pub use models::*;
