//! # API Shared
//!
//! Shared request/response types for the maternidad APIs.
//!
//! Contains:
//! - Wire DTOs for authentication, dashboards, and clinical records
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`; all types carry serde and utoipa derives so handlers
//! and the OpenAPI document stay in sync.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod records;

pub use health::{HealthRes, HealthService};
