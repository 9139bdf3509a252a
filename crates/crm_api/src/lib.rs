//! Operation surface of the CRM core for the presentation layer.

pub mod api;

pub use api::{core_version, init_logging, ping, ApiResponse, CrmApi, DB_PATH_ENV};
