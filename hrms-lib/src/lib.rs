//! HRMS API client library
//!
//! An async client for the HRMS Lite REST API: employees, daily attendance
//! and the statistics endpoints behind the admin dashboard.

pub mod api;
pub mod error;
pub mod model;
pub mod retry;

mod client;

pub use client::*;
pub use error::{ApiError, Error, ErrorDetail};
