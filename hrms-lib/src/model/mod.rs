//! Typed models for the HRMS REST API.

mod attendance;
mod employee;
mod stats;

pub use attendance::*;
pub use employee::*;
pub use stats::*;
