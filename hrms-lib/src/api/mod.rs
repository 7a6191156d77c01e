//! API endpoints
//!
//! Each submodule adds one resource's operations to
//! [`HrmsClient`](crate::HrmsClient). Paths are relative to the client's
//! base URL and keep the server's trailing slashes.

mod attendance;
mod employees;
mod request;

pub use attendance::validate_attendance_date;
