use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Attendance status for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }

    /// The other status.
    pub fn toggled(self) -> Self {
        match self {
            Self::Present => Self::Absent,
            Self::Absent => Self::Present,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(Self::Present),
            "Absent" => Ok(Self::Absent),
            other => Err(format!("unknown attendance status: {other}")),
        }
    }
}

/// An attendance record with the employee fields the list view needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: u64,
    /// Primary key of the employee.
    pub employee: u64,
    pub employee_name: String,
    pub employee_emp_id: String,
    pub employee_department: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Payload for `POST attendance/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAttendance {
    pub employee: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Query filter shared by the list and statistics endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    /// Primary key of the employee.
    pub employee_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AttendanceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn employee(mut self, id: u64) -> Self {
        self.employee_id = Some(id);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Only the set fields, as query parameters.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.employee_id {
            pairs.push(("employee_id", id.to_string()));
        }
        if let Some(date) = self.start_date {
            pairs.push(("start_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            pairs.push(("end_date", date.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

#[derive(Serialize)]
pub(crate) struct StatusPatch {
    pub status: AttendanceStatus,
}
