use serde::{Deserialize, Serialize};

/// Per-employee breakdown from `GET attendance/statistics/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeStatistics {
    #[serde(rename = "employee__id")]
    pub employee_pk: u64,
    #[serde(rename = "employee__full_name")]
    pub full_name: String,
    #[serde(rename = "employee__employee_id")]
    pub employee_id: String,
    #[serde(rename = "employee__department")]
    pub department: String,
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
}

impl EmployeeStatistics {
    /// Present days as a percentage of recorded days.
    pub fn attendance_rate(&self) -> Option<f64> {
        (self.total_days > 0).then(|| f64::from(self.present_days) * 100.0 / f64::from(self.total_days))
    }
}

/// Today's summary from `GET attendance/dashboard_stats/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_employees: u32,
    pub present_today: u32,
    pub absent_today: u32,
    /// Computed server-side as total minus marked.
    pub not_marked_today: i64,
}
