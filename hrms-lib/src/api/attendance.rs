//! Attendance endpoints.

use chrono::{Local, NaiveDate};
use log::debug;

use crate::client::HrmsClient;
use crate::error::Error;
use crate::model::{
    AttendanceFilter, AttendanceRecord, AttendanceStatus, DashboardStats, EmployeeStatistics,
    NewAttendance, StatusPatch,
};

/// Reject dates after `today`. The server enforces the same rule.
pub fn validate_attendance_date(date: NaiveDate, today: NaiveDate) -> Result<(), Error> {
    if date > today {
        return Err(Error::validation(
            "Attendance cannot be marked for future dates.",
        ));
    }
    Ok(())
}

impl HrmsClient {
    /// List attendance records, newest first.
    pub async fn list_attendance(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, Error> {
        let url = self.endpoint_with_query("attendance/", &filter.query_pairs())?;
        self.get_json(url).await
    }

    /// Record attendance for one employee and day.
    ///
    /// Only one record may exist per employee and date; change an existing
    /// one with [`update_attendance`](Self::update_attendance).
    pub async fn mark_attendance(
        &self,
        attendance: &NewAttendance,
    ) -> Result<AttendanceRecord, Error> {
        validate_attendance_date(attendance.date, Local::now().date_naive())?;
        let url = self.endpoint("attendance/")?;
        let record: AttendanceRecord = self.post_json(url, attendance).await?;
        debug!(
            "marked employee {} {} on {}",
            record.employee, record.status, record.date
        );
        Ok(record)
    }

    /// Change the status of an existing record (partial update).
    pub async fn update_attendance(
        &self,
        id: u64,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, Error> {
        let url = self.endpoint(&format!("attendance/{id}/"))?;
        self.patch_json(url, &StatusPatch { status }).await
    }

    pub async fn delete_attendance(&self, id: u64) -> Result<(), Error> {
        let url = self.endpoint(&format!("attendance/{id}/"))?;
        self.delete(url).await
    }

    /// Per-employee totals, honouring the same filter as the list.
    pub async fn attendance_statistics(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<EmployeeStatistics>, Error> {
        let url = self.endpoint_with_query("attendance/statistics/", &filter.query_pairs())?;
        self.get_json(url).await
    }

    /// Today's headline numbers.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, Error> {
        let url = self.endpoint("attendance/dashboard_stats/")?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_dates_rejected() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(validate_attendance_date(today, today).is_ok());
        assert!(validate_attendance_date(today.pred_opt().unwrap(), today).is_ok());
        assert!(matches!(
            validate_attendance_date(today.succ_opt().unwrap(), today),
            Err(Error::Validation(_))
        ));
    }
}
