//! Attendance data shared between the event loop and background tasks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Local;
use hrms_lib::HrmsClient;
use hrms_lib::model::{
    AttendanceFilter, AttendanceRecord, AttendanceStatus, DashboardStats, Employee, NewAttendance,
};
use hrms_ui::RowStore;
use log::{debug, info};

use crate::wakeup::WakeupSender;

pub const UPDATE_FAILED: &str = "Update failed.";
pub const LOAD_FAILED: &str = "Failed to load attendance.";
pub const MARK_FAILED: &str = "Failed to mark attendance.";
pub const EMPLOYEES_FAILED: &str = "Failed to load employees.";

/// What the attendance screen shows. Replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub records: Vec<AttendanceRecord>,
    pub stats: Option<DashboardStats>,
    pub employees: Vec<Employee>,
    /// Bumped on every change so the UI can tell a fresh snapshot apart.
    pub revision: u64,
}

#[derive(Default)]
struct State {
    snapshot: Snapshot,
    /// Sequence number of the newest refresh applied to `snapshot`.
    applied_refresh: u64,
}

/// The attendance table's backing store.
///
/// Refreshes may overlap; each takes a sequence number when it starts and a
/// result older than the one on screen is dropped.
pub struct AttendanceStore {
    client: HrmsClient,
    filter: Mutex<AttendanceFilter>,
    state: Mutex<State>,
    refresh_seq: AtomicU64,
    wakeup: WakeupSender,
}

impl AttendanceStore {
    pub fn new(client: HrmsClient, wakeup: WakeupSender) -> Self {
        Self {
            client,
            filter: Mutex::new(AttendanceFilter::default()),
            state: Mutex::new(State::default()),
            refresh_seq: AtomicU64::new(0),
            wakeup,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state
            .lock()
            .map(|state| state.snapshot.clone())
            .unwrap_or_default()
    }

    pub fn filter_employee(&self) -> Option<u64> {
        self.filter
            .lock()
            .ok()
            .and_then(|filter| filter.employee_id)
    }

    pub fn set_filter_employee(&self, employee: Option<u64>) {
        if let Ok(mut filter) = self.filter.lock() {
            filter.employee_id = employee;
        }
    }

    fn update(&self, change: impl FnOnce(&mut Snapshot)) {
        if let Ok(mut state) = self.state.lock() {
            change(&mut state.snapshot);
            state.snapshot.revision += 1;
        }
        self.wakeup.send();
    }

    /// Apply the result of refresh `seq` unless a newer one already landed.
    fn apply_refresh(&self, seq: u64, change: impl FnOnce(&mut Snapshot)) -> bool {
        let applied = match self.state.lock() {
            Ok(mut state) if seq > state.applied_refresh => {
                state.applied_refresh = seq;
                change(&mut state.snapshot);
                state.snapshot.revision += 1;
                true
            }
            _ => false,
        };
        if applied {
            self.wakeup.send();
        }
        applied
    }

    #[cfg(test)]
    pub(crate) fn replace_records(&self, records: Vec<AttendanceRecord>) {
        self.update(|snapshot| snapshot.records = records);
    }

    /// Re-fetch the employee list used by the pickers.
    pub async fn load_employees(&self) -> Result<(), String> {
        let employees = self
            .client
            .list_employees(None)
            .await
            .map_err(|e| e.user_message(&[], EMPLOYEES_FAILED))?;
        debug!("loaded {} employees", employees.len());
        self.update(|snapshot| snapshot.employees = employees);
        Ok(())
    }

    /// Mark today's attendance. Returns the success text for the alert.
    pub async fn mark_today(&self, employee: u64, status: AttendanceStatus) -> Result<String, String> {
        let attendance = NewAttendance {
            employee,
            date: Local::now().date_naive(),
            status,
        };
        let record = self
            .client
            .mark_attendance(&attendance)
            .await
            .map_err(|e| e.user_message(&["date", "employee"], MARK_FAILED))?;
        info!("marked {} as {}", record.employee_name, record.status);
        Ok(format!("Attendance marked as {}!", record.status))
    }
}

#[async_trait]
impl RowStore for AttendanceStore {
    type Id = u64;
    type Value = AttendanceStatus;
    type Error = String;

    async fn persist_update(&self, id: &u64, value: &AttendanceStatus) -> Result<(), String> {
        self.client
            .update_attendance(*id, *value)
            .await
            .map(|record| debug!("record {} now {}", record.id, record.status))
            .map_err(|e| e.user_message(&[], UPDATE_FAILED))
    }

    async fn refresh(&self) -> Result<(), String> {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let filter = self
            .filter
            .lock()
            .map(|filter| filter.clone())
            .unwrap_or_default();

        let records = self
            .client
            .list_attendance(&filter)
            .await
            .map_err(|e| e.user_message(&[], LOAD_FAILED))?;
        let stats = self
            .client
            .dashboard_stats()
            .await
            .map_err(|e| e.user_message(&[], LOAD_FAILED))?;

        let count = records.len();
        if self.apply_refresh(seq, |snapshot| {
            snapshot.records = records;
            snapshot.stats = Some(stats);
        }) {
            debug!("refreshed {count} attendance records");
        } else {
            debug!("dropped stale refresh {seq}");
        }
        Ok(())
    }
}

/// Shared store handle.
pub type SharedStore = Arc<AttendanceStore>;
