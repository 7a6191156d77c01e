//! The attendance screen.
//!
//! One [`App`] owns the widgets, the edit sessions of the table and the
//! alert queue. All of it is touched only from the event loop; background
//! tasks talk back through the [`AttendanceStore`], the alert queue and the
//! wakeup channel.

mod input;
mod render;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crossterm::event::EventStream;
use futures::StreamExt;
use hrms_lib::HrmsClient;
use hrms_lib::model::{AttendanceRecord, AttendanceStatus, Employee};
use hrms_ui::{
    Alert, AlertQueue, AlertSink, EditSessions, InputEvent, RowStore, Screen, Select, SelectOption,
};
use log::{debug, error, info, trace, warn};
use tokio::time::sleep_until;

use crate::error::AppError;
use crate::settings::{SettingsProvider, keys};
use crate::store::{AttendanceStore, SharedStore};
use crate::terminal::TerminalGuard;
use crate::wakeup::{WakeupReceiver, WakeupSender};

use render::Layout;

/// Label of the filter entry that shows every employee.
pub const ALL_EMPLOYEES: &str = "All Employees";
pub const SAVED_MESSAGE: &str = "Attendance updated!";
pub const NO_EMPLOYEE_MESSAGE: &str = "Please select an employee.";

/// Which control receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Filter,
    MarkEmployee,
    MarkStatus,
    Table,
}

impl Focus {
    const ORDER: [Focus; 4] = [
        Focus::Filter,
        Focus::MarkEmployee,
        Focus::MarkStatus,
        Focus::Table,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Work requested from inside widget callbacks, run after the event.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    FilterChanged(Option<u64>),
}

pub struct App {
    screen: Screen,
    store: SharedStore,
    sessions: EditSessions<AttendanceStore>,
    alerts: AlertQueue,
    settings: Option<SettingsProvider>,
    wakeup: WakeupSender,

    filter: Select,
    mark_employee: Select,
    mark_status: AttendanceStatus,
    focus: Focus,
    /// Index of the highlighted table row.
    cursor: usize,
    /// First visible table row.
    scroll: usize,
    layout: Layout,

    /// Employees the pickers were last built from.
    picker_employees: Vec<Employee>,
    actions: Arc<Mutex<Vec<Action>>>,
    should_quit: bool,
}

impl App {
    pub fn new(
        client: HrmsClient,
        settings: Option<SettingsProvider>,
        filter_employee: Option<u64>,
        size: (u16, u16),
        wakeup: WakeupSender,
    ) -> Self {
        let screen = Screen::new(size.0, size.1);
        let alerts = AlertQueue::new();
        let store = Arc::new(AttendanceStore::new(client, wakeup.clone()));
        store.set_filter_employee(filter_employee);

        let sessions = EditSessions::new(Arc::clone(&store), Arc::new(alerts.clone()))
            .with_messages(SAVED_MESSAGE, crate::store::UPDATE_FAILED);

        let filter = Select::with_anchor_offset(&screen, 0)
            .with_placeholder(ALL_EMPLOYEES)
            .with_options(employee_options(&[], true))
            .with_value(filter_employee.map(|id| id.to_string()).unwrap_or_default());
        let mark_employee = Select::with_anchor_offset(&screen, 0)
            .with_placeholder("Select employee")
            .with_options(employee_options(&[], false));

        let actions = Arc::new(Mutex::new(Vec::new()));
        let queued = Arc::clone(&actions);
        filter.on_change(move |value| {
            if let Ok(mut queued) = queued.lock() {
                queued.push(Action::FilterChanged(value.parse().ok()));
            }
        });

        Self {
            screen,
            store,
            sessions,
            alerts,
            settings,
            wakeup,
            filter,
            mark_employee,
            mark_status: AttendanceStatus::Present,
            focus: Focus::Table,
            cursor: 0,
            scroll: 0,
            layout: Layout::default(),
            picker_employees: Vec::new(),
            actions,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    pub async fn run(
        mut self,
        terminal: &mut TerminalGuard,
        mut wakeup_rx: WakeupReceiver,
    ) -> Result<(), AppError> {
        let mut events = EventStream::new();
        self.spawn_load_employees();
        self.spawn_refresh();

        loop {
            let frame = self.render(Instant::now());
            terminal.draw(&frame)?;
            if self.should_quit {
                break;
            }

            let deadline = self.alerts.next_expiry();
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(event)) => {
                        trace!("crossterm event: {event:?}");
                        if let Some(input) = InputEvent::from_crossterm(event) {
                            self.handle_event(input);
                        }
                    }
                    Some(Err(e)) => error!("event stream error: {e}"),
                    None => {
                        warn!("event stream closed");
                        break;
                    }
                },
                Some(()) = wakeup_rx.recv() => {
                    wakeup_rx.drain();
                }
                _ = sleep_until_optional(deadline) => {
                    trace!("alert deadline reached");
                }
            }
        }

        info!("attendance screen closed");
        Ok(())
    }

    /// Run work queued by widget callbacks during the last event.
    fn process_actions(&mut self) {
        let actions = self
            .actions
            .lock()
            .map(|mut queued| std::mem::take(&mut *queued))
            .unwrap_or_default();

        for action in actions {
            debug!("action {action:?}");
            match action {
                Action::FilterChanged(employee) => {
                    if self.store.filter_employee() == employee {
                        continue;
                    }
                    self.store.set_filter_employee(employee);
                    self.cursor = 0;
                    self.scroll = 0;
                    self.spawn_refresh();
                    self.spawn_save_filter(employee);
                }
            }
        }
    }

    /// Rebuild the picker options when the employee list changed.
    fn sync_pickers(&mut self, employees: &[Employee]) {
        if self.picker_employees == employees {
            return;
        }
        self.filter.set_options(employee_options(employees, true));
        self.mark_employee.set_options(employee_options(employees, false));
        self.picker_employees = employees.to_vec();
    }

    fn records(&self) -> Vec<AttendanceRecord> {
        self.store.snapshot().records
    }

    fn cursor_record(&self) -> Option<AttendanceRecord> {
        self.records().into_iter().nth(self.cursor)
    }

    // =========================================================================
    // Background work
    // =========================================================================

    fn spawn_refresh(&self) {
        let store = Arc::clone(&self.store);
        let alerts = self.alerts.clone();
        tokio::spawn(async move {
            if let Err(e) = store.refresh().await {
                warn!("refresh failed: {e}");
                alerts.push(Alert::error(e));
            }
        });
    }

    fn spawn_load_employees(&self) {
        let store = Arc::clone(&self.store);
        let alerts = self.alerts.clone();
        tokio::spawn(async move {
            if let Err(e) = store.load_employees().await {
                warn!("loading employees failed: {e}");
                alerts.push(Alert::error(e));
            }
        });
    }

    /// Confirm the active edit in the background.
    fn spawn_confirm(&self) {
        let sessions = self.sessions.clone();
        let wakeup = self.wakeup.clone();
        tokio::spawn(async move {
            let outcome = sessions.confirm_edit().await;
            debug!("confirm finished: {outcome:?}");
            wakeup.send();
        });
    }

    fn spawn_mark(&self) {
        let Some(employee) = self.mark_employee.value().and_then(|v| v.parse::<u64>().ok()) else {
            self.alerts.push(Alert::error(NO_EMPLOYEE_MESSAGE));
            return;
        };
        let status = self.mark_status;
        let store = Arc::clone(&self.store);
        let alerts = self.alerts.clone();
        let wakeup = self.wakeup.clone();
        tokio::spawn(async move {
            match store.mark_today(employee, status).await {
                Ok(message) => {
                    alerts.push(Alert::success(message));
                    if let Err(e) = store.refresh().await {
                        alerts.push(Alert::error(e));
                    }
                }
                Err(e) => alerts.push(Alert::error(e)),
            }
            wakeup.send();
        });
    }

    fn spawn_save_filter(&self, employee: Option<u64>) {
        let Some(settings) = self.settings.clone() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = settings.set(keys::FILTER_EMPLOYEE, &employee).await {
                warn!("could not remember filter: {e}");
            }
        });
    }
}

/// Picker options for `employees`, optionally led by "All Employees".
fn employee_options(employees: &[Employee], with_all: bool) -> Vec<SelectOption> {
    let all = with_all.then(|| SelectOption::new("", ALL_EMPLOYEES));
    all.into_iter()
        .chain(
            employees
                .iter()
                .map(|e| SelectOption::new(e.id, e.display_name())),
        )
        .collect()
}

async fn sleep_until_optional(deadline: Option<Instant>) {
    match deadline {
        Some(d) => sleep_until(tokio::time::Instant::from_std(d)).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests;
