//! Painting the attendance screen into a [`Buffer`].
//!
//! Rendering is also the layout pass: trigger rectangles are pushed to the
//! selects here, and the surface layer is painted last so open panels cover
//! the table.

use std::time::Instant;

use chrono::Local;
use crossterm::style::Color;
use hrms_lib::model::{AttendanceRecord, AttendanceStatus, DashboardStats};
use hrms_ui::{AlertLevel, Rect, Select, Surface};

use super::{App, Focus};
use crate::store::Snapshot;
use crate::terminal::{Buffer, Style, text_width};

const LABEL_X: u16 = 1;
const CONTROL_X: u16 = 10;
const TRIGGER_WIDTH: u16 = 32;
const TOGGLE_WIDTH: u16 = 12;
const MARK_LABEL: &str = "[ Mark ]";
const TABLE_HEADER_Y: u16 = 6;
const MAX_ALERTS: usize = 3;

/// Table columns: title and start column.
const COLUMNS: [(&str, u16); 5] = [
    ("Employee ID", 1),
    ("Name", 14),
    ("Department", 38),
    ("Date", 56),
    ("Status", 69),
];

/// Clickable regions from the last render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    pub filter_trigger: Rect,
    pub mark_trigger: Rect,
    pub status_toggle: Rect,
    pub date: Rect,
    pub mark_button: Rect,
    pub table_body: Rect,
}

impl Layout {
    pub fn compute(viewport: Rect) -> Self {
        let trigger_width = TRIGGER_WIDTH.min(viewport.width.saturating_sub(CONTROL_X + 1));
        let toggle_x = CONTROL_X + trigger_width + 2;
        let date_x = toggle_x + TOGGLE_WIDTH + 2;
        let button_x = date_x + 17;
        let body_y = TABLE_HEADER_Y + 1;

        Self {
            filter_trigger: Rect::new(CONTROL_X, 2, trigger_width, 1),
            mark_trigger: Rect::new(CONTROL_X, 4, trigger_width, 1),
            status_toggle: Rect::new(toggle_x, 4, TOGGLE_WIDTH, 1),
            date: Rect::new(date_x, 4, 15, 1),
            mark_button: Rect::new(button_x, 4, text_width(MARK_LABEL), 1),
            // last row is the help line
            table_body: Rect::new(
                0,
                body_y,
                viewport.width,
                viewport.height.saturating_sub(body_y + 1),
            ),
        }
    }

    /// Visible table row under the point.
    pub fn table_row_at(&self, x: u16, y: u16) -> Option<usize> {
        self.table_body
            .contains(x, y)
            .then(|| usize::from(y - self.table_body.y))
    }
}

impl App {
    pub fn render(&mut self, now: Instant) -> Buffer {
        let viewport = self.screen.viewport();
        let mut buffer = Buffer::new(viewport.width, viewport.height);
        let snapshot = self.store.snapshot();

        self.sync_pickers(&snapshot.employees);
        let layout = Layout::compute(viewport);
        self.filter.trigger().set_rect(layout.filter_trigger);
        self.mark_employee.trigger().set_rect(layout.mark_trigger);
        self.layout = layout;

        let len = snapshot.records.len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
        let visible = usize::from(layout.table_body.height);
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if visible > 0 && self.cursor >= self.scroll + visible {
            self.scroll = self.cursor + 1 - visible;
        }

        draw_header(&mut buffer, snapshot.stats);
        self.draw_controls(&mut buffer, &layout);
        self.draw_table(&mut buffer, &layout, &snapshot);
        self.draw_alerts(&mut buffer, now);
        draw_help(&mut buffer);
        for surface in self.screen.surfaces().surfaces() {
            draw_surface(&mut buffer, &surface);
        }
        buffer
    }

    fn label_style(&self, focus: Focus) -> Style {
        if self.focus == focus {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default()
        }
    }

    fn draw_controls(&self, buffer: &mut Buffer, layout: &Layout) {
        buffer.put_str(LABEL_X, 2, "Filter", self.label_style(Focus::Filter), 8);
        draw_trigger(buffer, &self.filter, layout.filter_trigger);

        let mark_focused = matches!(self.focus, Focus::MarkEmployee | Focus::MarkStatus);
        let mark_label = if mark_focused {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default()
        };
        buffer.put_str(LABEL_X, 4, "Mark", mark_label, 8);
        draw_trigger(buffer, &self.mark_employee, layout.mark_trigger);

        let toggle = layout.status_toggle;
        let mut toggle_style = status_style(self.mark_status);
        if self.focus == Focus::MarkStatus {
            toggle_style = toggle_style.reverse();
        }
        buffer.put_str(
            toggle.x,
            toggle.y,
            &format!("◂ {} ▸", self.mark_status),
            toggle_style,
            toggle.width,
        );

        let today = Local::now().date_naive();
        buffer.put_str(
            layout.date.x,
            layout.date.y,
            &format!("Date {today}"),
            Style::default().dim(),
            layout.date.width,
        );
        buffer.put_str(
            layout.mark_button.x,
            layout.mark_button.y,
            MARK_LABEL,
            Style::default().bold(),
            layout.mark_button.width,
        );
    }

    fn draw_table(&self, buffer: &mut Buffer, layout: &Layout, snapshot: &Snapshot) {
        let header = Style::default().bold().fg(Color::Grey);
        for (title, x) in COLUMNS {
            buffer.put_str(x, TABLE_HEADER_Y, title, header, column_width(x, buffer.width()));
        }

        let body = layout.table_body;
        if snapshot.records.is_empty() {
            let message = if snapshot.revision == 0 {
                "Loading…"
            } else {
                "No attendance records found."
            };
            buffer.put_str(1, body.y, message, Style::default().dim(), body.width);
            return;
        }

        let session = self.sessions.active();
        let rows = snapshot
            .records
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(usize::from(body.height));

        for (offset, (index, record)) in rows.enumerate() {
            let y = body.y + offset as u16;
            let mut base = Style::default();
            if index == self.cursor && self.focus == Focus::Table {
                base = base.bg(Color::DarkGrey);
                buffer.fill(0, y, body.width, 1, base);
            }
            draw_record(buffer, y, record, base);

            let (text, style) = match &session {
                Some(session) if session.row_id == record.id && session.is_saving => {
                    ("Saving…".to_string(), base.fg(Color::Yellow).dim())
                }
                Some(session) if session.row_id == record.id => (
                    format!("◂ {} ▸", session.draft),
                    base.fg(Color::Yellow).bold(),
                ),
                _ => (record.status.to_string(), status_style(record.status).bg(base.bg)),
            };
            let x = COLUMNS[4].1;
            buffer.put_str(x, y, &text, style, column_width(x, buffer.width()));
        }
    }

    fn draw_alerts(&self, buffer: &mut Buffer, now: Instant) {
        let alerts = self.alerts.current(now);
        let bottom = buffer.height().saturating_sub(2);

        for (i, alert) in alerts.iter().rev().take(MAX_ALERTS).enumerate() {
            let Some(y) = bottom.checked_sub(i as u16) else {
                break;
            };
            let style = match alert.level {
                AlertLevel::Success => Style::default().fg(Color::Black).bg(Color::Green),
                AlertLevel::Error => Style::default().fg(Color::White).bg(Color::Red),
                AlertLevel::Info => Style::default().fg(Color::White).bg(Color::Blue),
            };
            let text = format!(" {} ", alert.message);
            let width = text_width(&text).min(buffer.width());
            let x = buffer.width().saturating_sub(width + 1);
            buffer.put_str(x, y, &text, style, width);
        }
    }
}

fn draw_header(buffer: &mut Buffer, stats: Option<DashboardStats>) {
    buffer.put_str(
        1,
        0,
        "HRMS Lite · Attendance",
        Style::default().bold(),
        buffer.width(),
    );

    let Some(stats) = stats else {
        return;
    };
    let summary = format!(
        "Present {}  Absent {}  Not marked {}  of {}",
        stats.present_today, stats.absent_today, stats.not_marked_today, stats.total_employees
    );
    let width = text_width(&summary);
    let x = buffer.width().saturating_sub(width + 1).max(26);
    buffer.put_str(x, 0, &summary, Style::default().fg(Color::Grey), width);
}

fn draw_trigger(buffer: &mut Buffer, select: &Select, area: Rect) {
    if area.is_empty() {
        return;
    }
    let style = Style::default().bg(Color::DarkGrey);
    buffer.fill(area.x, area.y, area.width, area.height, style);

    let text_style = if select.selected_label().is_some() {
        style
    } else {
        style.dim()
    };
    buffer.put_str(
        area.x + 1,
        area.y,
        &select.display_text(),
        text_style,
        area.width.saturating_sub(3),
    );

    let arrow = if select.is_open() { "▴" } else { "▾" };
    buffer.put_str(area.right().saturating_sub(2), area.y, arrow, style, 1);
}

fn draw_record(buffer: &mut Buffer, y: u16, record: &AttendanceRecord, base: Style) {
    let date = record.date.to_string();
    let cells = [
        record.employee_emp_id.as_str(),
        record.employee_name.as_str(),
        record.employee_department.as_str(),
        date.as_str(),
    ];
    for (text, (_, x)) in cells.into_iter().zip(COLUMNS) {
        buffer.put_str(x, y, text, base, column_width(x, buffer.width()));
    }
}

fn draw_help(buffer: &mut Buffer) {
    let y = buffer.height().saturating_sub(1);
    buffer.put_str(
        1,
        y,
        "Tab focus  e edit  ←/→ change  Enter save  Esc cancel  r refresh  m mark  q quit",
        Style::default().dim(),
        buffer.width(),
    );
}

fn draw_surface(buffer: &mut Buffer, surface: &Surface) {
    let area = surface.area;
    let panel = Style::default().fg(Color::White).bg(Color::Black);
    buffer.fill(area.x, area.y, area.width, area.height, panel);

    for (i, line) in surface.lines.iter().take(usize::from(area.height)).enumerate() {
        let mut style = panel;
        if line.highlighted {
            style = style.bg(Color::Blue);
            buffer.fill(area.x, area.y + i as u16, area.width, 1, style);
        }
        if line.selected {
            style = style.bold();
            buffer.put_str(area.right().saturating_sub(2), area.y + i as u16, "✓", style, 1);
        }
        if line.muted {
            style = style.dim();
        }
        buffer.put_str(area.x + 1, area.y + i as u16, &line.text, style, area.width.saturating_sub(2));
    }
}

/// Columns available to a cell starting at `x`.
fn column_width(x: u16, total: u16) -> u16 {
    let next = COLUMNS
        .iter()
        .map(|(_, start)| *start)
        .find(|start| *start > x)
        .unwrap_or(total);
    next.saturating_sub(x + 1).min(total.saturating_sub(x))
}

fn status_style(status: AttendanceStatus) -> Style {
    match status {
        AttendanceStatus::Present => Style::default().fg(Color::Green),
        AttendanceStatus::Absent => Style::default().fg(Color::Red),
    }
}
