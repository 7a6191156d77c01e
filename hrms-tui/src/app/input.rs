//! Input routing for the attendance screen.
//!
//! Every event goes through the [`Screen`](hrms_ui::Screen) first so open
//! dropdowns see outside clicks, scrolls and resizes. What the screen does
//! not consume is routed to the focused control.

use hrms_lib::model::AttendanceStatus;
use hrms_ui::{EventResult, InputEvent, Key, Modifiers, Select};
use log::debug;

use super::{App, Focus};

/// Rows moved by PageUp/PageDown.
const PAGE: usize = 10;

impl App {
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key { key, modifiers } => self.handle_key(key, modifiers),
            InputEvent::PointerDown { x, y, .. } => {
                if !self.screen.dispatch(&event).is_handled() {
                    self.handle_click(x, y);
                }
            }
            InputEvent::Scroll { delta, .. } => {
                if !self.screen.dispatch(&event).is_handled() {
                    self.move_cursor(isize::from(delta));
                }
            }
            InputEvent::Resize { .. } => {
                self.screen.dispatch(&event);
            }
        }
        self.process_actions();
    }

    fn handle_key(&mut self, key: Key, modifiers: Modifiers) {
        if modifiers.ctrl && key == Key::Char('c') {
            self.should_quit = true;
            return;
        }

        // An open dropdown owns the keyboard.
        if let Some(open) = self.open_select() {
            if open.handle_key(key, modifiers).is_handled() {
                return;
            }
            open.close();
        }

        match key {
            Key::Tab => {
                self.focus = self.focus.next();
                return;
            }
            Key::BackTab => {
                self.focus = self.focus.prev();
                return;
            }
            _ => {}
        }

        let handled = match self.focus {
            Focus::Filter => self.filter.handle_key(key, modifiers).is_handled(),
            Focus::MarkEmployee => self.mark_employee.handle_key(key, modifiers).is_handled(),
            Focus::MarkStatus => self.handle_status_key(key),
            Focus::Table => self.handle_table_key(key),
        };
        if handled {
            return;
        }

        match key {
            Key::Char('q') => self.should_quit = true,
            Key::Char('r') => self.spawn_refresh(),
            Key::Char('m') => self.spawn_mark(),
            _ => {}
        }
    }

    fn open_select(&self) -> Option<Select> {
        [&self.filter, &self.mark_employee]
            .into_iter()
            .find(|select| select.is_open())
            .cloned()
    }

    fn handle_status_key(&mut self, key: Key) -> bool {
        match key {
            Key::Left | Key::Right | Key::Char(' ') => {
                self.mark_status = self.mark_status.toggled();
            }
            Key::Char('p') => self.mark_status = AttendanceStatus::Present,
            Key::Char('a') => self.mark_status = AttendanceStatus::Absent,
            Key::Enter => self.spawn_mark(),
            _ => return false,
        }
        true
    }

    fn handle_table_key(&mut self, key: Key) -> bool {
        match key {
            Key::Up | Key::Char('k') => self.move_cursor(-1),
            Key::Down | Key::Char('j') => self.move_cursor(1),
            Key::PageUp => self.move_cursor(-(PAGE as isize)),
            Key::PageDown => self.move_cursor(PAGE as isize),
            Key::Home => self.cursor = 0,
            Key::End => self.cursor = self.records().len().saturating_sub(1),
            _ => return self.handle_edit_key(key),
        }
        true
    }

    /// Keys that drive the row edit session.
    fn handle_edit_key(&mut self, key: Key) -> bool {
        let Some(session) = self.sessions.active() else {
            if matches!(key, Key::Char('e') | Key::Enter) {
                self.begin_edit_at_cursor();
                return true;
            }
            return false;
        };

        let on_session_row = self
            .cursor_record()
            .is_some_and(|record| record.id == session.row_id);

        match key {
            Key::Left | Key::Right | Key::Char(' ') if on_session_row => {
                self.sessions
                    .update_draft(&session.row_id, session.draft.toggled());
            }
            Key::Char('p') if on_session_row => {
                self.sessions
                    .update_draft(&session.row_id, AttendanceStatus::Present);
            }
            Key::Char('a') if on_session_row => {
                self.sessions
                    .update_draft(&session.row_id, AttendanceStatus::Absent);
            }
            Key::Char('s') => self.spawn_confirm(),
            Key::Enter if on_session_row => self.spawn_confirm(),
            Key::Enter | Key::Char('e') => self.begin_edit_at_cursor(),
            Key::Escape => {
                self.sessions.cancel_edit();
            }
            _ => return false,
        }
        true
    }

    fn begin_edit_at_cursor(&mut self) {
        if let Some(record) = self.cursor_record() {
            self.sessions.begin_edit(record.id, record.status);
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.records().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    fn handle_click(&mut self, x: u16, y: u16) {
        if self.filter.handle_click(x, y) == EventResult::Consumed {
            self.focus = Focus::Filter;
        } else if self.mark_employee.handle_click(x, y) == EventResult::Consumed {
            self.focus = Focus::MarkEmployee;
        } else if self.layout.status_toggle.contains(x, y) {
            self.focus = Focus::MarkStatus;
            self.mark_status = self.mark_status.toggled();
        } else if self.layout.mark_button.contains(x, y) {
            self.spawn_mark();
        } else if let Some(row) = self.layout.table_row_at(x, y) {
            let index = self.scroll + row;
            if index < self.records().len() {
                debug!("clicked table row {index}");
                self.focus = Focus::Table;
                self.cursor = index;
            }
        }
    }
}
