//! Event handling for the Select widget.

use crate::event::{EventResult, InputEvent, Key, Modifiers};

use super::Select;

impl Select {
    /// Keyboard input while the select has focus.
    pub fn handle_key(&self, key: Key, modifiers: Modifiers) -> EventResult {
        if modifiers.ctrl || modifiers.alt {
            return EventResult::Ignored;
        }

        if !self.is_open() {
            return match key {
                Key::Enter | Key::Char(' ') | Key::Down => {
                    self.activate();
                    EventResult::Consumed
                }
                _ => EventResult::Ignored,
            };
        }

        match key {
            Key::Up => self.cursor_up(),
            Key::Down => self.cursor_down(),
            Key::Enter | Key::Char(' ') => {
                if !self.select_index(self.cursor()) {
                    // nothing to choose
                    self.close();
                }
            }
            Key::Escape => self.close(),
            Key::Home => self.set_cursor(0),
            Key::End => self.set_cursor(self.options_len().saturating_sub(1)),
            _ => return EventResult::Ignored,
        }
        EventResult::Consumed
    }

    /// Pointer-down at screen coordinates. Toggles when it lands on the trigger.
    pub fn handle_click(&self, x: u16, y: u16) -> EventResult {
        if !self.trigger().contains(x, y) {
            return EventResult::Ignored;
        }
        self.activate();
        EventResult::Consumed
    }

    /// Events delivered to the panel surface, in panel-local coordinates.
    pub(super) fn handle_panel_event(&self, event: &InputEvent, _x: u16, y: u16) -> EventResult {
        if !self.is_open() {
            return EventResult::Ignored;
        }

        match *event {
            InputEvent::PointerDown { .. } => {
                if let Some(index) = self.option_at_row(y) {
                    self.select_index(index);
                }
                // clicks on the empty-state row still stay inside the panel
                EventResult::Consumed
            }
            InputEvent::Scroll { delta, .. } => {
                if delta < 0 {
                    self.cursor_up();
                } else {
                    self.cursor_down();
                }
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }
}
