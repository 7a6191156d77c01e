//! Input events routed through the [`Screen`](crate::screen::Screen).

/// A low-level input event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A pointer button went down.
    PointerDown { x: u16, y: u16, button: MouseButton },
    /// Wheel or trackpad scroll. Negative `delta` scrolls up.
    Scroll { x: u16, y: u16, delta: i16 },
    /// The viewport changed size.
    Resize { width: u16, height: u16 },
    /// Key press.
    Key { key: Key, modifiers: Modifiers },
}

/// Discriminant used to key listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    Scroll,
    Resize,
    Key,
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::Scroll { .. } => EventKind::Scroll,
            Self::Resize { .. } => EventKind::Resize,
            Self::Key { .. } => EventKind::Key,
        }
    }

    /// Pointer position for pointer and scroll events.
    pub fn position(&self) -> Option<(u16, u16)> {
        match *self {
            Self::PointerDown { x, y, .. } | Self::Scroll { x, y, .. } => Some((x, y)),
            _ => None,
        }
    }

    /// Convert a crossterm event. Events with no counterpart return `None`.
    pub fn from_crossterm(event: crossterm::event::Event) -> Option<Self> {
        use crossterm::event::{Event, KeyEventKind, MouseEventKind};

        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Some(Self::Key {
                key: Key::from_crossterm(key.code)?,
                modifiers: key.modifiers.into(),
            }),
            Event::Mouse(mouse) => {
                let (x, y) = (mouse.column, mouse.row);
                match mouse.kind {
                    MouseEventKind::Down(button) => Some(Self::PointerDown {
                        x,
                        y,
                        button: button.into(),
                    }),
                    MouseEventKind::ScrollUp => Some(Self::Scroll { x, y, delta: -1 }),
                    MouseEventKind::ScrollDown => Some(Self::Scroll { x, y, delta: 1 }),
                    _ => None,
                }
            }
            Event::Resize(width, height) => Some(Self::Resize { width, height }),
            _ => None,
        }
    }
}

/// Simplified key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Tab,
    BackTab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    fn from_crossterm(code: crossterm::event::KeyCode) -> Option<Self> {
        use crossterm::event::KeyCode;
        Some(match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Esc => Key::Escape,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            _ => return None,
        })
    }
}

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(mods: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers;
        Self {
            shift: mods.contains(KeyModifiers::SHIFT),
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<crossterm::event::MouseButton> for MouseButton {
    fn from(btn: crossterm::event::MouseButton) -> Self {
        use crossterm::event::MouseButton as CtBtn;
        match btn {
            CtBtn::Left => MouseButton::Left,
            CtBtn::Right => MouseButton::Right,
            CtBtn::Middle => MouseButton::Middle,
        }
    }
}

/// Result of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored, try other handlers.
    Ignored,
    /// Event was consumed, stop propagation.
    Consumed,
}

impl EventResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventResult::Consumed)
    }
}

/// What a listener wants to happen after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}
