//! Select widget state.

use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use log::debug;
use unicode_width::UnicodeWidthStr;

use crate::event::{EventResult, InputEvent};
use crate::geometry::DEFAULT_ANCHOR_OFFSET;
use crate::layers::overlay::{DismissReason, OverlayController, TriggerHandle};
use crate::screen::{Screen, SurfaceLine};

/// Maximum number of rows the dropdown panel shows at once.
pub const MAX_PANEL_ROWS: usize = 8;

/// Row shown when there is nothing to choose from.
pub const EMPTY_LABEL: &str = "No options";

/// A selectable value with its display text.
///
/// The value is stored in canonical string form, so `7` and `"7"` name the
/// same option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    value: String,
    label: String,
}

impl SelectOption {
    pub fn new(value: impl Display, label: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Compare against any value by canonical string form.
    pub fn matches(&self, value: &(impl Display + ?Sized)) -> bool {
        self.value == value.to_string()
    }
}

/// Unique identifier for a Select widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectId(usize);

impl SelectId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for SelectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__select_{}", self.0)
    }
}

/// Callback receiving the chosen value.
pub type ChangeHandler = dyn Fn(&str) + Send + Sync;

#[derive(Debug, Default)]
struct SelectInner {
    options: Vec<SelectOption>,
    /// Current value. Not required to be one of `options`.
    value: Option<String>,
    placeholder: String,
    /// Keyboard cursor while open.
    cursor: usize,
    /// First option row visible in the panel.
    scroll: usize,
}

impl SelectInner {
    fn selected_index(&self) -> Option<usize> {
        let value = self.value.as_deref()?;
        self.options.iter().position(|o| o.matches(value))
    }

    fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.options.len().saturating_sub(1));
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + MAX_PANEL_ROWS {
            self.scroll = self.cursor + 1 - MAX_PANEL_ROWS;
        }
    }

    fn panel_lines(&self) -> Vec<SurfaceLine> {
        if self.options.is_empty() {
            return vec![SurfaceLine::muted(EMPTY_LABEL)];
        }
        let selected = self.selected_index();
        self.options
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(MAX_PANEL_ROWS)
            .map(|(i, option)| SurfaceLine {
                text: option.label.clone(),
                highlighted: i == self.cursor,
                selected: Some(i) == selected,
                muted: false,
            })
            .collect()
    }

    fn content_width(&self) -> u16 {
        let widest = self
            .options
            .iter()
            .map(|o| o.label.width())
            .max()
            .unwrap_or(EMPTY_LABEL.len());
        // padding plus the check mark column
        (widest + 4).min(u16::MAX as usize) as u16
    }
}

pub(super) struct Shared {
    id: SelectId,
    overlay: OverlayController,
    inner: Mutex<SelectInner>,
    on_change: Mutex<Option<Arc<ChangeHandler>>>,
}

/// A dropdown select backed by an [`OverlayController`].
///
/// Clones share state. The dropdown panel is drawn on the screen's surface
/// layer, positioned below the trigger, and closes on selection, on an
/// outside pointer-down, on scroll and on resize.
///
/// # Example
///
/// ```ignore
/// let employee = Select::new(&screen)
///     .with_placeholder("Select employee…")
///     .with_options([SelectOption::new(1, "Alice"), SelectOption::new(2, "Bob")]);
/// employee.on_change(|value| log::info!("picked {value}"));
///
/// // layout
/// employee.trigger().set_rect(Rect::new(2, 4, 30, 1));
/// ```
#[derive(Clone)]
pub struct Select {
    pub(super) shared: Arc<Shared>,
}

impl Select {
    /// Create an empty select with the default anchor offset.
    pub fn new(screen: &Screen) -> Self {
        Self::with_anchor_offset(screen, DEFAULT_ANCHOR_OFFSET)
    }

    /// Create an empty select whose panel hangs `offset` units below the trigger.
    pub fn with_anchor_offset(screen: &Screen, offset: u16) -> Self {
        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let overlay = OverlayController::new(screen, TriggerHandle::new()).with_offset(offset);
            let weak = weak.clone();
            overlay.set_panel_handler(Arc::new(move |event: &InputEvent, x: u16, y: u16| {
                match weak.upgrade() {
                    Some(shared) => Select { shared }.handle_panel_event(event, x, y),
                    None => EventResult::Ignored,
                }
            }));
            Shared {
                id: SelectId::new(),
                overlay,
                inner: Mutex::new(SelectInner::default()),
                on_change: Mutex::new(None),
            }
        });
        let select = Self { shared };
        select.sync_panel();
        select
    }

    pub fn with_options(self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.set_options(options);
        self
    }

    pub fn with_placeholder(self, placeholder: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.shared.inner.lock() {
            guard.placeholder = placeholder.into();
        }
        self
    }

    pub fn with_value(self, value: impl Display) -> Self {
        self.set_value(Some(value.to_string()));
        self
    }

    pub fn id(&self) -> SelectId {
        self.shared.id
    }

    pub fn overlay(&self) -> &OverlayController {
        &self.shared.overlay
    }

    /// Layout updates this with the trigger's bounding box.
    pub fn trigger(&self) -> &TriggerHandle {
        self.shared.overlay.trigger()
    }

    pub fn is_open(&self) -> bool {
        self.shared.overlay.is_open()
    }

    // -------------------------------------------------------------------------
    // Options and value
    // -------------------------------------------------------------------------

    /// Replace the option set. The current value is kept even if it is no
    /// longer listed.
    pub fn set_options(&self, options: impl IntoIterator<Item = SelectOption>) {
        if let Ok(mut guard) = self.shared.inner.lock() {
            guard.options = options.into_iter().collect();
            guard.scroll = 0;
            let cursor = guard.cursor;
            guard.set_cursor(cursor);
        }
        self.sync_panel();
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.shared
            .inner
            .lock()
            .map(|guard| guard.options.clone())
            .unwrap_or_default()
    }

    pub fn value(&self) -> Option<String> {
        self.shared
            .inner
            .lock()
            .map(|guard| guard.value.clone())
            .unwrap_or(None)
    }

    /// Set the value without notifying the change handler.
    pub fn set_value(&self, value: Option<String>) {
        if let Ok(mut guard) = self.shared.inner.lock() {
            guard.value = value;
        }
        self.sync_panel();
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.shared
            .inner
            .lock()
            .map(|guard| guard.selected_index())
            .unwrap_or(None)
    }

    pub fn selected_label(&self) -> Option<String> {
        let guard = self.shared.inner.lock().ok()?;
        guard
            .selected_index()
            .map(|i| guard.options[i].label.clone())
    }

    pub fn placeholder(&self) -> String {
        self.shared
            .inner
            .lock()
            .map(|guard| guard.placeholder.clone())
            .unwrap_or_default()
    }

    /// Text for the trigger: the selected label, else the placeholder.
    pub fn display_text(&self) -> String {
        self.selected_label().unwrap_or_else(|| self.placeholder())
    }

    /// Register the change handler, called once per completed selection.
    pub fn on_change(&self, handler: impl Fn(&str) + Send + Sync + 'static) {
        if let Ok(mut guard) = self.shared.on_change.lock() {
            *guard = Some(Arc::new(handler));
        }
    }

    // -------------------------------------------------------------------------
    // Open/close
    // -------------------------------------------------------------------------

    /// Trigger activation: opens the dropdown, or closes it when open.
    pub fn activate(&self) -> bool {
        if !self.is_open() {
            if let Ok(mut guard) = self.shared.inner.lock() {
                guard.scroll = 0;
                let start = guard.selected_index().unwrap_or(0);
                guard.set_cursor(start);
            }
            self.sync_panel();
        }
        self.shared.overlay.open()
    }

    pub fn close(&self) {
        self.shared.overlay.close();
    }

    /// Choose `value`: notify the change handler, then close. Selection and
    /// dismissal happen in the same call.
    pub fn select_option(&self, value: &str) {
        let handler = {
            let Ok(mut guard) = self.shared.inner.lock() else {
                return;
            };
            guard.value = Some(value.to_string());
            if let Some(index) = guard.selected_index() {
                guard.set_cursor(index);
            }
            self.shared
                .on_change
                .lock()
                .ok()
                .and_then(|guard| guard.as_ref().map(Arc::clone))
        };

        debug!("select {} chose {value:?}", self.shared.id);
        if let Some(handler) = handler {
            handler(value);
        }
        self.shared.overlay.dismiss(DismissReason::Selection);
        self.sync_panel();
    }

    /// Choose the option at `index`. Out-of-range indices are ignored.
    pub fn select_index(&self, index: usize) -> bool {
        let value = self
            .shared
            .inner
            .lock()
            .ok()
            .and_then(|guard| guard.options.get(index).map(|o| o.value.clone()));
        match value {
            Some(value) => {
                self.select_option(&value);
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Cursor navigation (when open)
    // -------------------------------------------------------------------------

    pub fn cursor(&self) -> usize {
        self.shared
            .inner
            .lock()
            .map(|guard| guard.cursor)
            .unwrap_or(0)
    }

    pub fn set_cursor(&self, index: usize) {
        if let Ok(mut guard) = self.shared.inner.lock() {
            guard.set_cursor(index);
        }
        self.sync_panel();
    }

    pub fn cursor_up(&self) {
        let current = self.cursor();
        if current > 0 {
            self.set_cursor(current - 1);
        }
    }

    pub fn cursor_down(&self) {
        self.set_cursor(self.cursor() + 1);
    }

    pub(super) fn option_at_row(&self, row: u16) -> Option<usize> {
        let guard = self.shared.inner.lock().ok()?;
        let index = guard.scroll + row as usize;
        (index < guard.options.len()).then_some(index)
    }

    pub(super) fn options_len(&self) -> usize {
        self.shared
            .inner
            .lock()
            .map(|guard| guard.options.len())
            .unwrap_or(0)
    }

    /// Push the current rows to the overlay panel.
    fn sync_panel(&self) {
        let content = self
            .shared
            .inner
            .lock()
            .map(|guard| (guard.panel_lines(), guard.content_width()));
        if let Ok((lines, width)) = content {
            self.shared.overlay.set_panel_content(lines, width);
        }
    }
}

impl std::fmt::Debug for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("id", &self.shared.id)
            .field("value", &self.value())
            .field("open", &self.is_open())
            .finish()
    }
}
