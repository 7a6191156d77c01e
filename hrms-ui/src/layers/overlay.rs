//! Overlay controller for floating panels.
//!
//! An overlay is a panel anchored below a trigger. While it is open it owns:
//!
//! - a slot on the screen's top-level surface layer (the panel itself, so
//!   nothing in the trigger's subtree can clip or reposition it)
//! - three screen listeners: outside pointer-down, scroll (capture phase, so
//!   nested scroll areas dismiss it too) and resize
//!
//! All of these are guards stored in the controller. Closing, or dropping the
//! last handle (unmount), drops them, so repeated open/close cycles never
//! accumulate listeners.
//!
//! # Example
//!
//! ```ignore
//! let trigger = TriggerHandle::new();
//! let overlay = OverlayController::new(&screen, trigger.clone());
//!
//! // During layout:
//! trigger.set_rect(Rect::new(4, 2, 30, 1));
//!
//! overlay.open(); // anchor = { top: 7, left: 4, width: 30 }
//! overlay.open(); // second activation closes it again
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use log::debug;

use crate::event::{EventKind, InputEvent, Propagation};
use crate::geometry::{AnchorRect, DEFAULT_ANCHOR_OFFSET, Rect, place_panel};
use crate::screen::{ListenerGuard, Phase, Screen, SurfaceHandler, SurfaceLease, SurfaceLine};

/// Unique identifier for an overlay instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(usize);

impl OverlayId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__overlay_{}", self.0)
    }
}

/// The trigger's current bounding box, kept up to date by layout.
///
/// `None` means the trigger is detached or has not been laid out yet.
#[derive(Debug, Clone, Default)]
pub struct TriggerHandle {
    rect: Arc<RwLock<Option<Rect>>>,
}

impl TriggerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where the trigger was laid out.
    pub fn set_rect(&self, rect: Rect) {
        if let Ok(mut guard) = self.rect.write() {
            *guard = Some(rect);
        }
    }

    /// Mark the trigger as detached.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.rect.write() {
            *guard = None;
        }
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect.read().map(|guard| *guard).unwrap_or(None)
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.rect().is_some_and(|r| r.contains(x, y))
    }
}

/// Why an overlay went from open to closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// Pointer-down outside the trigger and panel.
    OutsidePointer,
    /// Scroll anywhere outside the panel.
    Scroll,
    /// Viewport resized.
    Resize,
    /// An option was chosen.
    Selection,
    /// The trigger was activated while open.
    Toggle,
    /// `close()` called by the owner.
    Explicit,
}

/// Observable overlay state. `anchor` is only meaningful while `is_open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayState {
    pub is_open: bool,
    pub anchor: AnchorRect,
}

type DismissHook = dyn Fn(DismissReason) + Send + Sync;

#[derive(Default)]
struct Inner {
    state: OverlayState,
    /// Trigger rect measured at the moment of opening.
    trigger_rect: Rect,
    listeners: Vec<ListenerGuard>,
    panel: Option<SurfaceLease>,
    panel_lines: Vec<SurfaceLine>,
    panel_width: u16,
    panel_handler: Option<Arc<SurfaceHandler>>,
    on_dismiss: Option<Arc<DismissHook>>,
}

/// Open/close/position state machine for a floating panel.
///
/// Clones share state, like the widget handles that own them.
#[derive(Clone)]
pub struct OverlayController {
    id: OverlayId,
    screen: Screen,
    trigger: TriggerHandle,
    offset: u16,
    inner: Arc<Mutex<Inner>>,
}

impl OverlayController {
    /// Create a closed overlay for `trigger` on `screen`.
    pub fn new(screen: &Screen, trigger: TriggerHandle) -> Self {
        Self {
            id: OverlayId::new(),
            screen: screen.clone(),
            trigger,
            offset: DEFAULT_ANCHOR_OFFSET,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Set the gap between the trigger's bottom edge and the panel.
    pub fn with_offset(mut self, offset: u16) -> Self {
        self.offset = offset;
        self
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn trigger(&self) -> &TriggerHandle {
        &self.trigger
    }

    pub fn state(&self) -> OverlayState {
        self.inner
            .lock()
            .map(|guard| guard.state)
            .unwrap_or_default()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open
    }

    /// The anchor computed at the last open, while open.
    pub fn anchor(&self) -> Option<AnchorRect> {
        let state = self.state();
        state.is_open.then_some(state.anchor)
    }

    /// Screen area the panel currently occupies, while open.
    pub fn panel_area(&self) -> Option<Rect> {
        let guard = self.inner.lock().ok()?;
        guard.state.is_open.then(|| self.compute_area(&guard))
    }

    /// Called once per open→closed transition.
    pub fn set_on_dismiss(&self, hook: impl Fn(DismissReason) + Send + Sync + 'static) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.on_dismiss = Some(Arc::new(hook));
        }
    }

    /// Handler for events landing on the panel. Pointer-downs on the panel
    /// never reach the screen listeners, whatever the handler returns.
    pub fn set_panel_handler(&self, handler: Arc<SurfaceHandler>) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.panel_handler = Some(handler);
        }
    }

    /// Replace the panel rows. `width` is the preferred width, used only when
    /// the trigger could not be measured.
    pub fn set_panel_content(&self, lines: Vec<SurfaceLine>, width: u16) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.panel_lines = lines;
            guard.panel_width = width;
            if let Some(panel) = &guard.panel {
                panel.update(self.compute_area(&guard), guard.panel_lines.clone());
            }
        }
    }

    /// Activate the trigger.
    ///
    /// When closed: measure the trigger now, anchor below it, attach the
    /// panel and start listening for dismissal. When already open this acts
    /// as [`close`](Self::close), so a single activation toggles.
    ///
    /// An unmeasurable trigger is not an error; the anchor is computed from
    /// an empty rect instead. Returns whether the overlay is open afterwards.
    pub fn open(&self) -> bool {
        if self.is_open() {
            self.dismiss(DismissReason::Toggle);
            return false;
        }

        let trigger_rect = self.trigger.rect().unwrap_or_else(|| {
            debug!("overlay {} opened with unmeasurable trigger", self.id);
            Rect::default()
        });
        let anchor = AnchorRect::below(trigger_rect, self.offset);
        let listeners = self.dismissal_listeners();

        let Ok(mut guard) = self.inner.lock() else {
            return false;
        };
        guard.state = OverlayState {
            is_open: true,
            anchor,
        };
        guard.trigger_rect = trigger_rect;
        guard.listeners = listeners;

        let area = self.compute_area(&guard);
        guard.panel = Some(self.screen.surfaces().attach(
            self.id.to_string(),
            area,
            guard.panel_lines.clone(),
            guard.panel_handler.clone(),
        ));
        debug!("overlay {} opened at {:?}", self.id, anchor);
        true
    }

    /// Close the overlay. No-op when already closed.
    pub fn close(&self) {
        self.dismiss(DismissReason::Explicit);
    }

    /// Close with a reason. Returns `false` when it was already closed.
    pub fn dismiss(&self, reason: DismissReason) -> bool {
        dismiss(&self.inner, self.id, reason)
    }

    fn compute_area(&self, inner: &Inner) -> Rect {
        let height = inner.panel_lines.len().min(u16::MAX as usize) as u16;
        place_panel(
            inner.trigger_rect,
            inner.state.anchor,
            (inner.panel_width, height),
            self.screen.viewport(),
        )
    }

    fn dismissal_listeners(&self) -> Vec<ListenerGuard> {
        let listeners = self.screen.listeners();
        let id = self.id;

        let weak = Arc::downgrade(&self.inner);
        let trigger = self.trigger.clone();
        let outside = listeners.register(EventKind::PointerDown, Phase::Bubble, move |event| {
            if let InputEvent::PointerDown { x, y, .. } = *event
                && !trigger.contains(x, y)
            {
                dismiss_weak(&weak, id, DismissReason::OutsidePointer);
            }
            Propagation::Continue
        });

        let weak = Arc::downgrade(&self.inner);
        let scroll = listeners.register(EventKind::Scroll, Phase::Capture, move |_| {
            dismiss_weak(&weak, id, DismissReason::Scroll);
            Propagation::Continue
        });

        let weak = Arc::downgrade(&self.inner);
        let resize = listeners.register(EventKind::Resize, Phase::Bubble, move |_| {
            dismiss_weak(&weak, id, DismissReason::Resize);
            Propagation::Continue
        });

        vec![outside, scroll, resize]
    }
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

fn dismiss_weak(inner: &Weak<Mutex<Inner>>, id: OverlayId, reason: DismissReason) {
    if let Some(inner) = inner.upgrade() {
        dismiss(&inner, id, reason);
    }
}

/// Transition to closed. Guards and the panel lease are dropped after the
/// state lock is released, and the hook runs last.
fn dismiss(inner: &Mutex<Inner>, id: OverlayId, reason: DismissReason) -> bool {
    let (listeners, panel, hook) = {
        let Ok(mut guard) = inner.lock() else {
            return false;
        };
        if !guard.state.is_open {
            return false;
        }
        guard.state.is_open = false;
        (
            std::mem::take(&mut guard.listeners),
            guard.panel.take(),
            guard.on_dismiss.clone(),
        )
    };
    drop(listeners);
    drop(panel);

    debug!("overlay {id} closed ({reason:?})");
    if let Some(hook) = hook {
        hook(reason);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MouseButton;

    fn setup() -> (Screen, TriggerHandle, OverlayController) {
        let screen = Screen::new(80, 24);
        let trigger = TriggerHandle::new();
        trigger.set_rect(Rect::new(10, 2, 20, 1));
        let overlay = OverlayController::new(&screen, trigger.clone());
        (screen, trigger, overlay)
    }

    #[test]
    fn test_open_computes_anchor() {
        let (_screen, _trigger, overlay) = setup();
        assert!(overlay.open());
        assert_eq!(
            overlay.anchor(),
            Some(AnchorRect {
                top: 7,
                left: 10,
                width: 20
            })
        );
    }

    #[test]
    fn test_closed_overlay_has_no_anchor() {
        let (_screen, _trigger, overlay) = setup();
        assert_eq!(overlay.anchor(), None);
        assert_eq!(overlay.panel_area(), None);
    }

    #[test]
    fn test_open_while_open_toggles_closed() {
        let (screen, _trigger, overlay) = setup();
        overlay.open();
        assert!(!overlay.open());
        assert!(!overlay.is_open());
        assert!(screen.listeners().is_empty());
        assert!(screen.surfaces().is_empty());
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let (_screen, _trigger, overlay) = setup();
        overlay.close();
        assert!(!overlay.dismiss(DismissReason::Explicit));
    }

    #[test]
    fn test_panel_handler_consumes_clicks() {
        let (screen, _trigger, overlay) = setup();
        overlay.set_panel_content(vec![SurfaceLine::new("a"), SurfaceLine::new("b")], 10);
        overlay.open();

        let area = overlay.panel_area().unwrap();
        screen.dispatch(&InputEvent::PointerDown {
            x: area.x,
            y: area.y,
            button: MouseButton::Left,
        });
        assert!(overlay.is_open());
    }

    #[test]
    fn test_content_update_resizes_panel() {
        let (screen, _trigger, overlay) = setup();
        overlay.open();
        overlay.set_panel_content(vec![SurfaceLine::new("a"); 3], 10);
        assert_eq!(screen.surfaces().surfaces()[0].area.height, 3);
    }
}
