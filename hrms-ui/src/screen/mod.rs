//! The process-wide top-level container.
//!
//! A [`Screen`] is the equivalent of a document root: it knows the viewport
//! size, holds the screen-level listeners and the top-level surface layer,
//! and is the single entry point for routing input.

mod listeners;
mod surfaces;

use std::sync::{Arc, RwLock};

use log::trace;

pub use listeners::{ListenerFn, ListenerGuard, ListenerRegistry, Phase};
pub use surfaces::{Surface, SurfaceHandler, SurfaceLease, SurfaceLine, SurfaceRegistry};

use crate::event::{EventResult, InputEvent, Propagation};
use crate::geometry::Rect;

struct ScreenInner {
    viewport: RwLock<Rect>,
    listeners: ListenerRegistry,
    surfaces: SurfaceRegistry,
}

/// Shared handle to the top-level container. Cheap to clone.
#[derive(Clone)]
pub struct Screen {
    inner: Arc<ScreenInner>,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            inner: Arc::new(ScreenInner {
                viewport: RwLock::new(Rect::from_size(width, height)),
                listeners: ListenerRegistry::new(),
                surfaces: SurfaceRegistry::new(),
            }),
        }
    }

    pub fn viewport(&self) -> Rect {
        self.inner
            .viewport
            .read()
            .map(|guard| *guard)
            .unwrap_or_default()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.inner.listeners
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.inner.surfaces
    }

    /// Route one input event.
    ///
    /// - A pointer-down on a surface goes to that surface and never reaches
    ///   the screen listeners.
    /// - A scroll on a surface goes to that surface first; it only reaches
    ///   the listeners if the surface ignored it.
    /// - A resize updates the viewport before listeners run.
    ///
    /// Everything else runs capture then bubble listeners. Returns
    /// `Consumed` when a surface handled the event or a listener stopped it;
    /// `Ignored` means the caller should route it to regular content.
    pub fn dispatch(&self, event: &InputEvent) -> EventResult {
        match *event {
            InputEvent::PointerDown { x, y, .. } => {
                if self.surfaces().deliver(event, x, y).is_some() {
                    trace!("pointer-down at ({x}, {y}) stopped at surface");
                    return EventResult::Consumed;
                }
            }
            InputEvent::Scroll { x, y, .. } => {
                if let Some(EventResult::Consumed) = self.surfaces().deliver(event, x, y) {
                    return EventResult::Consumed;
                }
            }
            InputEvent::Resize { width, height } => {
                if let Ok(mut viewport) = self.inner.viewport.write() {
                    *viewport = Rect::from_size(width, height);
                }
            }
            InputEvent::Key { .. } => {}
        }

        match self.listeners().dispatch(event) {
            Propagation::Stop => EventResult::Consumed,
            Propagation::Continue => EventResult::Ignored,
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("viewport", &self.viewport())
            .field("listeners", &self.listeners().len())
            .field("surfaces", &self.surfaces().len())
            .finish()
    }
}
