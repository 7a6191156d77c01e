//! Top-level surface layer.
//!
//! Floating panels are not children of the widget that owns them. They are
//! attached here, painted after all regular content, and hit-tested before
//! it. A [`SurfaceLease`] owns the slot; dropping it detaches the surface.

use std::sync::{Arc, Mutex, Weak};

use log::trace;

use crate::event::{EventResult, InputEvent};
use crate::geometry::Rect;

/// Handler for events landing on a surface. Receives the event and the
/// position relative to the surface's top-left corner.
pub type SurfaceHandler = dyn Fn(&InputEvent, u16, u16) -> EventResult + Send + Sync;

/// One painted row of a surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SurfaceLine {
    pub text: String,
    /// Row under the keyboard cursor.
    pub highlighted: bool,
    /// Row holding the current value.
    pub selected: bool,
    /// Informational row (e.g. an empty-state message).
    pub muted: bool,
}

impl SurfaceLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn muted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            muted: true,
            ..Default::default()
        }
    }
}

/// Snapshot of an attached surface, for painting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub id: u64,
    pub owner: String,
    pub area: Rect,
    pub lines: Vec<SurfaceLine>,
}

struct Slot {
    surface: Surface,
    handler: Option<Arc<SurfaceHandler>>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    slots: Vec<Slot>,
}

/// Registry of top-level surfaces, bottom to top in attach order.
#[derive(Clone, Default)]
pub struct SurfaceRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a surface above everything attached so far.
    #[must_use = "the surface is detached when the lease is dropped"]
    pub fn attach(
        &self,
        owner: impl Into<String>,
        area: Rect,
        lines: Vec<SurfaceLine>,
        handler: Option<Arc<SurfaceHandler>>,
    ) -> SurfaceLease {
        let owner = owner.into();
        let mut id = 0;

        if let Ok(mut inner) = self.inner.lock() {
            inner.next_id += 1;
            id = inner.next_id;
            trace!("attached surface {id} for {owner} at {area:?}");
            inner.slots.push(Slot {
                surface: Surface {
                    id,
                    owner,
                    area,
                    lines,
                },
                handler,
            });
        }

        SurfaceLease {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// All attached surfaces, bottom to top.
    pub fn surfaces(&self) -> Vec<Surface> {
        self.inner
            .lock()
            .map(|inner| inner.slots.iter().map(|s| s.surface.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Topmost surface containing the point.
    pub fn hit(&self, x: u16, y: u16) -> Option<Surface> {
        let inner = self.inner.lock().ok()?;
        inner
            .slots
            .iter()
            .rev()
            .find(|s| s.surface.area.contains(x, y))
            .map(|s| s.surface.clone())
    }

    /// Deliver a positioned event to the topmost surface under it.
    ///
    /// Returns `None` when no surface contains the point. The handler runs
    /// without the registry lock held.
    pub(crate) fn deliver(&self, event: &InputEvent, x: u16, y: u16) -> Option<EventResult> {
        let (area, handler) = {
            let inner = self.inner.lock().ok()?;
            let slot = inner
                .slots
                .iter()
                .rev()
                .find(|s| s.surface.area.contains(x, y))?;
            (slot.surface.area, slot.handler.clone())
        };

        Some(match handler {
            Some(handler) => handler(event, x - area.x, y - area.y),
            None => EventResult::Ignored,
        })
    }

    fn update(&self, id: u64, area: Rect, lines: Vec<SurfaceLine>) {
        if let Ok(mut inner) = self.inner.lock()
            && let Some(slot) = inner.slots.iter_mut().find(|s| s.surface.id == id)
        {
            slot.surface.area = area;
            slot.surface.lines = lines;
        }
    }
}

/// Ownership of one surface slot. Detaches the surface on drop.
pub struct SurfaceLease {
    id: u64,
    registry: Weak<Mutex<Inner>>,
}

impl SurfaceLease {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Replace the surface's area and content in place (keeps its z-order).
    pub fn update(&self, area: Rect, lines: Vec<SurfaceLine>) {
        if let Some(inner) = self.registry.upgrade() {
            SurfaceRegistry { inner }.update(self.id, area, lines);
        }
    }
}

impl std::fmt::Debug for SurfaceLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceLease").field("id", &self.id).finish()
    }
}

impl Drop for SurfaceLease {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade()
            && let Ok(mut inner) = registry.lock()
        {
            inner.slots.retain(|s| s.surface.id != self.id);
            trace!("detached surface {}", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MouseButton;

    fn click(x: u16, y: u16) -> InputEvent {
        InputEvent::PointerDown {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_lease_drop_detaches() {
        let registry = SurfaceRegistry::new();
        let lease = registry.attach("a", Rect::new(0, 0, 5, 5), Vec::new(), None);
        assert_eq!(registry.len(), 1);
        drop(lease);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_hit_prefers_topmost() {
        let registry = SurfaceRegistry::new();
        let _below = registry.attach("below", Rect::new(0, 0, 10, 10), Vec::new(), None);
        let _above = registry.attach("above", Rect::new(5, 5, 10, 10), Vec::new(), None);

        assert_eq!(registry.hit(7, 7).map(|s| s.owner), Some("above".to_string()));
        assert_eq!(registry.hit(1, 1).map(|s| s.owner), Some("below".to_string()));
        assert_eq!(registry.hit(30, 30), None);
    }

    #[test]
    fn test_deliver_uses_local_coordinates() {
        let registry = SurfaceRegistry::new();
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        let handler: Arc<SurfaceHandler> = Arc::new(move |_: &InputEvent, x: u16, y: u16| {
            *s.lock().unwrap() = Some((x, y));
            EventResult::Consumed
        });
        let _lease = registry.attach("panel", Rect::new(10, 4, 8, 3), Vec::new(), Some(handler));

        assert_eq!(registry.deliver(&click(12, 6), 12, 6), Some(EventResult::Consumed));
        assert_eq!(*seen.lock().unwrap(), Some((2, 2)));
        assert_eq!(registry.deliver(&click(0, 0), 0, 0), None);
    }

    #[test]
    fn test_update_keeps_order() {
        let registry = SurfaceRegistry::new();
        let first = registry.attach("first", Rect::new(0, 0, 1, 1), Vec::new(), None);
        let _second = registry.attach("second", Rect::new(0, 0, 1, 1), Vec::new(), None);

        first.update(Rect::new(2, 2, 4, 1), vec![SurfaceLine::new("row")]);
        let surfaces = registry.surfaces();
        assert_eq!(surfaces[0].owner, "first");
        assert_eq!(surfaces[0].area, Rect::new(2, 2, 4, 1));
        assert_eq!(surfaces[0].lines[0].text, "row");
    }
}
