//! Viewport geometry for anchored panels.
//!
//! All coordinates are viewport-relative (fixed positioning): they never
//! depend on where the trigger sits in the widget tree.

/// Gap between a trigger's bottom edge and the top of its panel.
pub const DEFAULT_ANCHOR_OFFSET: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Where a panel hangs from its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnchorRect {
    pub top: u16,
    pub left: u16,
    pub width: u16,
}

impl AnchorRect {
    /// Anchor directly below `trigger`, `offset` units past its bottom edge.
    pub fn below(trigger: Rect, offset: u16) -> Self {
        Self {
            top: trigger.bottom().saturating_add(offset),
            left: trigger.x,
            width: trigger.width,
        }
    }
}

/// Compute the concrete rectangle a panel occupies on screen.
///
/// The panel hangs at `anchor` when it fits. When it would run past the
/// bottom of the viewport it flips above the trigger (keeping the same gap),
/// and if neither side has room it is pinned to the viewport bottom. `x` is
/// clamped so the panel stays on-screen.
///
/// `content` is the panel's preferred `(width, height)`; the width is only
/// used when the anchor has no width of its own (unmeasured trigger).
pub fn place_panel(trigger: Rect, anchor: AnchorRect, content: (u16, u16), viewport: Rect) -> Rect {
    let width = if anchor.width == 0 { content.0 } else { anchor.width };
    let width = width.min(viewport.width);
    let height = content.1.min(viewport.height);

    let y = if anchor.top.saturating_add(height) <= viewport.bottom() {
        anchor.top
    } else {
        let gap = anchor.top.saturating_sub(trigger.bottom());
        let needed = height.saturating_add(gap);
        if trigger.y >= viewport.y.saturating_add(needed) {
            trigger.y - needed
        } else {
            viewport.bottom().saturating_sub(height).max(viewport.y)
        }
    };

    Rect::new(constrain_x(anchor.left, width, viewport), y, width, height)
}

fn constrain_x(x: u16, width: u16, viewport: Rect) -> u16 {
    let max_x = viewport.x + viewport.width.saturating_sub(width);
    x.min(max_x).max(viewport.x)
}
