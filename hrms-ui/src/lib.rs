//! Interaction core for the HRMS admin screens.
//!
//! Two state machines live here:
//!
//! - [`OverlayController`](layers::overlay::OverlayController): the open/close
//!   lifecycle, positioning and dismissal of a floating panel anchored to a
//!   trigger. Panels are painted on the [`Screen`](screen::Screen)'s top-level
//!   surface layer, never inside their owner.
//! - [`EditSessions`](edit::EditSessions): the "one editable row at a time"
//!   holder that brokers a draft through an asynchronous save.
//!
//! The [`Select`](widgets::Select) dropdown is the primary consumer of the
//! overlay controller.

pub mod alert;
pub mod edit;
pub mod event;
pub mod geometry;
pub mod layers;
pub mod screen;
pub mod widgets;

pub use alert::{Alert, AlertLevel, AlertQueue, AlertSink};
pub use edit::{ConfirmOutcome, EditSession, EditSessions, EditableRow, RowStore};
pub use event::{EventKind, EventResult, InputEvent, Key, Modifiers, MouseButton, Propagation};
pub use geometry::{AnchorRect, Rect};
pub use layers::overlay::{DismissReason, OverlayController, OverlayState, TriggerHandle};
pub use screen::{Phase, Screen, Surface, SurfaceLine};
pub use widgets::{Select, SelectOption};
