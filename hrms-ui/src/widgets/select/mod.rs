//! Dropdown select widget.
//!
//! The trigger is drawn by the host; the option panel lives on the screen's
//! surface layer and is managed by an [`OverlayController`](crate::layers::overlay::OverlayController).

mod events;
mod state;

pub use state::{ChangeHandler, EMPTY_LABEL, MAX_PANEL_ROWS, Select, SelectId, SelectOption};
