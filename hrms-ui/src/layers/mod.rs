//! Layers rendered above regular content.

pub mod overlay;

pub use overlay::{DismissReason, OverlayController, OverlayId, OverlayState, TriggerHandle};
