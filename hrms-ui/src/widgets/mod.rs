//! Widgets built on the interaction core.

pub mod select;

pub use select::{Select, SelectId, SelectOption};
