/// Session state and the reducer that mutates it
///
/// The store holds the habit collection and transient UI state; the
/// controller turns user actions into store mutations plus effects.

pub mod action;
pub mod controller;
pub mod store;

pub use action::*;
pub use controller::{reduce, stage_import, Effect};
pub use store::*;
