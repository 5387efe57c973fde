//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (held keys, pointer, mouse buttons)
//! - Idle/demo mode driving
//!
//! Storage lives in `crate::persistence`.

pub mod autopilot;
pub mod input;

pub use autopilot::autopilot;
pub use input::{InputState, MouseButton};
