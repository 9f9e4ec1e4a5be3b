//! Window manager core for the PaperClip desk.
//!
//! [`WindowHost`] owns every open window record and is the only place they
//! change. The frame module maps pointer input on a window's chrome onto
//! host operations. Nothing here performs I/O or knows how windows are drawn.

mod frame;
mod host;
mod model;

pub use frame::{FrameLayout, FrameRegion, Gesture, PointerOutcome, DOUBLE_CLICK};
pub use host::{TaskbarEntry, WindowHost};
pub use model::{
    defaults_for, PanelKind, Point, Rect, Size, ToolKind, WindowDefaults, WindowId, WindowRecord,
    CASCADE_BASE, CASCADE_STEP, GENERIC_SIZE, MIN_HEIGHT, MIN_WIDTH,
};
