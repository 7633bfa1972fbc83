//! Geometry: row offsets, viewport windowing, column widths.

mod columns;
mod rows;
mod viewport;

pub use columns::{ColumnLayout, LayoutStore, MemoryStore, ResizeSession};
pub use rows::{RowHeightFn, RowLayout};
pub use viewport::{Viewport, VisibleWindow};
