// Grid layout engine: packs same-size stamps into rows and columns on a
// fixed sheet and paginates overflow. Pure and deterministic; CPU-bound
// callers run it inside tokio::task::spawn_blocking.

pub mod grid;

// Re-export the public API consumed by other modules (compose, handlers).
pub use grid::{layout_grid, CellPlacement, GridLayout, GridParams};

/// Fixed grid-mode sheet size: landscape A4, in millimeters.
pub const SHEET_WIDTH_MM: f64 = 297.0;
pub const SHEET_HEIGHT_MM: f64 = 210.0;
