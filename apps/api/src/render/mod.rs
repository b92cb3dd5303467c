// Document rendering: the paged drawing surface contract, the assembler
// that drives it from a laid-out document, and the PDF implementation.

pub mod assembler;
pub mod pdf;

// Re-export the public API consumed by other modules (handlers).
pub use assembler::assemble;
pub use pdf::PdfRenderer;

use crate::errors::AppError;

/// Millimeters to PostScript points.
pub const MM_TO_PT: f64 = 2.83465;

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * MM_TO_PT
}

/// A paged drawing surface. All coordinates and sizes are device points;
/// the assembler converts from millimeters before calling.
///
/// One document per instance: pages are opened and advanced in order, then
/// `close` finalizes and returns the encoded bytes. Implementations do not
/// retry; any failure aborts the document build.
pub trait Renderer {
    fn open_page(&mut self, width_pt: f64, height_pt: f64) -> Result<(), AppError>;

    /// Finalizes the current page and opens the next, which may have a
    /// different size.
    fn advance_page(&mut self, width_pt: f64, height_pt: f64) -> Result<(), AppError>;

    /// Draws one vector asset with its bottom-left corner at `(x_pt, y_pt)`,
    /// scaled to `width_pt` x `height_pt`.
    fn draw_asset(
        &mut self,
        bytes: &[u8],
        x_pt: f64,
        y_pt: f64,
        width_pt: f64,
        height_pt: f64,
    ) -> Result<(), AppError>;

    fn close(self) -> Result<Vec<u8>, AppError>
    where
        Self: Sized;
}
