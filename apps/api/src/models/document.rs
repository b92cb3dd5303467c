use serde::Serialize;

/// Exact physical size shared by every asset in one dimension group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionKey {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl DimensionKey {
    /// Output filename for this group's grid sheet, matching the
    /// `stamps_<w>x<h>.pdf` naming of the session output area.
    pub fn output_filename(&self) -> String {
        format!(
            "stamps_{}x{}.pdf",
            self.width_mm as i64, self.height_mm as i64
        )
    }
}

/// One asset drawn at a point on a page. Coordinates are millimeters from
/// the page's bottom-left corner; `width_mm`/`height_mm` is the draw size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Index into the session's asset list snapshot.
    pub asset_index: usize,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// A fixed-size page holding an ordered list of placements.
/// Pages are produced by the coordinator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub width_mm: f64,
    pub height_mm: f64,
    pub placements: Vec<Placement>,
}

impl Page {
    pub fn empty(width_mm: f64, height_mm: f64) -> Self {
        Page {
            width_mm,
            height_mm,
            placements: Vec::new(),
        }
    }
}

/// An ordered sequence of pages: the output artifact of one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub pages: Vec<Page>,
}
