//! Thin sequencer from a laid-out document to renderer calls.
//!
//! Walks pages in order (open, then advance), issues one draw call per
//! placement in placement order, and closes the renderer for the final
//! bytes. The millimeter-to-point conversion happens here, immediately
//! before the renderer boundary. Fail-fast: the first renderer error aborts
//! the build and no partial document is returned.

use crate::errors::AppError;
use crate::models::asset::StoredAsset;
use crate::models::document::Document;
use crate::render::{mm_to_pt, Renderer};

pub fn assemble<R: Renderer>(
    document: &Document,
    assets: &[StoredAsset],
    mut renderer: R,
) -> Result<Vec<u8>, AppError> {
    for (page_index, page) in document.pages.iter().enumerate() {
        let width_pt = mm_to_pt(page.width_mm);
        let height_pt = mm_to_pt(page.height_mm);
        if page_index == 0 {
            renderer.open_page(width_pt, height_pt)?;
        } else {
            renderer.advance_page(width_pt, height_pt)?;
        }

        for placement in &page.placements {
            let asset = assets.get(placement.asset_index).ok_or_else(|| {
                AppError::Render(format!(
                    "placement references unknown asset index {}",
                    placement.asset_index
                ))
            })?;
            renderer.draw_asset(
                &asset.bytes,
                mm_to_pt(placement.x_mm),
                mm_to_pt(placement.y_mm),
                mm_to_pt(placement.width_mm),
                mm_to_pt(placement.height_mm),
            )?;
        }
    }

    renderer.close()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
