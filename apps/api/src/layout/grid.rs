//! Grid packing of same-size stamps onto fixed-size sheets.
#![allow(dead_code)]
//!
//! Given a sheet size, margins, and one stamp dimension, computes the
//! column/row capacity and a page/cell position for every stamp index.
//! Coordinates are millimeters from the sheet's bottom-left corner, the
//! convention of the PDF coordinate system the renderer consumes. Row 0 is
//! the **top** visual row, so cell y positions count down from the top of
//! the printable area.

use serde::Serialize;

use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Inputs to one grid computation. All values are millimeters.
#[derive(Debug, Clone, Copy)]
pub struct GridParams {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    /// Uniform inset subtracted from all four page edges before packing.
    pub page_margin_mm: f64,
    /// Extra spacing applied around each stamp within its grid cell.
    pub cell_margin_mm: f64,
    pub item_width_mm: f64,
    pub item_height_mm: f64,
}

impl GridParams {
    fn cell_width(&self) -> f64 {
        self.item_width_mm + 2.0 * self.cell_margin_mm
    }

    fn cell_height(&self) -> f64 {
        self.item_height_mm + 2.0 * self.cell_margin_mm
    }

    fn usable_width(&self) -> f64 {
        self.page_width_mm - 2.0 * self.page_margin_mm
    }

    fn usable_height(&self) -> f64 {
        self.page_height_mm - 2.0 * self.page_margin_mm
    }
}

/// Where one stamp lands: which page, which grid cell, and the stamp's
/// bottom-left corner on that page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellPlacement {
    pub page_index: usize,
    pub column: u32,
    pub row: u32,
    pub x_mm: f64,
    pub y_mm: f64,
}

/// Result of one grid computation: the grid capacity plus one placement per
/// stamp, in stamp order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub items_per_page: usize,
    /// Number of pages the caller must emit. At least 1: the terminal page
    /// flush produces one (possibly empty) page even for zero stamps.
    pub page_count: usize,
    pub placements: Vec<CellPlacement>,
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Computes the grid packing for `item_count` stamps of one dimension.
///
/// Pages fill completely before advancing: stamp `i` lands on page
/// `i / items_per_page` at the `i % items_per_page`-th cell, filling each
/// row left to right, rows top to bottom.
///
/// Fails with `LayoutInfeasible` when the stamp (with its cell margin) does
/// not fit the printable area even once; no partial placement is produced.
pub fn layout_grid(params: &GridParams, item_count: usize) -> Result<GridLayout, AppError> {
    let cell_w = params.cell_width();
    let cell_h = params.cell_height();

    // A negative usable extent divides to a negative ratio; `as u32`
    // saturates that to zero columns/rows, which is the infeasible case.
    let columns = (params.usable_width() / cell_w).floor() as u32;
    let rows = (params.usable_height() / cell_h).floor() as u32;

    if columns == 0 || rows == 0 {
        return Err(AppError::LayoutInfeasible(format!(
            "stamp {}x{}mm with {}mm cell margin does not fit a {}x{}mm sheet with {}mm page margin",
            params.item_width_mm,
            params.item_height_mm,
            params.cell_margin_mm,
            params.page_width_mm,
            params.page_height_mm,
            params.page_margin_mm,
        )));
    }

    let items_per_page = columns as usize * rows as usize;

    let mut placements = Vec::with_capacity(item_count);
    for i in 0..item_count {
        let page_index = i / items_per_page;
        let p = i % items_per_page;
        let column = (p % columns as usize) as u32;
        let row = ((p / columns as usize) % rows as usize) as u32;

        let x_mm = params.page_margin_mm + f64::from(column) * cell_w + params.cell_margin_mm;
        // Row 0 occupies the topmost band of the printable area.
        let y_mm = params.page_margin_mm + f64::from(rows - row - 1) * cell_h + params.cell_margin_mm;

        placements.push(CellPlacement {
            page_index,
            column,
            row,
            x_mm,
            y_mm,
        });
    }

    let page_count = if item_count == 0 {
        1
    } else {
        (item_count + items_per_page - 1) / items_per_page
    };

    Ok(GridLayout {
        columns,
        rows,
        items_per_page,
        page_count,
        placements,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn sheet_params(item_w: f64, item_h: f64, page_margin: f64, cell_margin: f64) -> GridParams {
        GridParams {
            page_width_mm: 297.0,
            page_height_mm: 210.0,
            page_margin_mm: page_margin,
            cell_margin_mm: cell_margin,
            item_width_mm: item_w,
            item_height_mm: item_h,
        }
    }

    #[test]
    fn test_99mm_squares_pack_3_by_2() {
        // 297/99 = 3 columns, 210/99 = 2 rows → 6 per page; the 7th stamp
        // opens page 2 at the top-left cell.
        let layout = layout_grid(&sheet_params(99.0, 99.0, 0.0, 0.0), 7).unwrap();
        assert_eq!(layout.columns, 3);
        assert_eq!(layout.rows, 2);
        assert_eq!(layout.items_per_page, 6);
        assert_eq!(layout.page_count, 2);

        let seventh = &layout.placements[6];
        assert_eq!(seventh.page_index, 1);
        assert_eq!(seventh.column, 0);
        assert_eq!(seventh.row, 0);
        assert_eq!(seventh.x_mm, 0.0);
        assert_eq!(seventh.y_mm, 99.0);
    }

    #[test]
    fn test_oversized_stamp_is_infeasible() {
        let err = layout_grid(&sheet_params(400.0, 50.0, 0.0, 0.0), 1).unwrap_err();
        assert!(matches!(err, AppError::LayoutInfeasible(_)));
    }

    #[test]
    fn test_too_tall_stamp_is_infeasible() {
        let err = layout_grid(&sheet_params(50.0, 300.0, 0.0, 0.0), 1).unwrap_err();
        assert!(matches!(err, AppError::LayoutInfeasible(_)));
    }

    #[test]
    fn test_margins_can_push_a_fitting_stamp_out() {
        // 200mm stamp fits a 297mm sheet, but not once 50mm page margins
        // shrink the usable width to 197mm.
        let err = layout_grid(&sheet_params(200.0, 50.0, 50.0, 0.0), 1).unwrap_err();
        assert!(matches!(err, AppError::LayoutInfeasible(_)));
    }

    #[test]
    fn test_zero_items_still_yields_one_page() {
        let layout = layout_grid(&sheet_params(40.0, 15.0, 1.4, 1.0), 0).unwrap();
        assert!(layout.placements.is_empty());
        assert_eq!(layout.page_count, 1);
    }

    #[test]
    fn test_full_page_does_not_spill() {
        let layout = layout_grid(&sheet_params(99.0, 99.0, 0.0, 0.0), 6).unwrap();
        assert_eq!(layout.page_count, 1);
        assert!(layout.placements.iter().all(|p| p.page_index == 0));
    }

    #[test]
    fn test_page_count_is_ceiling_of_items_over_capacity() {
        // 6 per page: 13 stamps → 3 pages, last page holds 1.
        let layout = layout_grid(&sheet_params(99.0, 99.0, 0.0, 0.0), 13).unwrap();
        assert_eq!(layout.page_count, 3);
        let last_page_items = layout
            .placements
            .iter()
            .filter(|p| p.page_index == 2)
            .count();
        assert_eq!(last_page_items, 1);
    }

    #[test]
    fn test_margins_offset_coordinates() {
        // Usable 277x190, cell 50x25 → 5 columns, 7 rows.
        let params = sheet_params(40.0, 15.0, 10.0, 5.0);
        let layout = layout_grid(&params, 1).unwrap();
        assert_eq!(layout.columns, 5);
        assert_eq!(layout.rows, 7);

        let first = &layout.placements[0];
        assert_eq!(first.x_mm, 15.0); // page margin + cell margin
        assert_eq!(first.y_mm, 10.0 + 6.0 * 25.0 + 5.0); // top row
    }

    #[test]
    fn test_row_zero_is_the_top_row() {
        // 2 rows of 99mm cells: row 0 sits at y = 99, row 1 at y = 0.
        let layout = layout_grid(&sheet_params(99.0, 99.0, 0.0, 0.0), 6).unwrap();
        let row0 = layout.placements.iter().find(|p| p.row == 0).unwrap();
        let row1 = layout.placements.iter().find(|p| p.row == 1).unwrap();
        assert_eq!(row0.y_mm, 99.0);
        assert_eq!(row1.y_mm, 0.0);
        assert!(row0.y_mm > row1.y_mm, "rows must descend visually");
    }

    #[test]
    fn test_identical_inputs_give_identical_layouts() {
        let params = sheet_params(40.0, 15.0, 1.4, 1.0);
        let a = layout_grid(&params, 23).unwrap();
        let b = layout_grid(&params, 23).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_placements_walk_left_to_right_top_to_bottom() {
        let layout = layout_grid(&sheet_params(99.0, 99.0, 0.0, 0.0), 6).unwrap();
        let cells: Vec<(u32, u32)> = layout.placements.iter().map(|p| (p.row, p.column)).collect();
        assert_eq!(
            cells,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            .. ProptestConfig::default()
        })]

        /// The grid never reserves more area than the printable region offers.
        #[test]
        fn property_grid_fits_usable_area(
            page_w in 50u32..600,
            page_h in 50u32..600,
            margin in 0u32..=10,
            cell_margin in 0u32..=5,
            item_w in 5u32..=150,
            item_h in 5u32..=150,
        ) {
            let params = GridParams {
                page_width_mm: f64::from(page_w),
                page_height_mm: f64::from(page_h),
                page_margin_mm: f64::from(margin),
                cell_margin_mm: f64::from(cell_margin),
                item_width_mm: f64::from(item_w),
                item_height_mm: f64::from(item_h),
            };

            if let Ok(layout) = layout_grid(&params, 1) {
                let cell_w = f64::from(item_w) + 2.0 * f64::from(cell_margin);
                let cell_h = f64::from(item_h) + 2.0 * f64::from(cell_margin);
                let usable_w = f64::from(page_w) - 2.0 * f64::from(margin);
                let usable_h = f64::from(page_h) - 2.0 * f64::from(margin);
                let reserved =
                    f64::from(layout.columns) * cell_w * f64::from(layout.rows) * cell_h;
                prop_assert!(reserved <= usable_w * usable_h + 1e-6);
            }
        }

        /// Per page, placed stamps stay inside the printable area and never
        /// overlap each other.
        #[test]
        fn property_placements_disjoint_and_in_bounds(
            margin in 0u32..=10,
            cell_margin in 0u32..=5,
            item_w in 5u32..=150,
            item_h in 5u32..=150,
            count in 0usize..40,
        ) {
            let params = GridParams {
                page_width_mm: 297.0,
                page_height_mm: 210.0,
                page_margin_mm: f64::from(margin),
                cell_margin_mm: f64::from(cell_margin),
                item_width_mm: f64::from(item_w),
                item_height_mm: f64::from(item_h),
            };

            let layout = match layout_grid(&params, count) {
                Ok(layout) => layout,
                Err(_) => return Ok(()), // infeasible inputs carry no placements
            };

            let (w, h) = (f64::from(item_w), f64::from(item_h));
            let lo = f64::from(margin) - 1e-9;
            for p in &layout.placements {
                prop_assert!(p.x_mm >= lo && p.x_mm + w <= 297.0 - f64::from(margin) + 1e-9);
                prop_assert!(p.y_mm >= lo && p.y_mm + h <= 210.0 - f64::from(margin) + 1e-9);
            }

            for (i, a) in layout.placements.iter().enumerate() {
                for b in layout.placements.iter().skip(i + 1) {
                    if a.page_index != b.page_index {
                        continue;
                    }
                    let disjoint = a.x_mm + w <= b.x_mm + 1e-9
                        || b.x_mm + w <= a.x_mm + 1e-9
                        || a.y_mm + h <= b.y_mm + 1e-9
                        || b.y_mm + h <= a.y_mm + 1e-9;
                    prop_assert!(disjoint, "stamps {a:?} and {b:?} overlap");
                }
            }
        }
    }
}
