//! Pagination coordinator: turns a session's asset list into documents.
#![allow(dead_code)]
//!
//! Grid mode groups assets by exact physical dimension and lays each group
//! out onto fixed-size sheets via the grid engine, one sub-document per
//! dimension. Individual mode emits one page per asset, sized to the asset.
//!
//! Group order is first-seen upload order; order *within* a group is store
//! order (upload sequence) and determines cell placement order.

use crate::errors::AppError;
use crate::layout::grid::{layout_grid, GridParams};
use crate::models::asset::StoredAsset;
use crate::models::document::{DimensionKey, Document, Page, Placement};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Sheet geometry for grid mode. Millimeters throughout.
#[derive(Debug, Clone, Copy)]
pub struct SheetConfig {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub page_margin_mm: f64,
    pub cell_margin_mm: f64,
}

/// One dimension group's laid-out sheet run.
#[derive(Debug, Clone)]
pub struct GridDocument {
    pub key: DimensionKey,
    pub columns: u32,
    pub rows: u32,
    pub document: Document,
}

// ────────────────────────────────────────────────────────────────────────────
// Grouping
// ────────────────────────────────────────────────────────────────────────────

/// Groups asset indices by exact `(width_mm, height_mm)`.
///
/// Groups appear in first-seen order; members keep the input order. Both
/// orderings are stable and load-bearing: members drive cell placement
/// order, and the first group is the one whose sheet the grid endpoint
/// returns as its response body.
pub fn group_by_dimension(assets: &[StoredAsset]) -> Vec<(DimensionKey, Vec<usize>)> {
    let mut groups: Vec<(DimensionKey, Vec<usize>)> = Vec::new();
    for (index, asset) in assets.iter().enumerate() {
        let key = DimensionKey {
            width_mm: asset.width_mm,
            height_mm: asset.height_mm,
        };
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(index),
            None => groups.push((key, vec![index])),
        }
    }
    groups
}

// ────────────────────────────────────────────────────────────────────────────
// Grid mode
// ────────────────────────────────────────────────────────────────────────────

/// Builds one grid sub-document per dimension group.
///
/// Every group is laid out and returned; the caller decides which documents
/// to persist and which single one to surface in the response.
pub fn build_grid_documents(
    assets: &[StoredAsset],
    sheet: &SheetConfig,
) -> Result<Vec<GridDocument>, AppError> {
    if assets.is_empty() {
        return Err(AppError::NoAssets);
    }

    let mut documents = Vec::new();
    for (key, members) in group_by_dimension(assets) {
        let params = GridParams {
            page_width_mm: sheet.page_width_mm,
            page_height_mm: sheet.page_height_mm,
            page_margin_mm: sheet.page_margin_mm,
            cell_margin_mm: sheet.cell_margin_mm,
            item_width_mm: key.width_mm,
            item_height_mm: key.height_mm,
        };
        let layout = layout_grid(&params, members.len())?;

        let mut pages: Vec<Page> = (0..layout.page_count)
            .map(|_| Page::empty(sheet.page_width_mm, sheet.page_height_mm))
            .collect();
        for (position, asset_index) in members.iter().enumerate() {
            let cell = &layout.placements[position];
            pages[cell.page_index].placements.push(Placement {
                asset_index: *asset_index,
                x_mm: cell.x_mm,
                y_mm: cell.y_mm,
                width_mm: key.width_mm,
                height_mm: key.height_mm,
            });
        }

        documents.push(GridDocument {
            key,
            columns: layout.columns,
            rows: layout.rows,
            document: Document { pages },
        });
    }

    Ok(documents)
}

// ────────────────────────────────────────────────────────────────────────────
// Individual mode
// ────────────────────────────────────────────────────────────────────────────

/// Builds the one-stamp-per-page document: each page is sized exactly to its
/// asset, with a single placement at the page origin. Page sizes may change
/// between consecutive pages; no trailing blank page is emitted.
pub fn build_individual_document(assets: &[StoredAsset]) -> Result<Document, AppError> {
    if assets.is_empty() {
        return Err(AppError::NoAssets);
    }

    let pages = assets
        .iter()
        .enumerate()
        .map(|(index, asset)| Page {
            width_mm: asset.width_mm,
            height_mm: asset.height_mm,
            placements: vec![Placement {
                asset_index: index,
                x_mm: 0.0,
                y_mm: 0.0,
                width_mm: asset.width_mm,
                height_mm: asset.height_mm,
            }],
        })
        .collect();

    Ok(Document { pages })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
