use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::compose::SheetConfig;

/// Application configuration loaded from environment variables.
/// Every knob has a default, so the service starts with an empty environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for session asset storage and generated documents.
    pub data_dir: PathBuf,
    /// Uniform inset from all four sheet edges, in millimeters.
    pub page_margin_mm: f64,
    /// Extra spacing around each stamp within its grid cell, in millimeters.
    pub cell_margin_mm: f64,
    /// Rasterization density for embedded SVGs, in dots per inch.
    pub raster_dpi: f64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            data_dir: PathBuf::from(
                std::env::var("DATA_DIR").unwrap_or_else(|_| "stamp_sessions".to_string()),
            ),
            page_margin_mm: env_f64("PAGE_MARGIN_MM", 1.4)?,
            cell_margin_mm: env_f64("CELL_MARGIN_MM", 1.0)?,
            raster_dpi: env_f64("RASTER_DPI", 300.0)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Sheet geometry for grid mode: the fixed landscape sheet plus the
    /// configured margins. Sheet size is a constant, not a request parameter.
    pub fn sheet_config(&self) -> SheetConfig {
        SheetConfig {
            page_width_mm: crate::layout::SHEET_WIDTH_MM,
            page_height_mm: crate::layout::SHEET_HEIGHT_MM,
            page_margin_mm: self.page_margin_mm,
            cell_margin_mm: self.cell_margin_mm,
        }
    }
}

fn env_f64(key: &str, default: f64) -> Result<f64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
