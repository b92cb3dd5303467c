//! PDF-backed renderer.
//!
//! Pages are buffered as content streams while the document is being drawn;
//! `close` allocates object references and assembles the catalog, page tree,
//! and per-page resources in one pass.
//!
//! `draw_asset` parses the SVG, rasterizes it at the configured density,
//! and embeds the raster as a Flate-compressed RGB image XObject with an
//! alpha soft mask, placed via a CTM transform. Image XObjects occupy the
//! unit square, so the transform carries both the scale and the offset.

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;

use crate::errors::AppError;
use crate::render::Renderer;

const POINTS_PER_INCH: f64 = 72.0;
const FLATE_LEVEL: u8 = 6;

struct PageBuffer {
    width_pt: f64,
    height_pt: f64,
    content: Content,
    /// Resource name → image XObject reference, for this page's dictionary.
    xobjects: Vec<(String, Ref)>,
}

pub struct PdfRenderer {
    pdf: Pdf,
    next_ref: i32,
    raster_dpi: f64,
    finished: Vec<PageBuffer>,
    current: Option<PageBuffer>,
    image_count: usize,
}

impl PdfRenderer {
    pub fn new(raster_dpi: f64) -> Self {
        PdfRenderer {
            pdf: Pdf::new(),
            next_ref: 1,
            raster_dpi,
            finished: Vec::new(),
            current: None,
            image_count: 0,
        }
    }

    fn alloc(&mut self) -> Ref {
        let reference = Ref::new(self.next_ref);
        self.next_ref += 1;
        reference
    }

    fn flush_page(&mut self) {
        if let Some(page) = self.current.take() {
            self.finished.push(page);
        }
    }

    /// Rasterizes one SVG to an RGBA pixmap sized for the target draw area.
    fn rasterize(&self, bytes: &[u8], width_pt: f64, height_pt: f64) -> Result<Pixmap, AppError> {
        let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
            .map_err(|e| AppError::Render(format!("failed to parse SVG: {e}")))?;

        let px_w = ((width_pt / POINTS_PER_INCH) * self.raster_dpi).ceil().max(1.0) as u32;
        let px_h = ((height_pt / POINTS_PER_INCH) * self.raster_dpi).ceil().max(1.0) as u32;
        let mut pixmap = Pixmap::new(px_w, px_h)
            .ok_or_else(|| AppError::Render(format!("cannot allocate {px_w}x{px_h} raster")))?;

        let scale_x = px_w as f32 / tree.size().width();
        let scale_y = px_h as f32 / tree.size().height();
        resvg::render(
            &tree,
            Transform::from_scale(scale_x, scale_y),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap)
    }

    /// Writes the pixmap as an RGB image XObject plus a grayscale soft mask.
    /// Returns the image reference for the page's resource dictionary.
    fn embed_pixmap(&mut self, pixmap: &Pixmap) -> Ref {
        let pixel_count = (pixmap.width() * pixmap.height()) as usize;
        let mut rgb = Vec::with_capacity(pixel_count * 3);
        let mut alpha = Vec::with_capacity(pixel_count);
        for pixel in pixmap.pixels() {
            let color = pixel.demultiply();
            rgb.push(color.red());
            rgb.push(color.green());
            rgb.push(color.blue());
            alpha.push(color.alpha());
        }

        let rgb_z = compress_to_vec_zlib(&rgb, FLATE_LEVEL);
        let alpha_z = compress_to_vec_zlib(&alpha, FLATE_LEVEL);

        let image_ref = self.alloc();
        let mask_ref = self.alloc();

        let mut image = self.pdf.image_xobject(image_ref, &rgb_z);
        image.filter(Filter::FlateDecode);
        image.width(pixmap.width() as i32);
        image.height(pixmap.height() as i32);
        image.bits_per_component(8);
        image.color_space().device_rgb();
        image.s_mask(mask_ref);
        image.finish();

        let mut mask = self.pdf.image_xobject(mask_ref, &alpha_z);
        mask.filter(Filter::FlateDecode);
        mask.width(pixmap.width() as i32);
        mask.height(pixmap.height() as i32);
        mask.bits_per_component(8);
        mask.color_space().device_gray();
        mask.finish();

        image_ref
    }
}

impl Renderer for PdfRenderer {
    fn open_page(&mut self, width_pt: f64, height_pt: f64) -> Result<(), AppError> {
        self.advance_page(width_pt, height_pt)
    }

    fn advance_page(&mut self, width_pt: f64, height_pt: f64) -> Result<(), AppError> {
        self.flush_page();
        self.current = Some(PageBuffer {
            width_pt,
            height_pt,
            content: Content::new(),
            xobjects: Vec::new(),
        });
        Ok(())
    }

    fn draw_asset(
        &mut self,
        bytes: &[u8],
        x_pt: f64,
        y_pt: f64,
        width_pt: f64,
        height_pt: f64,
    ) -> Result<(), AppError> {
        if self.current.is_none() {
            return Err(AppError::Render(
                "draw_asset called with no open page".to_string(),
            ));
        }

        let pixmap = self.rasterize(bytes, width_pt, height_pt)?;
        let image_ref = self.embed_pixmap(&pixmap);
        let name = format!("Im{}", self.image_count);
        self.image_count += 1;

        if let Some(page) = self.current.as_mut() {
            page.content.save_state();
            page.content.transform([
                width_pt as f32,
                0.0,
                0.0,
                height_pt as f32,
                x_pt as f32,
                y_pt as f32,
            ]);
            page.content.x_object(Name(name.as_bytes()));
            page.content.restore_state();
            page.xobjects.push((name, image_ref));
        }
        Ok(())
    }

    fn close(mut self) -> Result<Vec<u8>, AppError> {
        self.flush_page();

        let catalog_id = self.alloc();
        let page_tree_id = self.alloc();

        let mut page_refs = Vec::with_capacity(self.finished.len());
        let buffers = std::mem::take(&mut self.finished);
        for buffer in buffers {
            let page_id = self.alloc();
            let content_id = self.alloc();

            let stream = compress_to_vec_zlib(&buffer.content.finish(), FLATE_LEVEL);
            self.pdf.stream(content_id, &stream).filter(Filter::FlateDecode);

            let mut page = self.pdf.page(page_id);
            page.media_box(Rect::new(
                0.0,
                0.0,
                buffer.width_pt as f32,
                buffer.height_pt as f32,
            ));
            page.parent(page_tree_id);
            page.contents(content_id);
            if !buffer.xobjects.is_empty() {
                let mut resources = page.resources();
                let mut xobjects = resources.x_objects();
                for (name, reference) in &buffer.xobjects {
                    xobjects.pair(Name(name.as_bytes()), *reference);
                }
            }
            page.finish();
            page_refs.push(page_id);
        }

        self.pdf.catalog(catalog_id).pages(page_tree_id);
        self.pdf
            .pages(page_tree_id)
            .kids(page_refs.iter().copied())
            .count(page_refs.len() as i32);

        Ok(self.pdf.finish())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
