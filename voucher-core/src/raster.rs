//! Off-screen rasterization of voucher compositions.
//!
//! One [`SvgRasterizer`] owns a single pixmap for the whole batch. It is
//! cleared and redrawn for every voucher and released when the rasterizer
//! is dropped.

use std::sync::Arc;

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use tiny_skia::{Color, Pixmap, Transform};
use usvg::fontdb;

use crate::error::{Result, VoucherError};
use crate::template::VisualComposition;

/// Opaque 8-bit RGB pixels, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    /// Deterministic PNG encoding (same pixels, same bytes).
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut enc = Encoder::new(&mut buf, self.width, self.height);
            enc.set_color(ColorType::Rgb);
            enc.set_depth(BitDepth::Eight);
            enc.set_filter(FilterType::NoFilter);
            enc.set_compression(Compression::Default);
            let mut writer = enc.write_header()?;
            writer.write_image_data(&self.rgb)?;
        }
        Ok(buf)
    }
}

/// Turns a composition into pixels. Implementations are driven strictly one
/// voucher at a time and may reuse internal buffers between calls.
pub trait Rasterize {
    fn rasterize(&mut self, composition: &VisualComposition) -> Result<RasterImage>;
}

pub struct SvgRasterizer {
    fontdb: Arc<fontdb::Database>,
    surface: Pixmap,
    scale: u32,
}

impl SvgRasterizer {
    /// Allocates the shared surface for `width` x `height` logical pixels
    /// sampled at `scale`.
    pub fn new(width: u32, height: u32, scale: u32, fontdb: Arc<fontdb::Database>) -> Result<Self> {
        let alloc_err = || VoucherError::SurfaceAllocation {
            width: width.saturating_mul(scale),
            height: height.saturating_mul(scale),
        };
        let w = width.checked_mul(scale).ok_or_else(alloc_err)?;
        let h = height.checked_mul(scale).ok_or_else(alloc_err)?;
        let surface = Pixmap::new(w, h).ok_or_else(alloc_err)?;
        log::debug!("allocated {w}x{h} render surface");
        Ok(SvgRasterizer {
            fontdb,
            surface,
            scale,
        })
    }

    /// Same as [`SvgRasterizer::new`] using the build-time embedded fonts.
    pub fn with_embedded_font(width: u32, height: u32, scale: u32) -> Result<Self> {
        Self::new(width, height, scale, Arc::new(embedded_fontdb()))
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }
}

impl Rasterize for SvgRasterizer {
    fn rasterize(&mut self, composition: &VisualComposition) -> Result<RasterImage> {
        let fail = |message: String| VoucherError::Rasterize {
            code: composition.code.clone(),
            message,
        };
        let expected = (
            composition.width * self.scale,
            composition.height * self.scale,
        );
        if expected != self.surface_size() {
            return Err(fail(format!(
                "composition needs {}x{} pixels, surface is {}x{}",
                expected.0,
                expected.1,
                self.surface.width(),
                self.surface.height()
            )));
        }

        let mut opt = usvg::Options::default();
        opt.fontdb = self.fontdb.clone();
        let tree = usvg::Tree::from_str(&composition.svg, &opt)
            .map_err(|e| fail(format!("SVG parse error: {e}")))?;
        let size = tree.size();
        if size.width() <= 0.0 || size.height() <= 0.0 {
            return Err(fail("composition has an empty canvas".into()));
        }

        self.surface.fill(Color::WHITE);
        let sx = self.surface.width() as f32 / size.width();
        let sy = self.surface.height() as f32 / size.height();
        resvg::render(&tree, Transform::from_scale(sx, sy), &mut self.surface.as_mut());

        let mut rgb = Vec::with_capacity(self.surface.pixels().len() * 3);
        for px in self.surface.pixels() {
            let c = px.demultiply();
            rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
        }
        Ok(RasterImage {
            width: self.surface.width(),
            height: self.surface.height(),
            rgb,
        })
    }
}

impl Drop for SvgRasterizer {
    fn drop(&mut self) {
        log::debug!(
            "releasing {}x{} render surface",
            self.surface.width(),
            self.surface.height()
        );
    }
}

/// Font database with the embedded faces mapped to `sans-serif`.
/// Falls back to system fonts when the build embedded none.
pub fn embedded_fontdb() -> fontdb::Database {
    let mut db = fontdb::Database::new();
    for face in fonts::embedded_faces() {
        db.load_font_data(face.to_vec());
    }
    if db.len() == 0 {
        log::warn!("no embedded font available, using system fonts");
        db.load_system_fonts();
        return db;
    }
    let family_name = db
        .faces()
        .next()
        .and_then(|face| face.families.first().map(|(n, _)| n.clone()));
    if let Some(name) = family_name {
        db.set_sans_serif_family(name);
    }
    db
}
