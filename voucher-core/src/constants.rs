//! Sheet constants for the printed voucher document.
//! Page values are PDF points unless noted otherwise.

use crate::layout::{GridShape, Size};

/// A4 landscape, rounded to whole points.
pub const PAGE_SIZE: Size = Size::new(842.0, 595.0);
/// Gap around and between vouchers.
pub const MARGIN: f64 = 20.0;
/// Box each voucher image is placed into.
pub const ITEM_SIZE: Size = Size::new(391.0, 267.5);
pub const GRID: GridShape = GridShape { rows: 2, columns: 2 };
/// Logical canvas the template is composed on (px). Same aspect as `ITEM_SIZE`.
pub const CANVAS_WIDTH: u32 = 782;
pub const CANVAS_HEIGHT: u32 = 535;
/// Integer upscale applied when rasterizing the canvas.
pub const RASTER_SCALE: u32 = 2;
pub const FILE_PREFIX: &str = "vouchers";
pub const FILE_EXTENSION: &str = "pdf";
