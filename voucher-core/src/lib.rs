//! Bulk voucher document composition.
//!
//! Records are rendered to an SVG voucher template, rasterized one at a
//! time on a shared off-screen surface, placed on a fixed grid and written
//! out as a single multi-page PDF.

pub mod assemble;
pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod locale;
pub mod paginate;
pub mod raster;
pub mod record;
pub mod template;

pub use assemble::{PdfAssembler, PlacedImage};
pub use batch::{
    Batch, BatchReport, BatchState, ComposedDocument, PlacedVoucher, compose_vouchers,
    document_file_name,
};
pub use config::SheetConfig;
pub use error::{Result, VoucherError};
pub use layout::{GridShape, PageGeometry, Point, Size, plan};
pub use locale::Locale;
pub use paginate::{Paginate, Placement, paginate, paginate_records};
pub use raster::{RasterImage, Rasterize, SvgRasterizer};
pub use record::{VoucherRecord, parse_records};
pub use template::{VisualComposition, render};
