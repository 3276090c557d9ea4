//! Batch orchestration: validate, render, rasterize, place, finalize.

use chrono::NaiveDate;

use crate::assemble::PdfAssembler;
use crate::config::SheetConfig;
use crate::constants::FILE_EXTENSION;
use crate::error::{Result, VoucherError};
use crate::layout::Point;
use crate::paginate::paginate;
use crate::raster::{Rasterize, SvgRasterizer};
use crate::record::VoucherRecord;
use crate::template::render;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Validating,
    Rendering,
    Finalizing,
    Done,
    Aborted,
}

/// Where a voucher ended up, for matching printed sheets to source records.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedVoucher {
    pub code: String,
    pub page: usize,
    pub slot: usize,
    pub origin: Point,
}

/// What happened to the records of a finished batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub rendered: usize,
    /// Placed vouchers in input order.
    pub placed: Vec<PlacedVoucher>,
    /// Codes of records dropped because they failed to rasterize.
    pub skipped: Vec<String>,
    pub pages: usize,
}

#[derive(Clone, Debug)]
pub struct ComposedDocument {
    pub bytes: Vec<u8>,
    pub report: BatchReport,
}

/// `<prefix>_<YYYY-MM-DD>.pdf`
pub fn document_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_{}.{FILE_EXTENSION}", date.format("%Y-%m-%d"))
}

/// Drives one batch. A failed run leaves [`Batch::state`] at the stage
/// where it stopped; only validation failures end in `Aborted`.
pub struct Batch<'a> {
    config: &'a SheetConfig,
    state: BatchState,
}

impl<'a> Batch<'a> {
    pub fn new(config: &'a SheetConfig) -> Self {
        Batch {
            config,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    fn enter(&mut self, next: BatchState) {
        log::debug!("batch {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn abort(&mut self, err: VoucherError) -> VoucherError {
        log::error!("voucher batch aborted: {err}");
        self.enter(BatchState::Aborted);
        err
    }

    /// Compose `records` into one document.
    ///
    /// `open_surface` allocates the shared rasterizer once validation has
    /// passed. The rasterizer lives until every record has been placed and
    /// is dropped before the document is finalized, on every exit path.
    pub fn run<R, F>(&mut self, records: &[VoucherRecord], open_surface: F) -> Result<ComposedDocument>
    where
        R: Rasterize,
        F: FnOnce(&SheetConfig) -> Result<R>,
    {
        self.enter(BatchState::Validating);
        if records.is_empty() {
            return Err(self.abort(VoucherError::EmptyBatch));
        }
        let geometry = match self.config.geometry() {
            Ok(g) => g,
            Err(e) => return Err(self.abort(e)),
        };
        let mut rasterizer = match open_surface(self.config) {
            Ok(r) => r,
            Err(e) => return Err(self.abort(e)),
        };
        log::info!(
            "composing {} vouchers, {} per page",
            records.len(),
            geometry.items_per_page()
        );

        self.enter(BatchState::Rendering);
        let locale = self.config.locale;
        let (width, height) = (self.config.canvas_width, self.config.canvas_height);
        let mut skipped = Vec::new();
        let mut placed = Vec::with_capacity(records.len());
        let mut asm = PdfAssembler::new(geometry.page);
        {
            // Rasterization is pulled lazily by the paginator, one record at
            // a time. Failed records are dropped here, so later vouchers
            // close the gap instead of leaving a blank slot.
            let images = records.iter().filter_map(|record| {
                let composition = render(record, locale, width, height);
                match rasterizer.rasterize(&composition) {
                    Ok(img) => Some(Ok((record, img))),
                    Err(VoucherError::Rasterize { code, message }) => {
                        log::warn!("skipping voucher {code}: {message}");
                        skipped.push(code);
                        None
                    }
                    Err(e) => Some(Err(e)),
                }
            });
            for placement in paginate(images, &geometry) {
                let new_page = placement.starts_new_page();
                let (page, slot) = (placement.page, placement.slot);
                let (record, image) = placement.item?;
                if new_page {
                    log::debug!("starting page {}", page + 1);
                    asm.add_page();
                }
                let origin = geometry.slot_origin(slot).ok_or_else(|| {
                    VoucherError::InvalidGeometry(format!(
                        "slot {} outside a {}-slot page",
                        slot,
                        geometry.items_per_page()
                    ))
                })?;
                log::debug!(
                    "page {} slot {} at ({}, {})",
                    page + 1,
                    slot,
                    origin.x,
                    origin.y
                );
                asm.embed(&image, origin, geometry.item);
                placed.push(PlacedVoucher {
                    code: record.code.clone(),
                    page,
                    slot,
                    origin,
                });
            }
        }
        drop(rasterizer);

        self.enter(BatchState::Finalizing);
        let bytes = asm.finalize()?;
        let report = BatchReport {
            rendered: placed.len(),
            placed,
            skipped,
            pages: asm.page_count(),
        };
        log::info!(
            "voucher document ready: {} vouchers on {} pages, {} skipped, {} bytes",
            report.rendered,
            report.pages,
            report.skipped.len(),
            bytes.len()
        );
        self.enter(BatchState::Done);
        Ok(ComposedDocument { bytes, report })
    }
}

/// Compose with the resvg rasterizer and the embedded fonts.
pub fn compose_vouchers(records: &[VoucherRecord], config: &SheetConfig) -> Result<ComposedDocument> {
    Batch::new(config).run(records, |cfg| {
        SvgRasterizer::with_embedded_font(cfg.canvas_width, cfg.canvas_height, cfg.scale)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterImage;
    use crate::template::VisualComposition;

    struct Solid;

    impl Rasterize for Solid {
        fn rasterize(&mut self, _c: &VisualComposition) -> Result<RasterImage> {
            Ok(RasterImage {
                width: 1,
                height: 1,
                rgb: vec![0, 0, 0],
            })
        }
    }

    #[test]
    fn file_name_uses_prefix_and_iso_date() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(document_file_name("vouchers", d), "vouchers_2024-02-09.pdf");
    }

    #[test]
    fn empty_input_aborts_without_opening_a_surface() {
        let cfg = SheetConfig::default();
        let mut batch = Batch::new(&cfg);
        let mut opened = false;
        let res = batch.run(&[], |_| {
            opened = true;
            Ok(Solid)
        });
        assert!(matches!(res, Err(VoucherError::EmptyBatch)));
        assert_eq!(batch.state(), BatchState::Aborted);
        assert!(!opened);
    }

    #[test]
    fn surface_failure_aborts() {
        let cfg = SheetConfig::default();
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records = [VoucherRecord::new("A", at, 1.0)];
        let mut batch = Batch::new(&cfg);
        let res = batch.run(&records, |_| -> Result<Solid> {
            Err(VoucherError::SurfaceAllocation {
                width: 0,
                height: 0,
            })
        });
        assert!(matches!(res, Err(VoucherError::SurfaceAllocation { .. })));
        assert_eq!(batch.state(), BatchState::Aborted);
    }

    #[test]
    fn successful_run_ends_done() {
        let cfg = SheetConfig::default();
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records: Vec<_> = (0..5)
            .map(|i| VoucherRecord::new(format!("A{i}"), at, 1.0))
            .collect();
        let mut batch = Batch::new(&cfg);
        assert_eq!(batch.state(), BatchState::Idle);
        let doc = batch.run(&records, |_| Ok(Solid)).unwrap();
        assert_eq!(batch.state(), BatchState::Done);
        assert_eq!(doc.report.rendered, 5);
        assert_eq!(doc.report.pages, 2);
        assert!(doc.report.skipped.is_empty());
    }
}
