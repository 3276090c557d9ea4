//! PDF assembly: raster images placed at planner coordinates, one page per
//! grid of vouchers.

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::error::{Result, VoucherError};
use crate::layout::{Point, Size};
use crate::raster::RasterImage;

const TITLE: &str = "Vouchers";
const PRODUCER: &str = concat!("voucher-core ", env!("CARGO_PKG_VERSION"));

struct EmbeddedImage {
    width: u32,
    height: u32,
    // zlib-compressed RGB
    data: Vec<u8>,
}

/// One image on one page. `origin` is top-left in page points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedImage {
    pub image: usize,
    pub origin: Point,
    pub size: Size,
}

/// Accumulates pages and image placements until [`PdfAssembler::finalize`].
///
/// The first page exists from construction. Pages that never receive an
/// image are left out of the finished document.
pub struct PdfAssembler {
    page_size: Size,
    images: Vec<EmbeddedImage>,
    pages: Vec<Vec<PlacedImage>>,
}

impl PdfAssembler {
    pub fn new(page_size: Size) -> Self {
        PdfAssembler {
            page_size,
            images: Vec::new(),
            pages: vec![Vec::new()],
        }
    }

    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    /// Place `image` on the current page. No scaling decisions happen here:
    /// the image is stretched to exactly `size`.
    pub fn embed(&mut self, image: &RasterImage, origin: Point, size: Size) {
        let data = miniz_oxide::deflate::compress_to_vec_zlib(&image.rgb, 6);
        let index = self.images.len();
        self.images.push(EmbeddedImage {
            width: image.width,
            height: image.height,
            data,
        });
        if let Some(page) = self.pages.last_mut() {
            page.push(PlacedImage {
                image: index,
                origin,
                size,
            });
        }
    }

    /// Pages that will appear in the finished document.
    pub fn page_count(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_empty()).count()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Placements of each emitted page, in page order.
    pub fn placements(&self) -> impl Iterator<Item = &[PlacedImage]> {
        self.pages
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.as_slice())
    }

    /// Serialize the document. Repeated calls without mutation in between
    /// return identical bytes.
    pub fn finalize(&self) -> Result<Vec<u8>> {
        let pages: Vec<&[PlacedImage]> = self.placements().collect();
        if pages.is_empty() {
            return Err(VoucherError::NothingRendered);
        }

        let mut next_id = 1;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };
        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();
        let image_ids: Vec<Ref> = self.images.iter().map(|_| alloc()).collect();
        let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc(), alloc())).collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().map(|(page, _)| *page))
            .count(pages.len() as i32);
        pdf.document_info(info_id)
            .title(TextStr(TITLE))
            .producer(TextStr(PRODUCER));

        for (img, id) in self.images.iter().zip(&image_ids) {
            let mut xobj = pdf.image_xobject(*id, &img.data);
            xobj.filter(Filter::FlateDecode);
            xobj.width(img.width as i32);
            xobj.height(img.height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
        }

        let page_h = self.page_size.height as f32;
        for (placed, (page_id, content_id)) in pages.iter().zip(&page_ids) {
            let mut content = Content::new();
            for p in placed.iter() {
                let name = image_name(p.image);
                let (w, h) = (p.size.width as f32, p.size.height as f32);
                // PDF origin is bottom-left
                let x = p.origin.x as f32;
                let y = page_h - p.origin.y as f32 - h;
                content.save_state();
                content.transform([w, 0.0, 0.0, h, x, y]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
            pdf.stream(*content_id, &compressed)
                .filter(Filter::FlateDecode);

            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(
                0.0,
                0.0,
                self.page_size.width as f32,
                page_h,
            ))
            .parent(pages_id)
            .contents(*content_id);
            let mut resources = page.resources();
            let mut xobjects = resources.x_objects();
            for p in placed.iter() {
                let name = image_name(p.image);
                xobjects.pair(Name(name.as_bytes()), image_ids[p.image]);
            }
        }

        Ok(pdf.finish())
    }
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> RasterImage {
        RasterImage {
            width: 1,
            height: 1,
            rgb: vec![10, 20, 30],
        }
    }

    fn at(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    #[test]
    fn nothing_embedded_is_an_error() {
        let asm = PdfAssembler::new(Size::new(100.0, 100.0));
        assert_eq!(asm.page_count(), 0);
        assert!(matches!(asm.finalize(), Err(VoucherError::NothingRendered)));
    }

    #[test]
    fn empty_trailing_page_is_not_emitted() {
        let mut asm = PdfAssembler::new(Size::new(100.0, 100.0));
        asm.embed(&pixel(), at(0.0, 0.0), Size::new(10.0, 10.0));
        asm.add_page();
        assert_eq!(asm.page_count(), 1);
        let bytes = asm.finalize().unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut asm = PdfAssembler::new(Size::new(100.0, 100.0));
        asm.embed(&pixel(), at(5.0, 5.0), Size::new(10.0, 10.0));
        asm.add_page();
        asm.embed(&pixel(), at(5.0, 5.0), Size::new(10.0, 10.0));
        let a = asm.finalize().unwrap();
        let b = asm.finalize().unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with(b"%PDF-"));
        assert_eq!(lopdf::Document::load_mem(&a).unwrap().get_pages().len(), 2);
    }

    #[test]
    fn placements_are_recorded_per_page() {
        let mut asm = PdfAssembler::new(Size::new(100.0, 100.0));
        asm.embed(&pixel(), at(1.0, 2.0), Size::new(3.0, 4.0));
        asm.embed(&pixel(), at(5.0, 6.0), Size::new(3.0, 4.0));
        asm.add_page();
        asm.embed(&pixel(), at(1.0, 2.0), Size::new(3.0, 4.0));
        let pages: Vec<_> = asm.placements().collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 2);
        assert_eq!(pages[0][1].origin, at(5.0, 6.0));
        assert_eq!(pages[1][0].image, 2);
        assert_eq!(asm.image_count(), 3);
    }
}
