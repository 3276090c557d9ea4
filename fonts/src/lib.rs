//! Fonts embedded at build time so voucher text renders the same on every host.
//!
//! Either blob may be empty when the build had no network access and no
//! `FONT_REGULAR`/`FONT_BOLD` override; callers then fall back to system fonts.

pub static FONT_BYTES: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/SourceSans3-Regular.otf"));

pub static FONT_BOLD_BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/SourceSans3-Bold.otf"));

/// Returns the non-empty embedded faces.
pub fn embedded_faces() -> impl Iterator<Item = &'static [u8]> {
    [FONT_BYTES, FONT_BOLD_BYTES]
        .into_iter()
        .filter(|b| !b.is_empty())
}
