use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, VoucherError};
use crate::layout::{GridShape, PageGeometry, Size, plan};
use crate::locale::Locale;

/// Per-deployment sheet settings. `Default` is the compiled-in constant set;
/// a JSON file may override any subset of fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub page: Size,
    pub margin: f64,
    pub item: Size,
    pub grid: GridShape,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub scale: u32,
    pub locale: Locale,
    pub file_prefix: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            page: PAGE_SIZE,
            margin: MARGIN,
            item: ITEM_SIZE,
            grid: GRID,
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            scale: RASTER_SCALE,
            locale: Locale::default(),
            file_prefix: FILE_PREFIX.to_string(),
        }
    }
}

impl SheetConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let txt = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&txt)?)
    }

    /// Run the planner over these settings. Also checks the raster settings
    /// and the file prefix, since those would fail only once the batch is
    /// running or the document is saved.
    pub fn geometry(&self) -> Result<PageGeometry> {
        check_file_prefix(&self.file_prefix)?;
        if self.canvas_width == 0 || self.canvas_height == 0 || self.scale == 0 {
            return Err(VoucherError::InvalidGeometry(format!(
                "canvas {}x{} at scale {} is empty",
                self.canvas_width, self.canvas_height, self.scale
            )));
        }
        plan(self.page, self.margin, self.item, self.grid)
    }

    /// Pixel size of one rasterized voucher.
    pub fn raster_size(&self) -> (u32, u32) {
        (self.canvas_width * self.scale, self.canvas_height * self.scale)
    }
}

/// The prefix becomes a bare file name: no separators, no relative parts.
fn check_file_prefix(prefix: &str) -> Result<()> {
    let bad = prefix.trim().is_empty()
        || prefix.starts_with('.')
        || prefix
            .chars()
            .any(|c| c == '/' || c == '\\' || c == ':' || c.is_control());
    if bad {
        return Err(VoucherError::InvalidConfig(format!(
            "file prefix {prefix:?} must be a plain file name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_plan_a_two_by_two_sheet() {
        let cfg = SheetConfig::default();
        let g = cfg.geometry().unwrap();
        assert_eq!(g.items_per_page(), 4);
        assert_eq!(cfg.raster_size(), (1564, 1070));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg: SheetConfig =
            serde_json::from_str(r#"{"grid":{"rows":3,"columns":1},"item":{"width":400,"height":150},"locale":"en-US"}"#)
                .unwrap();
        assert_eq!(cfg.margin, MARGIN);
        assert_eq!(cfg.locale, Locale::EnUs);
        assert_eq!(cfg.geometry().unwrap().items_per_page(), 3);
    }

    #[test]
    fn file_prefix_cannot_leave_the_output_directory() {
        for prefix in ["../x", "a/b", "..\\x", "/etc/x", "", ".hidden", "c:x"] {
            let cfg = SheetConfig {
                file_prefix: prefix.to_string(),
                ..SheetConfig::default()
            };
            assert!(
                matches!(cfg.geometry(), Err(VoucherError::InvalidConfig(_))),
                "{prefix:?}"
            );
        }
        let cfg = SheetConfig {
            file_prefix: "cupons_premiados".into(),
            ..SheetConfig::default()
        };
        assert!(cfg.geometry().is_ok());
    }

    #[test]
    fn zero_scale_is_rejected() {
        let cfg = SheetConfig {
            scale: 0,
            ..SheetConfig::default()
        };
        assert!(matches!(cfg.geometry(), Err(VoucherError::InvalidGeometry(_))));
    }
}
