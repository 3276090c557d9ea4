//! Page layout planning: where each voucher slot sits on a page.
//!
//! All values are PDF points with a top-left origin; the assembler flips
//! the y axis when it writes the content stream.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoucherError};

// Tolerance for boxes that touch the page edge exactly.
const EPS: f64 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: u32,
    pub columns: u32,
}

/// Derived per job from the sheet constants; never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page: Size,
    pub item: Size,
    pub margin: f64,
    pub items_per_row: usize,
    pub items_per_column: usize,
}

impl PageGeometry {
    pub fn items_per_page(&self) -> usize {
        self.items_per_row * self.items_per_column
    }

    /// Top-left corner of `slot` (0-indexed within its page), or `None` when
    /// the slot does not exist on this grid.
    pub fn slot_origin(&self, slot: usize) -> Option<Point> {
        if slot >= self.items_per_page() {
            return None;
        }
        let row = slot / self.items_per_row;
        let col = slot % self.items_per_row;
        Some(Point {
            x: self.margin + col as f64 * (self.item.width + self.margin),
            y: self.margin + row as f64 * (self.item.height + self.margin),
        })
    }

    /// Number of pages needed for `items` vouchers.
    pub fn pages_for(&self, items: usize) -> usize {
        items.div_ceil(self.items_per_page())
    }
}

/// Validate the sheet constants and derive the page geometry.
pub fn plan(page: Size, margin: f64, item: Size, grid: GridShape) -> Result<PageGeometry> {
    let invalid = |msg: String| Err(VoucherError::InvalidGeometry(msg));
    for (what, v) in [
        ("page width", page.width),
        ("page height", page.height),
        ("item width", item.width),
        ("item height", item.height),
    ] {
        if !v.is_finite() || v <= 0.0 {
            return invalid(format!("{what} must be positive, got {v}"));
        }
    }
    if !margin.is_finite() || margin < 0.0 {
        return invalid(format!("margin must be non-negative, got {margin}"));
    }
    if grid.rows == 0 || grid.columns == 0 {
        return invalid(format!(
            "grid {}x{} holds no vouchers",
            grid.rows, grid.columns
        ));
    }
    let used_w = margin + grid.columns as f64 * (item.width + margin);
    let used_h = margin + grid.rows as f64 * (item.height + margin);
    if used_w > page.width + EPS || used_h > page.height + EPS {
        return invalid(format!(
            "{} columns x {} rows of {}x{} with margin {} need {used_w}x{used_h}, page is {}x{}",
            grid.columns, grid.rows, item.width, item.height, margin, page.width, page.height
        ));
    }
    Ok(PageGeometry {
        page,
        item,
        margin,
        items_per_row: grid.columns as usize,
        items_per_column: grid.rows as usize,
    })
}
