use std::iter::FusedIterator;
use std::slice;

use crate::error::{Result, VoucherError};
use crate::layout::PageGeometry;
use crate::record::VoucherRecord;

/// Where the `k`-th item of a stream lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement<T> {
    pub page: usize,
    pub slot: usize,
    pub item: T,
}

impl<T> Placement<T> {
    /// True for the first slot of every page after the first one.
    pub fn starts_new_page(&self) -> bool {
        self.slot == 0 && self.page > 0
    }
}

/// Lazy pagination over any item stream. Items are pulled one at a time
/// and assigned `page = k / per_page`, `slot = k % per_page` in order.
///
/// Deliberately not `Clone`: the stream is consumed exactly once.
#[derive(Debug)]
pub struct Paginate<I> {
    inner: I,
    per_page: usize,
    next_index: usize,
}

impl<I: Iterator> Iterator for Paginate<I> {
    type Item = Placement<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        let k = self.next_index;
        self.next_index += 1;
        Some(Placement {
            page: k / self.per_page,
            slot: k % self.per_page,
            item,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I: FusedIterator> FusedIterator for Paginate<I> {}

/// Paginate an arbitrary stream against `geometry`.
pub fn paginate<I: IntoIterator>(items: I, geometry: &PageGeometry) -> Paginate<I::IntoIter> {
    Paginate {
        inner: items.into_iter(),
        // plan() never yields an empty grid
        per_page: geometry.items_per_page().max(1),
        next_index: 0,
    }
}

/// Paginate the batch's records directly. An empty batch is a caller error.
pub fn paginate_records<'a>(
    records: &'a [VoucherRecord],
    geometry: &PageGeometry,
) -> Result<Paginate<slice::Iter<'a, VoucherRecord>>> {
    if records.is_empty() {
        return Err(VoucherError::EmptyBatch);
    }
    Ok(paginate(records, geometry))
}
