//! Left-operand packer.

use crate::mapper::{DataMapper, StorageOrder};
use crate::pack::{check_panel, slot_depth};
use crate::scalar::Scalar;
use crate::simd::Packet;
use crate::tiling::row_bands;

/// Packs the `rows × depth` panel of `lhs` into `block_a`.
///
/// The tile height is `mr = MP * P::LANES`. Rows are split by
/// [`row_bands`] into full `mr` tiles, at most one `LANES` tile and single
/// rows; every band of height `h` is written as
/// `block_a[base + k * h + w] = lhs(i + w, k)`, conjugated when `CONJUGATE`
/// is set.
///
/// # Arguments
///
/// * `block_a` - Destination buffer.
/// * `lhs` - Source slice starting at coefficient `(0, 0)` of the panel.
/// * `lhs_stride` - Leading dimension of `lhs` in storage order `O`.
/// * `depth` - Number of columns to pack.
/// * `rows` - Number of rows to pack.
/// * `stride` - Depth capacity of each band slot (panel mode only, else 0).
/// * `offset` - Depth position of the packed range in each slot (panel mode only, else 0).
///
/// # Safety
///
/// Violating any of these is undefined behaviour unless debug assertions or
/// the `checked` feature turn them into panics:
///
/// - without `PANEL_MODE`, `stride == 0 && offset == 0`;
/// - with `PANEL_MODE`, `offset + depth <= stride`;
/// - `block_a` holds at least `rows * stride` (panel) or `rows * depth` scalars;
/// - every coefficient `(i, k)` with `i < rows`, `k < depth` lies inside `lhs`.
#[allow(clippy::too_many_arguments)]
#[inline]
pub unsafe fn pack_lhs<P, O, const MP: usize, const CONJUGATE: bool, const PANEL_MODE: bool>(
    block_a: &mut [P::Scalar],
    lhs: &[P::Scalar],
    lhs_stride: usize,
    depth: usize,
    rows: usize,
    stride: usize,
    offset: usize,
) where
    P: Packet,
    O: StorageOrder,
{
    let lanes = P::LANES;
    let mr = MP * lanes;

    check_panel::<PANEL_MODE>(depth, stride, offset);
    let slot = slot_depth::<PANEL_MODE>(depth, stride);
    gebp_assert!(
        block_a.len() >= rows * slot,
        "packed lhs needs {} scalars, buffer holds {}",
        rows * slot,
        block_a.len()
    );

    let src = DataMapper::<_, O>::new(lhs, lhs_stride);
    gebp_assert!(
        src.covers(rows, depth),
        "lhs slice does not cover a {}x{} panel",
        rows,
        depth
    );

    let mut count = 0;
    for band in row_bands(rows, mr, lanes) {
        let i = band.start();
        let h = band.height(mr, lanes);
        if PANEL_MODE {
            count += h * offset;
        }
        for k in 0..depth {
            for w in 0..h {
                let value = src.get(i + w, k);
                *block_a.get_unchecked_mut(count) = if CONJUGATE { value.conj() } else { value };
                count += 1;
            }
        }
        if PANEL_MODE {
            count += h * (stride - offset - depth);
        }
    }
}
