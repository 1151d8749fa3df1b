//! Right-operand packer.

use crate::mapper::{ColMajor, DataMapper, RowMajor, StorageOrder};
use crate::pack::{check_panel, slot_depth};
use crate::scalar::Scalar;
use crate::tiling::{col_tiles, ColTile};

/// Packs the `depth × cols` panel of `rhs` into `block_b`, scaled by `alpha`.
///
/// Columns are split into full `NR` tiles followed by width-1 tiles; every
/// tile of width `w` is written as `block_b[base + k * w + c] = rhs(k, j + c)`.
/// `alpha != 1` is tested once: with `alpha == 1` values are copied
/// verbatim. The single-column tiles of a row-major source are always
/// multiplied by `alpha`.
///
/// Dispatches on `O` to [`pack_rhs_col_major`] or [`pack_rhs_row_major`].
///
/// # Safety
///
/// Same contract as [`crate::pack::pack_lhs`], with `cols` in place of `rows`
/// and `block_b` holding at least `cols * stride` (panel) or `cols * depth`
/// scalars.
#[allow(clippy::too_many_arguments)]
#[inline]
pub unsafe fn pack_rhs<T, O, const NR: usize, const PANEL_MODE: bool>(
    block_b: &mut [T],
    rhs: &[T],
    rhs_stride: usize,
    alpha: T,
    depth: usize,
    cols: usize,
    stride: usize,
    offset: usize,
) where
    T: Scalar,
    O: StorageOrder,
{
    if O::IS_ROW_MAJOR {
        pack_rhs_row_major::<T, NR, PANEL_MODE>(
            block_b, rhs, rhs_stride, alpha, depth, cols, stride, offset,
        )
    } else {
        pack_rhs_col_major::<T, NR, PANEL_MODE>(
            block_b, rhs, rhs_stride, alpha, depth, cols, stride, offset,
        )
    }
}

/// [`pack_rhs`] for a column-major source: `rhs(k, j)` is `rhs[j * rhs_stride + k]`.
///
/// # Safety
///
/// See [`pack_rhs`].
#[allow(clippy::too_many_arguments)]
pub unsafe fn pack_rhs_col_major<T: Scalar, const NR: usize, const PANEL_MODE: bool>(
    block_b: &mut [T],
    rhs: &[T],
    rhs_stride: usize,
    alpha: T,
    depth: usize,
    cols: usize,
    stride: usize,
    offset: usize,
) {
    let src = DataMapper::<_, ColMajor>::new(rhs, rhs_stride);
    pack_tiles::<T, ColMajor, NR, PANEL_MODE, false>(
        block_b, &src, alpha, depth, cols, stride, offset,
    )
}

/// [`pack_rhs`] for a row-major source: `rhs(k, j)` is `rhs[k * rhs_stride + j]`.
///
/// # Safety
///
/// See [`pack_rhs`].
#[allow(clippy::too_many_arguments)]
pub unsafe fn pack_rhs_row_major<T: Scalar, const NR: usize, const PANEL_MODE: bool>(
    block_b: &mut [T],
    rhs: &[T],
    rhs_stride: usize,
    alpha: T,
    depth: usize,
    cols: usize,
    stride: usize,
    offset: usize,
) {
    let src = DataMapper::<_, RowMajor>::new(rhs, rhs_stride);
    pack_tiles::<T, RowMajor, NR, PANEL_MODE, true>(
        block_b, &src, alpha, depth, cols, stride, offset,
    )
}

/// Shared tile walk. `SCALE_REMAINDER` forces the multiply by `alpha` on
/// width-1 tiles.
#[inline(always)]
unsafe fn pack_tiles<T, O, const NR: usize, const PANEL_MODE: bool, const SCALE_REMAINDER: bool>(
    block_b: &mut [T],
    src: &DataMapper<'_, T, O>,
    alpha: T,
    depth: usize,
    cols: usize,
    stride: usize,
    offset: usize,
) where
    T: Scalar,
    O: StorageOrder,
{
    check_panel::<PANEL_MODE>(depth, stride, offset);
    let slot = slot_depth::<PANEL_MODE>(depth, stride);
    gebp_assert!(
        block_b.len() >= cols * slot,
        "packed rhs needs {} scalars, buffer holds {}",
        cols * slot,
        block_b.len()
    );
    gebp_assert!(
        src.covers(depth, cols),
        "rhs slice does not cover a {}x{} panel",
        depth,
        cols
    );

    let has_alpha = alpha != T::one();
    let mut count = 0;
    for tile in col_tiles(cols, NR) {
        let j2 = tile.start();
        let width = tile.width(NR);
        let scale = match tile {
            ColTile::Full { .. } => has_alpha,
            ColTile::Single { .. } => has_alpha || SCALE_REMAINDER,
        };
        if PANEL_MODE {
            count += width * offset;
        }
        for k in 0..depth {
            for c in 0..width {
                let value = src.get(k, j2 + c);
                *block_b.get_unchecked_mut(count) = if scale { alpha * value } else { value };
                count += 1;
            }
        }
        if PANEL_MODE {
            count += width * (stride - offset - depth);
        }
    }
}
