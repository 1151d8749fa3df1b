//! Block-panel micro-kernel.
//!
//! [`gebp`] multiplies a packed left block (see [`crate::pack::pack_lhs`]) by
//! a packed right panel (see [`crate::pack::pack_rhs`]) and accumulates the
//! product into a column-major result:
//!
//! ```text
//! for each column tile (NR wide, then 1 wide):
//!     broadcast the tile's packed values into `unpacked_b`
//!     for each row band (mr rows, one packet, then single rows):
//!         acc = 0
//!         for k in 0..depth (peeled by 4):
//!             acc += a(band, k) * b(k, tile)
//!         res(band, tile) += acc
//! ```
//!
//! The accumulator of a band is `MP × W` packets held in registers for the
//! whole depth sweep, and the tile body is written once for every band height
//! and tile width.

use std::marker::PhantomData;

use num::Zero;

use crate::conj::ConjPolicy;
use crate::simd::Packet;
use crate::tiling::{col_tiles, row_bands, ColTile, RowBand};

/// Depth unroll factor of the inner loops.
const PEEL: usize = 4;

/// Row tile height for `MP` packets of `P`.
#[inline(always)]
pub fn mr<P: Packet, const MP: usize>() -> usize {
    MP * P::LANES
}

/// Minimum length of the `unpacked_b` scratch buffer for a given depth.
#[inline(always)]
pub fn unpacked_len<P: Packet, const NR: usize>(depth: usize) -> usize {
    depth * NR * P::LANES
}

/// Computes `res += C(block_a) * C(block_b)` for a `rows × depth` packed left
/// block and a `depth × cols` packed right panel.
///
/// `res` is column-major with leading dimension `res_stride`. `block_a` was
/// packed with tile height `mr::<P, MP>()` and `block_b` with tile width `NR`;
/// `stride_a` / `stride_b` are their panel strides (`None` means `depth`) and
/// `offset_a` / `offset_b` the depth position inside each panel slot.
/// `unpacked_b` is scratch space for the broadcast right tile.
///
/// # Safety
///
/// Violating any of these is undefined behaviour unless debug assertions or
/// the `checked` feature turn them into panics:
///
/// - `res_stride >= rows` and `res` holds `(cols - 1) * res_stride + rows` scalars;
/// - `offset_a + depth <= stride_a` and `block_a` holds `rows * stride_a` scalars;
/// - `offset_b + depth <= stride_b` and `block_b` holds `cols * stride_b` scalars;
/// - `unpacked_b` holds at least [`unpacked_len::<P, NR>(depth)`](unpacked_len) scalars.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gebp<P, C, const MP: usize, const NR: usize>(
    res: &mut [P::Scalar],
    res_stride: usize,
    block_a: &[P::Scalar],
    block_b: &[P::Scalar],
    rows: usize,
    depth: usize,
    cols: usize,
    stride_a: Option<usize>,
    stride_b: Option<usize>,
    offset_a: usize,
    offset_b: usize,
    unpacked_b: &mut [P::Scalar],
) where
    P: Packet,
    C: ConjPolicy,
{
    let stride_a = stride_a.unwrap_or(depth);
    let stride_b = stride_b.unwrap_or(depth);

    gebp_assert!(
        stride_a >= depth && offset_a <= stride_a - depth,
        "lhs panel: offset {} + depth {} exceeds stride {}",
        offset_a,
        depth,
        stride_a
    );
    gebp_assert!(
        stride_b >= depth && offset_b <= stride_b - depth,
        "rhs panel: offset {} + depth {} exceeds stride {}",
        offset_b,
        depth,
        stride_b
    );
    if rows == 0 || cols == 0 || depth == 0 {
        return;
    }
    gebp_assert!(
        res_stride >= rows,
        "result stride {} is smaller than {} rows",
        res_stride,
        rows
    );
    gebp_assert!(
        res.len() >= (cols - 1) * res_stride + rows,
        "result holds {} scalars, {}x{} with stride {} needs more",
        res.len(),
        rows,
        cols,
        res_stride
    );
    gebp_assert!(
        block_a.len() >= rows * stride_a,
        "packed lhs holds {} scalars, needs {}",
        block_a.len(),
        rows * stride_a
    );
    gebp_assert!(
        block_b.len() >= cols * stride_b,
        "packed rhs holds {} scalars, needs {}",
        block_b.len(),
        cols * stride_b
    );
    gebp_assert!(
        unpacked_b.len() >= unpacked_len::<P, NR>(depth),
        "unpacked scratch holds {} scalars, needs {}",
        unpacked_b.len(),
        unpacked_len::<P, NR>(depth)
    );

    let rows_pass = RowPass::<P, C, MP> {
        rows,
        depth,
        stride_a,
        offset_a,
        res_stride,
        _marker: PhantomData,
    };

    for tile in col_tiles(cols, NR) {
        let j2 = tile.start();
        let width = tile.width(NR);
        let packed_b = block_b.as_ptr().add(j2 * stride_b + offset_b * width);
        unpack::<P>(packed_b, depth * width, unpacked_b.as_mut_ptr());

        let res_tile = res.as_mut_ptr().add(j2 * res_stride);
        match tile {
            ColTile::Full { .. } => {
                rows_pass.sweep::<NR>(res_tile, block_a.as_ptr(), packed_b, unpacked_b.as_ptr())
            }
            ColTile::Single { .. } => {
                rows_pass.sweep::<1>(res_tile, block_a.as_ptr(), packed_b, unpacked_b.as_ptr())
            }
        }
    }
}

/// Broadcasts `n` packed scalars into `n` packets.
#[inline(always)]
unsafe fn unpack<P: Packet>(packed: *const P::Scalar, n: usize, unpacked: *mut P::Scalar) {
    for k in 0..n {
        P::splat(*packed.add(k)).store_at(unpacked.add(k * P::LANES));
    }
}

/// Calls `step(k)` for every `k` in `0..depth`, four at a time.
#[inline(always)]
fn sweep_depth(depth: usize, mut step: impl FnMut(usize)) {
    let peeled = depth - depth % PEEL;
    let mut k = 0;
    while k < peeled {
        step(k);
        step(k + 1);
        step(k + 2);
        step(k + 3);
        k += PEEL;
    }
    while k < depth {
        step(k);
        k += 1;
    }
}

/// Per-call constants of the row sweep.
struct RowPass<P, C, const MP: usize> {
    rows: usize,
    depth: usize,
    stride_a: usize,
    offset_a: usize,
    res_stride: usize,
    _marker: PhantomData<(P, C)>,
}

impl<P: Packet, C: ConjPolicy, const MP: usize> RowPass<P, C, MP> {
    /// Runs every row band against one `W`-wide column tile.
    ///
    /// `res` points at row 0 of the tile's first column, `block_a` at the
    /// start of the packed left block.
    #[inline(always)]
    unsafe fn sweep<const W: usize>(
        &self,
        res: *mut P::Scalar,
        block_a: *const P::Scalar,
        packed_b: *const P::Scalar,
        unpacked_b: *const P::Scalar,
    ) {
        let lanes = P::LANES;
        let mr = MP * lanes;
        for band in row_bands(self.rows, mr, lanes) {
            match band {
                RowBand::Full { start } => self.packet_tile::<MP, W>(
                    res.add(start),
                    block_a.add(start * self.stride_a + self.offset_a * mr),
                    unpacked_b,
                ),
                RowBand::Packet { start } => self.packet_tile::<1, W>(
                    res.add(start),
                    block_a.add(start * self.stride_a + self.offset_a * lanes),
                    unpacked_b,
                ),
                RowBand::Single { row } => self.scalar_row::<W>(
                    res.add(row),
                    block_a.add(row * self.stride_a + self.offset_a),
                    packed_b,
                ),
            }
        }
    }

    /// `BP` packets tall, `W` columns wide.
    #[inline(always)]
    unsafe fn packet_tile<const BP: usize, const W: usize>(
        &self,
        res: *mut P::Scalar,
        a: *const P::Scalar,
        unpacked_b: *const P::Scalar,
    ) {
        let lanes = P::LANES;
        let height = BP * lanes;
        let mut acc = [[P::zero(); W]; BP];

        sweep_depth(self.depth, |k| {
            let mut a_packets = [P::zero(); BP];
            for (p, a_packet) in a_packets.iter_mut().enumerate() {
                *a_packet = P::load(a.add(k * height + p * lanes));
            }
            for c in 0..W {
                let b = P::load(unpacked_b.add((k * W + c) * lanes));
                for p in 0..BP {
                    acc[p][c] = C::pmadd(a_packets[p], b, acc[p][c]);
                }
            }
        });

        for c in 0..W {
            let col = res.add(c * self.res_stride);
            for (p, row) in acc.iter().enumerate() {
                let dst = col.add(p * lanes);
                P::load(dst).add(row[c]).store_at(dst);
            }
        }
    }

    /// One row, `W` columns wide, read straight from the packed right panel.
    #[inline(always)]
    unsafe fn scalar_row<const W: usize>(
        &self,
        res: *mut P::Scalar,
        a: *const P::Scalar,
        packed_b: *const P::Scalar,
    ) {
        let mut acc = [<P::Scalar as Zero>::zero(); W];

        sweep_depth(self.depth, |k| {
            let a_k = *a.add(k);
            for (c, acc_c) in acc.iter_mut().enumerate() {
                *acc_c = C::madd(a_k, *packed_b.add(k * W + c), *acc_c);
            }
        });

        for (c, value) in acc.into_iter().enumerate() {
            let dst = res.add(c * self.res_stride);
            *dst = *dst + value;
        }
    }
}
