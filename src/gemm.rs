//! General matrix-matrix product driver.
//!
//! `dst += alpha * op(lhs) * op(rhs)`, where `op` optionally conjugates.
//!
//! The driver follows the Goto/van de Geijn loop nest:
//!
//! 1. `jc` over the columns of `dst` in steps of `nc` (parallel in [`par_gemm`]);
//! 2. `pc` over the depth in steps of `kc`, packing a `kc × nc` rhs panel;
//! 3. `ic` over the rows in steps of `mc`, packing an `mc × kc` lhs block;
//! 4. one [`gebp`] call per lhs block.
//!
//! Left conjugation is applied by the lhs packer, right conjugation by the
//! kernel's [`ConjPolicy`], and `alpha` by the rhs packer.

use std::cmp::min;
use std::marker::PhantomData;

use log::{debug, trace};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::blocking::Blocking;
use crate::conj::{ConjPolicy, ConjRhs, NoConj};
use crate::error::{dimension_error, Result};
use crate::kernel::gebp;
use crate::mapper::{ColMajor, RowMajor, StorageOrder};
use crate::pack::{pack_lhs, pack_rhs};
use crate::scalar::Scalar;
use crate::view::{Layout, MatMut, MatRef};
use crate::workspace::Workspace;
use crate::{MR_PACKETS, NR};

/// `dst += alpha * op(lhs) * op(rhs)` with blocking tuned for `T`.
///
/// `conj_lhs` / `conj_rhs` conjugate the corresponding operand (a no-op for
/// real scalars).
///
/// # Errors
///
/// Returns [`crate::GebpError::DimensionMismatch`] when the shapes do not
/// compose. Nothing is written in that case.
///
/// # Examples
///
/// ```
/// use gebp::{gemm, MatMut, MatRef};
///
/// let a = [1.0, 3.0, 2.0, 4.0]; // [[1, 2], [3, 4]], column-major
/// let b = [1.0, 0.0, 0.0, 1.0];
/// let mut c = [0.0; 4];
///
/// gemm(
///     2.0,
///     MatRef::from_col_major(&a, 2, 2)?,
///     MatRef::from_col_major(&b, 2, 2)?,
///     MatMut::from_col_major(&mut c, 2, 2)?,
///     false,
///     false,
/// )?;
/// assert_eq!(c, [2.0, 6.0, 4.0, 8.0]);
/// # Ok::<(), gebp::GebpError>(())
/// ```
pub fn gemm<T: Scalar>(
    alpha: T,
    lhs: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    dst: MatMut<'_, T>,
    conj_lhs: bool,
    conj_rhs: bool,
) -> Result<()> {
    gemm_with(&Blocking::for_scalar::<T>(), alpha, lhs, rhs, dst, conj_lhs, conj_rhs)
}

/// [`gemm()`] with explicit block sizes.
pub fn gemm_with<T: Scalar>(
    blocking: &Blocking,
    alpha: T,
    lhs: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    dst: MatMut<'_, T>,
    conj_lhs: bool,
    conj_rhs: bool,
) -> Result<()> {
    run(blocking, alpha, lhs, rhs, dst, conj_lhs, conj_rhs, false)
}

/// [`gemm()`] with the `nc`-wide column blocks of `dst` spread over the rayon
/// thread pool. Every task packs into its own [`Workspace`].
pub fn par_gemm<T: Scalar>(
    alpha: T,
    lhs: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    dst: MatMut<'_, T>,
    conj_lhs: bool,
    conj_rhs: bool,
) -> Result<()> {
    par_gemm_with(&Blocking::for_scalar::<T>(), alpha, lhs, rhs, dst, conj_lhs, conj_rhs)
}

/// [`par_gemm`] with explicit block sizes.
pub fn par_gemm_with<T: Scalar>(
    blocking: &Blocking,
    alpha: T,
    lhs: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    dst: MatMut<'_, T>,
    conj_lhs: bool,
    conj_rhs: bool,
) -> Result<()> {
    run(blocking, alpha, lhs, rhs, dst, conj_lhs, conj_rhs, true)
}

#[allow(clippy::too_many_arguments)]
fn run<T: Scalar>(
    blocking: &Blocking,
    alpha: T,
    lhs: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    dst: MatMut<'_, T>,
    conj_lhs: bool,
    conj_rhs: bool,
    parallel: bool,
) -> Result<()> {
    let (m, k, n) = (lhs.rows(), lhs.cols(), rhs.cols());
    if rhs.rows() != k || dst.rows() != m || dst.cols() != n {
        return Err(dimension_error(
            (lhs.rows(), lhs.cols()),
            (rhs.rows(), rhs.cols()),
            (dst.rows(), dst.cols()),
        ));
    }

    debug!(
        "gemm {}x{} * {}x{}: {:?}, conj ({}, {}), parallel {}",
        m, k, k, n, blocking, conj_lhs, conj_rhs, parallel
    );
    if m == 0 || n == 0 || k == 0 {
        return Ok(());
    }
    accumulate(blocking, alpha, lhs, rhs, dst, conj_lhs, conj_rhs, parallel)
}

/// Routes a validated, non-empty product by destination layout.
#[allow(clippy::too_many_arguments)]
fn accumulate<T: Scalar>(
    blocking: &Blocking,
    alpha: T,
    lhs: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    mut dst: MatMut<'_, T>,
    conj_lhs: bool,
    conj_rhs: bool,
    parallel: bool,
) -> Result<()> {
    match dst.layout() {
        Layout::ColMajor(stride) => multiply(
            blocking,
            alpha,
            lhs,
            rhs,
            dst.data_mut(),
            stride,
            conj_lhs,
            conj_rhs,
            parallel,
        ),
        Layout::RowMajor(_) => {
            // dst^T += alpha * op(rhs)^T * op(lhs)^T, and dst^T is column-major.
            trace!("row-major destination: multiplying the transposed problem");
            accumulate(
                blocking,
                alpha,
                rhs.transpose(),
                lhs.transpose(),
                dst.transpose(),
                conj_rhs,
                conj_lhs,
                parallel,
            )
        }
        Layout::Strided => {
            trace!(
                "strided {}x{} destination {:?}: multiplying into a dense copy",
                dst.rows(),
                dst.cols(),
                dst.strides()
            );
            let mut dense = dst.rb().to_col_major_vec();
            multiply(
                blocking,
                alpha,
                lhs,
                rhs,
                &mut dense,
                lhs.rows(),
                conj_lhs,
                conj_rhs,
                parallel,
            )?;
            dst.copy_from_col_major(&dense);
            Ok(())
        }
    }
}

/// A packer-ready operand: a slice, its leading dimension and storage order.
enum Operand<'a, T> {
    Col(&'a [T], usize),
    Row(&'a [T], usize),
    Dense(Vec<T>, usize),
}

impl<'a, T: Scalar> Operand<'a, T> {
    fn new(view: MatRef<'a, T>, name: &str) -> Self {
        match view.layout() {
            Layout::ColMajor(stride) => Operand::Col(view.data(), stride),
            Layout::RowMajor(stride) => Operand::Row(view.data(), stride),
            Layout::Strided => {
                trace!(
                    "strided {}x{} {} {:?}: packing from a dense copy",
                    view.rows(),
                    view.cols(),
                    name,
                    view.strides()
                );
                Operand::Dense(view.to_col_major_vec(), view.rows())
            }
        }
    }

    /// `(data, stride, is_row_major)`
    fn parts(&self) -> (&[T], usize, bool) {
        match self {
            Operand::Col(data, stride) => (*data, *stride, false),
            Operand::Row(data, stride) => (*data, *stride, true),
            Operand::Dense(data, stride) => (data.as_slice(), *stride, false),
        }
    }
}

/// Shape, scaling and operands of one column-major product.
struct Problem<'a, T> {
    blocking: Blocking,
    alpha: T,
    m: usize,
    k: usize,
    n: usize,
    lhs: &'a [T],
    lhs_stride: usize,
    rhs: &'a [T],
    rhs_stride: usize,
}

/// `dst += alpha * op(lhs) * op(rhs)` into a column-major `dst`.
#[allow(clippy::too_many_arguments)]
fn multiply<T: Scalar>(
    blocking: &Blocking,
    alpha: T,
    lhs: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    dst: &mut [T],
    dst_stride: usize,
    conj_lhs: bool,
    conj_rhs: bool,
    parallel: bool,
) -> Result<()> {
    let lhs_op = Operand::new(lhs, "lhs");
    let rhs_op = Operand::new(rhs, "rhs");
    let (lhs_data, lhs_stride, lhs_row_major) = lhs_op.parts();
    let (rhs_data, rhs_stride, rhs_row_major) = rhs_op.parts();

    // Conjugation is the identity on real scalars.
    let conj_lhs = conj_lhs && T::IS_COMPLEX;
    let conj_rhs = conj_rhs && T::IS_COMPLEX;

    // The kernel conjugates the packed rhs, alpha included.
    let packed_alpha = if conj_rhs { alpha.conj() } else { alpha };

    let problem = Problem {
        blocking: effective_blocking(blocking, rhs.cols(), parallel),
        alpha: packed_alpha,
        m: lhs.rows(),
        k: lhs.cols(),
        n: rhs.cols(),
        lhs: lhs_data,
        lhs_stride,
        rhs: rhs_data,
        rhs_stride,
    };

    let dispatch = Dispatch {
        problem: &problem,
        conj_lhs,
        conj_rhs,
        parallel,
    };
    match (lhs_row_major, rhs_row_major) {
        (false, false) => dispatch.with_orders::<ColMajor, ColMajor>(dst, dst_stride),
        (false, true) => dispatch.with_orders::<ColMajor, RowMajor>(dst, dst_stride),
        (true, false) => dispatch.with_orders::<RowMajor, ColMajor>(dst, dst_stride),
        (true, true) => dispatch.with_orders::<RowMajor, RowMajor>(dst, dst_stride),
    }
}

/// Widest column block that still gives each of `threads` tasks some
/// columns: `ceil(n / threads)` rounded up to a multiple of [`NR`], capped by
/// `nc`.
fn parallel_nc(nc: usize, n: usize, threads: usize) -> usize {
    let per_thread = n.div_ceil(threads.max(1));
    nc.min((per_thread.div_ceil(NR) * NR).max(NR))
}

/// `blocking` with `nc` narrowed so that the parallel path spreads `n`
/// columns over the current rayon pool.
fn effective_blocking(blocking: &Blocking, n: usize, parallel: bool) -> Blocking {
    if !parallel {
        return *blocking;
    }
    let threads = rayon::current_num_threads();
    let nc = parallel_nc(blocking.nc, n, threads);
    if nc != blocking.nc {
        debug!("narrowing nc from {} to {} for {} threads", blocking.nc, nc, threads);
    }
    Blocking { nc, ..*blocking }
}

/// Runtime flags resolved into compile-time parameters.
struct Dispatch<'p, 'a, T> {
    problem: &'p Problem<'a, T>,
    conj_lhs: bool,
    conj_rhs: bool,
    parallel: bool,
}

impl<T: Scalar> Dispatch<'_, '_, T> {
    fn with_orders<OL: StorageOrder, OR: StorageOrder>(
        &self,
        dst: &mut [T],
        dst_stride: usize,
    ) -> Result<()> {
        match (self.conj_lhs, self.conj_rhs) {
            (false, false) => self.drive(Blocked::<T, OL, OR, false, NoConj>::new(), dst, dst_stride),
            (true, false) => self.drive(Blocked::<T, OL, OR, true, NoConj>::new(), dst, dst_stride),
            (false, true) => self.drive(Blocked::<T, OL, OR, false, ConjRhs>::new(), dst, dst_stride),
            (true, true) => self.drive(Blocked::<T, OL, OR, true, ConjRhs>::new(), dst, dst_stride),
        }
    }

    fn drive<OL, OR, const CJL: bool, C>(
        &self,
        blocked: Blocked<T, OL, OR, CJL, C>,
        dst: &mut [T],
        dst_stride: usize,
    ) -> Result<()>
    where
        OL: StorageOrder,
        OR: StorageOrder,
        C: ConjPolicy,
    {
        let p = self.problem;
        let nc = min(p.blocking.nc, p.n);
        // Only the addressed part of dst, so the chunks line up with column blocks.
        let dst = &mut dst[..(p.n - 1) * dst_stride + p.m];
        let chunk_len = dst_stride * nc;

        if self.parallel {
            dst.par_chunks_mut(chunk_len)
                .enumerate()
                .try_for_each(|(j_idx, dst_chunk)| {
                    let mut workspace = Workspace::new(&p.blocking, p.m, p.k, p.n)?;
                    blocked.column_block(p, j_idx * nc, dst_chunk, dst_stride, &mut workspace);
                    Ok(())
                })
        } else {
            let mut workspace = Workspace::new(&p.blocking, p.m, p.k, p.n)?;
            for (j_idx, dst_chunk) in dst.chunks_mut(chunk_len).enumerate() {
                blocked.column_block(p, j_idx * nc, dst_chunk, dst_stride, &mut workspace);
            }
            Ok(())
        }
    }
}

/// One monomorphised instance of the blocked loops.
struct Blocked<T, OL, OR, const CJL: bool, C> {
    _marker: PhantomData<fn() -> (T, OL, OR, C)>,
}

impl<T, OL, OR, const CJL: bool, C> Clone for Blocked<T, OL, OR, CJL, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, OL, OR, const CJL: bool, C> Copy for Blocked<T, OL, OR, CJL, C> {}

impl<T, OL, OR, const CJL: bool, C> Blocked<T, OL, OR, CJL, C>
where
    T: Scalar,
    OL: StorageOrder,
    OR: StorageOrder,
    C: ConjPolicy,
{
    fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Columns `jc..jc + nc` of the product. `dst` starts at `dst(0, jc)`.
    fn column_block(
        self,
        p: &Problem<'_, T>,
        jc: usize,
        dst: &mut [T],
        dst_stride: usize,
        workspace: &mut Workspace<T>,
    ) {
        let nc = min(p.blocking.nc, p.n - jc);

        for pc in (0..p.k).step_by(p.blocking.kc) {
            let kc = min(p.blocking.kc, p.k - pc);
            trace!("packing rhs panel pc={} jc={} ({}x{})", pc, jc, kc, nc);

            let block_b = &mut workspace.rhs[..kc * nc];
            let rhs = &p.rhs[OR::offset(pc, jc, p.rhs_stride)..];
            unsafe {
                pack_rhs::<T, OR, NR, false>(block_b, rhs, p.rhs_stride, p.alpha, kc, nc, 0, 0);
            }

            for ic in (0..p.m).step_by(p.blocking.mc) {
                let mc = min(p.blocking.mc, p.m - ic);

                let block_a = &mut workspace.lhs[..mc * kc];
                let lhs = &p.lhs[OL::offset(ic, pc, p.lhs_stride)..];
                unsafe {
                    pack_lhs::<T::Packet, OL, MR_PACKETS, CJL, false>(
                        block_a,
                        lhs,
                        p.lhs_stride,
                        kc,
                        mc,
                        0,
                        0,
                    );
                    gebp::<T::Packet, C, MR_PACKETS, NR>(
                        &mut dst[ic..],
                        dst_stride,
                        &workspace.lhs[..mc * kc],
                        &workspace.rhs[..kc * nc],
                        mc,
                        kc,
                        nc,
                        None,
                        None,
                        0,
                        0,
                        &mut workspace.unpacked,
                    );
                }
            }
        }
    }
}
