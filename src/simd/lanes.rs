//! Portable packets backed by plain arrays.

use crate::scalar::Scalar;
use crate::simd::Packet;

/// `N` scalars processed together.
///
/// Every operation is a straight-line loop over the array so the optimiser can
/// map it to whatever vector registers the target offers. This is the packet
/// used for `f64` and complex scalars everywhere, and for `f32` when AVX is not
/// available.
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(transparent)]
pub struct Lanes<T, const N: usize>(pub [T; N]);

impl<T: Scalar, const N: usize> Packet for Lanes<T, N> {
    type Scalar = T;

    const LANES: usize = N;

    #[inline(always)]
    fn splat(value: T) -> Self {
        Lanes([value; N])
    }

    #[inline(always)]
    unsafe fn load(ptr: *const T) -> Self {
        Lanes(ptr.cast::<[T; N]>().read_unaligned())
    }

    #[inline(always)]
    unsafe fn store_at(self, ptr: *mut T) {
        ptr.cast::<[T; N]>().write_unaligned(self.0)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (lhs, rhs) in out.iter_mut().zip(rhs.0) {
            *lhs = *lhs + rhs;
        }
        Lanes(out)
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (lhs, rhs) in out.iter_mut().zip(rhs.0) {
            *lhs = *lhs * rhs;
        }
        Lanes(out)
    }

    #[inline(always)]
    fn conj(self) -> Self {
        let mut out = self.0;
        for lane in out.iter_mut() {
            *lane = lane.conj();
        }
        Lanes(out)
    }
}
