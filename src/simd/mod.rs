//! Packet abstraction used by the packers and micro-kernels.
//!
//! A packet is a fixed number of scalars ([`Packet::LANES`]) that the kernel
//! loads, multiplies and accumulates as a unit. The portable [`Lanes`] type
//! works for every scalar and leaves vectorisation to the optimiser. When the
//! compilation enables AVX (`-C target-feature=+avx` or
//! `-C target-cpu=native`), `avx::F32x8` wraps a `__m256` register directly.
//! The intrinsics only inline into the kernel under that target feature, so
//! host detection alone never selects it.

use std::fmt::Debug;

use num::Zero;

use crate::scalar::Scalar;

#[cfg(all(target_feature = "avx", any(target_arch = "x86", target_arch = "x86_64")))]
pub mod avx;

pub mod lanes;

pub use lanes::Lanes;

/// A register-width group of scalars.
///
/// Loads and stores are unaligned: packed buffers are aligned, but the result
/// matrix is addressed at arbitrary row offsets.
pub trait Packet: Copy + Debug + Send + Sync + 'static {
    /// Scalar type held in every lane.
    type Scalar: Scalar;

    /// Number of scalars per packet.
    const LANES: usize;

    /// Replicates `value` into every lane.
    fn splat(value: Self::Scalar) -> Self;

    /// All-zero packet.
    #[inline(always)]
    fn zero() -> Self {
        Self::splat(<Self::Scalar as Zero>::zero())
    }

    /// Loads `LANES` consecutive scalars.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `LANES` scalars.
    unsafe fn load(ptr: *const Self::Scalar) -> Self;

    /// Stores the lanes to `LANES` consecutive scalars.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes of `LANES` scalars.
    unsafe fn store_at(self, ptr: *mut Self::Scalar);

    /// Lane-wise addition.
    fn add(self, rhs: Self) -> Self;

    /// Lane-wise multiplication.
    fn mul(self, rhs: Self) -> Self;

    /// Lane-wise complex conjugate (identity for real scalars).
    fn conj(self) -> Self;
}
