//! Scalar types the engine multiplies.

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

use num::{Complex, One, Zero};

use crate::simd::{Lanes, Packet};

/// Element type of the operands and the result.
///
/// Implemented for `f32`, `f64`, `Complex<f32>` and `Complex<f64>`. Every
/// implementor must be valid when all of its bytes are zero, which is what the
/// packing buffers rely on.
pub trait Scalar:
    Copy
    + PartialEq
    + Debug
    + Send
    + Sync
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + 'static
{
    /// `true` for complex scalars, where conjugation is not the identity.
    const IS_COMPLEX: bool;

    /// Machine epsilon of the underlying real type.
    const EPSILON: f64;

    /// Packet used by [`crate::gemm()`] for this scalar.
    type Packet: Packet<Scalar = Self>;

    /// Complex conjugate (identity for real scalars).
    fn conj(self) -> Self;

    /// Absolute value / modulus, widened to `f64`.
    fn magnitude(self) -> f64;

    /// Builds a scalar from real and imaginary parts; real scalars drop `im`.
    fn from_parts(re: f64, im: f64) -> Self;
}

impl Scalar for f32 {
    const IS_COMPLEX: bool = false;
    const EPSILON: f64 = f32::EPSILON as f64;

    #[cfg(all(target_feature = "avx", any(target_arch = "x86", target_arch = "x86_64")))]
    type Packet = crate::simd::avx::F32x8;
    #[cfg(not(all(target_feature = "avx", any(target_arch = "x86", target_arch = "x86_64"))))]
    type Packet = Lanes<f32, 8>;

    #[inline(always)]
    fn conj(self) -> Self {
        self
    }

    fn magnitude(self) -> f64 {
        self.abs() as f64
    }

    fn from_parts(re: f64, _im: f64) -> Self {
        re as f32
    }
}

impl Scalar for f64 {
    const IS_COMPLEX: bool = false;
    const EPSILON: f64 = f64::EPSILON;

    type Packet = Lanes<f64, 2>;

    #[inline(always)]
    fn conj(self) -> Self {
        self
    }

    fn magnitude(self) -> f64 {
        self.abs()
    }

    fn from_parts(re: f64, _im: f64) -> Self {
        re
    }
}

impl Scalar for Complex<f32> {
    const IS_COMPLEX: bool = true;
    const EPSILON: f64 = f32::EPSILON as f64;

    type Packet = Lanes<Complex<f32>, 2>;

    #[inline(always)]
    fn conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }

    fn magnitude(self) -> f64 {
        self.norm() as f64
    }

    fn from_parts(re: f64, im: f64) -> Self {
        Complex::new(re as f32, im as f32)
    }
}

impl Scalar for Complex<f64> {
    const IS_COMPLEX: bool = true;
    const EPSILON: f64 = f64::EPSILON;

    type Packet = Lanes<Complex<f64>, 1>;

    #[inline(always)]
    fn conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }

    fn magnitude(self) -> f64 {
        self.norm()
    }

    fn from_parts(re: f64, im: f64) -> Self {
        Complex::new(re, im)
    }
}
