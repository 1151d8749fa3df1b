//! AVX 8-lane f32 packet.
//!
//! `F32x8` wraps an `__m256` register. The kernel multiplies then adds instead
//! of using fused multiply-add, so results round the same way as the portable
//! packets.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::Packet;

/// Number of f32 elements that fit in an AVX 256-bit vector.
pub(crate) const LANE_COUNT: usize = 8;

/// AVX vector containing 8 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// AVX 256-bit register
    pub elements: __m256,
}

impl Packet for F32x8 {
    type Scalar = f32;

    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self {
            elements: unsafe { _mm256_set1_ps(value) },
        }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        Self {
            elements: _mm256_loadu_ps(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store_at(self, ptr: *mut f32) {
        _mm256_storeu_ps(ptr, self.elements)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self {
            elements: unsafe { _mm256_add_ps(self.elements, rhs.elements) },
        }
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self {
            elements: unsafe { _mm256_mul_ps(self.elements, rhs.elements) },
        }
    }

    #[inline(always)]
    fn conj(self) -> Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_elements(vec: F32x8) -> [f32; 8] {
        let mut out = [0.0f32; 8];
        unsafe { vec.store_at(out.as_mut_ptr()) };
        out
    }

    #[test]
    fn test_splat_and_store() {
        assert_eq!(extract_elements(F32x8::splat(2.5)), [2.5; 8]);
        assert_eq!(extract_elements(F32x8::zero()), [0.0; 8]);
    }

    #[test]
    fn test_load_unaligned() {
        let data: Vec<f32> = (0..9).map(|x| x as f32).collect();
        let vec = unsafe { F32x8::load(data.as_ptr().add(1)) };
        assert_eq!(
            extract_elements(vec),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
    }

    #[test]
    fn test_add_mul() {
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let va = unsafe { F32x8::load(a.as_ptr()) };
        let vb = F32x8::splat(2.0);
        assert_eq!(
            extract_elements(va.add(vb)),
            [3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
        );
        assert_eq!(
            extract_elements(va.mul(vb)),
            [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0]
        );
        assert_eq!(extract_elements(va.conj()), a);
    }
}
