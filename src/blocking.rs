//! Cache blocking parameters for the blocked product.

use crate::error::{blocking_error, Result};
use crate::scalar::Scalar;
use crate::simd::Packet;
use crate::{KC, MC, MR_PACKETS, NC, NR};

/// Assumed L1 data cache size in bytes.
pub const L1_CACHE: usize = 32 * 1024;
/// Assumed L2 cache size in bytes.
pub const L2_CACHE: usize = 256 * 1024;
/// Assumed L3 cache size in bytes.
pub const L3_CACHE: usize = 8 * 1024 * 1024;

/// Block sizes of the three outer loops.
///
/// - `mc`: rows of the left operand packed at once (an L2-resident block).
/// - `kc`: depth of one packed block (an `mr × kc` sliver stays in L1).
/// - `nc`: columns of the right operand packed at once (an L3-resident panel).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Blocking {
    pub(crate) mc: usize,
    pub(crate) kc: usize,
    pub(crate) nc: usize,
}

impl Blocking {
    /// Explicit block sizes; each must be non-zero.
    pub fn new(mc: usize, kc: usize, nc: usize) -> Result<Self> {
        if mc == 0 || kc == 0 || nc == 0 {
            return Err(blocking_error(format!(
                "block sizes must be non-zero, got mc={} kc={} nc={}",
                mc, kc, nc
            )));
        }
        Ok(Self { mc, kc, nc })
    }

    /// Block sizes derived from the cache sizes for scalar type `T`.
    ///
    /// `kc` keeps an `mr × kc` lhs sliver and a `kc × nr` rhs sliver in L1,
    /// `mc` fills L2 with the packed lhs block and `nc` fills L3 with the packed
    /// rhs panel. Each is capped by the crate-wide [`MC`], [`KC`] and [`NC`]
    /// and rounded down to a multiple of the tile size.
    pub fn for_scalar<T: Scalar>() -> Self {
        let elem_size = std::mem::size_of::<T>();
        let mr = MR_PACKETS * <T::Packet as Packet>::LANES;

        let kc = ((L1_CACHE / elem_size) / (mr + NR)).clamp(1, KC);

        let mc_raw = (L2_CACHE / elem_size).saturating_sub(kc * NR) / kc;
        let mc = (mc_raw / mr * mr).clamp(mr, MC);

        let nc_raw = (L3_CACHE / elem_size) / kc;
        let nc = (nc_raw / NR * NR).clamp(NR, NC);

        Self { mc, kc, nc }
    }

    /// Rows per packed lhs block.
    pub fn mc(&self) -> usize {
        self.mc
    }

    /// Depth per packed block.
    pub fn kc(&self) -> usize {
        self.kc
    }

    /// Columns per packed rhs panel.
    pub fn nc(&self) -> usize {
        self.nc
    }
}

impl Default for Blocking {
    fn default() -> Self {
        Self {
            mc: MC,
            kc: KC,
            nc: NC,
        }
    }
}
