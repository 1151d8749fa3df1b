//! Operand packing.
//!
//! Both packers copy a panel of an operand into a flat buffer whose layout
//! matches the traversal order of [`crate::kernel::gebp`]:
//!
//! - [`pack_lhs`] writes, for every row band of height `h`, the `h × depth`
//!   block depth-major with the `h` rows of the band contiguous per depth index.
//! - [`pack_rhs`] writes, for every column tile of width `nr` (or 1), the
//!   `depth × nr` block with the `nr` columns contiguous per depth index,
//!   optionally scaled by `alpha`.
//!
//! In panel mode each band or tile occupies a `stride`-deep slot and the
//! packed depth range starts `offset` entries into it, so a wide panel can be
//! filled one depth block at a time and then consumed in slices.

pub mod lhs;
pub mod rhs;

pub use lhs::pack_lhs;
pub use rhs::{pack_rhs, pack_rhs_col_major, pack_rhs_row_major};

/// Depth slot of one band or tile: `stride` in panel mode, `depth` otherwise.
#[inline(always)]
pub(crate) fn slot_depth<const PANEL_MODE: bool>(depth: usize, stride: usize) -> usize {
    if PANEL_MODE {
        stride
    } else {
        depth
    }
}

/// Checks the `stride`/`offset` contract shared by both packers.
#[inline(always)]
pub(crate) fn check_panel<const PANEL_MODE: bool>(depth: usize, stride: usize, offset: usize) {
    if PANEL_MODE {
        gebp_assert!(
            stride >= depth && offset <= stride - depth,
            "panel mode: offset {} + depth {} exceeds stride {}",
            offset,
            depth,
            stride
        );
    } else {
        gebp_assert!(
            stride == 0 && offset == 0,
            "stride and offset are only meaningful in panel mode"
        );
    }
}
