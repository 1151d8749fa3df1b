//! Cache-blocked dense matrix multiplication.
//!
//! The crate is built from three pieces that every product goes through:
//!
//! - [`pack::pack_lhs`] copies a block of the left operand into row bands of
//!   height `mr` (then one packet, then single rows), optionally conjugated;
//! - [`pack::pack_rhs`] copies a panel of the right operand into column tiles
//!   of width `nr`, optionally scaled by `alpha`;
//! - [`kernel::gebp`] multiplies the two packed buffers and accumulates into a
//!   column-major result, one `mr × nr` register tile at a time.
//!
//! These are `unsafe fn`s with documented preconditions. [`gemm()`] and
//! [`par_gemm`] drive them over safe [`MatRef`] / [`MatMut`] views of any
//! layout, with the blocking loops and packing buffers handled internally.

#[macro_use]
mod macros;

pub mod blocking;
pub mod conj;
pub mod error;
pub mod gemm;
pub mod kernel;
pub mod mapper;
pub mod pack;
pub mod scalar;
pub mod simd;
pub mod tiling;
pub mod view;
pub mod workspace;

pub use blocking::Blocking;
pub use conj::{ConjBoth, ConjLhs, ConjPolicy, ConjRhs, NoConj};
pub use error::{GebpError, Result};
pub use gemm::{gemm, gemm_with, par_gemm, par_gemm_with};
pub use mapper::{ColMajor, RowMajor, StorageOrder};
pub use scalar::Scalar;
pub use simd::{Lanes, Packet};
pub use view::{MatMut, MatRef};
pub use workspace::Workspace;

/// Packets per row tile used by [`gemm()`]: `mr = MR_PACKETS * LANES`.
pub const MR_PACKETS: usize = 2;
/// Columns per tile used by [`gemm()`].
pub const NR: usize = 4;

/// Upper bound on the rows of a packed lhs block.
pub const MC: usize = 192;
/// Upper bound on the depth of a packed block.
pub const KC: usize = 256;
/// Upper bound on the columns of a packed rhs panel.
pub const NC: usize = 4096;
