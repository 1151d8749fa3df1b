//! Conjugation policies for the micro-kernel.
//!
//! The policy is a type parameter of [`crate::kernel::gebp`], so the choice of
//! which operand to conjugate is fixed per instantiation and the branches
//! below fold away at compile time. For real scalars every policy computes the
//! same thing.

use std::fmt::Debug;

use crate::scalar::Scalar;
use crate::simd::Packet;

/// Conjugate-aware multiply-add: `c + op(a) * op(b)`.
pub trait ConjPolicy: Copy + Default + Debug + Send + Sync + 'static {
    /// Conjugate the left factor.
    const LHS: bool;
    /// Conjugate the right factor.
    const RHS: bool;

    /// Packet form.
    #[inline(always)]
    fn pmadd<P: Packet>(a: P, b: P, c: P) -> P {
        let a = if Self::LHS { a.conj() } else { a };
        let b = if Self::RHS { b.conj() } else { b };
        c.add(a.mul(b))
    }

    /// Scalar form, used by the single-row remainder path.
    #[inline(always)]
    fn madd<T: Scalar>(a: T, b: T, c: T) -> T {
        let a = if Self::LHS { a.conj() } else { a };
        let b = if Self::RHS { b.conj() } else { b };
        c + a * b
    }
}

/// `c + a * b`
#[derive(Copy, Clone, Debug, Default)]
pub struct NoConj;

/// `c + conj(a) * b`
#[derive(Copy, Clone, Debug, Default)]
pub struct ConjLhs;

/// `c + a * conj(b)`
#[derive(Copy, Clone, Debug, Default)]
pub struct ConjRhs;

/// `c + conj(a) * conj(b)`
#[derive(Copy, Clone, Debug, Default)]
pub struct ConjBoth;

impl ConjPolicy for NoConj {
    const LHS: bool = false;
    const RHS: bool = false;
}

impl ConjPolicy for ConjLhs {
    const LHS: bool = true;
    const RHS: bool = false;
}

impl ConjPolicy for ConjRhs {
    const LHS: bool = false;
    const RHS: bool = true;
}

impl ConjPolicy for ConjBoth {
    const LHS: bool = true;
    const RHS: bool = true;
}
