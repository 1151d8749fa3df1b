//! AVX packets for 256-bit registers.
//!
//! This module is only compiled with `target_feature = "avx"`. It then
//! provides the default packet for `f32`.

pub mod f32x8;

pub use f32x8::F32x8;
