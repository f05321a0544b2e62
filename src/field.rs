//! Finite fields.
//!
//! This module re-exports the concrete field types implemented by the
//! backend: the BLS12-381 base field `Fp`, its quadratic extension
//! `Fp2`, and the scalar field `Scalar`.

pub use crate::backend::{Fp, Fp2, Scalar};
