//! gf381 implements the finite fields underlying the BLS12-381
//! pairing-friendly elliptic curve: the 381-bit base field GF(p), its
//! quadratic extension GF(p^2) = GF(p)[u]/(u^2 + 1), and the 255-bit
//! scalar field GF(r). It is meant to be consumed by curve-point and
//! pairing code layered above it; this crate itself contains no curve
//! arithmetic.
//!
//! All field elements are held internally in Montgomery representation,
//! over 64-bit little-endian limbs (four limbs for the scalar field, six
//! for the base field). Multiplication and squaring use an interleaved
//! multiply-reduce; inversion and the quadratic-residue (Legendre) test
//! share a windowed binary GCD whose iteration count depends only on the
//! field width; the extension field multiplies with three wide products
//! and a single reduction pass per component.
//!
//! # Conventions
//!
//! All implemented functions are strictly constant-time: no branch, loop
//! bound or memory address depends on secret operand values. In order to
//! avoid unwanted side-channel leaks, Booleans are avoided (compilers
//! tend to "optimize" things a bit too eagerly when handling `bool`
//! values). All functions that return or use a potentially secret
//! Boolean value use the `u32` type; the convention is that 0xFFFFFFFF
//! means "true", and 0x00000000 means "false". No other value shall be
//! used, for they would lead to unpredictable results. Similarly, the
//! `Eq` or `PartialEq` traits are not implemented on field elements.
//!
//! Operations on field elements are performed with the usual operators
//! (e.g. `+`); appropriate traits are defined so that structure types
//! and references to structure types can be used more or less
//! interchangeably. Functions that modify the object on which they are
//! called have a name in `set_*()` (e.g. `x.set_square()` squares `x` in
//! place, while `x.square()` leaves `x` unmodified and returns the
//! square as a new instance).
//!
//! # Usage
//!
//! The library is "mostly `no_std`". By default, it compiles against the
//! standard library, which enables the one-time CPU capability probe in
//! the `dispatch` module. Without the `std` feature, all functionality
//! is still available; the portable kernels are then used
//! unconditionally.
//!
//! No inline assembly is used. On x86-64 architectures, the
//! `_addcarry_u64()` and `_subborrow_u64()` intrinsics are used (from
//! `core::arch::x86_64`); plain implementations with no intrinsics are
//! available and used everywhere else.

#![no_std]

#[cfg(feature = "std")]
#[macro_use]
extern crate std;

pub use rand_core::{CryptoRng, RngCore, Error as RngError};

pub mod backend;
pub mod dispatch;
pub mod field;
