//! Implementations of the finite fields.
//!
//! The data model fixes 64-bit little-endian limbs (four limbs for the
//! scalar field, six for the base field), so a single 64-bit backend is
//! provided. The structures defined here are specialized for a single
//! field each; the modulus and all derived Montgomery constants are
//! computed at compile time from the modulus limbs alone.
//!
//! The following properties apply to the field implementations:
//!
//!  - An instance encapsulates a field element, held internally in
//!    Montgomery representation. There is a single valid internal
//!    representation for each element.
//!
//!  - The constant values `Self::ZERO` and `Self::ONE` contain the
//!    elements of value 0 and 1, respectively.
//!
//!  - Usual arithmetic operators can be used on field elements (`+`,
//!    `-`, `*`, `/`, and the compound assignments `+=`, `-=`, `*=` and
//!    `/=`). Division by zero is tolerated, and yields zero (regardless
//!    of the dividend); division is a constant-time inversion followed
//!    by a multiplication. Operators can use both the raw types, and
//!    references thereof.
//!
//!  - Function `set_square(&mut self)` squares a field element (in
//!    place); `square(self) -> Self` returns the result as a new
//!    instance. These are somewhat faster than general multiplications.
//!    Sequences of squarings use `set_xsquare(&mut self, n: u32)` (and
//!    the corresponding `xsquare()`).
//!
//!  - Function `set_cond(&mut self, a: &Self, ctl: u32)` sets the
//!    instance to the value of `a` if `ctl` is 0xFFFFFFFF, or leaves it
//!    unmodified if `ctl` is 0x00000000. `select(a0, a1, ctl)` and
//!    `cswap(a, b, ctl)` follow the same convention. `set_condneg(ctl)`
//!    negates the element under the same convention (negating zero
//!    yields zero).
//!
//!  - Functions `set_half()`, `set_mul2()`, `set_mul3()`, `set_mul4()`,
//!    `set_mul8()`, `set_mul16()` and `set_mul32()` multiply their
//!    operand (in place) by 1/2, 2, 3, 4, 8, 16 or 32, respectively,
//!    faster than a generic multiplication; `lshift(n)` and `rshift(n)`
//!    apply n modular doublings or halvings.
//!
//!  - Function `equals(self, rhs: Self) -> u32` returns 0xFFFFFFFF if
//!    `self` and `rhs` represent the same value, 0x00000000 otherwise;
//!    `iszero(self) -> u32` compares with zero.
//!
//!  - `invert()` computes the modular inverse (zero maps to zero),
//!    `legendre()` the Legendre symbol (-1, 0 or +1), `is_square()` the
//!    corresponding 0xFFFFFFFF/0 mask (zero counts as a square), and
//!    `sgn0_pty()` the packed parity/sign pair of the canonical
//!    representative. All of them run in time independent of the
//!    operand value.
//!
//!  - Constant values can be defined with the const-qualified `w64le()`
//!    and `w64be()` functions, which take the value as 64-bit limbs in
//!    little-endian and big-endian order, respectively (implicitly
//!    reduced modulo the field order). The non-const `from_w64le()` and
//!    `from_w64be()` are faster and preferred at runtime.
//!
//!  - `encode()` yields the canonical little-endian bytes;
//!    `decode_ct()` / `decode()` decode canonical bytes with a
//!    constant-time validity status; `decode_reduce()` decodes an
//!    arbitrary-length byte string with implicit modular reduction.

pub mod w64;

pub use w64::{Fp, Fp2, Scalar};
