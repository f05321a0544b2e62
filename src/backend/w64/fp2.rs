//! GF(p^2): quadratic extension of the BLS12-381 base field, defined
//! over GF(p)\[u\] with modulus u^2 + 1 (-1 is not a square modulo p,
//! since p = 3 mod 4).
//!
//! Multiplication uses three base-field products with lazy reduction:
//! the three double-width products are combined over 768-bit arithmetic
//! and each component goes through a single Montgomery reduction. This
//! replaces the four (or, with Karatsuba, three) full Montgomery
//! multiplications that a naive composition would use.

use super::{addcarry_u64, vect};
use super::fp::Fp;

/// Element of GF(p^2). Components are held in Montgomery
/// representation, like plain GF(p) elements.
#[derive(Clone, Copy, Debug)]
pub struct Fp2([Fp; 2]);

impl Fp2 {

    pub const ZERO: Self = Self([ Fp::ZERO, Fp::ZERO ]);
    pub const ONE: Self = Self([ Fp::ONE, Fp::ZERO ]);
    pub const MINUS_ONE: Self = Self([ Fp::MINUS_ONE, Fp::ZERO ]);
    pub const U: Self = Self([ Fp::ZERO, Fp::ONE ]);

    /// Element encoded length, in bytes.
    pub const ENC_LEN: usize = 2 * Fp::ENC_LEN;

    pub const fn fp(re: Fp, im: Fp) -> Self {
        Self([ re, im ])
    }

    pub fn from_fp(re: Fp, im: Fp) -> Self {
        Self([ re, im ])
    }

    // Get re and im (both in GF(p)) such that self = re + im*u
    #[inline(always)]
    pub fn to_components(self) -> (Fp, Fp) {
        (self.0[0], self.0[1])
    }

    #[inline(always)]
    fn set_add(&mut self, rhs: &Self) {
        self.0[0] += rhs.0[0];
        self.0[1] += rhs.0[1];
    }

    #[inline(always)]
    fn set_sub(&mut self, rhs: &Self) {
        self.0[0] -= rhs.0[0];
        self.0[1] -= rhs.0[1];
    }

    #[inline(always)]
    pub fn set_neg(&mut self) {
        self.0[0].set_neg();
        self.0[1].set_neg();
    }

    #[inline(always)]
    pub fn set_condneg(&mut self, ctl: u32) {
        self.0[0].set_condneg(ctl);
        self.0[1].set_condneg(ctl);
    }

    #[inline(always)]
    pub fn condneg(self, ctl: u32) -> Self {
        let mut r = self;
        r.set_condneg(ctl);
        r
    }

    /// Conjugate this value (negate the imaginary component). The
    /// conjugate of x is x^p.
    #[inline(always)]
    pub fn set_conj(&mut self) {
        self.0[1].set_neg();
    }

    #[inline(always)]
    pub fn conj(self) -> Self {
        let mut r = self;
        r.set_conj();
        r
    }

    #[inline(always)]
    pub fn set_cond(&mut self, a: &Self, ctl: u32) {
        self.0[0].set_cond(&a.0[0], ctl);
        self.0[1].set_cond(&a.0[1], ctl);
    }

    #[inline(always)]
    pub fn select(a0: &Self, a1: &Self, ctl: u32) -> Self {
        let mut r = *a0;
        r.set_cond(a1, ctl);
        r
    }

    #[inline(always)]
    pub fn cswap(a: &mut Self, b: &mut Self, ctl: u32) {
        Fp::cswap(&mut a.0[0], &mut b.0[0], ctl);
        Fp::cswap(&mut a.0[1], &mut b.0[1], ctl);
    }

    fn set_mul(&mut self, rhs: &Self) {
        // (a0 + a1*u)*(b0 + b1*u)
        //  = (a0*b0 - a1*b1) + ((a0 + a1)*(b0 + b1) - a0*b0 - a1*b1)*u
        // The three products are computed over plain integers; the
        // operand sums are not reduced (p < 2^381, so a sum fits in
        // six limbs and each product in twelve). The imaginary
        // combination is non-negative by construction; the real one may
        // go below zero and is fixed modulo p*2^384 before the single
        // Montgomery reduction of each component.
        let a0 = self.0[0].to_raw();
        let a1 = self.0[1].to_raw();
        let b0 = rhs.0[0].to_raw();
        let b1 = rhs.0[1].to_raw();

        let mut t0 = [0u64; 12];
        let mut t1 = [0u64; 12];
        let mut t2 = [0u64; 12];
        vect::mul_wide(&mut t0, &a0, &b0);
        vect::mul_wide(&mut t1, &a1, &b1);
        let sa = add_noreduce(&a0, &a1);
        let sb = add_noreduce(&b0, &b1);
        vect::mul_wide(&mut t2, &sa, &sb);

        vect::sub_wide_mod(&mut t2, &t0, &Fp::MODULUS);
        vect::sub_wide_mod(&mut t2, &t1, &Fp::MODULUS);
        vect::sub_wide_mod(&mut t0, &t1, &Fp::MODULUS);

        let ops = crate::dispatch::ops384();
        self.0[0] = Fp::from_raw((ops.redc_mont)(&t0, &Fp::MODULUS, Fp::M0I));
        self.0[1] = Fp::from_raw((ops.redc_mont)(&t2, &Fp::MODULUS, Fp::M0I));
    }

    pub fn set_square(&mut self) {
        // (a0 + a1*u)^2 = (a0 + a1)*(a0 - a1) + (2*a0*a1)*u
        // Two Montgomery multiplications instead of three products.
        let (a0, a1) = (self.0[0], self.0[1]);
        self.0[0] = (a0 + a1) * (a0 - a1);
        self.0[1] = a0.mul2() * a1;
    }

    #[inline(always)]
    pub fn square(self) -> Self {
        let mut r = self;
        r.set_square();
        r
    }

    #[inline(always)]
    pub fn set_xsquare(&mut self, n: u32) {
        for _ in 0..n {
            self.set_square();
        }
    }

    #[inline(always)]
    pub fn xsquare(self, n: u32) -> Self {
        let mut r = self;
        r.set_xsquare(n);
        r
    }

    // Multiply this value by an element of GF(p).
    #[inline(always)]
    pub fn set_mul_fp(&mut self, rhs: &Fp) {
        self.0[0] *= rhs;
        self.0[1] *= rhs;
    }

    #[inline(always)]
    pub fn mul_fp(self, rhs: &Fp) -> Self {
        Self([ self.0[0] * rhs, self.0[1] * rhs ])
    }

    /// Multiply this value by 1 + u (fused; used by curve doubling
    /// formulas over GF(p^2)).
    #[inline(always)]
    pub fn set_mul_u_plus_1(&mut self) {
        // (a0 + a1*u)*(1 + u) = (a0 - a1) + (a0 + a1)*u
        let (a0, a1) = (self.0[0], self.0[1]);
        self.0[0] = a0 - a1;
        self.0[1] = a0 + a1;
    }

    #[inline(always)]
    pub fn mul_u_plus_1(self) -> Self {
        let mut r = self;
        r.set_mul_u_plus_1();
        r
    }

    /// Multiply this value by u.
    #[inline(always)]
    pub fn set_mul_u(&mut self) {
        // (a0 + a1*u)*u = -a1 + a0*u
        let (a0, a1) = (self.0[0], self.0[1]);
        self.0[0] = -a1;
        self.0[1] = a0;
    }

    #[inline(always)]
    pub fn mul_u(self) -> Self {
        let mut r = self;
        r.set_mul_u();
        r
    }

    #[inline(always)]
    pub fn set_half(&mut self) {
        self.0[0].set_half();
        self.0[1].set_half();
    }

    #[inline(always)]
    pub fn half(self) -> Self {
        let mut r = self;
        r.set_half();
        r
    }

    #[inline(always)]
    pub fn set_mul2(&mut self) {
        let r = *self;
        self.set_add(&r);
    }

    #[inline(always)]
    pub fn mul2(self) -> Self {
        let mut r = self;
        r.set_mul2();
        r
    }

    #[inline(always)]
    pub fn set_mul3(&mut self) {
        self.0[0] = self.0[0].mul3();
        self.0[1] = self.0[1].mul3();
    }

    #[inline(always)]
    pub fn mul3(self) -> Self {
        let mut r = self;
        r.set_mul3();
        r
    }

    #[inline(always)]
    pub fn set_mul4(&mut self) {
        self.0[0] = self.0[0].mul4();
        self.0[1] = self.0[1].mul4();
    }

    #[inline(always)]
    pub fn mul4(self) -> Self {
        let mut r = self;
        r.set_mul4();
        r
    }

    #[inline(always)]
    pub fn set_mul8(&mut self) {
        self.0[0] = self.0[0].mul8();
        self.0[1] = self.0[1].mul8();
    }

    #[inline(always)]
    pub fn mul8(self) -> Self {
        let mut r = self;
        r.set_mul8();
        r
    }

    #[inline(always)]
    pub fn set_lshift(&mut self, n: u32) {
        self.0[0].set_lshift(n);
        self.0[1].set_lshift(n);
    }

    #[inline(always)]
    pub fn lshift(self, n: u32) -> Self {
        let mut r = self;
        r.set_lshift(n);
        r
    }

    #[inline(always)]
    pub fn set_rshift(&mut self, n: u32) {
        self.0[0].set_rshift(n);
        self.0[1].set_rshift(n);
    }

    #[inline(always)]
    pub fn rshift(self, n: u32) -> Self {
        let mut r = self;
        r.set_rshift(n);
        r
    }

    /// Invert this value; if this value is zero, then it stays at zero.
    pub fn set_invert(&mut self) {
        // 1/(a0 + a1*u) = (a0 - a1*u)/(a0^2 + a1^2)
        // The norm a0^2 + a1^2 is zero if and only if the element is
        // zero (since -1 is not a square in GF(p)), and the base-field
        // inversion maps zero to zero, so no special case is needed.
        let (a0, a1) = (self.0[0], self.0[1]);
        let ni = (a0.square() + a1.square()).invert();
        self.0[0] = a0 * ni;
        self.0[1] = -(a1 * ni);
    }

    /// Invert this value; if this value is zero, then zero is returned.
    #[inline(always)]
    pub fn invert(self) -> Self {
        let mut x = self;
        x.set_invert();
        x
    }

    #[inline(always)]
    fn set_div(&mut self, y: &Self) {
        self.set_mul(&y.invert());
    }

    /// Packed parity and sign, as in `Fp::sgn0_pty()`: when the
    /// imaginary component is non-zero its pair is authoritative,
    /// otherwise the real component's pair is used.
    pub fn sgn0_pty(self) -> u64 {
        let sp_re = self.0[0].sgn0_pty();
        let sp_im = self.0[1].sgn0_pty();
        let m = (self.0[1].iszero() as u64) | ((self.0[1].iszero() as u64) << 32);
        sp_im ^ (m & (sp_im ^ sp_re))
    }

    #[inline]
    pub fn equals(self, rhs: Self) -> u32 {
        self.0[0].equals(rhs.0[0]) & self.0[1].equals(rhs.0[1])
    }

    #[inline]
    pub fn iszero(self) -> u32 {
        self.0[0].iszero() & self.0[1].iszero()
    }

    // Encode this value into bytes: real component first, then
    // imaginary component, both in unsigned little-endian convention.
    pub fn encode(self) -> [u8; Self::ENC_LEN] {
        let mut d = [0u8; Self::ENC_LEN];
        d[..Fp::ENC_LEN].copy_from_slice(&self.0[0].encode());
        d[Fp::ENC_LEN..].copy_from_slice(&self.0[1].encode());
        d
    }

    // Decode a value from bytes, with a constant-time status mask. Both
    // components must be canonical; on failure (wrong length, or either
    // component out of range), the value is set to zero and 0 is
    // returned.
    #[inline]
    pub fn set_decode_ct(&mut self, buf: &[u8]) -> u32 {
        if buf.len() != Self::ENC_LEN {
            *self = Self::ZERO;
            return 0;
        }
        let r0 = self.0[0].set_decode_ct(&buf[..Fp::ENC_LEN]);
        let r1 = self.0[1].set_decode_ct(&buf[Fp::ENC_LEN..]);
        let r = r0 & r1;
        self.set_cond(&Self::ZERO, !r);
        r
    }

    #[inline(always)]
    pub fn decode_ct(buf: &[u8]) -> (Self, u32) {
        let mut x = Self::ZERO;
        let r = x.set_decode_ct(buf);
        (x, r)
    }

    // Decode a value from bytes (same rules as set_decode_ct(), but
    // the success status is returned as an Option, not in constant
    // time).
    #[inline(always)]
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let (x, r) = Self::decode_ct(buf);
        if r != 0 {
            Some(x)
        } else {
            None
        }
    }

    // Decode a value from bytes with implicit modular reduction in
    // each component (first 48 bytes for the real component, the rest
    // for the imaginary one). This function cannot fail.
    pub fn decode_reduce(buf: &[u8]) -> Self {
        let n = if buf.len() < Fp::ENC_LEN { buf.len() } else { Fp::ENC_LEN };
        let re = Fp::decode_reduce(&buf[..n]);
        let im = Fp::decode_reduce(&buf[n..]);
        Self([ re, im ])
    }

    /// Sample a uniform element from the provided random source.
    pub fn rand<T: crate::CryptoRng + crate::RngCore>(rng: &mut T) -> Self {
        let re = Fp::rand(rng);
        let im = Fp::rand(rng);
        Self([ re, im ])
    }
}

// Sum of two six-limb values, without reduction. Both operands are
// below p < 2^381, so the sum cannot overflow six limbs.
#[inline(always)]
fn add_noreduce(a: &[u64; 6], b: &[u64; 6]) -> [u64; 6] {
    let mut d = [0u64; 6];
    let mut cc = 0;
    for i in 0..6 {
        let (w, ee) = addcarry_u64(a[i], b[i], cc);
        d[i] = w;
        cc = ee;
    }
    d
}

// ========================================================================

impl core::ops::Add<Fp2> for Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn add(self, other: Fp2) -> Fp2 {
        let mut r = self;
        r.set_add(&other);
        r
    }
}

impl core::ops::Add<&Fp2> for Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn add(self, other: &Fp2) -> Fp2 {
        let mut r = self;
        r.set_add(other);
        r
    }
}

impl core::ops::Add<Fp2> for &Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn add(self, other: Fp2) -> Fp2 {
        let mut r = *self;
        r.set_add(&other);
        r
    }
}

impl core::ops::Add<&Fp2> for &Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn add(self, other: &Fp2) -> Fp2 {
        let mut r = *self;
        r.set_add(other);
        r
    }
}

impl core::ops::AddAssign<Fp2> for Fp2 {
    #[inline(always)]
    fn add_assign(&mut self, other: Fp2) {
        self.set_add(&other);
    }
}

impl core::ops::AddAssign<&Fp2> for Fp2 {
    #[inline(always)]
    fn add_assign(&mut self, other: &Fp2) {
        self.set_add(other);
    }
}

impl core::ops::Div<Fp2> for Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn div(self, other: Fp2) -> Fp2 {
        let mut r = self;
        r.set_div(&other);
        r
    }
}

impl core::ops::Div<&Fp2> for Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn div(self, other: &Fp2) -> Fp2 {
        let mut r = self;
        r.set_div(other);
        r
    }
}

impl core::ops::Div<Fp2> for &Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn div(self, other: Fp2) -> Fp2 {
        let mut r = *self;
        r.set_div(&other);
        r
    }
}

impl core::ops::Div<&Fp2> for &Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn div(self, other: &Fp2) -> Fp2 {
        let mut r = *self;
        r.set_div(other);
        r
    }
}

impl core::ops::DivAssign<Fp2> for Fp2 {
    #[inline(always)]
    fn div_assign(&mut self, other: Fp2) {
        self.set_div(&other);
    }
}

impl core::ops::DivAssign<&Fp2> for Fp2 {
    #[inline(always)]
    fn div_assign(&mut self, other: &Fp2) {
        self.set_div(other);
    }
}

impl core::ops::Mul<Fp2> for Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn mul(self, other: Fp2) -> Fp2 {
        let mut r = self;
        r.set_mul(&other);
        r
    }
}

impl core::ops::Mul<&Fp2> for Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn mul(self, other: &Fp2) -> Fp2 {
        let mut r = self;
        r.set_mul(other);
        r
    }
}

impl core::ops::Mul<Fp2> for &Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn mul(self, other: Fp2) -> Fp2 {
        let mut r = *self;
        r.set_mul(&other);
        r
    }
}

impl core::ops::Mul<&Fp2> for &Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn mul(self, other: &Fp2) -> Fp2 {
        let mut r = *self;
        r.set_mul(other);
        r
    }
}

impl core::ops::MulAssign<Fp2> for Fp2 {
    #[inline(always)]
    fn mul_assign(&mut self, other: Fp2) {
        self.set_mul(&other);
    }
}

impl core::ops::MulAssign<&Fp2> for Fp2 {
    #[inline(always)]
    fn mul_assign(&mut self, other: &Fp2) {
        self.set_mul(other);
    }
}

impl core::ops::Neg for Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn neg(self) -> Fp2 {
        let mut r = self;
        r.set_neg();
        r
    }
}

impl core::ops::Neg for &Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn neg(self) -> Fp2 {
        let mut r = *self;
        r.set_neg();
        r
    }
}

impl core::ops::Sub<Fp2> for Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn sub(self, other: Fp2) -> Fp2 {
        let mut r = self;
        r.set_sub(&other);
        r
    }
}

impl core::ops::Sub<&Fp2> for Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn sub(self, other: &Fp2) -> Fp2 {
        let mut r = self;
        r.set_sub(other);
        r
    }
}

impl core::ops::Sub<Fp2> for &Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn sub(self, other: Fp2) -> Fp2 {
        let mut r = *self;
        r.set_sub(&other);
        r
    }
}

impl core::ops::Sub<&Fp2> for &Fp2 {
    type Output = Fp2;

    #[inline(always)]
    fn sub(self, other: &Fp2) -> Fp2 {
        let mut r = *self;
        r.set_sub(other);
        r
    }
}

impl core::ops::SubAssign<Fp2> for Fp2 {
    #[inline(always)]
    fn sub_assign(&mut self, other: Fp2) {
        self.set_sub(&other);
    }
}

impl core::ops::SubAssign<&Fp2> for Fp2 {
    #[inline(always)]
    fn sub_assign(&mut self, other: &Fp2) {
        self.set_sub(other);
    }
}

// ========================================================================

#[cfg(test)]
mod tests {

    use super::{Fp, Fp2};
    use num_bigint::{BigInt, Sign};
    use sha2::{Sha512, Digest};

    fn pbig() -> BigInt {
        let mut v = [0u8; 48];
        for (i, w) in Fp::MODULUS.iter().enumerate() {
            v[(8 * i)..(8 * i + 8)].copy_from_slice(&w.to_le_bytes());
        }
        BigInt::from_bytes_le(Sign::Plus, &v)
    }

    fn comp_big(a: Fp2) -> (BigInt, BigInt) {
        let (re, im) = a.to_components();
        (BigInt::from_bytes_le(Sign::Plus, &re.encode()),
         BigInt::from_bytes_le(Sign::Plus, &im.encode()))
    }

    fn mkrnd(bx: u64) -> Fp2 {
        let mut sh = Sha512::new();
        sh.update(bx.to_le_bytes());
        let v1 = sh.finalize_reset();
        sh.update((bx ^ 0x5555555555555555).to_le_bytes());
        let v2 = sh.finalize_reset();
        let mut v = [0u8; 128];
        v[..64].copy_from_slice(&v1);
        v[64..].copy_from_slice(&v2);
        Fp2::decode_reduce(&v[..96])
    }

    #[test]
    fn fp2_mul() {
        let zp = pbig();

        // u^2 = -1
        assert!(Fp2::U.square().equals(Fp2::MINUS_ONE) == 0xFFFFFFFF);
        assert!((Fp2::U * Fp2::U + Fp2::ONE).iszero() == 0xFFFFFFFF);

        for i in 0..50 {
            let a = mkrnd(2 * i);
            let b = mkrnd(2 * i + 1);

            // Check lazy-reduction multiplication against the
            // schoolbook complex formulas over integers.
            let (za0, za1) = comp_big(a);
            let (zb0, zb1) = comp_big(b);
            let c = a * b;
            let (zc0, zc1) = comp_big(c);
            let zd0 = ((&za0 * &zb0 + &zp * &zp) - (&za1 * &zb1)) % &zp;
            let zd1 = (&za0 * &zb1 + &za1 * &zb0) % &zp;
            assert!(zc0 == zd0);
            assert!(zc1 == zd1);

            // Squaring must match multiplication by self.
            let c = a.square();
            let d = a * a;
            assert!(c.equals(d) == 0xFFFFFFFF);

            // Fused operations.
            let (re, im) = a.to_components();
            let c = a.mul_u_plus_1();
            let d = Fp2::from_fp(re - im, re + im);
            assert!(c.equals(d) == 0xFFFFFFFF);
            let c = a.mul_u();
            assert!(c.equals(a * Fp2::U) == 0xFFFFFFFF);
            let c = a.mul3();
            assert!(c.equals(a + a + a) == 0xFFFFFFFF);
            let c = a.mul8();
            assert!(c.equals(a.mul2().mul2().mul2()) == 0xFFFFFFFF);
            let c = a.lshift(5);
            assert!(c.equals(a.mul8().mul4()) == 0xFFFFFFFF);

            // Conjugate: a * conj(a) has zero imaginary component.
            let c = a * a.conj();
            let (_, im) = c.to_components();
            assert!(im.iszero() == 0xFFFFFFFF);
        }
    }

    #[test]
    fn fp2_invert() {
        assert!(Fp2::ZERO.invert().iszero() == 0xFFFFFFFF);
        assert!(Fp2::ONE.invert().equals(Fp2::ONE) == 0xFFFFFFFF);
        assert!(Fp2::U.invert().equals(-Fp2::U) == 0xFFFFFFFF);
        for i in 0..30 {
            let a = mkrnd(1000 + i);
            let r = a.invert();
            assert!((a * r).equals(Fp2::ONE) == 0xFFFFFFFF);
            let b = mkrnd(2000 + i);
            let c = a / b;
            assert!((c * b).equals(a) == 0xFFFFFFFF);
        }
    }

    #[test]
    fn fp2_sgn0() {
        // im non-zero: im decides; im zero: re decides.
        assert!(Fp2::ZERO.sgn0_pty() == 0b00);
        assert!(Fp2::ONE.sgn0_pty() == 0b01);
        assert!(Fp2::U.sgn0_pty() == 0b01);
        let x = Fp2::from_fp(Fp::ONE, Fp::ZERO);
        let y = Fp2::from_fp(Fp::MINUS_ONE, Fp::ONE);
        assert!(x.sgn0_pty() == 0b01);
        assert!(y.sgn0_pty() == 0b01);
        for i in 0..30 {
            let a = mkrnd(3000 + i);
            let sp = a.sgn0_pty();
            assert!((sp >> 2) == 0);
            let sq = (-a).sgn0_pty();
            assert!(((sp ^ sq) >> 1) == 1);
        }
    }

    #[test]
    fn fp2_encode_decode() {
        for i in 0..20 {
            let a = mkrnd(4000 + i);
            let buf = a.encode();
            let b = Fp2::decode(&buf).unwrap();
            assert!(a.equals(b) == 0xFFFFFFFF);
            let (b, cc) = Fp2::decode_ct(&buf);
            assert!(cc == 0xFFFFFFFF);
            assert!(a.equals(b) == 0xFFFFFFFF);
        }
        // Out-of-range component must be rejected.
        let mut buf = [0u8; 96];
        for (i, w) in Fp::MODULUS.iter().enumerate() {
            buf[(8 * i)..(8 * i + 8)].copy_from_slice(&w.to_le_bytes());
        }
        assert!(Fp2::decode(&buf).is_none());
        let (x, cc) = Fp2::decode_ct(&buf);
        assert!(cc == 0);
        assert!(x.iszero() == 0xFFFFFFFF);
        assert!(Fp2::decode(&buf[..95]).is_none());
    }
}
