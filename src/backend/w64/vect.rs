//! Width-generic limb-vector kernels.
//!
//! All functions in this module operate on fixed-width little-endian
//! limb vectors (`[u64; N]`), with the modulus passed explicitly; the
//! Montgomery kernels additionally take `p0 = -1/p mod 2^64`. The
//! modulus must be odd; values are canonical (in the 0 to p-1 range)
//! unless stated otherwise. Every function computes its raw result and
//! a carry/borrow indicator, then applies a masked correction: no
//! branch, loop bound or memory access depends on operand values.

use super::{addcarry_u64, subborrow_u64, umull, umull_add, umull_add2,
    umull_x2, umull_x2_add, sgnw};

/// Return `a0` if `ctl` is 0x00000000, `a1` if `ctl` is 0xFFFFFFFF.
#[inline]
pub fn select<const N: usize>(a0: &[u64; N], a1: &[u64; N], ctl: u32)
    -> [u64; N]
{
    let cw = ((ctl as i32) as i64) as u64;
    let mut d = *a0;
    for i in 0..N {
        d[i] ^= cw & (a0[i] ^ a1[i]);
    }
    d
}

/// Modular addition: (a + b) mod p.
#[inline]
pub fn add_mod<const N: usize>(a: &[u64; N], b: &[u64; N], p: &[u64; N])
    -> [u64; N]
{
    // Raw sum, with carry-out.
    let mut d = [0u64; N];
    let mut cc1 = 0;
    for i in 0..N {
        (d[i], cc1) = addcarry_u64(a[i], b[i], cc1);
    }

    // Subtract p; add it back if that borrowed without the raw sum
    // having carried out.
    let mut cc2 = 0;
    for i in 0..N {
        (d[i], cc2) = subborrow_u64(d[i], p[i], cc2);
    }
    let cc1 = (cc1 as u64).wrapping_neg();
    let cc2 = (cc2 as u64).wrapping_neg();
    let m = cc2 & !cc1;
    let mut cc3 = 0;
    for i in 0..N {
        (d[i], cc3) = addcarry_u64(d[i], m & p[i], cc3);
    }
    d
}

/// Modular subtraction: (a - b) mod p.
#[inline]
pub fn sub_mod<const N: usize>(a: &[u64; N], b: &[u64; N], p: &[u64; N])
    -> [u64; N]
{
    let mut d = [0u64; N];
    let mut cc1 = 0;
    for i in 0..N {
        (d[i], cc1) = subborrow_u64(a[i], b[i], cc1);
    }
    let m = (cc1 as u64).wrapping_neg();
    let mut cc2 = 0;
    for i in 0..N {
        (d[i], cc2) = addcarry_u64(d[i], m & p[i], cc2);
    }
    d
}

/// Modular negation: (-a) mod p. Negating zero yields zero, not p.
#[inline]
pub fn neg_mod<const N: usize>(a: &[u64; N], p: &[u64; N]) -> [u64; N] {
    // 0 - a borrows exactly when a != 0, which is when p must be
    // added back.
    let mut d = [0u64; N];
    let mut cc1 = 0;
    for i in 0..N {
        (d[i], cc1) = subborrow_u64(0, a[i], cc1);
    }
    let m = (cc1 as u64).wrapping_neg();
    let mut cc2 = 0;
    for i in 0..N {
        (d[i], cc2) = addcarry_u64(d[i], m & p[i], cc2);
    }
    d
}

/// Conditional modular negation: (-a) mod p if `ctl` is 0xFFFFFFFF,
/// `a` unchanged if `ctl` is 0x00000000.
#[inline]
pub fn cneg_mod<const N: usize>(a: &[u64; N], ctl: u32, p: &[u64; N])
    -> [u64; N]
{
    let n = neg_mod(a, p);
    select(a, &n, ctl)
}

/// One modular halving: a/2 mod p. If the value is odd, p is added
/// first (the intermediate is then even), and the shift takes its
/// carry-in from the top of that addition.
#[inline]
fn half_mod<const N: usize>(x: &mut [u64; N], p: &[u64; N]) {
    let m = (x[0] & 1).wrapping_neg();
    let (mut dd, mut cc) = addcarry_u64(x[0], m & p[0], 0);
    dd >>= 1;
    for i in 1..N {
        let (w, ee) = addcarry_u64(x[i], m & p[i], cc);
        cc = ee;
        x[i - 1] = dd | (w << 63);
        dd = w >> 1;
    }
    x[N - 1] = dd | ((cc as u64) << 63);
}

/// n modular doublings: (a * 2^n) mod p. The shift count is public.
#[inline]
pub fn lshift_mod<const N: usize>(a: &[u64; N], n: u32, p: &[u64; N])
    -> [u64; N]
{
    let mut d = *a;
    for _ in 0..n {
        d = add_mod(&d, &d, p);
    }
    d
}

/// n modular halvings: (a / 2^n) mod p. The shift count is public.
#[inline]
pub fn rshift_mod<const N: usize>(a: &[u64; N], n: u32, p: &[u64; N])
    -> [u64; N]
{
    let mut d = *a;
    for _ in 0..n {
        half_mod(&mut d, p);
    }
    d
}

/// Modular multiplication by 3 (one doubling, one addition; recurs in
/// curve doubling formulas).
#[inline]
pub fn mul_by_3_mod<const N: usize>(a: &[u64; N], p: &[u64; N]) -> [u64; N] {
    let d = add_mod(a, a, p);
    add_mod(&d, a, p)
}

/// Modular multiplication by 8 (three doublings).
#[inline]
pub fn mul_by_8_mod<const N: usize>(a: &[u64; N], p: &[u64; N]) -> [u64; N] {
    lshift_mod(a, 3, p)
}

// Montgomery reduction rounds on an N-limb value: divide by 2^(64*N)
// modulo p. Output is at most p (the marginal p is only reachable for
// an input congruent to zero; callers that need a canonical value
// follow with a conditional subtraction or a modular addition).
#[inline]
fn montyred<const N: usize>(x: &mut [u64; N], p: &[u64; N], p0: u64) {
    for _ in 0..N {
        let f = x[0].wrapping_mul(p0);
        let (_, mut cc) = umull_add(f, p[0], x[0]);
        for i in 1..N {
            let (d, hi) = umull_add2(f, p[i], x[i], cc);
            x[i - 1] = d;
            cc = hi;
        }
        x[N - 1] = cc;
    }
}

/// Montgomery multiplication: (a * b) / 2^(64*N) mod p, canonical.
///
/// The reduction is interleaved with the multiplication: for each limb
/// of b, one row of single-limb multiply-accumulates over a is added
/// into the running accumulator together with the multiple of p that
/// cancels the accumulator's low limb, and the accumulator shifts right
/// by one limb. After the last row the value is below 2p; a single
/// masked subtraction of p lands it in the canonical range.
pub fn mul_mont<const N: usize>(a: &[u64; N], b: &[u64; N], p: &[u64; N],
    p0: u64) -> [u64; N]
{
    let mut t = [0u64; N];

    // combined muls + reduction
    let mut cch = 0;
    for i in 0..N {
        let f = b[i];
        let (lo, mut cc1) = umull_add(f, a[0], t[0]);
        let g = lo.wrapping_mul(p0);
        let (_, mut cc2) = umull_add(g, p[0], lo);
        for j in 1..N {
            let (d, hi1) = umull_add2(f, a[j], t[j], cc1);
            cc1 = hi1;
            let (d, hi2) = umull_add2(g, p[j], d, cc2);
            cc2 = hi2;
            t[j - 1] = d;
        }
        let (d, ee) = addcarry_u64(cc1, cc2, cch);
        t[N - 1] = d;
        cch = ee;
    }

    // final reduction: subtract modulus if necessary
    let mut cc = 0;
    for i in 0..N {
        let (d, ee) = subborrow_u64(t[i], p[i], cc);
        t[i] = d;
        cc = ee;
    }
    let mm = (cch as u64).wrapping_sub(cc as u64);
    cc = 0;
    for i in 0..N {
        let (d, ee) = addcarry_u64(t[i], mm & p[i], cc);
        t[i] = d;
        cc = ee;
    }
    t
}

/// Plain double-width product: t <- a * b. The output slice must have
/// length 2*N.
pub fn mul_wide<const N: usize>(t: &mut [u64], a: &[u64; N], b: &[u64; N]) {
    debug_assert!(t.len() == 2 * N);
    for i in 0..N {
        t[i] = 0;
    }
    for i in 0..N {
        let f = b[i];
        let mut cc = 0;
        for j in 0..N {
            let (d, hi) = umull_add2(a[j], f, t[i + j], cc);
            t[i + j] = d;
            cc = hi;
        }
        t[i + N] = cc;
    }
}

/// Plain double-width square: t <- a^2, computing each cross-product
/// once, doubling the partial sum, then adding the diagonal terms. The
/// output slice must have length 2*N; the result is bit-identical to
/// `mul_wide(t, a, a)`.
pub fn sqr_wide<const N: usize>(t: &mut [u64], a: &[u64; N]) {
    debug_assert!(t.len() == 2 * N);
    for i in 0..(2 * N) {
        t[i] = 0;
    }

    // sum_{i<j} a_i*a_j*2^(64*(i+j)) < 2^(64*(2*N-1))
    // -> t[2*N-1] remains at zero (and a one-limb operand has no
    // cross-products at all)
    let f = a[0];
    let mut cc = 0;
    for j in 1..N {
        let (d, hi) = umull_add(f, a[j], cc);
        t[j] = d;
        cc = hi;
    }
    t[N] = cc;
    for i in 1..N {
        let f = a[i];
        let mut cc = 0;
        for j in (i + 1)..N {
            let (d, hi) = umull_add2(f, a[j], t[i + j], cc);
            t[i + j] = d;
            cc = hi;
        }
        t[i + N] = cc;
    }

    // Double the partial sum.
    // -> t contains sum_{i!=j} a_i*a_j*2^(64*(i+j))
    let mut cc = 0;
    for i in 1..((N << 1) - 1) {
        let w = t[i];
        let ee = w >> 63;
        t[i] = (w << 1) | cc;
        cc = ee;
    }
    t[(N << 1) - 1] = cc;

    // Add the squares a_i*a_i*2^(64*2*i).
    let mut cc = 0;
    for i in 0..N {
        let (lo, hi) = umull(a[i], a[i]);
        let (d0, ee) = addcarry_u64(lo, t[i << 1], cc);
        let (d1, ee) = addcarry_u64(hi, t[(i << 1) + 1], ee);
        t[i << 1] = d0;
        t[(i << 1) + 1] = d1;
        cc = ee;
    }
}

/// Montgomery reduction of a double-width value: t / 2^(64*N) mod p,
/// canonical. The input slice has length 2*N and must be below
/// p*2^(64*N): N cancellation rounds run on the low half (with an
/// implicit multiplicand of 1, i.e. no a*b accumulation), then the
/// untouched high half is folded back in with carry, and one masked
/// subtraction of p finishes the job.
pub fn redc_mont<const N: usize>(t: &[u64], p: &[u64; N], p0: u64)
    -> [u64; N]
{
    debug_assert!(t.len() == 2 * N);

    let mut lo = [0u64; N];
    lo.copy_from_slice(&t[..N]);
    montyred(&mut lo, p, p0);

    // The reduced low half is at most p and the high half is below p,
    // so the modular addition absorbs both (the sum is below 2p).
    let mut hi = [0u64; N];
    hi.copy_from_slice(&t[N..]);
    add_mod(&lo, &hi, p)
}

/// Montgomery-to-standard conversion: a / 2^(64*N) mod p, canonical
/// (reduction rounds only, then one masked subtraction of p).
pub fn from_mont<const N: usize>(a: &[u64; N], p: &[u64; N], p0: u64)
    -> [u64; N]
{
    let mut d = *a;
    montyred(&mut d, p, p0);
    let mut e = [0u64; N];
    let mut cc = 0;
    for i in 0..N {
        (e[i], cc) = subborrow_u64(d[i], p[i], cc);
    }
    select(&e, &d, (cc as u32).wrapping_neg())
}

/// Montgomery squaring: (a^2) / 2^(64*N) mod p, canonical; uses the
/// specialized double-width square before the reduction rounds.
pub fn sqr_mont<const N: usize>(a: &[u64; N], p: &[u64; N], p0: u64)
    -> [u64; N]
{
    // Stack scratch for the double-width square (the fields at hand
    // use at most 6 limbs).
    let mut t = [0u64; 16];
    sqr_wide(&mut t[..(2 * N)], a);
    redc_mont(&t[..(2 * N)], p, p0)
}

/// Double-width addition: a <- a + b. Both slices have length 2*N; the
/// caller guarantees that the sum does not overflow (operands are
/// products of canonical values).
pub fn add_wide(a: &mut [u64], b: &[u64]) {
    debug_assert!(a.len() == b.len());
    let mut cc = 0;
    for i in 0..a.len() {
        (a[i], cc) = addcarry_u64(a[i], b[i], cc);
    }
    debug_assert!(cc == 0);
}

/// Double-width subtraction modulo p*2^(64*N): a <- a - b, with a
/// masked addition of p to the upper half on borrow. Keeps values in
/// the 0 to p*2^(64*N) - 1 range provided the true difference is above
/// -p*2^(64*N); the result is congruent to a - b modulo p and remains
/// a valid `redc_mont` input.
pub fn sub_wide_mod<const N: usize>(a: &mut [u64], b: &[u64], p: &[u64; N]) {
    debug_assert!(a.len() == 2 * N && b.len() == 2 * N);
    let mut cc = 0;
    for i in 0..(2 * N) {
        (a[i], cc) = subborrow_u64(a[i], b[i], cc);
    }
    let m = (cc as u64).wrapping_neg();
    let mut cc = 0;
    for i in 0..N {
        (a[N + i], cc) = addcarry_u64(a[N + i], m & p[i], cc);
    }
}

/// Compute abs((a*f + b*g)/2^31), where a and b are plain unsigned
/// integers and the coefficients f and g are signed integers in the
/// -2^31 to +2^31 range (inclusive), provided as u64. The low 31 bits
/// of a*f + b*g are dropped (the division is exact by construction of
/// the callers); extra high bits, if any, are dropped as well. Returned
/// mask is -1 (as a u64) if a*f + b*g was negative, 0 otherwise.
pub fn lindiv31abs<const N: usize>(a: &[u64; N], b: &[u64; N],
    f: u64, g: u64) -> ([u64; N], u64)
{
    // Replace f and g with abs(f) and abs(g), but remember the
    // original signs.
    let sf = sgnw(f);
    let f = (f ^ sf).wrapping_sub(sf);
    let sg = sgnw(g);
    let g = (g ^ sg).wrapping_sub(sg);

    // Compute a*f + b*g (upper word in 'up'). The sign masks negate
    // the operands limb by limb on the fly.
    let mut d = [0u64; N];
    let mut cc1 = 0;
    let mut cc2 = 0;
    let mut cc3 = 0;
    for i in 0..N {
        let (d1, ee1) = subborrow_u64(a[i] ^ sf, sf, cc1);
        cc1 = ee1;
        let (d2, ee2) = subborrow_u64(b[i] ^ sg, sg, cc2);
        cc2 = ee2;
        let (d3, hi3) = umull_x2_add(d1, f, d2, g, cc3);
        d[i] = d3;
        cc3 = hi3;
    }
    let up = cc3.wrapping_sub((cc1 as u64).wrapping_neg() & f)
        .wrapping_sub((cc2 as u64).wrapping_neg() & g);

    // Right-shift the result by 31 bits.
    for i in 0..(N - 1) {
        d[i] = (d[i] >> 31) | (d[i + 1] << 33);
    }
    d[N - 1] = (d[N - 1] >> 31) | (up << 33);

    // Negate the result if (a*f + b*g) was negative.
    let w = sgnw(up);
    let mut cc = 0;
    for i in 0..N {
        (d[i], cc) = subborrow_u64(d[i] ^ w, w, cc);
    }

    (d, w)
}

/// Compute (u*f + v*g)/2^64 mod p, canonical. Coefficients f and g are
/// signed integers in the -2^62 to +2^62 range, provided as u64; u and
/// v are canonical field values. One Montgomery round performs the
/// division by 2^64, which keeps the co-factor magnitudes bounded
/// across binary-GCD iterations.
pub fn montylin<const N: usize>(u: &[u64; N], v: &[u64; N], f: u64, g: u64,
    p: &[u64; N], p0: u64) -> [u64; N]
{
    // Make sure f and g are non-negative; negate the matching operand
    // (modularly) when flipping a sign.
    let sf = sgnw(f);
    let f = (f ^ sf).wrapping_sub(sf);
    let tu = select(u, &neg_mod(u, p), sf as u32);
    let sg = sgnw(g);
    let g = (g ^ sg).wrapping_sub(sg);
    let tv = select(v, &neg_mod(v, p), sg as u32);

    let mut d = [0u64; N];
    let (x, mut cc) = umull_x2(tu[0], f, tv[0], g);
    d[0] = x;
    for i in 1..N {
        let (x, hi) = umull_x2_add(tu[i], f, tv[i], g, cc);
        d[i] = x;
        cc = hi;
    }
    let up = cc;

    // Montgomery reduction (one round)
    let k = d[0].wrapping_mul(p0);
    let (_, mut cc) = umull_add(k, p[0], d[0]);
    for i in 1..N {
        let (x, hi) = umull_add2(k, p[i], d[i], cc);
        d[i - 1] = x;
        cc = hi;
    }
    let (x, cc1) = addcarry_u64(up, cc, 0);
    d[N - 1] = x;

    // |f| <= 2^62 and |g| <= 2^62, therefore |u*f + v*g| < p*2^63.
    // We added less than p*2^64, and divided by 2^64, so the result
    // is less than 2p and a single conditional subtraction is enough.
    let mut cc2 = 0;
    for i in 0..N {
        (d[i], cc2) = subborrow_u64(d[i], p[i], cc2);
    }
    let mm = (cc1 as u64).wrapping_sub(cc2 as u64);
    let mut cc = 0;
    for i in 0..N {
        (d[i], cc) = addcarry_u64(d[i], mm & p[i], cc);
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;
    use num_bigint::BigUint;

    // BLS12-381 base field modulus.
    const P: [u64; 6] = [
        0xB9FEFFFFFFFFAAAB, 0x1EABFFFEB153FFFF, 0x6730D2A0F6B0F624,
        0x64774B84F38512BF, 0x4B1BA7B6434BACD7, 0x1A0111EA397FE69A,
    ];
    const P0: u64 = 0x89F3FFFCFFFCFFFD;

    fn limbs_to_big(x: &[u64]) -> BigUint {
        let mut v = Vec::new();
        for w in x.iter() {
            v.extend_from_slice(&w.to_le_bytes());
        }
        BigUint::from_bytes_le(&v)
    }

    fn big_to_limbs(x: &BigUint) -> [u64; 6] {
        let mut d = [0u64; 6];
        let v = x.to_bytes_le();
        for (i, b) in v.iter().enumerate() {
            d[i >> 3] |= (*b as u64) << ((i & 7) << 3);
        }
        d
    }

    fn pbig() -> BigUint {
        limbs_to_big(&P)
    }

    // A few fixed operands, including edge values near 0 and p.
    fn samples() -> Vec<[u64; 6]> {
        let p = pbig();
        let mut vv = Vec::new();
        vv.push(BigUint::from(0u32));
        vv.push(BigUint::from(1u32));
        vv.push(BigUint::from(2u32));
        vv.push(&p - 1u32);
        vv.push(&p - 2u32);
        vv.push(&p >> 1);
        vv.push((&p >> 1) + 1u32);
        let mut x = BigUint::from(0xC0FFEEu64);
        for _ in 0..8 {
            x = (&x * &x + 1u32) % &p;
            vv.push(x.clone());
        }
        vv.iter().map(big_to_limbs).collect()
    }

    #[test]
    fn add_sub_neg() {
        let p = pbig();
        for a in samples().iter() {
            for b in samples().iter() {
                let (za, zb) = (limbs_to_big(a), limbs_to_big(b));
                let d = add_mod(a, b, &P);
                assert_eq!(limbs_to_big(&d), (&za + &zb) % &p);
                let d = sub_mod(a, b, &P);
                assert_eq!(limbs_to_big(&d), ((&p + &za) - &zb) % &p);
            }
            let za = limbs_to_big(a);
            let d = neg_mod(a, &P);
            assert_eq!(limbs_to_big(&d), ((&p << 1) - &za) % &p);
            assert_eq!(cneg_mod(a, 0, &P), *a);
            assert_eq!(cneg_mod(a, 0xFFFFFFFF, &P), d);
        }
        // Negating the representative zero yields zero, not p.
        assert_eq!(cneg_mod(&[0u64; 6], 0xFFFFFFFF, &P), [0u64; 6]);
    }

    #[test]
    fn shifts_and_small_multiples() {
        let p = pbig();
        for a in samples().iter() {
            let za = limbs_to_big(a);
            for n in 0..5u32 {
                let d = lshift_mod(a, n, &P);
                assert_eq!(limbs_to_big(&d), (&za << n) % &p);
                let d = rshift_mod(a, n, &P);
                // multiply back: (d * 2^n) mod p == a
                assert_eq!((limbs_to_big(&d) << n) % &p, za);
            }
            let d = mul_by_3_mod(a, &P);
            assert_eq!(limbs_to_big(&d), (&za * 3u32) % &p);
            let d = mul_by_8_mod(a, &P);
            assert_eq!(limbs_to_big(&d), (&za * 8u32) % &p);
        }
    }

    #[test]
    fn montgomery_mul_sqr() {
        let p = pbig();
        // 1/2^384 mod p, as a big integer, to emulate the Montgomery
        // factor in the reference computation.
        let r = BigUint::from(2u32).modpow(&BigUint::from(384u32), &p);
        let rinv = r.modpow(&(&p - 2u32), &p);
        for a in samples().iter() {
            for b in samples().iter() {
                let (za, zb) = (limbs_to_big(a), limbs_to_big(b));
                let d = mul_mont(a, b, &P, P0);
                assert_eq!(limbs_to_big(&d), (&za * &zb * &rinv) % &p);
            }
            let za = limbs_to_big(a);
            let s = sqr_mont(a, &P, P0);
            assert_eq!(s, mul_mont(a, a, &P, P0));
            assert_eq!(limbs_to_big(&s), (&za * &za * &rinv) % &p);
        }
    }

    #[test]
    fn wide_and_redc() {
        let p = pbig();
        let r = BigUint::from(2u32).modpow(&BigUint::from(384u32), &p);
        let rinv = r.modpow(&(&p - 2u32), &p);
        for a in samples().iter() {
            for b in samples().iter() {
                let (za, zb) = (limbs_to_big(a), limbs_to_big(b));
                let mut t = [0u64; 12];
                mul_wide(&mut t, a, b);
                assert_eq!(limbs_to_big(&t), &za * &zb);
                let d = redc_mont(&t, &P, P0);
                assert_eq!(limbs_to_big(&d), (&za * &zb * &rinv) % &p);
            }
            let za = limbs_to_big(a);
            let mut t = [0u64; 12];
            sqr_wide(&mut t, a);
            assert_eq!(limbs_to_big(&t), &za * &za);
            let d = from_mont(a, &P, P0);
            assert_eq!(limbs_to_big(&d), (&za * &rinv) % &p);
        }
    }

    #[test]
    fn wide_add_sub() {
        let p = pbig();
        let pw = &p << 384;
        for a in samples().iter() {
            for b in samples().iter() {
                let (za, zb) = (limbs_to_big(a), limbs_to_big(b));
                let mut t0 = [0u64; 12];
                let mut t1 = [0u64; 12];
                mul_wide(&mut t0, a, b);
                sqr_wide(&mut t1, b);
                let (z0, z1) = (&za * &zb, &zb * &zb);
                let mut t = t0;
                add_wide(&mut t, &t1);
                assert_eq!(limbs_to_big(&t), &z0 + &z1);
                let mut t = t0;
                sub_wide_mod(&mut t, &t1, &P);
                // The true difference may be negative; the kernel adds
                // p*2^384 back, so compare modulo p*2^384.
                assert_eq!(limbs_to_big(&t), (&z0 + &pw - &z1) % &pw);
                // The corrected difference stays a valid redc input.
                assert!(limbs_to_big(&t) < pw);
            }
        }
    }
}
