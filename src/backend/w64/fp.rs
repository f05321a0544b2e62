//! GF(p): the 381-bit base field of the BLS12-381 pairing curve.
//!
//! The modulus is:
//!   p = 0x1A0111EA397FE69A4B1BA7B6434BACD764774B84F38512BF6730D2A0F6B0F6241EABFFFEB153FFFFB9FEFFFFFFFFAAAB
//! i.e. p = (z - 1)^2 * (z^4 - z^2 + 1) / 3 + z for z = -0xD201000000010000.
//! Values are kept in Montgomery representation (48-byte encoding).

// p = 3 mod 4, and 2 is not a quadratic residue modulo p (p = 3 mod 8).
struct FpParams;

impl FpParams {

    const MODULUS: [u64; 6] = [
        0xB9FEFFFFFFFFAAAB,
        0x1EABFFFEB153FFFF,
        0x6730D2A0F6B0F624,
        0x64774B84F38512BF,
        0x4B1BA7B6434BACD7,
        0x1A0111EA397FE69A,
    ];
}

define_monty!(Fp, FpParams, fp_impl, crate::dispatch::ops384);
define_monty_tests!(Fp, 2, tests_fp);

#[cfg(test)]
mod tests {

    use super::Fp;

    #[test]
    fn fp_constants() {
        // -1/p mod 2^64
        assert!(Fp::M0I == 0x89F3FFFCFFFCFFFD);
        assert!(Fp::ENC_LEN == 48);
        let mut v1 = [0u8; 48];
        v1[0] = 1;
        assert!(Fp::ONE.encode() == v1);
        assert!((Fp::ONE + Fp::MINUS_ONE).iszero() == 0xFFFFFFFF);
        assert!((Fp::TWO + Fp::ONE).equals(Fp::THREE) == 0xFFFFFFFF);
    }

    #[test]
    fn fp_kat() {
        // x and y are fixed pseudorandom field elements; products and
        // inverses precomputed with an independent implementation.
        let vx = hex::decode("26494b136f16df1343970a624985f1612ccbca4190f1b217589baa35ef10e9bcb27f14df1a1a4a837bbfa499502d1c01").unwrap();
        let vy = hex::decode("ac6dabdbfdf6f6c17e54b7e6a4b4e77bcb19b2ae2c8a8a6f544abcf858d36cbfd610a8989fa0ce2cb1eb929ebe0d3400").unwrap();
        let vz = hex::decode("b7d67052d95e9f4e6e98c93b627aa60bb24504125473def2af3cfcea145f9896967d2e43fe016c9e79f792e191289b09").unwrap();
        let vxi = hex::decode("ff26d634411968024a3db3ca63a7844e10afc4f42604f29afacfc7448a27bd602244c417049559a02041062548890100").unwrap();
        let x = Fp::decode(&vx).unwrap();
        let y = Fp::decode(&vy).unwrap();
        assert!((x * y).encode()[..] == vz[..]);
        assert!(x.invert().encode()[..] == vxi[..]);
        assert!(x.legendre() == -1);
        assert!(x.is_square() == 0);
    }

    #[test]
    fn fp_encode_decode() {
        // p - 1 must decode; p and anything above must not.
        let mut buf = [0u8; 48];
        for (i, w) in Fp::MODULUS.iter().enumerate() {
            buf[(8 * i)..(8 * i + 8)].copy_from_slice(&w.to_le_bytes());
        }
        let (_, cc) = Fp::decode_ct(&buf);
        assert!(cc == 0);
        buf[0] = 0xAA;
        let (x, cc) = Fp::decode_ct(&buf);
        assert!(cc == 0xFFFFFFFF);
        assert!(x.equals(Fp::MINUS_ONE) == 0xFFFFFFFF);
        assert!(Fp::decode(&buf[..47]).is_none());
    }
}
