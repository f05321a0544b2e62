//! GF(r): the scalar field of BLS12-381, with r the order of the
//! prime-order subgroup.
//!
//! The modulus is:
//!   r = 0x73EDA753299D7D483339D80809A1D80553BDA402FFFE5BFEFFFFFFFF00000001
//! (255 bits; r divides p^12 - 1 and is the order of the pairing groups).
//! Values are kept in Montgomery representation (32-byte encoding).

// r = 1 mod 8; 7 generates the multiplicative group, hence is not a
// quadratic residue.
struct ScalarParams;

impl ScalarParams {

    const MODULUS: [u64; 4] = [
        0xFFFFFFFF00000001,
        0x53BDA402FFFE5BFE,
        0x3339D80809A1D805,
        0x73EDA753299D7D48,
    ];
}

define_monty!(Scalar, ScalarParams, scalar_impl, crate::dispatch::ops256);
define_monty_tests!(Scalar, 7, tests_scalar);

#[cfg(test)]
mod tests {

    use super::Scalar;

    #[test]
    fn scalar_constants() {
        // -1/r mod 2^64
        assert!(Scalar::M0I == 0xFFFFFFFEFFFFFFFF);
        assert!(Scalar::ENC_LEN == 32);
        assert!((Scalar::ONE + Scalar::MINUS_ONE).iszero() == 0xFFFFFFFF);
    }

    #[test]
    fn scalar_kat() {
        // Precomputed with an independent implementation.
        let vx = hex::decode("0f6d9bba457ad851574f9e8a029dfef471b18ebb463dba1fd7a923a88151f55d").unwrap();
        let vy = hex::decode("e2792c7de989ca7bddfbedca2b3cdd530fee9a7a929e4ee443c4c1a2bc1e463a").unwrap();
        let vz = hex::decode("cfb3abd0b329a38b4b904d0ee68234f215bc581cb35f3b3c6bc0b6fb9f87a82d").unwrap();
        let vxi = hex::decode("f2b69d7a889ffa34392eb0763f57c07a6e4c21a31b9f08e7440a4ca04d99a930").unwrap();
        let x = Scalar::decode(&vx).unwrap();
        let y = Scalar::decode(&vy).unwrap();
        assert!((x * y).encode()[..] == vz[..]);
        assert!(x.invert().encode()[..] == vxi[..]);
    }

    #[test]
    fn scalar_encode_decode() {
        let mut buf = [0u8; 32];
        for (i, w) in Scalar::MODULUS.iter().enumerate() {
            buf[(8 * i)..(8 * i + 8)].copy_from_slice(&w.to_le_bytes());
        }
        let (_, cc) = Scalar::decode_ct(&buf);
        assert!(cc == 0);
        buf[0] = 0x00;
        let (x, cc) = Scalar::decode_ct(&buf);
        assert!(cc == 0xFFFFFFFF);
        assert!(x.equals(Scalar::MINUS_ONE) == 0xFFFFFFFF);
        assert!(Scalar::decode(&buf[..31]).is_none());
    }
}
