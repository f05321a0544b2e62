//! CPU capability probe and one-time kernel selection.
//!
//! The Montgomery kernels behind the field types are reached through a
//! per-width table of function pointers. The table is selected exactly
//! once per process, from a CPU feature probe performed at first use,
//! and cached; the fields then call through the cached table without
//! ever probing again. All tables behind a given width are
//! behaviorally identical: which one executes is never observable in
//! the results, only (possibly) in the running time.
//!
//! This crate ships the portable kernels only; an accelerated table
//! (e.g. ADX/BMI2 carry-chain code) would be returned from `select()`
//! when the corresponding features are present, behind the same
//! signatures.

use crate::backend::w64::vect;

/// CPU features relevant to the carry-chain kernels, probed once per
/// process. On targets other than x86-64 (or without the `std`
/// feature), all fields report false.
#[derive(Clone, Copy, Debug)]
pub struct CpuFeatures {
    /// ADX (ADCX/ADOX) carry-chain extension.
    pub adx: bool,
    /// BMI2 (MULX) flag-free multiplication.
    pub bmi2: bool,
}

impl CpuFeatures {
    const NONE: Self = Self { adx: false, bmi2: false };
}

#[cfg(all(feature = "std", target_arch = "x86_64"))]
fn probe() -> CpuFeatures {
    CpuFeatures {
        adx: std::arch::is_x86_feature_detected!("adx"),
        bmi2: std::arch::is_x86_feature_detected!("bmi2"),
    }
}

#[cfg(not(all(feature = "std", target_arch = "x86_64")))]
fn probe() -> CpuFeatures {
    CpuFeatures::NONE
}

/// Get the process-wide CPU feature flags (probed on first call,
/// immutable afterwards).
#[cfg(feature = "std")]
pub fn features() -> CpuFeatures {
    static FEATURES: std::sync::OnceLock<CpuFeatures> =
        std::sync::OnceLock::new();
    *FEATURES.get_or_init(probe)
}

/// Get the process-wide CPU feature flags (probed on first call,
/// immutable afterwards).
#[cfg(not(feature = "std"))]
pub fn features() -> CpuFeatures {
    probe()
}

/// Montgomery kernel table for an N-limb modulus. All entries take the
/// modulus `p` and `p0 = -1/p mod 2^64` explicitly and are total,
/// constant-time functions.
#[derive(Clone, Copy)]
pub struct MontOps<const N: usize> {
    /// (a * b) / 2^(64*N) mod p.
    pub mul_mont: fn(&[u64; N], &[u64; N], &[u64; N], u64) -> [u64; N],
    /// (a^2) / 2^(64*N) mod p.
    pub sqr_mont: fn(&[u64; N], &[u64; N], u64) -> [u64; N],
    /// Double-width reduction: t / 2^(64*N) mod p (t has 2*N limbs).
    pub redc_mont: fn(&[u64], &[u64; N], u64) -> [u64; N],
    /// Montgomery-to-standard conversion: a / 2^(64*N) mod p.
    pub from_mont: fn(&[u64; N], &[u64; N], u64) -> [u64; N],
}

impl<const N: usize> MontOps<N> {
    /// The portable reference kernels.
    pub const PORTABLE: Self = Self {
        mul_mont: vect::mul_mont::<N>,
        sqr_mont: vect::sqr_mont::<N>,
        redc_mont: vect::redc_mont::<N>,
        from_mont: vect::from_mont::<N>,
    };
}

fn select<const N: usize>() -> MontOps<N> {
    // Accelerated tables would be chosen here from the probed
    // features; only the portable kernels are implemented in this
    // crate.
    let _ = features();
    MontOps::PORTABLE
}

/// Kernel table for the 384-bit (6-limb) width, selected once and
/// cached.
#[cfg(feature = "std")]
pub fn ops384() -> &'static MontOps<6> {
    static OPS: std::sync::OnceLock<MontOps<6>> = std::sync::OnceLock::new();
    OPS.get_or_init(select::<6>)
}

/// Kernel table for the 384-bit (6-limb) width.
#[cfg(not(feature = "std"))]
pub fn ops384() -> &'static MontOps<6> {
    static OPS: MontOps<6> = MontOps::PORTABLE;
    &OPS
}

/// Kernel table for the 256-bit (4-limb) width, selected once and
/// cached.
#[cfg(feature = "std")]
pub fn ops256() -> &'static MontOps<4> {
    static OPS: std::sync::OnceLock<MontOps<4>> = std::sync::OnceLock::new();
    OPS.get_or_init(select::<4>)
}

/// Kernel table for the 256-bit (4-limb) width.
#[cfg(not(feature = "std"))]
pub fn ops256() -> &'static MontOps<4> {
    static OPS: MontOps<4> = MontOps::PORTABLE;
    &OPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_selection() {
        // Same table on every call; results identical to the portable
        // kernels.
        let t1 = ops384() as *const _;
        let t2 = ops384() as *const _;
        assert!(t1 == t2);
        let a = [1u64, 2, 3, 4, 5, 6];
        let b = [7u64, 8, 9, 10, 11, 12];
        let p = crate::backend::Fp::MODULUS;
        let p0 = 0x89F3FFFCFFFCFFFDu64;
        let ops = ops384();
        assert_eq!((ops.mul_mont)(&a, &b, &p, p0),
            crate::backend::w64::vect::mul_mont(&a, &b, &p, p0));
        let _ = features();
    }
}
