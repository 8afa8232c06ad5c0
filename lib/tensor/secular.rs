//! Secular truncation of the relaxation tensor.

use itertools::Itertools;
use ndarray::{ self as nd, ArrayView2 };
use num_complex::Complex64 as C64;
use num_traits::Zero;

/// Largest magnitude of the frequency combination
/// `(e_a - e_b) - (e_c - e_d)` still treated as resonant, in the energy
/// units of the Hamiltonian.
///
/// The cutoff is absolute rather than relative so that exactly matching
/// combinations (population terms and self-resonant coherences) survive at
/// any spectral scale; for excitonic systems with gaps of order 10-1000 cm⁻¹
/// it sits far below any physical gap difference.
pub const SECULAR_CUTOFF: f64 = 1e-9;

/// Zero every tensor element that does not conserve transition frequency.
///
/// Element `(a, b, c, d)` couples the `(a, b)` coherence to the `(c, d)`
/// coherence and survives only if the mismatch of the two transition
/// frequencies, `om[b, a] - om[d, c]`, is within [`SECULAR_CUTOFF`] in
/// magnitude. Surviving elements are left bit-identical, so applying the
/// filter again changes nothing.
pub(crate) fn secularize(RTen: &mut nd::Array4<C64>, om: ArrayView2<f64>) {
    let dim: usize = om.nrows();
    for (a, b) in (0..dim).cartesian_product(0..dim) {
        for (c, d) in (0..dim).cartesian_product(0..dim) {
            if (om[[b, a]] - om[[d, c]]).abs() > SECULAR_CUTOFF {
                RTen[[a, b, c, d]] = C64::zero();
            }
        }
    }
}
