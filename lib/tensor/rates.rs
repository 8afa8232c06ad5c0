//! Population-transfer rate matrix.

use indexmap::IndexMap;
use ndarray::{ self as nd };
use crate::{ bath::SpectralDensity, exciton::Eigenbasis, Result };
use super::bath_at_gaps;

/// Markovian population-transfer rates between exciton states.
///
/// For every bath group `Z` and state pair `(a, b)`,
/// ```text
/// R[a, b] += sum_{i in Z} u[i, a]² u[i, b]² · Re C_Z(e_a - e_b),
/// ```
/// with `i` running over the sites coupled to density `Z`: the squared
/// eigenvector overlaps weight the group's dissipative spectrum at the gap
/// between the two states. The diagonal is then closed, `R[a, a] =
/// -sum_b R[b, a]`, so every column sums to zero and total population is
/// conserved. `R[a, b]` with `a ≠ b` is the flow from state `b` into `a`.
pub(crate) fn population_rates<B>(
    basis: &Eigenbasis,
    bath: &B,
    groups: &IndexMap<usize, Vec<usize>>,
) -> Result<nd::Array2<f64>>
where B: SpectralDensity + ?Sized
{
    let dim: usize = basis.dim();
    let U = basis.u();
    let mut R: nd::Array2<f64> = nd::Array2::zeros((dim, dim));
    for (&sd_id, sites) in groups.iter() {
        // Cw[a, b] = C(e_a - e_b), dissipative part only
        let Cw = bath_at_gaps(basis, bath, sd_id, false)?;
        for a in 0..dim {
            for b in 0..dim {
                let mut overlap: f64 = 0.0;
                for &i in sites {
                    overlap += U[[i, a]].powi(2) * U[[i, b]].powi(2);
                }
                R[[a, b]] += overlap * Cw[[a, b]].re;
            }
        }
    }
    for a in 0..dim {
        R[[a, a]] = 0.0;
    }
    for a in 0..dim {
        let depop: f64 = (0..dim).map(|b| R[[b, a]]).sum();
        R[[a, a]] = -depop;
    }
    Ok(R)
}
