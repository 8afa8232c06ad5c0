//! The correlation tensor Γ and the quantities derived from it.

use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::{ self as nd };
use num_complex::Complex64 as C64;
use num_traits::Zero;
use crate::{ bath::SpectralDensity, exciton::Eigenbasis, Result };
use super::bath_at_gaps;

/// Bath correlation tensor in the exciton basis.
///
/// ```text
/// Γ[a, b, c, d] = (1/2) sum_Z sum_{i in Z} x[i, a, b] x[i, c, d] · C_Z(e_b - e_a)
/// ```
/// The site projector couples the `(a, b)` and `(c, d)` coherences through
/// every site of a group, weighted by the group's full (complex) spectrum at
/// the gap between `b` and `a`.
pub(crate) fn correlation_tensor<B>(
    basis: &Eigenbasis,
    bath: &B,
    groups: &IndexMap<usize, Vec<usize>>,
) -> Result<nd::Array4<C64>>
where B: SpectralDensity + ?Sized
{
    let dim: usize = basis.dim();
    let X = basis.x();
    let mut G: nd::Array4<C64> = nd::Array4::zeros((dim, dim, dim, dim));
    for (&sd_id, sites) in groups.iter() {
        let Cw = bath_at_gaps(basis, bath, sd_id, true)?;
        for (a, b) in (0..dim).cartesian_product(0..dim) {
            // Cw[b, a] = C(e_b - e_a)
            let w: C64 = 0.5 * Cw[[b, a]];
            for (c, d) in (0..dim).cartesian_product(0..dim) {
                let mut proj: f64 = 0.0;
                for &i in sites {
                    proj += X[[i, a, b]] * X[[i, c, d]];
                }
                G[[a, b, c, d]] += proj * w;
            }
        }
    }
    Ok(G)
}

/// Convert Γ into the relaxation tensor.
///
/// With the partial trace `T[p, q] = sum_e Γ[q, e, e, p]`,
/// ```text
/// R[a, b, c, d] = Γ[c, a, b, d] + Γ*[d, b, c, a]
///                 - δ(a, c) T*[b, d] - δ(b, d) T[a, c].
/// ```
/// The index order of each Γ factor is load-bearing and must not be
/// relabeled; the two Kronecker terms carry the depopulation (lifetime)
/// contributions.
pub(crate) fn relaxation_from_gamma(G: &nd::Array4<C64>) -> nd::Array4<C64> {
    let dim: usize = G.shape()[0];
    let mut T: nd::Array2<C64> = nd::Array2::zeros((dim, dim));
    for (p, q) in (0..dim).cartesian_product(0..dim) {
        let mut tr = C64::zero();
        for e in 0..dim {
            tr += G[[q, e, e, p]];
        }
        T[[p, q]] = tr;
    }
    let mut RTen: nd::Array4<C64> = nd::Array4::zeros((dim, dim, dim, dim));
    for (a, b) in (0..dim).cartesian_product(0..dim) {
        for (c, d) in (0..dim).cartesian_product(0..dim) {
            let mut value: C64
                = G[[c, a, b, d]] + G[[d, b, c, a]].conj();
            if a == c {
                value -= T[[b, d]].conj();
            }
            if b == d {
                value -= T[[a, c]];
            }
            RTen[[a, b, c, d]] = value;
        }
    }
    RTen
}

/// Pure-dephasing rates read off a cached Γ:
/// `dephasing[a] = -(Γ[a, a, a, a] - sum_b Γ[a, b, b, a])`.
pub(crate) fn dephasing_from_gamma(G: &nd::Array4<C64>) -> nd::Array1<C64> {
    let dim: usize = G.shape()[0];
    nd::Array1::from_shape_fn(dim, |a| {
        let mut coh = C64::zero();
        for b in 0..dim {
            coh += G[[a, b, b, a]];
        }
        -(G[[a, a, a, a]] - coh)
    })
}

/// Pure-dephasing rates without the four-index tensor.
///
/// Accumulates, per bath group, the zero-frequency self term
/// `g_pop[a] = sum_{i in Z} x[i, a, a]² · C_Z(0)` and the coherence sum
/// `g_coh[a, b] = sum_{i in Z} x[i, a, b] x[i, b, a] · C_Z(e_b - e_a)`,
/// then takes `dephasing[a] = -(g_pop[a] - sum_b g_coh[a, b]) / 2`. Memory
/// stays at `dim²` entries where Γ would need `dim⁴`; the result matches
/// [`dephasing_from_gamma`] on the same inputs.
pub(crate) fn reduced_dephasing<B>(
    basis: &Eigenbasis,
    bath: &B,
    groups: &IndexMap<usize, Vec<usize>>,
) -> Result<nd::Array1<C64>>
where B: SpectralDensity + ?Sized
{
    let dim: usize = basis.dim();
    let X = basis.x();
    let mut g_pop: nd::Array1<C64> = nd::Array1::zeros(dim);
    let mut g_coh: nd::Array2<C64> = nd::Array2::zeros((dim, dim));
    for (&sd_id, sites) in groups.iter() {
        let Cw = bath_at_gaps(basis, bath, sd_id, true)?;
        for a in 0..dim {
            // Cw[a, a] is the spectrum at zero frequency
            for &i in sites {
                g_pop[a] += X[[i, a, a]].powi(2) * Cw[[a, a]];
            }
        }
        for (a, b) in (0..dim).cartesian_product(0..dim) {
            for &i in sites {
                g_coh[[a, b]] += X[[i, a, b]] * X[[i, b, a]] * Cw[[b, a]];
            }
        }
    }
    Ok(nd::Array1::from_shape_fn(dim, |a| {
        let coh: C64 = (0..dim).map(|b| g_coh[[a, b]]).sum();
        -0.5 * (g_pop[a] - coh)
    }))
}
