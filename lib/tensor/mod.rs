//! Assembly of Markovian relaxation quantities in the exciton basis.
//!
//! A [`RedfieldTensor`] borrows an [`Eigenbasis`] and a bath and lazily
//! builds, on first request, the population-transfer rate matrix, the full
//! four-index relaxation tensor (secularized on demand), the per-state
//! pure-dephasing rates, and the lineshape exponent `xi`. Each derived
//! quantity is cached in an explicit optional slot and never recomputed; the
//! borrowed inputs are immutable for the life of the instance.
//!
//! The correlation tensor Γ and the relaxation tensor each hold `dim⁴`
//! complex entries. Building the full tensor keeps Γ around so later
//! dephasing requests are a cheap read; rate-only and dephasing-only use
//! goes through reduced contractions that never allocate either of them.
//!
//! Redfield theory as applied to excitonic energy transfer follows
//! <https://doi.org/10.1063/1.4918343>.

use indexmap::IndexMap;
use log::debug;
use ndarray::{ self as nd };
use num_complex::Complex64 as C64;
use crate::{
    bath::SpectralDensity,
    exciton::Eigenbasis,
    Error,
    Result,
};

pub mod rates;
pub mod gamma;
pub mod secular;
pub use secular::SECULAR_CUTOFF;

/// Group sites by their spectral-density identifier.
///
/// Keys are the distinct identifiers in ascending order; values are the site
/// indices assigned to each, in site order. Every contraction pass iterates
/// this map, so no result depends on the order identifiers appear in
/// `sd_ids`.
pub(crate) fn group_sites(sd_ids: &[usize]) -> IndexMap<usize, Vec<usize>> {
    let mut groups: IndexMap<usize, Vec<usize>> = IndexMap::new();
    for (site, id) in sd_ids.iter().enumerate() {
        groups.entry(*id).or_default().push(site);
    }
    groups.sort_keys();
    groups
}

/// Evaluate one bath density at every exciton energy gap.
///
/// Element `(a, b)` of the returned matrix is the spectrum at `e_a - e_b`,
/// the frequency released in going from state `a` to state `b`. All passes
/// share this helper so the frequency convention is fixed in one place.
pub(crate) fn bath_at_gaps<B>(
    basis: &Eigenbasis,
    bath: &B,
    sd_id: usize,
    imag: bool,
) -> Result<nd::Array2<C64>>
where B: SpectralDensity + ?Sized
{
    bath.evaluate(basis.om().t(), sd_id, imag)
}

/// Redfield relaxation superoperator for one aggregate.
///
/// Construction takes the eigenbasis, the bath, the site-to-density
/// assignment, and the secularization flag; every physical quantity is then
/// computed on first query and cached. Queries take `&mut self` to fill the
/// caches; instances are not meant to be shared across threads.
#[derive(Clone, Debug)]
pub struct RedfieldTensor<'a, B>
where B: SpectralDensity + ?Sized
{
    basis: &'a Eigenbasis,
    bath: &'a B,
    groups: IndexMap<usize, Vec<usize>>,
    secular: bool,
    rates: Option<nd::Array2<f64>>,
    gamma: Option<nd::Array4<C64>>,
    rten: Option<nd::Array4<C64>>,
    dephasing: Option<nd::Array1<C64>>,
}

impl<'a, B> RedfieldTensor<'a, B>
where B: SpectralDensity + ?Sized
{
    /// Create a new relaxation-tensor instance.
    ///
    /// `sd_ids[i]` names the spectral density coupled to site `i`; the list
    /// must cover every site of the basis, and sites may share a density.
    /// With `secular = true` the full tensor is truncated to its
    /// energy-conserving elements when built. Identifier validity is checked
    /// by the bath at the first evaluation that needs it.
    pub fn new(
        basis: &'a Eigenbasis,
        bath: &'a B,
        sd_ids: &[usize],
        secular: bool,
    ) -> Result<Self>
    {
        if sd_ids.len() != basis.n_sites() {
            return Err(Error::BathAssignment {
                got: sd_ids.len(),
                expected: basis.n_sites(),
            });
        }
        Ok(Self {
            basis,
            bath,
            groups: group_sites(sd_ids),
            secular,
            rates: None,
            gamma: None,
            rten: None,
            dephasing: None,
        })
    }

    /// Number of exciton states.
    pub fn dim(&self) -> usize { self.basis.dim() }

    /// `true` if the relaxation tensor is secularized when built.
    pub fn is_secular(&self) -> bool { self.secular }

    /// Get a reference to the eigenbasis.
    pub fn basis(&self) -> &Eigenbasis { self.basis }

    /// Population-transfer rate matrix.
    ///
    /// `rates[a, b]` with `a ≠ b` is the rate of population flow from state
    /// `b` into state `a`; diagonal entries hold the total depopulation of
    /// each state, so every column sums to zero.
    pub fn rates(&mut self) -> Result<&nd::Array2<f64>> {
        if self.rates.is_none() {
            debug!(
                "building rate matrix: dim = {}, {} bath group(s)",
                self.dim(), self.groups.len(),
            );
            let R = rates::population_rates(self.basis, self.bath, &self.groups)?;
            self.rates = Some(R);
        }
        Ok(self.rates.as_ref().expect("RedfieldTensor::rates: cache filled"))
    }

    /// Full relaxation tensor, secularized if the instance was built with
    /// `secular = true`.
    ///
    /// The intermediate correlation tensor is retained for later dephasing
    /// requests, trading `dim⁴` complex entries of memory for a free read
    /// there.
    pub fn relaxation_tensor(&mut self) -> Result<&nd::Array4<C64>> {
        if self.rten.is_none() {
            debug!(
                "building relaxation tensor: dim = {}, secular = {}",
                self.dim(), self.secular,
            );
            let G = gamma::correlation_tensor(self.basis, self.bath, &self.groups)?;
            let mut RTen = gamma::relaxation_from_gamma(&G);
            if self.secular {
                secular::secularize(&mut RTen, self.basis.om());
            }
            self.gamma = Some(G);
            self.rten = Some(RTen);
        }
        Ok(self.rten.as_ref().expect("RedfieldTensor::relaxation_tensor: cache filled"))
    }

    /// Pure-dephasing rate of every exciton state, for lineshape
    /// calculations.
    ///
    /// Reads the cached correlation tensor when the full tensor has been
    /// built; otherwise runs a reduced contraction that stays at `dim²`
    /// entries of memory. Both routes produce the same vector.
    pub fn dephasing(&mut self) -> Result<&nd::Array1<C64>> {
        if self.dephasing.is_none() {
            let deph = match &self.gamma {
                Some(G) => gamma::dephasing_from_gamma(G),
                None => gamma::reduced_dephasing(
                    self.basis, self.bath, &self.groups)?,
            };
            self.dephasing = Some(deph);
        }
        Ok(self.dephasing.as_ref().expect("RedfieldTensor::dephasing: cache filled"))
    }

    /// Lineshape exponent `xi[a, k] = dephasing[a] * time[k]` on a time
    /// grid.
    ///
    /// Dephasing is computed and cached if not already present; the grid may
    /// be empty.
    pub fn xi(&mut self, time: nd::ArrayView1<f64>) -> Result<nd::Array2<C64>> {
        self.dephasing()?;
        let deph = self.dephasing.as_ref()
            .expect("RedfieldTensor::xi: dephasing cache filled");
        let xi: nd::Array2<C64>
            = nd::Array2::from_shape_fn(
                (deph.len(), time.len()), |(a, k)| deph[a] * time[k]);
        Ok(xi)
    }
}
