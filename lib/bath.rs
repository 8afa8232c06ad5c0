//! Frequency-domain bath response functions.
//!
//! A [`SpectralDensity`] maps a matrix of transition frequencies to the bath
//! correlation spectrum evaluated elementwise at those frequencies. The
//! relaxation-tensor machinery only ever talks to the bath through this
//! trait, so any parameterization (measured, tabulated, analytic) can be
//! plugged in; [`OverdampedBath`] is the analytic Drude-Lorentz form shipped
//! with the crate.

use std::f64::consts::PI;
use ndarray::{ self as nd, ArrayView2 };
use num_complex::Complex64 as C64;
use crate::{ Error, Result };

/// Boltzmann constant in cm⁻¹ per kelvin, for callers whose Hamiltonians are
/// in wavenumbers.
pub const KB_WAVENUMBER_PER_KELVIN: f64 = 0.695034800;

/// Evaluator contract for the frequency-domain bath response.
///
/// `evaluate` fills a matrix of the same shape as `freq` with the correlation
/// spectrum `C(w)` of the density named by `sd_id`, elementwise. With
/// `imag = false` only the dissipative (real) part is filled and every
/// imaginary part is zero; with `imag = true` the dispersive
/// (principal-value) part is carried in the imaginary components.
///
/// Frequencies and the returned spectrum share the energy units of the
/// caller's Hamiltonian. Behavior at exactly zero frequency is the
/// implementor's responsibility; whatever it returns is propagated unchanged
/// by the tensor machinery.
pub trait SpectralDensity {
    /// Evaluate the response of density `sd_id` at every entry of `freq`.
    ///
    /// Unknown identifiers yield [`Error::UnknownSpectralDensity`].
    fn evaluate(&self, freq: ArrayView2<f64>, sd_id: usize, imag: bool)
        -> Result<nd::Array2<C64>>;
}

/// Parameters of one overdamped Brownian-oscillator (Drude-Lorentz)
/// component, `J(w) = 2 λ γ w / (w² + γ²)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrudeLorentz {
    /// Reorganization energy λ.
    pub reorg: f64,
    /// Drude cutoff frequency γ.
    pub cutoff: f64,
}

impl DrudeLorentz {
    /// Spectral density `J(w)`; odd in `w`.
    pub fn j(&self, w: f64) -> f64 {
        2.0 * self.reorg * self.cutoff * w
            / (w * w + self.cutoff * self.cutoff)
    }
}

/// A thermal bath built from [`DrudeLorentz`] components, one per
/// spectral-density identifier, at a common temperature.
///
/// The dissipative part of the spectrum obeys detailed balance,
/// ```text
/// C(w) = 2 J(w) / (1 - e^{-w/kT}),    C(0) = 4 λ kT / γ,
/// ```
/// so `C(-w) = e^{-w/kT} C(w)` and downhill transfer always outruns uphill
/// transfer. The dispersive part is the principal-value transform of the
/// dissipative one,
/// ```text
/// Im C(w) = (1/π) ∫_0^∞ [C(w-u) - C(w+u)] / u du,
/// ```
/// computed by a midpoint quadrature over a symmetric window with the
/// analytic `-4λγ/u²` Drude tail appended. The window substitution removes
/// the `u = 0` singularity of the Hilbert kernel.
#[derive(Clone, Debug, PartialEq)]
pub struct OverdampedBath {
    components: Vec<DrudeLorentz>,
    kt: f64,
}

/// Window half-width and resolution of the principal-value quadrature, in
/// multiples of the largest frequency scale of the integrand.
const PV_WINDOW: f64 = 60.0;
const PV_STEPS: usize = 3000;

impl OverdampedBath {
    /// Create a new bath from per-identifier components and the thermal
    /// energy `kT`, in the same units as all frequencies.
    ///
    /// At least one component is required; `kT` and every cutoff must be
    /// positive and every reorganization energy non-negative.
    pub fn new(components: Vec<DrudeLorentz>, kt: f64) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::InvalidBath(
                "at least one spectral-density component is required".into()));
        }
        if !(kt > 0.0) {
            return Err(Error::InvalidBath(
                format!("thermal energy must be positive, got {}", kt)));
        }
        for (id, comp) in components.iter().enumerate() {
            if !(comp.cutoff > 0.0) || !(comp.reorg >= 0.0) {
                return Err(Error::InvalidBath(format!(
                    "component {}: need cutoff > 0 and reorg >= 0, \
                    got cutoff = {}, reorg = {}",
                    id, comp.cutoff, comp.reorg)));
            }
        }
        Ok(Self { components, kt })
    }

    /// Number of spectral-density components (valid identifiers are
    /// `0..n_components()`).
    pub fn n_components(&self) -> usize { self.components.len() }

    /// Thermal energy `kT` of the bath.
    pub fn thermal_energy(&self) -> f64 { self.kt }

    fn component(&self, sd_id: usize) -> Result<&DrudeLorentz> {
        self.components.get(sd_id)
            .ok_or(Error::UnknownSpectralDensity {
                id: sd_id,
                count: self.components.len(),
            })
    }

    /// Dissipative part `C(w)` of one component.
    ///
    /// `exp_m1` keeps the detailed-balance denominator accurate for
    /// `|w| ≪ kT`; the exact `w = 0` limit is substituted directly.
    fn spectrum(&self, comp: &DrudeLorentz, w: f64) -> f64 {
        if w == 0.0 {
            4.0 * comp.reorg * self.kt / comp.cutoff
        } else {
            2.0 * comp.j(w) / (-(-w / self.kt).exp_m1())
        }
    }

    /// Dispersive part `Im C(w)` of one component, by principal-value
    /// quadrature of the dissipative part.
    fn dispersion(&self, comp: &DrudeLorentz, w: f64) -> f64 {
        let scale: f64 = comp.cutoff.max(self.kt).max(w.abs());
        let u_max: f64 = PV_WINDOW * scale;
        let du: f64 = u_max / PV_STEPS as f64;
        let mut acc: f64 = 0.0;
        for k in 0..PV_STEPS {
            let u = (k as f64 + 0.5) * du;
            acc += (self.spectrum(comp, w - u) - self.spectrum(comp, w + u))
                / u;
        }
        // beyond the window C(w - u) is exponentially small and
        // C(w + u) -> 4λγ/u, leaving a -4λγ/u² integrand
        let tail: f64 = 4.0 * comp.reorg * comp.cutoff / u_max;
        (acc * du - tail) / PI
    }
}

impl SpectralDensity for OverdampedBath {
    fn evaluate(&self, freq: ArrayView2<f64>, sd_id: usize, imag: bool)
        -> Result<nd::Array2<C64>>
    {
        let comp = self.component(sd_id)?;
        let Cw: nd::Array2<C64>
            = if imag {
                freq.mapv(|w| C64::new(
                    self.spectrum(comp, w),
                    self.dispersion(comp, w),
                ))
            } else {
                freq.mapv(|w| C64::from(self.spectrum(comp, w)))
            };
        Ok(Cw)
    }
}

#[cfg(test)]
mod test {
    use approx::{ assert_abs_diff_eq, assert_relative_eq };
    use ndarray::array;
    use super::*;

    fn bath() -> OverdampedBath {
        OverdampedBath::new(
            vec![DrudeLorentz { reorg: 35.0, cutoff: 100.0 }],
            KB_WAVENUMBER_PER_KELVIN * 300.0,
        )
        .unwrap()
    }

    #[test]
    fn detailed_balance() {
        let b = bath();
        let comp = DrudeLorentz { reorg: 35.0, cutoff: 100.0 };
        for w in [10.0, 100.0, 350.0] {
            let up = b.spectrum(&comp, -w);
            let down = b.spectrum(&comp, w);
            assert_relative_eq!(
                up,
                down * (-w / b.thermal_energy()).exp(),
                max_relative = 1e-12,
            );
        }
    }

    #[test]
    fn zero_frequency_limit() {
        let b = bath();
        let comp = DrudeLorentz { reorg: 35.0, cutoff: 100.0 };
        let expected = 4.0 * 35.0 * b.thermal_energy() / 100.0;
        assert_relative_eq!(b.spectrum(&comp, 0.0), expected, max_relative = 1e-12);
        // continuous through w = 0
        assert_relative_eq!(b.spectrum(&comp, 1e-7), expected, max_relative = 1e-6);
        assert_relative_eq!(b.spectrum(&comp, -1e-7), expected, max_relative = 1e-6);
    }

    #[test]
    fn dispersion_at_zero_matches_reorganization() {
        // Im C(0) = -(2/π) ∫_0^∞ 2 J(u)/u du = -2λ at any temperature
        let comp = DrudeLorentz { reorg: 35.0, cutoff: 100.0 };
        for kt in [50.0, 200.0, 1000.0] {
            let b = OverdampedBath::new(vec![comp], kt).unwrap();
            assert_relative_eq!(
                b.dispersion(&comp, 0.0),
                -2.0 * 35.0,
                max_relative = 1e-3,
            );
        }
    }

    #[test]
    fn evaluate_matches_flag() {
        let b = bath();
        let freq = array![[0.0, 100.0], [-100.0, 0.0]];
        let re_only = b.evaluate(freq.view(), 0, false).unwrap();
        let full = b.evaluate(freq.view(), 0, true).unwrap();
        for (r, f) in re_only.iter().zip(full.iter()) {
            assert_abs_diff_eq!(r.re, f.re, epsilon = 1e-12);
            assert_abs_diff_eq!(r.im, 0.0);
        }
        assert!(full.iter().any(|c| c.im != 0.0));
    }

    #[test]
    fn unknown_id_is_reported() {
        let b = bath();
        let freq = array![[0.0]];
        assert_eq!(
            b.evaluate(freq.view(), 3, false),
            Err(Error::UnknownSpectralDensity { id: 3, count: 1 }),
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(OverdampedBath::new(vec![], 100.0).is_err());
        assert!(
            OverdampedBath::new(
                vec![DrudeLorentz { reorg: 35.0, cutoff: 100.0 }], 0.0)
            .is_err()
        );
        assert!(
            OverdampedBath::new(
                vec![DrudeLorentz { reorg: 35.0, cutoff: -1.0 }], 100.0)
            .is_err()
        );
    }
}
