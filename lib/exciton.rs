//! Exciton eigenbasis data produced by an upstream diagonalization.

use ndarray::{ self as nd, ArrayView1, ArrayView2, ArrayView3 };
use crate::{ Error, Result };

/// Precomputed eigenbasis of the aggregate Hamiltonian.
///
/// Rows of `u` index chromophore sites and columns index exciton states;
/// columns are assumed orthonormal, which is the diagonalizer's contract and
/// is not re-checked here. The gap matrix and the site projector tensor are
/// stored alongside so every contraction pass reads them without
/// recomputation:
///
/// - `om[a, b] = e_b - e_a` (antisymmetric);
/// - `x[i, a, b] = u[i, a] * u[i, b]`, the amplitude with which site `i`
///   couples the coherence between states `a` and `b` (symmetric in
///   `a, b`).
#[derive(Clone, Debug, PartialEq)]
pub struct Eigenbasis {
    u: nd::Array2<f64>,
    om: nd::Array2<f64>,
    x: nd::Array3<f64>,
}

impl Eigenbasis {
    /// Build the basis from exciton energies and the eigenvector matrix,
    /// deriving the gap matrix and the site projector tensor.
    ///
    /// `u` must carry one column per energy and at least one site row.
    pub fn new(energies: ArrayView1<f64>, u: ArrayView2<f64>) -> Result<Self> {
        let dim: usize = energies.len();
        if dim == 0 {
            return Err(Error::EmptySystem);
        }
        if u.ncols() != dim {
            return Err(Error::ShapeMismatch(format!(
                "eigenvector matrix has {} column(s) for {} energie(s)",
                u.ncols(), dim)));
        }
        if u.nrows() == 0 {
            return Err(Error::ShapeMismatch(
                "eigenvector matrix has no site rows".into()));
        }
        let om: nd::Array2<f64>
            = nd::Array2::from_shape_fn(
                (dim, dim), |(a, b)| energies[b] - energies[a]);
        let x: nd::Array3<f64>
            = nd::Array3::from_shape_fn(
                (u.nrows(), dim, dim), |(i, a, b)| u[[i, a]] * u[[i, b]]);
        Ok(Self { u: u.to_owned(), om, x })
    }

    /// Assemble the basis from already-derived arrays.
    ///
    /// Shapes must agree: `u` is `(n_sites, dim)`, `om` is `(dim, dim)`, and
    /// `x` is `(n_sites, dim, dim)`. The array contents are taken on faith.
    pub fn from_parts(
        u: nd::Array2<f64>,
        om: nd::Array2<f64>,
        x: nd::Array3<f64>,
    ) -> Result<Self>
    {
        let (n_sites, dim) = u.dim();
        if dim == 0 {
            return Err(Error::EmptySystem);
        }
        if n_sites == 0 {
            return Err(Error::ShapeMismatch(
                "eigenvector matrix has no site rows".into()));
        }
        if om.dim() != (dim, dim) {
            return Err(Error::ShapeMismatch(format!(
                "gap matrix is {:?}, expected ({}, {})", om.dim(), dim, dim)));
        }
        if x.dim() != (n_sites, dim, dim) {
            return Err(Error::ShapeMismatch(format!(
                "site projector is {:?}, expected ({}, {}, {})",
                x.dim(), n_sites, dim, dim)));
        }
        Ok(Self { u, om, x })
    }

    /// Number of exciton states.
    pub fn dim(&self) -> usize { self.u.ncols() }

    /// Number of chromophore sites.
    pub fn n_sites(&self) -> usize { self.u.nrows() }

    /// Eigenvector matrix, sites × states.
    pub fn u(&self) -> ArrayView2<f64> { self.u.view() }

    /// Energy-gap matrix, `om[a, b] = e_b - e_a`.
    pub fn om(&self) -> ArrayView2<f64> { self.om.view() }

    /// Site projector tensor, `x[i, a, b] = u[i, a] * u[i, b]`.
    pub fn x(&self) -> ArrayView3<f64> { self.x.view() }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use super::*;

    #[test]
    fn derives_gaps_and_projector() {
        let u = array![[1.0, 0.0], [0.0, 1.0]];
        let basis
            = Eigenbasis::new(array![0.0, 100.0].view(), u.view()).unwrap();
        assert_eq!(basis.dim(), 2);
        assert_eq!(basis.n_sites(), 2);
        assert_abs_diff_eq!(basis.om()[[0, 1]], 100.0);
        assert_abs_diff_eq!(basis.om()[[1, 0]], -100.0);
        assert_abs_diff_eq!(basis.x()[[0, 0, 0]], 1.0);
        assert_abs_diff_eq!(basis.x()[[1, 1, 1]], 1.0);
        assert_abs_diff_eq!(basis.x()[[0, 0, 1]], 0.0);
    }

    #[test]
    fn projector_is_symmetric_in_state_indices() {
        let r = 0.5_f64.sqrt();
        let u = array![[r, r], [r, -r]];
        let basis
            = Eigenbasis::new(array![-50.0, 50.0].view(), u.view()).unwrap();
        for i in 0..2 {
            for a in 0..2 {
                for b in 0..2 {
                    assert_abs_diff_eq!(
                        basis.x()[[i, a, b]],
                        basis.x()[[i, b, a]],
                    );
                }
            }
        }
    }

    #[test]
    fn rejects_empty_system() {
        let u = nd::Array2::<f64>::zeros((0, 0));
        let e = nd::Array1::<f64>::zeros(0);
        assert_eq!(Eigenbasis::new(e.view(), u.view()), Err(Error::EmptySystem));
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let u = array![[1.0, 0.0], [0.0, 1.0]];
        assert!(matches!(
            Eigenbasis::new(array![0.0, 1.0, 2.0].view(), u.view()),
            Err(Error::ShapeMismatch(_)),
        ));
        assert!(matches!(
            Eigenbasis::from_parts(
                u.clone(),
                nd::Array2::zeros((3, 3)),
                nd::Array3::zeros((2, 2, 2)),
            ),
            Err(Error::ShapeMismatch(_)),
        ));
    }
}
