//! Time evolution of states expressed in a finite basis.
//!
//! For a time-independent Hamiltonian matrix `H` (and, for a non-orthogonal
//! basis, an overlap matrix `S`), the coefficient vector of a state evolves as
//! ```text
//! c(t) = V exp(-i E t) V⁻¹ c(0)
//! ```
//! where `H V = S V diag(E)`. [`TimeEvolution`] diagonalizes once, on first
//! use, and evaluates this expression for any number of times afterward.
//!
//! A grid-based split-operator propagator, [`split_step`], is also provided
//! for cross-checking against the spectral result.
//!
//! In all 2D arrays, the first (or zero-th) axis indexes time.

use std::{ f64::consts::TAU, sync::OnceLock };
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    Arr1,
    Arr2,
    basis::{ BasisFunction, superpose },
    config::Config,
    error::{ LengthError, TError },
    linalg::{ check_symmetric, eigh, eigh_generalized },
    utils::{ fft_inplace, ifft_inplace },
};

pub type TResult<T> = Result<T, TError>;

/// Eigen-decomposition of a Hamiltonian together with an initial state
/// projected onto its eigenvectors.
#[derive(Clone, Debug)]
pub struct Spectrum {
    energies: nd::Array1<f64>,
    vectors: nd::Array2<f64>,
    projected: nd::Array1<C64>,
}

impl Spectrum {
    /// Eigen-energies in ascending order.
    pub fn energies(&self) -> &nd::Array1<f64> { &self.energies }

    /// Eigenvectors, as columns.
    pub fn vectors(&self) -> &nd::Array2<f64> { &self.vectors }

    /// The initial state in the eigenbasis, `V⁻¹ c(0)`.
    pub fn projected(&self) -> &nd::Array1<C64> { &self.projected }

    /// Coefficients at time `t`.
    pub fn at(&self, t: f64) -> nd::Array1<C64> {
        let phased: nd::Array1<C64>
            = nd::Zip::from(&self.energies).and(&self.projected)
            .map_collect(|&e, &p| p * C64::cis(-e * t));
        self.vectors.mapv(C64::from).dot(&phased)
    }

    /// Coefficients at each of a series of times, one row per time.
    pub fn at_times<S>(&self, t: &Arr1<S>) -> nd::Array2<C64>
    where S: nd::Data<Elem = f64>
    {
        let n = self.energies.len();
        let v = self.vectors.mapv(C64::from);
        let phases: nd::Array2<C64>
            = nd::Array2::from_shape_fn((t.len(), n), |(k, i)| {
                self.projected[i] * C64::cis(-self.energies[i] * t[k])
            });
        phases.dot(&v.t())
    }
}

/// The two states of a [`TimeEvolution`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EvolutionState {
    /// Matrices validated, not yet diagonalized.
    Unbuilt,
    /// Eigen-decomposition computed and cached.
    Diagonalized,
}

/// Spectral propagator for a time-independent Hamiltonian matrix.
///
/// Construction validates the inputs; diagonalization happens at most once,
/// on the first call to [`diagonalize`][Self::diagonalize] or any evaluation
/// method, and is shared by all later calls, including concurrent ones.
///
/// ```
/// use ndarray as nd;
/// use num_complex::Complex64 as C64;
/// use transit::{ config::Config, timedep::TimeEvolution };
///
/// let h = nd::array![[0.0, 1.0], [1.0, 0.0]];
/// let c0 = nd::array![C64::from(1.0), C64::from(0.0)];
/// let evo = TimeEvolution::new(h, c0, &Config::default()).unwrap();
/// let c = evo.at(std::f64::consts::FRAC_PI_2).unwrap();
/// assert!(c[0].norm() < 1e-12);
/// assert!((c[1] - C64::new(0.0, -1.0)).norm() < 1e-12);
/// ```
#[derive(Debug)]
pub struct TimeEvolution {
    h: nd::Array2<f64>,
    s: Option<nd::Array2<f64>>,
    c0: nd::Array1<C64>,
    tol: f64,
    spectrum: OnceLock<Spectrum>,
}

impl TimeEvolution {
    fn validate(h: &nd::Array2<f64>, c0: &nd::Array1<C64>, tol: f64)
        -> TResult<()>
    {
        if c0.is_empty() { return Err(TError::Empty); }
        check_symmetric(h, tol).map_err(TError::linalg("hamiltonian"))?;
        LengthError::check_len(h.nrows(), c0.len())?;
        Ok(())
    }

    /// Set up evolution under `h` in an orthonormal basis from initial
    /// coefficients `c0`.
    ///
    /// Fails if `h` is empty, not square, non-finite, or asymmetric beyond
    /// `config.float_tol`, or if `c0` does not match it in size.
    pub fn new(h: nd::Array2<f64>, c0: nd::Array1<C64>, config: &Config)
        -> TResult<Self>
    {
        Self::validate(&h, &c0, config.float_tol)?;
        Ok(Self { h, s: None, c0, tol: config.float_tol, spectrum: OnceLock::new() })
    }

    /// Set up evolution under `h` in a non-orthogonal basis with overlap
    /// matrix `s`.
    ///
    /// In addition to the checks of [`new`][Self::new], `s` must match `h` in
    /// shape and be symmetric; positive-definiteness is checked on
    /// diagonalization.
    pub fn with_overlap(
        h: nd::Array2<f64>,
        s: nd::Array2<f64>,
        c0: nd::Array1<C64>,
        config: &Config,
    ) -> TResult<Self>
    {
        Self::validate(&h, &c0, config.float_tol)?;
        check_symmetric(&s, config.float_tol).map_err(TError::linalg("overlap"))?;
        LengthError::check_len(h.nrows(), s.nrows())?;
        Ok(Self {
            h,
            s: Some(s),
            c0,
            tol: config.float_tol,
            spectrum: OnceLock::new(),
        })
    }

    /// Like [`new`][Self::new], but diagonalizing immediately.
    pub fn build(h: nd::Array2<f64>, c0: nd::Array1<C64>, config: &Config)
        -> TResult<Self>
    {
        let evo = Self::new(h, c0, config)?;
        evo.diagonalize()?;
        Ok(evo)
    }

    /// The Hamiltonian matrix.
    pub fn hamiltonian(&self) -> &nd::Array2<f64> { &self.h }

    /// The overlap matrix, if the basis is non-orthogonal.
    pub fn overlap(&self) -> Option<&nd::Array2<f64>> { self.s.as_ref() }

    /// The initial coefficients.
    pub fn initial(&self) -> &nd::Array1<C64> { &self.c0 }

    /// Current state of the diagonalization.
    pub fn state(&self) -> EvolutionState {
        if self.spectrum.get().is_some() {
            EvolutionState::Diagonalized
        } else {
            EvolutionState::Unbuilt
        }
    }

    /// Diagonalize the Hamiltonian if not done already, returning the cached
    /// spectrum.
    pub fn diagonalize(&self) -> TResult<&Spectrum> {
        if let Some(spectrum) = self.spectrum.get() { return Ok(spectrum); }
        let (energies, vectors, inv)
            = match &self.s {
                None => {
                    let (e, v) = eigh(&self.h, self.tol)
                        .map_err(TError::linalg("hamiltonian"))?;
                    let inv = v.t().to_owned();
                    (e, v, inv)
                },
                Some(s) => {
                    let (e, v) = eigh_generalized(&self.h, s, self.tol)
                        .map_err(TError::linalg("overlap"))?;
                    let inv = v.t().dot(s);
                    (e, v, inv)
                },
            };
        debug!(
            size = energies.len(),
            e_min = energies[0],
            e_max = energies[energies.len() - 1],
            "diagonalized hamiltonian",
        );
        let projected = inv.mapv(C64::from).dot(&self.c0);
        let spectrum = Spectrum { energies, vectors, projected };
        // a concurrent caller may have won the race; both results are equal
        Ok(self.spectrum.get_or_init(move || spectrum))
    }

    /// Coefficients at time `t`.
    pub fn at(&self, t: f64) -> TResult<nd::Array1<C64>> {
        Ok(self.diagonalize()?.at(t))
    }

    /// Coefficients at each of a series of times, one row per time.
    pub fn at_times<S>(&self, t: &Arr1<S>) -> TResult<nd::Array2<C64>>
    where S: nd::Data<Elem = f64>
    {
        Ok(self.diagonalize()?.at_times(t))
    }

    /// Norm `c† S c` of a coefficient vector, with `S = 1` for an orthonormal
    /// basis.
    pub fn norm<S>(&self, c: &Arr1<S>) -> TResult<f64>
    where S: nd::Data<Elem = C64>
    {
        LengthError::check_len(self.c0.len(), c.len())?;
        let val
            = match &self.s {
                None => c.iter().map(|ck| ck.norm_sqr()).sum(),
                Some(s) => {
                    let sc = s.mapv(C64::from).dot(c);
                    c.iter().zip(&sc).map(|(ck, sck)| (ck.conj() * sck).re).sum()
                },
            };
        Ok(val)
    }

    /// Total probability at time `t`.
    pub fn probability(&self, t: f64) -> TResult<f64> {
        self.norm(&self.at(t)?)
    }

    /// The wavefunction `ψ(x, t) = Σᵢ cᵢ(t) φᵢ(x)` over a coordinate array.
    pub fn wavefunction<B, S>(&self, basis: &[B], t: f64, x: &Arr1<S>)
        -> TResult<nd::Array1<C64>>
    where
        B: BasisFunction,
        S: nd::Data<Elem = f64>,
    {
        LengthError::check_len(self.c0.len(), basis.len())?;
        Ok(superpose(basis, &self.at(t)?, x)?)
    }
}

// return an array of differences between adjacent elements of a source array
fn array_diff<S>(a: &Arr1<S>) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    a.iter().zip(a.iter().skip(1))
        .map(|(ak, akp1)| akp1 - ak)
        .collect()
}

// kinetic half of the split-step, T = k² / 2
fn apply_split_kinetic<S>(dx: f64, q: &mut Arr1<S>, dt: f64)
where S: nd::DataMut<Elem = C64>
{
    let n = q.len();
    let m = if n % 2 == 0 { n / 2 } else { (n + 1) / 2 };
    let dk = TAU * (n as f64 * dx).recip();
    fft_inplace(q);
    q.iter_mut().enumerate()
        .for_each(|(i, qi)| {
            let k = if i < m { i as f64 * dk } else { (n - i) as f64 * dk };
            *qi *= C64::cis(-k.powi(2) / 2.0 * dt);
        });
    ifft_inplace(q);
}

fn apply_split_potential<S, T>(v: &Arr1<S>, q: &mut Arr1<T>, dt: f64)
where
    S: nd::Data<Elem = f64>,
    T: nd::DataMut<Elem = C64>,
{
    q.iter_mut().zip(v)
        .for_each(|(qi, vi)| { *qi *= C64::cis(-vi * dt); });
}

/// Perform split-step integration of `i ∂ψ/∂t = (-½ ∂² + V) ψ` for a
/// time-independent potential sampled on an evenly spaced, periodic grid of
/// spacing `dx`, returning the wavefunction at each time in `t` (one row per
/// time, the first being `q0`).
///
/// Fails if `q0` is empty, if `v` and `q0` differ in length, or if `t` is
/// empty.
pub fn split_step<S, T, U>(dx: f64, v: &Arr1<S>, q0: &Arr1<T>, t: &Arr1<U>)
    -> TResult<nd::Array2<C64>>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = C64>,
    U: nd::Data<Elem = f64>,
{
    if q0.is_empty() || t.is_empty() { return Err(TError::Empty); }
    LengthError::check(v, q0)?;
    let dt = array_diff(t);
    let mut q: nd::Array2<C64> = nd::Array2::zeros((t.len(), q0.len()));
    let mut q_temp: nd::Array1<C64> = q0.to_owned();
    q.slice_mut(nd::s![0, ..]).assign(q0);
    let iter = dt.iter().zip(q.axis_iter_mut(nd::Axis(0)).skip(1));
    for (&dtk, mut qkp1) in iter {
        apply_split_potential(v, &mut q_temp, dtk / 2.0);
        apply_split_kinetic(dx, &mut q_temp, dtk);
        apply_split_potential(v, &mut q_temp, dtk / 2.0);
        qkp1.assign(&q_temp);
    }
    Ok(q)
}

/// Compute `|ψ|²` for each row of a time-indexed wavefunction array.
pub fn densities<S>(q: &Arr2<S>) -> nd::Array2<f64>
where S: nd::Data<Elem = C64>
{
    q.mapv(|qk| qk.norm_sqr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use crate::{ error::LinalgError, utils::wf_norm };

    fn c(re: f64, im: f64) -> C64 { C64::new(re, im) }

    fn rabi(g: f64) -> TimeEvolution {
        let h = nd::array![[0.0, g], [g, 0.0]];
        let c0 = nd::array![c(1.0, 0.0), c(0.0, 0.0)];
        TimeEvolution::new(h, c0, &Config::default()).unwrap()
    }

    #[test]
    fn two_level_oscillation() {
        let g = 0.7;
        let evo = rabi(g);
        for &t in &[0.0, 0.3, 1.1, 5.0] {
            let ct = evo.at(t).unwrap();
            assert!((ct[0] - c((g * t).cos(), 0.0)).norm() < 1e-12);
            assert!((ct[1] - c(0.0, -(g * t).sin())).norm() < 1e-12);
        }
    }

    #[test]
    fn lazy_diagonalization() {
        let evo = rabi(1.0);
        assert_eq!(evo.state(), EvolutionState::Unbuilt);
        let first = evo.diagonalize().unwrap().energies().clone();
        assert_eq!(evo.state(), EvolutionState::Diagonalized);
        let second = evo.diagonalize().unwrap().energies().clone();
        assert_eq!(first, second);
        assert!((first[0] + 1.0).abs() < 1e-12 && (first[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn vectorized_matches_pointwise() {
        let h = nd::array![[1.0, 0.2, 0.0], [0.2, 2.0, 0.3], [0.0, 0.3, 3.5]];
        let c0 = nd::array![c(0.6, 0.0), c(0.0, 0.8), c(0.0, 0.0)];
        let evo = TimeEvolution::build(h, c0.clone(), &Config::default()).unwrap();
        let t = nd::Array1::linspace(0.0, 4.0 * PI, 50);
        let ct = evo.at_times(&t).unwrap();
        assert_eq!(ct.dim(), (50, 3));
        for (k, &tk) in t.iter().enumerate() {
            let row = evo.at(tk).unwrap();
            for i in 0..3 { assert!((ct[[k, i]] - row[i]).norm() < 1e-12); }
            assert!((evo.norm(&ct.row(k)).unwrap() - 1.0).abs() < 1e-12);
        }
        for i in 0..3 { assert!((ct[[0, i]] - c0[i]).norm() < 1e-12); }
    }

    #[test]
    fn non_orthogonal_basis() {
        // the Rabi problem in the basis {e0, (e0 + e1) / √2}
        let r = 0.5_f64.sqrt();
        let b = nd::array![[1.0, r], [0.0, r]];
        let h0 = nd::array![[0.0, 1.0], [1.0, 0.0]];
        let h = b.t().dot(&h0).dot(&b);
        let s = b.t().dot(&b);
        let c0 = nd::array![c(1.0, 0.0), c(0.0, 0.0)];
        let evo = TimeEvolution::with_overlap(h, s, c0, &Config::default()).unwrap();
        let t = 0.9;
        let ct = evo.at(t).unwrap();
        // back to the orthonormal basis
        let direct = b.mapv(C64::from).dot(&ct);
        assert!((direct[0] - c(t.cos(), 0.0)).norm() < 1e-10);
        assert!((direct[1] - c(0.0, -t.sin())).norm() < 1e-10);
        assert!((evo.probability(t).unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn rejects_bad_input() {
        let config = Config::default();
        let c0 = nd::array![c(1.0, 0.0), c(0.0, 0.0)];
        let nonsym = nd::array![[0.0, 1.0], [0.0, 0.0]];
        assert!(matches!(
            TimeEvolution::new(nonsym, c0.clone(), &config),
            Err(TError::Linalg { matrix: "hamiltonian", source: LinalgError::NotSymmetric { .. } }),
        ));
        let h3: nd::Array2<f64> = nd::Array2::eye(3);
        assert!(matches!(
            TimeEvolution::new(h3, c0.clone(), &config),
            Err(TError::Length(_)),
        ));
        let h2: nd::Array2<f64> = nd::Array2::eye(2);
        assert!(matches!(
            TimeEvolution::new(h2.clone(), nd::Array1::zeros(0), &config),
            Err(TError::Empty),
        ));
        let indefinite = nd::array![[1.0, 0.0], [0.0, -1.0]];
        let evo = TimeEvolution::with_overlap(h2, indefinite, c0, &config).unwrap();
        assert!(matches!(
            evo.at(1.0),
            Err(TError::Linalg { source: LinalgError::NotPositiveDefinite, .. }),
        ));
    }

    #[test]
    fn split_step_keeps_ground_state() {
        let n = 256;
        let dx = 20.0 / n as f64;
        let x = nd::Array1::from_shape_fn(n, |i| -10.0 + i as f64 * dx);
        let v = x.mapv(|xk| 0.5 * xk * xk);
        let q0 = x.mapv(|xk| C64::from(PI.powf(-0.25) * (-xk * xk / 2.0).exp()));
        let t = nd::Array1::linspace(0.0, 1.0, 101);
        let q = split_step(dx, &v, &q0, &t).unwrap();
        let rho = densities(&q);
        let rho0 = q0.mapv(|qk| qk.norm_sqr());
        let last = rho.row(100);
        assert!(last.iter().zip(&rho0).all(|(a, b)| (a - b).abs() < 1e-3));
        assert!((wf_norm(&q.row(100), dx) - wf_norm(&q0, dx)).abs() < 1e-10);
        assert!(split_step(dx, &v.slice(nd::s![..10]), &q0, &t).is_err());
    }
}
