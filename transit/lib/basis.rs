//! One-dimensional basis functions.
//!
//! All basis functions implement [`BasisFunction`], which exposes values and
//! derivatives, an intrinsic energy, the natural potential in which that
//! energy is an eigenvalue, and the interval outside which the function is
//! negligible. Families with closed-form matrix elements override
//! [`BasisFunction::closed_overlap`] and [`BasisFunction::closed_kinetic`];
//! [operators][crate::operators] fall back to quadrature otherwise.
//!
//! Two families are provided: [`HarmonicOscillator`] eigenstates and
//! [`EigenState`]s, i.e. eigenvectors of a Hamiltonian expanded in some other
//! basis (see [`eigen`][crate::eigen]).

use std::{ f64::consts::PI, hash::{ Hash, Hasher }, sync::Arc };
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr1,
    config::Config,
    error::{ BasisError, LengthError },
    potentials::{ Harmonic, Potential },
};

pub type BResult<T> = Result<T, BasisError>;

/// Capabilities shared by every basis function.
pub trait BasisFunction {
    /// Type of the natural potential.
    type Potential: Potential;

    /// Value at `x`.
    fn value(&self, x: f64) -> f64;

    /// First derivative at `x`.
    fn derivative(&self, x: f64) -> f64;

    /// Second derivative at `x`.
    fn second_derivative(&self, x: f64) -> f64;

    /// Intrinsic energy: the eigenvalue of the natural Hamiltonian
    /// `-½ ∂² + V` for which this function is an eigenfunction.
    fn energy(&self) -> f64;

    /// The natural potential `V`.
    fn potential(&self) -> Self::Potential;

    /// An interval outside of which `|f(x)|` is below `small`.
    fn support(&self, small: f64) -> (f64, f64);

    /// Inner product with `other` when known in closed form.
    fn closed_overlap(&self, _other: &Self) -> Option<f64> { None }

    /// Kinetic-energy matrix element with `other` when known in closed form.
    fn closed_kinetic(&self, _other: &Self) -> Option<f64> { None }

    /// Evaluate elementwise over an array.
    fn value_arr<S>(&self, x: &Arr1<S>) -> nd::Array1<f64>
    where
        S: nd::Data<Elem = f64>,
        Self: Sized,
    {
        x.mapv(|xk| self.value(xk))
    }

    /// Evaluate the first derivative elementwise over an array.
    fn derivative_arr<S>(&self, x: &Arr1<S>) -> nd::Array1<f64>
    where
        S: nd::Data<Elem = f64>,
        Self: Sized,
    {
        x.mapv(|xk| self.derivative(xk))
    }

    /// Evaluate the second derivative elementwise over an array.
    fn second_derivative_arr<S>(&self, x: &Arr1<S>) -> nd::Array1<f64>
    where
        S: nd::Data<Elem = f64>,
        Self: Sized,
    {
        x.mapv(|xk| self.second_derivative(xk))
    }
}

/// Eigenstate of the quantum harmonic oscillator in natural units
/// (`m = ω = ħ = 1`), centered at some coordinate.
///
/// ```text
/// ψ[n](x) = (2ⁿ n! √π)^(-1/2) H[n](x - c) exp(-(x - c)² / 2)
/// ```
/// where `H[n]` is the `n`-th physicists' Hermite polynomial. Values are
/// computed through the normalized three-term recurrence, so no factorials or
/// raw Hermite coefficients are ever formed.
///
/// Equality and hashing are by `(n, center)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HarmonicOscillator {
    n: usize,
    center: f64,
}

impl Eq for HarmonicOscillator { }

impl Hash for HarmonicOscillator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.n.hash(state);
        self.center.to_bits().hash(state);
    }
}

// polynomial parts are renormalized once they exceed this
const RESCALE: f64 = 1e150;

// returns (ψ[n - 1](ξ), ψ[n](ξ)), with ψ[-1] = 0
//
// The recurrence runs on the polynomial parts alone, with the running
// magnitude folded into `log_scale`; the Gaussian factor is applied only at
// the end so that neither part underflows on its own far from the center.
fn ho_recurrence(n: usize, xi: f64) -> (f64, f64) {
    let mut prev = 0.0;
    let mut cur = PI.powf(-0.25);
    let mut log_scale = 0.0;
    for k in 0..n {
        let k = k as f64;
        let next
            = (2.0 / (k + 1.0)).sqrt() * xi * cur
            - (k / (k + 1.0)).sqrt() * prev;
        prev = cur;
        cur = next;
        let big = cur.abs();
        if big > RESCALE {
            prev /= big;
            cur /= big;
            log_scale += big.ln();
        }
    }
    let envelope = (log_scale - xi * xi / 2.0).exp();
    (prev * envelope, cur * envelope)
}

impl HarmonicOscillator {
    /// Create a new oscillator eigenstate.
    ///
    /// Fails if `n` exceeds `config.harmonic_oscillator_max_n` or if `center`
    /// is not finite.
    pub fn new(n: usize, center: f64, config: &Config) -> BResult<Self> {
        BasisError::check_n(n, config.harmonic_oscillator_max_n)?;
        BasisError::check_center(center)?;
        // normalize -0.0 so that equality and hashing agree
        Ok(Self { n, center: center + 0.0 })
    }

    /// The first `size` eigenstates about `center`, i.e. quantum numbers
    /// `0..size`.
    pub fn basis_set(size: usize, center: f64, config: &Config)
        -> BResult<Vec<Self>>
    {
        (0..size).map(|n| Self::new(n, center, config)).collect()
    }

    /// Quantum number.
    pub fn n(&self) -> usize { self.n }

    /// Center coordinate.
    pub fn center(&self) -> f64 { self.center }

    /// Classical turning-point half-width, `√(2n + 1)`.
    pub fn turning_point(&self) -> f64 { (2.0 * self.n as f64 + 1.0).sqrt() }
}

impl BasisFunction for HarmonicOscillator {
    type Potential = Harmonic;

    fn value(&self, x: f64) -> f64 { ho_recurrence(self.n, x - self.center).1 }

    // ψ[n]' = √(2n) ψ[n - 1] - ξ ψ[n]
    fn derivative(&self, x: f64) -> f64 {
        let xi = x - self.center;
        let (prev, cur) = ho_recurrence(self.n, xi);
        (2.0 * self.n as f64).sqrt() * prev - xi * cur
    }

    // ψ[n]'' = (ξ² - 2n - 1) ψ[n]
    fn second_derivative(&self, x: f64) -> f64 {
        let xi = x - self.center;
        (xi * xi - 2.0 * self.n as f64 - 1.0) * ho_recurrence(self.n, xi).1
    }

    fn energy(&self) -> f64 { self.n as f64 + 0.5 }

    fn potential(&self) -> Harmonic { Harmonic::natural(self.center) }

    // beyond the turning point the envelope decays at least as fast as
    // exp(-d²/2) in the distance d past it, and |ψ| ≤ 1 everywhere
    fn support(&self, small: f64) -> (f64, f64) {
        let w = self.turning_point() + (-2.0 * small.ln()).max(0.0).sqrt();
        (self.center - w, self.center + w)
    }

    fn closed_overlap(&self, other: &Self) -> Option<f64> {
        (self.center == other.center)
            .then(|| if self.n == other.n { 1.0 } else { 0.0 })
    }

    // ⟨m| p²/2 |n⟩ = ¼ [(2n + 1) δ(m, n) - √(n (n - 1)) δ(m, n - 2)
    //                   - √((n + 1) (n + 2)) δ(m, n + 2)]
    fn closed_kinetic(&self, other: &Self) -> Option<f64> {
        if self.center != other.center { return None; }
        let m = other.n;
        let n = self.n;
        let nf = n as f64;
        let val
            = if m == n {
                (2.0 * nf + 1.0) / 4.0
            } else if m + 2 == n {
                -(nf * (nf - 1.0)).sqrt() / 4.0
            } else if m == n + 2 {
                -((nf + 1.0) * (nf + 2.0)).sqrt() / 4.0
            } else {
                0.0
            };
        Some(val)
    }
}

/// A linear combination of primitive basis functions that is an eigenstate of
/// the Hamiltonian `-½ ∂² + V` within the span of those primitives.
///
/// Instances are produced by [`eigenbasis`][crate::eigen::eigenbasis]; all
/// states of one solution share the same primitive set, and two such states
/// are orthonormal in closed form.
#[derive(Clone, Debug)]
pub struct EigenState<B, P> {
    index: usize,
    terms: Arc<[B]>,
    coeffs: nd::Array1<f64>,
    energy: f64,
    potential: P,
}

impl<B, P> EigenState<B, P>
where B: BasisFunction
{
    // `index` orders the state within its eigenbasis. States sharing `terms`
    // are taken to be mutually orthonormal, so only `eigenbasis` builds them.
    pub(crate) fn new(
        index: usize,
        terms: Arc<[B]>,
        coeffs: nd::Array1<f64>,
        energy: f64,
        potential: P,
    ) -> BResult<Self>
    {
        if terms.is_empty() { return Err(BasisError::Empty); }
        LengthError::check_len(terms.len(), coeffs.len())?;
        Ok(Self { index, terms, coeffs, energy, potential })
    }

    /// Position within the parent eigenbasis, in order of increasing energy.
    pub fn index(&self) -> usize { self.index }

    /// The primitive basis functions.
    pub fn terms(&self) -> &[B] { &self.terms }

    /// Expansion coefficients over [`Self::terms`].
    pub fn coeffs(&self) -> &nd::Array1<f64> { &self.coeffs }

    fn combine<F>(&self, f: F) -> f64
    where F: Fn(&B) -> f64
    {
        self.terms.iter().zip(&self.coeffs)
            .filter(|(_, c)| **c != 0.0)
            .map(|(b, c)| c * f(b))
            .sum()
    }
}

impl<B, P> BasisFunction for EigenState<B, P>
where
    B: BasisFunction,
    P: Potential + Clone,
{
    type Potential = P;

    fn value(&self, x: f64) -> f64 { self.combine(|b| b.value(x)) }

    fn derivative(&self, x: f64) -> f64 { self.combine(|b| b.derivative(x)) }

    fn second_derivative(&self, x: f64) -> f64 {
        self.combine(|b| b.second_derivative(x))
    }

    fn energy(&self) -> f64 { self.energy }

    fn potential(&self) -> P { self.potential.clone() }

    fn support(&self, small: f64) -> (f64, f64) {
        self.terms.iter()
            .map(|b| b.support(small))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |acc, s| {
                (acc.0.min(s.0), acc.1.max(s.1))
            })
    }

    fn closed_overlap(&self, other: &Self) -> Option<f64> {
        Arc::ptr_eq(&self.terms, &other.terms)
            .then(|| if self.index == other.index { 1.0 } else { 0.0 })
    }
}

/// Evaluate the superposition `Σₖ c[k] φₖ(x)` of basis functions over a
/// coordinate array.
pub fn superpose<B, S, T>(basis: &[B], coeffs: &Arr1<S>, x: &Arr1<T>)
    -> BResult<nd::Array1<C64>>
where
    B: BasisFunction,
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = f64>,
{
    LengthError::check_len(basis.len(), coeffs.len())?;
    let mut psi: nd::Array1<C64> = nd::Array1::zeros(x.len());
    for (b, &c) in basis.iter().zip(coeffs) {
        if c == C64::from(0.0) { continue; }
        nd::Zip::from(&mut psi).and(x)
            .for_each(|psik, &xk| { *psik += c * b.value(xk); });
    }
    Ok(psi)
}
