//! Operators acting on pairs of basis functions and assembly of their
//! matrices.
//!
//! Each [`Operator`] maps a pair of basis functions `(a, b)` to the real matrix
//! element `⟨a|O|b⟩`. Closed forms exposed by the basis family are used when
//! available; everything else goes through [adaptive quadrature][Quad]
//! restricted to the interval where both functions are non-negligible.
//!
//! ```
//! use transit::{
//!     basis::HarmonicOscillator,
//!     config::Config,
//!     operators::{ Hamiltonian, operator_matrix },
//!     potentials::Harmonic,
//!     utils::is_diagonal,
//! };
//!
//! let config = Config::default();
//! let basis = HarmonicOscillator::basis_set(4, 0.0, &config).unwrap();
//! let h = operator_matrix(&basis, &Hamiltonian::new(Harmonic::natural(0.0), &config), &config)
//!     .unwrap();
//! assert!(is_diagonal(&h, 1e-6));
//! assert!((h[[3, 3]] - 3.5).abs() < 1e-6);
//! ```

use ndarray as nd;
use tracing::{ debug, info };
use crate::{
    basis::BasisFunction,
    config::Config,
    error::OperatorError,
    pairwise::{ build_indexed, par_build_indexed },
    potentials::Potential,
    utils::{ QResult, Quad },
};

/// A real, bilinear operator on basis functions.
pub trait Operator<B: BasisFunction> {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether `apply(a, b) == apply(b, a)` for all `a`, `b`, in which case
    /// only half of a matrix needs to be computed.
    fn hermitian(&self) -> bool { true }

    /// Compute the matrix element `⟨a|O|b⟩`.
    fn apply(&self, a: &B, b: &B) -> QResult<f64>;
}

// interval on which the product of `a` and `b` is not negligible
fn common_support<A, B>(a: &A, b: &B, small: f64) -> Option<(f64, f64)>
where
    A: BasisFunction,
    B: BasisFunction,
{
    let (alo, ahi) = a.support(small);
    let (blo, bhi) = b.support(small);
    let lo = alo.max(blo);
    let hi = ahi.min(bhi);
    (lo < hi).then_some((lo, hi))
}

/// Overlap integral `∫ a(x) b(x) dx`.
#[derive(Copy, Clone, Debug)]
pub struct Overlap {
    quad: Quad,
    small: f64,
}

impl Overlap {
    pub fn new(config: &Config) -> Self {
        Self { quad: config.quad(), small: config.small_number }
    }

    /// Integrate the overlap of two functions from possibly different
    /// families, ignoring any closed form.
    pub fn between<A, B>(&self, a: &A, b: &B) -> QResult<f64>
    where
        A: BasisFunction,
        B: BasisFunction,
    {
        let Some((lo, hi)) = common_support(a, b, self.small) else {
            return Ok(0.0);
        };
        self.quad.integrate(|x| a.value(x) * b.value(x), lo, hi, &[])
    }
}

impl<B: BasisFunction> Operator<B> for Overlap {
    fn name(&self) -> &'static str { "overlap" }

    fn apply(&self, a: &B, b: &B) -> QResult<f64> {
        match a.closed_overlap(b) {
            Some(val) => Ok(val),
            None => self.between(a, b),
        }
    }
}

/// Kinetic-energy matrix element `-½ ∫ a(x) b''(x) dx`.
///
/// Without a closed form, this is evaluated as `½ ∫ a'(x) b'(x) dx`, which is
/// equal after integration by parts and symmetric by construction.
#[derive(Copy, Clone, Debug)]
pub struct Kinetic {
    quad: Quad,
    small: f64,
}

impl Kinetic {
    pub fn new(config: &Config) -> Self {
        Self { quad: config.quad(), small: config.small_number }
    }

    /// Integrate the kinetic matrix element of two functions from possibly
    /// different families, ignoring any closed form.
    pub fn between<A, B>(&self, a: &A, b: &B) -> QResult<f64>
    where
        A: BasisFunction,
        B: BasisFunction,
    {
        let Some((lo, hi)) = common_support(a, b, self.small) else {
            return Ok(0.0);
        };
        self.quad.integrate(|x| 0.5 * (a.derivative(x) * b.derivative(x)), lo, hi, &[])
    }
}

impl<B: BasisFunction> Operator<B> for Kinetic {
    fn name(&self) -> &'static str { "kinetic" }

    fn apply(&self, a: &B, b: &B) -> QResult<f64> {
        match a.closed_kinetic(b) {
            Some(val) => Ok(val),
            None => self.between(a, b),
        }
    }
}

/// Potential-energy matrix element `∫ a(x) V(x) b(x) dx`.
///
/// The integration interval is cut at the potential's
/// [breakpoints][Potential::breakpoints]. Elements are computed identically
/// for `(a, b)` and `(b, a)`, so full and half-matrix assembly agree exactly.
#[derive(Clone, Debug)]
pub struct PotentialOp<P> {
    potential: P,
    quad: Quad,
    small: f64,
}

impl<P: Potential> PotentialOp<P> {
    pub fn new(potential: P, config: &Config) -> Self {
        Self { potential, quad: config.quad(), small: config.small_number }
    }

    /// The potential `V`.
    pub fn potential(&self) -> &P { &self.potential }

    /// Integrate `⟨a|V|b⟩` for two functions from possibly different
    /// families.
    pub fn between<A, B>(&self, a: &A, b: &B) -> QResult<f64>
    where
        A: BasisFunction,
        B: BasisFunction,
    {
        let Some((lo, hi)) = common_support(a, b, self.small) else {
            return Ok(0.0);
        };
        let breakpoints = self.potential.breakpoints();
        self.quad.integrate(
            |x| self.potential.eval(x) * (a.value(x) * b.value(x)),
            lo,
            hi,
            &breakpoints,
        )
    }
}

impl<B, P> Operator<B> for PotentialOp<P>
where
    B: BasisFunction,
    P: Potential,
{
    fn name(&self) -> &'static str { "potential" }

    fn apply(&self, a: &B, b: &B) -> QResult<f64> { self.between(a, b) }
}

/// Hamiltonian matrix element `⟨a| -½ ∂² + V |b⟩`, i.e. the sum of
/// [`Kinetic`] and [`PotentialOp`].
#[derive(Clone, Debug)]
pub struct Hamiltonian<P> {
    kinetic: Kinetic,
    potential: PotentialOp<P>,
}

impl<P: Potential> Hamiltonian<P> {
    pub fn new(potential: P, config: &Config) -> Self {
        Self {
            kinetic: Kinetic::new(config),
            potential: PotentialOp::new(potential, config),
        }
    }

    /// The potential `V`.
    pub fn potential(&self) -> &P { self.potential.potential() }

    /// Integrate `⟨a|H|b⟩` for two functions from possibly different
    /// families, ignoring any closed form.
    pub fn between<A, B>(&self, a: &A, b: &B) -> QResult<f64>
    where
        A: BasisFunction,
        B: BasisFunction,
    {
        Ok(self.kinetic.between(a, b)? + self.potential.between(a, b)?)
    }
}

impl<B, P> Operator<B> for Hamiltonian<P>
where
    B: BasisFunction,
    P: Potential,
{
    fn name(&self) -> &'static str { "hamiltonian" }

    fn apply(&self, a: &B, b: &B) -> QResult<f64> {
        Ok(self.kinetic.apply(a, b)? + self.potential.apply(a, b)?)
    }
}

/// Shorthand for `Overlap::new(config).apply(a, b)`.
pub fn overlap<B>(a: &B, b: &B, config: &Config) -> QResult<f64>
where B: BasisFunction
{
    Overlap::new(config).apply(a, b)
}

/// Shorthand for `Kinetic::new(config).apply(a, b)`.
pub fn kinetic<B>(a: &B, b: &B, config: &Config) -> QResult<f64>
where B: BasisFunction
{
    Kinetic::new(config).apply(a, b)
}

/// Overlap of functions from two different families, e.g. an oscillator
/// state against an [`EigenState`][crate::basis::EigenState]. Always
/// integrated numerically.
pub fn cross_overlap<A, B>(a: &A, b: &B, config: &Config) -> QResult<f64>
where
    A: BasisFunction,
    B: BasisFunction,
{
    Overlap::new(config).between(a, b)
}

/// Kinetic matrix element between functions from two different families.
pub fn cross_kinetic<A, B>(a: &A, b: &B, config: &Config) -> QResult<f64>
where
    A: BasisFunction,
    B: BasisFunction,
{
    Kinetic::new(config).between(a, b)
}

/// Potential matrix element between functions from two different families.
pub fn cross_potential<A, B, P>(a: &A, potential: &P, b: &B, config: &Config)
    -> QResult<f64>
where
    A: BasisFunction,
    B: BasisFunction,
    P: Potential + Clone,
{
    PotentialOp::new(potential.clone(), config).between(a, b)
}

/// Assemble the matrix `M[i, j] = ⟨basis[i]|op|basis[j]⟩`.
///
/// Hermitian operators are assembled from the upper triangle. When
/// `config.enable_progress` is set, an `info` event is emitted per completed
/// row.
pub fn operator_matrix<B, O>(basis: &[B], op: &O, config: &Config)
    -> Result<nd::Array2<f64>, OperatorError>
where
    B: BasisFunction,
    O: Operator<B>,
{
    let n = basis.len();
    let name = op.name();
    debug!(operator = name, size = n, "assembling operator matrix");
    build_indexed(
        n,
        |i, j| {
            op.apply(&basis[i], &basis[j])
                .map_err(|source| OperatorError { operator: name, i, j, source })
        },
        op.hermitian(),
        |done, total| {
            if config.enable_progress {
                info!(operator = name, row = done, rows = total, "matrix row complete");
            }
        },
    )
}

/// Like [`operator_matrix`], but computing elements in parallel on the global
/// [`rayon`] thread pool. Progress is not reported.
pub fn par_operator_matrix<B, O>(basis: &[B], op: &O)
    -> Result<nd::Array2<f64>, OperatorError>
where
    B: BasisFunction + Sync,
    O: Operator<B> + Sync,
{
    let name = op.name();
    debug!(operator = name, size = basis.len(), "assembling operator matrix in parallel");
    par_build_indexed(
        basis.len(),
        |i, j| {
            op.apply(&basis[i], &basis[j])
                .map_err(|source| OperatorError { operator: name, i, j, source })
        },
        op.hermitian(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        basis::HarmonicOscillator,
        eigen::eigenbasis,
        potentials::{ Harmonic, TripleWell, TripleWellParams },
        utils::{ is_diagonal, is_identity, is_symmetric },
    };

    fn basis(size: usize, center: f64) -> Vec<HarmonicOscillator> {
        HarmonicOscillator::basis_set(size, center, &Config::default()).unwrap()
    }

    // closed forms switched off to exercise the quadrature paths
    #[derive(Copy, Clone, Debug)]
    struct Plain(HarmonicOscillator);

    impl BasisFunction for Plain {
        type Potential = Harmonic;
        fn value(&self, x: f64) -> f64 { self.0.value(x) }
        fn derivative(&self, x: f64) -> f64 { self.0.derivative(x) }
        fn second_derivative(&self, x: f64) -> f64 { self.0.second_derivative(x) }
        fn energy(&self) -> f64 { self.0.energy() }
        fn potential(&self) -> Harmonic { self.0.potential() }
        fn support(&self, small: f64) -> (f64, f64) { self.0.support(small) }
    }

    #[test]
    fn quadrature_matches_closed_forms() {
        let config = Config::default();
        let closed = basis(8, 0.3);
        let plain: Vec<Plain> = closed.iter().copied().map(Plain).collect();
        let s_closed = operator_matrix(&closed, &Overlap::new(&config), &config).unwrap();
        let s_plain = operator_matrix(&plain, &Overlap::new(&config), &config).unwrap();
        let t_closed = operator_matrix(&closed, &Kinetic::new(&config), &config).unwrap();
        let t_plain = operator_matrix(&plain, &Kinetic::new(&config), &config).unwrap();
        for ((a, b), (c, d)) in s_closed.iter().zip(&s_plain).zip(t_closed.iter().zip(&t_plain)) {
            assert!((a - b).abs() < 1e-8);
            assert!((c - d).abs() < 1e-8);
        }
        assert!(is_identity(&s_plain, 1e-8));
    }

    #[test]
    fn displaced_overlap() {
        // ⟨0, 0|0, d⟩ = exp(-d² / 4)
        let config = Config::default();
        let a = HarmonicOscillator::new(0, 0.0, &config).unwrap();
        let b = HarmonicOscillator::new(0, 1.5, &config).unwrap();
        let val = overlap(&a, &b, &config).unwrap();
        assert!((val - (-1.5_f64.powi(2) / 4.0).exp()).abs() < 1e-9);
        // far apart: negligible
        let c = HarmonicOscillator::new(0, 100.0, &config).unwrap();
        assert_eq!(overlap(&a, &c, &config).unwrap(), 0.0);
    }

    #[test]
    fn harmonic_matrices() {
        let config = Config::default();
        let basis = basis(10, -1.0);
        let v = operator_matrix(
            &basis, &PotentialOp::new(Harmonic::natural(-1.0), &config), &config).unwrap();
        let h = operator_matrix(
            &basis, &Hamiltonian::new(Harmonic::natural(-1.0), &config), &config).unwrap();
        assert!(is_symmetric(&v, 1e-12));
        assert!(is_diagonal(&h, 1e-7));
        for (k, b) in basis.iter().enumerate() {
            assert!((v[[k, k]] - b.energy() / 2.0).abs() < 1e-7);
            assert!((h[[k, k]] - b.energy()).abs() < 1e-7);
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let config = Config::default();
        let basis = basis(6, 0.0);
        let tw = TripleWell::from_params(TripleWellParams {
            well1_depth: 1.0,
            well1_halfwidth: 2.0,
            bridge_length: 3.0,
            bridge_depth: 0.5,
            well3_halfwidth: 2.0,
            well3_depth: 1.0,
        }).unwrap();
        let op = Hamiltonian::new(tw, &config);
        let seq = operator_matrix(&basis, &op, &config).unwrap();
        let par = par_operator_matrix(&basis, &op).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn mixed_families_match_coefficient_contraction() {
        let config = Config::default();
        let prims: Vec<HarmonicOscillator>
            = basis(4, -1.0).into_iter().chain(basis(4, 1.0)).collect();
        let v = |x: f64| 0.5 * x * x + 0.05 * x.powi(4);
        let states = eigenbasis(&prims, v, &config).unwrap();
        let s = operator_matrix(&prims, &Overlap::new(&config), &config).unwrap();
        let t = operator_matrix(&prims, &Kinetic::new(&config), &config).unwrap();
        let vm = operator_matrix(&prims, &PotentialOp::new(v, &config), &config).unwrap();
        // ⟨φᵢ|O|ψₖ⟩ = Σⱼ O[i, j] v[j][k]
        for (i, prim) in prims.iter().enumerate() {
            for state in states.iter().take(3) {
                let s_ik = cross_overlap(prim, state, &config).unwrap();
                let t_ik = cross_kinetic(prim, state, &config).unwrap();
                let v_ik = cross_potential(prim, &v, state, &config).unwrap();
                assert!((s_ik - s.row(i).dot(state.coeffs())).abs() < 1e-8);
                assert!((t_ik - t.row(i).dot(state.coeffs())).abs() < 1e-8);
                assert!((v_ik - vm.row(i).dot(state.coeffs())).abs() < 1e-8);
                assert_eq!(s_ik, cross_overlap(state, prim, &config).unwrap());
            }
        }
        // H ψₖ = Eₖ S ψₖ, so projecting onto any primitive gives Eₖ ⟨φᵢ|ψₖ⟩
        let h = Hamiltonian::new(v, &config);
        let ground = &states[0];
        for prim in prims.iter() {
            let lhs = h.between(prim, ground).unwrap();
            let rhs = ground.energy() * cross_overlap(prim, ground, &config).unwrap();
            assert!((lhs - rhs).abs() < 1e-7);
        }
    }

    #[test]
    fn failures_carry_pair_indices() {
        let config = Config { quad_max_subdivisions: 8, ..Config::default() };
        let basis = basis(3, 0.0);
        let err
            = operator_matrix(&basis, &PotentialOp::new(|x: f64| 1.0 / x, &config), &config)
            .unwrap_err();
        assert_eq!(err.operator, "potential");
        assert_eq!((err.i, err.j), (0, 0));
    }
}
