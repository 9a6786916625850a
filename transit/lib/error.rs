//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray as nd;
use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, A, T, B>(
        a: &nd::ArrayBase<S, nd::Ix1>,
        b: &nd::ArrayBase<T, nd::Ix1>,
    ) -> Result<(), Self>
    where
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = B>,
    {
        Self::check_len(a.len(), b.len())
    }

    pub(crate) fn check_len(na: usize, nb: usize) -> Result<(), Self> {
        (na == nb).then_some(()).ok_or(Self(na, nb))
    }
}

/// Returned when loading a [`Config`][crate::config::Config].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when a configuration variable cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    BadValue { key: String, value: String },

    /// Returned when a tolerance or bound is not strictly positive.
    #[error("{0} must be greater than 0; got {1}")]
    NonPositive(&'static str, f64),

    /// Returned when the negligibility threshold is not below 1.
    #[error("small_number must be less than 1; got {0}")]
    BadSmall(f64),

    /// Returned when `quad_max_subdivisions` is zero.
    #[error("quad_max_subdivisions must be greater than 0")]
    BadSubdivisions,

    /// [`toml::de::Error`]
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// [`std::io::Error`]
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn check_positive(name: &'static str, val: f64)
        -> Result<(), Self>
    {
        (val > 0.0).then_some(()).ok_or(Self::NonPositive(name, val))
    }
}

/// Returned when constructing a potential from a malformed parameter set.
#[derive(Debug, Error)]
pub enum PotentialError {
    /// Returned when a parameter is NaN or infinite.
    #[error("potential parameter `{0}` must be finite; got {1}")]
    NonFinite(&'static str, f64),

    /// Returned when a width, depth, or length is not strictly positive.
    #[error("potential parameter `{0}` must be greater than 0; got {1}")]
    NonPositive(&'static str, f64),

    /// Returned when a parabola's defining point lies directly above or below
    /// its vertex.
    #[error("parabola vertex and point share the x-coordinate {0}")]
    DegenerateParabola(f64),
}

impl PotentialError {
    pub(crate) fn check_finite(name: &'static str, val: f64)
        -> Result<(), Self>
    {
        val.is_finite().then_some(()).ok_or(Self::NonFinite(name, val))
    }

    pub(crate) fn check_positive(name: &'static str, val: f64)
        -> Result<(), Self>
    {
        Self::check_finite(name, val)?;
        (val > 0.0).then_some(()).ok_or(Self::NonPositive(name, val))
    }
}

/// Returned when constructing basis functions.
#[derive(Debug, Error)]
pub enum BasisError {
    /// Returned when a quantum number exceeds the configured ceiling.
    #[error("quantum number {n} exceeds the configured maximum {max}")]
    MaxN { n: usize, max: usize },

    /// Returned when a basis function center is NaN or infinite.
    #[error("basis function center must be finite; got {0}")]
    BadCenter(f64),

    /// Returned when an operation requires at least one basis function.
    #[error("basis set must be non-empty")]
    Empty,

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),
}

impl BasisError {
    pub(crate) fn check_n(n: usize, max: usize) -> Result<(), Self> {
        (n <= max).then_some(()).ok_or(Self::MaxN { n, max })
    }

    pub(crate) fn check_center(center: f64) -> Result<(), Self> {
        center.is_finite().then_some(()).ok_or(Self::BadCenter(center))
    }
}

/// Returned from numerical quadrature.
#[derive(Debug, Error)]
pub enum QuadError {
    /// Returned when integration bounds are not finite or are reversed.
    #[error("integration bounds must be finite and ordered; got [{0}, {1}]")]
    BadBounds(f64, f64),

    /// Returned when the integrand evaluates to NaN or infinity.
    #[error("integrand is not finite at x = {0}")]
    NonFinite(f64),

    /// Returned when the error bound is not met within the subdivision limit.
    #[error(
        "quadrature on [{lo}, {hi}] did not converge after {subdivisions} \
        subdivisions (estimated error {error:e})"
    )]
    NoConvergence { lo: f64, hi: f64, subdivisions: usize, error: f64 },
}

/// Returned when an operator fails on a particular pair of basis functions
/// during matrix assembly.
#[derive(Debug, Error)]
#[error("operator `{operator}` failed for basis pair ({i}, {j}): {source}")]
pub struct OperatorError {
    /// Name of the failing operator.
    pub operator: &'static str,
    /// Row index.
    pub i: usize,
    /// Column index.
    pub j: usize,
    /// Underlying numerical failure.
    pub source: QuadError,
}

/// Returned from dense eigen-decompositions.
#[derive(Debug, Error)]
pub enum LinalgError {
    /// Returned when a matrix has no rows.
    #[error("matrix must be non-empty")]
    Empty,

    /// Returned when a matrix is not square.
    #[error("matrix must be square; got {0}×{1}")]
    NotSquare(usize, usize),

    /// Returned when two matrices that must match have different shapes.
    #[error("matrix shapes differ; got {0:?} and {1:?}")]
    ShapeMismatch((usize, usize), (usize, usize)),

    /// Returned when a matrix holds NaN or infinite entries.
    #[error("matrix contains non-finite entries")]
    NonFinite,

    /// Returned when a matrix required to be symmetric is not.
    #[error("matrix is not symmetric: |M[{i}, {j}] - M[{j}, {i}]| = {diff:e}")]
    NotSymmetric { i: usize, j: usize, diff: f64 },

    /// Returned when an overlap matrix admits no Cholesky factorization.
    #[error("matrix is not positive-definite")]
    NotPositiveDefinite,

    /// Returned when the symmetric eigensolver fails.
    #[error("eigen-decomposition failed to converge")]
    NoConvergence,
}

/// Returned from time evolution.
#[derive(Debug, Error)]
pub enum TError {
    /// Returned when the initial state has no components.
    #[error("initial state must be non-empty")]
    Empty,

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),

    /// [`LinalgError`]; carries the offending matrix name.
    #[error("{matrix} matrix: {source}")]
    Linalg { matrix: &'static str, source: LinalgError },

    /// [`BasisError`]
    #[error("basis error: {0}")]
    Basis(#[from] BasisError),
}

impl TError {
    pub(crate) fn linalg(matrix: &'static str)
        -> impl FnOnce(LinalgError) -> Self
    {
        move |source| Self::Linalg { matrix, source }
    }
}

/// Returned when solving for an eigenbasis.
#[derive(Debug, Error)]
pub enum EigenError {
    /// [`BasisError`]
    #[error("basis error: {0}")]
    Basis(#[from] BasisError),

    /// [`OperatorError`]
    #[error("operator error: {0}")]
    Operator(#[from] OperatorError),

    /// [`LinalgError`]
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),
}

/// Returned from molecular geometry handling.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Returned when an xyz line does not hold exactly four fields.
    #[error("xyz line {line}: expected `element x y z`; got {text:?}")]
    BadLine { line: usize, text: String },

    /// Returned when an xyz coordinate cannot be parsed.
    #[error("xyz line {line}: invalid coordinate {text:?}")]
    BadCoord { line: usize, text: String },

    /// Returned when the caller's mass lookup knows nothing of an element.
    #[error("no mass known for element {0:?}")]
    UnknownElement(String),

    /// Returned when an atomic mass is not strictly positive and finite.
    #[error("atomic mass must be positive and finite; got {0}")]
    BadMass(f64),

    /// Returned when a position holds NaN or infinite components.
    #[error("atomic position must be finite")]
    BadPosition,

    /// Returned when a center of mass is requested for a massless molecule.
    #[error("molecule has zero total mass")]
    ZeroMass,

    /// Returned when a direction is requested for a zero-length vector.
    #[error("cannot take the direction of a zero-length vector")]
    ZeroVector,

    /// Returned when an atom index is out of bounds.
    #[error("atom index {0} out of bounds for molecule of {1} atoms")]
    BadIndex(usize, usize),
}
