//! Dense symmetric eigen-decompositions on [`ndarray`] arrays, backed by
//! [`nalgebra`].
//!
//! Both solvers return eigenvalues in ascending order alongside a matrix whose
//! columns are the corresponding eigenvectors. Each eigenvector's sign is
//! fixed so that its largest-magnitude component is positive.

use nalgebra as na;
use ndarray as nd;
use crate::{ Arr2, error::LinalgError, utils::max_asymmetry };

pub type LResult<T> = Result<T, LinalgError>;

fn to_na<S>(a: &Arr2<S>) -> na::DMatrix<f64>
where S: nd::Data<Elem = f64>
{
    let (n, k) = a.dim();
    na::DMatrix::from_fn(n, k, |i, j| a[[i, j]])
}

fn from_na(m: &na::DMatrix<f64>) -> nd::Array2<f64> {
    nd::Array2::from_shape_fn(m.shape(), |(i, j)| m[(i, j)])
}

// non-empty, square, finite, and symmetric to within `tol`
pub(crate) fn check_symmetric<S>(a: &Arr2<S>, tol: f64) -> LResult<()>
where S: nd::Data<Elem = f64>
{
    let (n, k) = a.dim();
    if n != k { return Err(LinalgError::NotSquare(n, k)); }
    if n == 0 { return Err(LinalgError::Empty); }
    if !a.iter().all(|x| x.is_finite()) { return Err(LinalgError::NonFinite); }
    match max_asymmetry(a) {
        Some((i, j, diff)) if diff > tol => {
            Err(LinalgError::NotSymmetric { i, j, diff })
        },
        _ => Ok(()),
    }
}

// average with the transpose to remove rounding-level asymmetry
fn symmetrize(m: &mut na::DMatrix<f64>) {
    let n = m.nrows();
    for i in 0..n {
        for j in i + 1..n {
            let avg = (m[(i, j)] + m[(j, i)]) / 2.0;
            m[(i, j)] = avg;
            m[(j, i)] = avg;
        }
    }
}

fn sorted_eigen(m: na::DMatrix<f64>)
    -> LResult<(nd::Array1<f64>, na::DMatrix<f64>)>
{
    let eig
        = na::SymmetricEigen::try_new(m, f64::EPSILON, 0)
        .ok_or(LinalgError::NoConvergence)?;
    let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
    let values: nd::Array1<f64>
        = order.iter().map(|&k| eig.eigenvalues[k]).collect();
    let vectors = eig.eigenvectors.select_columns(order.iter());
    Ok((values, vectors))
}

fn fix_signs(v: &mut nd::Array2<f64>) {
    for mut col in v.columns_mut() {
        let pivot
            = col.iter()
            .copied()
            .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
        if pivot < 0.0 { col.map_inplace(|x| { *x = -*x; }); }
    }
}

/// Diagonalize the real symmetric matrix `a`, so that `a V = V diag(E)` with
/// orthonormal `V`.
///
/// `tol` bounds the accepted asymmetry `|a[i, j] - a[j, i]|`; the matrix is
/// symmetrized before solving.
pub fn eigh<S>(a: &Arr2<S>, tol: f64) -> LResult<(nd::Array1<f64>, nd::Array2<f64>)>
where S: nd::Data<Elem = f64>
{
    check_symmetric(a, tol)?;
    let mut m = to_na(a);
    symmetrize(&mut m);
    let (values, vectors) = sorted_eigen(m)?;
    let mut vectors = from_na(&vectors);
    fix_signs(&mut vectors);
    Ok((values, vectors))
}

/// Solve the generalized symmetric-definite problem `h V = s V diag(E)`.
///
/// `s` must be positive-definite. The returned `V` is `s`-orthonormal, i.e.
/// `Vᵀ s V = 1`, so that its inverse is `Vᵀ s`.
///
/// The problem is reduced to standard form through the Cholesky factor
/// `s = L Lᵀ`: the eigenvectors `U` of `L⁻¹ h L⁻ᵀ` give `V = L⁻ᵀ U`.
pub fn eigh_generalized<S, T>(h: &Arr2<S>, s: &Arr2<T>, tol: f64)
    -> LResult<(nd::Array1<f64>, nd::Array2<f64>)>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    check_symmetric(h, tol)?;
    check_symmetric(s, tol)?;
    if h.dim() != s.dim() {
        return Err(LinalgError::ShapeMismatch(h.dim(), s.dim()));
    }
    let n = h.nrows();
    let mut s_na = to_na(s);
    symmetrize(&mut s_na);
    let chol = na::Cholesky::new(s_na).ok_or(LinalgError::NotPositiveDefinite)?;
    let l_inv
        = chol.l()
        .solve_lower_triangular(&na::DMatrix::identity(n, n))
        .ok_or(LinalgError::NotPositiveDefinite)?;
    let mut a = &l_inv * to_na(h) * l_inv.transpose();
    symmetrize(&mut a);
    let (values, u) = sorted_eigen(a)?;
    let mut vectors = from_na(&(l_inv.transpose() * u));
    fix_signs(&mut vectors);
    Ok((values, vectors))
}
