//! Miscellaneous tools.

use std::{ cmp::Ordering, collections::BinaryHeap };
use ndarray::{ self as nd, Ix1, Ix2 };
use num_complex::Complex64 as C64;
use num_traits::Float;
use rustfft as fft;
use tracing::warn;
use crate::error::QuadError;

pub type QResult<T> = Result<T, QuadError>;

/// Integrate using the trapezoidal rule.
///
/// *Panics if `y` has length less than 2*.
pub fn trapz<S, A>(y: &nd::ArrayBase<S, Ix1>, dx: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Float,
{
    let n: usize = y.len();
    let two = A::one() + A::one();
    let inner = y.slice(nd::s![1..n - 1]).iter()
        .fold(A::zero(), |acc, yk| acc + *yk);
    (dx / two) * (y[0] + two * inner + y[n - 1])
}

/// Calculate the norm of a wavefunction sampled on an even grid.
///
/// *Panics if `q` has length less than 2*.
pub fn wf_norm<S>(q: &nd::ArrayBase<S, Ix1>, dx: f64) -> f64
where S: nd::Data<Elem = C64>
{
    trapz(&q.mapv(|qk| qk.norm_sqr()), dx)
}

/// Perform the one-dimensional, complex-valued FFT in place.
pub fn fft_inplace<S>(f: &mut nd::ArrayBase<S, Ix1>)
where S: nd::DataMut<Elem = C64>
{
    let n: usize = f.len();
    let mut plan = fft::FftPlanner::new();
    let fft_plan = plan.plan_fft_forward(n);
    match f.as_slice_mut() {
        Some(buf) => fft_plan.process(buf),
        None => {
            let mut buf: Vec<C64> = f.to_vec();
            fft_plan.process(&mut buf);
            f.iter_mut().zip(buf).for_each(|(fk, bk)| { *fk = bk; });
        },
    }
}

/// Perform the one-dimensional, complex-valued inverse FFT in place.
pub fn ifft_inplace<S>(x: &mut nd::ArrayBase<S, Ix1>)
where S: nd::DataMut<Elem = C64>
{
    let n: usize = x.len();
    let mut plan = fft::FftPlanner::new();
    let ifft_plan = plan.plan_fft_inverse(n);
    match x.as_slice_mut() {
        Some(buf) => ifft_plan.process(buf),
        None => {
            let mut buf: Vec<C64> = x.to_vec();
            ifft_plan.process(&mut buf);
            x.iter_mut().zip(buf).for_each(|(xk, bk)| { *xk = bk; });
        },
    }
    let n = n as f64;
    x.map_inplace(|xk| { *xk /= n; });
}

/// Return the location and size of the largest asymmetry `|M[i, j] - M[j, i]|`
/// in a square matrix, or `None` if the matrix is not square.
pub fn max_asymmetry<S>(m: &nd::ArrayBase<S, Ix2>) -> Option<(usize, usize, f64)>
where S: nd::Data<Elem = f64>
{
    let (n, k) = m.dim();
    if n != k { return None; }
    let mut worst = (0, 0, 0.0);
    for i in 0..n {
        for j in i + 1..n {
            let diff = (m[[i, j]] - m[[j, i]]).abs();
            if diff > worst.2 || diff.is_nan() { worst = (i, j, diff); }
        }
    }
    Some(worst)
}

/// Return `true` if `m` is square and symmetric to within `tol`.
pub fn is_symmetric<S>(m: &nd::ArrayBase<S, Ix2>, tol: f64) -> bool
where S: nd::Data<Elem = f64>
{
    max_asymmetry(m).is_some_and(|(_, _, diff)| diff <= tol)
}

/// Return `true` if `m` is square and all off-diagonal elements are within
/// `tol` of zero.
pub fn is_diagonal<S>(m: &nd::ArrayBase<S, Ix2>, tol: f64) -> bool
where S: nd::Data<Elem = f64>
{
    let (n, k) = m.dim();
    n == k
        && m.indexed_iter()
            .all(|((i, j), mij)| i == j || mij.abs() <= tol)
}

/// Return `true` if `m` is within `tol` of the identity, elementwise.
pub fn is_identity<S>(m: &nd::ArrayBase<S, Ix2>, tol: f64) -> bool
where S: nd::Data<Elem = f64>
{
    is_diagonal(m, tol) && m.diag().iter().all(|mii| (mii - 1.0).abs() <= tol)
}

// 15-point Kronrod abscissae (non-negative half) with the embedded 7-point
// Gauss rule on the odd indices
const XGK: [f64; 8] = [
    0.991455371120812639206854697526329,
    0.949107912342758524526189684047851,
    0.864864423359769072789712788640926,
    0.741531185599394439863864773280788,
    0.586087235467691130294144845693013,
    0.405845151377397166906606412076961,
    0.207784955007898467600689403773245,
    0.000000000000000000000000000000000,
];

const WGK: [f64; 8] = [
    0.022935322010529224963732008058970,
    0.063092092629978553290700663189204,
    0.104790010322250183839876322541518,
    0.140653259715525918745189590510238,
    0.169004726639267902826583426598550,
    0.190350578064785409913256402421014,
    0.204432940075298892414161999234649,
    0.209482141084727828012999174891714,
];

const WG: [f64; 4] = [
    0.129484966168869693270611432679082,
    0.279705391489276667901467771423780,
    0.381830050505118944950369775488975,
    0.417959183673469387755102040816327,
];

// number of equal panels each breakpoint-delimited segment starts with
const INITIAL_PANELS: usize = 8;

#[derive(Copy, Clone, Debug)]
struct Panel {
    lo: f64,
    hi: f64,
    val: f64,
    err: f64,
}

impl PartialEq for Panel {
    fn eq(&self, other: &Self) -> bool { self.err.total_cmp(&other.err).is_eq() }
}

impl Eq for Panel { }

impl PartialOrd for Panel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Panel {
    fn cmp(&self, other: &Self) -> Ordering { self.err.total_cmp(&other.err) }
}

// apply the 7/15-point Gauss-Kronrod pair to a single panel
fn gauss_kronrod<F>(f: &F, lo: f64, hi: f64) -> QResult<Panel>
where F: Fn(f64) -> f64
{
    let eval = |x: f64| -> QResult<f64> {
        let fx = f(x);
        fx.is_finite().then_some(fx).ok_or(QuadError::NonFinite(x))
    };
    let c = (lo + hi) / 2.0;
    let h = (hi - lo) / 2.0;
    let fc = eval(c)?;
    let mut res_g = fc * WG[3];
    let mut res_k = fc * WGK[7];
    for j in 0..7 {
        let x = h * XGK[j];
        let pair = eval(c - x)? + eval(c + x)?;
        res_k += WGK[j] * pair;
        if j % 2 == 1 { res_g += WG[j / 2] * pair; }
    }
    Ok(Panel { lo, hi, val: res_k * h, err: ((res_k - res_g) * h).abs() })
}

/// Settings for [adaptive Gauss-Kronrod quadrature][Quad::integrate].
///
/// Usually obtained from [`Config::quad`][crate::config::Config::quad].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quad {
    /// Absolute error bound.
    pub epsabs: f64,
    /// Relative error bound.
    pub epsrel: f64,
    /// Maximum number of panels before giving up.
    pub max_subdivisions: usize,
}

impl Quad {
    /// Integrate `f` over `[lo, hi]`.
    ///
    /// The interval is first cut at every element of `breakpoints` lying
    /// strictly inside it, then each segment into a few equal panels. Panels
    /// are bisected in order of decreasing error estimate until the summed
    /// estimate falls below `max(epsabs, epsrel * |result|)`. Exceeding
    /// `max_subdivisions` panels returns [`QuadError::NoConvergence`].
    ///
    /// ```
    /// use transit::utils::Quad;
    ///
    /// let quad = Quad { epsabs: 1e-12, epsrel: 1e-12, max_subdivisions: 100 };
    /// let val = quad.integrate(|x| (-x * x).exp(), -10.0, 10.0, &[]).unwrap();
    /// assert!((val - std::f64::consts::PI.sqrt()).abs() < 1e-12);
    /// ```
    pub fn integrate<F>(&self, f: F, lo: f64, hi: f64, breakpoints: &[f64])
        -> QResult<f64>
    where F: Fn(f64) -> f64
    {
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(QuadError::BadBounds(lo, hi));
        }
        if lo == hi { return Ok(0.0); }

        let mut cuts: Vec<f64>
            = breakpoints.iter().copied()
            .filter(|b| *b > lo && *b < hi)
            .collect();
        cuts.sort_by(f64::total_cmp);
        cuts.dedup();
        cuts.insert(0, lo);
        cuts.push(hi);

        let mut panels: BinaryHeap<Panel> = BinaryHeap::new();
        for (&a, &b) in cuts.iter().zip(cuts.iter().skip(1)) {
            let w = (b - a) / INITIAL_PANELS as f64;
            for k in 0..INITIAL_PANELS {
                let pa = a + k as f64 * w;
                let pb = if k == INITIAL_PANELS - 1 { b } else { pa + w };
                panels.push(gauss_kronrod(&f, pa, pb)?);
            }
        }

        let mut val: f64 = panels.iter().map(|p| p.val).sum();
        let mut err: f64 = panels.iter().map(|p| p.err).sum();
        while err > self.epsabs.max(self.epsrel * val.abs()) {
            if panels.len() >= self.max_subdivisions {
                return Err(QuadError::NoConvergence {
                    lo,
                    hi,
                    subdivisions: panels.len(),
                    error: err,
                });
            }
            let Some(worst) = panels.pop() else { break; };
            let mid = (worst.lo + worst.hi) / 2.0;
            if mid <= worst.lo || mid >= worst.hi {
                // panel can no longer be split in floating point
                warn!(
                    lo = worst.lo,
                    hi = worst.hi,
                    "quadrature panel reached machine resolution",
                );
                return Err(QuadError::NoConvergence {
                    lo,
                    hi,
                    subdivisions: panels.len() + 1,
                    error: err,
                });
            }
            let left = gauss_kronrod(&f, worst.lo, mid)?;
            let right = gauss_kronrod(&f, mid, worst.hi)?;
            val += left.val + right.val - worst.val;
            err += left.err + right.err - worst.err;
            panels.push(left);
            panels.push(right);
        }
        Ok(panels.iter().map(|p| p.val).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn quad() -> Quad {
        Quad { epsabs: 1e-12, epsrel: 1e-12, max_subdivisions: 500 }
    }

    #[test]
    fn trapz_linear_is_exact() {
        let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 2.0, 21);
        let y = x.mapv(|xk| 3.0 * xk + 1.0);
        assert!((trapz(&y, x[1] - x[0]) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn quad_polynomial_and_oscillatory() {
        let val = quad().integrate(|x| x.powi(4), -1.0, 2.0, &[]).unwrap();
        assert!((val - 33.0 / 5.0).abs() < 1e-12);
        let val = quad().integrate(|x| (20.0 * x).sin().powi(2), 0.0, PI, &[])
            .unwrap();
        assert!((val - PI / 2.0).abs() < 1e-10);
    }

    #[test]
    fn quad_kink_with_breakpoint() {
        let f = |x: f64| x.abs();
        let with = quad().integrate(f, -1.0, 3.0, &[0.0]).unwrap();
        assert!((with - 5.0).abs() < 1e-12);
        let unaligned = quad().integrate(f, -1.3, 3.0, &[]).unwrap();
        assert!((unaligned - (0.845 + 4.5)).abs() < 1e-9);
    }

    #[test]
    fn quad_errors() {
        assert!(matches!(
            quad().integrate(|x| x, 1.0, 0.0, &[]),
            Err(QuadError::BadBounds(..)),
        ));
        assert!(matches!(
            quad().integrate(|x| if x > 0.5 { f64::NAN } else { x }, 0.0, 1.0, &[]),
            Err(QuadError::NonFinite(_)),
        ));
        let stingy = Quad { epsabs: 1e-15, epsrel: 1e-15, max_subdivisions: 8 };
        assert!(matches!(
            stingy.integrate(|x| x.abs().sqrt(), -1.0, 1.0, &[]),
            Err(QuadError::NoConvergence { .. }),
        ));
    }

    #[test]
    fn matrix_predicates() {
        let m = nd::array![[1.0, 2.0], [2.0 + 1e-9, 1.0]];
        assert!(is_symmetric(&m, 1e-6));
        assert!(!is_symmetric(&m, 1e-12));
        assert!(!is_diagonal(&m, 1e-6));
        let id: nd::Array2<f64> = nd::Array2::eye(3);
        assert!(is_identity(&id, 0.0));
        assert!(!is_symmetric(&nd::Array2::<f64>::zeros((2, 3)), 1.0));
    }
}
