//! Closed-form potential energy functions of one spatial coordinate.
//!
//! Every potential is a pure function of `x` over a fixed parameter set. Scalar
//! evaluation goes through [`Potential::eval`]; arrays are broadcast
//! elementwise through [`Potential::eval_arr`]. Any `Fn(f64) -> f64` is also a
//! potential, and potentials can be combined with [`PotentialExt`]:
//!
//! ```
//! use ndarray as nd;
//! use transit::potentials::{ Potential, PotentialExt, TripleWell, TripleWellParams };
//!
//! let v = TripleWell::from_params(TripleWellParams {
//!     well1_depth: 1.0,
//!     well1_halfwidth: 2.0,
//!     bridge_length: 5.0,
//!     bridge_depth: 1.0,
//!     well3_halfwidth: 1.5,
//!     well3_depth: 0.5,
//! }).unwrap();
//! assert_eq!(v.eval(0.0), 0.0);
//!
//! // tilt the landscape with a uniform field
//! let tilted = v.plus(|x: f64| -0.01 * x);
//! let x: nd::Array1<f64> = nd::Array1::linspace(-10.0, 10.0, 100);
//! assert_eq!(tilted.eval_arr(&x).len(), 100);
//! ```

use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::{ Arr1, error::PotentialError };

pub type PResult<T> = Result<T, PotentialError>;

/// A scalar potential energy function of one coordinate.
pub trait Potential {
    /// Evaluate at a single point.
    fn eval(&self, x: f64) -> f64;

    /// Evaluate elementwise over an array.
    fn eval_arr<S>(&self, x: &Arr1<S>) -> nd::Array1<f64>
    where
        S: nd::Data<Elem = f64>,
        Self: Sized,
    {
        x.mapv(|xk| self.eval(xk))
    }

    /// Coordinates at which the potential (or one of its low-order
    /// derivatives) is discontinuous. Quadrature splits its domain here.
    fn breakpoints(&self) -> Vec<f64> { Vec::new() }
}

impl<F> Potential for F
where F: Fn(f64) -> f64
{
    fn eval(&self, x: f64) -> f64 { self(x) }
}

/// Combinators for any [`Potential`].
pub trait PotentialExt: Potential + Sized {
    /// Pointwise sum `self(x) + other(x)`.
    fn plus<P: Potential>(self, other: P) -> Sum<Self, P> { Sum(self, other) }

    /// Pointwise scaling `factor * self(x)`.
    fn scaled(self, factor: f64) -> Scaled<Self> { Scaled(self, factor) }
}

impl<P: Potential> PotentialExt for P { }

/// Sum of two potentials.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sum<A, B>(pub A, pub B);

impl<A: Potential, B: Potential> Potential for Sum<A, B> {
    fn eval(&self, x: f64) -> f64 { self.0.eval(x) + self.1.eval(x) }

    fn breakpoints(&self) -> Vec<f64> {
        let mut bp = self.0.breakpoints();
        bp.extend(self.1.breakpoints());
        bp.sort_by(f64::total_cmp);
        bp.dedup();
        bp
    }
}

/// A potential multiplied by a constant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Scaled<P>(pub P, pub f64);

impl<P: Potential> Potential for Scaled<P> {
    fn eval(&self, x: f64) -> f64 { self.1 * self.0.eval(x) }

    fn breakpoints(&self) -> Vec<f64> { self.0.breakpoints() }
}

/// Harmonic potential `½ m ω² (x - center)²`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Harmonic {
    center: f64,
    mass: f64,
    omega: f64,
}

impl Harmonic {
    /// Create a new harmonic potential.
    ///
    /// Fails if `center` is not finite or `mass` or `omega` is not strictly
    /// positive.
    pub fn new(center: f64, mass: f64, omega: f64) -> PResult<Self> {
        PotentialError::check_finite("center", center)?;
        PotentialError::check_positive("mass", mass)?;
        PotentialError::check_positive("omega", omega)?;
        Ok(Self { center, mass, omega })
    }

    /// The potential in natural units, `m = ω = 1`, i.e. `½ (x - center)²`.
    pub fn natural(center: f64) -> Self {
        Self { center, mass: 1.0, omega: 1.0 }
    }

    /// Location of the minimum.
    pub fn center(&self) -> f64 { self.center }

    /// Particle mass.
    pub fn mass(&self) -> f64 { self.mass }

    /// Angular frequency.
    pub fn omega(&self) -> f64 { self.omega }
}

impl Potential for Harmonic {
    fn eval(&self, x: f64) -> f64 {
        0.5 * self.mass * (self.omega * (x - self.center)).powi(2)
    }
}

/// Parabola in vertex form, `a (x - h)² + k`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Parabola {
    a: f64,
    h: f64,
    k: f64,
}

impl Parabola {
    /// Create the unique vertical-axis parabola with vertex `(vx, vy)` passing
    /// through `(px, py)`.
    pub fn from_vertex_and_point(vx: f64, vy: f64, px: f64, py: f64)
        -> PResult<Self>
    {
        PotentialError::check_finite("vertex x", vx)?;
        PotentialError::check_finite("vertex y", vy)?;
        PotentialError::check_finite("point x", px)?;
        PotentialError::check_finite("point y", py)?;
        if px == vx { return Err(PotentialError::DegenerateParabola(vx)); }
        let a = (py - vy) / (px - vx).powi(2);
        Ok(Self { a, h: vx, k: vy })
    }

    /// Quadratic coefficient.
    pub fn curvature(&self) -> f64 { self.a }

    /// Vertex coordinates `(h, k)`.
    pub fn vertex(&self) -> (f64, f64) { (self.h, self.k) }
}

impl Potential for Parabola {
    fn eval(&self, x: f64) -> f64 { self.a * (x - self.h).powi(2) + self.k }
}

/// Named parameters for a [`TripleWell`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripleWellParams {
    /// Height of the plateau joining the regions, measured from the bottom of
    /// well 1.
    pub well1_depth: f64,
    /// Distance from the bottom of well 1 to the bridge.
    pub well1_halfwidth: f64,
    /// Width of the bridge region.
    pub bridge_length: f64,
    /// Depth of the bridge below the plateau; negative values make a barrier.
    pub bridge_depth: f64,
    /// Distance from the bridge to the bottom of well 3.
    pub well3_halfwidth: f64,
    /// Depth of well 3 below the plateau.
    pub well3_depth: f64,
}

/// Donor-bridge-acceptor potential built from three parabolas.
///
/// With `w1 = well1_halfwidth`, `b = bridge_length`, and `d1 = well1_depth`:
/// ```text
///        ┌ well 1, vertex (0, 0)                          x ≤ w1
/// V(x) = ┤ bridge, vertex (w1 + b/2, d1 - bridge_depth)   w1 < x ≤ w1 + b
///        └ well 3, vertex (w1 + b + w3, d1 - well3_depth) x > w1 + b
/// ```
/// Every parabola passes through `d1` at the boundaries it touches, so the
/// potential is continuous, and wells 1 and 3 continue outward as confining
/// quadratic walls.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TripleWell {
    params: TripleWellParams,
    well1: Parabola,
    bridge: Parabola,
    well3: Parabola,
    boundary1: f64,
    boundary2: f64,
}

impl TripleWell {
    /// Build from named physical parameters.
    ///
    /// Fails if any parameter is not finite, if a half-width or the bridge
    /// length is not strictly positive, or if either outer well depth is not
    /// strictly positive.
    pub fn from_params(params: TripleWellParams) -> PResult<Self> {
        let TripleWellParams {
            well1_depth: d1,
            well1_halfwidth: w1,
            bridge_length: bl,
            bridge_depth: bd,
            well3_halfwidth: w3,
            well3_depth: d3,
        } = params;
        PotentialError::check_positive("well1_depth", d1)?;
        PotentialError::check_positive("well1_halfwidth", w1)?;
        PotentialError::check_positive("bridge_length", bl)?;
        PotentialError::check_finite("bridge_depth", bd)?;
        PotentialError::check_positive("well3_halfwidth", w3)?;
        PotentialError::check_positive("well3_depth", d3)?;

        let boundary1 = w1;
        let boundary2 = w1 + bl;
        let well1 = Parabola::from_vertex_and_point(0.0, 0.0, boundary1, d1)?;
        let bridge = Parabola::from_vertex_and_point(
            w1 + bl / 2.0, d1 - bd, boundary1, d1)?;
        let well3 = Parabola::from_vertex_and_point(
            boundary2 + w3, d1 - d3, boundary2, d1)?;
        Ok(Self { params, well1, bridge, well3, boundary1, boundary2 })
    }

    /// The parameters this potential was built from.
    pub fn params(&self) -> &TripleWellParams { &self.params }

    /// Coordinates of the bottoms of well 1, the bridge, and well 3.
    pub fn minima(&self) -> [f64; 3] {
        [self.well1.vertex().0, self.bridge.vertex().0, self.well3.vertex().0]
    }

    /// The boundaries well 1 | bridge and bridge | well 3.
    pub fn boundaries(&self) -> (f64, f64) { (self.boundary1, self.boundary2) }
}

impl Potential for TripleWell {
    fn eval(&self, x: f64) -> f64 {
        if x <= self.boundary1 {
            self.well1.eval(x)
        } else if x <= self.boundary2 {
            self.bridge.eval(x)
        } else {
            self.well3.eval(x)
        }
    }

    fn breakpoints(&self) -> Vec<f64> { vec![self.boundary1, self.boundary2] }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TripleWellParams {
        TripleWellParams {
            well1_depth: 1.0,
            well1_halfwidth: 2.0,
            bridge_length: 5.0,
            bridge_depth: 1.0,
            well3_halfwidth: 1.5,
            well3_depth: 0.5,
        }
    }

    #[test]
    fn parabola_through_points() {
        let p = Parabola::from_vertex_and_point(1.0, -2.0, 3.0, 6.0).unwrap();
        assert_eq!(p.eval(1.0), -2.0);
        assert_eq!(p.eval(3.0), 6.0);
        assert_eq!(p.eval(-1.0), 6.0);
        assert_eq!(p.curvature(), 2.0);
        assert!(matches!(
            Parabola::from_vertex_and_point(1.0, 0.0, 1.0, 1.0),
            Err(PotentialError::DegenerateParabola(_)),
        ));
    }

    #[test]
    fn triple_well_is_continuous() {
        let v = TripleWell::from_params(params()).unwrap();
        let (b1, b2) = v.boundaries();
        for b in [b1, b2] {
            let left = v.eval(b - 1e-9);
            let right = v.eval(b + 1e-9);
            assert!((left - right).abs() < 1e-8);
        }
        assert_eq!(v.minima(), [0.0, 4.5, 8.5]);
        assert_eq!(v.breakpoints(), vec![2.0, 7.0]);
    }

    #[test]
    fn triple_well_barrier_bridge() {
        let p = TripleWellParams { bridge_depth: -0.5, ..params() };
        let v = TripleWell::from_params(p).unwrap();
        assert!((v.eval(4.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn triple_well_rejects_bad_params() {
        let bad = [
            TripleWellParams { well1_halfwidth: -2.0, ..params() },
            TripleWellParams { bridge_length: 0.0, ..params() },
            TripleWellParams { well3_depth: 0.0, ..params() },
            TripleWellParams { bridge_depth: f64::NAN, ..params() },
            TripleWellParams { well1_depth: f64::INFINITY, ..params() },
        ];
        for p in bad {
            assert!(TripleWell::from_params(p).is_err(), "{p:?}");
        }
    }

    #[test]
    fn composition() {
        let h = Harmonic::new(1.0, 2.0, 3.0).unwrap();
        assert_eq!(h.eval(2.0), 9.0);
        let v = TripleWell::from_params(params()).unwrap();
        let sum = h.plus(v).scaled(2.0);
        assert_eq!(sum.eval(0.0), 2.0 * (h.eval(0.0) + v.eval(0.0)));
        assert_eq!(sum.breakpoints(), vec![2.0, 7.0]);
        assert!(Harmonic::new(0.0, -1.0, 1.0).is_err());
    }
}
