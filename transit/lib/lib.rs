//! Provides basis-set tools for one-dimensional quantum dynamics, aimed at
//! model charge-transfer systems.
//!
//! States are expanded over a finite set of basis functions, operators become
//! real symmetric matrices over that set, and time evolution follows from a
//! single diagonalization of the Hamiltonian matrix.
//!
//! Provides:
//! - Basis functions: harmonic oscillator eigenstates and eigenstates of
//!   arbitrary potentials expanded over them
//! - Operators: overlap, kinetic, potential, and Hamiltonian matrix elements,
//!   in closed form where available and by adaptive quadrature otherwise
//! - Matrix assembly exploiting symmetry, sequentially or in parallel
//! - Spectral time evolution in orthonormal and non-orthogonal bases, with a
//!   grid-based split-step propagator for cross-checks
//! - Potentials, including a parametrized donor-bridge-acceptor triple well
//!
//! See [`docs`] for theoretical background.

pub mod basis;
pub mod config;
pub mod eigen;
pub mod error;
pub mod linalg;
pub mod molecule;
pub mod operators;
pub mod pairwise;
pub mod potentials;
pub mod timedep;
pub mod utils;

pub mod docs;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
