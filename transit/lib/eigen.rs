//! Eigenstates of a Hamiltonian within the span of a primitive basis.
//!
//! Given primitives `φᵢ` and a potential `V`, [`eigenbasis`] assembles the
//! overlap matrix `S` and the Hamiltonian matrix `H` of `-½ ∂² + V`, solves
//! `H v = E S v`, and wraps each solution as an [`EigenState`]. Eigenstates
//! are themselves [`BasisFunction`]s, so they can seed further matrix builds
//! and time evolution.

use std::sync::Arc;
use tracing::debug;
use crate::{
    basis::{ BasisFunction, EigenState },
    config::Config,
    error::{ BasisError, EigenError },
    linalg::eigh_generalized,
    operators::{ Hamiltonian, Overlap, operator_matrix },
    potentials::Potential,
};

pub type EResult<T> = Result<T, EigenError>;

/// Solve for the eigenstates of `-½ ∂² + potential` expanded in `basis`,
/// ordered by increasing energy.
///
/// Fails if `basis` is empty, if any matrix element fails to integrate, or if
/// the overlap matrix is not positive-definite (e.g. the basis is linearly
/// dependent).
pub fn eigenbasis<B, P>(basis: &[B], potential: P, config: &Config)
    -> EResult<Vec<EigenState<B, P>>>
where
    B: BasisFunction + Clone,
    P: Potential + Clone,
{
    if basis.is_empty() { return Err(BasisError::Empty.into()); }
    let s = operator_matrix(basis, &Overlap::new(config), config)?;
    let h = operator_matrix(
        basis, &Hamiltonian::new(potential.clone(), config), config)?;
    let (energies, vectors) = eigh_generalized(&h, &s, config.float_tol)?;
    debug!(size = basis.len(), ground = energies[0], "solved eigenbasis");
    let terms: Arc<[B]> = basis.iter().cloned().collect();
    energies.iter().zip(vectors.columns()).enumerate()
        .map(|(k, (&e, v))| {
            EigenState::new(k, terms.clone(), v.to_owned(), e, potential.clone())
                .map_err(EigenError::from)
        })
        .collect()
}
