//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Units](#units)
//! - [Harmonic oscillator basis](#harmonic-oscillator-basis)
//! - [Matrix elements](#matrix-elements)
//! - [Spectral time evolution](#spectral-time-evolution)
//! - [Split-step cross-check](#split-step-cross-check)
//! - [Triple well](#triple-well)
//!
//! # Background
//! A quantum state of a particle in one dimension is approximated by a finite
//! expansion over a set of known functions *φ*ᵢ(*x*),
//! ```text
//! ψ(x, t) = Σᵢ cᵢ(t) φᵢ(x)
//! ```
//! Substituting into the time-dependent Schrödinger equation and projecting
//! onto each *φ*ⱼ gives a linear system for the coefficient vector,
//! ```text
//!     ∂c
//! i S -- = H c
//!     ∂t
//!
//! S[j, i] = ∫ φⱼ(x) φᵢ(x) dx
//! H[j, i] = ∫ φⱼ(x) (-½ ∂² + V(x)) φᵢ(x) dx
//! ```
//! so that all of the physics is contained in two real, symmetric matrices.
//! For an orthonormal basis *S* is the identity.
//!
//! # Units
//! Everything is expressed in natural units with *ħ* = *m* = 1, so that the
//! Hamiltonian is simply *H* = -½ ∂²/∂*x*² + *V*(*x*). A harmonic oscillator
//! basis function then corresponds to a unit angular frequency, and energies
//! are in units of *ħω*.
//!
//! # Harmonic oscillator basis
//! The eigenstates of *V*(*x*) = ½ (*x* - *c*)² are
//! ```text
//!                  -1/2                  -ξ²/2
//! ψₙ(x) = (2ⁿ n! √π)     Hₙ(ξ) e        ,   ξ = x - c
//! ```
//! with energies *n* + ½. Forming *H*ₙ and *n*! directly overflows long before
//! the quantum numbers of interest, so values are instead generated from the
//! recurrence between normalized functions,
//! ```text
//!               2             n
//! ψₙ₊₁(ξ) = √(-----) ξ ψₙ - √(-----) ψₙ₋₁
//!             n + 1         n + 1
//!
//!            -1/4  -ξ²/2
//! ψ₀(ξ) = π      e
//! ```
//! The Gaussian factor underflows for |ξ| ≳ 38 while the polynomial part grows
//! without bound, so the recurrence is run on the polynomial part alone,
//! divided down whenever it grows large with the removed magnitude kept as a
//! logarithm, and the two are recombined as a single exponential at the end.
//! Derivatives follow from the ladder relations
//! ```text
//! ψₙ'  = √(2n) ψₙ₋₁ - ξ ψₙ
//! ψₙ'' = (ξ² - 2n - 1) ψₙ
//! ```
//!
//! # Matrix elements
//! When two oscillators share a center, their overlap is *δ*ₘₙ and the
//! kinetic energy follows from writing *p* in terms of ladder operators:
//! ```text
//!             1
//! ⟨m|p²/2|n⟩ = - [(2n + 1) δ(m, n) - √(n (n - 1)) δ(m, n - 2)
//!             4                    - √((n + 1) (n + 2)) δ(m, n + 2)]
//! ```
//! The kinetic matrix is therefore not diagonal, but its diagonal is exactly
//! half the oscillator energy (the virial theorem), and the same off-diagonal
//! terms appear with opposite sign in the potential matrix, leaving the
//! Hamiltonian diagonal.
//!
//! All other elements are integrated numerically with adaptive Gauss-Kronrod
//! quadrature over the interval where both functions are non-negligible. The
//! kinetic term is integrated in its symmetric form
//! ```text
//!   1                   1
//! - - ∫ a b'' dx   =    - ∫ a' b' dx
//!   2                   2
//! ```
//! which holds by parts for any pair of square-integrable functions, and
//! potential integrals are split at the kinks of piecewise potentials.
//!
//! Every operator here is Hermitian, so only the upper triangle of a matrix is
//! ever computed.
//!
//! # Spectral time evolution
//! For a time-independent *H*, the generalized eigenproblem *H V* = *S V* *E*
//! gives the propagator in closed form:
//! ```text
//!                -i E t   -1
//! c(t) = V diag(e      ) V   c(0)
//! ```
//! *S* is factored as *L Lᵀ* (Cholesky), reducing the problem to the standard
//! symmetric eigenproblem for *L*⁻¹ *H L*⁻ᵀ with eigenvectors *U*, from which
//! *V* = *L*⁻ᵀ *U*. The resulting *V* satisfies *Vᵀ S V* = 1, so its inverse is
//! simply *Vᵀ S*, and the conserved norm is *c*† *S* *c*.
//!
//! Diagonalization is done once; after that, evaluation at any time is a
//! single matrix-vector product.
//!
//! # Split-step cross-check
//! The same dynamics can be integrated directly on a grid with the split-step
//! method. Sandwiching the kinetic step between two half potential steps
//! gives
//! ```text
//!               -i V dt/2  -i T dt  -i V dt/2
//! ψ(t + dt) = [e          e        e         ] ψ(t) + O(dt³)
//! ```
//! where the potential factor is a pointwise phase in position space and the
//! kinetic factor, *T* = *k*²/2, is a pointwise phase in momentum space,
//! reached through the FFT:
//! ```text
//!  -i T dt         -1  -i k² dt/2
//! e        ψ(x) = F  [e           F[ψ](k)]
//! ```
//! Agreement between this and the spectral result for a state well inside the
//! span of the basis is a direct check of the matrix elements.
//!
//! # Triple well
//! The donor-bridge-acceptor model is built from three parabolas in vertex
//! form, *a* (*x* - *h*)² + *k*, joined continuously at two boundaries:
//! ```text
//!   V
//!   |\                                   /
//!   | \         ______________          /
//! d₁|  \_______/              \_____   /
//!   |   well 1     bridge     well 3 \_/
//!   +---------+----------------+---------- x
//!   0        w₁            w₁ + b
//! ```
//! Well 1 has its bottom at the origin and reaches *d*₁ at *w*₁; the bridge
//! spans (*w*₁, *w*₁ + *b*] with its vertex at its midpoint, `bridge_depth`
//! below *d*₁; well 3 has its bottom `well3_halfwidth` past the bridge,
//! `well3_depth` below *d*₁. The outer parabolas keep rising past the wells,
//! confining the particle.
