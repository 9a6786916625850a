use std::f64::consts::PI;
use approx::assert_abs_diff_eq;
use ndarray as nd;
use num_complex::Complex64 as C64;
use transit::{
    basis::{ BasisFunction, HarmonicOscillator },
    config::Config,
    operators::{ Hamiltonian, operator_matrix, overlap },
    potentials::{ Harmonic, Potential },
    timedep::{ TimeEvolution, split_step },
};

const SIZE: usize = 30;
const SHIFT: f64 = 1.0;

// oscillator basis about the origin and the coefficients of its ground state
// displaced by `SHIFT`, computed by quadrature
fn coherent_setup(config: &Config) -> (Vec<HarmonicOscillator>, nd::Array1<C64>) {
    let basis = HarmonicOscillator::basis_set(SIZE, 0.0, config).unwrap();
    let displaced = HarmonicOscillator::new(0, SHIFT, config).unwrap();
    let c0: nd::Array1<C64>
        = basis.iter()
        .map(|b| C64::from(overlap(b, &displaced, config).unwrap()))
        .collect();
    (basis, c0)
}

fn evolution(config: &Config) -> (Vec<HarmonicOscillator>, TimeEvolution) {
    let (basis, c0) = coherent_setup(config);
    let h = operator_matrix(
        &basis, &Hamiltonian::new(Harmonic::natural(0.0), config), config).unwrap();
    let evo = TimeEvolution::new(h, c0, config).unwrap();
    (basis, evo)
}

#[test]
fn coherent_state_coefficients() {
    let config = Config::default();
    let (_, c0) = coherent_setup(&config);
    let alpha = SHIFT / 2.0_f64.sqrt();
    let mut expected = (-alpha * alpha / 2.0).exp();
    for (n, cn) in c0.iter().enumerate() {
        if n > 0 { expected *= alpha / (n as f64).sqrt(); }
        assert_abs_diff_eq!(cn.re, expected, epsilon = 1e-8);
    }
}

#[test]
fn initial_state_is_returned_at_zero() {
    let config = Config::default();
    let (_, evo) = evolution(&config);
    let c = evo.at(0.0).unwrap();
    for (ck, c0k) in c.iter().zip(evo.initial()) {
        assert!((ck - c0k).norm() < 1e-12);
    }
}

#[test]
fn probability_is_conserved() {
    let config = Config::default();
    let (_, evo) = evolution(&config);
    let p0 = evo.norm(evo.initial()).unwrap();
    let t: nd::Array1<f64> = nd::Array1::linspace(0.0, 6.0 * PI, 200);
    let ct = evo.at_times(&t).unwrap();
    assert_eq!(ct.nrows(), 200);
    for row in ct.rows() {
        assert_abs_diff_eq!(evo.norm(&row).unwrap(), p0, epsilon = 1e-12);
    }
}

#[test]
fn coherent_state_swings_to_opposite_side() {
    let config = Config::default();
    let (basis, evo) = evolution(&config);
    let x: nd::Array1<f64> = nd::Array1::linspace(-5.0, 5.0, 41);
    let mirrored = HarmonicOscillator::new(0, -SHIFT, &config).unwrap();
    // after half a period the packet sits at -SHIFT with an overall phase
    let psi = evo.wavefunction(&basis, PI, &x).unwrap();
    for (psik, xk) in psi.iter().zip(&x) {
        assert_abs_diff_eq!(psik.norm(), mirrored.value(*xk).abs(), epsilon = 1e-6);
    }
}

#[test]
fn spectral_matches_split_step() {
    let config = Config::default();
    let (basis, evo) = evolution(&config);
    let n = 512;
    let dx = 24.0 / n as f64;
    let x = nd::Array1::from_shape_fn(n, |i| -12.0 + i as f64 * dx);
    let v = Harmonic::natural(0.0).eval_arr(&x);
    let q0 = evo.wavefunction(&basis, 0.0, &x).unwrap();
    let t_end = PI / 2.0;
    let t: nd::Array1<f64> = nd::Array1::linspace(0.0, t_end, 315);
    let q = split_step(dx, &v, &q0, &t).unwrap();
    let spectral = evo.wavefunction(&basis, t_end, &x).unwrap();
    let grid = q.row(t.len() - 1);
    let max_diff
        = spectral.iter().zip(grid)
        .map(|(a, b)| (a - b).norm())
        .fold(0.0, f64::max);
    assert!(max_diff < 1e-3, "max difference {max_diff:e}");
}
