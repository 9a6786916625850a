use std::f64::consts::PI;
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::info;
use transit::{
    basis::HarmonicOscillator,
    config::Config,
    operators::{ Hamiltonian, operator_matrix, overlap },
    potentials::{ Harmonic, Potential },
    timedep::{ TimeEvolution, densities, split_step },
    utils::trapz,
};

const BASIS_SIZE: usize = 30;
const SHIFT: f64 = 1.5;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::from_env()?;

    let basis = HarmonicOscillator::basis_set(BASIS_SIZE, 0.0, &config)?;
    let displaced = HarmonicOscillator::new(0, SHIFT, &config)?;
    let c0: nd::Array1<C64>
        = basis.iter()
        .map(|b| overlap(b, &displaced, &config).map(C64::from))
        .collect::<Result<_, _>>()?;
    let potential = Harmonic::natural(0.0);
    let h = operator_matrix(&basis, &Hamiltonian::new(potential, &config), &config)?;
    let evo = TimeEvolution::build(h, c0, &config)?;
    info!(norm = evo.norm(evo.initial())?, "coherent state prepared");

    let x: nd::Array1<f64> = nd::Array1::linspace(-12.0, 12.0, 1024);
    let dx = x[1] - x[0];
    let v = potential.eval_arr(&x);
    let t: nd::Array1<f64> = nd::Array1::linspace(0.0, 4.0 * PI, 2000);
    let q0 = evo.wavefunction(&basis, 0.0, &x)?;
    let rho_grid = densities(&split_step(dx, &v, &q0, &t)?);

    println!("# t <x>_spectral <x>_split_step");
    for (k, &tk) in t.iter().enumerate().step_by(50) {
        let rho_spec = evo.wavefunction(&basis, tk, &x)?.mapv(|q| q.norm_sqr());
        let x_spec = trapz(&(&x * &rho_spec), dx);
        let x_grid = trapz(&(&x * &rho_grid.row(k)), dx);
        println!("{tk:.6} {x_spec:+.8} {x_grid:+.8}");
    }
    Ok(())
}
