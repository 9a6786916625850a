use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::info;
use transit::{
    basis::{ BasisFunction, HarmonicOscillator },
    config::Config,
    eigen::eigenbasis,
    operators::cross_overlap,
    potentials::{ TripleWell, TripleWellParams },
    timedep::TimeEvolution,
    utils::trapz,
};

const PER_SITE: usize = 6;
const N_STATES: usize = 8;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config
        = match std::env::args().nth(1) {
            Some(path) => Config::from_file(path)?,
            None => Config::from_env()?,
        };

    let potential = TripleWell::from_params(TripleWellParams {
        well1_depth: 1.0,
        well1_halfwidth: 2.0,
        bridge_length: 5.0,
        bridge_depth: 1.0,
        well3_halfwidth: 1.5,
        well3_depth: 0.5,
    })?;
    let (b1, b2) = potential.boundaries();

    // oscillators stacked on each site; the first is the donor ground state
    let basis: Vec<HarmonicOscillator>
        = potential.minima().into_iter()
        .flat_map(|c| (0..PER_SITE).map(move |n| (n, c)))
        .map(|(n, c)| HarmonicOscillator::new(n, c, &config))
        .collect::<Result<_, _>>()?;
    let states = eigenbasis(&basis, potential, &config)?;
    for state in states.iter().take(N_STATES) {
        info!(index = state.index(), energy = state.energy(), "eigenstate");
    }

    // donor state projected onto the eigenstates
    let donor = &basis[0];
    let c0: nd::Array1<C64>
        = states.iter()
        .map(|state| cross_overlap(state, donor, &config).map(C64::from))
        .collect::<Result<_, _>>()?;
    let energies: nd::Array1<f64> = states.iter().map(|st| st.energy()).collect();
    let evo = TimeEvolution::new(nd::Array2::from_diag(&energies), c0, &config)?;
    info!(captured = evo.norm(evo.initial())?, "donor state projected");

    let x: nd::Array1<f64> = nd::Array1::linspace(-6.0, 14.0, 2001);
    let dx = x[1] - x[0];
    let region = |rho: &nd::Array1<f64>, lo: f64, hi: f64| -> f64 {
        let masked: nd::Array1<f64>
            = nd::Zip::from(&x).and(rho)
            .map_collect(|&xk, &rk| if xk > lo && xk <= hi { rk } else { 0.0 });
        trapz(&masked, dx)
    };
    let t: nd::Array1<f64> = nd::Array1::linspace(0.0, 200.0, 41);
    println!("# t P_donor P_bridge P_acceptor");
    for &tk in t.iter() {
        let rho = evo.wavefunction(&states, tk, &x)?.mapv(|q| q.norm_sqr());
        let p1 = region(&rho, f64::NEG_INFINITY, b1);
        let p2 = region(&rho, b1, b2);
        let p3 = region(&rho, b2, f64::INFINITY);
        println!("{tk:8.3} {p1:.6} {p2:.6} {p3:.6}");
    }
    Ok(())
}
