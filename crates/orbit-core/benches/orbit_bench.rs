use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};
use orbit_core::{MappingParameters, Particle, PoincareSection};
use orbit_equilibrium::{Equilibrium, EquilibriumDataset};
use orbit_types::config::{OrbitConfig, PhaseMode};
use orbit_types::state::ParticleInit;
use std::f64::consts::TAU;
use std::hint::black_box;

fn bench_equilibrium() -> Equilibrium {
    let (n, m) = (101, 361);
    let psip_wall = 0.5;
    let psip_data = Array1::linspace(0.0, psip_wall, n);
    let theta_data = Array1::linspace(0.0, TAU, m);
    let b_data = Array2::from_shape_fn((n, m), |(i, j)| {
        1.0 + 0.2 * psip_data[i] * theta_data[j].cos()
    });
    let dataset = EquilibriumDataset {
        q_data: psip_data.mapv(|p| 1.5 + p),
        psi_data: psip_data.mapv(|p| 1.5 * p + 0.5 * p * p),
        g_data: Array1::from_elem(n, 1.0),
        i_data: psip_data.mapv(|p| 0.05 * p),
        theta_data,
        b_data,
        r_data: Array2::from_elem((n, m), 1.6),
        z_data: Array2::zeros((n, m)),
        db_dpsip_data: None,
        db_dtheta_data: None,
        psip_wall,
        psi_wall: 1.5 * psip_wall + 0.5 * psip_wall * psip_wall,
        baxis: 1.0,
        raxis: 1.6,
        harmonics: Vec::new(),
        psip_data,
    };
    Equilibrium::from_dataset(&dataset, "cubic", "bicubic", PhaseMode::Constant).unwrap()
}

/// Time-series integration over a fixed horizon.
fn bench_orbit_integration(c: &mut Criterion) {
    let eq = bench_equilibrium();
    let config = OrbitConfig::default();
    let init = ParticleInit::new(0.0, 0.1, 0.05, 0.0, 0.5);

    c.bench_function("integrate_t100", |b| {
        b.iter(|| {
            let mut particle = Particle::new(&init);
            particle.integrate(black_box(&eq), &config, 100.0, None);
            black_box(particle.evolution.steps_taken());
        })
    });
}

/// Poincaré map with Hénon landing, ten crossings.
fn bench_poincare_map(c: &mut Criterion) {
    let eq = bench_equilibrium();
    let config = OrbitConfig::default();
    let params = MappingParameters::new(PoincareSection::ConstTheta, 0.0, 10).unwrap();
    let init = ParticleInit::new(0.0, 0.1, 0.05, 0.0, 0.5);

    c.bench_function("map_theta_10_crossings", |b| {
        b.iter(|| {
            let mut particle = Particle::new(&init);
            particle.map(black_box(&eq), &config, &params, None);
            black_box(particle.crossings.len());
        })
    });
}

criterion_group!(benches, bench_orbit_integration, bench_poincare_map);
criterion_main!(benches);
