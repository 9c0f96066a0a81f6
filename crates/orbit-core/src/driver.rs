// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Data-parallel batch driver.
//!
//! Each particle is one independent job on a bounded worker pool. The
//! equilibrium is shared read-only; accelerators, solver scratch, and output
//! buffers are worker-private, so the hot path holds no locks. Per-particle
//! terminations are recorded in the status vector and never abort the batch.

use std::sync::atomic::AtomicBool;

use ndarray::Array2;
use orbit_equilibrium::Equilibrium;
use orbit_types::config::OrbitConfig;
use orbit_types::error::{OrbitError, OrbitResult};
use orbit_types::state::{InitSet, TerminalStatus};
use rayon::prelude::*;

use crate::mapping::MappingParameters;
use crate::particle::Particle;

/// The finished batch: one particle record and one status per input index.
#[derive(Debug)]
pub struct BatchOutcome {
    pub particles: Vec<Particle>,
    pub statuses: Vec<TerminalStatus>,
}

impl BatchOutcome {
    /// Number of particles that ended with `status`.
    pub fn count(&self, status: TerminalStatus) -> usize {
        self.statuses.iter().filter(|s| **s == status).count()
    }

    /// The crossing records stacked into (angles, fluxes) arrays of shape
    /// (particles, intersections). Rows of particles that terminated early
    /// are padded with NaN so they stay plottable.
    pub fn crossing_arrays(&self, intersections: usize) -> (Array2<f64>, Array2<f64>) {
        let rows = self.particles.len();
        let mut angles = Array2::from_elem((rows, intersections), f64::NAN);
        let mut fluxes = Array2::from_elem((rows, intersections), f64::NAN);
        for (row, particle) in self.particles.iter().enumerate() {
            for (col, &value) in particle.crossings.angles.iter().take(intersections).enumerate() {
                angles[[row, col]] = value;
            }
            for (col, &value) in particle.crossings.fluxes.iter().take(intersections).enumerate() {
                fluxes[[row, col]] = value;
            }
        }
        (angles, fluxes)
    }
}

/// Runs one mapping job per initial-condition index on the worker pool.
pub fn run_map(
    eq: &Equilibrium,
    config: &OrbitConfig,
    inits: &InitSet,
    params: &MappingParameters,
    stop: Option<&AtomicBool>,
) -> OrbitResult<BatchOutcome> {
    config.validate()?;
    let mut particles = spawn_particles(inits);
    let pool = build_pool(config)?;
    pool.install(|| {
        particles
            .par_iter_mut()
            .for_each(|particle| particle.map(eq, config, params, stop));
    });
    Ok(collect(particles))
}

/// Runs one time-series integration per initial-condition index.
pub fn run_evolution(
    eq: &Equilibrium,
    config: &OrbitConfig,
    inits: &InitSet,
    t_final: f64,
    stop: Option<&AtomicBool>,
) -> OrbitResult<BatchOutcome> {
    config.validate()?;
    if !t_final.is_finite() {
        return Err(OrbitError::ConfigError(format!(
            "t_final must be finite, got {t_final}"
        )));
    }
    let mut particles = spawn_particles(inits);
    let pool = build_pool(config)?;
    pool.install(|| {
        particles
            .par_iter_mut()
            .for_each(|particle| particle.integrate(eq, config, t_final, stop));
    });
    Ok(collect(particles))
}

fn spawn_particles(inits: &InitSet) -> Vec<Particle> {
    (0..inits.len())
        .map(|index| Particle::new(&inits.get(index)))
        .collect()
}

fn build_pool(config: &OrbitConfig) -> OrbitResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.effective_workers())
        .build()
        .map_err(|err| OrbitError::ConfigError(format!("worker pool construction failed: {err}")))
}

fn collect(particles: Vec<Particle>) -> BatchOutcome {
    let statuses = particles.iter().map(|p| p.status).collect();
    BatchOutcome {
        particles,
        statuses,
    }
}
