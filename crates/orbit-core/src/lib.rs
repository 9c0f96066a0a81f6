// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Orbit Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Guiding-centre orbit engine: RHS assembly, adaptive RKF4(5) integration,
//! Poincaré sections via Hénon's trick, and the data-parallel batch driver.

pub mod driver;
pub mod evolution;
pub mod mapping;
pub mod particle;
mod rkf45;
pub mod state;

pub use driver::{run_evolution, run_map, BatchOutcome};
pub use evolution::{Evolution, SectionCrossings};
pub use mapping::{MappingParameters, PoincareSection};
pub use particle::Particle;
pub use state::{EvalScratch, OrbitState};

/// Synthetic equilibria shared by the unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use ndarray::{Array1, Array2};
    use orbit_equilibrium::{Equilibrium, EquilibriumDataset};
    use orbit_types::config::PhaseMode;

    /// q = q0, g = 1, I = 0, B = 1, no harmonics: every derivative vanishes
    /// and the splines reproduce the fields exactly.
    pub fn constant_q_dataset(q0: f64) -> EquilibriumDataset {
        let (n, m) = (41, 65);
        let psip_wall = 0.5;
        let psip_data = Array1::linspace(0.0, psip_wall, n);
        EquilibriumDataset {
            q_data: Array1::from_elem(n, q0),
            psi_data: psip_data.mapv(|p| q0 * p),
            g_data: Array1::from_elem(n, 1.0),
            i_data: Array1::zeros(n),
            theta_data: Array1::linspace(0.0, std::f64::consts::TAU, m),
            b_data: Array2::from_elem((n, m), 1.0),
            r_data: Array2::from_elem((n, m), 1.6),
            z_data: Array2::zeros((n, m)),
            db_dpsip_data: None,
            db_dtheta_data: None,
            psip_wall,
            psi_wall: q0 * psip_wall,
            baxis: 1.0,
            raxis: 1.6,
            harmonics: Vec::new(),
            psip_data,
        }
    }

    pub fn constant_q_equilibrium(q0: f64) -> Equilibrium {
        Equilibrium::from_dataset(
            &constant_q_dataset(q0),
            "cubic",
            "bicubic",
            PhaseMode::Constant,
        )
        .expect("synthetic dataset must build")
    }

    /// Sheared q, non-uniform currents and a cosine field modulation: the
    /// smallest equilibrium with genuinely nonlinear dynamics.
    pub fn shaped_equilibrium() -> Equilibrium {
        let (n, m) = (61, 129);
        let psip_wall = 0.5;
        let psip_data = Array1::linspace(0.0, psip_wall, n);
        let theta_data = Array1::linspace(0.0, std::f64::consts::TAU, m);
        let b_data = Array2::from_shape_fn((n, m), |(i, j)| {
            1.0 + 0.25 * psip_data[i] * theta_data[j].cos()
        });
        let dataset = EquilibriumDataset {
            q_data: psip_data.mapv(|p| 1.5 + p),
            psi_data: psip_data.mapv(|p| 1.5 * p + 0.5 * p * p),
            g_data: psip_data.mapv(|p| 1.0 + 0.1 * p * p),
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
        Equilibrium::from_dataset(&dataset, "cubic", "bicubic", PhaseMode::Constant)
            .expect("synthetic dataset must build")
    }
}
