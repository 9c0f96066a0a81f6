// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Orbit Equilibrium
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Reconstructed tokamak equilibrium components.
//!
//! A validated [`EquilibriumDataset`] (arrays already read from disk by an
//! external collaborator) is turned into spline-backed components: the
//! q-factor and flux map, the plasma currents, the magnetic field grid, and
//! an optional sum of perturbation harmonics.

pub mod bfield;
pub mod currents;
pub mod dataset;
pub mod harmonic;
pub mod perturbation;
pub mod qfactor;

pub use bfield::Bfield;
pub use currents::Currents;
pub use dataset::{EquilibriumDataset, HarmonicSpec};
pub use harmonic::{Harmonic, HarmonicTerms};
pub use perturbation::Perturbation;
pub use qfactor::Qfactor;

use orbit_types::config::PhaseMode;
use orbit_types::error::OrbitResult;

/// The complete, immutable equilibrium shared read-only across workers.
#[derive(Debug)]
pub struct Equilibrium {
    pub qfactor: Qfactor,
    pub currents: Currents,
    pub bfield: Bfield,
    pub perturbation: Perturbation,
    /// Poloidal flux at the wall; ψp beyond it means the particle escaped.
    pub psip_wall: f64,
    /// Toroidal flux at the wall.
    pub psi_wall: f64,
}

impl Equilibrium {
    /// Builds all four components from one validated dataset.
    ///
    /// `typ_1d` selects the 1D basis for all flux functions, `typ_2d` the 2D
    /// basis for the field grids.
    pub fn from_dataset(
        dataset: &EquilibriumDataset,
        typ_1d: &str,
        typ_2d: &str,
        phase_mode: PhaseMode,
    ) -> OrbitResult<Self> {
        dataset.validate()?;
        Ok(Self {
            qfactor: Qfactor::from_dataset(dataset, typ_1d)?,
            currents: Currents::from_dataset(dataset, typ_1d)?,
            bfield: Bfield::from_dataset(dataset, typ_2d)?,
            perturbation: Perturbation::from_dataset(dataset, typ_1d, phase_mode)?,
            psip_wall: dataset.psip_wall,
            psi_wall: dataset.psi_wall,
        })
    }
}
