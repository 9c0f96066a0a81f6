// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Qfactor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array1;
use orbit_math::{Accelerator, Spline1d};
use orbit_types::error::OrbitResult;

use crate::dataset::EquilibriumDataset;

/// Safety factor q(ψp) and toroidal flux ψ(ψp) of the equilibrium.
pub struct Qfactor {
    /// 1D interpolation selector this component was built with.
    pub typ: String,
    q_spline: Spline1d,
    psi_spline: Spline1d,
    /// Poloidal flux at the wall.
    pub psip_wall: f64,
    /// Toroidal flux at the wall.
    pub psi_wall: f64,
}

impl Qfactor {
    /// Builds from raw sample arrays.
    pub fn new(psip_data: &[f64], q_data: &[f64], psi_data: &[f64], typ: &str) -> OrbitResult<Self> {
        let q_spline = Spline1d::from_name(typ, psip_data, q_data)?;
        let psi_spline = Spline1d::from_name(typ, psip_data, psi_data)?;
        let psip_wall = psip_data[psip_data.len() - 1];
        let psi_wall = psi_data[psi_data.len() - 1];
        Ok(Self {
            typ: typ.into(),
            q_spline,
            psi_spline,
            psip_wall,
            psi_wall,
        })
    }

    /// Builds from a validated dataset.
    pub fn from_dataset(dataset: &EquilibriumDataset, typ: &str) -> OrbitResult<Self> {
        Self::new(
            &dataset.psip_data.to_vec(),
            &dataset.q_data.to_vec(),
            &dataset.psi_data.to_vec(),
            typ,
        )
    }

    /// The safety factor q(ψp).
    pub fn q(&self, psip: f64, acc: &mut Accelerator) -> f64 {
        self.q_spline.eval(psip, acc)
    }

    /// The toroidal flux ψ(ψp).
    pub fn psi(&self, psip: f64, acc: &mut Accelerator) -> f64 {
        self.psi_spline.eval(psip, acc)
    }

    /// dψ/dψp, which equals q on a consistent equilibrium.
    pub fn dpsi_dpsip(&self, psip: f64, acc: &mut Accelerator) -> f64 {
        self.psi_spline.d_dx(psip, acc)
    }

    /// dψ/dψp evaluated at every abscissa knot, for cross-checking against
    /// the tabulated q samples. Reported, never enforced.
    pub fn q_data_derived(&self) -> Array1<f64> {
        let mut acc = Accelerator::new();
        self.psi_spline
            .xa
            .iter()
            .map(|&psip| self.psi_spline.d_dx(psip, &mut acc))
            .collect()
    }

    /// The ψp abscissa this component was built on.
    pub fn psip_data(&self) -> Array1<f64> {
        self.q_spline.xa.clone()
    }

    /// The q samples this component was built on.
    pub fn q_data(&self) -> Array1<f64> {
        self.q_spline.ya.clone()
    }

    /// The ψ samples this component was built on.
    pub fn psi_data(&self) -> Array1<f64> {
        self.psi_spline.ya.clone()
    }
}

impl std::fmt::Debug for Qfactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Qfactor")
            .field("typ", &self.typ)
            .field("psip_wall", &format!("{:.7}", self.psip_wall))
            .field("psi_wall", &format!("{:.7}", self.psi_wall))
            .field("len", &self.q_spline.xa.len())
            .finish()
    }
}
