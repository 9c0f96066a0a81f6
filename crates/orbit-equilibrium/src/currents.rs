// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Currents
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array1;
use orbit_math::{Accelerator, Spline1d};
use orbit_types::error::OrbitResult;

use crate::dataset::EquilibriumDataset;

/// Toroidal current g(ψp) and poloidal current I(ψp).
pub struct Currents {
    /// 1D interpolation selector this component was built with.
    pub typ: String,
    g_spline: Spline1d,
    i_spline: Spline1d,
}

impl Currents {
    /// Builds from raw sample arrays.
    pub fn new(psip_data: &[f64], g_data: &[f64], i_data: &[f64], typ: &str) -> OrbitResult<Self> {
        Ok(Self {
            typ: typ.into(),
            g_spline: Spline1d::from_name(typ, psip_data, g_data)?,
            i_spline: Spline1d::from_name(typ, psip_data, i_data)?,
        })
    }

    /// Builds from a validated dataset.
    pub fn from_dataset(dataset: &EquilibriumDataset, typ: &str) -> OrbitResult<Self> {
        Self::new(
            &dataset.psip_data.to_vec(),
            &dataset.g_data.to_vec(),
            &dataset.i_data.to_vec(),
            typ,
        )
    }

    /// The toroidal current g(ψp).
    pub fn g(&self, psip: f64, acc: &mut Accelerator) -> f64 {
        self.g_spline.eval(psip, acc)
    }

    /// The poloidal current I(ψp).
    pub fn i(&self, psip: f64, acc: &mut Accelerator) -> f64 {
        self.i_spline.eval(psip, acc)
    }

    /// dg/dψp.
    pub fn dg_dpsip(&self, psip: f64, acc: &mut Accelerator) -> f64 {
        self.g_spline.d_dx(psip, acc)
    }

    /// dI/dψp.
    pub fn di_dpsip(&self, psip: f64, acc: &mut Accelerator) -> f64 {
        self.i_spline.d_dx(psip, acc)
    }

    pub fn psip_data(&self) -> Array1<f64> {
        self.g_spline.xa.clone()
    }

    pub fn g_data(&self) -> Array1<f64> {
        self.g_spline.ya.clone()
    }

    pub fn i_data(&self) -> Array1<f64> {
        self.i_spline.ya.clone()
    }
}

impl std::fmt::Debug for Currents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Currents")
            .field("typ", &self.typ)
            .field("len", &self.g_spline.xa.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::testing::constant_q_dataset;

    #[test]
    fn test_data_roundtrip() {
        let dataset = constant_q_dataset(2.0, 31, 17);
        let currents = Currents::from_dataset(&dataset, "cubic").unwrap();
        assert_eq!(currents.psip_data(), dataset.psip_data);
        assert_eq!(currents.g_data(), dataset.g_data);
        assert_eq!(currents.i_data(), dataset.i_data);
    }

    #[test]
    fn test_current_profiles_and_derivatives() {
        // g(ψp) = 1 + 0.2 ψp², I(ψp) = 0.05 ψp.
        let psip: Vec<f64> = Array1::linspace(0.0, 1.0, 81).to_vec();
        let g: Vec<f64> = psip.iter().map(|p| 1.0 + 0.2 * p * p).collect();
        let i: Vec<f64> = psip.iter().map(|p| 0.05 * p).collect();
        let currents = Currents::new(&psip, &g, &i, "cubic").unwrap();

        let mut acc = Accelerator::new();
        let p = 0.513;
        assert!((currents.g(p, &mut acc) - (1.0 + 0.2 * p * p)).abs() < 1e-8);
        assert!((currents.i(p, &mut acc) - 0.05 * p).abs() < 1e-10);
        assert!((currents.dg_dpsip(p, &mut acc) - 0.4 * p).abs() < 1e-6);
        assert!((currents.di_dpsip(p, &mut acc) - 0.05).abs() < 1e-8);
    }

    #[test]
    fn test_shared_accelerator_with_sibling_splines() {
        let dataset = constant_q_dataset(2.0, 51, 17);
        let currents = Currents::from_dataset(&dataset, "akima").unwrap();
        let mut acc = Accelerator::new();
        currents.g(0.21, &mut acc);
        currents.i(0.21, &mut acc);
        currents.dg_dpsip(0.21, &mut acc);
        currents.di_dpsip(0.21, &mut acc);
        assert_eq!(acc.searches(), 1, "siblings must reuse the interval hit");
    }
}
