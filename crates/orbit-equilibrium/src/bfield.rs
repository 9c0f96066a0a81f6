// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Bfield
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::{Array1, Array2};
use orbit_math::{Accelerator, Spline2d};
use orbit_types::error::OrbitResult;

use crate::dataset::EquilibriumDataset;

/// Magnetic field strength B(ψp, θ) and flux-surface geometry R, Z.
///
/// θ queries are reduced modulo 2π before the lookup, so callers may hand in
/// the unwrapped running angle.
pub struct Bfield {
    /// 2D interpolation selector this component was built with.
    pub typ: String,
    b_spline: Spline2d,
    r_spline: Spline2d,
    z_spline: Spline2d,
    db_dpsip_grid: Array2<f64>,
    db_dtheta_grid: Array2<f64>,
    /// On-axis field strength [T].
    pub baxis: f64,
    /// Major radius of the magnetic axis [m].
    pub raxis: f64,
    /// Poloidal flux at the wall.
    pub psip_wall: f64,
    /// Toroidal flux at the wall.
    pub psi_wall: f64,
}

impl Bfield {
    /// Builds from a validated dataset.
    ///
    /// The ∂B/∂ψp and ∂B/∂θ grids come from the tabulated arrays when the
    /// dataset supplies them, otherwise from the field spline's derivative
    /// evaluated on the knots.
    pub fn from_dataset(dataset: &EquilibriumDataset, typ: &str) -> OrbitResult<Self> {
        let psip = dataset.psip_data.to_vec();
        let theta = dataset.theta_data.to_vec();

        let b_spline = Spline2d::from_name(typ, &psip, &theta, &dataset.b_data)?;
        let r_spline = Spline2d::from_name(typ, &psip, &theta, &dataset.r_data)?;
        let z_spline = Spline2d::from_name(typ, &psip, &theta, &dataset.z_data)?;

        let db_dpsip_grid = match &dataset.db_dpsip_data {
            Some(grid) => grid.clone(),
            None => derivative_grid(&b_spline, Axis2d::X),
        };
        let db_dtheta_grid = match &dataset.db_dtheta_data {
            Some(grid) => grid.clone(),
            None => derivative_grid(&b_spline, Axis2d::Y),
        };

        Ok(Self {
            typ: typ.into(),
            b_spline,
            r_spline,
            z_spline,
            db_dpsip_grid,
            db_dtheta_grid,
            baxis: dataset.baxis,
            raxis: dataset.raxis,
            psip_wall: dataset.psip_wall,
            psi_wall: dataset.psi_wall,
        })
    }

    /// B(ψp, θ).
    pub fn b(&self, psip: f64, theta: f64, xacc: &mut Accelerator, yacc: &mut Accelerator) -> f64 {
        self.b_spline.eval(psip, mod2pi(theta), xacc, yacc)
    }

    /// ∂B/∂ψp.
    pub fn db_dpsip(
        &self,
        psip: f64,
        theta: f64,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
    ) -> f64 {
        self.b_spline.d_dx(psip, mod2pi(theta), xacc, yacc)
    }

    /// ∂B/∂θ.
    pub fn db_dtheta(
        &self,
        psip: f64,
        theta: f64,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
    ) -> f64 {
        self.b_spline.d_dy(psip, mod2pi(theta), xacc, yacc)
    }

    /// ∂²B/∂ψp².
    pub fn d2b_dpsip2(
        &self,
        psip: f64,
        theta: f64,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
    ) -> f64 {
        self.b_spline.d2_dx2(psip, mod2pi(theta), xacc, yacc)
    }

    /// ∂²B/∂θ².
    pub fn d2b_dtheta2(
        &self,
        psip: f64,
        theta: f64,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
    ) -> f64 {
        self.b_spline.d2_dy2(psip, mod2pi(theta), xacc, yacc)
    }

    /// Mixed partial ∂²B/∂ψp∂θ.
    pub fn d2b_dpsip_dtheta(
        &self,
        psip: f64,
        theta: f64,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
    ) -> f64 {
        self.b_spline.d2_dx_dy(psip, mod2pi(theta), xacc, yacc)
    }

    /// Major-radius coordinate R(ψp, θ).
    pub fn r(&self, psip: f64, theta: f64, xacc: &mut Accelerator, yacc: &mut Accelerator) -> f64 {
        self.r_spline.eval(psip, mod2pi(theta), xacc, yacc)
    }

    /// Vertical coordinate Z(ψp, θ).
    pub fn z(&self, psip: f64, theta: f64, xacc: &mut Accelerator, yacc: &mut Accelerator) -> f64 {
        self.z_spline.eval(psip, mod2pi(theta), xacc, yacc)
    }

    pub fn psip_data(&self) -> Array1<f64> {
        self.b_spline.xa.clone()
    }

    pub fn theta_data(&self) -> Array1<f64> {
        self.b_spline.ya.clone()
    }

    pub fn b_data(&self) -> Array2<f64> {
        self.b_spline.za.clone()
    }

    pub fn r_data(&self) -> Array2<f64> {
        self.r_spline.za.clone()
    }

    pub fn z_data(&self) -> Array2<f64> {
        self.z_spline.za.clone()
    }

    /// The precomputed ∂B/∂ψp grid on the sample knots.
    pub fn db_dpsip_data(&self) -> Array2<f64> {
        self.db_dpsip_grid.clone()
    }

    /// The precomputed ∂B/∂θ grid on the sample knots.
    pub fn db_dtheta_data(&self) -> Array2<f64> {
        self.db_dtheta_grid.clone()
    }
}

enum Axis2d {
    X,
    Y,
}

/// Spline derivative evaluated on every grid knot.
fn derivative_grid(spline: &Spline2d, axis: Axis2d) -> Array2<f64> {
    let n = spline.xa.len();
    let m = spline.ya.len();
    let mut xacc = Accelerator::new();
    let mut yacc = Accelerator::new();
    Array2::from_shape_fn((n, m), |(i, j)| match axis {
        Axis2d::X => spline.d_dx(spline.xa[i], spline.ya[j], &mut xacc, &mut yacc),
        Axis2d::Y => spline.d_dy(spline.xa[i], spline.ya[j], &mut xacc, &mut yacc),
    })
}

/// Returns θ reduced to [0, 2π).
fn mod2pi(theta: f64) -> f64 {
    theta.rem_euclid(std::f64::consts::TAU)
}

impl std::fmt::Debug for Bfield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bfield")
            .field("typ", &self.typ)
            .field("baxis [T]", &format!("{:.7}", self.baxis))
            .field("raxis [m]", &format!("{:.7}", self.raxis))
            .field("psip_wall", &format!("{:.7}", self.psip_wall))
            .field("shape", &(self.b_spline.xa.len(), self.b_spline.ya.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use std::f64::consts::TAU;

    /// B(ψp, θ) = 1 + 0.3·ψp·cos θ, the textbook large-aspect-ratio form.
    fn cosine_dataset(n: usize, m: usize) -> EquilibriumDataset {
        let mut dataset = crate::dataset::testing::constant_q_dataset(2.0, n, m);
        let psip = dataset.psip_data.clone();
        let theta = dataset.theta_data.clone();
        dataset.b_data =
            Array2::from_shape_fn((n, m), |(i, j)| 1.0 + 0.3 * psip[i] * theta[j].cos());
        dataset
    }

    #[test]
    fn test_data_roundtrip() {
        let dataset = cosine_dataset(21, 41);
        let bfield = Bfield::from_dataset(&dataset, "bicubic").unwrap();
        assert_eq!(bfield.psip_data(), dataset.psip_data);
        assert_eq!(bfield.theta_data(), dataset.theta_data);
        assert_eq!(bfield.b_data(), dataset.b_data);
        assert_eq!(bfield.r_data(), dataset.r_data);
        assert_eq!(bfield.z_data(), dataset.z_data);
        assert_eq!(bfield.db_dpsip_data().dim(), (21, 41));
        assert_eq!(bfield.db_dtheta_data().dim(), (21, 41));
    }

    #[test]
    fn test_field_and_partials() {
        let dataset = cosine_dataset(41, 181);
        let bfield = Bfield::from_dataset(&dataset, "bicubic").unwrap();
        let mut xacc = Accelerator::new();
        let mut yacc = Accelerator::new();

        let (psip, theta) = (0.25, 1.1);
        let b = bfield.b(psip, theta, &mut xacc, &mut yacc);
        assert!(
            (b - (1.0 + 0.3 * psip * theta.cos())).abs() < 1e-6,
            "B({psip}, {theta}) = {b}"
        );
        let db_dpsip = bfield.db_dpsip(psip, theta, &mut xacc, &mut yacc);
        assert!(
            (db_dpsip - 0.3 * theta.cos()).abs() < 1e-5,
            "dB/dψp = {db_dpsip}"
        );
        let db_dtheta = bfield.db_dtheta(psip, theta, &mut xacc, &mut yacc);
        assert!(
            (db_dtheta + 0.3 * psip * theta.sin()).abs() < 1e-5,
            "dB/dθ = {db_dtheta}"
        );
        let mixed = bfield.d2b_dpsip_dtheta(psip, theta, &mut xacc, &mut yacc);
        assert!((mixed + 0.3 * theta.sin()).abs() < 1e-4, "∂²B/∂ψp∂θ = {mixed}");
    }

    #[test]
    fn test_theta_lookup_wraps() {
        let dataset = cosine_dataset(21, 101);
        let bfield = Bfield::from_dataset(&dataset, "bicubic").unwrap();
        let mut xacc = Accelerator::new();
        let mut yacc = Accelerator::new();
        let inside = bfield.b(0.2, 1.0, &mut xacc, &mut yacc);
        let wrapped = bfield.b(0.2, 1.0 + 3.0 * TAU, &mut xacc, &mut yacc);
        assert!(
            (inside - wrapped).abs() < 1e-9,
            "θ must wrap: {inside} vs {wrapped}"
        );
    }

    #[test]
    fn test_tabulated_derivative_grids_take_precedence() {
        let mut dataset = cosine_dataset(21, 41);
        let marker = Array2::from_elem((21, 41), 42.0);
        dataset.db_dpsip_data = Some(marker.clone());
        let bfield = Bfield::from_dataset(&dataset, "bicubic").unwrap();
        assert_eq!(bfield.db_dpsip_data(), marker);
        // The θ grid was not supplied, so it falls back to the spline.
        let db_dtheta = bfield.db_dtheta_data();
        assert!((db_dtheta[[10, 20]]).abs() < 10.0);
    }

    #[test]
    fn test_derivative_grid_matches_analytic_field() {
        let dataset = cosine_dataset(41, 181);
        let bfield = Bfield::from_dataset(&dataset, "bicubic").unwrap();
        let grid = bfield.db_dtheta_data();
        let psip = Array1::linspace(0.0, 0.5, 41);
        let theta = Array1::linspace(0.0, TAU, 181);
        for i in (5..36).step_by(6) {
            for j in (10..170).step_by(31) {
                let expected = -0.3 * psip[i] * theta[j].sin();
                assert!(
                    (grid[[i, j]] - expected).abs() < 1e-4,
                    "∂B/∂θ at knot ({i}, {j}): {} vs {expected}",
                    grid[[i, j]]
                );
            }
        }
    }
}
