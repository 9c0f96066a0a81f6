// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Dataset
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::{Array1, Array2};
use orbit_types::constants::PSI_AXIS_TOL;
use orbit_types::error::{OrbitError, OrbitResult};

/// One perturbation harmonic as read from the equilibrium file.
#[derive(Debug, Clone)]
pub struct HarmonicSpec {
    /// Poloidal mode number m.
    pub m: f64,
    /// Toroidal mode number n.
    pub n: f64,
    /// Scalar phase φ₀, used when no phase array is supplied.
    pub phase: f64,
    /// Amplitude samples a(ψp) over `psip_data`.
    pub a_data: Array1<f64>,
    /// Optional phase samples φ(ψp) over `psip_data`.
    pub phase_data: Option<Array1<f64>>,
    /// Rotation frequency ω of the linear explicit time dependence.
    pub omega: f64,
}

/// The numeric content of one equilibrium file, already read into arrays.
///
/// The core never touches the file format itself; an external collaborator
/// hands these arrays over and `validate` decides whether they constitute a
/// usable equilibrium.
#[derive(Debug, Clone)]
pub struct EquilibriumDataset {
    /// Poloidal flux abscissa, strictly increasing, length N.
    pub psip_data: Array1<f64>,
    /// q-factor samples, length N.
    pub q_data: Array1<f64>,
    /// Toroidal flux samples, length N, ψ(0) = 0.
    pub psi_data: Array1<f64>,
    /// Toroidal current samples g(ψp), length N.
    pub g_data: Array1<f64>,
    /// Poloidal current samples I(ψp), length N.
    pub i_data: Array1<f64>,
    /// Poloidal angle grid, strictly increasing, length M, one period.
    pub theta_data: Array1<f64>,
    /// Field strength grid, shape (N, M).
    pub b_data: Array2<f64>,
    /// Major-radius coordinate grid, shape (N, M).
    pub r_data: Array2<f64>,
    /// Vertical coordinate grid, shape (N, M).
    pub z_data: Array2<f64>,
    /// Optional tabulated ∂B/∂ψp grid, shape (N, M).
    pub db_dpsip_data: Option<Array2<f64>>,
    /// Optional tabulated ∂B/∂θ grid, shape (N, M).
    pub db_dtheta_data: Option<Array2<f64>>,
    /// Poloidal flux at the wall.
    pub psip_wall: f64,
    /// Toroidal flux at the wall.
    pub psi_wall: f64,
    /// On-axis field strength [T].
    pub baxis: f64,
    /// Major radius of the magnetic axis [m].
    pub raxis: f64,
    /// Perturbation harmonics, possibly empty.
    pub harmonics: Vec<HarmonicSpec>,
}

impl EquilibriumDataset {
    /// Number of flux-surface samples N.
    pub fn n_psip(&self) -> usize {
        self.psip_data.len()
    }

    /// Number of poloidal-angle samples M.
    pub fn n_theta(&self) -> usize {
        self.theta_data.len()
    }

    /// Full validation pass over all arrays and scalars.
    pub fn validate(&self) -> OrbitResult<()> {
        let n = self.n_psip();
        let m = self.n_theta();
        if n < 2 {
            return Err(OrbitError::MalformedInput(format!(
                "psip_data needs at least 2 samples, got {n}"
            )));
        }
        if m < 2 {
            return Err(OrbitError::MalformedInput(format!(
                "theta_data needs at least 2 samples, got {m}"
            )));
        }

        for (name, array) in [
            ("q_data", &self.q_data),
            ("psi_data", &self.psi_data),
            ("g_data", &self.g_data),
            ("i_data", &self.i_data),
        ] {
            if array.len() != n {
                return Err(OrbitError::ShapeMismatch(format!(
                    "{name} has length {}, expected N = {n}",
                    array.len()
                )));
            }
        }

        let mut grids: Vec<(&str, &Array2<f64>)> = vec![
            ("b_data", &self.b_data),
            ("r_data", &self.r_data),
            ("z_data", &self.z_data),
        ];
        if let Some(grid) = &self.db_dpsip_data {
            grids.push(("db_dpsip_data", grid));
        }
        if let Some(grid) = &self.db_dtheta_data {
            grids.push(("db_dtheta_data", grid));
        }
        for (name, grid) in &grids {
            if grid.dim() != (n, m) {
                return Err(OrbitError::ShapeMismatch(format!(
                    "{name} has shape {:?}, expected ({n}, {m})",
                    grid.dim()
                )));
            }
        }

        self.check_finite()?;

        if let Some(i) = (1..n).find(|&i| self.psip_data[i] <= self.psip_data[i - 1]) {
            return Err(OrbitError::NonMonotone(format!(
                "psip_data[{i}] = {} does not exceed psip_data[{}] = {}",
                self.psip_data[i],
                i - 1,
                self.psip_data[i - 1]
            )));
        }
        if let Some(i) = (1..m).find(|&i| self.theta_data[i] <= self.theta_data[i - 1]) {
            return Err(OrbitError::NonMonotone(format!(
                "theta_data[{i}] is not strictly increasing"
            )));
        }

        if self.psi_data[0].abs() > PSI_AXIS_TOL {
            return Err(OrbitError::MalformedInput(format!(
                "psi_data must vanish on the magnetic axis, got psi(0) = {}",
                self.psi_data[0]
            )));
        }

        for (index, harmonic) in self.harmonics.iter().enumerate() {
            if harmonic.a_data.len() != n {
                return Err(OrbitError::ShapeMismatch(format!(
                    "harmonic[{index}] a_data has length {}, expected N = {n}",
                    harmonic.a_data.len()
                )));
            }
            if let Some(phase_data) = &harmonic.phase_data {
                if phase_data.len() != n {
                    return Err(OrbitError::ShapeMismatch(format!(
                        "harmonic[{index}] phase_data has length {}, expected N = {n}",
                        phase_data.len()
                    )));
                }
            }
            for (name, value) in [
                ("m", harmonic.m),
                ("n", harmonic.n),
                ("phase", harmonic.phase),
                ("omega", harmonic.omega),
            ] {
                if !value.is_finite() {
                    return Err(OrbitError::MalformedInput(format!(
                        "harmonic[{index}].{name} must be finite, got {value}"
                    )));
                }
            }
        }

        Ok(())
    }

    fn check_finite(&self) -> OrbitResult<()> {
        let arrays_1d = [
            ("psip_data", &self.psip_data),
            ("q_data", &self.q_data),
            ("psi_data", &self.psi_data),
            ("g_data", &self.g_data),
            ("i_data", &self.i_data),
            ("theta_data", &self.theta_data),
        ];
        for (name, array) in arrays_1d {
            if array.iter().any(|v| !v.is_finite()) {
                return Err(OrbitError::MalformedInput(format!(
                    "{name} contains a non-finite sample"
                )));
            }
        }
        for (name, grid) in [
            ("b_data", Some(&self.b_data)),
            ("r_data", Some(&self.r_data)),
            ("z_data", Some(&self.z_data)),
            ("db_dpsip_data", self.db_dpsip_data.as_ref()),
            ("db_dtheta_data", self.db_dtheta_data.as_ref()),
        ] {
            if let Some(grid) = grid {
                if grid.iter().any(|v| !v.is_finite()) {
                    return Err(OrbitError::MalformedInput(format!(
                        "{name} contains a non-finite sample"
                    )));
                }
            }
        }
        for (name, value) in [
            ("psip_wall", self.psip_wall),
            ("psi_wall", self.psi_wall),
            ("baxis", self.baxis),
            ("raxis", self.raxis),
        ] {
            if !value.is_finite() {
                return Err(OrbitError::MalformedInput(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        for (index, harmonic) in self.harmonics.iter().enumerate() {
            if harmonic.a_data.iter().any(|v| !v.is_finite()) {
                return Err(OrbitError::MalformedInput(format!(
                    "harmonic[{index}].a_data contains a non-finite sample"
                )));
            }
            if let Some(phase_data) = &harmonic.phase_data {
                if phase_data.iter().any(|v| !v.is_finite()) {
                    return Err(OrbitError::MalformedInput(format!(
                        "harmonic[{index}].phase_data contains a non-finite sample"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use ndarray::{Array1, Array2};

    /// Analytic dataset with q(ψp) = q0, g = 1, I = 0, B = 1 and no
    /// harmonics: the constant-q benchmark equilibrium.
    pub fn constant_q_dataset(q0: f64, n: usize, m: usize) -> EquilibriumDataset {
        let psip_wall = 0.5;
        let psip_data = Array1::linspace(0.0, psip_wall, n);
        let theta_data = Array1::linspace(0.0, std::f64::consts::TAU, m);
        EquilibriumDataset {
            q_data: Array1::from_elem(n, q0),
            psi_data: psip_data.mapv(|p| q0 * p),
            g_data: Array1::from_elem(n, 1.0),
            i_data: Array1::zeros(n),
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
            theta_data,
        }
    }
}
