// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, OrbitResult};

/// Initial conditions of a single guiding centre.
///
/// All quantities in normalized units; μ is a constant of motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInit {
    /// Initial time.
    pub time0: f64,
    /// Initial poloidal angle θ.
    pub theta0: f64,
    /// Initial poloidal flux ψp.
    pub psip0: f64,
    /// Initial parallel gyroradius ρ‖.
    pub rho0: f64,
    /// Initial toroidal angle ζ.
    pub zeta0: f64,
    /// Magnetic moment μ.
    pub mu: f64,
}

impl ParticleInit {
    pub fn new(theta0: f64, psip0: f64, rho0: f64, zeta0: f64, mu: f64) -> Self {
        Self {
            time0: 0.0,
            theta0,
            psip0,
            rho0,
            zeta0,
            mu,
        }
    }

    /// Rejects non-finite coordinates and negative μ.
    pub fn validate(&self) -> OrbitResult<()> {
        let fields = [
            ("time0", self.time0),
            ("theta0", self.theta0),
            ("psip0", self.psip0),
            ("rho0", self.rho0),
            ("zeta0", self.zeta0),
            ("mu", self.mu),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(OrbitError::MalformedInput(format!(
                    "initial condition {name} must be finite, got {value}"
                )));
            }
        }
        if self.mu < 0.0 {
            return Err(OrbitError::MalformedInput(format!(
                "magnetic moment must be >= 0, got {}",
                self.mu
            )));
        }
        Ok(())
    }
}

/// Array-of-arrays bundle of initial conditions for the parallel driver.
#[derive(Debug, Clone)]
pub struct InitSet {
    pub thetas: Array1<f64>,
    pub psips: Array1<f64>,
    pub rhos: Array1<f64>,
    pub zetas: Array1<f64>,
    pub mus: Array1<f64>,
}

impl InitSet {
    /// Builds the bundle, enforcing equal lengths and finite values.
    pub fn build(
        thetas: &[f64],
        psips: &[f64],
        rhos: &[f64],
        zetas: &[f64],
        mus: &[f64],
    ) -> OrbitResult<Self> {
        let len = thetas.len();
        let lens = [
            ("psips", psips.len()),
            ("rhos", rhos.len()),
            ("zetas", zetas.len()),
            ("mus", mus.len()),
        ];
        for (name, l) in lens {
            if l != len {
                return Err(OrbitError::ShapeMismatch(format!(
                    "initial condition arrays must have equal length: thetas={len}, {name}={l}"
                )));
            }
        }
        let set = Self {
            thetas: Array1::from_vec(thetas.to_vec()),
            psips: Array1::from_vec(psips.to_vec()),
            rhos: Array1::from_vec(rhos.to_vec()),
            zetas: Array1::from_vec(zetas.to_vec()),
            mus: Array1::from_vec(mus.to_vec()),
        };
        for index in 0..set.len() {
            set.get(index).validate()?;
        }
        Ok(set)
    }

    /// The `index`-th initial-condition set.
    pub fn get(&self, index: usize) -> ParticleInit {
        ParticleInit::new(
            self.thetas[index],
            self.psips[index],
            self.rhos[index],
            self.zetas[index],
            self.mus[index],
        )
    }

    pub fn len(&self) -> usize {
        self.thetas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thetas.is_empty()
    }
}

/// How a particle's integration ended.
///
/// Terminal statuses are recorded per particle and never abort a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    /// Ran to the requested end (time horizon, crossing count, or step budget).
    #[default]
    Completed,
    /// ψp left [0, ψp_wall].
    EscapedWall,
    /// The controller pushed the step below h_min.
    StepFloorReached,
    /// The state became non-finite.
    NonFinite,
    /// The shared stop flag was raised mid-run.
    Cancelled,
    /// A mapping's recorded angles failed the 2π spacing check.
    InvalidCrossings,
}

impl TerminalStatus {
    /// True for endings that leave a usable (possibly partial) record.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TerminalStatus::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_init_validate() {
        let init = ParticleInit::new(0.0, 0.1, 0.01, 0.0, 0.5);
        assert!(init.validate().is_ok());

        let bad = ParticleInit {
            psip0: f64::NAN,
            ..init
        };
        assert!(bad.validate().is_err());

        let bad = ParticleInit { mu: -1.0, ..init };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_init_set_build_and_index() {
        let set = InitSet::build(
            &[0.0, 0.1],
            &[0.05, 0.10],
            &[1e-3, 2e-3],
            &[0.0, 0.0],
            &[0.5, 0.5],
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        let p1 = set.get(1);
        assert!((p1.theta0 - 0.1).abs() < 1e-15);
        assert!((p1.psip0 - 0.10).abs() < 1e-15);
    }

    #[test]
    fn test_init_set_rejects_length_mismatch() {
        let err = InitSet::build(&[0.0, 0.1], &[0.05], &[1e-3, 2e-3], &[0.0, 0.0], &[0.5, 0.5])
            .unwrap_err();
        match err {
            OrbitError::ShapeMismatch(msg) => assert!(msg.contains("psips")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_init_set_rejects_non_finite_member() {
        let err = InitSet::build(
            &[0.0, 0.1],
            &[0.05, f64::INFINITY],
            &[1e-3, 2e-3],
            &[0.0, 0.0],
            &[0.5, 0.5],
        )
        .unwrap_err();
        match err {
            OrbitError::MalformedInput(msg) => assert!(msg.contains("psip0")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_recoverability() {
        assert!(TerminalStatus::Completed.is_recoverable());
        assert!(TerminalStatus::EscapedWall.is_recoverable());
        assert!(TerminalStatus::Cancelled.is_recoverable());
        assert!(!TerminalStatus::NonFinite.is_recoverable());
    }
}
