// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Harmonic
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array1;
use orbit_math::{Accelerator, Spline1d};
use orbit_types::config::PhaseMode;
use orbit_types::error::{OrbitError, OrbitResult};

use crate::dataset::HarmonicSpec;

/// Phase model of one harmonic.
enum Phase {
    /// Fixed φ₀, no explicit time dependence.
    Constant(f64),
    /// φ(ψp, t) = spline(ψp) + ω·t.
    Interpolated { spline: Spline1d, omega: f64 },
}

/// One perturbation harmonic h(ψp, θ, ζ, t) = a(ψp)·cos(mθ − nζ + φ).
pub struct Harmonic {
    /// Poloidal mode number m.
    pub m: f64,
    /// Toroidal mode number n.
    pub n: f64,
    a_spline: Spline1d,
    phase: Phase,
    /// Largest amplitude sample.
    pub amax: f64,
}

/// Value and all four partial derivatives of a harmonic (or their sum over a
/// perturbation) at one phase-space point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HarmonicTerms {
    pub h: f64,
    pub dh_dpsip: f64,
    pub dh_dtheta: f64,
    pub dh_dzeta: f64,
    pub dh_dt: f64,
}

impl HarmonicTerms {
    pub fn accumulate(&mut self, other: &HarmonicTerms) {
        self.h += other.h;
        self.dh_dpsip += other.dh_dpsip;
        self.dh_dtheta += other.dh_dtheta;
        self.dh_dzeta += other.dh_dzeta;
        self.dh_dt += other.dh_dt;
    }
}

impl Harmonic {
    /// Builds one harmonic from its file spec.
    ///
    /// In `Constant` mode the phase is the mean of the supplied phase array,
    /// or the scalar phase when no array is present. `Interpolated` mode
    /// requires the phase array.
    pub fn from_spec(
        psip_data: &[f64],
        spec: &HarmonicSpec,
        typ: &str,
        mode: PhaseMode,
    ) -> OrbitResult<Self> {
        let a_data = spec.a_data.to_vec();
        let a_spline = Spline1d::from_name(typ, psip_data, &a_data)?;
        let amax = a_data.iter().fold(f64::NEG_INFINITY, |m, v| m.max(*v));

        let phase = match mode {
            PhaseMode::Constant => {
                let phi = match &spec.phase_data {
                    Some(samples) => samples.mean().unwrap_or(spec.phase),
                    None => spec.phase,
                };
                Phase::Constant(phi.rem_euclid(std::f64::consts::TAU))
            }
            PhaseMode::Interpolated => {
                let samples = spec.phase_data.as_ref().ok_or_else(|| {
                    OrbitError::MalformedInput(
                        "phase-interpolated harmonic needs a phase array".to_string(),
                    )
                })?;
                Phase::Interpolated {
                    spline: Spline1d::from_name(typ, psip_data, &samples.to_vec())?,
                    omega: spec.omega,
                }
            }
        };

        Ok(Self {
            m: spec.m,
            n: spec.n,
            a_spline,
            phase,
            amax,
        })
    }

    /// Evaluates the harmonic and its four derivatives in one pass: one
    /// amplitude-spline lookup and one sin/cos pair per call.
    pub fn terms(
        &self,
        psip: f64,
        theta: f64,
        zeta: f64,
        time: f64,
        acc: &mut Accelerator,
    ) -> HarmonicTerms {
        let a = self.a_spline.eval(psip, acc);
        let da_dpsip = self.a_spline.d_dx(psip, acc);

        let (phi, dphi_dpsip, omega) = match &self.phase {
            Phase::Constant(phi) => (*phi, 0.0, 0.0),
            Phase::Interpolated { spline, omega } => (
                spline.eval(psip, acc) + omega * time,
                spline.d_dx(psip, acc),
                *omega,
            ),
        };

        let (sin, cos) = (self.m * theta - self.n * zeta + phi).sin_cos();
        HarmonicTerms {
            h: a * cos,
            dh_dpsip: da_dpsip * cos - a * dphi_dpsip * sin,
            dh_dtheta: -self.m * a * sin,
            dh_dzeta: self.n * a * sin,
            dh_dt: -omega * a * sin,
        }
    }

    /// The ψp abscissa of the amplitude samples.
    pub fn psip_data(&self) -> Array1<f64> {
        self.a_spline.xa.clone()
    }

    /// The amplitude samples a(ψp).
    pub fn a_data(&self) -> Array1<f64> {
        self.a_spline.ya.clone()
    }
}

impl std::fmt::Debug for Harmonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match &self.phase {
            Phase::Constant(phi) => format!("constant({phi:.4})"),
            Phase::Interpolated { omega, .. } => format!("interpolated(ω = {omega:.4})"),
        };
        f.debug_struct("Harmonic")
            .field("m", &self.m)
            .field("n", &self.n)
            .field("phase", &mode)
            .field("amax", &self.amax)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn gaussian_spec(n: usize, m: f64, nn: f64, phase: f64) -> (Vec<f64>, HarmonicSpec) {
        let psip_wall = 0.5;
        let psip: Vec<f64> = Array1::linspace(0.0, psip_wall, n).to_vec();
        let mu = psip_wall / 2.0;
        let sigma = psip_wall / 4.0;
        let a: Vec<f64> = psip
            .iter()
            .map(|p| 2e-2 * (-(p - mu) * (p - mu) / (2.0 * sigma * sigma)).exp())
            .collect();
        (
            psip.clone(),
            HarmonicSpec {
                m,
                n: nn,
                phase,
                a_data: Array1::from_vec(a),
                phase_data: None,
                omega: 0.0,
            },
        )
    }

    #[test]
    fn test_constant_phase_value_and_derivatives() {
        let (psip, spec) = gaussian_spec(101, 3.0, 2.0, 0.7);
        let harmonic = Harmonic::from_spec(&psip, &spec, "akima", PhaseMode::Constant).unwrap();
        let mut acc = Accelerator::new();

        let (p, theta, zeta, t) = (0.22, 1.3, 0.4, 5.0);
        let terms = harmonic.terms(p, theta, zeta, t, &mut acc);

        let arg = 3.0 * theta - 2.0 * zeta + 0.7;
        assert!(terms.h.abs() <= harmonic.amax + 1e-12);
        // h = a·cos and dh/dθ = -m·a·sin share the amplitude, so
        // dh/dθ = -m·tan(arg)·h away from the cosine zeros.
        assert!(
            (terms.dh_dtheta - (-3.0) * arg.tan() * terms.h).abs() < 1e-9,
            "dθ derivative must carry the -m·a·sin factor"
        );
        assert!(
            (terms.dh_dzeta - 2.0 * arg.tan() * terms.h).abs() < 1e-9,
            "dζ derivative must carry the +n·a·sin factor"
        );
        assert_eq!(terms.dh_dt, 0.0, "constant phase has no time dependence");
    }

    #[test]
    fn test_dh_dpsip_matches_finite_difference() {
        let (psip, spec) = gaussian_spec(201, 2.0, 1.0, 0.0);
        let harmonic = Harmonic::from_spec(&psip, &spec, "cubic", PhaseMode::Constant).unwrap();
        let mut acc = Accelerator::new();

        let (theta, zeta, t) = (0.9, 0.3, 0.0);
        let eps = 1e-7;
        for &p in &[0.1, 0.25, 0.4] {
            let hi = harmonic.terms(p + eps, theta, zeta, t, &mut acc).h;
            let lo = harmonic.terms(p - eps, theta, zeta, t, &mut acc).h;
            let fd = (hi - lo) / (2.0 * eps);
            let terms = harmonic.terms(p, theta, zeta, t, &mut acc);
            assert!(
                (terms.dh_dpsip - fd).abs() < 1e-6,
                "dh/dψp at {p}: analytic {}, FD {fd}",
                terms.dh_dpsip
            );
        }
    }

    #[test]
    fn test_interpolated_phase_time_dependence() {
        let (psip, mut spec) = gaussian_spec(101, 3.0, 2.0, 0.0);
        let phase_samples: Vec<f64> = psip.iter().map(|p| 0.5 + 0.2 * p).collect();
        spec.phase_data = Some(Array1::from_vec(phase_samples));
        spec.omega = 1.5;
        let harmonic = Harmonic::from_spec(&psip, &spec, "cubic", PhaseMode::Interpolated).unwrap();
        let mut acc = Accelerator::new();

        let (p, theta, zeta) = (0.2, 0.8, 0.1);
        let terms = harmonic.terms(p, theta, zeta, 2.0, &mut acc);

        // dh/dt = -ω·a·sin(...) exactly.
        let eps = 1e-7;
        let hi = harmonic.terms(p, theta, zeta, 2.0 + eps, &mut acc).h;
        let lo = harmonic.terms(p, theta, zeta, 2.0 - eps, &mut acc).h;
        let fd = (hi - lo) / (2.0 * eps);
        assert!(
            (terms.dh_dt - fd).abs() < 1e-6,
            "dh/dt: analytic {}, FD {fd}",
            terms.dh_dt
        );

        // dh/dψp now carries the phase-slope term too.
        let hi = harmonic.terms(p + eps, theta, zeta, 2.0, &mut acc).h;
        let lo = harmonic.terms(p - eps, theta, zeta, 2.0, &mut acc).h;
        let fd = (hi - lo) / (2.0 * eps);
        assert!(
            (terms.dh_dpsip - fd).abs() < 1e-6,
            "dh/dψp with phase slope: analytic {}, FD {fd}",
            terms.dh_dpsip
        );
    }

    #[test]
    fn test_interpolated_mode_requires_phase_array() {
        let (psip, spec) = gaussian_spec(101, 3.0, 2.0, 0.0);
        let err = Harmonic::from_spec(&psip, &spec, "cubic", PhaseMode::Interpolated).unwrap_err();
        assert!(matches!(err, OrbitError::MalformedInput(_)));
    }

    #[test]
    fn test_constant_mode_averages_phase_array() {
        let (psip, mut spec) = gaussian_spec(101, 1.0, 1.0, 0.0);
        spec.phase_data = Some(Array1::from_vec(vec![0.4; 101]));
        let averaged = Harmonic::from_spec(&psip, &spec, "cubic", PhaseMode::Constant).unwrap();

        // A scalar phase equal to the array mean must give the same harmonic.
        spec.phase_data = None;
        spec.phase = 0.4;
        let scalar = Harmonic::from_spec(&psip, &spec, "cubic", PhaseMode::Constant).unwrap();

        let mut acc = Accelerator::new();
        for &(p, theta, zeta) in &[(0.1, 0.0, 0.0), (0.25, 1.2, 0.7), (0.4, TAU - 0.1, 2.0)] {
            let lhs = averaged.terms(p, theta, zeta, 0.0, &mut acc);
            let rhs = scalar.terms(p, theta, zeta, 0.0, &mut acc);
            assert!(
                (lhs.h - rhs.h).abs() < 1e-12,
                "averaged vs scalar phase at ({p}, {theta}, {zeta})"
            );
        }
    }
}
