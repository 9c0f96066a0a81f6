// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Mapping
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Poincaré surface-of-section mapping via Hénon's trick.
//!
//! After an accepted step brackets the section plane, the independent
//! variable is swapped from t to the monitored angle (the whole RHS divided
//! by its time derivative) and one reduced RKF4(5) step of exactly the
//! remaining angular distance lands on Σ without bisection. Integration then
//! resumes from the pre-swap state so event alignment never feeds back into
//! the trajectory.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};

use orbit_equilibrium::Equilibrium;
use orbit_types::config::{EventDirection, OrbitConfig};
use orbit_types::error::{OrbitError, OrbitResult};
use orbit_types::state::TerminalStatus;

use crate::particle::Particle;
use crate::rkf45::{fehlberg_pair, Stepper, TryStep};
use crate::state::{EvalScratch, OrbitState};

/// Which angle defines the surface of section Σ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoincareSection {
    /// Σ: θ = α.
    ConstTheta,
    /// Σ: ζ = α.
    ConstZeta,
}

impl PoincareSection {
    /// Parses the `"theta" | "zeta"` selector.
    pub fn from_name(name: &str) -> OrbitResult<Self> {
        match name.to_lowercase().as_str() {
            "theta" => Ok(Self::ConstTheta),
            "zeta" => Ok(Self::ConstZeta),
            _ => Err(OrbitError::ConfigError(format!(
                "section must be 'theta' or 'zeta', got '{name}'"
            ))),
        }
    }
}

/// Parameters of one Poincaré map run.
#[derive(Debug, Clone, Copy)]
pub struct MappingParameters {
    /// The monitored angle.
    pub section: PoincareSection,
    /// The section constant, reduced to [0, 2π) at construction.
    pub alpha: f64,
    /// Number of crossings to record per particle.
    pub intersections: usize,
}

impl MappingParameters {
    pub fn new(section: PoincareSection, alpha: f64, intersections: usize) -> OrbitResult<Self> {
        if !alpha.is_finite() {
            return Err(OrbitError::ConfigError(format!(
                "section constant must be finite, got {alpha}"
            )));
        }
        if intersections == 0 {
            return Err(OrbitError::ConfigError(
                "intersections must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            section,
            alpha: alpha.rem_euclid(TAU),
            intersections,
        })
    }

    /// Builds from the string selector used by external callers.
    pub fn from_name(section: &str, alpha: f64, intersections: usize) -> OrbitResult<Self> {
        Self::new(PoincareSection::from_name(section)?, alpha, intersections)
    }
}

/// Runs the mapping loop until `intersections` crossings are stored or a
/// termination condition fires. Leaves the particle's final state set.
pub(crate) fn map_integrate(
    particle: &mut Particle,
    eq: &Equilibrium,
    config: &OrbitConfig,
    params: &MappingParameters,
    stop: Option<&AtomicBool>,
    scratch: &mut EvalScratch,
) -> TerminalStatus {
    let mut stepper = Stepper::new(config);
    let mut state1 = particle.initial_state;

    loop {
        if particle.crossings.len() >= params.intersections {
            particle.final_state = state1;
            return TerminalStatus::Completed;
        }
        if particle.evolution.steps >= config.max_steps {
            particle.final_state = state1;
            return TerminalStatus::Completed;
        }
        if let Some(flag) = stop {
            if flag.load(Ordering::Relaxed) {
                particle.final_state = state1;
                return TerminalStatus::Cancelled;
            }
        }
        if !(0.0..=eq.psip_wall).contains(&state1.psip) {
            particle.final_state = state1;
            return TerminalStatus::EscapedWall;
        }

        let state2 = match stepper.try_advance(&state1, eq, scratch) {
            TryStep::Accepted(next) => {
                particle.evolution.steps += 1;
                next
            }
            TryStep::Rejected => {
                particle.evolution.steps += 1;
                continue;
            }
            TryStep::FloorReached => {
                particle.final_state = state1;
                return TerminalStatus::StepFloorReached;
            }
            TryStep::NonFinite => {
                particle.final_state = state1;
                return TerminalStatus::NonFinite;
            }
        };

        let (old_angle, new_angle) = match params.section {
            PoincareSection::ConstTheta => (state1.theta, state2.theta),
            PoincareSection::ConstZeta => (state1.zeta, state2.zeta),
        };
        if crossed(old_angle, new_angle, params.alpha)
            && direction_allowed(config.event_direction, old_angle, new_angle)
        {
            let mut intersection = henon_step(&state1, new_angle > old_angle, params, eq, scratch);
            intersection.evaluate(eq, scratch);
            if !intersection.is_finite() {
                particle.final_state = state1;
                return TerminalStatus::NonFinite;
            }
            match params.section {
                PoincareSection::ConstTheta => particle.crossings.push(
                    intersection.zeta,
                    intersection.psip,
                    intersection.theta,
                ),
                PoincareSection::ConstZeta => particle.crossings.push(
                    intersection.theta,
                    intersection.psi,
                    intersection.zeta,
                ),
            }
        }

        // Continue from the pre-swap accepted state: restarting from the
        // event state would re-detect the same crossing and accumulate
        // event-alignment error into the trajectory.
        state1 = state2;
    }
}

/// Bracket test on the periodic distance to the section plane.
///
/// The half-angle sine changes sign exactly at x ≡ α (mod 2π); `<=` keeps
/// the α = 0 plane detectable, where the sine of an exactly-zero argument
/// underflows to 0.
fn crossed(old_angle: f64, new_angle: f64, alpha: f64) -> bool {
    ((new_angle - alpha) / 2.0).sin() * ((old_angle - alpha) / 2.0).sin() <= 0.0
}

fn direction_allowed(direction: EventDirection, old_angle: f64, new_angle: f64) -> bool {
    match direction {
        EventDirection::Any => true,
        EventDirection::Ascending => new_angle > old_angle,
        EventDirection::Descending => new_angle < old_angle,
    }
}

/// Signed angular distance from `x_old` to the next α-plane in the travel
/// direction. Always within one period.
fn section_distance(x_old: f64, alpha: f64, ascending: bool) -> f64 {
    let delta = (alpha - x_old).rem_euclid(TAU);
    if delta == 0.0 {
        0.0
    } else if ascending {
        delta
    } else {
        delta - TAU
    }
}

/// One reduced RKF4(5) step with the monitored angle as independent
/// variable, landing exactly on Σ. Returns the unevaluated landing state.
///
/// The swap divides by the monitored angle's time derivative, which has a
/// pole where that derivative vanishes (banana tips). Such a landing goes
/// non-finite and the caller terminates the particle.
/// TODO: regularize the swap near the pole instead of terminating.
fn henon_step(
    state1: &OrbitState,
    ascending: bool,
    params: &MappingParameters,
    eq: &Equilibrium,
    scratch: &mut EvalScratch,
) -> OrbitState {
    let mu = state1.mu;
    match params.section {
        PoincareSection::ConstTheta => {
            let dx = section_distance(state1.theta, params.alpha, ascending);
            let kappa = 1.0 / state1.theta_dot;
            let u0 = [state1.time, state1.psip, state1.rho, state1.zeta];
            let k1 = [
                kappa,
                kappa * state1.psip_dot,
                kappa * state1.rho_dot,
                kappa * state1.zeta_dot,
            ];
            let (u5, _) = fehlberg_pair(state1.theta, &u0, dx, &k1, |theta, u, out| {
                let mut stage = OrbitState::new(u[0], theta, u[1], u[2], u[3], mu);
                stage.evaluate(eq, scratch);
                let kappa = 1.0 / stage.theta_dot;
                *out = [
                    kappa,
                    kappa * stage.psip_dot,
                    kappa * stage.rho_dot,
                    kappa * stage.zeta_dot,
                ];
            });
            OrbitState::new(u5[0], state1.theta + dx, u5[1], u5[2], u5[3], mu)
        }
        PoincareSection::ConstZeta => {
            let dx = section_distance(state1.zeta, params.alpha, ascending);
            let kappa = 1.0 / state1.zeta_dot;
            let u0 = [state1.theta, state1.psip, state1.rho, state1.time];
            let k1 = [
                kappa * state1.theta_dot,
                kappa * state1.psip_dot,
                kappa * state1.rho_dot,
                kappa,
            ];
            let (u5, _) = fehlberg_pair(state1.zeta, &u0, dx, &k1, |zeta, u, out| {
                let mut stage = OrbitState::new(u[3], u[0], u[1], u[2], zeta, mu);
                stage.evaluate(eq, scratch);
                let kappa = 1.0 / stage.zeta_dot;
                *out = [
                    kappa * stage.theta_dot,
                    kappa * stage.psip_dot,
                    kappa * stage.rho_dot,
                    kappa,
                ];
            });
            OrbitState::new(u5[3], u5[0], u5[1], u5[2], state1.zeta + dx, mu)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_crossed_brackets_the_plane() {
        let eps = 1e-12;

        assert!(crossed(1.0 - eps, 1.0 + eps, 1.0));
        assert!(crossed(1.0f64.next_down(), 1.0f64.next_up(), 1.0));
        assert!(!crossed(1.0 - eps, 1.0 - 2.0 * eps, 1.0));
        assert!(!crossed(1.0 + eps, 1.0 + 2.0 * eps, 1.0));

        // Periodic images of the plane are the same plane.
        assert!(crossed(
            (TAU + PI).next_down(),
            (TAU + PI).next_up(),
            PI
        ));
        assert!(crossed(TAU.next_down(), TAU.next_up(), TAU));
        assert!(crossed(0.0 - eps, 0.0 + eps, 0.0));

        // Far-away planes are not crossed.
        assert!(!crossed(TAU - eps, TAU + eps, PI));
        assert!(!crossed(PI - eps, PI + eps, PI / 2.0));
    }

    #[test]
    fn test_section_distance_small_in_travel_direction() {
        // Ascending through the wrap: θ = 6.2 heading to α = 0.05.
        let dx = section_distance(6.2, 0.05, true);
        assert!(dx > 0.0 && dx < 0.2, "wrap-ascending distance: {dx}");
        assert!(((6.2 + dx) % TAU - 0.05).abs() < 1e-12);

        // Descending just past the plane.
        let dx = section_distance(0.1, TAU - 0.1, false);
        assert!(dx < 0.0 && dx > -0.3, "descending distance: {dx}");

        // Ascending, plane ahead in the same period.
        let dx = section_distance(1.0, 1.5, true);
        assert!((dx - 0.5).abs() < 1e-12);

        // Already on the plane.
        assert_eq!(section_distance(3.0, 3.0, true), 0.0);
        assert_eq!(section_distance(3.0, 3.0, false), 0.0);
    }

    #[test]
    fn test_direction_filter() {
        assert!(direction_allowed(EventDirection::Any, 1.0, 0.5));
        assert!(direction_allowed(EventDirection::Ascending, 0.5, 1.0));
        assert!(!direction_allowed(EventDirection::Ascending, 1.0, 0.5));
        assert!(direction_allowed(EventDirection::Descending, 1.0, 0.5));
        assert!(!direction_allowed(EventDirection::Descending, 0.5, 1.0));
    }

    #[test]
    fn test_parameter_validation() {
        assert!(MappingParameters::from_name("theta", 0.0, 5).is_ok());
        assert!(MappingParameters::from_name("zeta", -1.0, 1).is_ok());
        assert!(matches!(
            MappingParameters::from_name("phi", 0.0, 5).unwrap_err(),
            OrbitError::ConfigError(_)
        ));
        assert!(matches!(
            MappingParameters::from_name("theta", 0.0, 0).unwrap_err(),
            OrbitError::ConfigError(_)
        ));
        assert!(MappingParameters::new(PoincareSection::ConstTheta, f64::NAN, 3).is_err());

        // α is reduced modulo 2π at construction.
        let params = MappingParameters::from_name("theta", -0.5, 3).unwrap();
        assert!((params.alpha - (TAU - 0.5)).abs() < 1e-12);
    }
}
