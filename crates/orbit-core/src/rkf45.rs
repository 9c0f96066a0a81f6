// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — RKF45
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Embedded Runge-Kutta-Fehlberg 4(5) stepping with interchangeable step
//! controllers.
//!
//! The accepted value is always the 5th-order estimate; the 4th-order one
//! only feeds the truncation-error controller. FSAL is not assumed: stage 1
//! reuses the caller's already-evaluated derivatives instead.

use orbit_equilibrium::Equilibrium;
use orbit_types::config::{ControllerKind, OrbitConfig};
use orbit_types::constants::{STEP_FACTOR_MAX, STEP_FACTOR_MIN};

use crate::state::{EvalScratch, OrbitState};

/// Fehlberg coefficients.
pub(crate) mod tableau {
    // Nodes.
    pub(crate) const C2: f64 = 1.0 / 4.0;
    pub(crate) const C3: f64 = 3.0 / 8.0;
    pub(crate) const C4: f64 = 12.0 / 13.0;
    pub(crate) const C5: f64 = 1.0;
    pub(crate) const C6: f64 = 1.0 / 2.0;

    // Stage couplings.
    pub(crate) const A21: f64 = 1.0 / 4.0;
    pub(crate) const A31: f64 = 3.0 / 32.0;
    pub(crate) const A32: f64 = 9.0 / 32.0;
    pub(crate) const A41: f64 = 1932.0 / 2197.0;
    pub(crate) const A42: f64 = -7200.0 / 2197.0;
    pub(crate) const A43: f64 = 7296.0 / 2197.0;
    pub(crate) const A51: f64 = 439.0 / 216.0;
    pub(crate) const A52: f64 = -8.0;
    pub(crate) const A53: f64 = 3680.0 / 513.0;
    pub(crate) const A54: f64 = -845.0 / 4104.0;
    pub(crate) const A61: f64 = -8.0 / 27.0;
    pub(crate) const A62: f64 = 2.0;
    pub(crate) const A63: f64 = -3544.0 / 2565.0;
    pub(crate) const A64: f64 = 1859.0 / 4104.0;
    pub(crate) const A65: f64 = -11.0 / 40.0;

    // 4th-order weights.
    pub(crate) const B1: f64 = 25.0 / 216.0;
    pub(crate) const B3: f64 = 1408.0 / 2565.0;
    pub(crate) const B4: f64 = 2197.0 / 4104.0;
    pub(crate) const B5: f64 = -1.0 / 5.0;

    // 5th-order weights.
    pub(crate) const B1E: f64 = 16.0 / 135.0;
    pub(crate) const B3E: f64 = 6656.0 / 12825.0;
    pub(crate) const B4E: f64 = 28561.0 / 56430.0;
    pub(crate) const B5E: f64 = -9.0 / 50.0;
    pub(crate) const B6E: f64 = 2.0 / 55.0;
}

/// Runs the six Fehlberg stages on a 4-component system.
///
/// `k1` is the derivative at (`t0`, `y0`), supplied by the caller so an
/// already-evaluated state is not recomputed. Returns the 5th- and 4th-order
/// end states `(y5, y4)`.
pub(crate) fn fehlberg_pair<F>(
    t0: f64,
    y0: &[f64; 4],
    h: f64,
    k1: &[f64; 4],
    mut rhs: F,
) -> ([f64; 4], [f64; 4])
where
    F: FnMut(f64, &[f64; 4], &mut [f64; 4]),
{
    use tableau::*;

    let mut k2 = [0.0; 4];
    let mut k3 = [0.0; 4];
    let mut k4 = [0.0; 4];
    let mut k5 = [0.0; 4];
    let mut k6 = [0.0; 4];
    let mut y = [0.0; 4];

    for i in 0..4 {
        y[i] = y0[i] + h * A21 * k1[i];
    }
    rhs(t0 + C2 * h, &y, &mut k2);

    for i in 0..4 {
        y[i] = y0[i] + h * (A31 * k1[i] + A32 * k2[i]);
    }
    rhs(t0 + C3 * h, &y, &mut k3);

    for i in 0..4 {
        y[i] = y0[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
    }
    rhs(t0 + C4 * h, &y, &mut k4);

    for i in 0..4 {
        y[i] = y0[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
    }
    rhs(t0 + C5 * h, &y, &mut k5);

    for i in 0..4 {
        y[i] =
            y0[i] + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
    }
    rhs(t0 + C6 * h, &y, &mut k6);

    let mut y5 = [0.0; 4];
    let mut y4 = [0.0; 4];
    for i in 0..4 {
        y5[i] = y0[i]
            + h * (B1E * k1[i] + B3E * k3[i] + B4E * k4[i] + B5E * k5[i] + B6E * k6[i]);
        y4[i] = y0[i] + h * (B1 * k1[i] + B3 * k3[i] + B4 * k4[i] + B5 * k5[i]);
    }
    (y5, y4)
}

/// Acceptance predicate and step-update rule.
///
/// The two controllers share all stepping plumbing and differ only here.
#[derive(Debug, Clone, Copy)]
enum Controller {
    Lte { atol: f64, rtol: f64 },
    Energy { eps: f64 },
}

impl Controller {
    fn from_config(config: &OrbitConfig) -> Self {
        match config.controller {
            ControllerKind::Lte => Controller::Lte {
                atol: config.atol,
                rtol: config.rtol,
            },
            ControllerKind::Energy => Controller::Energy {
                eps: config.eps_energy,
            },
        }
    }

    /// Returns (accept, step factor) for a proposed step.
    fn judge(
        &self,
        safety: f64,
        old: &OrbitState,
        next: &OrbitState,
        y5: &[f64; 4],
        y4: &[f64; 4],
    ) -> (bool, f64) {
        match *self {
            Controller::Lte { atol, rtol } => {
                let y_old = old.coordinates();
                let mut eta = 0.0_f64;
                for i in 0..4 {
                    let err = (y5[i] - y4[i]).abs();
                    let scale = atol + rtol * y5[i].abs().max(y_old[i].abs());
                    eta = eta.max(err / scale);
                }
                let eta = eta.max(1e-16);
                let factor = (safety * eta.powf(-0.2)).clamp(STEP_FACTOR_MIN, STEP_FACTOR_MAX);
                (eta <= 1.0, factor)
            }
            Controller::Energy { eps } => {
                let e_old = old.energy();
                let drift = (next.energy() - e_old).abs();
                let scale = eps * e_old.abs().max(1.0);
                // Proportional rule targeting a drift of half the budget.
                let factor = (safety * (0.5 * scale / drift.max(1e-300)).powf(0.2))
                    .clamp(STEP_FACTOR_MIN, STEP_FACTOR_MAX);
                (drift <= scale, factor)
            }
        }
    }
}

/// Outcome of one step attempt.
pub(crate) enum TryStep {
    /// The step was accepted; the evaluated end state follows.
    Accepted(OrbitState),
    /// The controller rejected the step; retry from the same state.
    Rejected,
    /// The controller pushed the step below the floor.
    FloorReached,
    /// The proposed state or its derivatives went non-finite.
    NonFinite,
}

/// Adaptive stepper: the Fehlberg core plus one controller and the running
/// step size.
pub(crate) struct Stepper {
    pub h: f64,
    controller: Controller,
    safety: f64,
    h_min: f64,
    h_max: f64,
}

impl Stepper {
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            h: config.h0.clamp(config.h_min, config.h_max),
            controller: Controller::from_config(config),
            safety: config.safety,
            h_min: config.h_min,
            h_max: config.h_max,
        }
    }

    /// Attempts one step of at most `h_cap` from `state` (which must already
    /// be evaluated). Updates the running step size whether or not the step
    /// is accepted.
    pub fn try_advance_capped(
        &mut self,
        state: &OrbitState,
        h_cap: f64,
        eq: &Equilibrium,
        scratch: &mut EvalScratch,
    ) -> TryStep {
        if self.h < self.h_min {
            return TryStep::FloorReached;
        }
        let h = self.h.min(h_cap);
        let y0 = state.coordinates();
        let k1 = state.derivatives();
        let mu = state.mu;

        let (y5, y4) = fehlberg_pair(state.time, &y0, h, &k1, |t, y, out| {
            let mut stage = OrbitState::new(t, y[0], y[1], y[2], y[3], mu);
            stage.evaluate(eq, scratch);
            *out = stage.derivatives();
        });

        if y5.iter().any(|v| !v.is_finite()) {
            return TryStep::NonFinite;
        }
        let mut next = OrbitState::new(state.time + h, y5[0], y5[1], y5[2], y5[3], mu);
        next.evaluate(eq, scratch);
        if !next.is_finite() {
            return TryStep::NonFinite;
        }

        let (accept, factor) = self.controller.judge(self.safety, state, &next, &y5, &y4);
        self.h = (h * factor).min(self.h_max);
        if accept {
            TryStep::Accepted(next)
        } else {
            TryStep::Rejected
        }
    }

    /// Attempts one step with no external cap.
    pub fn try_advance(
        &mut self,
        state: &OrbitState,
        eq: &Equilibrium,
        scratch: &mut EvalScratch,
    ) -> TryStep {
        self.try_advance_capped(state, f64::INFINITY, eq, scratch)
    }
}
