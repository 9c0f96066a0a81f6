// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Default runtime parameters, in normalized units (mass = charge = 1,
//! time in inverse on-axis gyrofrequencies).

/// Default absolute tolerance of the local-truncation-error controller.
pub const DEFAULT_ATOL: f64 = 1e-9;
/// Default relative tolerance of the local-truncation-error controller.
pub const DEFAULT_RTOL: f64 = 1e-9;
/// Default per-step energy drift threshold of the energy controller.
pub const DEFAULT_EPS_ENERGY: f64 = 1e-11;

/// Default initial step size.
pub const DEFAULT_H0: f64 = 1e-3;
/// Default step floor. Falling below it terminates the particle.
pub const DEFAULT_H_MIN: f64 = 1e-12;
/// Default step ceiling.
pub const DEFAULT_H_MAX: f64 = 1.0;
/// Default controller safety factor.
pub const DEFAULT_SAFETY: f64 = 0.9;

/// Default hard ceiling on accepted + rejected steps per particle.
pub const DEFAULT_MAX_STEPS: usize = 10_000_000;
/// Default evolution sub-sampling stride (1 = store every accepted step).
pub const DEFAULT_STORE_STRIDE: usize = 1;

/// Initial capacity of the evolution buffers.
pub const EVOLUTION_INIT_CAPACITY: usize = 2000;

/// Consecutive section crossings must be spaced by 2π within this threshold.
pub const MAP_SPACING_THRESHOLD: f64 = 1e-9;

/// |ψ(0)| must fall below this for a dataset to be accepted.
pub const PSI_AXIS_TOL: f64 = 1e-9;

/// Relative tolerance of the periodic-spline endpoint match.
pub const PERIODIC_MATCH_TOL: f64 = 1e-10;

/// Step growth/shrink clamp of both step controllers.
pub const STEP_FACTOR_MIN: f64 = 0.1;
pub const STEP_FACTOR_MAX: f64 = 5.0;
