// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Guiding-Centre State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The guiding-centre state and its right-hand-side assembly.
//!
//! One `evaluate` call computes every interpolated quantity at a single
//! (ψp, θ, ζ, t) point. All 1D splines and the 2D splines' ψp axis share the
//! scratch's `xacc`, so the whole assembly costs one interval search per axis
//! per point.

use orbit_equilibrium::{Equilibrium, HarmonicTerms};
use orbit_math::Accelerator;
use orbit_types::state::ParticleInit;

/// Per-worker evaluation scratch: the two interval accelerators.
///
/// Owned by the particle worker, never by a spline, so parallel particles do
/// not contend.
#[derive(Debug, Clone, Default)]
pub struct EvalScratch {
    /// ψp-axis accelerator, shared by q, ψ, g, I, a and the 2D field grids.
    pub xacc: Accelerator,
    /// θ-axis accelerator of the 2D field grids.
    pub yacc: Accelerator,
}

impl EvalScratch {
    pub fn new() -> Self {
        Self::default()
    }
}

/// State of the guiding centre at one point of its orbit.
///
/// The independent variables are (t, θ, ψp, ρ‖, ζ) with μ a constant of
/// motion; everything else is derived by `evaluate`. Angles stay unwrapped
/// here; reduction modulo 2π happens inside the spline lookups and the
/// section comparison only.
#[derive(Debug, Clone, Copy)]
pub struct OrbitState {
    /// Evaluation time.
    pub time: f64,
    /// Poloidal angle θ.
    pub theta: f64,
    /// Poloidal flux ψp.
    pub psip: f64,
    /// Parallel gyroradius ρ‖.
    pub rho: f64,
    /// Toroidal angle ζ.
    pub zeta: f64,
    /// Magnetic moment μ.
    pub mu: f64,

    /// Toroidal flux ψ(ψp).
    pub psi: f64,
    /// Canonical momentum pθ = ψ + ρ‖·I.
    pub ptheta: f64,
    /// Canonical momentum pζ = ρ‖·g − ψp.
    pub pzeta: f64,

    pub theta_dot: f64,
    pub psip_dot: f64,
    pub rho_dot: f64,
    pub zeta_dot: f64,

    /// Field strength B(ψp, θ).
    pub b: f64,
    /// Safety factor q(ψp).
    pub q: f64,
    /// Toroidal current g(ψp).
    pub g: f64,
    /// Poloidal current I(ψp).
    pub i: f64,

    pub db_dpsip: f64,
    pub db_dtheta: f64,
    /// Identically zero: the equilibrium is axisymmetric and all ζ
    /// dependence lives in the perturbation.
    pub db_dzeta: f64,
    pub dg_dpsip: f64,
    pub di_dpsip: f64,

    /// Perturbation sum and its four derivatives at this point.
    pub pert: HarmonicTerms,

    /// Coefficient C of the perturbed equations of motion.
    pub cterm: f64,
    /// Coefficient F.
    pub fterm: f64,
    /// Coefficient K.
    pub kterm: f64,
    /// Determinant D = g·F − I·C.
    pub dterm: f64,
}

impl OrbitState {
    /// A fresh, unevaluated state at given coordinates.
    pub fn new(time: f64, theta: f64, psip: f64, rho: f64, zeta: f64, mu: f64) -> Self {
        Self {
            time,
            theta,
            psip,
            rho,
            zeta,
            mu,
            psi: f64::NAN,
            ptheta: f64::NAN,
            pzeta: f64::NAN,
            theta_dot: f64::NAN,
            psip_dot: f64::NAN,
            rho_dot: f64::NAN,
            zeta_dot: f64::NAN,
            b: f64::NAN,
            q: f64::NAN,
            g: f64::NAN,
            i: f64::NAN,
            db_dpsip: f64::NAN,
            db_dtheta: f64::NAN,
            db_dzeta: 0.0,
            dg_dpsip: f64::NAN,
            di_dpsip: f64::NAN,
            pert: HarmonicTerms::default(),
            cterm: f64::NAN,
            fterm: f64::NAN,
            kterm: f64::NAN,
            dterm: f64::NAN,
        }
    }

    /// A fresh state from initial conditions.
    pub fn from_init(init: &ParticleInit) -> Self {
        Self::new(
            init.time0,
            init.theta0,
            init.psip0,
            init.rho0,
            init.zeta0,
            init.mu,
        )
    }

    /// Evaluates every derived quantity at the current coordinates.
    ///
    /// Interpolations first (sharing the scratch accelerators), then the
    /// C/F/K/D coefficients, the canonical momenta, and the time derivatives.
    pub fn evaluate(&mut self, eq: &Equilibrium, scratch: &mut EvalScratch) {
        let xacc = &mut scratch.xacc;

        self.q = eq.qfactor.q(self.psip, xacc);
        self.psi = eq.qfactor.psi(self.psip, xacc);
        self.g = eq.currents.g(self.psip, xacc);
        self.i = eq.currents.i(self.psip, xacc);
        self.dg_dpsip = eq.currents.dg_dpsip(self.psip, xacc);
        self.di_dpsip = eq.currents.di_dpsip(self.psip, xacc);

        self.b = eq.bfield.b(self.psip, self.theta, xacc, &mut scratch.yacc);
        self.db_dpsip = eq
            .bfield
            .db_dpsip(self.psip, self.theta, xacc, &mut scratch.yacc);
        self.db_dtheta = eq
            .bfield
            .db_dtheta(self.psip, self.theta, xacc, &mut scratch.yacc);
        self.db_dzeta = 0.0;

        self.pert = eq
            .perturbation
            .terms(self.psip, self.theta, self.zeta, self.time, xacc);

        self.cterm = -1.0 + (self.rho + self.pert.h) * self.dg_dpsip + self.g * self.pert.dh_dpsip;
        self.fterm = self.q + (self.rho + self.pert.h) * self.di_dpsip + self.i * self.pert.dh_dpsip;
        self.kterm = self.g * self.pert.dh_dtheta - self.i * self.pert.dh_dzeta;
        self.dterm = self.g * self.fterm - self.i * self.cterm;

        self.ptheta = self.psi + self.rho * self.i;
        self.pzeta = self.rho * self.g - self.psip;

        let mu_par = self.mu + self.rho * self.rho * self.b;
        let psip_brace = mu_par * self.db_dpsip;
        let theta_brace = mu_par * self.db_dtheta;
        let zeta_brace = mu_par * self.db_dzeta;
        let rho_bsq = self.rho * self.b * self.b / self.dterm;
        let g_over_d = self.g / self.dterm;
        let i_over_d = self.i / self.dterm;

        self.theta_dot = -self.cterm * rho_bsq + g_over_d * psip_brace;
        self.psip_dot = self.kterm * rho_bsq - g_over_d * theta_brace + i_over_d * zeta_brace;
        self.rho_dot = (self.cterm * theta_brace - self.kterm * psip_brace
            - self.fterm * zeta_brace)
            / self.dterm
            - self.pert.dh_dt;
        self.zeta_dot = self.fterm * rho_bsq - i_over_d * psip_brace;
    }

    /// The four-component derivative vector (θ̇, ψ̇p, ρ̇‖, ζ̇).
    pub fn derivatives(&self) -> [f64; 4] {
        [self.theta_dot, self.psip_dot, self.rho_dot, self.zeta_dot]
    }

    /// The four-component coordinate vector (θ, ψp, ρ‖, ζ).
    pub fn coordinates(&self) -> [f64; 4] {
        [self.theta, self.psip, self.rho, self.zeta]
    }

    /// Total energy E = ρ‖²B²/2 + μB, the conserved quantity of the
    /// unperturbed motion.
    pub fn energy(&self) -> f64 {
        self.parallel_energy() + self.perpendicular_energy()
    }

    pub fn parallel_energy(&self) -> f64 {
        0.5 * self.rho * self.rho * self.b * self.b
    }

    pub fn perpendicular_energy(&self) -> f64 {
        self.mu * self.b
    }

    /// True when the coordinates and derivatives are all finite.
    pub fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.theta.is_finite()
            && self.psip.is_finite()
            && self.rho.is_finite()
            && self.zeta.is_finite()
            && self.theta_dot.is_finite()
            && self.psip_dot.is_finite()
            && self.rho_dot.is_finite()
            && self.zeta_dot.is_finite()
    }
}
