//! Per-particle output records: the bounded time-series buffer and the
//! Poincaré crossing arrays.

use std::collections::VecDeque;

use ndarray::Array1;
use orbit_types::constants::EVOLUTION_INIT_CAPACITY;

use crate::state::OrbitState;

/// Time series of one particle's orbit.
///
/// Rows are appended every `stride`-th accepted step. The buffer is bounded
/// by the configuration-derived row cap; once full, the oldest rows are
/// dropped so the record always holds the most recent history.
#[derive(Debug, Clone)]
pub struct Evolution {
    time: VecDeque<f64>,
    theta: VecDeque<f64>,
    psip: VecDeque<f64>,
    rho: VecDeque<f64>,
    zeta: VecDeque<f64>,
    psi: VecDeque<f64>,
    ptheta: VecDeque<f64>,
    pzeta: VecDeque<f64>,
    energy: VecDeque<f64>,
    /// Accepted + rejected integration steps.
    pub steps: usize,
    accepted: usize,
    stride: usize,
    row_bound: usize,
    /// Relative spread σ/μ of the stored energy column, set by `finish`.
    pub energy_spread: f64,
}

impl Evolution {
    /// A buffer storing every `stride`-th accepted step, at most `row_bound`
    /// rows.
    pub fn with_bounds(row_bound: usize, stride: usize) -> Self {
        let capacity = row_bound.min(EVOLUTION_INIT_CAPACITY);
        Self {
            time: VecDeque::with_capacity(capacity),
            theta: VecDeque::with_capacity(capacity),
            psip: VecDeque::with_capacity(capacity),
            rho: VecDeque::with_capacity(capacity),
            zeta: VecDeque::with_capacity(capacity),
            psi: VecDeque::with_capacity(capacity),
            ptheta: VecDeque::with_capacity(capacity),
            pzeta: VecDeque::with_capacity(capacity),
            energy: VecDeque::with_capacity(capacity),
            steps: 0,
            accepted: 0,
            stride: stride.max(1),
            row_bound: row_bound.max(1),
            energy_spread: f64::NAN,
        }
    }

    /// Total steps attempted by the integrator.
    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// Rows currently held in the buffer.
    pub fn steps_stored(&self) -> usize {
        self.time.len()
    }

    /// Appends one row unconditionally, ring-dropping the oldest on overflow.
    pub(crate) fn push_state(&mut self, state: &OrbitState) {
        if self.time.len() == self.row_bound {
            self.time.pop_front();
            self.theta.pop_front();
            self.psip.pop_front();
            self.rho.pop_front();
            self.zeta.pop_front();
            self.psi.pop_front();
            self.ptheta.pop_front();
            self.pzeta.pop_front();
            self.energy.pop_front();
        }
        self.time.push_back(state.time);
        self.theta.push_back(state.theta);
        self.psip.push_back(state.psip);
        self.rho.push_back(state.rho);
        self.zeta.push_back(state.zeta);
        self.psi.push_back(state.psi);
        self.ptheta.push_back(state.ptheta);
        self.pzeta.push_back(state.pzeta);
        self.energy.push_back(state.energy());
    }

    /// Appends an accepted step, honoring the stride sub-sampling.
    pub(crate) fn store_accepted(&mut self, state: &OrbitState) {
        if self.accepted % self.stride == 0 {
            self.push_state(state);
        }
        self.accepted += 1;
    }

    /// Computes the energy spread diagnostic once integration ends.
    pub(crate) fn finish(&mut self) {
        let energies = self.energy_vec();
        if energies.is_empty() {
            return;
        }
        let mean = energies.mean().unwrap_or(f64::NAN);
        self.energy_spread = energies.std(0.0) / mean;
    }

    pub fn time_vec(&self) -> Array1<f64> {
        self.time.iter().copied().collect()
    }

    pub fn theta_vec(&self) -> Array1<f64> {
        self.theta.iter().copied().collect()
    }

    pub fn psip_vec(&self) -> Array1<f64> {
        self.psip.iter().copied().collect()
    }

    pub fn rho_vec(&self) -> Array1<f64> {
        self.rho.iter().copied().collect()
    }

    pub fn zeta_vec(&self) -> Array1<f64> {
        self.zeta.iter().copied().collect()
    }

    pub fn psi_vec(&self) -> Array1<f64> {
        self.psi.iter().copied().collect()
    }

    pub fn ptheta_vec(&self) -> Array1<f64> {
        self.ptheta.iter().copied().collect()
    }

    pub fn pzeta_vec(&self) -> Array1<f64> {
        self.pzeta.iter().copied().collect()
    }

    pub fn energy_vec(&self) -> Array1<f64> {
        self.energy.iter().copied().collect()
    }
}

impl Default for Evolution {
    fn default() -> Self {
        Self::with_bounds(usize::MAX, 1)
    }
}

/// The surface-of-section record of one particle, in chronological order.
///
/// For a θ-section the pairs are (ζ, ψp); for a ζ-section they are (θ, ψ).
#[derive(Debug, Clone, Default)]
pub struct SectionCrossings {
    /// The recorded angle at each crossing.
    pub angles: Vec<f64>,
    /// The recorded flux at each crossing.
    pub fluxes: Vec<f64>,
    /// The monitored (section) coordinate at each crossing, unwrapped; used
    /// by the 2π spacing check.
    pub monitored: Vec<f64>,
}

impl SectionCrossings {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            angles: Vec::with_capacity(capacity),
            fluxes: Vec::with_capacity(capacity),
            monitored: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub(crate) fn push(&mut self, angle: f64, flux: f64, monitored: f64) {
        self.angles.push(angle);
        self.fluxes.push(flux);
        self.monitored.push(monitored);
    }

    /// True when no consecutive crossing pair is separated by more than one
    /// full turn of the monitored coordinate. A wider gap means the event
    /// layer skipped a crossing.
    pub fn spacing_ok(&self, threshold: f64) -> bool {
        self.monitored
            .windows(2)
            .all(|pair| (pair[1] - pair[0]).abs() <= std::f64::consts::TAU + threshold)
    }
}
