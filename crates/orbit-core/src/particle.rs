// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Particle
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::sync::atomic::{AtomicBool, Ordering};

use orbit_equilibrium::Equilibrium;
use orbit_types::config::OrbitConfig;
use orbit_types::constants::MAP_SPACING_THRESHOLD;
use orbit_types::state::{ParticleInit, TerminalStatus};

use crate::evolution::{Evolution, SectionCrossings};
use crate::mapping::{map_integrate, MappingParameters};
use crate::rkf45::{Stepper, TryStep};
use crate::state::{EvalScratch, OrbitState};

/// One guiding centre, its records, and its terminal status.
///
/// Terminal conditions are recorded here, never propagated as errors, so a
/// failing particle cannot abort its batch.
#[derive(Debug, Clone)]
pub struct Particle {
    pub init: ParticleInit,
    /// The evaluated state at the start of the last run.
    pub initial_state: OrbitState,
    /// The evaluated state where the last run ended.
    pub final_state: OrbitState,
    /// Time-series record (empty in mapping mode).
    pub evolution: Evolution,
    /// Section-crossing record (empty in time-series mode).
    pub crossings: SectionCrossings,
    pub status: TerminalStatus,
}

impl Particle {
    pub fn new(init: &ParticleInit) -> Self {
        let state = OrbitState::from_init(init);
        Self {
            init: *init,
            initial_state: state,
            final_state: state,
            evolution: Evolution::default(),
            crossings: SectionCrossings::default(),
            status: TerminalStatus::default(),
        }
    }

    /// Integrates the orbit up to `t_final`, storing the time series.
    ///
    /// The stop flag is polled once per step; on cancellation the partial
    /// record is kept and the status becomes `Cancelled`.
    pub fn integrate(
        &mut self,
        eq: &Equilibrium,
        config: &OrbitConfig,
        t_final: f64,
        stop: Option<&AtomicBool>,
    ) {
        self.evolution = Evolution::with_bounds(config.evolution_capacity_bound(), config.store_stride);
        self.crossings = SectionCrossings::default();
        let mut scratch = EvalScratch::new();

        let mut state = OrbitState::from_init(&self.init);
        state.evaluate(eq, &mut scratch);
        self.initial_state = state;
        self.evolution.store_accepted(&state);

        let mut stepper = Stepper::new(config);
        self.status = loop {
            // Rounding can leave the capped final step an ulp short of
            // t_final; a sub-epsilon remainder cannot advance the state.
            let remaining = t_final - state.time;
            if remaining <= f64::EPSILON * t_final.abs().max(1.0) {
                break TerminalStatus::Completed;
            }
            if self.evolution.steps >= config.max_steps {
                break TerminalStatus::Completed;
            }
            if let Some(flag) = stop {
                if flag.load(Ordering::Relaxed) {
                    break TerminalStatus::Cancelled;
                }
            }
            if !(0.0..=eq.psip_wall).contains(&state.psip) {
                break TerminalStatus::EscapedWall;
            }

            match stepper.try_advance_capped(&state, remaining, eq, &mut scratch) {
                TryStep::Accepted(next) => {
                    self.evolution.steps += 1;
                    state = next;
                    self.evolution.store_accepted(&state);
                }
                TryStep::Rejected => {
                    self.evolution.steps += 1;
                }
                TryStep::FloorReached => break TerminalStatus::StepFloorReached,
                TryStep::NonFinite => break TerminalStatus::NonFinite,
            }
        };

        self.evolution.finish();
        self.final_state = state;
    }

    /// Maps the orbit onto the configured surface of section, recording
    /// `params.intersections` crossings.
    pub fn map(
        &mut self,
        eq: &Equilibrium,
        config: &OrbitConfig,
        params: &MappingParameters,
        stop: Option<&AtomicBool>,
    ) {
        // Mapping mode never writes evolution rows, only the step counter.
        self.evolution = Evolution::with_bounds(1, config.store_stride);
        self.crossings = SectionCrossings::with_capacity(params.intersections);
        let mut scratch = EvalScratch::new();

        let mut state = OrbitState::from_init(&self.init);
        state.evaluate(eq, &mut scratch);
        self.initial_state = state;

        self.status = map_integrate(self, eq, config, params, stop, &mut scratch);

        if self.status == TerminalStatus::Completed
            && self.crossings.len() == params.intersections
            && !self.crossings.spacing_ok(MAP_SPACING_THRESHOLD)
        {
            self.status = TerminalStatus::InvalidCrossings;
        }
    }
}
