// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{OrbitError, OrbitResult};

/// Which step controller drives acceptance and step-size adaptation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Local-truncation-error controller on the embedded 4(5) pair.
    #[default]
    Lte,
    /// Per-step energy-drift controller.
    Energy,
}

/// Direction filter of the Poincaré event layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventDirection {
    /// Record crossings in both directions.
    #[default]
    Any,
    /// Record only crossings with the monitored angle increasing.
    Ascending,
    /// Record only crossings with the monitored angle decreasing.
    Descending,
}

/// How a harmonic's phase φ is built from the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseMode {
    /// φ = mean of the supplied phase samples, fixed at construction.
    #[default]
    Constant,
    /// φ(ψp, t) = spline(ψp) + ω·t with the harmonic's supplied ω.
    Interpolated,
}

/// Runtime configuration of the orbit engine.
///
/// All fields are plain values so a config deserializes from a flat JSON
/// object; `Default` gives a usable production setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Absolute tolerance of the LTE controller.
    pub atol: f64,
    /// Relative tolerance of the LTE controller.
    pub rtol: f64,
    /// Per-step relative energy drift accepted by the energy controller.
    pub eps_energy: f64,
    /// Initial step size.
    pub h0: f64,
    /// Step floor; going below terminates the particle with `StepFloorReached`.
    pub h_min: f64,
    /// Step ceiling.
    pub h_max: f64,
    /// Controller safety factor, in (0, 1).
    pub safety: f64,
    /// Hard ceiling on accepted + rejected steps per particle.
    pub max_steps: usize,
    /// Worker thread cap; 0 selects the hardware concurrency.
    pub worker_count: usize,
    /// Store every k-th accepted step in time-series mode.
    pub store_stride: usize,
    /// Crossing direction filter of the event layer.
    pub event_direction: EventDirection,
    /// Harmonic phase construction mode.
    pub phase_mode: PhaseMode,
    /// Step controller selection.
    pub controller: ControllerKind,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            atol: DEFAULT_ATOL,
            rtol: DEFAULT_RTOL,
            eps_energy: DEFAULT_EPS_ENERGY,
            h0: DEFAULT_H0,
            h_min: DEFAULT_H_MIN,
            h_max: DEFAULT_H_MAX,
            safety: DEFAULT_SAFETY,
            max_steps: DEFAULT_MAX_STEPS,
            worker_count: 0,
            store_stride: DEFAULT_STORE_STRIDE,
            event_direction: EventDirection::default(),
            phase_mode: PhaseMode::default(),
            controller: ControllerKind::default(),
        }
    }
}

impl OrbitConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> OrbitResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every numeric knob; returns `ConfigError` on the first violation.
    pub fn validate(&self) -> OrbitResult<()> {
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(OrbitError::ConfigError(format!(
                "atol must be finite and > 0, got {}",
                self.atol
            )));
        }
        if !self.rtol.is_finite() || self.rtol < 0.0 {
            return Err(OrbitError::ConfigError(format!(
                "rtol must be finite and >= 0, got {}",
                self.rtol
            )));
        }
        if !self.eps_energy.is_finite() || self.eps_energy <= 0.0 {
            return Err(OrbitError::ConfigError(format!(
                "eps_energy must be finite and > 0, got {}",
                self.eps_energy
            )));
        }
        if !self.h0.is_finite() || self.h0 <= 0.0 {
            return Err(OrbitError::ConfigError(format!(
                "h0 must be finite and > 0, got {}",
                self.h0
            )));
        }
        if !self.h_min.is_finite() || self.h_min <= 0.0 {
            return Err(OrbitError::ConfigError(format!(
                "h_min must be finite and > 0, got {}",
                self.h_min
            )));
        }
        if !self.h_max.is_finite() || self.h_max < self.h_min {
            return Err(OrbitError::ConfigError(format!(
                "h_max must be finite and >= h_min, got h_max={}, h_min={}",
                self.h_max, self.h_min
            )));
        }
        if self.h0 < self.h_min || self.h0 > self.h_max {
            return Err(OrbitError::ConfigError(format!(
                "h0 must lie in [h_min, h_max], got h0={}, h_min={}, h_max={}",
                self.h0, self.h_min, self.h_max
            )));
        }
        if !self.safety.is_finite() || self.safety <= 0.0 || self.safety >= 1.0 {
            return Err(OrbitError::ConfigError(format!(
                "safety must lie in (0, 1), got {}",
                self.safety
            )));
        }
        if self.max_steps == 0 {
            return Err(OrbitError::ConfigError(
                "max_steps must be >= 1".to_string(),
            ));
        }
        if self.store_stride == 0 {
            return Err(OrbitError::ConfigError(
                "store_stride must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective worker count: 0 resolves to the hardware concurrency.
    pub fn effective_workers(&self) -> usize {
        if self.worker_count == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.worker_count
        }
    }

    /// Upper bound on stored evolution rows derived from the step budget.
    pub fn evolution_capacity_bound(&self) -> usize {
        self.max_steps.div_ceil(self.store_stride).max(1)
    }
}
