// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Perturbation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use orbit_math::Accelerator;
use orbit_types::config::PhaseMode;
use orbit_types::error::OrbitResult;

use crate::dataset::EquilibriumDataset;
use crate::harmonic::{Harmonic, HarmonicTerms};

/// An ordered sum of perturbation harmonics.
///
/// An empty collection is the unperturbed system: every aggregate term is
/// identically zero.
#[derive(Debug, Default)]
pub struct Perturbation {
    harmonics: Vec<Harmonic>,
}

impl Perturbation {
    pub fn from_harmonics(harmonics: Vec<Harmonic>) -> Self {
        Self { harmonics }
    }

    /// Builds every harmonic the dataset declares.
    pub fn from_dataset(
        dataset: &EquilibriumDataset,
        typ: &str,
        mode: PhaseMode,
    ) -> OrbitResult<Self> {
        let psip_data = dataset.psip_data.to_vec();
        let harmonics = dataset
            .harmonics
            .iter()
            .map(|spec| Harmonic::from_spec(&psip_data, spec, typ, mode))
            .collect::<OrbitResult<Vec<_>>>()?;
        Ok(Self { harmonics })
    }

    /// Aggregate value and derivatives: the sum of every harmonic's terms.
    pub fn terms(
        &self,
        psip: f64,
        theta: f64,
        zeta: f64,
        time: f64,
        acc: &mut Accelerator,
    ) -> HarmonicTerms {
        let mut total = HarmonicTerms::default();
        for harmonic in &self.harmonics {
            total.accumulate(&harmonic.terms(psip, theta, zeta, time, acc));
        }
        total
    }

    pub fn len(&self) -> usize {
        self.harmonics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.harmonics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Harmonic> {
        self.harmonics.iter()
    }
}

impl std::ops::Index<usize> for Perturbation {
    type Output = Harmonic;

    fn index(&self, index: usize) -> &Harmonic {
        &self.harmonics[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::HarmonicSpec;
    use ndarray::Array1;

    fn spec(m: f64, n: f64) -> (Vec<f64>, HarmonicSpec) {
        let psip: Vec<f64> = Array1::linspace(0.0, 0.5, 61).to_vec();
        let a: Vec<f64> = psip.iter().map(|p| 1e-2 * p * (0.5 - p)).collect();
        (
            psip,
            HarmonicSpec {
                m,
                n,
                phase: 0.0,
                a_data: Array1::from_vec(a),
                phase_data: None,
                omega: 0.0,
            },
        )
    }

    #[test]
    fn test_empty_perturbation_is_zero() {
        let perturbation = Perturbation::default();
        let mut acc = Accelerator::new();
        let terms = perturbation.terms(0.2, 1.0, 2.0, 0.0, &mut acc);
        assert_eq!(terms, HarmonicTerms::default());
        assert!(perturbation.is_empty());
    }

    #[test]
    fn test_sum_is_linear_in_harmonics() {
        let (psip, one) = spec(2.0, 1.0);
        let single = Perturbation::from_harmonics(vec![Harmonic::from_spec(
            &psip,
            &one,
            "akima",
            PhaseMode::Constant,
        )
        .unwrap()]);
        let triple = Perturbation::from_harmonics(
            (0..3)
                .map(|_| Harmonic::from_spec(&psip, &one, "akima", PhaseMode::Constant).unwrap())
                .collect(),
        );

        let mut acc = Accelerator::new();
        let (p, theta, zeta, t) = (0.21, 1.0, 0.5, 0.0);
        let s = single.terms(p, theta, zeta, t, &mut acc);
        let tr = triple.terms(p, theta, zeta, t, &mut acc);
        assert!((3.0 * s.h - tr.h).abs() < 1e-14);
        assert!((3.0 * s.dh_dpsip - tr.dh_dpsip).abs() < 1e-14);
        assert!((3.0 * s.dh_dtheta - tr.dh_dtheta).abs() < 1e-14);
        assert!((3.0 * s.dh_dzeta - tr.dh_dzeta).abs() < 1e-14);
        assert!((3.0 * s.dh_dt - tr.dh_dt).abs() < 1e-14);
    }

    #[test]
    fn test_indexing_returns_harmonics_in_order() {
        let (psip, first) = spec(2.0, 1.0);
        let (_, second) = spec(3.0, 2.0);
        let perturbation = Perturbation::from_harmonics(vec![
            Harmonic::from_spec(&psip, &first, "cubic", PhaseMode::Constant).unwrap(),
            Harmonic::from_spec(&psip, &second, "cubic", PhaseMode::Constant).unwrap(),
        ]);
        assert_eq!(perturbation.len(), 2);
        assert_eq!(perturbation[0].m, 2.0);
        assert_eq!(perturbation[1].m, 3.0);
        assert_eq!(perturbation.iter().count(), 2);
    }

    #[test]
    fn test_shared_accelerator_across_harmonics() {
        let (psip, one) = spec(2.0, 1.0);
        let (_, two) = spec(4.0, 3.0);
        let perturbation = Perturbation::from_harmonics(vec![
            Harmonic::from_spec(&psip, &one, "cubic", PhaseMode::Constant).unwrap(),
            Harmonic::from_spec(&psip, &two, "cubic", PhaseMode::Constant).unwrap(),
        ]);
        let mut acc = Accelerator::new();
        perturbation.terms(0.3, 0.2, 0.1, 0.0, &mut acc);
        assert_eq!(
            acc.searches(),
            1,
            "all harmonic splines share the ψp abscissa"
        );
    }
}
