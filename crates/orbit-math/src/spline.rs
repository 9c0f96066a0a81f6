// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Spline 1D
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! 1D interpolation over a strictly increasing abscissa.
//!
//! The variant is dispatched once at construction into per-interval cubic
//! coefficients, so evaluation runs one monomorphic code path regardless of
//! the variant.

use ndarray::Array1;
use orbit_types::constants::PERIODIC_MATCH_TOL;
use orbit_types::error::{OrbitError, OrbitResult};

use crate::accel::Accelerator;
use crate::tridiag::thomas_solve;

/// 1D interpolation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interp1d {
    /// Piecewise linear, C⁰.
    Linear,
    /// Natural cubic, C², zero second derivative at the boundary knots.
    Cubic,
    /// Akima's locally weighted slopes, C¹.
    Akima,
    /// Akima with periodically wrapped slopes; the ordinate must match at the
    /// endpoints.
    AkimaPeriodic,
    /// Steffen's monotone method, C¹, no overshoot between knots.
    Steffen,
}

impl Interp1d {
    /// Parses a case-insensitive selector string.
    pub fn from_name(name: &str) -> OrbitResult<Self> {
        match name.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "cubic" => Ok(Self::Cubic),
            "akima" => Ok(Self::Akima),
            "akimaperiodic" => Ok(Self::AkimaPeriodic),
            "steffen" => Ok(Self::Steffen),
            _ => Err(OrbitError::UnknownInterpolation(name.to_string())),
        }
    }

    /// Minimum number of abscissa points the variant requires.
    pub fn min_points(&self) -> usize {
        match self {
            Self::Linear => 2,
            Self::Cubic | Self::Steffen => 3,
            Self::Akima | Self::AkimaPeriodic => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cubic => "cubic",
            Self::Akima => "akima",
            Self::AkimaPeriodic => "akimaperiodic",
            Self::Steffen => "steffen",
        }
    }

    fn is_periodic(&self) -> bool {
        matches!(self, Self::AkimaPeriodic)
    }
}

/// A 1D spline with precomputed interval coefficients.
///
/// On interval `i`, with `dx = x - xa[i]`:
/// `f(x) = ya[i] + dx·(b[i] + dx·(c[i] + dx·d[i]))`.
///
/// Every evaluation takes an [`Accelerator`]; one accelerator may serve any
/// number of splines built over the same abscissa.
#[derive(Debug, Clone)]
pub struct Spline1d {
    /// Interpolation variant this spline was built with.
    pub variant: Interp1d,
    /// Abscissa samples.
    pub xa: Array1<f64>,
    /// Ordinate samples.
    pub ya: Array1<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl Spline1d {
    /// Builds a spline from samples. See the module docs for the error kinds.
    pub fn build(variant: Interp1d, xa: &[f64], ya: &[f64]) -> OrbitResult<Self> {
        check_samples(variant, xa, ya)?;

        let n = xa.len();
        let h: Vec<f64> = (0..n - 1).map(|i| xa[i + 1] - xa[i]).collect();
        let s: Vec<f64> = (0..n - 1).map(|i| (ya[i + 1] - ya[i]) / h[i]).collect();

        let (b, c, d) = match variant {
            Interp1d::Linear => linear_coeffs(&s),
            Interp1d::Cubic => cubic_coeffs(&h, &s),
            Interp1d::Akima => hermite_coeffs(&h, &s, &akima_derivs(&s, false)),
            Interp1d::AkimaPeriodic => hermite_coeffs(&h, &s, &akima_derivs(&s, true)),
            Interp1d::Steffen => hermite_coeffs(&h, &s, &steffen_derivs(&h, &s)),
        };

        Ok(Self {
            variant,
            xa: Array1::from_vec(xa.to_vec()),
            ya: Array1::from_vec(ya.to_vec()),
            b,
            c,
            d,
        })
    }

    /// Builds a spline from a selector string.
    pub fn from_name(name: &str, xa: &[f64], ya: &[f64]) -> OrbitResult<Self> {
        Self::build(Interp1d::from_name(name)?, xa, ya)
    }

    /// Lower edge of the interpolation domain.
    pub fn x_min(&self) -> f64 {
        self.xa[0]
    }

    /// Upper edge of the interpolation domain.
    pub fn x_max(&self) -> f64 {
        self.xa[self.xa.len() - 1]
    }

    /// True when `x` lies inside the interpolation domain.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }

    /// Interpolated value. Outside the domain, non-periodic variants extend
    /// linearly from the boundary knot; periodic variants reduce the query
    /// modulo the period first.
    pub fn eval(&self, x: f64, acc: &mut Accelerator) -> f64 {
        let x = self.wrap(x);
        let n = self.xa.len();
        if x < self.xa[0] {
            return self.ya[0] + self.b[0] * (x - self.xa[0]);
        }
        if x > self.xa[n - 1] {
            return self.ya[n - 1] + self.upper_edge_slope() * (x - self.xa[n - 1]);
        }
        let i = acc.locate(&self.xa, x);
        let dx = x - self.xa[i];
        self.ya[i] + dx * (self.b[i] + dx * (self.c[i] + dx * self.d[i]))
    }

    /// Interpolated value with an explicit domain check, for callers that
    /// must not rely on extrapolation.
    pub fn eval_checked(&self, x: f64, acc: &mut Accelerator) -> OrbitResult<f64> {
        let x = self.wrap(x);
        if !self.contains(x) {
            return Err(OrbitError::DomainError {
                value: x,
                min: self.x_min(),
                max: self.x_max(),
            });
        }
        Ok(self.eval(x, acc))
    }

    /// First derivative.
    pub fn d_dx(&self, x: f64, acc: &mut Accelerator) -> f64 {
        let x = self.wrap(x);
        let n = self.xa.len();
        if x < self.xa[0] {
            return self.b[0];
        }
        if x > self.xa[n - 1] {
            return self.upper_edge_slope();
        }
        let i = acc.locate(&self.xa, x);
        let dx = x - self.xa[i];
        self.b[i] + dx * (2.0 * self.c[i] + 3.0 * self.d[i] * dx)
    }

    /// Second derivative. Zero on the linear extrapolation tails.
    pub fn d2_dx2(&self, x: f64, acc: &mut Accelerator) -> f64 {
        let x = self.wrap(x);
        let n = self.xa.len();
        if x < self.xa[0] || x > self.xa[n - 1] {
            return 0.0;
        }
        let i = acc.locate(&self.xa, x);
        let dx = x - self.xa[i];
        2.0 * self.c[i] + 6.0 * self.d[i] * dx
    }

    fn wrap(&self, x: f64) -> f64 {
        if !self.variant.is_periodic() {
            return x;
        }
        let x0 = self.x_min();
        let period = self.x_max() - x0;
        x0 + (x - x0).rem_euclid(period)
    }

    fn upper_edge_slope(&self) -> f64 {
        let i = self.xa.len() - 2;
        let h = self.xa[i + 1] - self.xa[i];
        self.b[i] + h * (2.0 * self.c[i] + 3.0 * self.d[i] * h)
    }
}

fn check_samples(variant: Interp1d, xa: &[f64], ya: &[f64]) -> OrbitResult<()> {
    if xa.len() != ya.len() {
        return Err(OrbitError::ShapeMismatch(format!(
            "abscissa and ordinate lengths differ: {} vs {}",
            xa.len(),
            ya.len()
        )));
    }
    if xa.len() < variant.min_points() {
        return Err(OrbitError::InsufficientPoints {
            variant: variant.name(),
            required: variant.min_points(),
            got: xa.len(),
        });
    }
    if let Some(bad) = xa.iter().chain(ya.iter()).find(|v| !v.is_finite()) {
        return Err(OrbitError::MalformedInput(format!(
            "spline sample is not finite: {bad}"
        )));
    }
    if let Some(i) = (1..xa.len()).find(|&i| xa[i] <= xa[i - 1]) {
        return Err(OrbitError::NonMonotone(format!(
            "xa[{}] = {} does not exceed xa[{}] = {}",
            i,
            xa[i],
            i - 1,
            xa[i - 1]
        )));
    }
    if variant.is_periodic() {
        let scale = ya.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
        let gap = (ya[ya.len() - 1] - ya[0]).abs();
        if gap > PERIODIC_MATCH_TOL * scale {
            return Err(OrbitError::NonPeriodic(format!(
                "endpoint ordinates differ by {gap} over one period"
            )));
        }
    }
    Ok(())
}

fn linear_coeffs(s: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let m = s.len();
    (s.to_vec(), vec![0.0; m], vec![0.0; m])
}

/// Natural cubic: solve the interior second-derivative system with the
/// Thomas algorithm, then convert to interval coefficients.
fn cubic_coeffs(h: &[f64], s: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = h.len() + 1;
    let mut m2 = vec![0.0; n];

    if n > 2 {
        let k = n - 2;
        let mut sub = vec![0.0; k];
        let mut diag = vec![0.0; k];
        let mut sup = vec![0.0; k];
        let mut rhs = vec![0.0; k];
        for row in 0..k {
            let i = row + 1;
            if row > 0 {
                sub[row] = h[i - 1] / 6.0;
            }
            diag[row] = (h[i - 1] + h[i]) / 3.0;
            if row < k - 1 {
                sup[row] = h[i] / 6.0;
            }
            rhs[row] = s[i] - s[i - 1];
        }
        let interior = thomas_solve(&sub, &diag, &sup, &rhs);
        m2[1..(k + 1)].copy_from_slice(&interior);
    }

    let mut b = vec![0.0; n - 1];
    let mut c = vec![0.0; n - 1];
    let mut d = vec![0.0; n - 1];
    for i in 0..n - 1 {
        b[i] = s[i] - h[i] * (2.0 * m2[i] + m2[i + 1]) / 6.0;
        c[i] = m2[i] / 2.0;
        d[i] = (m2[i + 1] - m2[i]) / (6.0 * h[i]);
    }
    (b, c, d)
}

/// Akima knot derivatives from interval slopes, with two phantom slopes on
/// each side (linear extension, or periodic wrap-around).
fn akima_derivs(s: &[f64], periodic: bool) -> Vec<f64> {
    let m = s.len();
    let n = m + 1;

    // ext[j] holds slope index j-2, so ext[i+2] = s[i].
    let mut ext = vec![0.0; m + 4];
    ext[2..(m + 2)].copy_from_slice(s);
    if periodic {
        ext[1] = s[m - 1];
        ext[0] = s[m - 2];
        ext[m + 2] = s[0];
        ext[m + 3] = s[1];
    } else {
        ext[1] = 2.0 * ext[2] - ext[3];
        ext[0] = 2.0 * ext[1] - ext[2];
        ext[m + 2] = 2.0 * ext[m + 1] - ext[m];
        ext[m + 3] = 2.0 * ext[m + 2] - ext[m + 1];
    }

    let mut t = vec![0.0; n];
    for (i, ti) in t.iter_mut().enumerate() {
        let j = i + 2;
        let w1 = (ext[j + 1] - ext[j]).abs();
        let w2 = (ext[j - 1] - ext[j - 2]).abs();
        *ti = if w1 + w2 == 0.0 {
            0.5 * (ext[j - 1] + ext[j])
        } else {
            (w1 * ext[j - 1] + w2 * ext[j]) / (w1 + w2)
        };
    }
    t
}

/// Steffen knot derivatives: interior slopes clipped so the interpolant can
/// never overshoot its bracketing samples; parabolic one-sided estimates at
/// the boundaries, clipped the same way.
fn steffen_derivs(h: &[f64], s: &[f64]) -> Vec<f64> {
    let m = s.len();
    let n = m + 1;
    let mut t = vec![0.0; n];

    t[0] = edge_deriv(s[0], s[1.min(m - 1)], h[0], h[1.min(m - 1)]);
    t[n - 1] = edge_deriv(
        s[m - 1],
        s[m.saturating_sub(2)],
        h[m - 1],
        h[m.saturating_sub(2)],
    );

    for i in 1..n - 1 {
        let (s0, s1) = (s[i - 1], s[i]);
        if s0 * s1 <= 0.0 {
            t[i] = 0.0;
            continue;
        }
        let p = (s0 * h[i] + s1 * h[i - 1]) / (h[i - 1] + h[i]);
        let bound = s0.abs().min(s1.abs()).min(0.5 * p.abs());
        t[i] = (s0.signum() + s1.signum()) * bound;
    }
    t
}

/// One-sided parabolic endpoint derivative, clipped against the adjacent
/// slope to preserve monotonicity.
fn edge_deriv(s_near: f64, s_far: f64, h_near: f64, h_far: f64) -> f64 {
    let w = h_near / (h_near + h_far);
    let p = s_near * (1.0 + w) - s_far * w;
    if p * s_near <= 0.0 {
        0.0
    } else if p.abs() > 2.0 * s_near.abs() {
        2.0 * s_near
    } else {
        p
    }
}

/// Interval coefficients of a cubic Hermite segment with knot derivatives `t`.
fn hermite_coeffs(h: &[f64], s: &[f64], t: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let m = s.len();
    let mut b = vec![0.0; m];
    let mut c = vec![0.0; m];
    let mut d = vec![0.0; m];
    for i in 0..m {
        b[i] = t[i];
        c[i] = (3.0 * s[i] - 2.0 * t[i] - t[i + 1]) / h[i];
        d[i] = (t[i] + t[i + 1] - 2.0 * s[i]) / (h[i] * h[i]);
    }
    (b, c, d)
}
