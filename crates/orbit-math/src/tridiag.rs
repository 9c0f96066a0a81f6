// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Tridiag
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Thomas algorithm for the tridiagonal systems behind cubic splines.

/// Solve the tridiagonal system Ax = d with the Thomas algorithm.
///
/// - `sub`: sub-diagonal \[n\] (`sub[0]` unused)
/// - `diag`: main diagonal \[n\]
/// - `sup`: super-diagonal \[n\] (`sup[n-1]` unused)
/// - `rhs`: right-hand side \[n\]
///
/// The spline systems fed into this are diagonally dominant, so no pivoting
/// is performed. Panics on a zero pivot (singular system).
pub fn thomas_solve(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = rhs.len();
    assert!(n > 0, "system size must be > 0");
    assert_eq!(sub.len(), n);
    assert_eq!(diag.len(), n);
    assert_eq!(sup.len(), n);

    let mut sup_prime = vec![0.0; n];
    let mut rhs_prime = vec![0.0; n];

    assert!(diag[0] != 0.0, "singular tridiagonal system");
    sup_prime[0] = sup[0] / diag[0];
    rhs_prime[0] = rhs[0] / diag[0];

    for i in 1..n {
        let pivot = diag[i] - sub[i] * sup_prime[i - 1];
        assert!(pivot != 0.0, "singular tridiagonal system");
        if i < n - 1 {
            sup_prime[i] = sup[i] / pivot;
        }
        rhs_prime[i] = (rhs[i] - sub[i] * rhs_prime[i - 1]) / pivot;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = rhs_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = rhs_prime[i] - sup_prime[i] * x[i + 1];
    }

    x
}
