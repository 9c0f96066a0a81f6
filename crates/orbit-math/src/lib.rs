//! Interpolation primitives for SCPN Orbit Maps.
//!
//! Many splines in an equilibrium share the same abscissa, so a single
//! [`Accelerator`] amortizes one interval search over all quantities
//! co-evaluated at a query point.

pub mod accel;
pub mod spline;
pub mod spline2d;
pub mod tridiag;

pub use accel::Accelerator;
pub use spline::{Interp1d, Spline1d};
pub use spline2d::{Interp2d, Spline2d};
