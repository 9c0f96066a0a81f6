//! Tensor-product 2D interpolation on an (x, y) grid.
//!
//! Bicubic surfaces are Hermite cells whose knot derivatives come from
//! natural cubic splines along the grid rows and columns, so the surface is
//! C¹ and exact on the knots.

use ndarray::{Array1, Array2};
use orbit_types::error::{OrbitError, OrbitResult};

use crate::accel::Accelerator;
use crate::spline::{Interp1d, Spline1d};

/// 2D interpolation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interp2d {
    /// Bilinear cells, C⁰.
    Bilinear,
    /// Hermite bicubic cells with spline-derived knot derivatives, C¹.
    Bicubic,
}

impl Interp2d {
    /// Parses a case-insensitive selector string.
    pub fn from_name(name: &str) -> OrbitResult<Self> {
        match name.to_lowercase().as_str() {
            "bilinear" => Ok(Self::Bilinear),
            "bicubic" => Ok(Self::Bicubic),
            _ => Err(OrbitError::UnknownInterpolation(name.to_string())),
        }
    }

    /// Minimum number of points per axis.
    pub fn min_points(&self) -> usize {
        match self {
            Self::Bilinear => 2,
            Self::Bicubic => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
        }
    }
}

/// A 2D tensor-product spline over `za[[i, j]] = z(xa[i], ya[j])`.
///
/// Each query takes one [`Accelerator`] per axis; the x-axis accelerator may
/// be the same object that serves 1D splines built on the same abscissa.
#[derive(Debug, Clone)]
pub struct Spline2d {
    /// Interpolation variant this spline was built with.
    pub variant: Interp2d,
    /// First-axis samples.
    pub xa: Array1<f64>,
    /// Second-axis samples.
    pub ya: Array1<f64>,
    /// Value grid, shape (len(xa), len(ya)).
    pub za: Array2<f64>,
    zx: Array2<f64>,
    zy: Array2<f64>,
    zxy: Array2<f64>,
}

impl Spline2d {
    /// Builds a 2D spline from grid samples.
    pub fn build(variant: Interp2d, xa: &[f64], ya: &[f64], za: &Array2<f64>) -> OrbitResult<Self> {
        check_grid(variant, xa, ya, za)?;

        let n = xa.len();
        let m = ya.len();
        let (zx, zy, zxy) = match variant {
            Interp2d::Bilinear => (
                Array2::zeros((n, m)),
                Array2::zeros((n, m)),
                Array2::zeros((n, m)),
            ),
            Interp2d::Bicubic => knot_derivatives(xa, ya, za)?,
        };

        Ok(Self {
            variant,
            xa: Array1::from_vec(xa.to_vec()),
            ya: Array1::from_vec(ya.to_vec()),
            za: za.clone(),
            zx,
            zy,
            zxy,
        })
    }

    /// Builds a 2D spline from a selector string.
    pub fn from_name(name: &str, xa: &[f64], ya: &[f64], za: &Array2<f64>) -> OrbitResult<Self> {
        Self::build(Interp2d::from_name(name)?, xa, ya, za)
    }

    pub fn x_min(&self) -> f64 {
        self.xa[0]
    }

    pub fn x_max(&self) -> f64 {
        self.xa[self.xa.len() - 1]
    }

    pub fn y_min(&self) -> f64 {
        self.ya[0]
    }

    pub fn y_max(&self) -> f64 {
        self.ya[self.ya.len() - 1]
    }

    /// Interpolated value z(x, y).
    pub fn eval(&self, x: f64, y: f64, xacc: &mut Accelerator, yacc: &mut Accelerator) -> f64 {
        self.query(x, y, 0, 0, xacc, yacc)
    }

    /// ∂z/∂x.
    pub fn d_dx(&self, x: f64, y: f64, xacc: &mut Accelerator, yacc: &mut Accelerator) -> f64 {
        self.query(x, y, 1, 0, xacc, yacc)
    }

    /// ∂z/∂y.
    pub fn d_dy(&self, x: f64, y: f64, xacc: &mut Accelerator, yacc: &mut Accelerator) -> f64 {
        self.query(x, y, 0, 1, xacc, yacc)
    }

    /// ∂²z/∂x².
    pub fn d2_dx2(&self, x: f64, y: f64, xacc: &mut Accelerator, yacc: &mut Accelerator) -> f64 {
        self.query(x, y, 2, 0, xacc, yacc)
    }

    /// ∂²z/∂y².
    pub fn d2_dy2(&self, x: f64, y: f64, xacc: &mut Accelerator, yacc: &mut Accelerator) -> f64 {
        self.query(x, y, 0, 2, xacc, yacc)
    }

    /// Mixed partial ∂²z/∂x∂y.
    pub fn d2_dx_dy(&self, x: f64, y: f64, xacc: &mut Accelerator, yacc: &mut Accelerator) -> f64 {
        self.query(x, y, 1, 1, xacc, yacc)
    }

    fn query(
        &self,
        x: f64,
        y: f64,
        order_x: u8,
        order_y: u8,
        xacc: &mut Accelerator,
        yacc: &mut Accelerator,
    ) -> f64 {
        let i = xacc.locate(&self.xa, x);
        let j = yacc.locate(&self.ya, y);
        let dx = self.xa[i + 1] - self.xa[i];
        let dy = self.ya[j + 1] - self.ya[j];
        let u = (x - self.xa[i]) / dx;
        let v = (y - self.ya[j]) / dy;

        match self.variant {
            Interp2d::Bilinear => self.bilinear_cell(i, j, u, v, dx, dy, order_x, order_y),
            Interp2d::Bicubic => self.bicubic_cell(i, j, u, v, dx, dy, order_x, order_y),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn bilinear_cell(
        &self,
        i: usize,
        j: usize,
        u: f64,
        v: f64,
        dx: f64,
        dy: f64,
        order_x: u8,
        order_y: u8,
    ) -> f64 {
        let z00 = self.za[[i, j]];
        let z10 = self.za[[i + 1, j]];
        let z01 = self.za[[i, j + 1]];
        let z11 = self.za[[i + 1, j + 1]];

        match (order_x, order_y) {
            (0, 0) => {
                (1.0 - u) * (1.0 - v) * z00 + u * (1.0 - v) * z10 + (1.0 - u) * v * z01 + u * v * z11
            }
            (1, 0) => ((1.0 - v) * (z10 - z00) + v * (z11 - z01)) / dx,
            (0, 1) => ((1.0 - u) * (z01 - z00) + u * (z11 - z10)) / dy,
            (1, 1) => (z11 - z10 - z01 + z00) / (dx * dy),
            _ => 0.0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn bicubic_cell(
        &self,
        i: usize,
        j: usize,
        u: f64,
        v: f64,
        dx: f64,
        dy: f64,
        order_x: u8,
        order_y: u8,
    ) -> f64 {
        let (ax, bx) = hermite_basis(u, dx, order_x);
        let (ay, by) = hermite_basis(v, dy, order_y);

        let mut sum = 0.0;
        for a in 0..2 {
            for b in 0..2 {
                let (ia, jb) = (i + a, j + b);
                sum += ax[a] * ay[b] * self.za[[ia, jb]]
                    + bx[a] * ay[b] * self.zx[[ia, jb]]
                    + ax[a] * by[b] * self.zy[[ia, jb]]
                    + bx[a] * by[b] * self.zxy[[ia, jb]];
            }
        }
        sum
    }
}

/// Hermite basis weights for one axis at normalized coordinate `u`.
///
/// Returns (value weights for the two corner values, weights for the two
/// corner derivatives), differentiated `order` times with the 1/dx chain
/// factors applied.
fn hermite_basis(u: f64, dx: f64, order: u8) -> ([f64; 2], [f64; 2]) {
    let (h00, h01, h10, h11) = match order {
        0 => (
            1.0 + u * u * (2.0 * u - 3.0),
            u * u * (3.0 - 2.0 * u),
            u * (1.0 + u * (u - 2.0)),
            u * u * (u - 1.0),
        ),
        1 => (
            6.0 * u * (u - 1.0),
            6.0 * u * (1.0 - u),
            1.0 + u * (3.0 * u - 4.0),
            u * (3.0 * u - 2.0),
        ),
        _ => (
            12.0 * u - 6.0,
            6.0 - 12.0 * u,
            6.0 * u - 4.0,
            6.0 * u - 2.0,
        ),
    };
    let scale = match order {
        0 => 1.0,
        1 => 1.0 / dx,
        _ => 1.0 / (dx * dx),
    };
    ([h00 * scale, h01 * scale], [h10 * dx * scale, h11 * dx * scale])
}

/// Knot derivatives for bicubic cells: ∂z/∂x down each column, ∂z/∂y along
/// each row, and the mixed partial by splining the ∂z/∂x grid along y.
fn knot_derivatives(
    xa: &[f64],
    ya: &[f64],
    za: &Array2<f64>,
) -> OrbitResult<(Array2<f64>, Array2<f64>, Array2<f64>)> {
    let n = xa.len();
    let m = ya.len();
    let mut zx = Array2::zeros((n, m));
    let mut zy = Array2::zeros((n, m));
    let mut zxy = Array2::zeros((n, m));
    let mut acc = Accelerator::new();

    for j in 0..m {
        let column: Vec<f64> = (0..n).map(|i| za[[i, j]]).collect();
        let spline = Spline1d::build(Interp1d::Cubic, xa, &column)?;
        for (i, &x) in xa.iter().enumerate() {
            zx[[i, j]] = spline.d_dx(x, &mut acc);
        }
    }

    for i in 0..n {
        let row: Vec<f64> = (0..m).map(|j| za[[i, j]]).collect();
        let spline = Spline1d::build(Interp1d::Cubic, ya, &row)?;
        for (j, &y) in ya.iter().enumerate() {
            zy[[i, j]] = spline.d_dx(y, &mut acc);
        }

        let zx_row: Vec<f64> = (0..m).map(|j| zx[[i, j]]).collect();
        let spline = Spline1d::build(Interp1d::Cubic, ya, &zx_row)?;
        for (j, &y) in ya.iter().enumerate() {
            zxy[[i, j]] = spline.d_dx(y, &mut acc);
        }
    }

    Ok((zx, zy, zxy))
}

fn check_grid(variant: Interp2d, xa: &[f64], ya: &[f64], za: &Array2<f64>) -> OrbitResult<()> {
    for (axis, data) in [("x", xa), ("y", ya)] {
        if data.len() < variant.min_points() {
            return Err(OrbitError::InsufficientPoints {
                variant: variant.name(),
                required: variant.min_points(),
                got: data.len(),
            });
        }
        if let Some(i) = (1..data.len()).find(|&i| data[i] <= data[i - 1]) {
            return Err(OrbitError::NonMonotone(format!(
                "{axis}-axis sample {i} does not exceed its predecessor"
            )));
        }
        if let Some(bad) = data.iter().find(|v| !v.is_finite()) {
            return Err(OrbitError::MalformedInput(format!(
                "{axis}-axis sample is not finite: {bad}"
            )));
        }
    }
    if za.dim() != (xa.len(), ya.len()) {
        return Err(OrbitError::ShapeMismatch(format!(
            "value grid shape {:?} does not match axes ({}, {})",
            za.dim(),
            xa.len(),
            ya.len()
        )));
    }
    if let Some(bad) = za.iter().find(|v| !v.is_finite()) {
        return Err(OrbitError::MalformedInput(format!(
            "grid sample is not finite: {bad}"
        )));
    }
    Ok(())
}
