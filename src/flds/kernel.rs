//! Separable 2D filter kernels in (th, z) wavenumber space.
//!
//! Every family is the outer product of two 1D kernels, one per homogeneous
//! direction, evaluated on the FFT wavenumbers of the plane. All of them equal
//! one at zero wavenumber, so filtering keeps the plane mean.

use crate::error::{FilterError, Result};
use crate::flds::field::{PlaneDim, Pos};
use crate::flds::wave_num::WaveNumbers;
use crate::grid::{arc_spacing, axis_spacing};
use crate::{Float, PI};
use serde::Deserialize;

/// Shape of the sharp spectral cut-off in the (kappa_th, kappa_z) plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelShape {
    Rectangular,
    /// Not available, requesting it is an error.
    Elliptical,
}

impl Default for KernelShape {
    fn default() -> Self {
        KernelShape::Rectangular
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    /// Sharp spectral cut-off at `kappa_c = pi / lambda`.
    Fourier(KernelShape),
    /// Gaussian with second moment `lambda^2 / 24`.
    Gauss,
    /// Top hat of width `lambda`.
    Box,
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Fourier(_) => "fourier",
            FilterKind::Gauss => "gauss",
            FilterKind::Box => "box",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            FilterKind::Fourier(KernelShape::Elliptical) => Err(FilterError::Unsupported(
                "elliptical (circular) Fourier kernel is not implemented, use a rectangular one"
                    .to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// 1D kernel at wavenumber `k` (cycles per length) for filter width `lambda`.
    pub fn kernel_1d(&self, k: Float, lambda: Float) -> Float {
        let kappa = 2.0 * PI * k;
        match self {
            FilterKind::Fourier(_) => {
                if kappa.abs() <= PI / lambda {
                    1.0
                } else {
                    0.0
                }
            }
            FilterKind::Gauss => (-(kappa * lambda).powi(2) / 24.0).exp(),
            FilterKind::Box => sinc(k * lambda),
        }
    }
}

/// Normalised sine cardinal, `sin(pi x) / (pi x)`.
pub fn sinc(x: Float) -> Float {
    if x == 0.0 {
        1.0
    } else {
        let y = PI * x;
        y.sin() / y
    }
}

/// Filter widths in th (arc length) and z, same length unit as the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterWidths {
    pub lambda_th: Float,
    pub lambda_z: Float,
}

impl FilterWidths {
    pub fn new(lambda_th: Float, lambda_z: Float) -> Result<FilterWidths> {
        let widths = FilterWidths {
            lambda_th,
            lambda_z,
        };
        widths.validate()?;
        Ok(widths)
    }

    /// Widths given in viscous units, scaled by the shear Reynolds number.
    pub fn from_plus_units(lambda_th_plus: Float, lambda_z_plus: Float, re_tau: Float) -> Result<FilterWidths> {
        FilterWidths::new(lambda_th_plus / re_tau, lambda_z_plus / re_tau)
    }

    pub fn validate(&self) -> Result<()> {
        for &(axis, value) in &[("th", self.lambda_th), ("z", self.lambda_z)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FilterError::InvalidWidth { axis, value });
            }
        }
        Ok(())
    }
}

/// Real-valued multiplier on the 2D spectrum of a (th, z) plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel2D {
    values: Vec<Float>,
    dim: PlaneDim,
}

impl Kernel2D {
    /// Builds the kernel of `kind` for the plane at radius `r_pos`.
    ///
    /// The azimuthal spacing is `(th[1] - th[0]) * r_pos`, so `lambda_th` is an
    /// arc length at that radius.
    pub fn build(
        kind: FilterKind,
        r_pos: Float,
        widths: FilterWidths,
        th: &[Float],
        z: &[Float],
    ) -> Result<Kernel2D> {
        kind.validate()?;
        widths.validate()?;
        let d_th = arc_spacing(axis_spacing("th", th)?, r_pos)?;
        let d_z = axis_spacing("z", z)?;
        Ok(Kernel2D::from_spacing(kind, widths, th.len(), d_th, z.len(), d_z))
    }

    // inputs are validated by the caller
    pub(crate) fn from_spacing(
        kind: FilterKind,
        widths: FilterWidths,
        n_th: usize,
        d_th: Float,
        n_z: usize,
        d_z: Float,
    ) -> Kernel2D {
        let wn = WaveNumbers::new(n_th, d_th, n_z, d_z);
        let g_th: Vec<Float> = wn
            .k_th
            .iter()
            .map(|&k| kind.kernel_1d(k, widths.lambda_th))
            .collect();
        let g_z: Vec<Float> = wn
            .k_z
            .iter()
            .map(|&k| kind.kernel_1d(k, widths.lambda_z))
            .collect();

        let mut values = Vec::with_capacity(n_th * n_z);
        for gt in &g_th {
            values.extend(g_z.iter().map(|gz| gt * gz));
        }
        Kernel2D {
            values,
            dim: PlaneDim { n_th, n_z },
        }
    }

    pub fn dim(&self) -> PlaneDim {
        self.dim
    }

    pub fn values(&self) -> &[Float] {
        &self.values
    }

    pub fn get(&self, th: usize, z: usize) -> Float {
        self.values[self.dim.get_index(Pos { th, z })]
    }
}
