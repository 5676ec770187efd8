use crate::error::{FilterError, Result};
use crate::flds::field::FieldDim;
use crate::Float;

// relative tolerance when checking that th and z are equidistant
const SPACING_TOL: Float = 1e-6;

/// Grid vectors of a cylindrical (r, th, z) domain.
///
/// `th` (radian) and `z` (length) must be equidistant, they are the homogeneous
/// directions the FFT runs along. `r` may be stretched, it only converts the
/// angular spacing into an arc length.
#[derive(Debug, Clone)]
pub struct Grid {
    r: Vec<Float>,
    th: Vec<Float>,
    z: Vec<Float>,
    d_th: Float,
    d_z: Float,
}

impl Grid {
    pub fn new(r: Vec<Float>, th: Vec<Float>, z: Vec<Float>) -> Result<Grid> {
        let d_th = axis_spacing("th", &th)?;
        let d_z = axis_spacing("z", &z)?;
        Ok(Grid { r, th, z, d_th, d_z })
    }

    pub fn dim(&self) -> FieldDim {
        FieldDim {
            n_r: self.r.len(),
            n_th: self.th.len(),
            n_z: self.z.len(),
        }
    }

    pub fn r(&self) -> &[Float] {
        &self.r
    }

    pub fn th(&self) -> &[Float] {
        &self.th
    }

    pub fn z(&self) -> &[Float] {
        &self.z
    }

    /// Angular sample spacing in radian.
    pub fn th_spacing(&self) -> Float {
        self.d_th
    }

    pub fn z_spacing(&self) -> Float {
        self.d_z
    }

    /// Azimuthal sample spacing as arc length at radius `r_pos`.
    pub fn arc_spacing(&self, r_pos: Float) -> Result<Float> {
        arc_spacing(self.d_th, r_pos)
    }
}

pub(crate) fn arc_spacing(d_th: Float, r_pos: Float) -> Result<Float> {
    let d = d_th * r_pos;
    if !r_pos.is_finite() || r_pos <= 0.0 || !d.is_finite() || d == 0.0 {
        return Err(FilterError::InvalidRadius(r_pos));
    }
    Ok(d)
}

/// Sample spacing of an equidistant grid vector.
pub(crate) fn axis_spacing(axis: &'static str, v: &[Float]) -> Result<Float> {
    if v.len() < 2 {
        return Err(FilterError::DegenerateGrid { axis, len: v.len() });
    }
    let d = v[1] - v[0];
    if !d.is_finite() || d == 0.0 {
        return Err(FilterError::NonUniformGrid {
            axis,
            index: 1,
            spacing: d,
        });
    }
    for (i, w) in v.windows(2).enumerate().skip(1) {
        if ((w[1] - w[0]) - d).abs() > SPACING_TOL * d.abs() {
            return Err(FilterError::NonUniformGrid {
                axis,
                index: i + 1,
                spacing: d,
            });
        }
    }
    Ok(d)
}

/// `n` equidistant points covering `[0, period)`.
pub fn periodic_axis(n: usize, period: Float) -> Vec<Float> {
    let d = period / n as Float;
    (0..n).map(|i| i as Float * d).collect()
}
