use crate::error::{FilterError, Result};
use crate::Float;
use itertools::izip;

pub struct Pos {
    pub th: usize,
    pub z: usize,
}

/// Shape of one constant-radius (th, z) plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneDim {
    pub n_th: usize,
    pub n_z: usize,
}

/// Shape of a full (r, th, z) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDim {
    pub n_r: usize,
    pub n_th: usize,
    pub n_z: usize,
}

impl PlaneDim {
    pub fn len(&self) -> usize {
        self.n_th * self.n_z
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_index(&self, pos: Pos) -> usize {
        // Planes are stored in a 1d vec, row major with z running fastest.
        // Here is the layout if it were a 2d array,
        // with the 1D vec position in []
        // -------------------------------
        // |   [0]   |   [1]   |   [2]   |
        // |  th: 0  |  th: 0  |  th: 0  |
        // |  z: 0   |  z: 1   |  z: 2   |
        // -------------------------------
        // |   [3]   |   [4]   |   [5]   |
        // |  th: 1  |  th: 1  |  th: 1  |
        // |  z: 0   |  z: 1   |  z: 2   |
        // -------------------------------
        if !cfg!(feature = "unchecked") {
            assert!(pos.th < self.n_th);
            assert!(pos.z < self.n_z);
        }

        pos.th * self.n_z + pos.z
    }

    fn shape(&self) -> Vec<usize> {
        vec![self.n_th, self.n_z]
    }
}

impl FieldDim {
    pub fn plane(&self) -> PlaneDim {
        PlaneDim {
            n_th: self.n_th,
            n_z: self.n_z,
        }
    }

    pub fn plane_len(&self) -> usize {
        self.n_th * self.n_z
    }

    pub fn len(&self) -> usize {
        self.n_r * self.plane_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of `pos` within radial plane `ir`.
    pub fn get_index(&self, ir: usize, pos: Pos) -> usize {
        if !cfg!(feature = "unchecked") {
            assert!(ir < self.n_r);
        }
        ir * self.plane_len() + self.plane().get_index(pos)
    }

    pub fn shape(&self) -> Vec<usize> {
        vec![self.n_r, self.n_th, self.n_z]
    }
}

/// A real scalar sampled on a (r, th, z) grid, stored as `[r][th][z]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    values: Vec<Float>,
    dim: FieldDim,
}

/// One constant-radius slice of a `ScalarField`, stored as `[th][z]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarPlane {
    values: Vec<Float>,
    dim: PlaneDim,
}

impl ScalarField {
    pub fn new(values: Vec<Float>, dim: FieldDim) -> Result<ScalarField> {
        if values.len() != dim.len() {
            return Err(FilterError::ShapeMismatch {
                what: "scalar field",
                expected: dim.shape(),
                found: vec![values.len()],
            });
        }
        Ok(ScalarField { values, dim })
    }

    pub fn zeros(dim: FieldDim) -> ScalarField {
        ScalarField {
            values: vec![0.0; dim.len()],
            dim,
        }
    }

    /// Builds a field by evaluating `f(ir, ith, iz)` at every grid point.
    pub fn from_fn<F>(dim: FieldDim, mut f: F) -> ScalarField
    where
        F: FnMut(usize, usize, usize) -> Float,
    {
        let mut values = Vec::with_capacity(dim.len());
        for ir in 0..dim.n_r {
            for ith in 0..dim.n_th {
                for iz in 0..dim.n_z {
                    values.push(f(ir, ith, iz));
                }
            }
        }
        ScalarField { values, dim }
    }

    pub fn dim(&self) -> FieldDim {
        self.dim
    }

    pub fn plane(&self, ir: usize) -> &[Float] {
        let n = self.dim.plane_len();
        &self.values[ir * n..(ir + 1) * n]
    }

    pub fn values(&self) -> &[Float] {
        &self.values
    }

    /// Mutable view of the samples; the length is fixed by `dim`.
    pub fn values_mut(&mut self) -> &mut [Float] {
        &mut self.values
    }

    pub fn to_plane(&self, ir: usize) -> ScalarPlane {
        ScalarPlane {
            values: self.plane(ir).to_vec(),
            dim: self.dim.plane(),
        }
    }

    /// Point-wise product, e.g. `u_r * u_z` ahead of filtering a stress term.
    pub fn product(&self, other: &ScalarField) -> Result<ScalarField> {
        if self.dim != other.dim {
            return Err(FilterError::ShapeMismatch {
                what: "field product",
                expected: self.dim.shape(),
                found: other.dim.shape(),
            });
        }
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .collect();
        Ok(ScalarField {
            values,
            dim: self.dim,
        })
    }

    /// Removes a radial mean profile, `u'(r, th, z) = u(r, th, z) - mean(r)`.
    pub fn subtract_mean_profile(&mut self, mean: &[Float]) -> Result<()> {
        if mean.len() != self.dim.n_r {
            return Err(FilterError::ShapeMismatch {
                what: "mean profile",
                expected: vec![self.dim.n_r],
                found: vec![mean.len()],
            });
        }
        let n = self.dim.plane_len();
        if n == 0 {
            return Ok(());
        }
        for (plane, m) in izip!(self.values.chunks_mut(n), mean) {
            plane.iter_mut().for_each(|v| *v -= m);
        }
        Ok(())
    }
}

impl ScalarPlane {
    pub fn new(values: Vec<Float>, dim: PlaneDim) -> Result<ScalarPlane> {
        if values.len() != dim.len() {
            return Err(FilterError::ShapeMismatch {
                what: "scalar plane",
                expected: dim.shape(),
                found: vec![values.len()],
            });
        }
        Ok(ScalarPlane { values, dim })
    }

    pub fn from_fn<F>(dim: PlaneDim, mut f: F) -> ScalarPlane
    where
        F: FnMut(usize, usize) -> Float,
    {
        let mut values = Vec::with_capacity(dim.len());
        for ith in 0..dim.n_th {
            for iz in 0..dim.n_z {
                values.push(f(ith, iz));
            }
        }
        ScalarPlane { values, dim }
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

    /// Sum of squares, proportional to the total spectral power (Parseval).
    pub fn energy(&self) -> Float {
        self.values.iter().map(|v| v * v).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim() -> FieldDim {
        FieldDim {
            n_r: 3,
            n_th: 4,
            n_z: 5,
        }
    }

    #[test]
    fn row_major_order() {
        let d = dim();
        let fld = ScalarField::from_fn(d, |ir, ith, iz| (100 * ir + 10 * ith + iz) as Float);
        assert_eq!(fld.values.len(), 60);
        let i = d.get_index(2, Pos { th: 3, z: 1 });
        assert_eq!(fld.values[i], 231.0);
        let plane = fld.to_plane(1);
        assert_eq!(plane.get(2, 4), 124.0);
        assert_eq!(plane.dim(), d.plane());
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = ScalarField::new(vec![0.0; 59], dim()).unwrap_err();
        assert!(matches!(err, FilterError::ShapeMismatch { .. }));
        let err = ScalarPlane::new(vec![0.0; 3], dim().plane()).unwrap_err();
        assert!(matches!(err, FilterError::ShapeMismatch { .. }));
    }

    #[test]
    fn product_and_fluctuation() {
        let d = dim();
        let a = ScalarField::from_fn(d, |ir, _, _| ir as Float + 1.0);
        let b = ScalarField::from_fn(d, |_, ith, _| ith as Float);
        let ab = a.product(&b).unwrap();
        assert_eq!(ab.plane(2)[d.plane().get_index(Pos { th: 3, z: 0 })], 9.0);

        let mut u = a.clone();
        u.subtract_mean_profile(&[1.0, 2.0, 3.0]).unwrap();
        assert!(u.values.iter().all(|&v| v == 0.0));
        assert!(u.subtract_mean_profile(&[1.0]).is_err());

        let other = ScalarField::zeros(FieldDim { n_r: 1, ..d });
        assert!(a.product(&other).is_err());
    }

    #[test]
    fn plane_energy() {
        let p = ScalarPlane::from_fn(PlaneDim { n_th: 2, n_z: 2 }, |ith, iz| (ith + iz) as Float);
        assert_eq!(p.energy(), 0.0 + 1.0 + 1.0 + 4.0);
    }
}
