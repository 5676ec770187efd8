//! Filtering of whole (r, th, z) fields, one constant-radius plane at a time.

use crate::error::{FilterError, Result};
use crate::flds::fft_2d::{Fft2D, FftWorkspace};
use crate::flds::field::ScalarField;
use crate::flds::kernel::{FilterKind, FilterWidths, Kernel2D, KernelShape};
use crate::flds::plane::filter_plane_into;
use crate::grid::{arc_spacing, Grid};
use crate::Float;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Reference radius of the historical constant-angle convention.
pub const LEGACY_REFERENCE_RADIUS: Float = 0.986;

/// Which radius converts `lambda_th` from arc length into an angle.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusPolicy {
    /// Plane `i` uses `r[i]`: the same arc length at every radius.
    PerRadius,
    /// Every plane uses the given radius: the same angle at every radius.
    FixedReference(Float),
}

impl Default for RadiusPolicy {
    fn default() -> Self {
        RadiusPolicy::PerRadius
    }
}

impl RadiusPolicy {
    pub fn radius(&self, r: &[Float], ir: usize) -> Float {
        match *self {
            RadiusPolicy::PerRadius => r[ir],
            RadiusPolicy::FixedReference(r_ref) => r_ref,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Execution {
    Serial,
    /// Planes are spread over a worker pool; `None` uses rayon's global pool.
    Parallel { threads: Option<usize> },
}

impl Default for Execution {
    fn default() -> Self {
        Execution::Parallel { threads: None }
    }
}

/// Applies one 2D filter to every radial plane of a field.
///
/// A dedicated worker pool, when requested, is built once in `new` and reused
/// by every call.
pub struct VolumeFilter {
    policy: RadiusPolicy,
    execution: Execution,
    pool: Option<Arc<ThreadPool>>,
}

enum PlaneKernels {
    Shared(Kernel2D),
    PerPlane { d_th: Float, d_z: Float },
}

impl VolumeFilter {
    pub fn new(policy: RadiusPolicy, execution: Execution) -> Result<VolumeFilter> {
        let pool = match execution {
            Execution::Parallel {
                threads: Some(threads),
            } => Some(Arc::new(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("pipe-filter-{}", i))
                    .build()?,
            )),
            _ => None,
        };
        Ok(VolumeFilter {
            policy,
            execution,
            pool,
        })
    }

    /// Sharp spectral cut-off.
    pub fn fourier_2d(
        &self,
        u: &ScalarField,
        widths: FilterWidths,
        grid: &Grid,
        shape: KernelShape,
    ) -> Result<ScalarField> {
        self.filter(u, FilterKind::Fourier(shape), widths, grid)
    }

    pub fn gauss_2d(&self, u: &ScalarField, widths: FilterWidths, grid: &Grid) -> Result<ScalarField> {
        self.filter(u, FilterKind::Gauss, widths, grid)
    }

    pub fn box_2d(&self, u: &ScalarField, widths: FilterWidths, grid: &Grid) -> Result<ScalarField> {
        self.filter(u, FilterKind::Box, widths, grid)
    }

    /// Kernel the plane at radial index `ir` is filtered with.
    pub fn kernel(&self, kind: FilterKind, widths: FilterWidths, grid: &Grid, ir: usize) -> Result<Kernel2D> {
        if ir >= grid.r().len() {
            return Err(FilterError::ShapeMismatch {
                what: "radial index",
                expected: vec![grid.r().len()],
                found: vec![ir],
            });
        }
        Kernel2D::build(kind, self.policy.radius(grid.r(), ir), widths, grid.th(), grid.z())
    }

    /// Filters every radial plane of `u`. Nothing is returned unless all
    /// planes succeed.
    pub fn filter(
        &self,
        u: &ScalarField,
        kind: FilterKind,
        widths: FilterWidths,
        grid: &Grid,
    ) -> Result<ScalarField> {
        let kernels = self.prepare(u, kind, widths, grid)?;
        let dim = grid.dim();
        let fft = Fft2D::new(dim.plane());
        let mut out = ScalarField::zeros(dim);
        let plane_len = dim.plane_len();
        if plane_len == 0 || dim.n_r == 0 {
            return Ok(out);
        }

        let t0 = Instant::now();
        let filter_one = |ws: &mut FftWorkspace, ir: usize, src: &[Float], dst: &mut [Float]| -> Result<()> {
            match &kernels {
                PlaneKernels::Shared(kernel) => filter_plane_into(&fft, kernel, src, dst, ws),
                PlaneKernels::PerPlane { d_th, d_z } => {
                    let r_pos = grid.r()[ir];
                    let kernel = Kernel2D::from_spacing(
                        kind,
                        widths,
                        dim.n_th,
                        arc_spacing(*d_th, r_pos)?,
                        dim.n_z,
                        *d_z,
                    );
                    debug!(ir, r_pos, "filtering plane");
                    filter_plane_into(&fft, &kernel, src, dst, ws)
                }
            }
        };

        match self.execution {
            Execution::Serial => {
                let mut ws = fft.workspace();
                out.values_mut()
                    .chunks_mut(plane_len)
                    .zip(u.values().chunks(plane_len))
                    .enumerate()
                    .try_for_each(|(ir, (dst, src))| filter_one(&mut ws, ir, src, dst))?;
            }
            Execution::Parallel { .. } => {
                let mut run = || {
                    out.values_mut()
                        .par_chunks_mut(plane_len)
                        .zip(u.values().par_chunks(plane_len))
                        .enumerate()
                        .try_for_each_init(
                            || fft.workspace(),
                            |ws, (ir, (dst, src))| filter_one(ws, ir, src, dst),
                        )
                };
                match &self.pool {
                    Some(pool) => pool.install(run)?,
                    None => run()?,
                }
            }
        }

        info!(
            filter = kind.name(),
            planes = dim.n_r,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "filtered field"
        );
        Ok(out)
    }

    // Everything that can fail is checked here, before any plane is dispatched.
    fn prepare(
        &self,
        u: &ScalarField,
        kind: FilterKind,
        widths: FilterWidths,
        grid: &Grid,
    ) -> Result<PlaneKernels> {
        kind.validate()?;
        widths.validate()?;
        let dim = grid.dim();
        if u.dim() != dim {
            return Err(FilterError::ShapeMismatch {
                what: "field vs grid",
                expected: dim.shape(),
                found: u.dim().shape(),
            });
        }

        match self.policy {
            RadiusPolicy::FixedReference(r_ref) => {
                debug!(r_ref, "sharing one kernel across all planes");
                let d_th = grid.arc_spacing(r_ref)?;
                Ok(PlaneKernels::Shared(Kernel2D::from_spacing(
                    kind,
                    widths,
                    dim.n_th,
                    d_th,
                    dim.n_z,
                    grid.z_spacing(),
                )))
            }
            RadiusPolicy::PerRadius => {
                for &r_pos in grid.r() {
                    grid.arc_spacing(r_pos)?;
                }
                Ok(PlaneKernels::PerPlane {
                    d_th: grid.th_spacing(),
                    d_z: grid.z_spacing(),
                })
            }
        }
    }
}

fn default_filter(policy: RadiusPolicy) -> VolumeFilter {
    VolumeFilter {
        policy,
        execution: Execution::default(),
        pool: None,
    }
}

/// Sharp spectral cut-off of every radial plane, on rayon's global pool.
pub fn fourier_2d(
    u: &ScalarField,
    widths: FilterWidths,
    grid: &Grid,
    shape: KernelShape,
    policy: RadiusPolicy,
) -> Result<ScalarField> {
    default_filter(policy).fourier_2d(u, widths, grid, shape)
}

/// Gauss filter of every radial plane, on rayon's global pool.
pub fn gauss_2d(u: &ScalarField, widths: FilterWidths, grid: &Grid, policy: RadiusPolicy) -> Result<ScalarField> {
    default_filter(policy).gauss_2d(u, widths, grid)
}

/// Box filter of every radial plane, on rayon's global pool.
pub fn box_2d(u: &ScalarField, widths: FilterWidths, grid: &Grid, policy: RadiusPolicy) -> Result<ScalarField> {
    default_filter(policy).box_2d(u, widths, grid)
}
