use crate::error::{FilterError, Result};
use crate::flds::fft_2d::{Fft2D, FftWorkspace};
use crate::flds::field::ScalarPlane;
use crate::flds::kernel::{FilterKind, FilterWidths, Kernel2D};
use crate::Float;
use itertools::izip;

/// Filters one (th, z) plane with `kernel` via the convolution theorem.
///
/// `plane` and `out` are `[th][z]` slices of the kernel's shape. The inverse
/// transform keeps only the real part, the imaginary part is round-off. The
/// implied spatial convolution is periodic in both th and z.
pub fn filter_plane_into(
    fft: &Fft2D,
    kernel: &Kernel2D,
    plane: &[Float],
    out: &mut [Float],
    ws: &mut FftWorkspace,
) -> Result<()> {
    let dim = fft.dim();
    if kernel.dim() != dim || plane.len() != dim.len() || out.len() != dim.len() {
        return Err(FilterError::ShapeMismatch {
            what: "plane filter",
            expected: vec![dim.n_th, dim.n_z],
            found: vec![plane.len(), kernel.values().len(), out.len()],
        });
    }

    for (c, &v) in ws.spectral.iter_mut().zip(plane) {
        c.re = v;
        c.im = 0.0;
    }
    fft.fft(ws);
    for (c, &g) in ws.spectral.iter_mut().zip(kernel.values()) {
        *c *= g;
    }
    fft.inv_fft(ws);
    for (o, c) in izip!(out.iter_mut(), &ws.spectral) {
        *o = c.re;
    }
    Ok(())
}

/// Filters a single plane, allocating its own transform plans.
pub fn filter_plane(plane: &ScalarPlane, kernel: &Kernel2D) -> Result<ScalarPlane> {
    let fft = Fft2D::new(plane.dim());
    let mut ws = fft.workspace();
    let mut out = vec![0.0; plane.values().len()];
    filter_plane_into(&fft, kernel, plane.values(), &mut out, &mut ws)?;
    ScalarPlane::new(out, plane.dim())
}

/// Builds the kernel for radius `r_pos` and filters `plane` with it.
pub fn filter_plane_at(
    plane: &ScalarPlane,
    kind: FilterKind,
    r_pos: Float,
    widths: FilterWidths,
    th: &[Float],
    z: &[Float],
) -> Result<ScalarPlane> {
    let kernel = Kernel2D::build(kind, r_pos, widths, th, z)?;
    filter_plane(plane, &kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flds::field::PlaneDim;
    use crate::flds::kernel::KernelShape;
    use crate::grid::periodic_axis;
    use crate::{E_TOL, PI};

    const FOURIER: FilterKind = FilterKind::Fourier(KernelShape::Rectangular);

    fn axes() -> (Vec<Float>, Vec<Float>) {
        (periodic_axis(8, 2.0 * PI), periodic_axis(8, 1.0))
    }

    fn wave(th: &[Float], z: &[Float], m: Float, n: Float) -> ScalarPlane {
        let dim = PlaneDim {
            n_th: th.len(),
            n_z: z.len(),
        };
        ScalarPlane::from_fn(dim, |i, j| (m * th[i] + 2.0 * PI * n * z[j]).cos())
    }

    fn max_abs_diff(a: &ScalarPlane, b: &ScalarPlane) -> Float {
        a.values()
            .iter()
            .zip(b.values())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, Float::max)
    }

    #[test]
    fn constant_plane_is_preserved() {
        let (th, z) = axes();
        let dim = PlaneDim { n_th: 8, n_z: 8 };
        let u = ScalarPlane::from_fn(dim, |_, _| 2.5);
        let widths = FilterWidths::new(1.3, 0.3).unwrap();
        for &kind in &[FOURIER, FilterKind::Gauss, FilterKind::Box] {
            let f = filter_plane_at(&u, kind, 1.0, widths, &th, &z).unwrap();
            assert_eq!(f.dim(), dim);
            assert!(max_abs_diff(&f, &u) < E_TOL, "{}", kind.name());
        }
    }

    #[test]
    fn sharp_cutoff_on_lowest_azimuthal_mode() {
        // 8 points around a unit circle: the m = 1 mode has kappa_th = 1 and
        // passes while pi / lambda_th >= 1
        let (th, z) = axes();
        let u = wave(&th, &z, 1.0, 0.0);

        let keep = FilterWidths::new(0.99 * PI, 0.01).unwrap();
        let f = filter_plane_at(&u, FOURIER, 1.0, keep, &th, &z).unwrap();
        assert!(max_abs_diff(&f, &u) < E_TOL);

        let drop = FilterWidths::new(1.01 * PI, 0.01).unwrap();
        let f = filter_plane_at(&u, FOURIER, 1.0, drop, &th, &z).unwrap();
        assert!(f.values().iter().all(|v| v.abs() < E_TOL));
    }

    #[test]
    fn band_limited_plane_is_unchanged() {
        let (th, z) = axes();
        let dim = PlaneDim { n_th: 8, n_z: 8 };
        let u = ScalarPlane::from_fn(dim, |i, j| {
            0.3 + (th[i]).sin() + 0.5 * (2.0 * th[i] + 2.0 * PI * z[j]).cos()
        });
        // keeps |kappa_th| <= 2, |kappa_z| <= 2 pi
        let widths = FilterWidths::new(1.5, 0.49).unwrap();
        let f = filter_plane_at(&u, FOURIER, 1.0, widths, &th, &z).unwrap();
        assert!(max_abs_diff(&f, &u) < E_TOL);
    }

    #[test]
    fn gauss_damps_by_kernel_value() {
        let (th, z) = axes();
        let u = wave(&th, &z, 0.0, 1.0);
        let lambda_z: Float = 0.2;
        let widths = FilterWidths::new(0.1, lambda_z).unwrap();
        let f = filter_plane_at(&u, FilterKind::Gauss, 1.0, widths, &th, &z).unwrap();
        let damping = (-(2.0 * PI * lambda_z).powi(2) / 24.0).exp();
        for (fv, uv) in f.values().iter().zip(u.values()) {
            assert!((fv - damping * uv).abs() < E_TOL);
        }
    }

    #[test]
    fn mismatched_kernel_is_rejected() {
        let (th, z) = axes();
        let widths = FilterWidths::new(0.4, 0.4).unwrap();
        let kernel = Kernel2D::build(FilterKind::Box, 1.0, widths, &th[..4], &z).unwrap();
        let u = wave(&th, &z, 1.0, 1.0);
        assert!(matches!(
            filter_plane(&u, &kernel),
            Err(FilterError::ShapeMismatch { .. })
        ));
    }
}
