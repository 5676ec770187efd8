use crate::flds::field::PlaneDim;
use crate::Float;
use num_traits::Zero;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward and inverse 2D FFT plans for one plane shape.
///
/// The plans are immutable and shared between worker threads; every worker
/// brings its own `FftWorkspace`.
#[derive(Clone)]
pub struct Fft2D {
    dim: PlaneDim,
    fft_th: Arc<dyn Fft<Float>>,
    ifft_th: Arc<dyn Fft<Float>>,
    fft_z: Arc<dyn Fft<Float>>,
    ifft_z: Arc<dyn Fft<Float>>,
}

/// Per-worker buffers for `Fft2D`.
pub struct FftWorkspace {
    pub spectral: Vec<Complex<Float>>,
    wrkspace: Vec<Complex<Float>>,
    th_scratch: Vec<Complex<Float>>,
    z_scratch: Vec<Complex<Float>>,
}

impl Fft2D {
    pub fn new(dim: PlaneDim) -> Fft2D {
        let mut planner = FftPlanner::new();
        let fft_th = planner.plan_fft_forward(dim.n_th);
        let ifft_th = planner.plan_fft_inverse(dim.n_th);
        let fft_z = planner.plan_fft_forward(dim.n_z);
        let ifft_z = planner.plan_fft_inverse(dim.n_z);

        Fft2D {
            dim,
            fft_th,
            ifft_th,
            fft_z,
            ifft_z,
        }
    }

    pub fn dim(&self) -> PlaneDim {
        self.dim
    }

    pub fn workspace(&self) -> FftWorkspace {
        let th_len = self
            .fft_th
            .get_outofplace_scratch_len()
            .max(self.ifft_th.get_outofplace_scratch_len());
        let z_len = self
            .fft_z
            .get_outofplace_scratch_len()
            .max(self.ifft_z.get_outofplace_scratch_len());
        FftWorkspace {
            spectral: vec![Complex::zero(); self.dim.len()],
            wrkspace: vec![Complex::zero(); self.dim.len()],
            th_scratch: vec![Complex::zero(); th_len],
            z_scratch: vec![Complex::zero(); z_len],
        }
    }

    fn transpose_out_of_place(
        in_vec: &[Complex<Float>],
        out_vec: &mut [Complex<Float>],
        rows: usize,
        cols: usize,
    ) {
        if !cfg!(feature = "unchecked") {
            assert_eq!(in_vec.len(), out_vec.len());
            assert_eq!(in_vec.len(), rows * cols);
        }
        for i in 0..rows {
            for j in 0..cols {
                unsafe {
                    // If you don't trust this unsafe section,
                    // run the code without the unchecked feature
                    *out_vec.get_unchecked_mut(j * rows + i) = *in_vec.get_unchecked(i * cols + j);
                }
            }
        }
    }

    fn process(
        &self,
        ws: &mut FftWorkspace,
        along_z: &Arc<dyn Fft<Float>>,
        along_th: &Arc<dyn Fft<Float>>,
    ) {
        let n_th = self.dim.n_th;
        let n_z = self.dim.n_z;
        // rows of constant th are contiguous, so the z transforms go first
        along_z.process_outofplace_with_scratch(
            &mut ws.spectral,
            &mut ws.wrkspace,
            &mut ws.z_scratch,
        );
        Fft2D::transpose_out_of_place(&ws.wrkspace, &mut ws.spectral, n_th, n_z);
        along_th.process_outofplace_with_scratch(
            &mut ws.spectral,
            &mut ws.wrkspace,
            &mut ws.th_scratch,
        );
        Fft2D::transpose_out_of_place(&ws.wrkspace, &mut ws.spectral, n_z, n_th);
    }

    /// Forward transform of `ws.spectral` in place.
    pub fn fft(&self, ws: &mut FftWorkspace) {
        if !cfg!(feature = "unchecked") {
            assert_eq!(ws.spectral.len(), self.dim.len());
        }
        self.process(ws, &self.fft_z, &self.fft_th);
    }

    /// Normalised inverse transform of `ws.spectral` in place.
    pub fn inv_fft(&self, ws: &mut FftWorkspace) {
        if !cfg!(feature = "unchecked") {
            assert_eq!(ws.spectral.len(), self.dim.len());
        }
        self.process(ws, &self.ifft_z, &self.ifft_th);

        let norm = (ws.spectral.len() as Float).powi(-1);
        for v in ws.spectral.iter_mut() {
            *v *= norm;
        }
    }
}
