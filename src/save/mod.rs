use crate::{
    flds::{field::ScalarField, kernel::Kernel2D},
    Float,
};
use anyhow::{Context, Result};
use npy::NpyData;
use std::io::Read;
use std::path::Path;

/// Reads a 1d `.npy` array. Multi-dimensional arrays come back flattened in
/// storage order.
pub(crate) fn read_vec<P: AsRef<Path>>(path: P) -> Result<Vec<Float>> {
    let path = path.as_ref();
    let mut buf = vec![];
    std::fs::File::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?
        .read_to_end(&mut buf)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let data = NpyData::<Float>::from_bytes(&buf)
        .with_context(|| format!("Could not parse {} as npy data", path.display()))?;
    Ok(data.to_vec())
}

pub(crate) fn save_fld(fld: &ScalarField, outdir: &str, name: &str) -> Result<()> {
    npy::to_file(format!("{}/{}.npy", outdir, name), fld.values().iter().cloned())
        .context(format!("Could not save {} data to file", name))?;
    Ok(())
}

pub(crate) fn save_kernel(kernel: &Kernel2D, outdir: &str, name: &str) -> Result<()> {
    npy::to_file(format!("{}/{}.npy", outdir, name), kernel.values().iter().cloned())
        .context(format!("Could not save kernel {} to file", name))?;
    Ok(())
}
