//! 2D spectral filters for scalar fields on a cylindrical (r, th, z) grid.
//!
//! Every constant-radius plane is filtered in the homogeneous th and z
//! directions with a sharp spectral cut-off (Fourier), Gauss or box kernel,
//! applied by multiplication in Fourier space.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

pub mod error;
pub mod flds;
pub mod grid;
mod save;

pub use error::FilterError;
pub use flds::field::{FieldDim, PlaneDim, ScalarField, ScalarPlane};
pub use flds::kernel::{FilterKind, FilterWidths, Kernel2D, KernelShape};
pub use flds::plane::{filter_plane, filter_plane_at};
pub use flds::volume::{
    box_2d, fourier_2d, gauss_2d, Execution, RadiusPolicy, VolumeFilter, LEGACY_REFERENCE_RADIUS,
};
pub use grid::Grid;

// We use a type alias for f64/Float to easily support
// double and single precision.
#[cfg(feature = "sprec")]
pub type Float = f32;

#[cfg(not(feature = "sprec"))]
pub type Float = f64;

pub const PI: Float = std::f64::consts::PI as Float;

/// Absolute tolerance the test suites compare filtered values with.
#[cfg(not(feature = "sprec"))]
pub const E_TOL: Float = 1e-9;

#[cfg(feature = "sprec")]
pub const E_TOL: Float = 1e-4;

#[derive(Deserialize)]
pub struct Config {
    pub grid: GridFiles,
    pub filter: FilterParams,
    #[serde(default)]
    pub execution: ExecutionParams,
    pub output: Output,
    #[serde(default)]
    pub fields: Vec<FieldInput>,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Paths of the 1d `.npy` grid vectors.
#[derive(Deserialize)]
pub struct GridFiles {
    pub r: String,
    pub th: String,
    pub z: String,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Fourier,
    Gauss,
    Box,
}

#[derive(Deserialize)]
pub struct FilterParams {
    pub kind: Family,
    #[serde(default)]
    pub shape: KernelShape,
    pub width_th: Float,
    pub width_z: Float,
    // widths are in viscous units when set
    pub re_tau: Option<Float>,
    #[serde(default)]
    pub radius_policy: RadiusPolicy,
}

#[derive(Deserialize, Default)]
pub struct ExecutionParams {
    #[serde(default)]
    pub threads: usize,
    #[serde(default)]
    pub serial: bool,
}

#[derive(Deserialize)]
pub struct Output {
    pub dir: String,
    #[serde(default)]
    pub write_kernel: bool,
}

#[derive(Deserialize)]
pub struct FieldInput {
    pub name: String,
    pub path: String,
    pub mean_profile: Option<String>,
}

#[derive(Deserialize)]
pub struct Product {
    pub a: String,
    pub b: String,
}

impl FilterParams {
    pub fn kind(&self) -> FilterKind {
        match self.kind {
            Family::Fourier => FilterKind::Fourier(self.shape),
            Family::Gauss => FilterKind::Gauss,
            Family::Box => FilterKind::Box,
        }
    }

    pub fn widths(&self) -> Result<FilterWidths> {
        let widths = match self.re_tau {
            Some(re_tau) => FilterWidths::from_plus_units(self.width_th, self.width_z, re_tau),
            None => FilterWidths::new(self.width_th, self.width_z),
        };
        widths.context("Invalid filter widths")
    }
}

impl ExecutionParams {
    pub fn execution(&self) -> Execution {
        if self.serial {
            Execution::Serial
        } else {
            Execution::Parallel {
                threads: Some(self.threads),
            }
        }
    }
}

impl Config {
    pub fn new() -> Result<Config> {
        Config::from_path("config.toml")
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not open the {} file", path.display()))?;
        Config::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Config> {
        let cfg: Config = toml::from_str(contents).with_context(|| "Could not parse Config file")?;
        cfg.check()?;
        Ok(cfg)
    }

    fn check(&self) -> Result<()> {
        if let Some(re_tau) = self.filter.re_tau {
            if !(re_tau > 0.0) {
                return Err(anyhow::Error::msg("re_tau must be positive"));
            }
        }
        let mut seen = HashSet::new();
        for fld in &self.fields {
            if !seen.insert(fld.name.as_str()) {
                return Err(anyhow::anyhow!("Field {} is declared twice", fld.name));
            }
        }
        for p in &self.products {
            for name in &[&p.a, &p.b] {
                if !seen.contains(name.as_str()) {
                    return Err(anyhow::anyhow!("Product refers to undeclared field {}", name));
                }
            }
        }
        Ok(())
    }
}

pub fn run(cfg: Config) -> Result<()> {
    let t0 = Instant::now();
    let grid = Grid::new(
        save::read_vec(&cfg.grid.r)?,
        save::read_vec(&cfg.grid.th)?,
        save::read_vec(&cfg.grid.z)?,
    )
    .context("Invalid grid")?;
    let dim = grid.dim();
    info!(n_r = dim.n_r, n_th = dim.n_th, n_z = dim.n_z, "read grid");

    let kind = cfg.filter.kind();
    let widths = cfg.filter.widths()?;
    info!(
        filter = kind.name(),
        lambda_th = widths.lambda_th,
        lambda_z = widths.lambda_z,
        policy = ?cfg.filter.radius_policy,
        "filter setup"
    );
    let filter = VolumeFilter::new(cfg.filter.radius_policy, cfg.execution.execution())
        .context("Could not set up the volume filter")?;

    let outdir = &cfg.output.dir;
    fs::create_dir_all(outdir).context("Unable to create output directory")?;

    if cfg.output.write_kernel && dim.n_r > 0 {
        let kernel = filter.kernel(kind, widths, &grid, dim.n_r - 1)?;
        save::save_kernel(&kernel, outdir, &format!("kernel_{}", kind.name()))?;
    }

    let mut flds: HashMap<&str, ScalarField> = HashMap::new();
    for input in &cfg.fields {
        let mut u = ScalarField::new(save::read_vec(&input.path)?, dim)
            .with_context(|| format!("Field {} does not match the grid", input.name))?;
        if let Some(path) = &input.mean_profile {
            u.subtract_mean_profile(&save::read_vec(path)?)
                .with_context(|| format!("Mean profile of {} does not match the grid", input.name))?;
        }
        let t1 = Instant::now();
        let filtered = filter
            .filter(&u, kind, widths, &grid)
            .with_context(|| format!("Could not filter {}", input.name))?;
        info!(field = %input.name, elapsed_ms = t1.elapsed().as_millis() as u64, "filtered");
        save::save_fld(&filtered, outdir, &format!("{}F", input.name))?;
        flds.insert(input.name.as_str(), u);
    }

    for p in &cfg.products {
        // names were checked against the field list in Config::check
        let (a, b) = match (flds.get(p.a.as_str()), flds.get(p.b.as_str())) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(anyhow::anyhow!("Missing field for product {}*{}", p.a, p.b)),
        };
        let filtered = filter
            .filter(&a.product(b)?, kind, widths, &grid)
            .with_context(|| format!("Could not filter {}*{}", p.a, p.b))?;
        save::save_fld(&filtered, outdir, &format!("{}{}F", p.a, p.b))?;
    }

    info!(elapsed_s = t0.elapsed().as_secs_f64(), "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFG: &str = r#"
        [grid]
        r = "r.npy"
        th = "th.npy"
        z = "z.npy"

        [filter]
        kind = "fourier"
        width_th = 40.0
        width_z = 75.0
        re_tau = 180.4
        radius_policy = { fixed_reference = 0.986 }

        [output]
        dir = "out"

        [[fields]]
        name = "u_r"
        path = "u_r.npy"

        [[fields]]
        name = "u_z"
        path = "u_z.npy"
        mean_profile = "u_zM.npy"

        [[products]]
        a = "u_r"
        b = "u_z"
    "#;

    #[test]
    fn parse_config() {
        let cfg = Config::from_toml(CFG).unwrap();
        assert_eq!(cfg.filter.kind(), FilterKind::Fourier(KernelShape::Rectangular));
        assert_eq!(
            cfg.filter.radius_policy,
            RadiusPolicy::FixedReference(LEGACY_REFERENCE_RADIUS)
        );
        let w = cfg.filter.widths().unwrap();
        assert!((w.lambda_z - 75.0 / 180.4).abs() < E_TOL);
        assert_eq!(cfg.execution.execution(), Execution::Parallel { threads: Some(0) });
        assert!(!cfg.output.write_kernel);
        assert_eq!(cfg.fields[1].mean_profile.as_deref(), Some("u_zM.npy"));
    }

    #[test]
    fn defaults_are_per_radius_and_rectangular() {
        let cfg = Config::from_toml(
            r#"
            [grid]
            r = "r.npy"
            th = "th.npy"
            z = "z.npy"
            [filter]
            kind = "gauss"
            width_th = 0.2
            width_z = 0.4
            [execution]
            serial = true
            [output]
            dir = "out"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.filter.radius_policy, RadiusPolicy::PerRadius);
        assert_eq!(cfg.filter.shape, KernelShape::Rectangular);
        assert_eq!(cfg.execution.execution(), Execution::Serial);
        assert!(cfg.fields.is_empty());
    }

    #[test]
    fn bad_configs_are_rejected() {
        let undeclared = CFG.replace("b = \"u_z\"", "b = \"u_th\"");
        assert!(Config::from_toml(&undeclared).is_err());
        let bad_re = CFG.replace("re_tau = 180.4", "re_tau = 0.0");
        assert!(Config::from_toml(&bad_re).is_err());
        let twice = CFG.replace("name = \"u_z\"", "name = \"u_r\"");
        assert!(Config::from_toml(&twice).is_err());
    }
}
