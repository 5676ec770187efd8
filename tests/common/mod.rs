use pipe_filter::grid::periodic_axis;
use pipe_filter::{Float, Grid, ScalarField, PI};
use rand::prelude::*;
use rand_distr::StandardNormal;

pub fn setup_grid() -> Grid {
    // This sets up a small pipe segment so that it can be used in testing;
    // stretched towards the wall in r, equidistant in th and z.
    let r: Vec<Float> = (1..=6)
        .map(|i| {
            let x = i as Float / 6.0;
            (0.5 * PI * x).sin()
        })
        .collect();
    Grid::new(r, periodic_axis(24, 2.0 * PI), periodic_axis(16, 4.0)).unwrap()
}

pub fn random_field(grid: &Grid, seed: u64) -> ScalarField {
    let mut rng = StdRng::seed_from_u64(seed);
    ScalarField::from_fn(grid.dim(), |_, _, _| rng.sample::<Float, _>(StandardNormal))
}

pub fn max_abs_diff(a: &[Float], b: &[Float]) -> Float {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, Float::max)
}
