use anyhow::Result;
use pipe_filter::{run, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipe_filter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // config.toml in the working directory unless a path is given
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::from_path(path)?,
        None => Config::new()?,
    };
    run(cfg)
}
