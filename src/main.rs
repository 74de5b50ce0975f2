use anyhow::Result;
use laserscraper::{pipeline, Config};
use std::{env, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) config: optional YAML path as the only argument ──────────
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    info!(
        data_dir = %config.data_dir.display(),
        output = %config.output.display(),
        "configured"
    );

    // ─── 3) load, combine, normalise, clean, write ───────────────────
    let summary = pipeline::run(&config)?;
    for (id, rows) in &summary.per_source {
        info!(source = %id, rows, "source rows");
    }
    for (column, fixed) in &summary.cleaning.fixed {
        info!(column, fixed, "fixups applied");
    }

    info!("all done");
    Ok(())
}
