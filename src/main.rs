use anyhow::{Context, Result};
use charityclean::{run, CleanerConfig};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    if let Err(e) = try_main() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    // ─── 2) configure ────────────────────────────────────────────────
    let arg = env::args().nth(1);
    if matches!(arg.as_deref(), Some("-h" | "--help")) {
        println!("Usage: charityclean [CONFIG.yaml]");
        return Ok(());
    }
    let config = CleanerConfig::from_args_or_default(arg.as_deref())
        .context("loading cleaner configuration")?;
    info!(
        regions = config.regions.len(),
        output = %config.output.display(),
        "startup"
    );

    // ─── 3) load → normalize → filter → dedup → write ────────────────
    let summary = run(&config).context("cleaning registry extracts")?;
    if !summary.is_balanced() {
        anyhow::bail!("row accounting does not balance: {:?}", summary);
    }

    info!(rows_out = summary.rows_out, "all done");
    Ok(())
}
