//! Headless mine server: restores mines and drives the world tick loop.
//!
//! Usage: cargo run --release --bin plotmine -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   Configuration file (default: mines.json, created if missing)
//!   --pregen <N>      Pregenerated plots to keep ready (default: settings.pregen_target)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use plotmine::MineContext;
use plotmine::config::MinesConfig;
use plotmine::core::Result;
use plotmine::core::types::TICKS_PER_SECOND;
use plotmine::services::Services;
use plotmine::world::WorldContext;

#[tokio::main]
async fn main() {
    plotmine::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = parse_str_arg(&args, "--config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("mines.json"));
    let pregen = parse_usize_arg(&args, "--pregen");

    if let Err(e) = run(config_path, pregen).await {
        log::error!("Mine server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config_path: PathBuf, pregen: Option<usize>) -> Result<()> {
    let config = if config_path.exists() {
        MinesConfig::load(&config_path)?
    } else {
        log::warn!("{} not found, writing a default configuration", config_path.display());
        let config = MinesConfig::default();
        config.save(&config_path)?;
        config
    };

    let world = Arc::new(WorldContext::default());
    let ctx = MineContext::new(config, Arc::clone(&world), Services::in_memory())?;
    ctx.restore()?;

    let target = pregen.unwrap_or(ctx.settings().pregen_target);
    let missing = target.saturating_sub(ctx.pregen_queue().len());
    if missing > 0 && !ctx.tiers().is_empty() {
        ctx.pregenerate(missing)?;
    }

    log::info!("Mine server running at {} ticks/s, Ctrl+C to stop", TICKS_PER_SECOND);
    let mut interval = tokio::time::interval(Duration::from_millis(1000 / TICKS_PER_SECOND));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = world.tick();
                if report.jobs_run > 0 {
                    log::debug!("Tick {}: applied {} world jobs", report.tick, report.jobs_run);
                }
            }
            _ = &mut shutdown => {
                log::info!("Shutting down");
                break;
            }
        }
    }

    ctx.stop_all_tasks();
    // Apply stamping jobs still queued so their records are saved
    world.tick();
    ctx.save_all()?;
    Ok(())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
