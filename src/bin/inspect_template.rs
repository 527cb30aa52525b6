//! Template inspector: prints the anchors found in a structure template.
//!
//! Usage: cargo run --bin inspect_template -- --file <PATH> [OPTIONS]
//!
//! Options:
//!   --file <PATH>     Template file (.json or .lz4)
//!   --config <PATH>   Take sentinel markers from this configuration
//!   --plot <X,Y,Z>    Also print absolute positions for a plot at X,Y,Z

use std::path::PathBuf;

use plotmine::config::{MinesConfig, SentinelMarkers};
use plotmine::core::types::IVec3;
use plotmine::math::Placement;
use plotmine::placement::PlotLayout;
use plotmine::template;

fn main() {
    plotmine::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(file) = parse_str_arg(&args, "--file").map(PathBuf::from) else {
        eprintln!("Usage: inspect_template --file <PATH> [--config <PATH>] [--plot X,Y,Z]");
        std::process::exit(2);
    };

    let (markers, rotation, clearance) = match parse_str_arg(&args, "--config") {
        Some(path) => match MinesConfig::load(&PathBuf::from(path)) {
            Ok(config) => (
                config.settings.markers,
                config.settings.rotation,
                config.settings.clearance,
            ),
            Err(e) => {
                log::error!("Failed to load configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => (SentinelMarkers::default(), Default::default(), 0),
    };

    let template = match template::index(&file, &markers) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Failed to index {}: {}", file.display(), e);
            std::process::exit(1);
        }
    };

    println!("=== Template {} ===", file.display());
    println!("Blocks:    {}", template.block_count());
    println!("Footprint: {} .. {}", template.bounds.min, template.bounds.max);
    println!("Spawn:     {}", template.spawn);
    println!("Corners:   {} / {}", template.corners[0], template.corners[1]);
    println!("NPC:       {}", describe(template.npc));
    println!("Quarry:    {}", describe(template.quarry));
    println!("Materials:");
    for (material, weight) in &template.materials {
        println!("  {:<20} {}", material, weight);
    }

    if let Some(plot) = parse_str_arg(&args, "--plot").and_then(|s| parse_ivec3(&s)) {
        let layout = PlotLayout::compute(&template, Placement::new(plot, rotation), clearance);
        println!();
        println!("=== Placed at {} ===", plot);
        println!("Spawn:  {}", layout.spawn);
        println!("Mining: {} .. {}", layout.mining.min, layout.mining.max);
        println!("Full:   {} .. {}", layout.full.min, layout.full.max);
        println!("Rails:  {} / {}", layout.lower_rails, layout.upper_rails);
    }
}

fn describe(anchor: Option<IVec3>) -> String {
    anchor.map_or_else(|| "-".to_string(), |p| p.to_string())
}

fn parse_ivec3(s: &str) -> Option<IVec3> {
    let parts: Vec<i32> = s.split(',').map(|p| p.trim().parse().ok()).collect::<Option<_>>()?;
    match parts.as_slice() {
        [x, y, z] => Some(IVec3::new(*x, *y, *z)),
        _ => None,
    }
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
