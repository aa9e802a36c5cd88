use anyhow::Context;
use clap::Parser;
use render_bridge::bridge::{default_bind_address, RenderBridge};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::SimulationConfig;
use workflow::runner::Runner;

mod generator;
mod render_bridge;
mod scanners;
mod workflow;

const DEFAULT_FRAMES: u64 = 250;

#[derive(Parser)]
#[command(author, version, about = "Headless driver for the terminal radar core")]
struct Args {
    /// Load a simulation config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Frames to run; unbounded with --serve unless given
    #[arg(long)]
    ticks: Option<u64>,
    /// Seed for simulated signal generation
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated signals only
    #[arg(long, default_value_t = false)]
    no_real_data: bool,
    /// Show nothing instead of placeholder signals when real scans come back empty
    #[arg(long, default_value_t = false)]
    no_fallback: bool,
    /// Register the netstat connection scanner
    #[arg(long, default_value_t = false)]
    netstat: bool,
    /// Expose snapshots and accept controls over HTTP
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = default_bind_address())]
    bind: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.config.as_ref() {
        let mut config = SimulationConfig::load(path)?;
        config.apply_overrides(args.seed, !args.no_real_data, !args.no_fallback, args.netstat);
        config
    } else {
        SimulationConfig::from_args(args.seed, !args.no_real_data, !args.no_fallback, args.netstat)
    };

    let frames = match (args.ticks, args.serve) {
        (Some(ticks), _) => Some(ticks),
        (None, true) => None,
        (None, false) => Some(DEFAULT_FRAMES),
    };

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating radar runtime")?;

    let summary = runtime.block_on(async {
        let runner = Runner::new(config);
        if args.serve {
            let bridge = RenderBridge::new();
            let bound = bridge.serve(args.bind)?;
            println!("[bridge] serving http://{} (Ctrl+C to stop)", bound);
            runner.run(frames, Some(&bridge)).await
        } else {
            runner.run(frames, None).await
        }
    })?;

    println!(
        "Radar run -> frames {}, tracked {}, visible {}, detected {}, placeholders {}",
        summary.frames, summary.tracked, summary.visible, summary.detected, summary.placeholders
    );
    for entry in summary.counts.iter().filter(|entry| entry.count > 0) {
        println!("  {:<10} {}", entry.kind, entry.count);
    }
    println!(
        "Scanners {:?}: launched {}, aggregations {}, cache hits {}, failures {}, timeouts {}",
        summary.scanners,
        summary.scan.scans_launched,
        summary.scan.aggregations,
        summary.scan.cache_hits,
        summary.scan.scanner_failures,
        summary.scan.scanner_timeouts
    );

    Ok(())
}
