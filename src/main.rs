use anyhow::Context;
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use lidarscope::source::{open_port, DEFAULT_BAUD_RATE};
use lidarscope::{Scope, ViewConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "Simple Lidar visualisation")]
struct Args {
    /// Serial port for Lidar ("-" reads standard input)
    #[arg(long, short = 'p')]
    port: String,
    /// Number of points of history
    #[arg(
        long = "history-length",
        short = 'n',
        visible_alias = "npoints",
        default_value_t = 1000,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    history_length: usize,
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
    /// How long a serial read may block before the frame is drawn anyway
    #[arg(long, default_value_t = 500)]
    read_timeout_ms: u64,
    /// Window side in logical pixels (default: shorter display side minus 80)
    #[arg(long)]
    size: Option<u32>,
    /// Frames per second
    #[arg(long, default_value_t = 20.0)]
    tick_rate: f64,
    /// Valid points read per frame
    #[arg(long, default_value_t = 250)]
    points_per_tick: usize,
    /// TrueType/OpenType font for the distance label
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = ViewConfig::builder()
        .point_history(args.history_length)
        .maybe_surface_size(args.size)
        .tick_rate(args.tick_rate)
        .points_per_tick(args.points_per_tick)
        .maybe_font_path(args.font)
        .build();

    let source = open_port(
        &args.port,
        args.baud,
        Duration::from_millis(args.read_timeout_ms),
    )
    .with_context(|| format!("opening line source {}", args.port))?;

    Scope::new(config)
        .show(source)
        .context("running lidar visualisation")?;

    Ok(())
}
