use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use orbital_link::{Frame, SignalStatus, Simulation, SimulationConfig};

#[derive(Parser)]
#[command(name = "orbital-link")]
#[command(about = "Headless satellite constellation and optical-link simulation")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
struct Args {
    /// Two-line element file; the bundled sample when omitted
    tle: Option<PathBuf>,

    /// JSON file overriding simulation defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short = 'n', long, default_value = "10")]
    ticks: usize,

    /// Wall seconds per tick
    #[arg(long, default_value = "1.0")]
    dt: f64,

    /// Speed multiplier applied once before the first tick; negative runs
    /// backwards
    #[arg(short, long, default_value = "1.0", allow_negative_numbers = true)]
    speed: f64,

    /// Satellite id to follow
    #[arg(long)]
    select: Option<usize>,

    /// Skip link building
    #[arg(long)]
    no_links: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    log::info!("orbital-link {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_path(path)?,
        None => SimulationConfig::default(),
    };
    if args.no_links {
        config.show_links = false;
    }

    let mut sim = Simulation::new(config)?;
    if let Some(path) = &args.tle {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        sim.import_text(&text).with_context(|| format!("importing {}", path.display()))?;
    }
    if let Some(id) = args.select {
        if !sim.select(id) {
            log::warn!("no satellite with id {id}");
        }
    }
    sim.change_speed(args.speed);

    for step in 0..args.ticks {
        let frame = sim.tick(args.dt);
        report(step, &frame);
    }
    Ok(())
}

fn report(step: usize, frame: &Frame<'_>) {
    log::info!(
        "#{step} {} | {}/{} visible, {} colored, {} links, rotation {:.4} rad",
        frame.instant.format("%Y-%m-%d %H:%M:%S"),
        frame.visible_count(),
        frame.positions.len(),
        frame.colors.iter().filter(|c| c.is_some()).count(),
        frame.links.len(),
        frame.body_rotation,
    );
    let Some(sat) = &frame.selected else {
        return;
    };
    match sat.status {
        SignalStatus::Tracking(g) => log::info!(
            "  [{}] {}: lat {:.2} lon {:.2} alt {:.1} km, {:.3} km/s, path {} pts",
            sat.id,
            sat.name,
            g.latitude_deg,
            g.longitude_deg,
            g.height_km,
            g.speed_km_s,
            sat.path.len(),
        ),
        SignalStatus::SignalLost => log::info!("  [{}] {}: Signal Lost", sat.id, sat.name),
    }
}
