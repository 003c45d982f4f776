use anyhow::{Context, Result};
use aviary_core::config::ContainmentMode;
use aviary_core::{Flock, FlockConfig, RecordingRenderer};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

const WARMUP_STEPS: usize = 10;
const BENCHMARK_STEPS: usize = 200;

#[derive(Parser)]
#[command(name = "aviary")]
#[command(about = "Headless boids flocking simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a flock for a number of steps and report statistics
    Run {
        /// Path to config file (JSON); defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of simulation steps to run
        #[arg(long, default_value_t = 600)]
        steps: usize,

        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the configured boid count
        #[arg(long)]
        boids: Option<usize>,

        /// Use wrap-around containment instead of avoidance
        #[arg(long)]
        wrap: bool,

        /// Log statistics every this many steps (0 disables)
        #[arg(long, default_value_t = 60)]
        report_every: usize,
    },
    /// Time flock steps for several flock sizes
    Benchmark {
        /// Flock sizes to time
        #[arg(long, value_delimiter = ',', default_values_t = vec![100, 200, 500, 1000])]
        sizes: Vec<usize>,

        /// Seed for every flock
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn load_config(path: Option<&Path>) -> Result<FlockConfig> {
    let Some(path) = path else {
        return Ok(FlockConfig::default());
    };
    let file = File::open(path).with_context(|| format!("Failed to open config file {}", path.display()))?;
    let config: FlockConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

fn run(mut config: FlockConfig, steps: usize, report_every: usize) -> Result<()> {
    config.validate().context("Config validation error")?;
    let mut flock = Flock::new(config).context("Failed to build flock")?;
    let mut renderer = RecordingRenderer::new(flock.config().fixed_time_step());

    let start = Instant::now();
    for step in 1..=steps {
        renderer.clear();
        flock.run_frame(&mut renderer);
        if report_every > 0 && step % report_every == 0 {
            let stats = flock.stats();
            info!(
                step,
                simulated_time = stats.simulated_time,
                mean_speed = stats.mean_speed,
                nearest_min = stats.nearest_neighbor.min,
                nearest_mean = stats.nearest_neighbor.mean,
                nearest_max = stats.nearest_neighbor.max,
                separation_failures = stats.separation_failures,
                containment_failures = stats.containment_failures,
                "flock statistics"
            );
        }
    }
    let elapsed = start.elapsed();

    info!(
        steps,
        elapsed_ms = elapsed.as_millis(),
        triangles = renderer.triangle_count(),
        "run complete"
    );
    let summary = serde_json::to_string_pretty(flock.stats()).context("Failed to serialize statistics")?;
    println!("{summary}");
    Ok(())
}

fn run_benchmark(sizes: &[usize], seed: u64) -> Result<()> {
    for &size in sizes {
        let mut config = FlockConfig::with_seed(seed);
        config.boid_count = size;
        let mut flock = Flock::new(config).context("Benchmark flock construction error")?;
        let time_step = flock.config().fixed_time_step();

        for _ in 0..WARMUP_STEPS {
            flock.step(time_step);
        }
        let start = Instant::now();
        for _ in 0..BENCHMARK_STEPS {
            flock.step(time_step);
        }
        let elapsed = start.elapsed();

        #[allow(clippy::cast_precision_loss)]
        let avg_step_us = elapsed.as_micros() as f64 / BENCHMARK_STEPS as f64;
        let steps_per_sec = 1_000_000.0 / avg_step_us;
        println!("--- {size} boids ---");
        println!("  Avg step:      {avg_step_us:.0} us ({steps_per_sec:.1} steps/sec)");
        println!(
            "  Failures:      separation={}, containment={}",
            flock.stats().separation_failures,
            flock.stats().containment_failures
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            steps,
            seed,
            boids,
            wrap,
            report_every,
        } => {
            let mut flock_config = load_config(config.as_deref())?;
            if let Some(seed) = seed {
                flock_config.seed = seed;
            }
            if let Some(boids) = boids {
                flock_config.boid_count = boids;
            }
            if wrap {
                flock_config.containment = ContainmentMode::Wrap;
            }
            run(flock_config, steps, report_every)?;
        }
        Commands::Benchmark { sizes, seed } => {
            run_benchmark(&sizes, seed)?;
        }
        Commands::DumpDefaultConfig => {
            let json = serde_json::to_string_pretty(&FlockConfig::default())
                .context("Failed to serialize default config")?;
            println!("{json}");
        }
    }
    Ok(())
}
