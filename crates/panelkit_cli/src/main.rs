//! Panelkit CLI
//!
//! Headless harness for the panel runtime.
//!
//! # Commands
//!
//! - `panelkit run` - Drive a synthetic panel through sync cycles and async renders
//! - `panelkit config` - Print the effective configuration
//! - `panelkit init` - Write a default panelkit.toml

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod demo;

use config::{PanelkitConfig, CONFIG_FILE};
use demo::DemoOptions;

#[derive(Parser)]
#[command(name = "panelkit")]
#[command(author, version, about = "Panelkit - headless panel runtime harness")]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file or directory holding panelkit.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the synthetic panel
    Run {
        /// Frames to run
        #[arg(short, long, default_value_t = 120)]
        frames: u64,

        /// Number of elements on the panel
        #[arg(short, long, default_value_t = 12)]
        elements: usize,

        /// Directory resource image names resolve against
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Simulate a screen reconnect every N frames (0 = never)
        #[arg(long, default_value_t = 0)]
        reconnect_every: u64,

        /// Device scale factor
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Write a default panelkit.toml
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            frames,
            elements,
            assets,
            reconnect_every,
            scale,
            json,
        } => {
            anyhow::ensure!(scale > 0.0, "Scale must be positive, got {scale}");
            let config = PanelkitConfig::discover(cli.config.as_deref())?;
            let options = DemoOptions {
                frames,
                elements,
                assets,
                reconnect_every,
                scale,
                settle: Duration::from_millis(500),
            };
            let report = demo::run(&config, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("cycles:           {}", report.cycles);
                println!("updates sent:     {} ({} bytes)", report.updates_sent, report.bytes_sent);
                println!("repaints:         {}", report.repaints);
                println!("resyncs:          {}", report.resyncs);
                println!("reconnects:       {}", report.reconnects);
                println!("paint commands:   {}", report.paint_commands);
                println!("images evicted:   {}", report.images_evicted);
                println!(
                    "async frames:     {} published, {} failed, {} dropped",
                    report.frames_published, report.renders_failed, report.renders_dropped
                );
            }
        }
        Commands::Config => {
            let config = PanelkitConfig::discover(cli.config.as_deref())?;
            print!("{}", config.to_toml()?);
        }
        Commands::Init { path, force } => {
            let target = path.join(CONFIG_FILE);
            if target.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite.",
                    target.display()
                );
            }
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            fs::write(&target, PanelkitConfig::default().to_toml()?)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            info!("Wrote {}", target.display());
        }
    }

    Ok(())
}
