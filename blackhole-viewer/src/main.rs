use std::path::PathBuf;

use blackhole::prelude::*;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Black hole scene viewer (windowed or headless)"
)]
struct Cli {
    /// YAML scene config; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    reduced_motion: bool,
    /// Render offscreen instead of opening a window.
    #[arg(long, default_value_t = false)]
    headless: bool,
    /// Ticks to run in headless mode.
    #[arg(long, default_value_t = 120)]
    frames: u64,
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    #[arg(long, default_value_t = 720.0)]
    height: f32,
    /// Device pixel ratio for headless mode.
    #[arg(long, default_value_t = 1.0)]
    dpr: f32,
    /// Use the software adapter in headless mode.
    #[arg(long, default_value_t = false)]
    fallback_adapter: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<SceneConfig, String> {
    match path {
        Some(path) => SceneConfig::from_path(path),
        None => Ok(SceneConfig::default()),
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(cli.config.as_ref())?;

    if cli.headless {
        let report = run_headless(HeadlessOptions {
            config,
            reduced_motion: cli.reduced_motion,
            width: cli.width,
            height: cli.height,
            device_pixel_ratio: cli.dpr,
            ticks: cli.frames,
            force_fallback_adapter: cli.fallback_adapter,
        })?;

        println!(
            "{} frames at {}x{}",
            report.frames_rendered, report.buffer_size[0], report.buffer_size[1]
        );
        return Ok(());
    }

    run_viewer(ViewerOptions {
        config,
        reduced_motion: cli.reduced_motion,
        width: cli.width,
        height: cli.height,
    })
}

fn main() {
    init_logger();

    if let Err(err) = run(Cli::parse()) {
        error!("blackhole viewer failed: {}", err);
        std::process::exit(1);
    }
}
