//! dragorder - Entry Point

use clap::Parser;
use dragorder::list_file::{render_list, ListFile};
use dragorder::model::AppError;
use std::path::PathBuf;
use tracing::info;

/// dragorder - reorder a JSON list by dragging its rows
#[derive(Parser, Debug)]
#[command(name = "dragorder")]
#[command(version)]
#[command(about = "Reorder the items of a JSON list by dragging them in the terminal")]
pub struct Args {
    /// Path to a JSON array of strings or {"id", "text"} objects
    pub file: PathBuf,

    /// Write the new order back to FILE instead of printing it
    #[arg(short, long)]
    pub write: bool,

    /// Hold time in milliseconds before a press starts a drag
    #[arg(short = 'd', long)]
    pub activation_delay: Option<u64>,

    /// Auto-scroll distance per tick at full edge-zone depth
    #[arg(long, value_parser = parse_speed)]
    pub autoscroll_speed: Option<f32>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_speed(raw: &str) -> Result<f32, String> {
    match raw.parse::<f32>() {
        Ok(speed) if speed.is_finite() && speed > 0.0 => Ok(speed),
        Ok(_) => Err("must be a positive number".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    run(args)?;
    Ok(())
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = dragorder::config::load_config_with_precedence(args.config.clone())?;
        let merged = dragorder::config::merge_config(config_file);
        let with_env = dragorder::config::apply_env_overrides(merged);
        dragorder::config::apply_cli_overrides(
            with_env,
            args.activation_delay,
            args.autoscroll_speed,
        )
    };

    dragorder::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let list = ListFile::load(&args.file)?;
    let sequence = list.to_sequence()?;

    let reordered = dragorder::tui::run(sequence, config.engine_config())?;

    if args.write {
        list.save(&reordered)?;
    } else {
        let json = render_list(list.format, &reordered).map_err(|reason| {
            dragorder::list_file::ListFileError::Write {
                path: PathBuf::from("<stdout>"),
                reason,
            }
        })?;
        print!("{json}");
    }
    Ok(())
}
