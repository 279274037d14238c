use anyhow::{bail, Result};
use log::info;
use std::path::PathBuf;

use scene_monitor::calibration::load_extrinsics;
use scene_monitor::config::Config;
use scene_monitor::logging;
use scene_monitor::pipeline::Pipeline;
use scene_monitor::sequence::{load_sequence, save_export};

const CONFIG_PATH: &str = "config.toml";
const OUTPUT_PATH: &str = "export/analysis.json";

struct Args {
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = std::env::args().collect();
    // Usage: scene-monitor <input.json> [output.json] [config.toml]
    let Some(input) = args.get(1) else {
        bail!("usage: scene-monitor <input.json> [output.json] [config.toml]");
    };
    Ok(Args {
        input: PathBuf::from(input),
        output: args.get(2).map_or_else(|| PathBuf::from(OUTPUT_PATH), PathBuf::from),
        config: args.get(3).map(PathBuf::from),
    })
}

fn main() -> Result<()> {
    let args = parse_args()?;

    // 明示されたファイルは読めなければエラー
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(CONFIG_PATH),
    };
    logging::init(&config.logging.level);

    info!("scene-monitor ({})", env!("GIT_VERSION"));
    info!(
        "scene: {}, training type: {}",
        config.session.scene, config.session.training_type
    );

    let extrinsics = load_extrinsics(&config.session.extrinsics_path)?;
    let sequence = load_sequence(&args.input)?;
    info!("{}: {} frames", args.input.display(), sequence.frames.len());

    let mut pipeline = Pipeline::new(extrinsics, &config.session.scene, &config);
    let export = pipeline.run_sequence(&sequence);

    save_export(&args.output, &export)?;
    info!(
        "wrote {} frames ({:.1} fps) to {}",
        export.total_frames,
        export.frame_rate,
        args.output.display()
    );
    Ok(())
}
