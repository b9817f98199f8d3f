use std::path::Path;
use std::process;

use anyhow::{Context, Result, bail};

use ascii_tween::{config::StageConfig, player::Player, script::CueSheet};

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "ascii-tween play <cues.json> [stage.json]";
const CHECK_USAGE: &str = "ascii-tween check <cues.json>";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let path = args.next().context(PLAY_USAGE)?;
            let config = args.next();
            play(&path, config.as_deref())
        }
        Some("check") => {
            let path = args.next().context(CHECK_USAGE)?;
            check(&path)
        }
        _ => bail!(
            "ASCII Tween: frame-stepped terminal animation\n\nUsage:\n  {PLAY_USAGE}\n  {CHECK_USAGE}"
        ),
    }
}

fn load_sheet(path: &str) -> Result<CueSheet> {
    CueSheet::load(Path::new(path)).with_context(|| format!("Failed to load {path}"))
}

fn check(path: &str) -> Result<()> {
    let sheet = load_sheet(path)?;
    eprintln!(
        "{path}: {} actors, {} cues, last cue at frame {}",
        sheet.actors.len(),
        sheet.cues.len(),
        sheet.last_cue_frame().unwrap_or(0),
    );
    Ok(())
}

fn play(path: &str, config_path: Option<&str>) -> Result<()> {
    let sheet = load_sheet(path)?;
    let config = StageConfig::load(config_path.map(Path::new));
    let mut player = Player::new(sheet, config)?;
    player.play()
}
