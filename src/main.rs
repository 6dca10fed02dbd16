//! Headless autoplay runner (default binary).
//!
//! Plays one run with hint moves and prints a JSON summary on stdout.
//! Logs go to stderr; set `TILE_CASCADE_LOG` to change the level.

use anyhow::{anyhow, Result};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use tile_cascade::autoplay::{log_level, parse_autoplay_args, run_autoplay, ENV_LOG};
use tile_cascade::engine::EngineConfig;

fn main() -> Result<()> {
    setup_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_autoplay_args(&args, EngineConfig::from_env())?;
    let summary = run_autoplay(&config);

    let json = if config.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{}", json);
    Ok(())
}

fn setup_logging() -> Result<()> {
    let level = log_level(std::env::var(ENV_LOG).ok().as_deref());
    TermLogger::init(
        level,
        ConfigBuilder::new().set_time_format_rfc3339().build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .map_err(|e| anyhow!("failed to install logger: {}", e))
}
