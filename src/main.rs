use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use maze_chase::terminal::{self, KeyboardControls, TerminalDisplay, TerminalGuard};
use maze_chase::{run_round, Args, Game, Level, Tuning};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;
    let tuning = args.tuning();

    let guard = TerminalGuard::enter().context("failed to prepare terminal")?;
    let result = run(args.level, &tuning);
    drop(guard);
    result
}

fn init_tracing(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to install log subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_is_off_without_a_file() {
        assert!(init_tracing(None).is_ok());
    }

    #[test]
    fn second_subscriber_is_reported() {
        let dir = std::env::temp_dir();
        let first = dir.join(format!("maze-chase-{}-a.log", std::process::id()));
        let second = dir.join(format!("maze-chase-{}-b.log", std::process::id()));

        assert!(init_tracing(Some(first.as_path())).is_ok());
        let err = init_tracing(Some(second.as_path())).unwrap_err();
        assert!(err.to_string().contains("log subscriber"));

        let _ = std::fs::remove_file(first);
        let _ = std::fs::remove_file(second);
    }
}

fn run(level: Option<u8>, tuning: &Tuning) -> Result<()> {
    let mut controls = KeyboardControls;
    loop {
        let number = match level {
            Some(number) => number,
            None => match terminal::title_screen().context("title screen failed")? {
                Some(number) => number,
                None => return Ok(()),
            },
        };
        let game = Game::new(Level::by_number(number)?, tuning.power_ticks)?;
        let mut display = TerminalDisplay::default();
        let summary = run_round(game, tuning, &mut controls, &mut display)?;
        info!(
            level = summary.level,
            outcome = ?summary.outcome,
            score = summary.score,
            ticks = summary.ticks,
            "round finished"
        );
        if !terminal::end_screen(&summary).context("end screen failed")? {
            return Ok(());
        }
    }
}
