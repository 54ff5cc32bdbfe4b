use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::ghost::GhostKind;
use crate::round::DEFAULT_POWER_TICKS;

pub const DEFAULT_PLAYER_MS: u64 = 150;

/// Terminal maze chase: eat every pickup before the ghosts catch you.
#[derive(Debug, Parser)]
#[command(name = "pacman", version, about)]
pub struct Args {
    /// Level to play (1 or 2). Prompts on the title screen when omitted.
    #[arg(long, env = "MAZE_CHASE_LEVEL", value_parser = clap::value_parser!(u8).range(1..=2))]
    pub level: Option<u8>,

    /// Milliseconds between player moves.
    #[arg(long, env = "MAZE_CHASE_PLAYER_MS", default_value_t = DEFAULT_PLAYER_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub player_ms: u64,

    #[arg(long, env = "MAZE_CHASE_BLINKY_MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub blinky_ms: Option<u64>,

    #[arg(long, env = "MAZE_CHASE_PINKY_MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub pinky_ms: Option<u64>,

    #[arg(long, env = "MAZE_CHASE_INKY_MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub inky_ms: Option<u64>,

    #[arg(long, env = "MAZE_CHASE_CLYDE_MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub clyde_ms: Option<u64>,

    /// Player ticks a power pickup lasts.
    #[arg(long, env = "MAZE_CHASE_POWER_TICKS", default_value_t = DEFAULT_POWER_TICKS, value_parser = clap::value_parser!(u64).range(1..))]
    pub power_ticks: u64,

    /// Seed for the ghosts' tie-breaking randomness.
    #[arg(long, env = "MAZE_CHASE_SEED")]
    pub seed: Option<u64>,

    /// Write logs to this file. Logging is off without it.
    #[arg(long, env = "MAZE_CHASE_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn tuning(&self) -> Tuning {
        let mut tuning = Tuning {
            player: Duration::from_millis(self.player_ms),
            power_ticks: self.power_ticks,
            seed: self.seed,
            ..Tuning::default()
        };
        let overrides = [self.blinky_ms, self.pinky_ms, self.inky_ms, self.clyde_ms];
        for (kind, ms) in GhostKind::ALL.into_iter().zip(overrides) {
            if let Some(ms) = ms {
                tuning.ghosts[kind.index()] = Duration::from_millis(ms);
            }
        }
        tuning
    }
}

/// Resolved timing for one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tuning {
    pub player: Duration,
    pub ghosts: [Duration; 4],
    pub power_ticks: u64,
    pub seed: Option<u64>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: Duration::from_millis(DEFAULT_PLAYER_MS),
            ghosts: GhostKind::ALL.map(|kind| kind.profile().cadence),
            power_ticks: DEFAULT_POWER_TICKS,
            seed: None,
        }
    }
}

impl Tuning {
    pub fn ghost_cadence(&self, kind: GhostKind) -> Duration {
        self.ghosts[kind.index()]
    }
}
