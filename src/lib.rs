//! Terminal maze chase: a player, four ghosts and a shared grid, each entity
//! driven by its own thread against one locked board.

pub mod config;
pub mod error;
pub mod game;
pub mod ghost;
pub mod grid;
pub mod level;
pub mod player;
pub mod round;
pub mod scheduler;
pub mod terminal;

pub use config::{Args, Tuning};
pub use error::GameError;
pub use game::{Frame, Game, RoundSummary};
pub use ghost::{Ghost, GhostKind};
pub use grid::{Cell, Dir, Grid, Pos};
pub use level::Level;
pub use player::{Player, Step};
pub use round::{RoundOutcome, RoundState};
pub use scheduler::{run_round, Controls, Display};
