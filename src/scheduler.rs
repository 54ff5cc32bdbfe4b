//! One thread per entity against a single locked board.
//!
//! The player thread moves the player and draws the frame inside the lock,
//! then polls input and sleeps outside it. Each ghost thread takes the lock
//! only for its own move. Every loop exits once the round stops being live,
//! and [`run_round`] joins all of them before reporting.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::config::Tuning;
use crate::error::GameError;
use crate::game::{Frame, Game, RoundSummary};
use crate::ghost::GhostKind;

/// Key source. Must never block.
pub trait Controls {
    fn poll_key(&mut self) -> Result<Option<char>, GameError>;
}

/// Frame sink, called once per player tick while the board is locked.
pub trait Display {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), GameError>;
}

fn lock(board: &Mutex<Game>) -> Result<MutexGuard<'_, Game>, GameError> {
    board.lock().map_err(|_| GameError::Poisoned)
}

/// Ends the round when the owning thread leaves its loop for any reason,
/// so the other threads cannot outlive it.
struct StopOnExit<'a>(&'a Mutex<Game>);

impl Drop for StopOnExit<'_> {
    fn drop(&mut self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
    }
}

pub fn run_round<C, D>(
    game: Game,
    tuning: &Tuning,
    controls: &mut C,
    display: &mut D,
) -> Result<RoundSummary, GameError>
where
    C: Controls + Send,
    D: Display + Send,
{
    let board = Mutex::new(game);
    let shared = &board;

    thread::scope(|scope| -> Result<(), GameError> {
        let player = thread::Builder::new()
            .name("player".to_string())
            .spawn_scoped(scope, move || {
                let _stop = StopOnExit(shared);
                player_loop(shared, tuning.player, controls, display)
            });
        let player = match player {
            Ok(handle) => handle,
            Err(err) => {
                lock(shared)?.stop();
                return Err(GameError::Spawn("player", err));
            }
        };

        let mut ghosts: Vec<(GhostKind, ScopedJoinHandle<'_, Result<(), GameError>>)> =
            Vec::with_capacity(GhostKind::ALL.len());
        for kind in GhostKind::ALL {
            let cadence = tuning.ghost_cadence(kind);
            let mut rng = match tuning.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(kind.index() as u64)),
                None => StdRng::from_entropy(),
            };
            let spawned = thread::Builder::new()
                .name(kind.name().to_string())
                .spawn_scoped(scope, move || ghost_loop(shared, kind, cadence, &mut rng));
            match spawned {
                Ok(handle) => ghosts.push((kind, handle)),
                Err(err) => {
                    lock(shared)?.stop();
                    return Err(GameError::Spawn(kind.name(), err));
                }
            }
        }

        let mut result = player
            .join()
            .map_err(|_| GameError::TaskPanicked("player"))
            .and_then(|r| r);
        for (kind, handle) in ghosts {
            let joined = handle
                .join()
                .map_err(|_| GameError::TaskPanicked(kind.name()))
                .and_then(|r| r);
            if result.is_ok() {
                result = joined;
            }
        }
        result
    })?;

    let game = board.into_inner().map_err(|_| GameError::Poisoned)?;
    Ok(game.summary())
}

fn player_loop<C: Controls, D: Display>(
    board: &Mutex<Game>,
    cadence: Duration,
    controls: &mut C,
    display: &mut D,
) -> Result<(), GameError> {
    loop {
        {
            let mut game = lock(board)?;
            if !game.round().is_live() {
                break;
            }
            game.player_tick();
            display.draw(&game.frame())?;
            if !game.round().is_live() {
                break;
            }
        }

        if let Some(key) = controls.poll_key()? {
            lock(board)?.apply_key(key);
        }
        thread::sleep(cadence);
    }
    debug!(task = "player", "task finished");
    Ok(())
}

fn ghost_loop(
    board: &Mutex<Game>,
    kind: GhostKind,
    cadence: Duration,
    rng: &mut StdRng,
) -> Result<(), GameError> {
    loop {
        {
            let mut game = lock(board)?;
            if !game.round().is_live() {
                break;
            }
            game.ghost_tick(kind, rng);
        }
        thread::sleep(cadence);
    }
    debug!(task = kind.name(), "task finished");
    Ok(())
}
