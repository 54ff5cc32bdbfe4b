use rand::Rng;
use tracing::{info, warn};

use crate::error::GameError;
use crate::ghost::{Ghost, GhostKind};
use crate::grid::{Cell, Grid};
use crate::level::Level;
use crate::player::{Player, Step};
use crate::round::{RoundOutcome, RoundState};

/// Read-only view handed to the renderer once per player tick.
pub struct Frame<'a> {
    pub level: u8,
    pub grid: &'a Grid,
    pub round: &'a RoundState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub level: u8,
    pub outcome: RoundOutcome,
    pub score: u32,
    pub lives: u32,
    pub pickups: usize,
    pub total_pickups: usize,
    pub ticks: u64,
}

/// The board every task shares: grid, entities and round state.
pub struct Game {
    level: Level,
    grid: Grid,
    player: Player,
    ghosts: Vec<Ghost>,
    round: RoundState,
}

impl Game {
    pub fn new(level: Level, power_ticks: u64) -> Result<Self, GameError> {
        let (grid, total) = level.load()?;
        let mut game = Self {
            level,
            grid,
            player: Player::default(),
            ghosts: GhostKind::ALL.into_iter().map(Ghost::new).collect(),
            round: RoundState::new(total, power_ticks),
        };
        game.place_everyone();
        info!(level = level.number(), pickups = total, "round start");
        Ok(game)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost(&self, kind: GhostKind) -> &Ghost {
        &self.ghosts[kind.index()]
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn stop(&mut self) {
        self.round.stop();
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            level: self.level.number(),
            grid: &self.grid,
            round: &self.round,
        }
    }

    /// Applies one key press. `q` ends the round; movement keys turn the player.
    pub fn apply_key(&mut self, key: char) {
        if key.eq_ignore_ascii_case(&'q') {
            info!("round aborted by player");
            self.round.stop();
        } else {
            self.player.set_facing(key);
        }
    }

    /// One player-cadence tick: expire power mode, move the player, then settle
    /// captures and deaths so the board is consistent when the lock is released.
    pub fn player_tick(&mut self) -> Step {
        if !self.round.is_live() {
            return Step::Idle;
        }
        self.round.advance_tick();
        if self.round.expire_power() {
            info!(tick = self.round.ticks(), "power mode over");
        }

        let step = self.player.update(&mut self.grid, &mut self.round);
        match step {
            Step::Captured(kind) => self.send_home(kind),
            Step::PoweredUp => info!(tick = self.round.ticks(), "power mode on"),
            _ => {}
        }
        self.retry_parked();

        if !self.player.is_alive() && self.round.lives() > 0 {
            self.respawn_all();
        }
        if let Some(outcome) = self.round.outcome() {
            info!(
                ?outcome,
                score = self.round.score(),
                ticks = self.round.ticks(),
                "round over"
            );
        }
        step
    }

    /// One ghost-cadence tick for `kind`.
    pub fn ghost_tick(&mut self, kind: GhostKind, rng: &mut impl Rng) -> bool {
        if !self.round.is_live() {
            return false;
        }
        let ghost = &mut self.ghosts[kind.index()];
        ghost.update(
            &mut self.grid,
            self.player.pos(),
            self.player.facing(),
            self.round.is_powered(),
            rng,
        )
    }

    fn place_everyone(&mut self) {
        for ghost in &mut self.ghosts {
            if !ghost.respawn(&mut self.grid) {
                warn!(ghost = ghost.kind().name(), "spawn occupied, ghost parked");
            }
        }
        self.grid.set_cell(self.player.pos(), self.player.glyph());
    }

    /// Returns a captured ghost to its spawn. Whatever it stood on stays buried
    /// under the player until the player moves on.
    fn send_home(&mut self, kind: GhostKind) {
        let ghost = &mut self.ghosts[kind.index()];
        let hidden = ghost.lift(&mut self.grid);
        self.grid.bury(self.player.pos(), hidden);
        info!(ghost = kind.name(), score = self.round.score(), "ghost captured");
        if !ghost.respawn(&mut self.grid) {
            warn!(ghost = kind.name(), "spawn occupied, ghost parked");
        }
    }

    fn retry_parked(&mut self) {
        for ghost in self.ghosts.iter_mut().filter(|g| !g.is_alive()) {
            ghost.respawn(&mut self.grid);
        }
    }

    /// Sends the player and every ghost back to their spawns. Score, lives and
    /// pickups carry over.
    fn respawn_all(&mut self) {
        for ghost in &mut self.ghosts {
            ghost.lift(&mut self.grid);
            ghost.reset();
        }
        self.grid.vacate(self.player.pos());
        self.player.reset();
        self.round.clear_power();
        self.place_everyone();
    }

    /// True when the grid's entity glyphs agree with every recorded position.
    pub fn is_consistent(&self) -> bool {
        let players = self.grid.positions(Cell::is_player);
        if players != [self.player.pos()] {
            return false;
        }
        let on_board: Vec<&Ghost> = self.ghosts.iter().filter(|g| g.is_alive()).collect();
        if self.grid.count(Cell::is_ghost) != on_board.len() {
            return false;
        }
        on_board
            .iter()
            .all(|ghost| self.grid.cell_at(ghost.pos()) == ghost.glyph())
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            level: self.level.number(),
            outcome: self.round.outcome().unwrap_or(RoundOutcome::Aborted),
            score: self.round.score(),
            lives: self.round.lives(),
            pickups: self.round.pickups_consumed(),
            total_pickups: self.round.total_pickups(),
            ticks: self.round.ticks(),
        }
    }

    #[cfg(test)]
    pub(crate) fn parts_mut(&mut self) -> (&mut Grid, &mut Player, &mut [Ghost], &mut RoundState) {
        (
            &mut self.grid,
            &mut self.player,
            self.ghosts.as_mut_slice(),
            &mut self.round,
        )
    }
}
