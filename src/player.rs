use crate::ghost::GhostKind;
use crate::grid::{Cell, Dir, Grid, Pos};
use crate::level::{PLAYER_FACING, PLAYER_SPAWN};
use crate::round::RoundState;

/// What a single player update did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Idle,
    Moved,
    Blocked,
    Ate,
    PoweredUp,
    Captured(GhostKind),
    Died,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pos: Pos,
    facing: Dir,
    alive: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: PLAYER_SPAWN,
            facing: PLAYER_FACING,
            alive: true,
        }
    }
}

impl Player {
    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn facing(&self) -> Dir {
        self.facing
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn glyph(&self) -> Cell {
        Cell::Player(self.facing)
    }

    /// Queues a turn from a key press. Movement waits for the next update.
    pub fn set_facing(&mut self, key: char) -> bool {
        match Dir::from_key(key) {
            Some(dir) => {
                self.facing = dir;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Player::default();
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, pos: Pos, facing: Dir) {
        self.pos = pos;
        self.facing = facing;
    }

    pub fn update(&mut self, grid: &mut Grid, round: &mut RoundState) -> Step {
        if !self.alive {
            return Step::Idle;
        }

        grid.vacate(self.pos);
        let next = self.pos.step(self.facing);

        let step = match grid.cell_at(next) {
            Cell::Ghost(kind) => {
                if round.is_powered() {
                    round.capture_ghost();
                    Step::Captured(kind)
                } else {
                    round.lose_life();
                    self.alive = false;
                    Step::Died
                }
            }
            Cell::Power => {
                round.activate_power();
                Step::PoweredUp
            }
            Cell::Pellet => {
                round.eat_pickup();
                Step::Ate
            }
            Cell::Wall => Step::Blocked,
            Cell::Empty | Cell::PortalLeft | Cell::PortalRight | Cell::Player(_) => Step::Moved,
        };

        if !matches!(step, Step::Died | Step::Blocked) {
            self.pos = next;
            if grid.is_portal(self.pos) {
                self.pos = grid.resolve_portal(self.pos);
            }
        }

        grid.set_cell(self.pos, self.glyph());
        step
    }
}
