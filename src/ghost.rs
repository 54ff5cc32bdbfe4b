use std::time::Duration;

use rand::Rng;

use crate::grid::{Cell, Dir, Grid, Pos};

/// How far ahead of the player an ambushing ghost aims.
pub const AMBUSH_LEAD: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GhostKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Targeting {
    Chase,
    Ambush { lead: i32 },
}

/// Everything that differs between the four ghosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Profile {
    pub glyph: char,
    pub spawn: Pos,
    pub facing: Dir,
    pub cadence: Duration,
    pub targeting: Targeting,
}

impl GhostKind {
    pub const ALL: [GhostKind; 4] = [
        GhostKind::Blinky,
        GhostKind::Pinky,
        GhostKind::Inky,
        GhostKind::Clyde,
    ];

    pub const fn profile(self) -> Profile {
        match self {
            GhostKind::Blinky => Profile {
                glyph: 'M',
                spawn: Pos::new(9, 12),
                facing: Dir::Up,
                cadence: Duration::from_millis(250),
                targeting: Targeting::Chase,
            },
            GhostKind::Pinky => Profile {
                glyph: 'W',
                spawn: Pos::new(9, 14),
                facing: Dir::Down,
                cadence: Duration::from_millis(300),
                targeting: Targeting::Ambush { lead: AMBUSH_LEAD },
            },
            GhostKind::Inky => Profile {
                glyph: 'Y',
                spawn: Pos::new(10, 12),
                facing: Dir::Right,
                cadence: Duration::from_millis(450),
                targeting: Targeting::Chase,
            },
            GhostKind::Clyde => Profile {
                glyph: 'U',
                spawn: Pos::new(10, 14),
                facing: Dir::Left,
                cadence: Duration::from_millis(200),
                targeting: Targeting::Chase,
            },
        }
    }

    pub fn from_glyph(glyph: char) -> Option<GhostKind> {
        GhostKind::ALL
            .into_iter()
            .find(|kind| kind.profile().glyph == glyph)
    }

    pub fn glyph(self) -> char {
        self.profile().glyph
    }

    pub fn spawn(self) -> Pos {
        self.profile().spawn
    }

    pub fn name(self) -> &'static str {
        match self {
            GhostKind::Blinky => "blinky",
            GhostKind::Pinky => "pinky",
            GhostKind::Inky => "inky",
            GhostKind::Clyde => "clyde",
        }
    }

    pub fn index(self) -> usize {
        match self {
            GhostKind::Blinky => 0,
            GhostKind::Pinky => 1,
            GhostKind::Inky => 2,
            GhostKind::Clyde => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ghost {
    kind: GhostKind,
    pos: Pos,
    facing: Dir,
    alive: bool,
    underfoot: Cell,
}

impl Ghost {
    pub fn new(kind: GhostKind) -> Self {
        let profile = kind.profile();
        Self {
            kind,
            pos: profile.spawn,
            facing: profile.facing,
            alive: true,
            underfoot: Cell::Empty,
        }
    }

    pub fn kind(&self) -> GhostKind {
        self.kind
    }

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
        Cell::Ghost(self.kind)
    }

    /// The cell hidden under this ghost's glyph.
    pub fn underfoot(&self) -> Cell {
        self.underfoot
    }

    /// Where this ghost is heading this update. In power mode every ghost
    /// aims for the point mirrored through the board centre.
    pub fn target(&self, grid: &Grid, player_pos: Pos, player_facing: Dir, powered: bool) -> Pos {
        if powered {
            return grid.mirror(player_pos);
        }
        match self.kind.profile().targeting {
            Targeting::Chase => player_pos,
            Targeting::Ambush { lead } => player_pos.offset(player_facing, lead),
        }
    }

    pub fn update(
        &mut self,
        grid: &mut Grid,
        player_pos: Pos,
        player_facing: Dir,
        powered: bool,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.alive {
            return false;
        }
        let target = self.target(grid, player_pos, player_facing, powered);
        self.move_toward_target(grid, target, rng)
    }

    /// First direction in priority order that closes the distance to `target`,
    /// is not a reversal and leads onto an enterable cell.
    pub fn preferred_direction(&self, grid: &Grid, target: Pos) -> Option<Dir> {
        let dy = target.row - self.pos.row;
        let dx = target.col - self.pos.col;
        let back = self.facing.reverse();
        Dir::PRIORITY.into_iter().find(|&dir| {
            let closes = match dir {
                Dir::Up => dy < 0,
                Dir::Left => dx < 0,
                Dir::Down => dy > 0,
                Dir::Right => dx > 0,
            };
            closes && dir != back && grid.cell_at(self.pos.step(dir)).ghost_can_enter()
        })
    }

    /// Picks a facing, falling back to a random one when boxed in, then tries to step.
    pub fn move_toward_target(&mut self, grid: &mut Grid, target: Pos, rng: &mut impl Rng) -> bool {
        self.facing = match self.preferred_direction(grid, target) {
            Some(dir) => dir,
            None => Dir::PRIORITY[rng.gen_range(0..Dir::PRIORITY.len())],
        };
        self.advance(grid)
    }

    fn advance(&mut self, grid: &mut Grid) -> bool {
        let next = self.pos.step(self.facing);
        if !grid.cell_at(next).ghost_can_enter() {
            return false;
        }
        self.lift(grid);
        let mut dest = next;
        if grid.is_portal(dest) {
            dest = grid.resolve_portal(dest);
        }
        self.drop_at(grid, dest);
        true
    }

    /// Takes the ghost off the board, restoring what it stood on when its glyph is
    /// still there. Returns the cell it had been standing on.
    pub fn lift(&mut self, grid: &mut Grid) -> Cell {
        let underfoot = std::mem::replace(&mut self.underfoot, Cell::Empty);
        if grid.cell_at(self.pos) == self.glyph() {
            grid.set_cell(self.pos, underfoot);
        }
        underfoot
    }

    fn drop_at(&mut self, grid: &mut Grid, pos: Pos) {
        let below = grid.cell_at(pos);
        self.underfoot = if below.ghost_can_enter() {
            below
        } else {
            Cell::Empty
        };
        self.pos = pos;
        grid.set_cell(pos, self.glyph());
    }

    /// Puts the ghost back on its spawn, or the closest free cell when the spawn
    /// is taken. Fails, leaving the ghost parked off the board, only when no
    /// free cell is reachable.
    pub fn respawn(&mut self, grid: &mut Grid) -> bool {
        let profile = self.kind.profile();
        self.facing = profile.facing;
        let Some(pos) = grid.nearest(profile.spawn, Cell::ghost_can_enter) else {
            self.alive = false;
            return false;
        };
        self.drop_at(grid, pos);
        self.alive = true;
        true
    }

    /// Restores spawn state without touching the board.
    pub fn reset(&mut self) {
        *self = Ghost::new(self.kind);
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, grid: &mut Grid, pos: Pos, facing: Dir) {
        self.facing = facing;
        self.drop_at(grid, pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::parse_layout;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const OPEN: [&str; 7] = [
        "#######",
        "#.....#",
        "#.....#",
        "#.....#",
        "#.....#",
        "#.....#",
        "#######",
    ];

    fn ghost_on(grid: &mut Grid, kind: GhostKind, pos: Pos, facing: Dir) -> Ghost {
        let mut ghost = Ghost::new(kind);
        ghost.place(grid, pos, facing);
        ghost
    }

    #[test]
    fn profiles_are_distinct() {
        let spawns: Vec<Pos> = GhostKind::ALL.iter().map(|k| k.spawn()).collect();
        for (i, a) in spawns.iter().enumerate() {
            for b in &spawns[i + 1..] {
                assert_ne!(a, b);
            }
        }
        let cadences: Vec<Duration> = GhostKind::ALL
            .iter()
            .map(|k| k.profile().cadence)
            .collect();
        assert!(cadences.windows(2).any(|w| w[0] != w[1]));
        for kind in GhostKind::ALL {
            assert_eq!(GhostKind::from_glyph(kind.glyph()), Some(kind));
        }
    }

    #[test]
    fn chasers_target_the_player_and_pinky_leads() {
        let grid = parse_layout(&OPEN).unwrap();
        let player = Pos::new(3, 3);
        let blinky = Ghost::new(GhostKind::Blinky);
        let pinky = Ghost::new(GhostKind::Pinky);
        assert_eq!(blinky.target(&grid, player, Dir::Left, false), player);
        assert_eq!(
            pinky.target(&grid, player, Dir::Left, false),
            Pos::new(3, 3 - AMBUSH_LEAD)
        );
        assert_eq!(
            Ghost::new(GhostKind::Inky).target(&grid, player, Dir::Up, false),
            player
        );
        assert_eq!(
            Ghost::new(GhostKind::Clyde).target(&grid, player, Dir::Up, false),
            player
        );
    }

    #[test]
    fn power_mode_flees_to_the_mirrored_point() {
        let grid = parse_layout(&OPEN).unwrap();
        for kind in GhostKind::ALL {
            let ghost = Ghost::new(kind);
            assert_eq!(
                ghost.target(&grid, Pos::new(1, 2), Dir::Right, true),
                Pos::new(5, 4)
            );
        }
    }

    #[test]
    fn prefers_up_then_left_then_down_then_right() {
        let mut grid = parse_layout(&OPEN).unwrap();
        let ghost = ghost_on(&mut grid, GhostKind::Blinky, Pos::new(3, 3), Dir::Left);
        assert_eq!(ghost.preferred_direction(&grid, Pos::new(1, 1)), Some(Dir::Up));
        assert_eq!(ghost.preferred_direction(&grid, Pos::new(3, 1)), Some(Dir::Left));
        assert_eq!(ghost.preferred_direction(&grid, Pos::new(5, 5)), Some(Dir::Down));
        assert_eq!(ghost.preferred_direction(&grid, Pos::new(3, 3)), None);
    }

    #[test]
    fn never_prefers_a_reversal() {
        let mut grid = parse_layout(&OPEN).unwrap();
        for facing in Dir::PRIORITY {
            let ghost = ghost_on(&mut grid, GhostKind::Inky, Pos::new(3, 3), facing);
            for row in 0..7 {
                for col in 0..7 {
                    let choice = ghost.preferred_direction(&grid, Pos::new(row, col));
                    assert_ne!(choice, Some(facing.reverse()));
                }
            }
            ghost.clone().lift(&mut grid);
        }
    }

    #[test]
    fn boxed_in_ghost_picks_a_random_facing() {
        let mut grid = parse_layout(&["###", "# #", "###"]).unwrap();
        let mut ghost = ghost_on(&mut grid, GhostKind::Clyde, Pos::new(1, 1), Dir::Left);
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            assert!(!ghost.move_toward_target(&mut grid, Pos::new(0, 0), &mut rng));
            assert_eq!(ghost.pos(), Pos::new(1, 1));
            seen.insert(ghost.facing());
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn ghosts_leave_pickups_behind() {
        let mut grid = parse_layout(&OPEN).unwrap();
        let mut ghost = ghost_on(&mut grid, GhostKind::Blinky, Pos::new(3, 3), Dir::Left);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(ghost.move_toward_target(&mut grid, Pos::new(3, 1), &mut rng));
        assert_eq!(ghost.pos(), Pos::new(3, 2));
        assert_eq!(grid.cell_at(Pos::new(3, 3)), Cell::Pellet);
        assert_eq!(grid.cell_at(Pos::new(3, 2)), Cell::Ghost(GhostKind::Blinky));
        assert_eq!(grid.count(Cell::is_pickup), 24);
    }

    #[test]
    fn ghosts_do_not_walk_into_the_player_or_each_other() {
        let mut grid = parse_layout(&["#####", "#   #", "#####"]).unwrap();
        grid.set_cell(Pos::new(1, 1), Cell::Player(Dir::Right));
        let mut ghost = ghost_on(&mut grid, GhostKind::Blinky, Pos::new(1, 2), Dir::Left);
        let _other = ghost_on(&mut grid, GhostKind::Pinky, Pos::new(1, 3), Dir::Left);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..16 {
            ghost.move_toward_target(&mut grid, Pos::new(1, 1), &mut rng);
            assert_eq!(ghost.pos(), Pos::new(1, 2));
        }
        assert_eq!(grid.cell_at(Pos::new(1, 1)), Cell::Player(Dir::Right));
    }

    #[test]
    fn respawn_steps_aside_when_spawn_is_taken() {
        let (mut grid, _) = crate::level::Level::by_number(1).unwrap().load().unwrap();
        let spawn = GhostKind::Blinky.spawn();
        grid.set_cell(spawn, Cell::Ghost(GhostKind::Clyde));

        let mut blinky = Ghost::new(GhostKind::Blinky);
        assert!(blinky.respawn(&mut grid));
        assert!(blinky.is_alive());
        assert_ne!(blinky.pos(), spawn);
        let dist = (blinky.pos().row - spawn.row).abs() + (blinky.pos().col - spawn.col).abs();
        assert!(dist <= 2, "landed {dist} cells away");
        assert_eq!(grid.cell_at(blinky.pos()), Cell::Ghost(GhostKind::Blinky));
        assert_eq!(grid.cell_at(spawn), Cell::Ghost(GhostKind::Clyde));
    }

    #[test]
    fn respawn_parks_only_when_nothing_is_free() {
        let walls = vec!["#".repeat(27); 21];
        let rows: Vec<&str> = walls.iter().map(String::as_str).collect();
        let mut grid = parse_layout(&rows).unwrap();
        grid.set_cell(GhostKind::Blinky.spawn(), Cell::Ghost(GhostKind::Clyde));

        let mut blinky = Ghost::new(GhostKind::Blinky);
        assert!(!blinky.respawn(&mut grid));
        assert!(!blinky.is_alive());

        grid.set_cell(GhostKind::Blinky.spawn(), Cell::Empty);
        assert!(blinky.respawn(&mut grid));
        assert!(blinky.is_alive());
        assert_eq!(blinky.pos(), GhostKind::Blinky.spawn());
    }

    #[test]
    fn powered_ghost_runs_away_from_the_player() {
        let mut grid = parse_layout(&OPEN).unwrap();
        let player = Pos::new(1, 1);
        let mut ghost = ghost_on(&mut grid, GhostKind::Pinky, Pos::new(3, 3), Dir::Left);
        let mut rng = StdRng::seed_from_u64(5);
        let distance = |pos: Pos| (pos.row - player.row).abs() + (pos.col - player.col).abs();

        let mut last = distance(ghost.pos());
        for _ in 0..3 {
            assert!(ghost.update(&mut grid, player, Dir::Right, true, &mut rng));
            let now = distance(ghost.pos());
            assert!(now > last, "moved from {last} to {now}");
            last = now;
        }
    }
}
