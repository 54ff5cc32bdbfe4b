use std::collections::VecDeque;

use crate::error::GameError;
use crate::ghost::GhostKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Search order used by pursuers when several directions would close the distance.
    pub const PRIORITY: [Dir; 4] = [Dir::Up, Dir::Left, Dir::Down, Dir::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn reverse(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    /// Maps a movement key to a facing. Unknown keys yield `None`.
    pub fn from_key(key: char) -> Option<Dir> {
        match key.to_ascii_lowercase() {
            'w' => Some(Dir::Up),
            'a' => Some(Dir::Left),
            's' => Some(Dir::Down),
            'd' => Some(Dir::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn step(self, dir: Dir) -> Pos {
        let (dx, dy) = dir.delta();
        Pos {
            row: self.row + dy,
            col: self.col + dx,
        }
    }

    pub fn offset(self, dir: Dir, cells: i32) -> Pos {
        let (dx, dy) = dir.delta();
        Pos {
            row: self.row + dy * cells,
            col: self.col + dx * cells,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Empty,
    Pellet,
    Power,
    PortalLeft,
    PortalRight,
    Player(Dir),
    Ghost(GhostKind),
}

impl Cell {
    pub fn from_symbol(symbol: char) -> Option<Cell> {
        let cell = match symbol {
            '#' => Cell::Wall,
            ' ' => Cell::Empty,
            '.' => Cell::Pellet,
            'O' => Cell::Power,
            '[' => Cell::PortalLeft,
            ']' => Cell::PortalRight,
            '^' => Cell::Player(Dir::Up),
            'v' => Cell::Player(Dir::Down),
            '<' => Cell::Player(Dir::Left),
            '>' => Cell::Player(Dir::Right),
            other => Cell::Ghost(GhostKind::from_glyph(other)?),
        };
        Some(cell)
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Empty => ' ',
            Cell::Pellet => '.',
            Cell::Power => 'O',
            Cell::PortalLeft => '[',
            Cell::PortalRight => ']',
            Cell::Player(Dir::Up) => '^',
            Cell::Player(Dir::Down) => 'v',
            Cell::Player(Dir::Left) => '<',
            Cell::Player(Dir::Right) => '>',
            Cell::Ghost(kind) => kind.glyph(),
        }
    }

    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }

    pub fn is_pickup(self) -> bool {
        self == Cell::Pellet
    }

    pub fn is_power_pickup(self) -> bool {
        self == Cell::Power
    }

    pub fn is_portal(self) -> bool {
        matches!(self, Cell::PortalLeft | Cell::PortalRight)
    }

    pub fn is_ghost(self) -> bool {
        matches!(self, Cell::Ghost(_))
    }

    pub fn is_player(self) -> bool {
        matches!(self, Cell::Player(_))
    }

    /// Cells a pursuer may step onto.
    pub fn ghost_can_enter(self) -> bool {
        matches!(self, Cell::Empty | Cell::Pellet | Cell::Power)
    }
}

/// The single authoritative cell array. Row-major, `height` rows of `width` cells.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    resting: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, GameError> {
        if width == 0 || height == 0 || cells.len() != width * height {
            return Err(GameError::MalformedLayout(format!(
                "expected {}x{} cells, got {}",
                width,
                height,
                cells.len()
            )));
        }
        let resting = cells
            .iter()
            .map(|cell| if cell.is_portal() { *cell } else { Cell::Empty })
            .collect();
        Ok(Self {
            width,
            height,
            cells,
            resting,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.height
            && (pos.col as usize) < self.width
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.row as usize * self.width + pos.col as usize)
        } else {
            None
        }
    }

    /// Out-of-bounds reads see a wall.
    pub fn cell_at(&self, pos: Pos) -> Cell {
        match self.index(pos) {
            Some(idx) => self.cells[idx],
            None => Cell::Wall,
        }
    }

    pub fn set_cell(&mut self, pos: Pos, cell: Cell) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = cell;
        }
    }

    /// Clears a cell an entity is leaving. Portal cells keep their portal and a
    /// buried pickup comes back.
    pub fn vacate(&mut self, pos: Pos) {
        if let Some(idx) = self.index(pos) {
            let rest = self.resting[idx];
            self.cells[idx] = rest;
            if !rest.is_portal() {
                self.resting[idx] = Cell::Empty;
            }
        }
    }

    /// Hides `cell` under whatever stands on `pos` until that entity leaves.
    pub fn bury(&mut self, pos: Pos, cell: Cell) {
        if let Some(idx) = self.index(pos) {
            if !self.resting[idx].is_portal() {
                self.resting[idx] = cell;
            }
        }
    }

    /// What [`Grid::vacate`] would put back at `pos`.
    pub fn buried(&self, pos: Pos) -> Cell {
        match self.index(pos) {
            Some(idx) => self.resting[idx],
            None => Cell::Wall,
        }
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.cell_at(pos).is_wall()
    }

    pub fn is_pickup(&self, pos: Pos) -> bool {
        self.cell_at(pos).is_pickup()
    }

    pub fn is_power_pickup(&self, pos: Pos) -> bool {
        self.cell_at(pos).is_power_pickup()
    }

    pub fn is_portal(&self, pos: Pos) -> bool {
        self.cell_at(pos).is_portal()
    }

    pub fn is_ghost(&self, pos: Pos) -> bool {
        self.cell_at(pos).is_ghost()
    }

    pub fn is_player(&self, pos: Pos) -> bool {
        self.cell_at(pos).is_player()
    }

    /// Teleports across the board when `pos` holds a portal; any other cell is returned unchanged.
    pub fn resolve_portal(&self, pos: Pos) -> Pos {
        match self.cell_at(pos) {
            Cell::PortalLeft => Pos::new(pos.row, self.width as i32 - 1),
            Cell::PortalRight => Pos::new(pos.row, 0),
            _ => pos,
        }
    }

    /// Point mirrored through the board centre.
    pub fn mirror(&self, pos: Pos) -> Pos {
        Pos::new(
            self.height as i32 - 1 - pos.row,
            self.width as i32 - 1 - pos.col,
        )
    }

    /// Closest cell to `from` matching `pred`, searching breadth-first through
    /// non-wall cells. Portals are not followed.
    pub fn nearest(&self, from: Pos, pred: impl Fn(Cell) -> bool) -> Option<Pos> {
        let start = self.index(from)?;
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([from]);
        seen[start] = true;
        while let Some(pos) = queue.pop_front() {
            if pred(self.cell_at(pos)) {
                return Some(pos);
            }
            for dir in Dir::PRIORITY {
                let next = pos.step(dir);
                let Some(idx) = self.index(next) else {
                    continue;
                };
                if !seen[idx] && !self.cells[idx].is_wall() {
                    seen[idx] = true;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    pub fn count(&self, pred: impl Fn(Cell) -> bool) -> usize {
        self.cells.iter().filter(|cell| pred(**cell)).count()
    }

    pub fn positions(&self, pred: impl Fn(Cell) -> bool) -> Vec<Pos> {
        let mut found = Vec::new();
        for (idx, cell) in self.cells.iter().enumerate() {
            if pred(*cell) {
                found.push(Pos::new(
                    (idx / self.width) as i32,
                    (idx % self.width) as i32,
                ));
            }
        }
        found
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }
}
