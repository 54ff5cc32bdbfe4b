use crate::error::GameError;
use crate::grid::{Cell, Dir, Grid, Pos};

pub const GRID_W: usize = 27;
pub const GRID_H: usize = 21;

pub const PLAYER_SPAWN: Pos = Pos::new(15, 13);
pub const PLAYER_FACING: Dir = Dir::Left;

// Portal tunnels on level one are already cleared.
const LEVEL_1: [&str; GRID_H] = [
    "###########################",
    "#O..........###..........O#",
    "#....#################....#",
    "#.........................#",
    "#.######.#########.######.#",
    "[      #.....#.....#      ]",
    "######....#######....######",
    "#O.....#           #.....O#",
    "######.#           #.######",
    "[                         ]",
    "######.#           #.######",
    "#O.....#           #.....O#",
    "######.#..#######..#.######",
    "[      .............      ]",
    "#.####.#############.####.#",
    "#........   . .  .........#",
    "######...###...###...######",
    "#....#...###...###...#....#",
    "#O.......................O#",
    "#..........#####..........#",
    "###########################",
];

const LEVEL_2: [&str; GRID_H] = [
    "###########################",
    "#O..........###..........O#",
    "#....#################....#",
    "#.........................#",
    "#.######.#########.######.#",
    "[......#.....#.....#......]",
    "######....#######....######",
    "#O.....#           #.....O#",
    "######.#           #.######",
    "[......             ......]",
    "######.#           #.######",
    "#O.....#           #.....O#",
    "######.#..#######..#.######",
    "[.........................]",
    "#.####.#############.####.#",
    "#............ ............#",
    "######...###...###...######",
    "#....#...###...###...#....#",
    "#O.......................O#",
    "#..........#####..........#",
    "###########################",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Level {
    number: u8,
    layout: &'static [&'static str; GRID_H],
    declared_pickups: usize,
}

impl Level {
    pub fn by_number(number: u8) -> Result<Level, GameError> {
        match number {
            1 => Ok(Level {
                number,
                layout: &LEVEL_1,
                declared_pickups: 210,
            }),
            2 => Ok(Level {
                number,
                layout: &LEVEL_2,
                declared_pickups: 251,
            }),
            other => Err(GameError::UnknownLevel(other)),
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// Builds a fresh grid for this level and checks its pickup count against the declared total.
    pub fn load(&self) -> Result<(Grid, usize), GameError> {
        let grid = parse_layout(self.layout)?;
        let total = grid.count(Cell::is_pickup);
        if total != self.declared_pickups {
            return Err(GameError::MalformedLayout(format!(
                "level {} declares {} pickups but holds {}",
                self.number, self.declared_pickups, total
            )));
        }
        Ok((grid, total))
    }
}

pub fn parse_layout(rows: &[&str]) -> Result<Grid, GameError> {
    let height = rows.len();
    let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
    let mut cells = Vec::with_capacity(width * height);
    for (y, row) in rows.iter().enumerate() {
        if row.chars().count() != width {
            return Err(GameError::MalformedLayout(format!(
                "row {y} is not {width} cells wide"
            )));
        }
        for (x, symbol) in row.chars().enumerate() {
            let cell = Cell::from_symbol(symbol).ok_or_else(|| {
                GameError::MalformedLayout(format!("unknown symbol {symbol:?} at ({y}, {x})"))
            })?;
            cells.push(cell);
        }
    }
    Grid::new(width, height, cells)
}
