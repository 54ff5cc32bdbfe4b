use std::collections::VecDeque;
use std::time::Duration;

use maze_chase::{
    run_round, Cell, Controls, Display, Frame, Game, GameError, GhostKind, Level, RoundOutcome,
    Tuning,
};

fn fast_tuning() -> Tuning {
    Tuning {
        player: Duration::from_millis(1),
        ghosts: [Duration::from_millis(1); 4],
        power_ticks: 40,
        seed: Some(11),
    }
}

/// Replays a fixed key script, then presses `q` once it runs dry.
struct Script {
    keys: VecDeque<Option<char>>,
}

impl Script {
    fn new(keys: impl IntoIterator<Item = Option<char>>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl Controls for Script {
    fn poll_key(&mut self) -> Result<Option<char>, GameError> {
        Ok(self.keys.pop_front().unwrap_or(Some('q')))
    }
}

#[derive(Default)]
struct Recorder {
    frames: Vec<Snapshot>,
}

#[derive(Clone, Debug)]
struct Snapshot {
    score: u32,
    lives: u32,
    pickups: usize,
    players: usize,
    ghosts: usize,
    powered: bool,
}

impl Display for Recorder {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), GameError> {
        self.frames.push(Snapshot {
            score: frame.round.score(),
            lives: frame.round.lives(),
            pickups: frame.round.pickups_consumed(),
            players: frame.grid.count(Cell::is_player),
            ghosts: frame.grid.count(Cell::is_ghost),
            powered: frame.round.is_powered(),
        });
        Ok(())
    }
}

struct Broken;

impl Display for Broken {
    fn draw(&mut self, _frame: &Frame<'_>) -> Result<(), GameError> {
        Err(GameError::Terminal(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "gone",
        )))
    }
}

fn level(number: u8) -> Game {
    Game::new(Level::by_number(number).unwrap(), 40).unwrap()
}

#[test]
fn first_tick_eats_the_adjacent_pickup() {
    let mut controls = Script::new(std::iter::empty());
    let mut display = Recorder::default();
    let summary = run_round(level(1), &fast_tuning(), &mut controls, &mut display).unwrap();

    let first = &display.frames[0];
    assert_eq!(first.score, 1);
    assert_eq!(first.pickups, 1);
    assert_eq!(summary.outcome, RoundOutcome::Aborted);
    assert_eq!(summary.total_pickups, 210);
}

#[test]
fn every_frame_shows_one_player_and_at_most_four_ghosts() {
    let keys = ['a', 'w', 'd', 's', 'a', 'x', 'd', 'w']
        .into_iter()
        .cycle()
        .take(300)
        .map(Some);
    let mut controls = Script::new(keys);
    let mut display = Recorder::default();
    let summary = run_round(level(2), &fast_tuning(), &mut controls, &mut display).unwrap();

    assert!(!display.frames.is_empty());
    for (idx, frame) in display.frames.iter().enumerate() {
        assert_eq!(frame.players, 1, "frame {idx}");
        assert!(frame.ghosts <= GhostKind::ALL.len(), "frame {idx}");
    }
    let last = display.frames.last().unwrap();
    assert_eq!(last.score, summary.score);
    assert_eq!(last.lives, summary.lives);
}

#[test]
fn score_and_pickups_never_go_backwards() {
    let keys = std::iter::repeat([Some('d'), None, Some('s'), None, Some('a'), None])
        .flatten()
        .take(240);
    let mut controls = Script::new(keys);
    let mut display = Recorder::default();
    run_round(level(1), &fast_tuning(), &mut controls, &mut display).unwrap();

    for pair in display.frames.windows(2) {
        assert!(pair[1].score >= pair[0].score);
        assert!(pair[1].pickups >= pair[0].pickups);
        assert!(pair[1].lives <= pair[0].lives);
        if !pair[0].powered && pair[1].score > pair[0].score {
            assert!(pair[1].score - pair[0].score <= 1);
        }
    }
}

#[test]
fn quitting_immediately_joins_every_task() {
    let mut controls = Script::new([Some('q')]);
    let mut display = Recorder::default();
    let summary = run_round(level(1), &fast_tuning(), &mut controls, &mut display).unwrap();

    assert_eq!(display.frames.len(), 1);
    assert_eq!(summary.outcome, RoundOutcome::Aborted);
    assert_eq!(summary.lives, 3);
    assert_eq!(summary.ticks, 1);
}

#[test]
fn display_failure_stops_the_round() {
    let mut controls = Script::new(std::iter::repeat(None).take(10_000));
    let err = run_round(level(1), &fast_tuning(), &mut controls, &mut Broken).unwrap_err();
    assert!(matches!(err, GameError::Terminal(_)));
}
