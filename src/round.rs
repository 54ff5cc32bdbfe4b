use tracing::{debug, info};

pub const START_LIVES: u32 = 3;
pub const CAPTURE_SCORE: u32 = 100;
pub const DEFAULT_POWER_TICKS: u64 = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Won,
    Lost,
    Aborted,
}

/// Score, lives and mode flags shared by every task for one round.
#[derive(Clone, Debug)]
pub struct RoundState {
    score: u32,
    lives: u32,
    ticks: u64,
    powered_at: Option<u64>,
    power_ticks: u64,
    pickups: usize,
    total_pickups: usize,
    message: String,
    running: bool,
}

impl RoundState {
    pub fn new(total_pickups: usize, power_ticks: u64) -> Self {
        Self {
            score: 0,
            lives: START_LIVES,
            ticks: 0,
            powered_at: None,
            power_ticks,
            pickups: 0,
            total_pickups,
            message: "Round start!".to_string(),
            running: true,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_powered(&self) -> bool {
        self.powered_at.is_some()
    }

    pub fn powered_at(&self) -> Option<u64> {
        self.powered_at
    }

    pub fn pickups_consumed(&self) -> usize {
        self.pickups
    }

    pub fn total_pickups(&self) -> usize {
        self.total_pickups
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    pub fn advance_tick(&mut self) -> u64 {
        self.ticks += 1;
        self.ticks
    }

    /// Turns power mode off once it has lasted `power_ticks`. Returns true if it just ended.
    pub fn expire_power(&mut self) -> bool {
        match self.powered_at {
            Some(since) if self.ticks.saturating_sub(since) >= self.power_ticks => {
                self.powered_at = None;
                self.set_message("Super mode is now over.");
                debug!(tick = self.ticks, "power mode expired");
                true
            }
            _ => false,
        }
    }

    pub fn eat_pickup(&mut self) {
        self.pickups += 1;
        self.score += 1;
    }

    pub fn activate_power(&mut self) {
        self.powered_at = Some(self.ticks);
        self.set_message("Super mode is now active!");
        debug!(tick = self.ticks, "power mode activated");
    }

    pub fn clear_power(&mut self) {
        self.powered_at = None;
    }

    pub fn capture_ghost(&mut self) {
        self.score += CAPTURE_SCORE;
        self.set_message("You ate a ghost! +100 SCORE!");
    }

    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.set_message("You were eaten by a ghost! You lost a life.");
        info!(lives = self.lives, score = self.score, "life lost");
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Termination predicate: out of lives or every pickup eaten.
    pub fn is_over(&self) -> bool {
        self.lives == 0 || self.pickups >= self.total_pickups
    }

    /// True while tasks should keep looping.
    pub fn is_live(&self) -> bool {
        self.running && !self.is_over()
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        if self.pickups >= self.total_pickups {
            Some(RoundOutcome::Won)
        } else if self.lives == 0 {
            Some(RoundOutcome::Lost)
        } else if !self.running {
            Some(RoundOutcome::Aborted)
        } else {
            None
        }
    }
}
