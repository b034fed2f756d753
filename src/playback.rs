//! Timestamp playback: a small state machine over running state, direction
//! and speed. Scheduling is left to the caller, which asks for the delay
//! before the next tick and calls [`PlaybackController::tick`] when it fires.

use std::time::Duration;

pub const MAX_SPEED: u8 = 8;

/// Inter-tick delay at speed 1.
pub const BASE_TICK_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// What a tick did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Moved to the contained index.
    Advanced(usize),
    /// The next step would leave the timeline; playback is now stopped.
    Stopped,
    /// Not playing; nothing changed.
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackController {
    running: bool,
    direction: Direction,
    speed: u8,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self {
            running: false,
            direction: Direction::Forward,
            speed: 1,
        }
    }
}

impl PlaybackController {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Signed step applied per tick.
    pub fn step(&self) -> i64 {
        match self.direction {
            Direction::Forward => i64::from(self.speed),
            Direction::Reverse => -i64::from(self.speed),
        }
    }

    /// Start at forward speed 1, or stop.
    pub fn toggle(&mut self) {
        if self.running {
            self.stop();
        } else {
            self.running = true;
            self.direction = Direction::Forward;
            self.speed = 1;
        }
        log::debug!("Playback {}", if self.running { "started" } else { "stopped" });
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Double forward speed, or flip a reverse playback to forward speed 1.
    pub fn fast_forward(&mut self) {
        self.accelerate(Direction::Forward);
    }

    /// Double reverse speed, or flip a forward playback to reverse speed 1.
    pub fn reverse(&mut self) {
        self.accelerate(Direction::Reverse);
    }

    fn accelerate(&mut self, towards: Direction) {
        if self.direction == towards {
            self.speed = (self.speed * 2).min(MAX_SPEED);
        } else {
            self.direction = towards;
            self.speed = 1;
        }
    }

    /// Delay before the next tick; faster speeds tick more often.
    pub fn next_delay(&self) -> Duration {
        BASE_TICK_DELAY / u32::from(self.speed)
    }

    /// Advance `cursor` over a timeline of `len` entries.
    ///
    /// Leaving `[0, len - 1]` stops playback instead of wrapping or clamping.
    pub fn tick(&mut self, cursor: usize, len: usize) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        let next = cursor as i64 + self.step();
        if next < 0 || next >= len as i64 {
            self.stop();
            log::debug!("Playback reached the end of the timeline at index {cursor}");
            return TickOutcome::Stopped;
        }
        TickOutcome::Advanced(next as usize)
    }
}
