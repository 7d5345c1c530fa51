//! Per-turn countdown
//!
//! Decrements once per accumulated real second, independent of the tick rate.

/// Slack so that N ticks of `1/N` s reliably complete a second
const SECOND_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    seconds: u32,
    remaining: u32,
    accumulator: f64,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            seconds,
            remaining: seconds,
            accumulator: 0.0,
        }
    }

    /// Feed elapsed time; returns how many whole seconds elapsed
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt as f64;
        let mut fired = 0;
        while self.accumulator >= 1.0 - SECOND_EPSILON {
            self.accumulator -= 1.0;
            self.countdown();
            fired += 1;
        }
        fired
    }

    /// Take one second off the clock
    pub fn countdown(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    pub fn reset(&mut self) {
        self.remaining = self.seconds;
        self.accumulator = 0.0;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Elapsed share of the turn in [0, 1] (for a clock-wipe HUD)
    pub fn progress(&self) -> f32 {
        if self.seconds == 0 {
            return 1.0;
        }
        (self.seconds - self.remaining) as f32 / self.seconds as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_seconds() {
        let mut timer = Countdown::new(3);
        assert_eq!(timer.advance(1.0), 1);
        assert_eq!(timer.remaining(), 2);
        assert_eq!(timer.advance(2.5), 2);
        assert!(timer.is_finished());
        // Stays at zero
        timer.advance(5.0);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_sixty_frames_make_a_second() {
        let mut timer = Countdown::new(10);
        let mut fired = 0;
        for _ in 0..59 {
            fired += timer.advance(1.0 / 60.0);
        }
        assert_eq!(fired, 0);
        assert_eq!(timer.advance(1.0 / 60.0), 1);
        assert_eq!(timer.remaining(), 9);
    }

    #[test]
    fn test_reset_and_progress() {
        let mut timer = Countdown::new(4);
        timer.advance(2.0);
        assert!((timer.progress() - 0.5).abs() < 1e-6);
        timer.advance(0.5);
        timer.reset();
        assert_eq!(timer.remaining(), 4);
        // Partial second discarded on reset
        assert_eq!(timer.advance(0.6), 0);
    }
}
