//! Tiny wraparound timers
//!
//! Intervals are measured in 64 ms ticks stored in a single byte, which is
//! enough for the few-second periods the UI needs (refresh, key repeat,
//! debounce, note lengths). Comparisons use modular subtraction so the
//! timers keep working across both the 8-bit tick and 32-bit millisecond
//! rollovers.

/// Millisecond time source
pub trait Clock {
    /// Monotonic milliseconds, free to wrap at `u32::MAX`
    fn now_ms(&self) -> u32;
}

/// Tick resolution in milliseconds (as a shift)
const TICK_SHIFT: u32 = 6;

/// Longest interval a timer can represent, in ticks
pub const MAX_TICKS: u8 = 254;

/// Downsample a millisecond timestamp to an 8-bit tick count
#[inline]
pub const fn ticks(ms: u32) -> u8 {
    (ms >> TICK_SHIFT) as u8
}

/// Convert a duration to ticks, rounding up and saturating
pub const fn duration_ticks(ms: u32) -> u8 {
    let t = (ms + (1 << TICK_SHIFT) - 1) >> TICK_SHIFT;
    if t > MAX_TICKS as u32 {
        MAX_TICKS
    } else {
        t as u8
    }
}

/// One-shot interval timer
///
/// An unarmed timer reports elapsed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TinyTimer {
    start: u8,
    wait: u8,
    armed: bool,
}

impl TinyTimer {
    pub const fn new() -> Self {
        Self {
            start: 0,
            wait: 0,
            armed: false,
        }
    }

    /// Arm the timer to elapse `duration_ms` after `now_ms`
    pub fn wait_for(&mut self, now_ms: u32, duration_ms: u32) {
        self.start = ticks(now_ms);
        self.wait = duration_ticks(duration_ms);
        self.armed = true;
    }

    /// Whether strictly more than the armed duration has passed
    pub fn elapsed(&self, now_ms: u32) -> bool {
        !self.armed || ticks(now_ms).wrapping_sub(self.start) > self.wait
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_rounds_up() {
        assert_eq!(duration_ticks(0), 0);
        assert_eq!(duration_ticks(1), 1);
        assert_eq!(duration_ticks(64), 1);
        assert_eq!(duration_ticks(65), 2);
        assert_eq!(duration_ticks(1000), 16);
        assert_eq!(duration_ticks(60_000), MAX_TICKS);
    }

    #[test]
    fn test_unarmed_timer_is_elapsed() {
        let timer = TinyTimer::new();
        assert!(timer.elapsed(0));
        assert!(timer.elapsed(12345));
    }

    #[test]
    fn test_elapses_after_duration() {
        let mut timer = TinyTimer::new();
        timer.wait_for(1000, 100);
        assert!(!timer.elapsed(1000));
        assert!(!timer.elapsed(1100));
        // 100 ms is two ticks; elapsed once the third tick boundary passes
        assert!(timer.elapsed(1000 + 3 * 64));
    }

    #[test]
    fn test_survives_tick_wraparound() {
        let mut timer = TinyTimer::new();
        // 16320 ms is tick 255, the last before the 8-bit counter wraps
        timer.wait_for(16_320, 250);
        assert!(!timer.elapsed(16_384));
        assert!(!timer.elapsed(16_320 + 200));
        assert!(timer.elapsed(16_320 + 400));
    }

    #[test]
    fn test_survives_millisecond_wraparound() {
        let mut timer = TinyTimer::new();
        let start = u32::MAX - 50;
        timer.wait_for(start, 100);
        assert!(!timer.elapsed(start.wrapping_add(64)));
        assert!(timer.elapsed(start.wrapping_add(500)));
    }

    #[test]
    fn test_disarm() {
        let mut timer = TinyTimer::new();
        timer.wait_for(0, 1000);
        assert!(!timer.elapsed(10));
        timer.disarm();
        assert!(timer.elapsed(10));
    }
}
