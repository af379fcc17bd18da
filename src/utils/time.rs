//! Boot reference time.
//!
//! Every diagnostic line carries the elapsed time since the relay started,
//! in microseconds, so command traces from one session line up against the
//! autopilot's own logs.

use std::time::Instant;

/// Timestamp origin captured once at process start.
///
/// Cheap to copy; all tasks share the same origin.
#[derive(Debug, Clone, Copy)]
pub struct BootClock {
    origin: Instant,
}

impl BootClock {
    /// Capture the boot reference now.
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Microseconds elapsed since the boot reference.
    pub fn elapsed_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn elapsed_is_monotonic() {
        let clock = BootClock::start();
        let a = clock.elapsed_micros();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.elapsed_micros();
        assert!(b > a);
    }

    #[test]
    fn copies_share_the_origin() {
        let clock = BootClock::start();
        let copy = clock;
        std::thread::sleep(Duration::from_millis(2));
        // Both views advance together
        assert!(copy.elapsed_micros() >= 2_000);
        assert!(clock.elapsed_micros() >= 2_000);
    }
}
