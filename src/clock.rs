use std::time::{Duration, Instant};

/// Opaque monotonic time stamp. It travels inside the echo payload, so it only
/// has meaning for the clock that produced it.
pub type Tick = u64;

pub trait Clock {
    fn now(&self) -> Tick;

    /// Ticks per second of this clock.
    fn resolution(&self) -> u64;

    /// Time from `start` to `end`. An `end` before `start` yields zero.
    fn elapsed(&self, start: Tick, end: Tick) -> Duration {
        let ticks = end.saturating_sub(start);
        let resolution = self.resolution();
        let secs = ticks / resolution;
        let sub_ticks = ticks % resolution;
        // sub_ticks < resolution, so the quotient is below one second in nanos
        #[allow(clippy::cast_possible_truncation)]
        let nanos = (u128::from(sub_ticks) * 1_000_000_000 / u128::from(resolution)) as u32;
        Duration::new(secs, nanos)
    }

    fn elapsed_seconds(&self, start: Tick, end: Tick) -> f64 {
        self.elapsed(start, end).as_secs_f64()
    }
}

/// Nanosecond ticks since the clock was created, taken from [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Tick {
        // u64 nanoseconds last for centuries
        Tick::try_from(self.origin.elapsed().as_nanos()).unwrap_or(Tick::MAX)
    }

    fn resolution(&self) -> u64 {
        1_000_000_000
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use more_asserts as ma;

    /// Nanosecond clock that only moves when told to. Clones share the time.
    #[derive(Clone, Default)]
    pub(crate) struct ManualClock {
        ticks: Arc<AtomicU64>,
    }

    impl ManualClock {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn advance(&self, duration: Duration) {
            let nanos = u64::try_from(duration.as_nanos()).unwrap();
            self.ticks.fetch_add(nanos, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Tick {
            self.ticks.load(Ordering::SeqCst)
        }

        fn resolution(&self) -> u64 {
            1_000_000_000
        }
    }

    struct MicrosecondClock;

    impl Clock for MicrosecondClock {
        fn now(&self) -> Tick {
            0
        }

        fn resolution(&self) -> u64 {
            1_000_000
        }
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(2));
        let t2 = clock.now();

        ma::assert_gt!(t2, t1);
        ma::assert_ge!(clock.elapsed(t1, t2), Duration::from_millis(2));
    }

    #[test]
    fn elapsed_seconds_keeps_sub_microsecond_precision() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance(Duration::from_nanos(50_250));
        let end = clock.now();

        assert_eq!(Duration::from_nanos(50_250), clock.elapsed(start, end));
        assert!((clock.elapsed_seconds(start, end) - 0.000_050_25).abs() < 1e-12);
    }

    #[test]
    fn elapsed_saturates_when_end_precedes_start() {
        let clock = ManualClock::new();
        assert_eq!(Duration::ZERO, clock.elapsed(1_000, 10));
        assert!(clock.elapsed_seconds(1_000, 10).abs() < f64::EPSILON);
    }

    #[test]
    fn elapsed_converts_foreign_resolution() {
        let clock = MicrosecondClock;
        assert_eq!(Duration::new(2, 500_000), clock.elapsed(clock.now(), 2_000_500));
    }
}
