/// Fixed-period timer on the simulated clock.
///
/// Stands in for a periodic callback: feed it elapsed time and it reports how
/// many times it fired. Leftover time carries over to the next call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTimer {
    period_ms: u64,
    carry_ms: u64,
}

impl IntervalTimer {
    /// Create a timer that first fires one full period from now
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            carry_ms: 0,
        }
    }

    /// Create a timer that fires on the very next `advance` call
    pub fn primed(period_ms: u64) -> Self {
        let period_ms = period_ms.max(1);
        Self {
            period_ms,
            carry_ms: period_ms,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Advance by `elapsed_ms` and return the number of firings
    pub fn advance(&mut self, elapsed_ms: u64) -> u64 {
        self.carry_ms = self.carry_ms.saturating_add(elapsed_ms);
        let fired = self.carry_ms / self.period_ms;
        self.carry_ms %= self.period_ms;
        fired
    }

    /// Forget accumulated time
    pub fn reset(&mut self) {
        self.carry_ms = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_period() {
        let mut timer = IntervalTimer::new(1000);
        assert_eq!(timer.advance(300), 0);
        assert_eq!(timer.advance(300), 0);
        assert_eq!(timer.advance(300), 0);
        assert_eq!(timer.advance(300), 1);
        assert_eq!(timer.advance(2500), 2);
    }

    #[test]
    fn test_primed_fires_immediately() {
        let mut timer = IntervalTimer::primed(1000);
        assert_eq!(timer.advance(0), 1);
        assert_eq!(timer.advance(999), 0);
        assert_eq!(timer.advance(1), 1);
    }

    #[test]
    fn test_reset_drops_carry() {
        let mut timer = IntervalTimer::new(100);
        timer.advance(90);
        timer.reset();
        assert_eq!(timer.advance(90), 0);
    }
}
