use std::time::{Duration, Instant};

/// Coalesces rapid-fire triggers into one: every `arm` restarts the quiet
/// period, and `fire` reports true exactly once after it elapsed. Polled
/// from the event-loop tick.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn fire(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_fire_before_the_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_secs(60));
        debouncer.arm();
        assert!(!debouncer.fire());
        assert!(!debouncer.fire());
    }

    #[test]
    fn fires_once_after_the_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.arm();
        assert!(debouncer.fire());
        assert!(!debouncer.fire());
    }

    #[test]
    fn rearming_restarts_the_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_secs(60));
        debouncer.arm();
        debouncer.arm();
        assert!(!debouncer.fire());
        debouncer.cancel();
        assert!(!debouncer.fire());
    }

    #[test]
    fn unarmed_debouncer_never_fires() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        assert!(!debouncer.fire());
    }
}
