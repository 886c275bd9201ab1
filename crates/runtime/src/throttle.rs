use std::time::Duration;

use crate::scheduler::{Scheduler, TimerHandle};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);
pub const DEFAULT_TRAILING: Duration = Duration::from_millis(100);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ThrottleState {
    /// Idle: the next move redraws immediately.
    #[default]
    No,
    /// Cooling down after a redraw; moves only mark the throttle dirty.
    Yes,
    /// Running the single trailing redraw.
    Finishing,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ThrottleTimer {
    CooldownElapsed,
    TrailingElapsed,
}

/// Caps how often continuous camera motion recomputes expensive output.
///
/// A move while idle redraws at once and starts a cool-down. Moves during the
/// cool-down are coalesced; when it ends, one trailing redraw follows if any
/// were seen. Worst case is one redraw per cool-down plus one catch-up.
#[derive(Debug, Clone)]
pub struct MoveThrottle {
    state: ThrottleState,
    dirty: bool,
    cooldown: Duration,
    trailing: Duration,
    cooldown_timer: Option<TimerHandle>,
    trailing_timer: Option<TimerHandle>,
}

impl Default for MoveThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN, DEFAULT_TRAILING)
    }
}

impl MoveThrottle {
    pub fn new(cooldown: Duration, trailing: Duration) -> Self {
        Self {
            state: ThrottleState::No,
            dirty: false,
            cooldown,
            trailing,
            cooldown_timer: None,
            trailing_timer: None,
        }
    }

    pub fn state(&self) -> ThrottleState {
        self.state
    }

    pub fn on_move<T, S>(&mut self, scheduler: &mut S, redraw: impl FnOnce())
    where
        T: From<ThrottleTimer>,
        S: Scheduler<T> + ?Sized,
    {
        if let Some(h) = self.trailing_timer.take() {
            scheduler.cancel(h);
        }

        match self.state {
            ThrottleState::Yes => {
                self.dirty = true;
            }
            ThrottleState::No => {
                self.state = ThrottleState::Yes;
                self.dirty = false;
                self.cooldown_timer = Some(
                    scheduler.schedule(self.cooldown, T::from(ThrottleTimer::CooldownElapsed)),
                );
                redraw();
            }
            ThrottleState::Finishing => redraw(),
        }
    }

    pub fn on_timer<T, S>(&mut self, timer: ThrottleTimer, scheduler: &mut S, redraw: impl FnOnce())
    where
        T: From<ThrottleTimer>,
        S: Scheduler<T> + ?Sized,
    {
        match timer {
            ThrottleTimer::CooldownElapsed => {
                if self.cooldown_timer.take().is_none() || self.state != ThrottleState::Yes {
                    return;
                }
                self.state = ThrottleState::No;
                if std::mem::take(&mut self.dirty) {
                    self.trailing_timer = Some(
                        scheduler.schedule(self.trailing, T::from(ThrottleTimer::TrailingElapsed)),
                    );
                }
            }
            ThrottleTimer::TrailingElapsed => {
                if self.trailing_timer.take().is_none() {
                    return;
                }
                tracing::trace!("trailing redraw after camera motion");
                self.state = ThrottleState::Finishing;
                redraw();
                self.state = ThrottleState::No;
            }
        }
    }

    /// Drops any pending timers, returning to idle.
    pub fn reset<T, S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<T> + ?Sized,
    {
        for h in [self.cooldown_timer.take(), self.trailing_timer.take()]
            .into_iter()
            .flatten()
        {
            scheduler.cancel(h);
        }
        self.state = ThrottleState::No;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{MoveThrottle, ThrottleState, ThrottleTimer};
    use crate::scheduler::ManualScheduler;
    use foundation::time::Time;
    use std::time::Duration;

    fn pump(
        throttle: &mut MoveThrottle,
        sched: &mut ManualScheduler<ThrottleTimer>,
        until_ms: u64,
        redraws: &mut u32,
    ) {
        let until = Time::from_millis(until_ms);
        while let Some(t) = sched.fire_next(until) {
            throttle.on_timer(t, sched, || *redraws += 1);
        }
        sched.advance_to(until);
    }

    #[test]
    fn single_move_redraws_once() {
        let mut throttle = MoveThrottle::default();
        let mut sched = ManualScheduler::new();
        let mut redraws = 0;

        throttle.on_move(&mut sched, || redraws += 1);
        assert_eq!(redraws, 1);
        assert_eq!(throttle.state(), ThrottleState::Yes);

        pump(&mut throttle, &mut sched, 2_000, &mut redraws);
        assert_eq!(redraws, 1);
        assert_eq!(throttle.state(), ThrottleState::No);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn burst_gets_one_immediate_and_one_trailing_redraw() {
        let mut throttle = MoveThrottle::default();
        let mut sched = ManualScheduler::new();
        let mut redraws = 0;

        throttle.on_move(&mut sched, || redraws += 1);
        for ms in [50, 120, 300, 450] {
            pump(&mut throttle, &mut sched, ms, &mut redraws);
            throttle.on_move(&mut sched, || redraws += 1);
        }
        assert_eq!(redraws, 1);

        pump(&mut throttle, &mut sched, 550, &mut redraws);
        assert_eq!(throttle.state(), ThrottleState::No);
        assert_eq!(redraws, 1);

        pump(&mut throttle, &mut sched, 700, &mut redraws);
        assert_eq!(redraws, 2);
        assert_eq!(throttle.state(), ThrottleState::No);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn move_before_trailing_fires_starts_a_new_cycle() {
        let mut throttle = MoveThrottle::default();
        let mut sched = ManualScheduler::new();
        let mut redraws = 0;

        throttle.on_move(&mut sched, || redraws += 1);
        pump(&mut throttle, &mut sched, 100, &mut redraws);
        throttle.on_move(&mut sched, || redraws += 1);
        pump(&mut throttle, &mut sched, 550, &mut redraws);

        // Trailing timer pending; a fresh move supersedes it.
        throttle.on_move(&mut sched, || redraws += 1);
        assert_eq!(redraws, 2);
        assert_eq!(throttle.state(), ThrottleState::Yes);

        pump(&mut throttle, &mut sched, 5_000, &mut redraws);
        assert_eq!(redraws, 2);
    }

    #[test]
    fn reset_cancels_timers() {
        let mut throttle = MoveThrottle::new(Duration::from_millis(200), Duration::from_millis(50));
        let mut sched = ManualScheduler::<ThrottleTimer>::new();
        throttle.on_move(&mut sched, || {});
        assert_eq!(sched.pending_count(), 1);
        throttle.reset(&mut sched);
        assert_eq!(sched.pending_count(), 0);
        assert_eq!(throttle.state(), ThrottleState::No);
    }
}
