use std::time::Duration;

use foundation::time::Time;

/// Cancellation handle for a scheduled timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Deferred work, expressed as a payload delivered back to its owner.
///
/// Hosts back this with whatever timer facility they have; the owner of a
/// payload is responsible for handling it when the host reports it fired.
/// A cancelled timer must never be delivered.
pub trait Scheduler<T> {
    fn schedule(&mut self, delay: Duration, payload: T) -> TimerHandle;

    /// Returns `true` if the timer was still pending.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

#[derive(Debug)]
struct Pending<T> {
    handle: TimerHandle,
    due: Time,
    payload: T,
}

/// Deterministic scheduler driven by an explicit virtual clock.
///
/// Ordering contract:
/// - Timers fire in ascending due time.
/// - Timers due at the same time fire in scheduling order.
#[derive(Debug)]
pub struct ManualScheduler<T> {
    now: Time,
    next_handle: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for ManualScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ManualScheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Time::ZERO,
            next_handle: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> Time {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its due time.
    ///
    /// Handlers may schedule more timers between calls; those are picked up
    /// by later calls if they fall due before `until`.
    pub fn fire_next(&mut self, until: Time) -> Option<T> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until)
            .min_by(|(_, a), (_, b)| {
                a.due
                    .0
                    .total_cmp(&b.due.0)
                    .then_with(|| a.handle.cmp(&b.handle))
            })
            .map(|(i, _)| i)?;

        let fired = self.pending.remove(idx);
        if fired.due > self.now {
            self.now = fired.due;
        }
        tracing::trace!(handle = fired.handle.0, at = self.now.0, "timer fired");
        Some(fired.payload)
    }

    /// Moves the clock forward to `until` without firing anything.
    pub fn advance_to(&mut self, until: Time) {
        if until > self.now {
            self.now = until;
        }
    }

    /// Fires everything due within `dt` and returns the payloads in order.
    ///
    /// Only suitable when handling a payload never schedules new timers; use
    /// [`ManualScheduler::fire_next`] otherwise.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        let until = self.now.after(dt);
        let mut out = Vec::new();
        while let Some(p) = self.fire_next(until) {
            out.push(p);
        }
        self.advance_to(until);
        out
    }
}

impl<T> Scheduler<T> for ManualScheduler<T> {
    fn schedule(&mut self, delay: Duration, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.pending.push(Pending {
            handle,
            due: self.now.after(delay),
            payload,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        before != self.pending.len()
    }
}
