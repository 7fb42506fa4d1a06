// Licensed under the Apache-2.0 license

//! Bounded busy-polling.
//!
//! The bridge has no scheduler and no timer interrupt: every wait is a poll
//! loop that gives up after a fixed number of iterations. Elapsed wall-clock
//! time therefore depends on how long one poll takes on the target, which is
//! why the budget is configured in polls and only converted from a duration
//! as a convenience.

use fugit::MicrosDurationU32;

/// Upper bound on the number of times a condition is polled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PollTimeout {
    polls: u32,
}

impl PollTimeout {
    #[must_use]
    pub const fn from_polls(polls: u32) -> Self {
        Self { polls }
    }

    /// Derive a poll budget from a wall-clock timeout and the measured cost of
    /// a single poll. Always yields at least one poll.
    #[must_use]
    pub fn from_duration(timeout: MicrosDurationU32, poll_interval: MicrosDurationU32) -> Self {
        let interval = poll_interval.ticks().max(1);
        Self {
            polls: (timeout.ticks() / interval).max(1),
        }
    }

    #[must_use]
    pub const fn polls(&self) -> u32 {
        self.polls
    }

    /// Start a fresh countdown for one wait.
    #[must_use]
    pub const fn countdown(&self) -> Countdown {
        Countdown {
            remaining: self.polls,
        }
    }
}

impl Default for PollTimeout {
    fn default() -> Self {
        Self::from_polls(0xFFFF)
    }
}

/// The poll budget of a wait ran out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Expired;

/// Outcome of polling an `nb` operation that can also fail outright.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PollError<E> {
    Expired,
    Other(E),
}

/// Remaining budget of a single wait.
#[derive(Copy, Clone, Debug)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    /// Consume one poll.
    ///
    /// # Errors
    ///
    /// Returns [`Expired`] once the budget is exhausted.
    pub fn tick(&mut self) -> Result<(), Expired> {
        if self.remaining == 0 {
            return Err(Expired);
        }
        self.remaining -= 1;
        Ok(())
    }
}

/// Poll `ready` until it reports `true` or the budget runs out.
///
/// # Errors
///
/// Returns [`Expired`] if `ready` never reported `true` within the budget.
pub fn poll_until(timeout: PollTimeout, mut ready: impl FnMut() -> bool) -> Result<(), Expired> {
    let mut countdown = timeout.countdown();
    loop {
        countdown.tick()?;
        if ready() {
            return Ok(());
        }
    }
}

/// Poll a non-blocking operation until it completes or the budget runs out.
///
/// # Errors
///
/// Returns [`PollError::Other`] as soon as the operation fails and
/// [`PollError::Expired`] if it kept returning `WouldBlock`.
pub fn poll_nb<T, E>(
    timeout: PollTimeout,
    mut op: impl FnMut() -> nb::Result<T, E>,
) -> Result<T, PollError<E>> {
    let mut countdown = timeout.countdown();
    loop {
        countdown.tick().map_err(|Expired| PollError::Expired)?;
        match op() {
            Ok(value) => return Ok(value),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(e)) => return Err(PollError::Other(e)),
        }
    }
}
