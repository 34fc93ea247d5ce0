//! Deterministic timers for the map panel.
//!
//! Nothing here sleeps or spawns: the host calls [`Scheduler::advance`] with the current
//! instant and gets back the work that became due. Periodic timers that fell behind fire once
//! and are rescheduled from `now`.

use std::time::{Duration, Instant};

/// Minimum spacing between two viewport updates (one animation frame at 60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    StatusPoll,
    OverlayPoll,
    Ticker,
}

/// Work handed back by [`Scheduler::advance`], in this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Due {
    StatusPoll,
    OverlayPoll,
    /// Whole seconds since the ticker was last restarted.
    Tick { seconds: u64 },
    Frame,
}

#[derive(Debug, Clone, Copy)]
struct Periodic {
    period: Duration,
    next: Instant,
}

impl Periodic {
    fn new(now: Instant, period: Duration) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    fn fire(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}

#[derive(Debug)]
pub struct Scheduler {
    ticker_interval: Duration,
    status: Option<Periodic>,
    overlay: Option<Periodic>,
    ticker: Option<(Periodic, Instant)>,
    frame: Option<Instant>,
    shut_down: bool,
}

impl Scheduler {
    pub fn new(ticker_interval: Duration) -> Self {
        Self {
            ticker_interval,
            status: None,
            overlay: None,
            ticker: None,
            frame: None,
            shut_down: false,
        }
    }

    /// (Re)starts the status poll; the first poll is due one `period` from `now`.
    pub fn start_status(&mut self, now: Instant, period: Duration) {
        if self.accepts(period) {
            self.status = Some(Periodic::new(now, period));
        }
    }

    pub fn stop_status(&mut self) {
        self.status = None;
    }

    pub fn start_overlay(&mut self, now: Instant, period: Duration) {
        if self.accepts(period) {
            self.overlay = Some(Periodic::new(now, period));
        }
    }

    pub fn stop_overlay(&mut self) {
        self.overlay = None;
    }

    /// Restarts the elapsed-time ticker; the counter starts over from zero.
    pub fn restart_ticker(&mut self, now: Instant) {
        if self.accepts(self.ticker_interval) {
            self.ticker = Some((Periodic::new(now, self.ticker_interval), now));
        }
    }

    pub fn stop_ticker(&mut self) {
        self.ticker = None;
    }

    /// Asks for one frame callback. Returns `false` when a frame is already pending; the
    /// pending request covers this one.
    pub fn request_frame(&mut self, now: Instant) -> bool {
        if self.shut_down || self.frame.is_some() {
            return false;
        }
        self.frame = Some(now + FRAME_INTERVAL);
        true
    }

    pub fn cancel_frame(&mut self) -> bool {
        self.frame.take().is_some()
    }

    pub fn frame_pending(&self) -> bool {
        self.frame.is_some()
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::StatusPoll => self.status.is_some(),
            TimerKind::OverlayPoll => self.overlay.is_some(),
            TimerKind::Ticker => self.ticker.is_some(),
        }
    }

    /// Earliest instant at which [`Scheduler::advance`] has something to return.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.status.map(|p| p.next),
            self.overlay.map(|p| p.next),
            self.ticker.map(|(p, _)| p.next),
            self.frame,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn advance(&mut self, now: Instant) -> Vec<Due> {
        let mut due = Vec::new();
        if self.shut_down {
            return due;
        }
        if self.status.as_mut().is_some_and(|p| p.fire(now)) {
            due.push(Due::StatusPoll);
        }
        if self.overlay.as_mut().is_some_and(|p| p.fire(now)) {
            due.push(Due::OverlayPoll);
        }
        if let Some((ticker, started)) = self.ticker.as_mut() {
            if ticker.fire(now) {
                due.push(Due::Tick {
                    seconds: now.saturating_duration_since(*started).as_secs(),
                });
            }
        }
        if self.frame.is_some_and(|at| at <= now) {
            self.frame = None;
            due.push(Due::Frame);
        }
        due
    }

    /// Stops every timer and drops the pending frame. Later start requests are ignored.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.status = None;
        self.overlay = None;
        self.ticker = None;
        self.frame = None;
        self.shut_down = true;
        tracing::debug!("scheduler shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn accepts(&self, period: Duration) -> bool {
        if self.shut_down {
            return false;
        }
        if period.is_zero() {
            tracing::debug!("zero timer period ignored");
            return false;
        }
        true
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
