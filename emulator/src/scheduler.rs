/// Where a device is within the current second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next one second boundary.
    Idle,
    /// A boundary passed and has not been looked at yet.
    PendingTick,
    /// A frame is going out for this boundary.
    Sent,
}

/// Decides when a device is due. Fed by a one second tick; fires at most once
/// per tick, and only on multiples of the interval, however often it is
/// polled in between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransmitScheduler {
    interval_secs: u32,
    elapsed_secs: u32,
    state: SchedulerState,
}

impl TransmitScheduler {
    pub fn new(interval_secs: u32) -> Self {
        TransmitScheduler {
            interval_secs: interval_secs.max(1),
            elapsed_secs: 0,
            state: SchedulerState::Idle,
        }
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// A one second boundary has passed.
    pub fn tick(&mut self) {
        self.elapsed_secs = self.elapsed_secs.wrapping_add(1);
        self.state = SchedulerState::PendingTick;
    }

    /// True exactly once for a pending tick that lands on the interval. The
    /// caller transmits and then calls `complete`.
    pub fn poll(&mut self) -> bool {
        if self.state != SchedulerState::PendingTick {
            return false;
        }
        if self.elapsed_secs % self.interval_secs == 0 {
            self.state = SchedulerState::Sent;
            true
        } else {
            self.state = SchedulerState::Idle;
            false
        }
    }

    pub fn complete(&mut self) {
        if self.state == SchedulerState::Sent {
            self.state = SchedulerState::Idle;
        }
    }
}
