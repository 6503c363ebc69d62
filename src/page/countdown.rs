/// Outcome of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is stopped; nothing changes on screen.
    Idle,
    /// One second elapsed.
    Running { remaining: u32, percentage: u32 },
    /// Time is up. Returned again on every later tick.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Stopped,
    Expired,
}

/// Per-item countdown, decremented once per tick.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    total: u32,
    state: State,
}

impl Countdown {
    /// A running countdown starting at `total` seconds.
    pub fn new(total: u32) -> Self {
        Self {
            remaining: total,
            total,
            state: State::Running,
        }
    }

    pub fn start(&mut self) {
        if self.state == State::Stopped {
            self.state = State::Running;
        }
    }

    pub fn stop(&mut self) {
        if self.state == State::Running {
            self.state = State::Stopped;
        }
    }

    /// Back to the full duration, running.
    pub fn reset(&mut self) {
        self.remaining = self.total;
        self.state = State::Running;
    }

    pub fn tick(&mut self) -> Tick {
        match self.state {
            State::Stopped => Tick::Idle,
            State::Expired => Tick::Expired,
            State::Running if self.remaining == 0 => {
                self.state = State::Expired;
                Tick::Expired
            }
            State::Running => {
                self.remaining -= 1;
                Tick::Running {
                    remaining: self.remaining,
                    percentage: self.percentage(),
                }
            }
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whether ticks currently count down. Lets a controller rebuilt from
    /// page text tell a stopped countdown from a running one.
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == State::Expired
    }

    /// Share of the time still left, floored. Zero when the total is zero.
    pub fn percentage(&self) -> u32 {
        floor_percentage(self.remaining, self.total)
    }
}

pub(crate) fn floor_percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (u64::from(part) * 100 / u64::from(whole)) as u32
}
