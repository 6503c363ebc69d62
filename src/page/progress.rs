use super::countdown::floor_percentage;

/// "Item N of M", fixed for the lifetime of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    current: u32,
    total: u32,
}

impl Progress {
    pub fn new(current: u32, total: u32) -> Self {
        Self { current, total }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn percentage(&self) -> u32 {
        floor_percentage(self.current, self.total)
    }

    /// Items left after the current one, as shown in the tooltip.
    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.current)
    }
}
