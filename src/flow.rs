use std::str::FromStr;

const SEPARATOR: char = '|';

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("flow {0:?} has no '|' separator")]
    MissingSeparator(String),
    #[error("flow {0:?} starts or ends with '|'")]
    DanglingSeparator(String),
    #[error("flow segment {0:?} is not a positive number")]
    BadSegment(String),
}

/// How many items each level of an adaptive test administers, written as
/// `"3|4|5"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    levels: Vec<u32>,
}

impl Flow {
    pub fn parse(flow: &str) -> Result<Self, FlowError> {
        if !flow.contains(SEPARATOR) {
            return Err(FlowError::MissingSeparator(flow.to_string()));
        }
        if flow.starts_with(SEPARATOR) || flow.ends_with(SEPARATOR) {
            return Err(FlowError::DanglingSeparator(flow.to_string()));
        }

        let levels = flow
            .split(SEPARATOR)
            .map(|segment| match segment.trim().parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(FlowError::BadSegment(segment.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { levels })
    }

    pub fn total_items(&self) -> u32 {
        self.levels.iter().sum()
    }

    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Items administered at `stage` (1-based). Zero past the last level.
    pub fn level_items(&self, stage: u32) -> u32 {
        stage
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Items administered by the end of `stage`, inclusive.
    pub fn items_through(&self, stage: u32) -> u32 {
        self.levels.iter().take(stage as usize).sum()
    }

    /// Stage the test is in once `step` items have been shown.
    pub fn next_stage(&self, step: u32, stage: u32) -> u32 {
        if step == self.items_through(stage) {
            stage + 1
        } else {
            stage
        }
    }

    /// True once `stage` has moved past the last level.
    pub fn is_complete(&self, stage: u32) -> bool {
        stage > self.level_count()
    }
}

impl FromStr for Flow {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_level() {
        let flow = Flow::parse("3|4|5").unwrap();

        assert_eq!(flow.level_count(), 3);
        assert_eq!(flow.total_items(), 12);
        assert_eq!(flow.level_items(1), 3);
        assert_eq!(flow.level_items(2), 4);
        assert_eq!(flow.level_items(3), 5);
        assert_eq!(flow.level_items(4), 0);
        assert_eq!(flow.items_through(1), 3);
        assert_eq!(flow.items_through(2), 7);
        assert_eq!(flow.items_through(3), 12);
    }

    #[test]
    fn stage_advances_at_level_boundaries() {
        let flow: Flow = "3|4|5".parse().unwrap();

        assert_eq!(flow.next_stage(3, 1), 2);
        assert_eq!(flow.next_stage(2, 1), 1);
        assert_eq!(flow.next_stage(4, 2), 2);
        assert_eq!(flow.next_stage(12, 3), 4);
        assert!(flow.is_complete(4));
        assert!(!flow.is_complete(3));
    }

    #[test]
    fn rejects_malformed_flows() {
        assert_eq!(
            Flow::parse("12"),
            Err(FlowError::MissingSeparator("12".to_string()))
        );
        assert_eq!(
            Flow::parse("|3|4"),
            Err(FlowError::DanglingSeparator("|3|4".to_string()))
        );
        assert_eq!(
            Flow::parse("3|x"),
            Err(FlowError::BadSegment("x".to_string()))
        );
        assert_eq!(
            Flow::parse("3|0"),
            Err(FlowError::BadSegment("0".to_string()))
        );
    }
}
