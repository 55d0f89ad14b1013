/// Lifecycle of one section within a harvest run.
///
/// `Pending -> Skipped`, or `Pending -> Fetching -> Writing -> Persisted`;
/// `Fetching` may also end in `Empty` (accepted empty source) or `Failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionState {
    #[default]
    Pending,
    Skipped,
    Fetching,
    Writing,
    Persisted,
    Empty,
    Failed,
}

impl SectionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SectionState::Skipped
                | SectionState::Persisted
                | SectionState::Empty
                | SectionState::Failed
        )
    }
}

/// Per-work counts of how sections ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkTally {
    pub written: usize,
    pub skipped: usize,
    pub empty: usize,
}

impl WorkTally {
    pub fn record(&mut self, state: SectionState) {
        match state {
            SectionState::Persisted => self.written += 1,
            SectionState::Skipped => self.skipped += 1,
            SectionState::Empty => self.empty += 1,
            _ => {}
        }
    }

    pub fn total(&self) -> usize {
        self.written + self.skipped + self.empty
    }
}
