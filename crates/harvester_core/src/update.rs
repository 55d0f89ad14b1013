use crate::{SectionEffect, SectionMsg, SectionState};

/// Pure transition function: applies a message to a section state and
/// returns the effects the pipeline must carry out next.
///
/// Messages that make no sense in the current state leave it unchanged.
pub fn update(state: SectionState, msg: SectionMsg) -> (SectionState, Vec<SectionEffect>) {
    use SectionMsg as M;
    use SectionState as S;

    match (state, msg) {
        (S::Pending, M::Checked { harvested: true }) => (S::Skipped, Vec::new()),
        (S::Pending, M::Checked { harvested: false }) => {
            (S::Fetching, vec![SectionEffect::Fetch])
        }
        (S::Fetching, M::Fetched) => (S::Writing, vec![SectionEffect::Persist]),
        (S::Fetching, M::FetchedEmpty) => (S::Empty, Vec::new()),
        (S::Fetching, M::FetchExhausted) | (S::Writing, M::WriteFailed) => {
            (S::Failed, vec![SectionEffect::AbortWork])
        }
        (S::Writing, M::Written) => (S::Persisted, Vec::new()),
        (state, _) => (state, Vec::new()),
    }
}
