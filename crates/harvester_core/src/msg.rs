#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMsg {
    /// Result of the skip check against storage.
    Checked { harvested: bool },
    /// The source returned content worth persisting.
    Fetched,
    /// The source returned nothing and declares empty a valid outcome.
    FetchedEmpty,
    /// Every attempt failed.
    FetchExhausted,
    Written,
    WriteFailed,
}
