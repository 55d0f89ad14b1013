#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEffect {
    /// Extract the section under the retry policy.
    Fetch,
    /// Write the extracted record to its storage path.
    Persist,
    /// Stop the enclosing work; no later section may run.
    AbortWork,
}
