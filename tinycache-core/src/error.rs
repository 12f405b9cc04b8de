use thiserror::Error;

/// Error returned when a glob pattern cannot be compiled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `[` was opened but never closed with `]`
    #[error("unterminated character class starting at offset {offset}")]
    UnterminatedClass {
        /// Character offset of the opening `[` within the pattern
        offset: usize,
    },
}
