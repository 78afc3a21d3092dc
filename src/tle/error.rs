use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TleError {
    #[error("invalid tle format: {0}")]
    Format(String),
    #[error("too few fields (line 1: {line1}, minimum 4; line 2: {line2}, minimum 3)")]
    TooFewFields { line1: usize, line2: usize },
    #[error("expected 2 or 3 lines, found {0}")]
    LineCount(usize),
}
