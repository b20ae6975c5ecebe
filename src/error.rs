//! Errors raised while building a rule table.
//!
//! Matching itself never fails: an unsupported or empty card number is an
//! ordinary `None`/`false` outcome, not an error.

use thiserror::Error;

/// Construction failed because the brand source data is unusable.
#[derive(Debug, Error)]
pub enum DataError {
    /// The source document could not be deserialized.
    #[error("malformed brand data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A brand carried a pattern the regex engine rejected.
    #[error("brand `{brand}`: invalid `{field}` pattern: {source}")]
    BadPattern {
        brand: String,
        field: &'static str,
        #[source]
        source: Box<regex::Error>,
    },

    /// Two brands share the same name.
    #[error("duplicate brand name `{0}`")]
    DuplicateName(String),
}
